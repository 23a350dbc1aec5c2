use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TranslatorError {
    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Translation failed: {0}")]
    Remote(String),

    #[error("Translation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config file error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl TranslatorError {
    /// HTTP-style status for the request boundary.
    pub fn status_code(&self) -> u16 {
        match self {
            TranslatorError::Validation(_) => 400,
            _ => 500,
        }
    }

    /// Message shown to the end user. `Display` keeps the technical detail for logs.
    pub fn user_message(&self) -> String {
        match self {
            TranslatorError::Validation(msg) => format!("请求无效：{}", msg),
            TranslatorError::Remote(_) | TranslatorError::Http(_) | TranslatorError::Json(_) => {
                "翻译失败，请稍后重试".to_string()
            }
            TranslatorError::Timeout(_) => "翻译服务响应超时，请稍后重试".to_string(),
            TranslatorError::Configuration(msg) => format!("翻译引擎配置错误：{}", msg),
            TranslatorError::Io(_) | TranslatorError::Toml(_) => {
                "读取或写入文件失败，请检查文件路径".to_string()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, TranslatorError>;
