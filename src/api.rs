//! Request and response bodies for the translation endpoints, with handlers
//! that are independent of any HTTP framework.

use crate::config::Engine;
use crate::error::{Result, TranslatorError};
use crate::translate::TranslationClient;
use serde::{Deserialize, Serialize};
use tracing::error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub engine: Option<Engine>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslateResponse {
    pub translation: String,
    pub engine: Engine,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub cached: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchTranslateRequest {
    #[serde(default)]
    pub texts: Option<Vec<String>>,
    #[serde(default)]
    pub engine: Engine,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchTranslateResponse {
    pub translations: Vec<String>,
    pub engine: Engine,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}

/// Status code and body for a failed request.
pub fn error_response(err: &TranslatorError) -> (u16, ErrorBody) {
    error!("Translation request failed: {}", err);
    (
        err.status_code(),
        ErrorBody {
            message: err.user_message(),
        },
    )
}

pub async fn handle_translate(
    client: &TranslationClient,
    request: TranslateRequest,
) -> Result<TranslateResponse> {
    let text = request
        .text
        .filter(|t| !t.is_empty())
        .ok_or_else(|| TranslatorError::Validation("Text is required".to_string()))?;
    let engine = request.engine.unwrap_or_default();

    let (translation, cached) = client.lookup(&text, engine).await?;
    Ok(TranslateResponse {
        translation,
        engine,
        cached,
    })
}

/// Element failures become the failure sentinel; only a structurally invalid
/// request or an unavailable engine fails the call.
pub async fn handle_batch(
    client: &TranslationClient,
    request: BatchTranslateRequest,
) -> Result<BatchTranslateResponse> {
    let texts = request
        .texts
        .filter(|t| !t.is_empty())
        .ok_or_else(|| TranslatorError::Validation("Texts array is required".to_string()))?;

    let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
    let translations = client
        .translate_batch(&refs, request.engine)
        .await?
        .iter()
        .map(|t| t.as_wire().unwrap_or_default().to_string())
        .collect();

    Ok(BatchTranslateResponse {
        translations,
        engine: request.engine,
    })
}
