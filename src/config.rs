use crate::error::{Result, TranslatorError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Longest cache lifetime accepted from configuration.
pub const MAX_CACHE_TTL_SECS: u64 = 365 * 24 * 60 * 60;

/// Translation backend identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    #[default]
    Google,
    Mac,
    Tencent,
    OpenAi,
    Azure,
    Custom,
}

impl Engine {
    pub fn id(&self) -> &'static str {
        match self {
            Engine::Google => "google",
            Engine::Mac => "mac",
            Engine::Tencent => "tencent",
            Engine::OpenAi => "openai",
            Engine::Azure => "azure",
            Engine::Custom => "custom",
        }
    }
}

impl std::fmt::Display for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl std::str::FromStr for Engine {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "google" => Ok(Engine::Google),
            "mac" => Ok(Engine::Mac),
            "tencent" => Ok(Engine::Tencent),
            "openai" => Ok(Engine::OpenAi),
            "azure" => Ok(Engine::Azure),
            "custom" => Ok(Engine::Custom),
            _ => Err(format!(
                "Unknown engine: {}. Use 'google', 'mac', 'tencent', 'openai', 'azure' or 'custom'",
                s
            )),
        }
    }
}

/// Shape of the regenerated SRT body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    #[default]
    Bilingual,
    #[serde(alias = "chinese")]
    Translated,
}

impl std::fmt::Display for OutputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputMode::Bilingual => write!(f, "bilingual"),
            OutputMode::Translated => write!(f, "translated"),
        }
    }
}

impl std::str::FromStr for OutputMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bilingual" => Ok(OutputMode::Bilingual),
            "translated" | "chinese" => Ok(OutputMode::Translated),
            _ => Err(format!(
                "Unknown output mode: {}. Use 'bilingual' or 'translated'",
                s
            )),
        }
    }
}

impl OutputMode {
    /// Download name offered for the regenerated file.
    pub fn file_name(&self) -> &'static str {
        match self {
            OutputMode::Bilingual => "translated_bilingual.srt",
            OutputMode::Translated => "translated_chinese.srt",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub default_engine: Engine,
    pub output_mode: OutputMode,
    pub source_language: String,
    pub target_language: String,
    pub google_endpoint: String,
    pub request_timeout_secs: u64,
    pub batch_size: usize,
    pub batch_delay_ms: u64,
    pub cache_ttl_secs: u64,
    pub mac_command: String,
    pub mac_target_language: String,
    pub tencent_secret_id: Option<String>,
    pub tencent_secret_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_engine: Engine::default(),
            output_mode: OutputMode::default(),
            source_language: "en".to_string(),
            target_language: "zh-CN".to_string(),
            google_endpoint: "https://translate.googleapis.com/translate_a/single".to_string(),
            request_timeout_secs: 15,
            batch_size: 5,
            batch_delay_ms: 500,
            cache_ttl_secs: 24 * 60 * 60,
            mac_command: "translation".to_string(),
            mac_target_language: "zh-Hans".to_string(),
            tencent_secret_id: None,
            tencent_secret_key: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        if let Some(config_path) = Self::config_file_path() {
            if config_path.exists() {
                let contents = std::fs::read_to_string(&config_path)?;
                config = toml::from_str::<Config>(&contents)?;
            }
        }

        config.apply_env();
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(id) = std::env::var("TENCENT_SECRET_ID") {
            self.tencent_secret_id = Some(id);
        }
        if let Ok(key) = std::env::var("TENCENT_SECRET_KEY") {
            self.tencent_secret_key = Some(key);
        }
        if let Ok(engine) = std::env::var("SRT_TRANSLATOR_ENGINE") {
            if let Ok(e) = engine.parse() {
                self.default_engine = e;
            }
        }
        if let Ok(size) = std::env::var("SRT_TRANSLATOR_BATCH_SIZE") {
            if let Ok(s) = size.parse() {
                self.batch_size = s;
            }
        }
        if let Ok(timeout) = std::env::var("SRT_TRANSLATOR_TIMEOUT") {
            if let Ok(t) = timeout.parse() {
                self.request_timeout_secs = t;
            }
        }
    }

    pub fn validate(&self, engine: Engine) -> Result<()> {
        if engine == Engine::Tencent {
            let id_set = self.tencent_secret_id.as_deref().is_some_and(|s| !s.is_empty());
            let key_set = self.tencent_secret_key.as_deref().is_some_and(|s| !s.is_empty());
            if !id_set || !key_set {
                return Err(TranslatorError::Configuration(
                    "Tencent credentials not configured. Set TENCENT_SECRET_ID and TENCENT_SECRET_KEY"
                        .to_string(),
                ));
            }
        }

        if self.batch_size == 0 {
            return Err(TranslatorError::Configuration(
                "Batch size must be greater than 0".to_string(),
            ));
        }

        if self.cache_ttl_secs > MAX_CACHE_TTL_SECS {
            return Err(TranslatorError::Configuration(format!(
                "Cache TTL must be at most {} seconds",
                MAX_CACHE_TTL_SECS
            )));
        }

        if self.request_timeout_secs == 0 {
            return Err(TranslatorError::Configuration(
                "Request timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    fn config_file_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("srt-translator").join("config.toml"))
    }
}
