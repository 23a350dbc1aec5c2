//! Google Translate adapter using the public `translate_a/single` endpoint.

use crate::config::Engine;
use crate::error::{Result, TranslatorError};
use crate::translate::{truncate_text, Translator};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/94.0.4606.81 Safari/537.36";
const REFERER: &str = "https://translate.google.com/";

/// Translator using the Google Translate web endpoint.
pub struct GoogleTranslator {
    client: Client,
    endpoint: String,
    source_lang: String,
    target_lang: String,
    timeout: Duration,
}

impl GoogleTranslator {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            endpoint: "https://translate.googleapis.com/translate_a/single".to_string(),
            source_lang: "en".to_string(),
            target_lang: "zh-CN".to_string(),
            timeout: Duration::from_secs(15),
        }
    }

    /// Point at a different endpoint (used by tests against a mock server).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_languages(mut self, source: impl Into<String>, target: impl Into<String>) -> Self {
        self.source_lang = source.into();
        self.target_lang = target.into();
        self
    }

    /// Per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for GoogleTranslator {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract the translation from the endpoint's nested-array payload.
///
/// The payload's first element holds `[fragment, source, ...]` tuples; empty
/// fragments are dropped and the rest concatenated in order.
pub fn parse_response(payload: &Value) -> Result<String> {
    let fragments = payload
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| TranslatorError::Remote("Unexpected Google response shape".to_string()))?;

    let translation: String = fragments
        .iter()
        .filter_map(|item| item.as_array())
        .filter_map(|tuple| tuple.first())
        .filter_map(Value::as_str)
        .filter(|fragment| !fragment.is_empty())
        .collect();

    if translation.is_empty() {
        return Err(TranslatorError::Remote(
            "Failed to parse Google translation result".to_string(),
        ));
    }

    Ok(translation)
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate(&self, text: &str) -> Result<String> {
        debug!("Google translating: \"{}\"", truncate_text(text, 30));

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", self.source_lang.as_str()),
                ("tl", self.target_lang.as_str()),
                ("dt", "t"),
                ("q", text),
            ])
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .header(reqwest::header::REFERER, REFERER)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(TranslatorError::Remote(format!(
                "Google API error ({}): {}",
                status,
                truncate_text(&body, 200)
            )));
        }

        let payload: Value = serde_json::from_str(&body)?;

        parse_response(&payload)
    }

    fn engine(&self) -> Engine {
        Engine::Google
    }

    fn name(&self) -> &'static str {
        "Google Translate"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_response_concatenates_fragments() {
        let payload = json!([
            [["你好，", "Hello, ", null], ["世界", "world", null]],
            null,
            "en"
        ]);
        assert_eq!(parse_response(&payload).unwrap(), "你好，世界");
    }

    #[test]
    fn test_parse_response_skips_falsy_fragments() {
        let payload = json!([[["", "x"], [null, "y"], ["好", "good"], "junk"]]);
        assert_eq!(parse_response(&payload).unwrap(), "好");
    }

    #[test]
    fn test_parse_response_empty_is_failure() {
        assert!(parse_response(&json!([[["", "x"]]])).is_err());
        assert!(parse_response(&json!([])).is_err());
        assert!(parse_response(&json!({"error": "nope"})).is_err());
    }

    #[test]
    fn test_translator_identity() {
        let translator = GoogleTranslator::new();
        assert_eq!(translator.engine(), Engine::Google);
        assert_eq!(translator.name(), "Google Translate");
        assert_eq!(translator.timeout, Duration::from_secs(15));

        let translator = translator.with_timeout(Duration::from_secs(3));
        assert_eq!(translator.timeout, Duration::from_secs(3));
    }
}
