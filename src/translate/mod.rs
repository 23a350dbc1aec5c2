pub mod client;
pub mod google;
pub mod mac;

pub use client::TranslationClient;
pub use google::GoogleTranslator;
pub use mac::MacTranslator;

use crate::config::Engine;
use crate::error::Result;
use async_trait::async_trait;

/// A vendor adapter able to translate text into the configured target language.
///
/// Batching, caching and timeouts live in [`TranslationClient`], which fans a
/// batch out to one `translate` call per text.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str) -> Result<String>;

    fn engine(&self) -> Engine;

    fn name(&self) -> &'static str;
}

/// Shorten text for log lines.
pub(crate) fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_chars).collect();
        format!("{}...", truncated)
    }
}
