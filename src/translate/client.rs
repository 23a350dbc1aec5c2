use crate::cache::TranslationCache;
use crate::config::{Config, Engine};
use crate::error::{Result, TranslatorError};
use crate::subtitle::Translation;
use crate::translate::{truncate_text, GoogleTranslator, MacTranslator, Translator};
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Cache-backed front for the registered vendor adapters.
pub struct TranslationClient {
    translators: HashMap<Engine, Arc<dyn Translator>>,
    cache: Arc<TranslationCache>,
    timeout: Duration,
}

impl TranslationClient {
    pub fn new(cache: Arc<TranslationCache>) -> Self {
        Self {
            translators: HashMap::new(),
            cache,
            timeout: Duration::from_secs(15),
        }
    }

    /// Client with every adapter the configuration can build.
    pub fn from_config(config: &Config, cache: Arc<TranslationCache>) -> Self {
        let google: Arc<dyn Translator> = Arc::new(
            GoogleTranslator::new()
                .with_endpoint(config.google_endpoint.clone())
                .with_languages(config.source_language.clone(), config.target_language.clone())
                .with_timeout(config.request_timeout()),
        );
        let mac = MacTranslator::new(config.mac_command.clone())
            .with_target(config.mac_target_language.clone())
            .with_fallback(google.clone());

        Self::new(cache)
            .with_timeout(config.request_timeout())
            .register(google)
            .register(Arc::new(mac))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Register an adapter under the engine it reports.
    pub fn register(mut self, translator: Arc<dyn Translator>) -> Self {
        self.translators.insert(translator.engine(), translator);
        self
    }

    pub fn supports(&self, engine: Engine) -> bool {
        self.translators.contains_key(&engine)
    }

    pub fn cache(&self) -> &Arc<TranslationCache> {
        &self.cache
    }

    fn translator(&self, engine: Engine) -> Result<&Arc<dyn Translator>> {
        self.translators.get(&engine).ok_or_else(|| {
            TranslatorError::Configuration(format!("Translation engine '{}' is not available", engine))
        })
    }

    /// Translate one text, consulting the cache first.
    pub async fn translate_one(&self, text: &str, engine: Engine) -> Result<String> {
        self.lookup(text, engine).await.map(|(translation, _)| translation)
    }

    /// Like [`translate_one`](Self::translate_one); the flag is true when the
    /// translation came from the cache.
    pub async fn lookup(&self, text: &str, engine: Engine) -> Result<(String, bool)> {
        let translator = self.translator(engine)?;
        self.translate_cached(translator.as_ref(), text, engine).await
    }

    /// Translate many texts. Only a missing engine or an empty input fails the
    /// whole call; per-text failures, timeouts included, come back as
    /// [`Translation::Failed`] without affecting the other texts.
    pub async fn translate_batch(&self, texts: &[&str], engine: Engine) -> Result<Vec<Translation>> {
        if texts.is_empty() {
            return Err(TranslatorError::Validation("Texts array is required".to_string()));
        }
        let translator = self.translator(engine)?;

        debug!("{} batch: {} texts", engine, texts.len());

        let outcomes = join_all(
            texts
                .iter()
                .map(|text| self.translate_cached(translator.as_ref(), text, engine)),
        )
        .await;

        Ok(outcomes
            .into_iter()
            .enumerate()
            .map(|(idx, outcome)| match outcome {
                Ok((text, _)) => Translation::Done(text),
                Err(e) => {
                    warn!("{} translation error for text {}: {}", engine, idx, e);
                    Translation::Failed(e.to_string())
                }
            })
            .collect())
    }

    async fn translate_cached(
        &self,
        translator: &dyn Translator,
        text: &str,
        engine: Engine,
    ) -> Result<(String, bool)> {
        let key = TranslationCache::key(engine.id(), text);
        if let Some(cached) = self.cache.get(&key) {
            debug!("Cache hit for: {}", truncate_text(text, 30));
            return Ok((cached, true));
        }

        let translation = tokio::time::timeout(self.timeout, translator.translate(text))
            .await
            .map_err(|_| TranslatorError::Timeout(self.timeout))??;

        if translation.is_empty() {
            return Err(TranslatorError::Remote(format!(
                "{} returned an empty translation",
                translator.name()
            )));
        }

        self.cache.set(key, translation.clone());
        Ok((translation, false))
    }
}
