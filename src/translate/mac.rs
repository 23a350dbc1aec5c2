//! macOS `translation` command-line adapter.

use crate::config::Engine;
use crate::error::{Result, TranslatorError};
use crate::translate::{truncate_text, Translator};
use async_trait::async_trait;
use std::process::Stdio;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

/// Translator that shells out to the system translation tool, falling back to
/// another adapter when the tool is missing or fails.
pub struct MacTranslator {
    command: String,
    target_lang: String,
    fallback: Option<Arc<dyn Translator>>,
}

impl MacTranslator {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            target_lang: "zh-Hans".to_string(),
            fallback: None,
        }
    }

    pub fn with_target(mut self, target_lang: impl Into<String>) -> Self {
        self.target_lang = target_lang.into();
        self
    }

    pub fn with_fallback(mut self, fallback: Arc<dyn Translator>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    async fn run_command(&self, text: &str) -> Result<String> {
        let mut child = Command::new(&self.command)
            .args(["shell", "--to", &self.target_lang])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                TranslatorError::Remote(format!("Failed to execute {}: {}", self.command, e))
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(text.as_bytes()).await?;
            stdin.write_all(b"\n").await?;
        }

        let output = child.wait_with_output().await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TranslatorError::Remote(format!(
                "{} exited with {}: {}",
                self.command,
                output.status,
                stderr.trim()
            )));
        }

        let translation = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if translation.is_empty() {
            return Err(TranslatorError::Remote(format!(
                "{} returned no output",
                self.command
            )));
        }

        Ok(translation)
    }
}

#[async_trait]
impl Translator for MacTranslator {
    async fn translate(&self, text: &str) -> Result<String> {
        debug!("{} translating: \"{}\"", self.command, truncate_text(text, 30));

        match self.run_command(text).await {
            Ok(translation) => Ok(translation),
            Err(e) => match &self.fallback {
                Some(fallback) => {
                    warn!("{} unavailable ({}), falling back to {}", self.command, e, fallback.name());
                    fallback.translate(text).await
                }
                None => Err(e),
            },
        }
    }

    fn engine(&self) -> Engine {
        Engine::Mac
    }

    fn name(&self) -> &'static str {
        "macOS translation"
    }
}
