pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod subtitle;
pub mod translate;

pub use cache::TranslationCache;
pub use config::{Config, Engine, OutputMode};
pub use error::{Result, TranslatorError};
pub use pipeline::{print_summary, BatchConfig, BatchOrchestrator, BatchProgress, RunSummary};
pub use subtitle::{check_status, SrtDocument, SubtitleEntry, Translation, TranslationStatus};
pub use translate::{TranslationClient, Translator};
