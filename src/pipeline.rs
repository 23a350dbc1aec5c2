use crate::config::{Config, Engine};
use crate::error::{Result, TranslatorError};
use crate::subtitle::{check_status, SrtDocument, SubtitleEntry, Translation, TranslationStatus};
use crate::translate::TranslationClient;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Settings for a document translation run.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Translation engine shared by every batch.
    pub engine: Engine,
    /// Entries per vendor call.
    pub batch_size: usize,
    /// Pause between consecutive batches.
    pub batch_delay: Duration,
    /// Show a progress bar.
    pub show_progress: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            engine: Engine::default(),
            batch_size: 5,
            batch_delay: Duration::from_millis(500),
            show_progress: false,
        }
    }
}

impl BatchConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            engine: config.default_engine,
            batch_size: config.batch_size,
            batch_delay: config.batch_delay(),
            show_progress: false,
        }
    }
}

/// Cumulative progress published after every batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchProgress {
    /// Entries processed so far in this run.
    pub current: usize,
    /// Entries this run set out to process.
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// One message per batch whose vendor call failed outright.
    pub batch_errors: Vec<String>,
}

/// Outcome of a document translation run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub engine: Engine,
    pub progress: BatchProgress,
    pub batches: usize,
    pub cancelled: bool,
    pub elapsed: Duration,
    /// Document status after the run.
    pub status: TranslationStatus,
}

/// Releases the busy flag and clears any cancellation request when a run
/// ends, however it ends.
struct BusyGuard {
    busy: Arc<AtomicBool>,
    cancelled: Arc<AtomicBool>,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.cancelled.store(false, Ordering::Relaxed);
        self.busy.store(false, Ordering::Release);
    }
}

/// Drives translation of a whole document in sequential, throttled batches.
pub struct BatchOrchestrator {
    client: Arc<TranslationClient>,
    config: BatchConfig,
    busy: Arc<AtomicBool>,
    cancelled: Arc<AtomicBool>,
}

impl BatchOrchestrator {
    pub fn new(client: Arc<TranslationClient>, config: BatchConfig) -> Self {
        Self {
            client,
            config,
            busy: Arc::new(AtomicBool::new(false)),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Share an external cancellation flag, checked between batches.
    ///
    /// A request stops the current run, or the next one if none is active,
    /// and is cleared when that run ends.
    pub fn with_cancel_flag(mut self, cancelled: Arc<AtomicBool>) -> Self {
        self.cancelled = cancelled;
        self
    }

    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        self.cancelled.clone()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    fn acquire(&self) -> Result<BusyGuard> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(TranslatorError::Validation(
                "A translation run is already in progress".to_string(),
            ));
        }
        Ok(BusyGuard {
            busy: self.busy.clone(),
            cancelled: self.cancelled.clone(),
        })
    }

    /// Translate every pending or failed entry of the document.
    pub async fn run(&self, document: &mut SrtDocument) -> Result<RunSummary> {
        self.run_with_progress(document, |_, _| {}).await
    }

    /// Like [`run`](Self::run), calling `on_progress` with the cumulative
    /// progress and the full entry list after each batch.
    pub async fn run_with_progress<F>(
        &self,
        document: &mut SrtDocument,
        mut on_progress: F,
    ) -> Result<RunSummary>
    where
        F: FnMut(&BatchProgress, &[SubtitleEntry]),
    {
        if self.config.batch_size == 0 {
            return Err(TranslatorError::Validation(
                "Batch size must be greater than 0".to_string(),
            ));
        }
        let _guard = self.acquire()?;
        let start_time = Instant::now();
        let engine = self.config.engine;

        let work: Vec<usize> = document
            .entries()
            .iter()
            .enumerate()
            .filter(|(_, e)| e.translation.needs_work())
            .map(|(i, _)| i)
            .collect();

        let batches: Vec<&[usize]> = work.chunks(self.config.batch_size).collect();
        let mut progress = BatchProgress {
            total: work.len(),
            ..Default::default()
        };
        let mut cancelled = false;

        info!(
            "Translating {} of {} entries in {} batches using {}",
            work.len(),
            document.len(),
            batches.len(),
            engine
        );

        let progress_bar = if self.config.show_progress && !work.is_empty() {
            let pb = ProgressBar::new(work.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} entries ({eta})")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
            );
            Some(pb)
        } else {
            None
        };

        for (batch_no, batch) in batches.iter().enumerate() {
            if self.cancelled.load(Ordering::Relaxed) {
                warn!("Run cancelled after {} of {} batches", batch_no, batches.len());
                cancelled = true;
                break;
            }

            let texts: Vec<String> = batch
                .iter()
                .map(|&i| document.entries()[i].text.clone())
                .collect();
            let text_refs: Vec<&str> = texts.iter().map(String::as_str).collect();

            debug!("Batch {}/{}: {} entries", batch_no + 1, batches.len(), batch.len());

            let outcomes = match self.client.translate_batch(&text_refs, engine).await {
                Ok(outcomes) => outcomes,
                Err(e) => {
                    warn!("Batch {} failed: {}", batch_no + 1, e);
                    progress
                        .batch_errors
                        .push(format!("Batch {} failed: {}", batch_no + 1, e));
                    batch
                        .iter()
                        .map(|_| Translation::Failed(e.to_string()))
                        .collect()
                }
            };

            let entries = document.entries_mut();
            for (&i, outcome) in batch.iter().zip(outcomes) {
                if outcome.is_done() {
                    progress.succeeded += 1;
                } else {
                    progress.failed += 1;
                }
                entries[i].translation = outcome;
            }
            progress.current += batch.len();

            if let Some(ref pb) = progress_bar {
                pb.inc(batch.len() as u64);
            }
            on_progress(&progress, document.entries());

            if batch_no + 1 < batches.len() && !self.config.batch_delay.is_zero() {
                tokio::time::sleep(self.config.batch_delay).await;
            }
        }

        if let Some(pb) = progress_bar {
            pb.finish_with_message("Translation complete");
        }

        let status = check_status(document.entries());
        let elapsed = start_time.elapsed();

        info!(
            "Run complete: {}/{} succeeded, {} failed in {:.2}s",
            progress.succeeded,
            progress.total,
            progress.failed,
            elapsed.as_secs_f64()
        );

        Ok(RunSummary {
            engine,
            progress,
            batches: batches.len(),
            cancelled,
            elapsed,
            status,
        })
    }

    /// Retranslate a single entry, recording the failure reason on error.
    pub async fn translate_entry(&self, document: &mut SrtDocument, id: Uuid) -> Result<Translation> {
        let text = document.entry_mut(id)?.text.clone();

        let translation = match self.client.translate_one(&text, self.config.engine).await {
            Ok(translated) => Translation::Done(translated),
            Err(e @ TranslatorError::Configuration(_)) => return Err(e),
            Err(e) => {
                warn!("Entry {} translation failed: {}", id, e);
                Translation::Failed(e.to_string())
            }
        };

        document.entry_mut(id)?.translation = translation.clone();
        Ok(translation)
    }
}

/// Print a summary of a finished run.
pub fn print_summary(summary: &RunSummary, output: Option<&std::path::Path>) {
    println!();
    println!("═══════════════════════════════════════════════════════════════");
    println!("                     Subtitle Translation Complete              ");
    println!("═══════════════════════════════════════════════════════════════");
    println!();
    if let Some(path) = output {
        println!("  Output:      {}", path.display());
    }
    println!("  Engine:      {}", summary.engine);
    println!("  Batches:     {}", summary.batches);
    println!(
        "  This run:    {} succeeded, {} failed of {}",
        summary.progress.succeeded, summary.progress.failed, summary.progress.total
    );
    println!(
        "  Document:    {} translated, {} failed, {} pending of {}",
        summary.status.translated, summary.status.failed, summary.status.pending, summary.status.total
    );
    println!("  Time:        {:.2}s", summary.elapsed.as_secs_f64());
    if summary.cancelled {
        println!();
        println!("  Note: run was cancelled; remaining entries are still pending");
    }
    if summary.status.failed > 0 {
        println!();
        println!(
            "  {} entries failed. Run again to retry only those entries.",
            summary.status.failed
        );
    }
    println!();
    println!("═══════════════════════════════════════════════════════════════");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::TranslationCache;
    use crate::translate::Translator;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;

    /// Mock translator for testing.
    struct MockTranslator {
        call_count: AtomicUsize,
        fail_on: Option<&'static str>,
    }

    impl MockTranslator {
        fn new() -> Self {
            Self {
                call_count: AtomicUsize::new(0),
                fail_on: None,
            }
        }

        fn failing_on(text: &'static str) -> Self {
            Self {
                call_count: AtomicUsize::new(0),
                fail_on: Some(text),
            }
        }
    }

    #[async_trait]
    impl Translator for MockTranslator {
        async fn translate(&self, text: &str) -> Result<String> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            if self.fail_on == Some(text) {
                return Err(TranslatorError::Remote("Mock error".to_string()));
            }
            Ok(format!("[zh] {}", text))
        }

        fn engine(&self) -> Engine {
            Engine::Google
        }

        fn name(&self) -> &'static str {
            "Mock"
        }
    }

    fn create_document(count: usize) -> SrtDocument {
        let content: String = (1..=count)
            .map(|i| format!("{}\n00:00:{:02},000 --> 00:00:{:02},500\nLine {}\n\n", i, i, i, i))
            .collect();
        SrtDocument::parse(&content)
    }

    fn orchestrator(translator: Arc<MockTranslator>, batch_size: usize) -> BatchOrchestrator {
        let client = TranslationClient::new(Arc::new(TranslationCache::default())).register(translator);
        BatchOrchestrator::new(
            Arc::new(client),
            BatchConfig {
                batch_size,
                batch_delay: Duration::ZERO,
                ..Default::default()
            },
        )
    }

    #[tokio::test]
    async fn test_run_translates_all_entries() {
        let translator = Arc::new(MockTranslator::new());
        let orchestrator = orchestrator(translator.clone(), 3);
        let mut doc = create_document(7);

        let summary = orchestrator.run(&mut doc).await.unwrap();

        assert_eq!(summary.batches, 3);
        assert_eq!(summary.progress.succeeded, 7);
        assert_eq!(summary.progress.failed, 0);
        assert_eq!(summary.status.translated, 7);
        assert_eq!(
            doc.entries()[0].translation,
            Translation::Done("[zh] Line 1".to_string())
        );
        assert!(!orchestrator.is_busy());
    }

    #[tokio::test]
    async fn test_progress_is_monotonic() {
        let orchestrator = orchestrator(Arc::new(MockTranslator::new()), 2);
        let mut doc = create_document(5);
        let mut seen = Vec::new();

        orchestrator
            .run_with_progress(&mut doc, |progress, entries| {
                assert_eq!(entries.len(), 5);
                seen.push(progress.current);
            })
            .await
            .unwrap();

        assert_eq!(seen, vec![2, 4, 5]);
    }

    #[tokio::test]
    async fn test_rerun_skips_translated_entries() {
        let translator = Arc::new(MockTranslator::new());
        let orchestrator = orchestrator(translator.clone(), 3);
        let mut doc = create_document(4);

        orchestrator.run(&mut doc).await.unwrap();
        let calls = translator.call_count.load(Ordering::SeqCst);

        let summary = orchestrator.run(&mut doc).await.unwrap();
        assert_eq!(summary.progress.total, 0);
        assert_eq!(summary.batches, 0);
        assert_eq!(translator.call_count.load(Ordering::SeqCst), calls);
    }

    #[tokio::test]
    async fn test_partial_failure_then_retry() {
        let translator = Arc::new(MockTranslator::failing_on("Line 2"));
        let orchestrator = orchestrator(translator, 3);
        let mut doc = create_document(3);

        let summary = orchestrator.run(&mut doc).await.unwrap();
        assert_eq!(summary.progress.succeeded, 2);
        assert_eq!(summary.progress.failed, 1);
        assert!(summary.progress.batch_errors.is_empty());
        assert!(matches!(doc.entries()[1].translation, Translation::Failed(_)));

        // only the failed entry is retried
        let summary = orchestrator.run(&mut doc).await.unwrap();
        assert_eq!(summary.progress.total, 1);
    }

    #[tokio::test]
    async fn test_whole_batch_failure_continues() {
        let client = TranslationClient::new(Arc::new(TranslationCache::default()));
        let orchestrator = BatchOrchestrator::new(
            Arc::new(client),
            BatchConfig {
                batch_size: 2,
                batch_delay: Duration::ZERO,
                ..Default::default()
            },
        );
        let mut doc = create_document(3);

        let summary = orchestrator.run(&mut doc).await.unwrap();
        assert_eq!(summary.progress.failed, 3);
        assert_eq!(summary.progress.batch_errors.len(), 2);
        assert_eq!(summary.status.failed, 3);
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let orchestrator = orchestrator(Arc::new(MockTranslator::new()), 2);
        orchestrator.cancel_flag().store(true, Ordering::Relaxed);
        let mut doc = create_document(4);

        let summary = orchestrator.run(&mut doc).await.unwrap();
        assert!(summary.cancelled);
        assert_eq!(summary.progress.current, 0);
        assert_eq!(summary.status.pending, 4);
    }

    #[tokio::test]
    async fn test_cancel_is_cleared_after_run() {
        let orchestrator = orchestrator(Arc::new(MockTranslator::new()), 2);
        orchestrator.cancel_flag().store(true, Ordering::Relaxed);
        let mut doc = create_document(4);

        assert!(orchestrator.run(&mut doc).await.unwrap().cancelled);
        assert!(!orchestrator.cancel_flag().load(Ordering::Relaxed));

        let summary = orchestrator.run(&mut doc).await.unwrap();
        assert!(!summary.cancelled);
        assert_eq!(summary.status.translated, 4);
    }

    #[tokio::test]
    async fn test_cancel_between_batches() {
        let cancel = Arc::new(AtomicBool::new(false));
        let orchestrator = orchestrator(Arc::new(MockTranslator::new()), 2).with_cancel_flag(cancel.clone());
        let mut doc = create_document(6);

        let summary = orchestrator
            .run_with_progress(&mut doc, |_, _| cancel.store(true, Ordering::Relaxed))
            .await
            .unwrap();

        assert!(summary.cancelled);
        assert_eq!(summary.progress.current, 2);
        assert_eq!(summary.status.pending, 4);
    }

    /// Sleeps on every call and records when each call started.
    struct TimedTranslator {
        base: tokio::time::Instant,
        latency: Duration,
        calls: parking_lot::Mutex<Vec<(Duration, Duration)>>,
    }

    #[async_trait]
    impl Translator for TimedTranslator {
        async fn translate(&self, text: &str) -> Result<String> {
            let start = self.base.elapsed();
            tokio::time::sleep(self.latency).await;
            self.calls.lock().push((start, self.base.elapsed()));
            Ok(format!("[zh] {}", text))
        }

        fn engine(&self) -> Engine {
            Engine::Google
        }

        fn name(&self) -> &'static str {
            "Timed"
        }
    }

    fn delayed_orchestrator(translator: Arc<dyn Translator>, delay: Duration) -> BatchOrchestrator {
        let client = TranslationClient::new(Arc::new(TranslationCache::default())).register(translator);
        BatchOrchestrator::new(
            Arc::new(client),
            BatchConfig {
                batch_size: 2,
                batch_delay: delay,
                ..Default::default()
            },
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_only_between_batches() {
        let orchestrator =
            delayed_orchestrator(Arc::new(MockTranslator::new()), Duration::from_millis(500));
        let mut doc = create_document(5);

        let start = tokio::time::Instant::now();
        let summary = orchestrator.run(&mut doc).await.unwrap();

        assert_eq!(summary.batches, 3);
        // two gaps for three batches, none after the last
        assert_eq!(start.elapsed(), Duration::from_millis(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_batches_do_not_overlap() {
        let translator = Arc::new(TimedTranslator {
            base: tokio::time::Instant::now(),
            latency: Duration::from_millis(100),
            calls: parking_lot::Mutex::new(Vec::new()),
        });
        let orchestrator = delayed_orchestrator(translator.clone(), Duration::from_millis(500));
        let mut doc = create_document(5);

        orchestrator.run(&mut doc).await.unwrap();

        let mut calls = translator.calls.lock().clone();
        calls.sort();
        let starts: Vec<u128> = calls.iter().map(|(s, _)| s.as_millis()).collect();
        assert_eq!(starts, vec![0, 0, 600, 600, 1200]);

        // every call of a batch finishes before the next batch starts
        for pair in calls.windows(2) {
            if pair[0].0 != pair[1].0 {
                assert!(pair[0].1 <= pair[1].0);
            }
        }
    }

    #[tokio::test]
    async fn test_translate_entry() {
        let orchestrator = orchestrator(Arc::new(MockTranslator::failing_on("Line 1")), 2);
        let mut doc = create_document(2);
        let first = doc.entries()[0].id;
        let second = doc.entries()[1].id;

        let result = orchestrator.translate_entry(&mut doc, second).await.unwrap();
        assert_eq!(result, Translation::Done("[zh] Line 2".to_string()));

        let result = orchestrator.translate_entry(&mut doc, first).await.unwrap();
        assert!(matches!(result, Translation::Failed(_)));
        assert_eq!(doc.status().failed, 1);

        assert!(orchestrator.translate_entry(&mut doc, Uuid::new_v4()).await.is_err());
    }

    #[tokio::test]
    async fn test_zero_batch_size_rejected() {
        let orchestrator = orchestrator(Arc::new(MockTranslator::new()), 0);
        let mut doc = create_document(1);
        assert!(orchestrator.run(&mut doc).await.is_err());
    }
}
