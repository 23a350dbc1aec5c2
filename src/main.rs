use anyhow::{Context, Result};
use clap::Parser;
use srt_translator::config::{Config, Engine, OutputMode};
use srt_translator::{
    print_summary, BatchConfig, BatchOrchestrator, SrtDocument, TranslationCache, TranslationClient,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "srt-translator")]
#[command(version, about = "Translate SRT subtitles into bilingual or translated-only files")]
struct Cli {
    /// Input .srt file
    input: PathBuf,

    /// Output file (defaults to translated_bilingual.srt / translated_chinese.srt next to the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Translation engine: google, mac, tencent, openai, azure, custom
    #[arg(short, long)]
    engine: Option<String>,

    /// Output mode: bilingual, translated
    #[arg(short, long)]
    mode: Option<String>,

    /// Entries per translation batch
    #[arg(short, long)]
    batch_size: Option<usize>,

    /// Pause between batches in milliseconds
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();
}

fn derive_output_path(input: &Path, mode: OutputMode) -> PathBuf {
    let mut output = input.to_path_buf();
    output.set_file_name(mode.file_name());
    output
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    if !cli.input.exists() {
        anyhow::bail!("Input file not found: {}", cli.input.display());
    }

    let mut config = Config::load().context("Failed to load configuration")?;

    let engine: Engine = match cli.engine {
        Some(ref e) => e.parse().map_err(|e: String| anyhow::anyhow!(e))?,
        None => config.default_engine,
    };
    let mode: OutputMode = match cli.mode {
        Some(ref m) => m.parse().map_err(|e: String| anyhow::anyhow!(e))?,
        None => config.output_mode,
    };
    if let Some(size) = cli.batch_size {
        config.batch_size = size;
    }
    if let Some(delay) = cli.delay_ms {
        config.batch_delay_ms = delay;
    }
    config.default_engine = engine;

    config
        .validate(engine)
        .map_err(|e| anyhow::anyhow!(e.to_string()).context(e.user_message()))?;

    let output = cli.output.unwrap_or_else(|| derive_output_path(&cli.input, mode));

    let content = std::fs::read_to_string(&cli.input)
        .with_context(|| format!("Failed to read {}", cli.input.display()))?;
    let mut document = SrtDocument::parse(&content);
    if document.is_empty() {
        anyhow::bail!("No subtitle entries found in {}", cli.input.display());
    }

    info!("Input:   {} ({} entries)", cli.input.display(), document.len());
    info!("Output:  {}", output.display());
    info!("Engine:  {}", engine);
    info!("Mode:    {}", mode);

    let cache = Arc::new(TranslationCache::new(config.cache_ttl()));
    let client = Arc::new(TranslationClient::from_config(&config, cache));
    if !client.supports(engine) {
        anyhow::bail!("Translation engine '{}' is not available yet", engine);
    }

    let cancelled = Arc::new(AtomicBool::new(false));
    {
        let cancelled = cancelled.clone();
        ctrlc::set_handler(move || {
            warn!("Interrupt received, stopping after the current batch");
            cancelled.store(true, Ordering::Relaxed);
        })
        .context("Failed to install Ctrl+C handler")?;
    }

    let batch_config = BatchConfig {
        show_progress: true,
        ..BatchConfig::from_config(&config)
    };
    let orchestrator = BatchOrchestrator::new(client, batch_config).with_cancel_flag(cancelled);

    let summary = orchestrator.run(&mut document).await?;

    std::fs::write(&output, document.generate(mode))
        .with_context(|| format!("Failed to write {}", output.display()))?;

    print_summary(&summary, Some(&output));

    Ok(())
}
