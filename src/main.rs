use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use qabas_ocr::clean::PageCleaner;
use qabas_ocr::config::PipelineConfig;
use qabas_ocr::ocr::ShardCollector;
use qabas_ocr::pipeline::LocalStore;
use qabas_ocr::reflow::{Chunk, SpeechChunker, SummaryChunker};

#[derive(Debug, Parser)]
#[command(author, version, about = "Arabic book OCR cleaning CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Clean a directory of OCR shard JSON into book.txt and per-page files
    Clean(CleanArgs),
    /// Cut a text file into speech or summarization chunks
    Chunk(ChunkArgs),
    /// Split a PDF into page-bounded parts
    Split(SplitArgs),
}

#[derive(Debug, Args)]
struct CleanArgs {
    /// Directory holding the OCR shard JSON files
    #[arg(long)]
    shards: PathBuf,
    /// Output directory
    #[arg(long)]
    output: PathBuf,
    /// Path to configuration JSON file
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ChunkMode {
    Speech,
    Summary,
}

#[derive(Debug, Args)]
struct ChunkArgs {
    /// Text file to chunk
    #[arg(long)]
    input: PathBuf,
    /// Output directory for part-NNN.txt files
    #[arg(long)]
    output: PathBuf,
    #[arg(long, value_enum, default_value = "speech")]
    mode: ChunkMode,
    /// Path to configuration JSON file
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct SplitArgs {
    /// PDF to split
    #[arg(long)]
    input: PathBuf,
    /// Output directory for part-NNN.pdf files
    #[arg(long)]
    output: PathBuf,
    /// Maximum pages per part
    #[arg(long, default_value = "100")]
    max_pages: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Clean(args) => clean_command(args).await,
        Commands::Chunk(args) => chunk_command(args),
        Commands::Split(args) => split_command(args),
    }
}

fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    let config = match path {
        Some(path) => {
            info!("Loading configuration from: {:?}", path);
            let config_str = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            serde_json::from_str(&config_str).with_context(|| "Failed to parse config JSON")?
        }
        None => PipelineConfig::default(),
    };
    config.validate();
    Ok(config)
}

async fn clean_command(args: CleanArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    // Shards are already on disk, no need to wait for them
    config.collector.max_attempts = 1;

    let store = Arc::new(LocalStore::new(&args.shards));
    let collector = ShardCollector::new(store, config.collector.clone());
    let raw_pages = collector
        .collect("")
        .await
        .with_context(|| format!("Failed to collect OCR shards from {:?}", args.shards))?;

    let document = PageCleaner::new(config.cleaner.clone()).clean_document(&raw_pages);
    if document.content_count() == 0 {
        anyhow::bail!("No content pages left after cleaning {:?}", args.shards);
    }

    let pages_dir = args.output.join("pages");
    fs::create_dir_all(&pages_dir)
        .with_context(|| format!("Failed to create output directory: {:?}", pages_dir))?;

    for (name, body) in document.page_files() {
        let page_path = pages_dir.join(name);
        fs::write(&page_path, body).with_context(|| format!("Failed to write page: {:?}", page_path))?;
    }

    let book_path = args.output.join("book.txt");
    fs::write(&book_path, document.combined_text())
        .with_context(|| format!("Failed to write combined text: {:?}", book_path))?;

    info!("Wrote {:?} ({} pages)", book_path, document.len());
    for (kind, count) in document.kind_counts() {
        println!("{:<28} {}", kind, count);
    }
    Ok(())
}

fn chunk_command(args: ChunkArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let text = fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read input text: {:?}", args.input))?;

    let chunks: Vec<Chunk> = match args.mode {
        ChunkMode::Speech => SpeechChunker::new(config.speech.clone()).chunk(&text),
        ChunkMode::Summary => {
            let plan = SummaryChunker::new(config.summary.clone()).plan(&text)?;
            info!(
                "Summary target: {}-{} words per chunk summary",
                plan.target_words.min, plan.target_words.max
            );
            plan.chunks
        }
    };

    fs::create_dir_all(&args.output)
        .with_context(|| format!("Failed to create output directory: {:?}", args.output))?;
    for chunk in &chunks {
        let path = args.output.join(chunk.file_name("txt"));
        fs::write(&path, &chunk.text).with_context(|| format!("Failed to write chunk: {:?}", path))?;
    }

    info!("Wrote {} {:?} chunks to {:?}", chunks.len(), args.mode, args.output);
    Ok(())
}

#[cfg(feature = "pdf-split")]
fn split_command(args: SplitArgs) -> Result<()> {
    use qabas_ocr::pipeline::{plan_parts, DocumentSplitter, PdfSplitter};

    if args.max_pages == 0 {
        anyhow::bail!("--max-pages must be > 0");
    }

    let bytes = fs::read(&args.input).with_context(|| format!("Failed to read PDF: {:?}", args.input))?;
    let splitter = PdfSplitter;
    let total = splitter.page_count(&bytes)?;
    info!("PDF page count detected: {}", total);

    fs::create_dir_all(&args.output)
        .with_context(|| format!("Failed to create output directory: {:?}", args.output))?;

    let parts = plan_parts(total, args.max_pages);
    for (idx, range) in parts.iter().enumerate() {
        let part = splitter.extract(&bytes, range.clone())?;
        let path = args.output.join(format!("part-{:03}.pdf", idx + 1));
        fs::write(&path, part).with_context(|| format!("Failed to write part: {:?}", path))?;
        info!("Created split part {} (pages {}-{})", idx + 1, range.start + 1, range.end);
    }

    info!("Split {:?} into {} parts", args.input, parts.len());
    Ok(())
}

#[cfg(not(feature = "pdf-split"))]
fn split_command(_args: SplitArgs) -> Result<()> {
    anyhow::bail!("PDF splitting requires the `pdf-split` feature")
}
