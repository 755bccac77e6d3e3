use anyhow::{Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

use qabas_ocr::clean::{CleanedDocument, PageCleaner, PageKind};
use qabas_ocr::config::PipelineConfig;
use qabas_ocr::ocr::ShardCollector;
use qabas_ocr::pipeline::LocalStore;

#[derive(Debug, Parser)]
#[command(author, version, about = "Clean a library of OCR shard folders")]
struct Args {
    /// Input directory; each subdirectory holding shard JSON is one book
    #[arg(short, long)]
    input: PathBuf,

    /// Output directory for cleaned books
    #[arg(short, long)]
    output: PathBuf,

    /// Path to configuration JSON file
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Serialize, Deserialize)]
struct BookMetadata {
    name: String,
    raw_pages: usize,
    content_pages: usize,
    character_count: usize,
    kinds: BTreeMap<PageKind, usize>,
    processed_at: u64,
}

#[derive(Debug, Serialize, Deserialize)]
struct LibraryMetadata {
    total_books: usize,
    total_pages: usize,
    total_content_pages: usize,
    total_characters: usize,
    books: Vec<BookMetadata>,
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

    let args = Args::parse();

    info!("Starting library cleaning");
    info!("Input directory: {:?}", args.input);
    info!("Output directory: {:?}", args.output);

    let mut config = match &args.config {
        Some(path) => {
            let config_str = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            serde_json::from_str::<PipelineConfig>(&config_str).with_context(|| "Failed to parse config JSON")?
        }
        None => PipelineConfig::default(),
    };
    config.validate();
    config.collector.max_attempts = 1;

    fs::create_dir_all(&args.output)
        .with_context(|| format!("Failed to create output directory: {:?}", args.output))?;

    let book_dirs = find_book_dirs(&args.input);
    info!("Found {} book folders", book_dirs.len());

    if book_dirs.is_empty() {
        anyhow::bail!("No shard folders found in {:?}", args.input);
    }

    let library_path = args.output.join("library.jsonl");
    let mut library_file = fs::File::create(&library_path)
        .with_context(|| format!("Failed to create {:?}", library_path))?;
    let mut books = Vec::new();

    for (idx, dir) in book_dirs.iter().enumerate() {
        let name = dir
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| format!("book-{}", idx + 1));
        info!("Processing {}/{}: {}", idx + 1, book_dirs.len(), name);

        let document = match clean_book(dir, &config).await {
            Ok(document) => document,
            Err(e) => {
                warn!("Failed to process {:?}: {}", dir, e);
                continue;
            }
        };
        if document.content_count() == 0 {
            warn!("No content pages left for {}, skipping", name);
            continue;
        }

        let text = document.combined_text();
        write_book(&args.output.join(&name), &document, &text)?;

        let line = serde_json::json!({
            "id": books.len(),
            "book": name,
            "text": text,
        });
        writeln!(library_file, "{}", serde_json::to_string(&line)?)?;

        books.push(BookMetadata {
            name,
            raw_pages: document.len(),
            content_pages: document.content_count(),
            character_count: text.chars().count(),
            kinds: document.kind_counts(),
            processed_at: std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0),
        });
    }

    if books.is_empty() {
        anyhow::bail!("No content extracted from any book");
    }
    info!("Library saved to: {:?}", library_path);

    let metadata = LibraryMetadata {
        total_books: books.len(),
        total_pages: books.iter().map(|b| b.raw_pages).sum(),
        total_content_pages: books.iter().map(|b| b.content_pages).sum(),
        total_characters: books.iter().map(|b| b.character_count).sum(),
        books,
    };

    let metadata_path = args.output.join("metadata.json");
    let metadata_json = serde_json::to_string_pretty(&metadata)?;
    fs::write(&metadata_path, metadata_json)?;
    info!("Metadata saved to: {:?}", metadata_path);

    info!("Cleaning complete!");
    info!("Summary:");
    info!("  - Books: {}", metadata.total_books);
    info!("  - Pages: {} ({} content)", metadata.total_pages, metadata.total_content_pages);
    info!("  - Characters: {}", metadata.total_characters);

    Ok(())
}

/// Direct subdirectories that contain at least one `.json` file at any depth
fn find_book_dirs(input: &Path) -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = WalkDir::new(input)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_dir())
        .map(|e| e.into_path())
        .filter(|dir| {
            WalkDir::new(dir)
                .into_iter()
                .filter_map(|e| e.ok())
                .any(|e| e.file_type().is_file() && e.path().extension().is_some_and(|ext| ext == "json"))
        })
        .collect();
    dirs.sort();
    dirs
}

async fn clean_book(dir: &Path, config: &PipelineConfig) -> Result<CleanedDocument> {
    let store = Arc::new(LocalStore::new(dir));
    let raw_pages = ShardCollector::new(store, config.collector.clone())
        .collect("")
        .await?;
    Ok(PageCleaner::new(config.cleaner.clone()).clean_document(&raw_pages))
}

fn write_book(dir: &Path, document: &CleanedDocument, text: &str) -> Result<()> {
    let pages_dir = dir.join("pages");
    fs::create_dir_all(&pages_dir)
        .with_context(|| format!("Failed to create output directory: {:?}", pages_dir))?;

    for (name, body) in document.page_files() {
        let page_path = pages_dir.join(name);
        fs::write(&page_path, body).with_context(|| format!("Failed to write page: {:?}", page_path))?;
    }

    let book_path = dir.join("book.txt");
    fs::write(&book_path, text).with_context(|| format!("Failed to write document: {:?}", book_path))?;
    Ok(())
}
