//! Shared helper functions for CLI commands.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::mpsc;

use crate::config::Config;
use crate::import::{LoadedMovies, MovieReader};
use crate::llm::LlmClient;
use crate::models::SearchHit;
use crate::search::{EmbeddingStore, SearchClient};
use crate::services::{IndexEvent, IndexReport, IndexService};

/// Build the Ollama client from config.
pub fn embedder(config: &Config) -> anyhow::Result<Arc<LlmClient>> {
    let client = LlmClient::new(config.ollama.clone()).context("Failed to create Ollama client")?;
    Ok(Arc::new(client))
}

/// Build the Elasticsearch client from config.
pub fn search_client(config: &Config) -> anyhow::Result<SearchClient> {
    SearchClient::new(&config.elasticsearch).context("Failed to create Elasticsearch client")
}

/// Read the catalogue, from `csv` when given or the configured path.
pub fn load_movies(
    config: &Config,
    csv: Option<PathBuf>,
    no_header: bool,
) -> anyhow::Result<LoadedMovies> {
    let path = csv.unwrap_or_else(|| config.csv_path());
    let reader = MovieReader::new().has_header(config.data.has_header && !no_header);
    let loaded = reader
        .read_path(&path)
        .with_context(|| format!("Failed to load movies from {}", path.display()))?;

    println!(
        "{} Loaded {} movies from {}",
        style("→").cyan(),
        loaded.movies.len(),
        path.display()
    );
    if loaded.skipped > 0 {
        println!(
            "  {} Skipped {} malformed rows",
            style("!").yellow(),
            loaded.skipped
        );
    }
    Ok(loaded)
}

/// Index movies, rendering service events as a progress bar.
pub async fn index_with_progress(
    config: &Config,
    loaded: &LoadedMovies,
    recreate: bool,
) -> anyhow::Result<IndexReport> {
    let client = search_client(config)?;
    let store = EmbeddingStore::new(
        client,
        config.elasticsearch.index.clone(),
        config.elasticsearch.bulk_size(),
    );
    let service = IndexService::new(embedder(config)?, store)
        .batch_size(config.ollama.batch_size())
        .concurrency(config.ollama.concurrency);

    if recreate {
        service.reset().await?;
        println!(
            "  {} Dropped index {}",
            style("✓").green(),
            config.elasticsearch.index
        );
    }

    let (event_tx, event_rx) = mpsc::channel(64);
    let renderer = tokio::spawn(render_index_events(event_rx));

    let result = service.index_movies(&loaded.movies, event_tx).await;
    let _ = renderer.await;

    let report = result.context("Indexing failed")?;
    println!(
        "{} Indexed {} movies into {}",
        style("✓").green(),
        report.indexed,
        config.elasticsearch.index
    );
    Ok(report)
}

async fn render_index_events(mut event_rx: mpsc::Receiver<IndexEvent>) {
    let mut pb: Option<ProgressBar> = None;

    while let Some(event) = event_rx.recv().await {
        match event {
            IndexEvent::Started { total_movies } => {
                let progress = ProgressBar::new(total_movies as u64);
                progress.set_style(
                    ProgressStyle::default_bar()
                        .template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {wide_msg}")
                        .unwrap_or_else(|_| ProgressStyle::default_bar())
                        .progress_chars("█▓░"),
                );
                progress.set_message("embedding");
                pb = Some(progress);
            }
            IndexEvent::BatchEmbedded { count } => {
                if let Some(ref progress) = pb {
                    progress.inc(count as u64);
                }
            }
            IndexEvent::Stored { count } => {
                if let Some(ref progress) = pb {
                    progress.set_message(format!("stored {} segments, refreshing", count));
                }
            }
            IndexEvent::Refreshed => {
                if let Some(ref progress) = pb {
                    progress.finish_and_clear();
                }
            }
        }
    }

    if let Some(progress) = pb {
        if !progress.is_finished() {
            progress.abandon();
        }
    }
}

/// Print hits as a numbered list of movie names.
pub fn print_hits(hits: &[SearchHit]) {
    if hits.is_empty() {
        println!("  {}", style("No results").dim());
        return;
    }
    for (rank, hit) in hits.iter().enumerate() {
        println!(
            "  {}. {} {}",
            rank + 1,
            hit.movie_name().unwrap_or("<untitled>"),
            style(format!("({:.4})", hit.score)).dim()
        );
    }
}
