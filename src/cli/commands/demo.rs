//! Demo command: index, then compare vector and hybrid search.

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::Config;
use crate::llm::Embedder;
use crate::search::{ContentRetriever, SearchMode};

use super::helpers;

/// Options for the demo run.
#[derive(Debug, Clone)]
pub struct DemoOptions {
    pub csv: Option<PathBuf>,
    pub query: String,
    pub limit: usize,
    pub no_header: bool,
    pub skip_index: bool,
}

pub async fn cmd_demo(config: &Config, options: DemoOptions) -> anyhow::Result<()> {
    if !options.skip_index {
        let loaded = helpers::load_movies(config, options.csv.clone(), options.no_header)?;
        helpers::index_with_progress(config, &loaded, false).await?;
    }

    let client = helpers::search_client(config)?;
    let embedder: Arc<dyn Embedder> = helpers::embedder(config)?;

    for (label, mode) in [
        ("Vector search results:", SearchMode::Knn),
        ("Hybrid search results:", SearchMode::Hybrid),
    ] {
        let retriever = ContentRetriever::new(
            client.clone(),
            embedder.clone(),
            config.elasticsearch.index.clone(),
            mode,
        )
        .max_results(options.limit)
        .num_candidates(config.elasticsearch.num_candidates);

        let hits = retriever.retrieve(&options.query).await?;
        println!("{}", label);
        for hit in &hits {
            println!("{}", hit.movie_name().unwrap_or("<untitled>"));
        }
    }

    Ok(())
}
