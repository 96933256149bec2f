//! Search command.

use console::style;

use crate::config::Config;
use crate::search::{ContentRetriever, SearchMode};

use super::helpers;

/// Options for a single search.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub mode: SearchMode,
    pub limit: usize,
    pub min_score: Option<f64>,
    pub json: bool,
}

/// Run one query against the index.
pub async fn cmd_search(config: &Config, query: &str, options: SearchOptions) -> anyhow::Result<()> {
    let retriever = ContentRetriever::new(
        helpers::search_client(config)?,
        helpers::embedder(config)?,
        config.elasticsearch.index.clone(),
        options.mode,
    )
    .max_results(options.limit)
    .min_score(options.min_score)
    .num_candidates(config.elasticsearch.num_candidates);

    let hits = retriever.retrieve(query).await?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&hits)?);
        return Ok(());
    }

    println!(
        "{} {} search results for: {}",
        style("→").cyan(),
        options.mode,
        style(query).bold()
    );
    helpers::print_hits(&hits);
    Ok(())
}
