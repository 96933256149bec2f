//! Connectivity status for both backends.

use console::style;
use serde::Serialize;

use crate::config::Config;

use super::helpers;

#[derive(Debug, Default, Serialize)]
struct StatusReport {
    elasticsearch_url: String,
    elasticsearch_version: Option<String>,
    elasticsearch_error: Option<String>,
    index: String,
    index_exists: bool,
    index_error: Option<String>,
    document_count: Option<u64>,
    ollama_url: String,
    ollama_available: bool,
    model: String,
}

/// Report whether Elasticsearch and Ollama are reachable.
pub async fn cmd_status(config: &Config, json: bool) -> anyhow::Result<()> {
    let report = collect_status(config).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

/// Probe both backends. Backend failures are recorded, not returned.
async fn collect_status(config: &Config) -> anyhow::Result<StatusReport> {
    let client = helpers::search_client(config)?;
    let llm_client = helpers::embedder(config)?;
    let index = &config.elasticsearch.index;

    let mut report = StatusReport {
        elasticsearch_url: config.elasticsearch.url.clone(),
        index: index.clone(),
        ollama_url: config.ollama.endpoint.clone(),
        model: config.ollama.model.clone(),
        ..StatusReport::default()
    };

    match client.info().await {
        Ok(info) => {
            report.elasticsearch_version = Some(format!(
                "{} ({})",
                info.version.number, info.cluster_name
            ));
            match client.index_exists(index).await {
                Ok(exists) => {
                    report.index_exists = exists;
                    if exists {
                        report.document_count = client.count(index).await.ok();
                    }
                }
                Err(e) => report.index_error = Some(e.to_string()),
            }
        }
        Err(e) => report.elasticsearch_error = Some(e.to_string()),
    }
    report.ollama_available = llm_client.is_available().await;
    Ok(report)
}

fn print_report(report: &StatusReport) {
    println!("\n{}", style("Elasticsearch").bold());
    println!("{}", "-".repeat(40));
    println!("{:<20} {}", "URL:", report.elasticsearch_url);
    match (&report.elasticsearch_version, &report.elasticsearch_error) {
        (Some(version), _) => println!("{:<20} {} {}", "Cluster:", style("✓").green(), version),
        (None, Some(error)) => println!("{:<20} {} {}", "Cluster:", style("✗").red(), error),
        (None, None) => {}
    }
    println!(
        "{:<20} {}",
        "Index:",
        match (&report.index_error, report.index_exists, report.document_count) {
            (Some(error), _, _) => format!("{} {} {}", report.index, style("✗").red(), error),
            (None, true, Some(count)) => format!("{} ({} documents)", report.index, count),
            (None, true, None) => report.index.clone(),
            (None, false, _) => format!("{} (missing)", report.index),
        }
    );

    println!("\n{}", style("Ollama").bold());
    println!("{}", "-".repeat(40));
    println!("{:<20} {}", "URL:", report.ollama_url);
    println!(
        "{:<20} {}",
        "Available:",
        if report.ollama_available {
            style("✓").green().to_string()
        } else {
            style("✗").red().to_string()
        }
    );
    println!("{:<20} {}", "Embedding Model:", report.model);
}
