//! Ollama model listing.

use console::style;

use crate::config::Config;

use super::helpers;

/// List models installed on the Ollama server, marking the configured one.
pub async fn cmd_models(config: &Config) -> anyhow::Result<()> {
    let llm_client = helpers::embedder(config)?;

    println!("\n{}", style("Ollama Configuration").bold());
    println!("{}", "-".repeat(40));
    println!(
        "{:<20} {}",
        "Enabled:",
        if config.ollama.enabled { "Yes" } else { "No" }
    );
    println!("{:<20} {}", "Endpoint:", config.ollama.endpoint);
    println!("{:<20} {}", "Embedding Model:", config.ollama.model);
    println!("{:<20} {}", "Batch Size:", config.ollama.batch_size());

    if !llm_client.is_available().await {
        println!(
            "\n{} Ollama not available at {}",
            style("!").yellow(),
            config.ollama.endpoint
        );
        println!("  Make sure Ollama is running: ollama serve");
        return Ok(());
    }

    println!("\n{}", style("Available Models").bold());
    println!("{}", "-".repeat(40));

    let models = llm_client.list_models().await?;
    if models.is_empty() {
        println!("  No models installed");
        println!("  Install one with: ollama pull {}", config.ollama.model);
        return Ok(());
    }

    for model in &models {
        let marker = if is_configured_model(model, &config.ollama.model) {
            style("*").green().to_string()
        } else {
            " ".to_string()
        };
        println!("{} {}", marker, model);
    }

    if !models
        .iter()
        .any(|m| is_configured_model(m, &config.ollama.model))
    {
        println!(
            "\n{} Configured model {} is not installed",
            style("!").yellow(),
            config.ollama.model
        );
        println!("  Install it with: ollama pull {}", config.ollama.model);
    }

    Ok(())
}

/// Ollama reports untagged models as `name:latest`.
fn is_configured_model(installed: &str, configured: &str) -> bool {
    installed == configured
        || (!configured.contains(':') && installed == format!("{}:latest", configured))
}
