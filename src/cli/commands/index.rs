//! Index command.

use std::path::PathBuf;

use crate::config::Config;

use super::helpers;

/// Load, embed and store the catalogue.
pub async fn cmd_index(
    config: &Config,
    csv: Option<PathBuf>,
    no_header: bool,
    recreate: bool,
) -> anyhow::Result<()> {
    let loaded = helpers::load_movies(config, csv, no_header)?;
    helpers::index_with_progress(config, &loaded, recreate).await?;
    Ok(())
}
