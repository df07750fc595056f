use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Runtime configuration, read once at startup from a JSON file.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// URL of the ranked listing page to scrape.
    pub imdb_url: String,
    /// Max number of ranked titles to extract.
    #[serde(default = "default_n_filmes")]
    pub n_filmes: usize,
    #[serde(default = "default_db_path")]
    pub db_path: String,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

fn default_n_filmes() -> usize {
    250
}

fn default_db_path() -> String {
    "data/imdb.db".to_string()
}

fn default_output_dir() -> String {
    "data".to_string()
}

pub fn load(path: &Path) -> Result<Config> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config: Config = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid JSON in config file {}", path.display()))?;
    Ok(config)
}
