use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fs, path::PathBuf};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// base url of the storage backend
    pub base_url: String,
    /// timeout for a single request in seconds
    pub timeout_seconds: u64,
    /// number of files shown per page
    pub page_size: usize,
    /// where the command line keeps the token between invocations
    pub token_file: Option<PathBuf>,
    /// whether the dashboard shows the email/total files/storage used header
    pub show_summary: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            timeout_seconds: 30,
            page_size: 10,
            token_file: None,
            show_summary: true,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.base_url)
            .with_context(|| format!("base url '{}' is invalid", self.base_url))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            anyhow::bail!("base url '{}' must use http or https", self.base_url);
        }

        if self.timeout_seconds < 1 || self.timeout_seconds > 300 {
            anyhow::bail!(
                "timeout '{}' is invalid, must be between [1, 300] seconds",
                self.timeout_seconds
            );
        }

        if self.page_size < 1 || self.page_size > 100 {
            anyhow::bail!(
                "page size '{}' is invalid, must be between [1, 100]",
                self.page_size
            );
        }

        Ok(())
    }
}

/// Parse the config file into Config struct.
pub fn parse_config<P: Into<PathBuf>>(filepath: P) -> Result<Config> {
    let filepath = filepath.into();
    let content = fs::read_to_string(&filepath)
        .with_context(|| format!("failed to read config file {}", filepath.display()))?;

    parse_config_str(&content)
}

pub fn parse_config_str(content: &str) -> Result<Config> {
    let c: Config = toml::from_str(content).context("failed to convert toml config data")?;
    c.validate()?;

    Ok(c)
}
