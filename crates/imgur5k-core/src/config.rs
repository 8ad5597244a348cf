use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;
use crate::fetch::FetchOptions;
use crate::url_model::UrlTemplate;

/// Image host URL; `{id}` is replaced by the image identifier.
pub const DEFAULT_URL_TEMPLATE: &str = "https://i.imgur.com/{id}.jpg";

/// Browser-like agent; the image host rejects default client identification.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/58.0.3029.110 Safari/537.3";

/// Bodies shorter than this are treated as an error page.
pub const DEFAULT_MIN_BODY_BYTES: usize = 100;

fn default_splits() -> Vec<String> {
    ["train", "val", "test"].iter().map(|s| s.to_string()).collect()
}

/// Global configuration loaded from `~/.config/imgur5k/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Imgur5kConfig {
    /// Template for image URLs; must contain `{id}`.
    pub url_template: String,
    /// `User-Agent` sent with every image request.
    pub user_agent: String,
    /// Minimum body size for a response to count as an image.
    pub min_body_bytes: usize,
    /// Number of download workers (None = available parallelism - 1, at least 1).
    #[serde(default)]
    pub workers: Option<usize>,
    /// Optional connect timeout in seconds (None = libcurl default).
    #[serde(default)]
    pub connect_timeout_secs: Option<u64>,
    /// Optional whole-request timeout in seconds (None = no timeout).
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// Split names; each needs `{split}_index_ids.lst` in the dataset info dir.
    #[serde(default = "default_splits")]
    pub splits: Vec<String>,
}

impl Default for Imgur5kConfig {
    fn default() -> Self {
        Self {
            url_template: DEFAULT_URL_TEMPLATE.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            min_body_bytes: DEFAULT_MIN_BODY_BYTES,
            workers: None,
            connect_timeout_secs: None,
            timeout_secs: None,
            splits: default_splits(),
        }
    }
}

impl Imgur5kConfig {
    /// Validate the config and build per-request fetch options.
    pub fn fetch_options(&self) -> Result<FetchOptions, ConfigError> {
        if self.min_body_bytes == 0 {
            return Err(ConfigError::ZeroMinBody);
        }
        Ok(FetchOptions {
            url_template: UrlTemplate::new(&self.url_template)?,
            user_agent: self.user_agent.clone(),
            min_body_bytes: self.min_body_bytes,
            connect_timeout: self.connect_timeout_secs.map(Duration::from_secs),
            timeout: self.timeout_secs.map(Duration::from_secs),
            skip_verified: false,
        })
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("imgur5k")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<Imgur5kConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = Imgur5kConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: Imgur5kConfig = toml::from_str(&data)?;
    Ok(cfg)
}
