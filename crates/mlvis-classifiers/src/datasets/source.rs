use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Where a dataset is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Url(String),
    File(PathBuf),
}

impl DataSource {
    pub fn parse(s: &str) -> Self {
        let trimmed = s.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            DataSource::Url(trimmed.to_string())
        } else {
            DataSource::File(PathBuf::from(trimmed))
        }
    }

    /// Return the whole source as text, downloading it when it is a URL.
    pub fn read_to_string(&self, options: &FetchOptions) -> Result<String> {
        match self {
            DataSource::File(path) => fs::read_to_string(path)
                .with_context(|| format!("Failed to read dataset file: {}", path.display())),
            DataSource::Url(url) => {
                if let Some(cached) = options.cached_path(url) {
                    if cached.exists() {
                        log::info!("Using cached copy of {} at {}", url, cached.display());
                        return fs::read_to_string(&cached).with_context(|| {
                            format!("Failed to read cached dataset: {}", cached.display())
                        });
                    }
                }

                let body = fetch_url(url, options.timeout_secs)?;

                if let Some(cached) = options.cached_path(url) {
                    if let Some(parent) = cached.parent() {
                        fs::create_dir_all(parent).with_context(|| {
                            format!("Failed to create cache directory {}", parent.display())
                        })?;
                    }
                    fs::write(&cached, &body)
                        .with_context(|| format!("Failed to write {}", cached.display()))?;
                    log::debug!("Cached {} to {}", url, cached.display());
                }

                Ok(body)
            }
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Url(url) => write!(f, "{}", url),
            DataSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Network settings for URL sources.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchOptions {
    pub timeout_secs: u64,
    pub cache_dir: Option<PathBuf>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            cache_dir: None,
        }
    }
}

impl FetchOptions {
    /// Location of the cached body of `url`, if caching is enabled.
    pub fn cached_path(&self, url: &str) -> Option<PathBuf> {
        let dir = self.cache_dir.as_ref()?;
        let name = url
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .filter(|s| !s.is_empty())
            .unwrap_or("dataset.csv");
        Some(Path::new(dir).join(name))
    }
}

fn fetch_url(url: &str, timeout_secs: u64) -> Result<String> {
    log::info!("Downloading {}", url);
    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .context("Failed to build HTTP client")?;
    let response = client
        .get(url)
        .send()
        .with_context(|| format!("Failed to fetch {}", url))?;
    let status = response.status();
    if !status.is_success() {
        bail!("Fetching {} returned HTTP {}", url, status);
    }
    response
        .text()
        .with_context(|| format!("Failed to read response body from {}", url))
}
