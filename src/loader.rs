//! Metadata loading from a file or the Knack API
//!
//! API loads go through the [`MetadataCache`]: a fresh cached document is
//! reused unless a refresh is forced, and fetched documents are stored unless
//! caching is disabled.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde_json::Value;
use tracing::info;

use crate::cache::MetadataCache;
use crate::config::SleuthConfig;
use crate::error::{Result, SleuthError};
use crate::schema::KnackAppExport;

/// Where a metadata document comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataSource {
    /// Local JSON export
    File(PathBuf),
    /// Knack metadata endpoint for an application id
    Api { app_id: String },
}

impl MetadataSource {
    /// File when given, otherwise the API with the flag or configured app id
    pub fn resolve(
        file: Option<PathBuf>,
        app_id: Option<String>,
        config: &SleuthConfig,
    ) -> Result<Self> {
        if let Some(path) = file {
            return Ok(Self::File(path));
        }
        app_id
            .or_else(|| config.api.app_id.clone())
            .filter(|id| !id.trim().is_empty())
            .map(|app_id| Self::Api { app_id })
            .ok_or(SleuthError::MissingAppId)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Ignore cached documents and fetch again
    pub refresh: bool,
    /// Neither read nor write the cache
    pub no_cache: bool,
}

/// Fetches the raw metadata document of an application
pub trait MetadataFetcher {
    fn fetch(&self, app_id: &str) -> Result<Value>;
}

/// `GET <base_url>/applications/<app_id>` over HTTPS
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl HttpFetcher {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into(),
            api_key,
            timeout,
        }
    }

    pub fn from_config(config: &SleuthConfig) -> Self {
        Self::new(
            config.api.base_url.clone(),
            config.api.api_key.clone(),
            Duration::from_secs(config.api.timeout_secs),
        )
    }

    pub fn url_for(&self, app_id: &str) -> String {
        format!(
            "{}/applications/{}",
            self.base_url.trim_end_matches('/'),
            app_id
        )
    }

    async fn fetch_async(&self, app_id: &str) -> Result<Value> {
        let url = self.url_for(app_id);
        info!("Fetching metadata from: {}", url);

        let client = reqwest::Client::builder()
            .user_agent(concat!("knack-sleuth/", env!("CARGO_PKG_VERSION")))
            .timeout(self.timeout)
            .build()?;

        let mut request = client.get(&url).header("X-Knack-Application-Id", app_id);
        if let Some(key) = &self.api_key {
            request = request.header("X-Knack-REST-API-Key", key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SleuthError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let raw = response.text().await?;
        serde_json::from_str(&raw).map_err(|e| SleuthError::InvalidJson {
            source_name: url,
            message: e.to_string(),
        })
    }
}

impl MetadataFetcher for HttpFetcher {
    fn fetch(&self, app_id: &str) -> Result<Value> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        runtime.block_on(self.fetch_async(app_id))
    }
}

/// Parse a local export file
pub fn load_file(path: &Path) -> Result<KnackAppExport> {
    if !path.exists() {
        return Err(SleuthError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    let raw = fs::read_to_string(path)?;
    KnackAppExport::from_json_str(&path.display().to_string(), &raw)
}

/// Cache-aware metadata loader
#[derive(Debug)]
pub struct MetadataLoader<F = HttpFetcher> {
    cache: MetadataCache,
    fetcher: F,
}

impl MetadataLoader<HttpFetcher> {
    pub fn from_config(config: &SleuthConfig) -> Self {
        Self::new(
            MetadataCache::from_config(config),
            HttpFetcher::from_config(config),
        )
    }
}

impl<F: MetadataFetcher> MetadataLoader<F> {
    pub fn new(cache: MetadataCache, fetcher: F) -> Self {
        Self { cache, fetcher }
    }

    pub fn cache(&self) -> &MetadataCache {
        &self.cache
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Load and parse the document behind `source`
    pub fn load(&self, source: &MetadataSource, options: LoadOptions) -> Result<KnackAppExport> {
        match source {
            MetadataSource::File(path) => load_file(path),
            MetadataSource::Api { app_id } => {
                KnackAppExport::from_value(self.load_document(app_id, options)?)
            }
        }
    }

    /// Raw document for `app_id`, from a fresh cache entry or the API
    pub fn load_document(&self, app_id: &str, options: LoadOptions) -> Result<Value> {
        if !options.refresh && !options.no_cache {
            if let Some(document) = self.cache.load_fresh(app_id)? {
                return Ok(document);
            }
        }

        if options.refresh {
            info!(app_id, "forcing refresh from API");
        }
        let document = self.fetcher.fetch(app_id)?;
        // Only well-formed documents reach the cache
        KnackAppExport::from_value(document.clone())?;

        if !options.no_cache {
            self.cache.store(app_id, &document)?;
        }
        Ok(document)
    }
}
