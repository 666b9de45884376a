//! On-disk cache of fetched metadata documents
//!
//! Each fetch is stored as `<app_id>_app_metadata_<YYYYMMDDHHMM>.json` in an
//! XDG-compliant cache directory. The timestamp in the name is the write
//! time according to the cache's [`Clock`], which is also what freshness is
//! measured against.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::SleuthConfig;
use crate::error::{Result, SleuthError};

const FILE_MARKER: &str = "_app_metadata_";
const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M";
/// Upper bound for configured ages (a century)
const MAX_HOURS: u64 = 24 * 365 * 100;

fn hours(h: u64) -> Duration {
    Duration::hours(h.min(MAX_HOURS) as i64)
}

/// Provides the current time.
pub trait Clock: Send + Sync {
    /// Returns the current UTC time.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// One cached document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheEntry {
    pub app_id: String,
    pub path: PathBuf,
    pub written_at: DateTime<Utc>,
    pub size_bytes: u64,
}

impl CacheEntry {
    /// Parse a cache file name; other files in the directory are ignored
    fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?;
        let stem = name.strip_suffix(".json")?;
        let (app_id, stamp) = stem.rsplit_once(FILE_MARKER)?;
        if app_id.is_empty() {
            return None;
        }
        let naive = NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT).ok()?;
        let written_at = Utc.from_utc_datetime(&naive);
        let size_bytes = fs::metadata(path).map(|m| m.len()).unwrap_or(0);

        Some(Self {
            app_id: app_id.to_string(),
            path: path.to_path_buf(),
            written_at,
            size_bytes,
        })
    }

    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.written_at
    }
}

/// Get the base cache directory
///
/// Uses `$XDG_CACHE_HOME/knack-sleuth` or `~/.cache/knack-sleuth`
pub fn get_cache_base_dir() -> PathBuf {
    // Check XDG_CACHE_HOME first
    if let Ok(xdg_cache) = std::env::var("XDG_CACHE_HOME") {
        return PathBuf::from(xdg_cache).join("knack-sleuth");
    }

    // Fall back to ~/.cache/knack-sleuth
    if let Some(home) = dirs::home_dir() {
        return home.join(".cache").join("knack-sleuth");
    }

    // Last resort: temp directory
    std::env::temp_dir().join("knack-sleuth")
}

/// Cached metadata documents in one directory
#[derive(Clone)]
pub struct MetadataCache {
    dir: PathBuf,
    max_age: Duration,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for MetadataCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataCache")
            .field("dir", &self.dir)
            .field("max_age", &self.max_age)
            .finish_non_exhaustive()
    }
}

impl MetadataCache {
    pub fn new(dir: impl Into<PathBuf>, max_age_hours: u64, clock: Arc<dyn Clock>) -> Self {
        Self {
            dir: dir.into(),
            max_age: hours(max_age_hours),
            clock,
        }
    }

    /// Cache configured by `[cache]`, using the system clock
    pub fn from_config(config: &SleuthConfig) -> Self {
        let dir = config
            .cache
            .dir
            .clone()
            .unwrap_or_else(get_cache_base_dir);
        Self::new(dir, config.cache.max_age_hours, Arc::new(SystemClock))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Cached documents, newest first, optionally for one app
    pub fn entries(&self, app_id: Option<&str>) -> Result<Vec<CacheEntry>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut entries: Vec<CacheEntry> = fs::read_dir(&self.dir)?
            .flatten()
            .map(|e| e.path())
            .filter(|p| p.is_file())
            .filter_map(|p| CacheEntry::from_path(&p))
            .filter(|e| app_id.map_or(true, |id| e.app_id == id))
            .collect();
        entries.sort_by(|a, b| {
            b.written_at
                .cmp(&a.written_at)
                .then_with(|| a.app_id.cmp(&b.app_id))
        });
        Ok(entries)
    }

    /// Newest entry for `app_id` younger than the maximum age
    pub fn latest_fresh(&self, app_id: &str) -> Result<Option<CacheEntry>> {
        let now = self.clock.now();
        Ok(self
            .entries(Some(app_id))?
            .into_iter()
            .next()
            .filter(|e| e.age(now) < self.max_age))
    }

    /// Fresh cached document for `app_id`; unreadable entries count as misses
    pub fn load_fresh(&self, app_id: &str) -> Result<Option<serde_json::Value>> {
        let Some(entry) = self.latest_fresh(app_id)? else {
            return Ok(None);
        };

        let loaded = fs::read_to_string(&entry.path)
            .map_err(SleuthError::from)
            .and_then(|raw| {
                serde_json::from_str::<serde_json::Value>(&raw).map_err(|e| {
                    SleuthError::InvalidJson {
                        source_name: entry.path.display().to_string(),
                        message: e.to_string(),
                    }
                })
            });
        match loaded {
            Ok(document) => {
                let age_hours = entry.age(self.clock.now()).num_minutes() as f64 / 60.0;
                info!(
                    path = %entry.path.display(),
                    age_hours = format!("{:.1}", age_hours),
                    "using cached metadata"
                );
                Ok(Some(document))
            }
            Err(e) => {
                warn!(path = %entry.path.display(), error = %e, "ignoring unreadable cache entry");
                Ok(None)
            }
        }
    }

    /// Write a fetched document and return its path
    pub fn store(&self, app_id: &str, document: &serde_json::Value) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let stamp = self.clock.now().format(TIMESTAMP_FORMAT);
        let path = self
            .dir
            .join(format!("{}{}{}.json", app_id, FILE_MARKER, stamp));
        let content = serde_json::to_string_pretty(document).map_err(std::io::Error::from)?;
        fs::write(&path, content)?;
        info!(path = %path.display(), "cached metadata");
        Ok(path)
    }

    /// Remove cached documents (all, or one app's); returns the count removed
    pub fn clear(&self, app_id: Option<&str>) -> Result<usize> {
        let entries = self.entries(app_id)?;
        for entry in &entries {
            fs::remove_file(&entry.path)?;
        }
        Ok(entries.len())
    }

    /// Remove documents written more than `older_than_hours` ago
    pub fn prune(&self, older_than_hours: u64) -> Result<usize> {
        let now = self.clock.now();
        let cutoff = hours(older_than_hours);
        let mut count = 0;

        for entry in self.entries(None)? {
            if entry.age(now) > cutoff {
                fs::remove_file(&entry.path)?;
                count += 1;
            }
        }

        Ok(count)
    }
}
