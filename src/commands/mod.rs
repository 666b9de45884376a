//! Command modules for the knack-sleuth CLI
//!
//! ## Architecture
//!
//! Each command module implements top-level commands:
//! - `search` - Object and field usage search
//! - `objects` - Object listing and coupling
//! - `impact` - Impact analysis report
//! - `summary` - Architecture summary report
//! - `validate` - Data-quality checks
//! - `download` - Save metadata to a file
//! - `cache` - Manage cached metadata
//!
//! All command handlers take their respective `Args` struct from `cli.rs`
//! and a shared `CommandContext` for output format, verbosity and settings.
//! They return the rendered output; `main` prints it.

pub mod cache;
pub mod download;
pub mod impact;
pub mod objects;
pub mod search;
pub mod summary;
pub mod validate;

// Re-export command handlers for easy access
pub use cache::run_cache;
pub use download::run_download;
pub use impact::run_impact;
pub use objects::{run_list_objects, run_show_coupling};
pub use search::{run_search_field, run_search_object};
pub use summary::run_summary;
pub use validate::run_validate;

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::cli::{OutputFormat, SourceArgs};
use crate::config::SleuthConfig;
use crate::error::Result;
use crate::loader::{MetadataLoader, MetadataSource};
use crate::schema::{Application, KnackAppExport};

/// Heavy rule used for text banners
pub(crate) const RULE: &str = "═══════════════════════════════════════════════════════";

/// Shared context passed to all command handlers
#[derive(Debug, Clone, Default)]
pub struct CommandContext {
    /// Output format (text, toon, or json)
    pub format: OutputFormat,
    /// Show verbose output
    pub verbose: bool,
    /// Loaded configuration (file + environment)
    pub config: SleuthConfig,
}

impl CommandContext {
    /// Create a new CommandContext from CLI args
    pub fn from_cli(format: OutputFormat, verbose: bool, config: SleuthConfig) -> Self {
        Self {
            format,
            verbose,
            config,
        }
    }

    /// Load the document selected by `source`, honoring cache flags
    pub fn load_app(&self, source: &SourceArgs) -> Result<KnackAppExport> {
        let mut config = self.config.clone();
        if let Some(key) = &source.api_key {
            config.api.api_key = Some(key.clone());
        }

        let resolved = MetadataSource::resolve(source.file.clone(), source.app_id.clone(), &config)?;
        if self.verbose {
            if let MetadataSource::Api { app_id } = &resolved {
                eprintln!("Loading metadata for application {}", app_id);
            }
        }
        MetadataLoader::from_config(&config).load(&resolved, source.load_options())
    }

    /// Builder links for a set of scene keys, in key order
    pub fn builder_pages(&self, app: &Application, scene_keys: &BTreeSet<String>) -> Vec<String> {
        scene_keys
            .iter()
            .map(|key| self.config.builder_page_url(app, key))
            .collect()
    }

    /// Render `value` as JSON or TOON, or produce text with `text`
    pub fn render<F>(&self, value: &serde_json::Value, text: F) -> String
    where
        F: FnOnce() -> String,
    {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(value).unwrap_or_default(),
            OutputFormat::Toon => encode_toon(value),
            OutputFormat::Text => text(),
        }
    }
}

/// Encode a JSON value as proper TOON using the rtoon library
pub fn encode_toon(value: &serde_json::Value) -> String {
    rtoon::encode_default(value).unwrap_or_else(|e| format!("TOON encoding error: {}", e))
}

/// Serialize `value` with a leading `_type` tag
pub fn typed_json<T: Serialize>(type_name: &str, value: &T) -> serde_json::Value {
    let mut map = serde_json::Map::new();
    map.insert("_type".to_string(), serde_json::Value::from(type_name));
    match serde_json::to_value(value) {
        Ok(serde_json::Value::Object(fields)) => map.extend(fields),
        Ok(other) => {
            map.insert("value".to_string(), other);
        }
        Err(e) => {
            map.insert("error".to_string(), serde_json::Value::from(e.to_string()));
        }
    }
    serde_json::Value::Object(map)
}

/// Write `content` to `output` when given, otherwise hand it back for stdout
pub(crate) fn write_or_return(output: Option<&Path>, content: String, what: &str) -> Result<String> {
    let Some(path) = output else {
        return Ok(content);
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    info!(path = %path.display(), "wrote {}", what);
    Ok(format!("{} written to {}\n", what, path.display()))
}

/// Banner block used at the top of text output
pub(crate) fn banner(title: &str) -> String {
    format!("{}\n  {}\n{}\n\n", RULE, title, RULE)
}
