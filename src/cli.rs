//! CLI argument definitions using clap with subcommand architecture
//!
//! Every analysis command reads one metadata document, either a local JSON
//! export (positional FILE) or the Knack API (`--app-id`), through the shared
//! [`SourceArgs`].

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::config::{ENV_API_KEY, ENV_APP_ID};
use crate::loader::LoadOptions;

/// Usage search and impact analysis for Knack application metadata
#[derive(Parser, Debug)]
#[command(name = "knack-sleuth")]
#[command(about = "Find where Knack objects and fields are used, and what a change would break")]
#[command(version)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (applies to all commands)
    #[arg(short, long, default_value = "text", value_enum, global = true)]
    pub format: OutputFormat,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (default: <config_dir>/knack-sleuth/config.toml)
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,
}

// ============================================
// Main Commands Enum
// ============================================

/// Available subcommands for knack-sleuth
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Find every usage of an object and of its fields
    #[command(visible_alias = "so")]
    SearchObject(SearchObjectArgs),

    /// Find every usage of one field
    #[command(visible_alias = "sf")]
    SearchField(SearchFieldArgs),

    /// List objects with record counts and coupling
    #[command(visible_alias = "ls")]
    ListObjects(ListObjectsArgs),

    /// Show inbound and outbound connections of one object
    ShowCoupling(ShowCouplingArgs),

    /// Estimate what changing an object or field would affect
    #[command(visible_alias = "impact")]
    ImpactAnalysis(ImpactArgs),

    /// Summarize the architecture of the whole application
    #[command(visible_alias = "summary")]
    AppSummary(SummaryArgs),

    /// Report duplicate keys and dangling references
    Validate(ValidateArgs),

    /// Download application metadata to a local JSON file
    DownloadMetadata(DownloadArgs),

    /// Manage cached metadata documents
    Cache(CacheArgs),
}

// ============================================
// Metadata Source (shared)
// ============================================

/// Where to read application metadata from
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Local metadata export (JSON); omit to fetch from the Knack API
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Knack application ID
    #[arg(long, env = ENV_APP_ID, value_name = "APP_ID")]
    pub app_id: Option<String>,

    /// Knack API key (not needed for metadata)
    #[arg(long, env = ENV_API_KEY, value_name = "KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Ignore cached API data and fetch again
    #[arg(long)]
    pub refresh: bool,

    /// Do not read or write the metadata cache
    #[arg(long)]
    pub no_cache: bool,
}

impl SourceArgs {
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            refresh: self.refresh,
            no_cache: self.no_cache,
        }
    }
}

// ============================================
// Search Subcommands
// ============================================

/// Arguments for the search-object command
#[derive(Args, Debug)]
pub struct SearchObjectArgs {
    /// Object key (e.g. object_12, case-insensitive) or object name
    #[arg(value_name = "OBJECT")]
    pub object: String,

    #[command(flatten)]
    pub source: SourceArgs,

    /// Only show object-level usages
    #[arg(long)]
    pub no_fields: bool,
}

/// Arguments for the search-field command
#[derive(Args, Debug)]
pub struct SearchFieldArgs {
    /// Field key (e.g. field_116) or field name
    #[arg(value_name = "FIELD")]
    pub field: String,

    #[command(flatten)]
    pub source: SourceArgs,
}

// ============================================
// Object Listing Subcommands
// ============================================

/// Arguments for the list-objects command
#[derive(Args, Debug)]
pub struct ListObjectsArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Sort by record count (largest first) instead of by name
    #[arg(long)]
    pub sort_by_rows: bool,
}

/// Arguments for the show-coupling command
#[derive(Args, Debug)]
pub struct ShowCouplingArgs {
    /// Object key or name
    #[arg(value_name = "OBJECT")]
    pub object: String,

    #[command(flatten)]
    pub source: SourceArgs,
}

// ============================================
// Report Subcommands
// ============================================

/// Arguments for the impact-analysis command
#[derive(Args, Debug)]
pub struct ImpactArgs {
    /// Object or field key, or a name (objects are matched first)
    #[arg(value_name = "TARGET")]
    pub target: String,

    #[command(flatten)]
    pub source: SourceArgs,

    /// Write the report to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Arguments for the app-summary command
#[derive(Args, Debug)]
pub struct SummaryArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Write the summary to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Arguments for the validate command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub source: SourceArgs,
}

// ============================================
// Download & Cache Subcommands
// ============================================

/// Arguments for the download-metadata command
#[derive(Args, Debug)]
pub struct DownloadArgs {
    /// Output file (default: <APP_ID>_metadata.json)
    #[arg(value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    /// Knack application ID
    #[arg(long, env = ENV_APP_ID, value_name = "APP_ID")]
    pub app_id: Option<String>,

    /// Ignore cached API data and fetch again
    #[arg(long)]
    pub refresh: bool,
}

/// Arguments for the cache command
#[derive(Args, Debug)]
pub struct CacheArgs {
    /// Cache operation to perform
    #[command(subcommand)]
    pub operation: CacheOperation,
}

/// Cache operations
#[derive(Subcommand, Debug)]
pub enum CacheOperation {
    /// Show cache location and cached documents
    Info,

    /// Remove cached documents
    Clear {
        /// Only remove documents of this application
        #[arg(long, value_name = "APP_ID")]
        app_id: Option<String>,
    },

    /// Remove documents older than N hours
    Prune {
        /// Age in hours
        #[arg(long)]
        hours: u64,
    },
}

/// Output format options
#[derive(Clone, Copy, Debug, Default, PartialEq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text (markdown for reports)
    #[default]
    #[value(alias = "pretty")]
    Text,
    /// TOON (Token-Oriented Object Notation) - token-efficient format for AI consumption
    Toon,
    /// JSON - standard JSON output for machine parsing
    Json,
}

// ============================================
// Helper Implementations
// ============================================

impl Cli {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
