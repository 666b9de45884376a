//! knack-sleuth: usage search and impact analysis for Knack applications
//!
//! This library reads the metadata export of a Knack application (objects,
//! fields, connections, scenes and views) and answers three kinds of
//! question:
//!
//! - where is an object or field used ([`Sleuth::search_object`],
//!   [`Sleuth::search_field`])
//! - what would a change to it break ([`Sleuth::analyze_impact`])
//! - what does the application look like as a whole
//!   ([`Sleuth::generate_app_summary`])
//!
//! Everything works on a borrowed, read-only snapshot of the document.
//!
//! # Example
//!
//! ```ignore
//! use knack_sleuth::{load_file, Sleuth};
//! use std::path::Path;
//!
//! let export = load_file(Path::new("app_metadata.json"))?;
//! let sleuth = Sleuth::new(&export.application);
//!
//! let report = sleuth.analyze_impact("object_2", None)?;
//! println!("{}", report.risk_assessment.breaking_change_likelihood);
//! ```

pub mod analysis;
pub mod cache;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod impact;
pub mod index;
pub mod interpret;
pub mod loader;
pub mod quality;
pub mod risk;
pub mod schema;
pub mod search;

#[cfg(test)]
mod fixtures;

// Re-exports for convenience
pub use analysis::{AppSummary, ObjectCoupling};
pub use cache::{Clock, MetadataCache, SystemClock};
pub use cli::{Cli, OutputFormat};
pub use config::SleuthConfig;
pub use error::{Result, SleuthError};
pub use impact::{ImpactError, ImpactReport, TargetType};
pub use index::MetadataIndex;
pub use loader::{load_file, HttpFetcher, LoadOptions, MetadataFetcher, MetadataLoader, MetadataSource};
pub use quality::{DataQualityIssue, Severity};
pub use risk::{RiskLevel, RiskPolicy};
pub use schema::{Application, Field, FieldType, KnackAppExport, Object, Scene, View};
pub use search::{LocationKind, ObjectSearch, Sleuth, Usage};
