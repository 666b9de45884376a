//! CLI command integration tests
//!
//! Each module drives one group of subcommands through the compiled binary
//! and checks text, JSON and TOON output plus exit codes.

pub mod cache_tests;
pub mod error_tests;
pub mod impact_tests;
pub mod list_tests;
pub mod search_tests;
pub mod summary_tests;
pub mod validate_tests;
