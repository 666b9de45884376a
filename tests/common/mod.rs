//! Common test utilities and fixtures for knack-sleuth integration tests
//!
//! This module provides:
//! - `TestApp` for writing metadata documents and running the CLI against them
//! - Custom assertions for validating CLI output

#![allow(unused_imports)]
#![allow(dead_code)]

pub mod assertions;
pub mod test_app;

pub use assertions::*;
pub use test_app::{sample_document, TestApp};
