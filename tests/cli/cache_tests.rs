//! Tests for the `cache` CLI command and cache-backed API loading
//!
//! No test reaches the network: API-sourced commands are served from a fresh
//! cache entry written beforehand.

use std::fs;

use chrono::{Duration, Utc};

use crate::common::{assert_contains, assert_json_type, assert_valid_json, sample_document, TestApp};

/// Write a cache entry for `app_id` stamped `age_hours` in the past
fn seed_cache(app: &TestApp, app_id: &str, age_hours: i64) -> String {
    let stamp = (Utc::now() - Duration::hours(age_hours)).format("%Y%m%d%H%M");
    let name = format!("{}_app_metadata_{}.json", app_id, stamp);
    fs::create_dir_all(app.cache_dir()).unwrap();
    fs::write(
        app.cache_dir().join(&name),
        serde_json::to_string(&sample_document()).unwrap(),
    )
    .unwrap();
    name
}

#[test]
fn test_cache_info_empty() {
    let app = TestApp::new();
    let output = app.run_cli_success(&["cache", "info", "-f", "json"]);
    let json = assert_valid_json(&output, "cache info");

    assert_json_type(&json, "cache_info");
    assert_eq!(json["cached_documents"], 0);
    assert_eq!(json["max_age_hours"], 24);
}

#[test]
fn test_cache_info_lists_entries() {
    let app = TestApp::new();
    seed_cache(&app, "app_123", 1);
    seed_cache(&app, "app_456", 48);

    let output = app.run_cli_success(&["cache", "info", "-f", "json"]);
    let json = assert_valid_json(&output, "cache info with entries");
    assert_eq!(json["cached_documents"], 2);

    let fresh: Vec<(String, bool)> = json["documents"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| {
            (
                d["app_id"].as_str().unwrap().to_string(),
                d["fresh"].as_bool().unwrap(),
            )
        })
        .collect();
    assert!(fresh.contains(&("app_123".to_string(), true)));
    assert!(fresh.contains(&("app_456".to_string(), false)));
}

#[test]
fn test_cache_clear_one_app() {
    let app = TestApp::new();
    seed_cache(&app, "app_123", 1);
    seed_cache(&app, "app_456", 1);

    let output = app.run_cli_success(&["cache", "clear", "--app-id", "app_456"]);
    assert_eq!(output, "Removed 1 cached documents for app_456\n");

    let output = app.run_cli_success(&["cache", "clear", "-f", "json"]);
    let json = assert_valid_json(&output, "cache clear");
    assert_json_type(&json, "cache_clear");
    assert_eq!(json["removed"], 1);
}

#[test]
fn test_cache_prune() {
    let app = TestApp::new();
    seed_cache(&app, "app_123", 1);
    seed_cache(&app, "app_123", 30);

    let output = app.run_cli_success(&["cache", "prune", "--hours", "12"]);
    assert_contains(&output, "Pruned 1 cached documents older than 12 hours", true, "prune");
    assert_eq!(fs::read_dir(app.cache_dir()).unwrap().count(), 1);
}

#[test]
fn test_app_id_served_from_fresh_cache() {
    let app = TestApp::new();
    seed_cache(&app, "app_123", 2);

    let output = app.run_cli_success(&[
        "search-object",
        "object_2",
        "--app-id",
        "app_123",
        "-f",
        "json",
    ]);
    let json = assert_valid_json(&output, "search from cache");
    assert_eq!(json["object"]["name"], "Customers");
}

#[test]
fn test_app_id_from_environment() {
    let app = TestApp::new();
    seed_cache(&app, "app_env", 2);

    let output = app
        .run_cli_with_env(&["list-objects", "-f", "json"], &[("KNACK_APP_ID", "app_env")])
        .unwrap();
    assert!(output.status.success());
    let json = assert_valid_json(&String::from_utf8_lossy(&output.stdout), "env app id");
    assert_eq!(json["totals"]["objects"], 4);
}

#[test]
fn test_download_from_cache() {
    let app = TestApp::new();
    seed_cache(&app, "app_123", 2);

    let output = app.run_cli_success(&["download-metadata", "--app-id", "app_123", "-f", "json"]);
    let json = assert_valid_json(&output, "download");
    assert_json_type(&json, "download");
    assert_eq!(json["application"], "Field Sales");

    let written = fs::read_to_string(app.path().join("app_123_metadata.json")).unwrap();
    let document = assert_valid_json(&written, "downloaded document");
    assert_eq!(document["application"]["id"], "app_123");
}
