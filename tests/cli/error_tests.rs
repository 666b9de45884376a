//! Error reporting and exit codes

use crate::common::{assert_contains, TestApp};

#[test]
fn test_missing_file_exit_code() {
    let app = TestApp::new();
    let (_, stderr, code) = app.run_cli_failure(&["list-objects", "absent.json"]);

    assert_eq!(code, Some(1));
    assert_contains(&stderr, "Error: File not found", true, "missing file");
}

#[test]
fn test_unknown_object_exit_code() {
    let app = TestApp::with_sample_app();
    let (stdout, stderr, code) = app.run_cli_failure(&["search-object", "Invoices", "app.json"]);

    assert_eq!(code, Some(2));
    assert!(stdout.is_empty());
    assert_contains(&stderr, "Object not found: Invoices", true, "unknown object");
}

#[test]
fn test_unknown_field_exit_code() {
    let app = TestApp::with_sample_app();
    let (_, stderr, code) = app.run_cli_failure(&["search-field", "field_999", "app.json"]);

    assert_eq!(code, Some(2));
    assert_contains(&stderr, "Field not found: field_999", true, "unknown field");
}

#[test]
fn test_invalid_json_exit_code() {
    let app = TestApp::new();
    app.add_file("broken.json", "{ \"application\": ");

    let (_, stderr, code) = app.run_cli_failure(&["app-summary", "broken.json"]);
    assert_eq!(code, Some(3));
    assert_contains(&stderr, "Invalid JSON", true, "invalid json");
}

#[test]
fn test_wrong_shape_exit_code() {
    let app = TestApp::new();
    app.add_file("shape.json", r#"{"objects": []}"#);

    let (_, stderr, code) = app.run_cli_failure(&["validate", "shape.json"]);
    assert_eq!(code, Some(3));
    assert_contains(&stderr, "Invalid metadata document", true, "wrong shape");
}

#[test]
fn test_missing_app_id_exit_code() {
    let app = TestApp::new();
    let (_, stderr, code) = app.run_cli_failure(&["list-objects"]);

    assert_eq!(code, Some(5));
    assert_contains(&stderr, "No application id given", true, "missing app id");
}

#[test]
fn test_unparsable_config_exit_code() {
    let app = TestApp::with_sample_app();
    app.add_file("bad.toml", "[risk\nlow_max = ");

    let (_, stderr, code) =
        app.run_cli_failure(&["--config", "bad.toml", "list-objects", "app.json"]);
    assert_eq!(code, Some(5));
    assert_contains(&stderr, "Configuration error", true, "bad config");
}
