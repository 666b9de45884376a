//! Tests for the `validate` CLI command

use serde_json::json;

use crate::common::{assert_contains, assert_json_type, assert_valid_json, sample_document, TestApp};

#[test]
fn test_validate_clean_document() {
    let app = TestApp::with_sample_app();
    let output = app.run_cli_success(&["validate", "app.json", "-f", "json"]);
    let json = assert_valid_json(&output, "validate clean");

    assert_json_type(&json, "validation");
    assert_eq!(json["valid"], true);
    assert_eq!(json["errors"], 0);
    assert_eq!(json["warnings"], 0);
}

#[test]
fn test_validate_warnings_do_not_fail() {
    let app = TestApp::new();
    let mut document = sample_document();
    document["application"]["objects"][3]["identifier"] = json!("field_99");
    app.add_document("app.json", &document);

    let output = app.run_cli_success(&["validate", "app.json", "-f", "json"]);
    let json = assert_valid_json(&output, "validate warnings");
    assert_eq!(json["valid"], true);
    assert_eq!(json["warnings"], 1);
    assert_eq!(json["issues"][0]["code"], "missing_identifier_field");
    assert_eq!(json["issues"][0]["severity"], "warning");
}

#[test]
fn test_validate_duplicate_keys_fail() {
    let app = TestApp::new();
    let mut document = sample_document();
    let duplicate = json!({"key": "field_22", "name": "Amount Copy", "type": "currency"});
    document["application"]["objects"][3]["fields"]
        .as_array_mut()
        .unwrap()
        .push(duplicate);
    app.add_document("app.json", &document);

    let (stdout, stderr, code) = app.run_cli_failure(&["validate", "app.json"]);
    assert_eq!(code, Some(6));
    assert_contains(&stdout, "duplicate_field_key", true, "report still printed");
    assert_contains(&stderr, "Validation failed with 1 error-level issue(s)", true, "error");
}
