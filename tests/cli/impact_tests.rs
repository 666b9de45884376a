//! Tests for the `impact-analysis` CLI command

use std::fs;

use crate::common::{assert_contains, assert_json_type, assert_valid_json, TestApp};

#[test]
fn test_object_impact_json() {
    let app = TestApp::with_sample_app();
    let output = app.run_cli_success(&["impact-analysis", "object_2", "app.json", "-f", "json"]);
    let json = assert_valid_json(&output, "object impact");

    assert_json_type(&json, "impact_analysis");
    assert_eq!(json["target"]["type"], "object");
    assert_eq!(json["target"]["name"], "Customers");

    let direct = &json["direct_impacts"];
    assert_eq!(direct["connections"].as_array().unwrap().len(), 2);
    assert_eq!(direct["views"].as_array().unwrap().len(), 3);
    assert_eq!(direct["forms"].as_array().unwrap().len(), 2);
    assert!(direct["formulas"].as_array().unwrap().is_empty());

    assert_eq!(json["metadata"]["total_direct_impacts"], 7);
    assert_eq!(json["metadata"]["total_cascade_impacts"], 3);
    assert_eq!(json["risk_assessment"]["breaking_change_likelihood"], "medium");
    assert_eq!(
        json["cascade_impacts"]["affected_scenes"],
        serde_json::json!(["scene_1", "scene_2"])
    );
}

#[test]
fn test_field_impact_by_name() {
    let app = TestApp::with_sample_app();
    let output = app.run_cli_success(&["impact", "Amount", "app.json", "-f", "json"]);
    let json = assert_valid_json(&output, "field impact");

    assert_eq!(json["target"]["key"], "field_22");
    assert_eq!(json["target"]["type"], "field");
    assert_eq!(json["target"]["name"], "Orders.Amount");
    assert_eq!(json["direct_impacts"]["formulas"].as_array().unwrap().len(), 2);
    assert_eq!(json["direct_impacts"]["forms"].as_array().unwrap().len(), 1);
    assert_eq!(json["direct_impacts"]["views"].as_array().unwrap().len(), 1);
    assert_eq!(json["risk_assessment"]["breaking_change_likelihood"], "medium");
}

#[test]
fn test_unused_field_has_no_risk() {
    let app = TestApp::with_sample_app();
    let output = app.run_cli_success(&["impact-analysis", "field_26", "app.json", "-f", "json"]);
    let json = assert_valid_json(&output, "unused field impact");

    assert_eq!(json["risk_assessment"]["breaking_change_likelihood"], "none");
    assert_eq!(json["metadata"]["total_direct_impacts"], 0);
    assert!(json["builder_pages"].as_array().unwrap().is_empty());
}

#[test]
fn test_impact_markdown_report() {
    let app = TestApp::with_sample_app();
    let output = app.run_cli_success(&["impact-analysis", "field_22", "app.json"]);

    assert!(output.starts_with("# Impact Analysis: Orders.Amount"));
    assert_contains(&output, "- **Breaking change likelihood**: medium", true, "risk");
    assert_contains(&output, "### Formulas (2)", true, "formula heading");
    assert_contains(&output, "`{field_22} * 0.2`", true, "equation");
    assert_contains(&output, "## Builder Pages to Review", true, "builder pages");
}

#[test]
fn test_impact_output_file() {
    let app = TestApp::with_sample_app();
    let report = app.file("reports/customers.md");
    let output = app.run_cli_success(&["impact-analysis", "object_2", "app.json", "-o", &report]);

    assert_contains(&output, "Impact analysis written to", true, "confirmation");
    let written = fs::read_to_string(&report).unwrap();
    assert!(written.starts_with("# Impact Analysis: Customers"));
}

#[test]
fn test_impact_unknown_target() {
    let app = TestApp::with_sample_app();
    let (_, stderr, code) = app.run_cli_failure(&["impact-analysis", "Invoices", "app.json"]);

    assert_eq!(code, Some(2));
    assert_contains(&stderr, "Object or field not found: Invoices", true, "not found");
}

#[test]
fn test_custom_risk_thresholds_from_config() {
    let app = TestApp::with_sample_app();
    app.add_file("sleuth.toml", "[risk]\nlow_max = 1\nmedium_max = 2\n");

    let output = app.run_cli_success(&[
        "--config",
        "sleuth.toml",
        "impact-analysis",
        "field_22",
        "app.json",
        "-f",
        "json",
    ]);
    let json = assert_valid_json(&output, "impact with config");
    assert_eq!(json["risk_assessment"]["breaking_change_likelihood"], "high");
}
