//! Tests for the `app-summary` CLI command

use std::fs;

use crate::common::{assert_contains, assert_json_type, assert_valid_json, assert_valid_toon, TestApp};

#[test]
fn test_summary_json_sections() {
    let app = TestApp::with_sample_app();
    let output = app.run_cli_success(&["app-summary", "app.json", "-f", "json"]);
    let json = assert_valid_json(&output, "app-summary");

    assert_json_type(&json, "app_summary");
    for section in [
        "application",
        "domain_model",
        "relationship_map",
        "data_patterns",
        "ui_architecture",
        "access_patterns",
        "technical_debt_indicators",
        "extensibility_assessment",
    ] {
        assert!(json.get(section).is_some(), "missing section {}", section);
    }

    let metrics = &json["application"]["complexity_metrics"];
    assert_eq!(metrics["total_objects"], 4);
    assert_eq!(metrics["total_fields"], 14);
    assert_eq!(metrics["total_scenes"], 3);
    assert_eq!(metrics["total_views"], 4);
    assert_eq!(metrics["total_records"], 1470);

    let calc = &json["data_patterns"]["calculation_complexity"];
    assert_eq!(calc["total_formula_fields"], 2);
    assert_eq!(calc["max_formula_chain_depth"], 2);

    assert_eq!(json["access_patterns"]["authentication_model"], "user_based");

    let chain = &json["ui_architecture"]["navigation_depth"]["view_chain"];
    assert_eq!(chain["max_depth"], 2);
    assert_eq!(chain["interpretation"], "Some parent-child drill-downs");
}

#[test]
fn test_summary_markdown() {
    let app = TestApp::with_sample_app();
    let output = app.run_cli_success(&["summary", "app.json"]);

    assert!(output.starts_with("# Application Summary: Field Sales"));
    assert_contains(&output, "## Technical Debt", true, "debt section");
    assert_contains(&output, "- **Formula fields**: 2", true, "formula count");
    assert_contains(&output, "- **Authentication**: user based", true, "access");
    assert_contains(&output, "- **View drill-down depth**: max 2", true, "view chain");
}

#[test]
fn test_summary_output_file() {
    let app = TestApp::with_sample_app();
    let target = app.file("summary.md");
    let output = app.run_cli_success(&["app-summary", "app.json", "--output", &target]);

    assert_contains(&output, "App summary written to", true, "confirmation");
    assert!(fs::read_to_string(&target)
        .unwrap()
        .contains("## Extensibility"));
}

#[test]
fn test_summary_toon() {
    let app = TestApp::with_sample_app();
    let output = app.run_cli_success(&["app-summary", "app.json", "-f", "toon"]);
    assert_valid_toon(&output, "app-summary toon");
}
