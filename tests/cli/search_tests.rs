//! Tests for the `search-object` and `search-field` CLI commands

use crate::common::{
    assert_contains, assert_json_type, assert_not_contains, assert_valid_json, assert_valid_toon,
    location_types, TestApp,
};

// ============================================================================
// SEARCH-OBJECT
// ============================================================================

#[test]
fn test_search_object_json() {
    let app = TestApp::with_sample_app();
    let output = app.run_cli_success(&["search-object", "object_2", "app.json", "-f", "json"]);
    let json = assert_valid_json(&output, "search-object json");

    assert_json_type(&json, "object_search");
    assert_eq!(json["object"]["key"], "object_2");
    assert_eq!(json["object"]["name"], "Customers");
    assert_eq!(json["object"]["field_count"], 3);

    let kinds = location_types(&json["object_usages"]);
    assert_eq!(
        kinds,
        vec![
            "connection_outbound",
            "connection_inbound",
            "view_source",
            "view_source",
            "view_parent_source"
        ]
    );

    let fields = json["field_usages"].as_array().unwrap();
    let keys: Vec<&str> = fields
        .iter()
        .map(|f| f["field_key"].as_str().unwrap())
        .collect();
    assert_eq!(keys, vec!["field_10", "field_11", "field_12"]);
    assert_eq!(fields[0]["usage_count"], 5);
}

#[test]
fn test_search_object_by_name_case_insensitive() {
    let app = TestApp::with_sample_app();
    let output = app.run_cli_success(&["search-object", "customers", "app.json", "-f", "json"]);
    let json = assert_valid_json(&output, "search-object by name");
    assert_eq!(json["object"]["key"], "object_2");

    let output = app.run_cli_success(&["so", "OBJECT_2", "app.json", "-f", "json"]);
    let json = assert_valid_json(&output, "search-object by upper-case key");
    assert_eq!(json["object"]["key"], "object_2");
}

#[test]
fn test_search_object_text_lists_builder_pages() {
    let app = TestApp::with_sample_app();
    let output = app.run_cli_success(&["search-object", "object_2", "app.json"]);

    assert_contains(&output, "OBJECT SEARCH: Customers (object_2)", true, "banner");
    assert_contains(&output, "[view_parent_source]", true, "object usage");
    assert_contains(&output, "Company (field_10) - short_text - 5 usages", true, "field header");
    assert_contains(&output, "Builder Pages to Review: 2 scenes", true, "builder pages");
    assert_contains(
        &output,
        "https://builder.knack.com/acme/portal/pages/scene_1",
        true,
        "classic builder url",
    );
}

#[test]
fn test_search_object_no_fields() {
    let app = TestApp::with_sample_app();
    let output = app.run_cli_success(&[
        "search-object",
        "object_2",
        "app.json",
        "--no-fields",
        "-f",
        "json",
    ]);
    let json = assert_valid_json(&output, "search-object --no-fields");
    assert!(json["field_usages"].as_array().unwrap().is_empty());

    let text = app.run_cli_success(&["search-object", "object_2", "app.json", "--no-fields"]);
    assert_not_contains(&text, "Field-level usages", "no-fields text");
}

#[test]
fn test_search_object_without_usages() {
    let app = TestApp::with_sample_app();
    let output = app.run_cli_success(&["search-object", "object_1", "app.json"]);
    assert_contains(&output, "No direct object usages found", true, "empty object usages");
    assert_not_contains(&output, "Builder Pages", "no pages for unused object");
}

#[test]
fn test_search_object_toon() {
    let app = TestApp::with_sample_app();
    let output = app.run_cli_success(&["search-object", "object_3", "app.json", "-f", "toon"]);
    assert_valid_toon(&output, "search-object toon");
}

#[test]
fn test_next_gen_builder_urls() {
    let app = TestApp::with_sample_app();
    let output = app
        .run_cli_with_env(
            &["search-object", "object_2", "app.json", "-f", "json"],
            &[("KNACK_NEXT_GEN_BUILDER", "true")],
        )
        .unwrap();
    assert!(output.status.success());

    let json = assert_valid_json(&String::from_utf8_lossy(&output.stdout), "next-gen urls");
    assert_eq!(
        json["builder_pages"][0],
        "https://builder-next.knack.com/acme/portal/pages/scene_1"
    );
}

// ============================================================================
// SEARCH-FIELD
// ============================================================================

#[test]
fn test_search_field_json() {
    let app = TestApp::with_sample_app();
    let output = app.run_cli_success(&["search-field", "field_22", "app.json", "-f", "json"]);
    let json = assert_valid_json(&output, "search-field json");

    assert_json_type(&json, "field_search");
    assert_eq!(json["field"]["name"], "Amount");
    assert_eq!(json["field"]["object_key"], "object_3");
    assert_eq!(json["usage_count"], 4);
    assert_eq!(
        location_types(&json["usages"]),
        vec!["field_equation", "field_equation", "view_column", "form_input"]
    );
}

#[test]
fn test_search_field_by_name() {
    let app = TestApp::with_sample_app();
    let output = app.run_cli_success(&["sf", "Region Name", "app.json", "-f", "json"]);
    let json = assert_valid_json(&output, "search-field by name");
    assert_eq!(json["field"]["key"], "field_30");
    assert_eq!(json["usage_count"], 1);
}

#[test]
fn test_search_field_text() {
    let app = TestApp::with_sample_app();
    let output = app.run_cli_success(&["search-field", "field_21", "app.json"]);

    assert_contains(&output, "FIELD SEARCH: Customer (field_21)", true, "banner");
    assert_contains(&output, "[connection_field]", true, "connection field");
    assert_contains(&output, "[view_parent_connection]", true, "parent connection");
    assert_contains(&output, "[view_connection_key]", true, "connection key");
}
