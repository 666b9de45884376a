//! Tests for the `list-objects` and `show-coupling` CLI commands

use crate::common::{assert_contains, assert_json_type, assert_valid_json, TestApp};

#[test]
fn test_list_objects_json_sorted_by_name() {
    let app = TestApp::with_sample_app();
    let output = app.run_cli_success(&["list-objects", "app.json", "-f", "json"]);
    let json = assert_valid_json(&output, "list-objects");

    assert_json_type(&json, "object_list");
    let names: Vec<&str> = json["objects"]
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Accounts", "Customers", "Orders", "Regions"]);

    let totals = &json["totals"];
    assert_eq!(totals["objects"], 4);
    assert_eq!(totals["record_count"], 1470);
    assert_eq!(totals["field_count"], 14);
    assert_eq!(totals["afferent"], 2);
    assert_eq!(totals["efferent"], 2);
}

#[test]
fn test_list_objects_sort_by_rows() {
    let app = TestApp::with_sample_app();
    let output = app.run_cli_success(&["ls", "app.json", "--sort-by-rows", "-f", "json"]);
    let json = assert_valid_json(&output, "list-objects --sort-by-rows");

    let keys: Vec<&str> = json["objects"]
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["object_key"].as_str().unwrap())
        .collect();
    assert_eq!(keys, vec!["object_3", "object_2", "object_1", "object_4"]);
}

#[test]
fn test_list_objects_text_table() {
    let app = TestApp::with_sample_app();
    let output = app.run_cli_success(&["list-objects", "app.json"]);

    assert_contains(&output, "OBJECTS: Field Sales", true, "banner");
    assert_contains(&output, "KEY", true, "header");
    assert_contains(&output, "4 objects", true, "totals row");
    assert_contains(&output, "1470", true, "record total");
}

#[test]
fn test_show_coupling() {
    let app = TestApp::with_sample_app();
    let output = app.run_cli_success(&["show-coupling", "Customers", "app.json", "-f", "json"]);
    let json = assert_valid_json(&output, "show-coupling");

    assert_json_type(&json, "object_coupling");
    assert_eq!(json["afferent"], 1);
    assert_eq!(json["efferent"], 1);
    assert_eq!(json["instability"], 0.5);
    assert_eq!(json["inbound"][0]["object_name"], "Orders");
    assert_eq!(json["outbound"][0]["object_name"], "Regions");
    assert_eq!(json["outbound"][0]["relationship"], "one to many");
}

#[test]
fn test_show_coupling_text() {
    let app = TestApp::with_sample_app();
    let output = app.run_cli_success(&["show-coupling", "object_4", "app.json"]);

    assert_contains(&output, "COUPLING: Regions (object_4)", true, "banner");
    assert_contains(&output, "Afferent coupling (Ca): 1", true, "afferent");
    assert_contains(&output, "← Customers (object_2) via field_11 'Region'", true, "inbound line");
    assert_contains(&output, "Instability: 0.00", true, "instability");
}
