//! Custom assertions for integration tests

use serde_json::Value;

/// Assert that output is valid JSON and return parsed value
pub fn assert_valid_json(output: &str, context: &str) -> Value {
    serde_json::from_str(output).unwrap_or_else(|e| {
        panic!(
            "Expected valid JSON ({}): {}\nOutput:\n{}",
            context, e, output
        )
    })
}

/// Assert that output contains valid TOON markers
pub fn assert_valid_toon(output: &str, context: &str) {
    assert!(
        output.contains("_type:"),
        "Expected TOON output to contain '_type:' marker ({})\nOutput:\n{}",
        context,
        output
    );
}

/// Assert that JSON output has expected type
pub fn assert_json_type(json: &Value, expected_type: &str) {
    let actual_type = json["_type"]
        .as_str()
        .unwrap_or_else(|| panic!("JSON missing '_type' field"));
    assert_eq!(
        actual_type, expected_type,
        "Expected JSON type '{}' but got '{}'",
        expected_type, actual_type
    );
}

/// Assert that output contains a specific string (case-insensitive option)
pub fn assert_contains(output: &str, needle: &str, case_sensitive: bool, context: &str) {
    let found = if case_sensitive {
        output.contains(needle)
    } else {
        output.to_lowercase().contains(&needle.to_lowercase())
    };
    assert!(
        found,
        "Expected output to contain '{}' ({})\nOutput:\n{}",
        needle, context, output
    );
}

/// Assert that output does NOT contain a specific string
pub fn assert_not_contains(output: &str, needle: &str, context: &str) {
    assert!(
        !output.contains(needle),
        "Expected output NOT to contain '{}' ({})\nOutput:\n{}",
        needle,
        context,
        output
    );
}

/// Location types of a JSON usage list
pub fn location_types(usages: &Value) -> Vec<String> {
    usages
        .as_array()
        .map(|list| {
            list.iter()
                .filter_map(|u| u["location_type"].as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}
