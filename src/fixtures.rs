//! Shared metadata documents for unit tests

use serde_json::{json, Value};

use crate::schema::KnackAppExport;

/// Small sales app: accounts (user role), customers, orders, regions.
///
/// - `object_3` Orders connects to `object_2` Customers via `field_21`
/// - `object_2` Customers connects to `object_4` Regions via `field_11`
/// - `field_23` and `field_24` are equations over `field_22`
/// - `field_1`..`field_3` and `field_26` are never referenced
pub fn sample_document() -> Value {
    json!({
        "application": {
            "id": "app_123",
            "name": "Field Sales",
            "slug": "field-sales",
            "description": "Orders and customers",
            "account": {"slug": "acme", "name": "Acme"},
            "home_scene": {"key": "scene_1", "slug": "customers"},
            "counts": {
                "object_1": 12,
                "object_2": 250,
                "object_3": 1200,
                "object_4": 8,
                "total_entries": 1470
            },
            "objects": [
                {
                    "key": "object_1",
                    "name": "Accounts",
                    "user": true,
                    "profile_key": "profile_1",
                    "identifier": "field_1",
                    "fields": [
                        {"key": "field_1", "name": "Name", "type": "name"},
                        {"key": "field_2", "name": "Email", "type": "email", "unique": true},
                        {"key": "field_3", "name": "Password", "type": "password"}
                    ]
                },
                {
                    "key": "object_2",
                    "name": "Customers",
                    "identifier": "field_10",
                    "sort": {"field": "field_10", "order": "asc"},
                    "connections": {
                        "inbound": [
                            {"key": "field_21", "name": "Customer", "object": "object_3",
                             "has": "one", "belongs_to": "many"}
                        ],
                        "outbound": [
                            {"key": "field_11", "name": "Region", "object": "object_4",
                             "has": "one", "belongs_to": "many"}
                        ]
                    },
                    "fields": [
                        {"key": "field_10", "name": "Company", "type": "short_text", "required": true},
                        {"key": "field_11", "name": "Region", "type": "connection",
                         "relationship": {"has": "one", "object": "object_4", "belongs_to": "many"}},
                        {"key": "field_12", "name": "Tier", "type": "multiple_choice"}
                    ]
                },
                {
                    "key": "object_3",
                    "name": "Orders",
                    "identifier": "field_20",
                    "connections": {
                        "inbound": [],
                        "outbound": [
                            {"key": "field_21", "name": "Customer", "object": "object_2",
                             "has": "one", "belongs_to": "many"}
                        ]
                    },
                    "fields": [
                        {"key": "field_20", "name": "Order Number", "type": "auto_increment"},
                        {"key": "field_21", "name": "Customer", "type": "connection",
                         "relationship": {"has": "one", "object": "object_2", "belongs_to": "many"}},
                        {"key": "field_22", "name": "Amount", "type": "currency"},
                        {"key": "field_23", "name": "Tax", "type": "equation",
                         "format": {"equation": "{field_22} * 0.2"}},
                        {"key": "field_24", "name": "Total", "type": "equation",
                         "format": {"equation": "{field_22} + {field_23}"}},
                        {"key": "field_25", "name": "Status", "type": "multiple_choice"},
                        {"key": "field_26", "name": "Notes", "type": "paragraph_text"}
                    ]
                },
                {
                    "key": "object_4",
                    "name": "Regions",
                    "identifier": "field_30",
                    "connections": {
                        "inbound": [
                            {"key": "field_11", "name": "Region", "object": "object_2",
                             "has": "one", "belongs_to": "many"}
                        ],
                        "outbound": []
                    },
                    "fields": [
                        {"key": "field_30", "name": "Region Name", "type": "short_text"}
                    ]
                }
            ],
            "scenes": [
                {
                    "key": "scene_1",
                    "name": "Customers",
                    "slug": "customers",
                    "authenticated": true,
                    "groups": ["profile_1"],
                    "views": [
                        {
                            "key": "view_1",
                            "name": "Customer Table",
                            "type": "table",
                            "source": {"object": "object_2",
                                       "sort": [{"field": "field_10", "order": "asc"}]},
                            "columns": [
                                {"type": "field", "header": "Company", "field": {"key": "field_10"}},
                                {"type": "field", "header": "Region", "field": {"key": "field_11"}},
                                {"type": "link", "header": "View"}
                            ]
                        },
                        {
                            "key": "view_2",
                            "name": "Add Customer",
                            "type": "form",
                            "source": {"object": "object_2"},
                            "inputs": [
                                {"key": "field_10", "type": "short_text"},
                                {"key": "field_12", "type": "multiple_choice"}
                            ]
                        }
                    ]
                },
                {
                    "key": "scene_2",
                    "name": "Customer Details",
                    "slug": "customer-details",
                    "parent": "customers",
                    "authenticated": true,
                    "views": [
                        {
                            "key": "view_3",
                            "name": "Customer Orders",
                            "type": "table",
                            "source": {
                                "object": "object_3",
                                "parent_source": {"object": "object_2", "connection": "field_21"}
                            },
                            "columns": [
                                {"type": "field", "header": "Order #", "field": {"key": "field_20"}},
                                {"type": "field", "header": "Amount", "field": {"key": "field_22"}},
                                {"type": "field", "header": "Total", "field": {"key": "field_24"}}
                            ]
                        },
                        {
                            "key": "view_4",
                            "name": "Customer Info",
                            "type": "details",
                            "source": {"object": "object_2"}
                        }
                    ]
                },
                {
                    "key": "scene_3",
                    "name": "Public Orders",
                    "slug": "public-orders",
                    "authenticated": false,
                    "views": [
                        {
                            "key": "view_5",
                            "name": "Place Order",
                            "type": "form",
                            "source": {"object": "object_3", "connection_key": "field_21"},
                            "inputs": [
                                {"key": "field_22", "type": "currency"},
                                {"key": "field_25", "type": "multiple_choice"}
                            ]
                        }
                    ]
                },
                {
                    "key": "scene_4",
                    "name": "Login",
                    "slug": "login",
                    "views": [
                        {"key": "view_6", "name": "Login", "type": "login"}
                    ]
                }
            ]
        }
    })
}

pub fn sample_export() -> KnackAppExport {
    KnackAppExport::from_value(sample_document()).expect("fixture parses")
}

/// Build an export from a list of objects and scenes
pub fn export_with(objects: Value, scenes: Value, counts: Value) -> KnackAppExport {
    KnackAppExport::from_value(json!({
        "application": {
            "id": "app_test",
            "name": "Test App",
            "slug": "test-app",
            "objects": objects,
            "scenes": scenes,
            "counts": counts
        }
    }))
    .expect("fixture parses")
}

/// Object JSON with plain short_text fields
pub fn object(key: &str, name: &str, field_keys: &[&str]) -> Value {
    let fields: Vec<Value> = field_keys
        .iter()
        .map(|k| json!({"key": k, "name": format!("{} {}", name, k), "type": "short_text"}))
        .collect();
    json!({"key": key, "name": name, "fields": fields})
}

/// Outbound / inbound connection entry
pub fn connection(field_key: &str, other_object: &str) -> Value {
    json!({
        "key": field_key,
        "name": format!("Link {}", field_key),
        "object": other_object,
        "has": "one",
        "belongs_to": "many"
    })
}
