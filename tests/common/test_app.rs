//! TestApp builder: a temp directory holding metadata documents and an
//! isolated cache, plus helpers to run the knack-sleuth binary in it.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::{json, Value};
use tempfile::TempDir;

/// Sales app used across CLI tests.
///
/// Objects: Accounts (user role), Customers, Orders, Regions.
/// Orders -> Customers via field_21, Customers -> Regions via field_11.
/// field_23 and field_24 are equations over field_22.
pub fn sample_document() -> Value {
    json!({
        "application": {
            "id": "app_123",
            "name": "Field Sales",
            "slug": "field-sales",
            "account": {"slug": "acme"},
            "counts": {"object_1": 12, "object_2": 250, "object_3": 1200, "object_4": 8},
            "objects": [
                {
                    "key": "object_1",
                    "name": "Accounts",
                    "user": true,
                    "profile_key": "profile_1",
                    "identifier": "field_1",
                    "fields": [
                        {"key": "field_1", "name": "Name", "type": "name"},
                        {"key": "field_2", "name": "Email", "type": "email"},
                        {"key": "field_3", "name": "Password", "type": "password"}
                    ]
                },
                {
                    "key": "object_2",
                    "name": "Customers",
                    "identifier": "field_10",
                    "sort": {"field": "field_10", "order": "asc"},
                    "connections": {
                        "inbound": [{"key": "field_21", "name": "Customer", "object": "object_3",
                                     "has": "one", "belongs_to": "many"}],
                        "outbound": [{"key": "field_11", "name": "Region", "object": "object_4",
                                      "has": "one", "belongs_to": "many"}]
                    },
                    "fields": [
                        {"key": "field_10", "name": "Company", "type": "short_text"},
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
                        "outbound": [{"key": "field_21", "name": "Customer", "object": "object_2",
                                      "has": "one", "belongs_to": "many"}]
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
                        "inbound": [{"key": "field_11", "name": "Region", "object": "object_2",
                                     "has": "one", "belongs_to": "many"}],
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
                    "name": "Customer List",
                    "slug": "customers",
                    "authenticated": true,
                    "views": [
                        {"key": "view_1", "name": "Customer Table", "type": "table",
                         "source": {"object": "object_2",
                                    "sort": [{"field": "field_10", "order": "asc"}]},
                         "columns": [
                             {"type": "field", "header": "Company", "field": {"key": "field_10"}},
                             {"type": "field", "header": "Region", "field": {"key": "field_11"}}
                         ]},
                        {"key": "view_2", "name": "Add Customer", "type": "form",
                         "source": {"object": "object_2"},
                         "inputs": [{"key": "field_10"}, {"key": "field_12"}]}
                    ]
                },
                {
                    "key": "scene_2",
                    "name": "Customer Details",
                    "slug": "customer-details",
                    "parent": "customers",
                    "authenticated": true,
                    "views": [
                        {"key": "view_3", "name": "Customer Orders", "type": "table",
                         "source": {"object": "object_3",
                                    "parent_source": {"object": "object_2", "connection": "field_21"}},
                         "columns": [
                             {"type": "field", "header": "Order #", "field": {"key": "field_20"}},
                             {"type": "field", "header": "Amount", "field": {"key": "field_22"}},
                             {"type": "field", "header": "Total", "field": {"key": "field_24"}}
                         ]}
                    ]
                },
                {
                    "key": "scene_3",
                    "name": "Public Orders",
                    "slug": "public-orders",
                    "views": [
                        {"key": "view_5", "name": "Place Order", "type": "form",
                         "source": {"object": "object_3", "connection_key": "field_21"},
                         "inputs": [{"key": "field_22"}, {"key": "field_25"}]}
                    ]
                }
            ]
        }
    })
}

/// Temporary working directory with an isolated cache and config location
pub struct TestApp {
    dir: TempDir,
}

impl TestApp {
    /// Create an empty working directory
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    /// Working directory holding `app.json`
    pub fn with_sample_app() -> Self {
        let app = Self::new();
        app.add_document("app.json", &sample_document());
        app
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Absolute path of a file in the working directory
    pub fn file(&self, relative_path: &str) -> String {
        self.dir.path().join(relative_path).to_string_lossy().to_string()
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.dir.path().join("cache")
    }

    /// Write a text file
    pub fn add_file(&self, relative_path: &str, content: &str) -> &Self {
        let full_path = self.dir.path().join(relative_path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        fs::write(&full_path, content).expect("Failed to write file");
        self
    }

    /// Write a JSON metadata document
    pub fn add_document(&self, relative_path: &str, document: &Value) -> &Self {
        let content = serde_json::to_string_pretty(document).expect("Failed to encode document");
        self.add_file(relative_path, &content)
    }

    /// Run the knack-sleuth binary and return its output
    pub fn run_cli(&self, args: &[&str]) -> std::io::Result<Output> {
        self.run_cli_with_env(args, &[])
    }

    /// Run the binary with extra environment variables
    pub fn run_cli_with_env(&self, args: &[&str], env: &[(&str, &str)]) -> std::io::Result<Output> {
        let mut command = Command::new(env!("CARGO_BIN_EXE_knack-sleuth"));
        command
            .current_dir(self.path())
            .args(args)
            .env("KNACK_SLEUTH_CACHE_DIR", self.cache_dir())
            .env("XDG_CONFIG_HOME", self.dir.path().join("config"))
            .env_remove("KNACK_APP_ID")
            .env_remove("KNACK_API_KEY")
            .env_remove("KNACK_NEXT_GEN_BUILDER")
            .env_remove("RUST_LOG");
        for (name, value) in env {
            command.env(name, value);
        }
        command.output()
    }

    /// Run CLI and expect success, return stdout
    pub fn run_cli_success(&self, args: &[&str]) -> String {
        let output = self.run_cli(args).expect("Failed to run CLI");
        assert!(
            output.status.success(),
            "CLI command {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).to_string()
    }

    /// Run CLI and expect failure, return (stdout, stderr, exit code)
    pub fn run_cli_failure(&self, args: &[&str]) -> (String, String, Option<i32>) {
        let output = self.run_cli(args).expect("Failed to run CLI");
        assert!(
            !output.status.success(),
            "CLI command {:?} should have failed",
            args
        );
        (
            String::from_utf8_lossy(&output.stdout).to_string(),
            String::from_utf8_lossy(&output.stderr).to_string(),
            output.status.code(),
        )
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}
