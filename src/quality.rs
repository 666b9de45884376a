//! Data-quality checks over a metadata document
//!
//! The search and analysis code tolerates every anomaly reported here;
//! validation only makes them visible.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::analysis::formula_references;
use crate::schema::Application;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One anomaly found in the document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataQualityIssue {
    pub severity: Severity,
    /// Stable machine-readable code, e.g. `duplicate_field_key`
    pub code: &'static str,
    /// Key of the object, field or view the issue is about
    pub subject: String,
    pub message: String,
}

impl DataQualityIssue {
    fn error(code: &'static str, subject: &str, message: String) -> Self {
        Self {
            severity: Severity::Error,
            code,
            subject: subject.to_string(),
            message,
        }
    }

    fn warning(code: &'static str, subject: &str, message: String) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            subject: subject.to_string(),
            message,
        }
    }
}

impl Application {
    /// Report duplicate keys and dangling references
    pub fn validate(&self) -> Vec<DataQualityIssue> {
        let mut issues = Vec::new();

        let mut object_seen: HashMap<&str, usize> = HashMap::new();
        for obj in &self.objects {
            *object_seen.entry(obj.key.as_str()).or_insert(0) += 1;
        }
        let mut field_owners: HashMap<&str, Vec<&str>> = HashMap::new();
        for obj in &self.objects {
            for field in &obj.fields {
                field_owners
                    .entry(field.key.as_str())
                    .or_default()
                    .push(obj.key.as_str());
            }
        }

        let mut reported: HashSet<&str> = HashSet::new();
        for obj in &self.objects {
            if object_seen[obj.key.as_str()] > 1 && reported.insert(obj.key.as_str()) {
                issues.push(DataQualityIssue::error(
                    "duplicate_object_key",
                    &obj.key,
                    format!(
                        "Object key {} is declared {} times",
                        obj.key,
                        object_seen[obj.key.as_str()]
                    ),
                ));
            }
        }

        let mut reported: HashSet<&str> = HashSet::new();
        for obj in &self.objects {
            for field in &obj.fields {
                let owners = &field_owners[field.key.as_str()];
                if owners.len() > 1 && reported.insert(field.key.as_str()) {
                    issues.push(DataQualityIssue::error(
                        "duplicate_field_key",
                        &field.key,
                        format!(
                            "Field key {} is declared {} times (objects: {})",
                            field.key,
                            owners.len(),
                            owners.join(", ")
                        ),
                    ));
                }
            }
        }

        for obj in &self.objects {
            if let Some(identifier) = obj.identifier.as_deref().filter(|i| !i.is_empty()) {
                if obj.field(identifier).is_none() {
                    issues.push(DataQualityIssue::warning(
                        "missing_identifier_field",
                        &obj.key,
                        format!(
                            "Identifier {} of {} ({}) is not one of its fields",
                            identifier, obj.name, obj.key
                        ),
                    ));
                }
            }

            if let Some(sort) = obj.sort.as_ref().filter(|s| !s.field.is_empty()) {
                if obj.field(&sort.field).is_none() {
                    issues.push(DataQualityIssue::warning(
                        "missing_sort_field",
                        &obj.key,
                        format!(
                            "Sort field {} of {} ({}) is not one of its fields",
                            sort.field, obj.name, obj.key
                        ),
                    ));
                }
            }

            for conn in obj.outbound().iter().chain(obj.inbound()) {
                if !object_seen.contains_key(conn.object.as_str()) {
                    issues.push(DataQualityIssue::warning(
                        "unknown_connection_target",
                        &conn.key,
                        format!(
                            "Connection {} on {} points at unknown object {}",
                            conn.key, obj.key, conn.object
                        ),
                    ));
                }
            }

            for field in &obj.fields {
                let Some(equation) = field.equation() else {
                    continue;
                };
                for reference in formula_references(&equation) {
                    if !field_owners.contains_key(reference.as_str()) {
                        issues.push(DataQualityIssue::warning(
                            "unknown_formula_reference",
                            &field.key,
                            format!(
                                "Equation of {} ({}) references unknown field {}",
                                field.name, field.key, reference
                            ),
                        ));
                    }
                }
            }
        }

        for (scene, view) in self.views() {
            let Some(source) = &view.source else {
                continue;
            };
            let parent = source.parent_source.as_ref().map(|p| p.object.as_str());
            for target in std::iter::once(source.object.as_str()).chain(parent) {
                if !target.is_empty() && !object_seen.contains_key(target) {
                    issues.push(DataQualityIssue::warning(
                        "unknown_view_source",
                        &view.key,
                        format!(
                            "View {} in scene {} reads from unknown object {}",
                            view.key, scene.key, target
                        ),
                    ));
                }
            }
        }

        debug!(issues = issues.len(), "validation finished");
        issues
    }
}

/// True when any issue is error-level
pub fn has_errors(issues: &[DataQualityIssue]) -> bool {
    issues.iter().any(|i| i.severity == Severity::Error)
}
