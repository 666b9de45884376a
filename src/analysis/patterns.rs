//! Temporal and calculation patterns

use std::collections::{BTreeSet, HashMap};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::interpret::FORMULA_DEPENDENCIES;
use crate::schema::{Application, Field, FieldType, Object};

/// Guard against pathological equation chains
const MAX_CHAIN_DEPTH: usize = 64;

static BRACED_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([^{}]+)\}").expect("valid token pattern"));
static FIELD_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^field_\d+$").expect("valid field key pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecyclePattern {
    /// Has a status-like field
    StatefulEntity,
    Timestamped,
}

#[derive(Debug, Clone, Serialize)]
pub struct TemporalObject {
    pub object: String,
    pub object_key: String,
    pub has_created_date: bool,
    pub has_modified_date: bool,
    pub has_status_field: bool,
    pub lifecycle_pattern: LifecyclePattern,
}

#[derive(Debug, Clone, Serialize)]
pub struct CalculationComplexity {
    pub total_formula_fields: usize,
    pub objects_with_formulas: usize,
    pub max_formula_chain_depth: usize,
    /// Formula fields that reach themselves through references
    pub cyclic_formula_fields: Vec<String>,
    pub interpretation: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DataPatterns {
    pub temporal_objects: Vec<TemporalObject>,
    pub calculation_complexity: CalculationComplexity,
}

/// Field keys referenced by an equation, in order of appearance.
///
/// `{field_5}` yields `field_5`; a connected path such as
/// `{field_5.field_9}` yields both keys.
pub fn formula_references(equation: &str) -> Vec<String> {
    let mut refs = Vec::new();
    for cap in BRACED_TOKEN.captures_iter(equation) {
        for part in cap[1].split('.') {
            let part = part.trim();
            if FIELD_KEY.is_match(part) && !refs.iter().any(|r| r == part) {
                refs.push(part.to_string());
            }
        }
    }
    refs
}

fn is_timestamp_named(field: &Field, words: &[&str]) -> bool {
    let name = field.name.to_lowercase();
    field.field_type == FieldType::DateTime && words.iter().any(|w| name.contains(w))
}

fn temporal_object(obj: &Object) -> Option<TemporalObject> {
    let type_contains = |needle: &str| {
        obj.fields
            .iter()
            .any(|f| f.field_type.as_str().to_lowercase().contains(needle))
    };

    let has_created = type_contains("created")
        || obj.fields.iter().any(|f| is_timestamp_named(f, &["created"]));
    let has_modified = type_contains("modified")
        || obj
            .fields
            .iter()
            .any(|f| is_timestamp_named(f, &["modified", "updated"]));
    let has_status = obj
        .fields
        .iter()
        .any(|f| f.name.to_lowercase().contains("status"));

    if !(has_created || has_modified || has_status) {
        return None;
    }

    Some(TemporalObject {
        object: obj.name.clone(),
        object_key: obj.key.clone(),
        has_created_date: has_created,
        has_modified_date: has_modified,
        has_status_field: has_status,
        lifecycle_pattern: if has_status {
            LifecyclePattern::StatefulEntity
        } else {
            LifecyclePattern::Timestamped
        },
    })
}

/// Depth of formula chains and the fields caught in cycles
struct ChainWalker<'g> {
    graph: &'g HashMap<String, Vec<String>>,
    memo: HashMap<String, usize>,
    path: Vec<String>,
    cyclic: BTreeSet<String>,
}

impl<'g> ChainWalker<'g> {
    fn new(graph: &'g HashMap<String, Vec<String>>) -> Self {
        Self {
            graph,
            memo: HashMap::new(),
            path: Vec::new(),
            cyclic: BTreeSet::new(),
        }
    }

    /// 1 for a formula over plain fields, plus one per formula hop
    fn depth(&mut self, key: &str) -> usize {
        if let Some(depth) = self.memo.get(key) {
            return *depth;
        }
        if self.path.len() >= MAX_CHAIN_DEPTH {
            return 0;
        }

        self.path.push(key.to_string());
        let mut deepest = 0;
        let graph = self.graph;
        let refs = graph.get(key).map(Vec::as_slice).unwrap_or(&[]);
        for reference in refs {
            if !graph.contains_key(reference) {
                continue;
            }
            if let Some(start) = self.path.iter().position(|p| p == reference) {
                self.cyclic.extend(self.path[start..].iter().cloned());
                continue;
            }
            deepest = deepest.max(self.depth(reference));
        }
        self.path.pop();

        let depth = deepest + 1;
        self.memo.insert(key.to_string(), depth);
        depth
    }
}

fn calculation_complexity(app: &Application) -> CalculationComplexity {
    let mut total_formula_fields = 0;
    let mut objects_with_formulas = 0;
    // Formula field key -> field keys its equation references
    let mut graph: HashMap<String, Vec<String>> = HashMap::new();

    for obj in &app.objects {
        let mut has_formula = false;
        for field in obj.fields.iter().filter(|f| f.field_type.is_computed()) {
            total_formula_fields += 1;
            has_formula = true;
            let refs = field
                .equation()
                .map(|eq| formula_references(&eq))
                .unwrap_or_default();
            graph.insert(field.key.clone(), refs);
        }
        if has_formula {
            objects_with_formulas += 1;
        }
    }

    let mut walker = ChainWalker::new(&graph);
    let mut keys: Vec<&String> = graph.keys().collect();
    keys.sort();
    let max_depth = keys.into_iter().map(|k| walker.depth(k)).max().unwrap_or(0);

    CalculationComplexity {
        total_formula_fields,
        objects_with_formulas,
        max_formula_chain_depth: max_depth,
        cyclic_formula_fields: walker.cyclic.into_iter().collect(),
        interpretation: FORMULA_DEPENDENCIES
            .interpret(total_formula_fields as f64)
            .to_string(),
    }
}

pub(super) fn analyze(app: &Application) -> DataPatterns {
    DataPatterns {
        temporal_objects: app.objects.iter().filter_map(temporal_object).collect(),
        calculation_complexity: calculation_complexity(app),
    }
}
