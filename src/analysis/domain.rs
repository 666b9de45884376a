//! Domain classification of objects
//!
//! User-role objects are set aside first. The remaining objects are ranked
//! by importance (record volume and connectivity); the top N become core
//! entities and the rest fall into their primary role.

use std::collections::BTreeMap;

use serde::Serialize;

use super::round_to;
use crate::schema::{Application, Object};

/// Objects below this record count may be reference data
const REFERENCE_RECORD_CEILING: u64 = 100;

const CORE_SHARE: f64 = 0.2;
const CORE_MIN: usize = 4;
const CORE_MAX: usize = 10;

const VOLUME_WEIGHT: f64 = 0.6;
const CONNECTIVITY_WEIGHT: f64 = 0.4;

const CENTRALITY_CONNECTION_WEIGHT: f64 = 0.7;
const CENTRALITY_VIEW_WEIGHT: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimaryRole {
    /// Many records and connected to other objects
    Transactional,
    /// Few records, referenced more than it references
    Reference,
    Supporting,
}

impl PrimaryRole {
    pub fn classify(record_count: u64, inbound: usize, outbound: usize) -> Self {
        if record_count < REFERENCE_RECORD_CEILING && inbound > outbound {
            Self::Reference
        } else if record_count > REFERENCE_RECORD_CEILING && inbound + outbound > 0 {
            Self::Transactional
        } else {
            Self::Supporting
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EntitySummary {
    pub object_key: String,
    pub name: String,
    pub record_count: u64,
    pub field_count: usize,
    pub inbound_connections: usize,
    pub outbound_connections: usize,
    pub total_connections: usize,
    pub centrality_score: f64,
    pub importance_score: f64,
    pub primary_role: PrimaryRole,
    pub is_core_entity: bool,
    pub field_types: BTreeMap<String, usize>,
    /// Objects with an outbound connection to this one (reference data only)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub used_by: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DomainModel {
    pub user_profiles: Vec<EntitySummary>,
    pub core_entities: Vec<EntitySummary>,
    pub transactional_entities: Vec<EntitySummary>,
    pub reference_data: Vec<EntitySummary>,
    pub supporting_entities: Vec<EntitySummary>,
}

fn centrality(app: &Application, obj: &Object) -> f64 {
    let max_connections = app.objects.len().saturating_sub(1);
    let connection_score = if max_connections > 0 {
        obj.connection_count() as f64 / max_connections as f64
    } else {
        0.0
    };

    let total_views = app.total_views();
    let view_usage = app
        .views()
        .filter(|(_, v)| v.source.as_ref().is_some_and(|s| s.object == obj.key))
        .count();
    let view_score = if total_views > 0 {
        view_usage as f64 / total_views as f64
    } else {
        0.0
    };

    round_to(
        connection_score * CENTRALITY_CONNECTION_WEIGHT + view_score * CENTRALITY_VIEW_WEIGHT,
        3,
    )
}

fn summarize(app: &Application, obj: &Object) -> EntitySummary {
    let mut field_types = BTreeMap::new();
    for field in &obj.fields {
        *field_types
            .entry(field.field_type.as_str().to_string())
            .or_insert(0) += 1;
    }

    let record_count = app.record_count(&obj.key);
    let inbound = obj.inbound().len();
    let outbound = obj.outbound().len();
    let primary_role = PrimaryRole::classify(record_count, inbound, outbound);

    let used_by = if primary_role == PrimaryRole::Reference {
        app.objects
            .iter()
            .filter(|other| other.outbound().iter().any(|c| c.object == obj.key))
            .map(|other| other.key.clone())
            .collect()
    } else {
        Vec::new()
    };

    EntitySummary {
        object_key: obj.key.clone(),
        name: obj.name.clone(),
        record_count,
        field_count: obj.fields.len(),
        inbound_connections: inbound,
        outbound_connections: outbound,
        total_connections: inbound + outbound,
        centrality_score: centrality(app, obj),
        importance_score: 0.0,
        primary_role,
        is_core_entity: false,
        field_types,
        used_by,
    }
}

/// Number of core entities for a given count of non-user objects
pub(super) fn core_entity_limit(non_user_objects: usize) -> usize {
    let share = (non_user_objects as f64 * CORE_SHARE) as usize;
    share.clamp(CORE_MIN, CORE_MAX)
}

pub(super) fn analyze(app: &Application) -> DomainModel {
    let mut model = DomainModel::default();
    let mut candidates = Vec::new();

    for obj in &app.objects {
        let summary = summarize(app, obj);
        if obj.is_user_profile() {
            model.user_profiles.push(summary);
        } else {
            candidates.push(summary);
        }
    }

    let max_volume = candidates.iter().map(|e| e.record_count).max().unwrap_or(0).max(1);
    let max_connectivity = candidates
        .iter()
        .map(|e| e.total_connections)
        .max()
        .unwrap_or(0)
        .max(1);
    for entity in &mut candidates {
        let volume = entity.record_count as f64 / max_volume as f64;
        let connectivity = entity.total_connections as f64 / max_connectivity as f64;
        entity.importance_score =
            round_to(volume * VOLUME_WEIGHT + connectivity * CONNECTIVITY_WEIGHT, 3);
    }

    // Stable sort keeps declaration order among equal scores
    candidates.sort_by(|a, b| b.importance_score.total_cmp(&a.importance_score));
    let limit = core_entity_limit(candidates.len());

    for (rank, mut entity) in candidates.into_iter().enumerate() {
        if rank < limit {
            entity.is_core_entity = true;
            model.core_entities.push(entity);
            continue;
        }
        match entity.primary_role {
            PrimaryRole::Transactional => model.transactional_entities.push(entity),
            PrimaryRole::Reference => model.reference_data.push(entity),
            PrimaryRole::Supporting => model.supporting_entities.push(entity),
        }
    }

    model
        .user_profiles
        .sort_by(|a, b| b.record_count.cmp(&a.record_count));
    model
        .transactional_entities
        .sort_by(|a, b| b.record_count.cmp(&a.record_count));
    model
        .reference_data
        .sort_by(|a, b| b.used_by.len().cmp(&a.used_by.len()));
    model
}
