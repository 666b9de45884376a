//! Orphaned resources and complexity hotspots

use serde::Serialize;

use super::ObjectRef;
use crate::interpret::TECHNICAL_DEBT;
use crate::search::Sleuth;

/// Connections in one direction that make an object a hotspot
const HOTSPOT_CONNECTIONS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrphanedField {
    pub field_key: String,
    pub field_name: String,
    pub object_key: String,
    pub object_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TechnicalDebt {
    pub orphaned_fields: usize,
    pub orphaned_fields_list: Vec<OrphanedField>,
    pub orphaned_objects: usize,
    pub orphaned_objects_list: Vec<ObjectRef>,
    /// Objects with many outbound connections
    pub high_fan_out_objects: Vec<ObjectRef>,
    /// Objects many others connect to
    pub bottleneck_objects: Vec<ObjectRef>,
    pub interpretation: String,
}

pub(super) fn analyze(sleuth: &Sleuth<'_>) -> TechnicalDebt {
    let app = sleuth.application();

    let orphaned_fields: Vec<OrphanedField> = app
        .objects
        .iter()
        .flat_map(|obj| obj.fields.iter().map(move |field| (obj, field)))
        .filter(|(_, field)| sleuth.find_field_usages(&field.key).is_empty())
        .map(|(obj, field)| OrphanedField {
            field_key: field.key.clone(),
            field_name: field.name.clone(),
            object_key: obj.key.clone(),
            object_name: obj.name.clone(),
        })
        .collect();

    let orphaned_objects: Vec<ObjectRef> = app
        .objects
        .iter()
        .filter(|obj| !obj.is_user_profile() && obj.connection_count() == 0)
        .filter(|obj| sleuth.find_object_usages(&obj.key).is_empty())
        .map(ObjectRef::from)
        .collect();

    let high_fan_out: Vec<ObjectRef> = app
        .objects
        .iter()
        .filter(|obj| obj.outbound().len() >= HOTSPOT_CONNECTIONS)
        .map(ObjectRef::from)
        .collect();
    let bottlenecks: Vec<ObjectRef> = app
        .objects
        .iter()
        .filter(|obj| obj.inbound().len() >= HOTSPOT_CONNECTIONS)
        .map(ObjectRef::from)
        .collect();

    TechnicalDebt {
        orphaned_fields: orphaned_fields.len(),
        orphaned_fields_list: orphaned_fields,
        orphaned_objects: orphaned_objects.len(),
        orphaned_objects_list: orphaned_objects,
        interpretation: TECHNICAL_DEBT
            .interpret(bottlenecks.len(), high_fan_out.len())
            .to_string(),
        high_fan_out_objects: high_fan_out,
        bottleneck_objects: bottlenecks,
    }
}
