//! Impact analysis: what breaks if an object or field changes
//!
//! Composes the usage search into a report with four direct-impact buckets
//! (connections, views, forms, formulas), the scenes they touch, cascading
//! field impacts for object targets, and a risk assessment.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::risk::{ImpactCounts, RiskLevel};
use crate::schema::FieldType;
use crate::search::{LocationKind, Sleuth, Usage};

/// Kind of entity an impact analysis targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetType {
    Object,
    Field,
}

impl TargetType {
    /// Detect the target type from the key shape (`object_*` / `field_*`)
    pub fn detect(key: &str) -> Option<Self> {
        if key.starts_with("object_") {
            Some(Self::Object)
        } else if key.starts_with("field_") {
            Some(Self::Field)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Object => "object",
            Self::Field => "field",
        }
    }
}

/// Why an impact analysis could not run
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "error", rename_all = "snake_case")]
pub enum ImpactError {
    #[error("Object {key} not found")]
    ObjectNotFound { key: String },

    #[error("Field {key} not found")]
    FieldNotFound { key: String },

    #[error("Could not detect target type from key: {key}")]
    UnknownTargetType { key: String },
}

// ============================================================================
// Report
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ImpactTarget {
    pub key: String,
    #[serde(rename = "type")]
    pub target_type: TargetType,
    pub name: String,
    pub description: String,
    /// Owning object for field targets
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_key: Option<String>,
    /// Sort and identifier roles the target plays in its object's schema
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub schema_roles: Vec<Usage>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConnectionImpact {
    #[serde(rename = "type")]
    pub location_type: LocationKind,
    pub description: String,
    /// The object on the other side of the connection
    pub related_object: Option<String>,
    pub related_object_name: Option<String>,
    pub connection_field: Option<String>,
    pub connection_name: Option<String>,
    pub relationship: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ViewImpact {
    #[serde(rename = "type")]
    pub location_type: LocationKind,
    pub view_key: Option<String>,
    pub view_name: Option<String>,
    pub view_type: Option<String>,
    pub scene_key: Option<String>,
    pub scene_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FormImpact {
    pub view_key: Option<String>,
    pub view_name: Option<String>,
    pub scene_key: Option<String>,
    pub scene_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FormulaImpact {
    pub field_key: Option<String>,
    pub field_name: Option<String>,
    pub object_key: Option<String>,
    pub object_name: Option<String>,
    pub equation: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SceneImpact {
    pub scene_key: String,
    pub scene_name: String,
    pub scene_slug: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DirectImpacts {
    pub connections: Vec<ConnectionImpact>,
    pub views: Vec<ViewImpact>,
    pub forms: Vec<FormImpact>,
    pub formulas: Vec<FormulaImpact>,
    pub scenes: Vec<SceneImpact>,
}

/// Usage kind and context, without details
#[derive(Debug, Clone, Serialize)]
pub struct UsageSummary {
    #[serde(rename = "type")]
    pub location_type: LocationKind,
    pub context: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldImpact {
    pub field_key: String,
    pub field_name: String,
    pub field_type: FieldType,
    pub usage_count: usize,
    pub usages: Vec<UsageSummary>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CascadeImpacts {
    pub affected_fields: Vec<FieldImpact>,
    pub affected_scenes: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RiskAssessment {
    pub breaking_change_likelihood: RiskLevel,
    pub impact_score: f64,
    /// Names of the scenes users work in that the change touches
    pub affected_user_workflows: Vec<String>,
    pub workflow_categories: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImpactMetadata {
    pub total_direct_impacts: usize,
    pub total_cascade_impacts: usize,
}

/// Full impact report for one object or field
#[derive(Debug, Clone, Serialize)]
pub struct ImpactReport {
    pub target: ImpactTarget,
    pub direct_impacts: DirectImpacts,
    pub cascade_impacts: CascadeImpacts,
    pub risk_assessment: RiskAssessment,
    pub metadata: ImpactMetadata,
}

impl ImpactReport {
    pub fn counts(&self) -> ImpactCounts {
        ImpactCounts {
            connections: self.direct_impacts.connections.len(),
            views: self.direct_impacts.views.len(),
            forms: self.direct_impacts.forms.len(),
            formulas: self.direct_impacts.formulas.len(),
            cascade_fields: self.cascade_impacts.affected_fields.len(),
        }
    }
}

// ============================================================================
// Partitioning
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bucket {
    Connections,
    Views,
    Forms,
    Formulas,
}

fn bucket_for(kind: LocationKind) -> Option<Bucket> {
    match kind {
        LocationKind::ConnectionOutbound
        | LocationKind::ConnectionInbound
        | LocationKind::ConnectionField => Some(Bucket::Connections),
        LocationKind::ViewSource
        | LocationKind::ViewParentSource
        | LocationKind::ViewColumn
        | LocationKind::ViewSort
        | LocationKind::ViewParentConnection
        | LocationKind::ViewConnectionKey => Some(Bucket::Views),
        LocationKind::FormInput => Some(Bucket::Forms),
        LocationKind::FieldEquation => Some(Bucket::Formulas),
        LocationKind::ObjectSort | LocationKind::ObjectIdentifier => None,
    }
}

/// Accumulates bucketed impacts and the ordered set of touched scenes
#[derive(Debug, Default)]
struct Partition {
    direct: DirectImpacts,
    scene_keys: Vec<String>,
}

impl Partition {
    fn note_scene(&mut self, usage: &Usage) {
        if let Some(scene_key) = &usage.details.scene_key {
            if !self.scene_keys.contains(scene_key) {
                self.scene_keys.push(scene_key.clone());
            }
        }
    }

    fn push(&mut self, bucket: Bucket, usage: &Usage) {
        let d = &usage.details;
        match bucket {
            Bucket::Connections => {
                let (related, related_name) = match usage.location_type {
                    LocationKind::ConnectionOutbound => {
                        (d.source_object.clone(), d.source_object_name.clone())
                    }
                    LocationKind::ConnectionInbound => {
                        (d.target_object.clone(), d.target_object_name.clone())
                    }
                    _ => (d.target_object.clone(), None),
                };
                self.direct.connections.push(ConnectionImpact {
                    location_type: usage.location_type,
                    description: usage.context.clone(),
                    related_object: related,
                    related_object_name: related_name,
                    connection_field: d.connection_field.clone(),
                    connection_name: d.connection_name.clone(),
                    relationship: d.relationship.clone(),
                });
            }
            Bucket::Views => self.direct.views.push(ViewImpact {
                location_type: usage.location_type,
                view_key: d.view_key.clone(),
                view_name: d.view_name.clone(),
                view_type: d.view_type.clone(),
                scene_key: d.scene_key.clone(),
                scene_name: d.scene_name.clone(),
            }),
            Bucket::Forms => self.direct.forms.push(FormImpact {
                view_key: d.view_key.clone(),
                view_name: d.view_name.clone(),
                scene_key: d.scene_key.clone(),
                scene_name: d.scene_name.clone(),
            }),
            Bucket::Formulas => self.direct.formulas.push(FormulaImpact {
                field_key: d.field_key.clone(),
                field_name: d.field_name.clone(),
                object_key: d.object_key.clone(),
                object_name: d.object_name.clone(),
                equation: d.equation.clone(),
            }),
        }
    }
}

fn workflow_categories(direct: &DirectImpacts) -> Vec<String> {
    let mut categories = Vec::new();
    if !direct.forms.is_empty() {
        categories.push("User data entry forms".to_string());
    }
    if !direct.views.is_empty() {
        categories.push("Data display views".to_string());
    }
    if !direct.connections.is_empty() {
        categories.push("Related data relationships".to_string());
    }
    if !direct.formulas.is_empty() {
        categories.push("Calculated fields and formulas".to_string());
    }
    categories
}

// ============================================================================
// Analyzer
// ============================================================================

impl<'a> Sleuth<'a> {
    /// Resolve a user-supplied identifier to a key and target type.
    ///
    /// Keys are detected by shape; otherwise object names are tried before
    /// field names.
    pub fn resolve_target(&self, identifier: &str) -> Option<(String, TargetType)> {
        match TargetType::detect(identifier) {
            Some(TargetType::Object) => self
                .resolve_object(identifier)
                .map(|o| (o.key.clone(), TargetType::Object)),
            Some(TargetType::Field) => self
                .resolve_field(identifier)
                .map(|(_, f)| (f.key.clone(), TargetType::Field)),
            None => self
                .resolve_object(identifier)
                .map(|o| (o.key.clone(), TargetType::Object))
                .or_else(|| {
                    self.resolve_field(identifier)
                        .map(|(_, f)| (f.key.clone(), TargetType::Field))
                }),
        }
    }

    /// Analyze what a change to `target_key` would affect.
    ///
    /// The target type is detected from the key when not given.
    pub fn analyze_impact(
        &self,
        target_key: &str,
        target_type: Option<TargetType>,
    ) -> Result<ImpactReport, ImpactError> {
        let target_type = target_type
            .or_else(|| TargetType::detect(target_key))
            .ok_or_else(|| ImpactError::UnknownTargetType {
                key: target_key.to_string(),
            })?;

        let (target, partition, affected_fields) = match target_type {
            TargetType::Object => self.object_impact(target_key)?,
            TargetType::Field => self.field_impact(target_key)?,
        };

        let Partition {
            mut direct,
            scene_keys,
        } = partition;

        let app = self.application();
        let mut affected_scenes = Vec::with_capacity(scene_keys.len());
        let mut workflows: Vec<String> = Vec::new();
        for scene_key in &scene_keys {
            let Some(scene) = app.scenes.iter().find(|s| &s.key == scene_key) else {
                continue;
            };
            direct.scenes.push(SceneImpact {
                scene_key: scene.key.clone(),
                scene_name: scene.name.clone(),
                scene_slug: scene.slug.clone(),
            });
            affected_scenes.push(scene.key.clone());
            if !workflows.contains(&scene.name) {
                workflows.push(scene.name.clone());
            }
        }

        let counts = ImpactCounts {
            connections: direct.connections.len(),
            views: direct.views.len(),
            forms: direct.forms.len(),
            formulas: direct.formulas.len(),
            cascade_fields: affected_fields.len(),
        };
        let policy = self.policy();

        Ok(ImpactReport {
            target,
            risk_assessment: RiskAssessment {
                breaking_change_likelihood: policy.likelihood(&counts),
                impact_score: policy.score(&counts),
                affected_user_workflows: workflows,
                workflow_categories: workflow_categories(&direct),
            },
            metadata: ImpactMetadata {
                total_direct_impacts: counts.direct(),
                total_cascade_impacts: counts.cascade_fields,
            },
            direct_impacts: direct,
            cascade_impacts: CascadeImpacts {
                affected_fields,
                affected_scenes,
            },
        })
    }

    fn object_impact(
        &self,
        object_key: &str,
    ) -> Result<(ImpactTarget, Partition, Vec<FieldImpact>), ImpactError> {
        let obj = self
            .object_info(object_key)
            .ok_or_else(|| ImpactError::ObjectNotFound {
                key: object_key.to_string(),
            })?;

        let search = self.search_object(object_key);
        let mut partition = Partition::default();

        for usage in &search.object_usages {
            if let Some(bucket) = bucket_for(usage.location_type) {
                partition.push(bucket, usage);
            }
            partition.note_scene(usage);
        }

        // Field usages only add forms and formulas here; their views and
        // connections already hang off the object itself.
        let mut affected_fields = Vec::new();
        for field_usages in &search.fields {
            let Some(field) = obj.field(&field_usages.field_key) else {
                continue;
            };
            for usage in &field_usages.usages {
                match bucket_for(usage.location_type) {
                    Some(bucket @ (Bucket::Forms | Bucket::Formulas)) => {
                        partition.push(bucket, usage)
                    }
                    _ => {}
                }
                partition.note_scene(usage);
            }
            affected_fields.push(FieldImpact {
                field_key: field.key.clone(),
                field_name: field.name.clone(),
                field_type: field.field_type.clone(),
                usage_count: field_usages.usages.len(),
                usages: field_usages
                    .usages
                    .iter()
                    .map(|u| UsageSummary {
                        location_type: u.location_type,
                        context: u.context.clone(),
                    })
                    .collect(),
            });
        }

        let target = ImpactTarget {
            key: obj.key.clone(),
            target_type: TargetType::Object,
            name: obj.name.clone(),
            description: format!("{} fields", obj.fields.len()),
            object_key: None,
            schema_roles: Vec::new(),
        };
        Ok((target, partition, affected_fields))
    }

    fn field_impact(
        &self,
        field_key: &str,
    ) -> Result<(ImpactTarget, Partition, Vec<FieldImpact>), ImpactError> {
        let (owner, field) =
            self.field_info(field_key)
                .ok_or_else(|| ImpactError::FieldNotFound {
                    key: field_key.to_string(),
                })?;

        let usages = self.search_field(field_key);
        let mut partition = Partition::default();
        let mut schema_roles = Vec::new();

        for usage in &usages {
            match bucket_for(usage.location_type) {
                Some(bucket) => partition.push(bucket, usage),
                None => schema_roles.push(usage.clone()),
            }
            partition.note_scene(usage);
        }

        let target = ImpactTarget {
            key: field.key.clone(),
            target_type: TargetType::Field,
            name: format!("{}.{}", owner.name, field.name),
            description: format!("{} field", field.field_type),
            object_key: Some(owner.key.clone()),
            schema_roles,
        };
        Ok((target, partition, Vec::new()))
    }
}
