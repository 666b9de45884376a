//! Usage search: reverse lookup of every reference to an object or field
//!
//! Results are returned in document declaration order, grouped by scan:
//! connection scans over objects first, then object sort/identifier scans,
//! then equation scans, then view scans over scenes and views. Nothing is
//! sorted or deduplicated. Keys that nothing references yield empty results.

use std::fmt;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use tracing::debug;

use crate::index::MetadataIndex;
use crate::risk::RiskPolicy;
use crate::schema::{Application, Field, Object, Scene, View};

// ============================================================================
// Usage records
// ============================================================================

/// Where a reference was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationKind {
    /// Another object's outbound connection targets the object
    ConnectionOutbound,
    /// Another object's inbound connection comes from the object
    ConnectionInbound,
    ViewSource,
    ViewParentSource,
    /// The field is the key of an outbound connection
    ConnectionField,
    ObjectSort,
    ObjectIdentifier,
    FieldEquation,
    ViewColumn,
    ViewSort,
    ViewParentConnection,
    ViewConnectionKey,
    FormInput,
}

impl LocationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConnectionOutbound => "connection_outbound",
            Self::ConnectionInbound => "connection_inbound",
            Self::ViewSource => "view_source",
            Self::ViewParentSource => "view_parent_source",
            Self::ConnectionField => "connection_field",
            Self::ObjectSort => "object_sort",
            Self::ObjectIdentifier => "object_identifier",
            Self::FieldEquation => "field_equation",
            Self::ViewColumn => "view_column",
            Self::ViewSort => "view_sort",
            Self::ViewParentConnection => "view_parent_connection",
            Self::ViewConnectionKey => "view_connection_key",
            Self::FormInput => "form_input",
        }
    }
}

impl fmt::Display for LocationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Auxiliary details of a usage. Which keys are set depends on the kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scene_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scene_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_object: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_object_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_object: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_object_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationship: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_header: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<String>,
}

impl UsageDetails {
    fn for_view(scene: &Scene, view: &View) -> Self {
        Self {
            scene_key: Some(scene.key.clone()),
            scene_name: Some(scene.name.clone()),
            view_key: Some(view.key.clone()),
            view_name: Some(view.name.clone()),
            ..Default::default()
        }
    }

    fn for_object(obj: &Object) -> Self {
        Self {
            object_key: Some(obj.key.clone()),
            object_name: Some(obj.name.clone()),
            ..Default::default()
        }
    }
}

/// One structural reference to an object or field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    pub location_type: LocationKind,
    pub context: String,
    pub details: UsageDetails,
}

impl Usage {
    fn new(location_type: LocationKind, context: String, details: UsageDetails) -> Self {
        Self {
            location_type,
            context,
            details,
        }
    }
}

/// Usages of a single field of a searched object
#[derive(Debug, Clone, PartialEq)]
pub struct FieldUsages {
    pub field_key: String,
    pub usages: Vec<Usage>,
}

/// Result of `search_object`: object-level usages plus per-field usages.
///
/// Serializes as a mapping `{"object_usages": [...], "<field_key>": [...]}`;
/// fields without usages are omitted and the rest keep declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectSearch {
    pub object_usages: Vec<Usage>,
    pub fields: Vec<FieldUsages>,
}

impl ObjectSearch {
    pub fn field_usages(&self, field_key: &str) -> Option<&[Usage]> {
        self.fields
            .iter()
            .find(|f| f.field_key == field_key)
            .map(|f| f.usages.as_slice())
    }

    pub fn total_usages(&self) -> usize {
        self.object_usages.len() + self.fields.iter().map(|f| f.usages.len()).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.total_usages() == 0
    }

    /// Every usage, object-level first
    pub fn all_usages(&self) -> impl Iterator<Item = &Usage> {
        self.object_usages
            .iter()
            .chain(self.fields.iter().flat_map(|f| f.usages.iter()))
    }
}

impl Serialize for ObjectSearch {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1 + self.fields.len()))?;
        map.serialize_entry("object_usages", &self.object_usages)?;
        for field in &self.fields {
            map.serialize_entry(&field.field_key, &field.usages)?;
        }
        map.end()
    }
}

// ============================================================================
// Search engine
// ============================================================================

/// Query engine over one borrowed application snapshot
#[derive(Debug, Clone)]
pub struct Sleuth<'a> {
    app: &'a Application,
    index: MetadataIndex<'a>,
    policy: RiskPolicy,
}

impl<'a> Sleuth<'a> {
    pub fn new(app: &'a Application) -> Self {
        Self::with_policy(app, RiskPolicy::default())
    }

    /// Engine with custom risk thresholds and weights
    pub fn with_policy(app: &'a Application, policy: RiskPolicy) -> Self {
        Self {
            app,
            index: MetadataIndex::build(app),
            policy,
        }
    }

    pub fn application(&self) -> &'a Application {
        self.app
    }

    pub fn index(&self) -> &MetadataIndex<'a> {
        &self.index
    }

    pub fn policy(&self) -> &RiskPolicy {
        &self.policy
    }

    pub fn object_info(&self, object_key: &str) -> Option<&'a Object> {
        self.index.object(object_key)
    }

    /// Owning object and definition of a field
    pub fn field_info(&self, field_key: &str) -> Option<(&'a Object, &'a Field)> {
        self.index.field_with_owner(field_key)
    }

    /// Find an object by key (case-insensitive) or by name
    pub fn resolve_object(&self, identifier: &str) -> Option<&'a Object> {
        let wanted = identifier.trim();
        self.app
            .objects
            .iter()
            .find(|o| o.key.eq_ignore_ascii_case(wanted))
            .or_else(|| {
                self.app
                    .objects
                    .iter()
                    .find(|o| o.name.eq_ignore_ascii_case(wanted))
            })
            .and_then(|o| self.index.object(&o.key))
    }

    /// Find a field by key (case-insensitive) or by name; first match wins
    pub fn resolve_field(&self, identifier: &str) -> Option<(&'a Object, &'a Field)> {
        let wanted = identifier.trim();
        let by_key = self
            .app
            .objects
            .iter()
            .flat_map(|o| o.fields.iter())
            .find(|f| f.key.eq_ignore_ascii_case(wanted));
        let found = by_key.or_else(|| {
            self.app
                .objects
                .iter()
                .flat_map(|o| o.fields.iter())
                .find(|f| f.name.eq_ignore_ascii_case(wanted))
        })?;
        self.field_info(&found.key)
    }

    /// All references to an object: connections from other objects and views
    /// that display it directly or through a parent record
    pub fn find_object_usages(&self, object_key: &str) -> Vec<Usage> {
        let mut usages = Vec::new();

        for obj in &self.app.objects {
            for conn in obj.outbound() {
                if conn.object == object_key {
                    usages.push(Usage::new(
                        LocationKind::ConnectionOutbound,
                        format!(
                            "{} ({}) connects to this object via {} ({})",
                            obj.name, obj.key, conn.name, conn.key
                        ),
                        UsageDetails {
                            source_object: Some(obj.key.clone()),
                            source_object_name: Some(obj.name.clone()),
                            connection_field: Some(conn.key.clone()),
                            connection_name: Some(conn.name.clone()),
                            relationship: Some(conn.relationship()),
                            ..Default::default()
                        },
                    ));
                }
            }

            for conn in obj.inbound() {
                if conn.object == object_key {
                    usages.push(Usage::new(
                        LocationKind::ConnectionInbound,
                        format!(
                            "This object connects from {} ({}) via {} ({})",
                            obj.name, obj.key, conn.name, conn.key
                        ),
                        UsageDetails {
                            target_object: Some(obj.key.clone()),
                            target_object_name: Some(obj.name.clone()),
                            connection_field: Some(conn.key.clone()),
                            connection_name: Some(conn.name.clone()),
                            relationship: Some(conn.relationship()),
                            ..Default::default()
                        },
                    ));
                }
            }
        }

        for (scene, view) in self.app.views() {
            let Some(source) = &view.source else {
                continue;
            };

            if source.object == object_key {
                usages.push(Usage::new(
                    LocationKind::ViewSource,
                    format!(
                        "View '{}' ({}) in scene '{}' ({}) displays this object",
                        view.name, view.key, scene.name, scene.key
                    ),
                    UsageDetails {
                        view_type: Some(view.view_type.clone()),
                        ..UsageDetails::for_view(scene, view)
                    },
                ));
            }

            if let Some(parent) = &source.parent_source {
                if parent.object == object_key {
                    usages.push(Usage::new(
                        LocationKind::ViewParentSource,
                        format!(
                            "View '{}' ({}) uses this object as parent source",
                            view.name, view.key
                        ),
                        UsageDetails {
                            view_type: Some(view.view_type.clone()),
                            ..UsageDetails::for_view(scene, view)
                        },
                    ));
                }
            }
        }

        debug!(object_key, count = usages.len(), "object usage scan");
        usages
    }

    /// All references to a field across connections, object settings,
    /// equations, view columns, view sources and form inputs
    pub fn find_field_usages(&self, field_key: &str) -> Vec<Usage> {
        let mut usages = Vec::new();

        for obj in &self.app.objects {
            for conn in obj.outbound() {
                if conn.key == field_key {
                    usages.push(Usage::new(
                        LocationKind::ConnectionField,
                        format!("Connection field in {} ({})", obj.name, obj.key),
                        UsageDetails {
                            target_object: Some(conn.object.clone()),
                            connection_name: Some(conn.name.clone()),
                            ..UsageDetails::for_object(obj)
                        },
                    ));
                }
            }
        }

        for obj in &self.app.objects {
            if let Some(sort) = &obj.sort {
                if sort.field == field_key {
                    usages.push(Usage::new(
                        LocationKind::ObjectSort,
                        format!("Used as sort field for {} ({})", obj.name, obj.key),
                        UsageDetails {
                            sort_order: Some(sort.order.as_str().to_string()),
                            ..UsageDetails::for_object(obj)
                        },
                    ));
                }
            }

            if obj.identifier.as_deref() == Some(field_key) {
                usages.push(Usage::new(
                    LocationKind::ObjectIdentifier,
                    format!("Used as identifier field for {} ({})", obj.name, obj.key),
                    UsageDetails::for_object(obj),
                ));
            }
        }

        let token = format!("{{{}}}", field_key);
        for obj in &self.app.objects {
            for field in &obj.fields {
                let Some(equation) = field.equation() else {
                    continue;
                };
                if equation.contains(&token) {
                    usages.push(Usage::new(
                        LocationKind::FieldEquation,
                        format!(
                            "Referenced in equation for {}.{} ({})",
                            obj.name, field.name, field.key
                        ),
                        UsageDetails {
                            field_key: Some(field.key.clone()),
                            field_name: Some(field.name.clone()),
                            equation: Some(equation),
                            ..UsageDetails::for_object(obj)
                        },
                    ));
                }
            }
        }

        for (scene, view) in self.app.views() {
            for column in &view.columns {
                if column.field_key() == Some(field_key) {
                    usages.push(Usage::new(
                        LocationKind::ViewColumn,
                        format!(
                            "Column in view '{}' ({}) in scene '{}'",
                            view.name, view.key, scene.name
                        ),
                        UsageDetails {
                            view_type: Some(view.view_type.clone()),
                            column_header: column.header.clone(),
                            ..UsageDetails::for_view(scene, view)
                        },
                    ));
                }
            }
        }

        for (scene, view) in self.app.views() {
            let Some(source) = &view.source else {
                continue;
            };

            for sort in source.sort.iter().filter(|s| s.field == field_key) {
                usages.push(Usage::new(
                    LocationKind::ViewSort,
                    format!("Sort field in view '{}' ({})", view.name, view.key),
                    UsageDetails {
                        sort_order: Some(sort.order.as_str().to_string()),
                        ..UsageDetails::for_view(scene, view)
                    },
                ));
            }

            if let Some(parent) = &source.parent_source {
                if parent.connection == field_key {
                    usages.push(Usage::new(
                        LocationKind::ViewParentConnection,
                        format!("Parent connection in view '{}' ({})", view.name, view.key),
                        UsageDetails::for_view(scene, view),
                    ));
                }
            }

            if source.connection_key.as_deref() == Some(field_key) {
                usages.push(Usage::new(
                    LocationKind::ViewConnectionKey,
                    format!("Connection key in view '{}' ({})", view.name, view.key),
                    UsageDetails::for_view(scene, view),
                ));
            }
        }

        for (scene, view) in self.app.views() {
            for input in &view.inputs {
                if input.field_key() == Some(field_key) {
                    usages.push(Usage::new(
                        LocationKind::FormInput,
                        format!("Input field in form '{}' ({})", view.name, view.key),
                        UsageDetails {
                            view_type: Some(view.view_type.clone()),
                            ..UsageDetails::for_view(scene, view)
                        },
                    ));
                }
            }
        }

        debug!(field_key, count = usages.len(), "field usage scan");
        usages
    }

    /// Object usages plus the usages of each of its fields.
    ///
    /// An object key that is not in the index yields an empty result.
    pub fn search_object(&self, object_key: &str) -> ObjectSearch {
        let Some(obj) = self.index.object(object_key) else {
            return ObjectSearch::default();
        };

        let fields = obj
            .fields
            .iter()
            .map(|field| FieldUsages {
                field_key: field.key.clone(),
                usages: self.find_field_usages(&field.key),
            })
            .filter(|f| !f.usages.is_empty())
            .collect();

        ObjectSearch {
            object_usages: self.find_object_usages(object_key),
            fields,
        }
    }

    /// Usages of one field; empty for keys not in the index
    pub fn search_field(&self, field_key: &str) -> Vec<Usage> {
        if self.index.owner_key(field_key).is_none() {
            return Vec::new();
        }
        self.find_field_usages(field_key)
    }
}
