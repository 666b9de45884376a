//! Typed model of a Knack application metadata export
//!
//! The export is a single JSON document of the form `{"application": {...}}`.
//! Loosely typed sub-structures of the export (cardinalities, field types,
//! column and input bindings) are validated here so that the analysis code
//! only ever sees well-formed values.
//!
//! Parsing is lenient where real exports are inconsistent: `null` is accepted
//! wherever a list or flag is expected, and non-object entries inside
//! `columns` / `inputs` are dropped.

use std::collections::HashMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Result, SleuthError};

// ============================================================================
// Document root
// ============================================================================

/// Root of a metadata export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnackAppExport {
    pub application: Application,
}

impl KnackAppExport {
    /// Parse an export from raw JSON text.
    ///
    /// `source_name` only labels the error message (a path or an app id).
    pub fn from_json_str(source_name: &str, raw: &str) -> Result<Self> {
        let value: serde_json::Value =
            serde_json::from_str(raw).map_err(|e| SleuthError::InvalidJson {
                source_name: source_name.to_string(),
                message: e.to_string(),
            })?;
        Self::from_value(value)
    }

    /// Build an export from an already parsed JSON value
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| SleuthError::InvalidMetadata {
            message: e.to_string(),
        })
    }
}

// ============================================================================
// Application
// ============================================================================

/// A Knack application: objects (tables), scenes (pages) and record counts
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Application {
    pub id: String,
    pub name: String,

    #[serde(default)]
    pub slug: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub account: Option<Account>,

    #[serde(default)]
    pub home_scene: Option<HomeScene>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub objects: Vec<Object>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub scenes: Vec<Scene>,

    /// Record counts keyed by object key (may also carry `total_entries`)
    #[serde(default, deserialize_with = "lenient_counts")]
    pub counts: HashMap<String, u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Account {
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HomeScene {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
}

impl Application {
    /// Account slug used in builder URLs, falling back to the app slug
    pub fn account_slug(&self) -> &str {
        self.account
            .as_ref()
            .and_then(|a| a.slug.as_deref())
            .filter(|s| !s.is_empty())
            .unwrap_or(&self.slug)
    }

    /// Record count for an object key (0 when absent)
    pub fn record_count(&self, object_key: &str) -> u64 {
        self.counts.get(object_key).copied().unwrap_or(0)
    }

    pub fn total_fields(&self) -> usize {
        self.objects.iter().map(|o| o.fields.len()).sum()
    }

    pub fn total_views(&self) -> usize {
        self.scenes.iter().map(|s| s.views.len()).sum()
    }

    /// Iterate every view together with its owning scene, in document order
    pub fn views(&self) -> impl Iterator<Item = (&Scene, &View)> {
        self.scenes
            .iter()
            .flat_map(|scene| scene.views.iter().map(move |view| (scene, view)))
    }
}

// ============================================================================
// Objects, fields, connections
// ============================================================================

/// A data table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Object {
    pub key: String,
    pub name: String,

    #[serde(default)]
    pub inflections: Option<Inflections>,

    #[serde(default)]
    pub connections: Option<Connections>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub fields: Vec<Field>,

    #[serde(default)]
    pub sort: Option<SortSpec>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub user: bool,

    #[serde(default)]
    pub status: Option<String>,

    #[serde(default, rename = "type")]
    pub object_type: Option<String>,

    /// Key of the field used as the record's display value
    #[serde(default)]
    pub identifier: Option<String>,

    /// Set on user-role objects
    #[serde(default)]
    pub profile_key: Option<String>,
}

impl Object {
    pub fn outbound(&self) -> &[Connection] {
        self.connections
            .as_ref()
            .map(|c| c.outbound.as_slice())
            .unwrap_or(&[])
    }

    pub fn inbound(&self) -> &[Connection] {
        self.connections
            .as_ref()
            .map(|c| c.inbound.as_slice())
            .unwrap_or(&[])
    }

    /// Total connection entries (inbound + outbound)
    pub fn connection_count(&self) -> usize {
        self.inbound().len() + self.outbound().len()
    }

    /// User-role object: has a profile key or the user flag set
    pub fn is_user_profile(&self) -> bool {
        self.profile_key.is_some() || self.user
    }

    pub fn field(&self, field_key: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.key == field_key)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Inflections {
    #[serde(default)]
    pub singular: String,
    #[serde(default)]
    pub plural: String,
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: String,
    #[serde(default)]
    pub order: SortOrder,
}

/// A single column of a table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Field {
    pub key: String,
    pub name: String,

    #[serde(rename = "type")]
    pub field_type: FieldType,

    #[serde(default, deserialize_with = "null_as_default")]
    pub required: bool,

    #[serde(default, deserialize_with = "null_as_default")]
    pub unique: bool,

    #[serde(default, deserialize_with = "null_as_default")]
    pub user: bool,

    #[serde(default, deserialize_with = "null_as_default")]
    pub conditional: bool,

    #[serde(default)]
    pub relationship: Option<FieldRelationship>,

    #[serde(default, deserialize_with = "lenient_format")]
    pub format: Option<FieldFormat>,
}

impl Field {
    /// Equation text of a computed field, if any
    pub fn equation(&self) -> Option<String> {
        self.format.as_ref().and_then(FieldFormat::equation_text)
    }
}

/// Format payload of a field. Only the equation is interpreted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldFormat {
    #[serde(default)]
    pub equation: Option<serde_json::Value>,
}

impl FieldFormat {
    /// Equation rendered as text. Non-string equations use their JSON form.
    pub fn equation_text(&self) -> Option<String> {
        match self.equation.as_ref()? {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) if s.is_empty() => None,
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// Relationship payload on a connection field
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldRelationship {
    #[serde(default)]
    pub has: Option<Cardinality>,
    #[serde(default)]
    pub object: Option<String>,
    #[serde(default)]
    pub belongs_to: Option<Cardinality>,
}

/// One side of a relationship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cardinality {
    One,
    Many,
}

impl Cardinality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::One => "one",
            Self::Many => "many",
        }
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Connections {
    #[serde(default, deserialize_with = "null_as_default")]
    pub inbound: Vec<Connection>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub outbound: Vec<Connection>,
}

/// A relationship between two objects.
///
/// On an outbound entry `object` is the target; on an inbound entry it is the
/// object the relationship comes from. `key` is the connection field's key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Connection {
    pub key: String,
    #[serde(default)]
    pub name: String,
    pub object: String,
    pub has: Cardinality,
    pub belongs_to: Cardinality,
}

impl Connection {
    /// Cardinality pair rendered as "has to belongs_to"
    pub fn relationship(&self) -> String {
        format!("{} to {}", self.has, self.belongs_to)
    }
}

// ============================================================================
// Field types
// ============================================================================

/// Knack field type. Unknown type strings are preserved in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    #[default]
    ShortText,
    ParagraphText,
    RichText,
    Name,
    Email,
    Address,
    Phone,
    Link,
    Number,
    Currency,
    Boolean,
    DateTime,
    Timer,
    MultipleChoice,
    Image,
    File,
    Signature,
    Rating,
    Password,
    UserRoles,
    Connection,
    AutoIncrement,
    Equation,
    Concatenation,
    Count,
    Sum,
    Average,
    Min,
    Max,
    Other(String),
}

impl FieldType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::ShortText => "short_text",
            Self::ParagraphText => "paragraph_text",
            Self::RichText => "rich_text",
            Self::Name => "name",
            Self::Email => "email",
            Self::Address => "address",
            Self::Phone => "phone",
            Self::Link => "link",
            Self::Number => "number",
            Self::Currency => "currency",
            Self::Boolean => "boolean",
            Self::DateTime => "date_time",
            Self::Timer => "timer",
            Self::MultipleChoice => "multiple_choice",
            Self::Image => "image",
            Self::File => "file",
            Self::Signature => "signature",
            Self::Rating => "rating",
            Self::Password => "password",
            Self::UserRoles => "user_roles",
            Self::Connection => "connection",
            Self::AutoIncrement => "auto_increment",
            Self::Equation => "equation",
            Self::Concatenation => "concatenation",
            Self::Count => "count",
            Self::Sum => "sum",
            Self::Average => "average",
            Self::Min => "min",
            Self::Max => "max",
            Self::Other(s) => s,
        }
    }

    /// Formula-like fields whose value is derived from other fields
    pub fn is_computed(&self) -> bool {
        matches!(
            self,
            Self::Equation
                | Self::Concatenation
                | Self::Count
                | Self::Sum
                | Self::Average
                | Self::Min
                | Self::Max
        )
    }
}

impl From<String> for FieldType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "short_text" => Self::ShortText,
            "paragraph_text" => Self::ParagraphText,
            "rich_text" => Self::RichText,
            "name" => Self::Name,
            "email" => Self::Email,
            "address" => Self::Address,
            "phone" => Self::Phone,
            "link" => Self::Link,
            "number" => Self::Number,
            "currency" => Self::Currency,
            "boolean" => Self::Boolean,
            "date_time" => Self::DateTime,
            "timer" => Self::Timer,
            "multiple_choice" => Self::MultipleChoice,
            "image" => Self::Image,
            "file" => Self::File,
            "signature" => Self::Signature,
            "rating" => Self::Rating,
            "password" => Self::Password,
            "user_roles" => Self::UserRoles,
            "connection" => Self::Connection,
            "auto_increment" => Self::AutoIncrement,
            "equation" => Self::Equation,
            "concatenation" => Self::Concatenation,
            "count" => Self::Count,
            "sum" => Self::Sum,
            "average" => Self::Average,
            "min" => Self::Min,
            "max" => Self::Max,
            _ => Self::Other(s),
        }
    }
}

impl From<FieldType> for String {
    fn from(t: FieldType) -> Self {
        match t {
            FieldType::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Scenes and views
// ============================================================================

/// A page of the application
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scene {
    pub key: String,
    pub name: String,

    #[serde(default)]
    pub slug: String,

    #[serde(default, rename = "type")]
    pub scene_type: Option<String>,

    /// Parent scene (slug or key)
    #[serde(default)]
    pub parent: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub views: Vec<View>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub authenticated: bool,

    /// Role restrictions; non-empty means only some roles may open the page
    #[serde(default, deserialize_with = "null_as_default")]
    pub groups: Vec<serde_json::Value>,
}

impl Scene {
    pub fn is_role_restricted(&self) -> bool {
        !self.groups.is_empty()
    }
}

/// A component on a page (table, form, details, ...)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct View {
    pub key: String,
    pub name: String,

    #[serde(rename = "type")]
    pub view_type: String,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub source: Option<ViewSource>,

    #[serde(default, deserialize_with = "lenient_seq")]
    pub columns: Vec<ViewColumn>,

    #[serde(default, deserialize_with = "lenient_seq")]
    pub inputs: Vec<ViewInput>,
}

/// Reference to a field by key
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldRef {
    pub key: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ViewColumn {
    #[serde(default, rename = "type")]
    pub column_type: Option<String>,

    #[serde(default)]
    pub field: Option<FieldRef>,

    #[serde(default)]
    pub header: Option<String>,
}

impl ViewColumn {
    pub fn field_key(&self) -> Option<&str> {
        self.field.as_ref().map(|f| f.key.as_str())
    }
}

/// A form input, bound to a field either directly by key or through `field`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ViewInput {
    #[serde(default)]
    pub key: Option<String>,

    #[serde(default)]
    pub field: Option<FieldRef>,

    #[serde(default, rename = "type")]
    pub input_type: Option<String>,

    #[serde(default)]
    pub label: Option<String>,
}

impl ViewInput {
    pub fn field_key(&self) -> Option<&str> {
        self.key
            .as_deref()
            .or_else(|| self.field.as_ref().map(|f| f.key.as_str()))
    }
}

/// Where a view gets its records from
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ViewSource {
    #[serde(default)]
    pub object: String,

    #[serde(default, deserialize_with = "lenient_seq")]
    pub sort: Vec<SortSpec>,

    #[serde(default)]
    pub parent_source: Option<ParentSource>,

    #[serde(default)]
    pub connection_key: Option<String>,

    #[serde(default)]
    pub relationship_type: Option<String>,

    #[serde(default)]
    pub authenticated_user: Option<bool>,
}

/// Records reached through a connection of a parent record
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParentSource {
    #[serde(default)]
    pub object: String,
    #[serde(default)]
    pub connection: String,
}

// ============================================================================
// Lenient deserializers
// ============================================================================

/// Treat an explicit `null` like a missing value
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Keep the entries of a list that parse as `T`, dropping the rest
fn lenient_seq<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Option::<Vec<serde_json::Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(raw
        .into_iter()
        .filter(serde_json::Value::is_object)
        .filter_map(|v| serde_json::from_value(v).ok())
        .collect())
}

fn lenient_format<'de, D>(deserializer: D) -> std::result::Result<Option<FieldFormat>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw
        .filter(serde_json::Value::is_object)
        .and_then(|v| serde_json::from_value(v).ok()))
}

fn lenient_counts<'de, D>(deserializer: D) -> std::result::Result<HashMap<String, u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Map<String, serde_json::Value>>::deserialize(deserializer)?
        .unwrap_or_default();
    Ok(raw
        .into_iter()
        .filter_map(|(k, v)| {
            let count = v.as_u64().or_else(|| v.as_f64().map(|f| f.max(0.0) as u64))?;
            Some((k, count))
        })
        .collect())
}
