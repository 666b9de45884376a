//! Lookup indexes over an application snapshot

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::schema::{Application, Field, Object};

/// O(1) lookups from object and field keys into the borrowed application.
///
/// Built once per snapshot. Duplicate keys are tolerated: the entry declared
/// last wins, and `validate()` reports the duplicate.
#[derive(Debug, Clone, Default)]
pub struct MetadataIndex<'a> {
    objects_by_key: HashMap<&'a str, &'a Object>,
    field_to_object: HashMap<&'a str, &'a str>,
    fields_by_key: HashMap<&'a str, &'a Field>,
}

impl<'a> MetadataIndex<'a> {
    pub fn build(app: &'a Application) -> Self {
        let mut index = Self {
            objects_by_key: HashMap::with_capacity(app.objects.len()),
            field_to_object: HashMap::with_capacity(app.total_fields()),
            fields_by_key: HashMap::with_capacity(app.total_fields()),
        };

        for obj in &app.objects {
            if index.objects_by_key.insert(&obj.key, obj).is_some() {
                warn!(object_key = %obj.key, "duplicate object key, keeping last definition");
            }
            for field in &obj.fields {
                if index.field_to_object.insert(&field.key, &obj.key).is_some() {
                    warn!(field_key = %field.key, "duplicate field key, keeping last definition");
                }
                index.fields_by_key.insert(&field.key, field);
            }
        }

        debug!(
            objects = index.objects_by_key.len(),
            fields = index.fields_by_key.len(),
            "built metadata index"
        );
        index
    }

    pub fn object(&self, object_key: &str) -> Option<&'a Object> {
        self.objects_by_key.get(object_key).copied()
    }

    pub fn field(&self, field_key: &str) -> Option<&'a Field> {
        self.fields_by_key.get(field_key).copied()
    }

    /// Key of the object that owns a field
    pub fn owner_key(&self, field_key: &str) -> Option<&'a str> {
        self.field_to_object.get(field_key).copied()
    }

    /// Owning object and field definition
    pub fn field_with_owner(&self, field_key: &str) -> Option<(&'a Object, &'a Field)> {
        let owner = self.object(self.owner_key(field_key)?)?;
        let field = self.field(field_key)?;
        Some((owner, field))
    }

    pub fn object_count(&self) -> usize {
        self.objects_by_key.len()
    }

    pub fn field_count(&self) -> usize {
        self.fields_by_key.len()
    }
}
