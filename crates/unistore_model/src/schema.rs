//! Entity schemas and the schema registry.
//!
//! A schema is an explicit, per-entity-type descriptor built once at startup:
//! field names mapped to their declared kinds, the container name, and the
//! identifier field. The registry replaces the reflection caches of typical
//! object mappers with a read-only object passed by reference to the builder,
//! the translators, and the projector.

use crate::error::{ModelError, ModelResult};
use crate::value::FieldKind;
use std::collections::HashMap;

/// Name of the reserved creation-timestamp field.
///
/// Every schema carries it; the store stamps it on `add` when absent. It is
/// the default ordering field.
pub const CREATED_AT_FIELD: &str = "created_at";

/// Default identifier field name.
pub const DEFAULT_ID_FIELD: &str = "id";

/// A declared field: name plus kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    /// Field name.
    pub name: String,
    /// Declared kind.
    pub kind: FieldKind,
}

impl FieldDef {
    /// Creates a field definition.
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Schema descriptor for one entity type.
#[derive(Debug, Clone)]
pub struct EntitySchema {
    entity: String,
    container: String,
    id_field: String,
    fields: Vec<FieldDef>,
}

impl EntitySchema {
    /// Creates a schema for an entity type.
    ///
    /// The container name defaults to the pluralized, lowercased entity name
    /// (`Instrument` → `instruments`); override it with
    /// [`EntitySchema::with_container`]. The identifier field (`id`, Guid)
    /// and the reserved [`CREATED_AT_FIELD`] are added when the caller does
    /// not declare them.
    pub fn new(entity: impl Into<String>, fields: Vec<FieldDef>) -> Self {
        let entity = entity.into();
        let container = pluralize(&entity.to_lowercase());
        let mut all = fields;
        if !all.iter().any(|f| f.name == DEFAULT_ID_FIELD) {
            all.insert(0, FieldDef::new(DEFAULT_ID_FIELD, FieldKind::Guid));
        }
        if !all.iter().any(|f| f.name == CREATED_AT_FIELD) {
            all.push(FieldDef::new(CREATED_AT_FIELD, FieldKind::DateTimeOffset));
        }
        Self {
            entity,
            container,
            id_field: DEFAULT_ID_FIELD.to_string(),
            fields: all,
        }
    }

    /// Overrides the container name.
    #[must_use]
    pub fn with_container(mut self, container: impl Into<String>) -> Self {
        self.container = container.into();
        self
    }

    /// Overrides the identifier field name.
    ///
    /// The field must already be declared.
    #[must_use]
    pub fn with_id_field(mut self, id_field: impl Into<String>) -> Self {
        self.id_field = id_field.into();
        self
    }

    /// Returns the entity type name.
    #[must_use]
    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// Returns the container name.
    #[must_use]
    pub fn container(&self) -> &str {
        &self.container
    }

    /// Returns the identifier field name.
    #[must_use]
    pub fn id_field(&self) -> &str {
        &self.id_field
    }

    /// Returns the declared fields in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// Looks up a field definition by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Returns the declared kind of a field.
    pub fn kind_of(&self, name: &str) -> ModelResult<FieldKind> {
        self.field(name)
            .map(|f| f.kind)
            .ok_or_else(|| ModelError::unknown_field(&self.entity, name))
    }

    /// True when the schema declares the field.
    #[must_use]
    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }
}

/// Naive English pluralization for default container names.
fn pluralize(word: &str) -> String {
    if word.is_empty() {
        return String::new();
    }
    if word.ends_with('s')
        || word.ends_with('x')
        || word.ends_with('z')
        || word.ends_with("ch")
        || word.ends_with("sh")
    {
        return format!("{word}es");
    }
    if let Some(stem) = word.strip_suffix('y') {
        let before = stem.chars().last();
        if before.is_some_and(|c| !matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')) {
            return format!("{stem}ies");
        }
    }
    format!("{word}s")
}

/// Registry of entity schemas, built once at startup and read-only after.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: HashMap<String, EntitySchema>,
}

impl SchemaRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a schema.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::DuplicateSchema`] when the entity type is
    /// already registered.
    pub fn register(&mut self, schema: EntitySchema) -> ModelResult<()> {
        if self.schemas.contains_key(schema.entity()) {
            return Err(ModelError::DuplicateSchema {
                entity: schema.entity().to_string(),
            });
        }
        self.schemas.insert(schema.entity().to_string(), schema);
        Ok(())
    }

    /// Looks up a schema by entity type name.
    pub fn get(&self, entity: &str) -> ModelResult<&EntitySchema> {
        self.schemas
            .get(entity)
            .ok_or_else(|| ModelError::unknown_entity(entity))
    }

    /// Looks up a schema by container name.
    #[must_use]
    pub fn by_container(&self, container: &str) -> Option<&EntitySchema> {
        self.schemas.values().find(|s| s.container() == container)
    }

    /// Number of registered schemas.
    #[must_use]
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// True when no schema is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_container_is_pluralized_lowercase() {
        let schema = EntitySchema::new("Instrument", vec![]);
        assert_eq!(schema.container(), "instruments");

        let schema = EntitySchema::new("Company", vec![]);
        assert_eq!(schema.container(), "companies");

        let schema = EntitySchema::new("Box", vec![]);
        assert_eq!(schema.container(), "boxes");
    }

    #[test]
    fn explicit_container_wins() {
        let schema = EntitySchema::new("Instrument", vec![]).with_container("inst_table");
        assert_eq!(schema.container(), "inst_table");
    }

    #[test]
    fn reserved_fields_are_added() {
        let schema = EntitySchema::new(
            "Instrument",
            vec![FieldDef::new("name", FieldKind::Text)],
        );
        assert_eq!(schema.kind_of("id").unwrap(), FieldKind::Guid);
        assert_eq!(
            schema.kind_of(CREATED_AT_FIELD).unwrap(),
            FieldKind::DateTimeOffset
        );
        assert_eq!(schema.kind_of("name").unwrap(), FieldKind::Text);
    }

    #[test]
    fn unknown_field_is_an_error() {
        let schema = EntitySchema::new("Instrument", vec![]);
        assert!(schema.kind_of("nope").is_err());
    }

    #[test]
    fn registry_rejects_duplicates() {
        let mut registry = SchemaRegistry::new();
        registry
            .register(EntitySchema::new("Instrument", vec![]))
            .unwrap();
        let err = registry.register(EntitySchema::new("Instrument", vec![]));
        assert!(matches!(err, Err(ModelError::DuplicateSchema { .. })));
    }

    #[test]
    fn registry_lookup_by_container() {
        let mut registry = SchemaRegistry::new();
        registry
            .register(EntitySchema::new("Instrument", vec![]))
            .unwrap();
        assert!(registry.by_container("instruments").is_some());
        assert!(registry.by_container("missing").is_none());
    }
}
