//! In-memory storage backend.

use crate::backend::{FilterDialect, RowFilter, StoreBackend};
use crate::error::{StorageError, StorageResult};
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::debug;
use unistore_model::{identifier, EntitySchema, PropertyBag};

/// An in-memory storage backend.
///
/// Bags are stored as-is, per container, in insertion order. Suitable for:
/// - Unit and integration tests
/// - Ephemeral stores that don't need persistence
///
/// Speaks the [`FilterDialect::Predicate`] dialect.
///
/// # Thread Safety
///
/// This backend is thread-safe and can be shared across threads.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    containers: RwLock<HashMap<String, Vec<PropertyBag>>>,
}

impl MemoryBackend {
    /// Creates a new empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn require_id(schema: &EntitySchema, bag: &PropertyBag) -> StorageResult<String> {
        identifier(bag, schema).ok_or_else(|| StorageError::MissingIdentifier {
            container: schema.container().to_string(),
        })
    }

    fn position(
        rows: &[PropertyBag],
        schema: &EntitySchema,
        id: &str,
    ) -> Option<usize> {
        rows.iter()
            .position(|row| identifier(row, schema).as_deref() == Some(id))
    }
}

impl StoreBackend for MemoryBackend {
    fn add(&self, schema: &EntitySchema, bag: &PropertyBag) -> StorageResult<String> {
        let id = Self::require_id(schema, bag)?;
        let mut containers = self.containers.write();
        containers
            .entry(schema.container().to_string())
            .or_default()
            .push(bag.clone());
        Ok(id)
    }

    fn remove(&self, schema: &EntitySchema, id: &str) -> StorageResult<()> {
        let mut containers = self.containers.write();
        let rows = containers
            .get_mut(schema.container())
            .ok_or_else(|| StorageError::not_found(schema.container(), id))?;
        match Self::position(rows, schema, id) {
            Some(index) => {
                rows.remove(index);
                Ok(())
            }
            None => Err(StorageError::not_found(schema.container(), id)),
        }
    }

    fn retrieve(&self, schema: &EntitySchema, id: &str) -> StorageResult<Option<PropertyBag>> {
        let containers = self.containers.read();
        let Some(rows) = containers.get(schema.container()) else {
            return Ok(None);
        };
        Ok(Self::position(rows, schema, id).map(|i| rows[i].clone()))
    }

    fn replace(
        &self,
        schema: &EntitySchema,
        id: &str,
        bag: &PropertyBag,
    ) -> StorageResult<PropertyBag> {
        let mut containers = self.containers.write();
        let rows = containers
            .get_mut(schema.container())
            .ok_or_else(|| StorageError::not_found(schema.container(), id))?;
        match Self::position(rows, schema, id) {
            Some(index) => {
                rows[index] = bag.clone();
                Ok(rows[index].clone())
            }
            None => Err(StorageError::not_found(schema.container(), id)),
        }
    }

    fn count(&self, schema: &EntitySchema) -> StorageResult<usize> {
        let containers = self.containers.read();
        Ok(containers.get(schema.container()).map_or(0, Vec::len))
    }

    fn query(
        &self,
        schema: &EntitySchema,
        filter: &dyn RowFilter,
    ) -> StorageResult<Vec<PropertyBag>> {
        debug!(
            container = schema.container(),
            filter = filter.native_text(),
            "evaluating in-memory predicate"
        );
        let containers = self.containers.read();
        let Some(rows) = containers.get(schema.container()) else {
            return Ok(Vec::new());
        };
        Ok(rows
            .iter()
            .filter(|row| filter.matches(row))
            .cloned()
            .collect())
    }

    fn destroy_all(&self, schema: &EntitySchema) -> StorageResult<()> {
        self.containers.write().remove(schema.container());
        Ok(())
    }

    fn dialect(&self) -> FilterDialect {
        FilterDialect::Predicate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use unistore_model::{set_identifier, Value};

    struct MatchAll;

    impl RowFilter for MatchAll {
        fn matches(&self, _bag: &PropertyBag) -> bool {
            true
        }

        fn native_text(&self) -> &str {
            "(true)"
        }
    }

    fn schema() -> EntitySchema {
        EntitySchema::new("Instrument", vec![])
    }

    fn bag_with_id(schema: &EntitySchema) -> (PropertyBag, String) {
        let mut bag = PropertyBag::new();
        let id = uuid::Uuid::new_v4().to_string();
        set_identifier(&mut bag, schema, &id);
        (bag, id)
    }

    #[test]
    fn add_retrieve_remove() {
        let backend = MemoryBackend::new();
        let schema = schema();
        let (bag, id) = bag_with_id(&schema);

        assert_eq!(backend.add(&schema, &bag).unwrap(), id);
        assert!(backend.retrieve(&schema, &id).unwrap().is_some());

        backend.remove(&schema, &id).unwrap();
        assert!(backend.retrieve(&schema, &id).unwrap().is_none());
    }

    #[test]
    fn add_without_identifier_fails() {
        let backend = MemoryBackend::new();
        let schema = schema();
        let err = backend.add(&schema, &PropertyBag::new());
        assert!(matches!(err, Err(StorageError::MissingIdentifier { .. })));
    }

    #[test]
    fn replace_missing_is_not_found() {
        let backend = MemoryBackend::new();
        let schema = schema();
        let (bag, _) = bag_with_id(&schema);
        let err = backend.replace(&schema, "no-such-id", &bag);
        assert!(matches!(err, Err(StorageError::NotFound { .. })));
    }

    #[test]
    fn query_missing_container_is_empty() {
        let backend = MemoryBackend::new();
        let schema = schema();
        let rows = backend.query(&schema, &MatchAll).unwrap();
        assert!(rows.is_empty());
        assert_eq!(backend.count(&schema).unwrap(), 0);
    }

    #[test]
    fn query_preserves_insertion_order() {
        let backend = MemoryBackend::new();
        let schema = schema();
        let mut ids = Vec::new();
        for _ in 0..5 {
            let (bag, id) = bag_with_id(&schema);
            backend.add(&schema, &bag).unwrap();
            ids.push(id);
        }

        let rows = backend.query(&schema, &MatchAll).unwrap();
        let seen: Vec<_> = rows
            .iter()
            .map(|row| identifier(row, &schema).unwrap())
            .collect();
        assert_eq!(seen, ids);
    }

    #[test]
    fn replace_overwrites() {
        let backend = MemoryBackend::new();
        let schema = schema();
        let (mut bag, id) = bag_with_id(&schema);
        backend.add(&schema, &bag).unwrap();

        bag.insert("extra".to_string(), Value::Int(7));
        let updated = backend.replace(&schema, &id, &bag).unwrap();
        assert_eq!(updated.get("extra"), Some(&Value::Int(7)));
    }

    #[test]
    fn destroy_all_clears_container() {
        let backend = MemoryBackend::new();
        let schema = schema();
        let (bag, _) = bag_with_id(&schema);
        backend.add(&schema, &bag).unwrap();

        backend.destroy_all(&schema).unwrap();
        assert_eq!(backend.count(&schema).unwrap(), 0);
    }
}
