//! The store facade.
//!
//! [`Store`] binds a schema registry to one storage backend and exposes the
//! uniform operation surface: add, retrieve, replace, remove, count,
//! destroy-all, and query. Every query runs the same pipeline regardless of
//! backend: translate the clause into the backend's filter dialect, fetch
//! matching rows, resolve joins, project, then order and page.

use crate::error::{CoreError, CoreResult};
use crate::{join, page, project, translate};
use chrono::Utc;
use tracing::debug;
use unistore_model::{
    identifier, set_identifier, EntitySchema, PropertyBag, QueryBuilder, QueryClause,
    SchemaRegistry, Value, CREATED_AT_FIELD,
};
use unistore_storage::StoreBackend;
use uuid::Uuid;

/// A uniform store over one backend.
///
/// The registry and the backend are fixed at construction; all operations
/// take `&self`, so a `Store` can be shared across threads (the backends
/// synchronize internally).
pub struct Store {
    registry: SchemaRegistry,
    backend: Box<dyn StoreBackend>,
}

impl Store {
    /// Creates a store over the given backend.
    #[must_use]
    pub fn new(registry: SchemaRegistry, backend: Box<dyn StoreBackend>) -> Self {
        Self { registry, backend }
    }

    /// Returns the schema registry.
    #[must_use]
    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Starts a query against an entity type.
    ///
    /// # Errors
    ///
    /// Returns an error when the entity type is not registered.
    pub fn query_for(&self, entity: &str) -> CoreResult<QueryBuilder> {
        let schema = self.registry.get(entity)?;
        Ok(QueryBuilder::from_schema(schema))
    }

    /// Persists a new entity and returns its identifier.
    ///
    /// Assigns a fresh GUID identifier when the bag carries none and stamps
    /// the creation timestamp when absent. Supplied fields are validated
    /// against the schema's declared kinds.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidArgument`] for an empty bag, a model error
    /// for undeclared fields or kind mismatches, and a storage error when the
    /// backend fails.
    pub fn add(&self, entity: &str, mut bag: PropertyBag) -> CoreResult<String> {
        let schema = self.registry.get(entity)?;
        if bag.is_empty() {
            return Err(CoreError::invalid_argument(format!(
                "cannot add an empty `{entity}` entity"
            )));
        }
        validate_kinds(&bag, schema)?;
        canonicalize_complex(&mut bag);

        if identifier(&bag, schema).is_none() {
            set_identifier(&mut bag, schema, &Uuid::new_v4().to_string());
        }
        let stamped = bag
            .get(CREATED_AT_FIELD)
            .is_some_and(|value| !value.is_null());
        if !stamped {
            bag.insert(
                CREATED_AT_FIELD.to_string(),
                Value::DateTimeOffset(Utc::now().fixed_offset()),
            );
        }

        let id = self.backend.add(schema, &bag)?;
        debug!(entity, id = %id, "added entity");
        Ok(id)
    }

    /// Fetches an entity by identifier.
    ///
    /// Returns `Ok(None)` when no such entity exists.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidArgument`] for an empty identifier.
    pub fn retrieve(&self, entity: &str, id: &str) -> CoreResult<Option<PropertyBag>> {
        let schema = self.registry.get(entity)?;
        require_id(entity, id)?;
        Ok(self.backend.retrieve(schema, id)?)
    }

    /// Replaces an existing entity and returns the stored bag.
    ///
    /// A replacement never moves the entity in creation order: when the
    /// incoming bag omits the creation timestamp, the previously stored one
    /// is retained.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EmptyIdentifier`] when the bag carries no usable
    /// identifier, and a storage not-found error when the entity does not
    /// exist.
    pub fn replace(&self, entity: &str, mut bag: PropertyBag) -> CoreResult<PropertyBag> {
        let schema = self.registry.get(entity)?;
        validate_kinds(&bag, schema)?;
        canonicalize_complex(&mut bag);
        let id = identifier(&bag, schema)
            .ok_or_else(|| CoreError::empty_identifier(entity))?;

        let stamped = bag
            .get(CREATED_AT_FIELD)
            .is_some_and(|value| !value.is_null());
        if !stamped {
            if let Some(previous) = self
                .backend
                .retrieve(schema, &id)?
                .and_then(|existing| existing.get(CREATED_AT_FIELD).cloned())
            {
                if !previous.is_null() {
                    bag.insert(CREATED_AT_FIELD.to_string(), previous);
                }
            }
        }

        let stored = self.backend.replace(schema, &id, &bag)?;
        debug!(entity, id = %id, "replaced entity");
        Ok(stored)
    }

    /// Removes an entity by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidArgument`] for an empty identifier and a
    /// storage not-found error when the entity does not exist.
    pub fn remove(&self, entity: &str, id: &str) -> CoreResult<()> {
        let schema = self.registry.get(entity)?;
        require_id(entity, id)?;
        self.backend.remove(schema, id)?;
        debug!(entity, id = %id, "removed entity");
        Ok(())
    }

    /// Counts the entities of a type; zero when the container does not exist.
    pub fn count(&self, entity: &str) -> CoreResult<usize> {
        let schema = self.registry.get(entity)?;
        Ok(self.backend.count(schema)?)
    }

    /// Removes every entity of a type.
    pub fn destroy_all(&self, entity: &str) -> CoreResult<()> {
        let schema = self.registry.get(entity)?;
        self.backend.destroy_all(schema)?;
        debug!(entity, "destroyed container");
        Ok(())
    }

    /// Runs a query clause and returns the matching rows.
    ///
    /// A clause with neither a scan-all marker nor any filter matches
    /// nothing. Otherwise the clause is translated into the backend's filter
    /// dialect, matching rows are fetched in creation order, joins are
    /// resolved, the selection list is projected onto the full entity shape,
    /// and ordering plus offset/limit apply last.
    ///
    /// # Errors
    ///
    /// Returns a model error when the clause references unknown entities and
    /// a storage error when the backend fails.
    pub fn query(&self, clause: &QueryClause) -> CoreResult<Vec<PropertyBag>> {
        let schema = self.registry.get(clause.entity())?;
        if clause.is_noop() {
            debug!(entity = clause.entity(), "query has no filter and no scan-all marker");
            return Ok(Vec::new());
        }

        let filter = translate::translate(clause, schema, self.backend.dialect())?;
        debug!(
            entity = clause.entity(),
            filter = filter.text(),
            "dispatching query"
        );
        let rows = self.backend.query(schema, &filter)?;

        let rows = join::resolve(rows, clause, &self.registry, &mut |joined| {
            self.scan_container(joined)
        })?;
        let rows = project::project(rows, clause, schema);
        Ok(page::order_and_page(
            rows,
            clause,
            schema,
            self.backend.result_cap(),
        ))
    }

    /// Scans a container in full, through the backend's own dialect.
    fn scan_container(&self, schema: &EntitySchema) -> CoreResult<Vec<PropertyBag>> {
        let clause = QueryBuilder::from_schema(schema)
            .scan_all()
            .build(&self.registry)?;
        let filter = translate::translate(&clause, schema, self.backend.dialect())?;
        Ok(self.backend.query(schema, &filter)?)
    }
}

/// Checks every supplied field against the schema's declared kinds.
fn validate_kinds(bag: &PropertyBag, schema: &EntitySchema) -> CoreResult<()> {
    for (name, value) in bag {
        let kind = schema.kind_of(name)?;
        if !value.fits_kind(kind) {
            return Err(unistore_model::ModelError::KindMismatch {
                field: name.clone(),
                declared: kind.to_string(),
                actual: value
                    .kind()
                    .map(|k| k.to_string())
                    .unwrap_or_else(|| "null".to_string()),
            }
            .into());
        }
    }
    Ok(())
}

/// Rewrites complex values into their canonical JSON text before they reach
/// a backend, so the stored string is identical across storage layouts.
fn canonicalize_complex(bag: &mut PropertyBag) {
    for value in bag.values_mut() {
        if matches!(value, Value::Complex(_)) {
            let canonical = std::mem::replace(value, Value::Null).canonical();
            *value = canonical;
        }
    }
}

fn require_id(entity: &str, id: &str) -> CoreResult<()> {
    if id.is_empty() {
        return Err(CoreError::invalid_argument(format!(
            "empty identifier for `{entity}`"
        )));
    }
    Ok(())
}
