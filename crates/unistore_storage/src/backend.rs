//! Storage backend trait definition.

use crate::error::StorageResult;
use unistore_model::{EntitySchema, PropertyBag};

/// The filter language a backend speaks.
///
/// The store picks the matching predicate translator by this value, so a
/// backend always receives filters rendered in its own dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterDialect {
    /// Dynamic in-memory predicate (parenthesized boolean expression).
    Predicate,
    /// SQL-like document-store query (`SELECT * FROM <container> t WHERE ..`).
    DocumentSql,
    /// Table-store filter conditions (`Field eq 'literal'` chains).
    TableFilter,
}

/// A translated predicate handed to [`StoreBackend::query`].
///
/// Carries both the evaluable form and the rendered native filter text.
/// In-process backends evaluate `matches`; the text is what an out-of-process
/// adapter would send over the wire, and it is logged at the dispatch
/// boundary either way.
pub trait RowFilter: Send + Sync {
    /// Tests one decoded row against the predicate.
    fn matches(&self, bag: &PropertyBag) -> bool;

    /// The filter rendered in the backend's native language.
    fn native_text(&self) -> &str;
}

/// A storage backend for UniStore.
///
/// Backends store **property bags** keyed by container and identifier. They
/// own their persisted layout (in-memory values, flat JSON string maps,
/// documents, string-typed table rows) and decode back to bags using the
/// field metadata in the [`EntitySchema`] passed to every call.
///
/// # Invariants
///
/// - A single `add`/`replace`/`remove` is atomic from the caller's view
/// - `query` and `count` against a container that does not exist yield zero
///   matches, never an error
/// - `query` returns rows in creation order; ordering and paging are the
///   engine's concern
/// - A malformed stored complex value decodes to null, not an error
/// - Backends must be `Send + Sync`
///
/// # Implementors
///
/// - [`super::MemoryBackend`] - ephemeral, for tests and caches
/// - [`super::FileBackend`] - one JSON file per entity under a container
///   directory
/// - [`super::DocumentBackend`] - in-process document-store emulator
/// - [`super::TableBackend`] - in-process table-store emulator
pub trait StoreBackend: Send + Sync {
    /// Persists a new entity and returns its identifier.
    ///
    /// The bag must already carry a non-empty identifier (the store facade
    /// assigns one when the caller did not).
    ///
    /// # Errors
    ///
    /// Returns an error if the bag has no usable identifier or an I/O error
    /// occurs.
    fn add(&self, schema: &EntitySchema, bag: &PropertyBag) -> StorageResult<String>;

    /// Removes an entity by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`crate::StorageError::NotFound`] when no such entity exists.
    fn remove(&self, schema: &EntitySchema, id: &str) -> StorageResult<()>;

    /// Fetches an entity by identifier.
    ///
    /// Returns `Ok(None)` when the entity (or the whole container) does not
    /// exist.
    fn retrieve(&self, schema: &EntitySchema, id: &str) -> StorageResult<Option<PropertyBag>>;

    /// Replaces an existing entity and returns the updated bag.
    ///
    /// # Errors
    ///
    /// Returns [`crate::StorageError::NotFound`] when no such entity exists.
    fn replace(
        &self,
        schema: &EntitySchema,
        id: &str,
        bag: &PropertyBag,
    ) -> StorageResult<PropertyBag>;

    /// Counts the entities in the container; zero when it does not exist.
    fn count(&self, schema: &EntitySchema) -> StorageResult<usize>;

    /// Returns all rows matching the translated predicate, in creation
    /// order.
    fn query(&self, schema: &EntitySchema, filter: &dyn RowFilter)
        -> StorageResult<Vec<PropertyBag>>;

    /// Removes every entity in the container.
    fn destroy_all(&self, schema: &EntitySchema) -> StorageResult<()>;

    /// The filter dialect this backend speaks.
    fn dialect(&self) -> FilterDialect;

    /// Maximum rows a single query may return when the caller sets no limit.
    fn result_cap(&self) -> usize {
        usize::MAX
    }
}
