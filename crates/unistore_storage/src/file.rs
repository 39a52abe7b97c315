//! File-based storage backend.
//!
//! Persisted layout: one directory per container under the root, one JSON
//! file per entity, filename = sanitized identifier + `.json`. Each file is
//! a flat `{propertyName: stringValue}` map using the shared string codec
//! (null sentinel, ISO-8601 round-trip datetimes, base64 bytes).

use crate::backend::{FilterDialect, RowFilter, StoreBackend};
use crate::error::{StorageError, StorageResult};
use crate::strmap;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use unistore_model::{identifier, EntitySchema, PropertyBag, Value, CREATED_AT_FIELD};

/// A file-based storage backend.
///
/// Data survives process restarts. Speaks the
/// [`FilterDialect::Predicate`] dialect; querying loads the container's
/// files, decodes them to bags, and evaluates the predicate per row.
///
/// # Example
///
/// ```no_run
/// use unistore_storage::FileBackend;
/// use std::path::Path;
///
/// let backend = FileBackend::open(Path::new("data")).unwrap();
/// ```
#[derive(Debug)]
pub struct FileBackend {
    root: PathBuf,
}

impl FileBackend {
    /// Opens a file backend rooted at the given directory, creating it if
    /// missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(root: &Path) -> StorageResult<Self> {
        fs::create_dir_all(root)?;
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    fn container_dir(&self, schema: &EntitySchema) -> PathBuf {
        self.root.join(schema.container())
    }

    fn entity_path(&self, schema: &EntitySchema, id: &str) -> PathBuf {
        self.container_dir(schema).join(format!("{}.json", sanitize(id)))
    }

    fn write_entity(
        &self,
        schema: &EntitySchema,
        id: &str,
        bag: &PropertyBag,
    ) -> StorageResult<()> {
        let dir = self.container_dir(schema);
        fs::create_dir_all(&dir)?;
        let map = strmap::encode_bag(schema, bag);
        let json = serde_json::to_string_pretty(&map)
            .map_err(|e| StorageError::corrupted(schema.container(), e.to_string()))?;
        fs::write(self.entity_path(schema, id), json)?;
        Ok(())
    }

    fn read_entity(&self, schema: &EntitySchema, path: &Path) -> StorageResult<PropertyBag> {
        let json = fs::read_to_string(path)?;
        let map: HashMap<String, String> = serde_json::from_str(&json)
            .map_err(|e| StorageError::corrupted(schema.container(), e.to_string()))?;
        Ok(strmap::decode_bag(schema, &map))
    }

    /// Loads every entity of a container, sorted into creation order.
    ///
    /// Directory listing order is filesystem-dependent, so rows sort by the
    /// reserved creation timestamp (identifier as tie-break).
    fn scan(&self, schema: &EntitySchema) -> StorageResult<Vec<PropertyBag>> {
        let dir = self.container_dir(schema);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut rows = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                rows.push(self.read_entity(schema, &path)?);
            }
        }
        rows.sort_by(|a, b| {
            let null = Value::Null;
            let ca = a.get(CREATED_AT_FIELD).unwrap_or(&null);
            let cb = b.get(CREATED_AT_FIELD).unwrap_or(&null);
            ca.cmp_sort(cb).then_with(|| {
                identifier(a, schema)
                    .unwrap_or_default()
                    .cmp(&identifier(b, schema).unwrap_or_default())
            })
        });
        Ok(rows)
    }
}

impl StoreBackend for FileBackend {
    fn add(&self, schema: &EntitySchema, bag: &PropertyBag) -> StorageResult<String> {
        let id = identifier(bag, schema).ok_or_else(|| StorageError::MissingIdentifier {
            container: schema.container().to_string(),
        })?;
        self.write_entity(schema, &id, bag)?;
        Ok(id)
    }

    fn remove(&self, schema: &EntitySchema, id: &str) -> StorageResult<()> {
        let path = self.entity_path(schema, id);
        if !path.exists() {
            return Err(StorageError::not_found(schema.container(), id));
        }
        fs::remove_file(path)?;
        Ok(())
    }

    fn retrieve(&self, schema: &EntitySchema, id: &str) -> StorageResult<Option<PropertyBag>> {
        let path = self.entity_path(schema, id);
        if !path.exists() {
            return Ok(None);
        }
        self.read_entity(schema, &path).map(Some)
    }

    fn replace(
        &self,
        schema: &EntitySchema,
        id: &str,
        bag: &PropertyBag,
    ) -> StorageResult<PropertyBag> {
        let path = self.entity_path(schema, id);
        if !path.exists() {
            return Err(StorageError::not_found(schema.container(), id));
        }
        self.write_entity(schema, id, bag)?;
        self.read_entity(schema, &path)
    }

    fn count(&self, schema: &EntitySchema) -> StorageResult<usize> {
        let dir = self.container_dir(schema);
        if !dir.exists() {
            return Ok(0);
        }
        let mut count = 0;
        for entry in fs::read_dir(&dir)? {
            if entry?.path().extension().is_some_and(|ext| ext == "json") {
                count += 1;
            }
        }
        Ok(count)
    }

    fn query(
        &self,
        schema: &EntitySchema,
        filter: &dyn RowFilter,
    ) -> StorageResult<Vec<PropertyBag>> {
        debug!(
            container = schema.container(),
            filter = filter.native_text(),
            "evaluating predicate over container files"
        );
        let rows = self.scan(schema)?;
        Ok(rows.into_iter().filter(|row| filter.matches(row)).collect())
    }

    fn destroy_all(&self, schema: &EntitySchema) -> StorageResult<()> {
        let dir = self.container_dir(schema);
        if dir.exists() {
            fs::remove_dir_all(dir)?;
        }
        Ok(())
    }

    fn dialect(&self) -> FilterDialect {
        FilterDialect::Predicate
    }
}

/// Keeps filenames safe: alphanumerics, `-` and `_` pass through, anything
/// else becomes `_`.
fn sanitize(id: &str) -> String {
    id.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
