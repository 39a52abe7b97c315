//! In-process table-store emulator.
//!
//! Stands at the wire-client boundary for a cloud table product: rows are
//! string-typed column maps, the entity identifier lives in the native
//! `RowKey` column, and nulls use the reserved sentinel because the layout
//! can only store strings. Speaks the [`FilterDialect::TableFilter`]
//! dialect.

use crate::backend::{FilterDialect, RowFilter, StoreBackend};
use crate::error::{StorageError, StorageResult};
use crate::strmap;
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::debug;
use unistore_model::{identifier, set_identifier, EntitySchema, PropertyBag};

/// Name of the native row-key column the identifier field maps onto.
pub const ROW_KEY_COLUMN: &str = "RowKey";

/// Row cap of the emulated table product.
const TABLE_RESULT_CAP: usize = 1000;

type Row = HashMap<String, String>;

/// An in-process table-store backend.
///
/// Rows are held per table in creation order. All columns are strings; the
/// shared string codec provides typed renderings and the null sentinel.
#[derive(Debug, Default)]
pub struct TableBackend {
    tables: RwLock<HashMap<String, Vec<Row>>>,
}

impl TableBackend {
    /// Creates a new empty table backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn encode_row(schema: &EntitySchema, bag: &PropertyBag, id: &str) -> Row {
        let mut row = strmap::encode_bag(schema, bag);
        row.remove(schema.id_field());
        row.insert(ROW_KEY_COLUMN.to_string(), id.to_string());
        row
    }

    fn decode_row(schema: &EntitySchema, row: &Row) -> PropertyBag {
        // RowKey is not a schema field, so decode_bag skips it; the
        // identifier is restored from it afterwards.
        let mut bag = strmap::decode_bag(schema, row);
        if let Some(key) = row.get(ROW_KEY_COLUMN) {
            set_identifier(&mut bag, schema, key);
        }
        bag
    }

    fn row_position(rows: &[Row], id: &str) -> Option<usize> {
        rows.iter()
            .position(|row| row.get(ROW_KEY_COLUMN).map(String::as_str) == Some(id))
    }
}

impl StoreBackend for TableBackend {
    fn add(&self, schema: &EntitySchema, bag: &PropertyBag) -> StorageResult<String> {
        let id = identifier(bag, schema).ok_or_else(|| StorageError::MissingIdentifier {
            container: schema.container().to_string(),
        })?;
        let row = Self::encode_row(schema, bag, &id);
        self.tables
            .write()
            .entry(schema.container().to_string())
            .or_default()
            .push(row);
        Ok(id)
    }

    fn remove(&self, schema: &EntitySchema, id: &str) -> StorageResult<()> {
        let mut tables = self.tables.write();
        let rows = tables
            .get_mut(schema.container())
            .ok_or_else(|| StorageError::not_found(schema.container(), id))?;
        match Self::row_position(rows, id) {
            Some(index) => {
                rows.remove(index);
                Ok(())
            }
            None => Err(StorageError::not_found(schema.container(), id)),
        }
    }

    fn retrieve(&self, schema: &EntitySchema, id: &str) -> StorageResult<Option<PropertyBag>> {
        let tables = self.tables.read();
        let Some(rows) = tables.get(schema.container()) else {
            return Ok(None);
        };
        Ok(Self::row_position(rows, id).map(|i| Self::decode_row(schema, &rows[i])))
    }

    fn replace(
        &self,
        schema: &EntitySchema,
        id: &str,
        bag: &PropertyBag,
    ) -> StorageResult<PropertyBag> {
        let mut tables = self.tables.write();
        let rows = tables
            .get_mut(schema.container())
            .ok_or_else(|| StorageError::not_found(schema.container(), id))?;
        match Self::row_position(rows, id) {
            Some(index) => {
                rows[index] = Self::encode_row(schema, bag, id);
                Ok(Self::decode_row(schema, &rows[index]))
            }
            None => Err(StorageError::not_found(schema.container(), id)),
        }
    }

    fn count(&self, schema: &EntitySchema) -> StorageResult<usize> {
        Ok(self
            .tables
            .read()
            .get(schema.container())
            .map_or(0, Vec::len))
    }

    fn query(
        &self,
        schema: &EntitySchema,
        filter: &dyn RowFilter,
    ) -> StorageResult<Vec<PropertyBag>> {
        debug!(
            table = schema.container(),
            filter = filter.native_text(),
            "executing table filter"
        );
        let tables = self.tables.read();
        let Some(rows) = tables.get(schema.container()) else {
            return Ok(Vec::new());
        };
        Ok(rows
            .iter()
            .map(|row| Self::decode_row(schema, row))
            .filter(|bag| filter.matches(bag))
            .collect())
    }

    fn destroy_all(&self, schema: &EntitySchema) -> StorageResult<()> {
        self.tables.write().remove(schema.container());
        Ok(())
    }

    fn dialect(&self) -> FilterDialect {
        FilterDialect::TableFilter
    }

    fn result_cap(&self) -> usize {
        TABLE_RESULT_CAP
    }
}
