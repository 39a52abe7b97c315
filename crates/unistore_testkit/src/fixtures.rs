//! Test fixtures and store helpers.
//!
//! Provides a shared sample schema set and per-backend store constructors,
//! so tests can run the same scenario over every backend.

use chrono::{NaiveDate, TimeZone, Utc};
use tempfile::TempDir;
use unistore_core::Store;
use unistore_model::{
    EntitySchema, FieldDef, FieldKind, PropertyBag, SchemaRegistry, Value,
};
use unistore_storage::{DocumentBackend, FileBackend, MemoryBackend, TableBackend};

/// A test store with automatic cleanup.
pub struct TestStore {
    /// The store under test.
    pub store: Store,
    /// Human-readable backend label, for assertion messages.
    pub label: &'static str,
    /// The temporary directory (kept alive to prevent cleanup).
    _temp_dir: Option<TempDir>,
}

impl TestStore {
    /// Creates a store over the in-memory backend.
    pub fn memory() -> Self {
        Self {
            store: Store::new(sample_registry(), Box::new(MemoryBackend::new())),
            label: "memory",
            _temp_dir: None,
        }
    }

    /// Creates a store over the flat-file backend in a temp directory.
    pub fn file() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let backend = FileBackend::open(temp_dir.path()).expect("Failed to open file backend");
        Self {
            store: Store::new(sample_registry(), Box::new(backend)),
            label: "file",
            _temp_dir: Some(temp_dir),
        }
    }

    /// Creates a store over the document-store emulator.
    pub fn document() -> Self {
        Self {
            store: Store::new(sample_registry(), Box::new(DocumentBackend::new())),
            label: "document",
            _temp_dir: None,
        }
    }

    /// Creates a store over the table-store emulator.
    pub fn table() -> Self {
        Self {
            store: Store::new(sample_registry(), Box::new(TableBackend::new())),
            label: "table",
            _temp_dir: None,
        }
    }
}

impl std::ops::Deref for TestStore {
    type Target = Store;

    fn deref(&self) -> &Self::Target {
        &self.store
    }
}

/// One store per backend, for equivalence scenarios.
pub fn all_backends() -> Vec<TestStore> {
    vec![
        TestStore::memory(),
        TestStore::file(),
        TestStore::document(),
        TestStore::table(),
    ]
}

/// The shared sample registry: `Instrument` plus `Maker`.
///
/// `Instrument.maker_id` is text so joins can target `Maker.code`.
pub fn sample_registry() -> SchemaRegistry {
    let mut registry = SchemaRegistry::new();
    registry
        .register(EntitySchema::new(
            "Instrument",
            vec![
                FieldDef::new("name", FieldKind::Text),
                FieldDef::new("rank", FieldKind::Int),
                FieldDef::new("weight", FieldKind::Double),
                FieldDef::new("in_stock", FieldKind::Bool),
                FieldDef::new("serial", FieldKind::Long),
                FieldDef::new("photo", FieldKind::Bytes),
                FieldDef::new("tuned_at", FieldKind::DateTimeOffset),
                FieldDef::new("serviced_on", FieldKind::DateTime),
                FieldDef::new("tags", FieldKind::Complex),
                FieldDef::new("maker_id", FieldKind::Text),
                FieldDef::new("maker_name", FieldKind::Text),
            ],
        ))
        .expect("register Instrument");
    registry
        .register(EntitySchema::new(
            "Maker",
            vec![
                FieldDef::new("code", FieldKind::Text),
                FieldDef::new("name", FieldKind::Text),
                FieldDef::new("country", FieldKind::Text),
            ],
        ))
        .expect("register Maker");
    registry
}

/// Builds an instrument bag with the common fields set.
pub fn instrument(name: &str, rank: i32) -> PropertyBag {
    let mut bag = PropertyBag::new();
    bag.insert("name".into(), Value::Text(name.into()));
    bag.insert("rank".into(), Value::Int(rank));
    bag.insert("weight".into(), Value::Double(f64::from(rank) * 1.5));
    bag.insert("in_stock".into(), Value::Bool(rank % 2 == 0));
    bag.insert("serial".into(), Value::Long(1_000_000 + i64::from(rank)));
    bag
}

/// Builds a maker bag.
pub fn maker(code: &str, name: &str, country: &str) -> PropertyBag {
    let mut bag = PropertyBag::new();
    bag.insert("code".into(), Value::Text(code.into()));
    bag.insert("name".into(), Value::Text(name.into()));
    bag.insert("country".into(), Value::Text(country.into()));
    bag
}

/// A fixed timestamp for deterministic datetime assertions.
pub fn fixed_timestamp() -> Value {
    let utc = Utc
        .with_ymd_and_hms(2024, 6, 15, 12, 30, 45)
        .single()
        .expect("valid timestamp");
    Value::DateTimeOffset(utc.fixed_offset())
}

/// A fixed offset-free timestamp for naive datetime assertions.
pub fn fixed_naive_timestamp() -> Value {
    let naive = NaiveDate::from_ymd_opt(2024, 6, 15)
        .and_then(|d| d.and_hms_milli_opt(8, 15, 30, 250))
        .expect("valid naive timestamp");
    Value::DateTime(naive)
}

/// Runs a scenario against every backend, labeling failures by backend.
pub fn for_each_backend<F>(mut scenario: F)
where
    F: FnMut(&TestStore),
{
    for test_store in all_backends() {
        scenario(&test_store);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_registry_declares_both_entities() {
        let registry = sample_registry();
        assert!(registry.get("Instrument").is_ok());
        assert!(registry.get("Maker").is_ok());
        assert_eq!(
            registry.get("Instrument").unwrap().container(),
            "instruments"
        );
    }

    #[test]
    fn every_backend_starts_empty() {
        for_each_backend(|test_store| {
            assert_eq!(
                test_store.count("Instrument").unwrap(),
                0,
                "{}",
                test_store.label
            );
        });
    }

    #[test]
    fn file_store_cleans_up_with_the_fixture() {
        let path;
        {
            let test_store = TestStore::file();
            path = test_store
                ._temp_dir
                .as_ref()
                .expect("file store has a temp dir")
                .path()
                .to_path_buf();
            test_store
                .add("Instrument", instrument("cello", 1))
                .unwrap();
            assert!(path.exists());
        }
        assert!(!path.exists());
    }
}
