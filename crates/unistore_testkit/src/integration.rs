//! Cross-backend integration helpers.
//!
//! The equivalence harness applies the same writes to every backend and
//! asserts that the same query yields the same logical rows everywhere.
//! Identifiers and creation timestamps differ between stores, so
//! comparisons go through named columns rather than whole bags.

use crate::fixtures::{all_backends, TestStore};
use unistore_core::Store;
use unistore_model::{PropertyBag, QueryClause, Value};

/// A harness that mirrors every operation across all backends.
pub struct EquivalenceHarness {
    stores: Vec<TestStore>,
}

impl Default for EquivalenceHarness {
    fn default() -> Self {
        Self::new()
    }
}

impl EquivalenceHarness {
    /// Creates a harness with one store per backend.
    pub fn new() -> Self {
        Self {
            stores: all_backends(),
        }
    }

    /// Adds the same bag to every store.
    pub fn add(&self, entity: &str, bag: &PropertyBag) {
        for test_store in &self.stores {
            test_store
                .add(entity, bag.clone())
                .unwrap_or_else(|e| panic!("add on {} failed: {e}", test_store.label));
        }
    }

    /// Runs the clause built by `build` on every store and returns the
    /// `field` column, asserting all backends agree on it.
    pub fn column(&self, build: impl Fn(&Store) -> QueryClause, field: &str) -> Vec<Value> {
        let mut agreed: Option<(&'static str, Vec<Value>)> = None;
        for test_store in &self.stores {
            let clause = build(&test_store.store);
            let rows = test_store
                .query(&clause)
                .unwrap_or_else(|e| panic!("query on {} failed: {e}", test_store.label));
            let column: Vec<Value> = rows
                .iter()
                .map(|row| row.get(field).cloned().unwrap_or(Value::Null))
                .collect();
            match &agreed {
                None => agreed = Some((test_store.label, column)),
                Some((label, expected)) => {
                    assert_eq!(
                        &column, expected,
                        "column `{field}`: {} disagrees with {label}",
                        test_store.label
                    );
                }
            }
        }
        agreed.map(|(_, column)| column).unwrap_or_default()
    }

    /// The stores under test.
    pub fn stores(&self) -> &[TestStore] {
        &self.stores
    }
}
