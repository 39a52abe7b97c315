//! # UniStore Core
//!
//! The backend-agnostic query engine and store facade.
//!
//! A [`Store`] binds a [`unistore_model::SchemaRegistry`] to one
//! [`unistore_storage::StoreBackend`] and gives every backend the same
//! operation surface and the same query semantics. Queries built with
//! [`unistore_model::QueryBuilder`] run through a fixed pipeline:
//!
//! 1. **Translate** the clause into the backend's filter dialect
//!    ([`translate`]), producing both the rendered native text and a
//!    compiled match program evaluated identically everywhere
//! 2. **Fetch** matching rows from the backend, in creation order
//! 3. **Resolve joins** by merging joined-container rows into the primary
//!    set, left-to-right in declaration order
//! 4. **Project** the selection list onto the full entity shape, filling
//!    unselected fields with kind-appropriate zero values
//! 5. **Order and page** with a stable sort, then offset/limit
//!
//! ## Example
//!
//! ```rust
//! use unistore_core::Store;
//! use unistore_model::{
//!     ComparisonOperator, EntitySchema, FieldDef, FieldKind, PropertyBag, SchemaRegistry, Value,
//! };
//! use unistore_storage::MemoryBackend;
//!
//! let mut registry = SchemaRegistry::new();
//! registry
//!     .register(EntitySchema::new(
//!         "Instrument",
//!         vec![FieldDef::new("name", FieldKind::Text)],
//!     ))
//!     .unwrap();
//! let store = Store::new(registry, Box::new(MemoryBackend::new()));
//!
//! let mut cello = PropertyBag::new();
//! cello.insert("name".into(), Value::Text("cello".into()));
//! let id = store.add("Instrument", cello).unwrap();
//!
//! let clause = store
//!     .query_for("Instrument")
//!     .unwrap()
//!     .filter("name", ComparisonOperator::Equal, "cello")
//!     .build(store.registry())
//!     .unwrap();
//! let rows = store.query(&clause).unwrap();
//! assert_eq!(rows.len(), 1);
//! assert_eq!(unistore_model::identifier(&rows[0], store.registry().get("Instrument").unwrap()), Some(id));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod join;
mod page;
mod project;
mod store;
pub mod translate;

pub use error::{CoreError, CoreResult};
pub use store::Store;
pub use translate::{translate, TranslatedQuery};
