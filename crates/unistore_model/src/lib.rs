//! # UniStore Model
//!
//! Backend-agnostic query model and value types for UniStore.
//!
//! This crate is the leaf of the workspace. It defines:
//!
//! - [`Value`] / [`FieldKind`] - the dynamic value sum type every stored
//!   property and condition literal uses, with the shared string codec for
//!   string-typed storage layouts
//! - [`EntitySchema`] / [`SchemaRegistry`] - explicit per-entity-type field
//!   metadata, built once at startup and read-only thereafter
//! - [`PropertyBag`] - the untyped wire form of an entity
//! - [`QueryClause`] and [`QueryBuilder`] - the immutable query tree and its
//!   fluent, deferred-validating builder
//!
//! ## Example
//!
//! ```rust
//! use unistore_model::{
//!     ComparisonOperator, EntitySchema, FieldDef, FieldKind, QueryBuilder, SchemaRegistry,
//! };
//!
//! let mut registry = SchemaRegistry::new();
//! registry
//!     .register(EntitySchema::new(
//!         "Instrument",
//!         vec![FieldDef::new("name", FieldKind::Text)],
//!     ))
//!     .unwrap();
//!
//! let clause = QueryBuilder::from_schema(registry.get("Instrument").unwrap())
//!     .filter("name", ComparisonOperator::Equal, "cello")
//!     .build(&registry)
//!     .unwrap();
//! assert_eq!(clause.container(), "instruments");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod bag;
mod error;
pub mod query;
mod schema;
mod value;

pub use bag::{identifier, set_identifier, PropertyBag};
pub use error::{ModelError, ModelResult};
pub use query::{
    ComparisonOperator, Direction, GroupBuilder, JoinDefinition, JoinSource, JoinType,
    LogicalOperator, OrderBy, QueryBuilder, QueryClause, ResultOptions, SelectDefinition,
    WhereCondition, WhereExpression, WhereTerm,
};
pub use schema::{EntitySchema, FieldDef, SchemaRegistry, CREATED_AT_FIELD, DEFAULT_ID_FIELD};
pub use value::{FieldKind, Value, NULL_SENTINEL};
