//! # UniStore Storage
//!
//! Backend adapter trait and implementations for UniStore.
//!
//! Backends are **property-bag stores**: they persist entities in their own
//! native layout and hand back bags decoded with the schema's field
//! metadata. Query translation lives above this crate; a backend receives a
//! translated predicate as a [`RowFilter`] in its own [`FilterDialect`] and
//! applies it row by row.
//!
//! ## Available Backends
//!
//! - [`MemoryBackend`] - ephemeral, for tests and caches
//! - [`FileBackend`] - one JSON file per entity under a container directory
//! - [`DocumentBackend`] - in-process document-store emulator (typed JSON)
//! - [`TableBackend`] - in-process table-store emulator (string-typed rows)

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod document;
mod error;
mod file;
mod memory;
mod strmap;
mod table;

pub use backend::{FilterDialect, RowFilter, StoreBackend};
pub use document::DocumentBackend;
pub use error::{StorageError, StorageResult};
pub use file::FileBackend;
pub use memory::MemoryBackend;
pub use table::{TableBackend, ROW_KEY_COLUMN};
