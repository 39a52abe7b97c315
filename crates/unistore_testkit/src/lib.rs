//! # UniStore Testkit
//!
//! Test utilities for UniStore.
//!
//! This crate provides:
//! - Per-backend store fixtures with automatic cleanup
//! - A shared sample schema set (`Instrument` plus `Maker`)
//! - A cross-backend equivalence harness
//! - Property-based test generators using proptest
//!
//! ## Usage
//!
//! ```rust,ignore
//! use unistore_testkit::prelude::*;
//!
//! #[test]
//! fn same_result_everywhere() {
//!     for_each_backend(|ts| {
//!         ts.add("Instrument", instrument("cello", 1)).unwrap();
//!         assert_eq!(ts.count("Instrument").unwrap(), 1, "{}", ts.label);
//!     });
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod integration;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::integration::*;
}

pub use fixtures::*;
pub use generators::*;
pub use integration::*;
