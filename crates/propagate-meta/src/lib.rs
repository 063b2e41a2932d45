//! # propagate-meta
//!
//! File-backed package metadata for `propagate-kernel`.
//!
//! Metadata is extracted from Go sources ahead of time and stored as JSON
//! Lines, one package per line. [`MetaStore`] loads one or more such files
//! and serves them through the kernel's `PackageLoader` seam.
//!
//! ```text
//! packages.jsonl (one line per package)
//!     ↓  load
//! MetaStore (deterministic in-memory index by import path)
//!     ↓  PackageLoader
//! propagate_interfaces
//! ```

pub mod jsonl;
pub mod store;

pub use jsonl::{MetaError, read_packages, read_packages_from_path};
pub use store::MetaStore;
