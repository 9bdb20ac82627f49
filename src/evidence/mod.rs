//! Tamper-evident run evidence.
//!
//! A run produces a content-hash manifest over its artifacts plus one
//! timestamped receipt per lifecycle phase, proving what was assessed and
//! when.

pub mod manifest;
pub mod receipts;

pub use manifest::{build_manifest, sha256_file, HashEntry, Manifest};
pub use receipts::{receipt, write_receipt, Receipt};
