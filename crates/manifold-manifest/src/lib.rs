//! Raw manifest parsing and submission discovery
//!
//! This crate handles:
//! - Parsing submitted manifest CSVs into nullable-text tables
//! - Extracting the target component from a manifest
//! - Walking a submission tree (one directory per center) and picking the
//!   latest version of each manifest

pub mod manifest;
pub mod submission;

pub use manifest::{ComponentError, ManifestError, Provenance, RawManifest, COMPONENT_COLUMN};
pub use submission::{discover, Submission};
