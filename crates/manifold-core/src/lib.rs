//! Manifold Core
//!
//! Core domain model with stable, versioned types.
//! Never rename diagnostic codes - they are part of the public API.

pub mod config;
pub mod diagnostic;
pub mod enrich;
pub mod report;
pub mod sanitize;
pub mod schema;
pub mod table;

pub use config::{AugmentationRule, Config, DestinationConfig, DESCRIPTION_PLACEHOLDER};
pub use diagnostic::{Diagnostic, DiagnosticCode, Severity};
pub use enrich::{FileRecord, ReleaseRecord};
pub use report::{RunReport, ReportVersion};
pub use sanitize::sanitize_name;
pub use schema::{FieldType, SchemaField, TableSchema};
pub use table::{Table, TableError};
