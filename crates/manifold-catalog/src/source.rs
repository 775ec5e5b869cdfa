//! Collaborator traits for external data sources and the loader

use async_trait::async_trait;
use manifold_core::{FileRecord, ReleaseRecord, Table, TableSchema};
use manifold_model::DataModelRow;
use std::collections::HashMap;
use std::fmt;

/// Identifies a destination table in the analytics store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableIdentifier {
    /// Destination project
    pub project: String,

    /// Destination dataset
    pub dataset: String,

    /// Table name (one per component)
    pub table: String,
}

impl TableIdentifier {
    /// Create a new table identifier
    pub fn new(
        project: impl Into<String>,
        dataset: impl Into<String>,
        table: impl Into<String>,
    ) -> Self {
        Self {
            project: project.into(),
            dataset: dataset.into(),
            table: table.into(),
        }
    }

    /// Get fully qualified name
    pub fn fqn(&self) -> String {
        format!("{}.{}.{}", self.project, self.dataset, self.table)
    }
}

impl fmt::Display for TableIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fqn())
    }
}

/// Errors that can occur when fetching from an external source
#[derive(Debug, Clone, thiserror::Error)]
pub enum FetchError {
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    #[error("Source not found: {0}")]
    SourceNotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Query failed: {0}")]
    QueryError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Errors that can occur when loading a finalized table
#[derive(Debug, Clone, thiserror::Error)]
pub enum LoadError {
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    #[error("Destination rejected the table: {0}")]
    Rejected(String),

    #[error("Write failed: {0}")]
    WriteError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Source of the attribute data model, read in bulk before any resolution
#[async_trait]
pub trait SchemaSource: Send + Sync {
    /// Get the source name (e.g. "BigQuery", "Csv")
    fn name(&self) -> &'static str;

    /// Fetch the full set of data model rows
    async fn fetch_data_model(&self) -> Result<Vec<DataModelRow>, FetchError>;
}

/// Source of per-entity file metadata (size, checksum, storage location)
#[async_trait]
pub trait FileIndexSource: Send + Sync {
    /// Get the source name
    fn name(&self) -> &'static str;

    /// Fetch the full file index keyed by entity identifier
    async fn fetch_file_index(&self) -> Result<HashMap<String, FileRecord>, FetchError>;
}

/// Source of per-entity release indicators
#[async_trait]
pub trait ReleaseIndexSource: Send + Sync {
    /// Get the source name
    fn name(&self) -> &'static str;

    /// Fetch the full release index keyed by entity identifier
    async fn fetch_release_index(&self) -> Result<HashMap<String, ReleaseRecord>, FetchError>;
}

/// Destination load job.
///
/// The core treats loads as fire-and-forget: it observes neither retries
/// nor results beyond this call. Loads replace the destination table
/// (write-truncate) with the explicit schema; the destination must not
/// autodetect types.
#[async_trait]
pub trait TableLoader: Send + Sync {
    /// Get the loader name
    fn name(&self) -> &'static str;

    /// Load one finalized table into its destination
    async fn load(
        &self,
        table: &Table,
        schema: &TableSchema,
        destination: &TableIdentifier,
    ) -> Result<(), LoadError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_identifier_fqn() {
        let destination = TableIdentifier::new("htan-dcc", "combined_assays", "ImagingLevel2");
        assert_eq!(destination.fqn(), "htan-dcc.combined_assays.ImagingLevel2");
        assert_eq!(destination.to_string(), "htan-dcc.combined_assays.ImagingLevel2");
    }
}
