//! In-memory catalog for testing
//!
//! `MockCatalog` serves a predefined data model and enrichment indexes
//! without touching any external system, and `RecordingLoader` captures
//! load calls instead of performing them. Useful for:
//! - Unit testing the consolidation pipeline end to end
//! - CI runs without credentials
//! - Simulating fetch failures

use crate::source::{
    FetchError, FileIndexSource, LoadError, ReleaseIndexSource, SchemaSource, TableIdentifier,
    TableLoader,
};
use async_trait::async_trait;
use manifold_core::{FileRecord, ReleaseRecord, Table, TableSchema};
use manifold_model::DataModelRow;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Mock source for the data model and both enrichment indexes
#[derive(Default)]
pub struct MockCatalog {
    data_model: Vec<DataModelRow>,
    file_index: HashMap<String, FileRecord>,
    release_index: HashMap<String, ReleaseRecord>,
    fail_fetches: bool,
}

impl MockCatalog {
    /// Create an empty mock catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the data model rows
    pub fn with_data_model(mut self, rows: Vec<DataModelRow>) -> Self {
        self.data_model = rows;
        self
    }

    /// Add a file record for an entity
    pub fn with_file_record(mut self, entity: impl Into<String>, record: FileRecord) -> Self {
        self.file_index.insert(entity.into(), record);
        self
    }

    /// Add a release record for an entity
    pub fn with_release_record(
        mut self,
        entity: impl Into<String>,
        record: ReleaseRecord,
    ) -> Self {
        self.release_index.insert(entity.into(), record);
        self
    }

    /// Make every fetch fail with a network error
    pub fn with_fetch_failure(mut self) -> Self {
        self.fail_fetches = true;
        self
    }

    fn check_failure(&self) -> Result<(), FetchError> {
        if self.fail_fetches {
            Err(FetchError::NetworkError(
                "Simulated fetch failure".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl SchemaSource for MockCatalog {
    fn name(&self) -> &'static str {
        "Mock"
    }

    async fn fetch_data_model(&self) -> Result<Vec<DataModelRow>, FetchError> {
        self.check_failure()?;
        Ok(self.data_model.clone())
    }
}

#[async_trait]
impl FileIndexSource for MockCatalog {
    fn name(&self) -> &'static str {
        "Mock"
    }

    async fn fetch_file_index(&self) -> Result<HashMap<String, FileRecord>, FetchError> {
        self.check_failure()?;
        Ok(self.file_index.clone())
    }
}

#[async_trait]
impl ReleaseIndexSource for MockCatalog {
    fn name(&self) -> &'static str {
        "Mock"
    }

    async fn fetch_release_index(&self) -> Result<HashMap<String, ReleaseRecord>, FetchError> {
        self.check_failure()?;
        Ok(self.release_index.clone())
    }
}

/// One captured load call
#[derive(Debug, Clone, PartialEq)]
pub struct LoadRecord {
    /// Fully qualified destination name
    pub destination: String,

    /// Rows in the loaded table
    pub n_rows: usize,

    /// The schema handed to the loader
    pub schema: TableSchema,
}

/// Loader that records calls instead of loading anything
pub struct RecordingLoader {
    loads: Arc<RwLock<Vec<LoadRecord>>>,
    fail_loads: bool,
}

impl RecordingLoader {
    /// Create a recording loader
    pub fn new() -> Self {
        Self {
            loads: Arc::new(RwLock::new(Vec::new())),
            fail_loads: false,
        }
    }

    /// Make every load fail
    pub fn with_load_failure(mut self) -> Self {
        self.fail_loads = true;
        self
    }

    /// All captured loads in call order
    pub async fn loads(&self) -> Vec<LoadRecord> {
        self.loads.read().await.clone()
    }
}

impl Default for RecordingLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for RecordingLoader {
    fn clone(&self) -> Self {
        Self {
            loads: Arc::clone(&self.loads),
            fail_loads: self.fail_loads,
        }
    }
}

#[async_trait]
impl TableLoader for RecordingLoader {
    fn name(&self) -> &'static str {
        "Recording"
    }

    async fn load(
        &self,
        table: &Table,
        schema: &TableSchema,
        destination: &TableIdentifier,
    ) -> Result<(), LoadError> {
        if self.fail_loads {
            return Err(LoadError::WriteError("Simulated load failure".to_string()));
        }

        self.loads.write().await.push(LoadRecord {
            destination: destination.fqn(),
            n_rows: table.n_rows(),
            schema: schema.clone(),
        });
        Ok(())
    }
}
