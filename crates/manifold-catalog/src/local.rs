//! Local file-backed sources and a dry-run loader
//!
//! CSV snapshots of the data model, file index, and release index let a
//! consolidation run work entirely from local exports; `JsonLoader`
//! writes each finalized table and schema as JSON instead of loading a
//! warehouse. Useful for local runs and CI.

use crate::source::{
    FetchError, FileIndexSource, LoadError, ReleaseIndexSource, SchemaSource, TableIdentifier,
    TableLoader,
};
use async_trait::async_trait;
use csv::StringRecord;
use manifold_core::{FileRecord, ReleaseRecord, Table, TableSchema};
use manifold_model::DataModelRow;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Split a comma-separated model list, trimming entries and dropping
/// empties (the data model export leaves the cell blank when a row has
/// no dependencies or valid values)
fn split_list(cell: Option<&str>) -> Vec<String> {
    cell.map(|value| {
        value
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

/// Position of a header, accepting any of the given spellings
fn header_index(headers: &StringRecord, names: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|header| names.iter().any(|name| header == *name))
}

fn cell<'r>(record: &'r StringRecord, index: Option<usize>) -> Option<&'r str> {
    let value = record.get(index?)?;
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

fn open_reader(path: &Path) -> Result<csv::Reader<std::fs::File>, FetchError> {
    csv::ReaderBuilder::new()
        .from_path(path)
        .map_err(|e| FetchError::SourceNotFound(format!("{}: {}", path.display(), e)))
}

/// Data model rows from a CSV export.
///
/// Expects the flat data model table: Attribute, DependsOn,
/// Valid Values (or Valid_Values), Description.
pub struct CsvSchemaSource {
    path: PathBuf,
}

impl CsvSchemaSource {
    /// Create a source reading the given CSV export
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SchemaSource for CsvSchemaSource {
    fn name(&self) -> &'static str {
        "Csv"
    }

    async fn fetch_data_model(&self) -> Result<Vec<DataModelRow>, FetchError> {
        let mut reader = open_reader(&self.path)?;
        let headers = reader
            .headers()
            .map_err(|e| FetchError::InvalidResponse(e.to_string()))?
            .clone();

        let attribute_idx = header_index(&headers, &["Attribute"]).ok_or_else(|| {
            FetchError::InvalidResponse(format!(
                "{}: no Attribute column in data model export",
                self.path.display()
            ))
        })?;
        let depends_idx = header_index(&headers, &["DependsOn", "Depends On"]);
        let values_idx = header_index(&headers, &["Valid_Values", "Valid Values"]);
        let description_idx = header_index(&headers, &["Description"]);

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| FetchError::InvalidResponse(e.to_string()))?;
            let Some(attribute) = cell(&record, Some(attribute_idx)) else {
                continue;
            };

            rows.push(DataModelRow::new(
                attribute,
                split_list(cell(&record, depends_idx)),
                split_list(cell(&record, values_idx)),
                cell(&record, description_idx).map(str::to_string),
            ));
        }

        Ok(rows)
    }
}

/// File index from a CSV snapshot of the storage fileview.
///
/// Expects entityId, dataFileSizeBytes, dataFileMD5Hex,
/// dataFileConcreteType, dataFileBucket, dataFileKey.
pub struct CsvFileIndexSource {
    path: PathBuf,
}

impl CsvFileIndexSource {
    /// Create a source reading the given fileview snapshot
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl FileIndexSource for CsvFileIndexSource {
    fn name(&self) -> &'static str {
        "Csv"
    }

    async fn fetch_file_index(&self) -> Result<HashMap<String, FileRecord>, FetchError> {
        let mut reader = open_reader(&self.path)?;
        let headers = reader
            .headers()
            .map_err(|e| FetchError::InvalidResponse(e.to_string()))?
            .clone();

        let entity_idx = header_index(&headers, &["entityId", "id"]).ok_or_else(|| {
            FetchError::InvalidResponse(format!(
                "{}: no entityId column in fileview snapshot",
                self.path.display()
            ))
        })?;
        let size_idx = header_index(&headers, &["dataFileSizeBytes"]);
        let md5_idx = header_index(&headers, &["dataFileMD5Hex"]);
        let concrete_idx = header_index(&headers, &["dataFileConcreteType"]);
        let bucket_idx = header_index(&headers, &["dataFileBucket"]);
        let key_idx = header_index(&headers, &["dataFileKey"]);

        let mut index = HashMap::new();
        for record in reader.records() {
            let record = record.map_err(|e| FetchError::InvalidResponse(e.to_string()))?;
            let Some(entity) = cell(&record, Some(entity_idx)) else {
                continue;
            };

            index.insert(
                entity.to_string(),
                FileRecord {
                    size_bytes: cell(&record, size_idx).and_then(|v| v.parse().ok()),
                    md5: cell(&record, md5_idx).map(str::to_string),
                    concrete_type: cell(&record, concrete_idx).map(str::to_string),
                    bucket: cell(&record, bucket_idx).map(str::to_string),
                    key: cell(&record, key_idx).map(str::to_string),
                },
            );
        }

        Ok(index)
    }
}

/// Release index from a CSV snapshot of the released-entities table.
///
/// Expects entityId, Data_Release, CDS_Release.
pub struct CsvReleaseIndexSource {
    path: PathBuf,
}

impl CsvReleaseIndexSource {
    /// Create a source reading the given release snapshot
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ReleaseIndexSource for CsvReleaseIndexSource {
    fn name(&self) -> &'static str {
        "Csv"
    }

    async fn fetch_release_index(&self) -> Result<HashMap<String, ReleaseRecord>, FetchError> {
        let mut reader = open_reader(&self.path)?;
        let headers = reader
            .headers()
            .map_err(|e| FetchError::InvalidResponse(e.to_string()))?
            .clone();

        let entity_idx = header_index(&headers, &["entityId"]).ok_or_else(|| {
            FetchError::InvalidResponse(format!(
                "{}: no entityId column in release snapshot",
                self.path.display()
            ))
        })?;
        let data_idx = header_index(&headers, &["Data_Release"]);
        let cds_idx = header_index(&headers, &["CDS_Release"]);

        let mut index = HashMap::new();
        for record in reader.records() {
            let record = record.map_err(|e| FetchError::InvalidResponse(e.to_string()))?;
            let Some(entity) = cell(&record, Some(entity_idx)) else {
                continue;
            };

            index.insert(
                entity.to_string(),
                ReleaseRecord {
                    data_release: cell(&record, data_idx).map(str::to_string),
                    cds_release: cell(&record, cds_idx).map(str::to_string),
                },
            );
        }

        Ok(index)
    }
}

/// Dry-run loader writing table and schema JSON files.
///
/// Each load produces `<table>.json` and `<table>.schema.json` under the
/// output directory, overwriting previous runs (the same write-truncate
/// semantics the warehouse loader has).
pub struct JsonLoader {
    out_dir: PathBuf,
}

impl JsonLoader {
    /// Create a loader writing into the given directory
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }
}

#[async_trait]
impl TableLoader for JsonLoader {
    fn name(&self) -> &'static str {
        "Json"
    }

    async fn load(
        &self,
        table: &Table,
        schema: &TableSchema,
        destination: &TableIdentifier,
    ) -> Result<(), LoadError> {
        std::fs::create_dir_all(&self.out_dir)
            .map_err(|e| LoadError::WriteError(e.to_string()))?;

        let table_json = serde_json::to_string_pretty(table)
            .map_err(|e| LoadError::WriteError(e.to_string()))?;
        let schema_json = serde_json::to_string_pretty(schema)
            .map_err(|e| LoadError::WriteError(e.to_string()))?;

        let table_path = self.out_dir.join(format!("{}.json", destination.table));
        let schema_path = self.out_dir.join(format!("{}.schema.json", destination.table));

        std::fs::write(table_path, table_json)
            .map_err(|e| LoadError::WriteError(e.to_string()))?;
        std::fs::write(schema_path, schema_json)
            .map_err(|e| LoadError::WriteError(e.to_string()))?;

        Ok(())
    }
}
