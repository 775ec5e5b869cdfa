//! Raw manifest tables as submitted by research centers

use manifold_core::{Table, TableError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Column naming the component a manifest targets
pub const COMPONENT_COLUMN: &str = "Component";

/// Errors reading a manifest file
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("Failed to read manifest {0}: {1}")]
    Io(String, String),

    #[error("Failed to parse manifest CSV {0}: {1}")]
    Csv(String, String),

    #[error("Invalid manifest shape in {0}: {1}")]
    Shape(String, TableError),
}

/// Why a manifest's component could not be determined.
///
/// All variants are per-manifest recoverable: the caller skips the
/// manifest, records a MALFORMED_MANIFEST diagnostic, and continues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ComponentError {
    #[error("Manifest has no rows")]
    NoRows,

    #[error("Manifest has no Component column")]
    NoColumn,

    #[error("Component value is N/A")]
    Na,
}

/// Facts about a manifest assigned by its storage system.
///
/// The identifier and version number are external facts, not computed
/// here; the center is the submitting research center's name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    /// Submitting center name
    pub center: String,

    /// Storage-system manifest identifier
    pub manifest_id: String,

    /// Monotonically increasing manifest version
    pub version: i64,
}

impl Provenance {
    /// Create provenance facts for one manifest
    pub fn new(center: impl Into<String>, manifest_id: impl Into<String>, version: i64) -> Self {
        Self {
            center: center.into(),
            manifest_id: manifest_id.into(),
            version,
        }
    }
}

/// A tabular metadata submission from one research center
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawManifest {
    /// The submitted table; empty cells are null
    pub table: Table,

    /// Storage-system facts about this manifest
    pub provenance: Provenance,
}

impl RawManifest {
    /// Read a manifest CSV.
    ///
    /// Empty cells become null so that a blank field stays distinct from
    /// an empty-but-quoted one downstream. Column schemas are not fixed
    /// across sources; whatever headers the file carries are kept.
    pub fn from_csv(path: &Path, provenance: Provenance) -> Result<Self, ManifestError> {
        let display = path.display().to_string();
        let mut reader = csv::ReaderBuilder::new()
            .from_path(path)
            .map_err(|e| ManifestError::Io(display.clone(), e.to_string()))?;

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| ManifestError::Csv(display.clone(), e.to_string()))?
            .iter()
            .map(str::to_string)
            .collect();

        let mut table =
            Table::new(headers).map_err(|e| ManifestError::Shape(display.clone(), e))?;

        for record in reader.records() {
            let record = record.map_err(|e| ManifestError::Csv(display.clone(), e.to_string()))?;
            let row = record
                .iter()
                .map(|cell| {
                    if cell.is_empty() {
                        None
                    } else {
                        Some(cell.to_string())
                    }
                })
                .collect();
            table
                .push_row(row)
                .map_err(|e| ManifestError::Shape(display.clone(), e))?;
        }

        Ok(Self { table, provenance })
    }

    /// The component this manifest targets: the first row's value in the
    /// Component column.
    pub fn component(&self) -> Result<&str, ComponentError> {
        if self.table.column_index(COMPONENT_COLUMN).is_none() {
            return Err(ComponentError::NoColumn);
        }
        if self.table.is_empty() {
            return Err(ComponentError::NoRows);
        }
        self.table.cell(0, COMPONENT_COLUMN).ok_or(ComponentError::Na)
    }
}
