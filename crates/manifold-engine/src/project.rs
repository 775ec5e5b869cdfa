//! Manifest projection
//!
//! Reindexes a raw manifest onto its component's resolved attribute set
//! and stamps provenance columns. Cells stay nullable text; typing is
//! deferred to finalization so one malformed value cannot fail a load.

use manifold_core::{Table, TableError};
use manifold_manifest::Provenance;
use manifold_model::AttributeSet;

/// Provenance column: submitting center name
pub const CENTER_COLUMN: &str = "HTAN_Center";

/// Provenance column: storage-system manifest identifier
pub const MANIFEST_ID_COLUMN: &str = "Manifest_Id";

/// Provenance column: manifest version number (typed INTEGER at finalization)
pub const MANIFEST_VERSION_COLUMN: &str = "Manifest_Version";

/// Project a raw manifest table onto an attribute set.
///
/// Columns outside the set are dropped, attributes the manifest lacks
/// become entirely-null columns, and the three provenance columns are
/// appended. Column order is deterministic for a given set but carries
/// no meaning.
pub fn project(
    table: &Table,
    attributes: &AttributeSet,
    provenance: &Provenance,
) -> Result<Table, TableError> {
    let mut projected = table.reindex(&attributes.to_columns())?;

    projected.add_const_column(CENTER_COLUMN, Some(provenance.center.clone()))?;
    projected.add_const_column(MANIFEST_ID_COLUMN, Some(provenance.manifest_id.clone()))?;
    projected.add_const_column(MANIFEST_VERSION_COLUMN, Some(provenance.version.to_string()))?;

    Ok(projected)
}
