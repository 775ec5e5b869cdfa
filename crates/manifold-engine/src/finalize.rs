//! Post-merge enrichment and schema finalization
//!
//! Runs once per component after all manifests are combined: unifies the
//! Id/Uuid pair, joins file-level and release metadata for file-bearing
//! components, infers the destination schema, resolves column
//! descriptions, sanitizes names, and drops exact duplicate rows.

use crate::project::MANIFEST_VERSION_COLUMN;
use manifold_core::{
    sanitize_name, Config, Diagnostic, DiagnosticCode, FieldType, FileRecord, ReleaseRecord,
    SchemaField, Severity, Table, TableError, TableSchema, DESCRIPTION_PLACEHOLDER,
};
use manifold_model::DataModelIndex;
use std::collections::HashMap;

/// Destination column for file size in bytes (typed INTEGER)
pub const FILE_SIZE_COLUMN: &str = "File_Size";

/// Destination column for the MD5 checksum
pub const MD5_COLUMN: &str = "md5";

/// Destination column for the derived cloud storage URI
pub const CLOUD_PATH_COLUMN: &str = "Cloud_Storage_Path";

/// Destination column for the public data release indicator
pub const DATA_RELEASE_COLUMN: &str = "Data_Release";

/// Destination column for the CDS release indicator
pub const CDS_RELEASE_COLUMN: &str = "CDS_Release";

/// Maximum description length accepted by the destination
const MAX_DESCRIPTION_LEN: usize = 1024;

/// Read-only lookup state for finalization
#[derive(Debug, Clone, Copy)]
pub struct EnrichmentContext<'a> {
    /// The run's data model (description lookups)
    pub index: &'a DataModelIndex,

    /// Run configuration (assay gate, extra descriptions)
    pub config: &'a Config,

    /// File-level metadata keyed by entity identifier
    pub file_index: &'a HashMap<String, FileRecord>,

    /// Release indicators keyed by entity identifier
    pub release_index: &'a HashMap<String, ReleaseRecord>,
}

/// A finalized table with its destination schema and the diagnostics
/// produced while finalizing it
#[derive(Debug, Clone)]
pub struct Finalization {
    /// Component the table belongs to
    pub component: String,

    /// Finalized table (sanitized columns, deduplicated rows)
    pub table: Table,

    /// Destination schema, aligned with the table's columns
    pub schema: TableSchema,

    /// DESCRIPTION_UNAVAILABLE diagnostics from column lookups
    pub diagnostics: Vec<Diagnostic>,
}

/// Finalize one component's combined table.
pub fn finalize(
    component: &str,
    mut table: Table,
    ctx: &EnrichmentContext<'_>,
) -> Result<Finalization, TableError> {
    unify_identifiers(&mut table)?;

    if ctx.config.is_file_component(component) {
        enrich_files(&mut table, ctx)?;
    }

    let mut diagnostics = Vec::new();
    let schema = infer_schema(&table, component, ctx, &mut diagnostics);

    table.map_column_names(sanitize_name);
    table.dedup_rows();

    Ok(Finalization {
        component: component.to_string(),
        table,
        schema,
        diagnostics,
    })
}

/// Substitute Uuid for null Id values, then drop the Uuid column.
///
/// Submissions carry either an explicit Id or a generated Uuid, never
/// reliably both; downstream consumers need one identifier column.
fn unify_identifiers(table: &mut Table) -> Result<(), TableError> {
    if table.column_index("Uuid").is_none() {
        return Ok(());
    }

    if table.column_index("Id").is_some() {
        for row in 0..table.n_rows() {
            if table.cell(row, "Id").is_none() {
                let uuid = table.cell(row, "Uuid").map(str::to_string);
                table.set_cell(row, "Id", uuid)?;
            }
        }
    }

    table.drop_column("Uuid")
}

/// Left-join file-level and release metadata by entity identifier.
///
/// A row whose entity is absent from an index simply gets null cells;
/// enrichment never drops or fails a row.
fn enrich_files(table: &mut Table, ctx: &EnrichmentContext<'_>) -> Result<(), TableError> {
    let n_rows = table.n_rows();
    let mut sizes = Vec::with_capacity(n_rows);
    let mut checksums = Vec::with_capacity(n_rows);
    let mut cloud_paths = Vec::with_capacity(n_rows);
    let mut data_releases = Vec::with_capacity(n_rows);
    let mut cds_releases = Vec::with_capacity(n_rows);

    for row in 0..n_rows {
        let entity = table.cell(row, "entityId");

        let file = entity.and_then(|id| ctx.file_index.get(id));
        sizes.push(file.and_then(|f| f.size_bytes).map(|v| v.to_string()));
        checksums.push(file.and_then(|f| f.md5.clone()));
        cloud_paths.push(file.and_then(FileRecord::cloud_uri));

        let release = entity.and_then(|id| ctx.release_index.get(id));
        data_releases.push(release.and_then(|r| r.data_release.clone()));
        cds_releases.push(release.and_then(|r| r.cds_release.clone()));
    }

    table.add_column(FILE_SIZE_COLUMN, sizes)?;
    table.add_column(MD5_COLUMN, checksums)?;
    table.add_column(CLOUD_PATH_COLUMN, cloud_paths)?;
    table.add_column(DATA_RELEASE_COLUMN, data_releases)?;
    table.add_column(CDS_RELEASE_COLUMN, cds_releases)?;

    Ok(())
}

/// Build the destination schema for a finalized table.
///
/// Every column is STRING except the two structurally-integer columns;
/// descriptions come from the data model, then the configured extras,
/// then a placeholder.
fn infer_schema(
    table: &Table,
    component: &str,
    ctx: &EnrichmentContext<'_>,
    diagnostics: &mut Vec<Diagnostic>,
) -> TableSchema {
    let fields = table
        .columns()
        .iter()
        .map(|column| {
            let field_type =
                if column == FILE_SIZE_COLUMN || column == MANIFEST_VERSION_COLUMN {
                    FieldType::Integer
                } else {
                    FieldType::String
                };

            let description = describe_column(column, component, ctx, diagnostics);
            SchemaField::new(sanitize_name(column), field_type).with_description(description)
        })
        .collect();

    TableSchema::from_fields(fields)
}

/// Look up a column description by display name, falling back to the
/// supplementary source and finally a placeholder.
fn describe_column(
    column: &str,
    component: &str,
    ctx: &EnrichmentContext<'_>,
    diagnostics: &mut Vec<Diagnostic>,
) -> String {
    if let Some(description) = ctx
        .index
        .description_of(column)
        .or_else(|| ctx.config.extra_description(column))
    {
        return truncate_description(description);
    }

    diagnostics.push(
        Diagnostic::new(
            DiagnosticCode::DescriptionUnavailable,
            Severity::Warn,
            format!("No description found for column '{}'", column),
        )
        .with_component(component)
        .with_attribute(column),
    );
    DESCRIPTION_PLACEHOLDER.to_string()
}

fn truncate_description(description: &str) -> String {
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        description.chars().take(MAX_DESCRIPTION_LEN).collect()
    } else {
        description.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use manifold_model::DataModelRow;
    use pretty_assertions::assert_eq;

    fn table(columns: &[&str], rows: &[&[Option<&str>]]) -> Table {
        let mut table = Table::new(columns.iter().map(|s| s.to_string()).collect()).unwrap();
        for row in rows {
            table
                .push_row(row.iter().map(|c| c.map(str::to_string)).collect())
                .unwrap();
        }
        table
    }

    fn empty_index() -> DataModelIndex {
        DataModelIndex::from_rows(vec![])
    }

    struct Fixture {
        index: DataModelIndex,
        config: Config,
        file_index: HashMap<String, FileRecord>,
        release_index: HashMap<String, ReleaseRecord>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                index: empty_index(),
                config: Config::default(),
                file_index: HashMap::new(),
                release_index: HashMap::new(),
            }
        }

        fn ctx(&self) -> EnrichmentContext<'_> {
            EnrichmentContext {
                index: &self.index,
                config: &self.config,
                file_index: &self.file_index,
                release_index: &self.release_index,
            }
        }
    }

    #[test]
    fn uuid_fills_null_id_and_is_dropped() {
        let fixture = Fixture::new();
        let table = table(
            &["Id", "Uuid"],
            &[&[None, Some("u1")], &[Some("explicit"), Some("u2")]],
        );

        let finalized = finalize("Biospecimen", table, &fixture.ctx()).unwrap();

        assert!(finalized.table.column_index("Uuid").is_none());
        assert_eq!(finalized.table.cell(0, "Id"), Some("u1"));
        assert_eq!(finalized.table.cell(1, "Id"), Some("explicit"));
    }

    #[test]
    fn file_components_get_enrichment_columns() {
        let mut fixture = Fixture::new();
        fixture.file_index.insert(
            "syn1".to_string(),
            FileRecord {
                size_bytes: Some(2048),
                md5: Some("abc123".to_string()),
                concrete_type: Some("S3FileHandle".to_string()),
                bucket: Some("b".to_string()),
                key: Some("k".to_string()),
            },
        );
        fixture.release_index.insert(
            "syn1".to_string(),
            ReleaseRecord {
                data_release: Some("true".to_string()),
                cds_release: Some("false".to_string()),
            },
        );

        let table = table(
            &["entityId", "Id", "Uuid"],
            &[
                &[Some("syn1"), Some("a"), None],
                &[Some("syn-unknown"), Some("b"), None],
            ],
        );

        let finalized = finalize("ImagingLevel2", table, &fixture.ctx()).unwrap();

        assert_eq!(finalized.table.cell(0, FILE_SIZE_COLUMN), Some("2048"));
        assert_eq!(finalized.table.cell(0, MD5_COLUMN), Some("abc123"));
        assert_eq!(finalized.table.cell(0, CLOUD_PATH_COLUMN), Some("s3://b/k"));
        assert_eq!(finalized.table.cell(0, DATA_RELEASE_COLUMN), Some("true"));
        assert_eq!(finalized.table.cell(0, CDS_RELEASE_COLUMN), Some("false"));

        // unmatched entity joins to nulls, row is kept
        assert_eq!(finalized.table.cell(1, FILE_SIZE_COLUMN), None);
        assert_eq!(finalized.table.cell(1, CLOUD_PATH_COLUMN), None);
        assert_eq!(finalized.table.n_rows(), 2);
    }

    #[test]
    fn clinical_components_are_not_enriched() {
        let fixture = Fixture::new();
        let table = table(&["entityId", "Id", "Uuid"], &[&[Some("syn1"), Some("a"), None]]);

        let finalized = finalize("Demographics", table, &fixture.ctx()).unwrap();

        assert!(finalized.table.column_index(FILE_SIZE_COLUMN).is_none());
        assert!(finalized.table.column_index(CLOUD_PATH_COLUMN).is_none());
    }

    #[test]
    fn schema_types_default_to_string_with_forced_integers() {
        let fixture = Fixture::new();
        let table = table(
            &["Id", "Uuid", MANIFEST_VERSION_COLUMN],
            &[&[Some("a"), None, Some("1")]],
        );

        let finalized = finalize("ImagingLevel2", table, &fixture.ctx()).unwrap();
        let schema = &finalized.schema;

        assert_eq!(
            schema.find_field("Id").map(|f| f.field_type),
            Some(FieldType::String)
        );
        assert_eq!(
            schema.find_field(MANIFEST_VERSION_COLUMN).map(|f| f.field_type),
            Some(FieldType::Integer)
        );
        assert_eq!(
            schema.find_field(FILE_SIZE_COLUMN).map(|f| f.field_type),
            Some(FieldType::Integer)
        );
    }

    #[test]
    fn sanitization_applies_to_schema_and_table_in_lockstep() {
        let fixture = Fixture::new();
        let table = table(
            &["HTAN Parent Biospecimen ID", "Id", "Uuid"],
            &[&[Some("x"), Some("a"), None]],
        );

        let finalized = finalize("Demographics", table, &fixture.ctx()).unwrap();

        assert!(finalized
            .table
            .column_index("HTAN_Parent_Biospecimen_ID")
            .is_some());
        assert!(finalized.schema.find_field("HTAN_Parent_Biospecimen_ID").is_some());
        assert_eq!(
            finalized.table.columns().to_vec(),
            finalized.schema.field_names().iter().map(|s| s.to_string()).collect::<Vec<_>>()
        );
    }

    #[test]
    fn description_fallback_chain() {
        let mut fixture = Fixture::new();
        fixture.index = DataModelIndex::from_rows(vec![DataModelRow::new(
            "Id",
            vec![],
            vec![],
            Some("Primary identifier".to_string()),
        )]);
        fixture
            .config
            .extra_descriptions
            .insert("Extra Column".to_string(), "From the supplement".to_string());

        let table = table(
            &["Id", "Uuid", "Extra Column", "Mystery"],
            &[&[Some("a"), None, Some("x"), Some("y")]],
        );

        let finalized = finalize("Demographics", table, &fixture.ctx()).unwrap();

        let description = |name: &str| {
            finalized
                .schema
                .find_field(name)
                .map(|f| f.description.clone())
                .unwrap()
        };
        assert_eq!(description("Id"), "Primary identifier");
        assert_eq!(description("Extra_Column"), "From the supplement");
        assert_eq!(description("Mystery"), DESCRIPTION_PLACEHOLDER);

        let codes: Vec<_> = finalized.diagnostics.iter().map(|d| d.code).collect();
        assert_eq!(codes, vec![DiagnosticCode::DescriptionUnavailable]);
    }

    #[test]
    fn long_descriptions_are_truncated() {
        let mut fixture = Fixture::new();
        fixture.index = DataModelIndex::from_rows(vec![DataModelRow::new(
            "Id",
            vec![],
            vec![],
            Some("x".repeat(3000)),
        )]);

        let table = table(&["Id", "Uuid"], &[&[Some("a"), None]]);
        let finalized = finalize("Demographics", table, &fixture.ctx()).unwrap();

        let field = finalized.schema.find_field("Id").unwrap();
        assert_eq!(field.description.len(), 1024);
    }

    #[test]
    fn exact_duplicate_rows_collapse() {
        let fixture = Fixture::new();
        let table = table(
            &["Id", "Uuid"],
            &[&[Some("same"), None], &[Some("same"), None], &[Some("other"), None]],
        );

        let finalized = finalize("Demographics", table, &fixture.ctx()).unwrap();
        assert_eq!(finalized.table.n_rows(), 2);
    }
}
