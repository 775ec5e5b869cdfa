//! Consolidation pipeline
//!
//! One `Consolidator` drives a run: every manifest is resolved, projected,
//! and appended in turn; after ingestion, each component's combined table
//! is finalized exactly once. All per-manifest failures are recoverable -
//! the pipeline records a diagnostic and moves on, and an empty input
//! simply yields empty output.

use crate::combine::CombinedTables;
use crate::finalize::{finalize, EnrichmentContext, Finalization};
use crate::project::project;
use manifold_core::{
    Config, Diagnostic, DiagnosticCode, FileRecord, ReleaseRecord, RunReport, Severity, Table,
    TableError, TableSchema,
};
use manifold_manifest::RawManifest;
use manifold_model::{resolve, DataModelIndex, ResolveError};
use std::collections::HashMap;

/// A finalized table ready for the external loader
#[derive(Debug, Clone)]
pub struct FinalizedTable {
    /// Component the table belongs to
    pub component: String,

    /// Finalized table
    pub table: Table,

    /// Destination schema aligned with the table
    pub schema: TableSchema,
}

/// Everything a consolidation run produces
#[derive(Debug, Clone)]
pub struct ConsolidationOutput {
    /// One finalized table per component, in sorted component order
    pub tables: Vec<FinalizedTable>,

    /// Run report with all diagnostics
    pub report: RunReport,
}

/// Single-threaded consolidation pass over a set of manifests
#[derive(Debug)]
pub struct Consolidator {
    index: DataModelIndex,
    config: Config,
    combined: CombinedTables,
    report: RunReport,
}

impl Consolidator {
    /// Create a consolidator over a loaded data model
    pub fn new(index: DataModelIndex, config: Config) -> Self {
        Self {
            index,
            config,
            combined: CombinedTables::new(),
            report: RunReport::new(),
        }
    }

    /// The run configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The data model index
    pub fn index(&self) -> &DataModelIndex {
        &self.index
    }

    /// Fold one manifest into the per-component accumulator.
    ///
    /// Returns the component the manifest was appended under, or None if
    /// the manifest was skipped. Skips never abort the run.
    pub fn ingest(&mut self, manifest: &RawManifest) -> Option<String> {
        let center = manifest.provenance.center.clone();
        let manifest_id = manifest.provenance.manifest_id.clone();

        if !self.config.center_allowed(&center) {
            self.skip(
                Diagnostic::new(
                    DiagnosticCode::UnknownCenter,
                    Severity::Info,
                    format!("Center '{}' is not in the configured center map", center),
                )
                .with_manifest_id(&manifest_id),
            );
            return None;
        }

        let component = match manifest.component() {
            Ok(component) => component.to_string(),
            Err(reason) => {
                self.skip(
                    Diagnostic::new(
                        DiagnosticCode::MalformedManifest,
                        Severity::Error,
                        format!("Manifest data unexpected: {}", reason),
                    )
                    .with_manifest_id(&manifest_id),
                );
                return None;
            }
        };

        let resolution = match resolve(&self.index, &component, &self.config.augmentations) {
            Ok(resolution) => resolution,
            Err(ResolveError::UnknownComponent(label)) => {
                self.skip(
                    Diagnostic::new(
                        DiagnosticCode::UnknownComponent,
                        Severity::Error,
                        format!("Component '{}' not found in data model", label),
                    )
                    .with_component(&component)
                    .with_manifest_id(&manifest_id),
                );
                return None;
            }
        };
        self.report.add_diagnostics(resolution.diagnostics);

        let projected =
            match project(&manifest.table, &resolution.attributes, &manifest.provenance) {
                Ok(projected) => projected,
                Err(error) => {
                    self.skip(
                        Diagnostic::new(
                            DiagnosticCode::Warning,
                            Severity::Error,
                            format!("Could not project manifest onto '{}': {}", component, error),
                        )
                        .with_component(&component)
                        .with_manifest_id(&manifest_id),
                    );
                    return None;
                }
            };

        self.combined.append(&component, projected);
        self.report.summary.manifests_processed += 1;
        Some(component)
    }

    fn skip(&mut self, diagnostic: Diagnostic) {
        self.report.summary.manifests_skipped += 1;
        self.report.add_diagnostic(diagnostic);
    }

    /// Finalize every component's combined table.
    ///
    /// Consumes the consolidator; the accumulator is read-only from here
    /// and each component is finalized exactly once.
    pub fn finish(
        mut self,
        file_index: &HashMap<String, FileRecord>,
        release_index: &HashMap<String, ReleaseRecord>,
    ) -> Result<ConsolidationOutput, TableError> {
        let ctx = EnrichmentContext {
            index: &self.index,
            config: &self.config,
            file_index,
            release_index,
        };

        let mut tables = Vec::with_capacity(self.combined.len());
        for (component, table) in std::mem::take(&mut self.combined) {
            let Finalization {
                component,
                table,
                schema,
                diagnostics,
            } = finalize(&component, table, &ctx)?;

            self.report.add_diagnostics(diagnostics);
            tables.push(FinalizedTable {
                component,
                table,
                schema,
            });
        }

        self.report.summary.components = tables.len();
        Ok(ConsolidationOutput {
            tables,
            report: self.report,
        })
    }
}
