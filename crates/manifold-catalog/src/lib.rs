//! External collaborator contracts
//!
//! The consolidation core is a pure function over data it is handed; this
//! crate defines the async contracts for fetching that data and loading
//! the results:
//! - `SchemaSource` - the data model rows
//! - `FileIndexSource` / `ReleaseIndexSource` - enrichment snapshots
//! - `TableLoader` - the destination load job (fire-and-forget)
//!
//! CSV-backed sources cover local runs, the mock catalog covers tests,
//! and the `bigquery` feature enables the warehouse-backed schema source
//! and loader.

pub mod bigquery;
pub mod local;
pub mod mock;
pub mod source;

pub use bigquery::{BigQueryLoader, BigQuerySchemaSource};
pub use local::{CsvFileIndexSource, CsvReleaseIndexSource, CsvSchemaSource, JsonLoader};
pub use mock::{LoadRecord, MockCatalog, RecordingLoader};
pub use source::{
    FetchError, FileIndexSource, LoadError, ReleaseIndexSource, SchemaSource, TableIdentifier,
    TableLoader,
};
