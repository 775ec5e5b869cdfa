//! Manifold engine - Core consolidation logic
//!
//! This crate implements the main business logic for Manifold:
//! - Projecting raw manifests onto their resolved attribute set
//! - Combining projected manifests per component
//! - Post-merge enrichment, schema inference, and finalization
//! - The consolidation pipeline tying the stages together

pub mod combine;
pub mod finalize;
pub mod pipeline;
pub mod project;

pub use combine::CombinedTables;
pub use finalize::{finalize, EnrichmentContext, Finalization};
pub use pipeline::{ConsolidationOutput, Consolidator, FinalizedTable};
pub use project::project;
