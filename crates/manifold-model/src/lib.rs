//! Data model index and attribute closure resolution
//!
//! This crate handles:
//! - The flat attribute data model loaded from the schema source
//! - Label-normalized lookup
//! - Computing the transitive attribute closure a component's manifest
//!   must be projected onto

pub mod index;
pub mod resolver;

pub use index::{normalize_label, DataModelIndex, DataModelRow};
pub use resolver::{resolve, AttributeSet, Resolution, ResolveError, SEED_ATTRIBUTES};
