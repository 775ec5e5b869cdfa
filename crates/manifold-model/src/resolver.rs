//! Attribute closure resolution
//!
//! Computes the full set of attributes a component's manifest must retain
//! by traversing DependsOn and Valid_Values edges of the data model to a
//! fixed point. The data model is a sparse, hand-authored graph with
//! optional branches, so traversal is best-effort: a missing attribute or
//! valid value skips that edge only and is surfaced as a diagnostic.

use crate::index::DataModelIndex;
use manifold_core::{AugmentationRule, Diagnostic, DiagnosticCode, Severity};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, VecDeque};

/// Fixed seed attributes present in every resolved set
pub const SEED_ATTRIBUTES: [&str; 3] = ["entityId", "Uuid", "Id"];

/// Resolution failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// The component label has no row in the data model.
    /// The caller skips that manifest; this never aborts a run.
    #[error("Component '{0}' not found in data model")]
    UnknownComponent(String),
}

/// The resolved, deduplicated set of attribute display names.
///
/// Iteration order is deterministic but carries no meaning; consumers
/// must not depend on a particular ordering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeSet(BTreeSet<String>);

impl AttributeSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self(BTreeSet::new())
    }

    /// Insert an attribute; returns false if it was already present
    pub fn insert(&mut self, attribute: impl Into<String>) -> bool {
        self.0.insert(attribute.into())
    }

    /// Whether the set contains an attribute (exact string match)
    pub fn contains(&self, attribute: &str) -> bool {
        self.0.contains(attribute)
    }

    /// Iterate attributes in deterministic order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Attributes as an owned, ordered column list
    pub fn to_columns(&self) -> Vec<String> {
        self.0.iter().cloned().collect()
    }

    /// Number of attributes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<String> for AttributeSet {
    fn from_iter<T: IntoIterator<Item = String>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Outcome of resolving one component
#[derive(Debug, Clone)]
pub struct Resolution {
    /// The component that was resolved (as queried)
    pub component: String,

    /// The resolved attribute closure
    pub attributes: AttributeSet,

    /// One MISSING_LOOKUP diagnostic per skipped edge, so "attribute has
    /// no dependents" stays distinguishable from "lookup failed"
    pub diagnostics: Vec<Diagnostic>,
}

/// Resolve the attribute closure for a component.
///
/// Seeds the working set with `entityId`/`Uuid`/`Id` and the component's
/// direct DependsOn list, then follows valid-value-gated dependency edges
/// with an explicit frontier until no new attribute appears. The visited
/// set guarantees termination on cyclic or densely connected graphs.
/// Component-keyed augmentation rules are applied after the fixed point.
pub fn resolve(
    index: &DataModelIndex,
    component: &str,
    augmentations: &[AugmentationRule],
) -> Result<Resolution, ResolveError> {
    let row = index
        .lookup(component)
        .ok_or_else(|| ResolveError::UnknownComponent(component.to_string()))?;

    let mut attributes = AttributeSet::new();
    let mut diagnostics = Vec::new();

    let mut frontier: VecDeque<String> =
        SEED_ATTRIBUTES.iter().map(|s| s.to_string()).collect();
    frontier.extend(row.depends_on.iter().map(|s| s.trim().to_string()));

    while let Some(attribute) = frontier.pop_front() {
        if !attributes.insert(attribute.clone()) {
            continue;
        }

        let attribute_row = match index.lookup(&attribute) {
            Some(row) => row,
            None => {
                // Seeds are provenance/identifier columns, not model
                // attributes; a miss is only notable for the rest.
                if !SEED_ATTRIBUTES.contains(&attribute.as_str()) {
                    diagnostics.push(
                        Diagnostic::new(
                            DiagnosticCode::MissingLookup,
                            Severity::Info,
                            format!("Attribute '{}' not found in data model", attribute),
                        )
                        .with_component(component)
                        .with_attribute(&attribute),
                    );
                }
                continue;
            }
        };

        for value in &attribute_row.valid_values {
            match index.lookup(value) {
                Some(value_row) => {
                    frontier.extend(value_row.depends_on.iter().map(|s| s.trim().to_string()));
                }
                None => {
                    diagnostics.push(
                        Diagnostic::new(
                            DiagnosticCode::MissingLookup,
                            Severity::Info,
                            format!(
                                "Valid value '{}' of attribute '{}' not found in data model",
                                value, attribute
                            ),
                        )
                        .with_component(component)
                        .with_attribute(&attribute),
                    );
                }
            }
        }
    }

    for rule in augmentations {
        if rule.applies_to(component) {
            attributes.insert(rule.attribute.clone());
        }
    }

    Ok(Resolution {
        component: component.to_string(),
        attributes,
        diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::DataModelRow;
    use pretty_assertions::assert_eq;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn imaging_model() -> DataModelIndex {
        DataModelIndex::from_rows(vec![
            DataModelRow::new(
                "Imaging Level 2",
                strings(&["Filename", "File Format"]),
                vec![],
                None,
            ),
            DataModelRow::new(
                "File Format",
                vec![],
                strings(&["OME-TIFF", "png"]),
                Some("Format of the file".to_string()),
            ),
            // a valid value that gates further dependencies
            DataModelRow::new(
                "OME-TIFF",
                strings(&["Image Channels", "Pyramid Levels"]),
                vec![],
                None,
            ),
            // Image Channels is itself reached through a valid value, and
            // its own valid value gates one more dependency
            DataModelRow::new("Image Channels", vec![], strings(&["Multiplexed"]), None),
            DataModelRow::new("Multiplexed", strings(&["Antibody Panel"]), vec![], None),
            DataModelRow::new("Antibody Panel", vec![], vec![], None),
        ])
    }

    #[test]
    fn unknown_component_fails_without_partial_set() {
        let index = imaging_model();
        let result = resolve(&index, "Nonexistent", &[]);
        assert_eq!(
            result.err(),
            Some(ResolveError::UnknownComponent("Nonexistent".to_string()))
        );
    }

    #[test]
    fn closure_is_superset_of_seeds_and_direct_dependencies() {
        let index = imaging_model();
        let resolution = resolve(&index, "Imaging Level 2", &[]).unwrap();

        for seed in SEED_ATTRIBUTES {
            assert!(resolution.attributes.contains(seed), "missing seed {}", seed);
        }
        assert!(resolution.attributes.contains("Filename"));
        assert!(resolution.attributes.contains("File Format"));
    }

    #[test]
    fn valid_value_gated_dependencies_are_traversed_to_fixed_point() {
        let index = imaging_model();
        let resolution = resolve(&index, "Imaging Level 2", &[]).unwrap();

        // File Format -> OME-TIFF -> {Image Channels, Pyramid Levels}
        assert!(resolution.attributes.contains("Image Channels"));
        assert!(resolution.attributes.contains("Pyramid Levels"));
    }

    #[test]
    fn valid_value_edges_of_late_arrivals_are_still_followed() {
        let index = imaging_model();
        let resolution = resolve(&index, "Imaging Level 2", &[]).unwrap();

        // Image Channels only enters the set via OME-TIFF's dependency
        // list; its own valid value Multiplexed must still be looked up
        // and its dependencies pulled in. A single pass over the initial
        // dependency list would miss this.
        assert!(resolution.attributes.contains("Antibody Panel"));
    }

    #[test]
    fn resolution_is_idempotent() {
        let index = imaging_model();
        let first = resolve(&index, "Imaging Level 2", &[]).unwrap();
        let second = resolve(&index, "Imaging Level 2", &[]).unwrap();
        assert_eq!(first.attributes, second.attributes);
    }

    #[test]
    fn traversal_terminates_on_cycles() {
        // A depends on B; B's valid value V depends back on A and B
        let index = DataModelIndex::from_rows(vec![
            DataModelRow::new("A", strings(&["B"]), vec![], None),
            DataModelRow::new("B", vec![], strings(&["V"]), None),
            DataModelRow::new("V", strings(&["A", "B"]), vec![], None),
        ]);

        let resolution = resolve(&index, "A", &[]).unwrap();
        assert!(resolution.attributes.contains("A"));
        assert!(resolution.attributes.contains("B"));
    }

    #[test]
    fn missing_edges_are_skipped_with_diagnostics() {
        let index = DataModelIndex::from_rows(vec![
            DataModelRow::new("Comp", strings(&["Known", "Unknown Attribute"]), vec![], None),
            DataModelRow::new("Known", vec![], strings(&["Unlisted Value"]), None),
        ]);

        let resolution = resolve(&index, "Comp", &[]).unwrap();

        // both misses are tolerated and recorded
        assert!(resolution.attributes.contains("Unknown Attribute"));
        let codes: Vec<_> = resolution.diagnostics.iter().map(|d| d.code).collect();
        assert_eq!(codes, vec![DiagnosticCode::MissingLookup, DiagnosticCode::MissingLookup]);
        // seed misses are not reported
        assert!(resolution
            .diagnostics
            .iter()
            .all(|d| d.attribute.as_deref() != Some("Uuid")));
    }

    #[test]
    fn augmentations_are_applied_by_component_name() {
        let index = DataModelIndex::from_rows(vec![DataModelRow::new(
            "ImagingLevel2",
            strings(&["Filename"]),
            vec![],
            None,
        )]);

        let rules = vec![AugmentationRule {
            components: strings(&["ImagingLevel2"]),
            attribute: "HTAN Parent Data File ID".to_string(),
        }];

        let with_rule = resolve(&index, "ImagingLevel2", &rules).unwrap();
        assert!(with_rule.attributes.contains("HTAN Parent Data File ID"));

        let without_rule = resolve(&index, "ImagingLevel2", &[]).unwrap();
        assert!(!without_rule.attributes.contains("HTAN Parent Data File ID"));
    }

    #[test]
    fn dependency_entries_are_trimmed() {
        let index = DataModelIndex::from_rows(vec![DataModelRow::new(
            "Comp",
            strings(&[" Padded Attribute "]),
            vec![],
            None,
        )]);

        let resolution = resolve(&index, "Comp", &[]).unwrap();
        assert!(resolution.attributes.contains("Padded Attribute"));
        assert!(!resolution.attributes.contains(" Padded Attribute "));
    }
}
