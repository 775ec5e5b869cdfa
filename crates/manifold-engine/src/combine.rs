//! Per-component table accumulation
//!
//! Projected manifests fold into one growing table per component across
//! all centers and projects. No deduplication happens here: provenance
//! columns differ per manifest, and early dedup could hide legitimate
//! duplicate submissions from different manifests of the same entity.

use manifold_core::Table;
use std::collections::BTreeMap;

/// Combined tables keyed by component
#[derive(Debug, Clone, Default)]
pub struct CombinedTables {
    tables: BTreeMap<String, Table>,
}

impl CombinedTables {
    /// Create an empty accumulator
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a projected manifest into the component's table.
    ///
    /// The first manifest for a component becomes its table; later ones
    /// are row-concatenated after it, preserving arrival order.
    pub fn append(&mut self, component: &str, table: Table) {
        match self.tables.get_mut(component) {
            Some(existing) => existing.append(table),
            None => {
                self.tables.insert(component.to_string(), table);
            }
        }
    }

    /// The accumulated table for a component, if any
    pub fn get(&self, component: &str) -> Option<&Table> {
        self.tables.get(component)
    }

    /// Components with at least one manifest, in sorted order
    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    /// Iterate (component, table) pairs in sorted component order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Table)> {
        self.tables.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of distinct components
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Whether no manifest has been appended yet
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl IntoIterator for CombinedTables {
    type Item = (String, Table);
    type IntoIter = std::collections::btree_map::IntoIter<String, Table>;

    fn into_iter(self) -> Self::IntoIter {
        self.tables.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn one_row_table(columns: &[&str], cells: &[&str]) -> Table {
        let mut table = Table::new(columns.iter().map(|s| s.to_string()).collect()).unwrap();
        table
            .push_row(cells.iter().map(|c| Some(c.to_string())).collect())
            .unwrap();
        table
    }

    #[test]
    fn first_manifest_becomes_the_table() {
        let mut combined = CombinedTables::new();
        combined.append("ImagingLevel2", one_row_table(&["Id"], &["a"]));

        assert_eq!(combined.len(), 1);
        assert_eq!(combined.get("ImagingLevel2").unwrap().n_rows(), 1);
    }

    #[test]
    fn rows_concatenate_in_arrival_order() {
        let mut combined = CombinedTables::new();
        combined.append("ImagingLevel2", one_row_table(&["Id"], &["first"]));
        combined.append("ImagingLevel2", one_row_table(&["Id"], &["second"]));
        combined.append("Biospecimen", one_row_table(&["Id"], &["other"]));

        let table = combined.get("ImagingLevel2").unwrap();
        assert_eq!(table.n_rows(), 2);
        assert_eq!(table.cell(0, "Id"), Some("first"));
        assert_eq!(table.cell(1, "Id"), Some("second"));

        let components: Vec<_> = combined.components().collect();
        assert_eq!(components, vec!["Biospecimen", "ImagingLevel2"]);
    }

    #[test]
    fn duplicate_rows_are_kept_until_finalization() {
        let mut combined = CombinedTables::new();
        combined.append("ImagingLevel2", one_row_table(&["Id"], &["same"]));
        combined.append("ImagingLevel2", one_row_table(&["Id"], &["same"]));

        assert_eq!(combined.get("ImagingLevel2").unwrap().n_rows(), 2);
    }
}
