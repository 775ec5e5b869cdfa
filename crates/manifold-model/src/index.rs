//! Flat attribute data model with label-normalized lookup

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Normalize an attribute display name into its lookup label:
/// lowercase, spaces removed.
///
/// The label is a pure function of the display name; every lookup path
/// must normalize through here so queries and stored rows agree.
pub fn normalize_label(attribute: &str) -> String {
    attribute
        .chars()
        .filter(|c| *c != ' ')
        .flat_map(char::to_lowercase)
        .collect()
}

/// One attribute definition from the data model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataModelRow {
    /// Display name (e.g. "HTAN Parent Biospecimen ID")
    pub attribute: String,

    /// Normalized lookup label, always `normalize_label(attribute)`
    pub label: String,

    /// Attributes this attribute depends on (display names, in model order)
    pub depends_on: Vec<String>,

    /// Permitted values; each may gate further dependencies
    pub valid_values: Vec<String>,

    /// Free-text description
    pub description: Option<String>,
}

impl DataModelRow {
    /// Create a row, deriving the label from the attribute name.
    /// List entries are trimmed of surrounding whitespace.
    pub fn new(
        attribute: impl Into<String>,
        depends_on: Vec<String>,
        valid_values: Vec<String>,
        description: Option<String>,
    ) -> Self {
        let attribute = attribute.into();
        let label = normalize_label(&attribute);
        Self {
            attribute,
            label,
            depends_on: depends_on.into_iter().map(|s| s.trim().to_string()).collect(),
            valid_values: valid_values.into_iter().map(|s| s.trim().to_string()).collect(),
            description,
        }
    }
}

/// Immutable, label-keyed index over the data model.
///
/// Built once per run from the schema source and never mutated.
#[derive(Debug, Clone, Default)]
pub struct DataModelIndex {
    rows: Vec<DataModelRow>,
    by_label: HashMap<String, usize>,
}

impl DataModelIndex {
    /// Build the index from loaded rows.
    ///
    /// When multiple rows share a normalized label, the first definition
    /// wins and later duplicates are ignored.
    pub fn from_rows(rows: Vec<DataModelRow>) -> Self {
        let mut by_label = HashMap::with_capacity(rows.len());
        for (i, row) in rows.iter().enumerate() {
            by_label.entry(row.label.clone()).or_insert(i);
        }
        Self { rows, by_label }
    }

    /// Look up an attribute by display name or label.
    ///
    /// The query is normalized before matching, so both forms work.
    /// A miss is a recoverable condition for every caller.
    pub fn lookup(&self, name: &str) -> Option<&DataModelRow> {
        let label = normalize_label(name);
        self.by_label.get(&label).map(|&i| &self.rows[i])
    }

    /// Description for an attribute, looked up by exact display name
    pub fn description_of(&self, attribute: &str) -> Option<&str> {
        self.rows
            .iter()
            .find(|row| row.attribute == attribute)
            .and_then(|row| row.description.as_deref())
    }

    /// Number of indexed rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the index holds no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All rows in load order
    pub fn rows(&self) -> &[DataModelRow] {
        &self.rows
    }
}
