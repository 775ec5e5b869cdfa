//! Nullable-text table
//!
//! Every manifest is held as a rectangular table of nullable strings.
//! Cell-level typing is deferred to schema inference at finalization, so
//! the table itself only guarantees shape: each row has exactly one cell
//! per column, and a null cell is distinct from an empty string.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Errors raised by shape-violating table operations
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("Duplicate column: {0}")]
    DuplicateColumn(String),

    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("Row has {actual} cells, table has {expected} columns")]
    RowArity { expected: usize, actual: usize },

    #[error("Column has {actual} values, table has {expected} rows")]
    ColumnArity { expected: usize, actual: usize },

    #[error("Row index {0} out of bounds")]
    RowOutOfBounds(usize),
}

/// A rectangular table of nullable text cells
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl Table {
    /// Create an empty table with the given column labels
    pub fn new(columns: Vec<String>) -> Result<Self, TableError> {
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.as_str()) {
                return Err(TableError::DuplicateColumn(column.clone()));
            }
        }

        Ok(Self {
            columns,
            rows: Vec::new(),
        })
    }

    /// Column labels in table order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// All rows in append order
    pub fn rows(&self) -> &[Vec<Option<String>>] {
        &self.rows
    }

    /// Number of rows
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns
    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    /// Whether the table has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by label
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Append a row; must have exactly one cell per column
    pub fn push_row(&mut self, row: Vec<Option<String>>) -> Result<(), TableError> {
        if row.len() != self.columns.len() {
            return Err(TableError::RowArity {
                expected: self.columns.len(),
                actual: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    /// Cell value by row index and column label; None if the column is
    /// absent, the row is out of range, or the cell is null
    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx)?.as_deref()
    }

    /// Set a cell by row index and column label
    pub fn set_cell(
        &mut self,
        row: usize,
        column: &str,
        value: Option<String>,
    ) -> Result<(), TableError> {
        let idx = self
            .column_index(column)
            .ok_or_else(|| TableError::UnknownColumn(column.to_string()))?;
        let cells = self
            .rows
            .get_mut(row)
            .ok_or(TableError::RowOutOfBounds(row))?;
        cells[idx] = value;
        Ok(())
    }

    /// Project onto a new column set: columns not present in the source
    /// become entirely null, source columns outside the target set are
    /// dropped. Row count and order are preserved.
    pub fn reindex(&self, columns: &[String]) -> Result<Table, TableError> {
        let mut target = Table::new(columns.to_vec())?;
        let positions: Vec<Option<usize>> =
            columns.iter().map(|c| self.column_index(c)).collect();

        for row in &self.rows {
            let projected = positions
                .iter()
                .map(|pos| pos.and_then(|i| row[i].clone()))
                .collect();
            target.rows.push(projected);
        }

        Ok(target)
    }

    /// Concatenate another table's rows after this table's rows.
    ///
    /// Columns are aligned by label. Columns new to this table are added
    /// at the end and backfilled with null for existing rows; columns the
    /// incoming table lacks are null in the appended rows. No row is ever
    /// dropped or reordered.
    pub fn append(&mut self, other: Table) {
        for column in &other.columns {
            if self.column_index(column).is_none() {
                self.columns.push(column.clone());
                for row in &mut self.rows {
                    row.push(None);
                }
            }
        }

        let positions: Vec<usize> = other
            .columns
            .iter()
            .map(|c| self.column_index(c).unwrap_or(usize::MAX))
            .collect();

        for row in other.rows {
            let mut aligned = vec![None; self.columns.len()];
            for (cell, &pos) in row.into_iter().zip(&positions) {
                if pos != usize::MAX {
                    aligned[pos] = cell;
                }
            }
            self.rows.push(aligned);
        }
    }

    /// Add a column with one value per existing row
    pub fn add_column(
        &mut self,
        name: impl Into<String>,
        values: Vec<Option<String>>,
    ) -> Result<(), TableError> {
        let name = name.into();
        if self.column_index(&name).is_some() {
            return Err(TableError::DuplicateColumn(name));
        }
        if values.len() != self.rows.len() {
            return Err(TableError::ColumnArity {
                expected: self.rows.len(),
                actual: values.len(),
            });
        }

        self.columns.push(name);
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
        Ok(())
    }

    /// Add a column holding the same value in every row
    pub fn add_const_column(
        &mut self,
        name: impl Into<String>,
        value: Option<String>,
    ) -> Result<(), TableError> {
        let values = vec![value; self.rows.len()];
        self.add_column(name, values)
    }

    /// Remove a column and its cells
    pub fn drop_column(&mut self, name: &str) -> Result<(), TableError> {
        let idx = self
            .column_index(name)
            .ok_or_else(|| TableError::UnknownColumn(name.to_string()))?;
        self.columns.remove(idx);
        for row in &mut self.rows {
            row.remove(idx);
        }
        Ok(())
    }

    /// Rename a column in place
    pub fn rename_column(&mut self, from: &str, to: impl Into<String>) -> Result<(), TableError> {
        let to = to.into();
        if from != to && self.column_index(&to).is_some() {
            return Err(TableError::DuplicateColumn(to));
        }
        let idx = self
            .column_index(from)
            .ok_or_else(|| TableError::UnknownColumn(from.to_string()))?;
        self.columns[idx] = to;
        Ok(())
    }

    /// Rewrite every column label through a mapping function
    pub fn map_column_names<F>(&mut self, f: F)
    where
        F: Fn(&str) -> String,
    {
        for column in &mut self.columns {
            *column = f(column);
        }
    }

    /// Remove exact full-row duplicates, keeping the first occurrence
    pub fn dedup_rows(&mut self) {
        let mut seen = HashSet::new();
        self.rows.retain(|row| seen.insert(row.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn row(cells: &[Option<&str>]) -> Vec<Option<String>> {
        cells.iter().map(|c| c.map(str::to_string)).collect()
    }

    #[test]
    fn rejects_duplicate_columns() {
        assert!(matches!(
            Table::new(columns(&["a", "b", "a"])),
            Err(TableError::DuplicateColumn(_))
        ));
    }

    #[test]
    fn rejects_ragged_rows() {
        let mut table = Table::new(columns(&["a", "b"])).unwrap();
        assert!(matches!(
            table.push_row(row(&[Some("1")])),
            Err(TableError::RowArity { expected: 2, actual: 1 })
        ));
    }

    #[test]
    fn null_is_distinct_from_empty_string() {
        let mut table = Table::new(columns(&["a"])).unwrap();
        table.push_row(row(&[Some("")])).unwrap();
        table.push_row(row(&[None])).unwrap();

        assert_eq!(table.cell(0, "a"), Some(""));
        assert_eq!(table.cell(1, "a"), None);
    }

    #[test]
    fn reindex_drops_and_backfills() {
        let mut table = Table::new(columns(&["keep", "drop"])).unwrap();
        table.push_row(row(&[Some("x"), Some("y")])).unwrap();

        let projected = table.reindex(&columns(&["keep", "new"])).unwrap();
        assert_eq!(projected.columns(), &["keep", "new"]);
        assert_eq!(projected.cell(0, "keep"), Some("x"));
        assert_eq!(projected.cell(0, "new"), None);
        assert!(projected.column_index("drop").is_none());
    }

    #[test]
    fn append_aligns_by_label() {
        let mut left = Table::new(columns(&["a", "b"])).unwrap();
        left.push_row(row(&[Some("1"), Some("2")])).unwrap();

        let mut right = Table::new(columns(&["b", "c"])).unwrap();
        right.push_row(row(&[Some("3"), Some("4")])).unwrap();

        left.append(right);

        assert_eq!(left.columns(), &["a", "b", "c"]);
        assert_eq!(left.n_rows(), 2);
        // existing row backfilled with null for the new column
        assert_eq!(left.cell(0, "c"), None);
        // appended row aligned by label, null where absent
        assert_eq!(left.cell(1, "a"), None);
        assert_eq!(left.cell(1, "b"), Some("3"));
        assert_eq!(left.cell(1, "c"), Some("4"));
    }

    #[test]
    fn dedup_keeps_first_occurrence() {
        let mut table = Table::new(columns(&["a"])).unwrap();
        table.push_row(row(&[Some("1")])).unwrap();
        table.push_row(row(&[Some("2")])).unwrap();
        table.push_row(row(&[Some("1")])).unwrap();

        table.dedup_rows();
        assert_eq!(table.n_rows(), 2);
        assert_eq!(table.cell(0, "a"), Some("1"));
        assert_eq!(table.cell(1, "a"), Some("2"));
    }

    #[test]
    fn column_mutations() {
        let mut table = Table::new(columns(&["a", "b"])).unwrap();
        table.push_row(row(&[Some("1"), Some("2")])).unwrap();

        table.add_const_column("c", Some("x".to_string())).unwrap();
        assert_eq!(table.cell(0, "c"), Some("x"));

        table.rename_column("c", "d").unwrap();
        assert!(table.column_index("c").is_none());
        assert_eq!(table.cell(0, "d"), Some("x"));

        table.drop_column("b").unwrap();
        assert_eq!(table.columns(), &["a", "d"]);
        assert_eq!(table.rows()[0].len(), 2);
    }
}
