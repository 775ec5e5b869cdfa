//! Destination schema types for finalized tables

use serde::{Deserialize, Serialize};

/// Destination column type
///
/// The load pipeline deliberately avoids per-value type sniffing: one
/// malformed value in an otherwise-numeric column would fail the whole
/// table's load. Only columns known structurally to be numeric are typed
/// as integers; everything else stays text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Nullable text (the default for every column)
    String,

    /// 64-bit integer (file size, manifest version)
    Integer,
}

impl FieldType {
    /// Stable string form used in destination schemas
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "STRING",
            Self::Integer => "INTEGER",
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One column of a destination schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaField {
    /// Sanitized column name
    pub name: String,

    /// Destination type
    #[serde(rename = "type")]
    pub field_type: FieldType,

    /// Column description (truncated to 1024 characters)
    pub description: String,
}

impl SchemaField {
    /// Create a new field
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            description: String::new(),
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// An ordered destination schema, one field per table column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    /// Ordered list of fields
    pub fields: Vec<SchemaField>,
}

impl TableSchema {
    /// Create a new empty schema
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Create a schema from fields
    pub fn from_fields(fields: Vec<SchemaField>) -> Self {
        Self { fields }
    }

    /// Find a field by name
    pub fn find_field(&self, name: &str) -> Option<&SchemaField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Get field names in schema order
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the schema has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Default for TableSchema {
    fn default() -> Self {
        Self::new()
    }
}
