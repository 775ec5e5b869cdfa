//! Diagnostic codes and error reporting
//!
//! IMPORTANT: Diagnostic codes are versioned and stable.
//! NEVER rename or remove codes - they are part of the public API.
//! Add new codes with new names only.

use serde::{Deserialize, Serialize};

/// Diagnostic code registry (v1)
///
/// These codes are STABLE and VERSIONED.
/// Do NOT rename or remove codes - only add new ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiagnosticCode {
    // Per-manifest recoveries (1xxx)
    /// Component label absent from the data model; manifest skipped
    UnknownComponent,

    /// Manifest has a missing or NA Component value; manifest skipped
    MalformedManifest,

    /// Submission center not in the configured center map; manifest skipped
    UnknownCenter,

    // Closure traversal (2xxx)
    /// Attribute or valid-value lookup missed during closure traversal;
    /// that edge was skipped
    MissingLookup,

    // Finalization (3xxx)
    /// No description found in the data model or the supplementary source;
    /// placeholder substituted
    DescriptionUnavailable,

    // General (9xxx)
    /// General informational message
    Info,

    /// General warning message
    Warning,
}

impl DiagnosticCode {
    /// Get the diagnostic code as a stable string identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnknownComponent => "UNKNOWN_COMPONENT",
            Self::MalformedManifest => "MALFORMED_MANIFEST",
            Self::UnknownCenter => "UNKNOWN_CENTER",
            Self::MissingLookup => "MISSING_LOOKUP",
            Self::DescriptionUnavailable => "DESCRIPTION_UNAVAILABLE",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
        }
    }
}

impl std::fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational message
    Info,

    /// Warning - should be reviewed but not blocking
    Warn,

    /// Error - a manifest or attribute was dropped from the output
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A diagnostic message with structured metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Stable diagnostic code
    pub code: DiagnosticCode,

    /// Severity level
    pub severity: Severity,

    /// Human-readable message
    pub message: String,

    /// Component the diagnostic relates to, if any
    pub component: Option<String>,

    /// Attribute the diagnostic relates to, if any
    pub attribute: Option<String>,

    /// Manifest identifier the diagnostic relates to, if any
    pub manifest_id: Option<String>,
}

impl Diagnostic {
    /// Create a new diagnostic with minimal fields
    pub fn new(code: DiagnosticCode, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            code,
            severity,
            message: message.into(),
            component: None,
            attribute: None,
            manifest_id: None,
        }
    }

    /// Set the component
    pub fn with_component(mut self, component: impl Into<String>) -> Self {
        self.component = Some(component.into());
        self
    }

    /// Set the attribute
    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attribute = Some(attribute.into());
        self
    }

    /// Set the manifest identifier
    pub fn with_manifest_id(mut self, manifest_id: impl Into<String>) -> Self {
        self.manifest_id = Some(manifest_id.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_code_stability() {
        // Ensure codes are stable strings
        assert_eq!(DiagnosticCode::UnknownComponent.as_str(), "UNKNOWN_COMPONENT");
        assert_eq!(DiagnosticCode::MissingLookup.as_str(), "MISSING_LOOKUP");
        assert_eq!(
            DiagnosticCode::DescriptionUnavailable.as_str(),
            "DESCRIPTION_UNAVAILABLE"
        );
    }

    #[test]
    fn diagnostic_serialization() {
        let diag = Diagnostic::new(
            DiagnosticCode::UnknownComponent,
            Severity::Error,
            "Component 'Foo' not found in data model",
        )
        .with_component("Foo")
        .with_manifest_id("syn123");

        let json = serde_json::to_string(&diag).unwrap();
        assert!(json.contains("UNKNOWN_COMPONENT"));
        assert!(json.contains("error"));
        assert!(json.contains("syn123"));
    }
}
