//! Configuration schema (manifold.toml)

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Substitute description when neither the data model nor the supplementary
/// description source knows a column.
pub const DESCRIPTION_PLACEHOLDER: &str =
    "Description unavailable. Contact DCC for more information";

/// A component-keyed attribute augmentation.
///
/// Escape hatch for attributes a component needs that are not expressible
/// through the generic dependency graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AugmentationRule {
    /// Component names the rule applies to (exact match)
    pub components: Vec<String>,

    /// Attribute appended to the resolved set
    pub attribute: String,
}

impl AugmentationRule {
    /// Whether this rule applies to a component
    pub fn applies_to(&self, component: &str) -> bool {
        self.components.iter().any(|c| c == component)
    }
}

/// Destination project/dataset for finalized tables
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestinationConfig {
    /// Destination project
    pub project: String,

    /// Destination dataset
    pub dataset: String,
}

impl Default for DestinationConfig {
    fn default() -> Self {
        Self {
            project: "htan-dcc".to_string(),
            dataset: "combined_assays".to_string(),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Official center names mapped to their short identifiers.
    /// Submissions from centers not in the map are skipped.
    /// An empty map accepts every center (useful for local runs).
    #[serde(default)]
    pub centers: HashMap<String, String>,

    /// Name fragments marking file-bearing (assay) components.
    /// A component whose name contains any fragment gets file enrichment.
    /// This is the currently-known set, not a general rule; extend it here.
    #[serde(default = "default_assay_fragments")]
    pub assay_fragments: Vec<String>,

    /// Component-keyed attribute augmentations
    #[serde(default = "default_augmentations")]
    pub augmentations: Vec<AugmentationRule>,

    /// Supplementary column descriptions, keyed by display name.
    /// Consulted when an attribute is missing from the data model.
    #[serde(default)]
    pub extra_descriptions: HashMap<String, String>,

    /// Destination project/dataset
    #[serde(default)]
    pub destination: DestinationConfig,
}

fn default_assay_fragments() -> Vec<String> {
    ["Level", "Auxiliary", "Accessory", "OtherAssay"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_augmentations() -> Vec<AugmentationRule> {
    vec![
        AugmentationRule {
            components: vec!["BulkRNA-seqLevel2".to_string(), "BulkWESLevel2".to_string()],
            attribute: "HTAN Parent Biospecimen ID".to_string(),
        },
        AugmentationRule {
            components: vec!["ImagingLevel2".to_string()],
            attribute: "HTAN Parent Data File ID".to_string(),
        },
    ]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            centers: HashMap::new(),
            assay_fragments: default_assay_fragments(),
            augmentations: default_augmentations(),
            extra_descriptions: HashMap::new(),
            destination: DestinationConfig::default(),
        }
    }
}

impl Config {
    /// Load config from TOML file
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Load config from TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Save config to TOML file
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        let toml = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, toml).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Whether submissions from a center should be processed
    pub fn center_allowed(&self, center: &str) -> bool {
        self.centers.is_empty() || self.centers.contains_key(center)
    }

    /// Whether a component carries files and should get file enrichment
    pub fn is_file_component(&self, component: &str) -> bool {
        self.assay_fragments
            .iter()
            .any(|fragment| component.contains(fragment.as_str()))
    }

    /// Supplementary description for a column, if configured
    pub fn extra_description(&self, column: &str) -> Option<&str> {
        self.extra_descriptions.get(column).map(String::as_str)
    }
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),
}
