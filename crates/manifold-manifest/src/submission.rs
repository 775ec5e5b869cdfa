//! Submission tree discovery
//!
//! A submission tree holds one directory per research center, each
//! containing manifest CSVs. The storage system that produced the tree
//! encodes the manifest identifier and version in the file name:
//! `<manifest_id>.v<version>.csv`. A file without the version suffix is
//! taken as version 1.
//!
//! When a directory holds several versions of the same manifest, only the
//! latest is kept, matching how the upstream file store enumerates the
//! most recent manifest per folder.

use crate::manifest::{ManifestError, Provenance, RawManifest};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// One discovered manifest file, not yet parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    /// Center name (top-level directory under the root)
    pub center: String,

    /// Manifest file path
    pub path: PathBuf,

    /// Manifest identifier from the file name
    pub manifest_id: String,

    /// Manifest version from the file name
    pub version: i64,
}

impl Submission {
    /// Parse the manifest this submission points at
    pub fn load(&self) -> Result<RawManifest, ManifestError> {
        let provenance = Provenance::new(&self.center, &self.manifest_id, self.version);
        RawManifest::from_csv(&self.path, provenance)
    }
}

/// Split `<manifest_id>.v<version>` out of a file stem
fn parse_stem(stem: &str) -> (String, i64) {
    if let Some((id, version)) = stem.rsplit_once(".v") {
        if let Ok(version) = version.parse::<i64>() {
            return (id.to_string(), version);
        }
    }
    (stem.to_string(), 1)
}

/// Walk a submission tree and list the latest version of every manifest.
///
/// Results are ordered by center, then path, so repeated runs over the
/// same tree enumerate manifests identically (combined-table row order
/// depends on it).
pub fn discover(root: &Path) -> Result<Vec<Submission>, ManifestError> {
    let mut latest: HashMap<(PathBuf, String), Submission> = HashMap::new();

    for entry in WalkDir::new(root).min_depth(2).sort_by_file_name() {
        let entry =
            entry.map_err(|e| ManifestError::Io(root.display().to_string(), e.to_string()))?;
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().map_or(true, |e| e != "csv") {
            continue;
        }

        let center = path
            .strip_prefix(root)
            .ok()
            .and_then(|p| p.components().next())
            .map(|c| c.as_os_str().to_string_lossy().into_owned());
        let Some(center) = center else { continue };

        let stem = match path.file_stem() {
            Some(stem) => stem.to_string_lossy().into_owned(),
            None => continue,
        };
        let (manifest_id, version) = parse_stem(&stem);

        let submission = Submission {
            center,
            path: path.to_path_buf(),
            manifest_id: manifest_id.clone(),
            version,
        };

        let key = (path.parent().map(Path::to_path_buf).unwrap_or_default(), manifest_id);
        match latest.get(&key) {
            Some(existing) if existing.version >= version => {}
            _ => {
                latest.insert(key, submission);
            }
        }
    }

    let mut submissions: Vec<Submission> = latest.into_values().collect();
    submissions.sort_by(|a, b| a.center.cmp(&b.center).then_with(|| a.path.cmp(&b.path)));
    Ok(submissions)
}
