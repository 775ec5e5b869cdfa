//! Enrichment record contracts
//!
//! Row shapes returned by the external file and release indexes, keyed by
//! file-entity identifier. The core only reads these; fetching them belongs
//! to the catalog collaborators.

use serde::{Deserialize, Serialize};

/// File-level metadata for one file entity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// File size in bytes
    pub size_bytes: Option<i64>,

    /// MD5 checksum (hex)
    pub md5: Option<String>,

    /// Concrete storage type reported by the file store
    pub concrete_type: Option<String>,

    /// Object-store bucket
    pub bucket: Option<String>,

    /// Object key within the bucket
    pub key: Option<String>,
}

impl FileRecord {
    /// Derive the cloud storage URI for this file.
    ///
    /// The scheme follows the concrete storage type: `s3://` when it names
    /// an S3-family store, `gs://` otherwise. If the concrete type, bucket,
    /// or key is unavailable the URI is None rather than an error.
    pub fn cloud_uri(&self) -> Option<String> {
        let concrete_type = self.concrete_type.as_deref()?;
        let bucket = self.bucket.as_deref()?;
        let key = self.key.as_deref()?;

        let scheme = if concrete_type.contains("S3") { "s3://" } else { "gs://" };
        Some(format!("{}{}/{}", scheme, bucket, key))
    }
}

/// Release-status indicators for one entity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseRecord {
    /// Included in a public data release
    pub data_release: Option<String>,

    /// Included in a CDS release
    pub cds_release: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(concrete_type: Option<&str>, bucket: Option<&str>, key: Option<&str>) -> FileRecord {
        FileRecord {
            concrete_type: concrete_type.map(str::to_string),
            bucket: bucket.map(str::to_string),
            key: key.map(str::to_string),
            ..FileRecord::default()
        }
    }

    #[test]
    fn s3_concrete_type_gets_s3_scheme() {
        let uri = record(Some("org.sagebionetworks.repo.model.file.S3FileHandle"), Some("b"), Some("k"))
            .cloud_uri();
        assert_eq!(uri.as_deref(), Some("s3://b/k"));
    }

    #[test]
    fn non_s3_concrete_type_gets_gs_scheme() {
        let uri = record(Some("GoogleCloudFileHandle"), Some("b"), Some("k")).cloud_uri();
        assert_eq!(uri.as_deref(), Some("gs://b/k"));
    }

    #[test]
    fn missing_input_yields_none() {
        assert_eq!(record(Some("S3"), None, Some("k")).cloud_uri(), None);
        assert_eq!(record(None, Some("b"), Some("k")).cloud_uri(), None);
        assert_eq!(record(Some("S3"), Some("b"), None).cloud_uri(), None);
    }
}
