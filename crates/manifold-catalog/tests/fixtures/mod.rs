//! Test fixtures for catalog integration tests
//!
//! This module provides a small but realistic data model, manifest CSV
//! writers, and enrichment records shared across the integration tests.

use manifold_core::FileRecord;
use manifold_model::DataModelRow;
use std::path::Path;

fn list(entries: &[&str]) -> Vec<String> {
    entries.iter().map(|e| e.to_string()).collect()
}

/// Create a data model covering one imaging component
///
/// Mirrors the shape of the flat data model table:
/// - `ImagingLevel2` depends on Component, Filename and File Format
/// - `File Format` carries valid values, one of which pulls in
///   `Image Channels` through its own DependsOn edge
pub fn imaging_model() -> Vec<DataModelRow> {
    vec![
        DataModelRow::new(
            "ImagingLevel2",
            list(&["Component", "Filename", "File Format"]),
            vec![],
            Some("Level 2 imaging data".to_string()),
        ),
        DataModelRow::new("Component", vec![], vec![], Some("Category of metadata".to_string())),
        DataModelRow::new("Filename", vec![], vec![], Some("Name of the file".to_string())),
        DataModelRow::new(
            "File Format",
            vec![],
            list(&["OME-TIFF", "png"]),
            Some("Format of the data file".to_string()),
        ),
        DataModelRow::new("OME-TIFF", list(&["Image Channels"]), vec![], None),
        DataModelRow::new("png", vec![], vec![], None),
        DataModelRow::new("Image Channels", vec![], vec![], None),
    ]
}

/// Create a data model with a biospecimen component (no file enrichment)
pub fn biospecimen_model() -> Vec<DataModelRow> {
    vec![
        DataModelRow::new(
            "Biospecimen",
            list(&["Component", "Storage Method"]),
            vec![],
            Some("Biospecimen metadata".to_string()),
        ),
        DataModelRow::new("Component", vec![], vec![], None),
        DataModelRow::new("Storage Method", vec![], vec![], None),
    ]
}

/// Write the imaging data model as a CSV export
pub fn write_data_model_csv(path: &Path) {
    std::fs::write(
        path,
        "Attribute,DependsOn,Valid_Values,Description\n\
         ImagingLevel2,\"Component, Filename, File Format\",,Level 2 imaging data\n\
         Component,,,Category of metadata\n\
         Filename,,,Name of the file\n\
         File Format,,\"OME-TIFF, png\",Format of the data file\n\
         OME-TIFF,Image Channels,,\n\
         png,,,\n\
         Image Channels,,,\n",
    )
    .unwrap();
}

/// Write an imaging manifest with two rows
pub fn write_imaging_manifest(path: &Path) {
    std::fs::write(
        path,
        "Component,Filename,File Format,Image Channels,entityId,Uuid\n\
         ImagingLevel2,a.ome.tif,OME-TIFF,3,syn101,u-1\n\
         ImagingLevel2,b.png,png,,syn102,u-2\n",
    )
    .unwrap();
}

/// Write a fileview snapshot covering the imaging manifest entities
pub fn write_fileview_csv(path: &Path) {
    std::fs::write(
        path,
        "entityId,dataFileSizeBytes,dataFileMD5Hex,dataFileConcreteType,dataFileBucket,dataFileKey\n\
         syn101,2048,d41d8cd9,org.sagebionetworks.repo.model.file.S3FileHandle,htan-bucket,center-a/a.ome.tif\n\
         syn102,512,900150983,GoogleCloudFileHandle,htan-gc,center-a/b.png\n",
    )
    .unwrap();
}

/// File record stored in S3
pub fn s3_file_record() -> FileRecord {
    FileRecord {
        size_bytes: Some(2048),
        md5: Some("d41d8cd9".to_string()),
        concrete_type: Some("org.sagebionetworks.repo.model.file.S3FileHandle".to_string()),
        bucket: Some("htan-bucket".to_string()),
        key: Some("center-a/a.ome.tif".to_string()),
    }
}

/// File record stored in Google Cloud Storage
pub fn gcs_file_record() -> FileRecord {
    FileRecord {
        size_bytes: Some(512),
        md5: Some("900150983".to_string()),
        concrete_type: Some("GoogleCloudFileHandle".to_string()),
        bucket: Some("htan-gc".to_string()),
        key: Some("center-a/b.png".to_string()),
    }
}
