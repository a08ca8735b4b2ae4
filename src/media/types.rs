use image::RgbImage;
use std::path::PathBuf;

/// One uploaded file, as received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub filename: Option<String>,
    pub data: Vec<u8>,
}

impl Upload {
    pub fn new(filename: Option<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            filename,
            data: data.into(),
        }
    }
}

/// An upload after normalization.
///
/// `bytes` is what gets sent to the vision model and persisted: a PNG
/// re-encode when decoding succeeded, the raw upload otherwise. `pixels` is
/// `None` for uploads the decoder rejected; those are left out of palette
/// analysis.
#[derive(Debug, Clone)]
pub struct PreparedImage {
    pub mime_type: String,
    pub bytes: Vec<u8>,
    pub pixels: Option<RgbImage>,
}

/// Where a prepared image was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredArtifact {
    pub index: usize,
    pub path: PathBuf,
}
