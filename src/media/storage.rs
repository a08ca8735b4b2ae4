use super::detection::extension_for_mime;
use super::types::{PreparedImage, StoredArtifact};
use crate::error::MediaError;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Writes prepared uploads under `<root>/<request-uuid>/image_<n>.<ext>`.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Fresh directory name for one request.
    #[must_use]
    pub fn request_dir(&self, request_id: Uuid) -> PathBuf {
        self.root.join(request_id.to_string())
    }

    /// Persist one image. `index` is zero-based; file names are one-based to
    /// match how images are numbered in reports.
    pub async fn persist(
        &self,
        request_id: Uuid,
        index: usize,
        image: &PreparedImage,
    ) -> Result<StoredArtifact, MediaError> {
        let dir = self.request_dir(request_id);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| persist_error(&dir, &e))?;

        let ext = extension_for_mime(&image.mime_type);
        let path = dir.join(format!("image_{}.{ext}", index + 1));
        tokio::fs::write(&path, &image.bytes)
            .await
            .map_err(|e| persist_error(&path, &e))?;

        Ok(StoredArtifact { index, path })
    }

    /// Persist every image, logging and skipping individual failures.
    pub async fn persist_all(
        &self,
        request_id: Uuid,
        images: &[PreparedImage],
    ) -> Vec<StoredArtifact> {
        let mut stored = Vec::with_capacity(images.len());
        for (index, image) in images.iter().enumerate() {
            match self.persist(request_id, index, image).await {
                Ok(artifact) => stored.push(artifact),
                Err(e) => tracing::warn!(image = index + 1, "Artifact not saved: {e}"),
            }
        }
        stored
    }
}

fn persist_error(path: &Path, err: &std::io::Error) -> MediaError {
    MediaError::Persist {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}
