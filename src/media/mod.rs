pub mod detection;
pub mod preprocess;
pub mod storage;
pub mod types;

pub use detection::{detect_mime, detect_upload_mime};
pub use preprocess::{DEFAULT_MAX_DIMENSION, prepare};
pub use storage::ArtifactStore;
pub use types::{PreparedImage, StoredArtifact, Upload};
