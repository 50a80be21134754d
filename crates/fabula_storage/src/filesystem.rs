//! Filesystem-backed run storage.

use crate::{HISTORY_FILE_NAME, RunStore, encode_history, image_file_name};
use fabula_core::ConversationContext;
use fabula_error::{FabulaResult, StorageError, StorageErrorKind};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Writes run artifacts into a single output directory.
///
/// ```text
/// output/
/// ├── history.json
/// ├── images_of_scene1.png
/// ├── images_of_scene2.png
/// └── ...
/// ```
///
/// Image numbering starts at 1 and advances once per saved payload, so a
/// storage instance should not be shared between runs. Files are written
/// to a temporary sibling first and renamed into place.
#[derive(Debug)]
pub struct FileSystemStorage {
    base_path: PathBuf,
    next_image: AtomicUsize,
}

impl FileSystemStorage {
    /// Create a storage rooted at `base_path`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created.
    #[tracing::instrument(skip(base_path))]
    pub fn new(base_path: impl Into<PathBuf>) -> FabulaResult<Self> {
        let base_path = base_path.into();

        std::fs::create_dir_all(&base_path).map_err(|e| {
            StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                "{}: {}",
                base_path.display(),
                e
            )))
        })?;

        tracing::info!(path = %base_path.display(), "Initialized filesystem storage");

        Ok(Self {
            base_path,
            next_image: AtomicUsize::new(1),
        })
    }

    /// Root directory of this storage.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    async fn write_atomic(&self, path: &Path, data: &[u8]) -> FabulaResult<()> {
        let temp_path = path.with_extension("tmp");
        tokio::fs::write(&temp_path, data).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "{}: {}",
                temp_path.display(),
                e
            )))
        })?;

        tokio::fs::rename(&temp_path, path).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "rename {} to {}: {}",
                temp_path.display(),
                path.display(),
                e
            )))
        })?;

        Ok(())
    }
}

#[async_trait::async_trait]
impl RunStore for FileSystemStorage {
    #[tracing::instrument(skip(self, data), fields(size = data.len()))]
    async fn save_image(&self, data: &[u8]) -> FabulaResult<PathBuf> {
        let index = self.next_image.fetch_add(1, Ordering::SeqCst);
        let path = self.base_path.join(image_file_name(index));

        self.write_atomic(&path, data).await?;

        tracing::info!(path = %path.display(), size = data.len(), "Saved image");
        Ok(path)
    }

    #[tracing::instrument(skip(self, history), fields(turns = history.len()))]
    async fn save_history(&self, history: &ConversationContext) -> FabulaResult<PathBuf> {
        let path = self.base_path.join(HISTORY_FILE_NAME);
        let encoded = encode_history(history)?;

        self.write_atomic(&path, &encoded).await?;

        tracing::info!(path = %path.display(), turns = history.len(), "Saved conversation history");
        Ok(path)
    }
}
