//! In-memory run storage for tests and dry runs.

use crate::{HISTORY_FILE_NAME, RunStore, encode_history, image_file_name};
use fabula_core::ConversationContext;
use fabula_error::FabulaResult;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct Contents {
    images: Vec<Vec<u8>>,
    history: Option<Vec<u8>>,
}

/// Keeps run artifacts in memory.
///
/// Returned paths are the file names a [`crate::FileSystemStorage`] would
/// have used, relative to no directory. Clones share the same contents.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    contents: Arc<Mutex<Contents>>,
}

impl MemoryStorage {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Images saved so far, in save order.
    pub fn images(&self) -> Vec<Vec<u8>> {
        self.contents
            .lock()
            .map(|c| c.images.clone())
            .unwrap_or_default()
    }

    /// Encoded history document, if one was saved.
    pub fn history(&self) -> Option<Vec<u8>> {
        self.contents.lock().ok().and_then(|c| c.history.clone())
    }
}

#[async_trait::async_trait]
impl RunStore for MemoryStorage {
    async fn save_image(&self, data: &[u8]) -> FabulaResult<PathBuf> {
        let mut contents = self.contents.lock().unwrap_or_else(|e| e.into_inner());
        contents.images.push(data.to_vec());
        Ok(PathBuf::from(image_file_name(contents.images.len())))
    }

    async fn save_history(&self, history: &ConversationContext) -> FabulaResult<PathBuf> {
        let encoded = encode_history(history)?;
        let mut contents = self.contents.lock().unwrap_or_else(|e| e.into_inner());
        contents.history = Some(encoded);
        Ok(PathBuf::from(HISTORY_FILE_NAME))
    }
}
