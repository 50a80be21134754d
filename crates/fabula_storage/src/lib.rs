//! Output storage for Fabula runs.
//!
//! A run produces two kinds of artifacts: the storyboard images, one file
//! per generated payload, and the final conversation history. Both go
//! through the [`RunStore`] trait so the pipeline can be pointed at a
//! directory on disk or kept entirely in memory.
//!
//! # Example
//!
//! ```rust
//! use fabula_storage::{FileSystemStorage, RunStore};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let storage = FileSystemStorage::new("/tmp/fabula-run")?;
//!
//! let path = storage.save_image(&[0x89, 0x50, 0x4e, 0x47]).await?;
//! assert!(path.ends_with("images_of_scene1.png"));
//! # Ok(())
//! # }
//! ```

use fabula_core::ConversationContext;
use fabula_error::FabulaResult;
use std::path::PathBuf;

mod filesystem;
mod memory;

pub use fabula_error::{StorageError, StorageErrorKind};
pub use filesystem::FileSystemStorage;
pub use memory::MemoryStorage;

/// File name of the persisted conversation history.
pub const HISTORY_FILE_NAME: &str = "history.json";

/// Name of the `index`-th image written by a run (1-based).
pub fn image_file_name(index: usize) -> String {
    format!("images_of_scene{}.png", index)
}

/// Destination for the artifacts of a single run.
#[async_trait::async_trait]
pub trait RunStore: Send + Sync {
    /// Persist one image payload under the next sequential file name.
    ///
    /// Payloads are written verbatim. Returns the location written to.
    async fn save_image(&self, data: &[u8]) -> FabulaResult<PathBuf>;

    /// Persist the conversation history as an indented JSON array of
    /// `{role, content}` objects, replacing any previous copy.
    async fn save_history(&self, history: &ConversationContext) -> FabulaResult<PathBuf>;
}

/// Encode a history the way every backend writes it.
pub(crate) fn encode_history(history: &ConversationContext) -> FabulaResult<Vec<u8>> {
    use serde::Serialize;

    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    history
        .serialize(&mut serializer)
        .map_err(|e| StorageError::new(StorageErrorKind::Encode(e.to_string())))?;
    Ok(buffer)
}
