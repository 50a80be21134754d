//! Extraction command handler.

use fabula::{FabulaResult, JsonError, StorageError, StorageErrorKind, extract};
use std::path::Path;
use tokio::io::AsyncReadExt;
use tracing::{info, instrument};

/// Read a model reply from `file` or stdin and return its structured
/// content as pretty-printed JSON.
#[instrument(skip_all, fields(file = ?file))]
pub async fn extract_file(file: Option<&Path>) -> FabulaResult<String> {
    let text = match file {
        Some(path) => tokio::fs::read_to_string(path).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileRead(format!("{}: {}", path.display(), e)))
        })?,
        None => {
            let mut text = String::new();
            tokio::io::stdin()
                .read_to_string(&mut text)
                .await
                .map_err(|e| StorageError::new(StorageErrorKind::FileRead(format!("stdin: {}", e))))?;
            text
        }
    };

    render(&text)
}

fn render(text: &str) -> FabulaResult<String> {
    let extracted = extract(text)?;
    if extracted.is_raw() {
        info!("Reply held a fenced block inside prose");
    }
    let value = extracted.into_value()?;
    let json = serde_json::to_string_pretty(&value)
        .map_err(|e| JsonError::new(format!("Failed to encode extracted value: {}", e)))?;
    Ok(json)
}
