//! Local file backend.
//!
//! Durable single-node storage: agents and memory entries live in JSON
//! documents on disk. Writers take an async mutex, rewrite the whole
//! document to a temp file, and rename it into place so a crash or a
//! cancelled call never leaves a partially written document visible.

mod registry;
mod store;

pub use registry::FileRegistry;
pub use store::FileStore;

use std::path::Path;

use crate::domain::errors::{StorageError, StorageResult};

/// Write `contents` to `path` atomically via a sibling temp file.
async fn write_atomic(path: &Path, contents: &[u8]) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::BackendUnavailable(e.to_string()))?;
        }
    }

    let tmp = path.with_extension("tmp");
    tokio::fs::write(&tmp, contents)
        .await
        .map_err(|e| StorageError::BackendUnavailable(e.to_string()))?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|e| StorageError::BackendUnavailable(e.to_string()))?;
    Ok(())
}

/// Read and deserialize a JSON document, falling back to the default for a
/// missing file.
async fn read_document<T: serde::de::DeserializeOwned + Default>(path: &Path) -> StorageResult<T> {
    match tokio::fs::read(path).await {
        Ok(bytes) => serde_json::from_slice(&bytes)
            .map_err(|e| StorageError::Serialization(e.to_string())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(T::default()),
        Err(e) => Err(StorageError::BackendUnavailable(e.to_string())),
    }
}
