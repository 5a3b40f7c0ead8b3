//! Reading browser files into drop entries.
//!
//! Shared by the file picker and drag-and-drop paths so both hand the
//! queue the same thing.

use dioxus::html::FileData;
use filehub_intake::{DroppedEntry, FileHandle};

/// Read one file's bytes.
///
/// A file that cannot be read (a dropped folder, or a file removed
/// since it was picked) becomes [`DroppedEntry::Other`] with its name,
/// so the card can say which one was left out.
#[allow(clippy::future_not_send)] // WASM is single-threaded
pub async fn read_entry(file: &FileData) -> DroppedEntry {
    let name = file.name();
    match file.read_bytes().await {
        Ok(bytes) => {
            let declared_type = file.content_type().unwrap_or_default();
            DroppedEntry::File(FileHandle::new(name, declared_type, bytes.to_vec()))
        }
        Err(e) => {
            tracing::warn!(%name, error = %e, "failed to read file");
            DroppedEntry::Other(name)
        }
    }
}

/// Read every file in `files`, preserving order.
#[allow(clippy::future_not_send)] // WASM is single-threaded
pub async fn read_entries(files: Vec<FileData>) -> Vec<DroppedEntry> {
    let mut entries = Vec::with_capacity(files.len());
    for file in &files {
        entries.push(read_entry(file).await);
    }
    entries
}
