//! File handles offered to an upload queue.

use std::fmt;
use std::sync::Arc;

/// An immutable reference to a file's bytes plus the metadata the
/// source platform reported for it.
///
/// `declared_type` is whatever MIME string the platform supplied. Drag
/// sources in particular leave it empty or report something generic
/// such as `application/octet-stream`, so it must not be trusted on its
/// own; see [`crate::classify`].
///
/// Cloning is cheap: the content is shared.
#[derive(Clone, PartialEq, Eq)]
pub struct FileHandle {
    name: String,
    declared_type: String,
    content: Arc<[u8]>,
}

impl FileHandle {
    /// Create a handle from a filename, declared MIME type, and content.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        declared_type: impl Into<String>,
        content: impl Into<Arc<[u8]>>,
    ) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.into(),
            content: content.into(),
        }
    }

    /// The filename as reported by the source platform.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared MIME type, possibly empty.
    #[must_use]
    pub fn declared_type(&self) -> &str {
        &self.declared_type
    }

    /// Size of the content in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.content.len() as u64
    }

    /// The raw file content.
    #[must_use]
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Shared handle to the raw file content.
    #[must_use]
    pub fn shared_content(&self) -> Arc<[u8]> {
        Arc::clone(&self.content)
    }

    /// Lower-cased extension after the last `.` of the name, if any.
    #[must_use]
    pub fn extension(&self) -> Option<String> {
        extension_of(&self.name)
    }
}

// Content is omitted; printing megabytes of bytes helps nobody.
impl fmt::Debug for FileHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileHandle")
            .field("name", &self.name)
            .field("declared_type", &self.declared_type)
            .field("size", &self.content.len())
            .finish()
    }
}

/// Lower-cased extension after the last `.` of `name`.
///
/// Returns `None` when there is no dot or nothing follows it.
#[must_use]
pub fn extension_of(name: &str) -> Option<String> {
    name.rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty())
        .map(str::to_ascii_lowercase)
}

/// Filename without its final extension.
///
/// Names without an extension, and dot-files such as `.bashrc`, are
/// returned unchanged.
#[must_use]
pub fn file_stem(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => name,
    }
}

/// Human-readable size for queue rows: `B` below 1 KiB, otherwise one
/// decimal place of `KB` or `MB`.
#[must_use]
#[allow(clippy::cast_precision_loss)] // display only
pub fn format_size(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = KIB * 1024;
    if bytes < KIB {
        format!("{bytes} B")
    } else if bytes < MIB {
        format!("{:.1} KB", bytes as f64 / KIB as f64)
    } else {
        format!("{:.1} MB", bytes as f64 / MIB as f64)
    }
}
