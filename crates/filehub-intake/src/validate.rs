//! Per-feature admission rules for offered files.

use crate::classify::{self, MediaKind};
use crate::file::FileHandle;

/// Decides whether a single file may enter a queue.
///
/// Validators are pure, so a batch can be checked file by file with
/// one bad file never affecting the verdict on another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validator {
    /// Accept any file the shared classifier resolves to one of these kinds.
    Kinds(&'static [MediaKind]),
    /// Accept files whose declared type or extension is explicitly listed.
    ///
    /// Used by single-format features ("WebP only") where a kind is too
    /// coarse. Entries must be lower case; extensions have no leading dot.
    AllowList {
        mime_types: &'static [&'static str],
        extensions: &'static [&'static str],
    },
}

impl Validator {
    /// Validator accepting the given media kinds.
    #[must_use]
    pub const fn kinds(kinds: &'static [MediaKind]) -> Self {
        Self::Kinds(kinds)
    }

    /// Validator accepting an explicit MIME type or extension list.
    #[must_use]
    pub const fn allow_list(
        mime_types: &'static [&'static str],
        extensions: &'static [&'static str],
    ) -> Self {
        Self::AllowList {
            mime_types,
            extensions,
        }
    }

    /// Whether `handle` may enter a queue guarded by this validator.
    #[must_use]
    pub fn accepts(&self, handle: &FileHandle) -> bool {
        match self {
            Self::Kinds(kinds) => classify::classify(handle).is_some_and(|k| kinds.contains(&k)),
            Self::AllowList {
                mime_types,
                extensions,
            } => {
                let mime = handle.declared_type().trim().to_ascii_lowercase();
                mime_types.contains(&mime.as_str())
                    || handle
                        .extension()
                        .is_some_and(|ext| extensions.contains(&ext.as_str()))
            }
        }
    }

    /// Value for an `<input type="file" accept=...>` attribute.
    #[must_use]
    pub fn accept_attribute(&self) -> String {
        match self {
            Self::Kinds(kinds) => kinds
                .iter()
                .map(|kind| match kind {
                    MediaKind::Image => "image/*",
                    MediaKind::Video => "video/*",
                    MediaKind::Audio => "audio/*",
                    MediaKind::Document => ".pdf",
                })
                .collect::<Vec<_>>()
                .join(","),
            Self::AllowList { extensions, .. } => extensions
                .iter()
                .map(|ext| format!(".{ext}"))
                .collect::<Vec<_>>()
                .join(","),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IMAGES: Validator = Validator::kinds(&[MediaKind::Image]);
    const PNG_JPEG: Validator = Validator::allow_list(
        &["image/png", "image/jpeg", "image/jpg"],
        &["png", "jpg", "jpeg"],
    );
    const WEBP: Validator = Validator::allow_list(&["image/webp"], &["webp"]);

    fn handle(name: &str, mime: &str) -> FileHandle {
        FileHandle::new(name, mime, Vec::new())
    }

    #[test]
    fn kinds_validator_uses_classifier() {
        assert!(IMAGES.accepts(&handle("a.png", "image/png")));
        assert!(IMAGES.accepts(&handle("a.webp", "")));
        assert!(!IMAGES.accepts(&handle("a.mp3", "audio/mpeg")));
        assert!(!IMAGES.accepts(&handle("a.txt", "text/plain")));
    }

    #[test]
    fn allow_list_matches_type_or_extension() {
        assert!(PNG_JPEG.accepts(&handle("photo", "image/jpeg")));
        assert!(PNG_JPEG.accepts(&handle("photo.JPG", "")));
        assert!(!PNG_JPEG.accepts(&handle("photo.webp", "image/webp")));
    }

    #[test]
    fn allow_list_is_narrower_than_kind() {
        let webp = handle("a.webp", "image/webp");
        let png = handle("a.png", "image/png");
        assert!(WEBP.accepts(&webp));
        assert!(!WEBP.accepts(&png));
        assert!(IMAGES.accepts(&png));
    }

    #[test]
    fn accept_attribute_lists_extensions() {
        assert_eq!(PNG_JPEG.accept_attribute(), ".png,.jpg,.jpeg");
        assert_eq!(
            Validator::kinds(&[MediaKind::Image, MediaKind::Document]).accept_attribute(),
            "image/*,.pdf"
        );
    }
}
