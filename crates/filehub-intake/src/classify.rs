//! Media classification from declared MIME type and filename extension.
//!
//! All features share one lookup table so that an `.m4a` dropped on the
//! sticker card and on any future audio card resolve identically.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::file::FileHandle;

/// Semantic category a file resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaKind {
    Image,
    Video,
    Audio,
    /// PDF documents.
    Document,
}

impl MediaKind {
    /// All kinds, in display order.
    pub const ALL: [Self; 4] = [Self::Image, Self::Video, Self::Audio, Self::Document];

    /// Upper-case label used in queue rows (`IMAGE · 1.2 MB`).
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Image => "IMAGE",
            Self::Video => "VIDEO",
            Self::Audio => "AUDIO",
            Self::Document => "PDF",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Declared MIME type to kind.
const MIME_TABLE: &[(&str, MediaKind)] = &[
    ("image/jpeg", MediaKind::Image),
    ("image/jpg", MediaKind::Image),
    ("image/png", MediaKind::Image),
    ("image/webp", MediaKind::Image),
    ("image/gif", MediaKind::Image),
    ("image/bmp", MediaKind::Image),
    ("video/mp4", MediaKind::Video),
    ("video/quicktime", MediaKind::Video),
    ("video/webm", MediaKind::Video),
    ("video/x-matroska", MediaKind::Video),
    ("audio/mpeg", MediaKind::Audio),
    ("audio/mp3", MediaKind::Audio),
    ("audio/wav", MediaKind::Audio),
    ("audio/x-wav", MediaKind::Audio),
    ("audio/ogg", MediaKind::Audio),
    ("audio/x-m4a", MediaKind::Audio),
    ("audio/mp4", MediaKind::Audio),
    ("application/pdf", MediaKind::Document),
];

/// Lower-case filename extension to kind.
const EXTENSION_TABLE: &[(&str, MediaKind)] = &[
    ("png", MediaKind::Image),
    ("jpg", MediaKind::Image),
    ("jpeg", MediaKind::Image),
    ("webp", MediaKind::Image),
    ("gif", MediaKind::Image),
    ("bmp", MediaKind::Image),
    ("mp4", MediaKind::Video),
    ("mov", MediaKind::Video),
    ("mkv", MediaKind::Video),
    ("webm", MediaKind::Video),
    ("mp3", MediaKind::Audio),
    ("wav", MediaKind::Audio),
    ("m4a", MediaKind::Audio),
    ("ogg", MediaKind::Audio),
    ("pdf", MediaKind::Document),
];

/// Look up a declared MIME type (case-insensitive).
#[must_use]
pub fn kind_for_mime(declared_type: &str) -> Option<MediaKind> {
    let mime = declared_type.trim().to_ascii_lowercase();
    MIME_TABLE
        .iter()
        .find(|(m, _)| *m == mime)
        .map(|&(_, kind)| kind)
}

/// Look up a filename extension without the leading dot (case-insensitive).
#[must_use]
pub fn kind_for_extension(extension: &str) -> Option<MediaKind> {
    EXTENSION_TABLE
        .iter()
        .find(|(e, _)| e.eq_ignore_ascii_case(extension))
        .map(|&(_, kind)| kind)
}

/// Resolve a file to its [`MediaKind`], or `None` if it is rejected.
///
/// The declared type is consulted first; the extension is only a
/// fallback for platforms that omit or misreport it.
#[must_use]
pub fn classify(handle: &FileHandle) -> Option<MediaKind> {
    kind_for_mime(handle.declared_type())
        .or_else(|| handle.extension().and_then(|ext| kind_for_extension(&ext)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(name: &str, mime: &str) -> FileHandle {
        FileHandle::new(name, mime, Vec::new())
    }

    #[test]
    fn png_by_declared_type() {
        assert_eq!(classify(&handle("x", "image/png")), Some(MediaKind::Image));
    }

    #[test]
    fn declared_type_is_case_insensitive() {
        assert_eq!(
            classify(&handle("x", "Video/MP4")),
            Some(MediaKind::Video)
        );
    }

    #[test]
    fn empty_type_falls_back_to_extension() {
        assert_eq!(
            classify(&handle("track.mp3", "")),
            Some(MediaKind::Audio)
        );
    }

    #[test]
    fn unreliable_type_falls_back_to_extension() {
        assert_eq!(
            classify(&handle("clip.MOV", "application/octet-stream")),
            Some(MediaKind::Video)
        );
    }

    #[test]
    fn declared_type_wins_over_extension() {
        // A PNG that was renamed to .mp3 is still an image.
        assert_eq!(
            classify(&handle("track.mp3", "image/png")),
            Some(MediaKind::Image)
        );
    }

    #[test]
    fn unknown_type_and_extension_rejected() {
        assert_eq!(classify(&handle("notes.txt", "text/plain")), None);
        assert_eq!(classify(&handle("no_extension", "")), None);
    }

    #[test]
    fn pdf_is_a_document() {
        assert_eq!(
            classify(&handle("a.pdf", "application/pdf")),
            Some(MediaKind::Document)
        );
        assert_eq!(classify(&handle("a.PDF", "")), Some(MediaKind::Document));
    }

    #[test]
    fn every_kind_reachable_from_both_tables() {
        for kind in MediaKind::ALL {
            assert!(
                MIME_TABLE.iter().any(|&(_, k)| k == kind),
                "{kind} missing from MIME table"
            );
            assert!(
                EXTENSION_TABLE.iter().any(|&(_, k)| k == kind),
                "{kind} missing from extension table"
            );
        }
    }

    #[test]
    fn table_keys_are_lower_case() {
        for (mime, _) in MIME_TABLE {
            assert_eq!(*mime, mime.to_ascii_lowercase());
        }
        for (ext, _) in EXTENSION_TABLE {
            assert_eq!(*ext, ext.to_ascii_lowercase());
        }
    }
}
