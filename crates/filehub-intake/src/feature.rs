//! Catalog of the conversion features offered by the client.
//!
//! Each [`Feature`] fixes its admission rule, queue capacity, endpoint,
//! and submission mode. Per-submission options (colour count, pages to
//! remove, password) are validated here before anything is sent.

use std::fmt;
use std::num::NonZeroUsize;

use crate::classify::MediaKind;
use crate::dispatch::{Endpoint, FormParams, SubmitMode};
use crate::queue::UploadQueue;
use crate::validate::Validator;

/// Maximum number of files for multi-file features.
pub const MAX_BATCH_FILES: usize = 20;

const PNG_JPEG: Validator = Validator::allow_list(
    &["image/png", "image/jpeg", "image/jpg"],
    &["png", "jpg", "jpeg"],
);
const WEBP: Validator = Validator::allow_list(&["image/webp"], &["webp"]);
const PDF: Validator = Validator::allow_list(&["application/pdf"], &["pdf"]);

/// A conversion the client can submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    /// Colour-reduce a PNG/JPEG.
    Compress,
    /// PNG/JPEG to ICO.
    Ico,
    /// WebP to PNG.
    WebpToPng,
    /// Ordered images into one PDF.
    ImagesToPdf,
    /// Ordered images and PDFs into one PDF.
    MergePdf,
    /// Drop pages from a PDF.
    RemovePages,
    /// Add or remove a PDF password.
    PdfPassword,
    /// WhatsApp sticker from an image, short video, or audio clip.
    Sticker,
}

impl Feature {
    pub const ALL: [Self; 8] = [
        Self::Compress,
        Self::Ico,
        Self::WebpToPng,
        Self::ImagesToPdf,
        Self::MergePdf,
        Self::RemovePages,
        Self::PdfPassword,
        Self::Sticker,
    ];

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Compress => "Image Compressor",
            Self::Ico => "Image to ICO",
            Self::WebpToPng => "WebP to PNG",
            Self::ImagesToPdf => "Images to PDF",
            Self::MergePdf => "PDF Merger",
            Self::RemovePages => "PDF Page Remover",
            Self::PdfPassword => "PDF Password",
            Self::Sticker => "WhatsApp Sticker Forge",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Compress => "Colour reduction using k-means clustering",
            Self::Ico => "Convert PNG/JPG images to ICO icons",
            Self::WebpToPng => "Convert WebP images to PNG",
            Self::ImagesToPdf => "Combine multiple images into a single PDF",
            Self::MergePdf => "Combine images and PDFs into one document",
            Self::RemovePages => "Remove specific pages from a PDF",
            Self::PdfPassword => "Add or remove password protection",
            Self::Sticker => "Images, short videos, or audio snippets as WhatsApp-ready files",
        }
    }

    /// Short list of accepted formats for the drop zone.
    #[must_use]
    pub const fn hint(self) -> &'static str {
        match self {
            Self::Compress | Self::Ico => "PNG or JPG",
            Self::WebpToPng => "WebP only",
            Self::ImagesToPdf => "Images (PNG, JPG, WebP)",
            Self::MergePdf => "Images or PDF files",
            Self::RemovePages | Self::PdfPassword => "PDF only",
            Self::Sticker => "Image, video (6s max), or audio",
        }
    }

    #[must_use]
    pub const fn validator(self) -> Validator {
        match self {
            Self::Compress | Self::Ico => PNG_JPEG,
            Self::WebpToPng => WEBP,
            Self::ImagesToPdf => Validator::kinds(&[MediaKind::Image]),
            Self::MergePdf => Validator::kinds(&[MediaKind::Image, MediaKind::Document]),
            Self::RemovePages | Self::PdfPassword => PDF,
            Self::Sticker => {
                Validator::kinds(&[MediaKind::Image, MediaKind::Video, MediaKind::Audio])
            }
        }
    }

    #[must_use]
    pub const fn capacity(self) -> NonZeroUsize {
        match self {
            Self::ImagesToPdf | Self::MergePdf | Self::Sticker => {
                match NonZeroUsize::new(MAX_BATCH_FILES) {
                    Some(n) => n,
                    None => NonZeroUsize::MIN,
                }
            }
            _ => NonZeroUsize::MIN,
        }
    }

    /// Single-file features swap their file out instead of refusing a
    /// second one.
    #[must_use]
    pub const fn replaces_on_offer(self) -> bool {
        self.capacity().get() == 1
    }

    /// A fresh, empty queue for this feature.
    #[must_use]
    pub const fn new_queue(self) -> UploadQueue {
        UploadQueue::new(self.capacity(), self.validator())
    }

    /// The endpoint used with default options.
    #[must_use]
    pub const fn endpoint(self) -> Endpoint {
        let (path, mode, field, default_filename, output_prefix, fallback_error) = match self {
            Self::Compress => (
                "/compress_image/",
                SubmitMode::SingleActive,
                "file",
                "compressed_image.png",
                "compressed-",
                "Failed to compress image",
            ),
            Self::Ico => (
                "/convert-ico/",
                SubmitMode::SingleActive,
                "file",
                "converted.ico",
                "",
                "Failed to convert image. Please try a different file.",
            ),
            Self::WebpToPng => (
                "/convert/webp-to-png",
                SubmitMode::SingleActive,
                "file",
                "converted.png",
                "",
                "Failed to convert file",
            ),
            Self::ImagesToPdf => (
                "/convert-to-pdf/",
                SubmitMode::Batch,
                "images",
                "converted_images.pdf",
                "",
                "Failed to create PDF",
            ),
            Self::MergePdf => (
                "/convert-to-pdf/",
                SubmitMode::Batch,
                "images",
                "merged_document.pdf",
                "",
                "Failed to merge files",
            ),
            Self::RemovePages => (
                "/edit-pdf/",
                SubmitMode::SingleActive,
                "file",
                "modified.pdf",
                "modified_",
                "Failed to modify PDF",
            ),
            Self::PdfPassword => (
                "/pdf-password/",
                SubmitMode::SingleActive,
                "file",
                "document.pdf",
                "protected_",
                "Operation failed",
            ),
            Self::Sticker => (
                "/stickers/whatsapp",
                SubmitMode::SingleActive,
                "media",
                "sticker.webp",
                "",
                "Failed to generate sticker.",
            ),
        };
        Endpoint {
            path,
            mode,
            field,
            default_filename,
            output_prefix,
            fallback_error,
        }
    }

    /// Validate options and produce the endpoint and form fields for a
    /// submission.
    ///
    /// # Errors
    ///
    /// Returns [`ParamError::Mismatch`] when `params` belong to another
    /// feature, or the option-specific error when they are invalid.
    pub fn request(self, params: &FeatureParams) -> Result<(Endpoint, FormParams), ParamError> {
        let mut endpoint = self.endpoint();
        let form = match (self, params) {
            (Self::Compress, FeatureParams::Compress(p)) => {
                FormParams::default().field("n_colors", p.n_colors().to_string())
            }
            (Self::RemovePages, FeatureParams::RemovePages(pages)) => {
                FormParams::default().query("page_numbers", pages.to_string())
            }
            (Self::PdfPassword, FeatureParams::Password(action)) => {
                action.validate()?;
                endpoint.output_prefix = action.output_prefix();
                FormParams::default()
                    .field("action", action.tag())
                    .field("password", action.password())
            }
            (
                Self::Ico | Self::WebpToPng | Self::ImagesToPdf | Self::MergePdf | Self::Sticker,
                FeatureParams::None,
            ) => FormParams::default(),
            _ => return Err(ParamError::Mismatch(self)),
        };
        Ok((endpoint, form))
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Invalid per-submission options.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParamError {
    #[error("number of colours must be between {min} and {max}", min = CompressParams::MIN_COLORS, max = CompressParams::MAX_COLORS)]
    ColorsOutOfRange,

    #[error("please specify pages to remove")]
    NoPages,

    #[error("invalid page selection: {0}")]
    InvalidPages(String),

    #[error("please enter a password")]
    EmptyPassword,

    #[error("passwords do not match")]
    PasswordMismatch,

    #[error("options do not apply to {0}")]
    Mismatch(Feature),
}

/// Options for a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeatureParams {
    None,
    Compress(CompressParams),
    RemovePages(PageSelection),
    Password(PasswordAction),
}

/// Colour count for [`Feature::Compress`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressParams {
    n_colors: u16,
}

impl CompressParams {
    pub const MIN_COLORS: u16 = 2;
    pub const MAX_COLORS: u16 = 256;
    pub const DEFAULT_COLORS: u16 = 4;

    /// # Errors
    ///
    /// Returns [`ParamError::ColorsOutOfRange`] outside
    /// `MIN_COLORS..=MAX_COLORS`.
    pub const fn new(n_colors: u16) -> Result<Self, ParamError> {
        if n_colors < Self::MIN_COLORS || n_colors > Self::MAX_COLORS {
            return Err(ParamError::ColorsOutOfRange);
        }
        Ok(Self { n_colors })
    }

    /// Clamp free-form input from a number field; unparseable input
    /// gives the default.
    #[must_use]
    pub fn from_input(input: &str) -> Self {
        let n_colors = input
            .trim()
            .parse::<i64>()
            .map_or(Self::DEFAULT_COLORS, |n| {
                let clamped = n.clamp(i64::from(Self::MIN_COLORS), i64::from(Self::MAX_COLORS));
                u16::try_from(clamped).unwrap_or(Self::DEFAULT_COLORS)
            });
        Self { n_colors }
    }

    #[must_use]
    pub const fn n_colors(self) -> u16 {
        self.n_colors
    }
}

impl Default for CompressParams {
    fn default() -> Self {
        Self {
            n_colors: Self::DEFAULT_COLORS,
        }
    }
}

/// A page or an inclusive page range, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSpec {
    Single(u32),
    Range(u32, u32),
}

impl fmt::Display for PageSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(p) => write!(f, "{p}"),
            Self::Range(a, b) => write!(f, "{a}-{b}"),
        }
    }
}

/// Pages to remove, written like `1, 3, 5-7, 10`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSelection(Vec<PageSpec>);

impl PageSelection {
    /// Parse a comma-separated list of pages and ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ParamError::NoPages`] for blank input and
    /// [`ParamError::InvalidPages`] for page `0`, non-numbers, or
    /// descending ranges.
    pub fn parse(input: &str) -> Result<Self, ParamError> {
        if input.trim().is_empty() {
            return Err(ParamError::NoPages);
        }
        let page = |s: &str| -> Result<u32, ParamError> {
            s.trim()
                .parse::<u32>()
                .ok()
                .filter(|&p| p > 0)
                .ok_or_else(|| ParamError::InvalidPages(s.trim().to_owned()))
        };
        let specs = input
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| match part.split_once('-') {
                Some((start, end)) => {
                    let (start, end) = (page(start)?, page(end)?);
                    if start > end {
                        return Err(ParamError::InvalidPages(part.to_owned()));
                    }
                    Ok(PageSpec::Range(start, end))
                }
                None => page(part).map(PageSpec::Single),
            })
            .collect::<Result<Vec<_>, _>>()?;
        if specs.is_empty() {
            return Err(ParamError::NoPages);
        }
        Ok(Self(specs))
    }

    #[must_use]
    pub fn specs(&self) -> &[PageSpec] {
        &self.0
    }
}

impl fmt::Display for PageSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, spec) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{spec}")?;
        }
        Ok(())
    }
}

/// What to do with a PDF's password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasswordAction {
    Add { password: String, confirm: String },
    Remove { password: String },
}

impl PasswordAction {
    /// # Errors
    ///
    /// Returns [`ParamError::EmptyPassword`] for an empty password and
    /// [`ParamError::PasswordMismatch`] when adding with a confirmation
    /// that differs.
    pub fn validate(&self) -> Result<(), ParamError> {
        match self {
            Self::Add { password, confirm } => {
                if password.is_empty() {
                    Err(ParamError::EmptyPassword)
                } else if password != confirm {
                    Err(ParamError::PasswordMismatch)
                } else {
                    Ok(())
                }
            }
            Self::Remove { password } if password.is_empty() => Err(ParamError::EmptyPassword),
            Self::Remove { .. } => Ok(()),
        }
    }

    /// Value of the `action` form field.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::Add { .. } => "add",
            Self::Remove { .. } => "remove",
        }
    }

    #[must_use]
    pub fn password(&self) -> &str {
        match self {
            Self::Add { password, .. } | Self::Remove { password } => password,
        }
    }

    const fn output_prefix(&self) -> &'static str {
        match self {
            Self::Add { .. } => "protected_",
            Self::Remove { .. } => "unprotected_",
        }
    }
}
