//! Short status messages shown under a feature card.

use std::fmt;

use filehub_intake::{OfferReport, ParamError, RejectReason, SubmitError};

/// How a status message is styled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Success,
    Warning,
    Error,
}

/// A message plus its tone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub tone: Tone,
    pub message: String,
}

impl Status {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            tone: Tone::Success,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            tone: Tone::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            tone: Tone::Error,
            message: message.into(),
        }
    }

    /// Summarize an offer. Rejections take precedence over the count of
    /// added files; an empty offer produces nothing.
    #[must_use]
    pub fn from_offer(report: &OfferReport) -> Option<Self> {
        let invalid = report.rejected_invalid();
        let overflow = report.rejected_capacity();
        if invalid > 0 && overflow > 0 {
            return Some(Self::warning(format!(
                "{} unsupported, {} over the limit",
                plural(invalid, "file"),
                plural(overflow, "file")
            )));
        }
        if invalid > 0 {
            let names: Vec<&str> = report.rejected_names(RejectReason::Invalid).collect();
            return Some(Self::warning(format!(
                "Unsupported file type: {}",
                names.join(", ")
            )));
        }
        if overflow > 0 {
            return Some(Self::warning(format!(
                "Queue is full: {} not added",
                plural(overflow, "file")
            )));
        }
        match report.accepted() {
            0 => None,
            n => Some(Self::success(format!("{} added", plural(n, "file")))),
        }
    }

    /// Summarize entries from a drop or the picker: unreadable entries
    /// are named ahead of the offer summary.
    #[must_use]
    pub fn from_entries(report: Option<&OfferReport>, discarded: &[String]) -> Option<Self> {
        let offer = report.and_then(Self::from_offer);
        if discarded.is_empty() {
            return offer;
        }
        let unreadable = format!("Could not read: {}", discarded.join(", "));
        Some(Self::warning(match offer {
            Some(offer) => format!("{unreadable}. {offer}"),
            None => unreadable,
        }))
    }
}

impl From<&SubmitError> for Status {
    fn from(error: &SubmitError) -> Self {
        match error {
            SubmitError::InProgress => Self::warning(error.to_string()),
            _ => Self::error(error.to_string()),
        }
    }
}

impl From<&ParamError> for Status {
    fn from(error: &ParamError) -> Self {
        Self::error(capitalize(&error.to_string()))
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

fn plural(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("1 {noun}")
    } else {
        format!("{n} {noun}s")
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}
