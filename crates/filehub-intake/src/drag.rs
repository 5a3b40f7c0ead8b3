//! Drag-and-drop state machine.
//!
//! The platform layer translates native `dragenter`/`dragover`/
//! `dragleave`/`drop` events into [`DragEvent`]s and feeds them to a
//! [`DragDropController`]. The controller is the single source of
//! truth for whether a drag is active; it never validates files, it
//! only hands the offered batch back to the caller.

use crate::file::FileHandle;

/// Whether a drag is hovering over the drop target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    DragActive,
}

/// One entry carried by a drop.
///
/// Drag sources routinely include things that are not files: the
/// page URL when dragging from a browser tab, plain text selections,
/// or placeholders for directories that cannot be read as a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DroppedEntry {
    File(FileHandle),
    /// Anything else, described by its name or platform kind.
    Other(String),
}

/// Drop entries split into files and the descriptions of everything
/// else, both in platform order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortedEntries {
    pub files: Vec<FileHandle>,
    pub discarded: Vec<String>,
}

impl SortedEntries {
    #[must_use]
    pub fn new(entries: Vec<DroppedEntry>) -> Self {
        let mut sorted = Self::default();
        for entry in entries {
            match entry {
                DroppedEntry::File(handle) => sorted.files.push(handle),
                DroppedEntry::Other(description) => sorted.discarded.push(description),
            }
        }
        if !sorted.discarded.is_empty() {
            tracing::debug!(
                discarded = sorted.discarded.len(),
                "dropped non-file drag entries"
            );
        }
        sorted
    }
}

/// Normalized drag event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragEvent {
    Enter,
    Over,
    Leave,
    Drop(Vec<DroppedEntry>),
}

/// What the platform layer must do after feeding an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragResponse {
    /// Call `preventDefault()` on the native event. Without it the
    /// browser navigates to a dropped file instead of delivering it.
    pub prevent_default: bool,
    /// Files offered by a drop, in the order the platform listed them.
    pub batch: Option<Vec<FileHandle>>,
    /// Non-file entries of a drop.
    pub discarded: Vec<String>,
}

/// Two-state drag controller.
#[derive(Debug, Clone, Default)]
pub struct DragDropController {
    state: DragState,
}

impl DragDropController {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: DragState::Idle,
        }
    }

    #[must_use]
    pub const fn state(&self) -> DragState {
        self.state
    }

    /// `true` while a drag hovers over the target.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self.state, DragState::DragActive)
    }

    /// Advance the state machine.
    ///
    /// A drop returns the file entries only; an empty drop (or one with
    /// no file entries) yields `batch: None`. A drop is honoured even
    /// without a preceding enter, since some platforms skip it.
    ///
    /// Platforms that read dropped files asynchronously feed an empty
    /// `Drop` straight away and hand the entries to
    /// [`SortedEntries::new`] once read, so the state never waits on I/O.
    pub fn handle(&mut self, event: DragEvent) -> DragResponse {
        match event {
            DragEvent::Enter | DragEvent::Over => {
                self.state = DragState::DragActive;
                DragResponse {
                    prevent_default: true,
                    batch: None,
                    discarded: Vec::new(),
                }
            }
            DragEvent::Leave => {
                self.state = DragState::Idle;
                DragResponse {
                    prevent_default: true,
                    batch: None,
                    discarded: Vec::new(),
                }
            }
            DragEvent::Drop(entries) => {
                self.state = DragState::Idle;
                let SortedEntries { files, discarded } = SortedEntries::new(entries);
                DragResponse {
                    prevent_default: true,
                    batch: (!files.is_empty()).then_some(files),
                    discarded,
                }
            }
        }
    }

    /// File picker path. Leaves drag state untouched and returns the
    /// batch for the same downstream intake as a drop.
    #[must_use]
    pub fn pick(&self, files: Vec<FileHandle>) -> Option<Vec<FileHandle>> {
        (!files.is_empty()).then_some(files)
    }
}
