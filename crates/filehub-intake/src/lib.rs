//! filehub-intake: file intake and upload queue orchestration (sans-IO).
//!
//! Offered files flow through:
//! drag/picker -> validation -> classification -> bounded queue ->
//! reorder/remove/select -> single or batch submission -> download.
//!
//! This crate has **no I/O dependencies**. Files arrive as in-memory
//! [`FileHandle`]s and requests leave through the [`Transport`] trait;
//! the browser `fetch` and `reqwest` implementations live in
//! `filehub-io` and `filehub-cli`.

pub mod classify;
pub mod config;
pub mod dispatch;
pub mod drag;
pub mod feature;
pub mod file;
pub mod queue;
pub mod service;
pub mod validate;

pub use classify::{MediaKind, classify};
pub use config::ClientConfig;
pub use dispatch::{
    Dispatcher, Download, Endpoint, FilePart, FormParams, MultipartRequest, SubmitError,
    SubmitMode, Transport, TransportError, TransportResponse,
};
pub use drag::{DragDropController, DragEvent, DragState, DroppedEntry, SortedEntries};
pub use feature::{
    CompressParams, Feature, FeatureParams, PageSelection, ParamError, PasswordAction,
};
pub use file::{FileHandle, file_stem, format_size};
pub use queue::{
    Direction, ItemId, OfferReport, QueueError, QueueItem, RejectReason, Rejection, UploadQueue,
};
pub use service::{DragOutcome, EntriesOutcome, QueueEvent, QueueService, SubscriptionId};
pub use validate::Validator;
