//! filehub-io: Browser I/O and Dioxus component library.
//!
//! Reads dropped and picked files, sends multipart requests with
//! `fetch`, saves results through Blob URLs, and provides the UI
//! components for the filehub web application.

pub mod components;
pub mod download;
pub mod intake;
pub mod options;
pub mod status;
pub mod transport;

pub use components::{DropZone, FeatureCard, QueueList};
pub use transport::FetchTransport;
