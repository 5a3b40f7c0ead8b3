//! Dioxus UI components for filehub.
//!
//! Provides the drop zone, the queue list, and the feature card that
//! ties a queue to its endpoint.

mod drop_zone;
mod feature_card;
mod queue_list;

pub use drop_zone::DropZone;
pub use feature_card::FeatureCard;
pub use queue_list::QueueList;
