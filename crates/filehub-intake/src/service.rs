//! Queue service: one [`UploadQueue`] plus its drag controller, with
//! observers notified after every change.
//!
//! UI layers hold a `QueueService` per feature card and subscribe to
//! re-render; none of the queue rules live in view code.

use crate::drag::{DragDropController, DragEvent, DroppedEntry, SortedEntries};
use crate::feature::Feature;
use crate::file::FileHandle;
use crate::queue::{Direction, ItemId, OfferReport, QueueError, UploadQueue};

/// A change observers are told about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueEvent {
    Offered(OfferReport),
    Removed(ItemId),
    Reordered(ItemId),
    Selected(ItemId),
    Cleared,
    DragChanged { active: bool },
}

/// Handle returned by [`QueueService::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

type Observer = Box<dyn FnMut(&QueueEvent, &UploadQueue)>;

/// Result of feeding a drag event to the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragOutcome {
    /// Call `preventDefault()` on the native event.
    pub prevent_default: bool,
    /// Set when the event was a drop carrying files.
    pub report: Option<OfferReport>,
    /// Non-file entries of a drop, for the user to be told about.
    pub discarded: Vec<String>,
}

/// Result of [`QueueService::offer_entries`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntriesOutcome {
    /// Set when there was at least one file to offer.
    pub report: Option<OfferReport>,
    /// Entries that could not be read as files.
    pub discarded: Vec<String>,
}

/// Owns a queue and tells subscribers when it changes.
pub struct QueueService {
    queue: UploadQueue,
    drag: DragDropController,
    replace_on_offer: bool,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: u64,
}

impl QueueService {
    /// Service around an existing queue. Offers append.
    #[must_use]
    pub fn new(queue: UploadQueue) -> Self {
        Self {
            queue,
            drag: DragDropController::new(),
            replace_on_offer: false,
            observers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Service configured for a feature: its validator and capacity, and
    /// replace-on-offer for single-file features.
    #[must_use]
    pub fn for_feature(feature: Feature) -> Self {
        Self {
            replace_on_offer: feature.replaces_on_offer(),
            ..Self::new(feature.new_queue())
        }
    }

    #[must_use]
    pub const fn queue(&self) -> &UploadQueue {
        &self.queue
    }

    #[must_use]
    pub const fn is_drag_active(&self) -> bool {
        self.drag.is_active()
    }

    /// Register an observer, called after each state change.
    pub fn subscribe(
        &mut self,
        observer: impl FnMut(&QueueEvent, &UploadQueue) + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Remove an observer. Unknown ids are ignored.
    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.observers.retain(|(sub, _)| *sub != id);
    }

    fn notify(&mut self, event: &QueueEvent) {
        for (_, observer) in &mut self.observers {
            observer(event, &self.queue);
        }
    }

    /// Offer a batch from any source (drop, picker, paste). Observers
    /// hear about it only if a file was added.
    pub fn offer(&mut self, batch: Vec<FileHandle>) -> OfferReport {
        let report = if self.replace_on_offer {
            self.queue.replace_with(batch)
        } else {
            self.queue.offer(batch)
        };
        if !report.added.is_empty() {
            self.notify(&QueueEvent::Offered(report.clone()));
        }
        report
    }

    /// Feed a normalized drag event; a drop is offered to the queue.
    pub fn drag(&mut self, event: DragEvent) -> DragOutcome {
        let was_active = self.drag.is_active();
        let response = self.drag.handle(event);
        if was_active != self.drag.is_active() {
            self.notify(&QueueEvent::DragChanged {
                active: self.drag.is_active(),
            });
        }
        DragOutcome {
            prevent_default: response.prevent_default,
            report: response.batch.map(|batch| self.offer(batch)),
            discarded: response.discarded,
        }
    }

    /// Offer entries read after the fact, from a drop whose
    /// [`DragEvent::Drop`] was already fed empty, or from the picker.
    /// Drag state is left alone.
    pub fn offer_entries(&mut self, entries: Vec<DroppedEntry>) -> EntriesOutcome {
        let SortedEntries { files, discarded } = SortedEntries::new(entries);
        EntriesOutcome {
            report: (!files.is_empty()).then(|| self.offer(files)),
            discarded,
        }
    }

    /// Picker path: same intake as a drop, no drag state involved.
    pub fn pick(&mut self, files: Vec<FileHandle>) -> Option<OfferReport> {
        let batch = self.drag.pick(files)?;
        Some(self.offer(batch))
    }

    pub fn remove(&mut self, id: ItemId) -> bool {
        let removed = self.queue.remove(id);
        if removed {
            self.notify(&QueueEvent::Removed(id));
        }
        removed
    }

    pub fn reorder(&mut self, id: ItemId, direction: Direction) -> bool {
        let moved = self.queue.reorder(id, direction);
        if moved {
            self.notify(&QueueEvent::Reordered(id));
        }
        moved
    }

    /// # Errors
    ///
    /// Returns [`QueueError::UnknownItem`] for ids not in the queue.
    pub fn select(&mut self, id: ItemId) -> Result<(), QueueError> {
        let changed = self.queue.selection() != Some(id);
        self.queue.select(id)?;
        if changed {
            self.notify(&QueueEvent::Selected(id));
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        if self.queue.is_empty() {
            return;
        }
        self.queue.clear();
        self.notify(&QueueEvent::Cleared);
    }
}

impl std::fmt::Debug for QueueService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueueService")
            .field("queue", &self.queue)
            .field("drag", &self.drag)
            .field("replace_on_offer", &self.replace_on_offer)
            .field("observers", &self.observers.len())
            .finish()
    }
}
