//! Ordered, bounded upload queue with a selection pointer.
//!
//! # Invariants
//!
//! - `items.len() <= capacity`, enforced when items are offered. Nothing
//!   is ever evicted to make room.
//! - Item ids are unique and never reused by the same queue.
//! - `selection`, when set, names an item currently in the queue.
//!   Removing the selected item moves the selection to the new first
//!   item, or clears it when the queue becomes empty.
//! - Item order is display order and submission order. Only
//!   [`UploadQueue::reorder`] changes it.

use std::fmt;
use std::num::NonZeroUsize;

use crate::classify::{self, MediaKind};
use crate::file::FileHandle;
use crate::validate::Validator;

/// Stable identity of a queued file across reorders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item-{}", self.0)
    }
}

/// A classified file held in a queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueItem {
    id: ItemId,
    handle: FileHandle,
    kind: MediaKind,
    inserted_at: u64,
}

impl QueueItem {
    #[must_use]
    pub const fn id(&self) -> ItemId {
        self.id
    }

    #[must_use]
    pub const fn handle(&self) -> &FileHandle {
        &self.handle
    }

    #[must_use]
    pub const fn kind(&self) -> MediaKind {
        self.kind
    }

    /// Monotonic intake order, unaffected by reordering.
    #[must_use]
    pub const fn inserted_at(&self) -> u64 {
        self.inserted_at
    }
}

/// Direction for an adjacent swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// Why an offered file did not enter the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// The feature's validator or the classifier refused the file.
    Invalid,
    /// The file was acceptable but the queue had no room left.
    Capacity,
}

/// A single refused file from an offered batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub name: String,
    pub reason: RejectReason,
}

/// Outcome of [`UploadQueue::offer`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OfferReport {
    /// Ids of the items appended, in queue order.
    pub added: Vec<ItemId>,
    /// Refused files, in offered order.
    pub rejections: Vec<Rejection>,
}

impl OfferReport {
    #[must_use]
    pub fn accepted(&self) -> usize {
        self.added.len()
    }

    #[must_use]
    pub fn rejected_invalid(&self) -> usize {
        self.count(RejectReason::Invalid)
    }

    #[must_use]
    pub fn rejected_capacity(&self) -> usize {
        self.count(RejectReason::Capacity)
    }

    /// Names of files refused for `reason`.
    pub fn rejected_names(&self, reason: RejectReason) -> impl Iterator<Item = &str> {
        self.rejections
            .iter()
            .filter(move |r| r.reason == reason)
            .map(|r| r.name.as_str())
    }

    fn count(&self, reason: RejectReason) -> usize {
        self.rejections.iter().filter(|r| r.reason == reason).count()
    }
}

/// Errors from queue operations that refuse rather than no-op.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueueError {
    /// The id does not name an item in this queue.
    #[error("{0} is not in the queue")]
    UnknownItem(ItemId),
}

/// Ordered collection of accepted files.
#[derive(Debug, Clone)]
pub struct UploadQueue {
    items: Vec<QueueItem>,
    capacity: NonZeroUsize,
    selection: Option<ItemId>,
    validator: Validator,
    next_id: u64,
}

impl UploadQueue {
    /// Create an empty queue.
    #[must_use]
    pub const fn new(capacity: NonZeroUsize, validator: Validator) -> Self {
        Self {
            items: Vec::new(),
            capacity,
            selection: None,
            validator,
            next_id: 0,
        }
    }

    #[must_use]
    pub fn items(&self) -> &[QueueItem] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub const fn capacity(&self) -> NonZeroUsize {
        self.capacity
    }

    /// Free slots left.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.capacity.get().saturating_sub(self.items.len())
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.remaining() == 0
    }

    #[must_use]
    pub const fn validator(&self) -> &Validator {
        &self.validator
    }

    #[must_use]
    pub const fn selection(&self) -> Option<ItemId> {
        self.selection
    }

    /// The selected item, if any.
    #[must_use]
    pub fn selected(&self) -> Option<&QueueItem> {
        self.selection.and_then(|id| self.get(id))
    }

    #[must_use]
    pub fn get(&self, id: ItemId) -> Option<&QueueItem> {
        self.items.iter().find(|item| item.id == id)
    }

    fn position(&self, id: ItemId) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }

    /// Owned copy of the items for work that outlives this borrow.
    ///
    /// File content is shared, so this is cheap.
    #[must_use]
    pub fn snapshot(&self) -> Vec<QueueItem> {
        self.items.clone()
    }

    /// Validate, classify, and append an offered batch.
    ///
    /// Each file is judged on its own: invalid files are refused
    /// individually and never block the rest of the batch. Accepted
    /// files are appended in offered order until the queue is full;
    /// any further accepted files are refused with
    /// [`RejectReason::Capacity`].
    ///
    /// If nothing was selected, the first appended item becomes the
    /// selection.
    pub fn offer(&mut self, batch: impl IntoIterator<Item = FileHandle>) -> OfferReport {
        let mut report = OfferReport::default();
        for handle in batch {
            let kind = if self.validator.accepts(&handle) {
                classify::classify(&handle)
            } else {
                None
            };
            let Some(kind) = kind else {
                tracing::debug!(name = handle.name(), "rejected invalid file");
                report.rejections.push(Rejection {
                    name: handle.name().to_owned(),
                    reason: RejectReason::Invalid,
                });
                continue;
            };
            if self.is_full() {
                report.rejections.push(Rejection {
                    name: handle.name().to_owned(),
                    reason: RejectReason::Capacity,
                });
                continue;
            }
            let id = ItemId(self.next_id);
            self.items.push(QueueItem {
                id,
                handle,
                kind,
                inserted_at: self.next_id,
            });
            self.next_id += 1;
            report.added.push(id);
        }

        if self.selection.is_none() {
            self.selection = report.added.first().copied();
        }

        tracing::debug!(
            accepted = report.accepted(),
            rejected_invalid = report.rejected_invalid(),
            rejected_capacity = report.rejected_capacity(),
            len = self.items.len(),
            "offered batch"
        );
        report
    }

    /// Replace the whole queue with a new batch.
    ///
    /// Used by single-file features, where picking a new file swaps out
    /// the old one. The old contents are only cleared if the batch has
    /// at least one acceptable file; otherwise the queue is left as is.
    pub fn replace_with(&mut self, batch: impl IntoIterator<Item = FileHandle>) -> OfferReport {
        let batch: Vec<FileHandle> = batch.into_iter().collect();
        let any_valid = batch
            .iter()
            .any(|h| self.validator.accepts(h) && classify::classify(h).is_some());
        if any_valid {
            self.clear();
        }
        self.offer(batch)
    }

    /// Remove an item. Removing an absent id is a no-op.
    ///
    /// Returns `true` if an item was removed.
    pub fn remove(&mut self, id: ItemId) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };
        self.items.remove(index);
        if self.selection == Some(id) {
            self.selection = self.items.first().map(|item| item.id);
        }
        true
    }

    /// Swap an item with its neighbour in `direction`.
    ///
    /// A no-op for the first item moving up, the last item moving down,
    /// and unknown ids. Returns `true` if the order changed.
    pub fn reorder(&mut self, id: ItemId, direction: Direction) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };
        let target = match direction {
            Direction::Up => index.checked_sub(1),
            Direction::Down => Some(index + 1).filter(|&t| t < self.items.len()),
        };
        let Some(target) = target else {
            return false;
        };
        self.items.swap(index, target);
        true
    }

    /// Select an item.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::UnknownItem`] if `id` is not in the queue;
    /// the current selection is left unchanged.
    pub fn select(&mut self, id: ItemId) -> Result<(), QueueError> {
        if self.position(id).is_none() {
            return Err(QueueError::UnknownItem(id));
        }
        self.selection = Some(id);
        Ok(())
    }

    /// Empty the queue and drop the selection.
    pub fn clear(&mut self) {
        self.items.clear();
        self.selection = None;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const IMAGES: Validator = Validator::kinds(&[MediaKind::Image]);

    fn png(name: &str) -> FileHandle {
        FileHandle::new(name, "image/png", name.as_bytes().to_vec())
    }

    fn txt(name: &str) -> FileHandle {
        FileHandle::new(name, "text/plain", Vec::new())
    }

    fn queue(capacity: usize) -> UploadQueue {
        UploadQueue::new(NonZeroUsize::new(capacity).unwrap(), IMAGES)
    }

    fn names(q: &UploadQueue) -> Vec<&str> {
        q.items().iter().map(|i| i.handle().name()).collect()
    }

    #[test]
    fn offer_appends_in_order_and_selects_first() {
        let mut q = queue(5);
        let report = q.offer([png("a.png"), png("b.png")]);
        assert_eq!(report.accepted(), 2);
        assert_eq!(names(&q), ["a.png", "b.png"]);
        assert_eq!(q.selection(), Some(report.added[0]));
    }

    #[test]
    fn offer_keeps_existing_selection() {
        let mut q = queue(5);
        let first = q.offer([png("a.png")]).added[0];
        q.offer([png("b.png")]);
        assert_eq!(q.selection(), Some(first));
    }

    #[test]
    fn invalid_files_rejected_individually() {
        let mut q = queue(5);
        let report = q.offer([png("a.png"), txt("notes.txt"), png("b.png")]);
        assert_eq!(report.accepted(), 2);
        assert_eq!(report.rejected_invalid(), 1);
        assert_eq!(report.rejected_capacity(), 0);
        assert_eq!(
            report.rejected_names(RejectReason::Invalid).collect::<Vec<_>>(),
            ["notes.txt"]
        );
        assert_eq!(names(&q), ["a.png", "b.png"]);
    }

    #[test]
    fn capacity_overflow_reported_separately() {
        let mut q = queue(2);
        let report = q.offer([png("a.png"), txt("x.txt"), png("b.png"), png("c.png")]);
        assert_eq!(report.accepted(), 2);
        assert_eq!(report.rejected_invalid(), 1);
        assert_eq!(report.rejected_capacity(), 1);
        assert_eq!(
            report.rejected_names(RejectReason::Capacity).collect::<Vec<_>>(),
            ["c.png"]
        );
        assert!(q.is_full());
    }

    #[test]
    fn ids_are_never_reused() {
        let mut q = queue(1);
        let a = q.offer([png("a.png")]).added[0];
        q.remove(a);
        let b = q.offer([png("a.png")]).added[0];
        assert_ne!(a, b);
        q.clear();
        let c = q.offer([png("a.png")]).added[0];
        assert_ne!(b, c);
        assert!(q.items()[0].inserted_at() > a.0);
    }

    #[test]
    fn remove_selected_moves_selection_to_first() {
        let mut q = queue(5);
        let ids = q.offer([png("a.png"), png("b.png"), png("c.png")]).added;
        q.select(ids[1]).unwrap();
        assert!(q.remove(ids[1]));
        assert_eq!(q.selection(), Some(ids[0]));
    }

    #[test]
    fn remove_unselected_keeps_selection() {
        let mut q = queue(5);
        let ids = q.offer([png("a.png"), png("b.png")]).added;
        q.select(ids[1]).unwrap();
        q.remove(ids[0]);
        assert_eq!(q.selection(), Some(ids[1]));
    }

    #[test]
    fn remove_last_item_clears_selection() {
        let mut q = queue(5);
        let id = q.offer([png("a.png")]).added[0];
        assert!(q.remove(id));
        assert_eq!(q.selection(), None);
        assert!(q.is_empty());
    }

    #[test]
    fn remove_is_idempotent() {
        let mut q = queue(5);
        let id = q.offer([png("a.png")]).added[0];
        assert!(q.remove(id));
        assert!(!q.remove(id));
    }

    #[test]
    fn reorder_swaps_adjacent() {
        let mut q = queue(5);
        let ids = q.offer([png("a.png"), png("b.png"), png("c.png")]).added;
        assert!(q.reorder(ids[2], Direction::Up));
        assert_eq!(names(&q), ["a.png", "c.png", "b.png"]);
        assert!(q.reorder(ids[0], Direction::Down));
        assert_eq!(names(&q), ["c.png", "a.png", "b.png"]);
    }

    #[test]
    fn reorder_at_edges_is_noop() {
        let mut q = queue(5);
        let ids = q.offer([png("a.png"), png("b.png")]).added;
        assert!(!q.reorder(ids[0], Direction::Up));
        assert!(!q.reorder(ids[1], Direction::Down));
        assert_eq!(names(&q), ["a.png", "b.png"]);
    }

    #[test]
    fn reorder_does_not_move_selection() {
        let mut q = queue(5);
        let ids = q.offer([png("a.png"), png("b.png")]).added;
        q.reorder(ids[0], Direction::Down);
        assert_eq!(q.selection(), Some(ids[0]));
        assert_eq!(q.selected().unwrap().handle().name(), "a.png");
    }

    #[test]
    fn select_unknown_id_rejected() {
        let mut q = queue(5);
        let ids = q.offer([png("a.png"), png("b.png")]).added;
        q.remove(ids[1]);
        assert_eq!(q.select(ids[1]), Err(QueueError::UnknownItem(ids[1])));
        assert_eq!(q.selection(), Some(ids[0]));
    }

    #[test]
    fn clear_empties_items_and_selection() {
        let mut q = queue(5);
        q.offer([png("a.png"), png("b.png")]);
        q.clear();
        assert!(q.is_empty());
        assert_eq!(q.selection(), None);
        assert_eq!(q.remaining(), 5);
    }

    #[test]
    fn replace_with_swaps_single_file() {
        let mut q = queue(1);
        let old = q.offer([png("a.png")]).added[0];
        let report = q.replace_with([png("b.png")]);
        assert_eq!(report.accepted(), 1);
        assert_eq!(names(&q), ["b.png"]);
        assert!(q.get(old).is_none());
        assert_eq!(q.selection(), Some(report.added[0]));
    }

    #[test]
    fn replace_with_invalid_batch_keeps_current_file() {
        let mut q = queue(1);
        q.offer([png("a.png")]);
        let report = q.replace_with([txt("x.txt")]);
        assert_eq!(report.rejected_invalid(), 1);
        assert_eq!(names(&q), ["a.png"]);
    }

    #[test]
    fn allow_list_file_still_needs_a_kind() {
        // An allow-list that admits something the classifier cannot
        // place must still be refused.
        let validator = Validator::allow_list(&["text/plain"], &["txt"]);
        let mut q = UploadQueue::new(NonZeroUsize::new(3).unwrap(), validator);
        let report = q.offer([txt("notes.txt")]);
        assert_eq!(report.rejected_invalid(), 1);
        assert!(q.is_empty());
    }

    #[test]
    fn items_record_their_kind() {
        let validator = Validator::kinds(&[MediaKind::Image, MediaKind::Document]);
        let mut q = UploadQueue::new(NonZeroUsize::new(3).unwrap(), validator);
        q.offer([
            png("a.png"),
            FileHandle::new("b.pdf", "application/pdf", Vec::new()),
        ]);
        let kinds: Vec<MediaKind> = q.items().iter().map(QueueItem::kind).collect();
        assert_eq!(kinds, [MediaKind::Image, MediaKind::Document]);
    }
}
