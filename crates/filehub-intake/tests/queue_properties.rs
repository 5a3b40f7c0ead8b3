//! Integration test: queue invariants under arbitrary operation sequences
//! and a few end-to-end intake cases.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::HashSet;
use std::num::NonZeroUsize;

use filehub_intake::{
    Direction, FileHandle, MediaKind, RejectReason, UploadQueue, Validator,
};

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

/// Small deterministic generator so failures reproduce exactly.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        self.0 >> 33
    }

    fn below(&mut self, n: usize) -> usize {
        usize::try_from(self.next()).unwrap() % n
    }
}

fn assert_invariants(q: &UploadQueue) {
    assert!(q.len() <= q.capacity().get(), "queue exceeded capacity");
    let ids: HashSet<_> = q.items().iter().map(|i| i.id()).collect();
    assert_eq!(ids.len(), q.len(), "duplicate ids in queue");
    match q.selection() {
        Some(id) => assert!(ids.contains(&id), "selection {id} is dangling"),
        None => assert!(q.is_empty(), "non-empty queue without selection"),
    }
}

#[test]
fn invariants_hold_for_random_operation_sequences() {
    for seed in 0..50 {
        let mut rng = Lcg(seed);
        let capacity = 1 + rng.below(8);
        let mut q = queue(capacity);
        let mut seen = Vec::new();

        for step in 0..300 {
            match rng.below(6) {
                0 | 1 => {
                    let batch: Vec<FileHandle> = (0..rng.below(6))
                        .map(|i| {
                            let name = format!("f{step}_{i}");
                            if rng.below(4) == 0 {
                                txt(&format!("{name}.txt"))
                            } else {
                                png(&format!("{name}.png"))
                            }
                        })
                        .collect();
                    let before = q.len();
                    let report = q.offer(batch);
                    assert_eq!(q.len(), before + report.accepted());
                    seen.extend(report.added.iter().copied());
                }
                2 => {
                    if !seen.is_empty() {
                        // Includes ids already removed.
                        q.remove(seen[rng.below(seen.len())]);
                    }
                }
                3 => {
                    if !seen.is_empty() {
                        let dir = if rng.below(2) == 0 {
                            Direction::Up
                        } else {
                            Direction::Down
                        };
                        let before: Vec<_> = q.items().iter().map(|i| i.id()).collect();
                        q.reorder(seen[rng.below(seen.len())], dir);
                        let mut after: Vec<_> = q.items().iter().map(|i| i.id()).collect();
                        let mut sorted_before = before;
                        sorted_before.sort();
                        after.sort();
                        assert_eq!(sorted_before, after, "reorder changed membership");
                    }
                }
                4 => {
                    if !seen.is_empty() {
                        let id = seen[rng.below(seen.len())];
                        let previous = q.selection();
                        match q.select(id) {
                            Ok(()) => assert_eq!(q.selection(), Some(id)),
                            Err(_) => assert_eq!(q.selection(), previous),
                        }
                    }
                }
                _ => {
                    if rng.below(10) == 0 {
                        q.clear();
                    }
                }
            }
            assert_invariants(&q);
        }

        let unique: HashSet<_> = seen.iter().collect();
        assert_eq!(unique.len(), seen.len(), "an id was reused (seed {seed})");
    }
}

#[test]
fn partial_failure_grows_by_valid_count() {
    let mut q = queue(20);
    q.offer([png("existing.png")]);
    let batch = vec![
        png("a.png"),
        txt("b.txt"),
        png("c.png"),
        txt("d.txt"),
        png("e.png"),
        txt("f.txt"),
        png("g.png"),
        png("h.png"),
        png("i.png"),
        png("j.png"),
    ];
    let report = q.offer(batch);
    assert_eq!(report.rejected_invalid(), 3);
    assert_eq!(report.rejected_capacity(), 0);
    assert_eq!(q.len(), 1 + 10 - 3);
}

#[test]
fn overflow_appends_up_to_capacity() {
    let mut q = queue(20);
    let existing: Vec<FileHandle> = (0..19).map(|i| png(&format!("old{i}.png"))).collect();
    q.offer(existing);
    assert_eq!(q.len(), 19);

    let report = q.offer((0..5).map(|i| png(&format!("new{i}.png"))));
    assert_eq!(q.len(), 20);
    assert_eq!(report.accepted(), 1);
    assert_eq!(report.rejected_capacity(), 4);
    assert_eq!(report.rejected_invalid(), 0);
    assert_eq!(q.items()[19].handle().name(), "new0.png");
    assert_eq!(
        report.rejected_names(RejectReason::Capacity).collect::<Vec<_>>(),
        ["new1.png", "new2.png", "new3.png", "new4.png"]
    );
}

#[test]
fn invalid_file_does_not_block_valid_one() {
    let mut q = queue(20);
    let report = q.offer([png("valid.png"), txt("invalid.txt")]);
    assert_eq!(q.len(), 1);
    assert_eq!(q.items()[0].handle().name(), "valid.png");
    assert_eq!(report.rejected_invalid(), 1);
}

#[test]
fn removing_selection_moves_it_to_new_first() {
    let mut q = queue(5);
    let ids = q.offer([png("a.png"), png("b.png"), png("c.png")]).added;
    q.select(ids[0]).unwrap();
    q.remove(ids[0]);
    assert_eq!(q.selection(), Some(ids[1]));
    q.remove(ids[1]);
    q.remove(ids[2]);
    assert_eq!(q.selection(), None);
}

#[test]
fn edge_reorders_are_noops() {
    let mut q = queue(5);
    let ids = q.offer([png("a.png"), png("b.png"), png("c.png")]).added;
    let order = |q: &UploadQueue| q.items().iter().map(|i| i.id()).collect::<Vec<_>>();
    let before = order(&q);
    assert!(!q.reorder(ids[0], Direction::Up));
    assert!(!q.reorder(ids[2], Direction::Down));
    assert_eq!(order(&q), before);
}
