use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::math::Point2;

/// What a queued event consumes. Vertex fields index the engine's wavefront
/// vertex list; `edge` indexes the contour edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum EventKind {
    /// The front segment between two consecutive vertices shrinks to a point.
    Edge { left: usize, right: usize },
    /// A reflex vertex reaches the front of a non-adjacent edge.
    Split { vertex: usize, edge: usize },
}

#[derive(Debug, Clone, Copy)]
pub(super) struct Event {
    pub time: f64,
    pub point: Point2,
    pub kind: EventKind,
    seq: u64,
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Event {}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: earliest time, then earliest insertion, pops first.
        other
            .time
            .total_cmp(&self.time)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Min-queue of events ordered by `(time, insertion order)`.
///
/// Entries are never removed early; the engine drops stale ones on pop.
#[derive(Debug, Default)]
pub(super) struct EventQueue {
    heap: BinaryHeap<Event>,
    next_seq: u64,
}

impl EventQueue {
    pub fn push(&mut self, time: f64, point: Point2, kind: EventKind) {
        self.heap.push(Event {
            time,
            point,
            kind,
            seq: self.next_seq,
        });
        self.next_seq += 1;
    }

    pub fn pop(&mut self) -> Option<Event> {
        self.heap.pop()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }
}
