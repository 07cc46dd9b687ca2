//! # Undo/Redo History
//!
//! Linear history of element-list snapshots.
//!
//! ## Design
//!
//! - A snapshot is an `Arc` over a list of `Arc<Element>`; taking one is a
//!   reference-count bump, and a later mutation copies only the list spine and
//!   the elements it actually touches
//! - Recording a snapshot clears the redo stack
//! - Undo moves the current list to the front of `future`
//! - Redo moves the current list back onto `past`
//! - Selection and canvas configuration are never recorded

use std::collections::VecDeque;
use std::sync::Arc;

use crate::element::Element;

/// Shared, immutable view of the element list at one point in time.
pub type Snapshot = Arc<Vec<Arc<Element>>>;

/// Undo/redo stacks of element-list snapshots.
#[derive(Debug, Clone, Default)]
pub struct History {
    /// Pre-mutation snapshots, most recent last.
    past: Vec<Snapshot>,
    /// Undone snapshots, next redo first.
    future: VecDeque<Snapshot>,
    /// Maximum number of undo levels (0 = unlimited).
    max_levels: usize,
}

impl History {
    /// Create an unlimited history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a history that keeps at most `max_levels` undo steps (0 = unlimited).
    #[must_use]
    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            max_levels,
            ..Self::default()
        }
    }

    /// Record the list as it was before a mutation.
    pub fn record(&mut self, before: Snapshot) {
        self.past.push(before);
        if self.max_levels > 0 && self.past.len() > self.max_levels {
            let overflow = self.past.len() - self.max_levels;
            self.past.drain(..overflow);
        }
        self.future.clear();
    }

    /// Step back. Returns the list to restore, or `None` if there is nothing to undo.
    pub fn undo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let previous = self.past.pop()?;
        self.future.push_front(current);
        Some(previous)
    }

    /// Step forward. Returns the list to restore, or `None` if there is nothing to redo.
    pub fn redo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let next = self.future.pop_front()?;
        self.past.push(current);
        Some(next)
    }

    /// Drop the redo stack without recording anything.
    pub fn discard_redo(&mut self) {
        self.future.clear();
    }

    /// Check if undo is available.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    /// Check if redo is available.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Number of undo steps held.
    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.past.len()
    }

    /// Number of redo steps held.
    #[must_use]
    pub fn redo_depth(&self) -> usize {
        self.future.len()
    }

    /// Drop both stacks.
    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{ElementType, Position};

    fn snapshot(count: usize) -> Snapshot {
        Arc::new(
            (0..count)
                .map(|_| Arc::new(Element::new(ElementType::Text, Position::default())))
                .collect(),
        )
    }

    #[test]
    fn test_discard_redo_keeps_undo() {
        let mut history = History::new();
        history.record(snapshot(0));
        let restored = history.undo(snapshot(1));
        assert!(restored.is_some());
        assert!(history.can_redo());

        history.discard_redo();
        assert!(!history.can_redo());
        assert_eq!(history.undo_depth(), 0);
    }

    #[test]
    fn test_undo_redo_cycle() {
        let mut history = History::new();
        let s0 = snapshot(0);
        let s1 = snapshot(1);
        let s2 = snapshot(2);

        history.record(Arc::clone(&s0));
        history.record(Arc::clone(&s1));

        let restored = history.undo(Arc::clone(&s2)).expect("undo");
        assert!(Arc::ptr_eq(&restored, &s1));
        let restored = history.undo(Arc::clone(&s1)).expect("undo");
        assert!(Arc::ptr_eq(&restored, &s0));
        assert!(history.undo(Arc::clone(&s0)).is_none());

        let restored = history.redo(Arc::clone(&s0)).expect("redo");
        assert!(Arc::ptr_eq(&restored, &s1));
        let restored = history.redo(Arc::clone(&s1)).expect("redo");
        assert!(Arc::ptr_eq(&restored, &s2));
        assert!(history.redo(s2).is_none());
    }

    #[test]
    fn test_record_clears_future() {
        let mut history = History::new();
        history.record(snapshot(0));
        history.undo(snapshot(1));
        assert!(history.can_redo());

        history.record(snapshot(1));
        assert!(!history.can_redo());
        assert_eq!(history.undo_depth(), 1);
    }

    #[test]
    fn test_max_levels_drops_oldest() {
        let mut history = History::with_max_levels(2);
        let s0 = snapshot(0);
        history.record(Arc::clone(&s0));
        history.record(snapshot(1));
        history.record(snapshot(2));
        assert_eq!(history.undo_depth(), 2);

        history.undo(snapshot(3));
        let oldest = history.undo(snapshot(2)).expect("undo");
        assert_eq!(oldest.len(), 1, "the empty snapshot was trimmed");
        assert!(!history.can_undo());
    }

    #[test]
    fn test_clear() {
        let mut history = History::new();
        history.record(snapshot(0));
        history.undo(snapshot(1));
        history.record(snapshot(2));
        history.clear();
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }
}
