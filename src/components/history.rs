use std::collections::VecDeque;

use crate::canvas::Image;
use crate::log_info;

pub const DEFAULT_HISTORY_CAPACITY: usize = 20;

// ============================================================================
// HISTORY ENTRY
// ============================================================================

/// A full image snapshot plus the name of the operation it belongs to.
#[derive(Clone, Debug)]
struct Entry {
    description: String,
    image: Image,
}

impl Entry {
    fn memory_size(&self) -> usize {
        self.image.memory_size() + self.description.len()
    }
}

// ============================================================================
// HISTORY MANAGER - bounded undo/redo stacks of snapshots
// ============================================================================

/// Undo/redo history. Both stacks hold at most `capacity` snapshots; pushing
/// past that evicts the oldest undo entry.
#[derive(Debug)]
pub struct HistoryManager {
    undo_stack: VecDeque<Entry>,
    redo_stack: VecDeque<Entry>,
    capacity: usize,
    /// Running memory total across both stacks.
    total_memory: usize,
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl HistoryManager {
    /// `capacity` is floored at 1.
    pub fn new(capacity: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            capacity: capacity.max(1),
            total_memory: 0,
        }
    }

    /// Snapshot `image` before an unnamed mutation.
    pub fn push_undo(&mut self, image: &Image) {
        self.push_labeled("Edit", image.clone());
    }

    /// Store `image`, the state before the mutation called `description`.
    pub fn push_labeled(&mut self, description: impl Into<String>, image: Image) {
        // A new action invalidates everything that was undone.
        for entry in self.redo_stack.drain(..) {
            self.total_memory = self.total_memory.saturating_sub(entry.memory_size());
        }

        let entry = Entry {
            description: description.into(),
            image,
        };
        self.total_memory += entry.memory_size();
        self.undo_stack.push_back(entry);

        self.prune();
    }

    /// Restore the most recent snapshot into `current`. The state being
    /// replaced moves onto the redo stack. Returns `false` when there is
    /// nothing to undo.
    pub fn undo(&mut self, current: &mut Image) -> bool {
        let Some(entry) = self.undo_stack.pop_back() else {
            return false;
        };
        self.total_memory = self.total_memory.saturating_sub(entry.memory_size());
        let Entry { description, image } = entry;
        let replaced = std::mem::replace(current, image);
        self.push_redo(Entry {
            description,
            image: replaced,
        });
        true
    }

    /// Mirror of [`undo`](Self::undo).
    pub fn redo(&mut self, current: &mut Image) -> bool {
        let Some(entry) = self.redo_stack.pop_back() else {
            return false;
        };
        self.total_memory = self.total_memory.saturating_sub(entry.memory_size());
        let Entry { description, image } = entry;
        let replaced = std::mem::replace(current, image);
        let entry = Entry {
            description,
            image: replaced,
        };
        self.total_memory += entry.memory_size();
        self.undo_stack.push_back(entry);
        self.prune();
        true
    }

    fn push_redo(&mut self, entry: Entry) {
        self.total_memory += entry.memory_size();
        self.redo_stack.push_back(entry);
        while self.redo_stack.len() > self.capacity {
            if let Some(removed) = self.redo_stack.pop_front() {
                self.total_memory = self.total_memory.saturating_sub(removed.memory_size());
            }
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack.back().map(|e| e.description.as_str())
    }

    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack.back().map(|e| e.description.as_str())
    }

    /// All undo descriptions, most recent first.
    pub fn undo_history(&self) -> Vec<&str> {
        self.undo_stack.iter().rev().map(|e| e.description.as_str()).collect()
    }

    /// Bytes held by both stacks.
    pub fn memory_usage(&self) -> usize {
        self.total_memory
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Change the bound; excess entries are evicted oldest first.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
        self.prune();
        while self.redo_stack.len() > self.capacity {
            if let Some(removed) = self.redo_stack.pop_front() {
                self.total_memory = self.total_memory.saturating_sub(removed.memory_size());
            }
        }
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.total_memory = 0;
    }

    /// Evict from the bottom of the undo stack until it fits.
    fn prune(&mut self) {
        while self.undo_stack.len() > self.capacity {
            if let Some(removed) = self.undo_stack.pop_front() {
                self.total_memory = self.total_memory.saturating_sub(removed.memory_size());
                log_info!("History full, dropped '{}'", removed.description);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shade(v: u8) -> Image {
        Image::filled(2, 2, [v, v, v])
    }

    #[test]
    fn undo_on_empty_history_is_noop() {
        let mut h = HistoryManager::default();
        let mut img = shade(5);
        assert!(!h.undo(&mut img));
        assert!(!h.redo(&mut img));
        assert_eq!(img, shade(5));
    }

    #[test]
    fn undo_then_redo_round_trip() {
        let mut h = HistoryManager::new(5);
        let mut img = shade(1);
        h.push_labeled("Invert", img.clone());
        img = shade(2);

        assert!(h.undo(&mut img));
        assert_eq!(img, shade(1));
        assert_eq!(h.redo_description(), Some("Invert"));

        assert!(h.redo(&mut img));
        assert_eq!(img, shade(2));
        assert_eq!(h.undo_description(), Some("Invert"));
        assert!(!h.can_redo());
    }

    #[test]
    fn push_clears_redo() {
        let mut h = HistoryManager::new(5);
        let mut img = shade(1);
        h.push_undo(&img);
        img = shade(2);
        h.undo(&mut img);
        assert!(h.can_redo());
        h.push_undo(&img);
        assert!(!h.can_redo());
    }

    #[test]
    fn eviction_drops_oldest() {
        let mut h = HistoryManager::new(3);
        for v in 0..4 {
            h.push_labeled(format!("step {v}"), shade(v));
        }
        assert_eq!(h.undo_count(), 3);
        assert_eq!(h.undo_history(), vec!["step 3", "step 2", "step 1"]);

        let mut img = shade(9);
        for _ in 0..3 {
            assert!(h.undo(&mut img));
        }
        assert_eq!(img, shade(1));
        assert!(!h.can_undo());
    }

    #[test]
    fn memory_tracks_both_stacks() {
        let mut h = HistoryManager::new(4);
        let mut img = shade(1);
        h.push_labeled("a", img.clone());
        let one = h.memory_usage();
        assert_eq!(one, 12 + 1);
        img = shade(2);
        h.undo(&mut img);
        assert_eq!(h.memory_usage(), one);
        h.clear();
        assert_eq!(h.memory_usage(), 0);
    }

    #[test]
    fn shrinking_capacity_evicts() {
        let mut h = HistoryManager::new(10);
        for v in 0..6 {
            h.push_undo(&shade(v));
        }
        h.set_capacity(2);
        assert_eq!(h.undo_count(), 2);
        h.set_capacity(0);
        assert_eq!(h.capacity(), 1);
        assert_eq!(h.undo_count(), 1);
    }
}
