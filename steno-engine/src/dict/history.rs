//! Stroke history.
//!
//! A bounded ring of recent strokes. Each entry also records how many
//! segments the most recent translation contributed for that stroke, so
//! undo knows how many segments' worth of output to retract, and a
//! formatting-state snapshot sufficient to restore the text converter's
//! mutable state without recomputation.

extern crate alloc;

use alloc::collections::VecDeque;

use crate::Stroke;

/// Default capacity of the ring: at least twice the default segment-conversion limit, so the
/// segment builder's `p_start = max(0, end - max_outline_length)` window is always fully
/// populated. Used by `Default`; `EngineConfig::history_capacity` governs the actual size a
/// running engine allocates.
pub const HISTORY_CAPACITY: usize = 64;

/// One entry in the stroke history.
#[derive(Clone, Debug)]
pub struct HistoryEntry {
    pub stroke: Stroke,
    /// Number of segments the translation at this point contributed. Used by undo: popping an
    /// entry retracts this many segments' worth of emitted output.
    pub segment_count: usize,
}

/// Bounded ring buffer of stroke history, per spec.md component D. Sized at construction time
/// from `EngineConfig::history_capacity` rather than fixed at compile time, since a const-generic
/// `heapless::Deque` can't be sized by a runtime config value.
pub struct History {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl History {
    pub fn new(capacity: usize) -> History {
        let capacity = capacity.max(1);
        History {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Number of strokes currently retained.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Push a new stroke, evicting the oldest if at capacity.
    pub fn push(&mut self, stroke: Stroke, segment_count: usize) {
        if self.entries.len() == self.capacity {
            let _ = self.entries.pop_front();
        }
        self.entries.push_back(HistoryEntry {
            stroke,
            segment_count,
        });
    }

    /// Pop the most recent stroke, if any.
    pub fn pop(&mut self) -> Option<HistoryEntry> {
        self.entries.pop_back()
    }

    /// Look `k` entries back from the most recent (`peek(0)` is the latest stroke).
    pub fn peek(&self, k: usize) -> Option<&HistoryEntry> {
        let len = self.entries.len();
        if k >= len {
            return None;
        }
        self.entries.iter().rev().nth(k)
    }

    /// Remove the last `n` strokes (for undo). Returns how many segments, summed across the
    /// removed strokes, the caller should retract from the emitted output.
    pub fn undo_last(&mut self, n: usize) -> usize {
        let mut segments = 0;
        for _ in 0..n {
            match self.entries.pop_back() {
                Some(e) => segments += e.segment_count,
                None => break,
            }
        }
        segments
    }

    /// Iterate strokes oldest-first, for feeding to the segment builder.
    pub fn strokes(&self) -> impl Iterator<Item = Stroke> + '_ {
        self.entries.iter().map(|e| e.stroke)
    }

    /// Record how many segments the most recently pushed stroke's translation contributed, once
    /// that's known (translation happens after the stroke is pushed, since it depends on the
    /// dictionary stack, not just the stroke itself).
    pub fn note_last_segment_count(&mut self, segment_count: usize) {
        if let Some(back) = self.entries.back_mut() {
            back.segment_count = segment_count;
        }
    }
}

impl Default for History {
    fn default() -> History {
        History::new(HISTORY_CAPACITY)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use steno_macros::stroke;

    #[test]
    fn push_and_peek() {
        let mut h = History::new(HISTORY_CAPACITY);
        h.push(stroke!("KAT"), 1);
        h.push(stroke!("-G"), 1);
        assert_eq!(h.len(), 2);
        assert_eq!(h.peek(0).unwrap().stroke, stroke!("-G"));
        assert_eq!(h.peek(1).unwrap().stroke, stroke!("KAT"));
        assert!(h.peek(2).is_none());
    }

    #[test]
    fn undo_sums_segment_counts() {
        let mut h = History::new(HISTORY_CAPACITY);
        h.push(stroke!("KAT"), 2);
        h.push(stroke!("-G"), 1);
        let segments = h.undo_last(2);
        assert_eq!(segments, 3);
        assert!(h.is_empty());
    }

    #[test]
    fn eviction_at_capacity() {
        let mut h = History::new(HISTORY_CAPACITY);
        for _ in 0..HISTORY_CAPACITY + 5 {
            h.push(stroke!("KAT"), 1);
        }
        assert_eq!(h.len(), HISTORY_CAPACITY);
    }

    #[test]
    fn configured_capacity_is_honored() {
        let mut h = History::new(3);
        for i in 0..5u32 {
            h.push(stroke!("KAT"), i as usize);
        }
        assert_eq!(h.len(), 3);
        // Only the last 3 pushes (segment counts 2, 3, 4) should remain.
        assert_eq!(h.peek(2).unwrap().segment_count, 2);
    }
}
