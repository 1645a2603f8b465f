//! Dictionary operations.
//!
//! A steno dictionary maps stroke outlines to definitions. A definition is a
//! string mixing literal text with the control sequences `replacements`
//! understands. This module doesn't implement any single dictionary source;
//! it is the shared lookup machinery (`Dict`, `DictImpl`, `Selector`) that
//! every dictionary backend — in-memory, packed binary, or a layered stack of
//! both — is built from.

extern crate alloc;

use alloc::rc::Rc;
use alloc::string::{String, ToString};

use crate::Stroke;

pub mod history;
pub mod ortho;
pub mod packed;
pub mod ram;
pub mod reverse;
pub mod segment;
pub mod stack;

pub use history::History;
pub use ram::{MapDict, MapDictBuilder, RamDict};
pub use segment::{Action, Segment};
pub use stack::DictionaryStack;

/// Something strokes can be looked up in.
pub trait Dict {
    /// The core lookup: works like a map lookup, finding exact matches. A longer stroke
    /// sequence that isn't itself a key will not match, even if a prefix of it is.
    fn lookup<'a>(&'a self, strokes: &[Stroke]) -> Option<&'a str>;

    /// The longest stroke sequence used as a key in this dictionary. Used by the default
    /// `prefix_lookup`; implementations that can compute this cheaply should cache it.
    fn longest_key(&self) -> usize;

    /// A prefix lookup: like `lookup`, but succeeds if some prefix of `query` is a key, even if
    /// the whole of `query` is not. Returns the length of the longest matching prefix and its
    /// value. Adding more strokes and searching again may produce a different (longer) match.
    fn prefix_lookup<'a>(&'a self, query: &[Stroke]) -> Option<(usize, &'a str)> {
        let longest = self.longest_key().min(query.len());

        let mut best = None;

        for len in 1..(longest + 1) {
            let key = &query[..len];
            if let Some(result) = self.lookup(key) {
                best = Some((len, result));
            }
        }

        best
    }
}

/// A selector tracks the range of a sorted dictionary's entries consistent with the strokes
/// matched so far, so that feeding one more stroke at a time only needs to narrow the range
/// rather than re-search from scratch.
pub struct Selector {
    dict: Rc<dyn DictImpl>,

    /// Number of strokes matched so far.
    pub count: usize,

    /// `[left, right)` bounds of the dictionary entries consistent with the strokes matched.
    pub left: usize,
    pub right: usize,
}

impl Selector {
    /// A selector over the whole dictionary, with nothing matched yet.
    pub fn new(dict: Rc<dyn DictImpl>) -> Selector {
        let left = 0;
        let right = dict.len();
        Selector {
            dict,
            left,
            right,
            count: 0,
        }
    }

    /// Narrow the range by one more stroke. Returns the narrowed selector, and the matched
    /// value if the narrowed range is an exact match (its key length equals the number of
    /// strokes fed so far).
    pub fn lookup_step(&self, key: Stroke) -> Option<(Selector, Option<String>)> {
        let left = self.dict.scan(self.left, self.right, self.count, key);
        let right = self.dict.scan(self.left, self.right, self.count, key.succ());
        if right > left {
            let matched_key = self.dict.key(left);
            let text = if matched_key.len() == self.count + 1 {
                Some(self.dict.value(left).to_string())
            } else {
                None
            };
            Some((
                Selector {
                    dict: self.dict.clone(),
                    count: self.count + 1,
                    left,
                    right,
                },
                text,
            ))
        } else {
            None
        }
    }

    /// Can any further stroke possibly produce more than one translation? True once the range
    /// has narrowed to a single entry.
    pub fn unique(&self) -> bool {
        self.left + 1 == self.right
    }
}

/// The sorted-key view a dictionary backend exposes so `Selector` can binary search it.
pub trait DictImpl {
    fn len(&self) -> usize;
    fn key(&self, index: usize) -> &[Stroke];
    fn value(&self, index: usize) -> &str;

    /// Binary search `[a, b)` for the first entry whose key at position `pos` is `>= needle`.
    fn scan(&self, a: usize, b: usize, pos: usize, needle: Stroke) -> usize {
        let mut left = a;
        let mut right = b;
        while left < right {
            let mid = left + (right - left) / 2;
            let k = self.key(mid);

            if pos == k.len() - 1 && k[pos] == needle {
                return mid;
            }

            if needle > k[pos] {
                left = mid + 1;
            } else {
                right = mid;
            }
        }

        left
    }
}
