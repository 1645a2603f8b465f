//! Reverse-suffix dictionary.
//!
//! Used for suggestions: given a target phrase, strip a known suffix,
//! reverse-look-up the stem in an underlying dictionary, and recombine with
//! the suffix's own stroke(s) appended. Represented as a borrowed, sorted
//! slice of suffix descriptors searched by binary search, per the design
//! note in `DESIGN.md` (spec.md §9).

extern crate alloc;

use alloc::vec::Vec;

use crate::Stroke;

/// A reversible suffix: its surface text, and the stroke(s) that produce it.
#[derive(Clone, Copy, Debug)]
pub struct SuffixEntry<'a> {
    pub text: &'a str,
    pub strokes: &'a [Stroke],
}

/// Anything that can answer "what stroke sequences produce this text", used as the stem
/// dictionary a `ReverseSuffixDictionary` strips a suffix before consulting.
pub trait ReverseLookup {
    fn reverse_lookup(&self, text: &str) -> Vec<Vec<Stroke>>;
}

/// Strips a known suffix from a target phrase, reverse-looks-up the stem in an underlying
/// dictionary, and recombines with the suffix's stroke(s) appended.
///
/// `suffixes` must be sorted by `text` so lookups can binary search; `entries()` panics in debug
/// builds if that invariant is violated (callers build this once at startup from static data).
pub struct ReverseSuffixDictionary<'a, D> {
    suffixes: &'a [SuffixEntry<'a>],
    stems: D,
}

impl<'a, D: ReverseLookup> ReverseSuffixDictionary<'a, D> {
    pub fn new(suffixes: &'a [SuffixEntry<'a>], stems: D) -> Self {
        debug_assert!(
            suffixes.windows(2).all(|w| w[0].text <= w[1].text),
            "suffix list must be sorted"
        );
        ReverseSuffixDictionary { suffixes, stems }
    }

    /// Find the suffix entry whose text exactly matches `suffix`, if any.
    fn find_suffix(&self, suffix: &str) -> Option<&'a SuffixEntry<'a>> {
        self.suffixes
            .binary_search_by(|e| e.text.cmp(suffix))
            .ok()
            .map(|i| &self.suffixes[i])
    }

    /// Candidate stroke sequences that produce `target`, trying every registered suffix that
    /// `target` ends with and reverse-looking-up the remaining stem.
    pub fn reverse_lookup(&self, target: &str) -> Vec<Vec<Stroke>> {
        let mut out = Vec::new();

        for entry in self.suffixes {
            let Some(stem) = target.strip_suffix(entry.text) else {
                continue;
            };
            if stem.is_empty() {
                continue;
            }
            for mut candidate in self.stems.reverse_lookup(stem) {
                candidate.extend_from_slice(entry.strokes);
                out.push(candidate);
            }
        }

        out
    }

    /// Exact-match lookup of a single suffix by text (used when a caller already knows which
    /// suffix it wants to test, e.g. the segment builder's auto-suffix handling).
    pub fn lookup_suffix(&self, suffix: &str) -> Option<&'a SuffixEntry<'a>> {
        self.find_suffix(suffix)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use steno_macros::stroke;

    struct FakeStems;

    impl ReverseLookup for FakeStems {
        fn reverse_lookup(&self, text: &str) -> Vec<Vec<Stroke>> {
            if text == "happy" {
                alloc::vec![alloc::vec![stroke!("HAP"), stroke!("-P")]]
            } else {
                Vec::new()
            }
        }
    }

    #[test]
    fn strips_suffix_and_recombines() {
        let ing = alloc::vec![stroke!("-G")];
        let suffixes = [SuffixEntry {
            text: "ing",
            strokes: &ing,
        }];
        let dict = ReverseSuffixDictionary::new(&suffixes, FakeStems);

        let found = dict.reverse_lookup("happying");
        assert_eq!(found, alloc::vec![alloc::vec![
            stroke!("HAP"),
            stroke!("-P"),
            stroke!("-G"),
        ]]);

        assert!(dict.reverse_lookup("jumping").is_empty());
    }

    #[test]
    fn lookup_suffix_exact() {
        let ing = alloc::vec![stroke!("-G")];
        let suffixes = [SuffixEntry {
            text: "ing",
            strokes: &ing,
        }];
        let dict = ReverseSuffixDictionary::new(&suffixes, FakeStems);
        assert!(dict.lookup_suffix("ing").is_some());
        assert!(dict.lookup_suffix("ness").is_none());
    }
}
