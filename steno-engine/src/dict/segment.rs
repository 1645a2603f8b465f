//! Segment builder.
//!
//! Converts a window of strokes into an ordered list of segments by repeated
//! longest-match lookup against a dictionary stack, falling back to
//! fingerspelling when nothing matches. Generalizes the single-dictionary,
//! NFA-style incremental lookup of the original translator to the
//! longest-match-over-a-window form: since `DictionaryStack::lookup` already
//! does a full lookup of an arbitrary-length stroke slice, there's no need to
//! track incremental selector state between strokes — the builder simply
//! recomputes the affected tail of the segment list on each new stroke.

extern crate alloc;

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::Stroke;

use super::ortho::AutoSuffix;
use super::stack::DictionaryStack;

/// The translation of one outline into output text, plus the span of strokes it consumed.
/// `stroke_count` can be zero for a synthetic auto-suffix segment, which contributes text
/// without consuming any additional strokes of its own (the strokes it rides on were already
/// charged to the segment it's attached to).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Segment {
    pub stroke_count: usize,
    pub text: String,
    /// Set on a synthetic auto-suffix segment: the text converter should combine this segment
    /// with the previous word via the orthography joiner instead of treating it as a new,
    /// separately spaced word.
    pub joins_previous: bool,
}

impl Segment {
    fn dict(stroke_count: usize, text: &str) -> Segment {
        Segment {
            stroke_count,
            text: text.to_string(),
            joins_previous: false,
        }
    }

    fn suffix(text: &str) -> Segment {
        Segment {
            stroke_count: 0,
            text: text.to_string(),
            joins_previous: true,
        }
    }

    fn fingerspell(stroke: Stroke) -> Segment {
        Segment {
            stroke_count: 1,
            text: stroke.to_string(),
            joins_previous: false,
        }
    }
}

/// Result of feeding one stroke to the engine's running translation: either a new (or extended)
/// definition, replacing some number of previously emitted segments, or an undo.
#[derive(Debug)]
pub enum Action {
    /// A translation was produced (possibly fingerspelled). `replaces` previous segments are
    /// retracted and substituted with this one.
    Add { text: String, strokes: usize },
    /// The undo stroke was pressed.
    Undo,
}

/// Try stripping each registered auto-suffix bit from the final stroke of `window` and looking
/// the result up. On success, returns the base lookup text together with the suffix it implies.
fn try_auto_suffix<'a>(
    window: &[Stroke],
    dicts: &DictionaryStack,
    auto_suffixes: &'a [AutoSuffix],
) -> Option<(String, &'a AutoSuffix)> {
    let (last, rest) = window.split_last()?;
    for auto in auto_suffixes {
        if !last.has_any(auto.bit) {
            continue;
        }
        let stripped = last.mask(auto.bit);
        let mut candidate: Vec<Stroke> = rest.to_vec();
        candidate.push(stripped);
        if let Some(text) = dicts.lookup(&candidate) {
            return Some((text.to_string(), auto));
        }
    }
    None
}

/// Build the segment list for `strokes`, per the longest-match algorithm: at each position, try
/// window lengths from the dictionary stack's longest key down to 1, falling back to an
/// auto-suffix retry and finally to a one-stroke fingerspelling segment.
pub fn build_segments(
    strokes: &[Stroke],
    dicts: &DictionaryStack,
    auto_suffixes: &[AutoSuffix],
) -> Vec<Segment> {
    let max_len = dicts.longest_key().max(1);
    let end = strokes.len();
    let mut segments = Vec::new();
    let mut p = 0;

    while p < end {
        let l = (end - p).min(max_len);
        let mut matched = false;

        for len in (1..=l).rev() {
            if let Some(text) = dicts.lookup(&strokes[p..p + len]) {
                segments.push(Segment::dict(len, text));
                p += len;
                matched = true;
                break;
            }
        }

        if !matched {
            if let Some((text, auto)) = try_auto_suffix(&strokes[p..p + l], dicts, auto_suffixes) {
                segments.push(Segment::dict(l, &text));
                segments.push(Segment::suffix(auto.text));
                p += l;
                matched = true;
            }
        }

        if !matched {
            segments.push(Segment::fingerspell(strokes[p]));
            p += 1;
        }
    }

    segments
}

/// Recompute only the tail of the segment list that could change when a new stroke arrives.
/// Per spec: the earliest position reconsidered is `max(0, end - maxOutlineLength)`, not the
/// start of history, so re-translation cost stays bounded regardless of how long the outline
/// history has grown.
pub fn retranslate_tail(
    strokes: &[Stroke],
    dicts: &DictionaryStack,
    auto_suffixes: &[AutoSuffix],
) -> Vec<Segment> {
    let max_len = dicts.longest_key().max(1);
    let start = strokes.len().saturating_sub(max_len);
    build_segments(&strokes[start..], dicts, auto_suffixes)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::dict::MapDictBuilder;
    use alloc::boxed::Box;
    use steno_macros::stroke;

    fn sample_stack() -> DictionaryStack {
        let mut d = MapDictBuilder::new();
        d.insert(alloc::vec![stroke!("KAT")], "cat".to_string());
        d.insert(
            alloc::vec![stroke!("KAT"), stroke!("-G")],
            "catting".to_string(),
        );
        let mut stack = DictionaryStack::new();
        stack.push("main", true, Box::new(d.into_map_dict()));
        stack
    }

    #[test]
    fn longest_match_wins() {
        let stack = sample_stack();
        let strokes = [stroke!("KAT"), stroke!("-G")];
        let segments = build_segments(&strokes, &stack, &[]);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].stroke_count, 2);
        assert_eq!(segments[0].text, "catting");
    }

    #[test]
    fn fingerspell_fallback() {
        let stack = sample_stack();
        let strokes = [stroke!("TPH")];
        let segments = build_segments(&strokes, &stack, &[]);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].stroke_count, 1);
        assert_eq!(segments[0].text, stroke!("TPH").to_string());
    }

    #[test]
    fn auto_suffix_splits_into_two_segments() {
        let mut d = MapDictBuilder::new();
        d.insert(alloc::vec![stroke!("RUPB")], "run".to_string());
        let mut stack = DictionaryStack::new();
        stack.push("main", true, Box::new(d.into_map_dict()));

        let auto = [AutoSuffix {
            bit: stroke!("-G"),
            text: "ing",
        }];

        let strokes = [stroke!("RUPB") | stroke!("-G")];
        let segments = build_segments(&strokes, &stack, &auto);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].text, "run");
        assert_eq!(segments[0].stroke_count, 1);
        assert_eq!(segments[1].text, "ing");
        assert_eq!(segments[1].stroke_count, 0);
    }
}
