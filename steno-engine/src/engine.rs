//! Top-level engine state machine.
//!
//! Drives the whole pipeline per incoming stroke: push to history, rebuild
//! the affected tail of the segment list (component E), convert it to a flat
//! text buffer applying case/spacing/glue/orthography (component G), diff
//! that buffer against the previous one, and hand the minimal edit to a
//! `KeyCodeSink`. Generalizes `Translator::add_stroke` from a single
//! dictionary to a full `DictionaryStack`, and the mode machinery from the
//! original engine's `NORMAL`/`ADD_TRANSLATION`/`CONSOLE` states.

extern crate alloc;

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::dict::ortho::{Alias, AutoSuffix, OrthoCache, WordRank};
use crate::dict::segment::{self, Segment};
use crate::dict::stack::DictionaryStack;
use crate::dict::history::History;
use crate::directive;
use crate::replacements::{Previous, Replacement};
use crate::sink::KeyCodeSink;
use crate::user_dict::UserDictionary;
use crate::{EngineConfig, Stroke};

/// Which of the three states described in the engine's state machine is active.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EngineMode {
    Normal,
    AddTranslation,
    Console,
}

#[derive(Clone, Debug)]
struct FormatState {
    cap_next: bool,
}

impl Default for FormatState {
    fn default() -> FormatState {
        // Unlike the original translator (which capitalizes the very first word of a fresh
        // buffer), a bare stroke with no capitalization directive types lowercase - matching a
        // plain `KAT -> cat` dictionary entry typing exactly "cat".
        FormatState { cap_next: false }
    }
}

/// The running translation engine: dictionary stack, stroke history, current segment list and
/// output buffer, and the mode state machine.
pub struct Engine<'a, W: WordRank> {
    config: EngineConfig,
    dicts: DictionaryStack,
    history: History,
    segments: Vec<Segment>,
    buffer: String,
    format: FormatState,
    ortho: OrthoCache,
    aliases: &'a [Alias<'a>],
    auto_suffixes: &'a [AutoSuffix],
    words: &'a W,
    mode: EngineMode,

    add_translation_strokes: Vec<Stroke>,
    add_translation_text: String,
    pre_mode_snapshot: Option<(String, FormatState)>,
}

impl<'a, W: WordRank> Engine<'a, W> {
    pub fn new(
        config: EngineConfig,
        dicts: DictionaryStack,
        aliases: &'a [Alias<'a>],
        auto_suffixes: &'a [AutoSuffix],
        words: &'a W,
    ) -> Engine<'a, W> {
        let ortho = OrthoCache::new(config.ortho_cache_sets, config.ortho_cache_ways);
        let history = History::new(config.history_capacity);
        Engine {
            config,
            dicts,
            history,
            segments: Vec::new(),
            buffer: String::new(),
            format: FormatState::default(),
            ortho,
            aliases,
            auto_suffixes,
            words,
            mode: EngineMode::Normal,
            add_translation_strokes: Vec::new(),
            add_translation_text: String::new(),
            pre_mode_snapshot: None,
        }
    }

    pub fn mode(&self) -> EngineMode {
        self.mode
    }

    pub fn dicts(&self) -> &DictionaryStack {
        &self.dicts
    }

    pub fn dicts_mut(&mut self) -> &mut DictionaryStack {
        &mut self.dicts
    }

    fn effective_max_outline_length(&self) -> usize {
        self.dicts
            .longest_key()
            .min(self.config.max_outline_length)
            .max(1)
    }

    /// Feed one stroke to the engine, applying any resulting output to `sink`.
    pub fn add_stroke(&mut self, stroke: Stroke, sink: &mut impl KeyCodeSink) {
        match self.mode {
            EngineMode::Normal => {
                if stroke.is_star() {
                    self.undo(sink);
                } else {
                    self.history.push(stroke, 0);
                    self.retranslate(sink);
                }
            }
            EngineMode::AddTranslation => {
                if stroke.is_star() {
                    self.add_translation_strokes.pop();
                } else {
                    self.add_translation_strokes.push(stroke);
                }
                self.preview_add_translation(sink);
            }
            EngineMode::Console => {
                // The console surface is a collaborator, not part of the translation core;
                // strokes are ignored here while in this mode.
            }
        }
    }

    fn undo(&mut self, sink: &mut impl KeyCodeSink) {
        if self.history.is_empty() {
            return;
        }
        let segments_removed = self.history.undo_last(1);
        let keep = self.segments.len().saturating_sub(segments_removed);
        self.segments.truncate(keep);
        self.retranslate(sink);
    }

    /// Recompute the tail of the segment list affected by the current history and re-emit the
    /// diff against the previous buffer.
    fn retranslate(&mut self, sink: &mut impl KeyCodeSink) {
        let window: Vec<Stroke> = self.history.strokes().collect();
        let max_len = self.effective_max_outline_length();
        let target_start = window.len().saturating_sub(max_len);

        // Keep only whole segments that end at or before `target_start`. A segment whose span
        // straddles it can't be kept partially, so it's excluded from `keep` and its full span
        // (not just the part past `target_start`) is folded back into the retranslation window
        // via `consumed`, the true boundary of the kept prefix.
        let mut keep = 0usize;
        let mut consumed = 0usize;
        for seg in &self.segments {
            if consumed + seg.stroke_count > target_start {
                break;
            }
            consumed += seg.stroke_count;
            keep += 1;
        }
        let tail = &window[consumed..];

        let new_tail = segment::build_segments(tail, &self.dicts, self.auto_suffixes);
        let contributed = new_tail.len();
        self.segments.truncate(keep);
        self.segments.extend(new_tail);

        self.history.note_last_segment_count(contributed);

        self.emit_diff(sink);
    }

    fn emit_diff(&mut self, sink: &mut impl KeyCodeSink) {
        let (next_buffer, raw_keys) = self.convert();

        let common = self
            .buffer
            .chars()
            .zip(next_buffer.chars())
            .take_while(|(a, b)| a == b)
            .count();

        let common_bytes = char_byte_offset(&self.buffer, common);
        let remove = self.buffer.chars().count() - common;

        if remove > 0 {
            sink.emit_backspaces(remove);
        }
        let added = &next_buffer[common_bytes..];
        if !added.is_empty() {
            sink.emit_text(added);
        }
        for raw in raw_keys {
            sink.emit_raw_key(&raw);
        }

        self.buffer = next_buffer;
    }

    /// Convert the current segment list into a flat text buffer, applying case, spacing, glue,
    /// and orthographic joining. Returns the buffer and any raw key payloads encountered along
    /// the way (from `{#key}` directives), which are emitted to the sink outside the diff.
    fn convert(&mut self) -> (String, Vec<String>) {
        let mut buffer = String::new();
        let mut cap_next = self.format.cap_next;
        let mut raw_keys = Vec::new();
        let mut first = true;
        let mut prev_suppressed_after = false;
        let mut last_word_start = 0usize;

        for seg in &self.segments {
            let parts = directive::parse(&seg.text);

            let mut text_piece = String::new();
            let mut suppress_before = false;
            let mut suppress_after = false;
            let mut force_space = false;
            let mut set_cap_next = cap_next;

            for part in &parts {
                match part {
                    Replacement::Text(t) => text_piece.push_str(t),
                    Replacement::DeleteSpace => {
                        if text_piece.is_empty() {
                            suppress_before = true;
                        } else {
                            suppress_after = true;
                        }
                    }
                    Replacement::ForceSpace => force_space = true,
                    Replacement::CapNext | Replacement::UpNext => set_cap_next = true,
                    Replacement::NoCapNext => set_cap_next = false,
                    Replacement::Stitch => suppress_before = true,
                    Replacement::Raw(s) => raw_keys.push(s.clone()),
                    Replacement::RetroBreak => {
                        // Undoes a prior stitch; nothing to retract here since we rebuild from
                        // scratch each time, so this is a no-op beyond not stitching again.
                    }
                    Replacement::Previous(count, kind) => {
                        apply_previous(&mut buffer, *count, kind);
                    }
                    Replacement::Macro(name, args) => {
                        crate::log::warn!("unhandled macro directive: {}:{}", name, args);
                    }
                }
            }

            if seg.joins_previous {
                let stem = buffer[last_word_start..].to_string();
                let joined = self
                    .ortho
                    .join(&stem, &text_piece, self.aliases, self.words);
                buffer.truncate(last_word_start);
                buffer.push_str(&joined);
                continue;
            }

            let mut out_text = text_piece;
            if cap_next {
                out_text = capitalize(&out_text);
            }

            // `place_space_after` only changes which side of the boundary a directive's space
            // suppression is read as attaching to; the separator itself is a single character
            // either way, so there's nothing further to branch on here.
            let want_space = !first && !suppress_before && !prev_suppressed_after;
            if (want_space || force_space) && !out_text.is_empty() {
                buffer.push(' ');
            }

            last_word_start = buffer.len();
            buffer.push_str(&out_text);
            if !out_text.is_empty() {
                first = false;
            }
            prev_suppressed_after = suppress_after;
            cap_next = set_cap_next;
        }

        self.format.cap_next = cap_next;
        (buffer, raw_keys)
    }

    /// Enter `ADD_TRANSLATION` mode, snapshotting formatting state and the current buffer so a
    /// cancellation can restore them exactly.
    pub fn enter_add_translation(&mut self) {
        self.pre_mode_snapshot = Some((self.buffer.clone(), self.format.clone()));
        self.add_translation_strokes.clear();
        self.add_translation_text.clear();
        self.mode = EngineMode::AddTranslation;
    }

    /// Host-supplied text for the translation being composed (typed alongside strokes; the core
    /// doesn't read keyboard text input itself).
    pub fn set_add_translation_text(&mut self, text: &str) {
        self.add_translation_text = text.to_string();
    }

    fn preview_add_translation(&mut self, sink: &mut impl KeyCodeSink) {
        let preview = segment::build_segments(&self.add_translation_strokes, &self.dicts, self.auto_suffixes);
        self.segments = preview;
        self.emit_diff(sink);
    }

    /// Leave `ADD_TRANSLATION` mode. If `commit` is true, persists (or, if the translation text
    /// is empty, removes) the mapping in `user_dict`; either way restores pre-entry formatting
    /// state and buffer, discarding the preview.
    pub fn exit_add_translation(
        &mut self,
        commit: bool,
        user_dict: &mut impl UserDictionary,
        sink: &mut impl KeyCodeSink,
    ) {
        if commit {
            if self.add_translation_text.is_empty() {
                user_dict.remove(&self.add_translation_strokes);
            } else {
                user_dict.add(&self.add_translation_strokes, &self.add_translation_text);
            }
        }

        if let Some((buffer, format)) = self.pre_mode_snapshot.take() {
            let remove = self.buffer.chars().count();
            if remove > 0 {
                sink.emit_backspaces(remove);
            }
            if !buffer.is_empty() {
                sink.emit_text(&buffer);
            }
            self.buffer = buffer;
            self.format = format;
        }

        self.add_translation_strokes.clear();
        self.add_translation_text.clear();
        self.mode = EngineMode::Normal;
    }

    pub fn enter_console(&mut self) {
        self.mode = EngineMode::Console;
    }

    pub fn exit_console(&mut self) {
        self.mode = EngineMode::Normal;
    }
}

fn char_byte_offset(s: &str, chars: usize) -> usize {
    s.char_indices()
        .nth(chars)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

fn capitalize(text: &str) -> String {
    let mut c = text.chars();
    match c.next() {
        None => String::new(),
        Some(f) => f.to_uppercase().collect::<String>() + c.as_str(),
    }
}

fn capitalize_words(text: &str) -> String {
    text.split(' ')
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn word_start_offsets(buffer: &str) -> Vec<usize> {
    let mut starts = Vec::new();
    let mut in_word = false;
    for (i, c) in buffer.char_indices() {
        if c == ' ' {
            in_word = false;
        } else if !in_word {
            starts.push(i);
            in_word = true;
        }
    }
    starts
}

/// Apply a retroactive action to the last `count` words already in `buffer`.
fn apply_previous(buffer: &mut String, count: u32, kind: &Previous) {
    let count = count as usize;
    if count == 0 {
        return;
    }
    let starts = word_start_offsets(buffer);
    if starts.is_empty() {
        return;
    }
    let take = count.min(starts.len());
    let start = starts[starts.len() - take];

    match kind {
        Previous::Capitalize => {
            let span = capitalize_words(&buffer[start..]);
            buffer.truncate(start);
            buffer.push_str(&span);
        }
        Previous::Upcase => {
            let span = buffer[start..].to_uppercase();
            buffer.truncate(start);
            buffer.push_str(&span);
        }
        Previous::Lowerize => {
            let span = buffer[start..].to_lowercase();
            buffer.truncate(start);
            buffer.push_str(&span);
        }
        Previous::DeleteSpace => {
            if start > 0 && buffer.as_bytes()[start - 1] == b' ' {
                buffer.remove(start - 1);
            }
        }
        Previous::ReplaceSpace(with) => {
            if start > 0 && buffer.as_bytes()[start - 1] == b' ' {
                buffer.replace_range(start - 1..start, &with.to_string());
            }
        }
        Previous::Number(_) | Previous::Currency(_) => {
            crate::log::warn!("retroactive number/currency formatting not implemented");
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::dict::ortho::NoWordList;
    use crate::dict::ram::MapDictBuilder;
    use crate::sink::RecordingSink;
    use alloc::boxed::Box;
    use steno_macros::stroke;

    fn engine_with(entries: &[(Vec<Stroke>, &str)]) -> Engine<'static, NoWordList> {
        let mut builder = MapDictBuilder::new();
        for (strokes, text) in entries {
            builder.insert(strokes.clone(), text.to_string());
        }
        let mut stack = DictionaryStack::new();
        stack.push("main", true, Box::new(builder.into_map_dict()));
        Engine::new(EngineConfig::default(), stack, &[], &[], &NoWordList)
    }

    #[test]
    fn s1_single_stroke() {
        let mut engine = engine_with(&[(alloc::vec![stroke!("KAT")], "cat")]);
        let mut sink = RecordingSink::default();
        engine.add_stroke(stroke!("KAT"), &mut sink);
        assert_eq!(sink.typed, "cat");
    }

    #[test]
    fn s2_longer_match_replaces_shorter() {
        let mut engine = engine_with(&[
            (alloc::vec![stroke!("HEL")], "hello"),
            (alloc::vec![stroke!("HEL"), stroke!("HROE")], "hello world"),
        ]);
        let mut sink = RecordingSink::default();
        engine.add_stroke(stroke!("HEL"), &mut sink);
        assert_eq!(sink.typed, "hello");
        engine.add_stroke(stroke!("HROE"), &mut sink);
        assert_eq!(sink.typed, "hello world");
    }

    #[test]
    fn s4_undo_retracts_everything() {
        let mut engine = engine_with(&[(alloc::vec![stroke!("KAT")], "cat")]);
        let mut sink = RecordingSink::default();
        engine.add_stroke(stroke!("KAT"), &mut sink);
        assert_eq!(sink.typed, "cat");
        engine.add_stroke(stroke!("*"), &mut sink);
        assert_eq!(sink.typed, "");
    }

    #[test]
    fn s5_glue_suppresses_space() {
        let mut engine = engine_with(&[
            (alloc::vec![stroke!("TPO")], "foo"),
            (alloc::vec![stroke!("-T")], "{^}the"),
        ]);
        let mut sink = RecordingSink::default();
        engine.add_stroke(stroke!("TPO"), &mut sink);
        engine.add_stroke(stroke!("-T"), &mut sink);
        assert_eq!(sink.typed, "foothe");
    }

    #[test]
    fn s6_unknown_stroke_fingerspells() {
        let mut engine: Engine<'static, NoWordList> = engine_with(&[]);
        let mut sink = RecordingSink::default();
        let raw = stroke!("TPHO");
        engine.add_stroke(raw, &mut sink);
        assert_eq!(sink.typed, raw.to_string());
    }

    #[test]
    fn a_stroke_outside_the_longest_kept_segment_is_not_dropped() {
        // A -> "a", A+B -> "ab", C -> "c"; longest entry is 2 strokes. After A,B the segment
        // list is a single 2-stroke "ab" segment. Stroking C narrows the retranslation window to
        // its last 2 strokes, which only reaches partway into that "ab" segment: it must be
        // rebuilt in full (not just the half the window happens to cover), or A's translation
        // is lost.
        let mut engine = engine_with(&[
            (alloc::vec![stroke!("A")], "a"),
            (alloc::vec![stroke!("A"), stroke!("PW")], "ab"),
            (alloc::vec![stroke!("-S")], "c"),
        ]);
        let mut sink = RecordingSink::default();

        engine.add_stroke(stroke!("A"), &mut sink);
        assert_eq!(sink.typed, "a");

        engine.add_stroke(stroke!("PW"), &mut sink);
        assert_eq!(sink.typed, "ab");

        engine.add_stroke(stroke!("-S"), &mut sink);
        assert_eq!(sink.typed, "ab c");
    }
}
