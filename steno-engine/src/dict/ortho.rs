//! Orthographic stem+suffix combiner.
//!
//! `join(word, suffix)` decides how a stem and a suffix fuse together —
//! "happy" + "ness" → "happiness", "run" + "ing" → "running" — using an
//! ordered table of pattern/replacement rules ported from Plover's English
//! orthography rules, backed by an N-way set-associative cache keyed on
//! `crc32(word) ^ crc32(suffix)`.
//!
//! Patterns are compiled at build time via `safe_regex::regex!`, which
//! produces a distinct, unnameable type per invocation; each rule is
//! therefore wrapped in its own named function so the whole table can live
//! in one `&[Rule]`, tried in order exactly as the original engine does.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

use safe_regex::regex;

use crate::Stroke;

/// Longest stem tail considered when building the rule-matching probe string. Keeps the probe
/// short so quick-reject and matching stay cheap regardless of word length.
const MAXIMUM_PREFIX_LENGTH: usize = 8;

fn replace(caps: &[&[u8]], replacement: &str) -> String {
    let mut result = String::new();
    let mut dollar = false;
    for ch in replacement.chars() {
        if dollar {
            match ch {
                '1'..='9' => {
                    let idx = (ch as usize) - ('1' as usize);
                    if let Some(cap) = caps.get(idx) {
                        if let Ok(s) = core::str::from_utf8(cap) {
                            result.push_str(s);
                        }
                    }
                }
                '$' => result.push('$'),
                _ => {}
            }
            dollar = false;
        } else if ch == '$' {
            dollar = true;
        } else {
            result.push(ch);
        }
    }
    result
}

macro_rules! rule1 {
    ($name:ident, $pat:literal, $repl:expr) => {
        fn $name(text: &str) -> Option<String> {
            let re = regex!($pat);
            let (a,) = re.match_slices(text.as_bytes())?;
            Some(replace(&[a], $repl))
        }
    };
}

macro_rules! rule2 {
    ($name:ident, $pat:literal, $repl:expr) => {
        fn $name(text: &str) -> Option<String> {
            let re = regex!($pat);
            let (a, b) = re.match_slices(text.as_bytes())?;
            Some(replace(&[a, b], $repl))
        }
    };
}

macro_rules! rule3 {
    ($name:ident, $pat:literal, $repl:expr) => {
        fn $name(text: &str) -> Option<String> {
            let re = regex!($pat);
            let (a, b, c) = re.match_slices(text.as_bytes())?;
            Some(replace(&[a, b, c], $repl))
        }
    };
}

// +ly
rule1!(r_artistic_ly, br"(.*[aeiou]c) \^ ly", r"$1ally");
rule1!(r_humble_ly, br"(.+[aeioubmnp])le \^ ly", r"$1ly");

// +ry
rule2!(r_statute_ry, br"(.*t)e \^ (ry|ary)", r"$1ory");
rule2!(r_confirm_tory, br"(.+)m \^ tor(y|ily)", r"$1mator$2");
rule2!(r_supervise_ary, br"(.+)se \^ ar(y|ies)", r"$1sor$2");

// t +cy
rule1!(r_frequent_cy, br"(.*[naeiou])te? \^ cy", r"$1cy");

// +s
rule1!(r_sibilant_s, br"(.*(?:s|sh|x|z|zh)) \^ s", r"$1es");
rule1!(
    r_soft_ch_s,
    br"(.*(?:oa|ea|i|ee|oo|au|ou|l|n|[^gin]ar|t)ch) \^ s",
    r"$1es"
);
rule1!(r_consonant_y_s, br"(.+[bcdfghjklmnpqrstvwxz])y \^ s", r"$1ies");

// y
rule1!(r_die_ing, br"(.+)ie \^ ing", r"$1ying");
rule1!(r_metallurgy_ist, br"(.+[cdfghlmnpr])y \^ ist", r"$1ist");
rule2!(
    r_beauty_ful,
    br"(.+[bcdfghjklmnpqrstvwxz])y \^ ([a-hj-xz].*)",
    r"$1i$2"
);

// +en
rule1!(r_write_en, br"(.+)te \^ en", r"$1tten");
rule2!(r_minnesota_en, br"(.+[ae]) \^ e(n|ns)", r"$1$2");

// +ial
rule2!(r_ceremony_ial, br"(.+)y \^ (ial|ially)", r"$1$2");

// +if
rule2!(
    r_spaghetti_if,
    br"(.+)i \^ if(y|ying|ied|ies|ication|ications)",
    r"$1if$2"
);

// +ical
rule2!(r_fantastic_ical, br"(.+)ic \^ (ical|ically)", r"$1$2");
rule2!(r_epistemology_ical, br"(.+)ology \^ ic(al|ally)", r"$1ologic$2");
rule2!(r_oratory_ical, br"(.*)ry \^ ica(l|lly|lity)", r"$1rica$2");

// +ist
rule2!(r_radical_ist, br"(.*[l]) \^ is(t|ts)", r"$1is$2");

// +ity
rule1!(r_complementary_ity, br"(.*)ry \^ ity", r"$1rity");
rule1!(r_disproportional_ity, br"(.*)l \^ ity", r"$1lity");

// +ive, +tive
rule2!(r_perform_tive, br"(.+)rm \^ tiv(e|ity|ities)", r"$1rmativ$2");
rule2!(r_restore_tive, br"(.+)e \^ tiv(e|ity|ities)", r"$1ativ$2");

// +ize/+ise
rule2!(
    r_token_ize,
    br"(.+)y \^ iz(e|es|ing|ed|er|ers|ation|ations|able|ability)",
    r"$1iz$2"
);
rule2!(
    r_token_ise,
    br"(.+)y \^ is(e|es|ing|ed|er|ers|ation|ations|able|ability)",
    r"$1is$2"
);
rule2!(
    r_conditional_ize,
    br"(.+)al \^ iz(e|ed|es|ing|er|ers|ation|ations|m|ms|able|ability|abilities)",
    r"$1aliz$2"
);
rule2!(
    r_conditional_ise,
    br"(.+)al \^ is(e|ed|es|ing|er|ers|ation|ations|m|ms|able|ability|abilities)",
    r"$1alis$2"
);
rule2!(
    r_spectacular_ize,
    br"(.+)ar \^ iz(e|ed|es|ing|er|ers|ation|ations|m|ms)",
    r"$1ariz$2"
);
rule2!(
    r_spectacular_ise,
    br"(.+)ar \^ is(e|ed|es|ing|er|ers|ation|ations|m|ms)",
    r"$1aris$2"
);
rule2!(
    r_category_ize,
    br"(.*[lmnty]) \^ iz(e|es|ing|ed|er|ers|ation|ations|m|ms|able|ability|abilities)",
    r"$1iz$2"
);
rule2!(
    r_category_ise,
    br"(.*[lmnty]) \^ is(e|es|ing|ed|er|ers|ation|ations|m|ms|able|ability|abilities)",
    r"$1is$2"
);

// +olog
rule2!(
    r_criminal_olog,
    br"(.+)al \^ olog(y|ist|ists|ical|ically)",
    r"$1olog$2"
);

// +ish
rule2!(r_similar_ish, br"(.+)(ar|er|or) \^ ish", r"$1$2ish");

// silent e
rule2!(r_free_ed, br"(.+e)e \^ (e.+)", r"$1$2");
rule2!(
    r_narrate_ing,
    br"(.+[bcdfghjklmnpqrstuvwxz])e \^ ([aeiouy].*)",
    r"$1$2"
);

// consonant doubling
rule3!(
    r_defer_ed,
    br"(.*(?:[bcdfghjklmnprstvwxyz]|qu)[aeiou])([bcdfgklmnprtvz]) \^ ([aeiouy].*)",
    r"$1$2$2$3"
);

/// One orthography rule: its source pattern (kept for the quick-reject character check) and the
/// compiled matcher/replacer.
struct Rule {
    pattern: &'static str,
    apply: fn(&str) -> Option<String>,
}

macro_rules! r {
    ($f:ident, $pat:literal) => {
        Rule {
            pattern: unsafe { core::str::from_utf8_unchecked($pat) },
            apply: $f,
        }
    };
}

static RULES: &[Rule] = &[
    r!(r_artistic_ly, br"(.*[aeiou]c) \^ ly"),
    r!(r_humble_ly, br"(.+[aeioubmnp])le \^ ly"),
    r!(r_statute_ry, br"(.*t)e \^ (ry|ary)"),
    r!(r_confirm_tory, br"(.+)m \^ tor(y|ily)"),
    r!(r_supervise_ary, br"(.+)se \^ ar(y|ies)"),
    r!(r_frequent_cy, br"(.*[naeiou])te? \^ cy"),
    r!(r_sibilant_s, br"(.*(?:s|sh|x|z|zh)) \^ s"),
    r!(
        r_soft_ch_s,
        br"(.*(?:oa|ea|i|ee|oo|au|ou|l|n|[^gin]ar|t)ch) \^ s"
    ),
    r!(r_consonant_y_s, br"(.+[bcdfghjklmnpqrstvwxz])y \^ s"),
    r!(r_die_ing, br"(.+)ie \^ ing"),
    r!(r_metallurgy_ist, br"(.+[cdfghlmnpr])y \^ ist"),
    r!(
        r_beauty_ful,
        br"(.+[bcdfghjklmnpqrstvwxz])y \^ ([a-hj-xz].*)"
    ),
    r!(r_write_en, br"(.+)te \^ en"),
    r!(r_minnesota_en, br"(.+[ae]) \^ e(n|ns)"),
    r!(r_ceremony_ial, br"(.+)y \^ (ial|ially)"),
    r!(r_spaghetti_if, br"(.+)i \^ if(y|ying|ied|ies|ication|ications)"),
    r!(r_fantastic_ical, br"(.+)ic \^ (ical|ically)"),
    r!(r_epistemology_ical, br"(.+)ology \^ ic(al|ally)"),
    r!(r_oratory_ical, br"(.*)ry \^ ica(l|lly|lity)"),
    r!(r_radical_ist, br"(.*[l]) \^ is(t|ts)"),
    r!(r_complementary_ity, br"(.*)ry \^ ity"),
    r!(r_disproportional_ity, br"(.*)l \^ ity"),
    r!(r_perform_tive, br"(.+)rm \^ tiv(e|ity|ities)"),
    r!(r_restore_tive, br"(.+)e \^ tiv(e|ity|ities)"),
    r!(
        r_token_ize,
        br"(.+)y \^ iz(e|es|ing|ed|er|ers|ation|ations|able|ability)"
    ),
    r!(
        r_token_ise,
        br"(.+)y \^ is(e|es|ing|ed|er|ers|ation|ations|able|ability)"
    ),
    r!(
        r_conditional_ize,
        br"(.+)al \^ iz(e|ed|es|ing|er|ers|ation|ations|m|ms|able|ability|abilities)"
    ),
    r!(
        r_conditional_ise,
        br"(.+)al \^ is(e|ed|es|ing|er|ers|ation|ations|m|ms|able|ability|abilities)"
    ),
    r!(
        r_spectacular_ize,
        br"(.+)ar \^ iz(e|ed|es|ing|er|ers|ation|ations|m|ms)"
    ),
    r!(
        r_spectacular_ise,
        br"(.+)ar \^ is(e|ed|es|ing|er|ers|ation|ations|m|ms)"
    ),
    r!(
        r_category_ize,
        br"(.*[lmnty]) \^ iz(e|es|ing|ed|er|ers|ation|ations|m|ms|able|ability|abilities)"
    ),
    r!(
        r_category_ise,
        br"(.*[lmnty]) \^ is(e|es|ing|ed|er|ers|ation|ations|m|ms|able|ability|abilities)"
    ),
    r!(r_criminal_olog, br"(.+)al \^ olog(y|ist|ists|ical|ically)"),
    r!(r_similar_ish, br"(.+)(ar|er|or) \^ ish"),
    r!(r_free_ed, br"(.+e)e \^ (e.+)"),
    r!(
        r_narrate_ing,
        br"(.+[bcdfghjklmnpqrstuvwxz])e \^ ([aeiouy].*)"
    ),
    r!(
        r_defer_ed,
        br"(.*(?:[bcdfghjklmnprstvwxyz]|qu)[aeiou])([bcdfgklmnprtvz]) \^ ([aeiouy].*)"
    ),
];

/// Literal letters required outside of `[...]` character classes and `(...)` groups in a rule's
/// source pattern — a candidate text missing any of them cannot possibly match, so the full
/// matcher never needs to run. A coarse stand-in for `PatternQuickReject`'s precomputed bitmask,
/// since `safe_regex`'s compiled matcher doesn't expose its AST for a tighter derivation.
fn required_letters(pattern: &str) -> u32 {
    let mut mask = 0u32;
    let mut paren_depth = 0i32;
    let mut in_class = false;
    let mut escaped = false;
    for c in pattern.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '[' => in_class = true,
            ']' => in_class = false,
            '(' if !in_class => paren_depth += 1,
            ')' if !in_class => paren_depth -= 1,
            c if !in_class && paren_depth == 0 && c.is_ascii_lowercase() => {
                mask |= 1 << (c as u32 - 'a' as u32);
            }
            _ => {}
        }
    }
    mask
}

fn letter_mask(text: &str) -> u32 {
    let mut mask = 0u32;
    for c in text.chars() {
        if c.is_ascii_lowercase() {
            mask |= 1 << (c as u32 - 'a' as u32);
        }
    }
    mask
}

fn quick_reject(rule: &Rule, probe_mask: u32) -> bool {
    let required = required_letters(rule.pattern);
    (required & probe_mask) != required
}

/// Something that can rank a candidate joined word, standing in for the word-list lookup the
/// original engine consults (`WordList::GetWordRank`). No actual English lexicon ships with
/// this crate (that is a data asset, not engine logic); `NoWordList` accepts every candidate at
/// a uniform rank so the first matching rule wins, and a real word list can be plugged in by
/// implementing this trait.
pub trait WordRank {
    /// Lower is better. `None` means the candidate isn't a real word and must not win.
    fn rank(&self, word: &str) -> Option<i32>;
}

pub struct NoWordList;

impl WordRank for NoWordList {
    fn rank(&self, _word: &str) -> Option<i32> {
        Some(0)
    }
}

/// A suffix alias: an orthography-table entry substituting one suffix spelling for another
/// before rule matching (e.g. an entry's own table of `{-able}` vs `{-ible}` spellings).
pub type Alias<'a> = (&'a str, &'a str);

fn char_floor_boundary(s: &str, byte_idx: usize) -> usize {
    let mut idx = byte_idx;
    while idx < s.len() && !s.is_char_boundary(idx) {
        idx += 1;
    }
    idx
}

/// Combine `word` and `suffix` without consulting the cache. Exposed for the cache to call on
/// a miss, and directly usable when no cache is wanted (e.g. a one-off console lookup).
pub fn join_uncached(word: &str, suffix: &str, aliases: &[Alias], words: &dyn WordRank) -> String {
    let mut candidates: Vec<(i32, String)> = Vec::new();

    for (alias_suffix, alias_text) in aliases.iter() {
        if *alias_suffix == suffix {
            let candidate = join_uncached(word, alias_text, aliases, words);
            if let Some(rank) = words.rank(&candidate) {
                candidates.push((rank, candidate));
            }
        }
    }

    let tail_start_byte = word.len().saturating_sub(MAXIMUM_PREFIX_LENGTH);
    let tail_start = char_floor_boundary(word, tail_start_byte);
    let tail = &word[tail_start..];
    let prefix = &word[..tail_start];

    let probe = alloc::format!("{} ^ {}", tail, suffix);
    let probe_mask = letter_mask(&probe);
    for rule in RULES {
        if quick_reject(rule, probe_mask) {
            continue;
        }
        if let Some(replacement) = (rule.apply)(&probe) {
            let full = alloc::format!("{}{}", prefix, replacement);
            if let Some(rank) = words.rank(&full) {
                candidates.push((rank, full));
            }
        }
    }

    // Plain concatenation is only a fallback: it's ranked one worse than its raw word-list rank
    // so that any rule-derived candidate tying at the same rank (as every candidate does under
    // `NoWordList`, which ranks everything 0) wins instead.
    let concat = alloc::format!("{}{}", word, suffix);
    if let Some(rank) = words.rank(&concat) {
        candidates.push((rank.saturating_add(1), concat.clone()));
    }

    if !candidates.is_empty() {
        candidates.sort_by_key(|(rank, _)| *rank);
        return candidates.into_iter().next().unwrap().1;
    }

    let full_probe = alloc::format!("{} ^ {}", word, suffix);
    for rule in RULES {
        if let Some(replacement) = (rule.apply)(&full_probe) {
            return replacement;
        }
    }

    concat
}

/// Cache key: `crc32(word) ^ crc32(suffix)`.
pub fn cache_index(word: &str, suffix: &str) -> u32 {
    let crc = crc::Crc::<u32>::new(&crc::CRC_32_ISO_HDLC);
    let mut digest = crc.digest();
    digest.update(word.as_bytes());
    let word_crc = digest.finalize();

    let mut digest = crc.digest();
    digest.update(suffix.as_bytes());
    let suffix_crc = digest.finalize();

    word_crc ^ suffix_crc
}

struct CacheEntry {
    word: String,
    suffix: String,
    result: String,
}

/// The mutex type backing `OrthoCache`'s slot array: `std::sync::Mutex` when linked against the
/// standard library, a spinlock when built `no_std` (no thread blocking primitive to wait on).
#[cfg(feature = "std")]
type Lock<T> = std::sync::Mutex<T>;
#[cfg(not(feature = "std"))]
type Lock<T> = spin::Mutex<T>;

#[cfg(feature = "std")]
type LockGuard<'a, T> = std::sync::MutexGuard<'a, T>;
#[cfg(not(feature = "std"))]
type LockGuard<'a, T> = spin::MutexGuard<'a, T>;

fn new_lock<T>(value: T) -> Lock<T> {
    #[cfg(feature = "std")]
    {
        std::sync::Mutex::new(value)
    }
    #[cfg(not(feature = "std"))]
    {
        spin::Mutex::new(value)
    }
}

fn lock<T>(m: &Lock<T>) -> LockGuard<'_, T> {
    #[cfg(feature = "std")]
    {
        m.lock().unwrap()
    }
    #[cfg(not(feature = "std"))]
    {
        m.lock()
    }
}

/// N-way set-associative cache of `join` results, keyed by `crc32(word) ^ crc32(suffix)`.
/// Eviction within a set is round-robin. The slot array sits behind a single mutex; the
/// critical section covers only the array access — the evicted entry's string data is
/// dropped after the lock is released, so no reader can be holding a reference to memory being
/// freed.
pub struct OrthoCache {
    sets: usize,
    ways: usize,
    slots: Lock<Vec<Option<CacheEntry>>>,
    next: Lock<Vec<usize>>,
}

impl OrthoCache {
    pub fn new(sets: usize, ways: usize) -> OrthoCache {
        let mut slots = Vec::with_capacity(sets * ways);
        for _ in 0..(sets * ways) {
            slots.push(None);
        }
        OrthoCache {
            sets,
            ways,
            slots: new_lock(slots),
            next: new_lock(alloc::vec![0; sets]),
        }
    }

    fn set_for(&self, word: &str, suffix: &str) -> usize {
        (cache_index(word, suffix) as usize) % self.sets
    }

    fn lookup(&self, word: &str, suffix: &str) -> Option<String> {
        let set = self.set_for(word, suffix);
        let guard = lock(&self.slots);
        for way in 0..self.ways {
            if let Some(entry) = &guard[set * self.ways + way] {
                if entry.word == word && entry.suffix == suffix {
                    return Some(entry.result.clone());
                }
            }
        }
        None
    }

    fn insert(&self, word: &str, suffix: &str, result: &str) {
        let set = self.set_for(word, suffix);

        let evicted = {
            let mut next = lock(&self.next);
            let way = next[set];
            next[set] = (way + 1) % self.ways;

            let mut guard = lock(&self.slots);
            let slot = &mut guard[set * self.ways + way];
            let evicted = slot.take();
            *slot = Some(CacheEntry {
                word: word.into(),
                suffix: suffix.into(),
                result: result.into(),
            });
            evicted
        };
        // Evicted entry's strings are freed here, with no lock held.
        drop(evicted);
    }

    /// `join`, transparently cached: returns a byte-identical result whether or not the cache
    /// was warm.
    pub fn join(&self, word: &str, suffix: &str, aliases: &[Alias], words: &dyn WordRank) -> String {
        if let Some(hit) = self.lookup(word, suffix) {
            crate::log::trace!("ortho cache hit: {} ^ {}", word, suffix);
            return hit;
        }
        let result = join_uncached(word, suffix, aliases, words);
        self.insert(word, suffix, &result);
        result
    }
}

/// An auto-suffix: a stroke bit whose presence on the final stroke of an outline implies a
/// suffix should be appended, per spec.md 4.E's "Auto-suffix" step.
#[derive(Clone, Copy, Debug)]
pub struct AutoSuffix {
    pub bit: Stroke,
    pub text: &'static str,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn running() {
        let aliases: &[Alias] = &[];
        let result = join_uncached("run", "ing", aliases, &NoWordList);
        assert_eq!(result, "running");
    }

    #[test]
    fn happy_ness_plain_concat() {
        let aliases: &[Alias] = &[];
        let result = join_uncached("happy", "ness", aliases, &NoWordList);
        // No rule in the table covers a bare "y"+"ness" join; falls back to plain concatenation.
        assert_eq!(result, "happyness");
    }

    #[test]
    fn artistic_ally() {
        let aliases: &[Alias] = &[];
        let result = join_uncached("artistic", "ly", aliases, &NoWordList);
        assert_eq!(result, "artistically");
    }

    #[test]
    fn cache_is_transparent() {
        let cache = OrthoCache::new(4, 2);
        let aliases: &[Alias] = &[];
        let uncached = join_uncached("run", "ing", aliases, &NoWordList);
        let cached_first = cache.join("run", "ing", aliases, &NoWordList);
        let cached_second = cache.join("run", "ing", aliases, &NoWordList);
        assert_eq!(uncached, cached_first);
        assert_eq!(cached_first, cached_second);
    }

    #[test]
    fn cache_round_robin_eviction() {
        let cache = OrthoCache::new(1, 2);
        let aliases: &[Alias] = &[];
        cache.join("a", "ing", aliases, &NoWordList);
        cache.join("b", "ing", aliases, &NoWordList);
        cache.join("c", "ing", aliases, &NoWordList);
        // "a" should have been evicted (round-robin, 2 ways), "b" and "c" remain.
        assert!(cache.lookup("b", "ing").is_some());
        assert!(cache.lookup("c", "ing").is_some());
    }
}
