//! Tunable engine parameters.
//!
//! This is a small in-process struct, not a config-file format: parsing
//! configuration files or firmware packaging is out of scope here.

/// Parameters the `Engine` is constructed with.
#[derive(Clone, Copy, Debug)]
pub struct EngineConfig {
    /// Longest outline (in strokes) any dictionary entry may span.
    pub max_outline_length: usize,
    /// Number of strokes retained in the undo history.
    pub history_capacity: usize,
    /// Number of sets in the orthography cache.
    pub ortho_cache_sets: usize,
    /// Number of ways (entries per set) in the orthography cache.
    pub ortho_cache_ways: usize,
    /// Whether a space is placed after newly typed text by default.
    pub place_space_after: bool,
}

impl Default for EngineConfig {
    fn default() -> EngineConfig {
        EngineConfig {
            max_outline_length: 32,
            history_capacity: 64,
            ortho_cache_sets: 64,
            ortho_cache_ways: 4,
            place_space_after: true,
        }
    }
}
