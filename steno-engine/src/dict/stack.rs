//! Dictionary stack.
//!
//! An ordered list of dictionaries, front entry highest priority. Lookups
//! scan front-to-back and return the first non-empty result, so a user
//! dictionary placed ahead of the main dictionary can shadow individual
//! entries.

extern crate alloc;

use alloc::boxed::Box;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::Stroke;

use super::Dict;

struct Entry {
    name: String,
    enabled: bool,
    dict: Box<dyn Dict>,
}

/// Priority-ordered, independently enable/disable-able set of dictionaries.
pub struct DictionaryStack {
    entries: Vec<Entry>,
    longest_key: usize,
}

impl DictionaryStack {
    pub fn new() -> DictionaryStack {
        DictionaryStack {
            entries: Vec::new(),
            longest_key: 0,
        }
    }

    /// Add a dictionary at the back (lowest priority so far).
    pub fn push(&mut self, name: impl Into<String>, enabled: bool, dict: Box<dyn Dict>) {
        self.longest_key = self.longest_key.max(dict.longest_key());
        self.entries.push(Entry {
            name: name.into(),
            enabled,
            dict,
        });
    }

    /// Toggle a dictionary by name. Returns whether a dictionary with that name was found.
    pub fn set_enabled(&mut self, name: &str, enabled: bool) -> bool {
        for e in &mut self.entries {
            if e.name == name {
                e.enabled = enabled;
                return true;
            }
        }
        false
    }

    /// Longest key over every enabled dictionary (used to bound the segment builder's lookback
    /// window). Includes disabled dictionaries too, so toggling doesn't change the window the
    /// builder reconsiders mid-stream.
    pub fn longest_key(&self) -> usize {
        self.longest_key
    }

    /// Query every enabled dictionary, front to back, returning the first match.
    pub fn lookup(&self, strokes: &[Stroke]) -> Option<&str> {
        self.entries
            .iter()
            .filter(|e| e.enabled)
            .find_map(|e| e.dict.lookup(strokes))
    }

    /// Names of every dictionary in priority order, paired with whether it is enabled.
    pub fn list(&self) -> impl Iterator<Item = (&str, bool)> {
        self.entries.iter().map(|e| (e.name.as_str(), e.enabled))
    }
}

impl Default for DictionaryStack {
    fn default() -> DictionaryStack {
        DictionaryStack::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::dict::MapDictBuilder;
    use steno_macros::stroke;

    #[test]
    fn priority_order() {
        // Push order is priority order: the first dictionary pushed wins ties.
        let mut user = MapDictBuilder::new();
        user.insert(alloc::vec![stroke!("KAT")], "CAT-OVERRIDE".to_string());
        let mut main = MapDictBuilder::new();
        main.insert(alloc::vec![stroke!("KAT")], "cat".to_string());

        let mut stack = DictionaryStack::new();
        stack.push("user", true, Box::new(user.into_map_dict()));
        stack.push("main", true, Box::new(main.into_map_dict()));

        assert_eq!(stack.lookup(&[stroke!("KAT")]), Some("CAT-OVERRIDE"));
    }

    #[test]
    fn disabled_is_skipped() {
        let mut d = MapDictBuilder::new();
        d.insert(alloc::vec![stroke!("KAT")], "cat".to_string());
        let mut stack = DictionaryStack::new();
        stack.push("main", true, Box::new(d.into_map_dict()));
        stack.set_enabled("main", false);
        assert_eq!(stack.lookup(&[stroke!("KAT")]), None);
    }
}
