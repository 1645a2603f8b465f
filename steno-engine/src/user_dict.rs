//! User dictionary interface.
//!
//! The engine only needs to read and write mappings during `ADD_TRANSLATION`
//! mode; it has no opinion on where entries persist. A host embeds this by
//! implementing `UserDictionary` over whatever storage it has (flash, a file,
//! an in-memory map for testing) and pushing it onto the `DictionaryStack`.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

use crate::dict::Dict;
use crate::Stroke;

/// A dictionary a host can write new entries into, collaborating with the core but not
/// implemented by it: the core specifies the interface, not the persistence.
pub trait UserDictionary {
    fn lookup(&self, strokes: &[Stroke]) -> Option<String>;
    fn add(&mut self, strokes: &[Stroke], text: &str);
    fn remove(&mut self, strokes: &[Stroke]);
}

/// A trivial in-memory `UserDictionary`, useful for tests and hosts with no persistence
/// requirement of their own.
#[derive(Default)]
pub struct MemoryUserDictionary {
    entries: Vec<(Vec<Stroke>, String)>,
}

impl MemoryUserDictionary {
    pub fn new() -> MemoryUserDictionary {
        MemoryUserDictionary {
            entries: Vec::new(),
        }
    }
}

impl UserDictionary for MemoryUserDictionary {
    fn lookup(&self, strokes: &[Stroke]) -> Option<String> {
        self.entries
            .iter()
            .find(|(k, _)| k == strokes)
            .map(|(_, v)| v.clone())
    }

    fn add(&mut self, strokes: &[Stroke], text: &str) {
        self.remove(strokes);
        self.entries.push((strokes.to_vec(), text.into()));
    }

    fn remove(&mut self, strokes: &[Stroke]) {
        self.entries.retain(|(k, _)| k != strokes);
    }
}

/// A `MemoryUserDictionary` is also a plain `Dict`, so it can be pushed directly onto a
/// `DictionaryStack` alongside the packed and in-memory dictionary backends.
impl Dict for MemoryUserDictionary {
    fn lookup<'a>(&'a self, strokes: &[Stroke]) -> Option<&'a str> {
        self.entries
            .iter()
            .find(|(k, _)| k == strokes)
            .map(|(_, v)| v.as_str())
    }

    fn longest_key(&self) -> usize {
        self.entries.iter().map(|(k, _)| k.len()).max().unwrap_or(0)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use steno_macros::stroke;

    #[test]
    fn add_lookup_remove() {
        let mut dict = MemoryUserDictionary::new();
        let key = alloc::vec![stroke!("KAT")];
        assert_eq!(dict.lookup(&key), None);
        dict.add(&key, "cat");
        assert_eq!(dict.lookup(&key).as_deref(), Some("cat"));
        dict.add(&key, "kitty");
        assert_eq!(dict.lookup(&key).as_deref(), Some("kitty"));
        dict.remove(&key);
        assert_eq!(dict.lookup(&key), None);
    }
}
