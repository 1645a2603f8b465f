//! In-memory dictionaries.
//!
//! Two shapes are provided: `MapDict`, a `BTreeMap`-backed dictionary useful
//! for exact/prefix lookups without needing a `Selector`, and `RamDict`, a
//! sorted-vector `DictImpl` used to drive a `Selector` the same way a packed
//! dictionary would. Tests and `steno-dict-tool` build both from the same
//! `MapDictBuilder`.

extern crate alloc;

use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;

use super::{Dict, DictImpl, Selector};
use crate::Stroke;

/// A dictionary backed by a sorted `BTreeMap`. Supports `Dict::lookup`/`prefix_lookup` directly.
pub struct MapDict {
    map: BTreeMap<Vec<Stroke>, String>,
    longest: usize,
}

/// A dictionary backed by parallel sorted vectors of keys and values, suitable for driving a
/// `Selector` incrementally, one stroke at a time.
pub struct RamDict {
    keys: Vec<Vec<Stroke>>,
    values: Vec<String>,
    longest: usize,
}

/// Accumulates key/definition pairs, then freezes into either dictionary shape.
pub struct MapDictBuilder {
    map: BTreeMap<Vec<Stroke>, String>,
}

impl Dict for MapDict {
    fn lookup<'a>(&'a self, query: &[Stroke]) -> Option<&'a str> {
        self.map.get(query).map(|s| s.as_ref())
    }

    fn longest_key(&self) -> usize {
        self.longest
    }
}

impl MapDict {
    /// Iterate over the keys in the dictionary, in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &[Stroke]> {
        self.map.keys().map(|k| k.as_slice())
    }
}

impl Dict for RamDict {
    fn lookup<'a>(&'a self, query: &[Stroke]) -> Option<&'a str> {
        let idx = self.keys.binary_search_by(|k| k.as_slice().cmp(query)).ok()?;
        Some(self.values[idx].as_ref())
    }

    fn longest_key(&self) -> usize {
        self.longest
    }
}

impl DictImpl for RamDict {
    fn len(&self) -> usize {
        self.keys.len()
    }

    fn key(&self, index: usize) -> &[Stroke] {
        &self.keys[index]
    }

    fn value(&self, index: usize) -> &str {
        &self.values[index]
    }
}

/// Lets any `DictImpl` that can be held behind an `Rc` start a `Selector` over itself, e.g.
/// `ram_dict_rc.selector()`.
pub trait DictImplExt: DictImpl + Sized + 'static {
    fn selector(self: Rc<Self>) -> Selector {
        Selector::new(self)
    }
}

impl<T: DictImpl + 'static> DictImplExt for T {}

impl Default for MapDictBuilder {
    fn default() -> MapDictBuilder {
        MapDictBuilder::new()
    }
}

impl MapDictBuilder {
    pub fn new() -> MapDictBuilder {
        MapDictBuilder {
            map: BTreeMap::new(),
        }
    }

    /// Insert a definition. A later insert of the same key replaces the earlier one.
    pub fn insert(&mut self, key: Vec<Stroke>, definition: String) {
        self.map.insert(key, definition);
    }

    /// Freeze into a `BTreeMap`-backed dictionary.
    pub fn into_map_dict(self) -> MapDict {
        let longest = self.map.keys().map(|k| k.len()).max().unwrap_or(0);
        MapDict {
            map: self.map,
            longest,
        }
    }

    /// Freeze into a sorted-vector dictionary, for `Selector`-driven lookup.
    pub fn into_ram_dict(self) -> RamDict {
        let longest = self.map.keys().map(|k| k.len()).max().unwrap_or(0);
        let mut keys = Vec::with_capacity(self.map.len());
        let mut values = Vec::with_capacity(self.map.len());
        for (k, v) in self.map {
            keys.push(k);
            values.push(v);
        }
        RamDict {
            keys,
            values,
            longest,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use alloc::string::ToString;
    use steno_macros::stroke;

    #[test]
    fn ramdict() {
        let mut b = MapDictBuilder::new();
        b.insert(alloc::vec![stroke!("S")], "S".to_string());
        b.insert(alloc::vec![stroke!("ST")], "ST".to_string());
        b.insert(
            alloc::vec![stroke!("ST"), stroke!("OP")],
            "ST/OP".to_string(),
        );
        b.insert(
            alloc::vec![stroke!("ST"), stroke!("OP"), stroke!("-G")],
            "ST/OP/-G".to_string(),
        );

        let dict = Rc::new(b.into_ram_dict());
        let pos = dict.clone().selector();
        let (posb, text) = pos.lookup_step(stroke!("ST")).unwrap();
        assert_eq!(text, Some("ST".to_string()));
        let (_posc, text) = posb.lookup_step(stroke!("OP")).unwrap();
        assert_eq!(text, Some("ST/OP".to_string()));
    }
}
