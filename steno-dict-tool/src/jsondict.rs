//! JSON dictionary loading.
//!
//! Plover's native JSON dictionary format maps a stroke outline (e.g.
//! `"KAT"` or `"HEL/HROE"`) directly to definition text already written in
//! the `{...}` brace surface syntax `directive::parse` understands, so
//! there's nothing to translate here beyond parsing the keys.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

use steno_engine::stroke::StenoWord;

use crate::Result;

pub fn import<P: AsRef<Path>>(name: P) -> Result<BTreeMap<StenoWord, String>> {
    let raw: BTreeMap<String, String> = serde_json::from_reader(File::open(name)?)?;

    let mut dict = BTreeMap::new();
    for (k, v) in raw {
        let key = StenoWord::parse(&k)?;
        dict.insert(key, v);
    }

    Ok(dict)
}
