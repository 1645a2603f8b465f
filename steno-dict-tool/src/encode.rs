//! Packed dictionary binary encoding.
//!
//! Produces the on-disk layout `steno_engine::dict::packed::Collection::load`
//! reads back: a `"JSC2"` collection header, a table of per-dictionary header
//! offsets, and for each dictionary a population-count-indexed hash table per
//! key length (see `dict::packed`'s module doc). Every offset written here is
//! a `u32` byte offset into the whole output buffer, matching the
//! relocatable layout `map_dictionary_definition.h` was translated into.

use std::collections::BTreeMap;

use byteorder::{ByteOrder, LittleEndian};
use steno_engine::dict::packed::{hash_key, Format, STENO_MAP_DICTIONARY_COLLECTION_MAGIC};
use steno_engine::stroke::StenoWord;
use steno_engine::Stroke;

/// Keep hash tables under this load factor so open-addressed probing always terminates.
const LOAD_FACTOR: f64 = 0.7;

/// Slots per hash-table block, per `dict::packed::Format`.
fn block_width(format: Format) -> usize {
    match format {
        Format::Compact => 128,
        Format::Full => 32,
    }
}

/// Bytes one hash-table block occupies, per `dict::packed::Format`.
fn block_bytes(format: Format) -> usize {
    match format {
        Format::Compact => 20,
        Format::Full => 8,
    }
}

/// On-disk byte value for `format`, per `dict::packed::Format::from_byte`.
fn format_byte(format: Format) -> u8 {
    match format {
        Format::Compact => 0,
        Format::Full => 1,
    }
}

fn write_field(buf: &mut Vec<u8>, format: Format, value: u32) {
    match format {
        Format::Compact => {
            let bytes = value.to_le_bytes();
            buf.extend_from_slice(&bytes[..3]);
        }
        Format::Full => {
            let mut word = [0u8; 4];
            LittleEndian::write_u32(&mut word, value);
            buf.extend_from_slice(&word);
        }
    }
}

pub struct DictSource {
    pub name: String,
    pub default_enabled: bool,
    pub entries: BTreeMap<StenoWord, String>,
}

/// Assemble a collection out of one or more named dictionaries, using `format` for every
/// dictionary's hash tables.
pub fn build_collection(dicts: &[DictSource], has_reverse_lookup: bool, format: Format) -> Vec<u8> {
    let count = dicts.len();
    let table_offset = 16usize;
    let headers_offset = table_offset + 4 * count;

    let mut buf = vec![0u8; headers_offset + 20 * count];
    write_u32(&mut buf, 0, STENO_MAP_DICTIONARY_COLLECTION_MAGIC);
    LittleEndian::write_u16(&mut buf[4..6], count as u16);
    buf[6] = has_reverse_lookup as u8;
    // buf[7] is padding; buf[8..16) is an unused collection-wide text offset/length, left zero.

    for (i, dict) in dicts.iter().enumerate() {
        let header_offset = headers_offset + i * 20;
        write_u32(&mut buf, table_offset + i * 4, header_offset as u32);
        encode_one(&mut buf, header_offset, dict, format);
    }

    buf
}

fn write_u32(buf: &mut [u8], offset: usize, value: u32) {
    LittleEndian::write_u32(&mut buf[offset..offset + 4], value);
}

fn encode_one(buf: &mut Vec<u8>, header_offset: usize, dict: &DictSource, format: Format) {
    let maximum_outline_length = dict
        .entries
        .keys()
        .map(|k| k.0.len())
        .max()
        .unwrap_or(1)
        .max(1);
    assert!(maximum_outline_length <= 255, "outline too long to encode");

    buf[header_offset] = dict.default_enabled as u8;
    buf[header_offset + 1] = maximum_outline_length as u8;
    buf[header_offset + 2] = format_byte(format);
    buf[header_offset + 3] = 0;

    let name_offset = buf.len();
    buf.extend_from_slice(dict.name.as_bytes());
    buf.push(0);
    write_u32(buf, header_offset + 4, name_offset as u32);

    let mut by_length: BTreeMap<usize, Vec<(&[Stroke], &str)>> = BTreeMap::new();
    for (k, v) in &dict.entries {
        by_length.entry(k.0.len()).or_default().push((&k.0, v));
    }

    // Text block: every definition string, NUL-terminated, in (length, insertion order).
    let text_start = buf.len();
    let mut text_offsets: BTreeMap<usize, Vec<u32>> = BTreeMap::new();
    for (&length, items) in &by_length {
        let mut offs = Vec::with_capacity(items.len());
        for (_, text) in items {
            offs.push((buf.len() - text_start) as u32);
            buf.extend_from_slice(text.as_bytes());
            buf.push(0);
        }
        text_offsets.insert(length, offs);
    }
    let text_length = buf.len() - text_start;
    write_u32(buf, header_offset + 8, text_start as u32);
    write_u32(buf, header_offset + 12, text_length as u32);

    // Reserve the strokes table: one 20-byte strokes-definition slot per outline length.
    let strokes_table_offset = buf.len();
    buf.resize(buf.len() + 20 * maximum_outline_length, 0);
    write_u32(buf, header_offset + 16, strokes_table_offset as u32);

    for length in 1..=maximum_outline_length {
        let Some(items) = by_length.get(&length) else {
            continue; // hash_map_size stays 0: `Collection::load` skips this length.
        };
        let offs = &text_offsets[&length];
        encode_strokes_definition(
            buf,
            strokes_table_offset + (length - 1) * 20,
            items,
            offs,
            format,
        );
    }
}

fn encode_strokes_definition(
    buf: &mut Vec<u8>,
    def_offset: usize,
    items: &[(&[Stroke], &str)],
    text_offsets: &[u32],
    format: Format,
) {
    let width = block_width(format);
    let hash_map_size = hash_table_size(items.len(), width);
    let block_count = hash_map_size / width;

    let mut slot_of: Vec<Option<usize>> = vec![None; hash_map_size];
    for (idx, &(key, _)) in items.iter().enumerate() {
        let mut slot = (hash_key(key) as usize) % hash_map_size;
        while slot_of[slot].is_some() {
            slot = (slot + 1) % hash_map_size;
        }
        slot_of[slot] = Some(idx);
    }

    let mut masks = vec![0u32; hash_map_size / 32];
    for (slot, entry) in slot_of.iter().enumerate() {
        if entry.is_some() {
            masks[slot / 32] |= 1 << (slot % 32);
        }
    }

    let blocks_offset = buf.len();
    let mask_words_per_block = width / 32;
    let mut running = 0u32;
    for block_index in 0..block_count {
        let block_masks = &masks[block_index * mask_words_per_block..(block_index + 1) * mask_words_per_block];
        let mut block = vec![0u8; block_bytes(format)];
        for (i, &mask) in block_masks.iter().enumerate() {
            LittleEndian::write_u32(&mut block[i * 4..i * 4 + 4], mask);
        }
        let offset_field = block_masks.len() * 4;
        LittleEndian::write_u32(
            &mut block[offset_field..offset_field + 4],
            running,
        );
        buf.extend_from_slice(&block);
        running += block_masks.iter().map(|m| m.count_ones()).sum::<u32>();
    }
    let blocks_length = buf.len() - blocks_offset;

    let records_offset = buf.len();
    for &idx in slot_of.iter().flatten() {
        let (key, _) = items[idx];
        for stroke in key {
            write_field(buf, format, stroke.into_raw());
        }
        write_field(buf, format, text_offsets[idx]);
    }
    let records_length = buf.len() - records_offset;

    write_u32(buf, def_offset, hash_map_size as u32);
    write_u32(buf, def_offset + 4, blocks_offset as u32);
    write_u32(buf, def_offset + 8, blocks_length as u32);
    write_u32(buf, def_offset + 12, records_offset as u32);
    write_u32(buf, def_offset + 16, records_length as u32);
}

/// Smallest multiple of `width` keeping the load factor under `LOAD_FACTOR`.
fn hash_table_size(entry_count: usize, width: usize) -> usize {
    if entry_count == 0 {
        return width;
    }
    let wanted = (entry_count as f64 / LOAD_FACTOR).ceil() as usize;
    let blocks = ((wanted + width - 1) / width).max(1);
    blocks * width
}

#[cfg(test)]
mod test {
    use super::*;
    use steno_engine::dict::packed::Collection;
    use steno_macros::stroke;

    fn sample_entries() -> BTreeMap<StenoWord, String> {
        let mut entries = BTreeMap::new();
        entries.insert(StenoWord(vec![stroke!("KAT")]), "cat".to_string());
        entries.insert(StenoWord(vec![stroke!("HEL")]), "hello".to_string());
        entries.insert(
            StenoWord(vec![stroke!("HEL"), stroke!("HROE")]),
            "hello world".to_string(),
        );
        entries
    }

    #[test]
    fn roundtrip_through_collection_load() {
        let dict = DictSource {
            name: "test".to_string(),
            default_enabled: true,
            entries: sample_entries(),
        };

        let data = build_collection(&[dict], true, Format::Full);
        let collection = Collection::load(&data).expect("collection parses");
        assert_eq!(collection.dictionaries.len(), 1);

        use steno_engine::dict::Dict;
        let d = &collection.dictionaries[0];
        assert_eq!(d.lookup(&[stroke!("KAT")]), Some("cat"));
        assert_eq!(d.lookup(&[stroke!("HEL")]), Some("hello"));
        assert_eq!(
            d.lookup(&[stroke!("HEL"), stroke!("HROE")]),
            Some("hello world")
        );
        assert_eq!(d.lookup(&[stroke!("TPHO")]), None);
    }

    #[test]
    fn roundtrip_compact_format_through_collection_load() {
        let dict = DictSource {
            name: "test".to_string(),
            default_enabled: true,
            entries: sample_entries(),
        };

        let data = build_collection(&[dict], true, Format::Compact);
        let collection = Collection::load(&data).expect("collection parses");
        assert_eq!(collection.dictionaries.len(), 1);

        use steno_engine::dict::Dict;
        let d = &collection.dictionaries[0];
        assert_eq!(d.lookup(&[stroke!("KAT")]), Some("cat"));
        assert_eq!(d.lookup(&[stroke!("HEL")]), Some("hello"));
        assert_eq!(
            d.lookup(&[stroke!("HEL"), stroke!("HROE")]),
            Some("hello world")
        );
        assert_eq!(d.lookup(&[stroke!("TPHO")]), None);
    }
}
