//! Packed, read-only binary stroke dictionaries.
//!
//! Lookup of a stroke key of length `L` costs `O(L)` mask-word reads plus one
//! population count and one record comparison. The layout mirrors a
//! population-count-indexed hash table: a dense array of records (stroke key
//! + text offset) is addressed by summing popcounts of the hash-map blocks
//! that precede the target slot, so there is no pointer-per-slot overhead.
//!
//! Two physical block widths are supported, matching the two encodings a
//! collection may use: `Compact` (128 slots per block, 24-bit record fields)
//! and `Full` (32 slots per block, 32-bit record fields). A dictionary picks
//! one format for all of its strokes-definitions.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{Error, Result};
use crate::Stroke;

use super::Dict;

/// Magic for a single legacy dictionary definition (`"JSD2"`), recognized at load time and
/// wrapped as a one-element collection.
pub const STENO_MAP_DICTIONARY_MAGIC: u32 = 0x3244534a;
/// Magic for a dictionary collection (`"JSC2"`), the native multi-dictionary form.
pub const STENO_MAP_DICTIONARY_COLLECTION_MAGIC: u32 = 0x3243534a;

/// Which physical hash-block encoding a strokes-definition uses.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Format {
    /// 128-bit mask (4 × 32-bit words) + 32-bit base offset per block; 24-bit record fields.
    Compact,
    /// 32-bit mask + 32-bit base offset per block; 32-bit record fields.
    Full,
}

impl Format {
    fn from_byte(b: u8) -> Result<Format> {
        match b {
            0 => Ok(Format::Compact),
            1 => Ok(Format::Full),
            other => Err(Error::BadFormat(other)),
        }
    }

    /// Number of hash-table slots one block of this format covers.
    fn block_width(self) -> usize {
        match self {
            Format::Compact => 128,
            Format::Full => 32,
        }
    }
}

/// One strokes-definition: all entries whose key is exactly `length` strokes long.
struct StrokesDefinition<'a> {
    format: Format,
    length: usize,
    hash_map_size: usize,
    /// Hash-map blocks, `hash_map_size / block_width()` of them.
    blocks: &'a [u8],
    /// Dense record array: for each live slot, `length` stroke words followed by a text offset.
    records: &'a [u8],
}

impl<'a> StrokesDefinition<'a> {
    fn record_width(&self) -> usize {
        match self.format {
            Format::Compact => self.length * 3 + 3,
            Format::Full => self.length * 4 + 4,
        }
    }

    fn block_bytes(&self) -> usize {
        match self.format {
            Format::Compact => 20,
            Format::Full => 8,
        }
    }

    fn block_at(&self, block_index: usize) -> (&'a [u8], u32) {
        let width = self.block_bytes();
        let base = block_index * width;
        let block = &self.blocks[base..base + width];
        match self.format {
            Format::Compact => {
                let base_offset = LittleEndian::read_u32(&block[16..20]);
                (block, base_offset)
            }
            Format::Full => {
                let base_offset = LittleEndian::read_u32(&block[4..8]);
                (block, base_offset)
            }
        }
    }

    fn bit_set(&self, block: &[u8], bit_index: usize) -> bool {
        match self.format {
            Format::Compact => {
                let word = bit_index / 32;
                let bit = bit_index % 32;
                let mask = LittleEndian::read_u32(&block[word * 4..word * 4 + 4]);
                (mask & (1 << bit)) != 0
            }
            Format::Full => {
                let mask = LittleEndian::read_u32(&block[0..4]);
                (mask & (1 << bit_index)) != 0
            }
        }
    }

    fn popcount_below(&self, block: &[u8], bit_index: usize) -> u32 {
        match self.format {
            Format::Compact => {
                let mut count = 0u32;
                for word in 0..(bit_index / 32) {
                    let mask = LittleEndian::read_u32(&block[word * 4..word * 4 + 4]);
                    count += mask.count_ones();
                }
                let word = bit_index / 32;
                let bit = bit_index % 32;
                let mask = LittleEndian::read_u32(&block[word * 4..word * 4 + 4]);
                count += (mask & ((1u32 << bit).wrapping_sub(1))).count_ones();
                count
            }
            Format::Full => {
                let mask = LittleEndian::read_u32(&block[0..4]);
                (mask & ((1u32 << bit_index).wrapping_sub(1))).count_ones()
            }
        }
    }

    fn record_key(&self, index: usize, out: &mut [u32]) -> u32 {
        let width = self.record_width();
        let rec = &self.records[index * width..(index + 1) * width];
        match self.format {
            Format::Compact => {
                for (i, slot) in out.iter_mut().enumerate() {
                    let off = i * 3;
                    *slot = (rec[off] as u32)
                        | ((rec[off + 1] as u32) << 8)
                        | ((rec[off + 2] as u32) << 16);
                }
                let off = self.length * 3;
                (rec[off] as u32) | ((rec[off + 1] as u32) << 8) | ((rec[off + 2] as u32) << 16)
            }
            Format::Full => {
                for (i, slot) in out.iter_mut().enumerate() {
                    *slot = LittleEndian::read_u32(&rec[i * 4..i * 4 + 4]);
                }
                LittleEndian::read_u32(&rec[self.length * 4..self.length * 4 + 4])
            }
        }
    }

    /// Hash of a stroke key, used to pick the initial probe slot. Mixes each stroke's raw value
    /// in turn; order-sensitive, as it must be (the key is a sequence, not a set).
    fn hash(key: &[Stroke]) -> u64 {
        let mut h: u64 = 0xcbf29ce484222325;
        for s in key {
            h ^= s.into_raw() as u64;
            h = h.wrapping_mul(0x100000001b3);
        }
        h
    }

    fn lookup(&self, key: &[Stroke], text: &'a [u8]) -> Option<&'a str> {
        if key.len() != self.length {
            return None;
        }

        let mut slot = (Self::hash(key) as usize) % self.hash_map_size;
        let block_width = self.format.block_width();
        let mut probed = 0usize;

        let mut out = alloc::vec![0u32; self.length];

        loop {
            if probed >= self.hash_map_size {
                return None;
            }
            let block_index = slot / block_width;
            let bit_index = slot % block_width;
            let (block, base_offset) = self.block_at(block_index);

            if !self.bit_set(block, bit_index) {
                return None;
            }

            let record_index = base_offset as usize + self.popcount_below(block, bit_index) as usize;
            let text_offset = self.record_key(record_index, &mut out);

            if out.iter().zip(key.iter()).all(|(&a, &b)| a == b.into_raw()) {
                return read_cstr(text, text_offset as usize);
            }

            slot = (slot + 1) % self.hash_map_size;
            probed += 1;
        }
    }
}

fn read_cstr(text: &[u8], offset: usize) -> Option<&str> {
    let rest = text.get(offset..)?;
    let end = rest.iter().position(|&b| b == 0)?;
    core::str::from_utf8(&rest[..end]).ok()
}

/// A single packed dictionary: one name, one text block, and one strokes-definition per key
/// length it contains.
pub struct PackedDict<'a> {
    pub name: &'a str,
    pub default_enabled: bool,
    pub maximum_outline_length: usize,
    text: &'a [u8],
    strokes: Vec<StrokesDefinition<'a>>,
}

impl<'a> Dict for PackedDict<'a> {
    fn lookup<'b>(&'b self, strokes: &[Stroke]) -> Option<&'b str> {
        let def = self.strokes.iter().find(|d| d.length == strokes.len())?;
        def.lookup(strokes, self.text)
    }

    fn longest_key(&self) -> usize {
        self.maximum_outline_length
    }
}

impl<'a> PackedDict<'a> {
    /// Iterate every live `(stroke key, text)` entry, in block-then-bit order, for `print`.
    pub fn iter_entries(&self) -> impl Iterator<Item = (Vec<Stroke>, &'a str)> + '_ {
        self.strokes.iter().flat_map(move |def| {
            let block_width = def.format.block_width();
            let block_count = def.hash_map_size / block_width;
            (0..block_count).flat_map(move |block_index| {
                let (block, base_offset) = def.block_at(block_index);
                (0..block_width).filter_map(move |bit_index| {
                    if !def.bit_set(block, bit_index) {
                        return None;
                    }
                    let record_index =
                        base_offset as usize + def.popcount_below(block, bit_index) as usize;
                    let mut out = alloc::vec![0u32; def.length];
                    let text_offset = def.record_key(record_index, &mut out);
                    let text = read_cstr(self.text, text_offset as usize)?;
                    let key: Vec<Stroke> = out.iter().map(|&w| Stroke::from_raw(w)).collect();
                    Some((key, text))
                })
            })
        })
    }

    /// Render every entry as a line of JSON: `{"stroke": "...", "text": "..."}`.
    #[cfg(feature = "std")]
    pub fn print(&self) -> String {
        use alloc::string::ToString;
        use core::fmt::Write;
        let mut out = String::new();
        for (key, text) in self.iter_entries() {
            let stroke_text: String = key
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>()
                .join("/");
            let _ = write!(
                out,
                "{{\"stroke\": \"{}\", \"text\": \"{}\"}}\n",
                stroke_text, text
            );
        }
        out
    }
}

/// A collection of packed dictionaries sharing one text block.
pub struct Collection<'a> {
    pub has_reverse_lookup: bool,
    pub dictionaries: Vec<PackedDict<'a>>,
}

impl<'a> Collection<'a> {
    /// Parse a collection from `data`, produced by `steno-dict-tool build`.
    ///
    /// The on-disk layout is a relocatable analogue of `map_dictionary_definition.h`'s C
    /// struct-of-pointers: every `const X *` field there is a `u32` byte offset into `data` here,
    /// little-endian throughout, so the same bytes can be embedded as a `static` and loaded
    /// without relocation. A `"JSD2"` header is a single dictionary header at the point the
    /// magic was read; it is wrapped as a one-element collection rather than re-implementing a
    /// parallel code path, per the migration-path decision in `DESIGN.md`.
    pub fn load(data: &'a [u8]) -> Result<Collection<'a>> {
        let magic = read_u32(data, 0)?;
        match magic {
            STENO_MAP_DICTIONARY_COLLECTION_MAGIC => Self::load_collection(data),
            STENO_MAP_DICTIONARY_MAGIC => {
                let dict = load_dictionary_header(data, 4)?;
                Ok(Collection {
                    has_reverse_lookup: false,
                    dictionaries: alloc::vec![dict],
                })
            }
            other => Err(Error::BadMagic(other)),
        }
    }

    fn load_collection(data: &'a [u8]) -> Result<Collection<'a>> {
        let dictionary_count = read_u16(data, 4)? as usize;
        let has_reverse_lookup = *data.get(6).ok_or(Error::OffsetOutOfBounds)? != 0;
        // byte 7 is padding.
        // bytes [8..16) are the (unused, by this reader) collection-wide text block
        // offset/length; each dictionary header carries its own text block offset instead.
        let table_offset = 16usize;

        let mut dictionaries = Vec::with_capacity(dictionary_count);
        for i in 0..dictionary_count {
            let entry_offset = read_u32(data, table_offset + i * 4)? as usize;
            dictionaries.push(load_dictionary_header(data, entry_offset)?);
        }

        Ok(Collection {
            has_reverse_lookup,
            dictionaries,
        })
    }

    /// Build a collection directly from already-parsed parts. Used by tests that want to
    /// exercise lookup over hand-built `PackedDict`s without going through the on-disk layout.
    pub fn from_parts(has_reverse_lookup: bool, dictionaries: Vec<PackedDict<'a>>) -> Collection<'a> {
        Collection {
            has_reverse_lookup,
            dictionaries,
        }
    }
}

fn read_u32(data: &[u8], offset: usize) -> Result<u32> {
    data.get(offset..offset + 4)
        .map(LittleEndian::read_u32)
        .ok_or(Error::OffsetOutOfBounds)
}

fn read_u16(data: &[u8], offset: usize) -> Result<u16> {
    data.get(offset..offset + 2)
        .map(LittleEndian::read_u16)
        .ok_or(Error::OffsetOutOfBounds)
}

fn read_name(data: &[u8], offset: usize) -> Result<&str> {
    read_cstr(data, offset).ok_or(Error::OffsetOutOfBounds)
}

/// Dictionary header layout, at `offset` within `data`:
///
/// ```text
/// u8  default_enabled
/// u8  maximum_outline_length
/// u8  format (0 = Compact, 1 = Full)
/// u8  _padding
/// u32 name_offset          (NUL-terminated string)
/// u32 text_block_offset
/// u32 text_block_length
/// u32 strokes_table_offset (maximum_outline_length consecutive strokes-definitions)
/// ```
fn load_dictionary_header(data: &[u8], offset: usize) -> Result<PackedDict<'_>> {
    let default_enabled = *data.get(offset).ok_or(Error::OffsetOutOfBounds)? != 0;
    let maximum_outline_length = *data.get(offset + 1).ok_or(Error::OffsetOutOfBounds)? as usize;
    let format = format_from_byte(*data.get(offset + 2).ok_or(Error::OffsetOutOfBounds)?)?;

    let name_offset = read_u32(data, offset + 4)? as usize;
    let text_offset = read_u32(data, offset + 8)? as usize;
    let text_length = read_u32(data, offset + 12)? as usize;
    let strokes_table_offset = read_u32(data, offset + 16)? as usize;

    let name = read_name(data, name_offset)?;
    let text = data
        .get(text_offset..text_offset + text_length)
        .ok_or(Error::OffsetOutOfBounds)?;

    let mut strokes = Vec::with_capacity(maximum_outline_length);
    for length in 1..=maximum_outline_length {
        let def_offset = strokes_table_offset + (length - 1) * 20;
        let hash_map_size = read_u32(data, def_offset)? as usize;
        if hash_map_size == 0 {
            continue;
        }
        let blocks_offset = read_u32(data, def_offset + 4)? as usize;
        let blocks_length = read_u32(data, def_offset + 8)? as usize;
        let records_offset = read_u32(data, def_offset + 12)? as usize;
        let records_length = read_u32(data, def_offset + 16)? as usize;

        let blocks = data
            .get(blocks_offset..blocks_offset + blocks_length)
            .ok_or(Error::OffsetOutOfBounds)?;
        let records = data
            .get(records_offset..records_offset + records_length)
            .ok_or(Error::OffsetOutOfBounds)?;

        strokes.push(build_strokes_definition(format, length, hash_map_size, blocks, records));
    }

    Ok(build_packed_dict(
        name,
        default_enabled,
        maximum_outline_length,
        text,
        strokes,
    ))
}

/// Build a `StrokesDefinition` from its already-sliced parts. Exposed so `steno-dict-tool` and
/// tests can construct a `PackedDict` without duplicating the slicing logic above.
pub fn build_strokes_definition(
    format: Format,
    length: usize,
    hash_map_size: usize,
    blocks: &[u8],
    records: &[u8],
) -> StrokesDefinition<'_> {
    StrokesDefinition {
        format,
        length,
        hash_map_size,
        blocks,
        records,
    }
}

/// Build a `PackedDict` from already-sliced parts.
pub fn build_packed_dict(
    name: &str,
    default_enabled: bool,
    maximum_outline_length: usize,
    text: &[u8],
    strokes: Vec<StrokesDefinition<'_>>,
) -> PackedDict<'_> {
    PackedDict {
        name,
        default_enabled,
        maximum_outline_length,
        text,
        strokes,
    }
}

pub fn format_from_byte(b: u8) -> Result<Format> {
    Format::from_byte(b)
}

/// The probe-slot hash used by both lookup and the encoder. Exposed so `steno-dict-tool` can
/// place records into the same slots a `Collection::load`-parsed reader will probe into.
pub fn hash_key(key: &[Stroke]) -> u64 {
    StrokesDefinition::hash(key)
}

#[cfg(test)]
mod test {
    use super::*;
    use steno_macros::stroke;

    /// Hand-encode a tiny single-length Full-format dictionary and confirm lookup finds its
    /// entries and rejects strokes that were never inserted. This exercises the popcount
    /// addressing scheme directly, independent of any external encoder.
    #[test]
    fn full_format_roundtrip() {
        let entries: &[(Stroke, &str)] =
            &[(stroke!("KAT"), "cat\0"), (stroke!("HEL"), "hello\0")];

        let hash_map_size = 8usize;
        let mut slot_of = alloc::vec![None; hash_map_size];
        for (i, (key, _)) in entries.iter().enumerate() {
            let h = (StrokesDefinition::hash(core::slice::from_ref(key)) as usize) % hash_map_size;
            let mut slot = h;
            while slot_of[slot].is_some() {
                slot = (slot + 1) % hash_map_size;
            }
            slot_of[slot] = Some(i);
        }

        let mut mask = 0u32;
        for (slot, entry) in slot_of.iter().enumerate() {
            if entry.is_some() {
                mask |= 1 << slot;
            }
        }

        let mut block = alloc::vec![0u8; 8];
        LittleEndian::write_u32(&mut block[0..4], mask);
        LittleEndian::write_u32(&mut block[4..8], 0);

        let mut text = String::new();
        let mut text_offsets = Vec::new();
        for (_, t) in entries {
            text_offsets.push(text.len() as u32);
            text.push_str(t);
        }

        let mut records = Vec::new();
        for entry in slot_of.iter().flatten() {
            let (key, _) = entries[*entry];
            let mut rec = [0u8; 8];
            LittleEndian::write_u32(&mut rec[0..4], key.into_raw());
            LittleEndian::write_u32(&mut rec[4..8], text_offsets[*entry]);
            records.extend_from_slice(&rec);
        }

        let def = build_strokes_definition(Format::Full, 1, hash_map_size, &block, &records);
        let dict = build_packed_dict("test", true, 1, text.as_bytes(), alloc::vec![def]);

        assert_eq!(dict.lookup(&[stroke!("KAT")]), Some("cat"));
        assert_eq!(dict.lookup(&[stroke!("HEL")]), Some("hello"));
        assert_eq!(dict.lookup(&[stroke!("TPHO")]), None);
    }
}
