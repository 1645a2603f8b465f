//! Structural errors: malformed packed dictionaries and the like.
//!
//! Translation itself never fails: a stroke that matches nothing falls back to
//! fingerspelling, a malformed directive is stripped and logged, and so on (see
//! the per-component modules for that degradation). This type is only for
//! things that are wrong before translation even starts.

#![allow(dead_code)]

use core::fmt;

#[derive(Debug)]
pub enum Error {
    /// A packed dictionary collection didn't start with the expected magic number.
    BadMagic(u32),
    /// A hash map block's `PopCount` didn't agree with its recorded base offset range.
    CorruptHashBlock,
    /// A text or key offset pointed outside the bounds of its table.
    OffsetOutOfBounds,
    /// The dictionary header claimed a format byte that isn't `Compact` or `Full`.
    BadFormat(u8),
    /// A stroke literal failed to parse.
    Stroke(crate::stroke::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BadMagic(magic) => write!(f, "bad dictionary magic: 0x{:08x}", magic),
            Error::CorruptHashBlock => write!(f, "corrupt hash map block"),
            Error::OffsetOutOfBounds => write!(f, "offset out of bounds"),
            Error::BadFormat(b) => write!(f, "unknown dictionary format byte: {}", b),
            Error::Stroke(e) => write!(f, "invalid stroke: {:?}", e),
        }
    }
}

impl core::error::Error for Error {}

impl From<crate::stroke::Error> for Error {
    fn from(e: crate::stroke::Error) -> Error {
        Error::Stroke(e)
    }
}

pub type Result<T> = core::result::Result<T, Error>;
