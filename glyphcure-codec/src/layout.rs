// glyphcure-codec/src/layout.rs
//! Byte layout of the confusables and bidi artifacts.
//!
//! Everything in this module is shared between the offline builder and the
//! runtime loader, so it only depends on `core`. Any change here is a breaking
//! change to the artifact and must bump [`FORMAT_VERSION`].
//!
//! License: MIT OR APACHE 2.0

use core::fmt;

pub const MAGIC: [u8; 4] = *b"GCDB";
pub const BIDI_MAGIC: [u8; 4] = *b"GCBD";
pub const FORMAT_VERSION: u32 = 1;

/// magic, version, case-sensitive offset, similar offset, strings offset.
pub const HEADER_SIZE: usize = 20;
/// magic, version, brackets offset.
pub const BIDI_HEADER_SIZE: usize = 12;

pub const RECORD_SIZE: usize = 6;
pub const BIDI_RUN_SIZE: usize = 8;
pub const BRACKET_SIZE: usize = 8;

pub const CODEPOINT_MASK: u32 = 0x000F_FFFF;
pub const STRING_FLAG: u32 = 0x1000_0000;
pub const SYNCED_FLAG: u8 = 0x80;
pub const MAX_RANGE_SIZE: u8 = 0x7F;
pub const MAX_STRING_TABLE_LEN: usize = 0x7FF;
pub const MAX_STRING_LEN: usize = 31;

/// Set on the last byte of every similar group.
pub const SIMILAR_GROUP_END: u8 = 0x80;

pub const ATTR_DIACRITIC: u8 = 0b01;
pub const ATTR_TURKISH: u8 = 0b10;
pub const ATTR_SCRIPT_SHIFT: u8 = 2;

/// Highest code point a record may cover. Everything above is stripped at run time.
pub const MAX_CODEPOINT: u32 = 0xE01EF;

/// Bit positions of the runtime option mask.
///
/// Script bits double as the script tag stored in a record's attribute byte.
pub mod bit {
    pub const RETAIN_CAPITALIZATION: u8 = 0;
    pub const DISABLE_BIDI: u8 = 1;
    pub const DISABLE_LEETSPEAK: u8 = 2;
    pub const RETAIN_DIACRITICS: u8 = 3;
    pub const RETAIN_GREEK: u8 = 4;
    pub const RETAIN_CYRILLIC: u8 = 5;
    pub const RETAIN_HEBREW: u8 = 6;
    pub const RETAIN_ARABIC: u8 = 7;
    pub const RETAIN_DEVANAGARI: u8 = 8;
    pub const RETAIN_BENGALI: u8 = 9;
    pub const RETAIN_ARMENIAN: u8 = 10;
    pub const RETAIN_GUJARATI: u8 = 11;
    pub const RETAIN_TAMIL: u8 = 12;
    pub const RETAIN_THAI: u8 = 13;
    pub const RETAIN_LAO: u8 = 14;
    pub const RETAIN_BURMESE: u8 = 15;
    pub const RETAIN_KHMER: u8 = 16;
    pub const RETAIN_MONGOLIAN: u8 = 17;
    pub const RETAIN_CHINESE: u8 = 18;
    pub const RETAIN_JAPANESE: u8 = 19;
    pub const RETAIN_KOREAN: u8 = 20;
    pub const RETAIN_BRAILLE: u8 = 21;
    pub const RETAIN_EMOJIS: u8 = 22;
    pub const RETAIN_TURKISH: u8 = 23;
    pub const ASCII_ONLY: u8 = 24;
    pub const ALPHANUMERIC_ONLY: u8 = 25;
    pub const PURE_HOMOGLYPH: u8 = 26;

    /// First and last bit that tags a retainable script in a record.
    pub const FIRST_SCRIPT: u8 = RETAIN_GREEK;
    pub const LAST_SCRIPT: u8 = RETAIN_EMOJIS;
}

#[inline]
pub fn read_u32_le(bytes: &[u8], offset: usize) -> Option<u32> {
    let chunk = bytes.get(offset..offset.checked_add(4)?)?;
    Some(u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
}

/// Why a header could not be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderError {
    BadMagic,
    UnsupportedVersion(u32),
    Truncated,
}

impl fmt::Display for HeaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderError::BadMagic => write!(f, "artifact does not start with the expected magic bytes"),
            HeaderError::UnsupportedVersion(v) => {
                write!(f, "artifact format version {} is not supported (expected {})", v, FORMAT_VERSION)
            }
            HeaderError::Truncated => write!(f, "artifact is shorter than its header"),
        }
    }
}

fn check_preamble(bytes: &[u8], magic: [u8; 4], header_size: usize) -> Result<(), HeaderError> {
    if bytes.len() < header_size {
        return Err(HeaderError::Truncated);
    }
    if bytes[..4] != magic {
        return Err(HeaderError::BadMagic);
    }
    let version = read_u32_le(bytes, 4).ok_or(HeaderError::Truncated)?;
    if version != FORMAT_VERSION {
        return Err(HeaderError::UnsupportedVersion(version));
    }
    Ok(())
}

/// Table boundaries of `codepoints.bin`. The case-insensitive table always starts at [`HEADER_SIZE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub case_sensitive_offset: u32,
    pub similar_offset: u32,
    pub strings_offset: u32,
}

impl Header {
    pub fn parse(bytes: &[u8]) -> Result<Self, HeaderError> {
        check_preamble(bytes, MAGIC, HEADER_SIZE)?;
        Ok(Self {
            case_sensitive_offset: read_u32_le(bytes, 8).ok_or(HeaderError::Truncated)?,
            similar_offset: read_u32_le(bytes, 12).ok_or(HeaderError::Truncated)?,
            strings_offset: read_u32_le(bytes, 16).ok_or(HeaderError::Truncated)?,
        })
    }

    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        out[..4].copy_from_slice(&MAGIC);
        out[4..8].copy_from_slice(&FORMAT_VERSION.to_le_bytes());
        out[8..12].copy_from_slice(&self.case_sensitive_offset.to_le_bytes());
        out[12..16].copy_from_slice(&self.similar_offset.to_le_bytes());
        out[16..20].copy_from_slice(&self.strings_offset.to_le_bytes());
        out
    }
}

/// Table boundary of `bidi.bin`. Runs start at [`BIDI_HEADER_SIZE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BidiHeader {
    pub brackets_offset: u32,
}

impl BidiHeader {
    pub fn parse(bytes: &[u8]) -> Result<Self, HeaderError> {
        check_preamble(bytes, BIDI_MAGIC, BIDI_HEADER_SIZE)?;
        Ok(Self {
            brackets_offset: read_u32_le(bytes, 8).ok_or(HeaderError::Truncated)?,
        })
    }

    pub fn to_bytes(&self) -> [u8; BIDI_HEADER_SIZE] {
        let mut out = [0u8; BIDI_HEADER_SIZE];
        out[..4].copy_from_slice(&BIDI_MAGIC);
        out[4..8].copy_from_slice(&FORMAT_VERSION.to_le_bytes());
        out[8..12].copy_from_slice(&self.brackets_offset.to_le_bytes());
        out
    }
}

/// What a record translates to, as stored on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payload {
    /// A single ASCII byte (`0` means delete). `range` extra code points follow the first one.
    Char { ch: u8, range: u8, synced: bool },
    /// `len` bytes of the string table starting at `offset`.
    Str { offset: u16, len: u8 },
}

/// One packed 6-byte record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawRecord {
    pub codepoint: u32,
    pub payload: Payload,
    pub attributes: u8,
}

impl RawRecord {
    pub fn encode(&self) -> [u8; RECORD_SIZE] {
        let mut word = self.codepoint & CODEPOINT_MASK;
        let low = match self.payload {
            Payload::Char { ch, range, synced } => {
                word |= ((ch & 0x7F) as u32) << 20;
                (range & MAX_RANGE_SIZE) | if synced { SYNCED_FLAG } else { 0 }
            }
            Payload::Str { offset, len } => {
                word |= STRING_FLAG;
                word |= (((offset >> 8) & 0x7) as u32) << 20;
                word |= ((len & 0x1F) as u32) << 23;
                (offset & 0xFF) as u8
            }
        };

        let mut out = [0u8; RECORD_SIZE];
        out[..4].copy_from_slice(&word.to_le_bytes());
        out[4] = low;
        out[5] = self.attributes;
        out
    }

    /// Decodes a record from the first [`RECORD_SIZE`] bytes of `bytes`.
    ///
    /// Panics if `bytes` is shorter than a record; callers slice by whole records.
    pub fn decode(bytes: &[u8]) -> Self {
        let word = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        let low = bytes[4];
        let payload = if word & STRING_FLAG != 0 {
            Payload::Str {
                offset: ((((word >> 20) & 0x7) as u16) << 8) | low as u16,
                len: ((word >> 23) & 0x1F) as u8,
            }
        } else {
            Payload::Char {
                ch: ((word >> 20) & 0x7F) as u8,
                range: low & MAX_RANGE_SIZE,
                synced: low & SYNCED_FLAG != 0,
            }
        };

        Self {
            codepoint: word & CODEPOINT_MASK,
            payload,
            attributes: bytes[5],
        }
    }

    /// Last code point covered by this record.
    pub fn last_codepoint(&self) -> u32 {
        match self.payload {
            Payload::Char { range, .. } => self.codepoint + range as u32,
            Payload::Str { .. } => self.codepoint,
        }
    }

    /// Script option bit this record is tagged with, if any.
    pub fn script_bit(&self) -> Option<u8> {
        match self.attributes >> ATTR_SCRIPT_SHIFT {
            0 => None,
            bit => Some(bit),
        }
    }
}

/// Bidi_Class values, numbered as stored in `bidi.bin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum BidiClass {
    B = 0,
    S,
    WS,
    ON,
    ET,
    ES,
    CS,
    EN,
    L,
    BN,
    R,
    AN,
    AL,
    LRE,
    RLE,
    PDF,
    LRO,
    RLO,
    LRI,
    RLI,
    FSI,
    PDI,
    /// Non-spacing marks take the class of the preceding character.
    NSM,
}

const BIDI_CLASSES: [(BidiClass, &str); 23] = [
    (BidiClass::B, "B"),
    (BidiClass::S, "S"),
    (BidiClass::WS, "WS"),
    (BidiClass::ON, "ON"),
    (BidiClass::ET, "ET"),
    (BidiClass::ES, "ES"),
    (BidiClass::CS, "CS"),
    (BidiClass::EN, "EN"),
    (BidiClass::L, "L"),
    (BidiClass::BN, "BN"),
    (BidiClass::R, "R"),
    (BidiClass::AN, "AN"),
    (BidiClass::AL, "AL"),
    (BidiClass::LRE, "LRE"),
    (BidiClass::RLE, "RLE"),
    (BidiClass::PDF, "PDF"),
    (BidiClass::LRO, "LRO"),
    (BidiClass::RLO, "RLO"),
    (BidiClass::LRI, "LRI"),
    (BidiClass::RLI, "RLI"),
    (BidiClass::FSI, "FSI"),
    (BidiClass::PDI, "PDI"),
    (BidiClass::NSM, "NSM"),
];

impl BidiClass {
    pub fn from_u8(value: u8) -> Option<Self> {
        BIDI_CLASSES.get(value as usize).map(|(class, _)| *class)
    }

    pub fn from_name(name: &str) -> Option<Self> {
        BIDI_CLASSES.iter().find(|(_, n)| *n == name).map(|(class, _)| *class)
    }

    pub fn name(self) -> &'static str {
        BIDI_CLASSES[self as usize].1
    }

    /// Strong right-to-left, or a number that forces bidi resolution.
    pub fn is_rtl_trigger(self) -> bool {
        matches!(self, BidiClass::R | BidiClass::AL | BidiClass::AN)
    }

    /// Embedding, override and isolate controls.
    pub fn is_explicit(self) -> bool {
        matches!(
            self,
            BidiClass::LRE
                | BidiClass::RLE
                | BidiClass::PDF
                | BidiClass::LRO
                | BidiClass::RLO
                | BidiClass::LRI
                | BidiClass::RLI
                | BidiClass::FSI
                | BidiClass::PDI
        )
    }
}

pub fn encode_bidi_run(start: u32, end: u32, class: BidiClass) -> [u8; BIDI_RUN_SIZE] {
    let mut out = [0u8; BIDI_RUN_SIZE];
    out[..4].copy_from_slice(&((start & 0x00FF_FFFF) | ((class as u32) << 24)).to_le_bytes());
    out[4..].copy_from_slice(&end.to_le_bytes());
    out
}

/// Decodes `(start, end, class)` from one run. Unknown class numbers fall back to `L`.
pub fn decode_bidi_run(bytes: &[u8]) -> (u32, u32, BidiClass) {
    let first = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    let end = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
    let class = BidiClass::from_u8((first >> 24) as u8).unwrap_or(BidiClass::L);
    (first & 0x00FF_FFFF, end, class)
}

pub fn encode_bracket(opening: u32, closing: u32) -> [u8; BRACKET_SIZE] {
    let mut out = [0u8; BRACKET_SIZE];
    out[..4].copy_from_slice(&opening.to_le_bytes());
    out[4..].copy_from_slice(&closing.to_le_bytes());
    out
}

pub fn decode_bracket(bytes: &[u8]) -> (u32, u32) {
    (
        u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
        u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
    )
}
