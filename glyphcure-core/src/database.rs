// glyphcure-core/src/database.rs
//! Read-only view over the `codepoints.bin` and `bidi.bin` artifacts.
//!
//! Loading only checks the headers and that every table lies inside its
//! artifact; records are decoded lazily during binary search. The artifacts
//! produced by `build.rs` are embedded in the library and loaded once on first
//! use.
//!
//! License: MIT OR APACHE 2.0

use std::borrow::Cow;
use std::fmt;
use std::str;

use glyphcure_codec::layout::{
    decode_bidi_run, decode_bracket, BidiClass, BidiHeader, Header, Payload, RawRecord, BIDI_HEADER_SIZE,
    BIDI_RUN_SIZE, BRACKET_SIZE, HEADER_SIZE, RECORD_SIZE, SIMILAR_GROUP_END,
};
use log::{debug, error};
use once_cell::sync::Lazy;

use crate::errors::{HeaderErrorKind, LoadError};
use crate::translation::Translation;

const CODEPOINTS_ARTIFACT: &str = "codepoints.bin";
const BIDI_ARTIFACT: &str = "bidi.bin";

static EMBEDDED_CODEPOINTS: &[u8] = include_bytes!(concat!(env!("OUT_DIR"), "/codepoints.bin"));
static EMBEDDED_BIDI: &[u8] = include_bytes!(concat!(env!("OUT_DIR"), "/bidi.bin"));

static EMBEDDED: Lazy<Result<Database<'static>, LoadError>> =
    Lazy::new(|| Database::load(EMBEDDED_CODEPOINTS, EMBEDDED_BIDI));

static EMPTY: Lazy<Database<'static>> = Lazy::new(Database::empty);

/// A translation record returned by a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Record {
    raw: RawRecord,
    case_sensitive: bool,
}

impl Record {
    pub fn codepoint(&self) -> u32 {
        self.raw.codepoint
    }

    pub fn last_codepoint(&self) -> u32 {
        self.raw.last_codepoint()
    }

    pub fn attributes(&self) -> u8 {
        self.raw.attributes
    }

    pub fn script_bit(&self) -> Option<u8> {
        self.raw.script_bit()
    }

    pub fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    pub fn payload(&self) -> Payload {
        self.raw.payload
    }
}

/// Confusables, similar-group and bidi tables borrowed from two artifacts.
#[derive(Clone)]
pub struct Database<'a> {
    case_insensitive: &'a [u8],
    case_sensitive: &'a [u8],
    similar: &'a [u8],
    strings: &'a str,
    runs: &'a [u8],
    brackets: &'a [u8],
    /// Canonical member of the similar group of every ASCII byte.
    canonical: [u8; 128],
}

impl<'a> Database<'a> {
    /// Validates the headers of both artifacts and slices out their tables.
    pub fn load(codepoints: &'a [u8], bidi: &'a [u8]) -> Result<Self, LoadError> {
        let header = Header::parse(codepoints).map_err(|source| LoadError::Header {
            artifact: CODEPOINTS_ARTIFACT,
            source: HeaderErrorKind(source),
        })?;
        let case_sensitive_offset = header.case_sensitive_offset as usize;
        let similar_offset = header.similar_offset as usize;
        let strings_offset = header.strings_offset as usize;

        let case_insensitive =
            table(codepoints, CODEPOINTS_ARTIFACT, "case-insensitive", HEADER_SIZE, case_sensitive_offset, RECORD_SIZE)?;
        let case_sensitive =
            table(codepoints, CODEPOINTS_ARTIFACT, "case-sensitive", case_sensitive_offset, similar_offset, RECORD_SIZE)?;
        let similar = table(codepoints, CODEPOINTS_ARTIFACT, "similar", similar_offset, strings_offset, 1)?;
        let strings = table(codepoints, CODEPOINTS_ARTIFACT, "string", strings_offset, codepoints.len(), 1)?;
        let strings = str::from_utf8(strings).map_err(|e| LoadError::Strings {
            artifact: CODEPOINTS_ARTIFACT,
            offset: strings_offset + e.valid_up_to(),
        })?;

        let bidi_header = BidiHeader::parse(bidi).map_err(|source| LoadError::Header {
            artifact: BIDI_ARTIFACT,
            source: HeaderErrorKind(source),
        })?;
        let brackets_offset = bidi_header.brackets_offset as usize;
        let runs = table(bidi, BIDI_ARTIFACT, "bidi run", BIDI_HEADER_SIZE, brackets_offset, BIDI_RUN_SIZE)?;
        let brackets = table(bidi, BIDI_ARTIFACT, "bracket", brackets_offset, bidi.len(), BRACKET_SIZE)?;

        let database = Self {
            case_insensitive,
            case_sensitive,
            similar,
            strings,
            runs,
            brackets,
            canonical: canonical_table(similar),
        };
        debug!("Loaded confusables database: {:?}", database);
        Ok(database)
    }

    /// The artifacts compiled into this library.
    pub fn embedded() -> Result<&'static Database<'static>, LoadError> {
        EMBEDDED.as_ref().map_err(Clone::clone)
    }

    /// A database without any records. Curing with it only lowercases and strips.
    pub fn empty() -> Database<'static> {
        Database {
            case_insensitive: &[],
            case_sensitive: &[],
            similar: &[],
            strings: "",
            runs: &[],
            brackets: &[],
            canonical: canonical_table(&[]),
        }
    }

    pub(crate) fn embedded_or_empty() -> &'static Database<'static> {
        match Self::embedded() {
            Ok(database) => database,
            Err(e) => {
                error!("Embedded confusables database is unusable, curing without it: {}", e);
                &*EMPTY
            }
        }
    }

    /// Looks up a code point exactly as written. Only holds records whose
    /// lowercase form translates differently.
    pub fn lookup_case_sensitive(&self, codepoint: u32) -> Option<Record> {
        search(self.case_sensitive, codepoint).map(|raw| Record { raw, case_sensitive: true })
    }

    /// Looks up a lowercased code point.
    pub fn lookup_case_insensitive(&self, codepoint: u32) -> Option<Record> {
        search(self.case_insensitive, codepoint).map(|raw| Record { raw, case_sensitive: false })
    }

    /// Translation of `codepoint`, which must lie inside `record`.
    pub fn translation(&self, record: &Record, codepoint: u32) -> Translation<'a> {
        match record.raw.payload {
            Payload::Char { ch: 0, .. } => Translation::None,
            Payload::Char { ch, synced: true, .. } => {
                let offset = codepoint.saturating_sub(record.raw.codepoint);
                char::from_u32(ch as u32 + offset).map_or(Translation::None, Translation::Character)
            }
            Payload::Char { ch, .. } => Translation::Character(ch as char),
            Payload::Str { offset, len } => self
                .resolve(offset, len)
                .map_or(Translation::None, |s| Translation::String(Cow::Borrowed(s))),
        }
    }

    /// Slice of the string table.
    pub fn resolve(&self, offset: u16, len: u8) -> Option<&'a str> {
        let start = offset as usize;
        self.strings.get(start..start + len as usize)
    }

    /// Every similar group, canonical member first.
    pub fn similar_groups(&self) -> Vec<Vec<char>> {
        self.similar
            .split_inclusive(|b| b & SIMILAR_GROUP_END != 0)
            .map(|group| group.iter().map(|b| (b & !SIMILAR_GROUP_END) as char).collect())
            .collect()
    }

    /// The first member of `ch`'s similar group, or `ch` itself.
    pub fn canonical_similar(&self, ch: char) -> char {
        if ch.is_ascii() {
            self.canonical[ch as usize] as char
        } else {
            ch
        }
    }

    pub fn is_similar(&self, a: char, b: char) -> bool {
        a == b || (a.is_ascii() && b.is_ascii() && self.canonical[a as usize] == self.canonical[b as usize])
    }

    /// Bidi class of `ch`. Code points outside every stored run are `L`.
    pub fn bidi_class(&self, ch: char) -> BidiClass {
        let codepoint = ch as u32;
        let (mut lo, mut hi) = (0, self.runs.len() / BIDI_RUN_SIZE);
        while lo < hi {
            let mid = (lo + hi) / 2;
            let (start, end, class) = decode_bidi_run(&self.runs[mid * BIDI_RUN_SIZE..]);
            if codepoint < start {
                hi = mid;
            } else if codepoint > end {
                lo = mid + 1;
            } else {
                return class;
            }
        }
        BidiClass::L
    }

    /// The `(opening, closing)` pair `ch` belongs to, from either side.
    pub fn bracket_pair(&self, ch: char) -> Option<(char, char)> {
        let codepoint = ch as u32;
        let mut pairs = self.brackets.chunks_exact(BRACKET_SIZE).map(decode_bracket);

        let (mut lo, mut hi) = (0, self.brackets.len() / BRACKET_SIZE);
        let mut found = None;
        while lo < hi {
            let mid = (lo + hi) / 2;
            let pair = decode_bracket(&self.brackets[mid * BRACKET_SIZE..]);
            if codepoint < pair.0 {
                hi = mid;
            } else if codepoint > pair.0 {
                lo = mid + 1;
            } else {
                found = Some(pair);
                break;
            }
        }
        let (opening, closing) = found.or_else(|| pairs.find(|&(_, closing)| closing == codepoint))?;

        Some((char::from_u32(opening)?, char::from_u32(closing)?))
    }

    /// The other half of a paired bracket.
    pub fn mirror(&self, ch: char) -> Option<char> {
        self.bracket_pair(ch)
            .map(|(opening, closing)| if opening == ch { closing } else { opening })
    }
}

impl fmt::Debug for Database<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("case_insensitive_records", &(self.case_insensitive.len() / RECORD_SIZE))
            .field("case_sensitive_records", &(self.case_sensitive.len() / RECORD_SIZE))
            .field("similar_bytes", &self.similar.len())
            .field("string_bytes", &self.strings.len())
            .field("bidi_runs", &(self.runs.len() / BIDI_RUN_SIZE))
            .field("bracket_pairs", &(self.brackets.len() / BRACKET_SIZE))
            .finish()
    }
}

fn table<'a>(
    bytes: &'a [u8],
    artifact: &'static str,
    table: &'static str,
    start: usize,
    end: usize,
    record_size: usize,
) -> Result<&'a [u8], LoadError> {
    if start > end || end > bytes.len() {
        return Err(LoadError::OutOfBounds { artifact, table, start, end, len: bytes.len() });
    }
    let len = end - start;
    if len % record_size != 0 {
        return Err(LoadError::Misaligned { artifact, table, len, record_size });
    }
    Ok(&bytes[start..end])
}

fn search(table: &[u8], codepoint: u32) -> Option<RawRecord> {
    let (mut lo, mut hi) = (0, table.len() / RECORD_SIZE);
    while lo < hi {
        let mid = (lo + hi) / 2;
        let record = RawRecord::decode(&table[mid * RECORD_SIZE..]);
        if codepoint < record.codepoint {
            hi = mid;
        } else if codepoint > record.last_codepoint() {
            lo = mid + 1;
        } else {
            return Some(record);
        }
    }
    None
}

fn canonical_table(similar: &[u8]) -> [u8; 128] {
    let mut canonical = [0u8; 128];
    for (i, slot) in canonical.iter_mut().enumerate() {
        *slot = i as u8;
    }
    for group in similar.split_inclusive(|b| b & SIMILAR_GROUP_END != 0) {
        if let Some(first) = group.first() {
            for member in group {
                canonical[(member & !SIMILAR_GROUP_END) as usize] = first & !SIMILAR_GROUP_END;
            }
        }
    }
    canonical
}
