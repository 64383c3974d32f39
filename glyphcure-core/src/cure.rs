// glyphcure-core/src/cure.rs
//! The curing engine: per-code-point translation, output filters and the index map.
//!
//! Each input code point is cured independently. Bidi reordering, when it
//! applies, only changes the order in which code points are visited; the
//! index map still records the original bytes behind every output unit.
//! Explicit bidi controls are kept in the map as scopes around the text they
//! govern, and anything else reordering drops joins a neighbouring entry.
//!
//! License: MIT OR APACHE 2.0

use std::ops::Range;

use glyphcure_codec::layout::{bit, MAX_CODEPOINT};
use log::trace;

use crate::bidi;
use crate::database::Database;
use crate::errors::CureError;
use crate::index_map::IndexMap;
use crate::options::Options;
use crate::string::CuredString;
use crate::translation::Translation;

/// Control characters, surrogates, private use and everything past the
/// variation selectors always cure to nothing.
pub(crate) fn is_stripped(codepoint: u32) -> bool {
    matches!(codepoint, 0..=9 | 14..=31 | 127 | 0x80..=0x9F | 0xD800..=0xF8FF) || codepoint > MAX_CODEPOINT
}

impl<'a> Database<'a> {
    /// Cures a single code point. Bidi reordering and the output filters do not apply.
    pub fn cure_char(&self, ch: char, options: Options) -> Translation<'a> {
        let codepoint = ch as u32;
        if is_stripped(codepoint) {
            return Translation::None;
        }

        let retain_case = options.is_set(bit::RETAIN_CAPITALIZATION);
        let lower = ch.to_lowercase().next().unwrap_or(ch);
        let fallback = Translation::Character(if retain_case { ch } else { lower });
        if ch.is_ascii() {
            return fallback;
        }

        let found = self
            .lookup_case_sensitive(codepoint)
            .map(|record| (record, codepoint))
            .or_else(|| self.lookup_case_insensitive(lower as u32).map(|record| (record, lower as u32)));
        let Some((record, key)) = found else {
            return fallback;
        };
        if options.refuses(record.attributes()) {
            return fallback;
        }

        let translation = self.translation(&record, key);
        if retain_case && lower != ch {
            translation.to_ascii_uppercase()
        } else {
            translation
        }
    }

    /// Cures `text` against this database.
    pub fn cure(&'a self, text: &str, options: Options) -> CuredString<'a> {
        let (cured, index) = cure_text(self, text, options);
        CuredString::from_parts(self, options, text.to_string(), cured, index)
    }
}

struct Output<'d, 'a> {
    db: &'d Database<'a>,
    options: Options,
    text: String,
    index: IndexMap,
}

impl Output<'_, '_> {
    fn push(&mut self, ch: char) {
        if self.options.is_set(bit::ASCII_ONLY) && !ch.is_ascii() {
            return;
        }
        if self.options.is_set(bit::ALPHANUMERIC_ONLY) && !(ch.is_ascii_alphanumeric() || ch == ' ') {
            return;
        }
        if self.options.is_set(bit::PURE_HOMOGLYPH) {
            self.text.push(self.db.canonical_similar(ch));
        } else {
            self.text.push(ch);
        }
    }

    fn emit(&mut self, original: Range<usize>, translation: Translation<'_>) {
        let start = self.text.len();
        match translation {
            Translation::Character(ch) => self.push(ch),
            Translation::String(s) => s.chars().for_each(|ch| self.push(ch)),
            Translation::None => {}
        }

        if self.text.len() > start {
            self.index.push(start, original);
        } else {
            self.index.absorb(original);
        }
    }
}

/// Cures `text`, returning the cured string and its index map.
pub(crate) fn cure_text(db: &Database<'_>, text: &str, options: Options) -> (String, IndexMap) {
    let mut output = Output {
        db,
        options,
        text: String::with_capacity(text.len()),
        index: IndexMap::with_capacity(text.len()),
    };

    if !text.is_ascii() && !options.is_set(bit::DISABLE_BIDI) && bidi::needs_reordering(db, text) {
        let (offsets, chars): (Vec<usize>, Vec<char>) = text.char_indices().unzip();
        trace!("Reordering {} code points for display before curing.", chars.len());

        let span = |i: usize| offsets[i]..offsets[i] + chars[i].len_utf8();
        let boundary = |i: usize| offsets.get(i).copied().unwrap_or(text.len());

        let mut skipped = vec![true; chars.len()];
        for visual in bidi::reorder(db, &chars) {
            skipped[visual.index] = false;
            output.emit(span(visual.index), db.cure_char(visual.ch, options));
        }

        for scope in bidi::scopes(db, &chars) {
            skipped[scope.open] = false;
            let inner_start = span(scope.open).end;
            let (inner_end, outer_end) = match scope.close {
                Some(close) => {
                    skipped[close] = false;
                    (offsets[close], span(close).end)
                }
                None => (boundary(scope.end), boundary(scope.end)),
            };
            output.index.push_scope(offsets[scope.open]..outer_end, inner_start..inner_end);
        }

        // Whatever reordering dropped outside a scope is deleted text.
        let mut run: Option<Range<usize>> = None;
        for i in (0..chars.len()).filter(|&i| skipped[i]) {
            run = match run {
                Some(r) if r.end == offsets[i] => Some(r.start..span(i).end),
                Some(r) => {
                    output.index.attach(r);
                    Some(span(i))
                }
                None => Some(span(i)),
            };
        }
        if let Some(r) = run {
            output.index.attach(r);
        }
    } else {
        for (start, ch) in text.char_indices() {
            output.emit(start..start + ch.len_utf8(), db.cure_char(ch, options));
        }
    }

    (output.text, output.index)
}

/// Cures `text` with the embedded database.
///
/// ```rust
/// use glyphcure_core::{cure, Options};
///
/// let cured = cure("vＥⓡ𝔂 𝔽𝕌Ňℕｙ ţ乇𝕏𝓣", Options::default());
/// assert_eq!(cured, "very funny text");
/// ```
pub fn cure(text: &str, options: Options) -> CuredString<'static> {
    Database::embedded_or_empty().cure(text, options)
}

/// Cures one code point with the embedded database.
pub fn cure_char(ch: char, options: Options) -> Translation<'static> {
    Database::embedded_or_empty().cure_char(ch, options)
}

/// Cures raw bytes that must be UTF-8.
pub fn cure_bytes(bytes: &[u8], options: Options) -> Result<CuredString<'static>, CureError> {
    Ok(cure(std::str::from_utf8(bytes)?, options))
}

/// Cures UTF-16 code units. Unpaired surrogates are rejected with their position.
pub fn cure_utf16(units: &[u16], options: Options) -> Result<CuredString<'static>, CureError> {
    let mut text = String::with_capacity(units.len());
    let mut position = 0;
    for decoded in char::decode_utf16(units.iter().copied()) {
        match decoded {
            Ok(ch) => {
                position += ch.len_utf16();
                text.push(ch);
            }
            Err(e) => return Err(CureError::InvalidUtf16(e.unpaired_surrogate(), position)),
        }
    }
    Ok(cure(&text, options))
}
