//! unicode.rs - Readers for the UCD-format reference tables.
//!
//! The builder only needs a handful of Unicode properties: block names (to tag
//! records with the script a caller may choose to retain), canonical
//! decompositions and combining blocks (to tag diacritic forms), emoji
//! presentation, bidi classes and paired brackets. All tables use the
//! semicolon-separated UCD text format with `#` comments.
//!
//! License: MIT OR APACHE 2.0

use std::collections::BTreeMap;

use crate::errors::{check_batch, BuildError};
use crate::layout::{bit, BidiClass, ATTR_DIACRITIC, ATTR_SCRIPT_SHIFT, ATTR_TURKISH};

pub const BLOCKS_FILE: &str = "unicode/blocks.txt";
pub const BIDI_CLASSES_FILE: &str = "unicode/bidi_classes.txt";
pub const BIDI_BRACKETS_FILE: &str = "unicode/bidi_brackets.txt";
pub const DECOMPOSITIONS_FILE: &str = "unicode/decompositions.txt";
pub const EMOJI_FILE: &str = "unicode/emoji.txt";

/// A named block of code points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub start: u32,
    pub end: u32,
    pub name: String,
}

struct ScriptBlocks {
    bit: u8,
    include: &'static [&'static str],
    exclude: &'static [&'static str],
}

/// Block-name fragments per retainable script, in option-bit order.
/// The first entry whose fragments match wins.
const SCRIPT_BLOCKS: &[ScriptBlocks] = &[
    ScriptBlocks { bit: bit::RETAIN_GREEK, include: &["greek"], exclude: &["ancient"] },
    ScriptBlocks { bit: bit::RETAIN_CYRILLIC, include: &["cyrillic"], exclude: &[] },
    ScriptBlocks { bit: bit::RETAIN_HEBREW, include: &["hebrew"], exclude: &[] },
    ScriptBlocks { bit: bit::RETAIN_ARABIC, include: &["arabic"], exclude: &[] },
    ScriptBlocks { bit: bit::RETAIN_DEVANAGARI, include: &["devanagari"], exclude: &[] },
    ScriptBlocks { bit: bit::RETAIN_BENGALI, include: &["bengali"], exclude: &[] },
    ScriptBlocks { bit: bit::RETAIN_ARMENIAN, include: &["armenian"], exclude: &[] },
    ScriptBlocks { bit: bit::RETAIN_GUJARATI, include: &["gujarati"], exclude: &[] },
    ScriptBlocks { bit: bit::RETAIN_TAMIL, include: &["tamil"], exclude: &[] },
    ScriptBlocks { bit: bit::RETAIN_THAI, include: &["thai"], exclude: &[] },
    ScriptBlocks { bit: bit::RETAIN_LAO, include: &["lao"], exclude: &[] },
    ScriptBlocks { bit: bit::RETAIN_BURMESE, include: &["myanmar"], exclude: &[] },
    ScriptBlocks { bit: bit::RETAIN_KHMER, include: &["khmer"], exclude: &[] },
    ScriptBlocks { bit: bit::RETAIN_MONGOLIAN, include: &["mongolian"], exclude: &[] },
    ScriptBlocks { bit: bit::RETAIN_CHINESE, include: &["cjk", "kangxi"], exclude: &[] },
    ScriptBlocks { bit: bit::RETAIN_JAPANESE, include: &["hiragana", "katakana"], exclude: &[] },
    ScriptBlocks { bit: bit::RETAIN_KOREAN, include: &["hangul"], exclude: &[] },
    ScriptBlocks { bit: bit::RETAIN_BRAILLE, include: &["braille"], exclude: &[] },
];

/// Option bit of the retainable script a block belongs to.
pub fn script_bit(block_name: &str) -> Option<u8> {
    let name = block_name.to_ascii_lowercase();
    SCRIPT_BLOCKS
        .iter()
        .find(|script| {
            script.include.iter().any(|fragment| name.contains(fragment))
                && !script.exclude.iter().any(|fragment| name.contains(fragment))
        })
        .map(|script| script.bit)
}

/// Letters specific to the Turkish alphabet, in lowercase.
const TURKISH_LETTERS: [char; 6] = ['ç', 'ğ', 'ı', 'ö', 'ş', 'ü'];

pub fn is_turkish(codepoint: u32) -> bool {
    // İ lowercases to `i` followed by a combining dot, so it is listed by code point.
    codepoint == 0x130
        || char::from_u32(codepoint)
            .and_then(|c| c.to_lowercase().next())
            .is_some_and(|lower| TURKISH_LETTERS.contains(&lower))
}

/// Everything the builder reads from the Unicode reference tables.
#[derive(Debug, Clone, Default)]
pub struct Reference {
    pub blocks: Vec<Block>,
    /// Code point to the number of code points in its canonical decomposition.
    pub decompositions: BTreeMap<u32, usize>,
    pub emoji: Vec<(u32, u32)>,
    pub bidi_classes: Vec<(u32, u32, BidiClass)>,
    pub brackets: Vec<(u32, u32)>,
}

impl Reference {
    /// Parses every table, reporting the problems of all files together.
    pub fn from_texts(
        blocks: &str,
        bidi_classes: &str,
        bidi_brackets: &str,
        decompositions: &str,
        emoji: &str,
    ) -> Result<Self, BuildError> {
        let mut errors = Vec::new();
        let mut reference = Reference::default();

        match parse_blocks(blocks) {
            Ok(parsed) => reference.blocks = parsed,
            Err(mut e) => errors.append(&mut e),
        }
        match parse_bidi_classes(bidi_classes) {
            Ok(parsed) => reference.bidi_classes = parsed,
            Err(mut e) => errors.append(&mut e),
        }
        match parse_brackets(bidi_brackets) {
            Ok(parsed) => reference.brackets = parsed,
            Err(mut e) => errors.append(&mut e),
        }
        match parse_decompositions(decompositions) {
            Ok(parsed) => reference.decompositions = parsed,
            Err(mut e) => errors.append(&mut e),
        }
        match parse_emoji(emoji) {
            Ok(parsed) => reference.emoji = parsed,
            Err(mut e) => errors.append(&mut e),
        }

        check_batch("Parsing Unicode reference tables", errors)?;
        log::debug!(
            "Parsed {} blocks, {} bidi runs, {} bracket pairs, {} decompositions, {} emoji ranges.",
            reference.blocks.len(),
            reference.bidi_classes.len(),
            reference.brackets.len(),
            reference.decompositions.len(),
            reference.emoji.len()
        );
        Ok(reference)
    }

    pub fn block_name(&self, codepoint: u32) -> Option<&str> {
        let idx = self.blocks.partition_point(|block| block.end < codepoint);
        self.blocks
            .get(idx)
            .filter(|block| block.start <= codepoint)
            .map(|block| block.name.as_str())
    }

    pub fn is_emoji(&self, codepoint: u32) -> bool {
        let idx = self.emoji.partition_point(|&(_, end)| end < codepoint);
        self.emoji.get(idx).is_some_and(|&(start, _)| start <= codepoint)
    }

    /// Attribute byte of a record for `codepoint`.
    ///
    /// A script tag comes from the block name; the emoji tag is only used when
    /// no script matched. Diacritic and Turkish flags are independent bits.
    pub fn attributes(&self, codepoint: u32) -> u8 {
        let block = self.block_name(codepoint);
        let mut attributes = 0;

        let decomposes = self.decompositions.get(&codepoint).is_some_and(|&len| len >= 2);
        if decomposes || block.is_some_and(|name| name.contains("Combining")) {
            attributes |= ATTR_DIACRITIC;
        }
        if is_turkish(codepoint) {
            attributes |= ATTR_TURKISH;
        }

        let script = block
            .and_then(script_bit)
            .or_else(|| self.is_emoji(codepoint).then_some(bit::RETAIN_EMOJIS));
        if let Some(script) = script {
            attributes |= script << ATTR_SCRIPT_SHIFT;
        }

        attributes
    }
}

/// Yields `(line_number, fields)` for every non-comment line.
fn data_lines(text: &str) -> impl Iterator<Item = (usize, Vec<&str>)> {
    text.lines().enumerate().filter_map(|(idx, line)| {
        let data = line.split('#').next().unwrap_or("").trim();
        if data.is_empty() {
            None
        } else {
            Some((idx + 1, data.split(';').map(str::trim).collect()))
        }
    })
}

fn parse_codepoint(field: &str) -> Option<u32> {
    u32::from_str_radix(field, 16).ok().filter(|&cp| cp <= 0x10FFFF)
}

/// Parses `XXXX` or `XXXX..YYYY`.
fn parse_range(field: &str) -> Option<(u32, u32)> {
    match field.split_once("..") {
        Some((start, end)) => {
            let (start, end) = (parse_codepoint(start)?, parse_codepoint(end)?);
            (start <= end).then_some((start, end))
        }
        None => parse_codepoint(field).map(|cp| (cp, cp)),
    }
}

fn field<'a>(fields: &[&'a str], idx: usize) -> Option<&'a str> {
    fields.get(idx).copied().filter(|f| !f.is_empty())
}

pub fn parse_blocks(text: &str) -> Result<Vec<Block>, Vec<BuildError>> {
    let mut blocks = Vec::new();
    let mut errors = Vec::new();

    for (line, fields) in data_lines(text) {
        match (field(&fields, 0).and_then(parse_range), field(&fields, 1)) {
            (Some((start, end)), Some(name)) => blocks.push(Block { start, end, name: name.to_string() }),
            _ => errors.push(BuildError::parse(BLOCKS_FILE, line, "expected `start..end; name`")),
        }
    }

    blocks.sort_by_key(|block| block.start);
    for pair in blocks.windows(2) {
        if pair[1].start <= pair[0].end {
            errors.push(BuildError::parse(
                BLOCKS_FILE,
                0,
                format!("block '{}' overlaps '{}'", pair[1].name, pair[0].name),
            ));
        }
    }

    if errors.is_empty() { Ok(blocks) } else { Err(errors) }
}

pub fn parse_bidi_classes(text: &str) -> Result<Vec<(u32, u32, BidiClass)>, Vec<BuildError>> {
    let mut runs = Vec::new();
    let mut errors = Vec::new();

    for (line, fields) in data_lines(text) {
        let range = field(&fields, 0).and_then(parse_range);
        let class = field(&fields, 1).and_then(BidiClass::from_name);
        match (range, class) {
            (Some((start, end)), Some(class)) => runs.push((start, end, class)),
            (None, _) => errors.push(BuildError::parse(BIDI_CLASSES_FILE, line, "invalid code point range")),
            (_, None) => errors.push(BuildError::parse(
                BIDI_CLASSES_FILE,
                line,
                format!("unknown bidi class {:?}", fields.get(1).unwrap_or(&"")),
            )),
        }
    }

    if errors.is_empty() { Ok(runs) } else { Err(errors) }
}

pub fn parse_brackets(text: &str) -> Result<Vec<(u32, u32)>, Vec<BuildError>> {
    let mut pairs = Vec::new();
    let mut errors = Vec::new();

    for (line, fields) in data_lines(text) {
        let opening = field(&fields, 0).and_then(parse_codepoint);
        let closing = field(&fields, 1).and_then(parse_codepoint);
        match (opening, closing, field(&fields, 2)) {
            (Some(opening), Some(closing), Some("o")) => pairs.push((opening, closing)),
            // Closing entries repeat the pair from the other side.
            (Some(_), Some(_), Some("c")) => {}
            _ => errors.push(BuildError::parse(BIDI_BRACKETS_FILE, line, "expected `opening; closing; o|c`")),
        }
    }

    if errors.is_empty() { Ok(pairs) } else { Err(errors) }
}

pub fn parse_decompositions(text: &str) -> Result<BTreeMap<u32, usize>, Vec<BuildError>> {
    let mut decompositions = BTreeMap::new();
    let mut errors = Vec::new();

    for (line, fields) in data_lines(text) {
        let codepoint = field(&fields, 0).and_then(parse_codepoint);
        let parts = field(&fields, 1).map(|d| {
            d.split_whitespace()
                .map(parse_codepoint)
                .collect::<Option<Vec<u32>>>()
        });
        match (codepoint, parts) {
            (Some(cp), Some(Some(parts))) if !parts.is_empty() => {
                decompositions.insert(cp, parts.len());
            }
            _ => errors.push(BuildError::parse(DECOMPOSITIONS_FILE, line, "expected `codepoint; decomposition`")),
        }
    }

    if errors.is_empty() { Ok(decompositions) } else { Err(errors) }
}

pub fn parse_emoji(text: &str) -> Result<Vec<(u32, u32)>, Vec<BuildError>> {
    let mut ranges = Vec::new();
    let mut errors = Vec::new();

    for (line, fields) in data_lines(text) {
        match field(&fields, 0).and_then(parse_range) {
            Some(range) => ranges.push(range),
            None => errors.push(BuildError::parse(EMOJI_FILE, line, "invalid code point range")),
        }
    }

    ranges.sort_unstable();
    if errors.is_empty() { Ok(ranges) } else { Err(errors) }
}
