// glyphcure-core/src/leetspeak.rs
//! Multi-character ASCII art that stands in for a single letter, such as `|-|` for `h`.
//!
//! Single-character substitutes (`4` for `a`, `$` for `s`) are covered by the
//! similar groups in the database; this module only handles sequences.

use lazy_static::lazy_static;
use log::warn;
use regex::bytes::{Regex, RegexBuilder};

const PATTERNS: [(char, &str); 21] = [
    ('a', r"/-*\\|/\\"),
    ('b', r"\|3|\]3|13|\|o"),
    ('d', r"\|\)|\|>|\[\)|cl"),
    ('f', r"\|=|ph"),
    ('h', r"\|-\||\]-\[|\}\{|#"),
    ('j', r"_\||_/"),
    ('k', r"\|<|\|\{"),
    ('l', r"\|_"),
    ('m', r"/\\/\\|\|\\/\||\|v\||rn"),
    ('n', r"/\\/|\|\\\||\^/"),
    ('o', r"\(\)|\[\]"),
    ('p', r"\|\*|\|o|\|>"),
    ('q', r"\(,\)|0_"),
    ('r', r"\|2|\|\?"),
    ('t', r"-\|-|~\|~"),
    ('u', r"\|_\||\(_\)"),
    ('v', r"\\/"),
    ('w', r"\\/\\/|vv|\\\^/"),
    ('x', r"><|\}\{"),
    ('y', r"`/|\\\|/"),
    ('z', r"-/_|7_"),
];

lazy_static! {
    /// One anchored pattern per ASCII letter, indexed from `a`.
    static ref LEETSPEAK: Vec<Option<Regex>> = {
        let mut table: Vec<Option<Regex>> = vec![None; 26];
        for (letter, pattern) in PATTERNS {
            let anchored = format!("^(?:{})", pattern);
            match RegexBuilder::new(&anchored).unicode(false).size_limit(1 << 20).build() {
                Ok(regex) => table[(letter as u8 - b'a') as usize] = Some(regex),
                Err(e) => warn!("Leetspeak pattern for '{}' failed to compile: {}", letter, e),
            }
        }
        table
    };
}

/// Length in bytes of a leetspeak form of `letter` at the start of `haystack`.
pub(crate) fn find(haystack: &[u8], letter: char) -> Option<usize> {
    if !letter.is_ascii_lowercase() {
        return None;
    }
    LEETSPEAK[(letter as u8 - b'a') as usize]
        .as_ref()?
        .find(haystack)
        .map(|m| m.end())
}
