// glyphcure-core/src/string.rs
//! [`CuredString`]: cured text that remembers where it came from.
//!
//! Comparisons run against the cured text. Replacements and censoring locate
//! matches in the cured text, map them back through the index map, rewrite the
//! original and cure it again with the same options, so the cured text and
//! the original never drift apart. Only the original bytes that produced a
//! match are rewritten, so text that bidi reordering moved between the pieces
//! of a match is left alone.
//!
//! Serializing a [`CuredString`] writes the cured text. Deserializing cures
//! the incoming string with the embedded database and default options.
//!
//! License: MIT OR APACHE 2.0

use std::fmt;
use std::ops::{Deref, Range};

use glyphcure_codec::layout::bit;
use log::debug;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::cure::{cure, cure_text};
use crate::database::Database;
use crate::index_map::{IndexMap, OriginalSpan};
use crate::matcher::{merge_ranges, Matcher};
use crate::options::Options;

/// The result of curing a string.
#[derive(Clone)]
pub struct CuredString<'db> {
    db: &'db Database<'db>,
    options: Options,
    original: String,
    cured: String,
    index: IndexMap,
    leetspeak: bool,
}

/// How a matched span of the original is rewritten.
#[derive(Debug, Clone, Copy)]
enum Rewrite<'a> {
    /// The whole match becomes this text.
    Replace(&'a str),
    /// Every cured character of the match becomes this character.
    Censor(char),
}

impl<'db> CuredString<'db> {
    pub(crate) fn from_parts(
        db: &'db Database<'db>,
        options: Options,
        original: String,
        cured: String,
        index: IndexMap,
    ) -> Self {
        let leetspeak = !options.is_set(bit::DISABLE_LEETSPEAK);
        Self { db, options, original, cured, index, leetspeak }
    }

    pub fn as_str(&self) -> &str {
        &self.cured
    }

    /// The text this was cured from, including any replacements applied since.
    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn options(&self) -> Options {
        self.options
    }

    pub fn index_map(&self) -> &IndexMap {
        &self.index
    }

    pub fn into_string(self) -> String {
        self.cured
    }

    /// Byte range of the original text behind a byte range of the cured text.
    ///
    /// A range reaching inside a bidi embedding, override or isolate takes in
    /// the whole of it, controls included.
    pub fn to_original_range(&self, cured: Range<usize>) -> Range<usize> {
        self.index.to_original(cured)
    }

    fn matcher<'s>(&'s self, needle: &str) -> Matcher<'s> {
        Matcher::new(self.db, &self.cured, needle, self.leetspeak)
    }

    /// Turns leetspeak matching off (or back on) for this string's comparisons,
    /// regardless of the options it was cured with.
    pub fn disable_leetspeak(&mut self, switch: bool) {
        self.leetspeak = !switch;
    }

    /// Matches of `needle`, as byte ranges of the cured text.
    pub fn find<'s>(&'s self, needle: &str) -> Matcher<'s> {
        self.matcher(needle)
    }

    /// Matches of every needle, sorted and with overlapping ranges merged.
    pub fn find_multiple<S: AsRef<str>>(&self, needles: &[S]) -> Vec<Range<usize>> {
        let ranges = needles
            .iter()
            .flat_map(|needle| self.matcher(needle.as_ref()))
            .collect();
        merge_ranges(ranges)
    }

    pub fn equals(&self, other: &str) -> bool {
        self.matcher(other).is_equal()
    }

    pub fn starts_with(&self, other: &str) -> bool {
        self.matcher(other).is_prefix()
    }

    pub fn ends_with(&self, other: &str) -> bool {
        self.matcher(other).is_suffix()
    }

    pub fn contains(&self, other: &str) -> bool {
        self.matcher(other).next().is_some()
    }

    /// Replaces every match of `needle` in the original text with `with`.
    pub fn replace(&mut self, needle: &str, with: &str) {
        let matches: Vec<_> = self.matcher(needle).collect();
        self.rewrite(matches, Rewrite::Replace(with));
    }

    pub fn replace_multiple<S: AsRef<str>>(&mut self, needles: &[S], with: &str) {
        let matches = self.find_multiple(needles);
        self.rewrite(matches, Rewrite::Replace(with));
    }

    /// Overwrites every match of `needle` in the original text with `with`,
    /// repeated once per cured character each original span produced.
    pub fn censor(&mut self, needle: &str, with: char) {
        let matches: Vec<_> = self.matcher(needle).collect();
        self.rewrite(matches, Rewrite::Censor(with));
    }

    pub fn censor_multiple<S: AsRef<str>>(&mut self, needles: &[S], with: char) {
        let matches = self.find_multiple(needles);
        self.rewrite(matches, Rewrite::Censor(with));
    }

    /// The replacement text for each original span behind one match.
    fn span_edits(&self, spans: Vec<OriginalSpan>, rewrite: Rewrite<'_>) -> Vec<(Range<usize>, String)> {
        let lead = spans
            .iter()
            .enumerate()
            .min_by_key(|(_, span)| span.first_cured())
            .map(|(i, _)| i);

        spans
            .into_iter()
            .enumerate()
            .map(|(i, span)| {
                let text = match rewrite {
                    Rewrite::Replace(with) if Some(i) == lead => with.to_string(),
                    Rewrite::Replace(_) => String::new(),
                    Rewrite::Censor(ch) => {
                        let count: usize = span.cured.iter().map(|r| self.cured[r.clone()].chars().count()).sum();
                        std::iter::repeat(ch).take(count).collect()
                    }
                };
                (span.original, text)
            })
            .collect()
    }

    fn rewrite(&mut self, matches: Vec<Range<usize>>, rewrite: Rewrite<'_>) {
        if matches.is_empty() {
            return;
        }

        let mut spans: Vec<(Range<usize>, String)> = matches
            .into_iter()
            .flat_map(|cured| self.span_edits(self.index.to_original_spans(cured), rewrite))
            .collect();
        spans.sort_by_key(|(range, _)| range.start);

        // Overlapping matches can share original bytes.
        let mut merged: Vec<(Range<usize>, String)> = Vec::with_capacity(spans.len());
        for (range, text) in spans {
            match merged.last_mut() {
                Some((last, last_text)) if range.start < last.end => {
                    last.end = last.end.max(range.end);
                    last_text.push_str(&text);
                }
                _ => merged.push((range, text)),
            }
        }
        debug!("Rewriting {} span(s) of the original text.", merged.len());

        let mut original = std::mem::take(&mut self.original);
        for (range, text) in merged.iter().rev() {
            original.replace_range(range.clone(), text);
        }

        let (cured, index) = cure_text(self.db, &original, self.options);
        self.original = original;
        self.cured = cured;
        self.index = index;
    }
}

impl Deref for CuredString<'_> {
    type Target = str;

    fn deref(&self) -> &str {
        &self.cured
    }
}

impl AsRef<str> for CuredString<'_> {
    fn as_ref(&self) -> &str {
        &self.cured
    }
}

impl fmt::Display for CuredString<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.cured)
    }
}

impl fmt::Debug for CuredString<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CuredString")
            .field("cured", &self.cured)
            .field("original", &self.original)
            .field("options", &self.options)
            .finish()
    }
}

impl From<CuredString<'_>> for String {
    fn from(cured: CuredString<'_>) -> Self {
        cured.cured
    }
}

impl Serialize for CuredString<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.cured)
    }
}

impl<'de> Deserialize<'de> for CuredString<'static> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        Ok(cure(&text, Options::default()))
    }
}

impl PartialEq<str> for CuredString<'_> {
    fn eq(&self, other: &str) -> bool {
        self.equals(other)
    }
}

impl PartialEq<&str> for CuredString<'_> {
    fn eq(&self, other: &&str) -> bool {
        self.equals(other)
    }
}

impl PartialEq<String> for CuredString<'_> {
    fn eq(&self, other: &String) -> bool {
        self.equals(other)
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    use crate::{cure, cure_char, CuredString, Options, Translation};

    #[test]
    fn test_find_returns_cured_ranges() {
        let cured = cure("vＥⓡ𝔂 𝔽𝕌Ňℕｙ ţ乇𝕏𝓣", Options::default());
        assert_eq!(cured.find("funny").collect::<Vec<_>>(), vec![5..10]);
        assert_eq!(cured.to_original_range(5..10), 12..28);
        assert_eq!(&cured.original()[12..28], "𝔽𝕌Ňℕｙ");
    }

    #[test]
    fn test_censor_rewrites_original() {
        let mut cured = cure("vＥⓡ𝔂 𝔽𝕌Ňℕｙ ţ乇𝕏𝓣", Options::default());
        cured.censor("funny", '*');
        assert_eq!(cured.original(), "vＥⓡ𝔂 ***** ţ乇𝕏𝓣");
        assert_eq!(cured.as_str(), "very ***** text");
    }

    #[test]
    fn test_replace_and_multiple() {
        let mut cured = cure("ａ ｂａｄ, ｂａｄ ｗｏｒｄ", Options::default());
        cured.replace("bad", "good");
        assert_eq!(cured.original(), "ａ good, good ｗｏｒｄ");
        assert_eq!(cured, "a good, good word");

        let mut cured = cure("one Ｔｗｏ three", Options::default());
        cured.censor_multiple(&["two", "three"], '#');
        assert_eq!(cured.original(), "one ### #####");

        let mut cured = cure("one Ｔｗｏ three", Options::default());
        cured.replace_multiple(&["one", "three"], "x");
        assert_eq!(cured.original(), "x Ｔｗｏ x");
    }

    #[test]
    fn test_no_match_leaves_text_alone() {
        let mut cured = cure("Ｈｅｌｌｏ", Options::default());
        cured.replace("bye", "x");
        assert_eq!(cured.original(), "Ｈｅｌｌｏ");
        assert_eq!(cured.as_str(), "hello");
    }

    #[test]
    fn test_comparisons() {
        let cured = cure("Ｈｅｌｌｏ, Ｗｏｒｌｄ", Options::default());
        assert!(cured.starts_with("hello"));
        assert!(cured.ends_with("world"));
        assert!(cured.contains("lo, w"));
        assert!(!cured.equals("hello"));
        assert_eq!(cured, "hello, world");
        assert_eq!(cured.find_multiple(&["hello", "ello", "world"]), vec![0..5, 7..12]);
    }

    #[test]
    fn test_censor_leaves_reordered_text_alone() {
        // "abc" under a right-to-left override displays as "cba".
        let mut cured = cure("x\u{202E}abc\u{202C}y", Options::default());
        assert_eq!(cured.as_str(), "xcbay");
        assert_eq!(cured.find("xc").collect::<Vec<_>>(), vec![0..2]);

        cured.censor("xc", '*');
        assert_eq!(cured.original(), "*\u{202E}ab*\u{202C}y");
        assert_eq!(cured.as_str(), "**bay");
    }

    #[test]
    fn test_replace_across_reordered_pieces() {
        let mut cured = cure("x\u{202E}abc\u{202C}y", Options::default());
        cured.replace("xc", "Q");
        assert_eq!(cured.original(), "Q\u{202E}ab\u{202C}y");
        assert_eq!(cured.as_str(), "qbay");
    }

    #[test]
    fn test_range_inside_override_takes_in_its_controls() {
        let cured = cure("x\u{202E}abc\u{202C}y", Options::default());
        assert_eq!(cured.to_original_range(1..4), 1..10);
        assert_eq!(cure(&cured.original()[1..10], Options::default()), "cba");
    }

    #[test]
    fn test_censored_text_does_not_match_x() {
        let mut cured = cure("vＥⓡ𝔂 𝔽𝕌Ňℕｙ ţ乇𝕏𝓣", Options::default());
        cured.censor("funny", '*');
        assert!(!cured.contains("xxxxx"));

        let mut cured = cure("a ***** b", Options::default());
        cured.censor("xxx", '#');
        assert_eq!(cured.original(), "a ***** b");
        assert_eq!(cured.as_str(), "a ***** b");
    }

    #[test]
    fn test_disable_leetspeak_per_string() {
        let mut cured = cure("|-|ello", Options::default());
        assert!(cured.equals("hello"));

        cured.disable_leetspeak(true);
        assert!(!cured.equals("hello"));
        assert!(cured.equals("|-|ello"));

        cured.disable_leetspeak(false);
        assert!(cured.contains("hello"));

        let mut cured = cure("|-|ello", Options::default().disable_leetspeak());
        assert!(!cured.equals("hello"));
        cured.disable_leetspeak(false);
        assert!(cured.equals("hello"));
    }

    #[derive(Serialize, Deserialize)]
    struct Moderated {
        cured_string: CuredString<'static>,
        translation: Translation<'static>,
    }

    #[test]
    fn test_serialize_writes_cured_text() {
        let moderated = Moderated {
            cured_string: cure("vＥⓡ𝔂 𝔽𝕌Ňℕｙ ţ乇𝕏𝓣", Options::default()),
            translation: cure_char('ß', Options::default()).into_owned(),
        };
        assert_eq!(
            serde_json::to_string(&moderated).unwrap(),
            r#"{"cured_string":"very funny text","translation":"ss"}"#
        );
    }

    #[test]
    fn test_deserialize_cures_input() {
        let json = r#"{"cured_string": "vＥⓡ𝔂 𝔽𝕌Ňℕｙ ţ乇𝕏𝓣", "translation": "ß"}"#;
        let moderated: Moderated = serde_json::from_str(json).unwrap();
        assert_eq!(moderated.cured_string, "very funny text");
        assert_eq!(moderated.cured_string.original(), "vＥⓡ𝔂 𝔽𝕌Ňℕｙ ţ乇𝕏𝓣");
        assert_eq!(moderated.translation, "ss");
    }
}
