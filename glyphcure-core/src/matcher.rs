// glyphcure-core/src/matcher.rs
//! Fuzzy search of a needle inside cured text.
//!
//! Matching is case-insensitive and treats members of one similar group as
//! equal. A needle character may also be written in leetspeak, and may repeat
//! (`heeello` matches `hello`). Matches are reported as byte ranges of the
//! cured haystack, leftmost first and never overlapping.
//!
//! License: MIT OR APACHE 2.0

use std::ops::Range;

use crate::database::Database;
use crate::leetspeak;

/// Iterator over the matches of one needle.
#[derive(Debug, Clone)]
pub struct Matcher<'a> {
    db: &'a Database<'a>,
    haystack: &'a str,
    needle: Vec<char>,
    position: usize,
    leetspeak: bool,
}

impl<'a> Matcher<'a> {
    pub fn new(db: &'a Database<'a>, haystack: &'a str, needle: &str, leetspeak: bool) -> Self {
        Self {
            db,
            haystack,
            needle: needle.chars().flat_map(char::to_lowercase).collect(),
            position: 0,
            leetspeak,
        }
    }

    /// Whether the whole haystack matches the needle.
    pub fn is_equal(mut self) -> bool {
        let len = self.haystack.len();
        self.match_at(0) == Some(len)
    }

    pub fn is_prefix(mut self) -> bool {
        self.match_at(0).is_some()
    }

    pub fn is_suffix(self) -> bool {
        let len = self.haystack.len();
        self.last().is_some_and(|m| m.end == len)
    }

    /// Byte length of the haystack character at `position` if it matches `expected`.
    fn step(&self, position: usize, expected: char) -> Option<usize> {
        let rest = self.haystack.get(position..)?;
        let found = rest.chars().next()?;

        let lower = found.to_lowercase().next().unwrap_or(found);
        if self.db.is_similar(lower, expected) {
            return Some(position + found.len_utf8());
        }

        if self.leetspeak {
            if let Some(len) = leetspeak::find(rest.as_bytes(), expected) {
                return Some(position + len);
            }
        }
        None
    }

    /// End of the match starting exactly at `start`.
    ///
    /// Each haystack character either advances to the next needle character or
    /// repeats the current one, preferring to advance.
    fn match_at(&mut self, start: usize) -> Option<usize> {
        let first = *self.needle.first()?;
        let mut position = self.step(start, first)?;
        let mut current = 0;

        loop {
            if let Some(&next) = self.needle.get(current + 1) {
                if let Some(end) = self.step(position, next) {
                    position = end;
                    current += 1;
                    continue;
                }
            }
            match self.step(position, self.needle[current]) {
                Some(end) => position = end,
                None => break,
            }
        }

        (current + 1 == self.needle.len()).then_some(position)
    }
}

impl Iterator for Matcher<'_> {
    type Item = Range<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.position < self.haystack.len() {
            let start = self.position;
            if let Some(end) = self.match_at(start) {
                self.position = end;
                return Some(start..end);
            }
            self.position += self.haystack[start..].chars().next().map_or(1, char::len_utf8);
        }
        None
    }
}

/// Sorts `ranges` and merges the ones that overlap or touch.
pub fn merge_ranges(mut ranges: Vec<Range<usize>>) -> Vec<Range<usize>> {
    ranges.sort_unstable_by_key(|range| (range.start, range.end));

    let mut merged: Vec<Range<usize>> = Vec::with_capacity(ranges.len());
    for range in ranges {
        match merged.last_mut() {
            Some(last) if range.start <= last.end => last.end = last.end.max(range.end),
            _ => merged.push(range),
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches(haystack: &str, needle: &str) -> Vec<Range<usize>> {
        Matcher::new(Database::embedded().unwrap(), haystack, needle, true).collect()
    }

    #[test]
    fn test_plain_matches() {
        assert_eq!(matches("very funny text", "funny"), vec![5..10]);
        assert_eq!(matches("no match here", "funny"), Vec::<Range<usize>>::new());
        assert_eq!(matches("abcabc", "abc"), vec![0..3, 3..6]);
    }

    #[test]
    fn test_similar_and_repeated_characters() {
        assert_eq!(matches("this is a piece of $h1t", "shit"), vec![19..23]);
        assert_eq!(matches("heeellllo", "hello"), vec![0..9]);
        assert_eq!(matches("helo", "hello"), Vec::<Range<usize>>::new());
        assert_eq!(matches("f00", "FOO"), vec![0..3]);
    }

    #[test]
    fn test_leetspeak_sequences() {
        assert_eq!(matches("|-|ello", "hello"), vec![0..7]);
        let db = Database::embedded().unwrap();
        assert_eq!(Matcher::new(db, "|-|ello", "hello", false).count(), 0);
    }

    #[test]
    fn test_predicates() {
        let db = Database::embedded().unwrap();
        assert!(Matcher::new(db, "hello", "hello", true).is_equal());
        assert!(!Matcher::new(db, "hello world", "hello", true).is_equal());
        assert!(Matcher::new(db, "hello world", "hello", true).is_prefix());
        assert!(Matcher::new(db, "hello world", "w0rld", true).is_suffix());
        assert!(!Matcher::new(db, "hello world", "hello", true).is_suffix());
    }

    #[test]
    fn test_empty_needle_never_matches() {
        assert_eq!(matches("anything", ""), Vec::<Range<usize>>::new());
        let db = Database::embedded().unwrap();
        assert!(!Matcher::new(db, "", "", true).is_equal());
    }

    #[test]
    fn test_merge_ranges() {
        assert_eq!(merge_ranges(vec![5..8, 0..2, 1..3, 8..9, 12..13]), vec![0..3, 5..9, 12..13]);
        assert_eq!(merge_ranges(Vec::new()), Vec::<Range<usize>>::new());
    }
}
