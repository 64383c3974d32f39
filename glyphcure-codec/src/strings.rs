//! strings.rs - Interning of multi-character translations.
//!
//! Translations longer than one byte are stored once in a shared table and
//! referenced by offset and length. Strings are chained so that the suffix of
//! one doubles as the prefix of the next, which keeps the table well under its
//! 11-bit addressing limit.
//!
//! License: MIT OR APACHE 2.0

use std::collections::BTreeSet;

use crate::errors::BuildError;
use crate::layout::MAX_STRING_TABLE_LEN;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringTable {
    table: String,
}

/// Length of the longest suffix of `table` that is a proper prefix of `next`.
fn overlap(table: &str, next: &str) -> usize {
    (1..next.len())
        .rev()
        .find(|&len| table.ends_with(&next[..len]))
        .unwrap_or(0)
}

impl StringTable {
    pub fn build<'a, I>(strings: I) -> Result<Self, BuildError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let unique: BTreeSet<&str> = strings.into_iter().filter(|s| s.len() > 1).collect();

        // Strings contained in a longer one never need their own slot.
        let mut pending: Vec<&str> = unique
            .iter()
            .copied()
            .filter(|s| !unique.iter().any(|other| other.len() > s.len() && other.contains(s)))
            .collect();
        // Longest first gives the greedy chain better anchors.
        pending.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));

        let total: usize = pending.iter().map(|s| s.len()).sum();
        let mut table = String::new();

        while !pending.is_empty() {
            let (idx, shared) = pending
                .iter()
                .enumerate()
                .map(|(idx, s)| (idx, overlap(&table, s)))
                .fold((0, 0), |best, current| if current.1 > best.1 { current } else { best });
            let next = pending.remove(idx);
            if !table.contains(next) {
                table.push_str(&next[shared..]);
            }
        }

        if table.len() > MAX_STRING_TABLE_LEN {
            return Err(BuildError::StringTableOverflow(table.len(), MAX_STRING_TABLE_LEN));
        }

        log::debug!(
            "Interned {} distinct strings ({} bytes) into a {} byte table.",
            unique.len(),
            total,
            table.len()
        );
        Ok(Self { table })
    }

    /// Offset and length of `s` within the table.
    pub fn locate(&self, s: &str) -> Option<(u16, u8)> {
        let offset = self.table.find(s)?;
        Some((offset as u16, s.len() as u8))
    }

    pub fn as_str(&self) -> &str {
        &self.table
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlapping_strings_share_bytes() {
        let table = StringTable::build(["ae", "ij", "oe", "ijo", "oej", "a"]).unwrap();
        assert!(table.len() < "aeijijooeoej".len());
        for s in ["ae", "ij", "oe", "ijo", "oej"] {
            let (offset, len) = table.locate(s).unwrap();
            assert_eq!(&table.as_str()[offset as usize..offset as usize + len as usize], s);
        }
        assert_eq!(table.locate("a").map(|(_, len)| len), Some(1));
    }

    #[test]
    fn test_overflow_fails_loudly() {
        let strings: Vec<String> = (0..100).map(|i| format!("{:03}{}", i, "q".repeat(20))).collect();
        let err = StringTable::build(strings.iter().map(String::as_str)).unwrap_err();
        assert!(matches!(err, BuildError::StringTableOverflow(len, 0x7FF) if len > 0x7FF));
    }

    #[test]
    fn test_overlap() {
        assert_eq!(overlap("xxab", "abc"), 2);
        assert_eq!(overlap("xxa", "ab"), 1);
        assert_eq!(overlap("", "ab"), 0);
    }
}
