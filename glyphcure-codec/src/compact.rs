//! compact.rs - Folds consecutive single-character records into ranges.
//!
//! Stylized alphabets map long contiguous blocks onto `a..z` or `0..9`, so a
//! run is either constant (every code point has the same translation) or
//! synced (the translation advances with the code point).
//!
//! License: MIT OR APACHE 2.0

use crate::layout::MAX_RANGE_SIZE;
use crate::record::{CodepointRecord, ExpandedRecord, Translation};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunKind {
    Single,
    Constant,
    Synced,
}

struct Run {
    record: CodepointRecord,
    kind: RunKind,
}

impl Run {
    fn start(expanded: &ExpandedRecord) -> Self {
        Self {
            record: CodepointRecord {
                codepoint: expanded.codepoint,
                translation: Translation::from_text(&expanded.translation),
                range_size: 0,
                synced: false,
                case_sensitive: expanded.case_sensitive,
                attributes: expanded.attributes,
            },
            kind: RunKind::Single,
        }
    }

    /// Extends the run with `next` when it continues it, returning whether it did.
    fn extend(&mut self, next: &ExpandedRecord) -> bool {
        let record = &mut self.record;
        let Translation::Char(first) = record.translation else {
            return false;
        };
        let next_ch = match next.translation.as_bytes() {
            [] => 0,
            [byte] => *byte,
            _ => return false,
        };

        if next.codepoint != record.last_codepoint() + 1
            || next.case_sensitive != record.case_sensitive
            || next.attributes != record.attributes
            || record.range_size >= MAX_RANGE_SIZE
        {
            return false;
        }

        let step = record.range_size as u32 + 1;
        let constant = next_ch == first;
        let synced = first != 0 && next_ch as u32 == first as u32 + step;

        let kind = match (self.kind, constant, synced) {
            (RunKind::Single | RunKind::Constant, true, _) => RunKind::Constant,
            (RunKind::Single | RunKind::Synced, _, true) => RunKind::Synced,
            _ => return false,
        };

        self.kind = kind;
        record.synced = kind == RunKind::Synced;
        record.range_size += 1;
        true
    }
}

/// Compacts sorted, collision-free records.
pub fn compact(records: &[ExpandedRecord]) -> Vec<CodepointRecord> {
    let mut out = Vec::new();
    let mut current: Option<Run> = None;

    for record in records {
        if let Some(run) = current.as_mut() {
            if run.extend(record) {
                continue;
            }
        }
        if let Some(run) = current.replace(Run::start(record)) {
            out.push(run.record);
        }
    }
    out.extend(current.map(|run| run.record));

    log::debug!("Compacted {} code points into {} records.", records.len(), out.len());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(codepoint: u32, translation: &str) -> ExpandedRecord {
        ExpandedRecord {
            codepoint,
            translation: translation.to_string(),
            case_sensitive: false,
            attributes: 0,
        }
    }

    #[test]
    fn test_synced_and_constant_runs() {
        let records = vec![
            rec(0x1D41A, "a"),
            rec(0x1D41B, "b"),
            rec(0x1D41C, "c"),
            rec(0x1D41D, "x"),
            rec(0x1D41E, "x"),
            rec(0x1D420, "x"),
        ];
        let compacted = compact(&records);
        assert_eq!(compacted.len(), 3);
        assert_eq!((compacted[0].range_size, compacted[0].synced), (2, true));
        assert_eq!((compacted[1].range_size, compacted[1].synced), (1, false));
        assert_eq!(compacted[1].translation, Translation::Char(b'x'));
        assert_eq!(compacted[2].codepoint, 0x1D420);
    }

    #[test]
    fn test_runs_never_mix_kinds_or_classes() {
        let mut upper = rec(0x102, "b");
        upper.case_sensitive = true;
        let records = vec![rec(0x100, "a"), rec(0x101, "a"), upper, rec(0x103, "dz"), rec(0x104, "")];
        let compacted = compact(&records);
        assert_eq!(compacted.len(), 4);
        assert_eq!(compacted[0].range_size, 1);
        assert!(compacted[1].case_sensitive);
        assert_eq!(compacted[2].translation, Translation::Str("dz".to_string()));
        assert_eq!(compacted[3].translation, Translation::Char(0));
    }

    #[test]
    fn test_long_runs_are_split() {
        let records: Vec<ExpandedRecord> = (0..300).map(|i| rec(0xE0100 + i, "")).collect();
        let compacted = compact(&records);
        assert_eq!(compacted.len(), 3);
        assert_eq!(compacted[0].range_size, MAX_RANGE_SIZE);
        assert_eq!(compacted[1].codepoint, 0xE0100 + 128);
        assert_eq!(compacted[2].last_codepoint(), 0xE0100 + 299);
    }
}
