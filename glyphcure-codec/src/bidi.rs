//! bidi.rs - Bidi class runs and paired brackets for `bidi.bin`.
//!
//! License: MIT OR APACHE 2.0

use crate::errors::{check_batch, BuildError};
use crate::layout::{BidiClass, BRACKET_SIZE, BIDI_RUN_SIZE, encode_bidi_run, encode_bracket};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BidiRun {
    pub start: u32,
    pub end: u32,
    pub class: BidiClass,
}

/// Sorts the runs, drops `L` (the default), and merges adjacent runs of one class.
///
/// Overlapping runs are an error.
pub fn merge_runs(mut runs: Vec<(u32, u32, BidiClass)>) -> Result<Vec<BidiRun>, BuildError> {
    runs.sort_unstable_by_key(|&(start, _, _)| start);

    let mut errors = Vec::new();
    for pair in runs.windows(2) {
        if pair[1].0 <= pair[0].1 {
            errors.push(BuildError::InvalidBidi(pair[1].0, pair[1].1, "overlaps the previous run".to_string()));
        }
    }
    check_batch("Merging bidi runs", errors)?;

    let mut merged: Vec<BidiRun> = Vec::with_capacity(runs.len());
    for (start, end, class) in runs.into_iter().filter(|&(_, _, class)| class != BidiClass::L) {
        match merged.last_mut() {
            Some(last) if last.class == class && last.end + 1 == start => last.end = end,
            _ => merged.push(BidiRun { start, end, class }),
        }
    }

    Ok(merged)
}

/// Sorts bracket pairs by opening code point and rejects duplicates.
pub fn check_brackets(mut pairs: Vec<(u32, u32)>) -> Result<Vec<(u32, u32)>, BuildError> {
    pairs.sort_unstable();

    let mut errors = Vec::new();
    for pair in pairs.windows(2) {
        if pair[0].0 == pair[1].0 {
            errors.push(BuildError::InvalidBidi(pair[1].0, pair[1].1, "bracket opens two pairs".to_string()));
        }
    }
    for &(opening, closing) in &pairs {
        if opening == closing {
            errors.push(BuildError::InvalidBidi(opening, closing, "bracket pairs with itself".to_string()));
        }
    }
    check_batch("Checking bracket pairs", errors)?;

    Ok(pairs)
}

/// Serializes the run table and the bracket table.
pub fn encode_tables(runs: &[BidiRun], brackets: &[(u32, u32)]) -> (Vec<u8>, Vec<u8>) {
    let mut run_bytes = Vec::with_capacity(runs.len() * BIDI_RUN_SIZE);
    for run in runs {
        run_bytes.extend_from_slice(&encode_bidi_run(run.start, run.end, run.class));
    }

    let mut bracket_bytes = Vec::with_capacity(brackets.len() * BRACKET_SIZE);
    for &(opening, closing) in brackets {
        bracket_bytes.extend_from_slice(&encode_bracket(opening, closing));
    }

    (run_bytes, bracket_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_runs() {
        let runs = vec![
            (0x05D0, 0x05EA, BidiClass::R),
            (0x0590, 0x05CF, BidiClass::R),
            (0x0041, 0x005A, BidiClass::L),
            (0x0030, 0x0039, BidiClass::EN),
        ];
        let merged = merge_runs(runs).unwrap();
        assert_eq!(
            merged,
            vec![
                BidiRun { start: 0x30, end: 0x39, class: BidiClass::EN },
                BidiRun { start: 0x0590, end: 0x05EA, class: BidiClass::R },
            ]
        );
    }

    #[test]
    fn test_overlapping_runs_are_rejected() {
        let err = merge_runs(vec![(0x10, 0x20, BidiClass::ON), (0x20, 0x30, BidiClass::R)]).unwrap_err();
        assert!(err.to_string().contains("overlaps"));
    }

    #[test]
    fn test_brackets() {
        assert_eq!(check_brackets(vec![(0x5B, 0x5D), (0x28, 0x29)]).unwrap(), vec![(0x28, 0x29), (0x5B, 0x5D)]);
        assert!(check_brackets(vec![(0x28, 0x29), (0x28, 0x5D)]).is_err());
        assert!(check_brackets(vec![(0x28, 0x28)]).is_err());
    }
}
