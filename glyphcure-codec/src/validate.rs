//! validate.rs - Range expansion and integrity checks over the source records.
//!
//! License: MIT OR APACHE 2.0

use std::collections::{BTreeMap, HashSet};

use log::{debug, warn};

use crate::errors::{check_batch, BuildError};
use crate::layout::{MAX_CODEPOINT, MAX_STRING_LEN};
use crate::record::{ExpandedRecord, SourceSet};
use crate::unicode::Reference;

/// Code points a record may describe. Anything else is either ASCII, a control
/// character, a surrogate, private use, or stripped unconditionally at run time.
pub fn is_allowed(codepoint: u32) -> bool {
    codepoint > 0x9F && !(0xD800..=0xF8FF).contains(&codepoint) && codepoint <= MAX_CODEPOINT
}

/// Whether lowercasing changes the code point. Such records go to the case-sensitive table.
pub fn is_case_sensitive(codepoint: u32) -> bool {
    char::from_u32(codepoint).is_some_and(|c| c.to_lowercase().next() != Some(c))
}

fn lowercase(codepoint: u32) -> u32 {
    char::from_u32(codepoint)
        .and_then(|c| c.to_lowercase().next())
        .map_or(codepoint, |c| c as u32)
}

/// Printable ASCII other than uppercase letters.
pub fn is_translation_byte(byte: u8) -> bool {
    (0x20..=0x7E).contains(&byte) && !byte.is_ascii_uppercase()
}

/// Expands every source record to one entry per code point, sorted by code point.
///
/// Code points outside [`is_allowed`] are skipped with a warning. Every other
/// problem is collected and returned as one error.
pub fn expand(source: &SourceSet, reference: &Reference) -> Result<Vec<ExpandedRecord>, BuildError> {
    let mut expanded = Vec::with_capacity(source.codepoints.len());
    let mut errors = Vec::new();
    let mut skipped = 0usize;

    for record in &source.codepoints {
        let first = record.codepoint;
        let last = record.range_until.unwrap_or(first);
        if last < first {
            errors.push(BuildError::InvalidRange(first, last));
            continue;
        }

        let translation = record.translation.as_bytes();
        if !translation.iter().all(|&b| is_translation_byte(b)) {
            errors.push(BuildError::InvalidTranslation(first, record.translation.clone()));
            continue;
        }
        if translation.len() > MAX_STRING_LEN {
            errors.push(BuildError::TranslationTooLong(first, translation.len(), MAX_STRING_LEN));
            continue;
        }

        let synced = record.synced_translation && translation.len() == 1;
        if synced {
            let top = translation[0] as u32 + (last - first);
            if top > 0x7E || (translation[0]..=top as u8).any(|b| b.is_ascii_uppercase()) {
                errors.push(BuildError::SyncedOverflow(first, record.translation.clone()));
                continue;
            }
        }

        for codepoint in first..=last {
            if !is_allowed(codepoint) {
                warn!("Skipping codepoint {:#06x}: not in the allowed code point set.", codepoint);
                skipped += 1;
                continue;
            }

            let translation = if synced {
                ((translation[0] as u32 + (codepoint - first)) as u8 as char).to_string()
            } else {
                record.translation.clone()
            };

            expanded.push(ExpandedRecord {
                codepoint,
                translation,
                case_sensitive: is_case_sensitive(codepoint),
                attributes: reference.attributes(codepoint),
            });
        }
    }

    expanded.sort_by_key(|record| record.codepoint);

    errors.extend(collisions(&expanded));
    errors.extend(case_sensitive_collisions(&expanded));
    check_batch("Validating source records", errors)?;

    debug!(
        "Expanded {} source records into {} code points ({} skipped).",
        source.codepoints.len(),
        expanded.len(),
        skipped
    );
    Ok(expanded)
}

/// Every code point defined more than once. `records` must be sorted.
fn collisions(records: &[ExpandedRecord]) -> Vec<BuildError> {
    let mut counts: BTreeMap<u32, usize> = BTreeMap::new();
    for pair in records.windows(2) {
        if pair[0].codepoint == pair[1].codepoint {
            *counts.entry(pair[0].codepoint).or_insert(1) += 1;
        }
    }

    counts
        .into_iter()
        .map(|(codepoint, count)| BuildError::Collision(codepoint, count))
        .collect()
}

/// Case-sensitive records that say nothing their lowercase form does not already say.
fn case_sensitive_collisions(records: &[ExpandedRecord]) -> Vec<BuildError> {
    let mut errors = Vec::new();

    for record in records.iter().filter(|r| r.case_sensitive) {
        let lower = lowercase(record.codepoint);
        let idx = records.partition_point(|r| r.codepoint < lower);
        if let Some(counterpart) = records.get(idx).filter(|r| r.codepoint == lower) {
            if counterpart.translation == record.translation {
                errors.push(BuildError::CaseSensitiveCollision(
                    record.codepoint,
                    record.translation.clone(),
                    lower,
                ));
            }
        }
    }

    errors
}

/// Checks the similar groups and returns them as byte groups.
pub fn similar_groups(source: &SourceSet) -> Result<Vec<Vec<u8>>, BuildError> {
    let mut groups = Vec::with_capacity(source.similar.len());
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for (idx, group) in source.similar.iter().enumerate() {
        if group.len() < 2 {
            errors.push(BuildError::InvalidSimilarGroup(idx, "needs at least two members".to_string()));
            continue;
        }

        let mut bytes = Vec::with_capacity(group.len());
        for member in group {
            match member.as_bytes() {
                [byte] if is_translation_byte(*byte) => {
                    if !seen.insert(*byte) {
                        errors.push(BuildError::InvalidSimilarGroup(
                            idx,
                            format!("{:?} already belongs to another group", member),
                        ));
                    }
                    bytes.push(*byte);
                }
                _ => errors.push(BuildError::InvalidSimilarGroup(
                    idx,
                    format!("{:?} is not a single printable lowercase ASCII character", member),
                )),
            }
        }
        groups.push(bytes);
    }

    check_batch("Validating similar groups", errors)?;
    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::SourceRecord;

    fn source(codepoints: Vec<SourceRecord>) -> SourceSet {
        SourceSet { codepoints, similar: Vec::new() }
    }

    #[test]
    fn test_allowed_set() {
        assert!(!is_allowed(0x41));
        assert!(!is_allowed(0x85));
        assert!(is_allowed(0xA0));
        assert!(!is_allowed(0xE000));
        assert!(is_allowed(0xE01EF));
        assert!(!is_allowed(0xE01F0));
    }

    #[test]
    fn test_expand_synced_range() {
        let mut record = SourceRecord::single(0xFF41, "a");
        record.range_until = Some(0xFF43);
        record.synced_translation = true;
        let expanded = expand(&source(vec![record]), &Reference::default()).unwrap();
        let translations: Vec<&str> = expanded.iter().map(|r| r.translation.as_str()).collect();
        assert_eq!(translations, ["a", "b", "c"]);
    }

    #[test]
    fn test_expand_skips_disallowed_codepoints() {
        let mut record = SourceRecord::single(0x9E, "");
        record.range_until = Some(0xA1);
        let expanded = expand(&source(vec![record]), &Reference::default()).unwrap();
        let codepoints: Vec<u32> = expanded.iter().map(|r| r.codepoint).collect();
        assert_eq!(codepoints, [0xA0, 0xA1]);
    }

    #[test]
    fn test_every_collision_is_reported() {
        let records = vec![
            SourceRecord::single(0x24D0, "a"),
            SourceRecord::single(0x24D0, "a"),
            SourceRecord::single(0x24D1, "b"),
            SourceRecord::single(0x24D1, "b"),
            SourceRecord::single(0x24D1, "b"),
        ];
        let message = expand(&source(records), &Reference::default()).unwrap_err().to_string();
        assert!(message.contains("failed with 2 error(s)"), "{}", message);
        assert!(message.contains("0x24d0 is defined 2 times"));
        assert!(message.contains("0x24d1 is defined 3 times"));
    }

    #[test]
    fn test_case_sensitive_collision() {
        // Ą duplicating ą adds nothing and is rejected; Ⅰ mapping elsewhere is fine.
        let records = vec![
            SourceRecord::single(0x104, "a"),
            SourceRecord::single(0x105, "a"),
            SourceRecord::single(0x2160, "i"),
            SourceRecord::single(0x2170, "l"),
        ];
        let message = expand(&source(records), &Reference::default()).unwrap_err().to_string();
        assert!(message.contains("failed with 1 error(s)"), "{}", message);
        assert!(message.contains("0x0104"));
    }

    #[test]
    fn test_invalid_translations() {
        let mut overflow = SourceRecord::single(0x1D7CE, "}");
        overflow.range_until = Some(0x1D7D0);
        overflow.synced_translation = true;
        let records = vec![SourceRecord::single(0xC0, "A"), SourceRecord::single(0xC1, "é"), overflow];
        let message = expand(&source(records), &Reference::default()).unwrap_err().to_string();
        assert!(message.contains("failed with 3 error(s)"), "{}", message);
        assert!(message.contains("leaves printable ASCII"));
    }

    #[test]
    fn test_similar_groups() {
        let mut set = source(Vec::new());
        set.similar = vec![vec!["o".into(), "0".into()], vec!["i".into(), "l".into()]];
        assert_eq!(similar_groups(&set).unwrap(), vec![b"o0".to_vec(), b"il".to_vec()]);

        set.similar.push(vec!["0".into(), "Q".into()]);
        let message = similar_groups(&set).unwrap_err().to_string();
        assert!(message.contains("already belongs"));
        assert!(message.contains("\"Q\""));
    }
}
