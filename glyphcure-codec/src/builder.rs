//! builder.rs - Emission of the confusables and bidi artifacts.
//!
//! [`DatabaseBuilder::build`] runs the whole offline pipeline: validation,
//! compaction, string interning and table serialization. It is a batch tool,
//! so every failure is fatal and there is no partial output.
//!
//! License: MIT OR APACHE 2.0

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, info};

use crate::bidi;
use crate::compact::compact;
use crate::errors::BuildError;
use crate::layout::{
    BidiHeader, Header, Payload, RawRecord, BIDI_HEADER_SIZE, HEADER_SIZE, RECORD_SIZE, SIMILAR_GROUP_END,
};
use crate::record::{CodepointRecord, SourceSet, Translation};
use crate::strings::StringTable;
use crate::unicode::{
    Reference, BIDI_BRACKETS_FILE, BIDI_CLASSES_FILE, BLOCKS_FILE, DECOMPOSITIONS_FILE, EMOJI_FILE,
};
use crate::validate;

pub const CODEPOINTS_FILE: &str = "codepoints.json";

/// Every input the builder reads, relative to the data directory.
pub const INPUT_FILES: [&str; 6] = [
    CODEPOINTS_FILE,
    BLOCKS_FILE,
    BIDI_CLASSES_FILE,
    BIDI_BRACKETS_FILE,
    DECOMPOSITIONS_FILE,
    EMOJI_FILE,
];

pub const CODEPOINTS_ARTIFACT: &str = "codepoints.bin";
pub const BIDI_ARTIFACT: &str = "bidi.bin";

/// The two binary artifacts consumed by the runtime loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifacts {
    pub codepoints: Vec<u8>,
    pub bidi: Vec<u8>,
}

impl Artifacts {
    /// Writes `codepoints.bin` and `bidi.bin` into `dir`, creating it if needed.
    pub fn write_to(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir).with_context(|| format!("Failed to create output directory {}", dir.display()))?;

        for (name, bytes) in [(CODEPOINTS_ARTIFACT, &self.codepoints), (BIDI_ARTIFACT, &self.bidi)] {
            let path = dir.join(name);
            fs::write(&path, bytes).with_context(|| format!("Failed to write {}", path.display()))?;
            debug!("Wrote {} bytes to {}.", bytes.len(), path.display());
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct DatabaseBuilder {
    source: SourceSet,
    reference: Reference,
}

impl DatabaseBuilder {
    pub fn new(source: SourceSet, reference: Reference) -> Self {
        Self { source, reference }
    }

    pub fn build(&self) -> Result<Artifacts, BuildError> {
        info!("Building confusables database from {} source records.", self.source.codepoints.len());

        let expanded = validate::expand(&self.source, &self.reference)?;
        let similar = validate::similar_groups(&self.source)?;
        let records = compact(&expanded);

        let strings = StringTable::build(records.iter().filter_map(|record| match &record.translation {
            Translation::Str(s) => Some(s.as_str()),
            Translation::Char(_) => None,
        }))?;

        let (case_sensitive, case_insensitive): (Vec<&CodepointRecord>, Vec<&CodepointRecord>) =
            records.iter().partition(|record| record.case_sensitive);

        let case_insensitive_bytes = encode_records(&case_insensitive, &strings)?;
        let case_sensitive_bytes = encode_records(&case_sensitive, &strings)?;

        let mut similar_bytes = Vec::new();
        for group in &similar {
            if let Some((last, rest)) = group.split_last() {
                similar_bytes.extend_from_slice(rest);
                similar_bytes.push(last | SIMILAR_GROUP_END);
            }
        }

        let case_sensitive_offset = HEADER_SIZE + case_insensitive_bytes.len();
        let similar_offset = case_sensitive_offset + case_sensitive_bytes.len();
        let strings_offset = similar_offset + similar_bytes.len();
        let header = Header {
            case_sensitive_offset: case_sensitive_offset as u32,
            similar_offset: similar_offset as u32,
            strings_offset: strings_offset as u32,
        };

        let mut codepoints = Vec::with_capacity(strings_offset + strings.len());
        codepoints.extend_from_slice(&header.to_bytes());
        codepoints.extend_from_slice(&case_insensitive_bytes);
        codepoints.extend_from_slice(&case_sensitive_bytes);
        codepoints.extend_from_slice(&similar_bytes);
        codepoints.extend_from_slice(strings.as_str().as_bytes());

        let runs = bidi::merge_runs(self.reference.bidi_classes.clone())?;
        let brackets = bidi::check_brackets(self.reference.brackets.clone())?;
        let (run_bytes, bracket_bytes) = bidi::encode_tables(&runs, &brackets);
        let bidi_header = BidiHeader {
            brackets_offset: (BIDI_HEADER_SIZE + run_bytes.len()) as u32,
        };

        let mut bidi = Vec::with_capacity(BIDI_HEADER_SIZE + run_bytes.len() + bracket_bytes.len());
        bidi.extend_from_slice(&bidi_header.to_bytes());
        bidi.extend_from_slice(&run_bytes);
        bidi.extend_from_slice(&bracket_bytes);

        info!(
            "Built database: {} case-insensitive and {} case-sensitive records, {} similar groups, {} string bytes, {} bidi runs, {} bracket pairs.",
            case_insensitive.len(),
            case_sensitive.len(),
            similar.len(),
            strings.len(),
            runs.len(),
            brackets.len()
        );

        Ok(Artifacts { codepoints, bidi })
    }
}

fn encode_records(records: &[&CodepointRecord], strings: &StringTable) -> Result<Vec<u8>, BuildError> {
    let mut out = Vec::with_capacity(records.len() * RECORD_SIZE);

    for record in records {
        let payload = match &record.translation {
            Translation::Char(ch) => Payload::Char {
                ch: *ch,
                range: record.range_size,
                synced: record.synced,
            },
            Translation::Str(s) => {
                let (offset, len) = strings
                    .locate(s)
                    .ok_or_else(|| BuildError::MissingString(record.codepoint, s.clone()))?;
                Payload::Str { offset, len }
            }
        };

        let raw = RawRecord {
            codepoint: record.codepoint,
            payload,
            attributes: record.attributes,
        };
        out.extend_from_slice(&raw.encode());
    }

    Ok(out)
}

/// Reads every input from `dir` and builds both artifacts.
pub fn build_from_dir(dir: &Path) -> Result<Artifacts> {
    let read = |name: &str| -> Result<String> {
        let path = dir.join(name);
        fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))
    };

    let source = SourceSet::from_json(&read(CODEPOINTS_FILE)?)
        .with_context(|| format!("Failed to parse {}", dir.join(CODEPOINTS_FILE).display()))?;
    let reference = Reference::from_texts(
        &read(BLOCKS_FILE)?,
        &read(BIDI_CLASSES_FILE)?,
        &read(BIDI_BRACKETS_FILE)?,
        &read(DECOMPOSITIONS_FILE)?,
        &read(EMOJI_FILE)?,
    )
    .context("Failed to parse Unicode reference tables")?;

    DatabaseBuilder::new(source, reference)
        .build()
        .context("Failed to build the confusables database")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{read_u32_le, MAGIC};
    use crate::record::SourceRecord;

    #[test]
    fn test_build_lays_out_tables_in_order() {
        let mut math = SourceRecord::single(0x1D41A, "a");
        math.range_until = Some(0x1D433);
        math.synced_translation = true;
        let source = SourceSet {
            codepoints: vec![math, SourceRecord::single(0x2160, "i"), SourceRecord::single(0x1F18E, "ab")],
            similar: vec![vec!["o".into(), "0".into()]],
        };

        let artifacts = DatabaseBuilder::new(source, Reference::default()).build().unwrap();
        let bytes = &artifacts.codepoints;
        assert_eq!(bytes[..4], MAGIC);

        let header = Header::parse(bytes).unwrap();
        // Two case-insensitive records (the synced run and 🆎), one case-sensitive (Ⅰ).
        assert_eq!(header.case_sensitive_offset as usize, HEADER_SIZE + 2 * RECORD_SIZE);
        assert_eq!(header.similar_offset as usize, HEADER_SIZE + 3 * RECORD_SIZE);
        assert_eq!(&bytes[header.similar_offset as usize..header.strings_offset as usize], b"o\xB0");
        assert_eq!(&bytes[header.strings_offset as usize..], b"ab");

        let run = RawRecord::decode(&bytes[HEADER_SIZE..]);
        assert_eq!(run.payload, Payload::Char { ch: b'a', range: 25, synced: true });
        assert_eq!(read_u32_le(&artifacts.bidi, 8), Some(BIDI_HEADER_SIZE as u32));
    }

    #[test]
    fn test_validation_failure_aborts_build() {
        let source = SourceSet {
            codepoints: vec![SourceRecord::single(0x2160, "I")],
            similar: Vec::new(),
        };
        let err = DatabaseBuilder::new(source, Reference::default()).build().unwrap_err();
        assert!(matches!(err, BuildError::Invalid { count: 1, .. }));
    }
}
