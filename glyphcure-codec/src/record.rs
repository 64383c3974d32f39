//! record.rs - Source and intermediate record types of the builder.
//!
//! `codepoints.json` deserializes into a [`SourceSet`]. Validation expands it
//! into one [`ExpandedRecord`] per code point, and compaction folds those back
//! into range-compressed [`CodepointRecord`]s ready for emission.
//!
//! License: MIT OR APACHE 2.0

use serde::{Deserialize, Serialize};

use crate::errors::BuildError;

/// One human-editable entry of `codepoints.json`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SourceRecord {
    pub codepoint: u32,
    /// Lowercase ASCII the code point resolves to. Empty means the code point is deleted.
    pub translation: String,
    /// Inclusive end of the range this record covers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range_until: Option<u32>,
    /// Whether a single-character translation advances together with the code point.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub synced_translation: bool,
}

impl SourceRecord {
    pub fn single(codepoint: u32, translation: &str) -> Self {
        Self {
            codepoint,
            translation: translation.to_string(),
            range_until: None,
            synced_translation: false,
        }
    }
}

/// The complete editable input of the builder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SourceSet {
    pub codepoints: Vec<SourceRecord>,
    /// Groups of ASCII characters that look alike, canonical member first.
    #[serde(default)]
    pub similar: Vec<Vec<String>>,
}

impl SourceSet {
    pub fn from_json(text: &str) -> Result<Self, BuildError> {
        Ok(serde_json::from_str(text)?)
    }
}

/// A single code point after range expansion and attribute tagging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandedRecord {
    pub codepoint: u32,
    pub translation: String,
    pub case_sensitive: bool,
    pub attributes: u8,
}

/// Translation of a compacted record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Translation {
    /// One ASCII byte; `0` deletes the code point.
    Char(u8),
    Str(String),
}

impl Translation {
    pub fn from_text(text: &str) -> Self {
        match text.as_bytes() {
            [] => Translation::Char(0),
            [byte] => Translation::Char(*byte),
            _ => Translation::Str(text.to_string()),
        }
    }
}

/// A range-compressed record as emitted into a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodepointRecord {
    pub codepoint: u32,
    pub translation: Translation,
    /// Extra code points covered after `codepoint`.
    pub range_size: u8,
    pub synced: bool,
    pub case_sensitive: bool,
    pub attributes: u8,
}

impl CodepointRecord {
    pub fn last_codepoint(&self) -> u32 {
        self.codepoint + self.range_size as u32
    }
}
