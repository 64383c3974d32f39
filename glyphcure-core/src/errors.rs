//! errors.rs - Error types for the glyphcure-core library.
//!
//! Curing well-formed text never fails. Errors only arise at the edges: loading
//! an artifact, decoding raw host input, and combining option aliases.
//!
//! License: MIT OR APACHE 2.0

use glyphcure_codec::layout::HeaderError;
use thiserror::Error;

/// Problems found while loading a database artifact.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LoadError {
    #[error("Invalid {artifact} header: {source}")]
    Header {
        artifact: &'static str,
        #[source]
        source: HeaderErrorKind,
    },

    #[error("Invalid {artifact} layout: {table} table spans {start}..{end} but the artifact is {len} bytes long")]
    OutOfBounds {
        artifact: &'static str,
        table: &'static str,
        start: usize,
        end: usize,
        len: usize,
    },

    #[error("Invalid {artifact} layout: {table} table length ({len}) is not a multiple of {record_size}")]
    Misaligned {
        artifact: &'static str,
        table: &'static str,
        len: usize,
        record_size: usize,
    },

    #[error("Invalid {artifact} layout: string table is not valid UTF-8 at byte {offset}")]
    Strings { artifact: &'static str, offset: usize },
}

/// [`HeaderError`] wrapped so it can act as an error source.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("{0}")]
pub struct HeaderErrorKind(pub HeaderError);

/// Host input that is not text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CureError {
    #[error("Input is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    #[error("Input is not valid UTF-16: unpaired surrogate {0:#06x} at index {1}")]
    InvalidUtf16(u16, usize),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum OptionsError {
    #[error("Options 'retain_all' and 'pure_homoglyph' are mutually exclusive shortcuts")]
    ConflictingAliases,
}
