// glyphcure-codec/src/lib.rs
//! # glyphcure codec
//!
//! Shared binary layout of the glyphcure confusables database, and the offline
//! builder that produces it.
//!
//! The [`layout`] module is always available and only needs `core`; the runtime
//! crate depends on this crate with default features off. The builder lives
//! behind the default `builder` feature:
//!
//! * `record`: the human-editable source records (`codepoints.json`).
//! * `unicode`: readers for the UCD-format reference tables and attribute tagging.
//! * `validate`: range expansion, charset checks and collision detection.
//! * `compact`: run compaction of consecutive records.
//! * `strings`: string interning with overlap merging.
//! * `bidi`: bidi run merging and bracket validation.
//! * `builder`: emission of `codepoints.bin` and `bidi.bin`.
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! fn main() -> anyhow::Result<()> {
//!     let artifacts = glyphcure_codec::build_from_dir(Path::new("glyphcure-core/data"))?;
//!     artifacts.write_to(Path::new("target/glyphcure"))?;
//!     Ok(())
//! }
//! ```
//!
//! License: MIT OR APACHE 2.0
#![cfg_attr(not(feature = "std"), no_std)]

pub mod layout;

#[cfg(feature = "builder")]
pub mod bidi;
#[cfg(feature = "builder")]
pub mod builder;
#[cfg(feature = "builder")]
pub mod compact;
#[cfg(feature = "builder")]
pub mod errors;
#[cfg(feature = "builder")]
pub mod record;
#[cfg(feature = "builder")]
pub mod strings;
#[cfg(feature = "builder")]
pub mod unicode;
#[cfg(feature = "builder")]
pub mod validate;

#[cfg(feature = "builder")]
pub use builder::{build_from_dir, Artifacts, DatabaseBuilder, INPUT_FILES};
#[cfg(feature = "builder")]
pub use errors::BuildError;
#[cfg(feature = "builder")]
pub use record::{CodepointRecord, ExpandedRecord, SourceRecord, SourceSet, Translation};
#[cfg(feature = "builder")]
pub use unicode::Reference;
