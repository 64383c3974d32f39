// glyphcure-core/src/lib.rs
//! # glyphcure Core Library
//!
//! `glyphcure-core` cures text written with confusable Unicode characters
//! (fullwidth letters, mathematical alphanumerics, Cyrillic lookalikes, zalgo
//! marks, right-to-left overrides and so on) into its plain lowercase ASCII
//! form, and keeps a map back to the original so matches found in the cured
//! text can be replaced or censored where they were actually written.
//!
//! The confusables database is generated at build time by `glyphcure-codec`
//! from the sources in `data/` and embedded in the library.
//!
//! ## Modules
//!
//! * `options`: The [`Options`] bitmask and its serde-facing [`OptionsConfig`].
//! * `database`: Loading and lookups over the binary artifacts.
//! * `cure`: The curing engine.
//! * `bidi`: Visual reordering of mixed-direction text.
//! * `index_map`: Cured-to-original position mapping.
//! * `matcher`: Similar-aware, leetspeak-aware search over cured text.
//! * `string`: [`CuredString`], with comparison, replace and censor operations.
//! * `errors`: Error types for loading artifacts and decoding input.
//!
//! ## Usage Example
//!
//! ```rust
//! use glyphcure_core::{cure, Options};
//!
//! let mut cured = cure("vＥⓡ𝔂 𝔽𝕌Ňℕｙ ţ乇𝕏𝓣", Options::default());
//! assert_eq!(cured.as_str(), "very funny text");
//! assert!(cured.contains("funny"));
//!
//! cured.censor("funny", '*');
//! assert_eq!(cured.original(), "vＥⓡ𝔂 ***** ţ乇𝕏𝓣");
//! ```
//!
//! License: MIT OR APACHE 2.0

mod bidi;
pub mod cure;
pub mod database;
pub mod errors;
pub mod index_map;
mod leetspeak;
pub mod matcher;
pub mod options;
pub mod string;
pub mod translation;

pub use cure::{cure, cure_bytes, cure_char, cure_utf16};
pub use database::{Database, Record};
pub use errors::{CureError, LoadError, OptionsError};
pub use index_map::{IndexEntry, IndexMap, OriginalSpan};
pub use matcher::{merge_ranges, Matcher};
pub use options::{Options, OptionsConfig};
pub use string::CuredString;
pub use translation::Translation;

pub use glyphcure_codec::layout::BidiClass;

/// Whether `text`, once cured with default options, contains `needle`.
///
/// ```rust
/// assert!(glyphcure_core::contains("this is a piece of $h1t", "shit"));
/// ```
pub fn contains(text: &str, needle: &str) -> bool {
    cure(text, Options::default()).contains(needle)
}
