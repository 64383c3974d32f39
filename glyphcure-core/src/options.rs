// glyphcure-core/src/options.rs
//! The option bitmask consumed by the curing engine, and the named
//! configuration it is encoded from.
//!
//! [`Options`] is a plain `u32`. Each flag maps to a fixed bit, and the curing
//! engine tests a record's attribute byte against it with a couple of bit
//! operations. [`OptionsConfig`] is the serde-facing form with one boolean per
//! flag, for hosts that configure glyphcure from a file.
//!
//! License: MIT OR APACHE 2.0

use glyphcure_codec::layout::{bit, ATTR_DIACRITIC, ATTR_SCRIPT_SHIFT, ATTR_TURKISH};
use serde::{Deserialize, Serialize};

use crate::errors::OptionsError;

/// Retention and behaviour flags for [`cure`](crate::cure).
///
/// By default every confusable is cured and the output is lowercase.
///
/// ```rust
/// use glyphcure_core::Options;
///
/// let options = Options::default().retain_greek().retain_capitalization();
/// assert!(options.is_set(Options::RETAIN_GREEK));
/// assert_eq!(Options::from(options.bits()), options);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Options(u32);

macro_rules! flags {
    ($($(#[$meta:meta])* $method:ident => $constant:ident),* $(,)?) => {
        impl Options {
            $(
                pub const $constant: u8 = bit::$constant;

                $(#[$meta])*
                #[must_use]
                pub const fn $method(self) -> Self {
                    Self(self.0 | (1 << bit::$constant))
                }
            )*
        }
    };
}

flags! {
    /// Keeps the case of the input. Translations of uppercase input are uppercased.
    retain_capitalization => RETAIN_CAPITALIZATION,
    /// Skips bidi reordering. Right-to-left text is then cured in logical order.
    disable_bidi => DISABLE_BIDI,
    /// Turns off ASCII-art letter matching in the comparison methods of [`CuredString`](crate::CuredString).
    disable_leetspeak => DISABLE_LEETSPEAK,
    /// Keeps letters with diacritics and standalone combining marks.
    retain_diacritics => RETAIN_DIACRITICS,
    retain_greek => RETAIN_GREEK,
    retain_cyrillic => RETAIN_CYRILLIC,
    retain_hebrew => RETAIN_HEBREW,
    retain_arabic => RETAIN_ARABIC,
    retain_devanagari => RETAIN_DEVANAGARI,
    retain_bengali => RETAIN_BENGALI,
    retain_armenian => RETAIN_ARMENIAN,
    retain_gujarati => RETAIN_GUJARATI,
    retain_tamil => RETAIN_TAMIL,
    retain_thai => RETAIN_THAI,
    retain_lao => RETAIN_LAO,
    retain_burmese => RETAIN_BURMESE,
    retain_khmer => RETAIN_KHMER,
    retain_mongolian => RETAIN_MONGOLIAN,
    retain_chinese => RETAIN_CHINESE,
    retain_japanese => RETAIN_JAPANESE,
    retain_korean => RETAIN_KOREAN,
    retain_braille => RETAIN_BRAILLE,
    retain_emojis => RETAIN_EMOJIS,
    /// Keeps Turkish-specific letters such as `ı` and `ş`.
    retain_turkish => RETAIN_TURKISH,
    /// Drops every non-ASCII character from the output.
    ascii_only => ASCII_ONLY,
    /// Drops everything except ASCII letters, digits and spaces from the output.
    alphanumeric_only => ALPHANUMERIC_ONLY,
}

/// Bits 4..=23: every script, emoji and Turkish letters.
const ALL_SCRIPTS: u32 = 0x00FF_FFF0;

impl Options {
    /// Every flag. Nothing is cured and the output is filtered down to alphanumerics.
    pub const ALL: Self = Self(0x03FF_FFFF);

    /// Leaves foreign scripts, diacritics and emoji alone and only folds lookalikes
    /// within ASCII.
    pub const PURE_HOMOGLYPH: Self = Self(0x007F_FFF8 | (1 << bit::PURE_HOMOGLYPH));

    /// Retains every script in one assignment.
    #[must_use]
    pub const fn retain_all_scripts(self) -> Self {
        Self(self.0 | ALL_SCRIPTS)
    }

    /// Replaces the mask with [`Options::PURE_HOMOGLYPH`].
    #[must_use]
    pub const fn pure_homoglyph() -> Self {
        Self::PURE_HOMOGLYPH
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn is_set(self, bit: u8) -> bool {
        bit < 32 && self.0 & (1 << bit) != 0
    }

    /// Whether a record with `attributes` must be left uncured.
    ///
    /// Diacritic and Turkish flags are independent of the script tag; any one
    /// of them matching a retention flag is enough.
    pub(crate) const fn refuses(self, attributes: u8) -> bool {
        if attributes & ATTR_DIACRITIC != 0 && self.is_set(bit::RETAIN_DIACRITICS) {
            return true;
        }
        if attributes & ATTR_TURKISH != 0 && self.is_set(bit::RETAIN_TURKISH) {
            return true;
        }

        let script = attributes >> ATTR_SCRIPT_SHIFT;
        script >= bit::FIRST_SCRIPT && script <= bit::LAST_SCRIPT && self.is_set(script)
    }
}

impl From<u32> for Options {
    fn from(bits: u32) -> Self {
        Self(bits)
    }
}

impl From<Options> for u32 {
    fn from(options: Options) -> Self {
        options.0
    }
}

/// Named form of [`Options`], one boolean per flag.
///
/// `retain_all` and `pure_homoglyph` are shortcuts that assign a whole mask and
/// cannot be combined.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OptionsConfig {
    pub retain_capitalization: bool,
    pub disable_bidi: bool,
    pub disable_leetspeak: bool,
    pub retain_diacritics: bool,
    pub retain_greek: bool,
    pub retain_cyrillic: bool,
    pub retain_hebrew: bool,
    pub retain_arabic: bool,
    pub retain_devanagari: bool,
    pub retain_bengali: bool,
    pub retain_armenian: bool,
    pub retain_gujarati: bool,
    pub retain_tamil: bool,
    pub retain_thai: bool,
    pub retain_lao: bool,
    pub retain_burmese: bool,
    pub retain_khmer: bool,
    pub retain_mongolian: bool,
    pub retain_chinese: bool,
    pub retain_japanese: bool,
    pub retain_korean: bool,
    pub retain_braille: bool,
    pub retain_emojis: bool,
    pub retain_turkish: bool,
    pub ascii_only: bool,
    pub alphanumeric_only: bool,
    pub retain_all: bool,
    pub pure_homoglyph: bool,
}

impl OptionsConfig {
    pub fn to_options(&self) -> Result<Options, OptionsError> {
        if self.retain_all && self.pure_homoglyph {
            return Err(OptionsError::ConflictingAliases);
        }

        let mut options = if self.pure_homoglyph {
            Options::PURE_HOMOGLYPH
        } else if self.retain_all {
            Options::default().retain_all_scripts()
        } else {
            Options::default()
        };

        let flags = [
            (self.retain_capitalization, bit::RETAIN_CAPITALIZATION),
            (self.disable_bidi, bit::DISABLE_BIDI),
            (self.disable_leetspeak, bit::DISABLE_LEETSPEAK),
            (self.retain_diacritics, bit::RETAIN_DIACRITICS),
            (self.retain_greek, bit::RETAIN_GREEK),
            (self.retain_cyrillic, bit::RETAIN_CYRILLIC),
            (self.retain_hebrew, bit::RETAIN_HEBREW),
            (self.retain_arabic, bit::RETAIN_ARABIC),
            (self.retain_devanagari, bit::RETAIN_DEVANAGARI),
            (self.retain_bengali, bit::RETAIN_BENGALI),
            (self.retain_armenian, bit::RETAIN_ARMENIAN),
            (self.retain_gujarati, bit::RETAIN_GUJARATI),
            (self.retain_tamil, bit::RETAIN_TAMIL),
            (self.retain_thai, bit::RETAIN_THAI),
            (self.retain_lao, bit::RETAIN_LAO),
            (self.retain_burmese, bit::RETAIN_BURMESE),
            (self.retain_khmer, bit::RETAIN_KHMER),
            (self.retain_mongolian, bit::RETAIN_MONGOLIAN),
            (self.retain_chinese, bit::RETAIN_CHINESE),
            (self.retain_japanese, bit::RETAIN_JAPANESE),
            (self.retain_korean, bit::RETAIN_KOREAN),
            (self.retain_braille, bit::RETAIN_BRAILLE),
            (self.retain_emojis, bit::RETAIN_EMOJIS),
            (self.retain_turkish, bit::RETAIN_TURKISH),
            (self.ascii_only, bit::ASCII_ONLY),
            (self.alphanumeric_only, bit::ALPHANUMERIC_ONLY),
        ];
        for (enabled, bit) in flags {
            if enabled {
                options = Options(options.0 | (1 << bit));
            }
        }

        Ok(options)
    }
}

impl TryFrom<&OptionsConfig> for Options {
    type Error = OptionsError;

    fn try_from(config: &OptionsConfig) -> Result<Self, Self::Error> {
        config.to_options()
    }
}
