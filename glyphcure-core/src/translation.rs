// glyphcure-core/src/translation.rs
use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::options::Options;

/// What a single code point cures into.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Translation<'a> {
    Character(char),
    String(Cow<'a, str>),
    /// The code point is deleted.
    None,
}

impl<'a> Translation<'a> {
    pub(crate) fn to_ascii_uppercase(&self) -> Translation<'a> {
        match self {
            Translation::Character(c) => Translation::Character(c.to_ascii_uppercase()),
            Translation::String(s) => Translation::String(Cow::Owned(s.to_ascii_uppercase())),
            Translation::None => Translation::None,
        }
    }

    pub fn into_owned(self) -> Translation<'static> {
        match self {
            Translation::Character(c) => Translation::Character(c),
            Translation::String(s) => Translation::String(Cow::Owned(s.into_owned())),
            Translation::None => Translation::None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Translation::None)
    }
}

impl fmt::Display for Translation<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Translation::Character(c) => write!(f, "{}", c),
            Translation::String(s) => f.write_str(s),
            Translation::None => Ok(()),
        }
    }
}

impl PartialEq<char> for Translation<'_> {
    fn eq(&self, other: &char) -> bool {
        matches!(self, Translation::Character(c) if c == other)
    }
}

impl PartialEq<str> for Translation<'_> {
    fn eq(&self, other: &str) -> bool {
        match self {
            Translation::Character(c) => {
                let mut chars = other.chars();
                chars.next() == Some(*c) && chars.next().is_none()
            }
            Translation::String(s) => s == other,
            Translation::None => other.is_empty(),
        }
    }
}

impl PartialEq<&str> for Translation<'_> {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

impl Serialize for Translation<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Translation::Character(c) => serializer.serialize_char(*c),
            Translation::String(s) => serializer.serialize_str(s),
            Translation::None => serializer.serialize_unit(),
        }
    }
}

/// Reads a single character and cures it with the embedded database and default options.
impl<'de> Deserialize<'de> for Translation<'static> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        char::deserialize(deserializer).map(|ch| crate::cure::cure_char(ch, Options::default()))
    }
}
