//! errors.rs - Error types for the offline database builder.
//!
//! Validation never stops at the first problem: every offending record is
//! collected and reported in one [`BuildError::Invalid`] so the source data can
//! be fixed in a single pass.
//!
//! License: MIT OR APACHE 2.0

use thiserror::Error;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum BuildError {
    #[error("Codepoint {0:#06x}: translation {1:?} may only contain printable lowercase ASCII")]
    InvalidTranslation(u32, String),

    #[error("Codepoint {0:#06x}: range end {1:#06x} lies before its start")]
    InvalidRange(u32, u32),

    #[error("Codepoint {0:#06x}: synced translation {1:?} leaves printable ASCII within its range")]
    SyncedOverflow(u32, String),

    #[error("Codepoint {0:#06x}: translation length ({1}) exceeds maximum allowed ({2})")]
    TranslationTooLong(u32, usize, usize),

    #[error("Codepoint {0:#06x} is defined {1} times")]
    Collision(u32, usize),

    #[error("Codepoint {0:#06x}: translation {1:?} duplicates the record of its lowercase form {2:#06x}")]
    CaseSensitiveCollision(u32, String, u32),

    #[error("Codepoint {0:#06x}: translation {1:?} is missing from the string table")]
    MissingString(u32, String),

    #[error("String table length ({0}) exceeds maximum allowed ({1})")]
    StringTableOverflow(usize, usize),

    #[error("Similar group {0}: {1}")]
    InvalidSimilarGroup(usize, String),

    #[error("Bidi data {0:#06x}..{1:#06x}: {2}")]
    InvalidBidi(u32, u32, String),

    #[error("{file}:{line}: {message}")]
    Parse {
        file: String,
        line: usize,
        message: String,
    },

    #[error("Failed to parse source records: {0}")]
    Json(#[from] serde_json::Error),

    #[error("An unexpected I/O error occurred: {0}")]
    Io(#[from] std::io::Error),

    #[error("{what} failed with {count} error(s):\n{report}")]
    Invalid {
        what: &'static str,
        count: usize,
        report: String,
    },
}

impl BuildError {
    pub(crate) fn parse(file: &str, line: usize, message: impl Into<String>) -> Self {
        BuildError::Parse {
            file: file.to_string(),
            line,
            message: message.into(),
        }
    }
}

/// Turns a batch of collected errors into one fatal report, or `Ok` when empty.
pub(crate) fn check_batch(what: &'static str, errors: Vec<BuildError>) -> Result<(), BuildError> {
    if errors.is_empty() {
        return Ok(());
    }

    let report = errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<String>>()
        .join("\n");
    Err(BuildError::Invalid {
        what,
        count: errors.len(),
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_batch_joins_every_error() {
        assert!(check_batch("Validation", Vec::new()).is_ok());

        let err = check_batch(
            "Validation",
            vec![BuildError::Collision(0x1D400, 2), BuildError::InvalidRange(0x300, 0x2FF)],
        )
        .unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("Validation failed with 2 error(s):"));
        assert!(message.contains("Codepoint 0x1d400 is defined 2 times"));
        assert!(message.contains("range end 0x02ff"));
    }
}
