use serde::Serialize;
use thiserror::Error;

/// Reasons a single submitted row can be rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowErrorKind {
    #[error("URL is required.")]
    MissingUrl,

    #[error("Invalid URL format.")]
    InvalidUrlFormat,

    #[error("Validity must be a positive integer.")]
    InvalidValidity,

    #[error("Shortcode must be 3-12 alphanumeric characters.")]
    InvalidShortcodeFormat,

    #[error("Shortcode '{0}' already exists.")]
    ShortcodeCollision(String),

    #[error("Could not generate a free shortcode after {0} attempts.")]
    GenerationExhausted(u32),
}

impl RowErrorKind {
    /// Stable machine-readable name, used in API responses
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingUrl => "MISSING_URL",
            Self::InvalidUrlFormat => "INVALID_URL_FORMAT",
            Self::InvalidValidity => "INVALID_VALIDITY",
            Self::InvalidShortcodeFormat => "INVALID_SHORTCODE_FORMAT",
            Self::ShortcodeCollision(_) => "SHORTCODE_COLLISION",
            Self::GenerationExhausted(_) => "GENERATION_EXHAUSTED",
        }
    }
}

/// A rejected row of a creation batch. `row` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Row {row}: {kind}")]
pub struct RowError {
    pub row: usize,
    pub kind: RowErrorKind,
}

impl RowError {
    pub fn new(row: usize, kind: RowErrorKind) -> Self {
        Self { row, kind }
    }
}

impl Serialize for RowError {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("RowError", 3)?;
        state.serialize_field("row", &self.row)?;
        state.serialize_field("kind", self.kind.code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}
