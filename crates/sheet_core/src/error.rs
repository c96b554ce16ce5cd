//! Sheet error types

use thiserror::Error;

/// Errors surfaced synchronously to the caller
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SheetError {
    /// Requested a resting position that does not exist
    #[error("Target index {index} out of range (sheet has {len} target offsets)")]
    TargetIndexOutOfRange { index: usize, len: usize },

    /// Content measurement produced a height that cannot be placed
    #[error("Invalid content measurement: {value}")]
    InvalidMeasurement { value: f32 },

    /// Configuration could not be parsed
    #[error("Invalid sheet configuration: {0}")]
    Config(String),
}

impl From<toml::de::Error> for SheetError {
    fn from(err: toml::de::Error) -> Self {
        SheetError::Config(err.to_string())
    }
}

/// Result type for sheet operations
pub type Result<T> = std::result::Result<T, SheetError>;
