use thiserror::Error;

/// Errors that can occur in type operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TypesError {
    #[error("Value does not fit in the field: {0}")]
    FeltOutOfRange(String),

    #[error("Invalid felt literal: {0}")]
    InvalidFelt(String),

    #[error("Invalid hash length: expected 32, got {0}")]
    InvalidHashLength(usize),

    #[error("Invalid hex: {0}")]
    InvalidHex(String),

    #[error("Invalid ABI type string: {0}")]
    InvalidTypeString(String),

    #[error("Invalid bit width {bits} for {base}")]
    InvalidBitWidth { base: &'static str, bits: usize },

    #[error("Invalid ABI JSON: {0}")]
    InvalidAbiJson(String),
}

impl From<hex::FromHexError> for TypesError {
    fn from(e: hex::FromHexError) -> Self {
        TypesError::InvalidHex(e.to_string())
    }
}

impl From<serde_json::Error> for TypesError {
    fn from(e: serde_json::Error) -> Self {
        TypesError::InvalidAbiJson(e.to_string())
    }
}
