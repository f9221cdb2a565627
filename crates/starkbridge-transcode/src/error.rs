use starkbridge_types::TypesError;
use thiserror::Error;

/// Result alias for codec operations.
pub type Result<T> = std::result::Result<T, TranscodeError>;

/// Errors raised while transcoding between ABI values and felt sequences.
///
/// All variants are fatal for the call that produced them; nothing is
/// retried or silently padded.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TranscodeError {
    /// Fewer input values than the declared types require
    #[error("Unexpected end of input values")]
    UnexpectedEndOfValues,

    /// Fewer felts than the declared types require
    #[error("Unexpected end of felt data")]
    UnexpectedEndOfData,

    #[error("Can't encode {got} as {expected}")]
    TypeMismatch { expected: String, got: String },

    #[error("Value {value} out of range for {ty}")]
    ValueOutOfRange { value: String, ty: String },

    #[error("Declared length {declared} disagrees with actual {actual}")]
    LengthMismatch { declared: usize, actual: usize },

    /// Felts left over after the declared types were fully decoded
    #[error("{0} trailing felts after decode")]
    TrailingData(usize),

    /// Input values left over after the declared types were fully encoded
    #[error("{0} unconsumed input values after encode")]
    TrailingValues(usize),

    #[error("Missing tuple field: {0}")]
    MissingField(String),

    #[error("Unexpected tuple field: {0}")]
    UnexpectedField(String),

    #[error("Address out of range: {0}")]
    AddressOutOfRange(String),

    #[error("Decoded string is not valid UTF-8")]
    InvalidUtf8,

    #[error(transparent)]
    Types(#[from] TypesError),
}
