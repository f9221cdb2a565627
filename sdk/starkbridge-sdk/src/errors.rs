//! SDK error taxonomy and failure translation.

use starkbridge_transcode::{abi, TranscodeError};
use starkbridge_types::TypesError;
use thiserror::Error;

/// Result alias for SDK operations.
pub type Result<T> = std::result::Result<T, SdkError>;

/// Failure string the destination VM emits for a tripped assertion. Any
/// failure carrying it maps to an Ethereum-style revert.
pub const ASSERT_FAILURE: &str = "An ASSERT_EQ instruction failed";

const REASON_PREFIX: &str = "Error message: ";

/// SDK errors.
#[derive(Debug, Error)]
pub enum SdkError {
    /// The call executed and reverted with a reason string. `payload` is
    /// the equivalent `Error(string)` bytes.
    #[error("Execution reverted: {reason}")]
    Reverted { reason: String, payload: Vec<u8> },

    /// The backend rejected or failed the call for a non-revert reason.
    #[error("Call rejected: {0}")]
    Rejected(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("No such function: {0}")]
    UnknownFunction(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error(transparent)]
    Transcode(#[from] TranscodeError),

    #[error(transparent)]
    Types(#[from] TypesError),
}

impl From<reqwest::Error> for SdkError {
    fn from(err: reqwest::Error) -> Self {
        SdkError::Transport(err.to_string())
    }
}

/// Translate a backend failure message into the caller-facing error.
///
/// Assertion failures become [`SdkError::Reverted`] with the reason pulled
/// from the embedded `Error message:` line; everything else stays a
/// rejection verbatim.
pub fn translate_failure(message: &str) -> SdkError {
    if !message.contains(ASSERT_FAILURE) {
        return SdkError::Rejected(message.to_string());
    }
    let reason = message
        .find(REASON_PREFIX)
        .map(|at| {
            let rest = &message[at + REASON_PREFIX.len()..];
            rest.split('\n').next().unwrap_or(rest).trim().to_string()
        })
        .unwrap_or_default();
    let payload = abi::encode_revert_reason(&reason);
    SdkError::Reverted { reason, payload }
}
