// Export record error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Export record error code constants
///
/// Error code range: 5001-5002
pub struct ProfileErrorCodes {}

impl ProfileErrorCodes {
    /// Record is not structurally a tasting record
    pub const MALFORMED_RECORD: i32 = 5001;

    /// Record could not be serialized
    pub const ENCODE_FAILED: i32 = 5002;
}

/// Log an export record error with structured context
pub fn log_profile_error(err: &ProfileError, context: &str) {
    error!(
        "Profile error in {}: code={}, component=ProfileRecord, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Errors raised while decoding or encoding export records
///
/// Bad timing inside a well-formed record is not an error; only a record
/// whose structure cannot be read at all is.
#[derive(Debug, Clone, PartialEq)]
pub enum ProfileError {
    /// JSON is not a tasting record (e.g. `intervals` is not a map of arrays)
    MalformedRecord { reason: String },

    /// Serialization failed
    EncodeFailed { reason: String },
}

impl ErrorCode for ProfileError {
    fn code(&self) -> i32 {
        match self {
            ProfileError::MalformedRecord { .. } => ProfileErrorCodes::MALFORMED_RECORD,
            ProfileError::EncodeFailed { .. } => ProfileErrorCodes::ENCODE_FAILED,
        }
    }

    fn message(&self) -> String {
        match self {
            ProfileError::MalformedRecord { reason } => {
                format!("Malformed tasting record: {}", reason)
            }
            ProfileError::EncodeFailed { reason } => {
                format!("Failed to encode tasting record: {}", reason)
            }
        }
    }
}

impl fmt::Display for ProfileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ProfileError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for ProfileError {}
