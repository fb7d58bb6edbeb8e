// Error types for the TDS core
//
// This module defines custom error types for capture, configuration, export
// records and curve management, each with a numeric code range so callers
// (UI bridges, the CLI) can branch on failures without string matching.
//
// Timing imprecision is never an error here: malformed intervals are clamped
// or dropped when a profile is built. Only structural failures surface.

mod analysis;
mod capture;
mod config;
mod profile;

pub use analysis::{log_analysis_error, AnalysisError, AnalysisErrorCodes};
pub use capture::{log_capture_error, CaptureError, CaptureErrorCodes};
pub use config::{log_config_error, ConfigError, ConfigErrorCodes};
pub use profile::{log_profile_error, ProfileError, ProfileErrorCodes};

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types, enabling consistent error handling across
/// the crate boundary.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}
