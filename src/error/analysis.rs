// Curve manager error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Analysis error code constants
///
/// Error code range: 6001-6002
pub struct AnalysisErrorCodes {}

impl AnalysisErrorCodes {
    /// A cache lock was poisoned by a panicking thread
    pub const CACHE_POISONED: i32 = 6001;

    /// A blocking computation task failed to join
    pub const TASK_FAILED: i32 = 6002;
}

/// Log an analysis error with structured context
pub fn log_analysis_error(err: &AnalysisError, context: &str) {
    error!(
        "Analysis error in {}: code={}, component=CurveManager, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Errors raised by the memoizing curve manager
///
/// The analysis functions themselves are total; only the caching and
/// dispatch wrapper can fail.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// Mutex was poisoned
    CachePoisoned { component: String },

    /// `spawn_blocking` task panicked or was cancelled
    TaskFailed { reason: String },
}

impl ErrorCode for AnalysisError {
    fn code(&self) -> i32 {
        match self {
            AnalysisError::CachePoisoned { .. } => AnalysisErrorCodes::CACHE_POISONED,
            AnalysisError::TaskFailed { .. } => AnalysisErrorCodes::TASK_FAILED,
        }
    }

    fn message(&self) -> String {
        match self {
            AnalysisError::CachePoisoned { component } => {
                format!("Lock poisoned for component: {}", component)
            }
            AnalysisError::TaskFailed { reason } => {
                format!("Curve computation task failed: {}", reason)
            }
        }
    }
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AnalysisError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for AnalysisError {}

impl From<tokio::task::JoinError> for AnalysisError {
    fn from(err: tokio::task::JoinError) -> Self {
        AnalysisError::TaskFailed {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_error_codes() {
        let err = AnalysisError::CachePoisoned {
            component: "density_cache".to_string(),
        };
        assert_eq!(err.code(), AnalysisErrorCodes::CACHE_POISONED);
        assert_eq!(err.message(), "Lock poisoned for component: density_cache");

        let err = AnalysisError::TaskFailed {
            reason: "panicked".to_string(),
        };
        assert_eq!(err.code(), AnalysisErrorCodes::TASK_FAILED);
    }
}
