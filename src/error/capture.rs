// Capture error types and constants

use crate::capture::state::CaptureCommand;
use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Capture error code constants
///
/// Error code range: 3001-3005
pub struct CaptureErrorCodes {}

impl CaptureErrorCodes {
    /// Command issued before `start()`
    pub const NOT_STARTED: i32 = 3001;

    /// `start()` issued on a session that is already running
    pub const ALREADY_STARTED: i32 = 3002;

    /// `swallow()` issued twice
    pub const ALREADY_SWALLOWED: i32 = 3003;

    /// Command issued after `finish()`
    pub const FINISHED: i32 = 3004;

    /// Session clock reported a non-monotonic or non-finite time
    pub const CLOCK_FAULT: i32 = 3005;
}

/// Log a capture error with structured context
///
/// The logging is non-blocking and will not panic on failure.
pub fn log_capture_error(err: &CaptureError, context: &str) {
    error!(
        "Capture error in {}: code={}, component=CaptureSession, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Capture state machine errors
///
/// A rejected command never changes the session state.
///
/// Error code range: 3001-3005
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureError {
    /// Session has not been started
    NotStarted { command: CaptureCommand },

    /// Session is already running
    AlreadyStarted,

    /// Swallow marker already recorded
    AlreadySwallowed { swallow_time: f64 },

    /// Session already finished
    Finished { command: CaptureCommand },

    /// Clock went backwards or returned NaN
    ClockFault { reading: f64 },
}

impl ErrorCode for CaptureError {
    fn code(&self) -> i32 {
        match self {
            CaptureError::NotStarted { .. } => CaptureErrorCodes::NOT_STARTED,
            CaptureError::AlreadyStarted => CaptureErrorCodes::ALREADY_STARTED,
            CaptureError::AlreadySwallowed { .. } => CaptureErrorCodes::ALREADY_SWALLOWED,
            CaptureError::Finished { .. } => CaptureErrorCodes::FINISHED,
            CaptureError::ClockFault { .. } => CaptureErrorCodes::CLOCK_FAULT,
        }
    }

    fn message(&self) -> String {
        match self {
            CaptureError::NotStarted { command } => {
                format!("Capture not started: cannot {}. Call start() first.", command)
            }
            CaptureError::AlreadyStarted => "Capture already started".to_string(),
            CaptureError::AlreadySwallowed { swallow_time } => {
                format!("Swallow already recorded at {:.2}s", swallow_time)
            }
            CaptureError::Finished { command } => {
                format!("Capture already finished: cannot {}", command)
            }
            CaptureError::ClockFault { reading } => {
                format!("Capture clock returned invalid reading {}", reading)
            }
        }
    }
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CaptureError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for CaptureError {}
