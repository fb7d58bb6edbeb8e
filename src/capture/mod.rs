// Capture module - live TDS timeline capture
//
// This module provides three components:
// 1. CaptureState: tagged state + pure transition function
// 2. CaptureClock: monotonic (production) or manual (tests) time source
// 3. CaptureSession: applies operator taps and emits a TastingProfile
//
// The capture workflow:
// 1. start() anchors t=0
// 2. select(attribute) toggles the single active attribute
// 3. swallow() records the swallow marker
// 4. finish() closes the open interval and freezes the profile

pub mod clock;
pub mod session;
pub mod state;

pub use clock::{CaptureClock, ManualClock, MonotonicClock};
pub use session::{unix_millis, CaptureSession};
pub use state::{ActiveInterval, CaptureCommand, CaptureState, Transition};
