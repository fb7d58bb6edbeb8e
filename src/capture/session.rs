// CaptureSession - drives the state machine from operator taps
//
// The session owns the clock, the list of closed intervals and the current
// CaptureState. Every tap is translated into a CaptureCommand, applied with
// the current clock reading, and committed only if the transition is valid.
// Finishing yields an immutable TastingProfile; discarding yields nothing.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::capture::clock::{CaptureClock, MonotonicClock};
use crate::capture::state::{ActiveInterval, CaptureCommand, CaptureState};
use crate::error::{log_capture_error, CaptureError};
use crate::profile::{AttributeId, DominanceEvent, ProfileId, TastingMode, TastingProfile};

/// Milliseconds since the Unix epoch, used as the revision stamp
pub fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// One live TDS capture
pub struct CaptureSession<C: CaptureClock = MonotonicClock> {
    id: ProfileId,
    mode: TastingMode,
    clock: C,
    state: CaptureState,
    events: Vec<DominanceEvent>,
    last_reading: f64,
}

impl CaptureSession<MonotonicClock> {
    /// Create a session timed by the monotonic system clock
    pub fn new(id: ProfileId, mode: TastingMode) -> Self {
        Self::with_clock(id, mode, MonotonicClock::new())
    }
}

impl<C: CaptureClock> CaptureSession<C> {
    /// Create a session with an explicit clock (tests use `ManualClock`)
    pub fn with_clock(id: ProfileId, mode: TastingMode, clock: C) -> Self {
        Self {
            id,
            mode,
            clock,
            state: CaptureState::Idle,
            events: Vec::new(),
            last_reading: 0.0,
        }
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    pub fn active_attribute(&self) -> Option<AttributeId> {
        self.state.active().map(|a| a.attribute)
    }

    /// Intervals closed so far
    pub fn events(&self) -> &[DominanceEvent] {
        &self.events
    }

    /// Seconds since `start()` (0 before start)
    pub fn elapsed(&self) -> f64 {
        if self.state == CaptureState::Idle {
            0.0
        } else {
            self.clock.elapsed_secs()
        }
    }

    /// Anchor the clock and begin tasting
    pub fn start(&mut self) -> Result<(), CaptureError> {
        // Validate before touching the clock so a rejected start keeps t=0.
        self.state
            .apply(CaptureCommand::Start, 0.0)
            .inspect_err(|err| log_capture_error(err, "start"))?;
        self.clock.anchor();
        self.last_reading = 0.0;
        self.commit(CaptureCommand::Start, 0.0)?;
        log::info!("[Capture] {}: started ({:?} mode)", self.id, self.mode);
        Ok(())
    }

    /// Toggle `attribute`, closing whatever was active before
    ///
    /// # Returns
    /// The interval closed by this tap, if one was
    pub fn select(&mut self, attribute: AttributeId) -> Result<Option<DominanceEvent>, CaptureError> {
        let now = self.read_clock()?;
        self.commit(CaptureCommand::Select(attribute), now)
    }

    /// Record the swallow marker
    ///
    /// # Returns
    /// The swallow time in seconds since start
    pub fn swallow(&mut self) -> Result<f64, CaptureError> {
        let now = self.read_clock()?;
        self.commit(CaptureCommand::Swallow, now)?;
        log::debug!("[Capture] {}: swallow at {:.2}s", self.id, now);
        Ok(now)
    }

    /// Close any open interval and freeze the capture into a profile
    pub fn finish(&mut self) -> Result<TastingProfile, CaptureError> {
        let now = self.read_clock()?;
        let swallow_time = self.state.swallow_time();
        self.commit(CaptureCommand::Finish, now)?;

        let profile = TastingProfile::new(
            self.id.clone(),
            self.mode,
            std::mem::take(&mut self.events),
            swallow_time,
            now,
            unix_millis(),
        );
        log::info!(
            "[Capture] {}: finished after {:.2}s with {} interval(s)",
            self.id,
            now,
            profile.events().len()
        );
        Ok(profile)
    }

    /// Abandon the capture; nothing is persisted
    pub fn discard(self) {
        log::info!(
            "[Capture] {}: discarded in state {:?} ({} interval(s) dropped)",
            self.id,
            self.state,
            self.events.len()
        );
    }

    fn read_clock(&mut self) -> Result<f64, CaptureError> {
        let reading = self.clock.elapsed_secs();
        if !reading.is_finite() || reading < self.last_reading {
            let err = CaptureError::ClockFault { reading };
            log_capture_error(&err, "read_clock");
            return Err(err);
        }
        self.last_reading = reading;
        Ok(reading)
    }

    fn commit(
        &mut self,
        command: CaptureCommand,
        now: f64,
    ) -> Result<Option<DominanceEvent>, CaptureError> {
        let transition = self
            .state
            .apply(command, now)
            .inspect_err(|err| log_capture_error(err, &command.to_string()))?;
        if let Some(event) = transition.closed {
            log::debug!(
                "[Capture] {}: closed {} {:.2}-{:.2}s ({:?})",
                self.id,
                event.attribute,
                event.start,
                event.end,
                event.phase
            );
            self.events.push(event);
        }
        if let Some(ActiveInterval { attribute, start }) = transition.next.active() {
            if transition.next.active() != self.state.active() {
                log::debug!("[Capture] {}: opened {} at {:.2}s", self.id, attribute, start);
            }
        }
        self.state = transition.next;
        Ok(transition.closed)
    }
}
