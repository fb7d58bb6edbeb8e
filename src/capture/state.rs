// CaptureState - tagged state and pure transition function
//
// idle → tasting → swallowed → finished
//
// The active attribute lives inside the state variant, so "at most one
// active attribute" is a property of the type rather than of bookkeeping.
// `apply` never mutates; the session swaps in `Transition::next` only when
// the command was accepted.

use std::fmt;

use crate::error::CaptureError;
use crate::profile::{AttributeId, DominanceEvent, Phase};

/// Attribute currently held dominant, with the time it was opened
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ActiveInterval {
    pub attribute: AttributeId,
    pub start: f64,
}

/// Operator command driving the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum CaptureCommand {
    Start,
    Select(AttributeId),
    Swallow,
    Finish,
}

impl fmt::Display for CaptureCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureCommand::Start => f.write_str("start"),
            CaptureCommand::Select(attr) => write!(f, "select {}", attr),
            CaptureCommand::Swallow => f.write_str("swallow"),
            CaptureCommand::Finish => f.write_str("finish"),
        }
    }
}

/// Capture lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub enum CaptureState {
    /// Session created, clock not yet anchored
    #[default]
    Idle,
    /// Sample in the mouth
    Tasting { active: Option<ActiveInterval> },
    /// Swallow marker recorded; new intervals are residual
    Swallowed {
        swallow_time: f64,
        active: Option<ActiveInterval>,
    },
    /// Terminal
    Finished,
}

/// Result of an accepted command
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub next: CaptureState,
    /// Interval closed by this command, if any
    pub closed: Option<DominanceEvent>,
}

impl CaptureState {
    /// Attribute currently open, if any
    pub fn active(&self) -> Option<ActiveInterval> {
        match self {
            CaptureState::Tasting { active } | CaptureState::Swallowed { active, .. } => *active,
            CaptureState::Idle | CaptureState::Finished => None,
        }
    }

    pub fn swallow_time(&self) -> Option<f64> {
        match self {
            CaptureState::Swallowed { swallow_time, .. } => Some(*swallow_time),
            _ => None,
        }
    }

    /// Compute the transition for `command` at time `now`
    ///
    /// # Errors
    /// Returns a `CaptureError` for commands that are not valid in the
    /// current state. The caller keeps its current state in that case.
    pub fn apply(&self, command: CaptureCommand, now: f64) -> Result<Transition, CaptureError> {
        match (*self, command) {
            (CaptureState::Idle, CaptureCommand::Start) => Ok(Transition {
                next: CaptureState::Tasting { active: None },
                closed: None,
            }),
            (CaptureState::Idle, command) => Err(CaptureError::NotStarted { command }),
            (CaptureState::Finished, command) => Err(CaptureError::Finished { command }),
            (_, CaptureCommand::Start) => Err(CaptureError::AlreadyStarted),

            (CaptureState::Tasting { active }, CaptureCommand::Select(attribute)) => {
                let (active, closed) = Self::select(active, attribute, now, None);
                Ok(Transition {
                    next: CaptureState::Tasting { active },
                    closed,
                })
            }
            (
                CaptureState::Swallowed {
                    swallow_time,
                    active,
                },
                CaptureCommand::Select(attribute),
            ) => {
                let (active, closed) = Self::select(active, attribute, now, Some(swallow_time));
                Ok(Transition {
                    next: CaptureState::Swallowed {
                        swallow_time,
                        active,
                    },
                    closed,
                })
            }

            (CaptureState::Tasting { active }, CaptureCommand::Swallow) => Ok(Transition {
                next: CaptureState::Swallowed {
                    swallow_time: now,
                    active,
                },
                closed: None,
            }),
            (CaptureState::Swallowed { swallow_time, .. }, CaptureCommand::Swallow) => {
                Err(CaptureError::AlreadySwallowed { swallow_time })
            }

            (state, CaptureCommand::Finish) => Ok(Transition {
                next: CaptureState::Finished,
                closed: state
                    .active()
                    .and_then(|active| Self::close(active, now, state.swallow_time())),
            }),
        }
    }

    /// Toggle or replace the active attribute
    fn select(
        active: Option<ActiveInterval>,
        attribute: AttributeId,
        now: f64,
        swallow_time: Option<f64>,
    ) -> (Option<ActiveInterval>, Option<DominanceEvent>) {
        let closed = active.and_then(|current| Self::close(current, now, swallow_time));
        match active {
            Some(current) if current.attribute == attribute => (None, closed),
            _ => (
                Some(ActiveInterval {
                    attribute,
                    start: now,
                }),
                closed,
            ),
        }
    }

    /// Close an open interval; zero-length intervals produce nothing
    fn close(active: ActiveInterval, now: f64, swallow_time: Option<f64>) -> Option<DominanceEvent> {
        (now > active.start).then(|| {
            DominanceEvent::new(
                active.attribute,
                active.start,
                now,
                Phase::for_start(active.start, swallow_time),
            )
        })
    }
}
