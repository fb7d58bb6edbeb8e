// Event model - one tasting's captured dominance intervals
//
// A TastingProfile is built once (by the capture session or from an export
// record) and never mutated afterwards. Construction is where operator
// timing is sanitized: intervals are clamped into [0, total_duration],
// empty or inverted intervals are dropped, the swallow marker is clamped,
// and each event's phase is recomputed from the swallow marker.

use std::fmt;

use crate::profile::record::ProfileRecord;
use crate::profile::AttributeId;

/// Whether an interval began before or after the swallow marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Opened while the sample was still melting in the mouth
    Melting,
    /// Opened after swallowing (aftertaste)
    Residual,
}

impl Phase {
    /// Phase of an interval opening at `start`
    pub fn for_start(start: f64, swallow_time: Option<f64>) -> Phase {
        match swallow_time {
            Some(swallow) if start >= swallow => Phase::Residual,
            _ => Phase::Melting,
        }
    }
}

/// Evaluator mode for the tasting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TastingMode {
    #[default]
    Normal,
    Expert,
}

/// A timed interval during which one attribute was judged most prominent
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DominanceEvent {
    pub attribute: AttributeId,
    /// Seconds since capture start
    pub start: f64,
    /// Seconds since capture start, always greater than `start`
    pub end: f64,
    pub phase: Phase,
}

impl DominanceEvent {
    pub fn new(attribute: AttributeId, start: f64, end: f64, phase: Phase) -> Self {
        Self {
            attribute,
            start,
            end,
            phase,
        }
    }

    pub fn duration(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }
}

/// Stable identity of a tasting record
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ProfileId(pub String);

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProfileId {
    fn from(value: &str) -> Self {
        ProfileId(value.to_string())
    }
}

/// Cache identity: a profile id plus the revision it was computed from
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProfileKey {
    pub id: ProfileId,
    pub last_modified: u64,
}

/// Immutable record of one tasting
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(into = "ProfileRecord", from = "ProfileRecord")]
pub struct TastingProfile {
    id: ProfileId,
    mode: TastingMode,
    events: Vec<DominanceEvent>,
    swallow_time: Option<f64>,
    total_duration: f64,
    last_modified: u64,
}

impl TastingProfile {
    /// Build a profile, sanitizing all timing
    ///
    /// # Arguments
    /// * `events` - Captured intervals in any order; phases are recomputed
    /// * `swallow_time` - Swallow marker, clamped into `[0, total_duration]`
    /// * `total_duration` - Capture length; negative or non-finite becomes 0
    /// * `last_modified` - Revision stamp (milliseconds since the Unix epoch)
    pub fn new(
        id: ProfileId,
        mode: TastingMode,
        events: Vec<DominanceEvent>,
        swallow_time: Option<f64>,
        total_duration: f64,
        last_modified: u64,
    ) -> Self {
        let total_duration = if total_duration.is_finite() && total_duration > 0.0 {
            total_duration
        } else {
            if total_duration != 0.0 {
                log::warn!(
                    "[Profile] {}: invalid total duration {}, using 0",
                    id,
                    total_duration
                );
            }
            0.0
        };

        let swallow_time = match swallow_time {
            Some(s) if s.is_finite() => {
                let clamped = s.clamp(0.0, total_duration);
                if clamped != s {
                    log::debug!("[Profile] {}: swallow {} clamped to {}", id, s, clamped);
                }
                Some(clamped)
            }
            Some(s) => {
                log::warn!("[Profile] {}: dropping non-finite swallow marker {}", id, s);
                None
            }
            None => None,
        };

        let submitted = events.len();
        let mut events: Vec<DominanceEvent> = events
            .into_iter()
            .filter(|e| e.start.is_finite() && e.end.is_finite())
            .filter_map(|e| {
                let start = e.start.clamp(0.0, total_duration);
                let end = e.end.clamp(0.0, total_duration);
                (end > start).then(|| {
                    DominanceEvent::new(
                        e.attribute,
                        start,
                        end,
                        Phase::for_start(start, swallow_time),
                    )
                })
            })
            .collect();
        events.sort_by(|a, b| a.start.total_cmp(&b.start).then(a.end.total_cmp(&b.end)));

        if events.len() != submitted {
            log::debug!(
                "[Profile] {}: dropped {} degenerate interval(s)",
                id,
                submitted - events.len()
            );
        }

        Self {
            id,
            mode,
            events,
            swallow_time,
            total_duration,
            last_modified,
        }
    }

    /// Produce an edited copy carrying a new revision stamp
    pub fn revise(&self, events: Vec<DominanceEvent>, last_modified: u64) -> Self {
        Self::new(
            self.id.clone(),
            self.mode,
            events,
            self.swallow_time,
            self.total_duration,
            last_modified,
        )
    }

    pub fn id(&self) -> &ProfileId {
        &self.id
    }

    pub fn mode(&self) -> TastingMode {
        self.mode
    }

    /// Events ordered by start time
    pub fn events(&self) -> &[DominanceEvent] {
        &self.events
    }

    pub fn swallow_time(&self) -> Option<f64> {
        self.swallow_time
    }

    pub fn total_duration(&self) -> f64 {
        self.total_duration
    }

    pub fn last_modified(&self) -> u64 {
        self.last_modified
    }

    pub fn key(&self) -> ProfileKey {
        ProfileKey {
            id: self.id.clone(),
            last_modified: self.last_modified,
        }
    }

    /// Earliest event start, if any event exists
    pub fn first_onset(&self) -> Option<f64> {
        self.events.first().map(|e| e.start)
    }

    /// End of the oral window: the swallow marker, or the whole capture
    pub fn oral_end(&self) -> f64 {
        self.swallow_time.unwrap_or(self.total_duration)
    }

    /// Swallow marker when it falls strictly inside `(first_onset, total_duration)`
    pub fn valid_swallow(&self) -> Option<f64> {
        let onset = self.first_onset()?;
        self.swallow_time
            .filter(|&s| s > onset && s < self.total_duration)
    }
}
