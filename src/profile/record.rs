// Export record codec
//
// Stored tastings embed their dominance intervals as one array per
// attribute, each entry `{start, end}` rounded to 0.01s. This module turns
// such a record back into a TastingProfile and vice versa. Keys that do not
// name a known attribute are skipped so that records written by newer
// product profiles still load.

use std::collections::BTreeMap;

use crate::error::{log_profile_error, ProfileError};
use crate::profile::{
    AttributeId, DominanceEvent, Phase, ProfileId, TastingMode, TastingProfile,
};

/// One stored interval
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct IntervalEntry {
    pub start: f64,
    pub end: f64,
}

/// Serializable form of a tasting, as embedded in an exported row
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ProfileRecord {
    pub id: ProfileId,
    #[serde(default)]
    pub mode: TastingMode,
    #[serde(default)]
    pub swallow_time: Option<f64>,
    pub total_duration: f64,
    #[serde(default)]
    pub last_modified: u64,
    #[serde(default)]
    pub intervals: BTreeMap<String, Vec<IntervalEntry>>,
}

/// Round seconds to the stored 0.01s precision
pub fn round_centis(seconds: f64) -> f64 {
    (seconds * 100.0).round() / 100.0
}

impl ProfileRecord {
    /// Parse a record from JSON
    ///
    /// # Errors
    /// `ProfileError::MalformedRecord` when the JSON is not a record at all
    /// (wrong shape, `intervals` not a map of arrays). Bad timing values
    /// inside a well-formed record are sanitized later, not rejected.
    pub fn from_json(json: &str) -> Result<Self, ProfileError> {
        serde_json::from_str(json).map_err(|err| {
            let err = ProfileError::MalformedRecord {
                reason: err.to_string(),
            };
            log_profile_error(&err, "from_json");
            err
        })
    }

    pub fn to_json(&self) -> Result<String, ProfileError> {
        serde_json::to_string(self).map_err(|err| {
            let err = ProfileError::EncodeFailed {
                reason: err.to_string(),
            };
            log_profile_error(&err, "to_json");
            err
        })
    }

    /// Rebuild an immutable profile, skipping unknown attribute keys
    pub fn into_profile(self) -> TastingProfile {
        let mut events = Vec::new();
        for (key, entries) in &self.intervals {
            let attribute = match key.parse::<AttributeId>() {
                Ok(attribute) => attribute,
                Err(err) => {
                    log::warn!("[ProfileRecord] {}: skipping {}", self.id, err);
                    continue;
                }
            };
            events.extend(entries.iter().map(|entry| {
                DominanceEvent::new(attribute, entry.start, entry.end, Phase::Melting)
            }));
        }

        TastingProfile::new(
            self.id,
            self.mode,
            events,
            self.swallow_time,
            self.total_duration,
            self.last_modified,
        )
    }
}

impl From<&TastingProfile> for ProfileRecord {
    fn from(profile: &TastingProfile) -> Self {
        let mut intervals: BTreeMap<String, Vec<IntervalEntry>> = BTreeMap::new();
        for event in profile.events() {
            intervals
                .entry(event.attribute.as_str().to_string())
                .or_default()
                .push(IntervalEntry {
                    start: round_centis(event.start),
                    end: round_centis(event.end),
                });
        }

        Self {
            id: profile.id().clone(),
            mode: profile.mode(),
            swallow_time: profile.swallow_time().map(round_centis),
            total_duration: round_centis(profile.total_duration()),
            last_modified: profile.last_modified(),
            intervals,
        }
    }
}

impl From<TastingProfile> for ProfileRecord {
    fn from(profile: TastingProfile) -> Self {
        ProfileRecord::from(&profile)
    }
}

impl From<ProfileRecord> for TastingProfile {
    fn from(record: ProfileRecord) -> Self {
        record.into_profile()
    }
}
