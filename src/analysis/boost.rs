// Aftertaste boost policy
//
// An attribute that keeps dominating after the swallow marker is a sign the
// evaluator may have under-rated it. The scorer never changes the score; it
// attaches an advisory `BoostDetails` that the grading form can offer to the
// evaluator. How much to suggest is product calibration, so the amount is a
// configurable policy.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Advisory score increase
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoostDetails {
    /// Suggested score points to add
    pub amount: f64,
    /// Seconds of evidence behind the suggestion
    pub duration: f64,
}

impl BoostDetails {
    /// Combine two suggestions for the same attribute
    pub fn merge(self, other: BoostDetails) -> BoostDetails {
        BoostDetails {
            amount: self.amount + other.amount,
            duration: self.duration + other.duration,
        }
    }
}

/// One row of a stepped boost table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoostStep {
    pub min_secs: f64,
    pub amount: f64,
}

/// Residual duration → suggested boost
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BoostPolicy {
    /// `base_amount + (residual - min_presence) × per_second`, capped and
    /// rounded to `step`
    Linear {
        min_presence_secs: f64,
        base_amount: f64,
        per_second: f64,
        max_amount: f64,
        step: f64,
    },
    /// Amount of the highest row whose `min_secs` the residual reaches
    Stepped {
        min_presence_secs: f64,
        steps: Vec<BoostStep>,
    },
}

impl Default for BoostPolicy {
    fn default() -> Self {
        BoostPolicy::Linear {
            min_presence_secs: 5.0,
            base_amount: 0.5,
            per_second: 0.25,
            max_amount: 2.0,
            step: 0.5,
        }
    }
}

impl BoostPolicy {
    /// Residual seconds that must be exceeded before any boost is offered
    pub fn min_presence_secs(&self) -> f64 {
        match self {
            BoostPolicy::Linear {
                min_presence_secs, ..
            }
            | BoostPolicy::Stepped {
                min_presence_secs, ..
            } => *min_presence_secs,
        }
    }

    /// Suggested boost for an attribute's residual (aftertaste) duration
    ///
    /// # Returns
    /// `None` when the residual does not exceed the minimum presence or the
    /// policy yields no positive amount
    pub fn evaluate(&self, residual_secs: f64) -> Option<BoostDetails> {
        if !(residual_secs > self.min_presence_secs()) {
            return None;
        }

        let amount = match self {
            BoostPolicy::Linear {
                min_presence_secs,
                base_amount,
                per_second,
                max_amount,
                step,
            } => {
                let raw = base_amount + (residual_secs - min_presence_secs) * per_second;
                let capped = raw.min(*max_amount);
                if *step > 0.0 {
                    ((capped / step).round() * step).min(*max_amount)
                } else {
                    capped
                }
            }
            BoostPolicy::Stepped { steps, .. } => steps
                .iter()
                .take_while(|s| s.min_secs <= residual_secs)
                .last()
                .map(|s| s.amount)
                .unwrap_or(0.0),
        };

        (amount > 0.0).then_some(BoostDetails {
            amount,
            duration: residual_secs,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.min_presence_secs() >= 0.0) {
            return Err(ConfigError::invalid("boost.min_presence_secs", "must be >= 0"));
        }
        match self {
            BoostPolicy::Linear {
                base_amount,
                per_second,
                max_amount,
                step,
                ..
            } => {
                let all_non_negative = [*base_amount, *per_second, *max_amount, *step]
                    .iter()
                    .all(|v| *v >= 0.0);
                if !all_non_negative {
                    return Err(ConfigError::invalid("boost", "linear parameters must be >= 0"));
                }
            }
            BoostPolicy::Stepped { steps, .. } => {
                if steps.windows(2).any(|w| w[1].min_secs <= w[0].min_secs) {
                    return Err(ConfigError::invalid(
                        "boost.steps",
                        "min_secs must be strictly increasing",
                    ));
                }
            }
        }
        Ok(())
    }
}
