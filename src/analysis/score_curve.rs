// ScoreCurve - duration percent to 0-10 score calibration
//
// The mapping from "percent of the oral window an attribute was dominant"
// to a score is calibration data, not logic. It is re-tuned as panels
// compare TDS scores with their conventional scores, so it lives in
// configuration as a list of breakpoints and is evaluated as a
// non-decreasing step function.
//
// Default anchors:
// - trace     (< 5%)   → 1-2
// - distinct  (10-15%) → 3-5
// - dominant  (> 30%)  → 7+
// - whole window       → 10

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Lowest duration percent that earns `score`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakpoint {
    pub min_percent: f64,
    pub score: f64,
}

/// Stepped, monotonic duration-percent → score mapping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoreCurve {
    breakpoints: Vec<ScoreBreakpoint>,
}

impl Default for ScoreCurve {
    fn default() -> Self {
        let table = [
            (0.0, 1.0),
            (2.5, 2.0),
            (5.0, 3.0),
            (10.0, 4.0),
            (15.0, 5.0),
            (20.0, 6.0),
            (30.0, 7.0),
            (45.0, 8.0),
            (60.0, 9.0),
            (80.0, 10.0),
        ];
        Self {
            breakpoints: table
                .iter()
                .map(|&(min_percent, score)| ScoreBreakpoint { min_percent, score })
                .collect(),
        }
    }
}

impl ScoreCurve {
    /// Build a curve, validating breakpoint order and ranges
    pub fn new(breakpoints: Vec<ScoreBreakpoint>) -> Result<Self, ConfigError> {
        let curve = Self { breakpoints };
        curve.validate()?;
        Ok(curve)
    }

    pub fn breakpoints(&self) -> &[ScoreBreakpoint] {
        &self.breakpoints
    }

    /// Score for a duration percent
    ///
    /// Zero (or any non-positive / NaN) percent always scores 0: an
    /// attribute that was never dominant is not rated.
    pub fn score(&self, duration_percent: f64) -> f64 {
        if !(duration_percent > 0.0) {
            return 0.0;
        }
        self.breakpoints
            .iter()
            .take_while(|bp| bp.min_percent <= duration_percent)
            .last()
            .map(|bp| bp.score)
            .unwrap_or(0.0)
    }

    /// Highest score the curve can produce
    pub fn max_score(&self) -> f64 {
        self.breakpoints.last().map(|bp| bp.score).unwrap_or(0.0)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.breakpoints.is_empty() {
            return Err(ConfigError::invalid("score_curve", "at least one breakpoint required"));
        }
        for bp in &self.breakpoints {
            if !(0.0..=100.0).contains(&bp.min_percent) {
                return Err(ConfigError::invalid(
                    "score_curve",
                    format!("min_percent {} outside [0, 100]", bp.min_percent),
                ));
            }
            if !(0.0..=10.0).contains(&bp.score) {
                return Err(ConfigError::invalid(
                    "score_curve",
                    format!("score {} outside [0, 10]", bp.score),
                ));
            }
        }
        for pair in self.breakpoints.windows(2) {
            if pair[1].min_percent <= pair[0].min_percent {
                return Err(ConfigError::invalid(
                    "score_curve",
                    format!(
                        "breakpoints not strictly increasing at {}%",
                        pair[1].min_percent
                    ),
                ));
            }
            if pair[1].score < pair[0].score {
                return Err(ConfigError::invalid(
                    "score_curve",
                    format!("score decreases at {}%", pair[1].min_percent),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "score_curve_tests.rs"]
mod tests;
