// DensityEstimator - single-session "share of sensation" curve
//
// Each dominance interval is spread with a Gaussian kernel so the curve rises
// before an interval starts and decays after it ends. At every grid point the
// per-attribute densities are normalized against their sum plus a silence
// constant: where nothing is dominant the shares fade towards zero instead of
// jumping to 1 for whichever attribute happens to be nearest.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::analysis::kernel::{distance_to_interval, gaussian};
use crate::config::DensityConfig;
use crate::profile::{AttributeId, AttributeMap, DominanceEvent, TastingProfile};

/// Guards the grid size against float error (`20.0 / 0.1` is not exactly 200)
const GRID_EPSILON: f64 = 1e-9;

/// One point of the density curve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DensitySample {
    /// Seconds since capture start
    pub time: f64,
    /// Share of sensation per requested attribute, each in `[0, 1)`
    pub shares: AttributeMap<f64>,
}

impl DensitySample {
    /// Sum of all shares at this point (always < 1)
    pub fn total_share(&self) -> f64 {
        self.shares.values().sum()
    }
}

/// Stateless Gaussian density estimator
#[derive(Debug, Clone, Default)]
pub struct DensityEstimator {
    config: DensityConfig,
}

impl DensityEstimator {
    pub fn new(config: DensityConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DensityConfig {
        &self.config
    }

    /// Density curve for a profile over the given attributes
    pub fn estimate_profile(
        &self,
        profile: &TastingProfile,
        attributes: &[AttributeId],
    ) -> Vec<DensitySample> {
        self.estimate(profile.events(), profile.total_duration(), attributes)
    }

    /// Density curve on a regular grid over `[0, total_duration]`
    ///
    /// # Arguments
    /// * `events` - Dominance intervals; invalid ones are skipped
    /// * `total_duration` - End of the grid in seconds
    /// * `attributes` - Attributes to report; events for others are ignored
    ///
    /// # Returns
    /// One sample per grid point, every requested attribute present in each
    pub fn estimate(
        &self,
        events: &[DominanceEvent],
        total_duration: f64,
        attributes: &[AttributeId],
    ) -> Vec<DensitySample> {
        let total_duration = if total_duration.is_finite() {
            total_duration.max(0.0)
        } else {
            0.0
        };
        let resolution = if self.config.resolution_secs > 0.0 {
            self.config.resolution_secs
        } else {
            DensityConfig::default().resolution_secs
        };
        let sigma = self.config.sigma_secs.max(f64::EPSILON);
        let cutoff = self.config.cutoff_sigmas.max(0.0) * sigma;
        let silence = self.config.silence_constant.max(f64::MIN_POSITIVE);

        let requested: BTreeSet<AttributeId> = attributes.iter().copied().collect();
        let relevant: Vec<&DominanceEvent> = events
            .iter()
            .filter(|e| requested.contains(&e.attribute))
            .filter(|e| e.start.is_finite() && e.end.is_finite() && e.end > e.start)
            .collect();

        let steps = (total_duration / resolution + GRID_EPSILON).floor() as usize;
        let mut samples = Vec::with_capacity(steps + 1);

        for i in 0..=steps {
            let time = i as f64 * resolution;
            let mut densities: AttributeMap<f64> =
                requested.iter().map(|attr| (*attr, 0.0)).collect();

            for event in &relevant {
                let distance = distance_to_interval(time, event.start, event.end);
                if distance <= cutoff {
                    if let Some(density) = densities.get_mut(&event.attribute) {
                        *density += gaussian(distance, sigma);
                    }
                }
            }

            let norm: f64 = densities.values().sum::<f64>() + silence;
            let shares = densities
                .into_iter()
                .map(|(attr, density)| (attr, density / norm))
                .collect();
            samples.push(DensitySample { time, shares });
        }

        log::debug!(
            "[DensityEstimator] {} sample(s) from {} event(s) over {:.2}s",
            samples.len(),
            relevant.len(),
            total_duration
        );
        samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::Phase;

    fn ev(attribute: AttributeId, start: f64, end: f64) -> DominanceEvent {
        DominanceEvent::new(attribute, start, end, Phase::Melting)
    }

    fn create_estimator() -> DensityEstimator {
        DensityEstimator::new(DensityConfig::default())
    }

    #[test]
    fn test_grid_covers_total_duration() {
        let samples = create_estimator().estimate(&[], 20.0, &[AttributeId::Cacao]);
        assert_eq!(samples.len(), 201);
        assert_eq!(samples[0].time, 0.0);
        assert!((samples[200].time - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_shares_sum_below_one() {
        let events = vec![
            ev(AttributeId::Cacao, 0.0, 6.0),
            ev(AttributeId::Floral, 5.0, 12.0),
            ev(AttributeId::Nutty, 11.0, 20.0),
        ];
        let attrs = [AttributeId::Cacao, AttributeId::Floral, AttributeId::Nutty];
        for sample in create_estimator().estimate(&events, 20.0, &attrs) {
            let total = sample.total_share();
            assert!(total.is_finite());
            assert!(total <= 1.0, "shares sum to {} at t={}", total, sample.time);
            for share in sample.shares.values() {
                assert!(*share >= 0.0);
            }
        }
    }

    #[test]
    fn test_inside_interval_share_is_high() {
        let events = vec![ev(AttributeId::Cacao, 0.0, 10.0)];
        let samples = create_estimator().estimate(&events, 20.0, &[AttributeId::Cacao]);
        let mid = &samples[50];
        // 1 / (1 + 0.2)
        assert!((mid.shares[&AttributeId::Cacao] - 1.0 / 1.2).abs() < 1e-9);
    }

    #[test]
    fn test_shares_vanish_far_from_events() {
        let events = vec![ev(AttributeId::Cacao, 0.0, 2.0)];
        let samples = create_estimator().estimate(&events, 30.0, &[AttributeId::Cacao]);
        let far = samples.last().unwrap();
        assert_eq!(far.shares[&AttributeId::Cacao], 0.0);
    }

    #[test]
    fn test_share_decays_after_interval_end() {
        let events = vec![ev(AttributeId::Cacao, 0.0, 5.0)];
        let samples = create_estimator().estimate(&events, 15.0, &[AttributeId::Cacao]);
        let at = |t: usize| samples[t].shares[&AttributeId::Cacao];
        assert!(at(50) > at(60));
        assert!(at(60) > at(80));
        assert!(at(80) > 0.0);
    }

    #[test]
    fn test_unrequested_attributes_ignored() {
        let events = vec![
            ev(AttributeId::Cacao, 0.0, 10.0),
            ev(AttributeId::Mouldy, 0.0, 10.0),
        ];
        let samples = create_estimator().estimate(&events, 10.0, &[AttributeId::Cacao]);
        assert!(!samples[0].shares.contains_key(&AttributeId::Mouldy));
        assert!((samples[50].shares[&AttributeId::Cacao] - 1.0 / 1.2).abs() < 1e-9);
    }

    #[test]
    fn test_deterministic() {
        let events = vec![ev(AttributeId::Cacao, 1.0, 4.0), ev(AttributeId::Floral, 4.0, 9.0)];
        let attrs = [AttributeId::Cacao, AttributeId::Floral];
        let estimator = create_estimator();
        assert_eq!(
            estimator.estimate(&events, 10.0, &attrs),
            estimator.estimate(&events, 10.0, &attrs)
        );
    }

    #[test]
    fn test_degenerate_inputs() {
        let estimator = create_estimator();
        let samples = estimator.estimate(&[], f64::NAN, &[AttributeId::Cacao]);
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].shares[&AttributeId::Cacao], 0.0);

        let inverted = vec![ev(AttributeId::Cacao, 5.0, 2.0)];
        let samples = estimator.estimate(&inverted, 10.0, &[AttributeId::Cacao]);
        assert!(samples.iter().all(|s| s.total_share() == 0.0));
    }
}
