//! Synthetic replication fixtures.
//!
//! Generates plausible tastings from a seed so aggregation, the CLI and the
//! integration tests can work with realistic panels without recorded data.
//! The same seed always yields the same profiles.

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::profile::{AttributeId, DominanceEvent, Phase, ProfileId, TastingMode, TastingProfile};

/// Shape of the synthetic panel
#[derive(Debug, Clone)]
pub struct ReplicationSpec {
    /// Attributes evaluators pick from, in the order they tend to emerge
    pub attributes: Vec<AttributeId>,
    /// Delay before the first selection, seconds
    pub onset_secs: (f64, f64),
    /// Oral (melting) phase length, seconds
    pub oral_secs: (f64, f64),
    /// Aftertaste length after the swallow, seconds
    pub aftertaste_secs: (f64, f64),
    /// Typical time one attribute stays selected
    pub mean_dwell_secs: f64,
    /// Chance that no attribute is selected for a stretch
    pub gap_probability: f64,
    /// Chance the evaluator pressed swallow
    pub swallow_probability: f64,
    pub mode: TastingMode,
    pub id_prefix: String,
}

impl Default for ReplicationSpec {
    fn default() -> Self {
        Self {
            attributes: vec![
                AttributeId::Cacao,
                AttributeId::Acidity,
                AttributeId::Bitterness,
                AttributeId::FreshFruit,
                AttributeId::Nutty,
                AttributeId::Roast,
            ],
            onset_secs: (0.5, 2.0),
            oral_secs: (15.0, 30.0),
            aftertaste_secs: (10.0, 20.0),
            mean_dwell_secs: 4.0,
            gap_probability: 0.1,
            swallow_probability: 0.9,
            mode: TastingMode::Normal,
            id_prefix: "synthetic".to_string(),
        }
    }
}

/// Deterministic generator of synthetic replications
pub struct ReplicationGenerator {
    spec: ReplicationSpec,
    rng: StdRng,
    generated: u64,
}

impl ReplicationGenerator {
    pub fn new(spec: ReplicationSpec, seed: u64) -> Self {
        Self {
            spec,
            rng: StdRng::seed_from_u64(seed),
            generated: 0,
        }
    }

    pub fn with_defaults(seed: u64) -> Self {
        Self::new(ReplicationSpec::default(), seed)
    }

    pub fn spec(&self) -> &ReplicationSpec {
        &self.spec
    }

    /// Next synthetic tasting
    pub fn generate(&mut self) -> TastingProfile {
        let index = self.generated;
        self.generated += 1;

        let onset = self.sample(self.spec.onset_secs);
        let swallow = onset + self.sample(self.spec.oral_secs);
        let total = swallow + self.sample(self.spec.aftertaste_secs);
        let pressed_swallow = self.rng.gen_bool(self.spec.swallow_probability.clamp(0.0, 1.0));

        let mut events = Vec::new();
        let mut t = onset;
        let dwell = self.spec.mean_dwell_secs.max(0.1);
        while t < total && !self.spec.attributes.is_empty() {
            let length = self.rng.gen_range(0.5 * dwell..1.5 * dwell);
            let end = (t + length).min(total);
            if !self.rng.gen_bool(self.spec.gap_probability.clamp(0.0, 1.0)) || events.is_empty() {
                let attribute = self.pick_attribute((t - onset) / (total - onset));
                events.push(DominanceEvent::new(attribute, t, end, Phase::Melting));
            }
            t = end;
        }

        TastingProfile::new(
            ProfileId(format!("{}-{:03}", self.spec.id_prefix, index)),
            self.spec.mode,
            events,
            pressed_swallow.then_some(swallow),
            total,
            index + 1,
        )
    }

    /// `count` consecutive replications
    pub fn generate_many(&mut self, count: usize) -> Vec<TastingProfile> {
        (0..count).map(|_| self.generate()).collect()
    }

    fn sample(&mut self, (lo, hi): (f64, f64)) -> f64 {
        if hi > lo {
            self.rng.gen_range(lo..hi)
        } else {
            lo.max(0.0)
        }
    }

    /// Attributes later in the list become likelier as the tasting goes on
    fn pick_attribute(&mut self, progress: f64) -> AttributeId {
        let count = self.spec.attributes.len();
        let favoured = ((progress.clamp(0.0, 1.0) * count as f64) as usize).min(count - 1);
        if self.rng.gen_bool(0.6) {
            self.spec.attributes[favoured]
        } else {
            self.spec.attributes[self.rng.gen_range(0..count)]
        }
    }
}
