// ReplicationAggregator - population TDS curve across replications
//
// Replications differ in pace, so each is mapped onto a normalized axis of
// 131 slices before counting:
//   0..=100   percent of the oral window [first onset, swallow]
//   100..=130 the aftertaste [swallow, end] compressed to 30 slices
// A replication without a usable swallow marker falls back to a single
// 0..=100 mapping over [first onset, end].
//
// The dominance rate at a slice is the fraction of replications in which an
// attribute was dominant there. Rates are then smoothed across slices and
// compared against the chance level P0 = 1/k and the significance level
// Ps = P0 + z·sqrt(P0(1-P0)/n).

use serde::{Deserialize, Serialize};

use crate::analysis::kernel::smooth_series;
use crate::config::AggregationConfig;
use crate::profile::{merged_by_attribute, AttributeId, AttributeMap, Interval, TastingProfile};

pub const ORAL_SLICES: usize = 100;
pub const AFTERTASTE_SLICES: usize = 30;
/// Slices 0..=130
pub const SLICE_COUNT: usize = ORAL_SLICES + AFTERTASTE_SLICES + 1;

/// Slack when snapping mapped positions to whole slices
const SLICE_EPSILON: f64 = 1e-9;

/// Chance level for `k` attributes (0 when none are tracked)
pub fn chance_level(attribute_count: usize) -> f64 {
    if attribute_count == 0 {
        0.0
    } else {
        1.0 / attribute_count as f64
    }
}

/// One-tailed significance level, capped at 1
///
/// With no replications there is no evidence at all, so the level is 1.
pub fn significance_level(chance: f64, replications: usize, z_score: f64) -> f64 {
    if replications == 0 {
        return 1.0;
    }
    let spread = (chance * (1.0 - chance) / replications as f64).max(0.0).sqrt();
    (chance + z_score * spread).min(1.0).max(chance)
}

/// Contiguous slice range where an attribute's rate stays at or above Ps
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SliceSpan {
    pub start: usize,
    /// Inclusive
    pub end: usize,
    pub peak_rate: f64,
}

/// Smoothed population curve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedCurve {
    /// `SLICE_COUNT` points, each with a rate for every tracked attribute
    pub points: Vec<AttributeMap<f64>>,
    pub chance_level: f64,
    pub significance_level: f64,
    pub replication_count: usize,
    pub attributes: Vec<AttributeId>,
}

impl AggregatedCurve {
    /// Smoothed rate of one attribute at one slice (0 when out of range)
    pub fn rate(&self, slice: usize, attribute: AttributeId) -> f64 {
        self.points
            .get(slice)
            .and_then(|point| point.get(&attribute))
            .copied()
            .unwrap_or(0.0)
    }

    /// One attribute's rate at every slice
    pub fn series(&self, attribute: AttributeId) -> Vec<f64> {
        (0..self.points.len()).map(|i| self.rate(i, attribute)).collect()
    }

    /// Highest point of one attribute's curve as `(slice, rate)`
    pub fn peak(&self, attribute: AttributeId) -> Option<(usize, f64)> {
        self.series(attribute)
            .into_iter()
            .enumerate()
            .fold(None, |best, (slice, rate)| match best {
                Some((_, top)) if top >= rate => best,
                _ => Some((slice, rate)),
            })
    }

    /// Per attribute, the slice ranges where the rate reaches significance
    pub fn significant_spans(&self) -> AttributeMap<Vec<SliceSpan>> {
        let mut spans = AttributeMap::new();
        if self.replication_count == 0 {
            return spans;
        }

        for attribute in &self.attributes {
            let mut found: Vec<SliceSpan> = Vec::new();
            let mut open: Option<SliceSpan> = None;
            for (slice, rate) in self.series(*attribute).into_iter().enumerate() {
                if rate > 0.0 && rate >= self.significance_level {
                    match open.as_mut() {
                        Some(span) => {
                            span.end = slice;
                            span.peak_rate = span.peak_rate.max(rate);
                        }
                        None => {
                            open = Some(SliceSpan {
                                start: slice,
                                end: slice,
                                peak_rate: rate,
                            })
                        }
                    }
                } else if let Some(span) = open.take() {
                    found.push(span);
                }
            }
            found.extend(open);
            if !found.is_empty() {
                spans.insert(*attribute, found);
            }
        }
        spans
    }
}

/// Map `[a, b]` (already in slice units) onto whole slices
///
/// Covers every slice index inside the range; an interval too short to
/// contain one still marks the slice nearest its midpoint.
fn slice_range(a: f64, b: f64, offset: usize, max_slice: usize) -> (usize, usize) {
    let lo = (a - SLICE_EPSILON).ceil().max(0.0);
    let hi = (b + SLICE_EPSILON).floor().max(0.0);
    let (lo, hi) = if lo <= hi {
        (lo as usize, hi as usize)
    } else {
        let mid = ((a + b) / 2.0).round().max(0.0) as usize;
        (mid, mid)
    };
    ((lo + offset).min(max_slice), (hi + offset).min(max_slice))
}

fn mark(
    presence: &mut [bool],
    intervals: &[Interval],
    window: (f64, f64),
    span: f64,
    offset: usize,
    max_slice: usize,
) {
    let (start, end) = window;
    let length = end - start;
    if length <= 0.0 {
        return;
    }
    for clipped in intervals.iter().filter_map(|i| i.clip(start, end)) {
        let a = (clipped.start - start) / length * span;
        let b = (clipped.end - start) / length * span;
        let (lo, hi) = slice_range(a, b, offset, max_slice);
        for flag in &mut presence[lo..=hi] {
            *flag = true;
        }
    }
}

/// Cross-replication aggregator
#[derive(Debug, Clone, Default)]
pub struct ReplicationAggregator {
    config: AggregationConfig,
}

impl ReplicationAggregator {
    pub fn new(config: AggregationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AggregationConfig {
        &self.config
    }

    /// Slice presence of each attribute in one replication
    ///
    /// # Returns
    /// For every requested attribute, `SLICE_COUNT` flags
    pub fn presence(
        &self,
        profile: &TastingProfile,
        attributes: &[AttributeId],
    ) -> AttributeMap<Vec<bool>> {
        let mut presence: AttributeMap<Vec<bool>> = attributes
            .iter()
            .map(|attr| (*attr, vec![false; SLICE_COUNT]))
            .collect();

        let Some(onset) = profile.first_onset() else {
            return presence;
        };
        let total = profile.total_duration();
        let merged = merged_by_attribute(profile.events(), |attr| {
            attributes.contains(&attr).then_some(attr)
        });

        for (attribute, intervals) in &merged {
            let Some(flags) = presence.get_mut(attribute) else {
                continue;
            };
            match profile.valid_swallow() {
                Some(swallow) => {
                    mark(flags, intervals, (onset, swallow), ORAL_SLICES as f64, 0, ORAL_SLICES);
                    mark(
                        flags,
                        intervals,
                        (swallow, total),
                        AFTERTASTE_SLICES as f64,
                        ORAL_SLICES,
                        SLICE_COUNT - 1,
                    );
                }
                None => {
                    mark(flags, intervals, (onset, total), ORAL_SLICES as f64, 0, ORAL_SLICES);
                }
            }
        }
        presence
    }

    /// Unsmoothed dominance rates: share of replications with each
    /// attribute present at each slice
    pub fn dominance_rates(
        &self,
        replications: &[TastingProfile],
        attributes: &[AttributeId],
    ) -> AttributeMap<Vec<f64>> {
        let mut counts: AttributeMap<Vec<usize>> = attributes
            .iter()
            .map(|attr| (*attr, vec![0; SLICE_COUNT]))
            .collect();

        for replication in replications {
            if replication.valid_swallow().is_none() {
                log::debug!(
                    "[Aggregator] {}: no usable swallow marker, single-phase mapping",
                    replication.id()
                );
            }
            for (attribute, flags) in self.presence(replication, attributes) {
                if let Some(slots) = counts.get_mut(&attribute) {
                    for (count, present) in slots.iter_mut().zip(flags) {
                        if present {
                            *count += 1;
                        }
                    }
                }
            }
        }

        let n = replications.len();
        counts
            .into_iter()
            .map(|(attr, slots)| {
                let rates = slots
                    .into_iter()
                    .map(|c| if n == 0 { 0.0 } else { c as f64 / n as f64 })
                    .collect();
                (attr, rates)
            })
            .collect()
    }

    /// Smoothed population curve with chance and significance levels
    ///
    /// # Arguments
    /// * `replications` - Tastings of the same sample
    /// * `attributes` - Tracked attributes; `k` for the chance level
    pub fn aggregate(
        &self,
        replications: &[TastingProfile],
        attributes: &[AttributeId],
    ) -> AggregatedCurve {
        let mut tracked: Vec<AttributeId> = attributes.to_vec();
        tracked.sort();
        tracked.dedup();

        let n = replications.len();
        let smoothed: AttributeMap<Vec<f64>> = self
            .dominance_rates(replications, &tracked)
            .into_iter()
            .map(|(attr, rates)| {
                let series = smooth_series(&rates, self.config.sigma_slices, self.config.cutoff_sigmas);
                (attr, series)
            })
            .collect();

        let points = (0..SLICE_COUNT)
            .map(|slice| {
                smoothed
                    .iter()
                    .map(|(attr, series)| (*attr, series[slice]))
                    .collect()
            })
            .collect();

        let chance = chance_level(tracked.len());
        let significance = significance_level(chance, n, self.config.z_score);

        log::info!(
            "[Aggregator] {} replication(s), {} attribute(s): P0 {:.3}, Ps {:.3}",
            n,
            tracked.len(),
            chance,
            significance
        );

        AggregatedCurve {
            points,
            chance_level: chance,
            significance_level: significance,
            replication_count: n,
            attributes: tracked,
        }
    }
}
