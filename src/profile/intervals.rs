// Interval arithmetic shared by the scorer and the aggregator
//
// Dominance events for one attribute may overlap after manual edits or may
// touch end-to-start across the swallow marker. Everything that measures
// coverage works on merged intervals so nothing is counted twice.

use crate::profile::{AttributeId, AttributeMap, DominanceEvent};

/// Intervals closer than this are treated as touching
const ADJACENCY_EPSILON: f64 = 1e-6;

/// Half-open time span in seconds
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Interval {
    pub start: f64,
    pub end: f64,
}

impl Interval {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Length in seconds (never negative)
    pub fn len(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() <= 0.0
    }

    /// Restrict to `[lo, hi]`, or `None` when nothing is left
    pub fn clip(&self, lo: f64, hi: f64) -> Option<Interval> {
        let start = self.start.max(lo);
        let end = self.end.min(hi);
        if end > start {
            Some(Interval { start, end })
        } else {
            None
        }
    }
}

impl From<&DominanceEvent> for Interval {
    fn from(event: &DominanceEvent) -> Self {
        Interval::new(event.start, event.end)
    }
}

/// Merge overlapping or adjacent intervals
///
/// # Returns
/// Disjoint intervals sorted by start
pub fn merge_intervals(mut intervals: Vec<Interval>) -> Vec<Interval> {
    intervals.retain(|i| !i.is_empty());
    intervals.sort_by(|a, b| a.start.total_cmp(&b.start));

    let mut merged: Vec<Interval> = Vec::with_capacity(intervals.len());
    for interval in intervals {
        match merged.last_mut() {
            Some(last) if interval.start <= last.end + ADJACENCY_EPSILON => {
                last.end = last.end.max(interval.end);
            }
            _ => merged.push(interval),
        }
    }
    merged
}

/// Seconds of `[lo, hi]` covered by a merged interval list
pub fn covered_within(merged: &[Interval], lo: f64, hi: f64) -> f64 {
    if hi <= lo {
        return 0.0;
    }
    merged
        .iter()
        .filter_map(|i| i.clip(lo, hi))
        .map(|i| i.len())
        .sum()
}

/// Group events by attribute and merge each group
///
/// `route` decides which bucket an event lands in; returning `None` drops
/// the event. This is how normal-mode scoring folds child attributes into
/// their parent.
pub fn merged_by_attribute<F>(events: &[DominanceEvent], route: F) -> AttributeMap<Vec<Interval>>
where
    F: Fn(AttributeId) -> Option<AttributeId>,
{
    let mut grouped: AttributeMap<Vec<Interval>> = AttributeMap::new();
    for event in events {
        if let Some(bucket) = route(event.attribute) {
            grouped.entry(bucket).or_default().push(Interval::from(event));
        }
    }
    grouped
        .into_iter()
        .map(|(attr, intervals)| (attr, merge_intervals(intervals)))
        .collect()
}
