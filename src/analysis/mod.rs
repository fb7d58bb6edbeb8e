// Analysis module - pure computations over captured tastings
//
// This module turns immutable TastingProfiles into results:
// - ZoneScorer: per-attribute scores, flags and advisory boosts
// - DensityEstimator: single-session share-of-sensation curve
// - ReplicationAggregator: population curve with chance/significance levels
//
// Calibration data (score curve, boost policy) lives next to the scorer and
// is injected through ProductConfig. Nothing here holds state between calls.

pub mod aggregate;
pub mod boost;
pub mod density;
pub mod kernel;
pub mod score_curve;
pub mod scorer;
pub mod types;

pub use aggregate::{
    chance_level, significance_level, AggregatedCurve, ReplicationAggregator, SliceSpan,
    AFTERTASTE_SLICES, ORAL_SLICES, SLICE_COUNT,
};
pub use boost::{BoostDetails, BoostPolicy, BoostStep};
pub use density::{DensityEstimator, DensitySample};
pub use score_curve::{ScoreBreakpoint, ScoreCurve};
pub use scorer::ZoneScorer;
pub use types::{
    AftertasteQuality, AttributeCategory, AttributeScoreResult, ExportColumns,
    TastingAnalysisResult,
};
