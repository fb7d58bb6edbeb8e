// Cacao TDS Core - Temporal Dominance of Sensations for cacao grading
// Live capture, zone scoring, density curves and panel aggregation

// Module declarations
pub mod analysis;
pub mod capture;
pub mod config;
pub mod error;
pub mod fixtures;
pub mod managers;
pub mod profile;

// Re-exports for convenience
pub use analysis::{
    AggregatedCurve, DensityEstimator, DensitySample, ReplicationAggregator,
    TastingAnalysisResult, ZoneScorer,
};
pub use capture::CaptureSession;
pub use config::AppConfig;
pub use managers::CurveManager;
pub use profile::{AttributeId, DominanceEvent, ProfileRecord, TastingMode, TastingProfile};

/// Environment variable overriding the log level (`error` .. `trace`)
pub const LOG_LEVEL_ENV: &str = "TDS_LOG";

/// Install the fmt subscriber for binaries and tests
///
/// `log` records from library code are bridged into the subscriber. Output
/// goes to stderr so stdout stays clean for JSON reports. Safe to call more
/// than once; later calls are no-ops.
pub fn init_logging() {
    let level = std::env::var(LOG_LEVEL_ENV)
        .ok()
        .and_then(|value| value.parse::<tracing::Level>().ok())
        .unwrap_or(tracing::Level::INFO);

    if tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
    {
        log::debug!("[Logging] Initialized at level {}", level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_is_idempotent() {
        init_logging();
        init_logging();
    }
}
