// Managers Module
//
// Stateful wrappers around the pure analysis core.
//
// - CurveManager: memoizes score, density and aggregate results per profile
//   revision and runs the work on the blocking pool for async callers

pub mod curve_manager;

pub use curve_manager::{CacheStats, CurveManager};
