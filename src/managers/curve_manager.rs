// CurveManager: memoizing front for the pure analysis functions
//
// Single Responsibility: cache and dispatch score/density/aggregate work
//
// Results are keyed by (profile id, last_modified). A profile is immutable,
// so a key always maps to the same result; an edit produces a new
// last_modified and the stale entries for that id are evicted when the new
// revision is cached.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use futures::future::join_all;

use crate::analysis::{
    AggregatedCurve, DensityEstimator, DensitySample, ReplicationAggregator,
    TastingAnalysisResult, ZoneScorer,
};
use crate::config::AppConfig;
use crate::error::{log_analysis_error, AnalysisError};
use crate::profile::{AttributeId, ProfileId, ProfileKey, TastingProfile};

type DensityKey = (ProfileKey, Vec<AttributeId>);
type AggregateKey = (Vec<ProfileKey>, Vec<AttributeId>);
type Cache<K, V> = Arc<Mutex<HashMap<K, Arc<V>>>>;

/// Number of cached entries per cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub scores: usize,
    pub densities: usize,
    pub aggregates: usize,
}

/// Memoizes analysis results per profile revision
///
/// Cloning is cheap and clones share the caches, which is how the async
/// variants move work onto the blocking pool.
///
/// # Example
/// ```ignore
/// let manager = CurveManager::new(&AppConfig::load());
/// let result = manager.score(&profile)?;
/// let curve = manager.aggregate_async(replications, attributes).await?;
/// ```
#[derive(Clone)]
pub struct CurveManager {
    scorer: Arc<ZoneScorer>,
    estimator: Arc<DensityEstimator>,
    aggregator: Arc<ReplicationAggregator>,
    scores: Cache<ProfileKey, TastingAnalysisResult>,
    densities: Cache<DensityKey, Vec<DensitySample>>,
    aggregates: Cache<AggregateKey, AggregatedCurve>,
}

impl CurveManager {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            scorer: Arc::new(ZoneScorer::new(config.product.clone())),
            estimator: Arc::new(DensityEstimator::new(config.density.clone())),
            aggregator: Arc::new(ReplicationAggregator::new(config.aggregation.clone())),
            scores: Arc::new(Mutex::new(HashMap::new())),
            densities: Arc::new(Mutex::new(HashMap::new())),
            aggregates: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Attributes the configured product tracks
    pub fn tracked_attributes(&self) -> Vec<AttributeId> {
        self.scorer.config().taxonomy.tracked()
    }

    /// Zone scores for a profile, computed once per revision
    ///
    /// # Errors
    /// - Lock poisoning on the score cache
    pub fn score(&self, profile: &TastingProfile) -> Result<Arc<TastingAnalysisResult>, AnalysisError> {
        let key = profile.key();
        if let Some(hit) = lock(&self.scores, "score_cache")?.get(&key) {
            tracing::debug!(profile = %key.id, revision = key.last_modified, "score cache hit");
            return Ok(Arc::clone(hit));
        }

        let result = Arc::new(self.scorer.analyze(profile));

        let mut cache = lock(&self.scores, "score_cache")?;
        if has_newer_revision(cache.keys(), &key) {
            return Ok(result);
        }
        cache.retain(|k, _| k.id != key.id || k.last_modified >= key.last_modified);
        cache.insert(key, Arc::clone(&result));
        Ok(result)
    }

    /// Density curve for a profile over the given attributes
    ///
    /// # Errors
    /// - Lock poisoning on the density cache
    pub fn density(
        &self,
        profile: &TastingProfile,
        attributes: &[AttributeId],
    ) -> Result<Arc<Vec<DensitySample>>, AnalysisError> {
        let key: DensityKey = (profile.key(), normalized(attributes));
        if let Some(hit) = lock(&self.densities, "density_cache")?.get(&key) {
            tracing::debug!(profile = %key.0.id, "density cache hit");
            return Ok(Arc::clone(hit));
        }

        let curve = Arc::new(self.estimator.estimate_profile(profile, &key.1));

        let mut cache = lock(&self.densities, "density_cache")?;
        if has_newer_revision(cache.keys().map(|(k, _)| k), &key.0) {
            return Ok(curve);
        }
        cache.retain(|(k, _), _| k.id != key.0.id || k.last_modified >= key.0.last_modified);
        cache.insert(key, Arc::clone(&curve));
        Ok(curve)
    }

    /// Population curve for a set of replications
    ///
    /// The cache key is the sorted list of replication keys, so the same set
    /// in a different order hits the same entry.
    ///
    /// # Errors
    /// - Lock poisoning on the aggregate cache
    pub fn aggregate(
        &self,
        replications: &[TastingProfile],
        attributes: &[AttributeId],
    ) -> Result<Arc<AggregatedCurve>, AnalysisError> {
        let mut keys: Vec<ProfileKey> = replications.iter().map(TastingProfile::key).collect();
        keys.sort();
        let key: AggregateKey = (keys, normalized(attributes));

        if let Some(hit) = lock(&self.aggregates, "aggregate_cache")?.get(&key) {
            tracing::debug!(replications = key.0.len(), "aggregate cache hit");
            return Ok(Arc::clone(hit));
        }

        let curve = Arc::new(self.aggregator.aggregate(replications, &key.1));

        let mut cache = lock(&self.aggregates, "aggregate_cache")?;
        if cache.keys().any(|(cached, _)| supersedes(cached, &key.0)) {
            return Ok(curve);
        }
        cache.retain(|(cached, _), _| !supersedes(&key.0, cached));
        cache.insert(key, Arc::clone(&curve));
        Ok(curve)
    }

    /// [`score`](Self::score) on the blocking pool
    pub async fn score_async(
        &self,
        profile: TastingProfile,
    ) -> Result<Arc<TastingAnalysisResult>, AnalysisError> {
        let manager = self.clone();
        let joined = tokio::task::spawn_blocking(move || manager.score(&profile)).await;
        flatten(joined, "score_async")
    }

    /// [`density`](Self::density) on the blocking pool
    pub async fn density_async(
        &self,
        profile: TastingProfile,
        attributes: Vec<AttributeId>,
    ) -> Result<Arc<Vec<DensitySample>>, AnalysisError> {
        let manager = self.clone();
        let joined =
            tokio::task::spawn_blocking(move || manager.density(&profile, &attributes)).await;
        flatten(joined, "density_async")
    }

    /// [`aggregate`](Self::aggregate) on the blocking pool
    pub async fn aggregate_async(
        &self,
        replications: Vec<TastingProfile>,
        attributes: Vec<AttributeId>,
    ) -> Result<Arc<AggregatedCurve>, AnalysisError> {
        let manager = self.clone();
        let joined =
            tokio::task::spawn_blocking(move || manager.aggregate(&replications, &attributes))
                .await;
        flatten(joined, "aggregate_async")
    }

    /// Score many profiles concurrently
    ///
    /// # Returns
    /// One result per profile, in input order
    pub async fn score_batch(
        &self,
        profiles: Vec<TastingProfile>,
    ) -> Vec<Result<Arc<TastingAnalysisResult>, AnalysisError>> {
        let count = profiles.len();
        let results = join_all(profiles.into_iter().map(|p| self.score_async(p))).await;
        tracing::info!(profiles = count, "scored batch");
        results
    }

    /// Drop every cached result for one profile id
    pub fn invalidate(&self, id: &ProfileId) -> Result<(), AnalysisError> {
        lock(&self.scores, "score_cache")?.retain(|k, _| &k.id != id);
        lock(&self.densities, "density_cache")?.retain(|(k, _), _| &k.id != id);
        lock(&self.aggregates, "aggregate_cache")?
            .retain(|(keys, _), _| keys.iter().all(|k| &k.id != id));
        tracing::debug!(profile = %id, "invalidated cached curves");
        Ok(())
    }

    pub fn clear(&self) -> Result<(), AnalysisError> {
        lock(&self.scores, "score_cache")?.clear();
        lock(&self.densities, "density_cache")?.clear();
        lock(&self.aggregates, "aggregate_cache")?.clear();
        Ok(())
    }

    pub fn stats(&self) -> Result<CacheStats, AnalysisError> {
        Ok(CacheStats {
            scores: lock(&self.scores, "score_cache")?.len(),
            densities: lock(&self.densities, "density_cache")?.len(),
            aggregates: lock(&self.aggregates, "aggregate_cache")?.len(),
        })
    }
}

// ========================================================================
// HELPERS - Lock management and cache keys
// ========================================================================

/// Safely acquire a cache lock
fn lock<'a, K, V>(
    cache: &'a Mutex<HashMap<K, Arc<V>>>,
    component: &str,
) -> Result<MutexGuard<'a, HashMap<K, Arc<V>>>, AnalysisError> {
    cache.lock().map_err(|_| {
        let err = AnalysisError::CachePoisoned {
            component: component.to_string(),
        };
        log_analysis_error(&err, component);
        err
    })
}

fn flatten<T>(
    joined: Result<Result<T, AnalysisError>, tokio::task::JoinError>,
    context: &str,
) -> Result<T, AnalysisError> {
    joined.map_err(AnalysisError::from).and_then(|r| r).inspect_err(|err| {
        log_analysis_error(err, context);
    })
}

fn normalized(attributes: &[AttributeId]) -> Vec<AttributeId> {
    let mut sorted = attributes.to_vec();
    sorted.sort();
    sorted.dedup();
    sorted
}

fn has_newer_revision<'a>(mut keys: impl Iterator<Item = &'a ProfileKey>, key: &ProfileKey) -> bool {
    keys.any(|k| k.id == key.id && k.last_modified > key.last_modified)
}

/// Whether `fresh` carries a newer revision of any profile in `cached`
///
/// Checked both ways: a fresh set evicts stale entries, and a stale set is
/// never cached over a fresh one.
fn supersedes(fresh: &[ProfileKey], cached: &[ProfileKey]) -> bool {
    fresh.iter().any(|new| {
        cached
            .iter()
            .any(|old| old.id == new.id && old.last_modified < new.last_modified)
    })
}
