//! Integration tests for panel aggregation
//!
//! Synthetic replications from the fixture generator are aggregated directly
//! and through the CurveManager's async path.

use cacao_tds::analysis::{ReplicationAggregator, SLICE_COUNT};
use cacao_tds::config::{AggregationConfig, AppConfig};
use cacao_tds::fixtures::{ReplicationGenerator, ReplicationSpec};
use cacao_tds::profile::{AttributeId, DominanceEvent, Phase, ProfileId, TastingMode, TastingProfile};
use cacao_tds::CurveManager;

fn create_panel(count: usize, seed: u64) -> Vec<TastingProfile> {
    ReplicationGenerator::with_defaults(seed).generate_many(count)
}

fn panel_attributes() -> Vec<AttributeId> {
    ReplicationSpec::default().attributes
}

#[test]
fn test_unanimous_panel_reaches_full_rate() {
    let replications: Vec<TastingProfile> = (0..4)
        .map(|i| {
            TastingProfile::new(
                ProfileId(format!("r{}", i)),
                TastingMode::Normal,
                vec![DominanceEvent::new(AttributeId::Cacao, 0.0, 10.0, Phase::Melting)],
                Some(10.0),
                20.0,
                1,
            )
        })
        .collect();

    let curve = ReplicationAggregator::default()
        .aggregate(&replications, &[AttributeId::Cacao, AttributeId::Floral]);
    assert!((curve.rate(50, AttributeId::Cacao) - 1.0).abs() < 1e-9);
    assert_eq!(curve.chance_level, 0.5);
    assert!((curve.significance_level - 0.91125).abs() < 1e-9);
}

#[test]
fn test_synthetic_panel_curve_is_well_formed() {
    let replications = create_panel(30, 11);
    let attributes = panel_attributes();
    let curve = ReplicationAggregator::default().aggregate(&replications, &attributes);

    assert_eq!(curve.points.len(), SLICE_COUNT);
    assert_eq!(curve.replication_count, 30);
    assert!((curve.chance_level - 1.0 / attributes.len() as f64).abs() < 1e-12);
    assert!(curve.significance_level >= curve.chance_level);
    assert!(curve.significance_level <= 1.0);
    for point in &curve.points {
        assert_eq!(point.len(), attributes.len());
        for rate in point.values() {
            assert!((0.0..=1.0 + 1e-12).contains(rate));
        }
    }
}

#[test]
fn test_more_replications_tighten_significance() {
    let attributes = panel_attributes();
    let aggregator = ReplicationAggregator::default();
    let small = aggregator.aggregate(&create_panel(5, 3), &attributes);
    let large = aggregator.aggregate(&create_panel(200, 3), &attributes);
    assert!(large.significance_level < small.significance_level);
    assert_eq!(large.chance_level, small.chance_level);
}

#[test]
fn test_unsmoothed_config_keeps_raw_rates() {
    let replications = create_panel(10, 5);
    let attributes = panel_attributes();
    let raw = ReplicationAggregator::new(AggregationConfig {
        sigma_slices: 0.0,
        ..AggregationConfig::default()
    });
    let curve = raw.aggregate(&replications, &attributes);
    let rates = raw.dominance_rates(&replications, &attributes);
    for attribute in &attributes {
        assert_eq!(curve.series(*attribute), rates[attribute]);
    }
}

#[tokio::test]
async fn test_manager_aggregates_off_thread() {
    let manager = CurveManager::new(&AppConfig::default());
    let replications = create_panel(12, 9);
    let attributes = panel_attributes();

    let direct = ReplicationAggregator::default().aggregate(&replications, &attributes);
    let via_manager = manager
        .aggregate_async(replications.clone(), attributes.clone())
        .await
        .unwrap();
    assert_eq!(*via_manager, direct);

    let scores = manager.score_batch(replications).await;
    assert_eq!(scores.len(), 12);
    assert!(scores.iter().all(|r| r.is_ok()));
}
