use super::*;
use crate::profile::{DominanceEvent, Phase, ProfileId};

/// Helper to create an event; the profile recomputes the phase
fn ev(attribute: AttributeId, start: f64, end: f64) -> DominanceEvent {
    DominanceEvent::new(attribute, start, end, Phase::Melting)
}

fn create_test_profile(
    mode: TastingMode,
    events: Vec<DominanceEvent>,
    swallow: Option<f64>,
    total: f64,
) -> TastingProfile {
    TastingProfile::new(ProfileId::from("t1"), mode, events, swallow, total, 1)
}

fn create_scorer() -> ZoneScorer {
    ZoneScorer::new(ProductConfig::default())
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

// ============================================================================
// Reference scenarios
// ============================================================================

#[test]
fn test_full_oral_window_scores_top_of_scale() {
    let profile = create_test_profile(
        TastingMode::Normal,
        vec![ev(AttributeId::Cacao, 0.0, 10.0)],
        Some(10.0),
        20.0,
    );
    let result = create_scorer().analyze(&profile);
    let cacao = result.score_of(AttributeId::Cacao).unwrap();

    assert!(approx(cacao.duration_percent, 100.0));
    assert_eq!(cacao.score, 10.0);
    assert!(!cacao.is_flagged);
    assert_eq!(cacao.boost_details, None);
    assert_eq!(result.first_onset, Some(0.0));
    assert!(approx(result.attack_phase_duration, 2.0));
}

#[test]
fn test_lingering_attribute_gets_boost() {
    let profile = create_test_profile(
        TastingMode::Normal,
        vec![
            ev(AttributeId::Cacao, 0.0, 10.0),
            ev(AttributeId::Cacao, 10.0, 18.0),
        ],
        Some(10.0),
        20.0,
    );
    let result = create_scorer().analyze(&profile);
    let cacao = result.score_of(AttributeId::Cacao).unwrap();

    assert!(approx(cacao.duration_percent, 100.0));
    assert!(approx(cacao.residual_secs, 8.0));
    let boost = cacao.boost_details.expect("8s residual should produce a boost");
    assert!(boost.amount > 0.0);
    assert_eq!(boost.amount, 1.5);
    assert!(approx(boost.duration, 8.0));

    assert_eq!(result.dominant_aftertaste, Some(AttributeId::Cacao));
    assert_eq!(result.aftertaste_quality, AftertasteQuality::Positive);
    assert!(approx(result.quality_modifier, 0.5));
    assert!(approx(result.aftertaste_intensity, 6.8));
}

#[test]
fn test_empty_profile_flags_every_attribute() {
    let profile = create_test_profile(TastingMode::Normal, vec![], None, 0.0);
    let scorer = create_scorer();
    let result = scorer.analyze(&profile);

    for core in &scorer.config().taxonomy.core {
        assert_eq!(result.core_scores[core], 0.0);
    }
    let scored = scorer.scored_attributes(TastingMode::Normal);
    assert_eq!(result.scores.len(), scored.len());
    for (attribute, _) in &scored {
        let score = result.score_of(*attribute).unwrap();
        assert!(score.is_flagged, "{} should be flagged", attribute);
        assert_eq!(score.score, 0.0);
    }
    assert_eq!(result.flagged().len(), scored.len());
    assert_eq!(result.first_onset, None);
    assert_eq!(result.aroma_intensity, 0.0);
    assert_eq!(result.aftertaste_quality, AftertasteQuality::Neutral);
    assert_eq!(result.quality_modifier, 0.0);
}

// ============================================================================
// Windows and edge cases
// ============================================================================

#[test]
fn test_absent_core_attribute_flagged() {
    let profile = create_test_profile(
        TastingMode::Normal,
        vec![ev(AttributeId::Cacao, 0.0, 10.0)],
        Some(10.0),
        20.0,
    );
    let result = create_scorer().analyze(&profile);
    let floral = result.score_of(AttributeId::Floral).unwrap();
    assert!(floral.is_flagged);
    assert_eq!(floral.score, 0.0);
}

#[test]
fn test_residual_only_core_attribute_not_flagged() {
    let profile = create_test_profile(
        TastingMode::Normal,
        vec![
            ev(AttributeId::Cacao, 0.0, 5.0),
            ev(AttributeId::Floral, 12.0, 15.0),
        ],
        Some(10.0),
        20.0,
    );
    let result = create_scorer().analyze(&profile);
    let floral = result.score_of(AttributeId::Floral).unwrap();
    assert!(!floral.is_flagged);
    assert_eq!(floral.score, 0.0);
    assert!(approx(floral.residual_secs, 3.0));
    assert_eq!(floral.boost_details, None);
}

#[test]
fn test_no_swallow_uses_total_duration() {
    let profile = create_test_profile(
        TastingMode::Normal,
        vec![ev(AttributeId::Cacao, 2.0, 7.0)],
        None,
        12.0,
    );
    let result = create_scorer().analyze(&profile);
    let cacao = result.score_of(AttributeId::Cacao).unwrap();

    assert!(approx(cacao.duration_percent, 50.0));
    assert_eq!(cacao.score, 8.0);
    assert_eq!(cacao.residual_secs, 0.0);
    assert!(approx(result.attack_phase_duration, 2.0));
    assert_eq!(result.aftertaste_intensity, 0.0);
    assert_eq!(result.dominant_aftertaste, None);
}

#[test]
fn test_swallow_before_first_onset_empties_oral_window() {
    let profile = create_test_profile(
        TastingMode::Normal,
        vec![ev(AttributeId::Cacao, 2.0, 5.0)],
        Some(1.0),
        10.0,
    );
    let result = create_scorer().analyze(&profile);
    let cacao = result.score_of(AttributeId::Cacao).unwrap();

    assert_eq!(cacao.duration_percent, 0.0);
    assert_eq!(cacao.score, 0.0);
    assert!(!cacao.is_flagged);
    assert!(approx(cacao.residual_secs, 3.0));
    assert_eq!(result.attack_phase_duration, 0.0);
}

#[test]
fn test_overlapping_intervals_not_double_counted() {
    let profile = create_test_profile(
        TastingMode::Normal,
        vec![
            ev(AttributeId::Cacao, 0.0, 6.0),
            ev(AttributeId::Cacao, 4.0, 8.0),
        ],
        None,
        10.0,
    );
    let result = create_scorer().analyze(&profile);
    assert!(approx(result.score_of(AttributeId::Cacao).unwrap().duration_percent, 80.0));
}

#[test]
fn test_covered_duration_never_exceeds_total() {
    let profile = create_test_profile(
        TastingMode::Normal,
        vec![
            ev(AttributeId::Cacao, 0.0, 9.0),
            ev(AttributeId::Cacao, 3.0, 15.0),
            ev(AttributeId::Cacao, 14.0, 40.0),
        ],
        Some(9.0),
        20.0,
    );
    let result = create_scorer().analyze(&profile);
    let cacao = result.score_of(AttributeId::Cacao).unwrap();
    assert!(cacao.melting_secs + cacao.residual_secs <= profile.total_duration() + 1e-9);
}

#[test]
fn test_percent_and_score_monotonic_in_coverage() {
    let scorer = create_scorer();
    let mut previous = (0.0, 0.0);
    for step in 1..=20 {
        let end = step as f64 * 0.5;
        let profile = create_test_profile(
            TastingMode::Normal,
            vec![ev(AttributeId::Cacao, 0.0, end)],
            None,
            10.0,
        );
        let cacao = scorer.analyze(&profile).scores[&AttributeId::Cacao].clone();
        assert!(cacao.duration_percent >= previous.0);
        assert!(cacao.score >= previous.1);
        previous = (cacao.duration_percent, cacao.score);
    }
}

#[test]
fn test_unknown_to_taxonomy_attribute_ignored() {
    let mut config = ProductConfig::default();
    config.taxonomy.defects.retain(|a| *a != AttributeId::Smoky);
    let scorer = ZoneScorer::new(config);

    let profile = create_test_profile(
        TastingMode::Normal,
        vec![ev(AttributeId::Smoky, 0.0, 10.0)],
        None,
        10.0,
    );
    let result = scorer.analyze(&profile);
    assert!(result.score_of(AttributeId::Smoky).is_none());
    assert_eq!(result.aroma_intensity, 0.0);
}

// ============================================================================
// Normal vs expert mode
// ============================================================================

#[test]
fn test_normal_mode_folds_child_into_parent() {
    let profile = create_test_profile(
        TastingMode::Normal,
        vec![
            ev(AttributeId::FreshFruit, 0.0, 4.0),
            ev(AttributeId::Citrus, 3.0, 6.0),
        ],
        Some(10.0),
        20.0,
    );
    let result = create_scorer().analyze(&profile);

    assert!(result.score_of(AttributeId::Citrus).is_none());
    let fruit = result.score_of(AttributeId::FreshFruit).unwrap();
    assert!(approx(fruit.duration_percent, 60.0));
    assert_eq!(fruit.score, 9.0);
    assert_eq!(result.core_scores[&AttributeId::FreshFruit], 9.0);
}

#[test]
fn test_normal_mode_scores_parentless_complementary() {
    let profile = create_test_profile(
        TastingMode::Normal,
        vec![ev(AttributeId::Sweetness, 0.0, 2.0)],
        Some(10.0),
        20.0,
    );
    let result = create_scorer().analyze(&profile);
    let sweetness = result.score_of(AttributeId::Sweetness).unwrap();
    assert_eq!(sweetness.category, AttributeCategory::Complementary);
    assert!(approx(sweetness.duration_percent, 20.0));
}

#[test]
fn test_expert_mode_strong_child_boosts_parent() {
    let profile = create_test_profile(
        TastingMode::Expert,
        vec![
            ev(AttributeId::FreshFruit, 0.0, 4.0),
            ev(AttributeId::Citrus, 4.0, 7.0),
        ],
        Some(10.0),
        20.0,
    );
    let result = create_scorer().analyze(&profile);

    let citrus = result.score_of(AttributeId::Citrus).unwrap();
    assert_eq!(citrus.category, AttributeCategory::Complementary);
    assert!(approx(citrus.duration_percent, 30.0));

    let fruit = result.score_of(AttributeId::FreshFruit).unwrap();
    assert!(approx(fruit.duration_percent, 40.0));
    assert_eq!(fruit.score, 7.0);
    let boost = fruit.boost_details.expect("strong child should recommend a boost");
    assert_eq!(boost.amount, 1.0);
    assert!(approx(boost.duration, 3.0));
    assert_eq!(result.core_scores[&AttributeId::FreshFruit], 8.0);
}

#[test]
fn test_expert_mode_weak_child_no_recommendation() {
    let profile = create_test_profile(
        TastingMode::Expert,
        vec![
            ev(AttributeId::FreshFruit, 0.0, 4.0),
            ev(AttributeId::Citrus, 4.0, 5.0),
        ],
        Some(10.0),
        20.0,
    );
    let result = create_scorer().analyze(&profile);
    assert_eq!(result.score_of(AttributeId::FreshFruit).unwrap().boost_details, None);
    assert_eq!(result.core_scores[&AttributeId::FreshFruit], 7.0);
}

#[test]
fn test_expert_mode_residual_boost_stays_advisory() {
    let profile = create_test_profile(
        TastingMode::Expert,
        vec![
            ev(AttributeId::FreshFruit, 0.0, 4.0),
            ev(AttributeId::FreshFruit, 10.0, 18.0),
        ],
        Some(10.0),
        20.0,
    );
    let result = create_scorer().analyze(&profile);
    let fruit = result.score_of(AttributeId::FreshFruit).unwrap();

    assert_eq!(fruit.score, 7.0);
    assert_eq!(fruit.boost_details.map(|b| b.amount), Some(1.5));
    assert_eq!(result.core_scores[&AttributeId::FreshFruit], fruit.score);
}

#[test]
fn test_expert_mode_core_scores_take_only_child_recommendation() {
    let profile = create_test_profile(
        TastingMode::Expert,
        vec![
            ev(AttributeId::FreshFruit, 0.0, 4.0),
            ev(AttributeId::Citrus, 4.0, 7.0),
            ev(AttributeId::FreshFruit, 10.0, 18.0),
        ],
        Some(10.0),
        20.0,
    );
    let result = create_scorer().analyze(&profile);
    let fruit = result.score_of(AttributeId::FreshFruit).unwrap();

    let boost = fruit.boost_details.unwrap();
    assert_eq!(boost.amount, 2.5);
    assert!(approx(boost.duration, 11.0));
    assert_eq!(result.core_scores[&AttributeId::FreshFruit], 8.0);
}

#[test]
fn test_expert_mode_strong_children_merge_into_one_recommendation() {
    let profile = create_test_profile(
        TastingMode::Expert,
        vec![
            ev(AttributeId::FreshFruit, 0.0, 3.0),
            ev(AttributeId::Berry, 3.0, 6.0),
            ev(AttributeId::Citrus, 6.0, 9.0),
        ],
        Some(10.0),
        20.0,
    );
    let result = create_scorer().analyze(&profile);
    let fruit = result.score_of(AttributeId::FreshFruit).unwrap();

    assert_eq!(fruit.score, 7.0);
    let boost = fruit.boost_details.unwrap();
    assert_eq!(boost.amount, 2.0);
    assert!(approx(boost.duration, 6.0));
    assert_eq!(result.core_scores[&AttributeId::FreshFruit], 9.0);
    assert!(result.score_of(AttributeId::Berry).unwrap().boost_details.is_none());
}

#[test]
fn test_core_scores_capped_at_ten() {
    let profile = create_test_profile(
        TastingMode::Expert,
        vec![
            ev(AttributeId::FreshFruit, 0.0, 10.0),
            ev(AttributeId::Berry, 0.0, 5.0),
        ],
        Some(10.0),
        20.0,
    );
    let result = create_scorer().analyze(&profile);
    assert_eq!(result.core_scores[&AttributeId::FreshFruit], 10.0);
}

// ============================================================================
// Intensity and quality
// ============================================================================

#[test]
fn test_aroma_intensity_from_attack_window() {
    let profile = create_test_profile(
        TastingMode::Normal,
        vec![ev(AttributeId::Cacao, 0.0, 10.0)],
        Some(10.0),
        20.0,
    );
    let result = create_scorer().analyze(&profile);
    assert!(approx(result.aroma_intensity, 8.0));
}

#[test]
fn test_intensity_clamped_to_ten() {
    let profile = create_test_profile(
        TastingMode::Normal,
        vec![
            ev(AttributeId::Cacao, 0.0, 0.5),
            ev(AttributeId::Acidity, 0.5, 1.0),
            ev(AttributeId::Bitterness, 1.0, 1.5),
            ev(AttributeId::Floral, 1.5, 2.0),
            ev(AttributeId::Nutty, 2.0, 10.0),
        ],
        Some(10.0),
        20.0,
    );
    let result = create_scorer().analyze(&profile);
    assert_eq!(result.aroma_intensity, 10.0);
}

#[test]
fn test_defect_lowers_quality_modifier() {
    let profile = create_test_profile(
        TastingMode::Normal,
        vec![ev(AttributeId::Mouldy, 0.0, 10.0)],
        Some(10.0),
        20.0,
    );
    let result = create_scorer().analyze(&profile);
    let mouldy = result.score_of(AttributeId::Mouldy).unwrap();
    assert_eq!(mouldy.category, AttributeCategory::Defect);
    assert!(!mouldy.is_flagged);
    assert!(approx(result.quality_modifier, -2.0));
    assert_eq!(result.aftertaste_quality, AftertasteQuality::Neutral);
}

#[test]
fn test_lingering_defect_makes_aftertaste_negative() {
    let profile = create_test_profile(
        TastingMode::Normal,
        vec![
            ev(AttributeId::Mouldy, 0.0, 18.0),
            ev(AttributeId::Cacao, 18.0, 20.0),
        ],
        Some(10.0),
        20.0,
    );
    let result = create_scorer().analyze(&profile);
    assert_eq!(result.aftertaste_quality, AftertasteQuality::Negative);
    assert!(approx(result.quality_modifier, -3.0));
    assert_eq!(result.dominant_aftertaste, Some(AttributeId::Mouldy));
    assert!(result
        .suggestions
        .iter()
        .any(|s| s.contains("Defect lingers")));
}

#[test]
fn test_quality_modifier_capped_at_positive_bound() {
    let mut config = ProductConfig::default();
    config.quality.positive_aftertaste_bonus = 5.0;
    config.quality.max_modifier = 3.0;
    let profile = create_test_profile(
        TastingMode::Normal,
        vec![
            ev(AttributeId::Cacao, 0.0, 10.0),
            ev(AttributeId::Cacao, 10.0, 18.0),
        ],
        Some(10.0),
        20.0,
    );
    let result = ZoneScorer::new(config).analyze(&profile);
    assert_eq!(result.aftertaste_quality, AftertasteQuality::Positive);
    assert_eq!(result.quality_modifier, 3.0);
}

#[test]
fn test_quality_modifier_capped_at_negative_bound() {
    let mut config = ProductConfig::default();
    config.quality.defect_weight = 1.0;
    config.quality.max_modifier = 3.0;
    let profile = create_test_profile(
        TastingMode::Normal,
        vec![ev(AttributeId::Mouldy, 0.0, 10.0)],
        Some(10.0),
        20.0,
    );
    let result = ZoneScorer::new(config).analyze(&profile);
    assert_eq!(result.quality_modifier, -3.0);
}

#[test]
fn test_short_pleasant_finish_is_neutral() {
    let profile = create_test_profile(
        TastingMode::Normal,
        vec![
            ev(AttributeId::Cacao, 0.0, 10.0),
            ev(AttributeId::Floral, 10.0, 13.0),
        ],
        Some(10.0),
        20.0,
    );
    let result = create_scorer().analyze(&profile);
    assert_eq!(result.aftertaste_quality, AftertasteQuality::Neutral);
    assert_eq!(result.quality_modifier, 0.0);
}

#[test]
fn test_flagged_attribute_listed_in_suggestions() {
    let profile = create_test_profile(
        TastingMode::Normal,
        vec![ev(AttributeId::Cacao, 0.0, 10.0)],
        Some(10.0),
        20.0,
    );
    let result = create_scorer().analyze(&profile);
    assert!(result
        .suggestions
        .iter()
        .any(|s| s.starts_with("floral: never marked dominant")));
}
