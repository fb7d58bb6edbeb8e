use super::*;

fn bp(min_percent: f64, score: f64) -> ScoreBreakpoint {
    ScoreBreakpoint { min_percent, score }
}

// ============================================================================
// Reference anchor bands
// ============================================================================

#[test]
fn test_trace_band_scores_one_to_two() {
    let curve = ScoreCurve::default();
    for percent in [0.1, 1.0, 2.5, 4.0, 4.99] {
        let score = curve.score(percent);
        assert!(
            (1.0..=2.0).contains(&score),
            "trace {}% should score 1-2, got {}",
            percent,
            score
        );
    }
}

#[test]
fn test_distinct_band_scores_three_to_five() {
    let curve = ScoreCurve::default();
    for percent in [10.0, 12.5, 14.9, 15.0] {
        let score = curve.score(percent);
        assert!(
            (3.0..=5.0).contains(&score),
            "distinct {}% should score 3-5, got {}",
            percent,
            score
        );
    }
}

#[test]
fn test_dominant_band_scores_seven_plus() {
    let curve = ScoreCurve::default();
    for percent in [30.5, 40.0, 75.0, 99.0] {
        let score = curve.score(percent);
        assert!(score >= 7.0, "dominant {}% should score 7+, got {}", percent, score);
    }
}

#[test]
fn test_full_window_is_top_of_scale() {
    let curve = ScoreCurve::default();
    assert_eq!(curve.score(100.0), curve.max_score());
    assert_eq!(curve.max_score(), 10.0);
}

#[test]
fn test_zero_percent_scores_zero() {
    let curve = ScoreCurve::default();
    assert_eq!(curve.score(0.0), 0.0);
    assert_eq!(curve.score(-3.0), 0.0);
    assert_eq!(curve.score(f64::NAN), 0.0);
}

// ============================================================================
// Shape
// ============================================================================

#[test]
fn test_monotonic_non_decreasing() {
    let curve = ScoreCurve::default();
    let mut previous = 0.0;
    for step in 0..=1000 {
        let percent = step as f64 / 10.0;
        let score = curve.score(percent);
        assert!(
            score >= previous,
            "score dropped at {}%: {} < {}",
            percent,
            score,
            previous
        );
        previous = score;
    }
}

#[test]
fn test_is_step_function() {
    let curve = ScoreCurve::default();
    assert_eq!(curve.score(20.0), curve.score(29.99));
    assert!(curve.score(30.0) > curve.score(29.99));
}

#[test]
fn test_custom_curve_plugs_in() {
    let curve = ScoreCurve::new(vec![bp(0.0, 2.0), bp(50.0, 8.0)]).unwrap();
    assert_eq!(curve.score(10.0), 2.0);
    assert_eq!(curve.score(50.0), 8.0);
    assert_eq!(curve.max_score(), 8.0);
}

#[test]
fn test_first_breakpoint_above_zero_leaves_gap() {
    let curve = ScoreCurve::new(vec![bp(5.0, 2.0), bp(20.0, 6.0)]).unwrap();
    assert_eq!(curve.score(3.0), 0.0);
    assert_eq!(curve.score(5.0), 2.0);
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn test_empty_curve_rejected() {
    assert!(ScoreCurve::new(vec![]).is_err());
}

#[test]
fn test_unsorted_breakpoints_rejected() {
    assert!(ScoreCurve::new(vec![bp(10.0, 3.0), bp(5.0, 4.0)]).is_err());
    assert!(ScoreCurve::new(vec![bp(10.0, 3.0), bp(10.0, 4.0)]).is_err());
}

#[test]
fn test_decreasing_scores_rejected() {
    assert!(ScoreCurve::new(vec![bp(0.0, 5.0), bp(10.0, 4.0)]).is_err());
}

#[test]
fn test_out_of_range_rejected() {
    assert!(ScoreCurve::new(vec![bp(0.0, 11.0)]).is_err());
    assert!(ScoreCurve::new(vec![bp(120.0, 5.0)]).is_err());
}

#[test]
fn test_serializes_as_plain_list() {
    let curve = ScoreCurve::new(vec![bp(0.0, 1.0), bp(50.0, 9.0)]).unwrap();
    let json = serde_json::to_string(&curve).unwrap();
    assert_eq!(
        json,
        r#"[{"min_percent":0.0,"score":1.0},{"min_percent":50.0,"score":9.0}]"#
    );
}
