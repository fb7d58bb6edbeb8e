// ZoneScorer - turns one tasting's dominance timeline into attribute scores
//
// The oral window runs from the first dominance onset to the swallow marker
// (or the end of capture when nobody pressed swallow). Time an attribute is
// dominant inside that window drives its score through the score curve;
// dominance after the swallow is aftertaste evidence and only ever produces
// advisory boosts and intensity/quality readings.

use std::collections::BTreeSet;

use crate::analysis::boost::BoostDetails;
use crate::analysis::types::{
    AftertasteQuality, AttributeCategory, AttributeScoreResult, TastingAnalysisResult,
};
use crate::config::ProductConfig;
use crate::profile::{
    covered_within, merged_by_attribute, AttributeId, AttributeMap, Interval, TastingMode,
    TastingProfile,
};

/// Upper bound for scores and intensities
const SCALE_MAX: f64 = 10.0;

/// Time window the scorer measures coverage in
#[derive(Debug, Clone, Copy)]
struct Window {
    start: f64,
    end: f64,
}

impl Window {
    fn len(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }
}

/// Zone-based scorer for a single product configuration
#[derive(Debug, Clone, Default)]
pub struct ZoneScorer {
    config: ProductConfig,
}

impl ZoneScorer {
    pub fn new(config: ProductConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProductConfig {
        &self.config
    }

    /// Attributes this scorer reports for a given mode, with their category
    ///
    /// Normal mode drops complementary children that have a parent (their
    /// time is folded into the parent). Expert mode reports every
    /// complementary attribute.
    pub fn scored_attributes(&self, mode: TastingMode) -> Vec<(AttributeId, AttributeCategory)> {
        let taxonomy = &self.config.taxonomy;
        let mut scored: Vec<(AttributeId, AttributeCategory)> = taxonomy
            .core
            .iter()
            .map(|a| (*a, AttributeCategory::Core))
            .collect();
        for (child, parent) in &taxonomy.complementary {
            if mode == TastingMode::Expert || parent.is_none() {
                scored.push((*child, AttributeCategory::Complementary));
            }
        }
        scored.extend(taxonomy.defects.iter().map(|a| (*a, AttributeCategory::Defect)));
        scored
    }

    /// Score one tasting
    ///
    /// # Arguments
    /// * `profile` - Sanitized tasting profile
    ///
    /// # Returns
    /// Full analysis; degenerate profiles yield zero/neutral values, never
    /// an error
    pub fn analyze(&self, profile: &TastingProfile) -> TastingAnalysisResult {
        let scored = self.scored_attributes(profile.mode());

        let Some(first_onset) = profile.first_onset() else {
            log::debug!("[ZoneScorer] {}: no dominance events", profile.id());
            return self.unrated_result(&scored);
        };

        let expert = profile.mode() == TastingMode::Expert;
        let taxonomy = &self.config.taxonomy;
        let zones = &self.config.zones;

        let oral = Window {
            start: first_onset,
            end: profile.oral_end().max(first_onset),
        };
        let aftertaste = profile.swallow_time().map(|swallow| Window {
            start: swallow,
            end: profile.total_duration().max(swallow),
        });
        let attack = Window {
            start: first_onset,
            end: first_onset + zones.attack_fraction * oral.len(),
        };

        let scored_set: BTreeSet<AttributeId> = scored.iter().map(|(a, _)| *a).collect();
        let merged = merged_by_attribute(profile.events(), |attribute| {
            let bucket = if expert {
                attribute
            } else {
                taxonomy.parent_of(attribute).unwrap_or(attribute)
            };
            scored_set.contains(&bucket).then_some(bucket)
        });

        let mut result = TastingAnalysisResult {
            attack_phase_duration: attack.len(),
            first_onset: Some(first_onset),
            ..TastingAnalysisResult::default()
        };

        for (attribute, category) in &scored {
            let intervals = merged.get(attribute).map(Vec::as_slice).unwrap_or(&[]);
            result
                .scores
                .insert(*attribute, self.score_attribute(intervals, *category, oral, aftertaste));
        }

        let recommended = if expert {
            self.apply_child_recommendations(&mut result)
        } else {
            AttributeMap::new()
        };

        // Only child recommendations reach core_scores; residual boosts stay advisory
        for attribute in &taxonomy.core {
            if let Some(score) = result.scores.get(attribute) {
                let boost = recommended.get(attribute).copied().unwrap_or(0.0);
                result
                    .core_scores
                    .insert(*attribute, (score.score + boost).min(SCALE_MAX));
            }
        }

        result.aroma_intensity = self.window_intensity(&merged, attack);
        result.aftertaste_intensity = aftertaste
            .map(|window| self.window_intensity(&merged, window))
            .unwrap_or(0.0);
        result.aftertaste_quality = self.aftertaste_quality(&result.scores);
        result.dominant_aftertaste = dominant_aftertaste(&result.scores);
        result.quality_modifier = self.quality_modifier(&result);
        result.suggestions = self.suggestions(&result);

        log::debug!(
            "[ZoneScorer] {}: onset {:.2}s, oral window {:.2}s, {} attribute(s) present",
            profile.id(),
            first_onset,
            oral.len(),
            merged.len()
        );

        result
    }

    fn score_attribute(
        &self,
        intervals: &[Interval],
        category: AttributeCategory,
        oral: Window,
        aftertaste: Option<Window>,
    ) -> AttributeScoreResult {
        let melting = covered_within(intervals, oral.start, oral.end);
        let residual = aftertaste
            .map(|w| covered_within(intervals, w.start, w.end))
            .unwrap_or(0.0);

        let duration_percent = if oral.len() > 0.0 {
            (melting / oral.len() * 100.0).clamp(0.0, 100.0)
        } else {
            0.0
        };

        AttributeScoreResult {
            score: self.config.score_curve.score(duration_percent),
            duration_percent,
            category,
            is_flagged: category == AttributeCategory::Core && melting + residual <= 0.0,
            boost_details: self.config.boost.evaluate(residual),
            melting_secs: melting,
            residual_secs: residual,
        }
    }

    /// Strong expert-mode children recommend a boost to their parent
    ///
    /// # Returns
    /// Recommended amount per parent, excluding any residual boost
    fn apply_child_recommendations(
        &self,
        result: &mut TastingAnalysisResult,
    ) -> AttributeMap<f64> {
        let expert = &self.config.expert;
        let mut recommendations: AttributeMap<BoostDetails> = AttributeMap::new();

        for (child, score) in &result.scores {
            let Some(parent) = self.config.taxonomy.parent_of(*child) else {
                continue;
            };
            if score.duration_percent >= expert.child_strength_percent && score.duration_percent > 0.0 {
                let recommendation = BoostDetails {
                    amount: expert.parent_boost_amount,
                    duration: score.melting_secs,
                };
                recommendations
                    .entry(parent)
                    .and_modify(|b| *b = b.merge(recommendation))
                    .or_insert(recommendation);
            }
        }

        let mut amounts = AttributeMap::new();
        for (parent, recommendation) in recommendations {
            if let Some(score) = result.scores.get_mut(&parent) {
                score.boost_details = Some(match score.boost_details {
                    Some(existing) => existing.merge(recommendation),
                    None => recommendation,
                });
                amounts.insert(parent, recommendation.amount);
            }
        }
        amounts
    }

    /// Intensity of one window from how many attributes were dominant in it
    /// and how much of it they covered
    fn window_intensity(&self, merged: &AttributeMap<Vec<Interval>>, window: Window) -> f64 {
        let span = window.len();
        if span <= 0.0 {
            return 0.0;
        }

        let mut count = 0usize;
        let mut covered = 0.0;
        for intervals in merged.values() {
            let secs = covered_within(intervals, window.start, window.end);
            if secs > 0.0 {
                count += 1;
                covered += secs;
            }
        }

        let zones = &self.config.zones;
        let coverage_share = (covered / span).min(1.0);
        (zones.intensity_per_attribute * count as f64 + zones.intensity_per_coverage * coverage_share)
            .clamp(0.0, SCALE_MAX)
    }

    fn aftertaste_quality(&self, scores: &AttributeMap<AttributeScoreResult>) -> AftertasteQuality {
        let taxonomy = &self.config.taxonomy;
        let zones = &self.config.zones;

        let defect_lingers = scores.iter().any(|(attr, s)| {
            taxonomy.is_defect(*attr) && s.residual_secs > zones.min_presence_secs
        });
        if defect_lingers {
            return AftertasteQuality::Negative;
        }

        let pleasant_lingers = scores.iter().any(|(attr, s)| {
            taxonomy.is_pleasant(*attr)
                && s.residual_secs > 0.0
                && s.residual_secs >= zones.long_persistence_secs
        });
        if pleasant_lingers {
            AftertasteQuality::Positive
        } else {
            AftertasteQuality::Neutral
        }
    }

    fn quality_modifier(&self, result: &TastingAnalysisResult) -> f64 {
        let quality = &self.config.quality;
        let defect_penalty: f64 = result
            .scores
            .values()
            .filter(|s| s.category == AttributeCategory::Defect)
            .map(|s| s.score * quality.defect_weight)
            .sum();

        let aftertaste = match result.aftertaste_quality {
            AftertasteQuality::Positive => quality.positive_aftertaste_bonus,
            AftertasteQuality::Neutral => 0.0,
            AftertasteQuality::Negative => -quality.negative_aftertaste_penalty,
        };

        let bound = quality.max_modifier.abs();
        (aftertaste - defect_penalty).max(-bound).min(bound)
    }

    fn suggestions(&self, result: &TastingAnalysisResult) -> Vec<String> {
        let mut suggestions = Vec::new();

        for (attribute, score) in &result.scores {
            if score.is_flagged {
                suggestions.push(format!("{}: never marked dominant, rate it manually", attribute));
            }
            if score.category == AttributeCategory::Defect && score.score > 0.0 {
                suggestions.push(format!(
                    "{}: defect dominant for {:.0}% of the oral window",
                    attribute, score.duration_percent
                ));
            }
            if let Some(boost) = score.boost_details {
                suggestions.push(format!(
                    "{}: consider raising the score by {:.1} ({:.1}s of evidence)",
                    attribute, boost.amount, boost.duration
                ));
            }
        }

        match result.aftertaste_quality {
            AftertasteQuality::Positive => {
                suggestions.push("Long pleasant finish".to_string());
            }
            AftertasteQuality::Negative => {
                suggestions.push("Defect lingers in the aftertaste".to_string());
            }
            AftertasteQuality::Neutral => {}
        }
        if result.quality_modifier != 0.0 {
            suggestions.push(format!(
                "Adjust overall quality by {:+.1}",
                result.quality_modifier
            ));
        }
        suggestions
    }

    fn unrated_result(&self, scored: &[(AttributeId, AttributeCategory)]) -> TastingAnalysisResult {
        let mut result = TastingAnalysisResult::default();
        for (attribute, category) in scored {
            result
                .scores
                .insert(*attribute, AttributeScoreResult::unrated(*category));
            if *category == AttributeCategory::Core {
                result.core_scores.insert(*attribute, 0.0);
            }
        }
        result.suggestions = vec!["No dominance events captured".to_string()];
        result
    }
}

/// Attribute with the longest residual dominance, if any lingered at all
fn dominant_aftertaste(scores: &AttributeMap<AttributeScoreResult>) -> Option<AttributeId> {
    scores
        .iter()
        .filter(|(_, s)| s.residual_secs > 0.0)
        .fold(None, |best: Option<(AttributeId, f64)>, (attr, s)| match best {
            Some((_, secs)) if secs >= s.residual_secs => best,
            _ => Some((*attr, s.residual_secs)),
        })
        .map(|(attr, _)| attr)
}

#[cfg(test)]
#[path = "scorer_tests.rs"]
mod tests;
