// Scoring result types
//
// These are the values the grading form pre-fills from and the export
// logic flattens into columns.

use std::collections::BTreeMap;

use crate::analysis::boost::BoostDetails;
use crate::profile::{AttributeId, AttributeMap};

/// Role an attribute plays in the product taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeCategory {
    Core,
    Complementary,
    Defect,
}

/// Overall character of the aftertaste
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AftertasteQuality {
    Positive,
    #[default]
    Neutral,
    Negative,
}

/// Score for one attribute of one tasting
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AttributeScoreResult {
    /// Stepped 0-10 score from the score curve
    pub score: f64,
    /// Share of the oral window this attribute was dominant, 0-100
    pub duration_percent: f64,
    pub category: AttributeCategory,
    /// Core attribute never marked dominant; every attribute of a tasting
    /// with no dominance events
    pub is_flagged: bool,
    /// Advisory increase; never applied to `score`
    pub boost_details: Option<BoostDetails>,
    pub melting_secs: f64,
    pub residual_secs: f64,
}

impl AttributeScoreResult {
    /// Placeholder for a tasting that captured nothing
    pub(crate) fn unrated(category: AttributeCategory) -> Self {
        Self {
            score: 0.0,
            duration_percent: 0.0,
            category,
            is_flagged: true,
            boost_details: None,
            melting_secs: 0.0,
            residual_secs: 0.0,
        }
    }
}

/// Full scoring output for one tasting
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct TastingAnalysisResult {
    pub scores: AttributeMap<AttributeScoreResult>,
    /// Core scores with expert-mode child recommendations folded in
    pub core_scores: AttributeMap<f64>,
    pub aroma_intensity: f64,
    pub aftertaste_intensity: f64,
    pub aftertaste_quality: AftertasteQuality,
    /// Signed adjustment suggestion for the overall quality grade
    pub quality_modifier: f64,
    pub suggestions: Vec<String>,
    pub attack_phase_duration: f64,
    pub first_onset: Option<f64>,
    pub dominant_aftertaste: Option<AttributeId>,
}

/// Flat `column name → value` export row
pub type ExportColumns = BTreeMap<String, f64>;

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl TastingAnalysisResult {
    pub fn score_of(&self, attribute: AttributeId) -> Option<&AttributeScoreResult> {
        self.scores.get(&attribute)
    }

    /// Attributes flagged as not rated
    pub fn flagged(&self) -> Vec<AttributeId> {
        self.scores
            .iter()
            .filter(|(_, result)| result.is_flagged)
            .map(|(attr, _)| *attr)
            .collect()
    }

    /// Flatten per-attribute values into export columns
    ///
    /// Four columns per scored attribute: `<attr>_duration_pct`,
    /// `<attr>_score`, `<attr>_boost` and `<attr>_boost_secs`, rounded to
    /// two decimals.
    pub fn export_columns(&self) -> ExportColumns {
        let mut columns = BTreeMap::new();
        for (attr, result) in &self.scores {
            let boost = result.boost_details.unwrap_or(BoostDetails {
                amount: 0.0,
                duration: 0.0,
            });
            columns.insert(format!("{}_duration_pct", attr), round2(result.duration_percent));
            columns.insert(format!("{}_score", attr), round2(result.score));
            columns.insert(format!("{}_boost", attr), round2(boost.amount));
            columns.insert(format!("{}_boost_secs", attr), round2(boost.duration));
        }
        columns
    }
}
