//! Configuration management for product profiles and curve parameters
//!
//! This module provides runtime configuration loading from JSON files so a
//! product profile (attribute taxonomy, zone boundaries, score curve, boost
//! policy) can be re-tuned without recompiling. Configuration is always
//! passed explicitly into the scorer, estimator and aggregator; nothing here
//! is global.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use crate::analysis::boost::BoostPolicy;
use crate::analysis::score_curve::ScoreCurve;
use crate::error::{log_config_error, ConfigError};
use crate::profile::AttributeId;

/// Complete application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub product: ProductConfig,
    #[serde(default)]
    pub density: DensityConfig,
    #[serde(default)]
    pub aggregation: AggregationConfig,
}

/// Attribute taxonomy: which attributes are core, complementary or defects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeTaxonomy {
    /// Mandatory dimensions; a core attribute never rated is flagged
    pub core: Vec<AttributeId>,
    /// Complementary attribute → optional parent core attribute
    pub complementary: BTreeMap<AttributeId, Option<AttributeId>>,
    /// Off-flavours
    pub defects: Vec<AttributeId>,
    /// Notes that make a lingering aftertaste positive
    pub pleasant: Vec<AttributeId>,
}

impl Default for AttributeTaxonomy {
    fn default() -> Self {
        use AttributeId::*;
        Self {
            core: vec![
                Cacao,
                Acidity,
                Bitterness,
                Astringency,
                FreshFruit,
                BrownFruit,
                Vegetal,
                Floral,
                Woody,
                Spice,
                Nutty,
                CaramelPanela,
                Roast,
            ],
            complementary: BTreeMap::from([
                (Sweetness, None),
                (Citrus, Some(FreshFruit)),
                (Berry, Some(FreshFruit)),
                (DriedFruit, Some(BrownFruit)),
                (Herbal, Some(Vegetal)),
                (Malty, Some(Roast)),
            ]),
            defects: vec![Mouldy, Smoky, Musty, OffFlavor],
            pleasant: vec![
                Cacao,
                FreshFruit,
                BrownFruit,
                Floral,
                Spice,
                Nutty,
                CaramelPanela,
                Sweetness,
                Citrus,
                Berry,
                DriedFruit,
            ],
        }
    }
}

impl AttributeTaxonomy {
    pub fn is_core(&self, attribute: AttributeId) -> bool {
        self.core.contains(&attribute)
    }

    pub fn is_defect(&self, attribute: AttributeId) -> bool {
        self.defects.contains(&attribute)
    }

    pub fn is_pleasant(&self, attribute: AttributeId) -> bool {
        self.pleasant.contains(&attribute)
    }

    /// Parent core attribute of a complementary child, if it has one
    pub fn parent_of(&self, attribute: AttributeId) -> Option<AttributeId> {
        self.complementary.get(&attribute).copied().flatten()
    }

    /// Every attribute named by the taxonomy, in map order
    pub fn tracked(&self) -> Vec<AttributeId> {
        let mut all: BTreeSet<AttributeId> = self.core.iter().copied().collect();
        all.extend(self.complementary.keys().copied());
        all.extend(self.defects.iter().copied());
        all.into_iter().collect()
    }
}

/// Zone boundaries and intensity weights used by the zone scorer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneConfig {
    /// Share of the oral window treated as the attack phase
    pub attack_fraction: f64,
    /// Residual seconds an attribute needs to count as lingering
    pub min_presence_secs: f64,
    /// Residual seconds that make a pleasant note a long finish
    pub long_persistence_secs: f64,
    /// Intensity added per attribute present in a window
    pub intensity_per_attribute: f64,
    /// Intensity added for full coverage of a window
    pub intensity_per_coverage: f64,
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            attack_fraction: 0.2,
            min_presence_secs: 5.0,
            long_persistence_secs: 8.0,
            intensity_per_attribute: 2.0,
            intensity_per_coverage: 6.0,
        }
    }
}

/// Expert-mode parent/child recommendation rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpertConfig {
    /// Child duration percent that counts as a strong child
    pub child_strength_percent: f64,
    /// Advisory points a strong child adds to its parent
    pub parent_boost_amount: f64,
}

impl Default for ExpertConfig {
    fn default() -> Self {
        Self {
            child_strength_percent: 15.0,
            parent_boost_amount: 1.0,
        }
    }
}

/// Net quality modifier weights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityConfig {
    /// Modifier points subtracted per defect score point
    pub defect_weight: f64,
    pub positive_aftertaste_bonus: f64,
    pub negative_aftertaste_penalty: f64,
    /// Modifier is clamped to `[-max_modifier, max_modifier]`
    pub max_modifier: f64,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            defect_weight: 0.2,
            positive_aftertaste_bonus: 0.5,
            negative_aftertaste_penalty: 1.0,
            max_modifier: 3.0,
        }
    }
}

/// One product profile (e.g. "cacao liquor", "dark chocolate")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductConfig {
    pub name: String,
    #[serde(default)]
    pub taxonomy: AttributeTaxonomy,
    #[serde(default)]
    pub zones: ZoneConfig,
    #[serde(default)]
    pub score_curve: ScoreCurve,
    #[serde(default)]
    pub boost: BoostPolicy,
    #[serde(default)]
    pub expert: ExpertConfig,
    #[serde(default)]
    pub quality: QualityConfig,
}

impl Default for ProductConfig {
    fn default() -> Self {
        Self {
            name: "cacao_liquor".to_string(),
            taxonomy: AttributeTaxonomy::default(),
            zones: ZoneConfig::default(),
            score_curve: ScoreCurve::default(),
            boost: BoostPolicy::default(),
            expert: ExpertConfig::default(),
            quality: QualityConfig::default(),
        }
    }
}

impl ProductConfig {
    /// Check taxonomy consistency and numeric ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        let taxonomy = &self.taxonomy;
        if taxonomy.core.is_empty() {
            return Err(ConfigError::invalid("taxonomy.core", "at least one core attribute required"));
        }

        let mut seen = BTreeSet::new();
        let categorized = taxonomy
            .core
            .iter()
            .chain(taxonomy.complementary.keys())
            .chain(taxonomy.defects.iter());
        for attribute in categorized {
            if !seen.insert(*attribute) {
                return Err(ConfigError::invalid(
                    "taxonomy",
                    format!("{} appears in more than one category", attribute),
                ));
            }
        }

        for (child, parent) in &taxonomy.complementary {
            if let Some(parent) = parent {
                if !taxonomy.is_core(*parent) {
                    return Err(ConfigError::invalid(
                        "taxonomy.complementary",
                        format!("parent {} of {} is not a core attribute", parent, child),
                    ));
                }
            }
        }

        let zones = &self.zones;
        if !(zones.attack_fraction > 0.0 && zones.attack_fraction < 1.0) {
            return Err(ConfigError::invalid(
                "zones.attack_fraction",
                format!("{} must be in (0, 1)", zones.attack_fraction),
            ));
        }
        if !(zones.min_presence_secs >= 0.0) || !(zones.long_persistence_secs >= 0.0) {
            return Err(ConfigError::invalid("zones", "presence thresholds must be >= 0"));
        }
        if !(zones.intensity_per_attribute >= 0.0) || !(zones.intensity_per_coverage >= 0.0) {
            return Err(ConfigError::invalid("zones", "intensity weights must be >= 0"));
        }
        if !(self.expert.child_strength_percent >= 0.0) || !(self.expert.parent_boost_amount >= 0.0) {
            return Err(ConfigError::invalid("expert", "thresholds must be >= 0"));
        }
        if !(self.quality.max_modifier >= 0.0) {
            return Err(ConfigError::invalid("quality.max_modifier", "must be >= 0"));
        }

        self.score_curve.validate()?;
        self.boost.validate()?;
        Ok(())
    }
}

/// Single-session density estimator parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DensityConfig {
    /// Grid step in seconds
    pub resolution_secs: f64,
    /// Gaussian kernel width in seconds
    pub sigma_secs: f64,
    /// Kernel support in multiples of sigma
    pub cutoff_sigmas: f64,
    /// Constant added to the denominator so weak signals fade to zero
    pub silence_constant: f64,
}

impl Default for DensityConfig {
    fn default() -> Self {
        Self {
            resolution_secs: 0.1,
            sigma_secs: 2.0,
            cutoff_sigmas: 3.0,
            silence_constant: 0.2,
        }
    }
}

impl DensityConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.resolution_secs > 0.0) {
            return Err(ConfigError::invalid("density.resolution_secs", "must be > 0"));
        }
        if !(self.sigma_secs > 0.0) || !(self.cutoff_sigmas > 0.0) {
            return Err(ConfigError::invalid("density", "kernel width must be > 0"));
        }
        if !self.sigma_secs.is_finite() || !self.cutoff_sigmas.is_finite() {
            return Err(ConfigError::invalid("density", "kernel width must be finite"));
        }
        if !(self.silence_constant > 0.0) {
            return Err(ConfigError::invalid("density.silence_constant", "must be > 0"));
        }
        Ok(())
    }
}

/// Replication aggregator parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationConfig {
    /// Gaussian kernel width in slices
    pub sigma_slices: f64,
    /// Kernel support in multiples of sigma
    pub cutoff_sigmas: f64,
    /// One-tailed z value for the significance level (1.645 → 95%)
    pub z_score: f64,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            sigma_slices: 2.0,
            cutoff_sigmas: 3.0,
            z_score: 1.645,
        }
    }
}

impl AggregationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.sigma_slices >= 0.0) || !(self.cutoff_sigmas > 0.0) {
            return Err(ConfigError::invalid("aggregation", "kernel width must be >= 0"));
        }
        if !self.sigma_slices.is_finite() || !self.cutoff_sigmas.is_finite() {
            return Err(ConfigError::invalid("aggregation", "kernel width must be finite"));
        }
        if !(self.z_score >= 0.0) {
            return Err(ConfigError::invalid("aggregation.z_score", "must be >= 0"));
        }
        Ok(())
    }
}

impl AppConfig {
    /// Parse and validate configuration JSON
    ///
    /// Unknown attribute identifiers fail deserialization, so a config that
    /// loads here only names attributes the crate knows.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.product.validate()?;
        self.density.validate()?;
        self.aggregation.validate()
    }

    /// Read and validate a configuration file
    pub fn try_load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(&path).map_err(|err| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            reason: err.to_string(),
        })?;
        Self::from_json(&contents)
    }

    /// Load configuration from JSON file
    ///
    /// # Returns
    /// The loaded configuration, or defaults (with a warning) when the file
    /// is missing, malformed or fails validation
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match Self::try_load_from_file(&path) {
            Ok(config) => {
                log::info!("[Config] Loaded configuration from {:?}", path.as_ref());
                config
            }
            Err(err) => {
                log_config_error(&err, "load_from_file");
                log::warn!("[Config] {:?}: using defaults", path.as_ref());
                Self::default()
            }
        }
    }

    /// Load the bundled product configuration
    pub fn load() -> Self {
        Self::load_from_file("assets/tds_config.json")
    }
}
