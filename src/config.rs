//! Tunable thresholds loaded from an optional YAML file.
//!
//! Every field carries a serde default, so a config file only needs the keys
//! it wants to override and running without one is the normal case.
//!
//! ```yaml
//! critic_match_max_distance: 2
//! min_reviews_for_score: 5
//! tier_weights:
//!   1: 1.0
//!   2: 0.85
//!   3: 0.7
//! label_thresholds:
//!   must_see: 85
//! ```

use crate::error::StoreError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, instrument};

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Largest Levenshtein distance still treated as the same critic.
    pub critic_match_max_distance: usize,
    /// Word count at or above which untruncated text is `complete`.
    pub min_words_complete: usize,
    /// Below this a text is only a `stub`.
    pub min_words_excerpt: usize,
    /// Below this a text is an `excerpt`.
    pub min_words_truncated: usize,
    /// Outlet tier -> aggregation weight.
    pub tier_weights: BTreeMap<u8, f64>,
    /// Weight for outlets with no known tier.
    pub unknown_tier_weight: f64,
    /// Shows with fewer scored reviews get no headline score.
    pub min_reviews_for_score: usize,
    pub label_thresholds: LabelThresholds,
    /// How many review-text files are read at once.
    pub concurrency: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            critic_match_max_distance: 2,
            min_words_complete: 300,
            min_words_excerpt: 50,
            min_words_truncated: 150,
            tier_weights: BTreeMap::from([(1, 1.0), (2, 0.85), (3, 0.70)]),
            unknown_tier_weight: 0.5,
            min_reviews_for_score: 5,
            label_thresholds: LabelThresholds::default(),
            concurrency: 16,
        }
    }
}

/// Lower bounds for each headline label; anything under `skippable` is "Stay Away".
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LabelThresholds {
    pub must_see: u8,
    pub recommended: u8,
    pub worth_seeing: u8,
    pub skippable: u8,
}

impl Default for LabelThresholds {
    fn default() -> Self {
        Self {
            must_see: 85,
            recommended: 75,
            worth_seeing: 65,
            skippable: 55,
        }
    }
}

impl Config {
    /// Aggregation weight for an outlet tier.
    pub fn weight_for_tier(&self, tier: Option<u8>) -> f64 {
        tier.and_then(|t| self.tier_weights.get(&t).copied())
            .unwrap_or(self.unknown_tier_weight)
    }
}

/// Load the config file, or defaults when no path was given.
#[instrument(level = "info", skip_all)]
pub async fn load_config(path: Option<&Path>) -> Result<Config, StoreError> {
    let Some(path) = path else {
        info!("No config file given; using defaults");
        return Ok(Config::default());
    };

    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| StoreError::io(path, e))?;
    let config: Config = serde_yaml::from_str(&raw).map_err(|source| StoreError::Yaml {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), "Loaded configuration");
    Ok(config)
}
