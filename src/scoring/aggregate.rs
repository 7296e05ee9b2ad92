//! Show-level score aggregation.
//!
//! A show's score is the mean of its reviews' assigned scores weighted by
//! outlet tier. Reviews flagged as duplicates or as belonging to another
//! show are left out. Below the configured minimum review count the show
//! gets no number and the label "TBD".

use crate::config::{Config, LabelThresholds};
use crate::models::{Review, Show};
use crate::normalization::OutletResolver;
use serde::{Deserialize, Serialize};

/// Flags that take a review out of its show's aggregate.
pub const EXCLUDING_FLAGS: [&str; 2] = ["duplicate", "possible-wrong-show"];

const POSITIVE_FLOOR: f64 = 70.0;
const MIXED_FLOOR: f64 = 50.0;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Distribution {
    pub positive: usize,
    pub mixed: usize,
    pub negative: usize,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowScore {
    pub show_id: String,
    pub title: String,
    pub review_count: usize,
    pub score: Option<u8>,
    pub label: String,
    pub tier1_count: usize,
    pub distribution: Distribution,
}

/// `show-scores.json`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowScoresFile {
    pub generated_at: String,
    pub shows: Vec<ShowScore>,
}

/// Headline label for a rounded score.
pub fn label_for(score: Option<u8>, thresholds: &LabelThresholds) -> &'static str {
    match score {
        None => "TBD",
        Some(s) if s >= thresholds.must_see => "Must See",
        Some(s) if s >= thresholds.recommended => "Recommended",
        Some(s) if s >= thresholds.worth_seeing => "Worth Seeing",
        Some(s) if s >= thresholds.skippable => "Skippable",
        Some(_) => "Stay Away",
    }
}

/// Aggregate the reviews belonging to `show`. Reviews of other shows are ignored.
pub fn aggregate_show(show: &Show, reviews: &[Review], resolver: &OutletResolver, config: &Config) -> ShowScore {
    let mut weighted_sum = 0.0;
    let mut weight_total = 0.0;
    let mut review_count = 0;
    let mut tier1_count = 0;
    let mut distribution = Distribution::default();

    let counted = reviews
        .iter()
        .filter(|r| r.show_id == show.id)
        .filter(|r| !EXCLUDING_FLAGS.iter().any(|f| r.has_flag(f)));

    for review in counted {
        let Some(score) = review.assigned_score.filter(|s| (0.0..=100.0).contains(s)) else {
            continue;
        };
        let tier = resolver.tier(&review.outlet_id);
        let weight = config.weight_for_tier(tier);

        weighted_sum += score * weight;
        weight_total += weight;
        review_count += 1;
        if tier == Some(1) {
            tier1_count += 1;
        }
        if score >= POSITIVE_FLOOR {
            distribution.positive += 1;
        } else if score >= MIXED_FLOOR {
            distribution.mixed += 1;
        } else {
            distribution.negative += 1;
        }
    }

    let score = if review_count >= config.min_reviews_for_score && weight_total > 0.0 {
        Some(super::ratings::to_score(weighted_sum / weight_total))
    } else {
        None
    };

    ShowScore {
        show_id: show.id.clone(),
        title: show.title.clone(),
        review_count,
        score,
        label: label_for(score, &config.label_thresholds).to_string(),
        tier1_count,
        distribution,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OutletRegistry;

    fn show() -> Show {
        Show {
            id: "sunset-2024".to_string(),
            title: "Sunset Blvd.".to_string(),
            ..Default::default()
        }
    }

    fn scored(outlet: &str, score: f64) -> Review {
        Review {
            show_id: "sunset-2024".to_string(),
            outlet_id: outlet.to_string(),
            assigned_score: Some(score),
            ..Default::default()
        }
    }

    #[test]
    fn test_label_for() {
        let t = LabelThresholds::default();
        assert_eq!(label_for(None, &t), "TBD");
        assert_eq!(label_for(Some(85), &t), "Must See");
        assert_eq!(label_for(Some(80), &t), "Recommended");
        assert_eq!(label_for(Some(65), &t), "Worth Seeing");
        assert_eq!(label_for(Some(55), &t), "Skippable");
        assert_eq!(label_for(Some(54), &t), "Stay Away");
    }

    #[test]
    fn test_weighted_by_tier() {
        let resolver = OutletResolver::new(&OutletRegistry::default());
        let config = Config {
            min_reviews_for_score: 2,
            ..Config::default()
        };
        // nytimes is tier 1 (weight 1.0), broadwayworld tier 3 (weight 0.7)
        let reviews = vec![scored("nytimes", 90.0), scored("broadwayworld", 40.0)];
        let result = aggregate_show(&show(), &reviews, &resolver, &config);
        // (90 * 1.0 + 40 * 0.7) / 1.7 = 69.41
        assert_eq!(result.score, Some(69));
        assert_eq!(result.label, "Worth Seeing");
        assert_eq!(result.tier1_count, 1);
        assert_eq!(result.distribution, Distribution { positive: 1, mixed: 0, negative: 1 });
    }

    #[test]
    fn test_below_minimum_is_tbd() {
        let resolver = OutletResolver::new(&OutletRegistry::default());
        let reviews = vec![scored("nytimes", 90.0)];
        let result = aggregate_show(&show(), &reviews, &resolver, &Config::default());
        assert_eq!(result.review_count, 1);
        assert_eq!(result.score, None);
        assert_eq!(result.label, "TBD");
    }

    #[test]
    fn test_excludes_flagged_unscored_and_other_shows() {
        let resolver = OutletResolver::new(&OutletRegistry::default());
        let config = Config {
            min_reviews_for_score: 1,
            ..Config::default()
        };
        let mut dup = scored("variety", 10.0);
        dup.add_flag("duplicate");
        let mut other = scored("variety", 10.0);
        other.show_id = "other".to_string();
        let unscored = Review {
            show_id: "sunset-2024".to_string(),
            ..Default::default()
        };
        let reviews = vec![scored("variety", 80.0), dup, other, unscored];
        let result = aggregate_show(&show(), &reviews, &resolver, &config);
        assert_eq!(result.review_count, 1);
        assert_eq!(result.score, Some(80));
    }
}
