//! Data models for shows, reviews, and the outlet registry.
//!
//! These mirror the flat JSON files under the data directory:
//! - [`ShowsFile`]: `shows.json`
//! - [`ReviewsFile`]: `reviews.json` (and, one [`Review`] per file, `review-texts/`)
//! - [`OutletRegistry`]: `outlet-registry.json`
//!
//! Field names are camelCase on disk. Every struct keeps unrecognised keys in
//! an `extra` map so that a load/save cycle never drops data someone else put
//! there.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

/// A production listed in `shows.json`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Show {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opening_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closing_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub show_type: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ShowsFile {
    pub shows: Vec<Show>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One critic's review of one show.
///
/// The same shape is used for rows of `reviews.json` and for the individual
/// files under `review-texts/`, which additionally carry `fullText`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(default)]
    pub show_id: String,
    #[serde(default)]
    pub outlet_id: String,
    /// Display name of the outlet as the source spelled it.
    #[serde(default)]
    pub outlet: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub critic_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_date: Option<String>,
    /// The rating exactly as published: "4/5", "B+", "★★★½", "Rave", ...
    #[serde(
        default,
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub original_score: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_source: Option<ScoreSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_confidence: Option<Confidence>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dtli_thumb: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bww_thumb: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dtli_excerpt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bww_excerpt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_tier: Option<ContentTier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,
    /// Where this record came from: "bww", "dtli", "show-score", "manual", ...
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flags: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Review {
    /// The richest text we hold: full text first, then aggregator excerpts.
    pub fn best_text(&self) -> Option<&str> {
        [&self.full_text, &self.bww_excerpt, &self.dtli_excerpt]
            .into_iter()
            .filter_map(|t| t.as_deref())
            .find(|t| !t.trim().is_empty())
    }

    /// Aggregator excerpts attached to this review.
    pub fn excerpts(&self) -> Vec<&str> {
        [&self.bww_excerpt, &self.dtli_excerpt]
            .into_iter()
            .filter_map(|t| t.as_deref())
            .filter(|t| !t.trim().is_empty())
            .collect()
    }

    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.iter().any(|f| f == flag)
    }

    /// Add a flag once.
    pub fn add_flag(&mut self, flag: &str) {
        if !self.has_flag(flag) {
            self.flags.push(flag.to_string());
        }
    }
}

/// `_meta` block at the top of `reviews.json`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewsMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_reviews: Option<usize>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ReviewsFile {
    #[serde(rename = "_meta", default)]
    pub meta: ReviewsMeta,
    #[serde(default)]
    pub reviews: Vec<Review>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `outlet-registry.json`: canonical outlet ids and how to recognise them.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OutletRegistry {
    #[serde(default)]
    pub outlets: BTreeMap<String, OutletEntry>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutletEntry {
    #[serde(alias = "name")]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<u8>,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub domains: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// How much usable review text was captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentTier {
    #[serde(alias = "full")]
    Complete,
    Truncated,
    Excerpt,
    Stub,
    Invalid,
}

impl ContentTier {
    pub const ALL: [ContentTier; 5] = [
        ContentTier::Complete,
        ContentTier::Truncated,
        ContentTier::Excerpt,
        ContentTier::Stub,
        ContentTier::Invalid,
    ];

    /// Higher is more usable.
    pub fn rank(self) -> u8 {
        match self {
            ContentTier::Complete => 4,
            ContentTier::Truncated => 3,
            ContentTier::Excerpt => 2,
            ContentTier::Stub => 1,
            ContentTier::Invalid => 0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ContentTier::Complete => "complete",
            ContentTier::Truncated => "truncated",
            ContentTier::Excerpt => "excerpt",
            ContentTier::Stub => "stub",
            ContentTier::Invalid => "invalid",
        }
    }
}

impl PartialOrd for ContentTier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Ordered by usability, `Complete` greatest.
impl Ord for ContentTier {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl fmt::Display for ContentTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregator sentiment: thumbs up, sideways, or down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Thumb {
    Up,
    Meh,
    Down,
}

impl Thumb {
    /// Lenient parse of the spellings DTLI and BWW use.
    pub fn parse(raw: &str) -> Option<Thumb> {
        let key = raw.trim().to_lowercase();
        let key = key
            .trim_start_matches("thumbs")
            .trim_start_matches("thumb")
            .trim()
            .trim_start_matches(['-', '_'])
            .trim();
        match key {
            "up" | "yes" | "positive" | "+" => Some(Thumb::Up),
            "meh" | "mid" | "sideways" | "flat" | "mixed" | "middle" | "~" => Some(Thumb::Meh),
            "down" | "no" | "negative" => Some(Thumb::Down),
            _ => None,
        }
    }

    /// Score band centre used when a thumb is all we have.
    pub fn score(self) -> f64 {
        match self {
            Thumb::Up => 80.0,
            Thumb::Meh => 60.0,
            Thumb::Down => 35.0,
        }
    }
}

/// Which input an assigned score was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScoreSource {
    OriginalRating,
    Llm,
    Sentiment,
    Thumb,
    Keywords,
}

/// How much weight an assigned score deserves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

/// Accept `"4/5"` as well as a bare `4` for rating fields.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_review_deserialization_camel_case() {
        let json = r#"{
            "showId": "hamilton-2015",
            "outletId": "nytimes",
            "outlet": "The New York Times",
            "criticName": "Ben Brantley",
            "originalScore": 5,
            "dtliThumb": "Up",
            "someLegacyField": true
        }"#;
        let review: Review = serde_json::from_str(json).unwrap();
        assert_eq!(review.show_id, "hamilton-2015");
        assert_eq!(review.critic_name.as_deref(), Some("Ben Brantley"));
        assert_eq!(review.original_score.as_deref(), Some("5"));
        assert_eq!(review.extra.get("someLegacyField"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_review_serialization_keeps_unknown_fields() {
        let json = r#"{"showId":"x","outletId":"variety","outlet":"Variety","legacy":1}"#;
        let review: Review = serde_json::from_str(json).unwrap();
        let out = serde_json::to_string(&review).unwrap();
        assert!(out.contains("\"legacy\":1"));
        assert!(!out.contains("criticName"));
    }

    #[test]
    fn test_reviews_file_meta() {
        let json = r#"{"_meta":{"lastUpdated":"2025-01-01","totalReviews":1},"reviews":[{"showId":"a"}]}"#;
        let file: ReviewsFile = serde_json::from_str(json).unwrap();
        assert_eq!(file.meta.total_reviews, Some(1));
        assert_eq!(file.reviews.len(), 1);
        assert_eq!(file.reviews[0].outlet_id, "");
    }

    #[test]
    fn test_best_text_prefers_full_text() {
        let review = Review {
            full_text: Some("  ".to_string()),
            bww_excerpt: Some("A dazzling night.".to_string()),
            dtli_excerpt: Some("Other".to_string()),
            ..Default::default()
        };
        assert_eq!(review.best_text(), Some("A dazzling night."));
        assert_eq!(review.excerpts().len(), 2);
    }

    #[test]
    fn test_add_flag_is_idempotent() {
        let mut review = Review::default();
        review.add_flag("duplicate");
        review.add_flag("duplicate");
        assert_eq!(review.flags, vec!["duplicate".to_string()]);
    }

    #[test]
    fn test_content_tier_serde_and_rank() {
        let tier: ContentTier = serde_json::from_str("\"full\"").unwrap();
        assert_eq!(tier, ContentTier::Complete);
        assert_eq!(serde_json::to_string(&ContentTier::Stub).unwrap(), "\"stub\"");
        assert!(ContentTier::Truncated.rank() > ContentTier::Excerpt.rank());
    }

    #[test]
    fn test_content_tier_ordering() {
        assert!(ContentTier::Complete > ContentTier::Truncated);
        assert!(ContentTier::Truncated > ContentTier::Excerpt);
        assert!(ContentTier::Excerpt > ContentTier::Stub);
        assert!(ContentTier::Stub > ContentTier::Invalid);
        assert_eq!(ContentTier::ALL.iter().max(), Some(&ContentTier::Complete));
        assert_eq!(Some(ContentTier::Stub).max(None), Some(ContentTier::Stub));
    }

    #[test]
    fn test_thumb_parse() {
        assert_eq!(Thumb::parse("Up"), Some(Thumb::Up));
        assert_eq!(Thumb::parse("thumbs-down"), Some(Thumb::Down));
        assert_eq!(Thumb::parse("Thumbs Sideways"), Some(Thumb::Meh));
        assert_eq!(Thumb::parse("Flat"), Some(Thumb::Meh));
        assert_eq!(Thumb::parse("maybe"), None);
    }

    #[test]
    fn test_registry_name_alias() {
        let json = r#"{"outlets":{"nytimes":{"name":"The New York Times","tier":1,"aliases":["NYT"],"domains":["nytimes.com"]}}}"#;
        let registry: OutletRegistry = serde_json::from_str(json).unwrap();
        assert_eq!(registry.outlets["nytimes"].display_name, "The New York Times");
        assert_eq!(registry.outlets["nytimes"].tier, Some(1));
        assert!(registry.outlets["nytimes"].extra.is_empty());
    }

    #[test]
    fn test_score_source_kebab_case() {
        let out = serde_json::to_string(&ScoreSource::OriginalRating).unwrap();
        assert_eq!(out, "\"original-rating\"");
    }

    #[test]
    fn test_score_confidence_round_trips() {
        let json = r#"{"showId":"x","assignedScore":80,"scoreSource":"thumb","scoreConfidence":"medium"}"#;
        let review: Review = serde_json::from_str(json).unwrap();
        assert_eq!(review.score_confidence, Some(Confidence::Medium));
        let out = serde_json::to_string(&review).unwrap();
        assert!(out.contains("\"scoreConfidence\":\"medium\""));
    }
}
