//! Normalized 0–100 review scores and show-level aggregates.
//!
//! # Submodules
//!
//! - [`ratings`]: parse published ratings (stars, grades, buckets, thumbs)
//! - [`keywords`]: cue-word fallback for reviews with no rating at all
//! - [`aggregate`]: tier-weighted show scores and headline labels
//!
//! # Assignment priority
//!
//! 1. The critic's own published rating (`originalScore`)
//! 2. A previously stored model score (`llmScore`)
//! 3. Aggregator thumbs (DTLI and BWW, averaged when both exist)
//! 4. Cue words in the review text (never for `invalid` text)

pub mod aggregate;
pub mod keywords;
pub mod ratings;

use crate::models::{Confidence, ContentTier, Review, ScoreSource, Thumb};
use ratings::{RatingKind, parse_rating, to_score};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreAssignment {
    pub score: u8,
    pub source: ScoreSource,
    pub confidence: Confidence,
}

/// Pick a score for one review from the best input it carries.
pub fn assign_score(review: &Review) -> Option<ScoreAssignment> {
    if let Some(parsed) = review.original_score.as_deref().and_then(parse_rating) {
        let (source, confidence) = match parsed.kind {
            RatingKind::Sentiment => (ScoreSource::Sentiment, Confidence::Medium),
            RatingKind::Thumb => (ScoreSource::Thumb, Confidence::Medium),
            _ => (ScoreSource::OriginalRating, Confidence::High),
        };
        return Some(ScoreAssignment {
            score: parsed.score,
            source,
            confidence,
        });
    }

    if let Some(llm) = review.llm_score.filter(|s| (0.0..=100.0).contains(s)) {
        return Some(ScoreAssignment {
            score: to_score(llm),
            source: ScoreSource::Llm,
            confidence: Confidence::Medium,
        });
    }

    let thumbs: Vec<Thumb> = [&review.dtli_thumb, &review.bww_thumb]
        .into_iter()
        .filter_map(|t| t.as_deref().and_then(Thumb::parse))
        .collect();
    if !thumbs.is_empty() {
        let mean = thumbs.iter().map(|t| t.score()).sum::<f64>() / thumbs.len() as f64;
        let agree = thumbs.windows(2).all(|w| w[0] == w[1]);
        return Some(ScoreAssignment {
            score: to_score(mean),
            source: ScoreSource::Thumb,
            confidence: if thumbs.len() > 1 && agree {
                Confidence::Medium
            } else {
                Confidence::Low
            },
        });
    }

    if review.content_tier == Some(ContentTier::Invalid) {
        return None;
    }
    let score = review.best_text().and_then(keywords::keyword_sentiment)?;
    Some(ScoreAssignment {
        score,
        source: ScoreSource::Keywords,
        confidence: Confidence::Low,
    })
}

/// Counts from one scoring pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSummary {
    pub assigned: usize,
    pub changed: usize,
    pub unscored: usize,
    pub by_source: BTreeMap<String, usize>,
    pub by_confidence: BTreeMap<Confidence, usize>,
}

/// Assign scores in place. Reviews with no usable input keep whatever
/// score they already had (a manual entry, say).
pub fn apply_scores(reviews: &mut [Review]) -> ScoreSummary {
    let mut summary = ScoreSummary::default();
    for review in reviews.iter_mut() {
        let Some(assignment) = assign_score(review) else {
            if review.assigned_score.is_none() {
                summary.unscored += 1;
            }
            continue;
        };

        let new_score = f64::from(assignment.score);
        if review.assigned_score != Some(new_score)
            || review.score_source != Some(assignment.source)
            || review.score_confidence != Some(assignment.confidence)
        {
            debug!(
                show_id = %review.show_id,
                outlet_id = %review.outlet_id,
                old = ?review.assigned_score,
                new = assignment.score,
                source = ?assignment.source,
                confidence = ?assignment.confidence,
                "Score changed"
            );
            summary.changed += 1;
        }
        review.assigned_score = Some(new_score);
        review.score_source = Some(assignment.source);
        review.score_confidence = Some(assignment.confidence);
        summary.assigned += 1;
        *summary.by_confidence.entry(assignment.confidence).or_insert(0) += 1;

        let key = serde_json::to_value(assignment.source)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default();
        *summary.by_source.entry(key).or_insert(0) += 1;
    }
    summary
}
