//! Consistency audits over the outlet registry and the review set.
//!
//! Audits never modify data. They produce an [`AuditReport`] that the
//! `audit` command writes out as JSON and Markdown; [`AuditReport::is_clean`]
//! decides whether `--strict` fails the run.

use crate::config::Config;
use crate::dedupe::{DuplicateKind, find_duplicates};
use crate::models::{ContentTier, OutletRegistry, Review, ShowsFile, Thumb};
use crate::normalization::outlets::outlet_key;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::{info, instrument};

const THUMB_CONFLICT_HIGH: f64 = 70.0;
const THUMB_CONFLICT_LOW: f64 = 45.0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AliasConflict {
    pub alias: String,
    pub outlets: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryAudit {
    /// Outlet ids used by reviews but absent from the registry, with use counts.
    pub unregistered_outlets: BTreeMap<String, usize>,
    pub unused_outlets: Vec<String>,
    pub alias_conflicts: Vec<AliasConflict>,
    pub missing_domains: Vec<String>,
    pub invalid_tiers: Vec<String>,
}

impl RegistryAudit {
    pub fn is_clean(&self) -> bool {
        self.unregistered_outlets.is_empty() && self.alias_conflicts.is_empty() && self.invalid_tiers.is_empty()
    }
}

/// A pointer to one review in a finding.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRef {
    pub show_id: String,
    pub outlet_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub critic_name: Option<String>,
    pub detail: String,
}

impl ReviewRef {
    fn new(review: &Review, detail: String) -> Self {
        Self {
            show_id: review.show_id.clone(),
            outlet_id: review.outlet_id.clone(),
            critic_name: review.critic_name.clone(),
            detail,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowCount {
    pub show_id: String,
    pub review_count: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewAudit {
    pub total_reviews: usize,
    pub unknown_show_ids: BTreeMap<String, usize>,
    pub unscored: usize,
    pub out_of_range: Vec<ReviewRef>,
    pub thumb_conflicts: Vec<ReviewRef>,
    pub duplicate_groups: usize,
    pub misattribution_groups: usize,
    /// Content tier -> count; reviews never assessed count as "unassessed".
    pub tier_distribution: BTreeMap<String, usize>,
    pub flag_counts: BTreeMap<String, usize>,
    pub shows_below_minimum: Vec<ShowCount>,
}

impl ReviewAudit {
    pub fn is_clean(&self) -> bool {
        self.unknown_show_ids.is_empty()
            && self.out_of_range.is_empty()
            && self.thumb_conflicts.is_empty()
            && self.duplicate_groups == 0
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditReport {
    pub generated_at: String,
    pub registry: RegistryAudit,
    pub reviews: ReviewAudit,
}

impl AuditReport {
    pub fn is_clean(&self) -> bool {
        self.registry.is_clean() && self.reviews.is_clean()
    }
}

/// Check the registry against itself and against the outlets reviews use.
#[instrument(level = "info", skip_all, fields(outlets = registry.outlets.len(), reviews = reviews.len()))]
pub fn audit_registry(registry: &OutletRegistry, reviews: &[Review]) -> RegistryAudit {
    let mut audit = RegistryAudit::default();

    let mut used: BTreeMap<&str, usize> = BTreeMap::new();
    for review in reviews {
        *used.entry(review.outlet_id.as_str()).or_insert(0) += 1;
    }
    for (&outlet_id, &count) in &used {
        if !registry.outlets.contains_key(outlet_id) {
            audit.unregistered_outlets.insert(outlet_id.to_string(), count);
        }
    }

    let mut claims: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for (id, entry) in &registry.outlets {
        if !used.contains_key(id.as_str()) {
            audit.unused_outlets.push(id.clone());
        }
        if entry.domains.is_empty() {
            audit.missing_domains.push(id.clone());
        }
        if entry.tier.is_some_and(|t| !(1..=3).contains(&t)) {
            audit.invalid_tiers.push(id.clone());
        }
        let keys: HashSet<String> = entry
            .aliases
            .iter()
            .chain(std::iter::once(&entry.display_name))
            .map(|a| outlet_key(a))
            .filter(|k| !k.is_empty())
            .collect();
        for key in keys {
            claims.entry(key).or_default().insert(id.clone());
        }
    }
    audit.alias_conflicts = claims
        .into_iter()
        .filter(|(_, ids)| ids.len() > 1)
        .map(|(alias, ids)| AliasConflict {
            alias,
            outlets: ids.into_iter().collect(),
        })
        .collect();

    info!(
        unregistered = audit.unregistered_outlets.len(),
        unused = audit.unused_outlets.len(),
        alias_conflicts = audit.alias_conflicts.len(),
        "Registry audit complete"
    );
    audit
}

/// Check reviews for unknown shows, score problems, duplicates and coverage.
#[instrument(level = "info", skip_all, fields(reviews = reviews.len()))]
pub fn audit_reviews(shows: &ShowsFile, reviews: &[Review], config: &Config) -> ReviewAudit {
    let known_shows: HashSet<&str> = shows.shows.iter().map(|s| s.id.as_str()).collect();
    let mut audit = ReviewAudit {
        total_reviews: reviews.len(),
        ..Default::default()
    };
    let mut scored_per_show: BTreeMap<&str, usize> = BTreeMap::new();

    for review in reviews {
        if !known_shows.contains(review.show_id.as_str()) {
            *audit.unknown_show_ids.entry(review.show_id.clone()).or_insert(0) += 1;
        }

        let tier = review.content_tier.map(ContentTier::as_str).unwrap_or("unassessed");
        *audit.tier_distribution.entry(tier.to_string()).or_insert(0) += 1;
        for flag in &review.flags {
            *audit.flag_counts.entry(flag.clone()).or_insert(0) += 1;
        }

        let Some(score) = review.assigned_score else {
            audit.unscored += 1;
            continue;
        };
        if !(0.0..=100.0).contains(&score) {
            audit.out_of_range.push(ReviewRef::new(review, format!("assigned score {score}")));
            continue;
        }
        *scored_per_show.entry(review.show_id.as_str()).or_insert(0) += 1;

        let thumbs: Vec<Thumb> = [&review.dtli_thumb, &review.bww_thumb]
            .into_iter()
            .filter_map(|t| t.as_deref().and_then(Thumb::parse))
            .collect();
        if score >= THUMB_CONFLICT_HIGH && thumbs.contains(&Thumb::Down) {
            audit
                .thumb_conflicts
                .push(ReviewRef::new(review, format!("score {score} with a thumbs down")));
        } else if score <= THUMB_CONFLICT_LOW && thumbs.contains(&Thumb::Up) {
            audit
                .thumb_conflicts
                .push(ReviewRef::new(review, format!("score {score} with a thumbs up")));
        }
    }

    for group in find_duplicates(reviews, config) {
        match group.kind {
            DuplicateKind::SameOutletCritic => audit.duplicate_groups += 1,
            _ => audit.misattribution_groups += 1,
        }
    }

    for show in &shows.shows {
        let count = scored_per_show.get(show.id.as_str()).copied().unwrap_or(0);
        if count < config.min_reviews_for_score {
            audit.shows_below_minimum.push(ShowCount {
                show_id: show.id.clone(),
                review_count: count,
            });
        }
    }

    info!(
        unknown_shows = audit.unknown_show_ids.len(),
        unscored = audit.unscored,
        out_of_range = audit.out_of_range.len(),
        thumb_conflicts = audit.thumb_conflicts.len(),
        duplicate_groups = audit.duplicate_groups,
        "Review audit complete"
    );
    audit
}
