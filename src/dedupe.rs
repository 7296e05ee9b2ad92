//! Duplicate and misattribution detection.
//!
//! The same review often arrives several times: once from a BWW roundup,
//! once from DTLI, once from a direct scrape, each with a slightly different
//! byline. Within one show we look for:
//!
//! - **same outlet + same critic**: a true duplicate, merged into one record
//! - **same URL under different outlets**: somebody mislabelled the outlet
//! - **same text under different outlets**: a misattributed or syndicated copy
//!
//! Across shows, identical text filed under two shows means one of them is
//! the wrong show. Only true duplicates are merged; everything else is
//! flagged for a human.

use crate::config::Config;
use crate::models::{ContentTier, Review};
use crate::normalization::critic_names_match;
use crate::text::normalize_for_fingerprint;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::{debug, info, instrument};
use url::Url;

/// Texts shorter than this are too generic to fingerprint.
const FINGERPRINT_MIN_WORDS: usize = 30;
const FINGERPRINT_MAX_CHARS: usize = 2000;

pub const FLAG_MISATTRIBUTION: &str = "possible-misattribution";
pub const FLAG_WRONG_SHOW: &str = "possible-wrong-show";

/// SHA-256 of the normalized opening of a text, or `None` for short texts.
pub fn content_fingerprint(text: &str) -> Option<String> {
    let normalized = normalize_for_fingerprint(text);
    if normalized.split(' ').filter(|w| !w.is_empty()).count() < FINGERPRINT_MIN_WORDS {
        return None;
    }
    let head: String = normalized.chars().take(FINGERPRINT_MAX_CHARS).collect();
    let mut hasher = Sha256::new();
    hasher.update(head.as_bytes());
    Some(format!("{:x}", hasher.finalize()))
}

/// Fingerprint stored on the review, or computed from its full text.
fn fingerprint_of(review: &Review) -> Option<String> {
    review
        .content_hash
        .clone()
        .or_else(|| review.full_text.as_deref().and_then(content_fingerprint))
}

/// Comparable form of a review URL: host without `www.`, path without
/// trailing slash, no scheme, query or fragment.
pub fn normalize_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    match Url::parse(trimmed) {
        Ok(url) => {
            let host = url.host_str()?.to_lowercase();
            let host = host.trim_start_matches("www.");
            let path = url.path().trim_end_matches('/');
            Some(format!("{}{}", host, path))
        }
        Err(_) => Some(trimmed.trim_end_matches('/').to_lowercase()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicateKind {
    SameOutletCritic,
    SameUrl,
    SameContent,
    CrossShow,
}

/// Reviews (by index into the input slice) judged to be copies of each other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateGroup {
    pub kind: DuplicateKind,
    pub indices: Vec<usize>,
    pub show_ids: Vec<String>,
    pub outlet_ids: Vec<String>,
}

impl DuplicateGroup {
    fn new(kind: DuplicateKind, indices: Vec<usize>, reviews: &[Review]) -> Self {
        let show_ids: BTreeSet<String> = indices.iter().map(|&i| reviews[i].show_id.clone()).collect();
        let outlet_ids: BTreeSet<String> = indices.iter().map(|&i| reviews[i].outlet_id.clone()).collect();
        Self {
            kind,
            indices,
            show_ids: show_ids.into_iter().collect(),
            outlet_ids: outlet_ids.into_iter().collect(),
        }
    }
}

/// Two records from the same outlet are the same review unless both name
/// a critic and the names disagree.
fn same_critic(a: &Review, b: &Review, max_distance: usize) -> bool {
    match (a.critic_name.as_deref(), b.critic_name.as_deref()) {
        (Some(x), Some(y)) if !x.trim().is_empty() && !y.trim().is_empty() => {
            critic_names_match(x, y, max_distance).is_match()
        }
        _ => true,
    }
}

/// Duplicate groups within each show.
pub fn find_duplicates(reviews: &[Review], config: &Config) -> Vec<DuplicateGroup> {
    let mut by_show: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (i, review) in reviews.iter().enumerate() {
        by_show.entry(review.show_id.as_str()).or_default().push(i);
    }

    let mut groups = Vec::new();
    for indices in by_show.values() {
        // Greedy clustering: each review joins the first cluster it matches.
        let mut clusters: Vec<Vec<usize>> = Vec::new();
        for &i in indices {
            let found = clusters.iter_mut().find(|cluster| {
                let first = &reviews[cluster[0]];
                first.outlet_id == reviews[i].outlet_id
                    && cluster
                        .iter()
                        .all(|&j| same_critic(&reviews[j], &reviews[i], config.critic_match_max_distance))
            });
            match found {
                Some(cluster) => cluster.push(i),
                None => clusters.push(vec![i]),
            }
        }
        groups.extend(
            clusters
                .into_iter()
                .filter(|c| c.len() > 1)
                .map(|c| DuplicateGroup::new(DuplicateKind::SameOutletCritic, c, reviews)),
        );

        let mut by_url: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        let mut by_content: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for &i in indices {
            if let Some(url) = reviews[i].url.as_deref().and_then(normalize_url) {
                by_url.entry(url).or_default().push(i);
            }
            if let Some(hash) = fingerprint_of(&reviews[i]) {
                by_content.entry(hash).or_default().push(i);
            }
        }
        for (kind, map) in [(DuplicateKind::SameUrl, by_url), (DuplicateKind::SameContent, by_content)] {
            for members in map.into_values() {
                let outlets: HashSet<&str> = members.iter().map(|&i| reviews[i].outlet_id.as_str()).collect();
                if outlets.len() > 1 {
                    groups.push(DuplicateGroup::new(kind, members, reviews));
                }
            }
        }
    }
    groups
}

/// Identical text filed under more than one show.
pub fn find_cross_show_content(reviews: &[Review]) -> Vec<DuplicateGroup> {
    let mut by_content: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (i, review) in reviews.iter().enumerate() {
        if let Some(hash) = fingerprint_of(review) {
            by_content.entry(hash).or_default().push(i);
        }
    }
    by_content
        .into_values()
        .filter(|members| {
            members
                .iter()
                .map(|&i| reviews[i].show_id.as_str())
                .collect::<HashSet<_>>()
                .len()
                > 1
        })
        .map(|members| DuplicateGroup::new(DuplicateKind::CrossShow, members, reviews))
        .collect()
}

fn richness(review: &Review) -> (Option<ContentTier>, usize, bool) {
    (
        review.content_tier,
        review.full_text.as_deref().map(str::len).unwrap_or(0),
        review.original_score.is_some(),
    )
}

fn fill<T>(dst: &mut Option<T>, src: Option<T>) {
    if dst.is_none() {
        *dst = src;
    }
}

fn union(dst: &mut Vec<String>, src: Vec<String>) {
    for item in src {
        if !dst.contains(&item) {
            dst.push(item);
        }
    }
}

/// Merge two records of the same review.
///
/// The richer record (better content tier, then longer text, then having a
/// published rating) is the base; every field it lacks is filled from the
/// other, and sources and flags are unioned.
pub fn merge_reviews(a: Review, b: Review) -> Review {
    let (mut base, other) = if richness(&b) > richness(&a) { (b, a) } else { (a, b) };

    if base.outlet.trim().is_empty() {
        base.outlet = other.outlet;
    }
    if base.outlet_id.trim().is_empty() {
        base.outlet_id = other.outlet_id;
    }
    let base_critic_blank = base.critic_name.as_deref().is_none_or(|c| c.trim().is_empty());
    if base_critic_blank {
        base.critic_name = other.critic_name;
    }
    fill(&mut base.url, other.url);
    fill(&mut base.publish_date, other.publish_date);
    fill(&mut base.original_score, other.original_score);
    fill(&mut base.assigned_score, other.assigned_score);
    fill(&mut base.score_source, other.score_source);
    fill(&mut base.score_confidence, other.score_confidence);
    fill(&mut base.llm_score, other.llm_score);
    fill(&mut base.dtli_thumb, other.dtli_thumb);
    fill(&mut base.bww_thumb, other.bww_thumb);
    fill(&mut base.dtli_excerpt, other.dtli_excerpt);
    fill(&mut base.bww_excerpt, other.bww_excerpt);
    fill(&mut base.full_text, other.full_text);
    fill(&mut base.content_tier, other.content_tier);
    fill(&mut base.word_count, other.word_count);
    fill(&mut base.content_hash, other.content_hash);
    union(&mut base.sources, other.sources);
    union(&mut base.flags, other.flags);
    for (key, value) in other.extra {
        base.extra.entry(key).or_insert(value);
    }
    base
}

/// What one dedupe pass did.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DedupeReport {
    pub input_reviews: usize,
    pub output_reviews: usize,
    pub merged_groups: usize,
    pub removed: usize,
    pub misattribution_flags: usize,
    pub wrong_show_flags: usize,
    pub groups: Vec<DuplicateGroup>,
}

/// Flag suspects, merge true duplicates, and return the surviving reviews.
#[instrument(level = "info", skip_all, fields(count = reviews.len()))]
pub fn dedupe_reviews(reviews: Vec<Review>, config: &Config) -> (Vec<Review>, DedupeReport) {
    let mut groups = find_duplicates(&reviews, config);
    groups.extend(find_cross_show_content(&reviews));

    let mut report = DedupeReport {
        input_reviews: reviews.len(),
        ..Default::default()
    };
    let mut reviews = reviews;

    for group in &groups {
        let flag = match group.kind {
            DuplicateKind::SameUrl | DuplicateKind::SameContent => FLAG_MISATTRIBUTION,
            DuplicateKind::CrossShow => FLAG_WRONG_SHOW,
            DuplicateKind::SameOutletCritic => continue,
        };
        for &i in &group.indices {
            if !reviews[i].has_flag(flag) {
                reviews[i].add_flag(flag);
                match group.kind {
                    DuplicateKind::CrossShow => report.wrong_show_flags += 1,
                    _ => report.misattribution_flags += 1,
                }
            }
        }
    }

    // Map every merged-away index to the first index of its group.
    let mut merge_into: BTreeMap<usize, usize> = BTreeMap::new();
    for group in groups.iter().filter(|g| g.kind == DuplicateKind::SameOutletCritic) {
        let head = group.indices[0];
        for &i in &group.indices[1..] {
            merge_into.insert(i, head);
        }
        report.merged_groups += 1;
        debug!(
            show_ids = ?group.show_ids,
            outlet_ids = ?group.outlet_ids,
            size = group.indices.len(),
            "Merging duplicate reviews"
        );
    }

    let mut slots: Vec<Option<Review>> = reviews.into_iter().map(Some).collect();
    for (&i, &head) in &merge_into {
        if let (Some(dup), Some(base)) = (slots[i].take(), slots[head].take()) {
            slots[head] = Some(merge_reviews(base, dup));
        }
    }
    let survivors: Vec<Review> = slots.into_iter().flatten().collect();

    report.removed = merge_into.len();
    report.output_reviews = survivors.len();
    report.groups = groups;
    info!(
        input = report.input_reviews,
        output = report.output_reviews,
        merged_groups = report.merged_groups,
        misattribution_flags = report.misattribution_flags,
        wrong_show_flags = report.wrong_show_flags,
        "Dedupe complete"
    );
    (survivors, report)
}
