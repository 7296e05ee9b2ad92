//! Content-tier classification for captured review text.
//!
//! Tiers, best first: `complete`, `truncated`, `excerpt`, `stub`, `invalid`.
//! The checks run in that order of severity, so a paywall page is `invalid`
//! no matter how long it is and a 40-word blurb is a `stub` even when it ends
//! with a full stop.

use crate::config::Config;
use crate::models::ContentTier;
use crate::text::{normalize_for_fingerprint, word_count};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;

static BLOCKED_PAGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)subscribe to (continue|read)|already a subscriber|log ?in to (continue|read)|create a free account|page not found|\b404\b|access denied|enable javascript|are you a robot|captcha|verify you are (a )?human|we use cookies|accept (all )?cookies",
    )
    .unwrap()
});
static TRUNCATION_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)continue reading|subscribe to read|read the full review|to read the rest|(…|\.\.\.)\s*$").unwrap()
});
static ROUNDUP_HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?im)^.{0,80}\breview:").unwrap());

/// Set on a review whose text lost a trailing "continue reading" link or
/// ellipsis during cleaning.
pub const FLAG_TRUNCATED: &str = "truncated-text";

/// Only blocked pages shorter than this are thrown out; a long review that
/// mentions cookies in passing is still a review.
const BLOCKED_PAGE_MAX_WORDS: usize = 150;
const MIN_ALPHA_RATIO: f64 = 0.4;
const ROUNDUP_MIN_HEADINGS: usize = 3;
const TITLE_CHECK_MIN_WORDS: usize = 150;

const TITLE_STOPWORDS: [&str; 9] = [
    "the", "and", "musical", "broadway", "play", "new", "for", "with", "from",
];

/// Something noticed about a text while classifying it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum QualityIssue {
    Empty,
    BlockedPage,
    NonProse,
    RoundupPage,
    MatchesAggregatorExcerpt,
    NoTerminalPunctuation,
    TruncationMarker,
    ShortForFullReview,
    ShowTitleNotMentioned,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityReport {
    pub tier: ContentTier,
    pub word_count: usize,
    pub issues: Vec<QualityIssue>,
}

/// Classify a cleaned review text.
///
/// `excerpts` are the aggregator quotes we already hold for the same review;
/// a "full text" that is really one of them is only an excerpt.
pub fn assess(text: &str, show_title: Option<&str>, excerpts: &[&str], config: &Config) -> QualityReport {
    let words = word_count(text);
    let mut issues = Vec::new();

    let tier = classify(text, words, excerpts, config, &mut issues);

    if tier != ContentTier::Invalid && words >= TITLE_CHECK_MIN_WORDS {
        if let Some(title) = show_title {
            if !mentions_title(text, title) {
                issues.push(QualityIssue::ShowTitleNotMentioned);
            }
        }
    }

    QualityReport {
        tier,
        word_count: words,
        issues,
    }
}

fn classify(
    text: &str,
    words: usize,
    excerpts: &[&str],
    config: &Config,
    issues: &mut Vec<QualityIssue>,
) -> ContentTier {
    let trimmed = text.trim();
    if trimmed.is_empty() || words == 0 {
        issues.push(QualityIssue::Empty);
        return ContentTier::Invalid;
    }
    if words < BLOCKED_PAGE_MAX_WORDS && BLOCKED_PAGE.is_match(trimmed) {
        issues.push(QualityIssue::BlockedPage);
        return ContentTier::Invalid;
    }
    if is_non_prose(trimmed) {
        issues.push(QualityIssue::NonProse);
        return ContentTier::Invalid;
    }
    if roundup_headings(trimmed) >= ROUNDUP_MIN_HEADINGS {
        issues.push(QualityIssue::RoundupPage);
        return ContentTier::Invalid;
    }

    if words < config.min_words_excerpt {
        return ContentTier::Stub;
    }
    if matches_excerpt(trimmed, excerpts) {
        issues.push(QualityIssue::MatchesAggregatorExcerpt);
        return ContentTier::Excerpt;
    }
    if words < config.min_words_truncated {
        return ContentTier::Excerpt;
    }

    let mut truncated = false;
    if !ends_with_terminal_punctuation(trimmed) {
        issues.push(QualityIssue::NoTerminalPunctuation);
        truncated = true;
    }
    if TRUNCATION_MARKER.is_match(trimmed) {
        issues.push(QualityIssue::TruncationMarker);
        truncated = true;
    }
    if !truncated && words < config.min_words_complete {
        issues.push(QualityIssue::ShortForFullReview);
        truncated = true;
    }

    if truncated {
        ContentTier::Truncated
    } else {
        ContentTier::Complete
    }
}

fn is_non_prose(text: &str) -> bool {
    let visible: Vec<char> = text.chars().filter(|c| !c.is_whitespace()).collect();
    if visible.len() < 20 {
        return false;
    }
    let alpha = visible.iter().filter(|c| c.is_alphabetic()).count();
    (alpha as f64) / (visible.len() as f64) < MIN_ALPHA_RATIO
}

fn roundup_headings(text: &str) -> usize {
    ROUNDUP_HEADING
        .find_iter(text)
        .map(|m| m.as_str().trim().to_lowercase())
        .collect::<HashSet<_>>()
        .len()
}

fn matches_excerpt(text: &str, excerpts: &[&str]) -> bool {
    let normalized = normalize_for_fingerprint(text);
    excerpts.iter().any(|excerpt| {
        let excerpt = normalize_for_fingerprint(excerpt);
        if excerpt.is_empty() {
            return false;
        }
        excerpt.contains(&normalized)
            || (normalized.contains(&excerpt) && excerpt.len() * 10 >= normalized.len() * 9)
    })
}

fn ends_with_terminal_punctuation(text: &str) -> bool {
    text.chars()
        .rev()
        .find(|c| !c.is_whitespace())
        .is_some_and(|c| matches!(c, '.' | '!' | '?' | '"' | '\'' | ')' | '”' | '’' | ']'))
}

/// Whether the significant words of a show title appear in the text.
///
/// Titles made only of stopwords ("The Play") always count as mentioned.
pub fn mentions_title(text: &str, title: &str) -> bool {
    let haystack: HashSet<String> = normalize_for_fingerprint(text)
        .split(' ')
        .map(str::to_string)
        .collect();
    let significant: Vec<String> = normalize_for_fingerprint(title)
        .split(' ')
        .filter(|w| w.len() >= 3 && !TITLE_STOPWORDS.contains(w))
        .map(str::to_string)
        .collect();
    significant.is_empty() || significant.iter().any(|w| haystack.contains(w))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(n: usize, ending: &str) -> String {
        let mut text = vec!["performance"; n].join(" ");
        text.push_str(ending);
        text
    }

    fn config() -> Config {
        Config::default()
    }

    #[test]
    fn test_empty_is_invalid() {
        let report = assess("   ", None, &[], &config());
        assert_eq!(report.tier, ContentTier::Invalid);
        assert_eq!(report.issues, vec![QualityIssue::Empty]);
    }

    #[test]
    fn test_paywall_is_invalid() {
        let text = "Subscribe to continue reading. Already a subscriber? Log in.";
        let report = assess(text, None, &[], &config());
        assert_eq!(report.tier, ContentTier::Invalid);
        assert!(report.issues.contains(&QualityIssue::BlockedPage));
    }

    #[test]
    fn test_long_review_mentioning_cookies_is_not_blocked() {
        let mut text = words(400, ".");
        text.push_str(" We use cookies, the heroine sings, and the house roars.");
        let report = assess(&text, None, &[], &config());
        assert_eq!(report.tier, ContentTier::Complete);
    }

    #[test]
    fn test_non_prose_is_invalid() {
        let text = "12:30 | 4/5 | $129 | 2h 30m | 10/12/2024 | 555-0100 | 99% | #1";
        let report = assess(text, None, &[], &config());
        assert_eq!(report.tier, ContentTier::Invalid);
        assert_eq!(report.issues, vec![QualityIssue::NonProse]);
    }

    #[test]
    fn test_roundup_page_is_invalid() {
        let text = "Hamilton review: a triumph\nWicked review: still flying\nCats review: purr-fect\nMore words here.";
        let report = assess(text, None, &[], &config());
        assert_eq!(report.tier, ContentTier::Invalid);
        assert!(report.issues.contains(&QualityIssue::RoundupPage));
    }

    #[test]
    fn test_stub_excerpt_truncated_complete_thresholds() {
        let c = config();
        assert_eq!(assess(&words(20, "."), None, &[], &c).tier, ContentTier::Stub);
        assert_eq!(assess(&words(100, "."), None, &[], &c).tier, ContentTier::Excerpt);
        assert_eq!(assess(&words(200, "."), None, &[], &c).tier, ContentTier::Truncated);
        assert_eq!(assess(&words(350, "."), None, &[], &c).tier, ContentTier::Complete);
    }

    #[test]
    fn test_missing_terminal_punctuation_is_truncated() {
        let report = assess(&words(400, " and then"), None, &[], &config());
        assert_eq!(report.tier, ContentTier::Truncated);
        assert!(report.issues.contains(&QualityIssue::NoTerminalPunctuation));
    }

    #[test]
    fn test_truncation_marker() {
        let report = assess(&words(400, ". Continue reading."), None, &[], &config());
        assert_eq!(report.tier, ContentTier::Truncated);
        assert_eq!(report.issues, vec![QualityIssue::TruncationMarker]);
    }

    #[test]
    fn test_text_equal_to_excerpt_is_excerpt() {
        let text = words(200, ".");
        let excerpt = text.to_uppercase();
        let report = assess(&text, None, &[excerpt.as_str()], &config());
        assert_eq!(report.tier, ContentTier::Excerpt);
        assert!(report.issues.contains(&QualityIssue::MatchesAggregatorExcerpt));
    }

    #[test]
    fn test_show_title_not_mentioned() {
        let text = words(350, ".");
        let report = assess(&text, Some("Sunset Boulevard"), &[], &config());
        assert_eq!(report.tier, ContentTier::Complete);
        assert_eq!(report.issues, vec![QualityIssue::ShowTitleNotMentioned]);

        let report = assess(&text, Some("The Performance"), &[], &config());
        assert!(report.issues.is_empty());
    }

    #[test]
    fn test_mentions_title_stopword_only() {
        assert!(mentions_title("anything at all", "The Play"));
        assert!(mentions_title("Glenn Close returns in Sunset", "Sunset Boulevard"));
        assert!(!mentions_title("nothing relevant", "Sunset Boulevard"));
    }
}
