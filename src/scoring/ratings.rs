//! Parsing of published ratings into a 0–100 score.
//!
//! Recognised formats, tried in this order:
//!
//! | Format | Examples | Mapping |
//! |--------|----------|---------|
//! | Star glyphs | `★★★½`, `★★☆☆☆` | filled / total glyphs |
//! | Fractions | `4/5`, `7 out of 10`, `85/100` | numerator / denominator |
//! | Star counts | `3.5 stars`, `three and a half stars` | out of 5, or 4 when "out of 4" |
//! | Letter grades | `B+`, `Grade: A-` | fixed table |
//! | Sentiment buckets | `Rave`, `Mixed to positive` | fixed table |
//! | Thumbs | `Up`, `Thumbs down` | thumb band |
//! | Bare numbers | `4`, `8`, `72` | out of 5, 10 or 100 by size |

use crate::models::Thumb;
use once_cell::sync::Lazy;
use regex::Regex;

static FRACTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(?:/|out\s+of|of)\s*(\d+)").unwrap()
});
static STAR_COUNT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(\d+(?:\.\d+)?|zero|one|two|three|four|five)(\s*½|\s+and\s+a\s+half)?\s*-?\s*stars?\b").unwrap()
});
static OUT_OF_FOUR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bout\s+of\s+(?:4|four)\b").unwrap());
static LETTER_GRADE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:grade:?\s*)?([a-df])\s*([+\-−])?$").unwrap());
static BARE_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+(?:\.\d+)?$").unwrap());

/// Which published format a rating was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingKind {
    StarGlyphs,
    Fraction,
    StarCount,
    LetterGrade,
    Sentiment,
    Thumb,
    Numeric,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedRating {
    pub score: u8,
    pub kind: RatingKind,
}

impl ParsedRating {
    fn new(score: f64, kind: RatingKind) -> Self {
        Self {
            score: to_score(score),
            kind,
        }
    }
}

/// Round and clamp into 0..=100.
pub fn to_score(value: f64) -> u8 {
    value.round().clamp(0.0, 100.0) as u8
}

fn fraction_score(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator <= 0.0 || numerator < 0.0 || numerator > denominator {
        return None;
    }
    Some(numerator / denominator * 100.0)
}

/// Parse a published rating. `None` when nothing recognisable is present.
pub fn parse_rating(raw: &str) -> Option<ParsedRating> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    // "3 1/2 stars" reads as three and a half, not as a fraction.
    let text = trimmed.replace(" 1/2", "½");

    if let Some(score) = parse_star_glyphs(&text) {
        return Some(ParsedRating::new(score, RatingKind::StarGlyphs));
    }
    if let Some(score) = parse_fraction(&text) {
        return Some(ParsedRating::new(score, RatingKind::Fraction));
    }
    if let Some(score) = parse_star_count(&text) {
        return Some(ParsedRating::new(score, RatingKind::StarCount));
    }
    if let Some(score) = letter_grade_score(&text) {
        return Some(ParsedRating::new(score, RatingKind::LetterGrade));
    }
    if let Some(score) = sentiment_bucket_score(&text) {
        return Some(ParsedRating::new(score, RatingKind::Sentiment));
    }
    if let Some(thumb) = Thumb::parse(&text) {
        return Some(ParsedRating::new(thumb.score(), RatingKind::Thumb));
    }
    parse_bare_number(&text).map(|score| ParsedRating::new(score, RatingKind::Numeric))
}

fn parse_star_glyphs(text: &str) -> Option<f64> {
    let full = text.chars().filter(|c| matches!(c, '★' | '⭐')).count();
    let empty = text.chars().filter(|c| *c == '☆').count();
    let half = text.chars().filter(|c| *c == '½').count().min(1);
    let asterisks_only = !text.is_empty() && text.chars().all(|c| c == '*');

    if asterisks_only {
        let count = text.len().min(5);
        return fraction_score(count as f64, 5.0);
    }
    if full == 0 && empty == 0 {
        return None;
    }
    let max = if empty > 0 { full + empty + half } else { 5 };
    let value = full as f64 + 0.5 * half as f64;
    fraction_score(value, max.max(1) as f64)
}

fn parse_fraction(text: &str) -> Option<f64> {
    for caps in FRACTION.captures_iter(text) {
        let numerator: f64 = caps[1].parse().ok()?;
        let denominator: f64 = caps[2].parse().ok()?;
        if ![4.0, 5.0, 10.0, 100.0].contains(&denominator) {
            continue;
        }
        if let Some(score) = fraction_score(numerator, denominator) {
            return Some(score);
        }
    }
    None
}

fn parse_star_count(text: &str) -> Option<f64> {
    let caps = STAR_COUNT.captures(text)?;
    let base = match caps[1].to_lowercase().as_str() {
        "zero" => 0.0,
        "one" => 1.0,
        "two" => 2.0,
        "three" => 3.0,
        "four" => 4.0,
        "five" => 5.0,
        digits => digits.parse::<f64>().ok()?,
    };
    let value = if caps.get(2).is_some() { base + 0.5 } else { base };
    let max = if OUT_OF_FOUR.is_match(text) { 4.0 } else { 5.0 };
    fraction_score(value, max)
}

/// Letter grade to score. F is a pan, not a zero.
pub fn letter_grade_score(text: &str) -> Option<f64> {
    let caps = LETTER_GRADE.captures(text.trim())?;
    let letter = caps[1].to_ascii_uppercase();
    let modifier = caps.get(2).map(|m| m.as_str());
    let score = match (letter.as_str(), modifier) {
        ("A", Some("+")) => 98.0,
        ("A", None) => 95.0,
        ("A", Some(_)) => 91.0,
        ("B", Some("+")) => 87.0,
        ("B", None) => 83.0,
        ("B", Some(_)) => 79.0,
        ("C", Some("+")) => 75.0,
        ("C", None) => 70.0,
        ("C", Some(_)) => 65.0,
        ("D", Some("+")) => 58.0,
        ("D", None) => 52.0,
        ("D", Some(_)) => 45.0,
        ("F", _) => 30.0,
        _ => return None,
    };
    Some(score)
}

/// Sentiment bucket labels used by aggregators and manual entry.
pub fn sentiment_bucket_score(text: &str) -> Option<f64> {
    let lowered = text.to_lowercase();
    let spaced: String = lowered
        .chars()
        .map(|c| if c.is_alphabetic() { c } else { ' ' })
        .collect();
    let words: Vec<&str> = spaced
        .split_whitespace()
        .filter(|w| !matches!(*w, "to" | "leaning" | "and"))
        .collect();
    let score = match words.as_slice() {
        ["rave"] | ["very", "positive"] | ["ecstatic"] => 92.0,
        ["positive"] | ["favorable"] | ["favourable"] => 82.0,
        ["mixed", "positive"] | ["positive", "mixed"] => 72.0,
        ["mixed"] => 62.0,
        ["mixed", "negative"] | ["negative", "mixed"] => 50.0,
        ["negative"] | ["unfavorable"] | ["unfavourable"] => 38.0,
        ["pan"] | ["very", "negative"] => 22.0,
        _ => return None,
    };
    Some(score)
}

fn parse_bare_number(text: &str) -> Option<f64> {
    if !BARE_NUMBER.is_match(text) {
        return None;
    }
    let value: f64 = text.parse().ok()?;
    if value <= 5.0 {
        fraction_score(value, 5.0)
    } else if value <= 10.0 {
        fraction_score(value, 10.0)
    } else {
        fraction_score(value, 100.0)
    }
}
