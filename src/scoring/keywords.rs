//! Last-resort score from critic vocabulary.
//!
//! Counts positive and negative cue words in the review text. A cue preceded
//! within two words by a negation ("not dull", "never thrilling") counts for
//! the other side. At least [`MIN_CUES`] cues are required before a score is
//! produced, and the result stays within 30..=90: free text alone never
//! justifies a rave or a pan.

const MIN_CUES: usize = 2;
const NEUTRAL: f64 = 60.0;
const SPREAD: f64 = 30.0;

const POSITIVE_CUES: &[&str] = &[
    "triumph", "triumphant", "dazzling", "brilliant", "glorious", "thrilling", "exhilarating",
    "masterful", "masterpiece", "superb", "stunning", "exquisite", "ravishing", "sublime",
    "electrifying", "irresistible", "delightful", "joyous", "wonderful", "magnificent",
    "transcendent", "riveting", "mustsee", "spellbinding", "radiant", "gorgeous", "hilarious",
    "moving", "captivating", "terrific",
];

const NEGATIVE_CUES: &[&str] = &[
    "dull", "tedious", "misfire", "disappointing", "disappointment", "lifeless", "clumsy",
    "muddled", "boring", "bland", "leaden", "overlong", "shrill", "tiresome", "inert", "mess",
    "messy", "turgid", "plodding", "forgettable", "sluggish", "unfocused", "lackluster",
    "labored", "misguided", "dreary", "hollow", "interminable", "grating", "dismal",
];

const NEGATIONS: &[&str] = &[
    "not", "never", "hardly", "no", "isnt", "wasnt", "dont", "doesnt", "nor", "barely", "scarcely",
    "without",
];

fn tokenize(text: &str) -> Vec<String> {
    let squashed: String = text
        .to_lowercase()
        .chars()
        .filter(|c| !matches!(c, '-' | '\'' | '’'))
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    squashed.split_whitespace().map(str::to_string).collect()
}

/// Positive and negative cue counts, negation applied.
pub fn cue_counts(text: &str) -> (usize, usize) {
    let tokens = tokenize(text);
    let mut positive = 0;
    let mut negative = 0;

    for (i, token) in tokens.iter().enumerate() {
        let is_positive = POSITIVE_CUES.contains(&token.as_str());
        let is_negative = NEGATIVE_CUES.contains(&token.as_str());
        if !is_positive && !is_negative {
            continue;
        }
        let negated = tokens[i.saturating_sub(2)..i]
            .iter()
            .any(|t| NEGATIONS.contains(&t.as_str()));
        match (is_positive, negated) {
            (true, false) | (false, true) => positive += 1,
            (true, true) | (false, false) => negative += 1,
        }
    }
    (positive, negative)
}

/// Score from cue words, or `None` when the text has too few of them.
pub fn keyword_sentiment(text: &str) -> Option<u8> {
    let (positive, negative) = cue_counts(text);
    let total = positive + negative;
    if total < MIN_CUES {
        return None;
    }
    let balance = (positive as f64 - negative as f64) / total as f64;
    Some(super::ratings::to_score(NEUTRAL + SPREAD * balance))
}
