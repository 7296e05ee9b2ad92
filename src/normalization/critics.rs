//! Critic byline normalization and fuzzy matching.

use crate::text::fold_diacritics;
use crate::utils::slugify;
use once_cell::sync::Lazy;
use regex::Regex;

static BY_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^\s*(reviewed\s+)?by\s+").unwrap());
static PARENTHETICAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\([^)]*\)|\[[^\]]*\]").unwrap());
/// Where an outlet or job title gets glued onto a byline: "Jesse Green, NYT".
static BYLINE_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s*(,|\||\s-\s|\s—\s|\s–\s|\sfor\s|\sof\s).*$").unwrap());
static SPACES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// How two bylines were judged to be the same critic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CriticMatch {
    Exact,
    /// Edit distance between the normalized names.
    Fuzzy(usize),
    /// "J. Green" against "Jesse Green".
    Initial,
    /// "Green" against "Jesse Green".
    LastNameOnly,
    None,
}

impl CriticMatch {
    pub fn is_match(self) -> bool {
        !matches!(self, CriticMatch::None)
    }
}

/// Byline with the "By" prefix and outlet suffix removed, original casing kept.
pub fn tidy_critic_display(name: &str) -> String {
    let name = BY_PREFIX.replace(name, "");
    let name = PARENTHETICAL.replace_all(&name, " ");
    let name = BYLINE_SUFFIX.replace(&name, "");
    SPACES.replace_all(name.trim(), " ").into_owned()
}

/// Comparison form of a byline: lowercase ASCII words separated by single spaces.
pub fn normalize_critic_name(name: &str) -> String {
    let tidy = tidy_critic_display(name);
    let folded = fold_diacritics(&tidy.to_lowercase());
    let cleaned: String = folded
        .chars()
        .filter(|c| *c != '\'' && *c != '’' && *c != '.')
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Decide whether two bylines name the same critic.
///
/// Checks, in order: exact match after normalization; same last name with
/// a first initial on one side; edit distance within `max_distance` for
/// names of six or more characters; a bare surname equal to the other
/// name's last word. Empty names never match.
pub fn critic_names_match(a: &str, b: &str, max_distance: usize) -> CriticMatch {
    let na = normalize_critic_name(a);
    let nb = normalize_critic_name(b);
    if na.is_empty() || nb.is_empty() {
        return CriticMatch::None;
    }
    if na == nb {
        return CriticMatch::Exact;
    }

    let ta: Vec<&str> = na.split(' ').collect();
    let tb: Vec<&str> = nb.split(' ').collect();

    if ta.len() >= 2 && tb.len() >= 2 && ta.last() == tb.last() {
        let (fa, fb) = (ta[0], tb[0]);
        let initial_of = |short: &str, long: &str| short.chars().count() == 1 && long.starts_with(short);
        if initial_of(fa, fb) || initial_of(fb, fa) {
            return CriticMatch::Initial;
        }
    }

    if na.chars().count() >= 6 && nb.chars().count() >= 6 {
        let distance = strsim::levenshtein(&na, &nb);
        if distance <= max_distance {
            return CriticMatch::Fuzzy(distance);
        }
    }

    let surname_only = |single: &[&str], full: &[&str]| {
        single.len() == 1 && full.len() >= 2 && single[0].len() >= 3 && full.last() == single.first()
    };
    if surname_only(&ta[..], &tb[..]) || surname_only(&tb[..], &ta[..]) {
        return CriticMatch::LastNameOnly;
    }

    CriticMatch::None
}

/// File-name friendly critic slug: "Jesse Green" -> "jesse-green".
pub fn critic_slug(name: &str) -> String {
    slugify(&normalize_critic_name(name))
}

/// Stem of a review-text file: `<outlet>--<critic-slug>`.
pub fn review_file_key(outlet_id: &str, critic: Option<&str>) -> String {
    let slug = critic.map(critic_slug).filter(|s| !s.is_empty());
    format!("{}--{}", outlet_id, slug.as_deref().unwrap_or("unknown"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tidy_critic_display() {
        assert_eq!(tidy_critic_display("By Jesse Green"), "Jesse Green");
        assert_eq!(tidy_critic_display("Sara Holdren, New York Magazine"), "Sara Holdren");
        assert_eq!(tidy_critic_display("Johnny Oleksinski | NY Post"), "Johnny Oleksinski");
        assert_eq!(tidy_critic_display("Frank Rizzo for Variety"), "Frank Rizzo");
        assert_eq!(tidy_critic_display("  Adam   Feldman (Time Out) "), "Adam Feldman");
    }

    #[test]
    fn test_normalize_critic_name() {
        assert_eq!(normalize_critic_name("By Jesse Green"), "jesse green");
        assert_eq!(normalize_critic_name("Peter Marks, The Washington Post"), "peter marks");
        assert_eq!(normalize_critic_name("J. Kelly Nestruck"), "j kelly nestruck");
        assert_eq!(normalize_critic_name("Naveen Kumar-Smith"), "naveen kumar smith");
        assert_eq!(normalize_critic_name("Adrián O'Neill"), "adrian oneill");
        assert_eq!(normalize_critic_name(""), "");
    }

    #[test]
    fn test_exact_match() {
        assert_eq!(critic_names_match("Jesse Green", "by jesse green", 2), CriticMatch::Exact);
    }

    #[test]
    fn test_initial_match() {
        assert_eq!(critic_names_match("J. Green", "Jesse Green", 2), CriticMatch::Initial);
        assert_eq!(critic_names_match("Jesse Green", "J Green", 2), CriticMatch::Initial);
    }

    #[test]
    fn test_fuzzy_match() {
        assert_eq!(
            critic_names_match("Johnny Oleksinski", "Johnny Oleksinksi", 2),
            CriticMatch::Fuzzy(2)
        );
        assert_eq!(critic_names_match("Jesse Green", "Jessie Green", 2), CriticMatch::Fuzzy(1));
        assert_eq!(critic_names_match("Ben Brantley", "Ken Brantley", 2), CriticMatch::Fuzzy(1));
        assert_eq!(critic_names_match("Ben Brantley", "Ken Brantley", 0), CriticMatch::None);
    }

    #[test]
    fn test_last_name_only_match() {
        assert_eq!(critic_names_match("Brantley", "Ben Brantley", 2), CriticMatch::LastNameOnly);
        assert_eq!(critic_names_match("Ng", "Anna Ng", 2), CriticMatch::None);
    }

    #[test]
    fn test_non_matches() {
        assert_eq!(critic_names_match("Jesse Green", "Helen Shaw", 2), CriticMatch::None);
        assert_eq!(critic_names_match("", "Helen Shaw", 2), CriticMatch::None);
        assert_eq!(critic_names_match("Sara Holdren", "Sara Holden", 0), CriticMatch::None);
        assert!(!CriticMatch::None.is_match());
        assert!(CriticMatch::Fuzzy(1).is_match());
    }

    #[test]
    fn test_review_file_key() {
        assert_eq!(review_file_key("nytimes", Some("By Jesse Green")), "nytimes--jesse-green");
        assert_eq!(review_file_key("variety", None), "variety--unknown");
        assert_eq!(review_file_key("variety", Some("  ")), "variety--unknown");
    }
}
