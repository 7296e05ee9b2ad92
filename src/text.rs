//! Review text cleaning.
//!
//! Text arrives from several places (aggregator excerpts, pasted articles,
//! HTML captured by older tooling) and carries markup, entities, typographic
//! punctuation and site chrome. [`clean_text`] turns any of it into plain
//! paragraphs; the other helpers are the normalisations the quality and
//! dedupe passes build on.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;

static SCRIPT_STYLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<(script|style|noscript)[^>]*>.*?</(script|style|noscript)>").unwrap());
static BLOCK_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<br\s*/?>|</(p|div|h[1-6]|li|blockquote|section|article)>").unwrap());
static NUMERIC_ENTITY: Lazy<Regex> = Lazy::new(|| Regex::new(r"&#(x?)([0-9a-fA-F]{1,6});").unwrap());
static INLINE_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t\u{00A0}\u{2009}\u{202F}]+").unwrap());
static EXTRA_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());
static BOILERPLATE_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(skip )?advertisement$|^subscribe\b|^sign up\b|newsletter|^read more\b|^share (this|on)\b|^(follow us|tweet|email|print|share)$|^copyright\b|^©|all rights reserved|^photo( credit)?s?:|^photograph:|^image:|^related:|^getty images$|^\(?credit:",
    )
    .unwrap()
});
static TRAILING_LINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)(^|[.!?"')\]]\s*|\n\s*)\[?(continue reading|read the full review|read the rest|click here to read|read more)\b[^\n]*$"#,
    )
    .unwrap()
});
static TRAILING_ELLIPSIS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*(\[\s*(…|\.\.\.)\s*\]|…|\.\.\.)\s*$").unwrap());

/// Named entities that survive when the input was not HTML to begin with.
const NAMED_ENTITIES: [(&str, &str); 14] = [
    ("&amp;", "&"),
    ("&quot;", "\""),
    ("&apos;", "'"),
    ("&#39;", "'"),
    ("&nbsp;", " "),
    ("&lsquo;", "'"),
    ("&rsquo;", "'"),
    ("&ldquo;", "\""),
    ("&rdquo;", "\""),
    ("&mdash;", "—"),
    ("&ndash;", "–"),
    ("&hellip;", "…"),
    ("&lt;", "<"),
    ("&gt;", ">"),
];

/// Strip markup and site chrome, normalise punctuation and whitespace.
///
/// Paragraph breaks survive as a single blank line.
pub fn clean_text(raw: &str) -> String {
    let text = if looks_like_html(raw) {
        html_to_text(raw)
    } else {
        decode_entities(raw)
    };
    let text = normalize_punctuation(&text);

    let mut lines: Vec<String> = Vec::new();
    for line in text.lines() {
        let line = INLINE_SPACE.replace_all(line, " ").trim().to_string();
        if is_boilerplate(&line) {
            continue;
        }
        lines.push(line);
    }

    let joined = lines.join("\n");
    EXTRA_BLANK_LINES
        .replace_all(&joined, "\n\n")
        .trim()
        .to_string()
}

fn looks_like_html(raw: &str) -> bool {
    raw.contains('<') && raw.contains('>') && raw.contains("</")
        || raw.to_lowercase().contains("<br")
}

fn html_to_text(raw: &str) -> String {
    let without_scripts = SCRIPT_STYLE.replace_all(raw, " ");
    let with_breaks = BLOCK_BREAK.replace_all(&without_scripts, "$0\n\n");
    let fragment = Html::parse_fragment(&with_breaks);
    fragment.root_element().text().collect::<String>()
}

fn decode_entities(raw: &str) -> String {
    let mut out = raw.to_string();
    for (entity, replacement) in NAMED_ENTITIES {
        if out.contains(entity) {
            out = out.replace(entity, replacement);
        }
    }
    NUMERIC_ENTITY
        .replace_all(&out, |caps: &regex::Captures| {
            let radix = if caps[1].is_empty() { 10 } else { 16 };
            u32::from_str_radix(&caps[2], radix)
                .ok()
                .and_then(char::from_u32)
                .map(String::from)
                .unwrap_or_default()
        })
        .into_owned()
}

fn normalize_punctuation(text: &str) -> String {
    text.chars()
        .filter_map(|c| match c {
            '\u{2018}' | '\u{2019}' | '\u{02BC}' => Some('\''),
            '\u{201C}' | '\u{201D}' | '\u{00AB}' | '\u{00BB}' => Some('"'),
            '\u{2010}'..='\u{2015}' => Some('-'),
            '\u{00A0}' => Some(' '),
            '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{FEFF}' => None,
            '\r' => None,
            other => Some(other),
        })
        .collect()
}

/// Site chrome lines: ads, share buttons, credits, newsletter pitches.
pub fn is_boilerplate(line: &str) -> bool {
    if line.is_empty() {
        return false;
    }
    // A real paragraph that happens to mention a newsletter is kept.
    line.split_whitespace().count() <= 20 && BOILERPLATE_LINE.is_match(line)
}

/// Remove a trailing "Continue reading" link or ellipsis truncation marker.
///
/// Returns the text and whether anything was removed.
pub fn strip_trailing_junk(text: &str) -> (String, bool) {
    let trimmed = text.trim_end();
    let without_link = TRAILING_LINK.replace(trimmed, "${1}");
    let stripped = TRAILING_ELLIPSIS.replace(&without_link, "");
    let stripped = stripped.trim_end();
    let changed = stripped.len() != trimmed.len();
    (stripped.to_string(), changed)
}

/// Number of whitespace-separated tokens that contain a letter or digit.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace()
        .filter(|w| w.chars().any(char::is_alphanumeric))
        .count()
}

/// Lowercase alphanumerics with single spaces, for hashing and containment checks.
pub fn normalize_for_fingerprint(text: &str) -> String {
    fold_diacritics(&text.to_lowercase())
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Replace accented Latin letters with their unaccented base letter.
pub fn fold_diacritics(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' => out.push('a'),
            'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' | 'Ā' => out.push('A'),
            'ç' | 'ć' | 'č' => out.push('c'),
            'Ç' | 'Ć' | 'Č' => out.push('C'),
            'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ę' | 'ě' => out.push('e'),
            'È' | 'É' | 'Ê' | 'Ë' | 'Ē' | 'Ę' | 'Ě' => out.push('E'),
            'ì' | 'í' | 'î' | 'ï' | 'ī' => out.push('i'),
            'Ì' | 'Í' | 'Î' | 'Ï' | 'Ī' => out.push('I'),
            'ñ' | 'ń' | 'ň' => out.push('n'),
            'Ñ' | 'Ń' | 'Ň' => out.push('N'),
            'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' => out.push('o'),
            'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' | 'Ø' | 'Ō' => out.push('O'),
            'ù' | 'ú' | 'û' | 'ü' | 'ū' | 'ů' => out.push('u'),
            'Ù' | 'Ú' | 'Û' | 'Ü' | 'Ū' | 'Ů' => out.push('U'),
            'ý' | 'ÿ' => out.push('y'),
            'Ý' | 'Ÿ' => out.push('Y'),
            'š' | 'ś' => out.push('s'),
            'Š' | 'Ś' => out.push('S'),
            'ž' | 'ź' | 'ż' => out.push('z'),
            'Ž' | 'Ź' | 'Ż' => out.push('Z'),
            'ł' => out.push('l'),
            'Ł' => out.push('L'),
            'ß' => out.push_str("ss"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text_strips_html_and_keeps_paragraphs() {
        let raw = "<p>First paragraph &amp; more.</p><script>var x = 1;</script><p>Second one.</p>";
        let cleaned = clean_text(raw);
        assert_eq!(cleaned, "First paragraph & more.\n\nSecond one.");
    }

    #[test]
    fn test_clean_text_drops_boilerplate_lines() {
        let raw = "The revival is a triumph.\nAdvertisement\nSkip Advertisement\nSign up for our Theater newsletter\nIts second act sags.";
        let cleaned = clean_text(raw);
        assert_eq!(cleaned, "The revival is a triumph.\nIts second act sags.");
    }

    #[test]
    fn test_clean_text_keeps_long_paragraph_mentioning_newsletter() {
        let raw = "In a newsletter sent to subscribers last spring the producers promised a leaner and sharper production than the one that limped through previews downtown.";
        assert_eq!(clean_text(raw), raw);
    }

    #[test]
    fn test_clean_text_decodes_plain_text_entities_and_quotes() {
        let raw = "It\u{2019}s &ldquo;great&rdquo; &#8212; really&nbsp;great";
        assert_eq!(clean_text(raw), "It's \"great\" - really great");
    }

    #[test]
    fn test_clean_text_folds_dashes() {
        let raw = "Act one\u{2014}lavish, loud\u{2013}and long &ndash; drags";
        assert_eq!(clean_text(raw), "Act one-lavish, loud-and long - drags");
        assert_eq!(clean_text("<p>A &mdash; B</p>"), "A - B");
    }

    #[test]
    fn test_clean_text_collapses_whitespace() {
        let raw = "  Too    many\t spaces \n\n\n\n\nNext  ";
        assert_eq!(clean_text(raw), "Too many spaces\n\nNext");
    }

    #[test]
    fn test_strip_trailing_junk() {
        let (text, changed) = strip_trailing_junk("A gorgeous staging. Continue reading the main story");
        assert_eq!(text, "A gorgeous staging.");
        assert!(changed);

        let (text, changed) = strip_trailing_junk("The cast sings beautifully and the…");
        assert_eq!(text, "The cast sings beautifully and the");
        assert!(changed);

        let (text, changed) = strip_trailing_junk("Nothing to strip here.");
        assert_eq!(text, "Nothing to strip here.");
        assert!(!changed);
    }

    #[test]
    fn test_word_count_ignores_punctuation_tokens() {
        assert_eq!(word_count("A — bold, brash show !"), 4);
        assert_eq!(word_count(""), 0);
    }

    #[test]
    fn test_normalize_for_fingerprint() {
        assert_eq!(
            normalize_for_fingerprint("Café  Society: A REVIEW!"),
            "cafe society a review"
        );
    }

    #[test]
    fn test_fold_diacritics() {
        assert_eq!(fold_diacritics("Adrián Pérez Łukasz"), "Adrian Perez Lukasz");
    }
}
