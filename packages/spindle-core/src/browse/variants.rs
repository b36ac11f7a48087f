//! Fuzzy name variants for artists and albums.
//!
//! Library titles rarely match user input byte for byte: leading articles,
//! ampersands, remaster suffixes, curly apostrophes and accents all differ.
//! The generators below produce an ordered, deduplicated list of candidate
//! spellings, always starting with the input itself, that the orchestrator
//! tries one after another.

use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Leading articles that make a "The " prefix redundant.
const ARTICLES: [&str; 12] = [
    "the", "a", "an", "el", "la", "las", "le", "les", "los", "die", "der", "das",
];

/// Trailing "(...)" or "[...]" group.
static TRAILING_GROUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*?)\s*[(\[][^()\[\]]*[)\]]\s*$").expect("valid regex"));

/// "(2019 Remaster)", "[1997 Deluxe Edition]", "(2007 Stereo Mix)" and similar.
static YEAR_EDITION_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\s*[(\[]\s*\d{4}\s+[^()\[\]]*(remaster|edition|mix|version|reissue)[^()\[\]]*[)\]]\s*$",
    )
    .expect("valid regex")
});

/// " - 2011 Remaster", " - Remastered 2009" style suffixes.
static DASH_REMASTER_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s+-\s+(\d{4}\s+)?remaster(ed)?(\s+\d{4})?(\s+version)?\s*$")
        .expect("valid regex")
});

/// Ordered set that ignores blanks and repeats.
#[derive(Default)]
struct VariantList(Vec<String>);

impl VariantList {
    fn push(&mut self, candidate: impl Into<String>) {
        let candidate = candidate.into();
        if candidate.trim().is_empty() || self.0.contains(&candidate) {
            return;
        }
        self.0.push(candidate);
    }

    fn into_vec(self) -> Vec<String> {
        self.0
    }
}

/// Removes diacritics, straightens apostrophes and lower-cases.
pub fn fold(value: &str) -> String {
    value
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' | '\u{02BC}' | '`' | '\u{00B4}' => '\'',
            other => other,
        })
        .collect::<String>()
        .to_lowercase()
}

fn strip_prefix_ignore_case<'a>(value: &'a str, prefix: &str) -> Option<&'a str> {
    let head = value.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| value[prefix.len()..].trim_start())
}

fn starts_with_article(name: &str) -> bool {
    name.split_whitespace()
        .next()
        .map(|first| ARTICLES.contains(&first.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Replaces every case-insensitive occurrence of the ASCII `needle`.
fn replace_ignore_case(haystack: &str, needle: &str, replacement: &str) -> String {
    let lower = haystack.to_ascii_lowercase();
    let needle = needle.to_ascii_lowercase();
    let mut out = String::with_capacity(haystack.len());
    let mut last = 0;
    for (idx, _) in lower.match_indices(&needle) {
        out.push_str(&haystack[last..idx]);
        out.push_str(replacement);
        last = idx + needle.len();
    }
    out.push_str(&haystack[last..]);
    out
}

fn has_apostrophe(value: &str) -> bool {
    value.contains(['\'', '\u{2018}', '\u{2019}'])
}

fn with_apostrophe(value: &str, replacement: &str) -> String {
    value
        .chars()
        .fold(String::with_capacity(value.len()), |mut out, c| {
            match c {
                '\'' | '\u{2018}' | '\u{2019}' => out.push_str(replacement),
                other => out.push(other),
            }
            out
        })
}

/// Candidate spellings for an artist name, most literal first.
///
/// Covers: folded form, "The " toggling, "and"/"&" substitution, and
/// "Surname, First" reordering.
pub fn artist_variants(name: &str) -> Vec<String> {
    let mut variants = VariantList::default();
    let trimmed = name.trim();

    // The input itself always comes first, even if blank.
    variants.0.push(name.to_string());
    variants.push(trimmed);
    variants.push(fold(trimmed));

    if let Some(rest) = strip_prefix_ignore_case(trimmed, "The ") {
        variants.push(rest);
    } else if !starts_with_article(trimmed) {
        let words: Vec<&str> = trimmed.split_whitespace().collect();
        // Short multi-word stage names ("DJ Oz") read badly with an article.
        if words.len() == 1 || words.iter().any(|w| w.chars().count() > 2) {
            variants.push(format!("The {}", trimmed));
        }
    }

    if trimmed.contains(" & ") {
        variants.push(trimmed.replace(" & ", " and "));
    }
    if trimmed.to_ascii_lowercase().contains(" and ") {
        variants.push(replace_ignore_case(trimmed, " and ", " & "));
    }

    if let Some((surname, first)) = trimmed.split_once(',') {
        let (surname, first) = (surname.trim(), first.trim());
        if !surname.is_empty() && !first.is_empty() {
            variants.push(format!("{} {}", first, surname));
            variants.push(surname);
            variants.push(first);
        }
    }

    variants.into_vec()
}

/// Candidate spellings for an album title, most literal first.
///
/// Covers: leading "The ", trailing bracketed suffixes, bracket style,
/// remaster/edition suffixes, " - " separators, apostrophe styles, and the
/// folded form.
pub fn album_variants(title: &str) -> Vec<String> {
    let mut variants = VariantList::default();
    let trimmed = title.trim();

    variants.0.push(title.to_string());
    variants.push(trimmed);

    if let Some(rest) = strip_prefix_ignore_case(trimmed, "The ") {
        variants.push(rest);
    }

    if let Some(caps) = TRAILING_GROUP.captures(trimmed) {
        let remainder = caps[1].trim();
        if remainder.chars().count() > 3 {
            variants.push(remainder);
        }
    }

    if trimmed.contains('[') {
        variants.push(trimmed.replace('[', "(").replace(']', ")"));
    } else if trimmed.contains('(') {
        variants.push(trimmed.replace('(', "[").replace(')', "]"));
    }

    let without_edition = YEAR_EDITION_SUFFIX.replace(trimmed, "");
    variants.push(without_edition.trim());
    let without_dash_remaster = DASH_REMASTER_SUFFIX.replace(trimmed, "");
    variants.push(without_dash_remaster.trim());

    if trimmed.contains(" - ") {
        variants.push(trimmed.replace(" - ", " "));
    }

    if has_apostrophe(trimmed) {
        variants.push(with_apostrophe(trimmed, "\u{2019}"));
        variants.push(with_apostrophe(trimmed, "'"));
        variants.push(with_apostrophe(trimmed, ""));
    }

    variants.push(fold(trimmed));

    variants.into_vec()
}
