use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// Canonical comparison key: lower-case, NFKD with marks dropped, `&` spelled
/// out, then only `[a-z0-9]` kept.
pub fn norm_key(s: &str) -> String {
    s.to_lowercase()
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .replace('&', "and")
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect()
}

static PAREN_YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(\s*\d{4}\s*\)").unwrap());
static PAREN_ANY: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*\([^)]*\)\s*").unwrap());
static LEADING_ARTICLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^(the|a|an)\s+").unwrap());
static TRAILING_ARTICLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?P<rest>.+?),\s*(?P<art>the|a|an)\s*$").unwrap());
static FRONT_ARTICLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?P<art>the|a|an)\s+(?P<rest>.+?)\s*$").unwrap());
static COLON_TAIL: Lazy<Regex> = Lazy::new(|| Regex::new(r":\s.*$").unwrap());
static SLASH_TAIL: Lazy<Regex> = Lazy::new(|| Regex::new(r"//.*$").unwrap());
static DASH_TAIL: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\u{2013}\u{2014}\-].*$").unwrap());
static SEQUEL_WORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(part|volume|book|series|episode|season|chapter)\b[\s\-:#_]*\w*").unwrap()
});
static TRAILING_ROMAN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b[ivx]{1,6}\b\s*$").unwrap());
static TRAILING_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+\d{1,4}\s*$").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Raw (not yet canonical) rewrites of one title, in a fixed order.
fn rewrites(s: &str) -> Vec<String> {
    let mut out = vec![
        s.to_string(),
        PAREN_YEAR.replace_all(s, "").into_owned(),
        PAREN_ANY.replace_all(s, " ").into_owned(),
        LEADING_ARTICLE.replace(s, "").into_owned(),
        s.replace(',', " "),
        COLON_TAIL.replace(s, "").into_owned(),
        SLASH_TAIL.replace(s, "").into_owned(),
        DASH_TAIL.replace(s, "").into_owned(),
        SEQUEL_WORD.replace_all(s, "").into_owned(),
        TRAILING_ROMAN.replace(s, "").into_owned(),
        TRAILING_NUMBER.replace(s, "").into_owned(),
    ];
    // "Office, The" -> "The Office"
    if let Some(caps) = TRAILING_ARTICLE.captures(s) {
        out.push(format!("{} {}", &caps["art"], &caps["rest"]));
    }
    // "The Office" -> "Office, The"
    if let Some(caps) = FRONT_ARTICLE.captures(s) {
        out.push(format!("{}, {}", &caps["rest"], &caps["art"]));
    }
    out
}

/// Plausible canonical keys for a title, de-duplicated in insertion order.
///
/// Rewrites run twice: once on the title and once on every first-round
/// result, so stacked decorations ("The Crown (2016)") still reduce to the
/// bare name. First-round keys always come first.
pub fn key_variants(name: &str) -> Vec<String> {
    let s = name.trim();
    if s.is_empty() {
        return Vec::new();
    }

    let mut seen = HashSet::new();
    let mut out = Vec::new();
    let mut add = |raw: &str| {
        for candidate in [raw.to_string(), WHITESPACE.replace_all(raw, " ").trim().to_string()] {
            if candidate.trim().is_empty() {
                continue;
            }
            let key = norm_key(&candidate);
            if !key.is_empty() && seen.insert(key.clone()) {
                out.push(key);
            }
        }
    };

    let first: Vec<String> = rewrites(s);
    for r in &first {
        add(r);
    }
    for r in &first {
        let r = r.trim();
        if r.is_empty() {
            continue;
        }
        for rr in rewrites(r) {
            add(&rr);
        }
    }
    out
}
