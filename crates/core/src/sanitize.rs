// ABOUTME: Free-text cleanup for every user-visible recipe string.
// ABOUTME: Entity decoding, tag stripping, unicode fractions, temperature notation and junk removal.

//! String sanitizer.
//!
//! [`sanitize_string`] is a fixed pipeline of small pure stages. The order matters:
//!
//! 1. `&amp;` is collapsed to `&` (pages that escaped their entities twice).
//! 2. Entities are decoded when any entity-shaped token is present.
//! 3. Remaining tags are stripped.
//! 4. ASCII fractions become unicode glyphs.
//! 5. Temperatures such as `350 degrees F` become `350° F`.
//! 6. Known promotional junk is removed.
//! 7. The result is trimmed.

use aho_corasick::AhoCorasick;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::html_utils::{decode_entities, has_entities, strip_tags};

/// ASCII fractions with a dedicated unicode glyph.
pub const FRACTIONS: &[(&str, &str)] = &[
    ("1/2", "½"),
    ("1/3", "⅓"),
    ("2/3", "⅔"),
    ("1/4", "¼"),
    ("3/4", "¾"),
    ("1/8", "⅛"),
    ("1/10", "⅒"),
];

/// Unicode FRACTION SLASH, used for fractions without a dedicated glyph.
pub const FRACTION_SLASH: char = '\u{2044}';

/// Substrings some recipe plugins inject into ingredient and instruction text.
const JUNK_PATTERNS: &[&str] = &["Save $"];

static FRACTION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)/(\d+)").unwrap());

// The scale is optional; a bare "350 degrees" reads as Fahrenheit.
static TEMPERATURE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d+)\s?degrees?\b(?:\s+(?:(f)(?:ahrenheit)?|(c)(?:elsius)?)\b)?").unwrap()
});

static JUNK: Lazy<AhoCorasick> = Lazy::new(|| AhoCorasick::new(JUNK_PATTERNS).unwrap());

/// Runs the full sanitizer pipeline over a single string.
pub fn sanitize_string(input: &str) -> String {
    let s = undouble_ampersands(input);
    let s = decode_if_encoded(&s);
    let s = strip_tags(&s);
    let s = replace_fractions(&s);
    let s = normalize_temperatures(&s);
    let s = remove_junk(&s);
    s.trim().to_string()
}

/// Sanitizes each string of a list and drops the ones that end up empty.
pub fn sanitize_list<S: AsRef<str>>(input: &[S]) -> Vec<String> {
    input
        .iter()
        .map(|s| sanitize_string(s.as_ref()))
        .filter(|s| !s.is_empty())
        .collect()
}

/// Turns every literal `&amp;` into `&`.
pub fn undouble_ampersands(s: &str) -> String {
    s.replace("&amp;", "&")
}

/// Decodes entities, but only when the string actually contains some.
pub fn decode_if_encoded(s: &str) -> String {
    if has_entities(s) {
        decode_entities(s)
    } else {
        s.to_string()
    }
}

/// Replaces `n/d` with its unicode glyph, or with `n⁄d` using the fraction slash.
pub fn replace_fractions(s: &str) -> String {
    FRACTION_RE
        .replace_all(s, |caps: &Captures| {
            FRACTIONS
                .iter()
                .find(|(ascii, _)| *ascii == &caps[0])
                .map(|(_, glyph)| (*glyph).to_string())
                .unwrap_or_else(|| format!("{}{}{}", &caps[1], FRACTION_SLASH, &caps[2]))
        })
        .into_owned()
}

/// Rewrites `350 degrees F` (and `degree`, `Fahrenheit`, `Celsius` variants) as `350° F`.
pub fn normalize_temperatures(s: &str) -> String {
    TEMPERATURE_RE
        .replace_all(s, |caps: &Captures| {
            let scale = if caps.get(3).is_some() { "C" } else { "F" };
            format!("{}° {}", &caps[1], scale)
        })
        .into_owned()
}

/// Removes every occurrence of the known promotional substrings.
pub fn remove_junk(s: &str) -> String {
    let empty = [""; JUNK_PATTERNS.len()];
    JUNK.replace_all(s, &empty)
}
