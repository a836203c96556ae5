// ABOUTME: HTML utility functions for recipe text cleanup.
// ABOUTME: Provides HTML5 entity decoding and a tag stripper that never evaluates markup.

use once_cell::sync::Lazy;
use quick_xml::escape::resolve_html5_entity;
use regex::{Captures, Regex};

/// Matches anything that looks like an HTML entity (`&amp;`, `&#39;`, `&#x2F;`).
static ENTITY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"&[#\w]+;").unwrap());

/// Captures the body of a named, decimal, or hex entity.
static ENTITY_BODY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&(#[xX][0-9a-fA-F]+|#[0-9]+|[A-Za-z][A-Za-z0-9]*);").unwrap());

// Raw-text elements whose content is never user-visible text.
static SCRIPT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<script\b[^>]*>.*?(?:</script\s*>|$)").unwrap());
static STYLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<style\b[^>]*>.*?(?:</style\s*>|$)").unwrap());
static COMMENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<!--.*?(?:-->|$)").unwrap());

// Line breaks and block closers become newlines so that instruction text keeps its steps.
static BREAK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)<br\b[^>]*>|</(?:p|div|li|h[1-6]|tr|section|article|blockquote)\s*>").unwrap()
});

// A tag starts with a letter (or `/`, `!`, `?` before one). Quoted attribute values may
// contain `>`. An unterminated tag or quote swallows the rest of the input.
static TAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<[/!?]?[A-Za-z](?:[^>"']|"[^"]*(?:"|$)|'[^']*(?:'|$))*(?:>|$)"#).unwrap()
});

/// Returns true when the string contains at least one entity-shaped token.
pub fn has_entities(s: &str) -> bool {
    ENTITY_RE.is_match(s)
}

/// Decodes named and numeric HTML entities in a single pass.
///
/// Named entities cover the full HTML5 set. Unknown names and invalid code
/// points are left untouched. The output is never re-scanned, so `&amp;lt;`
/// decodes to `&lt;` rather than `<`.
pub fn decode_entities(s: &str) -> String {
    ENTITY_BODY_RE
        .replace_all(s, |caps: &Captures| {
            let body = &caps[1];
            decode_entity(body).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn decode_entity(body: &str) -> Option<String> {
    if let Some(num) = body.strip_prefix('#') {
        let code = match num.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse::<u32>().ok()?,
        };
        return char::from_u32(code).map(String::from);
    }

    resolve_html5_entity(body).map(str::to_string)
}

/// Removes HTML tags from a string, keeping the text between them.
///
/// Script and style bodies and comments are dropped entirely, `<br>` and block
/// closers become newlines. Nothing is parsed or evaluated, so attributes such as
/// `onerror` are discarded along with the tag that carried them.
pub fn strip_tags(s: &str) -> String {
    if !s.contains('<') {
        return s.to_string();
    }

    let s = SCRIPT_RE.replace_all(s, "");
    let s = STYLE_RE.replace_all(&s, "");
    let s = COMMENT_RE.replace_all(&s, "");
    let s = BREAK_RE.replace_all(&s, "\n");
    TAG_RE.replace_all(&s, "").into_owned()
}

/// Collapses runs of whitespace into single spaces and trims the result.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_entities_named() {
        assert_eq!(decode_entities("&amp;"), "&");
        assert_eq!(decode_entities("&lt;&gt;"), "<>");
        assert_eq!(decode_entities("&quot;test&quot;"), "\"test\"");
        assert_eq!(decode_entities("&nbsp;"), "\u{a0}");
        assert_eq!(decode_entities("&mdash;"), "—");
        assert_eq!(decode_entities("350&deg;F"), "350°F");
    }

    #[test]
    fn test_decode_entities_full_html5_set() {
        assert_eq!(
            decode_entities("Cr&egrave;me br&ucirc;l&eacute;e &Eacute;clair"),
            "Crème brûlée Éclair"
        );
        assert_eq!(decode_entities("&frac38; &frac58; &frac78;"), "⅜ ⅝ ⅞");
        assert_eq!(decode_entities("&laquo;Oui&raquo; 2&sup2;"), "«Oui» 2²");
        assert_eq!(decode_entities("a&thinsp;b"), "a\u{2009}b");
        assert_eq!(decode_entities("&Ouml;&AElig;&oslash;"), "ÖÆø");
    }

    #[test]
    fn test_decode_entities_numeric() {
        assert_eq!(decode_entities("&#38;"), "&");
        assert_eq!(decode_entities("&#x26;"), "&");
        assert_eq!(decode_entities("&#169;"), "©");
        assert_eq!(decode_entities("&#xA9;"), "©");
        assert_eq!(decode_entities("it&#39;s"), "it's");
    }

    #[test]
    fn test_decode_entities_single_pass() {
        assert_eq!(decode_entities("&amp;lt;"), "&lt;");
    }

    #[test]
    fn test_decode_entities_unknown_left_alone() {
        assert_eq!(decode_entities("&bogus;"), "&bogus;");
        assert_eq!(decode_entities("&#xFFFFFFF;"), "&#xFFFFFFF;");
        assert_eq!(decode_entities("salt & pepper"), "salt & pepper");
    }

    #[test]
    fn test_has_entities() {
        assert!(has_entities("a &amp; b"));
        assert!(has_entities("&#8211;"));
        assert!(!has_entities("a & b"));
    }

    #[test]
    fn test_strip_tags_basic() {
        assert_eq!(strip_tags("<b>Bold</b> and <i>italic</i>"), "Bold and italic");
        assert_eq!(strip_tags("no tags here"), "no tags here");
    }

    #[test]
    fn test_strip_tags_drops_handlers() {
        assert_eq!(strip_tags(r#"<img src="x" onerror="alert(1)">"#), "");
        assert_eq!(strip_tags(r##"<a title="a>b" href="#">link</a>"##), "link");
    }

    #[test]
    fn test_strip_tags_drops_script_bodies() {
        assert_eq!(strip_tags("before<script>alert(1)</script>after"), "beforeafter");
        assert_eq!(strip_tags("x<style>p{}</style>y<!-- hidden -->z"), "xyz");
    }

    #[test]
    fn test_strip_tags_unterminated() {
        assert_eq!(strip_tags("text <img src=\"x"), "text ");
        assert_eq!(strip_tags("text <div class='a"), "text ");
        assert_eq!(strip_tags("bake <b"), "bake ");
    }

    #[test]
    fn test_strip_tags_keeps_comparisons() {
        assert_eq!(strip_tags("cook < 5 minutes"), "cook < 5 minutes");
    }

    #[test]
    fn test_strip_tags_breaks() {
        assert_eq!(strip_tags("one<br>two<br/>three"), "one\ntwo\nthree");
        assert_eq!(strip_tags("<p>one</p><p>two</p>"), "one\ntwo\n");
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a \n\t b  "), "a b");
        assert_eq!(collapse_whitespace(""), "");
    }
}
