// ABOUTME: Per-field coercion of raw schema.org values into canonical recipe fields.
// ABOUTME: Handles image, author, time, yield and ingredient lines across the shapes seen in the wild.

//! Field normalizers.
//!
//! Every shape question ("is it a list?", "is it wrapped in `{url: ...}`?") is
//! answered here, so the recipe normalizer only ever deals with plain strings.
//! All functions are total: unexpected shapes yield `None` instead of an error.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::duration_parse::format_iso8601_duration;
use crate::models::Ingredient;
use crate::sanitize::FRACTIONS;

/// Units recognized directly after an ingredient quantity, tried in order.
const UNITS: &[&str] = &[
    r"ounce(?:s)?",
    r"oz",
    r"pound(?:s)?",
    r"lb(?:s)?",
    r"(?:kilo)?gram(?:s)?",
    r"g\b",
    r"kg",
    r"teaspoon(?:s)?",
    r"tablespoon(?:s)?",
    r"cup(?:s)?",
    r"tsp",
    r"tbsp",
    r"c\.",
    r"small",
    r"medium",
    r"large",
    r"stick(?:s)?",
    r"clove(?:s)?",
    r"bunch(?:es)?",
    r"can(?:s)?",
    r"stalk(?:s)?",
    r"head(?:s)?",
    r"part(?:s)?",
];

// Leading quantity (optional whole number, then digits/fraction glyphs), optional unit, rest.
static INGREDIENT_RE: Lazy<Regex> = Lazy::new(|| {
    let glyphs: String = FRACTIONS.iter().map(|(_, glyph)| *glyph).collect();
    let pattern = format!(
        r"(?i)^((?:\d+\s?)?[\d{glyphs}⁄\-]+)\s*({units})?\.?\s*(.*)$",
        units = UNITS.join("|"),
    );
    Regex::new(&pattern).unwrap()
});

static YIELD_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(serves|yield(s)?):?\s?").unwrap());

/// Returns the first element of a list, or the value itself when it is not a list.
pub fn expect_single(value: &Value) -> Option<&Value> {
    match value {
        Value::Array(items) => items.first(),
        other => Some(other),
    }
}

/// Mirrors JavaScript truthiness for the "a || b" fallbacks between raw keys.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Reads a scalar as text: strings as-is, numbers formatted, first element of lists.
pub fn text_value(value: &Value) -> Option<String> {
    match expect_single(value)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Picks a single image URL out of a string, list, `{url}` object or `{"@list": [...]}`.
pub fn image(value: Option<&Value>) -> Option<String> {
    let mut value = value?;
    if let Some(list) = value.get("@list") {
        value = list;
    }

    match expect_single(value)? {
        Value::String(url) if !url.is_empty() => Some(url.clone()),
        Value::Object(obj) => obj
            .get("url")
            .and_then(Value::as_str)
            .filter(|url| !url.is_empty())
            .map(str::to_string),
        _ => None,
    }
}

/// Picks a single author name out of a string, list, `{name}` or Organization object.
pub fn author(value: Option<&Value>) -> Option<String> {
    let name = match expect_single(value?)? {
        Value::String(s) => s.clone(),
        Value::Object(obj) => {
            let name = obj
                .get("name")
                .and_then(text_value)
                .filter(|n| !n.trim().is_empty());
            let is_organization = obj.get("@type").and_then(Value::as_str) == Some("Organization");
            match name {
                Some(name) => name,
                None if is_organization => obj.get("@id").and_then(Value::as_str)?.to_string(),
                None => return None,
            }
        }
        _ => return None,
    };

    // Some sites publish author profile paths instead of names.
    let name = name.replacen("/contributors/", "", 1);
    if name.trim().is_empty() {
        None
    } else {
        Some(name)
    }
}

/// Formats an ISO-8601 duration value for display.
pub fn time(value: Option<&Value>) -> Option<String> {
    match expect_single(value?)? {
        Value::String(s) => format_iso8601_duration(s),
        _ => None,
    }
}

/// Lowercases a yield and removes a leading `serves`/`yield(s):` label.
///
/// `None` when nothing is left after the label.
pub fn recipe_yield(value: Option<&Value>) -> Option<String> {
    let raw = text_value(value?)?;
    let stripped = YIELD_PREFIX_RE.replace(raw.trim(), "").trim().to_lowercase();
    // A bare label such as "Serves" says nothing.
    (!stripped.is_empty()).then_some(stripped)
}

/// Splits an ingredient line into quantity, unit and name.
///
/// A line that does not start with a quantity is kept whole as the name.
pub fn ingredient(line: &str) -> Ingredient {
    let Some(caps) = INGREDIENT_RE.captures(line) else {
        return Ingredient::bare(line);
    };

    Ingredient {
        quantity: caps.get(1).map(|m| m.as_str().to_string()),
        unit: caps.get(2).map(|m| m.as_str().to_string()),
        ingredient: caps.get(3).map_or_else(String::new, |m| m.as_str().to_string()),
    }
}
