// ABOUTME: ISO-8601 duration parsing for recipe cook/prep/total times.
// ABOUTME: Turns strings like "PT1H30M" into display text such as "1 hr 30 min".

use once_cell::sync::Lazy;
use regex::Regex;

// PnW | PnYnMnD[TnHnMnS], each number optionally with up to three decimals.
static ISO8601_DURATION_RE: Lazy<Regex> = Lazy::new(|| {
    let num = r"\d+(?:[\.,]\d{0,3})?";
    let week = format!("(?:{num}W)");
    let date = format!("(?:{num}Y)?(?:{num}M)?(?:{num}D)?");
    let time = format!("T(?:({num})H)?(?:({num})M)?(?:{num}S)?");
    Regex::new(&format!("^P(?:{week}|{date}(?:{time})?)$")).unwrap()
});

/// Formats an ISO-8601 duration as `"{H} hr {M} min"`.
///
/// Only the hour and minute components are used. Zero or missing components are
/// left out, and `None` is returned when nothing remains or when the input does
/// not follow the duration grammar.
pub fn format_iso8601_duration(s: &str) -> Option<String> {
    let caps = ISO8601_DURATION_RE.captures(s.trim())?;

    let mut parts = Vec::with_capacity(2);
    if let Some(hours) = caps.get(1).map(|m| m.as_str()).filter(|h| !is_zero(h)) {
        parts.push(format!("{hours} hr"));
    }
    if let Some(minutes) = caps.get(2).map(|m| m.as_str()).filter(|m| !is_zero(m)) {
        parts.push(format!("{minutes} min"));
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" "))
    }
}

fn is_zero(component: &str) -> bool {
    component
        .replace(',', ".")
        .parse::<f64>()
        .map(|v| v == 0.0)
        .unwrap_or(false)
}
