// ABOUTME: Normalization of recipeInstructions into an ordered step list or a text block.
// ABOUTME: Handles prose, numbered prose, string lists, and HowToSection/HowToStep structures.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use tracing::warn;

use crate::fields::is_truthy;
use crate::models::Instructions;
use crate::sanitize::sanitize_string;

static PREPARATION_LABEL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^preparation:?\s*").unwrap());
static NUMBERED_STEP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+\.").unwrap());
static NEWLINE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\r?\n").unwrap());
static ORDINAL_PREFIX_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)\.?\s*").unwrap());

/// Normalizes a raw `recipeInstructions` value.
///
/// Strings become either a step list (when they are a list in disguise) or a
/// single text block; lists and instruction objects always become step lists.
/// A missing value yields an empty step list.
pub fn normalize_instructions(value: Option<&Value>) -> Instructions {
    let Some(value) = value.filter(|v| is_truthy(v)) else {
        return Instructions::default();
    };

    match value {
        Value::String(text) => from_text(text),
        Value::Number(n) => from_text(&n.to_string()),
        Value::Array(items) => Instructions::List(from_list(items)),
        Value::Object(_) => Instructions::List(from_list(std::slice::from_ref(value))),
        Value::Bool(_) | Value::Null => Instructions::default(),
    }
}

fn from_text(raw: &str) -> Instructions {
    let cleaned = sanitize_string(raw);
    let cleaned = PREPARATION_LABEL_RE.replace(&cleaned, "");
    let text = break_run_on_sentences(&cleaned);

    if text.starts_with("1.") {
        Instructions::List(clean_steps(NUMBERED_STEP_RE.split(&text)))
    } else if text.contains('\n') {
        Instructions::List(clean_steps(NEWLINE_RE.split(&text)))
    } else {
        Instructions::Text(text)
    }
}

fn from_list(items: &[Value]) -> Vec<String> {
    let steps = items.iter().enumerate().map(|(idx, item)| match item {
        Value::String(s) => strip_ordinal(s, idx + 1),
        Value::Number(n) => n.to_string(),
        Value::Object(obj) if is_section(obj) => section_text(obj),
        Value::Object(obj) if is_step(obj) => step_text(obj),
        other => {
            warn!(index = idx, shape = %shape_of(other), "unrecognized instruction entry dropped");
            String::new()
        }
    });
    clean_steps(steps)
}

fn clean_steps<I, S>(steps: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    steps
        .into_iter()
        .map(|s| s.as_ref().trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Inserts a newline after `.`, `!` or `?` when a word character follows with no
/// space, which is what sentence boundaries look like once a site has stripped
/// its markup. Digits count as word characters, so `1.5` splits too.
fn break_run_on_sentences(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        out.push(c);
        if matches!(c, '.' | '!' | '?') && chars.peek().is_some_and(|&next| is_word_char(next)) {
            out.push('\n');
        }
    }

    out
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Drops a leading `N.` marker when N is the step's own 1-based position.
/// A different number is probably part of the instruction and is kept.
fn strip_ordinal(step: &str, position: usize) -> String {
    if let Some(caps) = ORDINAL_PREFIX_RE.captures(step) {
        if caps[1].parse::<usize>().ok() == Some(position) {
            return step[caps[0].len()..].to_string();
        }
    }
    step.to_string()
}

fn is_section(obj: &Map<String, Value>) -> bool {
    type_is(obj, "HowToSection") || obj.contains_key("itemListElement")
}

fn is_step(obj: &Map<String, Value>) -> bool {
    type_is(obj, "HowToStep") || obj.contains_key("text")
}

fn type_is(obj: &Map<String, Value>, name: &str) -> bool {
    match obj.get("@type") {
        Some(Value::String(t)) => t == name,
        Some(Value::Array(types)) => types.iter().any(|t| t.as_str() == Some(name)),
        _ => false,
    }
}

fn step_text(obj: &Map<String, Value>) -> String {
    match obj.get("text") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(parts)) => parts
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(" "),
        _ => String::new(),
    }
}

/// Flattens a HowToSection into one entry, its steps joined by newlines.
fn section_text(section: &Map<String, Value>) -> String {
    match section.get("itemListElement") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Object(step)) => step_text(step),
        Some(Value::Array(steps)) => steps
            .iter()
            .filter_map(|step| match step {
                Value::String(s) => Some(s.trim().to_string()),
                Value::Object(obj) => Some(step_text(obj).trim().to_string()),
                _ => None,
            })
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("\n"),
        _ => {
            warn!("instruction section without itemListElement dropped");
            String::new()
        }
    }
}

fn shape_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn list(items: &[&str]) -> Instructions {
        Instructions::List(items.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_numbered_prose() {
        let value = json!("1. stir\n2. bake\n3. serve");
        assert_eq!(normalize_instructions(Some(&value)), list(&["stir", "bake", "serve"]));
    }

    #[test]
    fn test_newline_separated() {
        let value = json!("stir\nbake\nserve");
        assert_eq!(normalize_instructions(Some(&value)), list(&["stir", "bake", "serve"]));

        let value = json!("stir\r\n\r\nbake");
        assert_eq!(normalize_instructions(Some(&value)), list(&["stir", "bake"]));
    }

    #[test]
    fn test_single_block() {
        let value = json!("Mix everything and bake for 20 minutes.");
        assert_eq!(
            normalize_instructions(Some(&value)),
            Instructions::Text("Mix everything and bake for 20 minutes.".into())
        );
    }

    #[test]
    fn test_run_on_sentences_are_split() {
        let value = json!("Mix the flour.Add eggs!Bake.");
        assert_eq!(
            normalize_instructions(Some(&value)),
            list(&["Mix the flour.", "Add eggs!", "Bake."])
        );
    }

    #[test]
    fn test_decimals_split_like_sentences() {
        let value = json!("Bake for 1.5 hours.");
        assert_eq!(
            normalize_instructions(Some(&value)),
            list(&["Bake for 1.", "5 hours."])
        );
    }

    #[test]
    fn test_preparation_label() {
        let value = json!("Preparation: Mix and bake.");
        assert_eq!(
            normalize_instructions(Some(&value)),
            Instructions::Text("Mix and bake.".into())
        );
    }

    #[test]
    fn test_html_prose_becomes_steps() {
        let value = json!("<p>Mix.</p><p>Bake.</p>");
        assert_eq!(normalize_instructions(Some(&value)), list(&["Mix.", "Bake."]));
    }

    #[test]
    fn test_string_list_strips_matching_ordinals() {
        let value = json!(["1. Mix", "2.Bake", "7 minutes of rest", "4 Serve"]);
        assert_eq!(
            normalize_instructions(Some(&value)),
            list(&["Mix", "Bake", "7 minutes of rest", "Serve"])
        );
    }

    #[test]
    fn test_two_digit_ordinals() {
        let steps: Vec<String> = (1..=11).map(|i| format!("{i}. step {i}")).collect();
        let value = json!(steps);
        let Instructions::List(out) = normalize_instructions(Some(&value)) else {
            panic!("expected list");
        };
        assert_eq!(out[10], "step 11");
    }

    #[test]
    fn test_how_to_steps() {
        let value = json!([
            {"@type": "HowToStep", "text": "Mix."},
            {"@type": "HowToStep", "text": "Bake."},
            {"text": "Cool."}
        ]);
        assert_eq!(normalize_instructions(Some(&value)), list(&["Mix.", "Bake.", "Cool."]));
    }

    #[test]
    fn test_how_to_sections() {
        let value = json!([
            {
                "@type": "HowToSection",
                "name": "Dough",
                "itemListElement": [
                    {"@type": "HowToStep", "text": "Mix flour."},
                    {"@type": "HowToStep", "text": "Knead."}
                ]
            },
            {
                "@type": "HowToSection",
                "itemListElement": {"@type": "HowToStep", "text": "Bake."}
            },
            {
                "@type": "HowToSection",
                "itemListElement": "Serve warm."
            }
        ]);
        assert_eq!(
            normalize_instructions(Some(&value)),
            list(&["Mix flour.\nKnead.", "Bake.", "Serve warm."])
        );
    }

    #[test]
    fn test_unrecognized_entries_are_dropped() {
        let value = json!(["Mix", {"foo": "bar"}, null, [1, 2], "Bake"]);
        assert_eq!(normalize_instructions(Some(&value)), list(&["Mix", "Bake"]));
    }

    #[test]
    fn test_single_step_object() {
        let value = json!({"@type": "HowToStep", "text": "Just bake it."});
        assert_eq!(normalize_instructions(Some(&value)), list(&["Just bake it."]));
    }

    #[test]
    fn test_missing() {
        assert_eq!(normalize_instructions(None), Instructions::List(vec![]));
        assert_eq!(normalize_instructions(Some(&json!(""))), Instructions::List(vec![]));
    }
}
