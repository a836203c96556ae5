// ABOUTME: JSON-LD recipe extraction from <script type="application/ld+json"> blocks.
// ABOUTME: Tolerates broken line breaks and unwraps @graph and WebPage.mainEntity shapes.

use scraper::ElementRef;
use serde_json::{Map, Value};
use tracing::warn;

/// Parses a script body as JSON.
///
/// Some publishing systems bake literal newlines into JSON strings, which is
/// invalid JSON, so every line break is turned into a space first. A parse
/// failure is logged and yields `None`.
pub fn parse_script(text: &str) -> Option<Value> {
    let joined = text.replace("\r\n", " ").replace(['\n', '\r'], " ");
    match serde_json::from_str(&joined) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(error = %err, "failed to parse JSON-LD block");
            None
        }
    }
}

/// Expands the common JSON-LD wrapper shapes into a flat list of nodes.
///
/// - a lone node becomes a one-element list;
/// - an object with `@graph` is replaced by the contents of `@graph`;
/// - a `WebPage` with a `mainEntity` is replaced by the `mainEntity`;
/// - scalars and nested lists are dropped; a non-list `@graph` is kept as is.
pub fn normalize(data: Value) -> Vec<Value> {
    let items = match data {
        Value::Array(items) => items,
        other => vec![other],
    };

    let mut normalized = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Value::Object(mut obj) => {
                if let Some(graph) = obj.remove("@graph") {
                    match graph {
                        Value::Array(nodes) => normalized.extend(nodes),
                        other => normalized.push(other),
                    }
                } else if type_matches(&obj, "WebPage") && obj.contains_key("mainEntity") {
                    if let Some(entity) = obj.remove("mainEntity") {
                        normalized.push(entity);
                    }
                } else {
                    normalized.push(Value::Object(obj));
                }
            }
            _ => {}
        }
    }
    normalized
}

/// True when `@type` is `Recipe`, or a list of types containing `Recipe`.
pub fn is_recipe(value: &Value) -> bool {
    value
        .as_object()
        .is_some_and(|obj| type_matches(obj, "Recipe"))
}

fn type_matches(obj: &Map<String, Value>, name: &str) -> bool {
    match obj.get("@type") {
        Some(Value::String(t)) => t == name,
        Some(Value::Array(types)) => types.iter().any(|t| t.as_str() == Some(name)),
        _ => false,
    }
}

/// Returns the first Recipe node in a parsed JSON-LD document.
pub fn find_recipe(data: Value) -> Option<Map<String, Value>> {
    normalize(data).into_iter().find_map(|node| match node {
        Value::Object(obj) if type_matches(&obj, "Recipe") => Some(obj),
        _ => None,
    })
}

/// Extracts the first Recipe node from a JSON-LD script element.
pub fn extract_recipe(script: ElementRef<'_>) -> Option<Map<String, Value>> {
    let text: String = script.text().collect();
    find_recipe(parse_script(&text)?)
}
