// ABOUTME: Top-level normalization of a raw recipe candidate into the canonical Recipe.
// ABOUTME: Rewrites legacy vocabulary, applies field normalizers, sanitizes all text fields.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::fields::{self, is_truthy, text_value};
use crate::instructions::normalize_instructions;
use crate::models::{Instructions, RawRecipe, Recipe};
use crate::options::Options;
use crate::sanitize::{sanitize_list, sanitize_string};

/// Normalizes `raw` found on the page at `url` using default options.
pub fn normalize_recipe(raw: &RawRecipe, url: &str) -> Recipe {
    normalize_recipe_with(raw, url, &Options::default())
}

/// Normalizes `raw` found on the page at `url`.
///
/// Never fails: fields that cannot be understood come out empty and the
/// untouched candidate is kept in `original`.
pub fn normalize_recipe_with(raw: &RawRecipe, url: &str, opts: &Options) -> Recipe {
    let data = if raw.is_legacy_vocab() {
        debug!("rewriting data-vocabulary.org recipe");
        rewrite_legacy(raw.as_map())
    } else {
        raw.as_map().clone()
    };

    let name = data
        .get("name")
        .and_then(text_value)
        .map(|n| sanitize_string(&n))
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| opts.untitled_name.clone());

    let ingredients = sanitize_list(&ingredient_lines(&data))
        .iter()
        .map(|line| fields::ingredient(line))
        .collect();

    let instructions = match normalize_instructions(first_truthy(
        &data,
        &["recipeInstructions", "instructions", "instruction"],
    )) {
        Instructions::Text(text) => Instructions::Text(sanitize_string(&text)),
        Instructions::List(steps) => Instructions::List(sanitize_list(&steps)),
    };

    Recipe {
        name,
        description: data.get("description").and_then(text_value).and_then(clean),
        author: fields::author(data.get("author")).and_then(clean),
        image: fields::image(data.get("image")),
        time: fields::time(data.get("totalTime")).and_then(clean),
        recipe_yield: fields::recipe_yield(data.get("recipeYield")),
        url: url.to_string(),
        ingredients,
        instructions,
        original: Value::Object(raw.as_map().clone()),
    }
}

/// Maps `data-vocabulary.org` property names onto their schema.org equivalents.
fn rewrite_legacy(data: &Map<String, Value>) -> Map<String, Value> {
    const RENAMES: &[(&str, &str)] = &[
        ("name", "name"),
        ("ingredient", "ingredients"),
        ("summary", "description"),
        ("instructions", "recipeInstructions"),
    ];

    RENAMES
        .iter()
        .filter_map(|(from, to)| data.get(*from).map(|v| (to.to_string(), v.clone())))
        .collect()
}

fn first_truthy<'a>(data: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| data.get(*key))
        .find(|value| is_truthy(value))
}

/// Raw ingredient lines; a lone scalar counts as a one-line list.
fn ingredient_lines(data: &Map<String, Value>) -> Vec<String> {
    let Some(value) = first_truthy(data, &["recipeIngredient", "ingredients"]) else {
        return Vec::new();
    };

    let items = match value {
        Value::Array(items) => items.as_slice(),
        other => std::slice::from_ref(other),
    };

    items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            other => {
                warn!(value = %other, "non-text ingredient dropped");
                None
            }
        })
        .collect()
}

fn clean(s: String) -> Option<String> {
    let cleaned = sanitize_string(&s);
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}
