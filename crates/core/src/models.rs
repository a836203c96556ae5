// ABOUTME: Data models for raw recipe candidates and the canonical normalized recipe.
// ABOUTME: RawRecipe tags the source vocabulary; Recipe is the display-ready record.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Which extractor found a candidate on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CandidateSource {
    JsonLd,
    Microdata,
}

/// An untyped recipe object pulled straight from page markup, tagged by vocabulary.
///
/// Values are whatever the page provided: scalars, lists, or nested objects. No
/// invariants hold here; the normalizer is responsible for making sense of it.
#[derive(Debug, Clone, PartialEq)]
pub enum RawRecipe {
    JsonLd(Map<String, Value>),
    Microdata(Map<String, Value>),
    /// The pre-schema.org `data-vocabulary.org` markup, from either extractor.
    LegacyVocab(Map<String, Value>),
}

impl RawRecipe {
    /// Tags a detected object, recognizing legacy markup by its `@context`.
    pub fn classify(source: CandidateSource, data: Map<String, Value>) -> Self {
        if is_legacy_context(&data) {
            return RawRecipe::LegacyVocab(data);
        }
        match source {
            CandidateSource::JsonLd => RawRecipe::JsonLd(data),
            CandidateSource::Microdata => RawRecipe::Microdata(data),
        }
    }

    /// The untouched object as extracted from the page.
    pub fn as_map(&self) -> &Map<String, Value> {
        match self {
            RawRecipe::JsonLd(m) | RawRecipe::Microdata(m) | RawRecipe::LegacyVocab(m) => m,
        }
    }

    pub fn into_map(self) -> Map<String, Value> {
        match self {
            RawRecipe::JsonLd(m) | RawRecipe::Microdata(m) | RawRecipe::LegacyVocab(m) => m,
        }
    }

    pub fn is_legacy_vocab(&self) -> bool {
        matches!(self, RawRecipe::LegacyVocab(_)) || is_legacy_context(self.as_map())
    }
}

fn is_legacy_context(data: &Map<String, Value>) -> bool {
    data.get("@context")
        .and_then(Value::as_str)
        .is_some_and(|ctx| ctx.contains("data-vocabulary.org"))
}

/// One ingredient line split into quantity, unit and name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    pub ingredient: String,
}

impl Ingredient {
    /// An ingredient with no recognized quantity or unit.
    pub fn bare(ingredient: impl Into<String>) -> Self {
        Self {
            quantity: None,
            unit: None,
            ingredient: ingredient.into(),
        }
    }
}

/// Recipe instructions: either a single block of prose or an ordered list of steps.
///
/// Serialized as exactly one of `instructionText` or `instructionList`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Instructions {
    #[serde(rename = "instructionText")]
    Text(String),
    #[serde(rename = "instructionList")]
    List(Vec<String>),
}

impl Default for Instructions {
    fn default() -> Self {
        Instructions::List(Vec::new())
    }
}

impl Instructions {
    pub fn text(&self) -> Option<&str> {
        match self {
            Instructions::Text(t) => Some(t),
            Instructions::List(_) => None,
        }
    }

    pub fn list(&self) -> Option<&[String]> {
        match self {
            Instructions::Text(_) => None,
            Instructions::List(steps) => Some(steps),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Instructions::Text(t) => t.is_empty(),
            Instructions::List(steps) => steps.is_empty(),
        }
    }
}

/// The canonical, display-ready recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub name: String,
    pub description: Option<String>,
    pub author: Option<String>,
    /// A single image URL.
    pub image: Option<String>,
    /// Human readable total time, e.g. "1 hr 30 min".
    pub time: Option<String>,
    #[serde(rename = "yield")]
    pub recipe_yield: Option<String>,
    /// Source page URL. Trusted, never sanitized.
    pub url: String,
    pub ingredients: Vec<Ingredient>,
    #[serde(flatten)]
    pub instructions: Instructions,
    /// The raw candidate exactly as extracted, for re-embedding as JSON-LD.
    pub original: Value,
}
