// ABOUTME: Core recipe extraction library for recipe-cleaner.
// ABOUTME: Provides JSON-LD/microdata detection, text sanitizing, normalization, and recipe storage.

pub mod coordinator;
pub mod detect;
pub mod duration_parse;
pub mod error;
pub mod fields;
pub mod html_utils;
pub mod instructions;
pub mod linked_data;
pub mod message;
pub mod microdata;
pub mod models;
pub mod normalize;
pub mod options;
pub mod sanitize;
pub mod store;

pub use coordinator::{Coordinator, Tab, TabId};
pub use detect::{detect_recipe, Detector, DetectorState};
pub use duration_parse::format_iso8601_duration;
pub use error::{MessageError, StoreError};
pub use instructions::normalize_instructions;
pub use message::Message;
pub use models::{CandidateSource, Ingredient, Instructions, RawRecipe, Recipe};
pub use normalize::{normalize_recipe, normalize_recipe_with};
pub use options::{CoordinatorBuilder, Options, UNTITLED_RECIPE};
pub use sanitize::{sanitize_list, sanitize_string};
pub use store::{export_all, save_recipe, FileStore, MemoryStore, RecipeId, RecipeStore};

/// Detects and normalizes the recipe on a page in one step.
pub fn extract_recipe(html: &str, url: &str) -> Option<Recipe> {
    detect_recipe(html).map(|raw| normalize_recipe(&raw, url))
}
