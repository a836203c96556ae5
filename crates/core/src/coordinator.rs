// ABOUTME: Session state linking browser tabs to their detected and saved recipes.
// ABOUTME: Normalizes incoming candidates, keeps them per tab, and persists on request.

use std::collections::HashMap;

use scraper::Html;
use tracing::{debug, info};

use crate::detect::Detector;
use crate::error::StoreError;
use crate::message::Message;
use crate::models::{CandidateSource, RawRecipe, Recipe};
use crate::normalize::normalize_recipe_with;
use crate::options::{CoordinatorBuilder, Options};
use crate::store::{save_recipe, MemoryStore, RecipeId, RecipeStore};

pub type TabId = u64;

/// The page a message came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tab {
    pub id: TabId,
    pub url: String,
}

impl Tab {
    pub fn new(id: TabId, url: impl Into<String>) -> Self {
        Self {
            id,
            url: url.into(),
        }
    }
}

/// Owns the per-tab recipe tables and the store saved recipes go to.
///
/// A tab's detected recipe is ephemeral: it lives until the tab closes or a
/// newer detection replaces it, and reaches the store only through `save`.
#[derive(Debug)]
pub struct Coordinator<S: RecipeStore = MemoryStore> {
    store: S,
    opts: Options,
    ephemeral: HashMap<TabId, Recipe>,
    saved: HashMap<TabId, RecipeId>,
}

impl Coordinator<MemoryStore> {
    pub fn builder() -> CoordinatorBuilder {
        CoordinatorBuilder::new()
    }
}

impl<S: RecipeStore> Coordinator<S> {
    pub fn new(store: S, opts: Options) -> Self {
        Self {
            store,
            opts,
            ephemeral: HashMap::new(),
            saved: HashMap::new(),
        }
    }

    pub fn options(&self) -> &Options {
        &self.opts
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Handles one message from `tab` and returns the tab's recipe, if any.
    ///
    /// A page that turns out to have no recipe leaves the tab's previous
    /// recipe in place.
    pub fn handle_message(&mut self, tab: &Tab, message: Message) -> Option<&Recipe> {
        let raw = match message {
            Message::RecipeDetected { data, source } => {
                Some(RawRecipe::classify(source.unwrap_or(CandidateSource::JsonLd), data))
            }
            Message::TryExtractRecipe { data } => {
                let document = Html::parse_document(&data);
                Detector::new(&document).run()
            }
        };

        match raw {
            Some(raw) => Some(self.set_recipe(tab, &raw)),
            None => {
                debug!(tab = tab.id, "no recipe in message");
                self.ephemeral.get(&tab.id)
            }
        }
    }

    /// Normalizes `raw` and makes it the tab's current recipe.
    pub fn set_recipe(&mut self, tab: &Tab, raw: &RawRecipe) -> &Recipe {
        let recipe = normalize_recipe_with(raw, &tab.url, &self.opts);
        debug!(tab = tab.id, name = %recipe.name, "recipe ready");
        self.ephemeral.insert(tab.id, recipe);
        &self.ephemeral[&tab.id]
    }

    pub fn recipe(&self, tab: TabId) -> Option<&Recipe> {
        self.ephemeral.get(&tab)
    }

    pub fn saved_id(&self, tab: TabId) -> Option<&RecipeId> {
        self.saved.get(&tab)
    }

    /// Persists the tab's current recipe; `None` when the tab has none.
    pub fn save(&mut self, tab: TabId) -> Result<Option<RecipeId>, StoreError> {
        let Some(recipe) = self.ephemeral.get(&tab) else {
            return Ok(None);
        };
        let id = save_recipe(&mut self.store, recipe)?;
        self.saved.insert(tab, id.clone());
        Ok(Some(id))
    }

    /// Forgets everything about a closed tab. Saved recipes stay in the store.
    pub fn close_tab(&mut self, tab: TabId) {
        let had_recipe = self.ephemeral.remove(&tab).is_some();
        self.saved.remove(&tab);
        if had_recipe {
            info!(tab, "discarded recipe for closed tab");
        }
    }
}
