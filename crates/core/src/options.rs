// ABOUTME: Configuration options for normalization and page fetching, plus CoordinatorBuilder.
// ABOUTME: CoordinatorBuilder provides a fluent API for constructing Coordinator instances.

use std::time::Duration;

use crate::coordinator::Coordinator;
use crate::store::{MemoryStore, RecipeStore};

/// Name given to recipes whose markup has no usable name.
pub const UNTITLED_RECIPE: &str = "An untitled recipe";

/// Configuration shared by the normalizer and hosts that fetch pages.
#[derive(Debug, Clone)]
pub struct Options {
    pub untitled_name: String,
    pub fetch_timeout: Duration,
    pub user_agent: String,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            untitled_name: UNTITLED_RECIPE.to_string(),
            fetch_timeout: Duration::from_secs(30),
            user_agent: format!("recipe-cleaner/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Builder for constructing Coordinator instances with custom configuration.
#[derive(Debug, Clone)]
pub struct CoordinatorBuilder<S = MemoryStore> {
    opts: Options,
    store: S,
}

impl CoordinatorBuilder<MemoryStore> {
    /// Create a new builder backed by an in-memory store.
    pub fn new() -> Self {
        Self {
            opts: Options::default(),
            store: MemoryStore::default(),
        }
    }
}

impl Default for CoordinatorBuilder<MemoryStore> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: RecipeStore> CoordinatorBuilder<S> {
    /// Set the placeholder name for untitled recipes.
    pub fn untitled_name(mut self, name: impl Into<String>) -> Self {
        self.opts.untitled_name = name.into();
        self
    }

    /// Set the page fetch timeout.
    pub fn fetch_timeout(mut self, timeout: Duration) -> Self {
        self.opts.fetch_timeout = timeout;
        self
    }

    /// Set the User-Agent header used when fetching pages.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.opts.user_agent = user_agent.into();
        self
    }

    /// Replace all options at once.
    pub fn options(mut self, opts: Options) -> Self {
        self.opts = opts;
        self
    }

    /// Persist saved recipes in `store`.
    pub fn store<T: RecipeStore>(self, store: T) -> CoordinatorBuilder<T> {
        CoordinatorBuilder {
            opts: self.opts,
            store,
        }
    }

    /// Build the Coordinator with the configured options.
    pub fn build(self) -> Coordinator<S> {
        Coordinator::new(self.store, self.opts)
    }
}
