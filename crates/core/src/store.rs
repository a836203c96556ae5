// ABOUTME: Persistent recipe storage keyed by a SHA-256 hash of the recipe URL.
// ABOUTME: Defines the RecipeStore trait with in-memory and one-file-per-recipe backends.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::error::StoreError;
use crate::models::Recipe;

/// Stable identifier of a saved recipe: the lowercase hex SHA-256 of its URL.
///
/// Saving the same page twice yields the same id, so a later save overwrites
/// the earlier one.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RecipeId(String);

impl RecipeId {
    pub fn for_url(url: &str) -> Self {
        RecipeId(format!("{:x}", Sha256::digest(url.as_bytes())))
    }

    /// Validates a textual id (64 hex digits, case-insensitive).
    pub fn parse(s: &str) -> Result<Self, StoreError> {
        let s = s.trim();
        if s.len() == 64 && s.bytes().all(|b| b.is_ascii_hexdigit()) {
            Ok(RecipeId(s.to_ascii_lowercase()))
        } else {
            Err(StoreError::invalid_id(s))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecipeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for RecipeId {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RecipeId::parse(s)
    }
}

impl TryFrom<String> for RecipeId {
    type Error = StoreError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        RecipeId::parse(&s)
    }
}

impl From<RecipeId> for String {
    fn from(id: RecipeId) -> Self {
        id.0
    }
}

/// Keyed storage for saved recipes with overwrite-by-key semantics.
pub trait RecipeStore {
    fn put(&mut self, id: &RecipeId, recipe: &Recipe) -> Result<(), StoreError>;
    fn get(&self, id: &RecipeId) -> Result<Option<Recipe>, StoreError>;
    /// All stored ids in ascending order.
    fn list(&self) -> Result<Vec<RecipeId>, StoreError>;
    /// Returns whether anything was removed.
    fn remove(&mut self, id: &RecipeId) -> Result<bool, StoreError>;
}

/// Saves `recipe` under the id derived from its URL and returns that id.
pub fn save_recipe<S: RecipeStore + ?Sized>(
    store: &mut S,
    recipe: &Recipe,
) -> Result<RecipeId, StoreError> {
    let id = RecipeId::for_url(&recipe.url);
    store.put(&id, recipe)?;
    info!(id = %id, name = %recipe.name, "saved recipe");
    Ok(id)
}

/// Every saved recipe, in id order.
pub fn export_all<S: RecipeStore + ?Sized>(
    store: &S,
) -> Result<Vec<(RecipeId, Recipe)>, StoreError> {
    let mut out = Vec::new();
    for id in store.list()? {
        if let Some(recipe) = store.get(&id)? {
            out.push((id, recipe));
        }
    }
    Ok(out)
}

/// In-process store, lost when dropped.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    recipes: BTreeMap<RecipeId, Recipe>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }
}

impl RecipeStore for MemoryStore {
    fn put(&mut self, id: &RecipeId, recipe: &Recipe) -> Result<(), StoreError> {
        self.recipes.insert(id.clone(), recipe.clone());
        Ok(())
    }

    fn get(&self, id: &RecipeId) -> Result<Option<Recipe>, StoreError> {
        Ok(self.recipes.get(id).cloned())
    }

    fn list(&self) -> Result<Vec<RecipeId>, StoreError> {
        Ok(self.recipes.keys().cloned().collect())
    }

    fn remove(&mut self, id: &RecipeId) -> Result<bool, StoreError> {
        Ok(self.recipes.remove(id).is_some())
    }
}

/// Directory-backed store holding one pretty-printed `<id>.json` per recipe.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Opens the store at `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| StoreError::io(&dir, e))?;
        debug!(dir = %dir.display(), "opened recipe store");
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: &RecipeId) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }
}

impl RecipeStore for FileStore {
    fn put(&mut self, id: &RecipeId, recipe: &Recipe) -> Result<(), StoreError> {
        let path = self.path_for(id);
        let body = serde_json::to_vec_pretty(recipe).map_err(StoreError::Serialize)?;
        fs::write(&path, body).map_err(|e| StoreError::io(&path, e))
    }

    fn get(&self, id: &RecipeId) -> Result<Option<Recipe>, StoreError> {
        let path = self.path_for(id);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::io(&path, e)),
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| StoreError::corrupt(id, e))
    }

    fn list(&self) -> Result<Vec<RecipeId>, StoreError> {
        let entries = fs::read_dir(&self.dir).map_err(|e| StoreError::io(&self.dir, e))?;
        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::io(&self.dir, e))?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            // Foreign files in the directory are not ours to report.
            if let Some(id) = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .and_then(|stem| RecipeId::parse(stem).ok())
            {
                ids.push(id);
            }
        }
        ids.sort();
        Ok(ids)
    }

    fn remove(&mut self, id: &RecipeId) -> Result<bool, StoreError> {
        let path = self.path_for(id);
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StoreError::io(&path, e)),
        }
    }
}
