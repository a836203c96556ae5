// ABOUTME: Integration tests for the coordinator's tab lifecycle and recipe stores.
// ABOUTME: Exercises MemoryStore and FileStore through save, list, export, and removal.

use std::fs;

use pretty_assertions::assert_eq;
use recipe_cleaner_core::{
    export_all, save_recipe, Coordinator, CoordinatorBuilder, FileStore, Message, RecipeId,
    RecipeStore, StoreError, Tab,
};
use serde_json::json;
use tempfile::TempDir;

const PAGE: &str = r#"<html><head>
<script type="application/ld+json">
{"@context": "https://schema.org", "@type": "Recipe", "name": "Flatbread",
 "recipeIngredient": ["2 cups flour", "1 cup water"],
 "recipeInstructions": ["1. Mix.", "2. Rest.", "3. Cook."]}
</script>
</head><body></body></html>"#;

fn try_extract(html: &str) -> Message {
    Message::TryExtractRecipe {
        data: html.to_string(),
    }
}

#[test]
fn try_extract_runs_detection_in_coordinator() {
    let mut coordinator = Coordinator::builder().build();
    let tab = Tab::new(7, "https://example.com/flatbread");

    let recipe = coordinator.handle_message(&tab, try_extract(PAGE)).unwrap();
    assert_eq!(recipe.name, "Flatbread");
    assert_eq!(recipe.url, "https://example.com/flatbread");
    assert_eq!(
        recipe.instructions.list(),
        Some(&["Mix.".to_string(), "Rest.".to_string(), "Cook.".to_string()][..])
    );
}

#[test]
fn page_without_recipe_keeps_previous() {
    let mut coordinator = Coordinator::builder().build();
    let tab = Tab::new(1, "https://example.com/flatbread");

    coordinator.handle_message(&tab, try_extract(PAGE));
    let kept = coordinator
        .handle_message(&tab, try_extract("<html><body>nothing</body></html>"))
        .unwrap();
    assert_eq!(kept.name, "Flatbread");
}

#[test]
fn decoded_messages_drive_the_coordinator() {
    let mut coordinator = CoordinatorBuilder::new()
        .untitled_name("Nameless")
        .build();
    let tab = Tab::new(2, "https://example.com/x");

    let msg = Message::from_json(r#"{"kind": "recipe-detected", "data": {"@type": "Recipe"}}"#)
        .unwrap();
    let recipe = coordinator.handle_message(&tab, msg).unwrap();
    assert_eq!(recipe.name, "Nameless");
    assert_eq!(coordinator.options().untitled_name, "Nameless");
}

#[test]
fn tabs_are_independent() {
    let mut coordinator = Coordinator::builder().build();
    let a = Tab::new(1, "https://example.com/a");
    let b = Tab::new(2, "https://example.com/b");

    coordinator.handle_message(
        &a,
        Message::from_json(&json!({"kind": "recipe-detected", "data": {"name": "A"}}).to_string())
            .unwrap(),
    );
    coordinator.handle_message(
        &b,
        Message::from_json(&json!({"kind": "recipe-detected", "data": {"name": "B"}}).to_string())
            .unwrap(),
    );

    coordinator.close_tab(1);
    assert!(coordinator.recipe(1).is_none());
    assert_eq!(coordinator.recipe(2).unwrap().name, "B");
}

#[test]
fn saving_twice_overwrites_by_url() {
    let mut coordinator = Coordinator::builder().build();
    let tab = Tab::new(4, "https://example.com/flatbread");
    coordinator.handle_message(&tab, try_extract(PAGE));

    let first = coordinator.save(4).unwrap().unwrap();
    let second = coordinator.save(4).unwrap().unwrap();
    assert_eq!(first, second);
    assert_eq!(first, RecipeId::for_url("https://example.com/flatbread"));
    assert_eq!(coordinator.store().len(), 1);
}

#[test]
fn file_store_round_trip() {
    let dir = TempDir::new().unwrap();
    let store_dir = dir.path().join("recipes");

    let mut coordinator = CoordinatorBuilder::new()
        .store(FileStore::open(&store_dir).unwrap())
        .build();
    let tab = Tab::new(9, "https://example.com/flatbread");
    let detected = coordinator.handle_message(&tab, try_extract(PAGE)).cloned().unwrap();
    let id = coordinator.save(9).unwrap().unwrap();

    let path = store_dir.join(format!("{id}.json"));
    assert!(path.exists());

    let reopened = FileStore::open(&store_dir).unwrap();
    assert_eq!(reopened.list().unwrap(), vec![id.clone()]);
    assert_eq!(reopened.get(&id).unwrap(), Some(detected.clone()));

    let exported = export_all(&reopened).unwrap();
    assert_eq!(exported, vec![(id, detected)]);
}

#[test]
fn file_store_ignores_foreign_files_and_removes() {
    let dir = TempDir::new().unwrap();
    let mut store = FileStore::open(dir.path()).unwrap();
    fs::write(dir.path().join("notes.txt"), "hello").unwrap();
    fs::write(dir.path().join("other.json"), "{}").unwrap();

    let mut coordinator = Coordinator::builder().build();
    let tab = Tab::new(1, "https://example.com/flatbread");
    let recipe = coordinator.handle_message(&tab, try_extract(PAGE)).unwrap();
    let id = save_recipe(&mut store, recipe).unwrap();

    assert_eq!(store.list().unwrap(), vec![id.clone()]);
    assert!(store.remove(&id).unwrap());
    assert!(!store.remove(&id).unwrap());
    assert_eq!(store.get(&id).unwrap(), None);
    assert!(store.list().unwrap().is_empty());
}

#[test]
fn corrupt_file_is_reported() {
    let dir = TempDir::new().unwrap();
    let store = FileStore::open(dir.path()).unwrap();
    let id = RecipeId::for_url("https://example.com/broken");
    fs::write(dir.path().join(format!("{id}.json")), "{not json").unwrap();

    let err = store.get(&id).unwrap_err();
    assert!(matches!(err, StoreError::Corrupt { .. }), "got {err:?}");
}
