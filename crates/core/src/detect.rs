// ABOUTME: Page-level recipe detection: JSON-LD scripts first, then microdata Recipe items.
// ABOUTME: The Detector runs once per document and yields at most one raw candidate.

use scraper::{Html, Selector};
use tracing::debug;

use crate::linked_data;
use crate::microdata;
use crate::models::{CandidateSource, RawRecipe};

pub const JSON_LD_SELECTOR: &str = r#"script[type="application/ld+json"]"#;
pub const MICRODATA_SELECTOR: &str = r#"[itemtype$="/Recipe"]"#;

/// Where a Detector is in its single pass over a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorState {
    Searching,
    Done,
}

/// One-shot recipe detector bound to a parsed document.
///
/// `run` walks the JSON-LD scripts in document order, then the microdata
/// Recipe elements, and stops at the first candidate. Once it has run the
/// detector is `Done` and further calls return `None`.
pub struct Detector<'a> {
    document: &'a Html,
    state: DetectorState,
}

impl<'a> Detector<'a> {
    pub fn new(document: &'a Html) -> Self {
        Self {
            document,
            state: DetectorState::Searching,
        }
    }

    pub fn state(&self) -> DetectorState {
        self.state
    }

    pub fn run(&mut self) -> Option<RawRecipe> {
        if self.state == DetectorState::Done {
            return None;
        }
        self.state = DetectorState::Done;

        if let Some(found) = self.from_linked_data() {
            return Some(RawRecipe::classify(CandidateSource::JsonLd, found));
        }
        if let Some(found) = self.from_microdata() {
            return Some(RawRecipe::classify(CandidateSource::Microdata, found));
        }

        debug!("no recipe found on page");
        None
    }

    fn from_linked_data(&self) -> Option<serde_json::Map<String, serde_json::Value>> {
        let selector = Selector::parse(JSON_LD_SELECTOR).ok()?;
        self.document
            .select(&selector)
            .enumerate()
            .find_map(|(idx, script)| {
                let found = linked_data::extract_recipe(script);
                if found.is_some() {
                    debug!(script = idx, "recipe found in JSON-LD");
                }
                found
            })
    }

    fn from_microdata(&self) -> Option<serde_json::Map<String, serde_json::Value>> {
        let selector = Selector::parse(MICRODATA_SELECTOR).ok()?;
        self.document
            .select(&selector)
            .enumerate()
            .find_map(|(idx, el)| {
                let found = microdata::extract_recipe(el);
                if found.is_some() {
                    debug!(element = idx, "recipe found in microdata");
                }
                found
            })
    }
}

/// Parses `html` and returns the first recipe candidate on the page, if any.
pub fn detect_recipe(html: &str) -> Option<RawRecipe> {
    let document = Html::parse_document(html);
    Detector::new(&document).run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn page(body: &str) -> String {
        format!("<!doctype html><html><head><title>t</title></head><body>{body}</body></html>")
    }

    #[test]
    fn test_json_ld_wins_over_microdata() {
        let html = page(
            r#"<div itemscope itemtype="http://schema.org/Recipe"><span itemprop="name">From microdata</span></div>
            <script type="application/ld+json">{"@type": "Recipe", "name": "From JSON-LD"}</script>"#,
        );
        let raw = detect_recipe(&html).unwrap();
        assert!(matches!(raw, RawRecipe::JsonLd(_)));
        assert_eq!(raw.as_map().get("name"), Some(&json!("From JSON-LD")));
    }

    #[test]
    fn test_skips_broken_and_unrelated_scripts() {
        let html = page(
            r#"<script type="application/ld+json">{broken</script>
            <script type="application/ld+json">{"@type": "Organization", "name": "Blog"}</script>
            <script type="application/ld+json">{"@type": "Recipe", "name": "Third"}</script>
            <script type="application/ld+json">{"@type": "Recipe", "name": "Fourth"}</script>"#,
        );
        let raw = detect_recipe(&html).unwrap();
        assert_eq!(raw.as_map().get("name"), Some(&json!("Third")));
    }

    #[test]
    fn test_falls_back_to_microdata() {
        let html = page(
            r#"<script type="application/ld+json">{"@type": "WebSite"}</script>
            <div itemscope itemtype="https://schema.org/Recipe"><h1 itemprop="name">Stew</h1></div>"#,
        );
        let raw = detect_recipe(&html).unwrap();
        assert!(matches!(raw, RawRecipe::Microdata(_)));
        assert_eq!(raw.as_map().get("name"), Some(&json!("Stew")));
        assert_eq!(raw.as_map().get("@context"), Some(&json!("https://schema.org")));
    }

    #[test]
    fn test_legacy_microdata_is_classified() {
        let html = page(
            r#"<div itemscope itemtype="http://data-vocabulary.org/Recipe"><span itemprop="name">Old</span></div>"#,
        );
        let raw = detect_recipe(&html).unwrap();
        assert!(matches!(raw, RawRecipe::LegacyVocab(_)));
    }

    #[test]
    fn test_no_recipe_is_silent() {
        assert_eq!(detect_recipe(&page("<p>Nothing to see</p>")), None);
        assert_eq!(detect_recipe(""), None);
    }

    #[test]
    fn test_detector_runs_once() {
        let html = page(r#"<script type="application/ld+json">{"@type": "Recipe"}</script>"#);
        let document = Html::parse_document(&html);
        let mut detector = Detector::new(&document);
        assert_eq!(detector.state(), DetectorState::Searching);
        assert!(detector.run().is_some());
        assert_eq!(detector.state(), DetectorState::Done);
        assert!(detector.run().is_none());
    }
}
