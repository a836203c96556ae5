// ABOUTME: schema.org microdata extraction from an itemscope'd Recipe element.
// ABOUTME: Walks itemprop/itemscope attributes into a nested key -> value(s) JSON object.

//! Microdata walker.
//!
//! The walk keeps an explicit stack of open items instead of recursing, so a
//! page with absurdly deep markup cannot exhaust the call stack. Each item
//! gathers the `(itemprop, value)` pairs beneath it in document order and is
//! folded into a fresh object where every key holds a list. A final pass
//! collapses single-element lists, since the walker cannot know which
//! properties are multi-valued on any given site.

use ego_tree::iter::Edge;
use ego_tree::NodeRef;
use scraper::{ElementRef, Node};
use serde_json::{Map, Value};
use tracing::{debug, warn};
use url::Url;

use crate::html_utils::collapse_whitespace;

// Elements whose boundaries read as line breaks in rendered text.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "div", "dl", "dt", "figcaption",
    "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li",
    "main", "nav", "ol", "p", "pre", "section", "table", "tr", "ul",
];

// Elements that never contribute visible text.
const HIDDEN_TAGS: &[&str] = &["script", "style", "template", "noscript"];

// Nested items deeper than this are dropped.
const MAX_ITEM_DEPTH: usize = 32;

/// Returns `{"@context": origin, "@type": type}` for an element's `itemtype`.
///
/// `None` when the element has no `itemtype` or it is not an absolute URL.
pub fn item_type(el: ElementRef<'_>) -> Option<Map<String, Value>> {
    let raw = el.value().attr("itemtype")?;
    // itemtype may list several types; the first one names the item.
    let first = raw.split_whitespace().next()?;

    let parsed = match Url::parse(first) {
        Ok(url) => url,
        Err(err) => {
            warn!(itemtype = first, error = %err, "unparseable microdata itemtype");
            return None;
        }
    };

    let mut map = Map::new();
    map.insert(
        "@context".to_string(),
        Value::String(parsed.origin().ascii_serialization()),
    );
    map.insert(
        "@type".to_string(),
        Value::String(parsed.path().replacen('/', "", 1)),
    );
    Some(map)
}

/// Extracts a property's leaf value.
///
/// Returns `None` when the element is itself a typed item and should be
/// recursed into instead. Otherwise the value is, in order of precedence: the
/// `href` of links, a `content` attribute, the `src` of an `image` property, or
/// the element's rendered text.
pub fn prop_value(el: ElementRef<'_>) -> Option<String> {
    let attrs = el.value();
    if attrs.attr("itemtype").is_some() {
        return None;
    }

    let tag = attrs.name();
    if let Some(href) = attrs.attr("href").filter(|_| tag == "a" || tag == "link") {
        return Some(href.trim().to_string());
    }
    if let Some(content) = attrs.attr("content") {
        return Some(content.trim().to_string());
    }
    if let Some(src) = attrs.attr("src").filter(|_| attrs.attr("itemprop") == Some("image")) {
        return Some(src.trim().to_string());
    }

    Some(inner_text(el))
}

/// Collects every `(itemprop, value)` pair beneath `node`, in document order.
///
/// Named, typed `itemscope` children become nested objects. Other `itemscope`
/// elements belong to unrelated items (breadcrumbs, ratings widgets) and are
/// skipped together with their subtree. Items nested more than
/// `MAX_ITEM_DEPTH` levels deep are skipped with a warning.
pub fn collect_props(node: NodeRef<'_, Node>) -> Vec<(String, Value)> {
    let mut stack = vec![ItemFrame::new(None, node)];

    loop {
        let Some(frame) = stack.last_mut() else {
            return Vec::new();
        };
        let Some(child) = frame.pending.pop() else {
            let Some(done) = stack.pop() else {
                return Vec::new();
            };
            match (done.key, stack.last_mut()) {
                (Some(key), Some(parent)) => {
                    parent
                        .props
                        .push((key, Value::Object(group_props(done.props))));
                    continue;
                }
                _ => return done.props,
            }
        };
        let Some(el) = ElementRef::wrap(child) else {
            continue;
        };

        let attrs = el.value();
        let itemprop = attrs.attr("itemprop");

        if attrs.attr("itemscope").is_some() {
            if let (Some(_), Some(key)) = (item_type(el), itemprop) {
                if stack.len() > MAX_ITEM_DEPTH {
                    warn!(
                        itemprop = key,
                        depth = stack.len(),
                        "microdata item nested too deeply, skipping"
                    );
                } else {
                    stack.push(ItemFrame::new(Some(key.to_string()), child));
                }
            }
        } else if let Some(key) = itemprop {
            let value = prop_value(el).map_or(Value::Null, Value::String);
            frame.props.push((key.to_string(), value));
        } else {
            frame.pending.extend(child.children().rev());
        }
    }
}

/// An item being collected: the `itemprop` it hangs off in its parent, the
/// nodes still to visit (last one first) and the pairs found so far.
struct ItemFrame<'a> {
    key: Option<String>,
    pending: Vec<NodeRef<'a, Node>>,
    props: Vec<(String, Value)>,
}

impl<'a> ItemFrame<'a> {
    fn new(key: Option<String>, node: NodeRef<'a, Node>) -> Self {
        Self {
            key,
            pending: node.children().rev().collect(),
            props: Vec::new(),
        }
    }
}

/// Folds `(key, value)` pairs into an object where every key holds a list.
pub fn group_props(props: Vec<(String, Value)>) -> Map<String, Value> {
    props.into_iter().fold(Map::new(), |mut acc, (key, value)| {
        if let Value::Array(items) = acc
            .entry(key)
            .or_insert_with(|| Value::Array(Vec::new()))
        {
            items.push(value);
        }
        acc
    })
}

/// Recursively replaces every single-element list with its only element.
///
/// Depth is bounded by the item nesting `collect_props` allows.
pub fn extract_singletons(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (key, extract_singletons(collapse(value))))
                .collect(),
        ),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|value| extract_singletons(collapse(value)))
                .collect(),
        ),
        other => other,
    }
}

fn collapse(value: Value) -> Value {
    match value {
        Value::Array(items) if items.len() == 1 => items.into_iter().next().unwrap_or_default(),
        other => other,
    }
}

/// Extracts a Recipe item rooted at `el`.
///
/// `None` when the element's `itemtype` is missing or is not a Recipe.
pub fn extract_recipe(el: ElementRef<'_>) -> Option<Map<String, Value>> {
    let mut recipe = item_type(el)?;
    if recipe.get("@type").and_then(Value::as_str) != Some("Recipe") {
        debug!("microdata element is not a Recipe item");
        return None;
    }

    recipe.extend(group_props(collect_props(*el)));
    match extract_singletons(Value::Object(recipe)) {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

/// Approximates the browser's rendered text: whitespace runs collapse to one
/// space, `<br>` and block elements become line breaks, hidden elements vanish.
pub fn inner_text(el: ElementRef<'_>) -> String {
    let mut raw = String::new();
    push_text(*el, &mut raw);

    raw.split('\n')
        .map(collapse_whitespace)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn push_text(root: NodeRef<'_, Node>, out: &mut String) {
    // The hidden element whose subtree is being skipped.
    let mut hidden = None;

    for edge in root.traverse() {
        match edge {
            Edge::Open(node) => {
                if hidden.is_some() || node.id() == root.id() {
                    continue;
                }
                match node.value() {
                    Node::Text(text) => {
                        // Source newlines are layout whitespace, not line breaks.
                        out.push_str(&text.replace(['\n', '\r'], " "));
                    }
                    Node::Element(element) => {
                        let name = element.name();
                        if HIDDEN_TAGS.contains(&name) {
                            hidden = Some(node.id());
                        } else if name == "br" || BLOCK_TAGS.contains(&name) {
                            out.push('\n');
                        }
                    }
                    _ => {}
                }
            }
            Edge::Close(node) => {
                if hidden == Some(node.id()) {
                    hidden = None;
                    continue;
                }
                if hidden.is_some() || node.id() == root.id() {
                    continue;
                }
                if let Node::Element(element) = node.value() {
                    if BLOCK_TAGS.contains(&element.name()) {
                        out.push('\n');
                    }
                }
            }
        }
    }
}
