//! Glossary terms and the parser for the dictionary's glossary appendix.
//!
//! The glossary maps an anchor on the appendix page (`transitive`,
//! `countable`, ...) to a short HTML definition. The link rewriter turns
//! glossary links into tooltips carrying that definition, so definitions are
//! cleaned here: sister-project boxes are dropped and links are flattened
//! to `<em>` text.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::dom::{DocTree, NodeId, Selector, parse_html};
use crate::error::Result;

static CROSS_REFERENCE_BOXES: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(
        ".sister-wikipedia, .sister-project, .interproject-box, .wikipedia-box, .floatright, .float-right",
    )
    .unwrap()
});

static ROOT: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".mw-parser-output").unwrap());

/// Term anchor → HTML definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Glossary(BTreeMap<String, String>);

impl Glossary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the glossary appendix page.
    pub fn from_html(html: &str) -> Self {
        parse_glossary(html)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a glossary file: either a JSON term map or the appendix HTML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        if text.trim_start().starts_with('{') {
            Self::from_json(&text)
        } else {
            Ok(Self::from_html(&text))
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Add a term. An existing definition is kept.
    pub fn insert(&mut self, term: impl Into<String>, definition: impl Into<String>) -> bool {
        match self.0.entry(term.into()) {
            std::collections::btree_map::Entry::Vacant(slot) => {
                slot.insert(definition.into());
                true
            }
            std::collections::btree_map::Entry::Occupied(_) => false,
        }
    }

    pub fn lookup(&self, term: &str) -> Option<&str> {
        self.0.get(term).map(String::as_str)
    }

    pub fn contains(&self, term: &str) -> bool {
        self.0.contains_key(term)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Glossary {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut glossary = Self::new();
        for (term, definition) in iter {
            glossary.insert(term, definition);
        }
        glossary
    }
}

/// Build a [`Glossary`] from the appendix page's `dt`/`dd` lists.
pub fn parse_glossary(html: &str) -> Glossary {
    let mut dom = parse_html(html);
    let root = dom.select_first(dom.document(), &ROOT).unwrap_or(dom.document());

    for widget in dom.select(root, &CROSS_REFERENCE_BOXES) {
        dom.detach(widget);
    }

    let mut glossary = Glossary::new();
    let terms: Vec<NodeId> = dom
        .descendants(root)
        .into_iter()
        .filter(|&id| dom.is_tag(id, "dt"))
        .collect();

    for dt in terms {
        let Some(key) = term_key(&dom, dt) else {
            continue;
        };

        let mut definition = String::new();
        let mut next = dom.next_element_sibling(dt);
        while let Some(dd) = next.filter(|&id| dom.is_tag(id, "dd")) {
            flatten_links(&mut dom, dd);
            definition.push_str(dom.inner_html(dd).trim());
            next = dom.next_element_sibling(dd);
        }

        if definition.is_empty() {
            tracing::trace!(term = %key, "glossary term without definition");
            continue;
        }
        if !glossary.insert(key.clone(), definition) {
            tracing::trace!(term = %key, "duplicate glossary term ignored");
        }
    }

    tracing::debug!(entries = glossary.len(), "parsed glossary");
    glossary
}

fn term_key(dom: &DocTree, dt: NodeId) -> Option<String> {
    if let Some(id) = dom.element_id(dt) {
        return Some(id.to_string());
    }
    if let Some(id) = dom
        .descendants(dt)
        .into_iter()
        .find_map(|d| dom.element_id(d))
    {
        return Some(id.to_string());
    }

    let text = dom.text(dt);
    let text = text.trim();
    (!text.is_empty()).then(|| text.replace(' ', "_"))
}

/// Replace every link under `scope` with `<em>` holding its text.
fn flatten_links(dom: &mut DocTree, scope: NodeId) {
    let links: Vec<NodeId> = dom
        .descendants(scope)
        .into_iter()
        .filter(|&id| dom.is_tag(id, "a"))
        .collect();

    for link in links {
        if !dom.is_attached(link) {
            continue;
        }
        let text = dom.text(link);
        let em = dom.create_html_element("em", &[]);
        dom.append_text(em, &text);
        dom.replace(link, em);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<div class="mw-parser-output">
        <dl>
          <dt id="transitive"><b>transitive</b></dt>
          <dd>Of a <a href="/wiki/verb">verb</a>, taking a direct object.
            <div class="sister-wikipedia">Wikipedia has an article on transitive verbs</div></dd>
          <dt><span id="countable">countable</span></dt>
          <dd>Of a noun, able to be counted.</dd>
          <dt>proper noun</dt>
          <dd>A name.</dd>
          <dd>Capitalized.</dd>
          <dt id="transitive">transitive</dt>
          <dd>Second definition.</dd>
        </dl></div>"#;

    #[test]
    fn test_term_keys() {
        let glossary = parse_glossary(PAGE);
        assert_eq!(glossary.len(), 3);
        assert!(glossary.contains("transitive"));
        assert!(glossary.contains("countable"));
        assert!(glossary.contains("proper_noun"));
    }

    #[test]
    fn test_links_flattened_and_boxes_removed() {
        let glossary = parse_glossary(PAGE);
        let definition = glossary.lookup("transitive").unwrap();
        assert_eq!(definition, "Of a <em>verb</em>, taking a direct object.");
        assert!(!definition.contains("<a"));
        assert!(!definition.contains("Wikipedia"));
    }

    #[test]
    fn test_multiple_dd_are_joined() {
        let glossary = parse_glossary(PAGE);
        assert_eq!(glossary.lookup("proper_noun"), Some("A name.Capitalized."));
    }

    #[test]
    fn test_missing_root_uses_whole_document() {
        let glossary = parse_glossary("<dl><dt id=\"archaic\">archaic</dt><dd>Old.</dd></dl>");
        assert_eq!(glossary.lookup("archaic"), Some("Old."));
    }

    #[test]
    fn test_json_round_trip() {
        let glossary: Glossary = [("obsolete", "No longer in use.")].into_iter().collect();
        let json = glossary.to_json().unwrap();
        assert_eq!(json, r#"{"obsolete":"No longer in use."}"#);
        assert_eq!(Glossary::from_json(&json).unwrap(), glossary);
    }

    #[test]
    fn test_load_detects_format() {
        let dir = tempfile::tempdir().unwrap();
        let html = dir.path().join("glossary.html");
        let json = dir.path().join("glossary.json");
        std::fs::write(&html, "<dl><dt id=\"rare\">rare</dt><dd>Seldom used.</dd></dl>").unwrap();
        std::fs::write(&json, r#"{"rare": "Seldom used."}"#).unwrap();

        assert_eq!(Glossary::load(&html).unwrap(), Glossary::load(&json).unwrap());
    }
}
