//! Language Extractor & Filter.
//!
//! Every level-2 section directly under the root is one language's entry.

use crate::config::{LanguagePolicy, UserSettings};
use crate::dom::{DocTree, NodeData, NodeId};

use super::links::visible_text;
use super::sections::{heading_level, section_heading, section_level};

/// Name used when a language heading has no text.
pub const UNKNOWN_LANGUAGE: &str = "Unknown";

/// A level-2 section and its language name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageSection {
    pub name: String,
    pub section: NodeId,
}

/// Level-2 sections under `root`, in source order.
pub fn extract_languages(dom: &DocTree, root: NodeId) -> Vec<LanguageSection> {
    dom.element_children(root)
        .into_iter()
        .filter(|&child| section_level(dom, child) == Some(2))
        .map(|section| {
            let name = section_heading(dom, section)
                .map(|h| visible_text(dom, h).trim().to_string())
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| UNKNOWN_LANGUAGE.to_string());
            LanguageSection { name, section }
        })
        .collect()
}

/// Apply the language policy. Returns the kept sections and the active tab.
pub fn filter_languages(
    blocks: Vec<LanguageSection>,
    settings: &UserSettings,
) -> (Vec<LanguageSection>, String) {
    match settings.language_policy {
        LanguagePolicy::Filter => {
            let kept: Vec<_> = blocks
                .into_iter()
                .filter(|block| settings.displays(&block.name))
                .collect();
            let active = kept.first().map(|b| b.name.clone()).unwrap_or_default();
            (kept, active)
        }
        LanguagePolicy::KeepAll => {
            let active = blocks
                .iter()
                .find(|b| settings.displays(&b.name))
                .or_else(|| blocks.first())
                .map(|b| b.name.clone())
                .unwrap_or_default();
            (blocks, active)
        }
    }
}

/// Serialized body of a language section: everything after its heading.
pub fn section_content(dom: &DocTree, section: NodeId) -> String {
    let mut html = String::new();
    for child in dom.children(section) {
        match dom.get(child).map(|n| &n.data) {
            Some(NodeData::Text(text)) if text.trim().is_empty() => {}
            Some(NodeData::Element { .. }) if heading_level(dom, child) == Some(2) => {}
            Some(_) => html.push_str(&dom.outer_html(child)),
            None => {}
        }
    }
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_html;
    use crate::pipeline::sections::segment;

    const PAGE: &str = r#"<div class="mw-parser-output"><p>lead</p><div class="mw-heading mw-heading2"><h2 id="English">English</h2></div><p>en</p><h2 id="x"></h2><p>??</p><div class="mw-heading mw-heading2"><h2 id="Spanish">Spanish</h2></div>
<p>es</p></div>"#;

    fn blocks() -> (DocTree, Vec<LanguageSection>) {
        let mut dom = parse_html(PAGE);
        let root = dom.find_by_class("mw-parser-output").unwrap();
        segment(&mut dom, root);
        let blocks = extract_languages(&dom, root);
        (dom, blocks)
    }

    fn settings(languages: &[&str], policy: LanguagePolicy) -> UserSettings {
        let mut settings = UserSettings::empty();
        settings.select_languages(languages.iter().copied(), true);
        settings.language_policy = policy;
        settings
    }

    #[test]
    fn test_extract_names() {
        let (_, blocks) = blocks();
        let names: Vec<_> = blocks.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, ["English", UNKNOWN_LANGUAGE, "Spanish"]);
    }

    #[test]
    fn test_filter_keeps_displayed() {
        let (_, blocks) = blocks();
        let (kept, active) = filter_languages(blocks, &settings(&["Spanish"], LanguagePolicy::Filter));
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].name, "Spanish");
        assert_eq!(active, "Spanish");
    }

    #[test]
    fn test_filter_keeps_source_order() {
        let (_, blocks) = blocks();
        let (kept, active) = filter_languages(blocks, &settings(&["Spanish", "English"], LanguagePolicy::Filter));
        let names: Vec<_> = kept.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, ["English", "Spanish"]);
        assert_eq!(active, "English");

        let (_, blocks) = self::blocks();
        let (kept, active) = filter_languages(blocks, &settings(&["Latin"], LanguagePolicy::Filter));
        assert!(kept.is_empty());
        assert_eq!(active, "");
    }

    #[test]
    fn test_keep_all_picks_active_tab() {
        let (_, blocks) = blocks();
        let (kept, active) = filter_languages(blocks, &settings(&["Spanish"], LanguagePolicy::KeepAll));
        assert_eq!(kept.len(), 3);
        assert_eq!(active, "Spanish");

        let (_, blocks) = self::blocks();
        let (_, active) = filter_languages(blocks, &settings(&["Latin"], LanguagePolicy::KeepAll));
        assert_eq!(active, "English");
    }

    #[test]
    fn test_section_content_skips_heading() {
        let (dom, blocks) = blocks();
        assert_eq!(section_content(&dom, blocks[0].section), "<p>en</p>");
        assert_eq!(section_content(&dom, blocks[2].section), "<p>es</p>");
    }
}
