//! The page transform.
//!
//! ```text
//! raw HTML ─► parse ─► links ─► sections ─► usage ─► translations
//!          ─► visibility ─► headword tables ─► languages ─► senses ─► PageOutput
//! ```
//!
//! Each stage edits one [`DocTree`] in place and finishes before the next
//! starts. Settings and glossary are passed in; nothing is cached between
//! calls, so identical input always yields identical output.

pub mod headword;
pub mod languages;
pub mod links;
pub mod sections;
pub mod senses;
pub mod translations;
pub mod usage;
pub mod visibility;

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::UserSettings;
use crate::dom::{DocTree, NodeId, Selector, parse_html};
use crate::error::Result;
use crate::glossary::Glossary;

static CONTENT_ROOT: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".mw-parser-output").unwrap());

static TRIGHT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\btright\b").unwrap());

/// One language's entry on the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageBlock {
    pub name: String,
    /// Serialized HTML of everything under the language heading.
    pub content: String,
}

/// Result of transforming one page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageOutput {
    pub languages: Vec<LanguageBlock>,
    /// Language to show first; empty when no language qualifies.
    pub active_tab: String,
}

impl PageOutput {
    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
    }

    pub fn language(&self, name: &str) -> Option<&LanguageBlock> {
        self.languages.iter().find(|l| l.name == name)
    }

    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }
}

/// Transform an article page into per-language blocks.
///
/// A page without a `.mw-parser-output` container yields an empty output.
pub fn transform_page(html: &str, glossary: &Glossary, settings: &UserSettings) -> PageOutput {
    let html = TRIGHT_RE.replace_all(html, "float-right");
    let mut dom = parse_html(&html);

    let Some(root) = dom.select_first(dom.document(), &CONTENT_ROOT) else {
        tracing::debug!("page has no content root");
        return PageOutput::default();
    };

    run_stages(&mut dom, root, glossary, settings);

    let blocks = languages::extract_languages(&dom, root);
    let found = blocks.len();
    let (kept, active_tab) = languages::filter_languages(blocks, settings);

    let languages = kept
        .into_iter()
        .map(|block| {
            senses::group_senses(&mut dom, block.section);
            LanguageBlock {
                content: languages::section_content(&dom, block.section),
                name: block.name,
            }
        })
        .collect::<Vec<_>>();

    tracing::debug!(found, kept = languages.len(), active_tab = %active_tab, "transformed page");
    PageOutput {
        languages,
        active_tab,
    }
}

/// Tree stages up to, not including, language extraction.
pub fn run_stages(dom: &mut DocTree, root: NodeId, glossary: &Glossary, settings: &UserSettings) {
    links::rewrite_links(dom, root, glossary);
    sections::segment(dom, root);
    usage::extract_usage_labels(dom, root);
    translations::collapse_translations(dom, root, &settings.display_languages);
    visibility::apply_visibility(dom, root, &settings.section_rules);
    headword::build_headword_tables(dom, root, &settings.section_rules);
}
