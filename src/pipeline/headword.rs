//! Headword Table Builder.
//!
//! A headword line lists inflections inline, e.g.
//! `<i>first-person singular present</i> <b><a>hablo</a></b>, <i>past
//! participle</i> <b><a>hablado</a></b>`. The pairs are pulled out with a
//! pattern over the line's markup and rendered as a two-column table, with a
//! mnemonic gloss for three well-known forms. The `Quick_conjugation` rule
//! controls whether the table is shown, collapsed or dropped.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::{SectionRules, SectionSetting};
use crate::dom::{DocTree, NodeId, Selector};

use super::links::visible_inner_html;
use super::sections::{heading_level, is_section, section_heading};

/// Rule key controlling the tables.
pub const QUICK_CONJUGATION: &str = "Quick_conjugation";

static PAIR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<i\b[^>]*>(.*?)</i>\s*<b\b[^>]*>\s*(?:<a\b[^>]*>)?(.*?)(?:</a>)?\s*</b>").unwrap()
});

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").unwrap());

static HEADWORD_LINE: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".headword-line").unwrap());

/// One `(meaning, inflected form)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConjugationEntry {
    pub meaning: String,
    pub form: String,
}

impl ConjugationEntry {
    /// Mnemonic shown under the meaning for the forms learners ask about most.
    pub fn gloss(&self) -> Option<&'static str> {
        match self.meaning.as_str() {
            "first-person singular present" => Some("(\"I ___\")"),
            "first-person singular preterite" => Some("(\"I ___ed\")"),
            "past participle" => Some("(\"I have ___ed\")"),
            _ => None,
        }
    }
}

/// Extract every italic-meaning / bold-form pair from headword markup.
pub fn extract_conjugations(html: &str) -> Vec<ConjugationEntry> {
    PAIR_RE
        .captures_iter(html)
        .map(|caps| ConjugationEntry {
            meaning: strip_markup(&caps[1]),
            form: strip_markup(&caps[2]),
        })
        .collect()
}

fn strip_markup(html: &str) -> String {
    let text = TAG_RE.replace_all(html, "");
    unescape(text.trim()).trim().to_string()
}

// Serialized markup escapes only these.
fn unescape(text: &str) -> String {
    text.replace("&nbsp;", "\u{a0}")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&amp;", "&")
}

/// Build tables for every headword line under `root`. Returns how many were built.
pub fn build_headword_tables(dom: &mut DocTree, root: NodeId, rules: &SectionRules) -> usize {
    let setting = rules
        .resolve(QUICK_CONJUGATION)
        .unwrap_or(SectionSetting::AlwaysShow);
    let lines = dom.select(root, &HEADWORD_LINE);

    if setting == SectionSetting::Hide {
        for &line in &lines {
            remove_line(dom, line);
        }
        tracing::debug!(removed = lines.len(), "removed headword lines");
        return 0;
    }

    let mut built = 0;
    for line in lines {
        if !dom.is_attached(line) {
            continue;
        }
        // Glossary labels are tooltips by now; match on what the reader sees.
        let entries = extract_conjugations(&visible_inner_html(dom, line));
        if entries.is_empty() {
            continue;
        }

        let table = render_table(dom, &entries);
        let table = match setting.collapsible() {
            Some(open) => wrap_collapsible(dom, table, open),
            None => table,
        };

        let section = dom.ancestors(line).find(|&a| is_section(dom, a));
        match section {
            Some(section) => insert_after_heading(dom, section, table),
            None => dom.insert_before(line, table),
        }
        remove_line(dom, line);
        built += 1;
    }

    tracing::debug!(tables = built, %setting, "built headword tables");
    built
}

fn render_table(dom: &mut DocTree, entries: &[ConjugationEntry]) -> NodeId {
    let table = dom.create_html_element("table", &[("class", "headword-table")]);
    let tbody = dom.create_html_element("tbody", &[]);
    dom.append(table, tbody);

    let header = dom.create_html_element("tr", &[]);
    for title in ["Tense (Meaning)", "Conjugation"] {
        let th = dom.create_html_element("th", &[]);
        dom.append_text(th, title);
        dom.append(header, th);
    }
    dom.append(tbody, header);

    for entry in entries {
        let row = dom.create_html_element("tr", &[]);
        let meaning = dom.create_html_element("td", &[]);
        dom.append_text(meaning, &entry.meaning);
        if let Some(gloss) = entry.gloss() {
            let br = dom.create_html_element("br", &[]);
            let em = dom.create_html_element("em", &[]);
            dom.append_text(em, gloss);
            dom.append(meaning, br);
            dom.append(meaning, em);
        }
        let form = dom.create_html_element("td", &[]);
        dom.append_text(form, &entry.form);

        dom.append(row, meaning);
        dom.append(row, form);
        dom.append(tbody, row);
    }
    table
}

fn wrap_collapsible(dom: &mut DocTree, table: NodeId, open: bool) -> NodeId {
    let attrs: &[(&str, &str)] = if open {
        &[("class", "quick-conjugation"), ("open", "")]
    } else {
        &[("class", "quick-conjugation")]
    };
    let details = dom.create_html_element("details", attrs);
    let summary = dom.create_html_element("summary", &[]);
    dom.append_text(summary, "Quick Conjugation Table");
    dom.append(details, summary);
    dom.append(details, table);
    details
}

/// Place `node` right after the section's heading.
///
/// A collapsed section keeps its heading in a summary, so the node goes
/// first in the disclosure body; otherwise it follows the heading marker.
fn insert_after_heading(dom: &mut DocTree, section: NodeId, node: NodeId) {
    let Some(heading) = section_heading(dom, section) else {
        dom.prepend(section, node);
        return;
    };

    let summary = dom
        .ancestors(heading)
        .take_while(|&a| a != section)
        .find(|&a| dom.is_tag(a, "summary"));
    if let Some(summary) = summary {
        dom.insert_after(summary, node);
        return;
    }

    let parent = dom.parent(heading);
    let marker = if parent != section && heading_level(dom, parent).is_some() {
        parent
    } else {
        heading
    };
    dom.insert_after(marker, node);
}

fn remove_line(dom: &mut DocTree, line: NodeId) {
    let parent = dom.parent(line);
    dom.detach(line);
    if dom.is_tag(parent, "p") && dom.is_blank(parent) {
        dom.detach(parent);
    }
}
