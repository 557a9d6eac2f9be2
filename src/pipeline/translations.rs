//! Translation Block Collapser.
//!
//! A translation frame (`div.NavFrame#Translations-…`) lists every language.
//! It becomes a closed `<details>` whose summary shows the sense gloss and
//! one inline entry per display language, in the user's order; the full
//! list moves into the body.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::dom::{DocTree, NodeId, Selector};

use super::links::visible_text;
use super::usage::make_tag;

static FRAME: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"div.NavFrame[id^="Translations-"]"#).unwrap());

static HEAD: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".NavHead").unwrap());

static CONTENT: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".NavContent").unwrap());

static LANGUAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\p{L}[\p{L} \-]*\p{L})\s*:").unwrap());

static GLOSS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)^\((.+?)\)\s*(.*)$").unwrap());

/// Rendered form of one harvested translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslationForm {
    /// A link inside the frame, copied when rendered.
    Link(NodeId),
    Text(String),
}

/// One `(language, form)` pair from a translation list item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationEntry {
    pub language: String,
    pub form: TranslationForm,
}

fn is_list(dom: &DocTree, id: NodeId) -> bool {
    matches!(dom.tag(id), Some("ul" | "ol" | "dl"))
}

/// Text of a list item without its nested lists.
fn own_text(dom: &DocTree, item: NodeId) -> String {
    dom.text_where(item, |dom, node| {
        node == item || (!is_list(dom, node) && !dom.has_class(node, "glossary-definition"))
    })
}

fn own_link(dom: &DocTree, item: NodeId) -> Option<NodeId> {
    let mut stack: Vec<NodeId> = dom.child_vec(item);
    stack.reverse();
    while let Some(id) = stack.pop() {
        if dom.is_tag(id, "a") {
            return Some(id);
        }
        if is_list(dom, id) {
            continue;
        }
        let mut children = dom.child_vec(id);
        children.reverse();
        stack.extend(children);
    }
    None
}

/// Parse one list item, e.g. `French: pomme f`.
pub fn parse_item(dom: &DocTree, item: NodeId) -> Option<TranslationEntry> {
    let text = own_text(dom, item);
    let caps = LANGUAGE_RE.captures(&text)?;
    let language = caps[1].to_string();

    let form = match own_link(dom, item) {
        Some(link) => TranslationForm::Link(link),
        None => {
            let rest = text[caps.get(0)?.end()..].trim();
            if rest.is_empty() {
                return None;
            }
            TranslationForm::Text(rest.to_string())
        }
    };
    Some(TranslationEntry { language, form })
}

/// First entry per language, across every list item under `content`.
pub fn harvest(dom: &DocTree, content: NodeId) -> BTreeMap<String, TranslationForm> {
    let mut found = BTreeMap::new();
    for item in dom.descendants(content) {
        if !dom.is_tag(item, "li") {
            continue;
        }
        if let Some(entry) = parse_item(dom, item) {
            found.entry(entry.language).or_insert(entry.form);
        }
    }
    found
}

/// Split a leading `(gloss)` off a frame head.
pub fn split_gloss(head: &str) -> Option<(String, String)> {
    let (gloss, prefix) = gloss_prefix(head)?;
    Some((gloss, head[prefix..].trim().to_string()))
}

/// The gloss and the byte length of `(gloss) ` at the start of `head`.
fn gloss_prefix(head: &str) -> Option<(String, usize)> {
    let lead = head.len() - head.trim_start().len();
    let caps = GLOSS_RE.captures(head.trim())?;
    Some((caps[1].trim().to_string(), lead + caps.get(2)?.start()))
}

/// Remove the first `len` bytes of visible text under `node`, keeping markup.
fn strip_text_prefix(dom: &mut DocTree, node: NodeId, mut len: usize) {
    let texts: Vec<NodeId> = dom
        .descendants(node)
        .into_iter()
        .filter(|&id| {
            dom.is_text(id) && !dom.ancestors(id).any(|a| dom.has_class(a, "glossary-definition"))
        })
        .collect();

    for id in texts {
        if len == 0 {
            break;
        }
        let text = dom.text_content(id).unwrap_or_default().to_string();
        if text.len() <= len {
            len -= text.len();
            dom.detach(id);
        } else {
            dom.set_text(id, &text[len..]);
            len = 0;
        }
    }
}

/// Collapse every translation frame under `root`. Returns the number collapsed.
pub fn collapse_translations(dom: &mut DocTree, root: NodeId, display_languages: &[String]) -> usize {
    let mut collapsed = 0;
    for frame in dom.select(root, &FRAME) {
        if !dom.is_attached(frame) {
            continue;
        }
        let (Some(head), Some(content)) = (dom.select_first(frame, &HEAD), dom.select_first(frame, &CONTENT)) else {
            tracing::trace!(id = ?dom.element_id(frame), "translation frame without head or content");
            continue;
        };
        collapse_frame(dom, frame, head, content, display_languages);
        collapsed += 1;
    }

    tracing::debug!(frames = collapsed, "collapsed translation frames");
    collapsed
}

fn collapse_frame(
    dom: &mut DocTree,
    frame: NodeId,
    head: NodeId,
    content: NodeId,
    display_languages: &[String],
) {
    let found = harvest(dom, content);

    let details = dom.create_html_element("details", &[("class", "translation-frame")]);
    if let Some(id) = dom.remove_attr(frame, "id") {
        dom.set_attr(details, "id", id);
    }
    let summary = dom.create_html_element("summary", &[("class", "translation-summary")]);
    dom.append(details, summary);

    let head_span = dom.create_html_element("span", &[("class", "translation-head")]);
    for child in dom.child_vec(head) {
        let copy = dom.deep_clone(child);
        dom.append(head_span, copy);
    }
    if let Some((gloss, prefix)) = gloss_prefix(&visible_text(dom, head_span)) {
        let tag = make_tag(dom, &gloss);
        dom.append(summary, tag);
        strip_text_prefix(dom, head_span, prefix);
    }
    dom.append(summary, head_span);

    for language in display_languages {
        let Some(form) = found.get(language) else {
            continue;
        };
        let inline = dom.create_html_element(
            "span",
            &[("class", "translation-inline"), ("data-language", language.as_str())],
        );
        let label = dom.create_html_element("span", &[("class", "translation-language")]);
        dom.append_text(label, language);
        dom.append(inline, label);
        dom.append_text(inline, ": ");
        match form {
            TranslationForm::Link(link) => {
                let copy = dom.deep_clone(*link);
                dom.append(inline, copy);
            }
            TranslationForm::Text(text) => dom.append_text(inline, text),
        }
        dom.append(summary, inline);
    }

    let body = dom.create_html_element("div", &[("class", "translation-body")]);
    dom.append(body, content);
    dom.append(details, body);
    dom.replace(frame, details);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_html;

    const FRAME_HTML: &str = r#"<div class="NavFrame" id="Translations-fruit"><div class="NavHead">(fruit) apple</div><div class="NavContent"><ul>
        <li>French: <span lang="fr"><a class="word-link" data-word="pomme">pomme</a></span> f</li>
        <li>German: <a class="word-link" data-word="Apfel">Apfel</a> m</li>
        <li>Chinese:<ul><li>Mandarin: 蘋果</li></ul></li>
        <li>French: fruit du pommier</li>
        <li>Old English: æppel</li>
        <li>?: nothing</li>
    </ul></div></div>"#;

    fn langs(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn run(display: &[&str]) -> DocTree {
        let mut dom = parse_html(FRAME_HTML);
        let doc = dom.document();
        assert_eq!(collapse_translations(&mut dom, doc, &langs(display)), 1);
        dom
    }

    #[test]
    fn test_harvest_first_per_language() {
        let dom = parse_html(FRAME_HTML);
        let content = dom.find_by_class("NavContent").unwrap();
        let found = harvest(&dom, content);

        let keys: Vec<_> = found.keys().map(String::as_str).collect();
        assert_eq!(keys, ["French", "German", "Mandarin", "Old English"]);
        assert!(matches!(found["French"], TranslationForm::Link(_)));
        assert_eq!(found["Mandarin"], TranslationForm::Text("蘋果".into()));
        assert_eq!(found["Old English"], TranslationForm::Text("æppel".into()));
    }

    #[test]
    fn test_summary_follows_display_order() {
        let dom = run(&["German", "French", "Italian"]);
        let summary = dom.find_by_class("translation-summary").unwrap();
        let inline: Vec<_> = dom
            .element_children(summary)
            .into_iter()
            .filter(|&c| dom.has_class(c, "translation-inline"))
            .map(|c| dom.text(c))
            .collect();
        assert_eq!(inline, ["German: Apfel", "French: pomme"]);
    }

    #[test]
    fn test_frame_structure() {
        let dom = run(&["French"]);
        let details = dom.find_by_class("translation-frame").unwrap();
        assert!(dom.is_tag(details, "details"));
        assert_eq!(dom.get_attr(details, "open"), None);
        assert_eq!(dom.element_id(details), Some("Translations-fruit"));
        assert!(dom.find_by_class("NavFrame").is_none());

        let summary = dom.element_children(details)[0];
        let parts = dom.element_children(summary);
        assert!(dom.has_class(parts[0], "usage-tag"));
        assert_eq!(dom.text(parts[0]), "fruit");
        assert_eq!(dom.text(parts[1]), "apple");

        let body = dom.element_children(details)[1];
        assert!(dom.has_class(body, "translation-body"));
        assert!(dom.text(body).contains("fruit du pommier"));
        // The inline entry is a copy; the original link stays in the body.
        assert_eq!(
            dom.descendants(details).into_iter().filter(|&id| dom.get_attr(id, "data-word") == Some("pomme")).count(),
            2
        );
    }

    #[test]
    fn test_head_without_gloss_is_copied() {
        let mut dom = parse_html(
            r#"<div class="NavFrame" id="Translations-x"><div class="NavHead"><b>to speak</b></div><div class="NavContent"></div></div>"#,
        );
        let doc = dom.document();
        collapse_translations(&mut dom, doc, &[]);
        let head = dom.find_by_class("translation-head").unwrap();
        assert_eq!(dom.inner_html(head), "<b>to speak</b>");
        assert!(dom.find_by_class("usage-tag").is_none());
    }

    #[test]
    fn test_gloss_split_keeps_head_markup() {
        let mut dom = parse_html(
            r#"<div class="NavFrame" id="Translations-x"><div class="NavHead">(fruit) fruit of <i>Malus domestica</i></div><div class="NavContent"></div></div>"#,
        );
        let doc = dom.document();
        collapse_translations(&mut dom, doc, &[]);

        let tag = dom.find_by_class("usage-tag").unwrap();
        assert_eq!(dom.text(tag), "fruit");
        let head = dom.find_by_class("translation-head").unwrap();
        assert_eq!(dom.inner_html(head), "fruit of <i>Malus domestica</i>");
    }

    #[test]
    fn test_other_frames_untouched() {
        let mut dom = parse_html(
            r#"<div class="NavFrame" id="Conjugation-x"><div class="NavHead">x</div><div class="NavContent"></div></div>"#,
        );
        let doc = dom.document();
        assert_eq!(collapse_translations(&mut dom, doc, &langs(&["French"])), 0);
        assert!(dom.find_by_class("NavFrame").is_some());
    }

    #[test]
    fn test_split_gloss() {
        assert_eq!(split_gloss(" (fruit) apple "), Some(("fruit".into(), "apple".into())));
        assert_eq!(split_gloss("(to talk)"), Some(("to talk".into(), String::new())));
        assert_eq!(split_gloss("apple"), None);
    }
}
