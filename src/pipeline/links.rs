//! Link Rewriter.
//!
//! Three outcomes per `<a>`:
//! - `/wiki/Appendix:Glossary#term` with a known term becomes a tooltip
//!   showing the glossary definition;
//! - any other `/wiki/` link becomes an in-app navigation trigger
//!   (`a.word-link[data-word]`, no `href`);
//! - everything else collapses to its text.

use percent_encoding::percent_decode_str;

use crate::api::GLOSSARY_PAGE;
use crate::dom::{DocTree, NodeId, parse_fragment_into};
use crate::glossary::Glossary;

/// Path prefix of in-site article links.
pub const WIKI_PREFIX: &str = "/wiki/";

/// Counts of what the rewriter did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkStats {
    pub tooltips: usize,
    pub word_links: usize,
    pub flattened: usize,
}

/// What a link's `href` points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkTarget {
    /// A term anchor on the glossary page.
    Glossary(String),
    /// Another dictionary entry.
    Word(String),
    External,
}

impl LinkTarget {
    pub fn classify(href: Option<&str>) -> Self {
        let Some(path) = href.and_then(|h| h.strip_prefix(WIKI_PREFIX)) else {
            return Self::External;
        };
        let (page, fragment) = match path.split_once('#') {
            Some((page, fragment)) => (page, Some(fragment)),
            None => (path, None),
        };
        let page = percent_decode_str(page).decode_utf8_lossy().into_owned();
        if page.is_empty() {
            return Self::External;
        }

        match fragment {
            Some(fragment) if page == GLOSSARY_PAGE && !fragment.is_empty() => {
                Self::Glossary(percent_decode_str(fragment).decode_utf8_lossy().into_owned())
            }
            _ => Self::Word(page),
        }
    }
}

/// Rewrite every link under `scope`.
pub fn rewrite_links(dom: &mut DocTree, scope: NodeId, glossary: &Glossary) -> LinkStats {
    let links: Vec<NodeId> = dom
        .descendants(scope)
        .into_iter()
        .filter(|&id| dom.is_tag(id, "a"))
        .collect();

    let mut stats = LinkStats::default();
    for link in links {
        // A link nested in an already flattened link is gone.
        if !dom.is_attached(link) {
            continue;
        }

        let target = LinkTarget::classify(dom.get_attr(link, "href"));
        match target {
            LinkTarget::Glossary(term) => match glossary.lookup(&term) {
                Some(definition) => {
                    make_tooltip(dom, link, definition);
                    stats.tooltips += 1;
                }
                None => {
                    make_word_link(dom, link, GLOSSARY_PAGE);
                    stats.word_links += 1;
                }
            },
            LinkTarget::Word(word) => {
                make_word_link(dom, link, &word);
                stats.word_links += 1;
            }
            LinkTarget::External => {
                let text = dom.text(link);
                let node = dom.create_text(text);
                dom.replace(link, node);
                stats.flattened += 1;
            }
        }
    }

    tracing::debug!(
        tooltips = stats.tooltips,
        word_links = stats.word_links,
        flattened = stats.flattened,
        "rewrote links"
    );
    stats
}

fn make_word_link(dom: &mut DocTree, link: NodeId, word: &str) {
    dom.remove_attr(link, "href");
    dom.remove_attr(link, "title");
    dom.add_class(link, "word-link");
    dom.set_attr(link, "data-word", word);
    dom.set_attr(link, "role", "link");
    dom.set_attr(link, "tabindex", "0");
}

fn make_tooltip(dom: &mut DocTree, link: NodeId, definition: &str) {
    let tooltip = dom.create_html_element("span", &[("class", "glossary-tooltip"), ("tabindex", "0")]);
    let term = dom.create_html_element("span", &[("class", "glossary-term")]);
    let body = dom.create_html_element(
        "span",
        &[("class", "glossary-definition"), ("role", "tooltip")],
    );

    dom.reparent_children(link, term);
    for node in parse_fragment_into(dom, definition) {
        dom.append(body, node);
    }

    dom.append(tooltip, term);
    dom.append(tooltip, body);
    dom.replace(link, tooltip);
}

/// Text a reader sees without opening tooltips.
pub fn visible_text(dom: &DocTree, id: NodeId) -> String {
    dom.text_where(id, |dom, node| !dom.has_class(node, "glossary-definition"))
}

/// Inner markup of `id` with tooltip bodies left out. `id` itself is not modified.
pub fn visible_inner_html(dom: &mut DocTree, id: NodeId) -> String {
    let copy = dom.deep_clone(id);
    for node in dom.descendants(copy) {
        if dom.has_class(node, "glossary-definition") {
            dom.detach(node);
        }
    }
    dom.inner_html(copy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_html;

    fn glossary() -> Glossary {
        [("transitive", "Of a verb, taking a <em>direct object</em>.")]
            .into_iter()
            .collect()
    }

    fn rewrite(html: &str) -> (DocTree, LinkStats) {
        let mut dom = parse_html(html);
        let doc = dom.document();
        let stats = rewrite_links(&mut dom, doc, &glossary());
        (dom, stats)
    }

    #[test]
    fn test_classify() {
        assert_eq!(LinkTarget::classify(Some("/wiki/apple#English")), LinkTarget::Word("apple".into()));
        assert_eq!(LinkTarget::classify(Some("/wiki/ni%C3%B1o")), LinkTarget::Word("niño".into()));
        assert_eq!(
            LinkTarget::classify(Some("/wiki/Appendix:Glossary#transitive")),
            LinkTarget::Glossary("transitive".into())
        );
        assert_eq!(
            LinkTarget::classify(Some("/wiki/Appendix:Glossary")),
            LinkTarget::Word("Appendix:Glossary".into())
        );
        assert_eq!(LinkTarget::classify(Some("https://example.org/")), LinkTarget::External);
        assert_eq!(LinkTarget::classify(Some("/wiki/")), LinkTarget::External);
        assert_eq!(LinkTarget::classify(None), LinkTarget::External);
    }

    #[test]
    fn test_glossary_link_becomes_tooltip() {
        let (dom, stats) = rewrite(r#"<p><a href="/wiki/Appendix:Glossary#transitive" title="x">transitive</a></p>"#);
        assert_eq!(stats.tooltips, 1);
        assert!(dom.find_by_tag("a").is_none());

        let tooltip = dom.find_by_class("glossary-tooltip").unwrap();
        assert_eq!(dom.get_attr(tooltip, "tabindex"), Some("0"));
        let term = dom.find_by_class("glossary-term").unwrap();
        assert_eq!(dom.text(term), "transitive");
        let body = dom.find_by_class("glossary-definition").unwrap();
        assert_eq!(dom.inner_html(body), "Of a verb, taking a <em>direct object</em>.");
        assert_eq!(visible_text(&dom, tooltip), "transitive");
    }

    #[test]
    fn test_unknown_glossary_term_falls_back_to_word_link() {
        let (dom, stats) = rewrite(r#"<a href="/wiki/Appendix:Glossary#nonexistent">x</a>"#);
        assert_eq!(stats.tooltips, 0);
        let a = dom.find_by_tag("a").unwrap();
        assert_eq!(dom.get_attr(a, "data-word"), Some("Appendix:Glossary"));
    }

    #[test]
    fn test_word_link() {
        let (dom, stats) = rewrite(r#"<a href="/wiki/manzana#Spanish" title="manzana" class="x">manzana</a>"#);
        assert_eq!(stats.word_links, 1);

        let a = dom.find_by_tag("a").unwrap();
        assert_eq!(dom.get_attr(a, "href"), None);
        assert_eq!(dom.get_attr(a, "title"), None);
        assert_eq!(dom.get_attr(a, "data-word"), Some("manzana"));
        assert_eq!(dom.get_attr(a, "role"), Some("link"));
        assert!(dom.has_class(a, "word-link"));
        assert!(dom.has_class(a, "x"));
        assert_eq!(dom.text(a), "manzana");
    }

    #[test]
    fn test_other_links_become_text() {
        let (dom, stats) = rewrite(
            r#"<p>see <a href="https://en.wikipedia.org/wiki/Apple" class="extiw"><i>Apple</i></a> and <a name="x">here</a></p>"#,
        );
        assert_eq!(stats.flattened, 2);
        let p = dom.find_by_tag("p").unwrap();
        assert_eq!(dom.inner_html(p), "see Apple and here");
    }

    #[test]
    fn test_visible_inner_html_skips_definitions() {
        let (mut dom, _) = rewrite(r#"<p><i><a href="/wiki/Appendix:Glossary#transitive">transitive</a></i> verb</p>"#);
        let p = dom.find_by_tag("p").unwrap();
        assert_eq!(
            visible_inner_html(&mut dom, p),
            r#"<i><span class="glossary-tooltip" tabindex="0"><span class="glossary-term">transitive</span></span></i> verb"#
        );
        // The tooltip in the page keeps its definition.
        assert!(dom.inner_html(p).contains("direct object"));
    }
}
