//! Section Segmenter.
//!
//! Article markup is flat: heading markers (`div.mw-heading3`, or a bare
//! `<h3>`) sit among their content as siblings of one root container. This
//! pass nests that sequence into `<section class="dict-section">`
//! containers, one per heading, so later stages can treat a heading and
//! everything under it as one subtree.
//!
//! The root's children are captured up front and the captured list drives
//! the walk; moving a node into a container never disturbs iteration.

use crate::dom::{DocTree, NodeId};

/// Class carried by every section container.
pub const SECTION_CLASS: &str = "dict-section";

/// Class carried by word-sense containers.
pub const WORD_SENSE_CLASS: &str = "word-sense-content";

/// Heading levels that open a section.
pub const MIN_LEVEL: u8 = 2;
pub const MAX_LEVEL: u8 = 5;

fn tag_level(tag: &str) -> Option<u8> {
    let level: u8 = tag.strip_prefix('h')?.parse().ok()?;
    (1..=6).contains(&level).then_some(level)
}

/// Level of a heading marker, or `None` for ordinary content.
///
/// A marker is either the `mw-headingL` wrapper or a bare `hL` element,
/// with L in 2..=5.
pub fn heading_level(dom: &DocTree, id: NodeId) -> Option<u8> {
    let tag = dom.tag(id)?;
    let level = match tag_level(tag) {
        Some(level) => level,
        None => dom
            .element_classes(id)
            .iter()
            .find_map(|class| class.strip_prefix("mw-heading")?.parse::<u8>().ok())?,
    };
    (MIN_LEVEL..=MAX_LEVEL).contains(&level).then_some(level)
}

/// The `hN` element of a marker: the marker itself, or the first one inside it.
pub fn heading_element(dom: &DocTree, marker: NodeId) -> Option<NodeId> {
    if dom.tag(marker).and_then(tag_level).is_some() {
        return Some(marker);
    }
    dom.descendants(marker)
        .into_iter()
        .find(|&id| dom.tag(id).and_then(tag_level).is_some())
}

/// Node carrying a heading's anchor: the `hN` itself, else a nested `.mw-headline`.
fn anchor_node(dom: &DocTree, heading: NodeId) -> Option<NodeId> {
    if dom.element_id(heading).is_some() {
        return Some(heading);
    }
    dom.descendants(heading)
        .into_iter()
        .find(|&id| dom.has_class(id, "mw-headline") && dom.element_id(id).is_some())
}

pub fn is_section(dom: &DocTree, id: NodeId) -> bool {
    dom.is_tag(id, "section") && dom.has_class(id, SECTION_CLASS)
}

pub fn section_level(dom: &DocTree, section: NodeId) -> Option<u8> {
    if !is_section(dom, section) {
        return None;
    }
    dom.get_attr(section, "data-level")?.parse().ok()
}

/// Every section container under `scope`, in document order.
pub fn sections(dom: &DocTree, scope: NodeId) -> Vec<NodeId> {
    dom.descendants(scope)
        .into_iter()
        .filter(|&id| is_section(dom, id))
        .collect()
}

/// The section's own `hN` element, wherever the later stages moved it.
///
/// It is found in the section's first element child: the heading marker
/// after segmenting, or the summary of a section disclosure after
/// visibility has run.
pub fn section_heading(dom: &DocTree, section: NodeId) -> Option<NodeId> {
    let first = dom.children(section).find(|&c| dom.is_element(c))?;
    if heading_level(dom, first).is_some() {
        return heading_element(dom, first);
    }
    if dom.is_tag(first, "details") {
        let summary = dom.children(first).find(|&c| dom.is_tag(c, "summary"))?;
        return dom
            .descendants(summary)
            .into_iter()
            .find(|&id| dom.tag(id).and_then(tag_level).is_some());
    }
    None
}

/// Identifier used for settings lookup: the section's id, else its
/// heading text with spaces as underscores.
pub fn section_identifier(dom: &DocTree, section: NodeId) -> String {
    if let Some(id) = dom.element_id(section) {
        return id.to_string();
    }
    section_heading(dom, section)
        .map(|h| dom.text(h).trim().replace(' ', "_"))
        .unwrap_or_default()
}

/// Nest the root's flat heading/content sequence into section containers.
///
/// Returns the number of sections created. Content ahead of the first
/// heading stays directly under the root.
pub fn segment(dom: &mut DocTree, root: NodeId) -> usize {
    let items = dom.child_vec(root);
    let mut created = 0;
    let mut cursor = 0;

    while cursor < items.len() {
        match heading_level(dom, items[cursor]) {
            Some(level) => {
                cursor = build_section(dom, &items, cursor, root, level, &mut created);
            }
            None => {
                dom.append(root, items[cursor]);
                cursor += 1;
            }
        }
    }

    tracing::debug!(sections = created, "segmented page");
    created
}

/// Build the section opened by `items[start]` under `parent`; returns the
/// cursor of the first item it did not consume.
fn build_section(
    dom: &mut DocTree,
    items: &[NodeId],
    start: usize,
    parent: NodeId,
    level: u8,
    created: &mut usize,
) -> usize {
    let marker = items[start];
    let level_attr = level.to_string();
    let class = format!("{SECTION_CLASS} level-{level}");
    let container = dom.create_html_element(
        "section",
        &[("class", class.as_str()), ("data-level", level_attr.as_str())],
    );

    // The identifier moves to the container so ids stay unique.
    let anchor = heading_element(dom, marker).and_then(|h| anchor_node(dom, h));
    if let Some(anchor) = anchor
        && let Some(id) = dom.remove_attr(anchor, "id")
    {
        dom.set_attr(container, "id", id);
    }

    dom.append(parent, container);
    dom.append(container, marker);
    *created += 1;

    let identifier = section_identifier(dom, container);
    if level == 3 || (level == 4 && (identifier.starts_with("Noun") || identifier.starts_with("Verb"))) {
        dom.add_class(container, WORD_SENSE_CLASS);
    }

    let mut cursor = start + 1;
    while cursor < items.len() {
        match heading_level(dom, items[cursor]) {
            Some(next) if next <= level => break,
            Some(next) => {
                cursor = build_section(dom, items, cursor, container, next, created);
            }
            None => {
                dom.append(container, items[cursor]);
                cursor += 1;
            }
        }
    }

    tracing::trace!(level, id = %identifier, "section");
    cursor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_html;
    use proptest::prelude::*;

    fn root_of(dom: &DocTree) -> NodeId {
        dom.find_by_class("mw-parser-output").unwrap()
    }

    fn by_id(dom: &DocTree, id: &str) -> NodeId {
        dom.find(|n| matches!(&n.data, crate::dom::NodeData::Element { id: Some(i), .. } if i == id))
            .unwrap()
    }

    const PAGE: &str = r#"<div class="mw-parser-output"><p id="lead">lead</p><div class="mw-heading mw-heading2"><h2 id="English">English</h2></div><p id="e0">intro</p><div class="mw-heading mw-heading3"><h3 id="Etymology_1">Etymology 1</h3></div><p id="e1">from Latin</p><div class="mw-heading mw-heading4"><h4 id="Noun">Noun</h4></div><p id="n1">fruit</p><div class="mw-heading mw-heading3"><h3 id="Etymology_2">Etymology 2</h3></div><p id="e2">other</p><div class="mw-heading mw-heading2"><h2 id="Spanish">Spanish</h2></div><p id="s1">manzana</p></div>"#;

    #[test]
    fn test_nests_by_level() {
        let mut dom = parse_html(PAGE);
        let root = root_of(&dom);
        assert_eq!(segment(&mut dom, root), 5);

        let top: Vec<_> = dom.element_children(root);
        assert_eq!(top.len(), 3);
        assert_eq!(dom.element_id(top[0]), Some("lead"));
        assert_eq!(dom.element_id(top[1]), Some("English"));
        assert_eq!(dom.element_id(top[2]), Some("Spanish"));

        let noun = by_id(&dom, "Noun");
        let ety1 = dom.parent(noun);
        assert_eq!(dom.element_id(ety1), Some("Etymology_1"));
        assert_eq!(dom.element_id(dom.parent(ety1)), Some("English"));
        assert_eq!(section_level(&dom, noun), Some(4));

        let n1 = by_id(&dom, "n1");
        assert_eq!(dom.parent(n1), noun);
        let e2 = by_id(&dom, "e2");
        assert_eq!(dom.element_id(dom.parent(e2)), Some("Etymology_2"));
    }

    #[test]
    fn test_id_moves_to_container() {
        let mut dom = parse_html(PAGE);
        let root = root_of(&dom);
        segment(&mut dom, root);

        let h3 = dom.find_by_tag("h3").unwrap();
        assert_eq!(dom.element_id(h3), None);
        let section = dom.parent(dom.parent(h3));
        assert!(is_section(&dom, section));
        assert_eq!(dom.element_id(section), Some("Etymology_1"));
        assert_eq!(section_heading(&dom, section), Some(h3));
    }

    #[test]
    fn test_word_sense_containers() {
        let mut dom = parse_html(PAGE);
        let root = root_of(&dom);
        segment(&mut dom, root);

        assert!(dom.has_class(by_id(&dom, "Etymology_1"), WORD_SENSE_CLASS));
        assert!(dom.has_class(by_id(&dom, "Noun"), WORD_SENSE_CLASS));
        assert!(!dom.has_class(by_id(&dom, "English"), WORD_SENSE_CLASS));
    }

    #[test]
    fn test_skipped_levels_and_bare_headings() {
        let mut dom = parse_html(
            r#"<div class="mw-parser-output"><h2>Latin</h2><h4 id="Verb">Verb</h4><p>amo</p><h3>Further reading</h3><p>x</p></div>"#,
        );
        let root = root_of(&dom);
        segment(&mut dom, root);

        let verb = by_id(&dom, "Verb");
        let latin = dom.parent(verb);
        assert_eq!(section_level(&dom, latin), Some(2));
        assert_eq!(section_identifier(&dom, latin), "Latin");

        let sections = sections(&dom, root);
        assert_eq!(sections.len(), 3);
        assert_eq!(section_identifier(&dom, sections[2]), "Further_reading");
        assert_eq!(dom.parent(sections[2]), latin);
    }

    #[test]
    fn test_headline_span_identifier() {
        let mut dom = parse_html(
            r#"<div class="mw-parser-output"><h2><span class="mw-headline" id="Italian">Italian</span></h2></div>"#,
        );
        let root = root_of(&dom);
        segment(&mut dom, root);
        let section = sections(&dom, root)[0];
        assert_eq!(dom.element_id(section), Some("Italian"));
        assert!(dom.find_by_class("mw-headline").is_some_and(|s| dom.element_id(s).is_none()));
    }

    fn flat_page(levels: &[(u8, usize)]) -> String {
        let mut html = String::from(r#"<div class="mw-parser-output">"#);
        for (i, &(level, paragraphs)) in levels.iter().enumerate() {
            html.push_str(&format!(
                r#"<div class="mw-heading mw-heading{level}"><h{level} id="s{i}">t{i}</h{level}></div>"#
            ));
            for j in 0..paragraphs {
                html.push_str(&format!(r#"<p id="p{i}_{j}">x</p>"#));
            }
        }
        html.push_str("</div>");
        html
    }

    /// Clamp raw levels so no heading skips a level.
    fn without_skips(raw: &[(u8, usize)]) -> Vec<(u8, usize)> {
        let mut prev = 1;
        raw.iter()
            .map(|&(level, paragraphs)| {
                let level = level.min(prev + 1);
                prev = level;
                (level, paragraphs)
            })
            .collect()
    }

    proptest! {
        #[test]
        fn prop_depth_is_level_minus_one(raw in prop::collection::vec((2u8..=5, 0usize..3), 1..12)) {
            let levels = without_skips(&raw);
            let mut dom = parse_html(&flat_page(&levels));
            let root = root_of(&dom);
            prop_assert_eq!(segment(&mut dom, root), levels.len());

            for section in sections(&dom, root) {
                let depth = 1 + dom.ancestors(section).filter(|&a| is_section(&dom, a)).count();
                let level = section_level(&dom, section).unwrap() as usize;
                prop_assert_eq!(depth, level - 1);
            }
        }

        #[test]
        fn prop_content_kept_once_in_its_section(raw in prop::collection::vec((2u8..=5, 0usize..3), 1..12)) {
            let mut dom = parse_html(&flat_page(&raw));
            let root = root_of(&dom);
            segment(&mut dom, root);

            let paragraphs: Vec<_> = dom
                .descendants(root)
                .into_iter()
                .filter(|&id| dom.is_tag(id, "p"))
                .collect();
            let expected: usize = raw.iter().map(|&(_, n)| n).sum();
            prop_assert_eq!(paragraphs.len(), expected);

            for p in paragraphs {
                let id = dom.element_id(p).unwrap();
                let owner = id[1..].split('_').next().unwrap();
                let expected = format!("s{owner}");
                prop_assert_eq!(dom.element_id(dom.parent(p)), Some(expected.as_str()));
            }
        }
    }

    #[test]
    fn test_heading_level() {
        let dom = parse_html(r#"<div class="mw-heading mw-heading5"></div><h6>x</h6><hr><header></header>"#);
        let body = dom.find_by_tag("body").unwrap();
        let levels: Vec<_> = dom.element_children(body).iter().map(|&c| heading_level(&dom, c)).collect();
        assert_eq!(levels, [Some(5), None, None, None]);
    }
}
