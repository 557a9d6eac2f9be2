//! Sense Grouper.
//!
//! A language with several word senses (etymologies, parts of speech) gets
//! each sense folded into a closed `details.word-sense-group` so the reader
//! can scan them by heading.

use crate::dom::{DocTree, NodeId};

use super::sections::{WORD_SENSE_CLASS, heading_level, section_heading, section_identifier};

/// Headings that make a two-sense language read fine unfolded.
const SINGLE_SENSE_PREFIXES: [&str; 3] = ["Etymology", "Noun", "Verb"];

/// Word-sense containers under `block`, in document order.
pub fn word_senses(dom: &DocTree, block: NodeId) -> Vec<NodeId> {
    dom.descendants(block)
        .into_iter()
        .filter(|&id| dom.is_tag(id, "section") && dom.has_class(id, WORD_SENSE_CLASS))
        .collect()
}

/// Whether the senses of a block should be folded.
pub fn should_group(dom: &DocTree, senses: &[NodeId]) -> bool {
    match senses.len() {
        0 | 1 => false,
        2 => !senses.iter().any(|&sense| {
            let identifier = section_identifier(dom, sense);
            SINGLE_SENSE_PREFIXES
                .iter()
                .any(|prefix| identifier.starts_with(prefix))
        }),
        _ => true,
    }
}

/// Fold every word sense in `block`. Returns the number folded.
pub fn group_senses(dom: &mut DocTree, block: NodeId) -> usize {
    let senses = word_senses(dom, block);
    if !should_group(dom, &senses) {
        tracing::trace!(senses = senses.len(), "senses left unfolded");
        return 0;
    }

    for &sense in &senses {
        wrap_sense(dom, sense);
    }
    tracing::debug!(senses = senses.len(), "grouped word senses");
    senses.len()
}

fn wrap_sense(dom: &mut DocTree, sense: NodeId) {
    let details = dom.create_html_element("details", &[("class", "word-sense-group")]);
    let summary = dom.create_html_element("summary", &[("class", "word-sense-summary")]);

    if let Some(heading) = section_heading(dom, sense) {
        let parent = dom.parent(heading);
        dom.append(summary, heading);

        if dom.is_tag(parent, "summary") {
            // A section disclosure inside the sense would repeat the heading.
            let inner = dom.parent(parent);
            dom.detach(parent);
            if dom.is_tag(inner, "details") {
                dom.unwrap_node(inner);
            }
        } else if parent != sense && heading_level(dom, parent).is_some() {
            dom.detach(parent);
        }
    }

    dom.replace(sense, details);
    dom.append(details, summary);
    dom.append(details, sense);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SectionRules;
    use crate::dom::parse_html;
    use crate::pipeline::sections::segment;
    use crate::pipeline::visibility::apply_visibility;

    fn page(h3s: &[&str]) -> String {
        let mut html = String::from(r#"<div class="mw-parser-output"><div class="mw-heading mw-heading2"><h2 id="Spanish">Spanish</h2></div>"#);
        for id in h3s {
            html.push_str(&format!(
                r#"<div class="mw-heading mw-heading3"><h3 id="{id}">{id}</h3></div><p>{id} body</p>"#
            ));
        }
        html.push_str("</div>");
        html
    }

    fn run(h3s: &[&str], collapse: bool) -> (DocTree, usize) {
        let mut dom = parse_html(&page(h3s));
        let root = dom.find_by_class("mw-parser-output").unwrap();
        segment(&mut dom, root);
        if collapse {
            apply_visibility(&mut dom, root, &SectionRules::default());
        }
        let block = dom.element_children(root)[0];
        let n = group_senses(&mut dom, block);
        (dom, n)
    }

    #[test]
    fn test_two_senses_with_etymology_unfolded() {
        let (dom, n) = run(&["Etymology_1", "Pronunciation"], false);
        assert_eq!(n, 0);
        assert!(dom.find_by_class("word-sense-group").is_none());
    }

    #[test]
    fn test_two_other_senses_folded() {
        let (_, n) = run(&["Adjective", "Adverb"], false);
        assert_eq!(n, 2);
    }

    #[test]
    fn test_single_sense_unfolded() {
        let (_, n) = run(&["Noun"], false);
        assert_eq!(n, 0);
    }

    #[test]
    fn test_three_senses_folded() {
        let (dom, n) = run(&["Etymology_1", "Noun", "Verb"], false);
        assert_eq!(n, 3);

        let groups: Vec<_> = dom
            .descendants(dom.document())
            .into_iter()
            .filter(|&id| dom.has_class(id, "word-sense-group"))
            .collect();
        assert_eq!(groups.len(), 3);
        for group in groups {
            assert_eq!(dom.get_attr(group, "open"), None);
            let summary = dom.element_children(group)[0];
            assert!(dom.has_class(summary, "word-sense-summary"));
            assert!(dom.is_tag(dom.element_children(summary)[0], "h3"));
        }
        assert!(dom.find_by_class("mw-heading3").is_none());
    }

    #[test]
    fn test_section_disclosure_is_unwrapped() {
        let (dom, n) = run(&["Adjective", "Adverb", "Noun"], true);
        assert_eq!(n, 3);
        assert!(dom.find_by_class("section-details").is_none());

        let group = dom.find_by_class("word-sense-group").unwrap();
        let sense = dom.element_children(group)[1];
        assert_eq!(dom.element_id(sense), Some("Adjective"));
        assert_eq!(dom.text(sense), "Adjective body");
    }
}
