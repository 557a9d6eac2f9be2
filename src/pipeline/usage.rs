//! Usage Label Extractor.
//!
//! Qualifier groups such as `(transitive, colloquial)` are replaced by a
//! flat tag list: `div.usage-tags > span.usage-tag`.

use std::sync::LazyLock;

use crate::dom::{DocTree, NodeId, Selector};

use super::links::visible_text;

static USAGE_GROUP: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".usage-label-sense").unwrap());

static LABEL_CONTENT: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".label-content").unwrap());

/// A `span.usage-tag` for `label`.
pub fn make_tag(dom: &mut DocTree, label: &str) -> NodeId {
    let key = label.to_lowercase();
    let tag = dom.create_html_element(
        "span",
        &[("class", "usage-tag"), ("aria-label", label), ("data-content", key.as_str())],
    );
    dom.append_text(tag, label);
    tag
}

/// Labels of one qualifier group, in order.
///
/// Linked labels (word links and glossary terms) are taken whole; the text
/// between them is split on commas.
pub fn group_labels(dom: &DocTree, group: NodeId) -> Vec<String> {
    let mut labels = Vec::new();
    for content in dom.select(group, &LABEL_CONTENT) {
        let mut pending = String::new();
        collect_labels(dom, content, &mut pending, &mut labels);
        flush_text(&mut pending, &mut labels);
    }
    labels
}

fn collect_labels(dom: &DocTree, node: NodeId, pending: &mut String, labels: &mut Vec<String>) {
    for child in dom.children(node) {
        if dom.is_tag(child, "a") || dom.has_class(child, "glossary-tooltip") {
            flush_text(pending, labels);
            let label = visible_text(dom, child).trim().to_string();
            if !label.is_empty() {
                labels.push(label);
            }
        } else if dom.has_class(child, "ib-comma") || dom.has_class(child, "label-comma") {
            flush_text(pending, labels);
        } else if dom.is_element(child) {
            collect_labels(dom, child, pending, labels);
        } else if dom.is_text(child) {
            pending.push_str(&dom.text(child));
        }
    }
}

fn flush_text(pending: &mut String, labels: &mut Vec<String>) {
    labels.extend(
        pending
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from),
    );
    pending.clear();
}

/// Replace every qualifier group under `root`. Returns the number replaced.
pub fn extract_usage_labels(dom: &mut DocTree, root: NodeId) -> usize {
    let mut replaced = 0;
    for group in dom.select(root, &USAGE_GROUP) {
        if !dom.is_attached(group) {
            continue;
        }
        let labels = group_labels(dom, group);
        if labels.is_empty() {
            continue;
        }

        let list = dom.create_html_element("div", &[("class", "usage-tags")]);
        for label in &labels {
            let tag = make_tag(dom, label);
            dom.append(list, tag);
        }
        dom.insert_after(group, list);
        dom.detach(group);
        replaced += 1;
    }

    tracing::debug!(groups = replaced, "extracted usage labels");
    replaced
}
