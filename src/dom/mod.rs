//! Mutable HTML tree: parsing, querying, editing and serialization.
//!
//! Raw page markup goes through html5ever into a [`DocTree`] arena. Every
//! pipeline stage edits that tree in place; [`DocTree::outer_html`] turns the
//! result back into markup.

mod arena;
mod select;
mod serialize;
mod tree_sink;

pub use arena::{Attribute, ChildrenIter, DocTree, Node, NodeData, NodeId};
pub use select::{NodeRef, PageSelectors, Selector};
pub use serialize::SerializableNode;

use html5ever::driver::ParseOpts;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;

use tree_sink::DocSink;

/// Parse a page (or page fragment) into a tree.
///
/// Fragments are accepted: html5ever supplies the missing `html`/`body`.
pub fn parse_html(html: &str) -> DocTree {
    let sink = DocSink::new();
    parse_document(sink, ParseOpts::default())
        .from_utf8()
        .one(html.as_bytes())
        .into_dom()
}

/// Parse a fragment and copy its body content into `dom`.
///
/// Returns the imported top-level nodes, detached and in source order.
pub fn parse_fragment_into(dom: &mut DocTree, html: &str) -> Vec<NodeId> {
    let fragment = parse_html(html);
    let Some(body) = fragment.find_by_tag("body") else {
        return Vec::new();
    };
    fragment
        .children(body)
        .map(|child| dom.import(&fragment, child))
        .collect()
}
