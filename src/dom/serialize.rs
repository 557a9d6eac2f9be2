//! HTML serialization of [`DocTree`] subtrees via html5ever's serializer.

use std::io;

use html5ever::serialize::{Serialize, SerializeOpts, Serializer, TraversalScope, serialize};

use super::arena::{DocTree, NodeData, NodeId};

/// A subtree handle html5ever can serialize.
pub struct SerializableNode<'a> {
    dom: &'a DocTree,
    id: NodeId,
}

impl<'a> SerializableNode<'a> {
    pub fn new(dom: &'a DocTree, id: NodeId) -> Self {
        Self { dom, id }
    }

    fn serialize_children<S: Serializer>(&self, serializer: &mut S) -> io::Result<()> {
        for child in self.dom.children(self.id) {
            SerializableNode::new(self.dom, child)
                .serialize(serializer, TraversalScope::IncludeNode)?;
        }
        Ok(())
    }
}

impl Serialize for SerializableNode<'_> {
    fn serialize<S>(&self, serializer: &mut S, traversal_scope: TraversalScope) -> io::Result<()>
    where
        S: Serializer,
    {
        let Some(node) = self.dom.get(self.id) else {
            return Ok(());
        };

        if let TraversalScope::ChildrenOnly(_) = traversal_scope {
            return self.serialize_children(serializer);
        }

        match &node.data {
            NodeData::Element { name, attrs, .. } => {
                serializer.start_elem(
                    name.clone(),
                    attrs.iter().map(|a| (&a.name, a.value.as_str())),
                )?;
                self.serialize_children(serializer)?;
                serializer.end_elem(name.clone())
            }
            NodeData::Text(text) => serializer.write_text(text),
            NodeData::Comment(text) => serializer.write_comment(text),
            NodeData::Doctype { name, .. } => serializer.write_doctype(name),
            NodeData::Document => self.serialize_children(serializer),
        }
    }
}

fn to_html(dom: &DocTree, id: NodeId, traversal_scope: TraversalScope) -> String {
    let mut bytes = Vec::new();
    let opts = SerializeOpts {
        traversal_scope,
        ..Default::default()
    };

    if let Err(err) = serialize(&mut bytes, &SerializableNode::new(dom, id), opts) {
        tracing::warn!(%err, "html serialization stopped early");
    }

    String::from_utf8(bytes).unwrap_or_default()
}

impl DocTree {
    /// Markup of the node itself and everything below it.
    pub fn outer_html(&self, id: NodeId) -> String {
        to_html(self, id, TraversalScope::IncludeNode)
    }

    /// Markup of the node's children.
    pub fn inner_html(&self, id: NodeId) -> String {
        to_html(self, id, TraversalScope::ChildrenOnly(None))
    }
}

#[cfg(test)]
mod tests {
    use crate::dom::{DocTree, parse_html};

    #[test]
    fn test_outer_html_round_trips_attributes() {
        let dom = parse_html(r#"<p><a class="word-link" data-word="pomme">pomme</a></p>"#);
        let a = dom.find_by_tag("a").unwrap();
        assert_eq!(
            dom.outer_html(a),
            r#"<a class="word-link" data-word="pomme">pomme</a>"#
        );
    }

    #[test]
    fn test_inner_html_escapes_text() {
        let mut dom = DocTree::new();
        let td = dom.create_html_element("td", &[]);
        dom.append_text(td, "a < b & c");
        assert_eq!(dom.inner_html(td), "a &lt; b &amp; c");
    }

    #[test]
    fn test_void_elements_have_no_end_tag() {
        let mut dom = DocTree::new();
        let td = dom.create_html_element("td", &[]);
        let br = dom.create_html_element("br", &[]);
        dom.append_text(td, "x");
        dom.append(td, br);
        assert_eq!(dom.outer_html(td), "<td>x<br></td>");
    }

    #[test]
    fn test_boolean_attribute() {
        let mut dom = DocTree::new();
        let details = dom.create_html_element("details", &[("open", "")]);
        assert_eq!(dom.outer_html(details), r#"<details open=""></details>"#);
    }
}
