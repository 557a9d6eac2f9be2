//! Arena-based mutable DOM for dictionary pages.
//!
//! html5ever parses into this tree, and every pipeline stage mutates it in
//! place. Nodes live in one contiguous vector and link to each other by index,
//! so detaching a node never frees it: a detached subtree simply stops being
//! reachable from the document root.

use html5ever::{LocalName, Namespace, QualName, ns};

/// Unique identifier for a node in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Sentinel value for no node.
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Check if this is a valid node ID.
    pub fn is_some(&self) -> bool {
        self.0 != u32::MAX
    }

    /// Check if this is the sentinel value.
    pub fn is_none(&self) -> bool {
        self.0 == u32::MAX
    }
}

/// Node payload.
#[derive(Debug, Clone)]
pub enum NodeData {
    /// Document root.
    Document,
    /// Element with name and attributes.
    Element {
        name: QualName,
        attrs: Vec<Attribute>,
        /// Mirror of the `id` attribute.
        id: Option<String>,
        /// Mirror of the `class` attribute, split on whitespace.
        classes: Vec<String>,
    },
    /// Text content.
    Text(String),
    /// Comment.
    Comment(String),
    /// Document type declaration.
    Doctype {
        name: String,
        public_id: String,
        system_id: String,
    },
}

/// HTML attribute.
#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: QualName,
    pub value: String,
}

impl Attribute {
    /// Attribute in the null namespace, which is where every HTML attribute lives.
    pub fn new(name: &str, value: impl Into<String>) -> Self {
        Self {
            name: QualName::new(None, ns!(), LocalName::from(name)),
            value: value.into(),
        }
    }
}

/// A node in the arena.
#[derive(Debug, Clone)]
pub struct Node {
    pub data: NodeData,
    pub parent: NodeId,
    pub first_child: NodeId,
    pub last_child: NodeId,
    pub prev_sibling: NodeId,
    pub next_sibling: NodeId,
}

impl Node {
    fn new(data: NodeData) -> Self {
        Self {
            data,
            parent: NodeId::NONE,
            first_child: NodeId::NONE,
            last_child: NodeId::NONE,
            prev_sibling: NodeId::NONE,
            next_sibling: NodeId::NONE,
        }
    }
}

/// Mutable HTML tree for one parse pass.
#[derive(Debug, Clone)]
pub struct DocTree {
    nodes: Vec<Node>,
    document: NodeId,
}

impl DocTree {
    /// Create a new empty tree with a document root.
    pub fn new() -> Self {
        let mut dom = Self {
            nodes: Vec::new(),
            document: NodeId::NONE,
        };
        dom.document = dom.alloc(Node::new(NodeData::Document));
        dom
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Get the document root ID.
    pub fn document(&self) -> NodeId {
        self.document
    }

    /// Get a node by ID.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        if id.is_none() {
            return None;
        }
        self.nodes.get(id.0 as usize)
    }

    /// Get a mutable node by ID.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        if id.is_none() {
            return None;
        }
        self.nodes.get_mut(id.0 as usize)
    }

    /// Number of allocated nodes, attached or not.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when only the document root exists.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Create a detached element node.
    pub fn create_element(&mut self, name: QualName, attrs: Vec<Attribute>) -> NodeId {
        let mut id = None;
        let mut classes = Vec::new();

        for attr in &attrs {
            match attr.name.local.as_ref() {
                "id" => id = Some(attr.value.clone()),
                "class" => classes = split_classes(&attr.value),
                _ => {}
            }
        }

        self.alloc(Node::new(NodeData::Element {
            name,
            attrs,
            id,
            classes,
        }))
    }

    /// Create a detached HTML element, e.g. `create_html_element("details", &[("open", "")])`.
    pub fn create_html_element(&mut self, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
        let name = QualName::new(None, ns!(html), LocalName::from(tag));
        let attrs = attrs
            .iter()
            .map(|(name, value)| Attribute::new(name, *value))
            .collect();
        self.create_element(name, attrs)
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(Node::new(NodeData::Text(text.into())))
    }

    /// Create a detached comment node.
    pub fn create_comment(&mut self, text: String) -> NodeId {
        self.alloc(Node::new(NodeData::Comment(text)))
    }

    /// Create a detached doctype node.
    pub fn create_doctype(&mut self, name: String, public_id: String, system_id: String) -> NodeId {
        self.alloc(Node::new(NodeData::Doctype {
            name,
            public_id,
            system_id,
        }))
    }

    /// Copy the subtree rooted at `id` into a new detached subtree.
    pub fn deep_clone(&mut self, id: NodeId) -> NodeId {
        let Some(node) = self.get(id) else {
            return NodeId::NONE;
        };
        let data = node.data.clone();
        let children = self.child_vec(id);

        let copy = self.alloc(Node::new(data));
        for child in children {
            let child_copy = self.deep_clone(child);
            self.append(copy, child_copy);
        }
        copy
    }

    /// Copy a subtree out of another tree into this one, detached.
    pub fn import(&mut self, other: &DocTree, id: NodeId) -> NodeId {
        let Some(node) = other.get(id) else {
            return NodeId::NONE;
        };

        let copy = self.alloc(Node::new(node.data.clone()));
        for child in other.children(id) {
            let child_copy = self.import(other, child);
            self.append(copy, child_copy);
        }
        copy
    }

    // ------------------------------------------------------------------
    // Structural mutation
    // ------------------------------------------------------------------

    /// Unlink a node from its parent and siblings. Its own children stay attached to it.
    pub fn detach(&mut self, id: NodeId) {
        let (parent, prev, next) = match self.get(id) {
            Some(n) => (n.parent, n.prev_sibling, n.next_sibling),
            None => return,
        };

        if prev.is_some() {
            if let Some(p) = self.get_mut(prev) {
                p.next_sibling = next;
            }
        } else if let Some(p) = self.get_mut(parent) {
            p.first_child = next;
        }

        if next.is_some() {
            if let Some(n) = self.get_mut(next) {
                n.prev_sibling = prev;
            }
        } else if let Some(p) = self.get_mut(parent) {
            p.last_child = prev;
        }

        if let Some(node) = self.get_mut(id) {
            node.parent = NodeId::NONE;
            node.prev_sibling = NodeId::NONE;
            node.next_sibling = NodeId::NONE;
        }
    }

    /// Append `child` as the last child of `parent`, moving it if already attached.
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        if parent.is_none() || child.is_none() {
            return;
        }
        self.detach(child);

        let last_child = self
            .get(parent)
            .map(|n| n.last_child)
            .unwrap_or(NodeId::NONE);

        if let Some(child_node) = self.get_mut(child) {
            child_node.parent = parent;
            child_node.prev_sibling = last_child;
        }

        if last_child.is_some()
            && let Some(last_node) = self.get_mut(last_child)
        {
            last_node.next_sibling = child;
        }

        if let Some(parent_node) = self.get_mut(parent) {
            if parent_node.first_child.is_none() {
                parent_node.first_child = child;
            }
            parent_node.last_child = child;
        }
    }

    /// Insert `child` as the first child of `parent`.
    pub fn prepend(&mut self, parent: NodeId, child: NodeId) {
        let first = self
            .get(parent)
            .map(|n| n.first_child)
            .unwrap_or(NodeId::NONE);
        if first.is_some() {
            self.insert_before(first, child);
        } else {
            self.append(parent, child);
        }
    }

    /// Insert `new_node` immediately before `sibling`.
    pub fn insert_before(&mut self, sibling: NodeId, new_node: NodeId) {
        if sibling == new_node || new_node.is_none() {
            return;
        }
        self.detach(new_node);

        let (parent, prev) = match self.get(sibling) {
            Some(n) => (n.parent, n.prev_sibling),
            None => return,
        };

        if let Some(new) = self.get_mut(new_node) {
            new.parent = parent;
            new.prev_sibling = prev;
            new.next_sibling = sibling;
        }

        if let Some(sib) = self.get_mut(sibling) {
            sib.prev_sibling = new_node;
        }

        if prev.is_some() {
            if let Some(p) = self.get_mut(prev) {
                p.next_sibling = new_node;
            }
        } else if let Some(par) = self.get_mut(parent) {
            par.first_child = new_node;
        }
    }

    /// Insert `new_node` immediately after `sibling`.
    pub fn insert_after(&mut self, sibling: NodeId, new_node: NodeId) {
        if sibling == new_node {
            return;
        }
        let (parent, next) = match self.get(sibling) {
            Some(n) => (n.parent, n.next_sibling),
            None => return,
        };
        if next.is_some() {
            self.insert_before(next, new_node);
        } else {
            self.append(parent, new_node);
        }
    }

    /// Put `new_node` where `old` is and detach `old`.
    pub fn replace(&mut self, old: NodeId, new_node: NodeId) {
        self.insert_before(old, new_node);
        self.detach(old);
    }

    /// Move every child of `from` to the end of `to`, preserving order.
    pub fn reparent_children(&mut self, from: NodeId, to: NodeId) {
        for child in self.child_vec(from) {
            self.append(to, child);
        }
    }

    /// Replace `id` with its own children.
    pub fn unwrap_node(&mut self, id: NodeId) {
        for child in self.child_vec(id) {
            self.insert_before(id, child);
        }
        self.detach(id);
    }

    /// Append text to an existing trailing text node, or create one.
    pub fn append_text(&mut self, parent: NodeId, text: &str) {
        let last_child = self
            .get(parent)
            .map(|n| n.last_child)
            .unwrap_or(NodeId::NONE);

        if let Some(last) = self.get_mut(last_child)
            && let NodeData::Text(ref mut existing) = last.data
        {
            existing.push_str(text);
            return;
        }

        let text_node = self.create_text(text);
        self.append(parent, text_node);
    }

    // ------------------------------------------------------------------
    // Traversal
    // ------------------------------------------------------------------

    /// Iterate over children of a node.
    pub fn children(&self, parent: NodeId) -> ChildrenIter<'_> {
        let first = self
            .get(parent)
            .map(|n| n.first_child)
            .unwrap_or(NodeId::NONE);
        ChildrenIter {
            dom: self,
            current: first,
        }
    }

    /// Snapshot of a node's children, safe to hold across mutation.
    pub fn child_vec(&self, parent: NodeId) -> Vec<NodeId> {
        self.children(parent).collect()
    }

    /// Element children only.
    pub fn element_children(&self, parent: NodeId) -> Vec<NodeId> {
        self.children(parent)
            .filter(|&c| self.is_element(c))
            .collect()
    }

    /// All descendants of `scope` in document order, excluding `scope` itself.
    pub fn descendants(&self, scope: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.child_vec(scope);
        stack.reverse();
        while let Some(id) = stack.pop() {
            out.push(id);
            let mut children = self.child_vec(id);
            children.reverse();
            stack.extend(children);
        }
        out
    }

    /// Parent chain of a node, nearest first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let mut current = self.parent(id);
        std::iter::from_fn(move || {
            if current.is_none() {
                return None;
            }
            let id = current;
            current = self.parent(id);
            Some(id)
        })
    }

    /// Parent of a node, or `NodeId::NONE`.
    pub fn parent(&self, id: NodeId) -> NodeId {
        self.get(id).map(|n| n.parent).unwrap_or(NodeId::NONE)
    }

    /// Next sibling element, skipping text and comments.
    pub fn next_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let mut current = self.get(id)?.next_sibling;
        while current.is_some() {
            if self.is_element(current) {
                return Some(current);
            }
            current = self.get(current)?.next_sibling;
        }
        None
    }

    /// True when the node is reachable from the document root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        id == self.document || self.ancestors(id).any(|a| a == self.document)
    }

    /// Find the first node matching a predicate (DFS, document order).
    pub fn find<F>(&self, predicate: F) -> Option<NodeId>
    where
        F: Fn(&Node) -> bool,
    {
        let mut stack = vec![self.document];
        while let Some(id) = stack.pop() {
            if let Some(node) = self.get(id) {
                if predicate(node) {
                    return Some(id);
                }
                let mut children = self.child_vec(id);
                children.reverse();
                stack.extend(children);
            }
        }
        None
    }

    /// Find element by tag name (first match).
    pub fn find_by_tag(&self, tag: &str) -> Option<NodeId> {
        self.find(|node| match &node.data {
            NodeData::Element { name, .. } => name.local.as_ref() == tag,
            _ => false,
        })
    }

    /// Find the first element carrying a class (first match).
    pub fn find_by_class(&self, class: &str) -> Option<NodeId> {
        self.find(|node| match &node.data {
            NodeData::Element { classes, .. } => classes.iter().any(|c| c == class),
            _ => false,
        })
    }
}

impl Default for DocTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over children of a node.
pub struct ChildrenIter<'a> {
    dom: &'a DocTree,
    current: NodeId,
}

impl Iterator for ChildrenIter<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current.is_none() {
            return None;
        }
        let id = self.current;
        self.current = self
            .dom
            .get(id)
            .map(|n| n.next_sibling)
            .unwrap_or(NodeId::NONE);
        Some(id)
    }
}

/// Element accessors and attribute editing.
impl DocTree {
    /// Get element's local name (tag).
    pub fn element_name(&self, id: NodeId) -> Option<&LocalName> {
        self.get(id).and_then(|n| match &n.data {
            NodeData::Element { name, .. } => Some(&name.local),
            _ => None,
        })
    }

    /// Tag name as a string slice.
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.element_name(id).map(|n| n.as_ref())
    }

    /// True when the node is an element with the given tag.
    pub fn is_tag(&self, id: NodeId, tag: &str) -> bool {
        self.tag(id) == Some(tag)
    }

    /// Get element's namespace.
    pub fn element_namespace(&self, id: NodeId) -> Option<&Namespace> {
        self.get(id).and_then(|n| match &n.data {
            NodeData::Element { name, .. } => Some(&name.ns),
            _ => None,
        })
    }

    /// Get an attribute value.
    pub fn get_attr(&self, id: NodeId, attr_name: &str) -> Option<&str> {
        self.get(id).and_then(|n| match &n.data {
            NodeData::Element { attrs, .. } => attrs
                .iter()
                .find(|a| a.name.local.as_ref() == attr_name)
                .map(|a| a.value.as_str()),
            _ => None,
        })
    }

    /// Set or overwrite an attribute, keeping the id/class mirrors current.
    pub fn set_attr(&mut self, id: NodeId, attr_name: &str, value: impl Into<String>) {
        let value = value.into();
        let Some(node) = self.get_mut(id) else {
            return;
        };
        let NodeData::Element {
            attrs,
            id: elem_id,
            classes,
            ..
        } = &mut node.data
        else {
            return;
        };

        match attr_name {
            "id" => *elem_id = Some(value.clone()),
            "class" => *classes = split_classes(&value),
            _ => {}
        }

        if let Some(existing) = attrs.iter_mut().find(|a| a.name.local.as_ref() == attr_name) {
            existing.value = value;
        } else {
            attrs.push(Attribute::new(attr_name, value));
        }
    }

    /// Remove an attribute, returning its old value.
    pub fn remove_attr(&mut self, id: NodeId, attr_name: &str) -> Option<String> {
        let node = self.get_mut(id)?;
        let NodeData::Element {
            attrs,
            id: elem_id,
            classes,
            ..
        } = &mut node.data
        else {
            return None;
        };

        match attr_name {
            "id" => *elem_id = None,
            "class" => classes.clear(),
            _ => {}
        }

        let pos = attrs.iter().position(|a| a.name.local.as_ref() == attr_name)?;
        Some(attrs.remove(pos).value)
    }

    /// Get element's id attribute.
    pub fn element_id(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.data {
            NodeData::Element { id, .. } => id.as_deref(),
            _ => None,
        })
    }

    /// Get element's classes.
    pub fn element_classes(&self, id: NodeId) -> &[String] {
        static EMPTY: &[String] = &[];
        self.get(id)
            .and_then(|n| match &n.data {
                NodeData::Element { classes, .. } => Some(classes.as_slice()),
                _ => None,
            })
            .unwrap_or(EMPTY)
    }

    /// Check for a class on an element.
    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.element_classes(id).iter().any(|c| c == class)
    }

    /// Add a class if not already present.
    pub fn add_class(&mut self, id: NodeId, class: &str) {
        if !self.is_element(id) || self.has_class(id, class) {
            return;
        }
        let mut classes = self.element_classes(id).to_vec();
        classes.push(class.to_string());
        self.set_attr(id, "class", classes.join(" "));
    }

    /// Check if node is an element.
    pub fn is_element(&self, id: NodeId) -> bool {
        self.get(id)
            .is_some_and(|n| matches!(n.data, NodeData::Element { .. }))
    }

    /// Check if node is a text node.
    pub fn is_text(&self, id: NodeId) -> bool {
        self.get(id)
            .is_some_and(|n| matches!(n.data, NodeData::Text(_)))
    }

    /// Get text content of a text node.
    pub fn text_content(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.data {
            NodeData::Text(s) => Some(s.as_str()),
            _ => None,
        })
    }

    /// Replace the text of a text node. Other nodes are left alone.
    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) -> bool {
        match self.get_mut(id).map(|n| &mut n.data) {
            Some(NodeData::Text(existing)) => {
                *existing = text.into();
                true
            }
            _ => false,
        }
    }

    /// Concatenated text of a node and all its descendants.
    pub fn text(&self, id: NodeId) -> String {
        self.text_where(id, |_, _| true)
    }

    /// Concatenated text, skipping any subtree whose root fails `keep`.
    pub fn text_where<F>(&self, id: NodeId, keep: F) -> String
    where
        F: Fn(&DocTree, NodeId) -> bool,
    {
        let mut out = String::new();
        self.collect_text(id, &keep, &mut out);
        out
    }

    fn collect_text<F>(&self, id: NodeId, keep: &F, out: &mut String)
    where
        F: Fn(&DocTree, NodeId) -> bool,
    {
        if !keep(self, id) {
            return;
        }
        if let Some(text) = self.text_content(id) {
            out.push_str(text);
            return;
        }
        for child in self.children(id) {
            self.collect_text(child, keep, out);
        }
    }

    /// True when the node has no element children and only whitespace text.
    pub fn is_blank(&self, id: NodeId) -> bool {
        self.children(id).all(|c| match self.get(c).map(|n| &n.data) {
            Some(NodeData::Text(t)) => t.trim().is_empty(),
            Some(NodeData::Comment(_)) => true,
            _ => false,
        })
    }
}

fn split_classes(value: &str) -> Vec<String> {
    value.split_whitespace().map(|s| s.to_string()).collect()
}
