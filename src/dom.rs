//! Minimal element tree standing in for the host page's document.
//!
//! Nodes live in an arena owned by [`Document`] and are addressed by
//! [`NodeId`]. Detached nodes stay in the arena; they are simply unreachable
//! from `body`. Lookups with an unknown id return `None`/no-op.

use std::fmt;

/// Opaque handle for an element in a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node:{}", self.0)
    }
}

#[derive(Debug, Clone)]
struct Element {
    tag: String,
    classes: Vec<String>,
    attrs: Vec<(String, String)>,
    text: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Element {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            classes: Vec::new(),
            attrs: Vec::new(),
            text: String::new(),
            parent: None,
            children: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Element>,
    body: NodeId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            nodes: vec![Element::new("body")],
            body: NodeId(0),
        }
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    fn get(&self, id: NodeId) -> Option<&Element> {
        self.nodes.get(id.0)
    }

    fn get_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        self.nodes.get_mut(id.0)
    }

    /// New detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.nodes.push(Element::new(tag));
        NodeId(self.nodes.len() - 1)
    }

    /// Convenience: create `<tag class="...">text</tag>` and append it to `parent`.
    pub fn append_element(
        &mut self,
        parent: NodeId,
        tag: &str,
        classes: &[&str],
        text: &str,
    ) -> NodeId {
        let el = self.create_element(tag);
        for class in classes {
            self.add_class(el, class);
        }
        if !text.is_empty() {
            self.set_text(el, text);
        }
        self.append_child(parent, el);
        el
    }

    /// Append `child` as the last child of `parent`, moving it if already
    /// attached elsewhere. Existing children of `parent` are untouched.
    /// Returns false when either id is unknown or the move would create a cycle.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        if self.get(parent).is_none() || self.get(child).is_none() || self.contains(child, parent)
        {
            return false;
        }
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
        true
    }

    fn detach(&mut self, node: NodeId) {
        if let Some(old) = self.nodes[node.0].parent.take() {
            self.nodes[old.0].children.retain(|c| *c != node);
        }
    }

    /// Detach every child of `node`.
    pub fn remove_children(&mut self, node: NodeId) {
        let Some(el) = self.get_mut(node) else {
            return;
        };
        let children = std::mem::take(&mut el.children);
        for child in children {
            self.nodes[child.0].parent = None;
        }
    }

    pub fn tag(&self, node: NodeId) -> Option<&str> {
        self.get(node).map(|el| el.tag.as_str())
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.get(node).map(|el| el.children.as_slice()).unwrap_or(&[])
    }

    /// Replace the node's content with a single text run.
    pub fn set_text(&mut self, node: NodeId, text: &str) {
        self.remove_children(node);
        if let Some(el) = self.get_mut(node) {
            el.text = text.to_string();
        }
    }

    /// Own text followed by all descendant text, in document order.
    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        for id in self.subtree(node) {
            out.push_str(&self.nodes[id.0].text);
        }
        out
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.get(node)
            .is_some_and(|el| el.classes.iter().any(|c| c == class))
    }

    pub fn add_class(&mut self, node: NodeId, class: &str) {
        if self.has_class(node, class) {
            return;
        }
        if let Some(el) = self.get_mut(node) {
            el.classes.push(class.to_string());
        }
    }

    pub fn remove_class(&mut self, node: NodeId, class: &str) {
        if let Some(el) = self.get_mut(node) {
            el.classes.retain(|c| c != class);
        }
    }

    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(el) = self.get_mut(node) {
            match el.attrs.iter_mut().find(|(k, _)| k == name) {
                Some((_, v)) => *v = value.to_string(),
                None => el.attrs.push((name.to_string(), value.to_string())),
            }
        }
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.get(node)?
            .attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// `node` and its descendants in pre-order.
    fn subtree(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        if self.get(node).is_none() {
            return out;
        }
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.nodes[id.0].children.iter().rev().copied());
        }
        out
    }

    /// Descendants of `root` (excluding `root`) carrying `class`, in document order.
    pub fn query_selector_all(&self, root: NodeId, class: &str) -> Vec<NodeId> {
        self.subtree(root)
            .into_iter()
            .skip(1)
            .filter(|id| self.has_class(*id, class))
            .collect()
    }

    pub fn query_selector(&self, root: NodeId, class: &str) -> Option<NodeId> {
        self.query_selector_all(root, class).into_iter().next()
    }

    /// Nearest inclusive ancestor of `node` carrying `class`.
    pub fn closest(&self, node: NodeId, class: &str) -> Option<NodeId> {
        let mut cur = self.get(node).map(|_| node);
        while let Some(id) = cur {
            if self.has_class(id, class) {
                return Some(id);
            }
            cur = self.nodes[id.0].parent;
        }
        None
    }

    /// Whether `node` is `ancestor` or sits somewhere beneath it.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cur = self.get(node).map(|_| node);
        while let Some(id) = cur {
            if id == ancestor {
                return true;
            }
            cur = self.nodes[id.0].parent;
        }
        false
    }
}
