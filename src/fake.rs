//! In-memory view tree for driving the core without a browser.
//!
//! Elements are inserted with explicit document-relative geometry; the scroll
//! offset and viewport height are plain fields the caller controls. Selector
//! support covers what the site needs: `#id`, `#id.class`, `.class`, `tag`,
//! `tag.class`, and a single descendant step (`#parent tag`).

#[cfg(test)]
#[path = "fake_test.rs"]
mod fake_test;

use std::collections::BTreeMap;

use crate::viewport::{NodeId, Rect, ScrollBehavior, ViewPort};

/// One element in the fake tree.
#[derive(Clone, Debug, Default)]
pub struct FakeNode {
    pub tag: String,
    pub classes: Vec<String>,
    pub attributes: BTreeMap<String, String>,
    pub styles: BTreeMap<String, String>,
    pub text: String,
    pub value: String,
    pub disabled: bool,
    pub top: f64,
    pub height: f64,
    parent: Option<NodeId>,
    attached: bool,
}

impl FakeNode {
    #[must_use]
    pub fn new(tag: &str) -> Self {
        Self { tag: tag.to_owned(), attached: true, ..Self::default() }
    }

    #[must_use]
    pub fn id(self, id: &str) -> Self {
        self.attr("id", id)
    }

    #[must_use]
    pub fn class(mut self, class: &str) -> Self {
        self.classes.push(class.to_owned());
        self
    }

    #[must_use]
    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_owned(), value.to_owned());
        self
    }

    #[must_use]
    pub fn text(mut self, text: &str) -> Self {
        self.text = text.to_owned();
        self
    }

    #[must_use]
    pub fn value(mut self, value: &str) -> Self {
        self.value = value.to_owned();
        self
    }

    /// Document-relative top and height.
    #[must_use]
    pub fn geometry(mut self, top: f64, height: f64) -> Self {
        self.top = top;
        self.height = height;
        self
    }

    fn matches(&self, simple: &str) -> bool {
        if let Some(compound) = simple.strip_prefix('#') {
            // Mirrors `querySelector`, which rejects ids starting with a digit.
            if compound.starts_with(|c: char| c.is_ascii_digit()) {
                return false;
            }
            let (id, class) = match compound.split_once('.') {
                Some((id, class)) => (id, Some(class)),
                None => (compound, None),
            };
            return self.attributes.get("id").is_some_and(|v| v == id)
                && class.is_none_or(|class| self.classes.iter().any(|c| c == class));
        }
        if let Some(class) = simple.strip_prefix('.') {
            return self.classes.iter().any(|c| c == class);
        }
        match simple.split_once('.') {
            Some((tag, class)) => self.tag == tag && self.classes.iter().any(|c| c == class),
            None => self.tag == simple,
        }
    }
}

/// A [`ViewPort`] backed by plain maps.
#[derive(Clone, Debug)]
pub struct FakeViewPort {
    nodes: BTreeMap<NodeId, FakeNode>,
    order: Vec<NodeId>,
    next_id: u64,
    root: NodeId,
    body: NodeId,
    pub scroll: f64,
    pub viewport_height: f64,
    /// Every `scroll_to` request, oldest first.
    pub scroll_requests: Vec<(f64, ScrollBehavior)>,
}

impl Default for FakeViewPort {
    fn default() -> Self {
        Self::new(800.0)
    }
}

impl FakeViewPort {
    /// An empty document with an `<html>` root and a `<body>`.
    #[must_use]
    pub fn new(viewport_height: f64) -> Self {
        let mut tree = Self {
            nodes: BTreeMap::new(),
            order: Vec::new(),
            next_id: 0,
            root: NodeId::new(""),
            body: NodeId::new(""),
            scroll: 0.0,
            viewport_height,
            scroll_requests: Vec::new(),
        };
        let root = tree.push(FakeNode::new("html"), None);
        let body = tree.push(FakeNode::new("body"), Some(root.clone()));
        tree.root = root;
        tree.body = body;
        tree
    }

    /// Append `node` to the body.
    pub fn insert(&mut self, node: FakeNode) -> NodeId {
        let body = self.body.clone();
        self.push(node, Some(body))
    }

    /// Append `node` under `parent`.
    pub fn insert_child(&mut self, parent: &NodeId, node: FakeNode) -> NodeId {
        self.push(node, Some(parent.clone()))
    }

    #[must_use]
    pub fn node(&self, id: &NodeId) -> Option<&FakeNode> {
        self.nodes.get(id)
    }

    pub fn node_mut(&mut self, id: &NodeId) -> Option<&mut FakeNode> {
        self.nodes.get_mut(id)
    }

    /// Inline style value, if set.
    #[must_use]
    pub fn style(&self, id: &NodeId, property: &str) -> Option<&str> {
        self.nodes.get(id)?.styles.get(property).map(String::as_str)
    }

    #[must_use]
    pub fn is_disabled(&self, id: &NodeId) -> bool {
        self.nodes.get(id).is_some_and(|n| n.disabled)
    }

    #[must_use]
    pub fn parent(&self, id: &NodeId) -> Option<NodeId> {
        self.nodes.get(id)?.parent.clone()
    }

    /// Move an element to a new document-relative top.
    pub fn set_top(&mut self, id: &NodeId, top: f64) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.top = top;
        }
    }

    fn push(&mut self, mut node: FakeNode, parent: Option<NodeId>) -> NodeId {
        self.next_id += 1;
        let id = NodeId::new(format!("n{}", self.next_id));
        node.parent = parent;
        node.attached = true;
        self.nodes.insert(id.clone(), node);
        self.order.push(id.clone());
        id
    }

    fn attached_in_order(&self) -> impl Iterator<Item = (&NodeId, &FakeNode)> {
        self.order
            .iter()
            .filter_map(|id| self.nodes.get(id).map(|n| (id, n)))
            .filter(|(_, n)| n.attached)
    }

    fn is_descendant(&self, ancestor: &NodeId, node: &NodeId) -> bool {
        let mut cursor = Some(node.clone());
        while let Some(id) = cursor {
            if &id == ancestor {
                return true;
            }
            cursor = self.nodes.get(&id).and_then(|n| n.parent.clone());
        }
        false
    }

    fn matching(&self, selector: &str) -> Vec<NodeId> {
        let mut steps = selector.split_whitespace();
        let Some(first) = steps.next() else {
            return Vec::new();
        };
        let mut current: Vec<NodeId> = self
            .attached_in_order()
            .filter(|(_, n)| n.matches(first))
            .map(|(id, _)| id.clone())
            .collect();
        for step in steps {
            current = self
                .attached_in_order()
                .filter(|(id, n)| {
                    n.matches(step) && current.iter().any(|scope| scope != *id && self.is_descendant(scope, id))
                })
                .map(|(id, _)| id.clone())
                .collect();
        }
        current
    }
}

impl ViewPort for FakeViewPort {
    fn select(&self, selector: &str) -> Option<NodeId> {
        self.matching(selector).into_iter().next()
    }

    fn select_all(&self, selector: &str) -> Vec<NodeId> {
        self.matching(selector)
    }

    fn by_id(&self, id: &str) -> Option<NodeId> {
        self.attached_in_order()
            .find(|(_, n)| n.attributes.get("id").is_some_and(|v| v == id))
            .map(|(id, _)| id.clone())
    }

    fn select_within(&self, scope: &NodeId, selector: &str) -> Option<NodeId> {
        self.matching(selector)
            .into_iter()
            .find(|id| id != scope && self.is_descendant(scope, id))
    }

    fn root(&self) -> NodeId {
        self.root.clone()
    }

    fn body(&self) -> NodeId {
        self.body.clone()
    }

    fn contains(&self, ancestor: &NodeId, node: &NodeId) -> bool {
        self.is_descendant(ancestor, node)
    }

    fn is_attached(&self, node: &NodeId) -> bool {
        self.nodes.get(node).is_some_and(|n| n.attached)
    }

    fn scroll_offset(&self) -> f64 {
        self.scroll
    }

    fn viewport_height(&self) -> f64 {
        self.viewport_height
    }

    fn extent(&self, node: &NodeId) -> Rect {
        self.nodes
            .get(node)
            .map_or_else(Rect::default, |n| Rect::new(n.top, n.height))
    }

    fn bounding_rect(&self, node: &NodeId) -> Rect {
        let extent = self.extent(node);
        Rect::new(extent.top - self.scroll, extent.height)
    }

    fn has_class(&self, node: &NodeId, class: &str) -> bool {
        self.nodes
            .get(node)
            .is_some_and(|n| n.classes.iter().any(|c| c == class))
    }

    fn add_class(&mut self, node: &NodeId, class: &str) {
        if let Some(n) = self.nodes.get_mut(node) {
            if !n.classes.iter().any(|c| c == class) {
                n.classes.push(class.to_owned());
            }
        }
    }

    fn remove_class(&mut self, node: &NodeId, class: &str) {
        if let Some(n) = self.nodes.get_mut(node) {
            n.classes.retain(|c| c != class);
        }
    }

    fn set_class_name(&mut self, node: &NodeId, class_name: &str) {
        if let Some(n) = self.nodes.get_mut(node) {
            n.classes = class_name.split_whitespace().map(str::to_owned).collect();
        }
    }

    fn attribute(&self, node: &NodeId, name: &str) -> Option<String> {
        self.nodes.get(node)?.attributes.get(name).cloned()
    }

    fn set_attribute(&mut self, node: &NodeId, name: &str, value: &str) {
        if let Some(n) = self.nodes.get_mut(node) {
            n.attributes.insert(name.to_owned(), value.to_owned());
        }
    }

    fn set_style(&mut self, node: &NodeId, property: &str, value: &str) {
        if let Some(n) = self.nodes.get_mut(node) {
            if value.is_empty() {
                n.styles.remove(property);
            } else {
                n.styles.insert(property.to_owned(), value.to_owned());
            }
        }
    }

    fn text(&self, node: &NodeId) -> String {
        self.nodes.get(node).map(|n| n.text.clone()).unwrap_or_default()
    }

    fn set_text(&mut self, node: &NodeId, text: &str) {
        if let Some(n) = self.nodes.get_mut(node) {
            n.text = text.to_owned();
        }
    }

    fn value(&self, node: &NodeId) -> String {
        self.nodes.get(node).map(|n| n.value.clone()).unwrap_or_default()
    }

    fn set_value(&mut self, node: &NodeId, value: &str) {
        if let Some(n) = self.nodes.get_mut(node) {
            n.value = value.to_owned();
        }
    }

    fn set_disabled(&mut self, node: &NodeId, disabled: bool) {
        if let Some(n) = self.nodes.get_mut(node) {
            n.disabled = disabled;
        }
    }

    fn append_element(&mut self, tag: &str, class_name: &str) -> Option<NodeId> {
        let mut node = FakeNode::new(tag);
        node.classes = class_name.split_whitespace().map(str::to_owned).collect();
        Some(self.insert(node))
    }

    fn remove(&mut self, node: &NodeId) {
        let doomed: Vec<NodeId> = self
            .order
            .iter()
            .filter(|id| self.is_descendant(node, id))
            .cloned()
            .collect();
        for id in doomed {
            if let Some(n) = self.nodes.get_mut(&id) {
                n.attached = false;
            }
        }
    }

    fn scroll_to(&mut self, top: f64, behavior: ScrollBehavior) {
        self.scroll_requests.push((top, behavior));
        self.scroll = top.max(0.0);
    }
}
