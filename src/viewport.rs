//! The view-tree capability consumed by every feature.
//!
//! The core never touches the page directly. It reads geometry and element
//! existence through [`ViewPort`] and writes presentation state (classes,
//! attributes, inline styles, text) back through it. The browser host
//! implements it over `web_sys`; tests use [`crate::fake::FakeViewPort`].

#[cfg(test)]
#[path = "viewport_test.rs"]
mod viewport_test;

/// Opaque handle to an element in the view tree.
///
/// Handles are stable: selecting the same element twice yields equal ids.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(String);

impl NodeId {
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Vertical extent of an element.
///
/// Depending on the query this is document-relative ([`ViewPort::extent`]) or
/// viewport-relative ([`ViewPort::bounding_rect`]).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub top: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub fn new(top: f64, height: f64) -> Self {
        Self { top, height }
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Half-open containment: `top <= y < top + height`.
    #[must_use]
    pub fn contains(&self, y: f64) -> bool {
        y >= self.top && y < self.bottom()
    }
}

/// Walk from `start` through `parent` and return the first handle `known` yields.
///
/// Event targets resolve this way so that arbitrary page elements never need
/// handles of their own: any known element contains the raw target exactly
/// when it contains the closest known ancestor.
pub fn closest_known<N>(
    start: Option<N>,
    parent: impl Fn(&N) -> Option<N>,
    known: impl Fn(&N) -> Option<NodeId>,
) -> Option<NodeId> {
    let mut cursor = start;
    while let Some(node) = cursor {
        if let Some(id) = known(&node) {
            return Some(id);
        }
        cursor = parent(&node);
    }
    None
}

/// How a programmatic scroll should move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollBehavior {
    Smooth,
    Instant,
}

/// Read/write access to the rendered page.
pub trait ViewPort {
    // --- Lookup ---

    /// First element matching `selector`.
    fn select(&self, selector: &str) -> Option<NodeId>;

    /// Every element matching `selector`, in document order.
    fn select_all(&self, selector: &str) -> Vec<NodeId>;

    /// The element whose `id` attribute is exactly `id`.
    ///
    /// Unlike `select("#...")` this accepts ids that are not valid CSS
    /// identifiers, such as `2024-recap`.
    fn by_id(&self, id: &str) -> Option<NodeId>;

    /// First descendant of `scope` matching `selector`.
    fn select_within(&self, scope: &NodeId, selector: &str) -> Option<NodeId>;

    /// The document's root element (`<html>`).
    fn root(&self) -> NodeId;

    /// The document body.
    fn body(&self) -> NodeId;

    /// Whether `node` is `ancestor` or one of its descendants.
    fn contains(&self, ancestor: &NodeId, node: &NodeId) -> bool;

    /// Whether `node` is still attached to the document.
    fn is_attached(&self, node: &NodeId) -> bool;

    // --- Geometry ---

    /// Current vertical scroll offset of the document.
    fn scroll_offset(&self) -> f64;

    /// Height of the visible viewport.
    fn viewport_height(&self) -> f64;

    /// Document-relative vertical extent of `node`.
    fn extent(&self, node: &NodeId) -> Rect;

    /// Viewport-relative vertical extent of `node`.
    fn bounding_rect(&self, node: &NodeId) -> Rect;

    // --- Presentation state ---

    fn has_class(&self, node: &NodeId, class: &str) -> bool;
    fn add_class(&mut self, node: &NodeId, class: &str);
    fn remove_class(&mut self, node: &NodeId, class: &str);

    /// Replace the whole class list.
    fn set_class_name(&mut self, node: &NodeId, class_name: &str);

    fn attribute(&self, node: &NodeId, name: &str) -> Option<String>;
    fn set_attribute(&mut self, node: &NodeId, name: &str, value: &str);

    /// Set an inline style property; an empty value clears it.
    fn set_style(&mut self, node: &NodeId, property: &str, value: &str);

    fn text(&self, node: &NodeId) -> String;
    fn set_text(&mut self, node: &NodeId, text: &str);

    /// Current value of a form control.
    fn value(&self, node: &NodeId) -> String;
    fn set_value(&mut self, node: &NodeId, value: &str);

    fn set_disabled(&mut self, node: &NodeId, disabled: bool);

    // --- Structure ---

    /// Create an element with the given class list and append it to the body.
    fn append_element(&mut self, tag: &str, class_name: &str) -> Option<NodeId>;

    /// Detach `node` from the document. No-op if already detached.
    fn remove(&mut self, node: &NodeId);

    // --- Scrolling ---

    fn scroll_to(&mut self, top: f64, behavior: ScrollBehavior);

    // --- Provided ---

    /// Add or remove `class` depending on `on`.
    fn toggle_class(&mut self, node: &NodeId, class: &str, on: bool) {
        if on {
            self.add_class(node, class);
        } else {
            self.remove_class(node, class);
        }
    }

    /// Set several inline style properties in order.
    fn set_styles(&mut self, node: &NodeId, styles: &[(&str, &str)]) {
        for (property, value) in styles {
            self.set_style(node, property, value);
        }
    }
}
