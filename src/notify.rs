//! Transient toast notifications.
//!
//! At most one toast exists at a time; showing a new one removes the old one
//! immediately. A toast slides in shortly after creation, slides out after a
//! fixed display time or on click, and is removed once the slide-out ends.
//! The owner drives those steps with timers keyed by [`ToastId`], so timers
//! belonging to a replaced toast become no-ops.

#[cfg(test)]
#[path = "notify_test.rs"]
mod notify_test;

use crate::viewport::{NodeId, ViewPort};

const OFFSCREEN: &str = "translateX(400px)";
const ONSCREEN: &str = "translateX(0)";

const BASE_STYLES: [(&str, &str); 11] = [
    ("position", "fixed"),
    ("top", "20px"),
    ("right", "20px"),
    ("padding", "15px 20px"),
    ("border-radius", "10px"),
    ("color", "white"),
    ("font-weight", "500"),
    ("z-index", "10000"),
    ("transition", "transform 0.3s ease"),
    ("max-width", "300px"),
    ("word-wrap", "break-word"),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Success,
    Error,
}

impl NoticeKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Error => "error",
        }
    }

    #[must_use]
    pub fn background(self) -> &'static str {
        match self {
            Self::Info => "linear-gradient(45deg, #3498db, #2980b9)",
            Self::Success => "linear-gradient(45deg, #27ae60, #2ecc71)",
            Self::Error => "linear-gradient(45deg, #e74c3c, #c0392b)",
        }
    }
}

/// Identifies one toast across its timers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ToastId(u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastPhase {
    Entering,
    Shown,
    Leaving,
}

#[derive(Clone, Debug)]
struct Toast {
    id: ToastId,
    node: NodeId,
    phase: ToastPhase,
}

#[derive(Clone, Debug, Default)]
pub struct Notifier {
    current: Option<Toast>,
    next_id: u64,
}

impl Notifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace any existing toast with a new one, parked offscreen.
    ///
    /// Returns `None` when the view tree refuses to create the element.
    pub fn show(&mut self, vp: &mut impl ViewPort, message: &str, kind: NoticeKind) -> Option<ToastId> {
        if let Some(old) = self.current.take() {
            vp.remove(&old.node);
        }
        let class = format!("notification notification-{}", kind.as_str());
        let Some(node) = vp.append_element("div", &class) else {
            log::warn!("notify: could not create toast for {message:?}");
            return None;
        };
        vp.set_text(&node, message);
        vp.set_styles(&node, &BASE_STYLES);
        vp.set_styles(&node, &[("transform", OFFSCREEN), ("background", kind.background())]);

        self.next_id += 1;
        let id = ToastId(self.next_id);
        self.current = Some(Toast { id, node, phase: ToastPhase::Entering });
        log::debug!("notify: {} {message:?}", kind.as_str());
        Some(id)
    }

    /// Slide the toast onscreen.
    pub fn slide_in(&mut self, vp: &mut impl ViewPort, id: ToastId) {
        if let Some(toast) = self.live(id) {
            if toast.phase == ToastPhase::Entering {
                toast.phase = ToastPhase::Shown;
                vp.set_style(&toast.node, "transform", ONSCREEN);
            }
        }
    }

    /// Start sliding the toast out. Returns `true` when the caller should
    /// schedule [`Notifier::remove`].
    pub fn dismiss(&mut self, vp: &mut impl ViewPort, id: ToastId) -> bool {
        let Some(toast) = self.live(id) else {
            return false;
        };
        if toast.phase == ToastPhase::Leaving {
            return false;
        }
        toast.phase = ToastPhase::Leaving;
        vp.set_style(&toast.node, "transform", OFFSCREEN);
        true
    }

    /// Detach the toast from the page.
    pub fn remove(&mut self, vp: &mut impl ViewPort, id: ToastId) {
        if self.current.as_ref().is_some_and(|t| t.id == id) {
            if let Some(toast) = self.current.take() {
                vp.remove(&toast.node);
            }
        }
    }

    /// The toast a click on `target` lands in, if any.
    #[must_use]
    pub fn hit(&self, vp: &impl ViewPort, target: &NodeId) -> Option<ToastId> {
        self.current
            .as_ref()
            .filter(|t| vp.contains(&t.node, target))
            .map(|t| t.id)
    }

    /// Phase and element of the current toast.
    #[must_use]
    pub fn current(&self) -> Option<(ToastId, ToastPhase, &NodeId)> {
        self.current.as_ref().map(|t| (t.id, t.phase, &t.node))
    }

    fn live(&mut self, id: ToastId) -> Option<&mut Toast> {
        self.current.as_mut().filter(|t| t.id == id)
    }
}
