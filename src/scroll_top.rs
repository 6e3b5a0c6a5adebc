//! Floating scroll-to-top button.
//!
//! Visibility is a pure function of the scroll offset; the only other state
//! is the derived flag, kept to avoid rewriting identical styles.

#[cfg(test)]
#[path = "scroll_top_test.rs"]
mod scroll_top_test;

use crate::config::SiteConfig;
use crate::error::{Result, SiteError};
use crate::viewport::{NodeId, ScrollBehavior, ViewPort};

const DEFAULT_CLASS: &str = "scroll-top-btn";

const BASE_STYLES: [(&str, &str); 12] = [
    ("position", "fixed"),
    ("bottom", "30px"),
    ("right", "30px"),
    ("width", "50px"),
    ("height", "50px"),
    ("border", "none"),
    ("border-radius", "50%"),
    ("color", "white"),
    ("cursor", "pointer"),
    ("z-index", "999"),
    ("transition", "all 0.3s ease"),
    ("box-shadow", "0 4px 15px rgba(52, 152, 219, 0.3)"),
];

/// Whether the button should show at `offset`.
#[must_use]
pub fn visible_at(offset: f64, threshold: f64) -> bool {
    offset > threshold
}

#[derive(Clone, Debug)]
pub struct ScrollTop {
    button: NodeId,
    threshold: f64,
    visible: Option<bool>,
}

impl ScrollTop {
    /// Use the page's button, or create one when the page has none.
    ///
    /// # Errors
    ///
    /// [`SiteError::MissingElement`] when the button is absent and cannot be created.
    pub fn init(vp: &mut impl ViewPort, config: &SiteConfig) -> Result<Self> {
        let selector = &config.selectors.scroll_top;
        let button = match vp.select(selector) {
            Some(button) => button,
            None => {
                let class = selector.strip_prefix('.').unwrap_or(DEFAULT_CLASS);
                let button = vp
                    .append_element("button", class)
                    .ok_or_else(|| SiteError::missing("scroll_top", selector))?;
                vp.set_attribute(&button, "aria-label", "Scroll to top");
                vp.set_text(&button, "\u{2191}");
                vp.set_styles(&button, &BASE_STYLES);
                vp.set_style(&button, "background", "var(--primary-color, #3498db)");
                button
            }
        };
        Ok(Self { button, threshold: config.scroll_top_threshold_px, visible: None })
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible.unwrap_or(false)
    }

    /// Show or hide the button for `offset`.
    pub fn sync(&mut self, vp: &mut impl ViewPort, offset: f64) {
        let visible = visible_at(offset, self.threshold);
        if self.visible == Some(visible) {
            return;
        }
        self.visible = Some(visible);
        let (opacity, visibility) = if visible { ("1", "visible") } else { ("0", "hidden") };
        vp.set_styles(&self.button, &[("opacity", opacity), ("visibility", visibility)]);
    }

    /// Smooth-scroll to the top when the button is clicked.
    pub fn on_click(&self, vp: &mut impl ViewPort, target: &NodeId) -> bool {
        if !vp.contains(&self.button, target) {
            return false;
        }
        vp.scroll_to(0.0, ScrollBehavior::Smooth);
        true
    }

    #[must_use]
    pub fn button(&self) -> &NodeId {
        &self.button
    }
}
