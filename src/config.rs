//! Site configuration.
//!
//! Every field has a default matching the stock page markup, so an empty JSON
//! object (or no configuration at all) yields a working setup. Pages with
//! different markup override only the selectors they rename.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use serde::Deserialize;

use crate::consts::*;
use crate::error::Result;

/// How far past the raw scroll offset the active-section probe sits.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScrollSpyOffset {
    /// Fixed margin added to the scroll offset, in pixels.
    pub margin_px: f64,
    /// Also add the navbar's rendered height.
    pub include_navbar_height: bool,
}

impl Default for ScrollSpyOffset {
    fn default() -> Self {
        Self { margin_px: SCROLL_SPY_MARGIN_PX, include_navbar_height: false }
    }
}

/// Intersection options for fade-in reveals.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct RevealOptions {
    /// Visible fraction at which an element is revealed, in `0.0..=1.0`.
    pub threshold: f64,
    /// Pixels trimmed off the bottom of the viewport before measuring.
    pub bottom_margin_px: f64,
}

impl Default for RevealOptions {
    fn default() -> Self {
        Self { threshold: REVEAL_THRESHOLD, bottom_margin_px: REVEAL_BOTTOM_MARGIN_PX }
    }
}

/// Selectors locating each feature's elements.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Selectors {
    pub navbar: String,
    pub nav_links: String,
    pub sections: String,
    pub menu_toggle: String,
    pub menu: String,
    pub fade_in: String,
    pub theme_toggle: String,
    /// Looked up inside `theme_toggle`.
    pub theme_icon: String,
    pub contact_form: String,
    pub submit_button: String,
    pub success_message: String,
    /// Optional single-line status next to the submit control.
    pub form_status: String,
    pub scroll_top: String,
    pub search_input: String,
    pub post_cards: String,
    /// Looked up inside each post card.
    pub post_title: String,
    pub no_results: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            navbar: ".navbar".into(),
            nav_links: ".nav-link".into(),
            sections: "section".into(),
            menu_toggle: ".hamburger".into(),
            menu: ".nav-menu".into(),
            fade_in: ".fade-in".into(),
            theme_toggle: "#themeToggle".into(),
            theme_icon: "i".into(),
            contact_form: "#contactForm".into(),
            submit_button: "#submitBtn".into(),
            success_message: "#successMessage".into(),
            form_status: "#formStatus".into(),
            scroll_top: ".scroll-top-btn".into(),
            search_input: "#searchInput".into(),
            post_cards: ".post-card".into(),
            post_title: ".post-title".into(),
            no_results: "#noResults".into(),
        }
    }
}

/// Complete runtime configuration for [`crate::site::SiteCore`].
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub selectors: Selectors,
    pub scroll_spy: ScrollSpyOffset,
    pub reveal: RevealOptions,
    /// Class marking an open mobile menu (`active` on portfolio pages, `open` on the blog).
    pub menu_open_class: String,
    pub navbar_scrolled_threshold_px: f64,
    pub scroll_top_threshold_px: f64,
    pub frame_interval_ms: f64,
    pub low_priority_interval_ms: f64,
    pub theme_transition_ms: f64,
    pub submit_delay_ms: f64,
    pub success_notice_ms: f64,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            selectors: Selectors::default(),
            scroll_spy: ScrollSpyOffset::default(),
            reveal: RevealOptions::default(),
            menu_open_class: CLASS_ACTIVE.into(),
            navbar_scrolled_threshold_px: NAVBAR_SCROLLED_THRESHOLD_PX,
            scroll_top_threshold_px: SCROLL_TOP_THRESHOLD_PX,
            frame_interval_ms: FRAME_INTERVAL_MS,
            low_priority_interval_ms: LOW_PRIORITY_INTERVAL_MS,
            theme_transition_ms: THEME_TRANSITION_MS,
            submit_delay_ms: SUBMIT_DELAY_MS,
            success_notice_ms: SUCCESS_NOTICE_MS,
        }
    }
}

impl SiteConfig {
    /// Parse a JSON override document. Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// [`crate::error::SiteError::Config`] when `raw` is not valid JSON or a
    /// key has the wrong type.
    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}
