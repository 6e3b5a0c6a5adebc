//! One-shot fade-in reveals.
//!
//! Each observed element latches to revealed the first time enough of it is
//! inside the (margin-adjusted) viewport, or it fills that viewport outright,
//! gains the `visible` class, and is
//! dropped from observation. Revealed elements are never re-checked, so
//! scrolling them back out of view changes nothing.

#[cfg(test)]
#[path = "reveal_test.rs"]
mod reveal_test;

use crate::config::{RevealOptions, SiteConfig};
use crate::consts::CLASS_VISIBLE;
use crate::viewport::{NodeId, Rect, ViewPort};

/// Fraction of `rect` (viewport-relative) visible within `[0, viewport_height - bottom_margin)`.
#[must_use]
pub fn visible_ratio(rect: Rect, viewport_height: f64, bottom_margin: f64) -> f64 {
    let window_bottom = (viewport_height - bottom_margin).max(0.0);
    if rect.height <= 0.0 {
        // Zero-height elements count as fully visible once their edge is inside.
        return if rect.top >= 0.0 && rect.top < window_bottom { 1.0 } else { 0.0 };
    }
    let top = rect.top.max(0.0);
    let bottom = rect.bottom().min(window_bottom);
    (bottom - top).max(0.0) / rect.height
}

/// Whether `rect` spans the whole margin-adjusted window.
///
/// An element taller than `window / threshold` never reaches the ratio, but
/// once it fills the window it is as visible as it will ever get.
#[must_use]
pub fn covers_window(rect: Rect, viewport_height: f64, bottom_margin: f64) -> bool {
    let window_bottom = (viewport_height - bottom_margin).max(0.0);
    window_bottom > 0.0 && rect.top <= 0.0 && rect.bottom() >= window_bottom
}

#[derive(Clone, Debug)]
pub struct RevealObserver {
    pending: Vec<NodeId>,
    revealed: Vec<NodeId>,
    options: RevealOptions,
}

impl RevealObserver {
    /// Start observing every element matching the fade-in selector.
    ///
    /// A page without fade-in elements yields an idle observer.
    pub fn init(vp: &impl ViewPort, config: &SiteConfig) -> Self {
        let pending = vp.select_all(&config.selectors.fade_in);
        log::info!("reveal: observing {} elements", pending.len());
        Self { pending, revealed: Vec::new(), options: config.reveal }
    }

    /// Reveal every pending element that now crosses the threshold.
    ///
    /// Returns how many elements were revealed by this pass.
    pub fn check(&mut self, vp: &mut impl ViewPort) -> usize {
        let height = vp.viewport_height();
        let options = self.options;
        let (hits, rest): (Vec<_>, Vec<_>) = self.pending.drain(..).partition(|node| {
            let rect = vp.bounding_rect(node);
            let ratio = visible_ratio(rect, height, options.bottom_margin_px);
            (ratio > 0.0 && ratio >= options.threshold) || covers_window(rect, height, options.bottom_margin_px)
        });
        self.pending = rest;
        for node in &hits {
            vp.add_class(node, CLASS_VISIBLE);
        }
        let count = hits.len();
        self.revealed.extend(hits);
        if count > 0 {
            log::debug!("reveal: {count} revealed, {} pending", self.pending.len());
        }
        count
    }

    #[must_use]
    pub fn is_revealed(&self, node: &NodeId) -> bool {
        self.revealed.contains(node)
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Whether nothing is left to observe.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.pending.is_empty()
    }
}
