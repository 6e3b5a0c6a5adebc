//! Scroll-position synchronization for the navigation bar.
//!
//! On every (rate-limited) scroll pass this re-reads section geometry from
//! the view tree, resolves which section the probe offset falls in, and marks
//! the matching nav link `active`. The navbar also gains a `scrolled` class
//! once the page leaves the top. Nothing is cached between passes except the
//! link handles, so the result depends only on the current layout and offset.

#[cfg(test)]
#[path = "nav_test.rs"]
mod nav_test;

use crate::config::{ScrollSpyOffset, SiteConfig};
use crate::consts::{CLASS_ACTIVE, CLASS_SCROLLED};
use crate::error::{Result, SiteError};
use crate::viewport::{NodeId, Rect, ScrollBehavior, ViewPort};

/// A scroll target read from the view tree.
#[derive(Clone, Debug, PartialEq)]
pub struct Section {
    pub id: String,
    pub extent: Rect,
}

/// The section containing `probe`, if any.
///
/// Sections are scanned in document order and the last one containing the
/// probe wins, so nested or overlapping sections resolve to the innermost
/// one declared later in the page.
#[must_use]
pub fn resolve_active(sections: &[Section], probe: f64) -> Option<&Section> {
    sections.iter().rev().find(|s| s.extent.contains(probe))
}

/// Read every section with an `id` in document order.
pub fn read_sections(vp: &impl ViewPort, selector: &str) -> Vec<Section> {
    vp.select_all(selector)
        .into_iter()
        .filter_map(|node| {
            let id = vp.attribute(&node, "id").filter(|id| !id.is_empty())?;
            Some(Section { id, extent: vp.extent(&node) })
        })
        .collect()
}

/// The section id an in-page link points at (`#about` → `about`).
#[must_use]
pub fn link_target(href: &str) -> Option<&str> {
    href.strip_prefix('#').filter(|id| !id.is_empty())
}

/// Navbar background, active-link highlighting and anchor scrolling.
#[derive(Clone, Debug)]
pub struct Navbar {
    navbar: NodeId,
    links: Vec<NodeId>,
    sections_selector: String,
    offset: ScrollSpyOffset,
    scrolled_threshold: f64,
    active: Option<String>,
}

impl Navbar {
    /// Locate the navbar and its links.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::MissingElement`] when the navbar itself is absent.
    /// A navbar without links is valid; only the background feature applies.
    pub fn init(vp: &impl ViewPort, config: &SiteConfig) -> Result<Self> {
        let selectors = &config.selectors;
        let navbar = vp
            .select(&selectors.navbar)
            .ok_or_else(|| SiteError::missing("navbar", &selectors.navbar))?;
        let links = vp.select_all(&selectors.nav_links);
        log::info!("navbar: tracking {} links", links.len());
        Ok(Self {
            navbar,
            links,
            sections_selector: selectors.sections.clone(),
            offset: config.scroll_spy,
            scrolled_threshold: config.navbar_scrolled_threshold_px,
            active: None,
        })
    }

    /// The scroll offset shifted to the point used for section lookup.
    #[must_use]
    pub fn probe(&self, vp: &impl ViewPort, offset: f64) -> f64 {
        let mut probe = offset + self.offset.margin_px;
        if self.offset.include_navbar_height {
            probe += vp.extent(&self.navbar).height;
        }
        probe
    }

    /// Recompute navbar background and active link for `offset`.
    pub fn sync(&mut self, vp: &mut impl ViewPort, offset: f64) {
        let navbar = self.navbar.clone();
        vp.toggle_class(&navbar, CLASS_SCROLLED, offset > self.scrolled_threshold);

        let sections = read_sections(&*vp, &self.sections_selector);
        let probe = self.probe(&*vp, offset);
        let current = resolve_active(&sections, probe).map(|s| s.id.clone());
        if current != self.active {
            log::debug!("navbar: active section {:?} -> {:?}", self.active, current);
        }

        let mut claimed = false;
        for link in &self.links {
            let matches = !claimed
                && current.is_some()
                && vp.attribute(link, "href").as_deref().and_then(link_target) == current.as_deref();
            claimed |= matches;
            vp.toggle_class(link, CLASS_ACTIVE, matches);
        }
        self.active = current;
    }

    /// Id of the section resolved by the last [`Navbar::sync`].
    #[must_use]
    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// The nav link that is or contains `target`.
    #[must_use]
    pub fn link_for(&self, vp: &impl ViewPort, target: &NodeId) -> Option<NodeId> {
        self.links.iter().find(|link| vp.contains(link, target)).cloned()
    }

    /// Smooth-scroll to the section a clicked nav link points at.
    ///
    /// Returns `true` when a scroll was issued. Links to missing sections are
    /// left alone.
    pub fn on_click(&self, vp: &mut impl ViewPort, target: &NodeId) -> bool {
        let Some(link) = self.link_for(&*vp, target) else {
            return false;
        };
        let Some(href) = vp.attribute(&link, "href") else {
            return false;
        };
        let Some(section_id) = link_target(&href) else {
            return false;
        };
        let Some(section) = vp.by_id(section_id) else {
            log::debug!("navbar: link target #{section_id} not on page");
            return false;
        };
        let top = vp.extent(&section).top - vp.extent(&self.navbar).height;
        vp.scroll_to(top.max(0.0), ScrollBehavior::Smooth);
        true
    }
}
