//! Mobile navigation menu.
//!
//! A two-state toggle. The control flips it, any link inside the menu closes
//! it, and a click landing outside both the control and the menu closes it.
//! The outside test uses containment against the click target, so the click
//! that opens the menu (whose target is inside the control) never closes it.

#[cfg(test)]
#[path = "menu_test.rs"]
mod menu_test;

use crate::config::SiteConfig;
use crate::error::{Result, SiteError};
use crate::viewport::{NodeId, ViewPort};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MenuState {
    #[default]
    Closed,
    Open,
}

#[derive(Clone, Debug)]
pub struct MobileMenu {
    toggle: NodeId,
    menu: NodeId,
    open_class: String,
    state: MenuState,
}

impl MobileMenu {
    /// # Errors
    ///
    /// [`SiteError::MissingElement`] when either the control or the menu is absent.
    pub fn init(vp: &mut impl ViewPort, config: &SiteConfig) -> Result<Self> {
        let selectors = &config.selectors;
        let toggle = vp
            .select(&selectors.menu_toggle)
            .ok_or_else(|| SiteError::missing("menu", &selectors.menu_toggle))?;
        let menu = vp
            .select(&selectors.menu)
            .ok_or_else(|| SiteError::missing("menu", &selectors.menu))?;
        let this = Self { toggle, menu, open_class: config.menu_open_class.clone(), state: MenuState::Closed };
        this.apply(vp);
        Ok(this)
    }

    #[must_use]
    pub fn state(&self) -> MenuState {
        self.state
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state == MenuState::Open
    }

    /// Route a document click. Returns the state after the click.
    pub fn on_click(&mut self, vp: &mut impl ViewPort, target: &NodeId) -> MenuState {
        if vp.contains(&self.toggle, target) {
            let next = match self.state {
                MenuState::Closed => MenuState::Open,
                MenuState::Open => MenuState::Closed,
            };
            self.set(vp, next);
        } else if vp.contains(&self.menu, target) {
            if Self::is_link(&*vp, &self.menu, target) {
                self.set(vp, MenuState::Closed);
            }
        } else {
            self.set(vp, MenuState::Closed);
        }
        self.state
    }

    /// Route a keydown. `Escape` closes an open menu.
    pub fn on_key(&mut self, vp: &mut impl ViewPort, key: &str) {
        if key == "Escape" && self.is_open() {
            self.set(vp, MenuState::Closed);
        }
    }

    fn is_link(vp: &impl ViewPort, menu: &NodeId, target: &NodeId) -> bool {
        vp.select_all("a")
            .iter()
            .any(|a| vp.contains(menu, a) && vp.contains(a, target))
    }

    fn set(&mut self, vp: &mut impl ViewPort, state: MenuState) {
        if self.state != state {
            log::debug!("menu: {:?} -> {:?}", self.state, state);
        }
        self.state = state;
        self.apply(vp);
    }

    fn apply(&self, vp: &mut impl ViewPort) {
        let open = self.is_open();
        vp.toggle_class(&self.toggle, &self.open_class, open);
        vp.toggle_class(&self.menu, &self.open_class, open);
        vp.set_attribute(&self.toggle, "aria-expanded", if open { "true" } else { "false" });
    }
}
