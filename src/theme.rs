//! Light/dark theme preference.
//!
//! The preference is read once at startup from a [`PreferenceStore`] and
//! written back on every toggle. The root element's `data-theme` attribute is
//! the visual source of truth and always equals the in-memory [`Theme`] once
//! a toggle returns.
//!
//! TRADE-OFFS
//! ==========
//! A store that fails to read or write degrades the preference to
//! session-only. The failure is logged once for the operator and never shown
//! to the visitor.

#[cfg(test)]
#[path = "theme_test.rs"]
mod theme_test;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::SiteConfig;
use crate::consts::THEME_STORAGE_KEY;
use crate::error::{Result, SiteError};
use crate::viewport::{NodeId, ViewPort};

const THEME_ATTRIBUTE: &str = "data-theme";
const TRANSITION_HINT: &str = "all 0.3s ease";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// Parse a stored value. Unknown values yield `None`.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }

    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// Icon offering the *other* theme: a sun while dark, a moon while light.
    #[must_use]
    pub fn icon_class(self) -> &'static str {
        match self {
            Self::Light => "fas fa-moon",
            Self::Dark => "fas fa-sun",
        }
    }
}

/// Durable string key/value storage.
pub trait PreferenceStore {
    /// # Errors
    ///
    /// [`SiteError::StorageUnavailable`] when the backing store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// # Errors
    ///
    /// [`SiteError::StorageUnavailable`] when the backing store cannot be written.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Process-local store. Used in tests and wherever durable storage is absent.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-seeded with `theme`.
    #[must_use]
    pub fn with_theme(theme: Theme) -> Self {
        let mut store = Self::new();
        store.values.insert(THEME_STORAGE_KEY.to_owned(), theme.as_str().to_owned());
        store
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// Read the persisted theme, defaulting to light when absent or unrecognized.
///
/// # Errors
///
/// Propagates the store's read failure.
pub fn read_preference(store: &impl PreferenceStore) -> Result<Theme> {
    let stored = store.get(THEME_STORAGE_KEY)?;
    Ok(stored.as_deref().and_then(Theme::parse).unwrap_or_default())
}

/// Theme toggle button plus the document-wide theme attribute.
#[derive(Clone, Debug)]
pub struct ThemeToggle {
    theme: Theme,
    button: NodeId,
    icon: Option<NodeId>,
    session_only: bool,
}

impl ThemeToggle {
    /// Apply the persisted theme and locate the toggle button.
    ///
    /// The theme is applied to the root element even when the button is
    /// missing, so a page without a toggle still honours the stored choice.
    ///
    /// # Errors
    ///
    /// [`SiteError::MissingElement`] when the toggle button is absent.
    pub fn init(vp: &mut impl ViewPort, store: &impl PreferenceStore, config: &SiteConfig) -> Result<Self> {
        let (theme, session_only) = match read_preference(store) {
            Ok(theme) => (theme, false),
            Err(e) => {
                log::warn!("theme: {e}; preference is session-only");
                (Theme::Light, true)
            }
        };
        let root = vp.root();
        vp.set_attribute(&root, THEME_ATTRIBUTE, theme.as_str());

        let selectors = &config.selectors;
        let button = vp
            .select(&selectors.theme_toggle)
            .ok_or_else(|| SiteError::missing("theme", &selectors.theme_toggle))?;
        let icon = vp.select_within(&button, &selectors.theme_icon);
        let toggle = Self { theme, button, icon, session_only };
        toggle.apply_icon(vp);
        log::info!("theme: initialized as {}", theme.as_str());
        Ok(toggle)
    }

    #[must_use]
    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Whether persistence has been abandoned after a store failure.
    #[must_use]
    pub fn is_session_only(&self) -> bool {
        self.session_only
    }

    /// Whether a click on `target` hits the toggle button.
    #[must_use]
    pub fn is_hit(&self, vp: &impl ViewPort, target: &NodeId) -> bool {
        vp.contains(&self.button, target)
    }

    /// Flip the theme, apply it, persist it, and start the transition hint.
    ///
    /// The caller is responsible for reverting the hint with
    /// [`ThemeToggle::end_transition`] after the configured duration.
    pub fn toggle(&mut self, vp: &mut impl ViewPort, store: &mut impl PreferenceStore) -> Theme {
        self.theme = self.theme.toggled();
        let root = vp.root();
        vp.set_attribute(&root, THEME_ATTRIBUTE, self.theme.as_str());
        self.apply_icon(vp);

        if !self.session_only {
            if let Err(e) = store.set(THEME_STORAGE_KEY, self.theme.as_str()) {
                log::warn!("theme: {e}; preference is session-only");
                self.session_only = true;
            }
        }

        let body = vp.body();
        vp.set_style(&body, "transition", TRANSITION_HINT);
        log::debug!("theme: switched to {}", self.theme.as_str());
        self.theme
    }

    /// Clear the transition hint set by [`ThemeToggle::toggle`].
    pub fn end_transition(vp: &mut impl ViewPort) {
        let body = vp.body();
        vp.set_style(&body, "transition", "");
    }

    fn apply_icon(&self, vp: &mut impl ViewPort) {
        if let Some(icon) = &self.icon {
            vp.set_class_name(icon, self.theme.icon_class());
        }
    }
}
