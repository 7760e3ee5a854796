//! Light/dark display mode with a persisted explicit choice.
//!
//! Initial mode: the persisted choice if there is one, else the ambient
//! preference of the terminal, else light. Only an explicit toggle writes
//! the preference store.

mod store;

use std::env;

use crate::config::SystemThemeSetting;

pub use store::{FileStore, MemoryStore, PreferenceStore, StoreError};

/// Key the theme choice is persisted under.
pub const THEME_KEY: &str = "theme";

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Glyph of the toggle control: offers the opposite mode.
    pub fn glyph(self) -> &'static str {
        match self {
            Theme::Dark => "☀",
            Theme::Light => "☾",
        }
    }
}

/// Resolve the startup theme from a persisted value and the system preference.
pub fn resolve_initial(saved: Option<&str>, prefers_dark: bool) -> Theme {
    match saved {
        Some("dark") => Theme::Dark,
        Some(_) => Theme::Light,
        None if prefers_dark => Theme::Dark,
        None => Theme::Light,
    }
}

/// Parse a `COLORFGBG` value ("fg;bg" or "fg;default;bg"); the last field is
/// the background colour index.
pub fn colorfgbg_is_dark(value: &str) -> Option<bool> {
    let bg: u8 = value.rsplit(';').next()?.trim().parse().ok()?;
    Some(matches!(bg, 0..=6 | 8))
}

/// Ambient dark-mode preference, honouring a config override.
pub fn system_prefers_dark(setting: SystemThemeSetting) -> bool {
    match setting {
        SystemThemeSetting::Dark => true,
        SystemThemeSetting::Light => false,
        SystemThemeSetting::Auto => env::var("COLORFGBG")
            .ok()
            .and_then(|v| colorfgbg_is_dark(&v))
            .unwrap_or(false),
    }
}

/// Two-state theme controller over a preference store.
pub struct ThemeController<S: PreferenceStore> {
    store: S,
    theme: Theme,
}

impl<S: PreferenceStore> ThemeController<S> {
    pub fn new(store: S, prefers_dark: bool) -> Self {
        let saved = store.get(THEME_KEY);
        let theme = resolve_initial(saved.as_deref(), prefers_dark);
        tracing::debug!(?saved, prefers_dark, theme = theme.as_str(), "theme resolved");
        Self { store, theme }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Flip the mode and persist the new choice.
    ///
    /// The in-memory mode flips even when persisting fails.
    pub fn toggle(&mut self) -> Result<Theme, StoreError> {
        self.theme = self.theme.toggled();
        self.store.set(THEME_KEY, self.theme.as_str())?;
        Ok(self.theme)
    }

    #[cfg(test)]
    pub fn store(&self) -> &S {
        &self.store
    }
}
