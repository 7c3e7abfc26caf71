//! Light/dark theme with a persisted preference.

use crate::storage::LocalStore;

pub const THEME_KEY: &str = "theme";
pub const DARK_MODE_CLASS: &str = "dark-mode";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Anything other than `"dark"` is light.
    pub fn from_stored(value: Option<&str>) -> Self {
        match value {
            Some("dark") => Theme::Dark,
            _ => Theme::Light,
        }
    }

    pub fn as_str(&self) -> &'static str {
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

    /// Toggle button label: the theme you would switch to.
    pub fn icon(&self) -> &'static str {
        match self {
            Theme::Dark => "☀️",
            Theme::Light => "🌙",
        }
    }

    pub fn load(store: &dyn LocalStore) -> crate::error::Result<Self> {
        Ok(Self::from_stored(store.get(THEME_KEY)?.as_deref()))
    }

    pub fn save(&self, store: &mut dyn LocalStore) -> crate::error::Result<()> {
        store.set(THEME_KEY, self.as_str())
    }
}
