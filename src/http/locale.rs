//! Currently selected interface language
//!
//! The selected language is shared between the UI (which changes it) and the
//! request decorator (which reads it for `Accept-Language`). Clones share the
//! same selection.

use std::sync::{Arc, RwLock};

/// Language used when nothing has been selected.
pub const DEFAULT_LOCALE: &str = "en";

/// Shared handle to the selected language.
///
/// # Examples
///
/// ```
/// use unionsite::http::Locale;
///
/// let locale = Locale::new("vi");
/// assert_eq!(locale.current(), "vi");
///
/// locale.select("en");
/// assert_eq!(locale.current(), "en");
///
/// locale.reset();
/// assert_eq!(locale.current(), "vi");
/// ```
#[derive(Debug, Clone)]
pub struct Locale {
    default: Arc<str>,
    selected: Arc<RwLock<Option<String>>>,
}

impl Default for Locale {
    fn default() -> Self {
        Self::new(DEFAULT_LOCALE)
    }
}

impl Locale {
    /// Creates a handle whose fallback is `default`.
    pub fn new(default: impl AsRef<str>) -> Self {
        Self {
            default: Arc::from(default.as_ref()),
            selected: Arc::new(RwLock::new(None)),
        }
    }

    /// Returns the selected language, or the default when unset.
    pub fn current(&self) -> String {
        match self.selected.read() {
            Ok(guard) => guard
                .clone()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| self.default.to_string()),
            Err(_) => self.default.to_string(),
        }
    }

    /// Selects a language.
    pub fn select(&self, language: impl Into<String>) {
        let language = language.into();
        match self.selected.write() {
            Ok(mut guard) => *guard = Some(language),
            Err(poisoned) => *poisoned.into_inner() = Some(language),
        }
    }

    /// Clears the selection, falling back to the default.
    pub fn reset(&self) {
        match self.selected.write() {
            Ok(mut guard) => *guard = None,
            Err(poisoned) => *poisoned.into_inner() = None,
        }
    }
}
