//! Locale resolution and content localization
//!
//! This module owns the pieces that decide which language the site renders in
//! and keep that decision consistent across reloads:
//!
//! - [`environment`] - synchronous signals (timezone, language list, offset)
//! - [`resolver`] - first-render locale decision from those signals
//! - [`engine`] - current locale, key lookup and change notification
//! - [`refine`] - deferred IP-geolocation refinement
//! - [`manual`] - user-initiated changes and the override flag
//!
//! Supported locales: English (`en`, the fallback) and Indonesian (`id`).
//!
//! # Usage
//!
//! ```rust,ignore
//! use folio_i18n::i18n::{engine::TranslationEngine, environment::SystemEnvironment};
//! use folio_i18n::resources::{Namespace, ResourceStore};
//! use folio_i18n::storage::MemoryStore;
//! use std::sync::Arc;
//!
//! let resources = Arc::new(ResourceStore::embedded()?);
//! let engine = TranslationEngine::initialize(resources, Arc::new(MemoryStore::new()), &SystemEnvironment);
//!
//! let title = engine.translate("hero:title", &[]);
//! ```

pub mod engine;
pub mod environment;
pub mod manual;
pub mod refine;
pub mod resolver;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use engine::TranslationEngine;
pub use environment::{EnvironmentSignals, FixedEnvironment, HeadlessEnvironment, SystemEnvironment};
pub use manual::{LanguageSwitch, ManualOverride};
pub use refine::{GeoError, GeoLocator, IpApiLocator, RefineOutcome, Refiner};
pub use resolver::{resolve_from_signals, resolve_initial_locale, Resolution, ResolutionSource, Signals};

/// Languages the site ships bundles for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// English
    En,
    /// Indonesian (Bahasa Indonesia)
    Id,
}

impl Locale {
    /// Locale used when a key is missing or nothing better is known
    pub const DEFAULT: Locale = Locale::En;

    /// Get the locale tag as stored and served (`en`, `id`)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Id => "id",
        }
    }

    /// Get the human-readable language name in its own language
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::En => "English",
            Self::Id => "Bahasa Indonesia",
        }
    }

    /// The other supported locale
    #[must_use]
    pub fn toggled(&self) -> Self {
        match self {
            Self::En => Self::Id,
            Self::Id => Self::En,
        }
    }

    /// All supported locales, fallback first
    pub fn all() -> &'static [Locale] {
        &[Locale::En, Locale::Id]
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not a supported locale tag
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unsupported locale: {0}")]
pub struct UnknownLocale(pub String);

impl FromStr for Locale {
    type Err = UnknownLocale;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim();
        if tag.eq_ignore_ascii_case("en") {
            Ok(Self::En)
        } else if tag.eq_ignore_ascii_case("id") {
            Ok(Self::Id)
        } else {
            Err(UnknownLocale(s.to_string()))
        }
    }
}

/// Check whether a BCP 47 language tag belongs to the given primary language
///
/// Matches on the tag prefix, case-insensitively: `id`, `id-ID` and `ID`
/// all belong to `id`.
pub(crate) fn has_language_prefix(tag: &str, language: &str) -> bool {
    tag.get(..language.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(language))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_locale() {
        assert_eq!("en".parse::<Locale>(), Ok(Locale::En));
        assert_eq!("id".parse::<Locale>(), Ok(Locale::Id));
        assert_eq!(" ID ".parse::<Locale>(), Ok(Locale::Id));
        assert!("id-ID".parse::<Locale>().is_err());
        assert!("fr".parse::<Locale>().is_err());
        assert!("".parse::<Locale>().is_err());
    }

    #[test]
    fn test_locale_display_matches_tag() {
        for locale in Locale::all() {
            assert_eq!(locale.to_string(), locale.as_str());
            assert_eq!(locale.as_str().parse::<Locale>(), Ok(*locale));
        }
    }

    #[test]
    fn test_toggled() {
        assert_eq!(Locale::En.toggled(), Locale::Id);
        assert_eq!(Locale::Id.toggled(), Locale::En);
    }

    #[test]
    fn test_serde_uses_tag() {
        assert_eq!(serde_json::to_string(&Locale::Id).unwrap(), "\"id\"");
        let parsed: Locale = serde_json::from_str("\"en\"").unwrap();
        assert_eq!(parsed, Locale::En);
    }

    #[test]
    fn test_has_language_prefix() {
        assert!(has_language_prefix("id", "id"));
        assert!(has_language_prefix("id-ID", "id"));
        assert!(has_language_prefix("ID-id", "id"));
        assert!(!has_language_prefix("en-US", "id"));
        assert!(!has_language_prefix("i", "id"));
        assert!(!has_language_prefix("", "id"));
    }
}
