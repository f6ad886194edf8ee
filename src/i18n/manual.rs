//! User-initiated locale changes
//!
//! A change made through the language switcher is recorded with a durable
//! flag next to the locale. Automatic paths (startup resolution, refinement)
//! never write the flag, and nothing clears it; only fresh storage resets it.

use super::engine::TranslationEngine;
use super::Locale;
use crate::storage::{PreferenceStore, StorageError, MANUAL_KEY, MANUAL_SENTINEL};

/// Records and reads the manual-override flag
#[derive(Debug, Clone, Copy, Default)]
pub struct ManualOverride;

impl ManualOverride {
    /// Change the locale on the visitor's behalf and set the flag
    ///
    /// Returns whether the locale changed. A storage failure leaves the stored
    /// flag unset, but the engine still remembers the choice for the session.
    pub fn record(engine: &TranslationEngine, locale: Locale) -> bool {
        engine.mark_manual();
        let changed = engine.change_locale(locale);

        match engine.store().set(MANUAL_KEY, MANUAL_SENTINEL) {
            Ok(()) => tracing::debug!(locale = %locale, "Manual locale selection recorded"),
            Err(StorageError::Unavailable) => tracing::debug!(
                locale = %locale,
                "Preference storage unavailable, manual selection kept for this session only"
            ),
            Err(e) => tracing::warn!(
                store = engine.store().name(),
                error = %e,
                "Could not persist manual selection flag"
            ),
        }

        changed
    }

    /// Whether the visitor has picked a locale by hand
    ///
    /// Only the exact sentinel counts; unreadable storage counts as unset.
    pub fn is_set(store: &dyn PreferenceStore) -> bool {
        matches!(store.get(MANUAL_KEY), Ok(Some(value)) if value == MANUAL_SENTINEL)
    }

    /// Whether refinement must leave the engine's locale alone
    ///
    /// True after a manual selection in this session, or when a previous
    /// session stored the flag.
    pub fn is_active(engine: &TranslationEngine) -> bool {
        engine.manual_in_session() || Self::is_set(engine.store())
    }
}

/// Two-way `EN / IN` language switcher
#[derive(Debug, Clone, Copy, Default)]
pub struct LanguageSwitch;

impl LanguageSwitch {
    /// Select `locale` from the switcher
    ///
    /// Selecting the locale already shown does nothing, not even the flag
    /// write. Returns whether the locale changed.
    pub fn select(engine: &TranslationEngine, locale: Locale) -> bool {
        if engine.current_locale() == locale {
            tracing::debug!(locale = %locale, "Locale already active, ignoring switch");
            return false;
        }
        ManualOverride::record(engine, locale)
    }

    /// Flip to the other locale, returning the new one
    pub fn toggle(engine: &TranslationEngine) -> Locale {
        let next = engine.current_locale().toggled();
        ManualOverride::record(engine, next);
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::resolver::{Resolution, ResolutionSource};
    use crate::resources::ResourceStore;
    use crate::storage::{DisabledStore, MemoryStore, LOCALE_KEY};
    use std::sync::Arc;

    fn engine(locale: Locale, store: Arc<dyn PreferenceStore>) -> TranslationEngine {
        TranslationEngine::with_resolution(
            Arc::new(ResourceStore::new()),
            store,
            Resolution {
                locale,
                source: ResolutionSource::Default,
            },
        )
    }

    #[test]
    fn test_record_sets_locale_and_flag() {
        let store = Arc::new(MemoryStore::new());
        let engine = engine(Locale::En, store.clone());

        assert!(!ManualOverride::is_set(store.as_ref()));
        assert!(ManualOverride::record(&engine, Locale::Id));

        assert_eq!(engine.current_locale(), Locale::Id);
        assert_eq!(store.get(LOCALE_KEY).unwrap(), Some("id".to_string()));
        assert!(ManualOverride::is_set(store.as_ref()));
    }

    #[test]
    fn test_record_same_locale_still_sets_flag() {
        let store = Arc::new(MemoryStore::new());
        let engine = engine(Locale::En, store.clone());

        assert!(!ManualOverride::record(&engine, Locale::En));
        assert!(ManualOverride::is_set(store.as_ref()));
    }

    #[test]
    fn test_only_exact_sentinel_counts() {
        let store = MemoryStore::with_entries([(MANUAL_KEY, "yes")]);
        assert!(!ManualOverride::is_set(&store));
        assert!(!ManualOverride::is_set(&DisabledStore));
    }

    #[test]
    fn test_switch_ignores_current_locale() {
        let store = Arc::new(MemoryStore::new());
        let engine = engine(Locale::Id, store.clone());

        assert!(!LanguageSwitch::select(&engine, Locale::Id));
        assert!(!ManualOverride::is_set(store.as_ref()));

        assert!(LanguageSwitch::select(&engine, Locale::En));
        assert!(ManualOverride::is_set(store.as_ref()));
    }

    #[test]
    fn test_toggle_flips() {
        let store = Arc::new(MemoryStore::new());
        let engine = engine(Locale::En, store.clone());

        assert_eq!(LanguageSwitch::toggle(&engine), Locale::Id);
        assert_eq!(LanguageSwitch::toggle(&engine), Locale::En);
        assert_eq!(store.get(LOCALE_KEY).unwrap(), Some("en".to_string()));
    }

    #[test]
    fn test_disabled_storage_still_switches() {
        let engine = engine(Locale::En, Arc::new(DisabledStore));
        assert!(ManualOverride::record(&engine, Locale::Id));
        assert_eq!(engine.current_locale(), Locale::Id);
        assert!(!ManualOverride::is_set(engine.store()));
        assert!(ManualOverride::is_active(&engine));
    }

    #[test]
    fn test_stored_flag_is_active_without_session_choice() {
        let store = Arc::new(MemoryStore::with_entries([(MANUAL_KEY, "true")]));
        let engine = engine(Locale::Id, store);

        assert!(!engine.manual_in_session());
        assert!(ManualOverride::is_active(&engine));
    }

    #[test]
    fn test_automatic_change_is_not_manual() {
        let engine = engine(Locale::En, Arc::new(MemoryStore::new()));
        engine.change_locale(Locale::Id);
        assert!(!ManualOverride::is_active(&engine));
    }
}
