//! Initial locale resolution
//!
//! Picks the locale for first render from synchronously available signals.
//! Rules are evaluated in strict priority order and the first match wins:
//!
//! 1. Persisted preference (`i18nextLng`)
//! 2. Timezone is one of Indonesia's four IANA zones
//! 3. Primary language tag starts with `id`
//! 4. Any entry of the language list starts with `id`
//! 5. Offset is UTC+7/+8/+9 **and** the zone name starts with `Asia/`
//! 6. English
//!
//! Rule 5 is a coarse heuristic. Non-Indonesian `Asia/` zones on the same
//! offsets (`Asia/Bangkok`, `Asia/Shanghai`, `Asia/Tokyo`) also match it.
//!
//! Resolution only reads storage. The engine persists the result.

use serde::Serialize;
use std::fmt;

use super::environment::EnvironmentSignals;
use super::{has_language_prefix, Locale};
use crate::storage::{PreferenceStore, LOCALE_KEY};

/// IANA zones covering Indonesia (WIB, WIB, WITA, WIT)
pub const INDONESIAN_TIMEZONES: &[&str] = &[
    "Asia/Jakarta",
    "Asia/Pontianak",
    "Asia/Makassar",
    "Asia/Jayapura",
];

/// UTC+7, UTC+8 and UTC+9 in `getTimezoneOffset` convention
pub const INDONESIAN_OFFSETS: &[i32] = &[-420, -480, -540];

/// Region prefix required alongside a matching offset
const ASIA_PREFIX: &str = "Asia/";

/// Primary language subtag for Indonesian
const INDONESIAN_LANGUAGE: &str = "id";

/// Snapshot of every input the resolver looks at
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signals {
    /// Whether a visitor context exists
    pub interactive: bool,

    /// Stored locale tag from a previous visit
    pub persisted: Option<String>,

    /// Resolved IANA timezone name
    pub timezone: Option<String>,

    /// Primary language tag
    pub primary_language: Option<String>,

    /// Ordered language preference list
    pub languages: Vec<String>,

    /// Offset in `getTimezoneOffset` convention
    pub timezone_offset_minutes: Option<i32>,
}

/// Which rule produced the resolved locale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionSource {
    /// No visitor context; default applied without looking at signals
    Headless,
    /// Previously stored preference
    Persisted,
    /// Timezone is an Indonesian zone
    Timezone,
    /// Primary language tag
    PrimaryLanguage,
    /// Some entry of the language list
    LanguageList,
    /// Offset plus `Asia/` prefix heuristic
    OffsetHeuristic,
    /// Nothing matched
    Default,
}

impl fmt::Display for ResolutionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Headless => "headless",
            Self::Persisted => "persisted preference",
            Self::Timezone => "timezone",
            Self::PrimaryLanguage => "primary language",
            Self::LanguageList => "language list",
            Self::OffsetHeuristic => "timezone offset",
            Self::Default => "default",
        };
        f.write_str(name)
    }
}

/// Outcome of initial resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Resolution {
    /// Locale to render with
    pub locale: Locale,
    /// Rule that decided it
    pub source: ResolutionSource,
}

impl Resolution {
    const fn new(locale: Locale, source: ResolutionSource) -> Self {
        Self { locale, source }
    }
}

/// Resolve the first-render locale from storage and environment
///
/// A storage read failure is treated as "nothing stored".
pub fn resolve_initial_locale(
    store: &dyn PreferenceStore,
    env: &dyn EnvironmentSignals,
) -> Resolution {
    let mut signals = env.signals();
    if signals.interactive {
        signals.persisted = match store.get(LOCALE_KEY) {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!(store = store.name(), error = %e, "Stored locale unreadable, ignoring");
                None
            }
        };
    }

    resolve_from_signals(&signals)
}

/// Pure resolution over a signal snapshot
pub fn resolve_from_signals(signals: &Signals) -> Resolution {
    if !signals.interactive {
        return Resolution::new(Locale::DEFAULT, ResolutionSource::Headless);
    }

    if let Some(stored) = signals.persisted.as_deref() {
        match stored.parse::<Locale>() {
            Ok(locale) => return Resolution::new(locale, ResolutionSource::Persisted),
            Err(e) => tracing::debug!(error = %e, "Ignoring unsupported stored locale"),
        }
    }

    let timezone = signals.timezone.as_deref();

    if timezone.is_some_and(|tz| INDONESIAN_TIMEZONES.contains(&tz)) {
        return Resolution::new(Locale::Id, ResolutionSource::Timezone);
    }

    if signals
        .primary_language
        .as_deref()
        .is_some_and(|tag| has_language_prefix(tag, INDONESIAN_LANGUAGE))
    {
        return Resolution::new(Locale::Id, ResolutionSource::PrimaryLanguage);
    }

    if signals
        .languages
        .iter()
        .any(|tag| has_language_prefix(tag, INDONESIAN_LANGUAGE))
    {
        return Resolution::new(Locale::Id, ResolutionSource::LanguageList);
    }

    let offset_matches = signals
        .timezone_offset_minutes
        .is_some_and(|offset| INDONESIAN_OFFSETS.contains(&offset));
    if offset_matches && timezone.is_some_and(|tz| tz.starts_with(ASIA_PREFIX)) {
        return Resolution::new(Locale::Id, ResolutionSource::OffsetHeuristic);
    }

    Resolution::new(Locale::DEFAULT, ResolutionSource::Default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::environment::{FixedEnvironment, HeadlessEnvironment};
    use crate::storage::{DisabledStore, MemoryStore};

    fn interactive() -> Signals {
        Signals {
            interactive: true,
            ..Signals::default()
        }
    }

    #[test]
    fn test_persisted_wins_over_timezone() {
        let signals = Signals {
            persisted: Some("en".into()),
            timezone: Some("Asia/Jakarta".into()),
            ..interactive()
        };
        assert_eq!(
            resolve_from_signals(&signals),
            Resolution::new(Locale::En, ResolutionSource::Persisted)
        );
    }

    #[test]
    fn test_every_indonesian_timezone() {
        for tz in INDONESIAN_TIMEZONES {
            let signals = Signals {
                timezone: Some((*tz).to_string()),
                primary_language: Some("en-US".into()),
                languages: vec!["en-US".into(), "en".into()],
                ..interactive()
            };
            let resolution = resolve_from_signals(&signals);
            assert_eq!(resolution.locale, Locale::Id, "{tz}");
            assert_eq!(resolution.source, ResolutionSource::Timezone);
        }
    }

    #[test]
    fn test_primary_language() {
        let signals = Signals {
            primary_language: Some("ID-id".into()),
            timezone: Some("Europe/Amsterdam".into()),
            ..interactive()
        };
        assert_eq!(
            resolve_from_signals(&signals).source,
            ResolutionSource::PrimaryLanguage
        );
    }

    #[test]
    fn test_language_list() {
        let signals = Signals {
            primary_language: Some("en-GB".into()),
            languages: vec!["en-GB".into(), "nl".into(), "id".into()],
            ..interactive()
        };
        assert_eq!(
            resolve_from_signals(&signals),
            Resolution::new(Locale::Id, ResolutionSource::LanguageList)
        );
    }

    #[test]
    fn test_offset_heuristic_needs_asia_prefix() {
        let perth = Signals {
            timezone: Some("Australia/Perth".into()),
            timezone_offset_minutes: Some(-480),
            languages: vec!["en-AU".into()],
            ..interactive()
        };
        assert_eq!(
            resolve_from_signals(&perth),
            Resolution::new(Locale::En, ResolutionSource::Default)
        );

        let singapore = Signals {
            timezone: Some("Asia/Singapore".into()),
            timezone_offset_minutes: Some(-480),
            ..interactive()
        };
        assert_eq!(
            resolve_from_signals(&singapore),
            Resolution::new(Locale::Id, ResolutionSource::OffsetHeuristic)
        );
    }

    #[test]
    fn test_offset_heuristic_keeps_known_false_positives() {
        for (tz, offset) in [("Asia/Bangkok", -420), ("Asia/Shanghai", -480), ("Asia/Tokyo", -540)] {
            let signals = Signals {
                timezone: Some(tz.into()),
                timezone_offset_minutes: Some(offset),
                ..interactive()
            };
            assert_eq!(resolve_from_signals(&signals).locale, Locale::Id, "{tz}");
        }
    }

    #[test]
    fn test_offset_alone_is_not_enough() {
        let signals = Signals {
            timezone_offset_minutes: Some(-420),
            ..interactive()
        };
        assert_eq!(resolve_from_signals(&signals).locale, Locale::En);

        let wrong_offset = Signals {
            timezone: Some("Asia/Kolkata".into()),
            timezone_offset_minutes: Some(-330),
            ..interactive()
        };
        assert_eq!(resolve_from_signals(&wrong_offset).locale, Locale::En);
    }

    #[test]
    fn test_unsupported_persisted_value_falls_through() {
        let signals = Signals {
            persisted: Some("fr".into()),
            timezone: Some("Asia/Jayapura".into()),
            ..interactive()
        };
        assert_eq!(
            resolve_from_signals(&signals),
            Resolution::new(Locale::Id, ResolutionSource::Timezone)
        );
    }

    #[test]
    fn test_headless_ignores_signals() {
        let signals = Signals {
            interactive: false,
            persisted: Some("id".into()),
            timezone: Some("Asia/Jakarta".into()),
            ..Signals::default()
        };
        assert_eq!(
            resolve_from_signals(&signals),
            Resolution::new(Locale::En, ResolutionSource::Headless)
        );
    }

    #[test]
    fn test_resolve_reads_store_without_writing() {
        let store = MemoryStore::with_entries([(LOCALE_KEY, "id")]);
        let env = FixedEnvironment::new().with_languages(["en-US"]);

        let resolution = resolve_initial_locale(&store, &env);
        assert_eq!(resolution, Resolution::new(Locale::Id, ResolutionSource::Persisted));
        assert_eq!(store.snapshot().len(), 1);

        let empty = MemoryStore::new();
        resolve_initial_locale(&empty, &env);
        assert!(empty.snapshot().is_empty());
    }

    #[test]
    fn test_disabled_storage_uses_remaining_signals() {
        let env = FixedEnvironment::new().with_timezone("Asia/Pontianak");
        assert_eq!(
            resolve_initial_locale(&DisabledStore, &env),
            Resolution::new(Locale::Id, ResolutionSource::Timezone)
        );
    }

    #[test]
    fn test_headless_environment_resolves_english() {
        let store = MemoryStore::with_entries([(LOCALE_KEY, "id")]);
        assert_eq!(
            resolve_initial_locale(&store, &HeadlessEnvironment).locale,
            Locale::En
        );
    }
}
