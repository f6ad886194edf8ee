//! Translation engine
//!
//! Owns the current locale and answers key lookups against the resource
//! store. The current locale lives in a `tokio::sync::watch` channel:
//! consumers [`subscribe`](TranslationEngine::subscribe) and re-render when it
//! changes, and every mutation goes through
//! [`change_locale`](TranslationEngine::change_locale), which also persists
//! the new tag.
//!
//! Lookups never fail. A key missing from the current locale falls back to
//! English, then to a caller default or the key path itself.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

use super::environment::EnvironmentSignals;
use super::resolver::{resolve_initial_locale, Resolution};
use super::Locale;
use crate::resources::{interpolate, Namespace, ResourceStore, ResourceValue};
use crate::storage::{PreferenceStore, StorageError, LOCALE_KEY};

/// Separator between namespace and key path in [`TranslationEngine::translate`]
const NS_SEPARATOR: char = ':';

/// Distinct missing keys remembered for warn-once; later misses log at debug
const MAX_REPORTED_MISSING: usize = 1024;

/// Current locale, lookup and change notification
pub struct TranslationEngine {
    /// Immutable bundles for every locale
    resources: Arc<ResourceStore>,

    /// Durable preference storage
    store: Arc<dyn PreferenceStore>,

    /// Current locale; the sender side is the only writer
    current: watch::Sender<Locale>,

    /// How the startup locale was chosen
    initial: Resolution,

    /// Set once the visitor picks a locale by hand; never cleared
    manual: AtomicBool,

    /// `(locale, namespace, key)` already reported as missing, bounded by
    /// [`MAX_REPORTED_MISSING`]
    reported_missing: Mutex<HashSet<(Locale, Namespace, String)>>,
}

impl std::fmt::Debug for TranslationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslationEngine")
            .field("current", &*self.current.borrow())
            .field("initial", &self.initial)
            .field("store", &self.store.name())
            .finish_non_exhaustive()
    }
}

impl TranslationEngine {
    /// Resolve the startup locale and build the engine
    ///
    /// The resolved locale is persisted right away, the same as any later
    /// change.
    pub fn initialize(
        resources: Arc<ResourceStore>,
        store: Arc<dyn PreferenceStore>,
        env: &dyn EnvironmentSignals,
    ) -> Self {
        let resolution = resolve_initial_locale(store.as_ref(), env);

        tracing::info!(
            locale = %resolution.locale,
            source = %resolution.source,
            store = store.name(),
            "Initial locale resolved"
        );

        let engine = Self::with_resolution(resources, store, resolution);
        engine.persist(resolution.locale);
        engine
    }

    /// Build an engine around an already-decided resolution
    ///
    /// Nothing is written to storage.
    pub fn with_resolution(
        resources: Arc<ResourceStore>,
        store: Arc<dyn PreferenceStore>,
        resolution: Resolution,
    ) -> Self {
        let (current, _) = watch::channel(resolution.locale);
        Self {
            resources,
            store,
            current,
            initial: resolution,
            manual: AtomicBool::new(false),
            reported_missing: Mutex::new(HashSet::new()),
        }
    }

    /// Locale currently rendered
    pub fn current_locale(&self) -> Locale {
        *self.current.borrow()
    }

    /// How the startup locale was chosen
    pub fn initial_resolution(&self) -> Resolution {
        self.initial
    }

    /// Receiver notified on every locale change
    pub fn subscribe(&self) -> watch::Receiver<Locale> {
        self.current.subscribe()
    }

    /// Preference storage shared with the refinement and override paths
    pub fn store(&self) -> &dyn PreferenceStore {
        self.store.as_ref()
    }

    /// Mark the current locale as chosen by the visitor for this session
    pub(crate) fn mark_manual(&self) {
        self.manual.store(true, Ordering::SeqCst);
    }

    /// Whether a manual selection was made through this engine
    ///
    /// Holds even when storage could not record the flag.
    pub fn manual_in_session(&self) -> bool {
        self.manual.load(Ordering::SeqCst)
    }

    /// Resources this engine reads from
    pub fn resources(&self) -> &ResourceStore {
        &self.resources
    }

    /// Switch the current locale
    ///
    /// The tag is persisted first, then subscribers are notified if the value
    /// actually changed. Returns whether it changed. Storage failures are
    /// logged and otherwise ignored.
    pub fn change_locale(&self, locale: Locale) -> bool {
        self.persist(locale);

        let mut previous = locale;
        let changed = self.current.send_if_modified(|current| {
            if *current == locale {
                return false;
            }
            previous = *current;
            *current = locale;
            true
        });

        if changed {
            tracing::info!(from = %previous, to = %locale, "Locale changed");
        } else {
            tracing::debug!(locale = %locale, "Locale unchanged");
        }

        changed
    }

    /// Look up a key in the current locale
    ///
    /// Falls back to English, then to the key path itself as visible text.
    pub fn lookup(&self, namespace: Namespace, key: &str, args: &[(&str, &str)]) -> ResourceValue {
        match self.resolve(namespace, key) {
            Some(value) => render(value, args),
            None => ResourceValue::Text(key.to_string()),
        }
    }

    /// Look up a key, using `default` when no locale has it
    pub fn lookup_or(
        &self,
        namespace: Namespace,
        key: &str,
        default: &str,
        args: &[(&str, &str)],
    ) -> ResourceValue {
        match self.resolve(namespace, key) {
            Some(value) => render(value, args),
            None => ResourceValue::Text(interpolate(default, args).into_owned()),
        }
    }

    /// Translate `namespace:key.path` (or a bare path in `common`) to a string
    ///
    /// Lists are joined with newlines.
    pub fn translate(&self, key: &str, args: &[(&str, &str)]) -> String {
        let (namespace, path) = split_namespace(key);
        self.lookup(namespace, path, args).into_string()
    }

    fn resolve(&self, namespace: Namespace, key: &str) -> Option<&ResourceValue> {
        let locale = self.current_locale();

        if let Some(value) = self.resources.get(locale, namespace, key) {
            return Some(value);
        }

        if locale != Locale::DEFAULT {
            if let Some(value) = self.resources.get(Locale::DEFAULT, namespace, key) {
                tracing::debug!(
                    locale = %locale,
                    namespace = %namespace,
                    key,
                    "Translation missing, using fallback locale"
                );
                return Some(value);
            }
        }

        self.report_missing(locale, namespace, key);
        None
    }

    fn report_missing(&self, locale: Locale, namespace: Namespace, key: &str) {
        let entry = (locale, namespace, key.to_string());
        let first_time = match self.reported_missing.lock() {
            Ok(mut seen) => {
                if seen.contains(&entry) {
                    false
                } else if seen.len() >= MAX_REPORTED_MISSING {
                    tracing::debug!(locale = %locale, namespace = %namespace, key, "Missing translation key");
                    return;
                } else {
                    seen.insert(entry)
                }
            }
            Err(_) => true,
        };
        if first_time {
            tracing::warn!(
                locale = %locale,
                namespace = %namespace,
                key,
                "Missing translation key"
            );
        }
    }

    fn persist(&self, locale: Locale) {
        match self.store.set(LOCALE_KEY, locale.as_str()) {
            Ok(()) => {}
            Err(StorageError::Unavailable) => tracing::debug!(
                store = self.store.name(),
                locale = %locale,
                "Preference storage unavailable, locale not persisted"
            ),
            Err(e) => tracing::warn!(
                store = self.store.name(),
                locale = %locale,
                error = %e,
                "Could not persist locale"
            ),
        }
    }
}

fn render(value: &ResourceValue, args: &[(&str, &str)]) -> ResourceValue {
    match value {
        ResourceValue::Text(text) => ResourceValue::Text(interpolate(text, args).into_owned()),
        ResourceValue::List(items) => ResourceValue::List(
            items
                .iter()
                .map(|item| interpolate(item, args).into_owned())
                .collect(),
        ),
    }
}

/// Split `hero:title` into `(Hero, "title")`; anything else is a common key
fn split_namespace(key: &str) -> (Namespace, &str) {
    key.split_once(NS_SEPARATOR)
        .and_then(|(ns, path)| ns.parse::<Namespace>().ok().map(|ns| (ns, path)))
        .unwrap_or((Namespace::DEFAULT, key))
}
