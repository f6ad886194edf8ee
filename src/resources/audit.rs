//! Bundle completeness audit
//!
//! Every key shipped for English should exist for Indonesian and the other way
//! round. Drift never breaks rendering because lookups fall back to English,
//! but it shows up as untranslated text, so the audit reports it up front.

use serde::Serialize;
use std::collections::BTreeSet;

use super::{Namespace, ResourceStore};
use crate::i18n::Locale;

/// Keys that differ between one locale and the fallback locale
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LocaleDrift {
    /// Locale compared against the fallback
    pub locale: Locale,

    /// `(namespace, key)` present in the fallback but missing here
    pub missing: Vec<(Namespace, String)>,

    /// `(namespace, key)` present here but not in the fallback
    pub extra: Vec<(Namespace, String)>,
}

impl LocaleDrift {
    /// Whether this locale matches the fallback key-for-key
    pub fn is_clean(&self) -> bool {
        self.missing.is_empty() && self.extra.is_empty()
    }
}

/// Result of auditing a [`ResourceStore`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuditReport {
    /// One entry per non-fallback locale
    pub locales: Vec<LocaleDrift>,
}

impl AuditReport {
    /// Whether every locale matches the fallback
    pub fn is_clean(&self) -> bool {
        self.locales.iter().all(LocaleDrift::is_clean)
    }

    /// Total number of missing keys across locales
    pub fn missing_count(&self) -> usize {
        self.locales.iter().map(|d| d.missing.len()).sum()
    }
}

/// Compare every locale's keys against [`Locale::DEFAULT`]
pub fn audit(store: &ResourceStore) -> AuditReport {
    let reference = keys_of(store, Locale::DEFAULT);

    let locales = Locale::all()
        .iter()
        .filter(|locale| **locale != Locale::DEFAULT)
        .map(|locale| {
            let keys = keys_of(store, *locale);
            let drift = LocaleDrift {
                locale: *locale,
                missing: reference.difference(&keys).cloned().collect(),
                extra: keys.difference(&reference).cloned().collect(),
            };
            if !drift.is_clean() {
                tracing::warn!(
                    locale = %locale,
                    missing = drift.missing.len(),
                    extra = drift.extra.len(),
                    "Translation bundle drift detected"
                );
            }
            drift
        })
        .collect();

    AuditReport { locales }
}

fn keys_of(store: &ResourceStore, locale: Locale) -> BTreeSet<(Namespace, String)> {
    let Some(bundle) = store.bundle(locale) else {
        return BTreeSet::new();
    };

    Namespace::all()
        .iter()
        .filter_map(|ns| bundle.namespace(*ns).map(|keys| (*ns, keys)))
        .flat_map(|(ns, keys)| keys.keys().map(move |key| (ns, key.clone())))
        .collect()
}
