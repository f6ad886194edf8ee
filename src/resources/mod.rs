//! Translation resources
//!
//! Every page section has its own namespace of translation keys, one JSON
//! document per `(locale, namespace)` under `locales/`. The documents are
//! embedded at compile time and parsed once into an immutable
//! [`ResourceStore`].
//!
//! Nested objects are flattened into dotted key paths, so
//!
//! ```json
//! { "nav": { "home": "Home" }, "stack": ["Rust", "WebGL"] }
//! ```
//!
//! yields `nav.home -> Text("Home")` and `stack -> List(["Rust", "WebGL"])`.

pub mod audit;
pub mod interpolate;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use crate::i18n::Locale;

pub use audit::{audit, AuditReport, LocaleDrift};
pub use interpolate::interpolate;

/// Errors raised while loading translation resources
#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    /// Document is not valid JSON
    #[error("Invalid JSON in {locale}/{namespace}: {source}")]
    InvalidJson {
        locale: Locale,
        namespace: Namespace,
        #[source]
        source: serde_json::Error,
    },

    /// Document root is not a JSON object
    #[error("Resource {locale}/{namespace} must be a JSON object")]
    NotAnObject { locale: Locale, namespace: Namespace },

    /// Array contains something other than strings
    #[error("Key {key} in {locale}/{namespace} holds a non-string array item")]
    InvalidListItem {
        locale: Locale,
        namespace: Namespace,
        key: String,
    },
}

/// Named grouping of keys, one per page section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Namespace {
    /// Shared navigation and UI labels (default namespace)
    Common,
    /// Landing hero section
    Hero,
    /// About page and section
    About,
    /// Project listing
    Projects,
    /// Services offered
    Services,
    /// Contact form and details
    Contact,
    /// Site footer
    Footer,
    /// Selected work carousel
    Work,
    /// Long-form project descriptions
    ProjectDescriptions,
}

impl Namespace {
    /// Namespace used when a key carries no `namespace:` prefix
    pub const DEFAULT: Namespace = Namespace::Common;

    /// Get the namespace name used in keys (`projectDescriptions`, ...)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Common => "common",
            Self::Hero => "hero",
            Self::About => "about",
            Self::Projects => "projects",
            Self::Services => "services",
            Self::Contact => "contact",
            Self::Footer => "footer",
            Self::Work => "work",
            Self::ProjectDescriptions => "projectDescriptions",
        }
    }

    /// All namespaces in load order
    pub fn all() -> &'static [Namespace] {
        &[
            Namespace::Common,
            Namespace::Hero,
            Namespace::About,
            Namespace::Projects,
            Namespace::Services,
            Namespace::Contact,
            Namespace::Footer,
            Namespace::Work,
            Namespace::ProjectDescriptions,
        ]
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned for an unknown namespace name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown namespace: {0}")]
pub struct UnknownNamespace(pub String);

impl FromStr for Namespace {
    type Err = UnknownNamespace;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "common" => Ok(Self::Common),
            "hero" => Ok(Self::Hero),
            "about" => Ok(Self::About),
            "projects" => Ok(Self::Projects),
            "services" => Ok(Self::Services),
            "contact" => Ok(Self::Contact),
            "footer" => Ok(Self::Footer),
            "work" => Ok(Self::Work),
            "projectDescriptions" | "project-descriptions" => Ok(Self::ProjectDescriptions),
            other => Err(UnknownNamespace(other.to_string())),
        }
    }
}

/// A single translation entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResourceValue {
    /// Plain or templated string
    Text(String),
    /// Ordered list of strings (tags, bullet points)
    List(Vec<String>),
}

impl ResourceValue {
    /// Borrow the text, if this is a [`ResourceValue::Text`]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text.as_str()),
            Self::List(_) => None,
        }
    }

    /// Borrow the items, if this is a [`ResourceValue::List`]
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::Text(_) => None,
            Self::List(items) => Some(items.as_slice()),
        }
    }

    /// Render as a single string, joining list items with newlines
    pub fn into_string(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::List(items) => items.join("\n"),
        }
    }
}

impl fmt::Display for ResourceValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::List(items) => f.write_str(&items.join("\n")),
        }
    }
}

impl From<&str> for ResourceValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

/// Flattened keys of one namespace
pub type KeyMap = BTreeMap<String, ResourceValue>;

/// All namespaces of one locale
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceBundle {
    namespaces: HashMap<Namespace, KeyMap>,
}

impl ResourceBundle {
    /// Create an empty bundle
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the keys of a namespace
    pub fn insert_namespace(&mut self, namespace: Namespace, keys: KeyMap) {
        self.namespaces.insert(namespace, keys);
    }

    /// Keys of a namespace, if present
    pub fn namespace(&self, namespace: Namespace) -> Option<&KeyMap> {
        self.namespaces.get(&namespace)
    }

    /// Look up a dotted key path
    pub fn get(&self, namespace: Namespace, key: &str) -> Option<&ResourceValue> {
        self.namespaces.get(&namespace)?.get(key)
    }

    /// Total number of keys across namespaces
    pub fn key_count(&self) -> usize {
        self.namespaces.values().map(BTreeMap::len).sum()
    }
}

/// Immutable translation resources for every supported locale
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceStore {
    bundles: HashMap<Locale, ResourceBundle>,
}

macro_rules! embedded_sources {
    ($($locale:literal),+) => {
        &[$(
            ($locale, "common", include_str!(concat!("../../locales/", $locale, "/common.json"))),
            ($locale, "hero", include_str!(concat!("../../locales/", $locale, "/hero.json"))),
            ($locale, "about", include_str!(concat!("../../locales/", $locale, "/about.json"))),
            ($locale, "projects", include_str!(concat!("../../locales/", $locale, "/projects.json"))),
            ($locale, "services", include_str!(concat!("../../locales/", $locale, "/services.json"))),
            ($locale, "contact", include_str!(concat!("../../locales/", $locale, "/contact.json"))),
            ($locale, "footer", include_str!(concat!("../../locales/", $locale, "/footer.json"))),
            ($locale, "work", include_str!(concat!("../../locales/", $locale, "/work.json"))),
            ($locale, "project-descriptions", include_str!(concat!("../../locales/", $locale, "/project-descriptions.json"))),
        )+]
    };
}

/// `(locale, namespace, json)` documents compiled into the binary
const EMBEDDED: &[(&str, &str, &str)] = embedded_sources!("en", "id");

impl ResourceStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the resources embedded in the binary
    ///
    /// # Errors
    ///
    /// Returns a [`ResourceError`] naming the first malformed document.
    pub fn embedded() -> Result<Self, ResourceError> {
        let mut store = Self::new();

        for (locale, namespace, json) in EMBEDDED {
            let (Ok(locale), Ok(namespace)) = (locale.parse::<Locale>(), namespace.parse::<Namespace>())
            else {
                continue;
            };
            store.load_json(locale, namespace, json)?;
        }

        tracing::debug!(
            en_keys = store.bundle(Locale::En).map_or(0, ResourceBundle::key_count),
            id_keys = store.bundle(Locale::Id).map_or(0, ResourceBundle::key_count),
            "Embedded resources loaded"
        );

        Ok(store)
    }

    /// Parse a JSON document and install it as `(locale, namespace)`
    ///
    /// # Errors
    ///
    /// Returns a [`ResourceError`] if the document is not a JSON object of
    /// strings, string arrays and nested objects.
    pub fn load_json(
        &mut self,
        locale: Locale,
        namespace: Namespace,
        json: &str,
    ) -> Result<(), ResourceError> {
        let value: Value = serde_json::from_str(json).map_err(|source| ResourceError::InvalidJson {
            locale,
            namespace,
            source,
        })?;

        let Value::Object(root) = value else {
            return Err(ResourceError::NotAnObject { locale, namespace });
        };

        let mut keys = KeyMap::new();
        for (key, value) in root {
            flatten_into(&mut keys, key, value).map_err(|key| ResourceError::InvalidListItem {
                locale,
                namespace,
                key,
            })?;
        }

        self.insert(locale, namespace, keys);
        Ok(())
    }

    /// Install already-flattened keys as `(locale, namespace)`
    pub fn insert(&mut self, locale: Locale, namespace: Namespace, keys: KeyMap) {
        self.bundles
            .entry(locale)
            .or_default()
            .insert_namespace(namespace, keys);
    }

    /// Bundle of a locale, if any namespace was loaded for it
    pub fn bundle(&self, locale: Locale) -> Option<&ResourceBundle> {
        self.bundles.get(&locale)
    }

    /// Look up a key in one locale without any fallback
    pub fn get(&self, locale: Locale, namespace: Namespace, key: &str) -> Option<&ResourceValue> {
        self.bundles.get(&locale)?.get(namespace, key)
    }
}

/// Flatten `value` under `prefix`, returning the offending key on bad arrays
fn flatten_into(keys: &mut KeyMap, prefix: String, value: Value) -> Result<(), String> {
    match value {
        Value::Null => {}
        Value::String(text) => {
            keys.insert(prefix, ResourceValue::Text(text));
        }
        Value::Bool(_) | Value::Number(_) => {
            keys.insert(prefix, ResourceValue::Text(value.to_string()));
        }
        Value::Array(items) => {
            let mut list = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Value::String(text) => list.push(text),
                    _ => return Err(prefix),
                }
            }
            keys.insert(prefix, ResourceValue::List(list));
        }
        Value::Object(map) => {
            for (key, nested) in map {
                flatten_into(keys, format!("{prefix}.{key}"), nested)?;
            }
        }
    }
    Ok(())
}
