//! Environment signal providers
//!
//! The resolver never reads process globals itself. Everything it needs
//! (timezone name, language preferences, UTC offset) comes through
//! [`EnvironmentSignals`], with one implementation per context:
//!
//! - [`SystemEnvironment`] - the host machine (`sys-locale`, `chrono`, `TZ`)
//! - [`HeadlessEnvironment`] - no visitor context, always resolves English
//! - [`FixedEnvironment`] - fixture values for tests and demos

use std::path::Path;

use super::resolver::Signals;

/// Synchronous signals available before first render
pub trait EnvironmentSignals {
    /// Whether a visitor context exists at all
    ///
    /// Headless contexts (server-side rendering, batch jobs) resolve to the
    /// default locale without looking at any other signal.
    fn is_interactive(&self) -> bool;

    /// Resolved IANA timezone name, e.g. `Asia/Jakarta`
    fn timezone(&self) -> Option<String>;

    /// Primary language tag, e.g. `id-ID`
    fn primary_language(&self) -> Option<String>;

    /// Ordered language preference list
    fn languages(&self) -> Vec<String>;

    /// Minutes to add to local time to reach UTC
    ///
    /// Follows the browser `getTimezoneOffset` sign convention, so UTC+7 is
    /// `-420`.
    fn timezone_offset_minutes(&self) -> Option<i32>;

    /// Capture every signal into a resolver snapshot
    ///
    /// The persisted preference is left empty; it comes from storage.
    fn signals(&self) -> Signals {
        Signals {
            interactive: self.is_interactive(),
            persisted: None,
            timezone: self.timezone(),
            primary_language: self.primary_language(),
            languages: self.languages(),
            timezone_offset_minutes: self.timezone_offset_minutes(),
        }
    }
}

/// Signals read from the host machine
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemEnvironment;

/// Where the IANA zone name can be recovered from the localtime symlink
const ZONEINFO_MARKER: &str = "zoneinfo/";

impl SystemEnvironment {
    fn timezone_from_env() -> Option<String> {
        let tz = std::env::var("TZ").ok()?;
        let tz = tz.trim().trim_start_matches(':');
        if tz.is_empty() {
            return None;
        }
        Some(
            tz.rsplit_once(ZONEINFO_MARKER)
                .map_or(tz, |(_, name)| name)
                .to_string(),
        )
    }

    fn timezone_from_localtime(path: &Path) -> Option<String> {
        let target = std::fs::read_link(path).ok()?;
        let target = target.to_string_lossy();
        target
            .rsplit_once(ZONEINFO_MARKER)
            .map(|(_, name)| name.to_string())
    }
}

impl EnvironmentSignals for SystemEnvironment {
    fn is_interactive(&self) -> bool {
        true
    }

    fn timezone(&self) -> Option<String> {
        Self::timezone_from_env()
            .or_else(|| Self::timezone_from_localtime(Path::new("/etc/localtime")))
    }

    fn primary_language(&self) -> Option<String> {
        sys_locale::get_locale()
    }

    fn languages(&self) -> Vec<String> {
        sys_locale::get_locales().collect()
    }

    fn timezone_offset_minutes(&self) -> Option<i32> {
        let east_of_utc_secs = chrono::Local::now().offset().local_minus_utc();
        Some(-east_of_utc_secs / 60)
    }
}

/// Context without a visitor, such as server-side rendering
#[derive(Debug, Default, Clone, Copy)]
pub struct HeadlessEnvironment;

impl EnvironmentSignals for HeadlessEnvironment {
    fn is_interactive(&self) -> bool {
        false
    }

    fn timezone(&self) -> Option<String> {
        None
    }

    fn primary_language(&self) -> Option<String> {
        None
    }

    fn languages(&self) -> Vec<String> {
        Vec::new()
    }

    fn timezone_offset_minutes(&self) -> Option<i32> {
        None
    }
}

/// Environment with caller-chosen signal values
///
/// ```rust,ignore
/// let env = FixedEnvironment::new()
///     .with_timezone("Australia/Perth")
///     .with_offset_minutes(-480)
///     .with_languages(["en-AU"]);
/// ```
#[derive(Debug, Clone)]
pub struct FixedEnvironment {
    interactive: bool,
    timezone: Option<String>,
    primary_language: Option<String>,
    languages: Vec<String>,
    offset_minutes: Option<i32>,
}

impl Default for FixedEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

impl FixedEnvironment {
    /// Interactive environment with no signals set
    pub fn new() -> Self {
        Self {
            interactive: true,
            timezone: None,
            primary_language: None,
            languages: Vec::new(),
            offset_minutes: None,
        }
    }

    /// Mark the environment as headless
    pub fn headless(mut self) -> Self {
        self.interactive = false;
        self
    }

    /// Set the IANA timezone name
    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = Some(timezone.into());
        self
    }

    /// Set the primary language tag
    pub fn with_primary_language(mut self, tag: impl Into<String>) -> Self {
        self.primary_language = Some(tag.into());
        self
    }

    /// Set the language preference list
    ///
    /// The first entry also becomes the primary language unless one was set.
    pub fn with_languages<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.languages = tags.into_iter().map(Into::into).collect();
        if self.primary_language.is_none() {
            self.primary_language = self.languages.first().cloned();
        }
        self
    }

    /// Set the offset in `getTimezoneOffset` convention (UTC+7 is `-420`)
    pub fn with_offset_minutes(mut self, minutes: i32) -> Self {
        self.offset_minutes = Some(minutes);
        self
    }
}

impl EnvironmentSignals for FixedEnvironment {
    fn is_interactive(&self) -> bool {
        self.interactive
    }

    fn timezone(&self) -> Option<String> {
        self.timezone.clone()
    }

    fn primary_language(&self) -> Option<String> {
        self.primary_language.clone()
    }

    fn languages(&self) -> Vec<String> {
        self.languages.clone()
    }

    fn timezone_offset_minutes(&self) -> Option<i32> {
        self.offset_minutes
    }
}
