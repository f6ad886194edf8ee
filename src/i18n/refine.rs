//! Deferred locale refinement from IP geolocation
//!
//! The first-render locale comes from synchronous guesses. Once the page is
//! up, one best-effort geolocation lookup can correct it: a visitor in
//! Indonesia gets `id`, anyone else gets `en`. Refinement stands down when
//! the visitor picked a language by hand, and every failure degrades to
//! keeping the current locale.

use async_trait::async_trait;
use reqwest::header::{HeaderValue, ACCEPT};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use super::engine::TranslationEngine;
use super::manual::ManualOverride;
use super::Locale;

/// Free geolocation endpoint used by the site
pub const DEFAULT_GEO_ENDPOINT: &str = "https://ipapi.co/json/";

/// Delay before refinement runs, leaving first render alone
pub const DEFAULT_REFINE_DELAY: Duration = Duration::from_millis(1000);

/// Country code that selects Indonesian
const INDONESIA: &str = "ID";

/// Errors from a geolocation lookup
#[derive(Debug, thiserror::Error)]
pub enum GeoError {
    /// Transport failure or client construction error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response
    #[error("Geolocation service returned status {0}")]
    Status(u16),

    /// Body was not the expected JSON
    #[error("Malformed geolocation response: {0}")]
    Decode(String),

    /// Service answered with an error payload (quota, reserved range)
    #[error("Geolocation service error: {0}")]
    Provider(String),
}

/// Source of the visitor's country
#[async_trait]
pub trait GeoLocator: Send + Sync {
    /// Get the name used in logs
    fn name(&self) -> &str;

    /// Look up the visitor's ISO 3166-1 alpha-2 country code
    ///
    /// `Ok(None)` means the service answered without a country.
    async fn country_code(&self) -> Result<Option<String>, GeoError>;
}

/// Body returned by ipapi-style services
#[derive(Debug, Deserialize)]
struct GeoResponse {
    #[serde(default)]
    country_code: Option<String>,
    #[serde(default)]
    error: bool,
    #[serde(default)]
    reason: Option<String>,
}

/// Geolocation through an ipapi.co compatible JSON endpoint
#[derive(Debug, Clone)]
pub struct IpApiLocator {
    client: Client,
    endpoint: String,
}

impl IpApiLocator {
    /// Create a locator for `endpoint` with the client's default timeout
    ///
    /// # Errors
    ///
    /// Returns `GeoError::Http` if the HTTP client cannot be created
    pub fn new(endpoint: impl Into<String>) -> Result<Self, GeoError> {
        Self::with_timeout(endpoint, None)
    }

    /// Create a locator with an optional request timeout
    ///
    /// # Errors
    ///
    /// Returns `GeoError::Http` if the HTTP client cannot be created
    pub fn with_timeout(
        endpoint: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, GeoError> {
        let mut builder = Client::builder()
            .user_agent(concat!("folio-i18n/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            endpoint: endpoint.into(),
        })
    }

    /// Endpoint this locator queries
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl GeoLocator for IpApiLocator {
    fn name(&self) -> &str {
        "ipapi"
    }

    async fn country_code(&self) -> Result<Option<String>, GeoError> {
        let response = self
            .client
            .get(&self.endpoint)
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeoError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        let parsed: GeoResponse =
            serde_json::from_slice(&body).map_err(|e| GeoError::Decode(e.to_string()))?;

        if parsed.error {
            return Err(GeoError::Provider(
                parsed.reason.unwrap_or_else(|| String::from("unknown")),
            ));
        }

        Ok(parsed.country_code)
    }
}

/// What a refinement run did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RefineOutcome {
    /// Visitor chose a locale by hand; no lookup made
    SkippedManual,
    /// Lookup failed; locale kept
    LookupFailed,
    /// Lookup returned no country; locale kept
    NoSignal,
    /// Country agrees with the current locale
    Unchanged { locale: Locale },
    /// Locale switched
    Changed { from: Locale, to: Locale },
}

impl fmt::Display for RefineOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SkippedManual => f.write_str("skipped (manual selection)"),
            Self::LookupFailed => f.write_str("lookup failed, locale kept"),
            Self::NoSignal => f.write_str("no country returned, locale kept"),
            Self::Unchanged { locale } => write!(f, "unchanged ({locale})"),
            Self::Changed { from, to } => write!(f, "changed {from} -> {to}"),
        }
    }
}

/// Map a country code to the locale the site should use there
///
/// Returns `None` for an empty code.
pub fn locale_for_country(code: &str) -> Option<Locale> {
    let code = code.trim();
    if code.is_empty() {
        None
    } else if code.eq_ignore_ascii_case(INDONESIA) {
        Some(Locale::Id)
    } else {
        Some(Locale::En)
    }
}

/// Runs one geolocation-based correction of the current locale
#[derive(Clone)]
pub struct Refiner {
    locator: Arc<dyn GeoLocator>,
}

impl fmt::Debug for Refiner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Refiner")
            .field("locator", &self.locator.name())
            .finish()
    }
}

impl Refiner {
    /// Create a refiner backed by `locator`
    pub fn new(locator: Arc<dyn GeoLocator>) -> Self {
        Self { locator }
    }

    /// Refine the engine's locale once
    ///
    /// Never fails; see [`RefineOutcome`] for what happened.
    pub async fn refine(&self, engine: &TranslationEngine) -> RefineOutcome {
        if ManualOverride::is_active(engine) {
            tracing::debug!("Manual locale selection present, skipping refinement");
            return RefineOutcome::SkippedManual;
        }

        let country = match self.locator.country_code().await {
            Ok(country) => country,
            Err(e) => {
                tracing::debug!(
                    locator = self.locator.name(),
                    error = %e,
                    "IP geolocation failed, keeping current locale"
                );
                return RefineOutcome::LookupFailed;
            }
        };

        let Some(target) = country.as_deref().and_then(locale_for_country) else {
            tracing::debug!(locator = self.locator.name(), "No country in geolocation response");
            return RefineOutcome::NoSignal;
        };

        let current = engine.current_locale();
        tracing::debug!(country = ?country, current = %current, target = %target, "Geolocation resolved");

        if target == current {
            return RefineOutcome::Unchanged { locale: current };
        }

        engine.change_locale(target);
        RefineOutcome::Changed {
            from: current,
            to: target,
        }
    }

    /// Run [`refine`](Self::refine) once on the runtime after `delay`
    ///
    /// Must be called from within a tokio runtime. The task is not cancelled
    /// if the caller goes away; a late change is harmless.
    pub fn spawn_deferred(
        &self,
        engine: Arc<TranslationEngine>,
        delay: Duration,
    ) -> JoinHandle<RefineOutcome> {
        let refiner = self.clone();
        tokio::spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            let outcome = refiner.refine(&engine).await;
            tracing::info!(outcome = %outcome, "Locale refinement finished");
            outcome
        })
    }
}
