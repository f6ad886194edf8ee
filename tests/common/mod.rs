//! Common test utilities

use folio_i18n::config::Config;
use folio_i18n::i18n::{FixedEnvironment, GeoLocator, IpApiLocator};
use folio_i18n::session::LocaleSession;
use folio_i18n::storage::PreferenceStore;
use std::sync::Arc;

/// Visitor outside Indonesia with an English browser
pub fn us_visitor() -> FixedEnvironment {
    FixedEnvironment::new()
        .with_timezone("America/New_York")
        .with_languages(["en-US", "en"])
        .with_offset_minutes(300)
}

/// Visitor in Jakarta with an English browser
#[allow(dead_code)]
pub fn jakarta_visitor() -> FixedEnvironment {
    FixedEnvironment::new()
        .with_timezone("Asia/Jakarta")
        .with_languages(["en-US"])
        .with_offset_minutes(-420)
}

/// Build a session against a mock geolocation endpoint
#[allow(dead_code)]
pub fn session_with_endpoint(
    endpoint: &str,
    store: Arc<dyn PreferenceStore>,
    env: &FixedEnvironment,
) -> LocaleSession {
    let mut config = Config::default();
    config.refinement.endpoint = endpoint.to_string();
    config.refinement.delay_ms = 0;

    let locator: Arc<dyn GeoLocator> = Arc::new(IpApiLocator::new(endpoint).unwrap());
    LocaleSession::with_parts(&config, store, Some(locator), env).unwrap()
}
