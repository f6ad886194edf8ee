//! Composition root
//!
//! Builds the storage, resources, engine and refiner from a [`Config`] and
//! hands them to the caller as one [`LocaleSession`]. UI layers own the
//! session and pass the engine down; there is no global instance.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::config::Config;
use crate::error::Result;
use crate::i18n::environment::EnvironmentSignals;
use crate::i18n::refine::{GeoLocator, IpApiLocator, RefineOutcome, Refiner};
use crate::i18n::TranslationEngine;
use crate::resources::ResourceStore;
use crate::storage::{DisabledStore, FileStore, PreferenceStore};

/// Engine plus refinement wiring for one visitor session
#[derive(Debug)]
pub struct LocaleSession {
    engine: Arc<TranslationEngine>,
    refiner: Option<Refiner>,
    refinement_started: AtomicBool,
    config: Config,
}

impl LocaleSession {
    /// Build a session with the configured storage and geolocation endpoint
    ///
    /// # Errors
    ///
    /// Fails if the embedded resources are malformed or the HTTP client
    /// cannot be built.
    pub fn from_config(config: &Config, env: &dyn EnvironmentSignals) -> Result<Self> {
        let locator: Option<Arc<dyn GeoLocator>> = if config.refinement.enabled {
            Some(Arc::new(IpApiLocator::with_timeout(
                config.refinement.endpoint.clone(),
                config.geo_timeout(),
            )?))
        } else {
            None
        };

        Self::with_parts(config, open_store(config), locator, env)
    }

    /// Build a session from explicit parts
    ///
    /// # Errors
    ///
    /// Fails if the embedded resources are malformed.
    pub fn with_parts(
        config: &Config,
        store: Arc<dyn PreferenceStore>,
        locator: Option<Arc<dyn GeoLocator>>,
        env: &dyn EnvironmentSignals,
    ) -> Result<Self> {
        let resources = Arc::new(ResourceStore::embedded()?);
        let engine = Arc::new(TranslationEngine::initialize(resources, store, env));

        Ok(Self {
            engine,
            refiner: locator.map(Refiner::new),
            refinement_started: AtomicBool::new(false),
            config: config.clone(),
        })
    }

    /// Shared engine handle
    pub fn engine(&self) -> &Arc<TranslationEngine> {
        &self.engine
    }

    /// Refiner, unless refinement is disabled
    pub fn refiner(&self) -> Option<&Refiner> {
        self.refiner.as_ref()
    }

    /// Schedule the one deferred refinement run
    ///
    /// Returns `None` when refinement is disabled or was already started for
    /// this session. Must be called from within a tokio runtime.
    pub fn start_refinement(&self) -> Option<JoinHandle<RefineOutcome>> {
        let refiner = self.refiner.as_ref()?;
        if self.refinement_started.swap(true, Ordering::SeqCst) {
            tracing::debug!("Refinement already started for this session");
            return None;
        }
        Some(refiner.spawn_deferred(self.engine.clone(), self.config.refine_delay()))
    }
}

/// Open the configured preference store
pub fn open_store(config: &Config) -> Arc<dyn PreferenceStore> {
    if config.storage.enabled {
        Arc::new(FileStore::new(config.storage.path.clone()))
    } else {
        tracing::info!("Preference storage disabled, locale will not be remembered");
        Arc::new(DisabledStore)
    }
}
