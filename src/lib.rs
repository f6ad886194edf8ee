//! folio-i18n - locale resolution and content localization for boba.dev
//!
//! The portfolio site renders in English or Indonesian. This crate decides
//! which, keeps the decision across visits, and serves the translated strings.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Configuration management and settings
//! - [`i18n`] - Locale resolution, translation engine, refinement, manual override
//! - [`resources`] - Embedded translation bundles and completeness audit
//! - [`storage`] - Durable preference storage
//! - [`session`] - Composition root wiring the pieces together
//! - [`error`] - Unified error type
//!
//! # Example
//!
//! ```no_run
//! use folio_i18n::config::Config;
//! use folio_i18n::i18n::SystemEnvironment;
//! use folio_i18n::session::LocaleSession;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let session = LocaleSession::from_config(&config, &SystemEnvironment)?;
//!     println!("{}", session.engine().translate("hero:subtitle", &[]));
//!
//!     if let Some(refinement) = session.start_refinement() {
//!         refinement.await?;
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod i18n;
pub mod resources;
pub mod session;
pub mod storage;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::{Error, ErrorCategory, FolioErrorTrait, Result};
    pub use crate::i18n::{
        EnvironmentSignals, LanguageSwitch, Locale, ManualOverride, RefineOutcome, Refiner,
        TranslationEngine,
    };
    pub use crate::resources::{Namespace, ResourceStore, ResourceValue};
    pub use crate::session::LocaleSession;
    pub use crate::storage::{PreferenceStore, LOCALE_KEY, MANUAL_KEY};
}

// Direct re-exports for convenience
pub use i18n::Locale;
pub use resources::Namespace;
