use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use folio_i18n::config::Config;
use folio_i18n::i18n::{
    EnvironmentSignals, HeadlessEnvironment, LanguageSwitch, ManualOverride, SystemEnvironment,
};
use folio_i18n::resources::{audit, Namespace};
use folio_i18n::session::LocaleSession;
use folio_i18n::Locale;

#[derive(Parser)]
#[command(
    name = "folio-i18n",
    version,
    about = "Locale resolution and translations for the boba.dev portfolio",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (TOML); environment variables are used otherwise
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json)
    #[arg(long, global = true)]
    log_format: Option<String>,

    /// Resolve as a headless (server-side) context
    #[arg(long, global = true)]
    headless: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the initial locale and the rule that picked it
    Resolve,

    /// Look up a translation key in the current locale
    Lookup {
        /// Namespace (common, hero, about, ...)
        namespace: String,

        /// Dotted key path
        key: String,

        /// Interpolation argument, repeatable
        #[arg(short, long = "arg", value_name = "NAME=VALUE")]
        args: Vec<String>,
    },

    /// Switch language as the visitor (sets the manual flag)
    Switch {
        /// Target locale (en, id)
        locale: String,
    },

    /// Flip between English and Indonesian (sets the manual flag)
    Toggle,

    /// Run IP-geolocation refinement once
    Refine {
        /// Skip the post-render delay
        #[arg(long)]
        no_delay: bool,
    },

    /// Check that every locale ships the same keys
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };
    if let Some(format) = &cli.log_format {
        config.logging.format = format.clone();
    }
    config.validate()?;

    // Initialize tracing/logging
    setup_tracing(&config.logging.format, &config.logging.level, cli.verbose)?;

    let env: &dyn EnvironmentSignals = if cli.headless {
        &HeadlessEnvironment
    } else {
        &SystemEnvironment
    };

    match cli.command {
        Commands::Resolve => {
            tracing::info!("Starting resolve command");
            resolve(&config, env)?;
        }

        Commands::Lookup {
            namespace,
            key,
            args,
        } => {
            tracing::info!(namespace = %namespace, key = %key, "Starting lookup command");
            lookup(&config, env, &namespace, &key, &args)?;
        }

        Commands::Switch { locale } => {
            tracing::info!(locale = %locale, "Starting switch command");
            let locale: Locale = locale.parse()?;
            switch(&config, env, Some(locale))?;
        }

        Commands::Toggle => {
            tracing::info!("Starting toggle command");
            switch(&config, env, None)?;
        }

        Commands::Refine { no_delay } => {
            tracing::info!(no_delay = %no_delay, "Starting refine command");
            if no_delay {
                config.refinement.delay_ms = 0;
            }
            refine(&config, env).await?;
        }

        Commands::Check => {
            tracing::info!("Starting check command");
            check()?;
        }
    }

    Ok(())
}

fn setup_tracing(format: &str, level: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("folio_i18n=debug,info")
    } else {
        tracing_subscriber::EnvFilter::try_new(format!("folio_i18n={level},warn"))
            .context("Invalid log level")?
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
                .init();
        }
    }

    Ok(())
}

fn resolve(config: &Config, env: &dyn EnvironmentSignals) -> Result<()> {
    let session = LocaleSession::from_config(config, env)?;
    let resolution = session.engine().initial_resolution();

    println!("Locale: {} ({})", resolution.locale, resolution.locale.display_name());
    println!("  Decided by: {}", resolution.source);
    println!(
        "  Manual selection: {}",
        ManualOverride::is_set(session.engine().store())
    );
    Ok(())
}

fn lookup(
    config: &Config,
    env: &dyn EnvironmentSignals,
    namespace: &str,
    key: &str,
    raw_args: &[String],
) -> Result<()> {
    let namespace: Namespace = namespace.parse()?;
    let args = raw_args
        .iter()
        .map(|arg| {
            arg.split_once('=')
                .with_context(|| format!("Argument must be NAME=VALUE: {arg}"))
        })
        .collect::<Result<Vec<_>>>()?;

    let session = LocaleSession::from_config(config, env)?;
    let value = session.engine().lookup(namespace, key, &args);
    println!("{value}");
    Ok(())
}

fn switch(config: &Config, env: &dyn EnvironmentSignals, target: Option<Locale>) -> Result<()> {
    let session = LocaleSession::from_config(config, env)?;
    let engine = session.engine();
    let before = engine.current_locale();

    let changed = match target {
        Some(locale) => LanguageSwitch::select(engine, locale),
        None => {
            LanguageSwitch::toggle(engine);
            true
        }
    };

    if changed {
        println!("Switched {before} -> {}", engine.current_locale());
    } else {
        println!("Already using {before}");
    }
    Ok(())
}

async fn refine(config: &Config, env: &dyn EnvironmentSignals) -> Result<()> {
    let session = LocaleSession::from_config(config, env)?;

    let Some(handle) = session.start_refinement() else {
        println!("Refinement disabled");
        return Ok(());
    };

    let outcome = handle.await.context("Refinement task failed")?;
    println!("Refinement: {outcome}");
    println!("Locale: {}", session.engine().current_locale());
    Ok(())
}

fn check() -> Result<()> {
    let store = folio_i18n::resources::ResourceStore::embedded()?;
    let report = audit(&store);

    for drift in &report.locales {
        for (ns, key) in &drift.missing {
            println!("{}: missing {ns}:{key}", drift.locale);
        }
        for (ns, key) in &drift.extra {
            println!("{}: extra {ns}:{key}", drift.locale);
        }
    }

    if !report.is_clean() {
        anyhow::bail!("{} translation keys missing", report.missing_count());
    }

    println!("All locales complete");
    Ok(())
}
