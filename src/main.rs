// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, warn};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;

use crate::app_config::{Config, TranslationProviderKind};
use app_controller::Controller;

mod app_config;
mod app_controller;
mod errors;
mod locale_utils;
mod providers;
mod replication;
mod store;
mod translation;

/// CLI Wrapper for TranslationProviderKind to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliProvider {
    Google,
    DeepL,
    Mock,
}

impl From<CliProvider> for TranslationProviderKind {
    fn from(cli_provider: CliProvider) -> Self {
        match cli_provider {
            CliProvider::Google => TranslationProviderKind::Google,
            CliProvider::DeepL => TranslationProviderKind::DeepL,
            CliProvider::Mock => TranslationProviderKind::Mock,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Replicate all published content into target locales
    Replicate {
        /// Target locale code; when omitted, every configured target is used
        #[arg(short, long)]
        target: Option<String>,
    },

    /// Translate one entry and print it, without writing to the store
    TranslateEntry {
        /// Collection name
        #[arg(short, long)]
        collection: String,

        /// Entry id
        #[arg(short, long)]
        id: i64,

        /// Target locale code
        #[arg(short, long)]
        target: String,
    },

    /// Translate raw strings and print them one per line
    Texts {
        /// Target locale code
        #[arg(short, long)]
        target: String,

        /// Strings to translate
        #[arg(value_name = "TEXT", required = true)]
        texts: Vec<String>,
    },

    /// Repair cross-locale links of one entry or a whole collection
    Repair {
        /// Collection name
        #[arg(short, long)]
        collection: String,

        /// Entry id; when omitted, the whole collection is swept
        #[arg(short, long)]
        id: Option<i64>,
    },

    /// Report entries missing a stable document identity
    Audit,

    /// List the languages the translation provider supports
    Languages,

    /// List the store's configured locales, minus the source locale
    Locales,

    /// Print the active configuration with secrets redacted
    Config,

    /// Generate shell completions for locweave
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// locweave - locale replication for headless content stores
///
/// Replicates published content entries from the source locale into target
/// locales by machine-translating their text fields and writing locale
/// variant records back into the store.
#[derive(Parser, Debug)]
#[command(name = "locweave")]
#[command(version = "1.0.0")]
#[command(about = "Cross-locale content replication for headless content stores")]
#[command(long_about = "locweave discovers published entries in a content store, translates their
text fields with a machine-translation provider, and creates locale variant
records - skipping variants that already exist, so repeated runs are safe.

EXAMPLES:
    locweave replicate -t es               # Replicate everything into Spanish
    locweave replicate                     # Replicate into every configured target
    locweave translate-entry -c article -i 12 -t fr
    locweave texts -t de \"Hello\" \"Goodbye\"
    locweave repair -c article -i 27       # Clean one entry's locale links
    locweave audit                         # Find entries without documentIds
    locweave completions bash > locweave.bash

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a
    different config file with --config. If the config file doesn't exist,
    a default one will be created automatically.

SUPPORTED PROVIDERS:
    google - Google Cloud Translation v2 (requires API key)
    deepl  - DeepL API v2 (requires API key)
    mock   - offline pseudo-translations, for dry runs")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Translation provider to use
    #[arg(short, long, value_enum, global = true)]
    provider: Option<CliProvider>,

    /// Source locale code (e.g. 'en')
    #[arg(short, long, global = true)]
    source_locale: Option<String>,

    /// Configuration file path
    #[arg(long, default_value = "conf.json", global = true)]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,
}

/// Custom logger writing timestamped, colored lines to stderr
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S%.3f");
            let color = Self::color_for_level(record.level());
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {:5} {}\x1B[0m",
                color, now, record.level(), record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn level_filter(level: &app_config::LogLevel) -> LevelFilter {
    match level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default;
    // the level is updated after the config is loaded
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(*shell, &mut cmd, "locweave", &mut std::io::stdout());
        return Ok(());
    }

    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &cli.log_level {
        let config_log_level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level_filter(&config_log_level));
    }

    // Load or create configuration
    let config_path = &cli.config_path;
    let mut config = if Path::new(config_path).exists() {
        let file = File::open(config_path)
            .context(format!("Failed to open config file: {}", config_path))?;
        let reader = BufReader::new(file);
        serde_json::from_reader::<_, Config>(reader)
            .context(format!("Failed to parse config file: {}", config_path))?
    } else {
        warn!("Config file not found at '{}', creating default config.", config_path);

        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        std::fs::write(config_path, config_json)
            .context(format!("Failed to write default config to file: {}", config_path))?;
        config
    };

    // Override config with CLI options if provided
    if let Some(provider) = &cli.provider {
        config.translation.provider = provider.clone().into();
    }
    if let Some(source_locale) = &cli.source_locale {
        config.source_locale = source_locale.clone();
    }
    if let Some(log_level) = &cli.log_level {
        config.log_level = log_level.clone().into();
    }

    // Validate the configuration after loading and overriding
    config.validate()
        .context("Configuration validation failed")?;

    // If log level was not set via command line, update it from config now
    if cli.log_level.is_none() {
        log::set_max_level(level_filter(&config.log_level));
    }

    let controller = Controller::with_config(config)?;

    match cli.command {
        Commands::Replicate { target } => controller.run_replicate(target).await,
        Commands::TranslateEntry { collection, id, target } => {
            controller.run_translate_entry(&collection, id, &target).await
        }
        Commands::Texts { target, texts } => controller.run_texts(&texts, &target).await,
        Commands::Repair { collection, id } => controller.run_repair(&collection, id).await,
        Commands::Audit => controller.run_audit().await,
        Commands::Languages => controller.run_languages().await,
        Commands::Locales => controller.run_locales().await,
        Commands::Config => controller.run_show_config(),
        Commands::Completions { .. } => Err(anyhow!("unreachable: completions handled above")),
    }
}
