use crate::error::ConfigError;
use config::builder::DefaultState;
use config::{ConfigBuilder, Environment, File, FileFormat};
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;
pub mod telemetry;

// Re-export the core types to provide a clean public API.
pub use settings::{Config, DatabaseSettings, LoanSettings, LoggingSettings};
pub use telemetry::init_logging;

/// Environment variables with this prefix override file values,
/// e.g. `LIBRIS__DATABASE__PASSWORD`.
pub const ENV_PREFIX: &str = "LIBRIS";

/// Command-line arguments that pick the configuration file.
#[cfg(feature = "clap")]
#[derive(Debug, Clone, clap::Args)]
pub struct ConfigArgs {
    /// Path to the TOML configuration file. A missing file means "use defaults".
    #[arg(long, global = true, default_value = "config.toml")]
    pub config: std::path::PathBuf,
}

/// Loads the application configuration.
///
/// Sources, lowest priority first: built-in defaults, the TOML file at `path`
/// (optional), `LIBRIS__*` environment variables, and finally `DATABASE_URL`.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let mut builder = config::Config::builder()
        .add_source(File::from(path).format(FileFormat::Toml).required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

    if let Ok(url) = std::env::var("DATABASE_URL") {
        builder = builder.set_override("database.url", url)?;
    }

    finish(builder)
}

/// Loads the configuration from an in-memory TOML document, without consulting
/// the environment.
pub fn load_config_from_str(toml: &str) -> Result<Config, ConfigError> {
    let builder = config::Config::builder().add_source(File::from_str(toml, FileFormat::Toml));
    finish(builder)
}

fn finish(builder: ConfigBuilder<DefaultState>) -> Result<Config, ConfigError> {
    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.build()?.try_deserialize::<Config>()?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    config
        .loans
        .loan_period()
        .map_err(|e| ConfigError::ValidationError(e.to_string()))?;

    let db = &config.database;
    if db.max_connections == 0 {
        return Err(ConfigError::ValidationError(
            "database.max_connections must be at least 1".to_string(),
        ));
    }
    if db.url.is_none() && (db.host.trim().is_empty() || db.name.trim().is_empty()) {
        return Err(ConfigError::ValidationError(
            "database.host and database.name are required unless a URL is given".to_string(),
        ));
    }
    Ok(())
}
