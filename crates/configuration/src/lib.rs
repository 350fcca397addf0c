//! # AutoFi Configuration
//!
//! Typed settings for the whole workspace, loaded from `config.toml` with
//! `AUTOFI__SECTION__KEY` environment overrides, plus the tracing setup every
//! binary shares.

use crate::error::ConfigError;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;
pub mod telemetry;
pub mod validation;

// Re-export the core types to provide a clean public API.
pub use settings::{
    Config, Deployment, LoggingSettings, RebalanceSettings, ServerSettings, StorageSettings,
    StrategySeed, VaultSettings,
};
pub use telemetry::init_tracing;
pub use validation::validate;

/// Loads the application configuration from the `config.toml` file.
///
/// This function is the primary entry point for this crate. It reads the configuration file,
/// deserializes it into our strongly-typed `Config` struct, validates it, and returns it.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from("config.toml")
}

/// Same as [`load_config`] but reads the given file. The extension may be omitted.
pub fn load_config_from(path: &str) -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::with_name(path))
        // e.g. `AUTOFI__SERVER__PORT=9000`
        .add_source(
            config::Environment::with_prefix("AUTOFI")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    validate(&config)?;

    Ok(config)
}

/// Parses and validates configuration from TOML text, without environment
/// overrides.
pub fn load_config_str(toml: &str) -> Result<Config, ConfigError> {
    let config = config::Config::builder()
        .add_source(config::File::from_str(toml, config::FileFormat::Toml))
        .build()?
        .try_deserialize::<Config>()?;
    validate(&config)?;
    Ok(config)
}
