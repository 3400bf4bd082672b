use crate::error::ConfigError;
use config::builder::DefaultState;
use config::ConfigBuilder;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_tracing;
pub use settings::{Config, DatabaseConfig, EmailConfig, LoggingConfig};

/// The file looked up when no explicit path is given.
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Prefix of environment variables that override file values,
/// e.g. `MINING__DATABASE__PASSWORD`.
pub const ENV_PREFIX: &str = "MINING";

/// Loads the application configuration.
///
/// Values come from the TOML file at `path` (or `config.toml`, which may be absent),
/// overlaid by `MINING__*` environment variables, and are then validated.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let file = match path {
        Some(path) => config::File::with_name(path).required(true),
        None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
    };

    let builder = config::Config::builder()
        .add_source(file)
        .add_source(environment());

    from_builder(builder)
}

/// Environment overlay. Values stay strings; numeric fields are parsed on
/// deserialisation, so secrets such as `007` keep their leading zeros.
fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX).separator("__")
}

fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Config, ConfigError> {
    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.build()?.try_deserialize::<Config>()?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    let db = &config.database;
    for (field, value) in [("host", &db.host), ("database", &db.database), ("user", &db.user)] {
        if value.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!("database.{field} must not be empty")));
        }
    }
    if db.max_connections == 0 {
        return Err(ConfigError::ValidationError(
            "database.max_connections must be at least 1".to_string(),
        ));
    }

    let email = &config.email;
    if !email.server.is_empty() && (email.to.is_empty() || email.from.is_empty()) {
        return Err(ConfigError::ValidationError(
            "email.to and email.from are required when email.server is set".to_string(),
        ));
    }
    Ok(())
}
