use crate::error::DbError;
use configuration::DatabaseConfig;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::PgPool;
use std::str::FromStr;
use std::time::Duration;

/// Builds the connection options for the configured server.
///
/// No defaults are filled in here: every value comes from the configuration. The
/// session time zone is passed as a startup parameter.
pub fn connect_options(config: &DatabaseConfig) -> Result<PgConnectOptions, DbError> {
    let port: u16 = config.port.trim().parse().map_err(|_| {
        DbError::ConnectionConfigError(format!("port `{}` is not a valid TCP port", config.port))
    })?;
    let ssl_mode = PgSslMode::from_str(&config.ssl_mode).map_err(|_| {
        DbError::ConnectionConfigError(format!("unknown ssl mode `{}`", config.ssl_mode))
    })?;

    Ok(PgConnectOptions::new()
        .host(&config.host)
        .port(port)
        .database(&config.database)
        .username(&config.user)
        .password(&config.password)
        .ssl_mode(ssl_mode)
        .options([("TimeZone", config.timezone.as_str())]))
}

/// A human-readable description of the connection target. Never includes the password.
pub fn describe_target(config: &DatabaseConfig) -> String {
    format!(
        "server={}:{} database={} user={} timezone={} sslmode={}",
        config.host, config.port, config.database, config.user, config.timezone, config.ssl_mode
    )
}

/// Establishes a connection pool to the PostgreSQL database.
///
/// One connection is opened eagerly, so an unreachable or misconfigured server is
/// reported here rather than on first use. There is no retry; the caller decides
/// whether a failure is fatal.
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DbError> {
    tracing::info!(target_db = %describe_target(config), "Connecting to the database server...");

    let options = connect_options(config)?;
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect_with(options)
        .await
        .inspect_err(|e| tracing::error!(error = %e, host = %config.host, "Failed to connect to the database server."))?;

    tracing::info!(host = %config.host, "Connected to the database server.");
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> DatabaseConfig {
        DatabaseConfig {
            host: "db.internal".to_string(),
            port: "5433".to_string(),
            database: "mining".to_string(),
            user: "miner".to_string(),
            password: "s3cret-pw".to_string(),
            timezone: "America/Chicago".to_string(),
            ssl_mode: "disable".to_string(),
            max_connections: 5,
            acquire_timeout_secs: 5,
        }
    }

    #[test]
    fn builds_options_from_discrete_parameters() {
        let options = connect_options(&config()).unwrap();
        assert_eq!(options.get_host(), "db.internal");
        assert_eq!(options.get_port(), 5433);
        assert_eq!(options.get_database(), Some("mining"));
        assert_eq!(options.get_username(), "miner");
    }

    #[test]
    fn rejects_non_numeric_port() {
        let mut config = config();
        config.port = "abc".to_string();
        assert!(matches!(connect_options(&config), Err(DbError::ConnectionConfigError(_))));
    }

    #[test]
    fn rejects_unknown_ssl_mode() {
        let mut config = config();
        config.ssl_mode = "sometimes".to_string();
        assert!(matches!(connect_options(&config), Err(DbError::ConnectionConfigError(_))));
    }

    #[test]
    fn description_omits_password() {
        let description = describe_target(&config());
        assert!(description.contains("db.internal:5433"));
        assert!(description.contains("user=miner"));
        assert!(!description.contains("s3cret-pw"));
    }
}
