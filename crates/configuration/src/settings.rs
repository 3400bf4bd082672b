use serde::Deserialize;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub email: EmailConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Connection parameters for the PostgreSQL server.
#[derive(Clone, Deserialize)]
pub struct DatabaseConfig {
    pub host: String,
    /// Kept as text; the connection layer parses and validates it.
    pub port: String,
    /// The database must already exist on the server.
    pub database: String,
    pub user: String,
    pub password: String,
    /// The time zone of the session, e.g. `America/Chicago`.
    pub timezone: String,
    /// A libpq ssl mode: `disable`, `allow`, `prefer`, `require`, `verify-ca` or `verify-full`.
    #[serde(default = "default_ssl_mode")]
    pub ssl_mode: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
}

// The password never reaches the logs through a `{:?}`.
impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("timezone", &self.timezone)
            .field("ssl_mode", &self.ssl_mode)
            .field("max_connections", &self.max_connections)
            .field("acquire_timeout_secs", &self.acquire_timeout_secs)
            .finish()
    }
}

/// SMTP settings for notifications. An empty `server` disables e-mail entirely.
#[derive(Clone, Deserialize)]
pub struct EmailConfig {
    #[serde(default)]
    pub server: String,
    #[serde(default = "default_email_port")]
    pub port: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    pub from: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            server: String::new(),
            port: default_email_port(),
            user: String::new(),
            password: String::new(),
            to: String::new(),
            from: String::new(),
        }
    }
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("server", &self.server)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("to", &self.to)
            .field("from", &self.from)
            .finish()
    }
}

/// Logging output settings.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// An `EnvFilter` directive, e.g. `info` or `database=debug,info`.
    /// `RUST_LOG` takes precedence when set.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// When set, logs are also written to a daily rolling file in this directory.
    #[serde(default)]
    pub directory: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: None,
        }
    }
}

fn default_ssl_mode() -> String {
    "disable".to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_acquire_timeout_secs() -> u64 {
    5
}

fn default_email_port() -> String {
    "587".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}
