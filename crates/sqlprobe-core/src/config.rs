//! Connection parameters and harness configuration (sqlprobe.toml)

use serde::{Deserialize, Serialize};

/// Default frontend port of the analytic backend
pub const DEFAULT_PORT: u16 = 21050;

/// Behavior of `connect()` on a session that is already connected.
///
/// Backends and drivers disagree on what a second connect means, so the
/// choice is explicit configuration rather than a guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReconnectPolicy {
    /// Keep the existing connection and return success
    Reuse,

    /// Fail with a connection error
    Error,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::Error
    }
}

/// Parameters a session is built from.
///
/// Immutable once the session exists; there is no partial reconfiguration
/// of a live connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionParameters {
    /// Backend hostname or IP
    pub host: String,

    /// Backend port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Database to connect to
    pub database: String,

    /// Username, if the backend requires authentication
    #[serde(default)]
    pub username: Option<String>,

    /// Password, passed out-of-band from the address
    #[serde(default, skip_serializing)]
    pub password: Option<String>,

    /// Second-connect behavior
    #[serde(default)]
    pub reconnect: ReconnectPolicy,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl ConnectionParameters {
    /// Create parameters for an unauthenticated connection
    pub fn new(host: impl Into<String>, port: u16, database: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            database: database.into(),
            username: None,
            password: None,
            reconnect: ReconnectPolicy::default(),
        }
    }

    /// Set credentials
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Set the second-connect behavior
    pub fn with_reconnect(mut self, reconnect: ReconnectPolicy) -> Self {
        self.reconnect = reconnect;
        self
    }

    /// Render the `<host>:<port>/<database>` connection address
    pub fn address(&self) -> String {
        format!("{}:{}/{}", self.host, self.port, self.database)
    }
}

/// Harness configuration (sqlprobe.toml)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Backend connection
    pub connection: ConnectionParameters,

    /// Name of the disposable database provisioned per test run
    #[serde(default = "default_scratch_database")]
    pub scratch_database: String,
}

fn default_scratch_database() -> String {
    "sqlancer_test".to_string()
}

impl ProbeConfig {
    /// Load config from a TOML file
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        Self::from_toml(&contents)
    }

    /// Parse config from a TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}
