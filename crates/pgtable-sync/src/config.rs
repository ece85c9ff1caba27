//! Connection configuration.
//!
//! Every setting can come from a command-line flag or from the usual libpq
//! environment variables (`PGHOST`, `PGPORT`, ...).

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use clap::Args;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};

use crate::error::{Result, SyncError};

/// Default maximum number of open connections per pool.
pub const DEFAULT_MAX_CONNECTIONS: i64 = 20;

/// Default time to wait for a connection, in seconds.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: i64 = 180;

/// How long an unused connection is kept before being closed.
const IDLE_TIMEOUT: Duration = Duration::from_secs(1);

/// Stand-in for "wait indefinitely" when acquiring a connection.
const INDEFINITE_TIMEOUT: Duration = Duration::from_secs(60 * 60 * 24 * 365);

/// PostgreSQL connection settings.
#[derive(Clone, PartialEq, Eq, Args)]
pub struct ConnectionConfig {
    /// PostgreSQL server address to connect to.
    #[arg(long, env = "PGHOST", default_value = "localhost")]
    pub host: String,

    /// PostgreSQL port number.
    #[arg(long, env = "PGPORT", default_value_t = 5432)]
    pub port: u16,

    /// Database to connect to.
    #[arg(long, env = "PGDATABASE", default_value = "postgres")]
    pub database: String,

    /// User name to connect as.
    #[arg(long, env = "PGUSER", default_value = "postgres")]
    pub username: String,

    /// Password, if the server demands password authentication.
    #[arg(long, env = "PGPASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// SSL mode (disable, allow, prefer, require, verify-ca, verify-full).
    #[arg(long, env = "PGSSLMODE", default_value = "prefer")]
    pub sslmode: String,

    /// Maximum wait for a connection, in seconds. Zero or negative waits
    /// indefinitely.
    #[arg(
        long,
        env = "PGCONNECT_TIMEOUT",
        default_value_t = DEFAULT_CONNECT_TIMEOUT_SECS,
        allow_negative_numbers = true,
        value_parser = clap::value_parser!(i64).range(-1..)
    )]
    pub connect_timeout: i64,

    /// Maximum number of connections to open. Zero or negative means
    /// unlimited.
    #[arg(
        long,
        default_value_t = DEFAULT_MAX_CONNECTIONS,
        allow_negative_numbers = true,
        value_parser = clap::value_parser!(i64).range(-1..)
    )]
    pub max_connections: i64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            database: "postgres".to_string(),
            username: "postgres".to_string(),
            password: None,
            sslmode: "prefer".to_string(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT_SECS,
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("sslmode", &self.sslmode)
            .field("connect_timeout", &self.connect_timeout)
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

impl ConnectionConfig {
    /// Canonical description of where and how to connect, without the
    /// password. Equal descriptors share one pool.
    #[must_use]
    pub fn descriptor(&self) -> String {
        format!(
            "postgres://{}@{}:{}/{}?connect_timeout={}&max_connections={}&sslmode={}",
            self.username,
            self.host,
            self.port,
            self.database,
            self.connect_timeout,
            self.max_connections,
            self.sslmode
        )
    }

    /// Parses the SSL mode.
    pub fn ssl_mode(&self) -> Result<PgSslMode> {
        PgSslMode::from_str(&self.sslmode)
            .map_err(|e| SyncError::InvalidConfig(format!("sslmode {:?}: {e}", self.sslmode)))
    }

    /// Builds the driver connect options.
    pub fn connect_options(&self) -> Result<PgConnectOptions> {
        let mut options = PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.database)
            .username(&self.username)
            .ssl_mode(self.ssl_mode()?);
        if let Some(password) = &self.password {
            options = options.password(password);
        }
        Ok(options)
    }

    /// Builds the pool options.
    ///
    /// Idle connections are closed quickly and never kept warm, so a managed
    /// database is not held open between runs.
    #[must_use]
    pub fn pool_options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(self.max_open_connections())
            .min_connections(0)
            .idle_timeout(IDLE_TIMEOUT)
            .acquire_timeout(self.acquire_timeout())
    }

    fn max_open_connections(&self) -> u32 {
        if self.max_connections <= 0 {
            u32::MAX
        } else {
            u32::try_from(self.max_connections).unwrap_or(u32::MAX)
        }
    }

    fn acquire_timeout(&self) -> Duration {
        match u64::try_from(self.connect_timeout) {
            Ok(secs) if secs > 0 => Duration::from_secs(secs),
            _ => INDEFINITE_TIMEOUT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_password() {
        let config = ConnectionConfig {
            password: Some("hunter2".into()),
            ..ConnectionConfig::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_descriptor_excludes_password() {
        let config = ConnectionConfig {
            password: Some("hunter2".into()),
            ..ConnectionConfig::default()
        };
        assert_eq!(
            config.descriptor(),
            "postgres://postgres@localhost:5432/postgres?connect_timeout=180&max_connections=20&sslmode=prefer"
        );
    }

    #[test]
    fn test_descriptor_includes_database() {
        let config = ConnectionConfig {
            database: "app".into(),
            ..ConnectionConfig::default()
        };
        assert!(config.descriptor().contains("/app?"));
    }

    #[test]
    fn test_invalid_sslmode() {
        let config = ConnectionConfig {
            sslmode: "sometimes".into(),
            ..ConnectionConfig::default()
        };
        assert!(matches!(
            config.connect_options(),
            Err(SyncError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_limits() {
        let unlimited = ConnectionConfig {
            max_connections: 0,
            connect_timeout: -1,
            ..ConnectionConfig::default()
        };
        assert_eq!(unlimited.max_open_connections(), u32::MAX);
        assert_eq!(unlimited.acquire_timeout(), INDEFINITE_TIMEOUT);

        let bounded = ConnectionConfig::default();
        assert_eq!(bounded.max_open_connections(), 20);
        assert_eq!(bounded.acquire_timeout(), Duration::from_secs(180));
    }
}
