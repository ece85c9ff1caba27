//! Shared connection pools.
//!
//! A [`ConnectionRegistry`] hands out one [`PgPool`] per distinct connection
//! descriptor. It is an ordinary value: construct it where the process
//! starts, pass it down, and drop or [`clear`](ConnectionRegistry::clear) it
//! when done.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use sqlx::postgres::PgPool;
use tracing::{debug, info};

use crate::config::ConnectionConfig;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ConnectionKey {
    descriptor: String,
    password: Option<String>,
}

impl From<&ConnectionConfig> for ConnectionKey {
    fn from(config: &ConnectionConfig) -> Self {
        Self {
            descriptor: config.descriptor(),
            password: config.password.clone(),
        }
    }
}

/// Registry of connection pools keyed by connection descriptor.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    pools: Mutex<HashMap<ConnectionKey, PgPool>>,
}

impl ConnectionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the pool for `config`, creating it on first use.
    ///
    /// Pools are created lazily: no connection is opened until the first
    /// statement runs. Must be called from within a Tokio runtime.
    pub fn connect(&self, config: &ConnectionConfig) -> Result<PgPool> {
        let key = ConnectionKey::from(config);
        let mut pools = self.pools.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(pool) = pools.get(&key) {
            debug!(descriptor = %key.descriptor, "Reusing connection pool");
            return Ok(pool.clone());
        }

        let pool = config
            .pool_options()
            .connect_lazy_with(config.connect_options()?);
        info!(
            host = %config.host,
            port = config.port,
            database = %config.database,
            "Registered connection pool"
        );
        pools.insert(key, pool.clone());
        Ok(pool)
    }

    /// Number of registered pools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pools
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns true if no pool is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forgets every pool. Pools still referenced elsewhere stay usable.
    pub fn clear(&self) {
        self.pools
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SyncError;

    #[tokio::test]
    async fn test_same_descriptor_shares_pool() {
        let registry = ConnectionRegistry::new();
        let config = ConnectionConfig::default();

        registry.connect(&config).unwrap();
        registry.connect(&config.clone()).unwrap();

        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_distinct_descriptors_get_distinct_pools() {
        let registry = ConnectionRegistry::new();
        let config = ConnectionConfig::default();

        registry.connect(&config).unwrap();
        registry
            .connect(&ConnectionConfig {
                database: "app".into(),
                ..config.clone()
            })
            .unwrap();
        registry
            .connect(&ConnectionConfig {
                password: Some("secret".into()),
                ..config
            })
            .unwrap();

        assert_eq!(registry.len(), 3);
    }

    #[tokio::test]
    async fn test_clear() {
        let registry = ConnectionRegistry::new();
        registry.connect(&ConnectionConfig::default()).unwrap();
        assert!(!registry.is_empty());

        registry.clear();
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_config_not_registered() {
        let registry = ConnectionRegistry::new();
        let config = ConnectionConfig {
            sslmode: "bogus".into(),
            ..ConnectionConfig::default()
        };

        assert!(matches!(
            registry.connect(&config),
            Err(SyncError::InvalidConfig(_))
        ));
        assert!(registry.is_empty());
    }
}
