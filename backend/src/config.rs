//! Runtime settings loaded via OrthoConfig.
//!
//! Values come from `SOCIAL_*` environment variables, configuration files,
//! and command-line flags, in OrthoConfig's usual precedence. The pool size
//! carries a declared default so an empty environment still loads; the other
//! fields are optional and their accessors supply defaults.

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::{
    PasswordAuthenticator, PasswordHashingError, PasswordHashingParams, StorageDeadline,
};
use crate::outbound::persistence::PoolConfig;

/// Errors raised when settings are incomplete or inconsistent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("SOCIAL_DATABASE_URL is not set")]
    MissingDatabaseUrl,
    #[error("storage timeout must be greater than zero")]
    ZeroStorageTimeout,
    #[error(transparent)]
    PasswordHashing(#[from] PasswordHashingError),
}

/// Settings for the storage adapters and the password hasher.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "SOCIAL")]
pub struct SocialSettings {
    /// PostgreSQL connection string.
    pub database_url: Option<String>,
    /// Maximum pooled connections.
    #[ortho_config(default = 10)]
    pub pool_max_size: u32,
    /// Deadline for a single storage call, in milliseconds.
    pub storage_timeout_ms: Option<u64>,
    /// Argon2 memory cost in KiB.
    pub password_memory_kib: Option<u32>,
    /// Argon2 pass count.
    pub password_iterations: Option<u32>,
    /// Argon2 lane count.
    pub password_parallelism: Option<u32>,
}

impl SocialSettings {
    /// Configured database URL.
    pub fn database_url(&self) -> Result<&str, SettingsError> {
        self.database_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or(SettingsError::MissingDatabaseUrl)
    }

    /// Pool configuration for [`crate::outbound::persistence::DbPool`].
    ///
    /// The checkout timeout matches the storage deadline.
    pub fn pool_config(&self) -> Result<PoolConfig, SettingsError> {
        let deadline = self.storage_deadline()?;
        Ok(PoolConfig::new(self.database_url()?)
            .with_max_size(self.pool_max_size)
            .with_connection_timeout(deadline.timeout()))
    }

    /// Per-call storage deadline, five seconds unless overridden.
    pub fn storage_deadline(&self) -> Result<StorageDeadline, SettingsError> {
        match self.storage_timeout_ms {
            None => Ok(StorageDeadline::DEFAULT),
            Some(0) => Err(SettingsError::ZeroStorageTimeout),
            Some(ms) => Ok(StorageDeadline::new(Duration::from_millis(ms))),
        }
    }

    /// Argon2 cost parameters, each falling back to the library default.
    pub fn password_params(&self) -> PasswordHashingParams {
        let defaults = PasswordHashingParams::default();
        PasswordHashingParams::new(
            self.password_memory_kib.unwrap_or(defaults.memory_kib),
            self.password_iterations.unwrap_or(defaults.iterations),
            self.password_parallelism.unwrap_or(defaults.parallelism),
        )
    }

    /// Build the password authenticator from the configured parameters.
    pub fn authenticator(&self) -> Result<PasswordAuthenticator, SettingsError> {
        Ok(PasswordAuthenticator::new(self.password_params())?)
    }
}
