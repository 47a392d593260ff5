//! CLI subcommands.

pub mod courses;
pub mod users;

use aula_core::EmailError;
use aula_web::config::{AulaConfig, ConfigError};
use aula_web::data::DataManager;
use aula_web::store::{RemoteStore, StoreError};
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The remote store rejected or failed a request.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// User already on the allowlist.
    #[error("User already exists with email: {0}")]
    UserExists(String),

    /// User not on the allowlist.
    #[error("No user with email: {0}")]
    UserNotFound(String),
}

/// Open the configured store.
///
/// # Errors
///
/// Returns an error if the configuration is missing or the store client
/// cannot be built.
pub fn connect() -> Result<DataManager, CliError> {
    let config = AulaConfig::from_env()?;
    let store = RemoteStore::from_config(&config.store)?;
    tracing::debug!(backend = store.backend(), "Store ready");
    Ok(DataManager::new(store))
}
