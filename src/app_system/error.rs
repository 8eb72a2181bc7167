use thiserror::Error;

use crate::config::ConfigError;
use crate::user_actor::UserError;

/// Failures that stop the process during startup or shutdown.
#[derive(Debug, Error)]
pub enum SystemError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Invalid password hashing parameters: {0}")]
    Hasher(String),
    #[error("Admin seeding failed: {0}")]
    Seed(#[from] UserError),
    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Actor task failed: {0}")]
    ActorTask(String),
}
