use thiserror::Error;

use crate::actor_framework::FrameworkError;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProductError {
    #[error("Product not found: {0}")]
    NotFound(String),
    #[error("Products not found")]
    CatalogEmpty,
    #[error("Product already reviewed")]
    AlreadyReviewed,
    #[error("Invalid rating: {0}")]
    InvalidRating(String),
    #[error("Product cannot be created: {0}")]
    CreationFailed(String),
    #[error("Product database error: {0}")]
    DatabaseError(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<FrameworkError<ProductError>> for ProductError {
    fn from(err: FrameworkError<ProductError>) -> Self {
        match err {
            FrameworkError::NotFound(id) => ProductError::NotFound(id),
            FrameworkError::Entity(e) => e,
            FrameworkError::DuplicateKey(key) => ProductError::DatabaseError(format!("duplicate key {key}")),
            e @ (FrameworkError::ActorClosed | FrameworkError::ActorDropped) => {
                ProductError::ActorCommunicationError(e.to_string())
            }
        }
    }
}
