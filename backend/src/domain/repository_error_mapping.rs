//! Translation of driven-port errors into domain errors.
//!
//! Connection failures become retryable storage errors. Query failures are
//! internal errors whose detail is logged but kept out of the caller-facing
//! message.

use tracing::{error, warn};

use super::Error;
use super::ports::{AccountRepositoryError, PostRepositoryError, RelationshipRepositoryError};

fn unavailable(store: &'static str, message: String) -> Error {
    warn!(store, %message, "storage connection failed");
    Error::storage_unavailable(format!("{store} storage unavailable"))
}

fn failed(store: &'static str, message: String) -> Error {
    error!(store, %message, "storage query failed");
    Error::internal(format!("{store} storage error"))
}

pub(crate) fn map_account_error(err: AccountRepositoryError) -> Error {
    match err {
        AccountRepositoryError::Connection { message } => unavailable("account", message),
        AccountRepositoryError::Query { message } => failed("account", message),
        AccountRepositoryError::DuplicateEmail => Error::duplicate_email(),
    }
}

pub(crate) fn map_relationship_error(err: RelationshipRepositoryError) -> Error {
    match err {
        RelationshipRepositoryError::Connection { message } => {
            unavailable("relationship", message)
        }
        RelationshipRepositoryError::Query { message } => failed("relationship", message),
        RelationshipRepositoryError::UnknownEndpoint { message } => Error::unknown_account(message),
        RelationshipRepositoryError::SelfPair => Error::self_follow(),
    }
}

pub(crate) fn map_post_error(err: PostRepositoryError) -> Error {
    match err {
        PostRepositoryError::Connection { message } => unavailable("post", message),
        PostRepositoryError::Query { message } => failed("post", message),
    }
}
