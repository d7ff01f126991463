//! Port for follow edge persistence.

use async_trait::async_trait;

use crate::domain::{AccountId, Relationship};

use super::define_port_error;

define_port_error! {
    /// Errors raised by relationship repository adapters.
    pub enum RelationshipRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "relationship repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "relationship repository query failed: {message}",
        /// One of the edge endpoints does not exist.
        UnknownEndpoint { message: String } => "relationship endpoint missing: {message}",
        /// Storage refused an edge whose endpoints are equal.
        SelfPair => "relationship endpoints must differ",
    }
}

/// Storage for directed `(follower, followee)` edges.
///
/// At most one edge exists per ordered pair. Adapters must remove every edge
/// touching an account when that account is destroyed.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RelationshipRepository: Send + Sync {
    /// Insert the edge unless the pair already exists.
    ///
    /// Returns `true` when a new edge was written and `false` when the pair
    /// was already present; the existing edge keeps its creation time.
    async fn insert_if_absent(
        &self,
        relationship: &Relationship,
    ) -> Result<bool, RelationshipRepositoryError>;

    /// Remove the edge. Returns `false` when it did not exist.
    async fn delete(
        &self,
        follower: &AccountId,
        followee: &AccountId,
    ) -> Result<bool, RelationshipRepositoryError>;

    /// Whether the edge exists.
    async fn exists(
        &self,
        follower: &AccountId,
        followee: &AccountId,
    ) -> Result<bool, RelationshipRepositoryError>;

    /// Edges where `follower` is the follower.
    async fn followee_edges(
        &self,
        follower: &AccountId,
    ) -> Result<Vec<Relationship>, RelationshipRepositoryError>;

    /// Edges where `followee` is the followee.
    async fn follower_edges(
        &self,
        followee: &AccountId,
    ) -> Result<Vec<Relationship>, RelationshipRepositoryError>;

    /// Remove every edge with `account` at either end, returning the count.
    async fn delete_touching(&self, account: &AccountId)
    -> Result<u64, RelationshipRepositoryError>;
}
