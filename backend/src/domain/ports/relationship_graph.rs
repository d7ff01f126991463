//! Driving port for the follow graph.

use async_trait::async_trait;

use crate::domain::{Account, AccountId, Error, Relationship};

/// Domain use-case port for follow edges.
#[async_trait]
pub trait RelationshipGraph: Send + Sync {
    /// Create the edge `follower -> followee`. Following twice is a no-op.
    async fn follow(&self, follower: &AccountId, followee: &AccountId) -> Result<(), Error>;

    /// Remove the edge if present. Removing a missing edge is a no-op.
    async fn unfollow(&self, follower: &AccountId, followee: &AccountId) -> Result<(), Error>;

    /// Whether `follower` follows `followee`.
    async fn is_following(&self, follower: &AccountId, followee: &AccountId)
    -> Result<bool, Error>;

    /// Accounts `account` follows, most recently followed first.
    async fn followees(&self, account: &AccountId) -> Result<Vec<Account>, Error>;

    /// Accounts following `account`, most recent follower first.
    async fn followers(&self, account: &AccountId) -> Result<Vec<Account>, Error>;

    /// Outgoing edges of `account`, newest first.
    async fn relationships(&self, account: &AccountId) -> Result<Vec<Relationship>, Error>;

    /// Incoming edges of `account`, newest first.
    async fn reverse_relationships(&self, account: &AccountId)
    -> Result<Vec<Relationship>, Error>;
}
