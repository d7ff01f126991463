//! Follow graph operations.
//!
//! Follow and unfollow are idempotent: the relationship repository keys edges
//! by the ordered pair, so repeating either call leaves the graph unchanged.
//! Listing endpoints fetch the edge set once and the counterpart accounts in
//! a single batched lookup.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::debug;

use super::ports::{AccountRepository, RelationshipGraph, RelationshipRepository};
use super::repository_error_mapping::{map_account_error, map_relationship_error};
use super::{Account, AccountId, Error, Relationship, StorageDeadline};

/// Relationship service implementing [`RelationshipGraph`].
#[derive(Clone)]
pub struct RelationshipService<A, R> {
    accounts: Arc<A>,
    relationships: Arc<R>,
    clock: Arc<dyn Clock>,
    deadline: StorageDeadline,
}

impl<A, R> RelationshipService<A, R> {
    /// Create a service with the default storage deadline.
    pub fn new(accounts: Arc<A>, relationships: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self {
            accounts,
            relationships,
            clock,
            deadline: StorageDeadline::DEFAULT,
        }
    }

    /// Replace the storage deadline.
    pub fn with_deadline(mut self, deadline: StorageDeadline) -> Self {
        self.deadline = deadline;
        self
    }
}

impl<A, R> RelationshipService<A, R>
where
    A: AccountRepository,
    R: RelationshipRepository,
{
    async fn sorted_followee_edges(&self, account: &AccountId) -> Result<Vec<Relationship>, Error> {
        let mut edges = self
            .deadline
            .run(
                "list followee edges",
                self.relationships.followee_edges(account),
                map_relationship_error,
            )
            .await?;
        edges.sort_by(Relationship::newest_followee_first);
        Ok(edges)
    }

    async fn sorted_follower_edges(&self, account: &AccountId) -> Result<Vec<Relationship>, Error> {
        let mut edges = self
            .deadline
            .run(
                "list follower edges",
                self.relationships.follower_edges(account),
                map_relationship_error,
            )
            .await?;
        edges.sort_by(Relationship::newest_follower_first);
        Ok(edges)
    }

    /// Load `ids` in one query and return them in the same order.
    async fn accounts_in_order(&self, ids: Vec<AccountId>) -> Result<Vec<Account>, Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut by_id: HashMap<AccountId, Account> = self
            .deadline
            .run(
                "load accounts by id",
                self.accounts.find_by_ids(&ids),
                map_account_error,
            )
            .await?
            .into_iter()
            .map(|account| (*account.id(), account))
            .collect();
        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }
}

#[async_trait]
impl<A, R> RelationshipGraph for RelationshipService<A, R>
where
    A: AccountRepository,
    R: RelationshipRepository,
{
    async fn follow(&self, follower: &AccountId, followee: &AccountId) -> Result<(), Error> {
        let relationship = Relationship::try_new(*follower, *followee, self.clock.utc())
            .map_err(|_| Error::self_follow())?;
        let created = self
            .deadline
            .run(
                "insert relationship",
                self.relationships.insert_if_absent(&relationship),
                map_relationship_error,
            )
            .await?;
        debug!(%follower, %followee, created, "follow recorded");
        Ok(())
    }

    async fn unfollow(&self, follower: &AccountId, followee: &AccountId) -> Result<(), Error> {
        if follower == followee {
            return Ok(());
        }
        let removed = self
            .deadline
            .run(
                "delete relationship",
                self.relationships.delete(follower, followee),
                map_relationship_error,
            )
            .await?;
        debug!(%follower, %followee, removed, "unfollow recorded");
        Ok(())
    }

    async fn is_following(
        &self,
        follower: &AccountId,
        followee: &AccountId,
    ) -> Result<bool, Error> {
        if follower == followee {
            return Ok(false);
        }
        self.deadline
            .run(
                "check relationship",
                self.relationships.exists(follower, followee),
                map_relationship_error,
            )
            .await
    }

    async fn followees(&self, account: &AccountId) -> Result<Vec<Account>, Error> {
        let ids = self
            .sorted_followee_edges(account)
            .await?
            .iter()
            .map(|edge| *edge.followee())
            .collect();
        self.accounts_in_order(ids).await
    }

    async fn followers(&self, account: &AccountId) -> Result<Vec<Account>, Error> {
        let ids = self
            .sorted_follower_edges(account)
            .await?
            .iter()
            .map(|edge| *edge.follower())
            .collect();
        self.accounts_in_order(ids).await
    }

    async fn relationships(&self, account: &AccountId) -> Result<Vec<Relationship>, Error> {
        self.sorted_followee_edges(account).await
    }

    async fn reverse_relationships(
        &self,
        account: &AccountId,
    ) -> Result<Vec<Relationship>, Error> {
        self.sorted_follower_edges(account).await
    }
}

#[cfg(test)]
#[path = "relationship_service_tests.rs"]
mod tests;
