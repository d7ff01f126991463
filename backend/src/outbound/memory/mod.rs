//! Process-local storage adapter.
//!
//! [`InMemoryStore`] implements the account, relationship, and post ports
//! over one mutex-guarded state, so every port operation is atomic with
//! respect to the others. It backs the test suites and embedders that do not
//! need durability. Cloned handles share the same state.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{
    AccountRepository, AccountRepositoryError, PostRepository, PostRepositoryError,
    RelationshipRepository, RelationshipRepositoryError,
};
use crate::domain::{Account, AccountId, NormalizedEmail, Post, PostId, Relationship};

#[derive(Debug, Default)]
struct StoreState {
    accounts: HashMap<AccountId, Account>,
    emails: HashMap<NormalizedEmail, AccountId>,
    edges: BTreeMap<(AccountId, AccountId), DateTime<Utc>>,
    posts: HashMap<PostId, Post>,
}

impl StoreState {
    fn edges_where(
        &self,
        keep: impl Fn(&AccountId, &AccountId) -> bool,
    ) -> Vec<Relationship> {
        self.edges
            .iter()
            .filter(|((follower, followee), _)| keep(follower, followee))
            .filter_map(|(&(follower, followee), &created_at)| {
                Relationship::try_new(follower, followee, created_at).ok()
            })
            .collect()
    }

    fn missing_endpoint(&self, relationship: &Relationship) -> Option<AccountId> {
        [*relationship.follower(), *relationship.followee()]
            .into_iter()
            .find(|id| !self.accounts.contains_key(id))
    }
}

/// Shared in-memory implementation of every storage port.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<StoreState>>,
}

/// Poisoned lock reported through whichever port error the caller expects.
struct Poisoned;

impl From<Poisoned> for AccountRepositoryError {
    fn from(_: Poisoned) -> Self {
        Self::query("in-memory store lock poisoned")
    }
}

impl From<Poisoned> for RelationshipRepositoryError {
    fn from(_: Poisoned) -> Self {
        Self::query("in-memory store lock poisoned")
    }
}

impl From<Poisoned> for PostRepositoryError {
    fn from(_: Poisoned) -> Self {
        Self::query("in-memory store lock poisoned")
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreState>, Poisoned> {
        self.state.lock().map_err(|_| Poisoned)
    }

    /// Store a post on behalf of the publishing component.
    ///
    /// Fails when the author does not exist.
    pub fn insert_post(&self, post: Post) -> Result<(), PostRepositoryError> {
        let mut state = self.lock()?;
        if !state.accounts.contains_key(&post.author) {
            return Err(PostRepositoryError::query(format!(
                "author {} does not exist",
                post.author
            )));
        }
        state.posts.insert(post.id, post);
        Ok(())
    }

    /// Number of stored follow edges.
    pub fn edge_count(&self) -> Result<usize, RelationshipRepositoryError> {
        Ok(self.lock()?.edges.len())
    }
}

#[async_trait]
impl AccountRepository for InMemoryStore {
    async fn create(&self, account: &Account) -> Result<(), AccountRepositoryError> {
        let mut state = self.lock()?;
        let email = account.email().normalized();
        if state.emails.contains_key(&email) {
            return Err(AccountRepositoryError::duplicate_email());
        }
        if state.accounts.contains_key(account.id()) {
            return Err(AccountRepositoryError::query(format!(
                "account {} already exists",
                account.id()
            )));
        }
        state.emails.insert(email, *account.id());
        state.accounts.insert(*account.id(), account.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, AccountRepositoryError> {
        Ok(self.lock()?.accounts.get(id).cloned())
    }

    async fn find_by_ids(&self, ids: &[AccountId]) -> Result<Vec<Account>, AccountRepositoryError> {
        let state = self.lock()?;
        Ok(ids
            .iter()
            .filter_map(|id| state.accounts.get(id).cloned())
            .collect())
    }

    async fn find_by_normalized_email(
        &self,
        email: &NormalizedEmail,
    ) -> Result<Option<Account>, AccountRepositoryError> {
        let state = self.lock()?;
        Ok(state
            .emails
            .get(email)
            .and_then(|id| state.accounts.get(id))
            .cloned())
    }

    async fn set_admin(&self, id: &AccountId, admin: bool) -> Result<bool, AccountRepositoryError> {
        let mut state = self.lock()?;
        let Some(account) = state.accounts.remove(id) else {
            return Ok(false);
        };
        state.accounts.insert(*id, account.with_admin(admin));
        Ok(true)
    }

    async fn delete(&self, id: &AccountId) -> Result<bool, AccountRepositoryError> {
        let mut state = self.lock()?;
        let Some(account) = state.accounts.remove(id) else {
            return Ok(false);
        };
        state.emails.remove(&account.email().normalized());
        state
            .edges
            .retain(|(follower, followee), _| follower != id && followee != id);
        state.posts.retain(|_, post| post.author != *id);
        Ok(true)
    }
}

#[async_trait]
impl RelationshipRepository for InMemoryStore {
    async fn insert_if_absent(
        &self,
        relationship: &Relationship,
    ) -> Result<bool, RelationshipRepositoryError> {
        let mut state = self.lock()?;
        if relationship.follower() == relationship.followee() {
            return Err(RelationshipRepositoryError::self_pair());
        }
        if let Some(missing) = state.missing_endpoint(relationship) {
            return Err(RelationshipRepositoryError::unknown_endpoint(format!(
                "account {missing} does not exist"
            )));
        }
        let key = (*relationship.follower(), *relationship.followee());
        if state.edges.contains_key(&key) {
            return Ok(false);
        }
        state.edges.insert(key, relationship.created_at());
        Ok(true)
    }

    async fn delete(
        &self,
        follower: &AccountId,
        followee: &AccountId,
    ) -> Result<bool, RelationshipRepositoryError> {
        Ok(self
            .lock()?
            .edges
            .remove(&(*follower, *followee))
            .is_some())
    }

    async fn exists(
        &self,
        follower: &AccountId,
        followee: &AccountId,
    ) -> Result<bool, RelationshipRepositoryError> {
        Ok(self.lock()?.edges.contains_key(&(*follower, *followee)))
    }

    async fn followee_edges(
        &self,
        follower: &AccountId,
    ) -> Result<Vec<Relationship>, RelationshipRepositoryError> {
        Ok(self.lock()?.edges_where(|from, _| from == follower))
    }

    async fn follower_edges(
        &self,
        followee: &AccountId,
    ) -> Result<Vec<Relationship>, RelationshipRepositoryError> {
        Ok(self.lock()?.edges_where(|_, to| to == followee))
    }

    async fn delete_touching(
        &self,
        account: &AccountId,
    ) -> Result<u64, RelationshipRepositoryError> {
        let mut state = self.lock()?;
        let before = state.edges.len();
        state
            .edges
            .retain(|(follower, followee), _| follower != account && followee != account);
        Ok(u64::try_from(before - state.edges.len()).unwrap_or(u64::MAX))
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn find_by_author_ids(
        &self,
        authors: &[AccountId],
    ) -> Result<Vec<Post>, PostRepositoryError> {
        let state = self.lock()?;
        Ok(state
            .posts
            .values()
            .filter(|post| authors.contains(&post.author))
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: &PostId) -> Result<Option<Post>, PostRepositoryError> {
        Ok(self.lock()?.posts.get(id).cloned())
    }

    async fn delete_by_author_id(&self, author: &AccountId) -> Result<u64, PostRepositoryError> {
        let mut state = self.lock()?;
        let before = state.posts.len();
        state.posts.retain(|_, post| post.author != *author);
        Ok(u64::try_from(before - state.posts.len()).unwrap_or(u64::MAX))
    }
}
