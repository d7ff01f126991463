//! Driving port for account registration, authentication, and lifecycle.
//!
//! Inbound adapters (an admin CLI, an HTTP layer) call this port without
//! importing the backing storage or the password scheme.

use async_trait::async_trait;

use crate::domain::{Account, AccountId, Error, LoginCredentials, RegistrationRequest};

/// Domain use-case port for account identity.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Validate the request and persist a new non-admin account.
    ///
    /// Reports every invalid field at once as
    /// [`crate::domain::ErrorCode::ValidationFailed`]; a taken email yields
    /// [`crate::domain::ErrorCode::DuplicateEmail`].
    async fn register(&self, request: RegistrationRequest) -> Result<Account, Error>;

    /// Resolve credentials to an account.
    ///
    /// Unknown email, malformed email, and wrong password all produce
    /// `Ok(None)`. `Err` is reserved for storage failures.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<Option<Account>, Error>;

    /// Fetch an account by id.
    async fn find_account(&self, id: &AccountId) -> Result<Option<Account>, Error>;

    /// Check a candidate password against an account's stored credential.
    async fn has_password(&self, account: &Account, candidate: &str) -> Result<bool, Error>;

    /// Grant or revoke administrator status.
    async fn set_admin(&self, id: &AccountId, admin: bool) -> Result<(), Error>;

    /// Remove an account with its posts and every follow edge touching it.
    async fn destroy(&self, id: &AccountId) -> Result<(), Error>;
}
