//! Port for account persistence.
//!
//! Adapters store accounts keyed by id and enforce uniqueness of the
//! normalised email. A duplicate insert must surface as
//! [`AccountRepositoryError::DuplicateEmail`] so concurrent registrations for
//! the same address resolve to exactly one winner.

use async_trait::async_trait;

use crate::domain::{Account, AccountId, NormalizedEmail};

use super::define_port_error;

define_port_error! {
    /// Errors raised by account repository adapters.
    pub enum AccountRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "account repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "account repository query failed: {message}",
        /// The normalised email is already taken.
        DuplicateEmail => "email has already been taken",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Insert a new account.
    ///
    /// Fails with [`AccountRepositoryError::DuplicateEmail`] when another
    /// account already holds the same normalised email.
    async fn create(&self, account: &Account) -> Result<(), AccountRepositoryError>;

    /// Fetch an account by identifier.
    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, AccountRepositoryError>;

    /// Fetch every account whose id appears in `ids`, in no particular order.
    ///
    /// Unknown ids are skipped.
    async fn find_by_ids(&self, ids: &[AccountId]) -> Result<Vec<Account>, AccountRepositoryError>;

    /// Fetch the account registered under a normalised email.
    async fn find_by_normalized_email(
        &self,
        email: &NormalizedEmail,
    ) -> Result<Option<Account>, AccountRepositoryError>;

    /// Set the administrator flag. Returns `false` when no such account exists.
    async fn set_admin(&self, id: &AccountId, admin: bool) -> Result<bool, AccountRepositoryError>;

    /// Remove an account. Returns `false` when no such account exists.
    async fn delete(&self, id: &AccountId) -> Result<bool, AccountRepositoryError>;
}
