//! Account registration, authentication, and lifecycle.
//!
//! [`IdentityService`] implements the [`IdentityStore`] driving port over the
//! account, relationship, and post repositories. Argon2 work runs on the
//! blocking pool; every storage call is bounded by a [`StorageDeadline`].

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{debug, info};
use zeroize::Zeroizing;

use super::ports::{AccountRepository, IdentityStore, PostRepository, RelationshipRepository};
use super::repository_error_mapping::{
    map_account_error, map_post_error, map_relationship_error,
};
use super::{
    Account, AccountId, AccountValidationError, EmailAddress, Error, LoginCredentials,
    PasswordAuthenticator, PasswordCredential, Registration, RegistrationRequest,
    StorageDeadline,
};

/// Identity service implementing [`IdentityStore`].
#[derive(Clone)]
pub struct IdentityService<A, R, P> {
    accounts: Arc<A>,
    relationships: Arc<R>,
    posts: Arc<P>,
    authenticator: PasswordAuthenticator,
    clock: Arc<dyn Clock>,
    deadline: StorageDeadline,
}

impl<A, R, P> IdentityService<A, R, P> {
    /// Create a service with the default storage deadline.
    pub fn new(
        accounts: Arc<A>,
        relationships: Arc<R>,
        posts: Arc<P>,
        authenticator: PasswordAuthenticator,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            accounts,
            relationships,
            posts,
            authenticator,
            clock,
            deadline: StorageDeadline::DEFAULT,
        }
    }

    /// Replace the storage deadline.
    pub fn with_deadline(mut self, deadline: StorageDeadline) -> Self {
        self.deadline = deadline;
        self
    }

    async fn derive_credential(
        &self,
        password: Zeroizing<String>,
    ) -> Result<PasswordCredential, Error> {
        let authenticator = self.authenticator.clone();
        tokio::task::spawn_blocking(move || authenticator.derive_credential(password.as_str()))
            .await
            .map_err(|err| Error::internal(format!("password hashing task failed: {err}")))?
            .map_err(|err| Error::internal(err.to_string()))
    }

    async fn verify_password(
        &self,
        candidate: &str,
        credential: PasswordCredential,
    ) -> Result<bool, Error> {
        let authenticator = self.authenticator.clone();
        let candidate = Zeroizing::new(candidate.to_owned());
        tokio::task::spawn_blocking(move || {
            authenticator.verify_credential(candidate.as_str(), &credential)
        })
        .await
        .map_err(|err| Error::internal(format!("password verification task failed: {err}")))
    }
}

fn validation_error(errors: &[AccountValidationError]) -> Error {
    let fields = errors
        .iter()
        .map(|err| err.field().as_str())
        .collect::<Vec<_>>();
    debug!(?fields, "registration rejected");
    Error::validation(
        errors
            .iter()
            .map(AccountValidationError::to_violation)
            .collect(),
    )
}

fn missing_account(id: &AccountId) -> Error {
    Error::unknown_account(format!("account {id} does not exist"))
}

#[async_trait]
impl<A, R, P> IdentityStore for IdentityService<A, R, P>
where
    A: AccountRepository,
    R: RelationshipRepository,
    P: PostRepository,
{
    async fn register(&self, request: RegistrationRequest) -> Result<Account, Error> {
        let Registration {
            display_name,
            email,
            password,
        } = Registration::validate(&request).map_err(|errors| validation_error(&errors))?;

        let credential = self
            .derive_credential(Zeroizing::new(password.as_str().to_owned()))
            .await?;
        let account = Account::new(
            AccountId::random(),
            display_name,
            email,
            credential,
            self.clock.utc(),
        );

        self.deadline
            .run(
                "create account",
                self.accounts.create(&account),
                map_account_error,
            )
            .await?;
        info!(account_id = %account.id(), "account registered");
        Ok(account)
    }

    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<Option<Account>, Error> {
        let account = match EmailAddress::new(credentials.email()) {
            Ok(email) => {
                self.deadline
                    .run(
                        "find account by email",
                        self.accounts.find_by_normalized_email(&email.normalized()),
                        map_account_error,
                    )
                    .await?
            }
            Err(_) => None,
        };

        let credential = account
            .as_ref()
            .map_or_else(PasswordCredential::placeholder, |account| {
                *account.credential()
            });
        let verified = self
            .verify_password(credentials.password(), credential)
            .await?;

        match account {
            Some(account) if verified => {
                debug!(account_id = %account.id(), "authentication succeeded");
                Ok(Some(account))
            }
            _ => {
                debug!("authentication rejected");
                Ok(None)
            }
        }
    }

    async fn find_account(&self, id: &AccountId) -> Result<Option<Account>, Error> {
        self.deadline
            .run("find account", self.accounts.find_by_id(id), map_account_error)
            .await
    }

    async fn has_password(&self, account: &Account, candidate: &str) -> Result<bool, Error> {
        self.verify_password(candidate, *account.credential()).await
    }

    async fn set_admin(&self, id: &AccountId, admin: bool) -> Result<(), Error> {
        let updated = self
            .deadline
            .run(
                "set admin flag",
                self.accounts.set_admin(id, admin),
                map_account_error,
            )
            .await?;
        if !updated {
            return Err(missing_account(id));
        }
        info!(account_id = %id, admin, "administrator flag updated");
        Ok(())
    }

    /// Ports do not promise cascading deletes, so posts and edges are removed
    /// explicitly before the account. The account must exist before anything
    /// is removed. Each step is idempotent: a retry after a storage failure
    /// finishes the removal.
    async fn destroy(&self, id: &AccountId) -> Result<(), Error> {
        let existing = self
            .deadline
            .run("find account", self.accounts.find_by_id(id), map_account_error)
            .await?;
        if existing.is_none() {
            return Err(missing_account(id));
        }

        let posts = self
            .deadline
            .run(
                "delete posts by author",
                self.posts.delete_by_author_id(id),
                map_post_error,
            )
            .await?;
        let edges = self
            .deadline
            .run(
                "delete relationships touching account",
                self.relationships.delete_touching(id),
                map_relationship_error,
            )
            .await?;
        let deleted = self
            .deadline
            .run("delete account", self.accounts.delete(id), map_account_error)
            .await?;
        if !deleted {
            return Err(missing_account(id));
        }
        info!(account_id = %id, posts, edges, "account destroyed");
        Ok(())
    }
}

#[cfg(test)]
#[path = "identity_service_tests.rs"]
mod tests;
