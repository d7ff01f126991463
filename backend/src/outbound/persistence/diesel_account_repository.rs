//! PostgreSQL-backed [`AccountRepository`].
//!
//! Email uniqueness is enforced by the `accounts_email_normalized_key`
//! constraint, which makes concurrent registrations for one address resolve
//! to a single winner. Deleting an account cascades to its posts and edges
//! through foreign keys.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::warn;
use uuid::Uuid;

use crate::domain::ports::{AccountRepository, AccountRepositoryError};
use crate::domain::{
    Account, AccountId, DisplayName, EmailAddress, NormalizedEmail, PasswordCredential,
    PasswordDigest, Salt,
};

use super::diesel_error_mapping::{DieselFailure, classify_diesel_error, constraint_is};
use super::models::{AccountRow, NewAccountRow};
use super::pool::{DbPool, PoolError};
use super::schema::accounts;

const EMAIL_CONSTRAINT: &str = "accounts_email_normalized_key";

/// Diesel implementation of the account port.
#[derive(Clone)]
pub struct DieselAccountRepository {
    pool: DbPool,
}

impl DieselAccountRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> AccountRepositoryError {
    AccountRepositoryError::connection(error.into_message())
}

fn map_diesel_error(operation: &'static str) -> impl Fn(diesel::result::Error) -> AccountRepositoryError {
    move |error| match classify_diesel_error(error, operation) {
        DieselFailure::Connection => {
            AccountRepositoryError::connection("database connection error")
        }
        DieselFailure::UniqueViolation { constraint }
            if constraint_is(constraint.as_deref(), EMAIL_CONSTRAINT) =>
        {
            AccountRepositoryError::duplicate_email()
        }
        DieselFailure::UniqueViolation { .. } => {
            AccountRepositoryError::query("account already exists")
        }
        DieselFailure::ForeignKeyViolation { .. } | DieselFailure::CheckViolation { .. } => {
            AccountRepositoryError::query("account constraint violated")
        }
        DieselFailure::Query { message } => AccountRepositoryError::query(message),
    }
}

fn row_to_account(row: AccountRow) -> Result<Account, AccountRepositoryError> {
    let malformed = |field: &str| {
        warn!(account_id = %row.id, field, "stored account row is malformed");
        AccountRepositoryError::query(format!("stored account {} has malformed {field}", row.id))
    };

    let display_name =
        DisplayName::new(row.display_name.as_str()).map_err(|_| malformed("display_name"))?;
    let email = EmailAddress::new(row.email.as_str()).map_err(|_| malformed("email"))?;
    let salt = Salt::from_hex(&row.password_salt).map_err(|_| malformed("password_salt"))?;
    let digest =
        PasswordDigest::from_hex(&row.password_digest).map_err(|_| malformed("password_digest"))?;

    Ok(Account::new(
        AccountId::from_uuid(row.id),
        display_name,
        email,
        PasswordCredential::new(salt, digest),
        row.created_at,
    )
    .with_admin(row.admin))
}

fn rows_to_accounts(rows: Vec<AccountRow>) -> Result<Vec<Account>, AccountRepositoryError> {
    rows.into_iter().map(row_to_account).collect()
}

#[async_trait]
impl AccountRepository for DieselAccountRepository {
    async fn create(&self, account: &Account) -> Result<(), AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let normalized = account.email().normalized();
        let row = NewAccountRow {
            id: *account.id().as_uuid(),
            display_name: account.display_name().as_ref(),
            email: account.email().as_ref(),
            email_normalized: normalized.as_str(),
            password_salt: account.credential().salt().to_hex(),
            password_digest: account.credential().digest().to_hex(),
            admin: account.is_admin(),
            created_at: account.created_at(),
        };

        diesel::insert_into(accounts::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error("insert account"))
    }

    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        accounts::table
            .filter(accounts::id.eq(id.as_uuid()))
            .select(AccountRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error("find account by id"))?
            .map(row_to_account)
            .transpose()
    }

    async fn find_by_ids(&self, ids: &[AccountId]) -> Result<Vec<Account>, AccountRepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let uuids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        let rows = accounts::table
            .filter(accounts::id.eq_any(uuids))
            .select(AccountRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error("find accounts by id"))?;
        rows_to_accounts(rows)
    }

    async fn find_by_normalized_email(
        &self,
        email: &NormalizedEmail,
    ) -> Result<Option<Account>, AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        accounts::table
            .filter(accounts::email_normalized.eq(email.as_str()))
            .select(AccountRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error("find account by email"))?
            .map(row_to_account)
            .transpose()
    }

    async fn set_admin(&self, id: &AccountId, admin: bool) -> Result<bool, AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(accounts::table.filter(accounts::id.eq(id.as_uuid())))
            .set(accounts::admin.eq(admin))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error("set admin flag"))?;
        Ok(updated > 0)
    }

    async fn delete(&self, id: &AccountId) -> Result<bool, AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(accounts::table.filter(accounts::id.eq(id.as_uuid())))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error("delete account"))?;
        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outbound::persistence::diesel_error_mapping::test_errors::database_error;
    use chrono::Utc;
    use diesel::result::DatabaseErrorKind;
    use rstest::{fixture, rstest};

    #[fixture]
    fn row() -> AccountRow {
        AccountRow {
            id: Uuid::new_v4(),
            display_name: "Example User".to_owned(),
            email: "User@Example.com".to_owned(),
            password_salt: "ab".repeat(16),
            password_digest: "cd".repeat(32),
            admin: true,
            created_at: Utc::now(),
        }
    }

    #[rstest]
    fn converts_well_formed_rows(row: AccountRow) {
        let id = row.id;
        let account = row_to_account(row).expect("valid row");
        assert_eq!(account.id().as_uuid(), &id);
        assert!(account.is_admin());
        assert_eq!(account.credential().salt().to_hex(), "ab".repeat(16));
        assert_eq!(account.email().normalized().as_str(), "user@example.com");
    }

    #[rstest]
    fn rejects_rows_with_truncated_digests(mut row: AccountRow) {
        row.password_digest = "cd".repeat(8);
        let err = row_to_account(row).expect_err("malformed");
        assert!(err.to_string().contains("password_digest"));
    }

    #[rstest]
    fn email_constraint_maps_to_duplicate() {
        let map = map_diesel_error("insert account");
        let err = map(database_error(
            DatabaseErrorKind::UniqueViolation,
            Some(EMAIL_CONSTRAINT),
        ));
        assert_eq!(err, AccountRepositoryError::DuplicateEmail);
    }

    #[rstest]
    fn other_unique_violations_are_query_errors() {
        let map = map_diesel_error("insert account");
        let err = map(database_error(
            DatabaseErrorKind::UniqueViolation,
            Some("accounts_pkey"),
        ));
        assert!(matches!(err, AccountRepositoryError::Query { .. }));
    }

    #[rstest]
    fn closed_connections_map_to_connection_errors() {
        let map = map_diesel_error("find account by id");
        let err = map(database_error(DatabaseErrorKind::ClosedConnection, None));
        assert!(matches!(err, AccountRepositoryError::Connection { .. }));
    }
}
