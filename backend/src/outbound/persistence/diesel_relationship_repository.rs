//! PostgreSQL-backed [`RelationshipRepository`].
//!
//! The primary key on `(follower_id, followee_id)` makes inserts idempotent
//! via `ON CONFLICT DO NOTHING`. Foreign keys reject edges to missing
//! accounts and a check constraint rejects self pairs.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::warn;

use crate::domain::ports::{RelationshipRepository, RelationshipRepositoryError};
use crate::domain::{AccountId, Relationship};

use super::diesel_error_mapping::{DieselFailure, classify_diesel_error, constraint_is};
use super::models::{NewRelationshipRow, RelationshipRow};
use super::pool::{DbPool, PoolError};
use super::schema::relationships;

const FOLLOWER_FK: &str = "relationships_follower_id_fkey";
const FOLLOWEE_FK: &str = "relationships_followee_id_fkey";
const NO_SELF_FOLLOW: &str = "relationships_no_self_follow";

/// Diesel implementation of the relationship port.
#[derive(Clone)]
pub struct DieselRelationshipRepository {
    pool: DbPool,
}

impl DieselRelationshipRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> RelationshipRepositoryError {
    RelationshipRepositoryError::connection(error.into_message())
}

fn map_foreign_key_violation(constraint: Option<&str>) -> RelationshipRepositoryError {
    if constraint_is(constraint, FOLLOWER_FK) {
        RelationshipRepositoryError::unknown_endpoint("follower account does not exist")
    } else if constraint_is(constraint, FOLLOWEE_FK) {
        RelationshipRepositoryError::unknown_endpoint("followee account does not exist")
    } else {
        warn!(
            constraint_name = ?constraint,
            "unrecognised foreign key violation on relationships"
        );
        RelationshipRepositoryError::unknown_endpoint("referenced account does not exist")
    }
}

fn map_diesel_error(
    operation: &'static str,
) -> impl Fn(diesel::result::Error) -> RelationshipRepositoryError {
    move |error| match classify_diesel_error(error, operation) {
        DieselFailure::Connection => {
            RelationshipRepositoryError::connection("database connection error")
        }
        DieselFailure::ForeignKeyViolation { constraint } => {
            map_foreign_key_violation(constraint.as_deref())
        }
        DieselFailure::CheckViolation { constraint }
            if constraint_is(constraint.as_deref(), NO_SELF_FOLLOW) =>
        {
            RelationshipRepositoryError::self_pair()
        }
        DieselFailure::UniqueViolation { .. } | DieselFailure::CheckViolation { .. } => {
            RelationshipRepositoryError::query("relationship constraint violated")
        }
        DieselFailure::Query { message } => RelationshipRepositoryError::query(message),
    }
}

fn row_to_relationship(row: RelationshipRow) -> Result<Relationship, RelationshipRepositoryError> {
    Relationship::try_new(
        AccountId::from_uuid(row.follower_id),
        AccountId::from_uuid(row.followee_id),
        row.created_at,
    )
    .map_err(|_| RelationshipRepositoryError::query("stored relationship is a self pair"))
}

fn rows_to_relationships(
    rows: Vec<RelationshipRow>,
) -> Result<Vec<Relationship>, RelationshipRepositoryError> {
    rows.into_iter().map(row_to_relationship).collect()
}

fn count(affected: usize) -> u64 {
    u64::try_from(affected).unwrap_or(u64::MAX)
}

#[async_trait]
impl RelationshipRepository for DieselRelationshipRepository {
    async fn insert_if_absent(
        &self,
        relationship: &Relationship,
    ) -> Result<bool, RelationshipRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewRelationshipRow {
            follower_id: *relationship.follower().as_uuid(),
            followee_id: *relationship.followee().as_uuid(),
            created_at: relationship.created_at(),
        };

        let inserted = diesel::insert_into(relationships::table)
            .values(&row)
            .on_conflict((relationships::follower_id, relationships::followee_id))
            .do_nothing()
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error("insert relationship"))?;
        Ok(inserted > 0)
    }

    async fn delete(
        &self,
        follower: &AccountId,
        followee: &AccountId,
    ) -> Result<bool, RelationshipRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(
            relationships::table
                .filter(relationships::follower_id.eq(follower.as_uuid()))
                .filter(relationships::followee_id.eq(followee.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error("delete relationship"))?;
        Ok(deleted > 0)
    }

    async fn exists(
        &self,
        follower: &AccountId,
        followee: &AccountId,
    ) -> Result<bool, RelationshipRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::select(diesel::dsl::exists(
            relationships::table
                .filter(relationships::follower_id.eq(follower.as_uuid()))
                .filter(relationships::followee_id.eq(followee.as_uuid())),
        ))
        .get_result::<bool>(&mut conn)
        .await
        .map_err(map_diesel_error("check relationship"))
    }

    async fn followee_edges(
        &self,
        follower: &AccountId,
    ) -> Result<Vec<Relationship>, RelationshipRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = relationships::table
            .filter(relationships::follower_id.eq(follower.as_uuid()))
            .order((
                relationships::created_at.desc(),
                relationships::followee_id.desc(),
            ))
            .select(RelationshipRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error("list followee edges"))?;
        rows_to_relationships(rows)
    }

    async fn follower_edges(
        &self,
        followee: &AccountId,
    ) -> Result<Vec<Relationship>, RelationshipRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = relationships::table
            .filter(relationships::followee_id.eq(followee.as_uuid()))
            .order((
                relationships::created_at.desc(),
                relationships::follower_id.desc(),
            ))
            .select(RelationshipRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error("list follower edges"))?;
        rows_to_relationships(rows)
    }

    async fn delete_touching(
        &self,
        account: &AccountId,
    ) -> Result<u64, RelationshipRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(
            relationships::table.filter(
                relationships::follower_id
                    .eq(account.as_uuid())
                    .or(relationships::followee_id.eq(account.as_uuid())),
            ),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error("delete relationships touching account"))?;
        Ok(count(deleted))
    }
}
