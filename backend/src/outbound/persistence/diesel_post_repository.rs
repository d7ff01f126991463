//! PostgreSQL-backed [`PostRepository`].

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{PostRepository, PostRepositoryError};
use crate::domain::{AccountId, Post, PostId};

use super::diesel_error_mapping::{DieselFailure, classify_diesel_error};
use super::models::PostRow;
use super::pool::{DbPool, PoolError};
use super::schema::posts;

/// Diesel implementation of the post port.
#[derive(Clone)]
pub struct DieselPostRepository {
    pool: DbPool,
}

impl DieselPostRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> PostRepositoryError {
    PostRepositoryError::connection(error.into_message())
}

fn map_diesel_error(operation: &'static str) -> impl Fn(diesel::result::Error) -> PostRepositoryError {
    move |error| match classify_diesel_error(error, operation) {
        DieselFailure::Connection => PostRepositoryError::connection("database connection error"),
        DieselFailure::Query { message } => PostRepositoryError::query(message),
        DieselFailure::UniqueViolation { .. }
        | DieselFailure::ForeignKeyViolation { .. }
        | DieselFailure::CheckViolation { .. } => {
            PostRepositoryError::query("post constraint violated")
        }
    }
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Self {
            id: PostId::from_uuid(row.id),
            author: AccountId::from_uuid(row.author_id),
            content: row.content,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl PostRepository for DieselPostRepository {
    async fn find_by_author_ids(
        &self,
        authors: &[AccountId],
    ) -> Result<Vec<Post>, PostRepositoryError> {
        if authors.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let author_ids: Vec<Uuid> = authors.iter().map(|id| *id.as_uuid()).collect();
        let rows = posts::table
            .filter(posts::author_id.eq_any(author_ids))
            .order((posts::created_at.desc(), posts::id.desc()))
            .select(PostRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error("load posts by author"))?;
        Ok(rows.into_iter().map(Post::from).collect())
    }

    async fn find_by_id(&self, id: &PostId) -> Result<Option<Post>, PostRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = posts::table
            .filter(posts::id.eq(id.as_uuid()))
            .select(PostRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error("find post"))?;
        Ok(row.map(Post::from))
    }

    async fn delete_by_author_id(&self, author: &AccountId) -> Result<u64, PostRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(posts::table.filter(posts::author_id.eq(author.as_uuid())))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error("delete posts by author"))?;
        Ok(u64::try_from(deleted).unwrap_or(u64::MAX))
    }
}
