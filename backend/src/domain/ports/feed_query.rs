//! Driving port for reading posts.

use async_trait::async_trait;

use crate::domain::{AccountId, Error, Post, PostId};

/// Domain use-case port for feed reads.
#[async_trait]
pub trait FeedQuery: Send + Sync {
    /// Posts by `account` and everyone it follows, newest first.
    async fn feed(&self, account: &AccountId) -> Result<Vec<Post>, Error>;

    /// Posts written by `account` alone, newest first.
    async fn authored_posts(&self, account: &AccountId) -> Result<Vec<Post>, Error>;

    /// Fetch one post.
    ///
    /// A missing post, including one removed with its author, fails with
    /// [`crate::domain::ErrorCode::NotFound`].
    async fn find_post(&self, id: &PostId) -> Result<Post, Error>;
}
