//! Port for reading posts and removing them with their author.

use async_trait::async_trait;

use crate::domain::{AccountId, Post, PostId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by post repository adapters.
    pub enum PostRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "post repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "post repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Every post written by any of `authors`, in no particular order.
    async fn find_by_author_ids(&self, authors: &[AccountId])
    -> Result<Vec<Post>, PostRepositoryError>;

    /// Fetch a single post.
    async fn find_by_id(&self, id: &PostId) -> Result<Option<Post>, PostRepositoryError>;

    /// Remove every post by `author`, returning the count.
    async fn delete_by_author_id(&self, author: &AccountId) -> Result<u64, PostRepositoryError>;
}
