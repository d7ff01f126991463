//! Feed assembly.
//!
//! A feed is the union of an account's own posts and the posts of every
//! account it follows, newest first. It is built from one followee query and
//! one post query regardless of how many accounts are followed.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::ports::{FeedQuery, PostRepository, RelationshipRepository};
use super::repository_error_mapping::{map_post_error, map_relationship_error};
use super::{AccountId, Error, Post, PostId, StorageDeadline};

/// Feed service implementing [`FeedQuery`].
#[derive(Clone)]
pub struct FeedService<R, P> {
    relationships: Arc<R>,
    posts: Arc<P>,
    deadline: StorageDeadline,
}

impl<R, P> FeedService<R, P> {
    /// Create a service with the default storage deadline.
    pub fn new(relationships: Arc<R>, posts: Arc<P>) -> Self {
        Self {
            relationships,
            posts,
            deadline: StorageDeadline::DEFAULT,
        }
    }

    /// Replace the storage deadline.
    pub fn with_deadline(mut self, deadline: StorageDeadline) -> Self {
        self.deadline = deadline;
        self
    }
}

impl<R, P> FeedService<R, P>
where
    R: RelationshipRepository,
    P: PostRepository,
{
    async fn posts_by(&self, authors: &BTreeSet<AccountId>) -> Result<Vec<Post>, Error> {
        let ids = authors.iter().copied().collect::<Vec<_>>();
        let mut posts = self
            .deadline
            .run(
                "load posts by author",
                self.posts.find_by_author_ids(&ids),
                map_post_error,
            )
            .await?;
        posts.retain(|post| authors.contains(&post.author));
        posts.sort_by(Post::newest_first);
        Ok(posts)
    }
}

#[async_trait]
impl<R, P> FeedQuery for FeedService<R, P>
where
    R: RelationshipRepository,
    P: PostRepository,
{
    async fn feed(&self, account: &AccountId) -> Result<Vec<Post>, Error> {
        let edges = self
            .deadline
            .run(
                "list followee edges",
                self.relationships.followee_edges(account),
                map_relationship_error,
            )
            .await?;
        let authors = std::iter::once(*account)
            .chain(edges.iter().map(|edge| *edge.followee()))
            .collect::<BTreeSet<_>>();
        let posts = self.posts_by(&authors).await?;
        debug!(%account, authors = authors.len(), posts = posts.len(), "feed assembled");
        Ok(posts)
    }

    async fn authored_posts(&self, account: &AccountId) -> Result<Vec<Post>, Error> {
        self.posts_by(&BTreeSet::from([*account])).await
    }

    async fn find_post(&self, id: &PostId) -> Result<Post, Error> {
        self.deadline
            .run("find post", self.posts.find_by_id(id), map_post_error)
            .await?
            .ok_or_else(|| Error::not_found(format!("post {id} does not exist")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::{
        MockPostRepository, MockRelationshipRepository, PostRepositoryError,
    };
    use crate::domain::{PostId, Relationship};
    use chrono::{DateTime, TimeDelta, Utc};
    use rstest::rstest;

    fn post(author: AccountId, created_at: DateTime<Utc>) -> Post {
        Post {
            id: PostId::random(),
            author,
            content: "Lorem ipsum".to_owned(),
            created_at,
        }
    }

    fn make_service(
        relationships: MockRelationshipRepository,
        posts: MockPostRepository,
    ) -> FeedService<MockRelationshipRepository, MockPostRepository> {
        FeedService::new(Arc::new(relationships), Arc::new(posts))
    }

    #[rstest]
    #[tokio::test]
    async fn feed_merges_own_and_followed_posts_newest_first() {
        let reader = AccountId::random();
        let followed = AccountId::random();
        let stranger = AccountId::random();
        let now = Utc::now();
        let edge = Relationship::try_new(reader, followed, now).expect("edge");

        let own = post(reader, now - TimeDelta::hours(2));
        let theirs = post(followed, now - TimeDelta::hours(1));
        let unrelated = post(stranger, now);

        let mut relationships = MockRelationshipRepository::new();
        relationships
            .expect_followee_edges()
            .times(1)
            .return_once(move |_| Ok(vec![edge]));
        let mut posts = MockPostRepository::new();
        let returned = vec![own.clone(), unrelated, theirs.clone()];
        posts
            .expect_find_by_author_ids()
            .times(1)
            .withf(move |authors| {
                authors.len() == 2 && authors.contains(&reader) && authors.contains(&followed)
            })
            .return_once(move |_| Ok(returned));

        let feed = make_service(relationships, posts)
            .feed(&reader)
            .await
            .expect("feed");
        assert_eq!(feed, vec![theirs, own]);
    }

    #[rstest]
    #[tokio::test]
    async fn authored_posts_skip_the_relationship_store() {
        let author = AccountId::random();
        let now = Utc::now();
        let older = post(author, now - TimeDelta::days(1));
        let newer = post(author, now);

        let relationships = MockRelationshipRepository::new();
        let mut posts = MockPostRepository::new();
        let returned = vec![older.clone(), newer.clone()];
        posts
            .expect_find_by_author_ids()
            .times(1)
            .return_once(move |_| Ok(returned));

        let listed = make_service(relationships, posts)
            .authored_posts(&author)
            .await
            .expect("posts");
        assert_eq!(listed, vec![newer, older]);
    }

    #[rstest]
    #[tokio::test]
    async fn missing_posts_are_not_found() {
        let mut posts = MockPostRepository::new();
        posts
            .expect_find_by_id()
            .times(1)
            .return_once(|_| Ok(None));

        let err = make_service(MockRelationshipRepository::new(), posts)
            .find_post(&PostId::random())
            .await
            .expect_err("missing post");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn post_store_outage_is_retryable() {
        let mut relationships = MockRelationshipRepository::new();
        relationships
            .expect_followee_edges()
            .return_once(|_| Ok(Vec::new()));
        let mut posts = MockPostRepository::new();
        posts
            .expect_find_by_author_ids()
            .return_once(|_| Err(PostRepositoryError::connection("refused")));

        let err = make_service(relationships, posts)
            .feed(&AccountId::random())
            .await
            .expect_err("outage");
        assert_eq!(err.code(), ErrorCode::StorageUnavailable);
        assert!(err.is_retryable());
    }
}
