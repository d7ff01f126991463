//! Tests for the relationship service.

use std::sync::Arc;

use super::*;
use crate::domain::ErrorCode;
use crate::domain::ports::{
    MockAccountRepository, MockRelationshipRepository, RelationshipRepositoryError,
};
use crate::test_support::{ManualClock, SocialHarness, fixture_timestamp, sample_account};
use rstest::{fixture, rstest};

fn mocked(
    accounts: MockAccountRepository,
    relationships: MockRelationshipRepository,
) -> RelationshipService<MockAccountRepository, MockRelationshipRepository> {
    RelationshipService::new(
        Arc::new(accounts),
        Arc::new(relationships),
        Arc::new(ManualClock::new(fixture_timestamp())),
    )
}

#[fixture]
fn harness() -> SocialHarness {
    SocialHarness::new()
}

#[rstest]
#[tokio::test]
async fn self_follow_is_rejected_without_storage() {
    let id = AccountId::random();
    let service = mocked(MockAccountRepository::new(), MockRelationshipRepository::new());

    let err = service.follow(&id, &id).await.expect_err("self follow");
    assert_eq!(err.code(), ErrorCode::SelfFollow);
    assert!(!service.is_following(&id, &id).await.expect("query"));
    service.unfollow(&id, &id).await.expect("no-op");
}

#[rstest]
#[tokio::test]
async fn follow_is_idempotent(harness: SocialHarness) {
    let a = harness.register("A", "a@example.com", "foobar").await;
    let b = harness.register("B", "b@example.com", "foobar").await;

    harness.graph.follow(a.id(), b.id()).await.expect("first");
    harness.clock.advance_seconds(60);
    harness.graph.follow(a.id(), b.id()).await.expect("second");

    let edges = harness.graph.relationships(a.id()).await.expect("edges");
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].created_at(), fixture_timestamp() + chrono::TimeDelta::seconds(2));
    assert!(harness.graph.is_following(a.id(), b.id()).await.expect("query"));
    assert!(!harness.graph.is_following(b.id(), a.id()).await.expect("query"));
}

#[rstest]
#[tokio::test]
async fn unfollow_is_idempotent(harness: SocialHarness) {
    let a = harness.register("A", "a@example.com", "foobar").await;
    let b = harness.register("B", "b@example.com", "foobar").await;
    harness.graph.follow(a.id(), b.id()).await.expect("follow");

    harness.graph.unfollow(a.id(), b.id()).await.expect("first");
    harness.graph.unfollow(a.id(), b.id()).await.expect("second");

    assert!(!harness.graph.is_following(a.id(), b.id()).await.expect("query"));
    assert!(harness.graph.followers(b.id()).await.expect("list").is_empty());
}

#[rstest]
#[tokio::test]
async fn following_an_unknown_account_fails(harness: SocialHarness) {
    let a = harness.register("A", "a@example.com", "foobar").await;

    let err = harness
        .graph
        .follow(a.id(), &AccountId::random())
        .await
        .expect_err("unknown");
    assert_eq!(err.code(), ErrorCode::UnknownAccount);
}

#[rstest]
#[tokio::test]
async fn followees_list_most_recent_first(harness: SocialHarness) {
    let reader = harness.register("Reader", "reader@example.com", "foobar").await;
    let first = harness.register("First", "first@example.com", "foobar").await;
    let second = harness.register("Second", "second@example.com", "foobar").await;

    harness.graph.follow(reader.id(), first.id()).await.expect("follow");
    harness.clock.advance_seconds(1);
    harness.graph.follow(reader.id(), second.id()).await.expect("follow");

    let names = harness
        .graph
        .followees(reader.id())
        .await
        .expect("followees")
        .iter()
        .map(|account| account.display_name().to_string())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["Second", "First"]);

    let followers = harness.graph.followers(first.id()).await.expect("followers");
    assert_eq!(followers.len(), 1);
    assert_eq!(followers[0].id(), reader.id());
    let reverse = harness
        .graph
        .reverse_relationships(first.id())
        .await
        .expect("edges");
    assert_eq!(reverse[0].follower(), reader.id());
}

#[rstest]
#[tokio::test]
async fn followers_use_one_batched_account_lookup() {
    let followee = AccountId::random();
    let older = sample_account("Older", "older@example.com", fixture_timestamp());
    let newer = sample_account("Newer", "newer@example.com", fixture_timestamp());
    let edges = vec![
        Relationship::try_new(*older.id(), followee, fixture_timestamp()).expect("edge"),
        Relationship::try_new(
            *newer.id(),
            followee,
            fixture_timestamp() + chrono::TimeDelta::hours(1),
        )
        .expect("edge"),
    ];

    let mut relationships = MockRelationshipRepository::new();
    relationships
        .expect_follower_edges()
        .times(1)
        .return_once(move |_| Ok(edges));
    let mut accounts = MockAccountRepository::new();
    let returned = vec![older.clone(), newer.clone()];
    accounts
        .expect_find_by_ids()
        .times(1)
        .return_once(move |_| Ok(returned));

    let followers = mocked(accounts, relationships)
        .followers(&followee)
        .await
        .expect("followers");
    assert_eq!(followers, vec![newer, older]);
}

#[rstest]
#[tokio::test]
async fn empty_edge_sets_skip_the_account_lookup() {
    let mut relationships = MockRelationshipRepository::new();
    relationships
        .expect_followee_edges()
        .times(1)
        .return_once(|_| Ok(Vec::new()));

    let followees = mocked(MockAccountRepository::new(), relationships)
        .followees(&AccountId::random())
        .await
        .expect("followees");
    assert!(followees.is_empty());
}

#[rstest]
#[tokio::test]
async fn storage_self_pair_maps_to_self_follow() {
    let mut relationships = MockRelationshipRepository::new();
    relationships
        .expect_insert_if_absent()
        .return_once(|_| Err(RelationshipRepositoryError::self_pair()));

    let err = mocked(MockAccountRepository::new(), relationships)
        .follow(&AccountId::random(), &AccountId::random())
        .await
        .expect_err("rejected");
    assert_eq!(err.code(), ErrorCode::SelfFollow);
}
