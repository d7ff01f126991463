//! Behavioural tests for registration, the follow graph, and feeds.
//!
//! Every scenario runs the real services over the in-memory store with a
//! manual clock, so ordering assertions are deterministic.

use std::collections::HashSet;
use std::sync::Arc;

use rstest::{fixture, rstest};
use social_backend::domain::ports::{FeedQuery, IdentityStore, RelationshipGraph};
use social_backend::domain::{ErrorCode, LoginCredentials, RegistrationRequest};
use social_backend::test_support::SocialHarness;

#[fixture]
fn harness() -> SocialHarness {
    SocialHarness::new()
}

#[rstest]
#[tokio::test]
async fn registered_accounts_authenticate_by_email(harness: SocialHarness) {
    let account = harness
        .register("Example User", "user@example.com", "foobar")
        .await;

    let authenticated = harness
        .identity
        .authenticate(&LoginCredentials::new("user@example.com", "foobar"))
        .await
        .expect("no storage error")
        .expect("credentials accepted");
    assert_eq!(authenticated.id(), account.id());
    assert!(!authenticated.is_admin());
}

#[rstest]
#[tokio::test]
async fn email_uniqueness_is_case_insensitive(harness: SocialHarness) {
    harness
        .register("Example User", "user@example.com", "foobar")
        .await;

    let err = harness
        .identity
        .register(RegistrationRequest::new(
            "Shouting User",
            "USER@EXAMPLE.COM",
            "foobar",
            "foobar",
        ))
        .await
        .expect_err("duplicate rejected");
    assert_eq!(err.code(), ErrorCode::DuplicateEmail);
}

#[rstest]
#[case(5, false)]
#[case(6, true)]
#[case(40, true)]
#[case(41, false)]
#[tokio::test]
async fn password_length_bounds(
    harness: SocialHarness,
    #[case] length: usize,
    #[case] accepted: bool,
) {
    let password = "x".repeat(length);
    let result = harness
        .identity
        .register(RegistrationRequest::new(
            "Example User",
            "user@example.com",
            password.as_str(),
            password.as_str(),
        ))
        .await;

    match (accepted, result) {
        (true, Ok(_)) => {}
        (false, Err(err)) => {
            assert_eq!(err.code(), ErrorCode::ValidationFailed);
            assert_eq!(err.violations()[0].field, "password");
        }
        (true, Err(err)) => panic!("length {length} rejected: {err}"),
        (false, Ok(_)) => panic!("length {length} accepted"),
    }
}

#[rstest]
#[tokio::test]
async fn accounts_cannot_follow_themselves(harness: SocialHarness) {
    let account = harness.register("Solo", "solo@example.com", "foobar").await;

    assert!(!harness
        .graph
        .is_following(account.id(), account.id())
        .await
        .expect("query"));
    let err = harness
        .graph
        .follow(account.id(), account.id())
        .await
        .expect_err("self follow");
    assert_eq!(err.code(), ErrorCode::SelfFollow);
}

#[rstest]
#[tokio::test]
async fn following_twice_leaves_one_edge(harness: SocialHarness) {
    let a = harness.register("A", "a@example.com", "foobar").await;
    let b = harness.register("B", "b@example.com", "foobar").await;

    harness.graph.follow(a.id(), b.id()).await.expect("follow");
    harness.graph.follow(a.id(), b.id()).await.expect("follow again");

    assert_eq!(harness.store.edge_count().expect("count"), 1);
    assert_eq!(harness.graph.followers(b.id()).await.expect("followers").len(), 1);
}

#[rstest]
#[tokio::test]
async fn unfollow_restores_the_not_following_state(harness: SocialHarness) {
    let a = harness.register("A", "a@example.com", "foobar").await;
    let b = harness.register("B", "b@example.com", "foobar").await;

    harness.graph.follow(a.id(), b.id()).await.expect("follow");
    assert!(harness.graph.is_following(a.id(), b.id()).await.expect("query"));

    harness.graph.unfollow(a.id(), b.id()).await.expect("unfollow");
    assert!(!harness.graph.is_following(a.id(), b.id()).await.expect("query"));
    assert!(harness.graph.followees(a.id()).await.expect("followees").is_empty());
}

#[rstest]
#[tokio::test]
async fn feed_orders_own_and_followed_posts_and_hides_strangers(harness: SocialHarness) {
    let reader = harness.register("Reader", "reader@example.com", "foobar").await;
    let followed = harness.register("Followed", "followed@example.com", "foobar").await;
    let stranger = harness.register("Stranger", "stranger@example.com", "foobar").await;

    let first_own = harness.publish(reader.id(), "Foo bar");
    let from_followed = harness.publish(followed.id(), "Baz quux");
    let from_stranger = harness.publish(stranger.id(), "Not for you");
    let latest_own = harness.publish(reader.id(), "Foo bar again");

    let before_follow = harness.feed.feed(reader.id()).await.expect("feed");
    assert_eq!(before_follow, vec![latest_own.clone(), first_own.clone()]);

    harness
        .graph
        .follow(reader.id(), followed.id())
        .await
        .expect("follow");
    let feed = harness.feed.feed(reader.id()).await.expect("feed");
    assert_eq!(feed, vec![latest_own, from_followed, first_own]);
    assert!(!feed.contains(&from_stranger));
}

#[rstest]
#[tokio::test]
async fn destroy_cascades_to_posts_and_edges(harness: SocialHarness) {
    let doomed = harness.register("Doomed", "doomed@example.com", "foobar").await;
    let fan = harness.register("Fan", "fan@example.com", "foobar").await;
    let idol = harness.register("Idol", "idol@example.com", "foobar").await;

    harness.graph.follow(fan.id(), doomed.id()).await.expect("follow");
    harness.graph.follow(doomed.id(), idol.id()).await.expect("follow");
    harness.graph.follow(fan.id(), idol.id()).await.expect("follow");
    let doomed_post = harness.publish(doomed.id(), "last words");

    harness.identity.destroy(doomed.id()).await.expect("destroy");

    assert_eq!(harness.store.edge_count().expect("count"), 1);
    let fan_followees = harness
        .graph
        .followees(fan.id())
        .await
        .expect("followees")
        .iter()
        .map(|account| *account.id())
        .collect::<HashSet<_>>();
    assert_eq!(fan_followees, HashSet::from([*idol.id()]));
    assert!(harness
        .graph
        .followers(idol.id())
        .await
        .expect("followers")
        .iter()
        .all(|account| account.id() != doomed.id()));
    assert!(!harness
        .feed
        .feed(fan.id())
        .await
        .expect("feed")
        .contains(&doomed_post));
    assert!(harness
        .identity
        .authenticate(&LoginCredentials::new("doomed@example.com", "foobar"))
        .await
        .expect("no storage error")
        .is_none());

    assert!(harness
        .identity
        .find_account(doomed.id())
        .await
        .expect("lookup")
        .is_none());
    let err = harness
        .feed
        .find_post(&doomed_post.id)
        .await
        .expect_err("post removed");
    assert_eq!(err.code(), ErrorCode::NotFound);
    let err = harness
        .identity
        .destroy(doomed.id())
        .await
        .expect_err("already destroyed");
    assert_eq!(err.code(), ErrorCode::UnknownAccount);
}

#[rstest]
#[tokio::test]
async fn registration_can_reuse_the_email_of_a_destroyed_account(harness: SocialHarness) {
    let gone = harness.register("Gone", "reuse@example.com", "foobar").await;
    harness.identity.destroy(gone.id()).await.expect("destroy");

    let again = harness.register("Back", "Reuse@Example.com", "barfoo").await;
    assert_ne!(again.id(), gone.id());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_registrations_for_one_email_yield_one_account() {
    let harness = Arc::new(SocialHarness::new());
    let attempts = (0..16)
        .map(|attempt| {
            let harness = Arc::clone(&harness);
            let email = if attempt % 2 == 0 {
                "race@example.com"
            } else {
                "RACE@Example.COM"
            };
            tokio::spawn(async move {
                harness
                    .identity
                    .register(RegistrationRequest::new(
                        format!("Racer {attempt}"),
                        email,
                        "foobar",
                        "foobar",
                    ))
                    .await
            })
        })
        .collect::<Vec<_>>();

    let mut registered = Vec::new();
    let mut duplicates = 0;
    for attempt in attempts {
        match attempt.await.expect("registration task") {
            Ok(account) => registered.push(account),
            Err(err) => {
                assert_eq!(err.code(), ErrorCode::DuplicateEmail);
                duplicates += 1;
            }
        }
    }
    assert_eq!(registered.len(), 1);
    assert_eq!(duplicates, 15);

    let winner = harness
        .identity
        .authenticate(&LoginCredentials::new("race@example.com", "foobar"))
        .await
        .expect("no storage error")
        .expect("winner authenticates");
    assert_eq!(winner.id(), registered[0].id());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_follow_and_unfollow_settle_on_one_edge_at_most() {
    let harness = Arc::new(SocialHarness::new());
    let a = harness.register("A", "a@example.com", "foobar").await;
    let b = harness.register("B", "b@example.com", "foobar").await;

    let toggles = (0..32)
        .map(|toggle| {
            let harness = Arc::clone(&harness);
            let (follower, followee) = (*a.id(), *b.id());
            tokio::spawn(async move {
                if toggle % 2 == 0 {
                    harness.graph.follow(&follower, &followee).await
                } else {
                    harness.graph.unfollow(&follower, &followee).await
                }
            })
        })
        .collect::<Vec<_>>();
    for toggle in toggles {
        toggle.await.expect("toggle task").expect("follow or unfollow");
    }

    assert!(harness.store.edge_count().expect("count") <= 1);
    assert!(harness.graph.relationships(a.id()).await.expect("edges").len() <= 1);

    harness.graph.follow(a.id(), b.id()).await.expect("follow");
    assert_eq!(harness.store.edge_count().expect("count"), 1);
    assert!(harness.graph.is_following(a.id(), b.id()).await.expect("query"));
}
