//! Test utilities for the backend crate.
//!
//! Shared by unit tests (in `src/`) and integration tests (in `tests/`).
//! Compiled for `cfg(test)` and behind the `test-support` feature.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;

use crate::domain::ports::IdentityStore;
use crate::domain::{
    Account, AccountId, DisplayName, EmailAddress, FeedService, IdentityService,
    PasswordAuthenticator, PasswordCredential, PasswordHashingParams, Post, PostId,
    RegistrationRequest, RelationshipService,
};
use crate::outbound::memory::InMemoryStore;

/// Clock whose time only moves when told to.
#[derive(Debug)]
pub struct ManualClock(Mutex<DateTime<Utc>>);

impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn advance_seconds(&self, seconds: i64) {
        *self.lock_clock() += TimeDelta::seconds(seconds);
    }

    fn lock_clock(&self) -> std::sync::MutexGuard<'_, DateTime<Utc>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("clock mutex"),
        }
    }
}

impl Clock for ManualClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

/// Fixed starting instant used by fixtures.
pub fn fixture_timestamp() -> DateTime<Utc> {
    match Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).single() {
        Some(timestamp) => timestamp,
        None => panic!("fixture timestamp"),
    }
}

/// Authenticator with the cheapest cost parameters Argon2 accepts.
pub fn fast_authenticator() -> PasswordAuthenticator {
    match PasswordAuthenticator::new(PasswordHashingParams::new(8, 1, 1)) {
        Ok(authenticator) => authenticator,
        Err(error) => panic!("fast authenticator: {error}"),
    }
}

/// Account carrying a credential no password matches.
pub fn sample_account(name: &str, email: &str, created_at: DateTime<Utc>) -> Account {
    let display_name = match DisplayName::new(name) {
        Ok(display_name) => display_name,
        Err(error) => panic!("sample display name {name:?}: {error}"),
    };
    let email = match EmailAddress::new(email) {
        Ok(email) => email,
        Err(error) => panic!("sample email {email:?}: {error}"),
    };
    Account::new(
        AccountId::random(),
        display_name,
        email,
        PasswordCredential::placeholder(),
        created_at,
    )
}

/// Post by `author` at `created_at`.
pub fn sample_post(author: AccountId, content: &str, created_at: DateTime<Utc>) -> Post {
    Post {
        id: PostId::random(),
        author,
        content: content.to_owned(),
        created_at,
    }
}

/// The three services wired over one in-memory store and a manual clock.
pub struct SocialHarness {
    pub store: Arc<InMemoryStore>,
    pub clock: Arc<ManualClock>,
    pub identity: IdentityService<InMemoryStore, InMemoryStore, InMemoryStore>,
    pub graph: RelationshipService<InMemoryStore, InMemoryStore>,
    pub feed: FeedService<InMemoryStore, InMemoryStore>,
}

impl SocialHarness {
    pub fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        let clock = Arc::new(ManualClock::new(fixture_timestamp()));
        let dyn_clock: Arc<dyn Clock> = clock.clone();
        Self {
            identity: IdentityService::new(
                Arc::clone(&store),
                Arc::clone(&store),
                Arc::clone(&store),
                fast_authenticator(),
                Arc::clone(&dyn_clock),
            ),
            graph: RelationshipService::new(Arc::clone(&store), Arc::clone(&store), dyn_clock),
            feed: FeedService::new(Arc::clone(&store), Arc::clone(&store)),
            store,
            clock,
        }
    }

    /// Register an account, advancing the clock by one second afterwards.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Account {
        let request = RegistrationRequest::new(name, email, password, password);
        let account = match self.identity.register(request).await {
            Ok(account) => account,
            Err(error) => panic!("register {email}: {error}"),
        };
        self.clock.advance_seconds(1);
        account
    }

    /// Publish a post at the current clock time, then advance one second.
    pub fn publish(&self, author: &AccountId, content: &str) -> Post {
        let post = sample_post(*author, content, self.clock.utc());
        if let Err(error) = self.store.insert_post(post.clone()) {
            panic!("publish for {author}: {error}");
        }
        self.clock.advance_seconds(1);
        post
    }
}

impl Default for SocialHarness {
    fn default() -> Self {
        Self::new()
    }
}
