//! Directed follow edges between accounts.
//!
//! An edge is identified solely by its ordered `(follower, followee)` pair.
//! Neither endpoint owns it; storage keys edges by the pair and removes them
//! when either endpoint disappears.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::account::AccountId;

/// Rejected edge shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RelationshipValidationError {
    /// Follower and followee are the same account.
    #[error("an account cannot follow itself")]
    SelfFollow,
}

/// A follow edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    follower: AccountId,
    followee: AccountId,
    created_at: DateTime<Utc>,
}

impl Relationship {
    /// Build an edge, rejecting self pairs.
    ///
    /// # Examples
    /// ```
    /// use chrono::Utc;
    /// use social_backend::domain::{AccountId, Relationship};
    ///
    /// let a = AccountId::random();
    /// assert!(Relationship::try_new(a, a, Utc::now()).is_err());
    /// assert!(Relationship::try_new(a, AccountId::random(), Utc::now()).is_ok());
    /// ```
    pub fn try_new(
        follower: AccountId,
        followee: AccountId,
        created_at: DateTime<Utc>,
    ) -> Result<Self, RelationshipValidationError> {
        if follower == followee {
            return Err(RelationshipValidationError::SelfFollow);
        }
        Ok(Self {
            follower,
            followee,
            created_at,
        })
    }

    /// Account doing the following.
    pub fn follower(&self) -> &AccountId {
        &self.follower
    }

    /// Account being followed.
    pub fn followee(&self) -> &AccountId {
        &self.followee
    }

    /// Edge creation time.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Most recent edge first; ties broken by followee id descending.
    pub fn newest_followee_first(a: &Self, b: &Self) -> Ordering {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.followee.cmp(&a.followee))
    }

    /// Most recent edge first; ties broken by follower id descending.
    pub fn newest_follower_first(a: &Self, b: &Self) -> Ordering {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.follower.cmp(&a.follower))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;
    use rstest::rstest;

    #[rstest]
    fn self_pairs_are_rejected() {
        let account = AccountId::random();
        assert_eq!(
            Relationship::try_new(account, account, Utc::now()),
            Err(RelationshipValidationError::SelfFollow)
        );
    }

    #[rstest]
    fn newest_edges_sort_first() {
        let follower = AccountId::random();
        let now = Utc::now();
        let older = Relationship::try_new(follower, AccountId::random(), now - TimeDelta::hours(1))
            .expect("edge");
        let newer = Relationship::try_new(follower, AccountId::random(), now).expect("edge");

        let mut edges = vec![older, newer];
        edges.sort_by(Relationship::newest_followee_first);
        assert_eq!(edges, vec![newer, older]);
    }

    #[rstest]
    fn equal_timestamps_fall_back_to_counterpart_id() {
        let follower = AccountId::random();
        let now = Utc::now();
        let a = Relationship::try_new(follower, AccountId::random(), now).expect("edge");
        let b = Relationship::try_new(follower, AccountId::random(), now).expect("edge");

        let mut edges = vec![a, b];
        edges.sort_by(Relationship::newest_followee_first);
        assert!(edges[0].followee() > edges[1].followee());
    }
}
