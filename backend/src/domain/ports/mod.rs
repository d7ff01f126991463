//! Domain ports for the hexagonal boundary.
//!
//! Driven ports (`*Repository`) are implemented by storage adapters under
//! `crate::outbound`. Driving ports ([`IdentityStore`], [`RelationshipGraph`],
//! [`FeedQuery`]) are implemented by the domain services.

mod macros;
pub(crate) use macros::define_port_error;

mod account_repository;
mod feed_query;
mod identity_store;
mod post_repository;
mod relationship_graph;
mod relationship_repository;

#[cfg(test)]
pub use account_repository::MockAccountRepository;
pub use account_repository::{AccountRepository, AccountRepositoryError};
pub use feed_query::FeedQuery;
pub use identity_store::IdentityStore;
#[cfg(test)]
pub use post_repository::MockPostRepository;
pub use post_repository::{PostRepository, PostRepositoryError};
pub use relationship_graph::RelationshipGraph;
#[cfg(test)]
pub use relationship_repository::MockRelationshipRepository;
pub use relationship_repository::{RelationshipRepository, RelationshipRepositoryError};
