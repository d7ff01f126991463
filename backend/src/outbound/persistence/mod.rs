//! PostgreSQL persistence adapters using Diesel.
//!
//! Repositories are thin translators between the internal row structs
//! (`models.rs`, `schema.rs`) and domain types. They hold no business logic;
//! uniqueness, referential integrity, and the self-follow rule are enforced by
//! constraints and surfaced as port errors.
//!
//! # Example
//!
//! ```ignore
//! use social_backend::outbound::persistence::{DbPool, DieselAccountRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/social")).await?;
//! let accounts = DieselAccountRepository::new(pool);
//! ```

mod diesel_account_repository;
mod diesel_error_mapping;
mod diesel_post_repository;
mod diesel_relationship_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_account_repository::DieselAccountRepository;
pub use diesel_post_repository::DieselPostRepository;
pub use diesel_relationship_repository::DieselRelationshipRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
