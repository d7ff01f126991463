//! Domain primitives, services, and ports.
//!
//! Purpose: define the account, relationship, and post types and the three
//! services built on them. Types are immutable once constructed and document
//! their invariants and serialisation contracts in their own Rustdoc.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - Account, AccountId, DisplayName, EmailAddress: identity model.
//! - PasswordAuthenticator: salted Argon2id credential derivation.
//! - Relationship, Post: follow edges and feed entries.
//! - IdentityService, RelationshipService, FeedService: driving port
//!   implementations.

pub mod account;
pub mod auth;
pub mod error;
pub mod feed_service;
pub mod identity_service;
pub mod password;
pub mod ports;
pub mod post;
pub mod relationship;
pub mod relationship_service;
mod repository_error_mapping;
pub mod storage_deadline;

pub use self::account::{
    Account, AccountField, AccountId, AccountValidationError, DISPLAY_NAME_MAX, DisplayName,
    EmailAddress, NormalizedEmail, PASSWORD_MAX, PASSWORD_MIN,
};
pub use self::auth::{LoginCredentials, Password, Registration, RegistrationRequest};
pub use self::error::{Error, ErrorCode, FieldViolation};
pub use self::feed_service::FeedService;
pub use self::identity_service::IdentityService;
pub use self::password::{
    PasswordAuthenticator, PasswordCredential, PasswordDigest, PasswordHashingError,
    PasswordHashingParams, Salt,
};
pub use self::post::{Post, PostId};
pub use self::relationship::{Relationship, RelationshipValidationError};
pub use self::relationship_service::RelationshipService;
pub use self::storage_deadline::StorageDeadline;

