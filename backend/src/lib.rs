//! Identity and social graph core.
//!
//! Account registration and salted password authentication, a directed
//! follow graph, and feed assembly, behind ports with in-memory and
//! PostgreSQL adapters.

pub mod config;
pub mod domain;
pub mod outbound;
pub mod telemetry;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
