//! Outbound adapters implementing the domain's storage ports.
//!
//! - **memory**: process-local store backing tests and embedders
//! - **persistence**: PostgreSQL repositories built on Diesel
//!
//! Adapters convert between domain types and storage representations and
//! contain no business logic.

pub mod memory;
pub mod persistence;
