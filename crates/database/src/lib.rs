//! # Mining Database Crate
//!
//! This crate is the persistence layer of the mining automation tools. It owns
//! the PostgreSQL connection, keeps the stored schema in step with the entity
//! catalog in `core-types`, and provides the data access the other tools use.
//!
//! ## Architectural Principles
//!
//! - **Adapter:** All SQL lives here. The rest of the application sees entity
//!   structs and ids, never queries.
//! - **Explicit handles:** Every operation receives its connection, transaction or
//!   pool explicitly; there is no global database handle.
//! - **Errors, not exits:** Failures come back as [`DbError`]. Whether a failure
//!   ends the process is the caller's decision.
//!
//! ## Public API
//!
//! - `connect`: Establishes the connection pool from discrete parameters.
//! - `verify_and_update_schema`: The schema lifecycle, generic over [`CatalogStore`].
//! - `resolve_miner` / `resolve_algorithm` / `resolve_pool_url`: Reference lookups.
//! - `DbRepository`: Transactional wrappers around the above plus the append-only
//!   observation writers.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
pub mod migrator;
pub mod repository;
pub mod resolver;
pub mod schema;
pub mod store;

#[cfg(test)]
mod memory;

// Re-export the key components to create a clean, public-facing API.
pub use connection::{connect, connect_options, describe_target};
pub use error::DbError;
pub use repository::DbRepository;
pub use resolver::{resolve_algorithm, resolve_miner, resolve_pool_url};
pub use schema::{SchemaOutcome, apply_catalog, verify_and_update_schema};
pub use store::CatalogStore;
