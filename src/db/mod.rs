//! Database module for PostgreSQL operations.
//!
//! This module provides:
//! - Database initialization and migrations
//! - The session/backend contract and its PostgreSQL and in-memory backends
//! - A driver that joins repository calls to the request's transaction
//! - Repository layer for database operations

pub mod driver;
pub mod error;
pub mod memory;
pub mod migrations;
pub mod postgres;
pub mod repo;
pub mod session;

pub use driver::{Driver, SessionGuard};
pub use error::DbError;
pub use memory::MemoryBackend;
pub use migrations::{init_db, run_migrations};
pub use postgres::PgBackend;
pub use repo::Repository;
pub use session::{Backend, Session};
