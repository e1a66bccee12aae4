//! `db` crate — pure persistence layer.
//!
//! Provides a SQLite connection pool, typed row structs, and repository
//! functions for the `contributions` log.  No business logic lives here.

pub mod error;
pub mod pool;
pub mod repository;
pub mod models;

pub use pool::DbPool;
pub use error::DbError;
pub use models::{ContributionRow, NewContribution, SizePoint, NAME_SEPARATOR};
