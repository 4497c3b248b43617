//! SQLite persistence adapters using Diesel.
//!
//! This module implements the study repository port on an embedded SQLite
//! database through Diesel, with async access via `diesel-async` and `bb8`
//! connection pooling.
//!
//! # Architecture
//!
//! - **Thin adapter**: the repository translates between Diesel rows and
//!   domain types; validation and error policy stay in the domain.
//! - **Internal models**: row structs (`models.rs`) and table definitions
//!   (`schema.rs`) never leave this module.
//! - **Explicit pool**: a [`DbPool`] handle is passed to the adapter; there is
//!   no process-wide connection state.
//!
//! # Example
//!
//! ```no_run
//! use stability_backend::outbound::persistence::{
//!     DbPool, DieselStudyRepository, PoolConfig, run_migrations,
//! };
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! run_migrations("stability.db")?;
//! let pool = DbPool::new(PoolConfig::new("stability.db")).await?;
//! let repository = DieselStudyRepository::new(pool);
//! # let _ = repository;
//! # Ok(())
//! # }
//! ```

mod diesel_error_mapping;
mod diesel_study_repository;
mod migrations;
mod models;
mod pool;
mod schema;
mod sql_functions;

pub use diesel_study_repository::DieselStudyRepository;
pub use migrations::{MigrationError, run_migrations};
pub use pool::{DbPool, PoolConfig, PoolError, SqliteConn};
