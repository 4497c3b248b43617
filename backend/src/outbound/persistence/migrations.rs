//! Embedded schema migrations.
//!
//! Migrations under `backend/migrations/` are compiled into the binary and
//! applied at startup over a plain synchronous connection, before the pool
//! is built.

use diesel::sqlite::SqliteConnection;
use diesel::{Connection, ConnectionError};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::info;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Errors raised while migrating the database.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    /// The database could not be opened.
    #[error("failed to open database for migrations: {0}")]
    Connection(#[from] ConnectionError),
    /// A migration failed to apply.
    #[error("failed to apply migrations: {message}")]
    Apply { message: String },
}

/// Apply every pending migration to the database at `database_url`.
///
/// Returns the number of migrations applied; zero when the schema is already
/// current.
///
/// # Errors
///
/// Returns [`MigrationError`] when the database cannot be opened or a
/// migration fails.
pub fn run_migrations(database_url: &str) -> Result<usize, MigrationError> {
    let mut conn = SqliteConnection::establish(database_url)?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|err| MigrationError::Apply {
            message: err.to_string(),
        })?;
    for version in &applied {
        info!(%version, "migration applied");
    }
    Ok(applied.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn migrations_apply_once() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("migrate.db");
        let url = path.to_str().expect("utf-8 path");

        let first = run_migrations(url).expect("fresh database migrates");
        let second = run_migrations(url).expect("current database is a no-op");

        assert!(first >= 1);
        assert_eq!(second, 0);
    }
}
