//! Diesel and pool error mapping for the study repository.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use crate::domain::ports::StudyRepositoryError;

use super::pool::PoolError;

/// Map pool errors to repository connection errors.
pub(crate) fn map_pool_error(error: PoolError) -> StudyRepositoryError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            StudyRepositoryError::connection(message)
        }
    }
}

/// Map Diesel errors to repository errors, emitting debug context.
pub(crate) fn map_diesel_error(error: DieselError) -> StudyRepositoryError {
    let error_message = error.to_string();
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(
                ?kind,
                message = info.message(),
                error = %error_message,
                "diesel operation failed"
            );
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            error = %error_message,
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => StudyRepositoryError::query("record not found"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, info) => {
            StudyRepositoryError::connection(info.message().to_owned())
        }
        DieselError::DatabaseError(_, info) => StudyRepositoryError::query(info.message().to_owned()),
        _ => StudyRepositoryError::query(error_message),
    }
}

/// Map errors raised while inserting a study, translating a unique violation
/// on the lote into [`StudyRepositoryError::DuplicateLote`].
///
/// Holder and product inserts use `ON CONFLICT DO NOTHING`, so the lote is
/// the only unique key a create can violate.
pub(crate) fn map_create_error(error: DieselError, lote: &str) -> StudyRepositoryError {
    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            debug!(%lote, "duplicate lote rejected");
            StudyRepositoryError::duplicate_lote(lote)
        }
        other => map_diesel_error(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[derive(Debug)]
    struct StubInfo(&'static str);

    impl diesel::result::DatabaseErrorInformation for StubInfo {
        fn message(&self) -> &str {
            self.0
        }
        fn details(&self) -> Option<&str> {
            None
        }
        fn hint(&self) -> Option<&str> {
            None
        }
        fn table_name(&self) -> Option<&str> {
            None
        }
        fn column_name(&self) -> Option<&str> {
            None
        }
        fn constraint_name(&self) -> Option<&str> {
            None
        }
        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    fn database_error(kind: DatabaseErrorKind, message: &'static str) -> DieselError {
        DieselError::DatabaseError(kind, Box::new(StubInfo(message)))
    }

    #[rstest]
    fn pool_errors_become_connection_errors() {
        let mapped = map_pool_error(PoolError::checkout("timed out"));
        assert_eq!(mapped, StudyRepositoryError::connection("timed out"));
    }

    #[rstest]
    fn closed_connection_becomes_connection_error() {
        let mapped = map_diesel_error(database_error(
            DatabaseErrorKind::ClosedConnection,
            "connection closed",
        ));
        assert_eq!(mapped, StudyRepositoryError::connection("connection closed"));
    }

    #[rstest]
    fn not_found_becomes_query_error() {
        let mapped = map_diesel_error(DieselError::NotFound);
        assert_eq!(mapped, StudyRepositoryError::query("record not found"));
    }

    #[rstest]
    fn unique_violation_on_create_is_duplicate_lote() {
        let mapped = map_create_error(
            database_error(
                DatabaseErrorKind::UniqueViolation,
                "UNIQUE constraint failed: studies.lote",
            ),
            "L-001",
        );
        assert_eq!(mapped, StudyRepositoryError::duplicate_lote("L-001"));
    }

    #[rstest]
    fn other_create_failures_keep_database_message() {
        let mapped = map_create_error(
            database_error(
                DatabaseErrorKind::ForeignKeyViolation,
                "FOREIGN KEY constraint failed",
            ),
            "L-001",
        );
        assert_eq!(mapped, StudyRepositoryError::query("FOREIGN KEY constraint failed"));
    }
}
