//! Application-defined SQL functions registered on every SQLite connection.
//!
//! SQLite's built-in `lower()` only folds ASCII, so search uses `fold_case`,
//! which lower-cases with Rust's Unicode tables.

use diesel::QueryResult;
use diesel::sql_types::Text;
use diesel::sqlite::SqliteConnection;

diesel::define_sql_function! {
    /// Unicode-aware lower-case fold.
    fn fold_case(x: Text) -> Text;
}

/// Install the functions above on `conn`.
pub(super) fn register(conn: &mut SqliteConnection) -> QueryResult<()> {
    fold_case_utils::register_impl(conn, |value: String| value.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::{Connection, RunQueryDsl, select};
    use rstest::rstest;

    #[rstest]
    #[case("ÁCIDO HIALURÓNICO", "ácido hialurónico")]
    #[case("Crema NIÑOS", "crema niños")]
    #[case("REF-100", "ref-100")]
    fn fold_case_lowers_non_ascii_letters(#[case] raw: &str, #[case] expected: &str) {
        let mut conn = SqliteConnection::establish(":memory:").expect("in-memory database");
        register(&mut conn).expect("function registers");

        let folded: String = select(fold_case(raw))
            .get_result(&mut conn)
            .expect("fold_case runs");

        assert_eq!(folded, expected);
    }
}
