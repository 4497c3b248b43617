//! Shared fixtures for the SQLite-backed integration tests.
//!
//! Every context owns a fresh database file inside a temporary directory, so
//! tests never share state and need no external services.

use diesel::connection::SimpleConnection;
use diesel::sql_types::BigInt;
use diesel::sqlite::SqliteConnection;
use diesel::{Connection, RunQueryDsl};
use stability_backend::domain::{NewStudy, NewStudyDraft, StudyDetails, StudyResultDraft};
use stability_backend::outbound::persistence::{
    DbPool, DieselStudyRepository, PoolConfig, run_migrations,
};
use tempfile::TempDir;

/// Migrated database plus a pool over it.
pub struct DatabaseContext {
    _dir: TempDir,
    pub database_url: String,
    pub pool: DbPool,
}

impl DatabaseContext {
    /// Create and migrate a throwaway database.
    pub async fn new() -> Result<Self, String> {
        let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
        let database_url = dir
            .path()
            .join("stability.db")
            .to_str()
            .ok_or_else(|| "temp path is not UTF-8".to_owned())?
            .to_owned();
        run_migrations(&database_url).map_err(|err| err.to_string())?;
        let pool = DbPool::new(PoolConfig::new(&database_url).with_max_size(2))
            .await
            .map_err(|err| err.to_string())?;
        Ok(Self {
            _dir: dir,
            database_url,
            pool,
        })
    }

    pub fn repository(&self) -> DieselStudyRepository {
        DieselStudyRepository::new(self.pool.clone())
    }

    /// Run raw SQL over a separate synchronous connection.
    pub fn execute(&self, sql: &str) {
        let mut conn = SqliteConnection::establish(&self.database_url).expect("open database");
        conn.batch_execute(sql).expect("execute SQL");
    }

    /// Count rows in `table`.
    pub fn count(&self, table: &str) -> i64 {
        let mut conn = SqliteConnection::establish(&self.database_url).expect("open database");
        diesel::select(diesel::dsl::sql::<BigInt>(&format!(
            "(SELECT COUNT(*) FROM {table})"
        )))
        .get_result(&mut conn)
        .expect("count rows")
    }
}

pub fn result_draft(stability_type: &str, parameter: &str, time_point: &str) -> StudyResultDraft {
    StudyResultDraft {
        stability_type: stability_type.to_owned(),
        analysis: None,
        parameter: parameter.to_owned(),
        time_point: time_point.to_owned(),
        specification: None,
        outcome: Some("Conforme".to_owned()),
    }
}

pub fn study_draft(lote: &str, results: Vec<StudyResultDraft>) -> NewStudyDraft {
    NewStudyDraft {
        lote: lote.to_owned(),
        product_name: Some("Crema hidratante".to_owned()),
        reference: Some(format!("REF-{lote}")),
        holder: Some("Laboratorios Andinos".to_owned()),
        details: StudyDetails {
            manufacturer: Some("Planta Norte".to_owned()),
            units: Some(24),
            ..StudyDetails::default()
        },
        results,
    }
}

pub fn new_study(lote: &str, results: Vec<StudyResultDraft>) -> NewStudy {
    NewStudy::new(study_draft(lote, results)).expect("valid study")
}
