//! SQLite-backed study repository.
//!
//! Implements the `StudyRepository` port over the normalized schema
//! (`clients`, `products`, `studies`, `results`). Every multi-statement
//! mutation runs in one Diesel transaction, so a failure at any step leaves
//! no partial writes behind.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use tracing::debug;

use crate::domain::ports::{StudyRepository, StudyRepositoryError};
use crate::domain::{
    Lote, NewStudy, Study, StudyFilter, StudyId, StudyKey, StudyResult,
    StudyResultDraft, StudySummary, StudyUpdate,
};

use super::diesel_error_mapping::{map_create_error, map_diesel_error, map_pool_error};
use super::models::{
    ClientRow, NewClientRow, NewProductRow, NewStudyResultRow, NewStudyRow, ProductRow,
    StudyChangeset, StudyResultRow, StudyRow,
};
use super::pool::{DbPool, SqliteConn};
use super::schema::{clients, products, studies, study_results};
use super::sql_functions::fold_case;

/// Character used to escape `%` and `_` in search patterns.
const LIKE_ESCAPE: char = '\\';

/// Failures raised inside an update transaction.
#[derive(Debug)]
enum WriteError {
    Database(DieselError),
    Closed,
    SharedProduct(String),
}

impl From<DieselError> for WriteError {
    fn from(value: DieselError) -> Self {
        Self::Database(value)
    }
}

/// Diesel-backed implementation of the study repository.
#[derive(Clone)]
pub struct DieselStudyRepository {
    pool: DbPool,
}

impl DieselStudyRepository {
    /// Create a new repository with the given connection pool.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use stability_backend::outbound::persistence::{DbPool, DieselStudyRepository, PoolConfig};
    ///
    /// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
    /// let pool = DbPool::new(PoolConfig::new("stability.db")).await?;
    /// let repository = DieselStudyRepository::new(pool);
    /// # let _ = repository;
    /// # Ok(())
    /// # }
    /// ```
    #[must_use]
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Escape LIKE wildcards so the term matches literally.
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_') || ch == LIKE_ESCAPE {
            pattern.push(LIKE_ESCAPE);
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

/// Insert the holder if absent and return its id.
async fn client_id_for(conn: &mut SqliteConn, holder: &str) -> QueryResult<i32> {
    diesel::insert_into(clients::table)
        .values(NewClientRow {
            holder_name: holder,
        })
        .on_conflict(clients::holder_name)
        .do_nothing()
        .execute(conn)
        .await?;

    clients::table
        .filter(clients::holder_name.eq(holder))
        .select(clients::id)
        .first(conn)
        .await
}

/// Insert the product if its reference is absent and return its id.
///
/// An existing product keeps its stored name.
async fn product_id_for(conn: &mut SqliteConn, product_name: &str, reference: &str) -> QueryResult<i32> {
    diesel::insert_into(products::table)
        .values(NewProductRow {
            product_name,
            reference,
        })
        .on_conflict(products::reference)
        .do_nothing()
        .execute(conn)
        .await?;

    products::table
        .filter(products::reference.eq(reference))
        .select(products::id)
        .first(conn)
        .await
}

async fn insert_results(conn: &mut SqliteConn, study_id: i32, results: &[StudyResult]) -> QueryResult<usize> {
    if results.is_empty() {
        return Ok(0);
    }
    // SQLite has no DEFAULT keyword, so optional columns rule out a single
    // multi-row INSERT; the caller's transaction keeps the rows atomic.
    let mut inserted = 0;
    for result in results {
        inserted += diesel::insert_into(study_results::table)
            .values(NewStudyResultRow::new(study_id, result))
            .execute(conn)
            .await?;
    }
    Ok(inserted)
}

fn new_study_row(study: &NewStudy, client_id: i32, product_id: i32) -> NewStudyRow<'_> {
    let details = study.details();
    NewStudyRow {
        lote: study.lote().as_str(),
        client_id,
        product_id,
        sanitary_registration: details.sanitary_registration.as_deref(),
        manufacturer: details.manufacturer.as_deref(),
        study_site: details.study_site.as_deref(),
        description: details.description.as_deref(),
        tests_performed: details.tests_performed.as_deref(),
        observations: details.observations.as_deref(),
        units: details.units,
        release_date: details.release_date,
        chamber_start_date: details.chamber_start_date,
        study_start_date: details.study_start_date,
        study_end_date: details.study_end_date,
    }
}

fn summary_from_rows(
    study: StudyRow,
    client: ClientRow,
    product: ProductRow,
) -> Result<StudySummary, StudyRepositoryError> {
    let lote = Lote::new(study.lote.as_str())
        .map_err(|err| StudyRepositoryError::query(format!("stored lote is invalid: {err}")))?;
    Ok(StudySummary {
        id: StudyId::new(study.id),
        lote,
        product_name: product.product_name,
        reference: product.reference,
        holder: client.holder_name,
        details: study.details(),
        closed: study.closed,
        created_at: study.created_at,
    })
}

fn result_from_row(index: usize, row: StudyResultRow) -> Result<StudyResult, StudyRepositoryError> {
    let draft = StudyResultDraft {
        stability_type: row.stability_type,
        analysis: row.analysis,
        parameter: row.parameter,
        time_point: row.time_point,
        specification: row.specification,
        outcome: row.outcome,
    };
    StudyResult::new(index, draft)
        .map_err(|err| StudyRepositoryError::query(format!("stored result is invalid: {err}")))
}

/// Resolve the surrogate id addressed by `key`, if the study exists.
async fn resolve_study_id(conn: &mut SqliteConn, key: &StudyKey) -> QueryResult<Option<i32>> {
    match key {
        StudyKey::Lote(lote) => {
            studies::table
                .filter(studies::lote.eq(lote.as_str()))
                .select(studies::id)
                .first(conn)
                .await
                .optional()
        }
        StudyKey::Id(id) => {
            studies::table
                .find(id.get())
                .select(studies::id)
                .first(conn)
                .await
                .optional()
        }
    }
}

/// Apply `update` inside an open transaction. Returns rows matched.
async fn apply_update(conn: &mut SqliteConn, lote: &Lote, update: &StudyUpdate) -> Result<usize, WriteError> {
    let current: Option<(i32, bool, i32)> = studies::table
        .filter(studies::lote.eq(lote.as_str()))
        .select((studies::id, studies::closed, studies::product_id))
        .first(conn)
        .await
        .optional()?;
    let Some((study_id, closed, product_id)) = current else {
        return Ok(0);
    };
    if closed {
        return Err(WriteError::Closed);
    }

    let patch = &update.patch;
    let mut changeset = StudyChangeset::from_details(patch.details());
    if let Some(holder) = patch.holder() {
        changeset.client_id = Some(client_id_for(conn, holder).await?);
    }
    match (patch.reference(), patch.product_name()) {
        (Some(reference), Some(name)) => {
            let id = product_id_for(conn, name, reference).await?;
            let stored_name: String = products::table
                .find(id)
                .select(products::product_name)
                .first(conn)
                .await?;
            if stored_name != name {
                debug!(reference, requested = name, stored = %stored_name, "existing product keeps its name");
            }
            changeset.product_id = Some(id);
        }
        (Some(reference), None) => {
            let current_name: String = products::table
                .find(product_id)
                .select(products::product_name)
                .first(conn)
                .await?;
            changeset.product_id = Some(product_id_for(conn, &current_name, reference).await?);
        }
        (None, Some(name)) => {
            let sharers: i64 = studies::table
                .filter(studies::product_id.eq(product_id))
                .filter(studies::id.ne(study_id))
                .count()
                .get_result(conn)
                .await?;
            if sharers > 0 {
                let reference: String = products::table
                    .find(product_id)
                    .select(products::reference)
                    .first(conn)
                    .await?;
                return Err(WriteError::SharedProduct(reference));
            }
            diesel::update(products::table.find(product_id))
                .set(products::product_name.eq(name))
                .execute(conn)
                .await?;
        }
        (None, None) => {}
    }

    if changeset.has_changes() {
        diesel::update(studies::table.find(study_id))
            .set(&changeset)
            .execute(conn)
            .await?;
    }

    if let Some(results) = &update.results {
        let removed = diesel::delete(study_results::table.filter(study_results::study_id.eq(study_id)))
            .execute(conn)
            .await?;
        let inserted = insert_results(conn, study_id, results).await?;
        debug!(study_id, removed, inserted, "results replaced");
    }

    Ok(1)
}

#[async_trait]
impl StudyRepository for DieselStudyRepository {
    async fn create(&self, study: &NewStudy) -> Result<StudyId, StudyRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let study_id = conn
            .transaction(|conn| {
                async move {
                    let client_id = client_id_for(conn, study.holder()).await?;
                    let product_id =
                        product_id_for(conn, study.product_name(), study.reference()).await?;

                    diesel::insert_into(studies::table)
                        .values(new_study_row(study, client_id, product_id))
                        .execute(conn)
                        .await?;

                    let study_id: i32 = studies::table
                        .filter(studies::lote.eq(study.lote().as_str()))
                        .select(studies::id)
                        .first(conn)
                        .await?;

                    insert_results(conn, study_id, study.results()).await?;
                    Ok::<_, DieselError>(study_id)
                }
                .scope_boxed()
            })
            .await
            .map_err(|err| map_create_error(err, study.lote().as_str()))?;

        Ok(StudyId::new(study_id))
    }

    async fn update(&self, lote: &Lote, update: &StudyUpdate) -> Result<usize, StudyRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn.transaction(|conn| async move { apply_update(conn, lote, update).await }.scope_boxed())
            .await
            .map_err(|err| match err {
                WriteError::Closed => StudyRepositoryError::closed(lote.as_str()),
                WriteError::SharedProduct(reference) => StudyRepositoryError::shared_product(reference),
                WriteError::Database(error) => map_diesel_error(error),
            })
    }

    async fn close(&self, lote: &Lote) -> Result<usize, StudyRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::update(studies::table.filter(studies::lote.eq(lote.as_str())))
            .set(studies::closed.eq(true))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)
    }

    async fn delete(&self, key: &StudyKey) -> Result<usize, StudyRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn.transaction(|conn| {
            async move {
                let Some(study_id) = resolve_study_id(conn, key).await? else {
                    return Ok(0);
                };
                diesel::delete(study_results::table.filter(study_results::study_id.eq(study_id)))
                    .execute(conn)
                    .await?;
                diesel::delete(studies::table.find(study_id))
                    .execute(conn)
                    .await
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn list(&self, filter: &StudyFilter) -> Result<Vec<StudySummary>, StudyRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = studies::table
            .inner_join(clients::table)
            .inner_join(products::table)
            .select((
                StudyRow::as_select(),
                ClientRow::as_select(),
                ProductRow::as_select(),
            ))
            .order(studies::id.asc())
            .into_boxed();

        if filter.open_only {
            query = query.filter(studies::closed.eq(false));
        }
        if let Some(term) = filter.term.as_deref() {
            let pattern = like_pattern(&term.to_lowercase());
            query = query.filter(
                fold_case(products::product_name)
                    .like(pattern.clone())
                    .escape(LIKE_ESCAPE)
                    .or(fold_case(studies::lote)
                        .like(pattern.clone())
                        .escape(LIKE_ESCAPE))
                    .or(fold_case(products::reference)
                        .like(pattern)
                        .escape(LIKE_ESCAPE)),
            );
        }

        let rows: Vec<(StudyRow, ClientRow, ProductRow)> =
            query.load(&mut conn).await.map_err(map_diesel_error)?;

        rows.into_iter()
            .map(|(study, client, product)| summary_from_rows(study, client, product))
            .collect()
    }

    async fn find_by_lote(&self, lote: &Lote) -> Result<Option<Study>, StudyRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let found = conn
            .transaction(|conn| {
                async move {
                    let row: Option<(StudyRow, ClientRow, ProductRow)> = studies::table
                        .inner_join(clients::table)
                        .inner_join(products::table)
                        .filter(studies::lote.eq(lote.as_str()))
                        .select((
                            StudyRow::as_select(),
                            ClientRow::as_select(),
                            ProductRow::as_select(),
                        ))
                        .first(conn)
                        .await
                        .optional()?;
                    let Some(row) = row else {
                        return Ok(None);
                    };
                    let results: Vec<StudyResultRow> = study_results::table
                        .filter(study_results::study_id.eq(row.0.id))
                        .order(study_results::id.asc())
                        .select(StudyResultRow::as_select())
                        .load(conn)
                        .await?;
                    Ok::<_, DieselError>(Some((row, results)))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        let Some(((study, client, product), result_rows)) = found else {
            return Ok(None);
        };
        let summary = summary_from_rows(study, client, product)?;
        let results = result_rows
            .into_iter()
            .enumerate()
            .map(|(index, row)| result_from_row(index, row))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Some(Study { summary, results }))
    }
}

#[cfg(test)]
mod tests {
    //! Unit coverage for query helpers; behaviour against a live database is
    //! covered by the integration tests.
    use super::*;
    use crate::domain::StabilityType;
    use rstest::rstest;

    #[rstest]
    #[case("crema", "%crema%")]
    #[case("50%", "%50\\%%")]
    #[case("a_b", "%a\\_b%")]
    #[case("c:\\tmp", "%c:\\\\tmp%")]
    fn like_pattern_escapes_wildcards(#[case] term: &str, #[case] expected: &str) {
        assert_eq!(like_pattern(term), expected);
    }

    #[rstest]
    fn stored_rows_rebuild_results() {
        let row = StudyResultRow {
            stability_type: "natural".to_owned(),
            analysis: Some("microbiologico".to_owned()),
            parameter: "ecoli".to_owned(),
            time_point: "T3".to_owned(),
            specification: None,
            outcome: Some("Ausencia".to_owned()),
        };
        let result = result_from_row(0, row).expect("stored row is valid");
        assert_eq!(result.stability_type(), StabilityType::Natural);
        assert_eq!(result.analysis(), Some("microbiologico"));
    }

    #[rstest]
    fn corrupt_rows_surface_as_query_errors() {
        let row = StudyResultRow {
            stability_type: "tropical".to_owned(),
            analysis: None,
            parameter: "pH".to_owned(),
            time_point: "T0".to_owned(),
            specification: None,
            outcome: None,
        };
        let err = result_from_row(4, row).expect_err("unknown branch");
        assert!(matches!(err, StudyRepositoryError::Query { .. }));
    }
}
