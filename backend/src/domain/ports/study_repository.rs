//! Port for stability study persistence.
//!
//! Adapters own transaction boundaries: every mutating method either applies
//! all of its writes or none of them.

use async_trait::async_trait;

use crate::domain::{Lote, NewStudy, Study, StudyFilter, StudyId, StudyKey, StudySummary, StudyUpdate};

use super::define_port_error;

define_port_error! {
    /// Errors raised by study repository adapters.
    pub enum StudyRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "study repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "study repository query failed: {message}",
        /// A study with the same lote already exists.
        DuplicateLote { lote: String } =>
            "a study with lote {lote} already exists",
        /// The study is closed and rejects updates.
        Closed { lote: String } =>
            "study {lote} is closed",
        /// A rename would change a product other studies also reference.
        SharedProduct { reference: String } =>
            "product {reference} is shared with other studies",
    }
}

/// Port for reading and writing studies with their results.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StudyRepository: Send + Sync {
    /// Insert a study, its holder and product (get-or-create) and all
    /// results, returning the surrogate id.
    async fn create(&self, study: &NewStudy) -> Result<StudyId, StudyRepositoryError>;

    /// Apply `update` to the study identified by `lote`.
    ///
    /// Returns the number of study rows matched; zero when the lote is
    /// unknown.
    async fn update(&self, lote: &Lote, update: &StudyUpdate) -> Result<usize, StudyRepositoryError>;

    /// Mark the study closed. Returns the number of rows matched.
    async fn close(&self, lote: &Lote) -> Result<usize, StudyRepositoryError>;

    /// Delete the study and its results. Returns the number of study rows
    /// removed.
    async fn delete(&self, key: &StudyKey) -> Result<usize, StudyRepositoryError>;

    /// List studies matching `filter`, ascending by id.
    async fn list(&self, filter: &StudyFilter) -> Result<Vec<StudySummary>, StudyRepositoryError>;

    /// Fetch one study with its results in insertion order.
    async fn find_by_lote(&self, lote: &Lote) -> Result<Option<Study>, StudyRepositoryError>;
}
