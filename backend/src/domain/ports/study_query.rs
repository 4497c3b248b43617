//! Driving port for study reads.

use async_trait::async_trait;

use crate::domain::{Error, Study, StudySummary};

/// Request to list studies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListStudiesRequest {
    pub open_only: bool,
}

/// Request to search studies by substring.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchStudiesRequest {
    pub term: Option<String>,
}

/// Request to fetch one study.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetStudyRequest {
    pub lote: String,
}

/// Driving port for study read operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StudyQuery: Send + Sync {
    /// List studies ascending by id.
    async fn list_studies(&self, request: ListStudiesRequest) -> Result<Vec<StudySummary>, Error>;

    /// Case-insensitive search over product name, lote and reference. A
    /// blank term lists every study.
    async fn search_studies(&self, request: SearchStudiesRequest)
    -> Result<Vec<StudySummary>, Error>;

    /// Fetch a study with its results. Fails with `not_found` when absent.
    async fn get_study(&self, request: GetStudyRequest) -> Result<Study, Error>;
}
