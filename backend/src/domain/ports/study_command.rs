//! Driving port for study mutations.

use async_trait::async_trait;

use crate::domain::{Error, Lote, NewStudyDraft, StudyId, StudyPatch, StudyResultDraft};

/// Request to create a study with its results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateStudyRequest {
    pub draft: NewStudyDraft,
}

/// Response from creating a study.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateStudyResponse {
    pub id: StudyId,
    pub lote: Lote,
}

/// Request to update a study identified by lote.
///
/// `results: None` leaves stored results untouched; `Some(vec![])` clears
/// them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateStudyRequest {
    pub lote: String,
    pub patch: StudyPatch,
    pub results: Option<Vec<StudyResultDraft>>,
}

/// Response from updating a study.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateStudyResponse {
    /// Study rows matched by the lote; zero when unknown.
    pub rows_matched: usize,
}

/// Request to close a study.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseStudyRequest {
    pub lote: String,
}

/// Key accepted by [`DeleteStudyRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteStudyKey {
    ByLote(String),
    ById(i32),
}

/// Request to delete a study and its results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteStudyRequest {
    pub key: DeleteStudyKey,
}

/// Driving port for study write operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StudyCommand: Send + Sync {
    /// Validate and persist a new study.
    ///
    /// Fails with `invalid_request` for validation problems, `conflict` for
    /// a duplicate lote and `internal_error` for storage failures.
    async fn create_study(&self, request: CreateStudyRequest) -> Result<CreateStudyResponse, Error>;

    /// Apply a sparse update and optional result replacement.
    ///
    /// Fails with `conflict` when the study is closed.
    async fn update_study(&self, request: UpdateStudyRequest) -> Result<UpdateStudyResponse, Error>;

    /// Close a study. Fails with `not_found` when the lote is unknown.
    async fn close_study(&self, request: CloseStudyRequest) -> Result<(), Error>;

    /// Delete a study and its results. Fails with `not_found` when nothing
    /// was deleted.
    async fn delete_study(&self, request: DeleteStudyRequest) -> Result<(), Error>;
}
