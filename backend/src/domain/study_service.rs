//! Stability study domain services.
//!
//! These services implement the study driving ports: they validate incoming
//! drafts, delegate to the [`StudyRepository`] and translate repository
//! failures into domain [`Error`] values.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::domain::ports::{
    CloseStudyRequest, CreateStudyRequest, CreateStudyResponse, DeleteStudyKey,
    DeleteStudyRequest, GetStudyRequest, ListStudiesRequest, SearchStudiesRequest, StudyCommand,
    StudyQuery, StudyRepository, StudyRepositoryError, UpdateStudyRequest, UpdateStudyResponse,
};
use crate::domain::{
    Error, Lote, NewStudy, Study, StudyFilter, StudyId, StudyKey, StudyResult, StudySummary,
    StudyUpdate, StudyValidationError,
};

fn map_repository_error(error: StudyRepositoryError) -> Error {
    match error {
        StudyRepositoryError::Connection { message } => {
            Error::internal("study storage unavailable").with_cause(message)
        }
        StudyRepositoryError::Query { message } => {
            Error::internal("study storage error").with_cause(message)
        }
        StudyRepositoryError::DuplicateLote { lote } => {
            Error::conflict(format!("a study with lote {lote} already exists"))
                .with_details(json!({ "field": "lote", "code": "duplicate", "lote": lote }))
        }
        StudyRepositoryError::Closed { lote } => Error::conflict(format!("study {lote} is closed"))
            .with_details(json!({ "lote": lote, "code": "closed" })),
        StudyRepositoryError::SharedProduct { reference } => Error::conflict(format!(
            "product {reference} is shared with other studies; supply a new referencia to rename"
        ))
        .with_details(json!({ "field": "producto", "code": "shared_product", "referencia": reference })),
    }
}

fn map_validation_error(error: &StudyValidationError) -> Error {
    let mut details = json!({ "field": error.field(), "code": error.reason() });
    if let (Some(index), Some(map)) = (error.result_index(), details.as_object_mut()) {
        map.insert("index".to_owned(), json!(index));
    }
    Error::invalid_request(error.to_string()).with_details(details)
}

/// Lookups by a lote that cannot be valid can never match a stored study.
fn lookup_lote(raw: &str) -> Result<Lote, Error> {
    Lote::new(raw).map_err(|_| Error::not_found(format!("study {} not found", raw.trim())))
}

/// Study service implementing the command driving port.
#[derive(Clone)]
pub struct StudyCommandService<R> {
    study_repo: Arc<R>,
}

impl<R> StudyCommandService<R> {
    /// Create a new command service with the study repository.
    pub const fn new(study_repo: Arc<R>) -> Self {
        Self { study_repo }
    }
}

#[async_trait]
impl<R> StudyCommand for StudyCommandService<R>
where
    R: StudyRepository,
{
    async fn create_study(&self, request: CreateStudyRequest) -> Result<CreateStudyResponse, Error> {
        let study = NewStudy::new(request.draft).map_err(|err| map_validation_error(&err))?;

        let id = self
            .study_repo
            .create(&study)
            .await
            .map_err(map_repository_error)?;

        info!(
            study_id = %id,
            lote = %study.lote(),
            results = study.results().len(),
            "study created"
        );
        Ok(CreateStudyResponse {
            id,
            lote: study.lote().clone(),
        })
    }

    async fn update_study(&self, request: UpdateStudyRequest) -> Result<UpdateStudyResponse, Error> {
        let UpdateStudyRequest {
            lote,
            patch,
            results,
        } = request;
        let Ok(lote) = Lote::new(lote) else {
            return Ok(UpdateStudyResponse { rows_matched: 0 });
        };
        let results = results
            .map(StudyResult::from_drafts)
            .transpose()
            .map_err(|err| map_validation_error(&err))?;
        let update = StudyUpdate { patch, results };

        let rows_matched = self
            .study_repo
            .update(&lote, &update)
            .await
            .map_err(map_repository_error)?;

        if rows_matched == 0 {
            debug!(lote = %lote, "update matched no study");
        } else {
            info!(
                lote = %lote,
                patched = !update.patch.is_empty(),
                replaced_results = update.results.as_ref().map(Vec::len),
                "study updated"
            );
        }
        Ok(UpdateStudyResponse { rows_matched })
    }

    async fn close_study(&self, request: CloseStudyRequest) -> Result<(), Error> {
        let lote = lookup_lote(&request.lote)?;
        let rows = self
            .study_repo
            .close(&lote)
            .await
            .map_err(map_repository_error)?;
        if rows == 0 {
            return Err(Error::not_found(format!("study {lote} not found")));
        }
        info!(lote = %lote, "study closed");
        Ok(())
    }

    async fn delete_study(&self, request: DeleteStudyRequest) -> Result<(), Error> {
        let key = match request.key {
            DeleteStudyKey::ByLote(raw) => StudyKey::Lote(lookup_lote(&raw)?),
            DeleteStudyKey::ById(id) => StudyKey::Id(StudyId::new(id)),
        };
        let rows = self
            .study_repo
            .delete(&key)
            .await
            .map_err(map_repository_error)?;
        if rows == 0 {
            warn!(key = %key, "delete matched no study");
            return Err(Error::not_found(format!("study with {key} not found")));
        }
        info!(key = %key, "study deleted");
        Ok(())
    }
}

/// Study service implementing the query driving port.
#[derive(Clone)]
pub struct StudyQueryService<R> {
    study_repo: Arc<R>,
}

impl<R> StudyQueryService<R> {
    /// Create a new query service with the study repository.
    pub const fn new(study_repo: Arc<R>) -> Self {
        Self { study_repo }
    }
}

#[async_trait]
impl<R> StudyQuery for StudyQueryService<R>
where
    R: StudyRepository,
{
    async fn list_studies(&self, request: ListStudiesRequest) -> Result<Vec<StudySummary>, Error> {
        self.study_repo
            .list(&StudyFilter::listing(request.open_only))
            .await
            .map_err(map_repository_error)
    }

    async fn search_studies(
        &self,
        request: SearchStudiesRequest,
    ) -> Result<Vec<StudySummary>, Error> {
        self.study_repo
            .list(&StudyFilter::search(request.term))
            .await
            .map_err(map_repository_error)
    }

    async fn get_study(&self, request: GetStudyRequest) -> Result<Study, Error> {
        let lote = lookup_lote(&request.lote)?;
        self.study_repo
            .find_by_lote(&lote)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found(format!("study {lote} not found")))
    }
}

#[cfg(test)]
#[path = "study_service_tests.rs"]
mod tests;
