//! Wiring of domain services onto the persistence adapter.

use std::sync::Arc;

use actix_web::web;

use stability_backend::domain::{StudyCommandService, StudyQueryService};
use stability_backend::inbound::http::state::HttpState;
use stability_backend::outbound::persistence::{DbPool, DieselStudyRepository};

/// Build handler state backed by the SQLite repository.
pub(super) fn build_http_state(pool: &DbPool) -> web::Data<HttpState> {
    let repository = Arc::new(DieselStudyRepository::new(pool.clone()));
    web::Data::new(HttpState::new(
        Arc::new(StudyCommandService::new(repository.clone())),
        Arc::new(StudyQueryService::new(repository)),
    ))
}
