//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{StudyCommand, StudyQuery};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub studies: Arc<dyn StudyCommand>,
    pub studies_query: Arc<dyn StudyQuery>,
}

impl HttpState {
    /// Construct state from the study ports.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use stability_backend::domain::{StudyCommandService, StudyQueryService};
    /// use stability_backend::inbound::http::state::HttpState;
    /// use stability_backend::outbound::persistence::{DbPool, DieselStudyRepository, PoolConfig};
    ///
    /// # async fn build() -> Result<(), Box<dyn std::error::Error>> {
    /// let pool = DbPool::new(PoolConfig::new("stability.db")).await?;
    /// let repository = Arc::new(DieselStudyRepository::new(pool));
    /// let state = HttpState::new(
    ///     Arc::new(StudyCommandService::new(repository.clone())),
    ///     Arc::new(StudyQueryService::new(repository)),
    /// );
    /// # let _ = state;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(studies: Arc<dyn StudyCommand>, studies_query: Arc<dyn StudyQuery>) -> Self {
        Self {
            studies,
            studies_query,
        }
    }
}
