//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod study_command;
mod study_query;
mod study_repository;

#[cfg(test)]
pub use study_command::MockStudyCommand;
pub use study_command::{
    CloseStudyRequest, CreateStudyRequest, CreateStudyResponse, DeleteStudyKey,
    DeleteStudyRequest, StudyCommand, UpdateStudyRequest, UpdateStudyResponse,
};
#[cfg(test)]
pub use study_query::MockStudyQuery;
pub use study_query::{GetStudyRequest, ListStudiesRequest, SearchStudiesRequest, StudyQuery};
#[cfg(test)]
pub use study_repository::MockStudyRepository;
pub use study_repository::{StudyRepository, StudyRepositoryError};
