//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every study and health endpoint together with the
//! error schema wrappers from [`crate::inbound::http::schemas`]. Swagger UI
//! serves it in debug builds.

use utoipa::OpenApi;

use crate::inbound::http::form::{MicrobiologyRowBody, StudyFormBody};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use crate::inbound::http::studies_dto::{
    CreatedStudyBody, MessageBody, StudyBody, StudyRequestBody, StudyResultBody,
    StudyResultView, StudySummaryBody,
};

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Stability study backend API",
        description = "Record, query, close and delete product stability studies."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::studies::create_study,
        crate::inbound::http::studies::create_study_alias,
        crate::inbound::http::studies::submit_study_form,
        crate::inbound::http::studies::list_studies,
        crate::inbound::http::studies::search_studies,
        crate::inbound::http::studies::get_study,
        crate::inbound::http::studies::update_study,
        crate::inbound::http::studies::close_study,
        crate::inbound::http::studies::delete_study,
        crate::inbound::http::studies::delete_study_by_id,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        StudyRequestBody,
        StudyResultBody,
        StudyFormBody,
        MicrobiologyRowBody,
        StudySummaryBody,
        StudyBody,
        StudyResultView,
        CreatedStudyBody,
        MessageBody,
    )),
    tags(
        (name = "studies", description = "Stability studies and their results"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    const ERROR_SCHEMA_NAME: &str = "crate.domain.Error";

    #[rstest]
    fn error_schema_is_registered_with_wire_fields() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let Some(RefOr::T(Schema::Object(error))) = schemas.get(ERROR_SCHEMA_NAME) else {
            panic!("expected Error object schema");
        };
        for field in ["code", "message", "error", "traceId", "details"] {
            assert!(error.properties.contains_key(field), "missing {field}");
        }
    }

    #[rstest]
    #[case("/api/productos")]
    #[case("/api/productos/buscar")]
    #[case("/api/productos/{lote}")]
    #[case("/api/productos/{lote}/cerrar")]
    #[case("/api/estudio")]
    #[case("/api/estudio/{id}")]
    #[case("/api/guardar-estudio")]
    #[case("/health/ready")]
    fn documents_path(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing {path}");
    }
}
