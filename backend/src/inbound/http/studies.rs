//! Stability study HTTP handlers.
//!
//! ```text
//! POST   /api/productos
//! POST   /api/estudio
//! POST   /api/guardar-estudio
//! GET    /api/productos?solo_abiertos=true
//! GET    /api/productos/buscar?termino=
//! GET    /api/productos/{lote}
//! PUT    /api/productos/{lote}
//! POST   /api/productos/{lote}/cerrar
//! DELETE /api/productos/{lote}
//! DELETE /api/estudio/{id}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use tracing::debug;

use crate::domain::Error;
use crate::domain::ports::{
    CloseStudyRequest, CreateStudyRequest, DeleteStudyKey, DeleteStudyRequest, GetStudyRequest,
    ListStudiesRequest, SearchStudiesRequest, UpdateStudyRequest,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::form::StudyFormBody;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::studies_dto::{
    CreatedStudyBody, ListStudiesQuery, MessageBody, SearchStudiesQuery, StudyBody,
    StudyRequestBody, StudySummaryBody,
};

/// Register every study route on the `/api` scope.
///
/// `/productos/buscar` is registered ahead of `/productos/{lote}` so the
/// literal segment wins.
///
/// # Examples
/// ```no_run
/// use actix_web::{App, web};
/// use stability_backend::inbound::http::studies::study_routes;
///
/// let app = App::new().service(web::scope("/api").configure(study_routes));
/// # let _ = app;
/// ```
pub fn study_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(query_config())
        .service(create_study)
        .service(create_study_alias)
        .service(submit_study_form)
        .service(list_studies)
        .service(search_studies)
        .service(get_study)
        .service(update_study)
        .service(close_study)
        .service(delete_study)
        .service(delete_study_by_id);
}

/// Malformed JSON bodies surface as `invalid_request` instead of actix's
/// plain-text 400.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        Error::invalid_request("request body is not valid JSON")
            .with_cause(err.to_string())
            .into()
    })
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        Error::invalid_request("query string is invalid")
            .with_cause(err.to_string())
            .into()
    })
}

async fn create_from_body(state: &HttpState, body: StudyRequestBody) -> ApiResult<HttpResponse> {
    let draft = body.into_new_study()?;
    let response = state
        .studies
        .create_study(CreateStudyRequest { draft })
        .await?;
    Ok(HttpResponse::Created().json(CreatedStudyBody::from(response)))
}

/// Create a study with its results.
#[utoipa::path(
    post,
    path = "/api/productos",
    request_body = StudyRequestBody,
    responses(
        (status = 201, description = "Study created", body = CreatedStudyBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 409, description = "Lote already registered", body = ErrorSchema),
        (status = 500, description = "Storage failure", body = ErrorSchema)
    ),
    tags = ["studies"],
    operation_id = "createStudy"
)]
#[post("/productos")]
pub async fn create_study(
    state: web::Data<HttpState>,
    payload: web::Json<StudyRequestBody>,
) -> ApiResult<HttpResponse> {
    create_from_body(&state, payload.into_inner()).await
}

/// Create a study; same contract as `POST /api/productos`.
#[utoipa::path(
    post,
    path = "/api/estudio",
    request_body = StudyRequestBody,
    responses(
        (status = 201, description = "Study created", body = CreatedStudyBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 409, description = "Lote already registered", body = ErrorSchema),
        (status = 500, description = "Storage failure", body = ErrorSchema)
    ),
    tags = ["studies"],
    operation_id = "createStudyAlias"
)]
#[post("/estudio")]
pub async fn create_study_alias(
    state: web::Data<HttpState>,
    payload: web::Json<StudyRequestBody>,
) -> ApiResult<HttpResponse> {
    create_from_body(&state, payload.into_inner()).await
}

/// Create a study from the laboratory entry form.
///
/// `infoGeneral.referencia` is required here as on `/productos`; a form that
/// omits it is rejected with 400 and `details.field = "referencia"`.
#[utoipa::path(
    post,
    path = "/api/guardar-estudio",
    request_body = StudyFormBody,
    responses(
        (status = 201, description = "Study created", body = CreatedStudyBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 409, description = "Lote already registered", body = ErrorSchema),
        (status = 500, description = "Storage failure", body = ErrorSchema)
    ),
    tags = ["studies"],
    operation_id = "submitStudyForm"
)]
#[post("/guardar-estudio")]
pub async fn submit_study_form(
    state: web::Data<HttpState>,
    payload: web::Json<StudyFormBody>,
) -> ApiResult<HttpResponse> {
    let draft = payload.into_inner().into_new_study()?;
    debug!(results = draft.results.len(), "form submission mapped");
    let response = state
        .studies
        .create_study(CreateStudyRequest { draft })
        .await?;
    Ok(HttpResponse::Created().json(CreatedStudyBody::from(response)))
}

/// List studies in creation order.
#[utoipa::path(
    get,
    path = "/api/productos",
    params(ListStudiesQuery),
    responses(
        (status = 200, description = "Study summaries", body = [StudySummaryBody]),
        (status = 500, description = "Storage failure", body = ErrorSchema)
    ),
    tags = ["studies"],
    operation_id = "listStudies"
)]
#[get("/productos")]
pub async fn list_studies(
    state: web::Data<HttpState>,
    query: web::Query<ListStudiesQuery>,
) -> ApiResult<web::Json<Vec<StudySummaryBody>>> {
    let studies = state
        .studies_query
        .list_studies(ListStudiesRequest {
            open_only: query.solo_abiertos,
        })
        .await?;
    Ok(web::Json(
        studies.into_iter().map(StudySummaryBody::from).collect(),
    ))
}

/// Search studies by product name, lote or reference.
#[utoipa::path(
    get,
    path = "/api/productos/buscar",
    params(SearchStudiesQuery),
    responses(
        (status = 200, description = "Matching study summaries", body = [StudySummaryBody]),
        (status = 500, description = "Storage failure", body = ErrorSchema)
    ),
    tags = ["studies"],
    operation_id = "searchStudies"
)]
#[get("/productos/buscar")]
pub async fn search_studies(
    state: web::Data<HttpState>,
    query: web::Query<SearchStudiesQuery>,
) -> ApiResult<web::Json<Vec<StudySummaryBody>>> {
    let studies = state
        .studies_query
        .search_studies(SearchStudiesRequest {
            term: query.into_inner().termino,
        })
        .await?;
    Ok(web::Json(
        studies.into_iter().map(StudySummaryBody::from).collect(),
    ))
}

/// Fetch one study with its results.
#[utoipa::path(
    get,
    path = "/api/productos/{lote}",
    params(("lote" = String, Path, description = "Batch code")),
    responses(
        (status = 200, description = "Study with results", body = StudyBody),
        (status = 404, description = "Unknown lote", body = ErrorSchema),
        (status = 500, description = "Storage failure", body = ErrorSchema)
    ),
    tags = ["studies"],
    operation_id = "getStudy"
)]
#[get("/productos/{lote}")]
pub async fn get_study(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<StudyBody>> {
    let study = state
        .studies_query
        .get_study(GetStudyRequest {
            lote: path.into_inner(),
        })
        .await?;
    Ok(web::Json(StudyBody::from(study)))
}

/// Apply a sparse update; a supplied `resultados` list replaces all results.
#[utoipa::path(
    put,
    path = "/api/productos/{lote}",
    params(("lote" = String, Path, description = "Batch code")),
    request_body = StudyRequestBody,
    responses(
        (status = 200, description = "Study updated", body = MessageBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Unknown lote", body = ErrorSchema),
        (status = 409, description = "Study is closed", body = ErrorSchema),
        (status = 500, description = "Storage failure", body = ErrorSchema)
    ),
    tags = ["studies"],
    operation_id = "updateStudy"
)]
#[put("/productos/{lote}")]
pub async fn update_study(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<StudyRequestBody>,
) -> ApiResult<web::Json<MessageBody>> {
    let lote = path.into_inner();
    let (patch, results) = payload.into_inner().into_update()?;
    let response = state
        .studies
        .update_study(UpdateStudyRequest {
            lote: lote.clone(),
            patch,
            results,
        })
        .await?;
    if response.rows_matched == 0 {
        return Err(Error::not_found(format!("study {lote} not found")));
    }
    Ok(web::Json(MessageBody::new("Estudio actualizado correctamente")))
}

/// Mark a study as closed.
#[utoipa::path(
    post,
    path = "/api/productos/{lote}/cerrar",
    params(("lote" = String, Path, description = "Batch code")),
    responses(
        (status = 200, description = "Study closed", body = MessageBody),
        (status = 404, description = "Unknown lote", body = ErrorSchema),
        (status = 500, description = "Storage failure", body = ErrorSchema)
    ),
    tags = ["studies"],
    operation_id = "closeStudy"
)]
#[post("/productos/{lote}/cerrar")]
pub async fn close_study(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<MessageBody>> {
    state
        .studies
        .close_study(CloseStudyRequest {
            lote: path.into_inner(),
        })
        .await?;
    Ok(web::Json(MessageBody::new("Estudio cerrado correctamente")))
}

/// Delete a study and its results by lote.
#[utoipa::path(
    delete,
    path = "/api/productos/{lote}",
    params(("lote" = String, Path, description = "Batch code")),
    responses(
        (status = 200, description = "Study deleted", body = MessageBody),
        (status = 404, description = "Unknown lote", body = ErrorSchema),
        (status = 500, description = "Storage failure", body = ErrorSchema)
    ),
    tags = ["studies"],
    operation_id = "deleteStudy"
)]
#[delete("/productos/{lote}")]
pub async fn delete_study(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<MessageBody>> {
    state
        .studies
        .delete_study(DeleteStudyRequest {
            key: DeleteStudyKey::ByLote(path.into_inner()),
        })
        .await?;
    Ok(web::Json(MessageBody::new("Estudio eliminado correctamente")))
}

/// Delete a study and its results by surrogate id.
#[utoipa::path(
    delete,
    path = "/api/estudio/{id}",
    params(("id" = i32, Path, description = "Study identifier")),
    responses(
        (status = 200, description = "Study deleted", body = MessageBody),
        (status = 404, description = "Unknown study", body = ErrorSchema),
        (status = 500, description = "Storage failure", body = ErrorSchema)
    ),
    tags = ["studies"],
    operation_id = "deleteStudyById"
)]
#[delete("/estudio/{id}")]
pub async fn delete_study_by_id(
    state: web::Data<HttpState>,
    path: web::Path<i32>,
) -> ApiResult<web::Json<MessageBody>> {
    state
        .studies
        .delete_study(DeleteStudyRequest {
            key: DeleteStudyKey::ById(path.into_inner()),
        })
        .await?;
    Ok(web::Json(MessageBody::new("Estudio eliminado correctamente")))
}

#[cfg(test)]
#[path = "studies_tests.rs"]
mod tests;
