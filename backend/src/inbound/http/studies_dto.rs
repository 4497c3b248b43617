//! Request and response bodies for the study endpoints.
//!
//! Keys follow the Spanish field names used by the laboratory form. Input
//! aliases accept the names the form itself posts (`titular_registro`,
//! `fecha_inicio`, `tipo_estudio`, ...).

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::CreateStudyResponse;
use crate::domain::{
    Error, NewStudyDraft, Study, StudyDetails, StudyPatch, StudyResult, StudyResultDraft,
    StudySummary,
};
use crate::inbound::http::validation::{
    FieldName, ScalarInput, non_blank, parse_count, parse_date,
};

/// Study attributes accepted by create and update.
///
/// Every field is optional on the wire; create enforces `lote`, `titular`
/// and `referencia`. Blank strings count as absent.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct StudyRequestBody {
    #[schema(example = "L-001")]
    pub lote: Option<String>,
    #[schema(example = "Crema hidratante")]
    pub producto: Option<String>,
    #[schema(example = "REF-100")]
    pub referencia: Option<String>,
    #[serde(alias = "notificacion_sanitaria")]
    pub registro_sanitario: Option<String>,
    #[serde(alias = "titular_registro")]
    #[schema(example = "Laboratorios Andinos")]
    pub titular: Option<String>,
    pub fabricante: Option<String>,
    pub lugar_estudio: Option<String>,
    pub descripcion: Option<String>,
    pub pruebas: Option<String>,
    pub observaciones: Option<String>,
    #[schema(value_type = Option<String>, example = "24")]
    pub unidades: Option<ScalarInput>,
    #[schema(format = "date")]
    pub fecha_liberacion: Option<String>,
    #[schema(format = "date")]
    pub fecha_inicio_camaras: Option<String>,
    #[serde(alias = "fecha_inicio")]
    #[schema(format = "date")]
    pub fecha_inicio_estudio: Option<String>,
    #[serde(alias = "fecha_finalizacion")]
    #[schema(format = "date")]
    pub fecha_fin_estudio: Option<String>,
    /// Replacement result set. Absent leaves results untouched on update.
    pub resultados: Option<Vec<StudyResultBody>>,
}

/// One result row on the wire.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct StudyResultBody {
    /// `accelerated`, `acelerada` or `natural`.
    #[serde(alias = "tipo_estudio")]
    #[schema(example = "natural")]
    pub tipo_estabilidad: Option<String>,
    pub analisis: Option<String>,
    #[serde(alias = "parametro")]
    #[schema(example = "pH")]
    pub parametro_evaluado: Option<String>,
    #[schema(example = "T0")]
    pub tiempo: Option<String>,
    pub especificacion: Option<String>,
    #[schema(value_type = Option<String>, example = "6.1")]
    pub resultado: Option<ScalarInput>,
}

impl StudyResultBody {
    pub(crate) fn into_draft(self) -> StudyResultDraft {
        StudyResultDraft {
            stability_type: self.tipo_estabilidad.unwrap_or_default(),
            analysis: self.analisis,
            parameter: self.parametro_evaluado.unwrap_or_default(),
            time_point: self.tiempo.unwrap_or_default(),
            specification: self.especificacion,
            outcome: self.resultado.and_then(ScalarInput::into_text),
        }
    }
}

fn result_drafts(results: Vec<StudyResultBody>) -> Vec<StudyResultDraft> {
    results.into_iter().map(StudyResultBody::into_draft).collect()
}

/// Text and date attributes shared by create and update.
struct ParsedBody {
    lote: Option<String>,
    product_name: Option<String>,
    reference: Option<String>,
    holder: Option<String>,
    details: StudyDetails,
    results: Option<Vec<StudyResultDraft>>,
}

impl StudyRequestBody {
    fn parse(self) -> Result<ParsedBody, Error> {
        let details = StudyDetails {
            sanitary_registration: non_blank(self.registro_sanitario),
            manufacturer: non_blank(self.fabricante),
            study_site: non_blank(self.lugar_estudio),
            description: non_blank(self.descripcion),
            tests_performed: non_blank(self.pruebas),
            observations: non_blank(self.observaciones),
            units: parse_count(self.unidades, FieldName::new("unidades"))?,
            release_date: parse_date(self.fecha_liberacion, FieldName::new("fecha_liberacion"))?,
            chamber_start_date: parse_date(
                self.fecha_inicio_camaras,
                FieldName::new("fecha_inicio_camaras"),
            )?,
            study_start_date: parse_date(
                self.fecha_inicio_estudio,
                FieldName::new("fecha_inicio_estudio"),
            )?,
            study_end_date: parse_date(self.fecha_fin_estudio, FieldName::new("fecha_fin_estudio"))?,
        };
        Ok(ParsedBody {
            lote: self.lote,
            product_name: self.producto,
            reference: self.referencia,
            holder: self.titular,
            details,
            results: self.resultados.map(result_drafts),
        })
    }

    /// Build a creation draft; missing required fields surface from the
    /// domain validation.
    pub(crate) fn into_new_study(self) -> Result<NewStudyDraft, Error> {
        let parsed = self.parse()?;
        Ok(NewStudyDraft {
            lote: parsed.lote.unwrap_or_default(),
            product_name: parsed.product_name,
            reference: parsed.reference,
            holder: parsed.holder,
            details: parsed.details,
            results: parsed.results.unwrap_or_default(),
        })
    }

    /// Build a sparse patch plus optional result replacement. Any `lote` in
    /// the body is ignored; the path identifies the study.
    pub(crate) fn into_update(self) -> Result<(StudyPatch, Option<Vec<StudyResultDraft>>), Error> {
        let parsed = self.parse()?;
        let patch = StudyPatch::new(
            parsed.product_name,
            parsed.reference,
            parsed.holder,
            parsed.details,
        );
        Ok((patch, parsed.results))
    }
}

/// Study row as listed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StudySummaryBody {
    pub id: i32,
    pub lote: String,
    pub producto: String,
    pub referencia: String,
    pub titular: String,
    pub registro_sanitario: Option<String>,
    pub fabricante: Option<String>,
    pub lugar_estudio: Option<String>,
    pub descripcion: Option<String>,
    pub pruebas: Option<String>,
    pub observaciones: Option<String>,
    pub unidades: Option<i32>,
    pub fecha_liberacion: Option<NaiveDate>,
    pub fecha_inicio_camaras: Option<NaiveDate>,
    pub fecha_inicio_estudio: Option<NaiveDate>,
    pub fecha_fin_estudio: Option<NaiveDate>,
    pub cerrado: bool,
    pub creado_en: NaiveDateTime,
}

impl From<StudySummary> for StudySummaryBody {
    fn from(value: StudySummary) -> Self {
        let StudySummary {
            id,
            lote,
            product_name,
            reference,
            holder,
            details,
            closed,
            created_at,
        } = value;
        Self {
            id: id.get(),
            lote: lote.into(),
            producto: product_name,
            referencia: reference,
            titular: holder,
            registro_sanitario: details.sanitary_registration,
            fabricante: details.manufacturer,
            lugar_estudio: details.study_site,
            descripcion: details.description,
            pruebas: details.tests_performed,
            observaciones: details.observations,
            unidades: details.units,
            fecha_liberacion: details.release_date,
            fecha_inicio_camaras: details.chamber_start_date,
            fecha_inicio_estudio: details.study_start_date,
            fecha_fin_estudio: details.study_end_date,
            cerrado: closed,
            creado_en: created_at,
        }
    }
}

/// Stored result row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StudyResultView {
    #[schema(example = "accelerated")]
    pub tipo_estabilidad: String,
    pub analisis: Option<String>,
    pub parametro_evaluado: String,
    pub tiempo: String,
    pub especificacion: Option<String>,
    pub resultado: Option<String>,
}

impl From<&StudyResult> for StudyResultView {
    fn from(value: &StudyResult) -> Self {
        Self {
            tipo_estabilidad: value.stability_type().as_str().to_owned(),
            analisis: value.analysis().map(str::to_owned),
            parametro_evaluado: value.parameter().to_owned(),
            tiempo: value.time_point().to_owned(),
            especificacion: value.specification().map(str::to_owned),
            resultado: value.outcome().map(str::to_owned),
        }
    }
}

/// Study with its results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StudyBody {
    #[serde(flatten)]
    pub estudio: StudySummaryBody,
    pub resultados: Vec<StudyResultView>,
}

impl From<Study> for StudyBody {
    fn from(value: Study) -> Self {
        Self {
            resultados: value.results.iter().map(StudyResultView::from).collect(),
            estudio: StudySummaryBody::from(value.summary),
        }
    }
}

/// Acknowledgement returned after a create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CreatedStudyBody {
    #[schema(example = "Estudio guardado correctamente")]
    pub message: String,
    pub id: i32,
    pub lote: String,
}

impl From<CreateStudyResponse> for CreatedStudyBody {
    fn from(value: CreateStudyResponse) -> Self {
        Self {
            message: "Estudio guardado correctamente".to_owned(),
            id: value.id.get(),
            lote: value.lote.into(),
        }
    }
}

/// Plain acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MessageBody {
    pub message: String,
}

impl MessageBody {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Query string for `GET /api/productos`.
#[derive(Debug, Clone, Copy, Default, Deserialize, ToSchema, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListStudiesQuery {
    /// Only return studies that are not closed.
    #[serde(default)]
    pub solo_abiertos: bool,
}

/// Query string for `GET /api/productos/buscar`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchStudiesQuery {
    /// Substring matched against product name, lote and reference.
    pub termino: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn request_accepts_form_aliases() {
        let body: StudyRequestBody = serde_json::from_value(json!({
            "lote": "L-001",
            "titular_registro": "Laboratorios Andinos",
            "notificacion_sanitaria": "NSOC-1234",
            "fecha_inicio": "2025-01-10",
            "fecha_finalizacion": "",
            "unidades": "24",
            "resultados": [
                {"tipo_estudio": "Acelerada", "parametro": "pH", "tiempo": "T0", "resultado": 6.1}
            ]
        }))
        .expect("valid body");

        let draft = body.into_new_study().expect("valid draft");
        assert_eq!(draft.holder.as_deref(), Some("Laboratorios Andinos"));
        assert_eq!(draft.details.sanitary_registration.as_deref(), Some("NSOC-1234"));
        assert_eq!(draft.details.study_start_date, NaiveDate::from_ymd_opt(2025, 1, 10));
        assert_eq!(draft.details.study_end_date, None);
        assert_eq!(draft.details.units, Some(24));
        let result = draft.results.first().expect("one result");
        assert_eq!(result.stability_type, "Acelerada");
        assert_eq!(result.outcome.as_deref(), Some("6.1"));
    }

    #[rstest]
    fn update_without_results_leaves_them_untouched() {
        let body: StudyRequestBody =
            serde_json::from_value(json!({"observaciones": ""})).expect("valid body");
        let (patch, results) = body.into_update().expect("valid update");
        assert!(patch.is_empty());
        assert!(results.is_none());
    }

    #[rstest]
    fn update_with_empty_results_clears_them() {
        let body: StudyRequestBody =
            serde_json::from_value(json!({"resultados": []})).expect("valid body");
        let (_, results) = body.into_update().expect("valid update");
        assert_eq!(results, Some(Vec::new()));
    }

    #[rstest]
    fn invalid_dates_are_rejected() {
        let body: StudyRequestBody =
            serde_json::from_value(json!({"fecha_liberacion": "mañana"})).expect("valid body");
        let err = body.into_update().expect_err("invalid date");
        assert_eq!(err.code(), crate::domain::ErrorCode::InvalidRequest);
    }

    #[rstest]
    fn study_body_flattens_summary() {
        let summary = StudySummaryBody {
            id: 1,
            lote: "L-001".to_owned(),
            producto: "Shampoo".to_owned(),
            referencia: "REF-1".to_owned(),
            titular: "Cosméticos SAS".to_owned(),
            registro_sanitario: None,
            fabricante: None,
            lugar_estudio: None,
            descripcion: None,
            pruebas: None,
            observaciones: None,
            unidades: Some(10),
            fecha_liberacion: NaiveDate::from_ymd_opt(2025, 2, 1),
            fecha_inicio_camaras: None,
            fecha_inicio_estudio: None,
            fecha_fin_estudio: None,
            cerrado: false,
            creado_en: NaiveDate::from_ymd_opt(2025, 2, 1)
                .and_then(|date| date.and_hms_opt(9, 0, 0))
                .expect("valid timestamp"),
        };
        let body = StudyBody {
            estudio: summary,
            resultados: Vec::new(),
        };
        let value = serde_json::to_value(&body).expect("serialises");
        assert_eq!(value["lote"], json!("L-001"));
        assert_eq!(value["fecha_liberacion"], json!("2025-02-01"));
        assert_eq!(value["resultados"], json!([]));
        assert!(value.get("estudio").is_none());
    }
}
