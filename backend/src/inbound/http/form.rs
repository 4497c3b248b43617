//! Payload posted by the laboratory entry form.
//!
//! The form sends general information, a grid of physico-chemical results and
//! a grid of microbiological counts. Each non-empty count becomes its own
//! result row under the `microbiologico` analysis.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Error, NewStudyDraft, StudyResultDraft};
use crate::inbound::http::studies_dto::{StudyRequestBody, StudyResultBody};
use crate::inbound::http::validation::ScalarInput;

/// Analysis label attached to microbiological counts.
pub(crate) const MICROBIOLOGY_ANALYSIS: &str = "microbiologico";

/// Full form submission.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudyFormBody {
    /// General study information.
    pub info_general: StudyRequestBody,
    /// Physico-chemical results, one per parameter and time point.
    #[serde(default)]
    pub resultados_principales: Vec<StudyResultBody>,
    /// Microbiological counts, one row per time point.
    #[serde(default)]
    pub resultados_microbiologicos: Vec<MicrobiologyRowBody>,
}

/// One time point of the microbiological grid.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct MicrobiologyRowBody {
    #[serde(alias = "tipo_estabilidad")]
    #[schema(example = "Natural")]
    pub tipo_estudio: Option<String>,
    #[schema(example = "T3")]
    pub tiempo: Option<String>,
    #[schema(value_type = Option<String>)]
    pub recuento_mesofilos: Option<ScalarInput>,
    #[schema(value_type = Option<String>)]
    pub pseudomona: Option<ScalarInput>,
    #[schema(value_type = Option<String>)]
    pub ecoli: Option<ScalarInput>,
    #[schema(value_type = Option<String>)]
    pub staphylococcus: Option<ScalarInput>,
}

impl MicrobiologyRowBody {
    fn into_drafts(self) -> impl Iterator<Item = StudyResultDraft> {
        let Self {
            tipo_estudio,
            tiempo,
            recuento_mesofilos,
            pseudomona,
            ecoli,
            staphylococcus,
        } = self;
        let stability_type = tipo_estudio.unwrap_or_default();
        let time_point = tiempo.unwrap_or_default();
        [
            ("recuento_mesofilos", recuento_mesofilos),
            ("pseudomona", pseudomona),
            ("ecoli", ecoli),
            ("staphylococcus", staphylococcus),
        ]
        .into_iter()
        .filter_map(move |(parameter, count)| {
            let outcome = count.and_then(ScalarInput::into_text)?;
            Some(StudyResultDraft {
                stability_type: stability_type.clone(),
                analysis: Some(MICROBIOLOGY_ANALYSIS.to_owned()),
                parameter: parameter.to_owned(),
                time_point: time_point.clone(),
                specification: None,
                outcome: Some(outcome),
            })
        })
    }
}

impl StudyFormBody {
    /// Flatten the form into a single creation draft. Results keep form
    /// order: principal rows first, then counts.
    pub(crate) fn into_new_study(self) -> Result<NewStudyDraft, Error> {
        let Self {
            info_general,
            resultados_principales,
            resultados_microbiologicos,
        } = self;
        let mut draft = info_general.into_new_study()?;
        draft.results.extend(
            resultados_principales
                .into_iter()
                .map(StudyResultBody::into_draft),
        );
        draft.results.extend(
            resultados_microbiologicos
                .into_iter()
                .flat_map(MicrobiologyRowBody::into_drafts),
        );
        Ok(draft)
    }
}
