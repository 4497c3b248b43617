//! Tests for study validation and normalisation.

use super::*;
use rstest::{fixture, rstest};

#[fixture]
fn result_draft() -> StudyResultDraft {
    StudyResultDraft {
        stability_type: "Acelerada".to_owned(),
        analysis: None,
        parameter: "pH".to_owned(),
        time_point: "T0".to_owned(),
        specification: Some("5.5 - 6.5".to_owned()),
        outcome: Some("6.1".to_owned()),
    }
}

#[fixture]
fn study_draft(result_draft: StudyResultDraft) -> NewStudyDraft {
    NewStudyDraft {
        lote: "L-001".to_owned(),
        product_name: Some("Crema hidratante".to_owned()),
        reference: Some("REF-100".to_owned()),
        holder: Some("Laboratorios Andinos".to_owned()),
        details: StudyDetails::default(),
        results: vec![result_draft],
    }
}

#[rstest]
#[case("L-001", "L-001")]
#[case("  L-002\t", "L-002")]
fn lote_trims_input(#[case] raw: &str, #[case] expected: &str) {
    let lote = Lote::new(raw).expect("valid lote");
    assert_eq!(lote.as_str(), expected);
}

#[rstest]
#[case("")]
#[case("   ")]
fn lote_rejects_blank(#[case] raw: &str) {
    assert_eq!(Lote::new(raw), Err(StudyValidationError::EmptyLote));
}

#[rstest]
fn lote_rejects_overlong_values() {
    let raw = "L".repeat(LOTE_MAX + 1);
    assert_eq!(
        Lote::new(raw),
        Err(StudyValidationError::LoteTooLong { max: LOTE_MAX })
    );
}

#[rstest]
#[case("accelerated", StabilityType::Accelerated)]
#[case("ACELERADA", StabilityType::Accelerated)]
#[case(" Natural ", StabilityType::Natural)]
fn stability_type_parses_known_values(#[case] raw: &str, #[case] expected: StabilityType) {
    assert_eq!(raw.parse::<StabilityType>(), Ok(expected));
}

#[rstest]
fn stability_type_rejects_unknown_values() {
    assert!("tropical".parse::<StabilityType>().is_err());
}

#[rstest]
fn new_study_accepts_valid_draft(study_draft: NewStudyDraft) {
    let study = NewStudy::new(study_draft).expect("valid draft");
    assert_eq!(study.lote().as_str(), "L-001");
    assert_eq!(study.holder(), "Laboratorios Andinos");
    assert_eq!(study.reference(), "REF-100");
    assert_eq!(study.results().len(), 1);
    let first = study.results().first().expect("one result");
    assert_eq!(first.stability_type(), StabilityType::Accelerated);
    assert_eq!(first.time_point(), "T0");
}

#[rstest]
fn new_study_defaults_missing_product_name(mut study_draft: NewStudyDraft) {
    study_draft.product_name = Some("  ".to_owned());
    let study = NewStudy::new(study_draft).expect("valid draft");
    assert_eq!(study.product_name(), "");
}

#[rstest]
#[case::missing_lote(|d: &mut NewStudyDraft| d.lote = " ".to_owned(), "lote")]
#[case::missing_holder(|d: &mut NewStudyDraft| d.holder = None, "titular")]
#[case::blank_holder(|d: &mut NewStudyDraft| d.holder = Some(String::new()), "titular")]
#[case::missing_reference(|d: &mut NewStudyDraft| d.reference = None, "referencia")]
fn new_study_names_missing_field(
    mut study_draft: NewStudyDraft,
    #[case] mutate: fn(&mut NewStudyDraft),
    #[case] field: &str,
) {
    mutate(&mut study_draft);
    let err = NewStudy::new(study_draft).expect_err("draft is invalid");
    assert_eq!(err.field(), field);
    assert_eq!(err.reason(), "missing_field");
}

#[rstest]
fn new_study_reports_offending_result_index(
    mut study_draft: NewStudyDraft,
    result_draft: StudyResultDraft,
) {
    study_draft.results.push(StudyResultDraft {
        time_point: "  ".to_owned(),
        ..result_draft
    });
    let err = NewStudy::new(study_draft).expect_err("second result is invalid");
    assert_eq!(err, StudyValidationError::MissingTimePoint { index: 1 });
    assert_eq!(err.result_index(), Some(1));
}

#[rstest]
fn result_rejects_unknown_branch(result_draft: StudyResultDraft) {
    let draft = StudyResultDraft {
        stability_type: "tropical".to_owned(),
        ..result_draft
    };
    let err = StudyResult::new(0, draft).expect_err("unknown branch");
    assert_eq!(err.field(), "tipo_estabilidad");
}

#[rstest]
fn result_drops_blank_optional_text(result_draft: StudyResultDraft) {
    let draft = StudyResultDraft {
        outcome: Some(" ".to_owned()),
        ..result_draft
    };
    let result = StudyResult::new(0, draft).expect("valid result");
    assert!(result.outcome().is_none());
    assert_eq!(result.specification(), Some("5.5 - 6.5"));
}

#[rstest]
fn patch_ignores_blank_values() {
    let details = StudyDetails {
        observations: Some(String::new()),
        manufacturer: Some("   ".to_owned()),
        ..StudyDetails::default()
    };
    let patch = StudyPatch::new(Some(String::new()), None, Some(" ".to_owned()), details);
    assert!(patch.is_empty());
}

#[rstest]
fn patch_keeps_supplied_values() {
    let details = StudyDetails {
        units: Some(12),
        ..StudyDetails::default()
    };
    let patch = StudyPatch::new(Some("X".to_owned()), None, None, details);
    assert!(!patch.is_empty());
    assert_eq!(patch.product_name(), Some("X"));
    assert_eq!(patch.details().units, Some(12));
}

#[rstest]
#[case(None, None)]
#[case(Some("   "), None)]
#[case(Some(" crema "), Some("crema"))]
fn search_filter_normalises_term(#[case] raw: Option<&str>, #[case] expected: Option<&str>) {
    let filter = StudyFilter::search(raw.map(str::to_owned));
    assert_eq!(filter.term.as_deref(), expected);
    assert!(!filter.open_only);
}
