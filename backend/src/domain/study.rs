//! Stability study data model.
//!
//! A study is one stability test of one product batch, identified by its
//! [`Lote`]. It owns an ordered set of [`StudyResult`] rows. Holder and
//! product reference live in their own keyed tables; the domain only carries
//! their names.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Maximum accepted length of a lote code, in characters.
pub const LOTE_MAX: usize = 64;

/// Validation errors raised while building study aggregates.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StudyValidationError {
    /// The lote was blank.
    #[error("lote is required")]
    EmptyLote,
    /// The lote exceeded [`LOTE_MAX`].
    #[error("lote must be at most {max} characters")]
    LoteTooLong {
        /// Maximum accepted length.
        max: usize,
    },
    /// The holder name was blank or missing.
    #[error("titular is required")]
    MissingHolder,
    /// The product reference was blank or missing.
    #[error("referencia is required")]
    MissingReference,
    /// A result named a stability branch outside the known set.
    #[error("result {index}: unknown stability type '{value}'")]
    UnknownStabilityType {
        /// Position of the offending result.
        index: usize,
        /// Raw value supplied.
        value: String,
    },
    /// A result had no parameter.
    #[error("result {index}: parametro_evaluado is required")]
    MissingParameter {
        /// Position of the offending result.
        index: usize,
    },
    /// A result had no time point.
    #[error("result {index}: tiempo is required")]
    MissingTimePoint {
        /// Position of the offending result.
        index: usize,
    },
}

impl StudyValidationError {
    /// Wire name of the field that failed validation.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::EmptyLote | Self::LoteTooLong { .. } => "lote",
            Self::MissingHolder => "titular",
            Self::MissingReference => "referencia",
            Self::UnknownStabilityType { .. } => "tipo_estabilidad",
            Self::MissingParameter { .. } => "parametro_evaluado",
            Self::MissingTimePoint { .. } => "tiempo",
        }
    }

    /// Index of the offending result row, when the failure is row-specific.
    #[must_use]
    pub const fn result_index(&self) -> Option<usize> {
        match self {
            Self::UnknownStabilityType { index, .. }
            | Self::MissingParameter { index }
            | Self::MissingTimePoint { index } => Some(*index),
            Self::EmptyLote | Self::LoteTooLong { .. } | Self::MissingHolder | Self::MissingReference => {
                None
            }
        }
    }

    /// Stable machine-readable reason.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::LoteTooLong { .. } => "too_long",
            Self::UnknownStabilityType { .. } => "invalid_value",
            Self::EmptyLote
            | Self::MissingHolder
            | Self::MissingReference
            | Self::MissingParameter { .. }
            | Self::MissingTimePoint { .. } => "missing_field",
        }
    }
}

/// Trim `value` and drop it when nothing is left.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|raw| {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else if trimmed.len() == raw.len() {
            Some(raw)
        } else {
            Some(trimmed.to_owned())
        }
    })
}

/// Batch code uniquely identifying a study.
///
/// # Examples
/// ```
/// use stability_backend::domain::Lote;
///
/// let lote = Lote::new("  L-001 ").expect("valid lote");
/// assert_eq!(lote.as_ref(), "L-001");
/// assert!(Lote::new("   ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Lote(String);

impl Lote {
    /// Validate and construct a [`Lote`], trimming surrounding whitespace.
    pub fn new(lote: impl Into<String>) -> Result<Self, StudyValidationError> {
        let Some(lote) = non_blank(Some(lote.into())) else {
            return Err(StudyValidationError::EmptyLote);
        };
        if lote.chars().count() > LOTE_MAX {
            return Err(StudyValidationError::LoteTooLong { max: LOTE_MAX });
        }
        Ok(Self(lote))
    }

    /// Borrow the lote text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for Lote {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Lote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Lote> for String {
    fn from(value: Lote) -> Self {
        value.0
    }
}

impl TryFrom<String> for Lote {
    type Error = StudyValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Surrogate identifier assigned by storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudyId(i32);

impl StudyId {
    /// Wrap a raw identifier.
    #[must_use]
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    /// Raw identifier value.
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl fmt::Display for StudyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Stability branch a result belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StabilityType {
    /// Accelerated conditions (climatic chamber).
    Accelerated,
    /// Natural shelf conditions.
    Natural,
}

impl StabilityType {
    /// Canonical storage and wire form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Accelerated => "accelerated",
            Self::Natural => "natural",
        }
    }
}

impl fmt::Display for StabilityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown stability branch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown stability type '{0}'")]
pub struct ParseStabilityTypeError(pub String);

impl FromStr for StabilityType {
    type Err = ParseStabilityTypeError;

    /// Accepts `accelerated`, `acelerada` and `natural`, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        match normalized.as_str() {
            "accelerated" | "acelerada" => Ok(Self::Accelerated),
            "natural" => Ok(Self::Natural),
            _ => Err(ParseStabilityTypeError(s.to_owned())),
        }
    }
}

/// Optional descriptive attributes of a study.
///
/// Blank text is normalised to `None` by [`StudyDetails::normalized`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudyDetails {
    /// Sanitary registration (notificación sanitaria).
    pub sanitary_registration: Option<String>,
    /// Manufacturer name.
    pub manufacturer: Option<String>,
    /// Where the study runs.
    pub study_site: Option<String>,
    /// Free text description.
    pub description: Option<String>,
    /// Tests performed on the batch.
    pub tests_performed: Option<String>,
    /// Observations.
    pub observations: Option<String>,
    /// Number of units under study.
    pub units: Option<i32>,
    /// Batch release date.
    pub release_date: Option<NaiveDate>,
    /// Date the samples entered the climatic chambers.
    pub chamber_start_date: Option<NaiveDate>,
    /// Study start date.
    pub study_start_date: Option<NaiveDate>,
    /// Study end date.
    pub study_end_date: Option<NaiveDate>,
}

impl StudyDetails {
    /// Drop blank text fields.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            sanitary_registration: non_blank(self.sanitary_registration),
            manufacturer: non_blank(self.manufacturer),
            study_site: non_blank(self.study_site),
            description: non_blank(self.description),
            tests_performed: non_blank(self.tests_performed),
            observations: non_blank(self.observations),
            ..self
        }
    }

    /// Whether no attribute is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Unvalidated result row as received from an adapter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudyResultDraft {
    /// Raw stability branch.
    pub stability_type: String,
    /// Analysis label, e.g. `microbiologico`.
    pub analysis: Option<String>,
    /// Parameter evaluated.
    pub parameter: String,
    /// Time point label (`T0`, `T3`, ...).
    pub time_point: String,
    /// Specification text.
    pub specification: Option<String>,
    /// Recorded outcome.
    pub outcome: Option<String>,
}

/// One validated laboratory measurement owned by a study.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudyResult {
    stability_type: StabilityType,
    analysis: Option<String>,
    parameter: String,
    time_point: String,
    specification: Option<String>,
    outcome: Option<String>,
}

impl StudyResult {
    /// Validate the draft found at position `index` of its batch.
    pub fn new(index: usize, draft: StudyResultDraft) -> Result<Self, StudyValidationError> {
        let StudyResultDraft {
            stability_type,
            analysis,
            parameter,
            time_point,
            specification,
            outcome,
        } = draft;

        let stability_type = stability_type.parse::<StabilityType>().map_err(|_| {
            StudyValidationError::UnknownStabilityType {
                index,
                value: stability_type.clone(),
            }
        })?;
        let parameter =
            non_blank(Some(parameter)).ok_or(StudyValidationError::MissingParameter { index })?;
        let time_point =
            non_blank(Some(time_point)).ok_or(StudyValidationError::MissingTimePoint { index })?;

        Ok(Self {
            stability_type,
            analysis: non_blank(analysis),
            parameter,
            time_point,
            specification: non_blank(specification),
            outcome: non_blank(outcome),
        })
    }

    /// Validate a whole batch, stopping at the first invalid row.
    pub fn from_drafts(drafts: Vec<StudyResultDraft>) -> Result<Vec<Self>, StudyValidationError> {
        drafts
            .into_iter()
            .enumerate()
            .map(|(index, draft)| Self::new(index, draft))
            .collect()
    }

    /// Stability branch.
    #[must_use]
    pub const fn stability_type(&self) -> StabilityType {
        self.stability_type
    }

    /// Analysis label.
    #[must_use]
    pub fn analysis(&self) -> Option<&str> {
        self.analysis.as_deref()
    }

    /// Parameter evaluated.
    #[must_use]
    pub fn parameter(&self) -> &str {
        self.parameter.as_str()
    }

    /// Time point label.
    #[must_use]
    pub fn time_point(&self) -> &str {
        self.time_point.as_str()
    }

    /// Specification text.
    #[must_use]
    pub fn specification(&self) -> Option<&str> {
        self.specification.as_deref()
    }

    /// Recorded outcome.
    #[must_use]
    pub fn outcome(&self) -> Option<&str> {
        self.outcome.as_deref()
    }
}

/// Unvalidated creation payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewStudyDraft {
    /// Raw lote.
    pub lote: String,
    /// Product name.
    pub product_name: Option<String>,
    /// Product reference code.
    pub reference: Option<String>,
    /// Holder (titular) name.
    pub holder: Option<String>,
    /// Descriptive attributes.
    pub details: StudyDetails,
    /// Result rows.
    pub results: Vec<StudyResultDraft>,
}

/// Validated creation payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStudy {
    lote: Lote,
    product_name: String,
    reference: String,
    holder: String,
    details: StudyDetails,
    results: Vec<StudyResult>,
}

impl NewStudy {
    /// Validate a creation draft.
    ///
    /// Checks run in order: lote, holder, reference, then each result.
    ///
    /// # Examples
    /// ```
    /// use stability_backend::domain::{NewStudy, NewStudyDraft};
    ///
    /// let draft = NewStudyDraft {
    ///     lote: "L-001".into(),
    ///     reference: Some("REF-9".into()),
    ///     ..NewStudyDraft::default()
    /// };
    /// let err = NewStudy::new(draft).expect_err("holder is missing");
    /// assert_eq!(err.field(), "titular");
    /// ```
    pub fn new(draft: NewStudyDraft) -> Result<Self, StudyValidationError> {
        let NewStudyDraft {
            lote,
            product_name,
            reference,
            holder,
            details,
            results,
        } = draft;

        let lote = Lote::new(lote)?;
        let holder = non_blank(holder).ok_or(StudyValidationError::MissingHolder)?;
        let reference = non_blank(reference).ok_or(StudyValidationError::MissingReference)?;
        let results = StudyResult::from_drafts(results)?;

        Ok(Self {
            lote,
            product_name: non_blank(product_name).unwrap_or_default(),
            reference,
            holder,
            details: details.normalized(),
            results,
        })
    }

    /// Batch code.
    #[must_use]
    pub const fn lote(&self) -> &Lote {
        &self.lote
    }

    /// Product name; empty when none was supplied.
    #[must_use]
    pub fn product_name(&self) -> &str {
        self.product_name.as_str()
    }

    /// Product reference code.
    #[must_use]
    pub fn reference(&self) -> &str {
        self.reference.as_str()
    }

    /// Holder name.
    #[must_use]
    pub fn holder(&self) -> &str {
        self.holder.as_str()
    }

    /// Descriptive attributes.
    #[must_use]
    pub const fn details(&self) -> &StudyDetails {
        &self.details
    }

    /// Result rows in submission order.
    #[must_use]
    pub fn results(&self) -> &[StudyResult] {
        self.results.as_slice()
    }
}

/// Sparse set of study attributes to overwrite.
///
/// Blank and absent values are dropped on construction, so an empty patch
/// leaves the stored row untouched.
///
/// A `reference` repoints the study at that product. When the reference is
/// already registered the stored product keeps its name and any
/// `product_name` in the patch is ignored. A `product_name` on its own
/// renames the current product, which fails with
/// `StudyRepositoryError::SharedProduct` when other studies share it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudyPatch {
    product_name: Option<String>,
    reference: Option<String>,
    holder: Option<String>,
    details: StudyDetails,
}

impl StudyPatch {
    /// Build a patch, discarding blank values.
    #[must_use]
    pub fn new(
        product_name: Option<String>,
        reference: Option<String>,
        holder: Option<String>,
        details: StudyDetails,
    ) -> Self {
        Self {
            product_name: non_blank(product_name),
            reference: non_blank(reference),
            holder: non_blank(holder),
            details: details.normalized(),
        }
    }

    /// New product name.
    #[must_use]
    pub fn product_name(&self) -> Option<&str> {
        self.product_name.as_deref()
    }

    /// New product reference.
    #[must_use]
    pub fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }

    /// New holder name.
    #[must_use]
    pub fn holder(&self) -> Option<&str> {
        self.holder.as_deref()
    }

    /// Descriptive attributes to overwrite.
    #[must_use]
    pub const fn details(&self) -> &StudyDetails {
        &self.details
    }

    /// Whether the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.product_name.is_none()
            && self.reference.is_none()
            && self.holder.is_none()
            && self.details.is_empty()
    }
}

/// Update request applied to one study.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudyUpdate {
    /// Attribute changes.
    pub patch: StudyPatch,
    /// Replacement result set; `None` leaves results untouched.
    pub results: Option<Vec<StudyResult>>,
}

/// Study row joined with its holder and product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudySummary {
    /// Surrogate identifier.
    pub id: StudyId,
    /// Batch code.
    pub lote: Lote,
    /// Product name.
    pub product_name: String,
    /// Product reference code.
    pub reference: String,
    /// Holder name.
    pub holder: String,
    /// Descriptive attributes.
    pub details: StudyDetails,
    /// Whether the study is closed to updates.
    pub closed: bool,
    /// Creation timestamp (UTC).
    pub created_at: NaiveDateTime,
}

/// Study with its results in insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Study {
    /// Study attributes.
    pub summary: StudySummary,
    /// Owned result rows.
    pub results: Vec<StudyResult>,
}

/// Lookup key accepted by deletions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StudyKey {
    /// Natural key.
    Lote(Lote),
    /// Surrogate key.
    Id(StudyId),
}

impl fmt::Display for StudyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lote(lote) => write!(f, "lote {lote}"),
            Self::Id(id) => write!(f, "id {id}"),
        }
    }
}

/// Listing filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudyFilter {
    /// Exclude closed studies.
    pub open_only: bool,
    /// Case-insensitive substring over product name, lote and reference.
    pub term: Option<String>,
}

impl StudyFilter {
    /// Every study, optionally only open ones.
    #[must_use]
    pub const fn listing(open_only: bool) -> Self {
        Self {
            open_only,
            term: None,
        }
    }

    /// Substring search; a blank term matches everything.
    #[must_use]
    pub fn search(term: Option<String>) -> Self {
        Self {
            open_only: false,
            term: non_blank(term),
        }
    }
}

#[cfg(test)]
mod tests;
