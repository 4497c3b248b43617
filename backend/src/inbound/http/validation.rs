//! Shared validation helpers for inbound HTTP adapters.
//!
//! Form-derived payloads send every value as text, so optional fields treat
//! `null`, absent and blank strings alike.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::Error;

/// Date format accepted on the wire.
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    InvalidDate,
    InvalidNumber,
}

impl ErrorCode {
    const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidDate => "invalid_date",
            Self::InvalidNumber => "invalid_number",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    const fn as_str(self) -> &'static str {
        self.0
    }
}

fn invalid_value(field: FieldName, code: ErrorCode, message: String, value: &str) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "value": value,
        "code": code.as_str(),
    }))
}

/// Number or text value. HTML forms post numbers as strings.
///
/// Documented in OpenAPI as a string; fields using it declare
/// `value_type` explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarInput {
    Number(serde_json::Number),
    Text(String),
}

impl ScalarInput {
    /// Text form, or `None` when blank.
    pub(crate) fn into_text(self) -> Option<String> {
        match self {
            Self::Number(number) => Some(number.to_string()),
            Self::Text(text) if text.trim().is_empty() => None,
            Self::Text(text) => Some(text),
        }
    }
}

/// Drop blank text.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

/// Parse an optional `YYYY-MM-DD` date; blank values count as absent.
pub(crate) fn parse_date(value: Option<String>, field: FieldName) -> Result<Option<NaiveDate>, Error> {
    let Some(raw) = non_blank(value) else {
        return Ok(None);
    };
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map(Some)
        .map_err(|_| {
            invalid_value(
                field,
                ErrorCode::InvalidDate,
                format!("{} must be a YYYY-MM-DD date", field.as_str()),
                &raw,
            )
        })
}

/// Parse an optional whole number given as a JSON number or numeric string.
pub(crate) fn parse_count(value: Option<ScalarInput>, field: FieldName) -> Result<Option<i32>, Error> {
    let Some(raw) = value.and_then(ScalarInput::into_text) else {
        return Ok(None);
    };
    raw.trim().parse::<i32>().map(Some).map_err(|_| {
        invalid_value(
            field,
            ErrorCode::InvalidNumber,
            format!("{} must be a whole number", field.as_str()),
            &raw,
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const FIELD: FieldName = FieldName::new("fecha_inicio_estudio");

    #[rstest]
    #[case(None, None)]
    #[case(Some(""), None)]
    #[case(Some("  "), None)]
    #[case(Some("2025-03-01"), NaiveDate::from_ymd_opt(2025, 3, 1))]
    fn parse_date_accepts_blank_and_iso_dates(
        #[case] raw: Option<&str>,
        #[case] expected: Option<NaiveDate>,
    ) {
        let parsed = parse_date(raw.map(str::to_owned), FIELD).expect("valid input");
        assert_eq!(parsed, expected);
    }

    #[rstest]
    #[case("01/03/2025")]
    #[case("2025-13-01")]
    fn parse_date_rejects_other_formats(#[case] raw: &str) {
        let err = parse_date(Some(raw.to_owned()), FIELD).expect_err("invalid date");
        assert_eq!(
            err.details(),
            Some(&json!({
                "field": "fecha_inicio_estudio",
                "value": raw,
                "code": "invalid_date",
            }))
        );
    }

    #[rstest]
    fn parse_count_accepts_numbers_and_numeric_strings() {
        let units = FieldName::new("unidades");
        let from_number: ScalarInput = serde_json::from_str("24").expect("number");
        let from_text: ScalarInput = serde_json::from_str("\" 12 \"").expect("text");

        assert_eq!(parse_count(Some(from_number), units).expect("valid"), Some(24));
        assert_eq!(parse_count(Some(from_text), units).expect("valid"), Some(12));
        assert_eq!(
            parse_count(Some(ScalarInput::Text(String::new())), units).expect("blank"),
            None
        );
    }

    #[rstest]
    #[case("doce")]
    #[case("1.5")]
    fn parse_count_rejects_non_integers(#[case] raw: &str) {
        let err = parse_count(Some(ScalarInput::Text(raw.to_owned())), FieldName::new("unidades"))
            .expect_err("invalid number");
        assert_eq!(err.message(), "unidades must be a whole number");
    }

    #[rstest]
    fn scalar_numbers_render_as_text() {
        let value: ScalarInput = serde_json::from_str("6.5").expect("number");
        assert_eq!(value.into_text(), Some("6.5".to_owned()));
    }
}
