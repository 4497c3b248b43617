//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain.

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;

use crate::domain::{StudyDetails, StudyResult};

use super::schema::{clients, products, studies, study_results};

/// Row struct for reading holder names.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = clients)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct ClientRow {
    pub holder_name: String,
}

/// Insertable struct for get-or-create on clients.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = clients)]
pub(crate) struct NewClientRow<'a> {
    pub holder_name: &'a str,
}

/// Row struct for reading products.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct ProductRow {
    pub product_name: String,
    pub reference: String,
}

/// Insertable struct for get-or-create on products.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = products)]
pub(crate) struct NewProductRow<'a> {
    pub product_name: &'a str,
    pub reference: &'a str,
}

/// Row struct for reading the studies table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = studies)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct StudyRow {
    pub id: i32,
    pub lote: String,
    pub sanitary_registration: Option<String>,
    pub manufacturer: Option<String>,
    pub study_site: Option<String>,
    pub description: Option<String>,
    pub tests_performed: Option<String>,
    pub observations: Option<String>,
    pub units: Option<i32>,
    pub release_date: Option<NaiveDate>,
    pub chamber_start_date: Option<NaiveDate>,
    pub study_start_date: Option<NaiveDate>,
    pub study_end_date: Option<NaiveDate>,
    pub closed: bool,
    pub created_at: NaiveDateTime,
}

impl StudyRow {
    /// Split the descriptive columns out of the row.
    pub fn details(&self) -> StudyDetails {
        StudyDetails {
            sanitary_registration: self.sanitary_registration.clone(),
            manufacturer: self.manufacturer.clone(),
            study_site: self.study_site.clone(),
            description: self.description.clone(),
            tests_performed: self.tests_performed.clone(),
            observations: self.observations.clone(),
            units: self.units,
            release_date: self.release_date,
            chamber_start_date: self.chamber_start_date,
            study_start_date: self.study_start_date,
            study_end_date: self.study_end_date,
        }
    }
}

/// Insertable struct for creating study records.
///
/// `closed` and `created_at` take their column defaults.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = studies)]
pub(crate) struct NewStudyRow<'a> {
    pub lote: &'a str,
    pub client_id: i32,
    pub product_id: i32,
    pub sanitary_registration: Option<&'a str>,
    pub manufacturer: Option<&'a str>,
    pub study_site: Option<&'a str>,
    pub description: Option<&'a str>,
    pub tests_performed: Option<&'a str>,
    pub observations: Option<&'a str>,
    pub units: Option<i32>,
    pub release_date: Option<NaiveDate>,
    pub chamber_start_date: Option<NaiveDate>,
    pub study_start_date: Option<NaiveDate>,
    pub study_end_date: Option<NaiveDate>,
}

/// Changeset for sparse study updates. `None` fields are left untouched.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = studies)]
pub(crate) struct StudyChangeset<'a> {
    pub client_id: Option<i32>,
    pub product_id: Option<i32>,
    pub sanitary_registration: Option<&'a str>,
    pub manufacturer: Option<&'a str>,
    pub study_site: Option<&'a str>,
    pub description: Option<&'a str>,
    pub tests_performed: Option<&'a str>,
    pub observations: Option<&'a str>,
    pub units: Option<i32>,
    pub release_date: Option<NaiveDate>,
    pub chamber_start_date: Option<NaiveDate>,
    pub study_start_date: Option<NaiveDate>,
    pub study_end_date: Option<NaiveDate>,
}

impl<'a> StudyChangeset<'a> {
    /// Changeset carrying the descriptive attributes of `details`.
    pub fn from_details(details: &'a StudyDetails) -> Self {
        Self {
            client_id: None,
            product_id: None,
            sanitary_registration: details.sanitary_registration.as_deref(),
            manufacturer: details.manufacturer.as_deref(),
            study_site: details.study_site.as_deref(),
            description: details.description.as_deref(),
            tests_performed: details.tests_performed.as_deref(),
            observations: details.observations.as_deref(),
            units: details.units,
            release_date: details.release_date,
            chamber_start_date: details.chamber_start_date,
            study_start_date: details.study_start_date,
            study_end_date: details.study_end_date,
        }
    }

    /// Whether executing the changeset would set at least one column.
    ///
    /// Diesel rejects an `UPDATE` without assignments, so callers skip the
    /// statement when this is false.
    pub fn has_changes(&self) -> bool {
        self.client_id.is_some()
            || self.product_id.is_some()
            || self.sanitary_registration.is_some()
            || self.manufacturer.is_some()
            || self.study_site.is_some()
            || self.description.is_some()
            || self.tests_performed.is_some()
            || self.observations.is_some()
            || self.units.is_some()
            || self.release_date.is_some()
            || self.chamber_start_date.is_some()
            || self.study_start_date.is_some()
            || self.study_end_date.is_some()
    }
}

/// Row struct for reading results.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = study_results)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct StudyResultRow {
    pub stability_type: String,
    pub analysis: Option<String>,
    pub parameter: String,
    pub time_point: String,
    pub specification: Option<String>,
    pub outcome: Option<String>,
}

/// Insertable struct for batch result inserts.
///
/// SQLite cannot use `DEFAULT` inside a multi-row insert, so `None` binds as
/// `NULL`.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = study_results)]
#[diesel(treat_none_as_default_value = false)]
pub(crate) struct NewStudyResultRow<'a> {
    pub study_id: i32,
    pub stability_type: &'static str,
    pub analysis: Option<&'a str>,
    pub parameter: &'a str,
    pub time_point: &'a str,
    pub specification: Option<&'a str>,
    pub outcome: Option<&'a str>,
}

impl<'a> NewStudyResultRow<'a> {
    /// Row for `result` owned by `study_id`.
    pub fn new(study_id: i32, result: &'a StudyResult) -> Self {
        Self {
            study_id,
            stability_type: result.stability_type().as_str(),
            analysis: result.analysis(),
            parameter: result.parameter(),
            time_point: result.time_point(),
            specification: result.specification(),
            outcome: result.outcome(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn empty_details_produce_no_changes() {
        let details = StudyDetails::default();
        assert!(!StudyChangeset::from_details(&details).has_changes());
    }

    #[rstest]
    fn repointing_the_holder_is_a_change() {
        let details = StudyDetails::default();
        let changeset = StudyChangeset {
            client_id: Some(3),
            ..StudyChangeset::from_details(&details)
        };
        assert!(changeset.has_changes());
    }

    #[rstest]
    fn details_map_onto_columns() {
        let details = StudyDetails {
            observations: Some("Sin cambios".to_owned()),
            units: Some(24),
            ..StudyDetails::default()
        };
        let changeset = StudyChangeset::from_details(&details);
        assert_eq!(changeset.observations, Some("Sin cambios"));
        assert_eq!(changeset.units, Some(24));
        assert!(changeset.has_changes());
    }
}
