//! Typed rows for the mock tables
//!
//! Each struct maps to one table in [`crate::schema`]. Fields left `None` are
//! written as NULL, except an unset primary key, which is left to the
//! table's sequence.

use crate::error::Result;
use crate::schema::{self, quote_ident, TableDef, ICD10_CAUSE_COLUMNS};
use chrono::{NaiveDate, NaiveDateTime};
use tokio_postgres::types::{FromSql, ToSql};
use tokio_postgres::Client;
use tracing::debug;

pub type SqlParam<'a> = (&'static str, &'a (dyn ToSql + Sync));

pub trait Record {
    type Key: for<'a> FromSql<'a> + ToSql + Sync;

    fn table() -> &'static TableDef;

    /// Column/value pairs to insert, primary key included only when set
    fn values(&self) -> Vec<SqlParam<'_>>;
}

/// Insert a record and return its primary key.
pub async fn insert<R: Record>(client: &Client, record: &R) -> Result<R::Key> {
    let table = R::table();
    let values = record.values();
    let key = table
        .primary_key()
        .map(|c| c.name)
        .unwrap_or_default();

    let sql = if values.is_empty() {
        format!(
            "INSERT INTO {} DEFAULT VALUES RETURNING {}",
            quote_ident(table.name),
            quote_ident(key)
        )
    } else {
        let columns: Vec<String> = values.iter().map(|(c, _)| quote_ident(c)).collect();
        let placeholders: Vec<String> = (1..=values.len()).map(|i| format!("${}", i)).collect();
        format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
            quote_ident(table.name),
            columns.join(", "),
            placeholders.join(", "),
            quote_ident(key)
        )
    };

    let params: Vec<&(dyn ToSql + Sync)> = values.iter().map(|(_, v)| *v).collect();
    let row = client.query_one(&sql, &params).await?;
    debug!("Inserted row into {}", table.name);
    Ok(row.get(0))
}

/// Delete a patient; every patient-owned row goes with it.
pub async fn delete_patient(client: &Client, patient_id: i32) -> Result<u64> {
    let sql = format!(
        "DELETE FROM {} WHERE {} = $1",
        quote_ident(schema::PATIENT.name),
        quote_ident("Patient_ID")
    );
    Ok(client.execute(&sql, &[&patient_id]).await?)
}

/// Push `(column, value)` for each field, skipping `None` primary keys.
macro_rules! record_values {
    ($self:ident, key: $key_col:literal => $key:ident, $($col:literal => $field:ident),* $(,)?) => {{
        let mut values: Vec<SqlParam<'_>> = Vec::new();
        if let Some(key) = &$self.$key {
            values.push(($key_col, key as &(dyn ToSql + Sync)));
        }
        $(values.push(($col, &$self.$field as &(dyn ToSql + Sync)));)*
        values
    }};
}

#[derive(Debug, Clone, Default)]
pub struct Patient {
    pub patient_id: Option<i32>,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
    pub sex: Option<String>,
}

impl Record for Patient {
    type Key = i32;

    fn table() -> &'static TableDef {
        &schema::PATIENT
    }

    fn values(&self) -> Vec<SqlParam<'_>> {
        record_values!(self, key: "Patient_ID" => patient_id,
            "DateOfBirth" => date_of_birth,
            "DateOfDeath" => date_of_death,
            "Sex" => sex,
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct MedicationDictionary {
    pub multilex_drug_id: Option<String>,
    pub product_id: Option<String>,
    pub full_name: Option<String>,
    pub root_name: Option<String>,
    pub pack_description: Option<String>,
    pub form: Option<String>,
    pub strength: Option<String>,
    pub company_name: Option<String>,
    pub dmd_id: Option<String>,
}

impl Record for MedicationDictionary {
    type Key = String;

    fn table() -> &'static TableDef {
        &schema::MEDICATION_DICTIONARY
    }

    fn values(&self) -> Vec<SqlParam<'_>> {
        record_values!(self, key: "MultilexDrug_ID" => multilex_drug_id,
            "ProductId" => product_id,
            "FullName" => full_name,
            "RootName" => root_name,
            "PackDescription" => pack_description,
            "Form" => form,
            "Strength" => strength,
            "CompanyName" => company_name,
            "DMD_ID" => dmd_id,
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct MedicationIssue {
    pub medication_issue_id: Option<i32>,
    pub patient_id: Option<i32>,
    pub consultation_id: Option<i32>,
    pub repeat_medication_id: Option<i32>,
    pub multilex_drug_id: Option<String>,
    pub dose: Option<String>,
    pub quantity: Option<String>,
    pub start_date: Option<NaiveDateTime>,
    pub end_date: Option<NaiveDateTime>,
    pub medication_status: Option<String>,
    pub consultation_date: Option<NaiveDateTime>,
}

impl Record for MedicationIssue {
    type Key = i32;

    fn table() -> &'static TableDef {
        &schema::MEDICATION_ISSUE
    }

    fn values(&self) -> Vec<SqlParam<'_>> {
        record_values!(self, key: "MedicationIssue_ID" => medication_issue_id,
            "Patient_ID" => patient_id,
            "Consultation_ID" => consultation_id,
            "RepeatMedication_ID" => repeat_medication_id,
            "MultilexDrug_ID" => multilex_drug_id,
            "Dose" => dose,
            "Quantity" => quantity,
            "StartDate" => start_date,
            "EndDate" => end_date,
            "MedicationStatus" => medication_status,
            "ConsultationDate" => consultation_date,
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct CodedEvent {
    pub coded_event_id: Option<i32>,
    pub patient_id: Option<i32>,
    pub ctv3_code: Option<String>,
    pub numeric_value: Option<f64>,
    pub consultation_date: Option<NaiveDateTime>,
    pub snomed_concept_id: Option<String>,
}

impl Record for CodedEvent {
    type Key = i32;

    fn table() -> &'static TableDef {
        &schema::CODED_EVENT
    }

    fn values(&self) -> Vec<SqlParam<'_>> {
        record_values!(self, key: "CodedEvent_ID" => coded_event_id,
            "Patient_ID" => patient_id,
            "CTV3Code" => ctv3_code,
            "NumericValue" => numeric_value,
            "ConsultationDate" => consultation_date,
            "SnomedConceptId" => snomed_concept_id,
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct Organisation {
    pub organisation_id: Option<i32>,
    pub go_live_date: Option<NaiveDate>,
    pub stp_code: Option<String>,
    pub msoa_code: Option<String>,
    pub region: Option<String>,
}

impl Record for Organisation {
    type Key = i32;

    fn table() -> &'static TableDef {
        &schema::ORGANISATION
    }

    fn values(&self) -> Vec<SqlParam<'_>> {
        record_values!(self, key: "Organisation_ID" => organisation_id,
            "GoLiveDate" => go_live_date,
            "STPCode" => stp_code,
            "MSOACode" => msoa_code,
            "Region" => region,
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct RegistrationHistory {
    pub registration_id: Option<i32>,
    pub organisation_id: Option<i32>,
    pub patient_id: Option<i32>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl Record for RegistrationHistory {
    type Key = i32;

    fn table() -> &'static TableDef {
        &schema::REGISTRATION_HISTORY
    }

    fn values(&self) -> Vec<SqlParam<'_>> {
        record_values!(self, key: "Registration_ID" => registration_id,
            "Organisation_ID" => organisation_id,
            "Patient_ID" => patient_id,
            "StartDate" => start_date,
            "EndDate" => end_date,
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct PatientAddress {
    pub patient_address_id: Option<i32>,
    pub patient_id: Option<i32>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub address_type: Option<i32>,
    pub rural_urban_classification_code: Option<i32>,
    pub imd_rank_rounded: Option<i32>,
    pub msoa_code: Option<String>,
}

impl Record for PatientAddress {
    type Key = i32;

    fn table() -> &'static TableDef {
        &schema::PATIENT_ADDRESS
    }

    fn values(&self) -> Vec<SqlParam<'_>> {
        record_values!(self, key: "PatientAddress_ID" => patient_address_id,
            "Patient_ID" => patient_id,
            "StartDate" => start_date,
            "EndDate" => end_date,
            "AddressType" => address_type,
            "RuralUrbanClassificationCode" => rural_urban_classification_code,
            "ImdRankRounded" => imd_rank_rounded,
            "MSOACode" => msoa_code,
        )
    }
}

/// Intensive care admission
#[derive(Debug, Clone, Default)]
pub struct Icnarc {
    pub icnarc_id: Option<i32>,
    pub patient_id: Option<i32>,
    pub icu_admission_date_time: Option<NaiveDateTime>,
    pub original_icu_admission_date: Option<NaiveDate>,
    pub basic_days_respiratory_support: Option<i32>,
    pub advanced_days_respiratory_support: Option<i32>,
    pub ventilator: Option<i32>,
}

impl Record for Icnarc {
    type Key = i32;

    fn table() -> &'static TableDef {
        &schema::ICNARC
    }

    fn values(&self) -> Vec<SqlParam<'_>> {
        record_values!(self, key: "ICNARC_ID" => icnarc_id,
            "Patient_ID" => patient_id,
            "IcuAdmissionDateTime" => icu_admission_date_time,
            "OriginalIcuAdmissionDate" => original_icu_admission_date,
            "BasicDays_RespiratorySupport" => basic_days_respiratory_support,
            "AdvancedDays_RespiratorySupport" => advanced_days_respiratory_support,
            "Ventilator" => ventilator,
        )
    }
}

/// Registered death
#[derive(Debug, Clone, Default)]
pub struct OnsDeath {
    pub id: Option<i32>,
    pub patient_id: Option<i32>,
    pub sex: Option<String>,
    pub age_in_years: Option<i32>,
    pub date_of_death: Option<NaiveDate>,
    /// Underlying cause
    pub icd10_underlying: Option<String>,
    /// Contributing causes, in `ICD10001`..`ICD10015` order
    pub icd10_causes: [Option<String>; 15],
}

impl Record for OnsDeath {
    type Key = i32;

    fn table() -> &'static TableDef {
        &schema::ONS_DEATHS
    }

    fn values(&self) -> Vec<SqlParam<'_>> {
        let mut values = record_values!(self, key: "id" => id,
            "Patient_ID" => patient_id,
            "Sex" => sex,
            "ageinyrs" => age_in_years,
            "dod" => date_of_death,
            "icd10u" => icd10_underlying,
        );
        for (column, cause) in ICD10_CAUSE_COLUMNS.iter().zip(self.icd10_causes.iter()) {
            values.push((*column, cause as &(dyn ToSql + Sync)));
        }
        values
    }
}

/// In-hospital COVID death notification
#[derive(Debug, Clone, Default)]
pub struct Cpns {
    pub id: Option<i32>,
    pub patient_id: Option<i32>,
    pub date_of_death: Option<NaiveDate>,
}

impl Record for Cpns {
    type Key = i32;

    fn table() -> &'static TableDef {
        &schema::CPNS
    }

    fn values(&self) -> Vec<SqlParam<'_>> {
        record_values!(self, key: "Id" => id,
            "Patient_ID" => patient_id,
            "DateOfDeath" => date_of_death,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns<R: Record>(record: &R) -> Vec<&'static str> {
        record.values().iter().map(|(c, _)| *c).collect()
    }

    fn assert_columns_declared<R: Record>(record: &R) {
        let table = R::table();
        for column in columns(record) {
            assert!(
                table.column(column).is_some(),
                "{}.{} is not a declared column",
                table.name,
                column
            );
        }
    }

    #[test]
    fn test_unset_key_is_skipped() {
        let patient = Patient {
            sex: Some("F".to_string()),
            ..Default::default()
        };
        assert_eq!(columns(&patient), vec!["DateOfBirth", "DateOfDeath", "Sex"]);

        let patient = Patient {
            patient_id: Some(7),
            ..Default::default()
        };
        assert_eq!(columns(&patient)[0], "Patient_ID");
    }

    #[test]
    fn test_full_records_cover_every_column() {
        let death = OnsDeath {
            id: Some(1),
            ..Default::default()
        };
        assert_eq!(columns(&death).len(), schema::ONS_DEATHS.columns.len());

        let issue = MedicationIssue {
            medication_issue_id: Some(1),
            ..Default::default()
        };
        assert_eq!(columns(&issue).len(), schema::MEDICATION_ISSUE.columns.len());
    }

    #[test]
    fn test_record_columns_match_tables() {
        assert_columns_declared(&Patient::default());
        assert_columns_declared(&MedicationDictionary::default());
        assert_columns_declared(&MedicationIssue::default());
        assert_columns_declared(&CodedEvent::default());
        assert_columns_declared(&Organisation::default());
        assert_columns_declared(&RegistrationHistory::default());
        assert_columns_declared(&PatientAddress::default());
        assert_columns_declared(&Icnarc::default());
        assert_columns_declared(&OnsDeath::default());
        assert_columns_declared(&Cpns::default());
    }

    #[test]
    fn test_ons_death_causes_in_column_order() {
        let mut death = OnsDeath::default();
        death.icd10_causes[2] = Some("U071".to_string());
        let cols = columns(&death);
        assert_eq!(cols[cols.len() - 15], "ICD10001");
        assert_eq!(cols[cols.len() - 1], "ICD10015");
    }
}
