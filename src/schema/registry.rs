//! The mock warehouse tables
//!
//! None of these match the production warehouse schema; they carry just the
//! columns the cohort-extraction queries read. Tables hanging off `Patient`
//! are deleted with their patient. `MedicationDictionary` and `Organisation`
//! are shared reference data with their own lifetime.

use crate::schema::definition::{ColumnDef, ColumnType::*, ForeignKeyDef, OnDelete, TableDef};

pub const PATIENT: TableDef = TableDef {
    name: "Patient",
    columns: &[
        ColumnDef::key("Patient_ID", Serial),
        ColumnDef::new("DateOfBirth", Date),
        ColumnDef::new("DateOfDeath", Date),
        ColumnDef::new("Sex", Text),
    ],
    foreign_keys: &[],
};

const OWNED_BY_PATIENT: ForeignKeyDef =
    ForeignKeyDef::new("Patient_ID", "Patient", "Patient_ID", OnDelete::Cascade);

pub const MEDICATION_DICTIONARY: TableDef = TableDef {
    name: "MedicationDictionary",
    columns: &[
        ColumnDef::key("MultilexDrug_ID", VarChar(20)),
        ColumnDef::new("ProductId", Text),
        ColumnDef::new("FullName", Text),
        ColumnDef::new("RootName", Text),
        ColumnDef::new("PackDescription", Text),
        ColumnDef::new("Form", Text),
        ColumnDef::new("Strength", Text),
        ColumnDef::new("CompanyName", Text),
        ColumnDef::new("DMD_ID", Text),
    ],
    foreign_keys: &[],
};

pub const MEDICATION_ISSUE: TableDef = TableDef {
    name: "MedicationIssue",
    columns: &[
        ColumnDef::key("MedicationIssue_ID", Serial),
        ColumnDef::new("Patient_ID", Integer),
        ColumnDef::new("Consultation_ID", Integer),
        ColumnDef::new("RepeatMedication_ID", Integer),
        ColumnDef::new("MultilexDrug_ID", VarChar(20)),
        ColumnDef::new("Dose", Text),
        ColumnDef::new("Quantity", Text),
        ColumnDef::new("StartDate", Timestamp),
        ColumnDef::new("EndDate", Timestamp),
        ColumnDef::new("MedicationStatus", Text),
        ColumnDef::new("ConsultationDate", Timestamp),
    ],
    foreign_keys: &[
        OWNED_BY_PATIENT,
        // Removing a dictionary entry leaves the issue with no drug
        ForeignKeyDef::new(
            "MultilexDrug_ID",
            "MedicationDictionary",
            "MultilexDrug_ID",
            OnDelete::SetNull,
        ),
    ],
};

pub const CODED_EVENT: TableDef = TableDef {
    name: "CodedEvent",
    columns: &[
        ColumnDef::key("CodedEvent_ID", Serial),
        ColumnDef::new("Patient_ID", Integer),
        ColumnDef::new("CTV3Code", Text),
        ColumnDef::new("NumericValue", Double),
        ColumnDef::new("ConsultationDate", Timestamp),
        ColumnDef::new("SnomedConceptId", Text),
    ],
    foreign_keys: &[OWNED_BY_PATIENT],
};

pub const ORGANISATION: TableDef = TableDef {
    name: "Organisation",
    columns: &[
        ColumnDef::key("Organisation_ID", Serial),
        ColumnDef::new("GoLiveDate", Date),
        ColumnDef::new("STPCode", Text),
        ColumnDef::new("MSOACode", Text),
        ColumnDef::new("Region", Text),
    ],
    foreign_keys: &[],
};

pub const REGISTRATION_HISTORY: TableDef = TableDef {
    name: "RegistrationHistory",
    columns: &[
        ColumnDef::key("Registration_ID", Serial),
        ColumnDef::new("Organisation_ID", Integer),
        ColumnDef::new("Patient_ID", Integer),
        ColumnDef::new("StartDate", Date),
        ColumnDef::new("EndDate", Date),
    ],
    foreign_keys: &[
        OWNED_BY_PATIENT,
        // A registration is meaningless without its practice
        ForeignKeyDef::new(
            "Organisation_ID",
            "Organisation",
            "Organisation_ID",
            OnDelete::Cascade,
        ),
    ],
};

pub const PATIENT_ADDRESS: TableDef = TableDef {
    name: "PatientAddress",
    columns: &[
        ColumnDef::key("PatientAddress_ID", Serial),
        ColumnDef::new("Patient_ID", Integer),
        ColumnDef::new("StartDate", Date),
        ColumnDef::new("EndDate", Date),
        ColumnDef::new("AddressType", Integer),
        ColumnDef::new("RuralUrbanClassificationCode", Integer),
        ColumnDef::new("ImdRankRounded", Integer),
        ColumnDef::new("MSOACode", Text),
    ],
    foreign_keys: &[OWNED_BY_PATIENT],
};

pub const ICNARC: TableDef = TableDef {
    name: "ICNARC",
    columns: &[
        ColumnDef::key("ICNARC_ID", Serial),
        ColumnDef::new("Patient_ID", Integer),
        ColumnDef::new("IcuAdmissionDateTime", Timestamp),
        ColumnDef::new("OriginalIcuAdmissionDate", Date),
        ColumnDef::new("BasicDays_RespiratorySupport", Integer),
        ColumnDef::new("AdvancedDays_RespiratorySupport", Integer),
        ColumnDef::new("Ventilator", Integer),
    ],
    foreign_keys: &[OWNED_BY_PATIENT],
};

/// Cause-of-death columns `ICD10001` through `ICD10015`
pub const ICD10_CAUSE_COLUMNS: [&str; 15] = [
    "ICD10001", "ICD10002", "ICD10003", "ICD10004", "ICD10005", "ICD10006", "ICD10007",
    "ICD10008", "ICD10009", "ICD10010", "ICD10011", "ICD10012", "ICD10013", "ICD10014",
    "ICD10015",
];

pub const ONS_DEATHS: TableDef = TableDef {
    name: "ONS_Deaths",
    columns: &[
        // Surrogate key; the real extract has none
        ColumnDef::key("id", Serial),
        ColumnDef::new("Patient_ID", Integer),
        ColumnDef::new("Sex", Text),
        ColumnDef::new("ageinyrs", Integer),
        ColumnDef::new("dod", Date),
        ColumnDef::new("icd10u", Text),
        ColumnDef::new(ICD10_CAUSE_COLUMNS[0], Text),
        ColumnDef::new(ICD10_CAUSE_COLUMNS[1], Text),
        ColumnDef::new(ICD10_CAUSE_COLUMNS[2], Text),
        ColumnDef::new(ICD10_CAUSE_COLUMNS[3], Text),
        ColumnDef::new(ICD10_CAUSE_COLUMNS[4], Text),
        ColumnDef::new(ICD10_CAUSE_COLUMNS[5], Text),
        ColumnDef::new(ICD10_CAUSE_COLUMNS[6], Text),
        ColumnDef::new(ICD10_CAUSE_COLUMNS[7], Text),
        ColumnDef::new(ICD10_CAUSE_COLUMNS[8], Text),
        ColumnDef::new(ICD10_CAUSE_COLUMNS[9], Text),
        ColumnDef::new(ICD10_CAUSE_COLUMNS[10], Text),
        ColumnDef::new(ICD10_CAUSE_COLUMNS[11], Text),
        ColumnDef::new(ICD10_CAUSE_COLUMNS[12], Text),
        ColumnDef::new(ICD10_CAUSE_COLUMNS[13], Text),
        ColumnDef::new(ICD10_CAUSE_COLUMNS[14], Text),
    ],
    foreign_keys: &[OWNED_BY_PATIENT],
};

pub const CPNS: TableDef = TableDef {
    name: "CPNS",
    columns: &[
        ColumnDef::key("Id", Serial),
        ColumnDef::new("Patient_ID", Integer),
        ColumnDef::new("DateOfDeath", Date),
    ],
    foreign_keys: &[OWNED_BY_PATIENT],
};

/// Every mock table, in no particular order
pub static TABLES: [TableDef; 10] = [
    PATIENT,
    MEDICATION_DICTIONARY,
    MEDICATION_ISSUE,
    CODED_EVENT,
    ORGANISATION,
    REGISTRATION_HISTORY,
    PATIENT_ADDRESS,
    ICNARC,
    ONS_DEATHS,
    CPNS,
];

pub fn table(name: &str) -> Option<&'static TableDef> {
    TABLES.iter().find(|t| t.name == name)
}
