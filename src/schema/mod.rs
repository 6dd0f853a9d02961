mod definition;
mod deployer;
mod registry;

pub use definition::{quote_ident, ColumnDef, ColumnType, ForeignKeyDef, OnDelete, TableDef};
pub use deployer::{order_by_dependencies, SchemaDeployer};
pub use registry::{
    table, CODED_EVENT, CPNS, ICD10_CAUSE_COLUMNS, ICNARC, MEDICATION_DICTIONARY,
    MEDICATION_ISSUE, ONS_DEATHS, ORGANISATION, PATIENT, PATIENT_ADDRESS, REGISTRATION_HISTORY,
    TABLES,
};
