//! Patient record model

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Raw value of a single patient record column, before feature engineering
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawValue<'a> {
    Integer(i64),
    Text(&'a str),
}

/// One patient submitted for a readmission prediction.
///
/// Field names on the wire match the column names the model was trained on,
/// including the camel-cased `diabetesMed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct PatientRecord {
    // Numeric attributes
    #[validate(range(min = 0))]
    pub age: i64,
    #[validate(range(min = 0))]
    pub num_lab_procedures: i64,
    #[validate(range(min = 0))]
    pub num_medications: i64,
    #[validate(range(min = 0))]
    pub num_procedures: i64,
    #[validate(range(min = 0))]
    pub number_diagnoses: i64,
    #[validate(range(min = 0))]
    pub number_emergency: i64,
    #[validate(range(min = 0))]
    pub number_inpatient: i64,
    #[validate(range(min = 0))]
    pub time_in_hospital: i64,

    // Categorical attributes
    /// Numeric code, treated as a category by the model
    #[validate(range(min = 0))]
    pub admission_type_id: i64,
    #[serde(rename = "diabetesMed")]
    #[validate(length(min = 1))]
    pub diabetes_med: String,
    #[validate(length(min = 1))]
    pub discharge_disposition_def: String,
    #[validate(length(min = 1))]
    pub disease_class_1: String,
    #[validate(length(min = 1))]
    pub race: String,
}

impl PatientRecord {
    /// Columns holding numeric measurements
    pub const NUMERIC_COLUMNS: [&'static str; 8] = [
        "age",
        "num_lab_procedures",
        "num_medications",
        "num_procedures",
        "number_diagnoses",
        "number_emergency",
        "number_inpatient",
        "time_in_hospital",
    ];

    /// Columns the model treats as categories
    pub const CATEGORICAL_COLUMNS: [&'static str; 5] = [
        "admission_type_id",
        "diabetesMed",
        "discharge_disposition_def",
        "disease_class_1",
        "race",
    ];

    /// Numeric codes that must be coerced to strings before encoding
    pub const CATEGORICAL_CODES: [&'static str; 1] = ["admission_type_id"];

    /// All columns by training name, numeric first
    pub fn raw_columns(&self) -> [(&'static str, RawValue<'_>); 13] {
        [
            ("age", RawValue::Integer(self.age)),
            ("num_lab_procedures", RawValue::Integer(self.num_lab_procedures)),
            ("num_medications", RawValue::Integer(self.num_medications)),
            ("num_procedures", RawValue::Integer(self.num_procedures)),
            ("number_diagnoses", RawValue::Integer(self.number_diagnoses)),
            ("number_emergency", RawValue::Integer(self.number_emergency)),
            ("number_inpatient", RawValue::Integer(self.number_inpatient)),
            ("time_in_hospital", RawValue::Integer(self.time_in_hospital)),
            ("admission_type_id", RawValue::Integer(self.admission_type_id)),
            ("diabetesMed", RawValue::Text(&self.diabetes_med)),
            ("discharge_disposition_def", RawValue::Text(&self.discharge_disposition_def)),
            ("disease_class_1", RawValue::Text(&self.disease_class_1)),
            ("race", RawValue::Text(&self.race)),
        ]
    }
}
