//! Feature Builder
//!
//! Turns a [`PatientRecord`] into the single feature row the preprocessor
//! was fit on: categorical codes become strings, `_log` features are derived
//! as `ln(1 + x)`, and columns are restricted and ordered by the name lists
//! stored with the model.

use std::collections::HashMap;
use std::str::FromStr;

use serde::Serialize;

use crate::models::{PatientRecord, RawValue};

/// Suffix marking the log-transformed counterpart of a raw column
pub const LOG_SUFFIX: &str = "_log";

/// A single engineered feature value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Number(f64),
    Category(String),
}

/// What to do when a declared feature cannot be materialized from the record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingFeaturePolicy {
    /// Log a warning and leave the column out of the row
    #[default]
    Drop,
    /// Fail the request with a missing feature error
    Reject,
}

impl FromStr for MissingFeaturePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "drop" => Ok(MissingFeaturePolicy::Drop),
            "reject" => Ok(MissingFeaturePolicy::Reject),
            other => Err(format!("unknown missing feature policy: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FeatureError {
    #[error("missing feature: {0}")]
    Missing(String),

    #[error("column {0} is not numeric and cannot be log-transformed")]
    NotNumeric(String),
}

/// Ordered feature columns for one record
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct FeatureRow {
    columns: Vec<(String, FeatureValue)>,
    #[serde(skip)]
    dropped: Vec<String>,
}

impl FeatureRow {
    pub fn get(&self, name: &str) -> Option<&FeatureValue> {
        self.columns
            .iter()
            .find(|(column, _)| column == name)
            .map(|(_, value)| value)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    /// Declared features that could not be materialized
    pub fn dropped(&self) -> &[String] {
        &self.dropped
    }
}

/// Build the feature row for `record`.
///
/// Column order is `numeric_names ++ categorical_names`, never the order of
/// the input. Names that are not materialized are handled per `policy`.
pub fn build(
    record: &PatientRecord,
    numeric_names: &[String],
    categorical_names: &[String],
    policy: MissingFeaturePolicy,
) -> Result<FeatureRow, FeatureError> {
    // 1. Coerce categorical codes
    let mut columns: HashMap<String, FeatureValue> = record
        .raw_columns()
        .into_iter()
        .map(|(name, raw)| (name.to_string(), coerce(name, raw)))
        .collect();

    let mut dropped = Vec::new();

    // 2. Derive log features
    for name in numeric_names {
        let Some(base) = name.strip_suffix(LOG_SUFFIX) else {
            continue;
        };

        match columns.get(base).cloned() {
            Some(FeatureValue::Number(value)) => {
                columns.insert(name.clone(), FeatureValue::Number(value.ln_1p()));
            }
            Some(FeatureValue::Category(_)) => {
                return Err(FeatureError::NotNumeric(base.to_string()));
            }
            None => match policy {
                MissingFeaturePolicy::Reject => return Err(FeatureError::Missing(base.to_string())),
                MissingFeaturePolicy::Drop => {
                    tracing::warn!(
                        feature = %name,
                        source_column = %base,
                        "Source column not found in input, dropping log feature"
                    );
                    dropped.push(name.clone());
                }
            },
        }
    }

    // 3. Restrict and order
    let mut ordered = Vec::with_capacity(numeric_names.len() + categorical_names.len());
    for name in numeric_names.iter().chain(categorical_names) {
        match columns.get(name) {
            Some(value) => ordered.push((name.clone(), value.clone())),
            None if policy == MissingFeaturePolicy::Reject => {
                return Err(FeatureError::Missing(name.clone()));
            }
            None => {
                if !dropped.contains(name) {
                    tracing::warn!(feature = %name, "Declared feature not present in input, dropping");
                    dropped.push(name.clone());
                }
            }
        }
    }

    Ok(FeatureRow {
        columns: ordered,
        dropped,
    })
}

fn coerce(name: &str, raw: RawValue<'_>) -> FeatureValue {
    match raw {
        RawValue::Integer(code) if PatientRecord::CATEGORICAL_CODES.contains(&name) => {
            FeatureValue::Category(code.to_string())
        }
        RawValue::Integer(value) => FeatureValue::Number(value as f64),
        RawValue::Text(text) => FeatureValue::Category(text.to_string()),
    }
}

/// Declared feature names that do not belong to the patient record schema.
///
/// A numeric name is known when it is a numeric column, or a numeric column
/// with the [`LOG_SUFFIX`]. A categorical name must be a categorical column.
pub fn unknown_features(numeric_names: &[String], categorical_names: &[String]) -> Vec<String> {
    let numeric = numeric_names.iter().filter(|name| {
        let name = name.as_str();
        let base = name.strip_suffix(LOG_SUFFIX).unwrap_or(name);
        !PatientRecord::NUMERIC_COLUMNS.contains(&base)
    });
    let categorical = categorical_names
        .iter()
        .filter(|name| !PatientRecord::CATEGORICAL_COLUMNS.contains(&name.as_str()));

    numeric.chain(categorical).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{sample_categorical, sample_numeric, sample_patient};

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_column_order_follows_name_lists() {
        let row = build(
            &sample_patient(),
            &sample_numeric(),
            &sample_categorical(),
            MissingFeaturePolicy::Drop,
        )
        .unwrap();

        let expected: Vec<String> = sample_numeric()
            .into_iter()
            .chain(sample_categorical())
            .collect();
        let actual: Vec<&str> = row.names().collect();
        assert_eq!(actual, expected.iter().map(String::as_str).collect::<Vec<_>>());
        assert!(row.dropped().is_empty());
    }

    #[test]
    fn test_reordered_lists_reorder_row() {
        let numeric = names(&["time_in_hospital_log", "age"]);
        let categorical = names(&["race", "admission_type_id"]);
        let row = build(&sample_patient(), &numeric, &categorical, MissingFeaturePolicy::Drop).unwrap();

        let actual: Vec<&str> = row.names().collect();
        assert_eq!(actual, vec!["time_in_hospital_log", "age", "race", "admission_type_id"]);
    }

    #[test]
    fn test_admission_type_becomes_category() {
        let row = build(
            &sample_patient(),
            &[],
            &names(&["admission_type_id"]),
            MissingFeaturePolicy::Drop,
        )
        .unwrap();
        assert_eq!(
            row.get("admission_type_id"),
            Some(&FeatureValue::Category("1".to_string()))
        );
    }

    #[test]
    fn test_log_transform() {
        let mut record = sample_patient();
        record.number_emergency = 0;
        let numeric = names(&["num_medications_log", "number_emergency_log", "age"]);
        let row = build(&record, &numeric, &[], MissingFeaturePolicy::Drop).unwrap();

        match row.get("num_medications_log") {
            Some(FeatureValue::Number(v)) => assert!((v - 11.0_f64.ln()).abs() < 1e-12),
            other => panic!("unexpected value: {:?}", other),
        }
        assert_eq!(row.get("number_emergency_log"), Some(&FeatureValue::Number(0.0)));
        // Raw column kept only when declared
        assert_eq!(row.get("age"), Some(&FeatureValue::Number(60.0)));
        assert_eq!(row.get("num_medications"), None);
    }

    #[test]
    fn test_deterministic() {
        let build_once = || {
            build(
                &sample_patient(),
                &sample_numeric(),
                &sample_categorical(),
                MissingFeaturePolicy::Drop,
            )
            .unwrap()
        };
        let first = serde_json::to_vec(&build_once()).unwrap();
        let second = serde_json::to_vec(&build_once()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_unknown_log_source_dropped() {
        let numeric = names(&["age", "weight_log"]);
        let row = build(&sample_patient(), &numeric, &[], MissingFeaturePolicy::Drop).unwrap();

        assert_eq!(row.names().collect::<Vec<_>>(), vec!["age"]);
        assert_eq!(row.dropped(), &["weight_log".to_string()]);
    }

    #[test]
    fn test_unknown_log_source_rejected() {
        let numeric = names(&["age", "weight_log"]);
        let err = build(&sample_patient(), &numeric, &[], MissingFeaturePolicy::Reject).unwrap_err();
        assert_eq!(err, FeatureError::Missing("weight".to_string()));
    }

    #[test]
    fn test_unknown_categorical() {
        let categorical = names(&["race", "payer_code"]);

        let row = build(&sample_patient(), &[], &categorical, MissingFeaturePolicy::Drop).unwrap();
        assert_eq!(row.names().collect::<Vec<_>>(), vec!["race"]);
        assert_eq!(row.dropped(), &["payer_code".to_string()]);

        let err = build(&sample_patient(), &[], &categorical, MissingFeaturePolicy::Reject).unwrap_err();
        assert_eq!(err, FeatureError::Missing("payer_code".to_string()));
    }

    #[test]
    fn test_log_of_category_is_error() {
        let numeric = names(&["race_log"]);
        let err = build(&sample_patient(), &numeric, &[], MissingFeaturePolicy::Drop).unwrap_err();
        assert_eq!(err, FeatureError::NotNumeric("race".to_string()));
    }

    #[test]
    fn test_unknown_features() {
        assert!(unknown_features(&sample_numeric(), &sample_categorical()).is_empty());

        let unknown = unknown_features(
            &names(&["age", "weight_log", "race_log"]),
            &names(&["race", "age"]),
        );
        assert_eq!(unknown, names(&["weight_log", "race_log", "age"]));
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("DROP".parse::<MissingFeaturePolicy>(), Ok(MissingFeaturePolicy::Drop));
        assert_eq!("reject".parse::<MissingFeaturePolicy>(), Ok(MissingFeaturePolicy::Reject));
        assert!("maybe".parse::<MissingFeaturePolicy>().is_err());
    }
}
