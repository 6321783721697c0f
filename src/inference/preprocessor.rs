//! Column transformer: standard scaling for numeric columns, one-hot
//! encoding for categorical columns.

use serde::{Deserialize, Serialize};

use super::{Encoded, InferenceError, Preprocessor};
use crate::features::{FeatureRow, FeatureValue};

/// Standardization parameters for one numeric column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericColumn {
    pub name: String,
    pub mean: f64,
    pub scale: f64,
}

/// Known categories for one categorical column, in encoding order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalColumn {
    pub name: String,
    pub categories: Vec<String>,
}

/// Behaviour for categories not seen during training
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandleUnknown {
    /// Encode as an all-zero block
    #[default]
    Ignore,
    Error,
}

/// Preprocessor artifact as exported by the training pipeline.
///
/// Output layout: scaled numeric columns in declared order, then one one-hot
/// block per categorical column in declared order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnTransformer {
    pub numeric: Vec<NumericColumn>,
    pub categorical: Vec<CategoricalColumn>,
    #[serde(default)]
    pub handle_unknown: HandleUnknown,
}

impl ColumnTransformer {
    /// Names of the input columns this transformer reads
    pub fn input_columns(&self) -> impl Iterator<Item = &str> {
        self.numeric
            .iter()
            .map(|c| c.name.as_str())
            .chain(self.categorical.iter().map(|c| c.name.as_str()))
    }
}

impl Preprocessor for ColumnTransformer {
    fn transform(&self, row: &FeatureRow) -> Result<Encoded, InferenceError> {
        let mut encoded = Vec::with_capacity(self.output_width());
        let mut unknown_categories = Vec::new();

        for column in &self.numeric {
            let value = match row.get(&column.name) {
                Some(FeatureValue::Number(value)) => *value,
                Some(FeatureValue::Category(_)) => {
                    return Err(InferenceError::WrongType {
                        column: column.name.clone(),
                        expected: "number",
                    })
                }
                None => return Err(InferenceError::MissingFeature(column.name.clone())),
            };

            let scale = if column.scale == 0.0 { 1.0 } else { column.scale };
            encoded.push((value - column.mean) / scale);
        }

        for column in &self.categorical {
            let value = match row.get(&column.name) {
                Some(FeatureValue::Category(value)) => value,
                Some(FeatureValue::Number(_)) => {
                    return Err(InferenceError::WrongType {
                        column: column.name.clone(),
                        expected: "category",
                    })
                }
                None => return Err(InferenceError::MissingFeature(column.name.clone())),
            };

            let hit = column.categories.iter().position(|c| c == value);
            if hit.is_none() {
                if self.handle_unknown == HandleUnknown::Error {
                    return Err(InferenceError::UnknownCategory {
                        column: column.name.clone(),
                        value: value.clone(),
                    });
                }
                tracing::warn!(
                    feature = %column.name,
                    value = %value,
                    "Unknown category, encoding as zeros"
                );
                unknown_categories.push(column.name.clone());
            }

            encoded.extend((0..column.categories.len()).map(|i| {
                if Some(i) == hit {
                    1.0
                } else {
                    0.0
                }
            }));
        }

        Ok(Encoded {
            values: encoded,
            unknown_categories,
        })
    }

    fn output_width(&self) -> usize {
        self.numeric.len() + self.categorical.iter().map(|c| c.categories.len()).sum::<usize>()
    }
}
