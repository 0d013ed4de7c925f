// src/normalization/dataset.rs
//! Fitting and applying scalers to stacked feature tables

use super::scaler::ScalerModel;
use crate::config::constants::paths;
use crate::config::ScalerKind;
use crate::error::SkipReason;
use crate::table::{ColumnData, FeatureTable};
use serde::{Deserialize, Serialize};

/// How a normalization run obtains its scaler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalizationMode {
    /// Fit on the stacked training set and persist the scaler
    Fit,
    /// Reuse a persisted scaler without refitting
    Apply,
    /// Fit a fresh scaler on every test group (train/test inconsistent)
    Refit,
}

/// Stateless scaler fitting and application
pub struct DatasetNormalizer;

impl DatasetNormalizer {
    /// Fit over every numeric column of `table`
    pub fn fit(table: &FeatureTable, kind: ScalerKind) -> ScalerModel {
        let columns: Vec<(String, &[f64])> = table
            .columns()
            .iter()
            .filter_map(|column| match &column.data {
                ColumnData::Numeric(values) => Some((column.name.clone(), values.as_slice())),
                ColumnData::Text(_) => None,
            })
            .collect();
        ScalerModel::fit(kind, &columns)
    }

    /// Rescale numeric columns; text columns and column order are untouched
    ///
    /// The table's numeric columns must be exactly the model's columns.
    pub fn transform(model: &ScalerModel, table: &FeatureTable) -> Result<FeatureTable, SkipReason> {
        let numeric = table.numeric_column_names();
        if numeric != model.columns() {
            return Err(SkipReason::SchemaMismatch {
                expected: model.columns().to_vec(),
                actual: numeric,
            });
        }

        let mut index = 0;
        table.map_columns(|column| match &column.data {
            ColumnData::Numeric(values) => {
                let scaled = model.transform_column(index, values);
                index += 1;
                ColumnData::Numeric(scaled)
            }
            text => text.clone(),
        })
    }

    pub fn fit_transform(
        table: &FeatureTable,
        kind: ScalerKind,
    ) -> Result<(ScalerModel, FeatureTable), SkipReason> {
        let model = Self::fit(table, kind);
        let transformed = Self::transform(&model, table)?;
        Ok((model, transformed))
    }
}

/// `<context>_scaler.bin`
pub fn scaler_file_name(context: &str) -> String {
    format!("{}{}", context, paths::SCALER_SUFFIX).replace(' ', "_")
}

/// `<category>_<eyes>`, spaces replaced by underscores
pub fn group_context(category: &str, eyes: &str) -> String {
    format!("{}_{}", category, eyes).replace(' ', "_")
}

/// `<category>_<eyes>_test_data.csv`
pub fn test_data_file_name(category: &str, eyes: &str) -> String {
    format!("{}{}", group_context(category, eyes), paths::TEST_DATA_SUFFIX)
}
