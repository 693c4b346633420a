//! Feature transformer: constant-fill imputation followed by robust scaling.

use crate::dataset::{Column, Table};
use crate::errors::DatasetError;
use serde::{Deserialize, Serialize};

/// A transformer fitted on the training split.
///
/// Missing readings are imputed with a constant fill value, then each feature
/// is centered on its median and scaled by its interquartile range. The fitted
/// feature names are recorded so that prediction inputs are selected by name,
/// in training order, regardless of extra columns in the incoming file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedTransformer {
    feature_names: Vec<String>,
    fill_value: f64,
    centers: Vec<f64>,
    scales: Vec<f64>,
}

impl FittedTransformer {
    /// Fits the transformer on the named feature columns of a table.
    pub fn fit(
        table: &Table,
        feature_names: &[String],
        fill_value: f64,
    ) -> Result<Self, DatasetError> {
        let mut centers = Vec::with_capacity(feature_names.len());
        let mut scales = Vec::with_capacity(feature_names.len());

        for name in feature_names {
            let values = numeric_column(table, name)?;
            let mut imputed: Vec<f64> = values
                .iter()
                .map(|v| if v.is_nan() { fill_value } else { *v })
                .collect();
            imputed.sort_by(f64::total_cmp);

            let center = quantile(&imputed, 0.5);
            let iqr = quantile(&imputed, 0.75) - quantile(&imputed, 0.25);
            centers.push(center);
            // Degenerate spread leaves the feature centered but unscaled.
            scales.push(if iqr > 0.0 { iqr } else { 1.0 });
        }

        Ok(Self {
            feature_names: feature_names.to_vec(),
            fill_value,
            centers,
            scales,
        })
    }

    /// Rebuilds a transformer from fitted parameters.
    #[must_use]
    pub fn from_parts(
        feature_names: Vec<String>,
        fill_value: f64,
        centers: Vec<f64>,
        scales: Vec<f64>,
    ) -> Self {
        Self {
            feature_names,
            fill_value,
            centers,
            scales,
        }
    }

    /// The feature names recorded at fit time, in training order.
    #[must_use]
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Transforms a table into a row-major feature matrix.
    ///
    /// Input columns are selected by the fitted names; extra columns are
    /// ignored, absent ones are an error.
    pub fn transform(&self, table: &Table) -> Result<Vec<Vec<f64>>, DatasetError> {
        let mut columns = Vec::with_capacity(self.feature_names.len());
        for name in &self.feature_names {
            columns.push(numeric_column(table, name)?);
        }

        let mut rows = Vec::with_capacity(table.n_rows());
        for row in 0..table.n_rows() {
            let mut out = Vec::with_capacity(self.feature_names.len());
            for (feature, column) in columns.iter().enumerate() {
                let raw = column[row];
                let imputed = if raw.is_nan() { self.fill_value } else { raw };
                out.push((imputed - self.centers[feature]) / self.scales[feature]);
            }
            rows.push(out);
        }
        Ok(rows)
    }
}

fn numeric_column<'t>(table: &'t Table, name: &str) -> Result<&'t [f64], DatasetError> {
    match table.column(name) {
        Some(Column::Float(values)) => Ok(values),
        Some(Column::Text(_)) => Err(DatasetError::NotNumeric {
            name: name.to_string(),
        }),
        None => Err(DatasetError::MissingColumn {
            name: name.to_string(),
        }),
    }
}

/// Linear-interpolation quantile over a sorted slice.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    if lower == upper {
        sorted[lower]
    } else {
        let weight = position - lower as f64;
        sorted[lower] * (1.0 - weight) + sorted[upper] * weight
    }
}
