//! Ordinary least squares with an intercept.

use nalgebra::{DMatrix, DVector};

use crate::model::{Regressor, RegressorError};
use crate::prelude::*;

/// Singular values below this are treated as zero by the least squares solver.
const SINGULAR_VALUE_EPSILON: f64 = 1e-10;

/// Linear regression: `y = intercept + coefficients · x`.
///
/// [`LinearRegression::new`] makes an unfitted placeholder, which refuses to predict
/// until [`LinearRegression::fit`] has been called.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LinearRegression {
    parameters: Option<Parameters>,
}

#[derive(Clone, Debug, PartialEq)]
struct Parameters {
    coefficients: Vec<f64>,
    intercept: f64,
}

impl LinearRegression {
    pub const fn new() -> Self {
        Self { parameters: None }
    }

    pub fn from_parameters(coefficients: Vec<f64>, intercept: f64) -> Self {
        Self {
            parameters: Some(Parameters {
                coefficients,
                intercept,
            }),
        }
    }

    /// Fitted coefficients and intercept, if any.
    pub fn parameters(&self) -> Option<(&[f64], f64)> {
        self.parameters
            .as_ref()
            .map(|parameters| (parameters.coefficients.as_slice(), parameters.intercept))
    }

    /// Fits the model on the `(n_samples, n_features)` matrix and the labels.
    ///
    /// The data gets centred first so that the intercept falls out of the column means,
    /// the centred system is then solved in the least squares sense through the SVD.
    #[instrument(level = "debug", skip_all, fields(n_samples = x.nrows(), n_features = x.ncols()))]
    pub fn fit(&mut self, x: &DMatrix<f64>, y: &DVector<f64>) -> StdResult<(), RegressorError> {
        if x.nrows() == 0 {
            return Err(RegressorError::EmptyDataset);
        }
        if x.nrows() != y.len() {
            return Err(RegressorError::LabelMismatch {
                n_samples: x.nrows(),
                n_labels: y.len(),
            });
        }

        let x_mean = DVector::from_iterator(x.ncols(), x.column_iter().map(|column| column.mean()));
        let y_mean = y.mean();

        let mut x_centred = x.clone();
        for (mean, mut column) in x_mean.iter().zip(x_centred.column_iter_mut()) {
            column.add_scalar_mut(-mean);
        }
        let y_centred = y.add_scalar(-y_mean);

        let coefficients = x_centred
            .svd(true, true)
            .solve(&y_centred, SINGULAR_VALUE_EPSILON)
            .map_err(RegressorError::Singular)?;
        let intercept = y_mean - x_mean.dot(&coefficients);
        debug!(intercept, "fitted");

        self.parameters = Some(Parameters {
            coefficients: coefficients.iter().copied().collect(),
            intercept,
        });
        Ok(())
    }

    /// Coefficient of determination R² of the predictions on the given data.
    pub fn score(&self, x: &DMatrix<f64>, y: &DVector<f64>) -> StdResult<f64, RegressorError> {
        let rows: Vec<Vec<f64>> = x
            .row_iter()
            .map(|row| row.iter().copied().collect())
            .collect();
        let rows: Vec<&[f64]> = rows.iter().map(Vec::as_slice).collect();
        let predictions = self.predict(&rows)?;
        if predictions.len() != y.len() {
            return Err(RegressorError::LabelMismatch {
                n_samples: predictions.len(),
                n_labels: y.len(),
            });
        }

        let y_mean = y.mean();
        let residual_sum: f64 = predictions
            .iter()
            .zip(y.iter())
            .map(|(prediction, target)| (target - prediction).powi(2))
            .sum();
        let total_sum: f64 = y.iter().map(|target| (target - y_mean).powi(2)).sum();
        Ok(1.0 - residual_sum / total_sum)
    }
}

impl Regressor for LinearRegression {
    fn predict(&self, batch: &[&[f64]]) -> StdResult<Vec<f64>, RegressorError> {
        let parameters = self.parameters.as_ref().ok_or(RegressorError::NotFitted)?;
        batch
            .iter()
            .map(|row| {
                if row.len() != parameters.coefficients.len() {
                    return Err(RegressorError::ShapeMismatch {
                        expected: parameters.coefficients.len(),
                        actual: row.len(),
                    });
                }
                let dot: f64 = row
                    .iter()
                    .zip(&parameters.coefficients)
                    .map(|(xi, wi)| xi * wi)
                    .sum();
                Ok(parameters.intercept + dot)
            })
            .collect()
    }
}
