//! Regression model, its persisted artifact, and the startup provider.

pub use self::artifact::{load, save};
pub use self::linear::LinearRegression;
pub use self::provider::{provide, Fallback, ModelSource, ProvidedModel};
use crate::prelude::*;

mod artifact;
mod linear;
mod provider;

pub const N_FEATURES: usize = 13;

/// Boston Housing feature order. The regressor must have been fit on the same order,
/// nothing checks it at request time.
pub const FEATURE_NAMES: [&str; N_FEATURES] = [
    "CRIM", "ZN", "INDUS", "CHAS", "NOX", "RM", "AGE", "DIS", "RAD", "TAX", "PTRATIO", "B", "LSTAT",
];

/// Single house in the canonical [`FEATURE_NAMES`] order.
pub type FeatureVector = [f64; N_FEATURES];

/// Anything that maps rows of features onto predicted values.
pub trait Regressor: Send + Sync {
    /// Predicts one value per row.
    fn predict(&self, batch: &[&[f64]]) -> StdResult<Vec<f64>, RegressorError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RegressorError {
    #[error("the model is not fitted yet, call `fit` with appropriate arguments first")]
    NotFitted,

    #[error("expected {expected} features per row, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("expected {expected} predictions, got {actual}")]
    OutputMismatch { expected: usize, actual: usize },

    #[error("got {n_labels} labels for {n_samples} samples")]
    LabelMismatch { n_samples: usize, n_labels: usize },

    #[error("the model produced a non-finite value: {0}")]
    NonFinite(f64),

    #[error("cannot fit on an empty dataset")]
    EmptyDataset,

    #[error("least squares solution failed: {0}")]
    Singular(&'static str),
}
