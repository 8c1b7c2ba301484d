//! Prediction service: raw feature mappings in, one price out.

use serde_json::{Map, Value};

use crate::model::{
    FeatureVector, ModelSource, ProvidedModel, Regressor, RegressorError, FEATURE_NAMES,
    N_FEATURES,
};
use crate::prelude::*;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("invalid value for feature `{feature}`: {reason}")]
    InvalidFeatureValue { feature: &'static str, reason: String },

    #[error("model is not loaded")]
    ModelUnavailable,

    #[error("prediction failed")]
    PredictionError(#[from] RegressorError),
}

/// Immutable per-process context, built once at startup and shared by all requests.
#[derive(Clone)]
pub struct ServiceContext {
    model: Option<Arc<dyn Regressor>>,
    source: ModelSource,
}

impl From<ProvidedModel> for ServiceContext {
    fn from(provided: ProvidedModel) -> Self {
        Self {
            model: provided
                .regressor
                .map(|regressor| Arc::new(regressor) as Arc<dyn Regressor>),
            source: provided.source,
        }
    }
}

impl ServiceContext {
    /// Whether any model, placeholder included, has been provided.
    pub const fn is_model_loaded(&self) -> bool {
        self.model.is_some()
    }

    pub const fn source(&self) -> ModelSource {
        self.source
    }

    pub fn predict(&self, raw_input: &Map<String, Value>) -> StdResult<f64, ServiceError> {
        let vector = vectorize(raw_input, &FEATURE_NAMES)?;
        predict(&vector, self.model.as_deref())
    }
}

/// Orders the raw input by `field_order`, missing features become `0.0`, unknown ones are ignored.
pub fn vectorize(
    raw_input: &Map<String, Value>,
    field_order: &[&'static str; N_FEATURES],
) -> StdResult<FeatureVector, ServiceError> {
    let mut vector = [0.0; N_FEATURES];
    for (value, &feature) in vector.iter_mut().zip(field_order) {
        if let Some(raw_value) = raw_input.get(feature) {
            *value = coerce(raw_value).map_err(|reason| ServiceError::InvalidFeatureValue {
                feature,
                reason,
            })?;
        }
    }
    Ok(vector)
}

/// Converts a JSON value to a float: numbers as is, trimmed strings parsed with
/// Rust float syntax (no `_` separators), booleans as `1.0` and `0.0`.
fn coerce(value: &Value) -> StdResult<f64, String> {
    match value {
        Value::Number(number) => number
            .as_f64()
            .ok_or_else(|| format!("{} is not representable as a float", number)),
        Value::String(string) => string
            .trim()
            .parse()
            .map_err(|_| format!("could not convert string to float: {:?}", string)),
        Value::Bool(true) => Ok(1.0),
        Value::Bool(false) => Ok(0.0),
        Value::Null => Err("expected a number, got null".to_string()),
        Value::Array(_) => Err("expected a number, got an array".to_string()),
        Value::Object(_) => Err("expected a number, got an object".to_string()),
    }
}

/// Runs the model on a batch of one.
pub fn predict(
    vector: &FeatureVector,
    model: Option<&dyn Regressor>,
) -> StdResult<f64, ServiceError> {
    let model = model.ok_or(ServiceError::ModelUnavailable)?;
    let predictions = model.predict(&[vector.as_slice()])?;
    let prediction = match predictions.as_slice() {
        [prediction] => *prediction,
        _ => {
            return Err(RegressorError::OutputMismatch {
                expected: 1,
                actual: predictions.len(),
            }
            .into());
        }
    };
    if !prediction.is_finite() {
        return Err(RegressorError::NonFinite(prediction).into());
    }
    Ok(prediction)
}
