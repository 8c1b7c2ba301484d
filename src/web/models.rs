//! JSON bodies of the API.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::model::ModelSource;

#[derive(Deserialize)]
pub struct PredictRequest {
    /// Raw feature mapping, vectorized by the service.
    #[serde(default)]
    pub features: Map<String, Value>,
}

#[derive(Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PredictResponse {
    Success { prediction: f64 },
    Error { error: String },
}

#[derive(Serialize)]
pub struct IndexResponse {
    pub message: &'static str,
    pub status: &'static str,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub model_loaded: bool,
    pub model_source: ModelSource,
}
