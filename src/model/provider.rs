use std::path::Path;

use serde::Serialize;

use crate::model::{artifact, LinearRegression};
use crate::prelude::*;

/// What to serve when the model artifact cannot be loaded.
#[derive(Copy, Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum Fallback {
    /// Untrained regressor, every prediction fails with «not fitted».
    Placeholder,

    /// No model at all, every prediction fails with «model unavailable».
    #[value(name = "none")]
    NoModel,

    /// Refuse to start.
    Abort,
}

/// Where the served model came from, reported by the health check.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelSource {
    Artifact,
    Placeholder,

    #[serde(rename = "none")]
    Unavailable,
}

pub struct ProvidedModel {
    pub regressor: Option<LinearRegression>,
    pub source: ModelSource,
}

impl ProvidedModel {
    pub const fn artifact(regressor: LinearRegression) -> Self {
        Self {
            regressor: Some(regressor),
            source: ModelSource::Artifact,
        }
    }

    pub const fn placeholder() -> Self {
        Self {
            regressor: Some(LinearRegression::new()),
            source: ModelSource::Placeholder,
        }
    }

    pub const fn unavailable() -> Self {
        Self {
            regressor: None,
            source: ModelSource::Unavailable,
        }
    }
}

/// Loads the artifact once at startup and applies the fallback policy when that fails.
#[instrument(level = "info", skip_all, fields(path = %path.display(), ?fallback))]
pub fn provide(path: &Path, fallback: Fallback) -> Result<ProvidedModel> {
    let error = match artifact::load(path) {
        Ok(Some(regressor)) => {
            info!("loaded the model artifact");
            return Ok(ProvidedModel::artifact(regressor));
        }
        Ok(None) => anyhow!("model artifact `{}` is not found", path.display()),
        Err(error) => error,
    };

    match fallback {
        Fallback::Placeholder => {
            warn!("{:#}, serving the untrained placeholder (degraded mode)", error);
            Ok(ProvidedModel::placeholder())
        }
        Fallback::NoModel => {
            warn!("{:#}, serving without a model (degraded mode)", error);
            Ok(ProvidedModel::unavailable())
        }
        Fallback::Abort => Err(error.context("failed to load the model")),
    }
}
