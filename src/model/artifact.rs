//! Pickled model artifact.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_pickle::{DeOptions, SerOptions};

use crate::model::{LinearRegression, RegressorError, FEATURE_NAMES, N_FEATURES};
use crate::prelude::*;

const SCHEMA_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct Artifact {
    schema_version: u32,

    /// Feature order the coefficients were fit on.
    feature_names: Vec<String>,

    coefficients: Vec<f64>,
    intercept: f64,
}

impl Artifact {
    fn validate(&self) -> Result {
        if self.schema_version != SCHEMA_VERSION {
            return Err(anyhow!(
                "unsupported schema version {}, expected {}",
                self.schema_version,
                SCHEMA_VERSION,
            ));
        }
        if self.feature_names != FEATURE_NAMES {
            return Err(anyhow!(
                "the model is fit on features {:?}, expected {:?}",
                self.feature_names,
                FEATURE_NAMES,
            ));
        }
        if self.coefficients.len() != N_FEATURES {
            return Err(anyhow!(
                "the model has {} coefficients, expected {}",
                self.coefficients.len(),
                N_FEATURES,
            ));
        }
        Ok(())
    }
}

/// Loads the artifact, `None` means there is no such file.
///
/// The artifact must be fit on exactly [`FEATURE_NAMES`], otherwise it is refused
/// instead of silently mispredicting.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub fn load(path: &Path) -> Result<Option<LinearRegression>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(error) if error.kind() == ErrorKind::NotFound => {
            return Ok(None);
        }
        Err(error) => {
            return Err(error).with_context(|| format!("failed to read `{}`", path.display()));
        }
    };
    let artifact: Artifact = serde_pickle::from_slice(&bytes, DeOptions::new())
        .with_context(|| format!("failed to decode `{}`", path.display()))?;
    artifact
        .validate()
        .with_context(|| format!("`{}` does not match the feature schema", path.display()))?;
    debug!(n_bytes = bytes.len(), intercept = artifact.intercept, "loaded");
    Ok(Some(LinearRegression::from_parameters(artifact.coefficients, artifact.intercept)))
}

#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub fn save(model: &LinearRegression, path: &Path) -> Result {
    let (coefficients, intercept) = model.parameters().ok_or(RegressorError::NotFitted)?;
    let artifact = Artifact {
        schema_version: SCHEMA_VERSION,
        feature_names: FEATURE_NAMES.iter().map(ToString::to_string).collect(),
        coefficients: coefficients.to_vec(),
        intercept,
    };
    artifact.validate()?;
    let bytes = serde_pickle::to_vec(&artifact, SerOptions::new())?;
    fs::write(path, &bytes).with_context(|| format!("failed to write `{}`", path.display()))?;
    debug!(n_bytes = bytes.len(), "saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_model() -> LinearRegression {
        LinearRegression::from_parameters((1..=N_FEATURES).map(|i| i as f64 / 10.0).collect(), 22.5)
    }

    #[test]
    fn save_load_ok() -> crate::Result {
        let directory = tempfile::tempdir()?;
        let path = directory.path().join("house_price_model.pkl");
        let model = sample_model();

        save(&model, &path)?;
        assert_eq!(load(&path)?, Some(model));
        Ok(())
    }

    #[test]
    fn load_missing_ok() -> crate::Result {
        let directory = tempfile::tempdir()?;
        assert_eq!(load(&directory.path().join("missing.pkl"))?, None);
        Ok(())
    }

    #[test]
    fn load_garbage_error() -> crate::Result {
        let directory = tempfile::tempdir()?;
        let path = directory.path().join("garbage.pkl");
        fs::write(&path, b"definitely not a pickle")?;
        assert!(load(&path).is_err());
        Ok(())
    }

    #[test]
    fn load_reordered_features_error() -> crate::Result {
        let directory = tempfile::tempdir()?;
        let path = directory.path().join("reordered.pkl");
        let mut feature_names: Vec<String> = FEATURE_NAMES.iter().map(ToString::to_string).collect();
        feature_names.swap(0, 1);
        let artifact = Artifact {
            schema_version: SCHEMA_VERSION,
            feature_names,
            coefficients: vec![0.0; N_FEATURES],
            intercept: 0.0,
        };
        fs::write(&path, serde_pickle::to_vec(&artifact, SerOptions::new())?)?;

        let error = load(&path).unwrap_err();
        assert!(format!("{:#}", error).contains("fit on features"));
        Ok(())
    }

    #[test]
    fn load_unknown_schema_version_error() -> crate::Result {
        let directory = tempfile::tempdir()?;
        let path = directory.path().join("future.pkl");
        let artifact = Artifact {
            schema_version: SCHEMA_VERSION + 1,
            feature_names: FEATURE_NAMES.iter().map(ToString::to_string).collect(),
            coefficients: vec![0.0; N_FEATURES],
            intercept: 0.0,
        };
        fs::write(&path, serde_pickle::to_vec(&artifact, SerOptions::new())?)?;
        assert!(load(&path).is_err());
        Ok(())
    }

    #[test]
    fn save_not_fitted_error() -> crate::Result {
        let directory = tempfile::tempdir()?;
        assert!(save(&LinearRegression::new(), &directory.path().join("model.pkl")).is_err());
        Ok(())
    }
}
