//! Synthetic Boston-Housing-like dataset and the sample model fit on it.
//!
//! Used for development when no real model artifact is available.

use nalgebra::{DMatrix, DVector};
use rand::distributions::Distribution;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use statrs::distribution::{Exp, Normal, Uniform};

use crate::model::{self, FeatureVector, LinearRegression, Regressor, N_FEATURES};
use crate::opts::CreateSampleModelOpts;
use crate::prelude::*;

/// Base price in thousands of dollars.
const BASE_PRICE: f64 = 15.0;

/// Synthetic prices are never lower than this.
const MIN_PRICE: f64 = 5.0;

const NOISE_STD_DEV: f64 = 3.0;

/// Price contribution per unit of each feature.
const WEIGHTS: FeatureVector = [
    -0.1, 0.05, -0.03, 3.0, -2.0, 4.0, -0.02, 0.5, 0.1, -0.01, -0.5, 0.01, -0.5,
];

/// How each feature column is drawn.
const SAMPLERS: [Sampler; N_FEATURES] = [
    Sampler::Exponential { scale: 3.0 },
    Sampler::Uniform { low: 0.0, high: 100.0 },
    Sampler::Uniform { low: 0.0, high: 30.0 },
    Sampler::Bernoulli { p: 0.07 },
    Sampler::Uniform { low: 0.3, high: 0.9 },
    Sampler::Uniform { low: 3.0, high: 9.0 },
    Sampler::Uniform { low: 0.0, high: 100.0 },
    Sampler::Exponential { scale: 4.0 },
    Sampler::Integer { low: 1, high: 25 },
    Sampler::Uniform { low: 180.0, high: 750.0 },
    Sampler::Uniform { low: 12.0, high: 22.0 },
    Sampler::Uniform { low: 0.0, high: 400.0 },
    Sampler::Uniform { low: 1.0, high: 40.0 },
];

/// First row of the Boston Housing dataset.
pub const REFERENCE_HOUSE: FeatureVector = [
    0.00632, 18.0, 2.31, 0.0, 0.538, 6.575, 65.2, 4.09, 1.0, 296.0, 15.3, 396.9, 4.98,
];

#[derive(Copy, Clone)]
enum Sampler {
    Exponential { scale: f64 },
    Uniform { low: f64, high: f64 },
    Bernoulli { p: f64 },

    /// `high` is exclusive.
    Integer { low: i32, high: i32 },
}

impl Sampler {
    fn sample_column(self, rng: &mut StdRng, n_samples: usize) -> Result<Vec<f64>> {
        let column: Vec<f64> = match self {
            Self::Exponential { scale } => {
                let distribution = Exp::new(1.0 / scale)?;
                distribution.sample_iter(rng).take(n_samples).collect()
            }
            Self::Uniform { low, high } => {
                let distribution = Uniform::new(low, high)?;
                distribution.sample_iter(rng).take(n_samples).collect()
            }
            Self::Bernoulli { p } => (0..n_samples)
                .map(|_| if rng.gen_bool(p) { 1.0 } else { 0.0 })
                .collect(),
            Self::Integer { low, high } => (0..n_samples)
                .map(|_| f64::from(rng.gen_range(low..high)))
                .collect(),
        };
        Ok(column)
    }
}

pub struct Dataset {
    /// `(n_samples, N_FEATURES)` in the canonical feature order.
    pub features: DMatrix<f64>,

    /// Prices in thousands of dollars.
    pub labels: DVector<f64>,
}

/// Generates the dataset, the same seed always gives the same dataset.
#[instrument(level = "info")]
pub fn generate(n_samples: usize, seed: u64) -> Result<Dataset> {
    let mut rng = StdRng::seed_from_u64(seed);

    let columns = SAMPLERS
        .iter()
        .map(|sampler| sampler.sample_column(&mut rng, n_samples))
        .collect::<Result<Vec<_>>>()?;
    let features = DMatrix::from_fn(n_samples, N_FEATURES, |i, j| columns[j][i]);

    let noise = Normal::new(0.0, NOISE_STD_DEV)?;
    let labels = DVector::from_iterator(
        n_samples,
        features.row_iter().map(|row| {
            let price = BASE_PRICE
                + row.iter().zip(WEIGHTS).map(|(xi, wi)| xi * wi).sum::<f64>()
                + noise.sample(&mut rng);
            price.max(MIN_PRICE)
        }),
    );

    Ok(Dataset { features, labels })
}

/// Fits the sample model on a freshly generated dataset.
pub fn fit_sample_model(n_samples: usize, seed: u64) -> Result<(LinearRegression, f64)> {
    let dataset = generate(n_samples, seed)?;
    let mut model = LinearRegression::new();
    model.fit(&dataset.features, &dataset.labels)?;
    let score = model.score(&dataset.features, &dataset.labels)?;
    Ok((model, score))
}

pub fn run(opts: &CreateSampleModelOpts) -> Result {
    let start_instant = Instant::now();

    let (model, score) = fit_sample_model(opts.n_samples, opts.seed)?;
    let sample_prediction = model
        .predict(&[REFERENCE_HOUSE.as_slice()])?
        .first()
        .copied()
        .ok_or_else(|| anyhow!("no prediction for the reference house"))?;
    model::save(&model, &opts.output)?;

    info!(
        path = %opts.output.display(),
        n_samples = opts.n_samples,
        r2 = score,
        sample_price = %format!("${:.2}", sample_prediction * 1000.0),
        elapsed = ?start_instant.elapsed(),
        "sample model saved",
    );
    Ok(())
}
