//! CLI options.

use std::path::PathBuf;

use clap::{Args, Parser};

use crate::model::Fallback;

pub mod parsers;

#[derive(Parser)]
#[command(author, version, about)]
pub struct Opts {
    /// Sentry DSN
    #[arg(long, env = "SENTRY_DSN")]
    pub sentry_dsn: Option<String>,

    /// Sentry performance monitoring sample rate
    #[arg(
        long,
        env = "SENTRY_TRACES_SAMPLE_RATE",
        default_value = "0",
        value_parser = parsers::sample_rate,
    )]
    pub traces_sample_rate: f32,

    #[command(subcommand)]
    pub subcommand: Subcommand,
}

#[derive(clap::Subcommand)]
pub enum Subcommand {
    Web(WebOpts),
    CreateSampleModel(CreateSampleModelOpts),
}

/// Runs the prediction API
#[derive(Args)]
pub struct WebOpts {
    /// Web application bind host
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Web application bind port
    #[arg(short, long, env = "PORT", default_value = "5000")]
    pub port: u16,

    #[command(flatten)]
    pub model: ModelOpts,
}

#[derive(Args)]
pub struct ModelOpts {
    /// Persisted model artifact
    #[arg(long = "model-path", env = "MODEL_PATH", default_value = "house_price_model.pkl")]
    pub path: PathBuf,

    /// What to serve when the artifact cannot be loaded
    #[arg(long, env = "MODEL_FALLBACK", value_enum, default_value_t = Fallback::Placeholder)]
    pub fallback: Fallback,
}

/// Fits a sample model on a synthetic dataset and saves it
#[derive(Args)]
pub struct CreateSampleModelOpts {
    /// Output artifact path
    #[arg(short, long, default_value = "house_price_model.pkl")]
    pub output: PathBuf,

    /// Random generator seed
    #[arg(long, default_value = "42")]
    pub seed: u64,

    /// Number of synthetic houses
    #[arg(long, default_value = "506", value_parser = parsers::non_zero_usize)]
    pub n_samples: usize,
}
