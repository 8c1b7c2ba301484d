#![warn(clippy::all)]

use clap::Parser;

use crate::opts::{Opts, Subcommand};
use crate::prelude::*;

mod model;
mod opts;
mod prelude;
mod service;
mod synthetic;
mod tracing;
mod web;

#[tokio::main]
async fn main() -> Result {
    let opts = Opts::parse();
    let _sentry_guard = crate::tracing::init(opts.sentry_dsn, opts.traces_sample_rate)?;

    match opts.subcommand {
        Subcommand::Web(opts) => web::run(opts).await,
        Subcommand::CreateSampleModel(opts) => synthetic::run(&opts),
    }
}
