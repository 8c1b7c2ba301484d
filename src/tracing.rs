use std::borrow::Cow;

use sentry::integrations::tracing::EventFilter;
use sentry::{ClientInitGuard, ClientOptions};
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::prelude::*;

/// Directives for both layers unless overridden from the environment.
/// `poem` is kept at `info` for the per-request log lines.
const SENTRY_DIRECTIVES: &str = "house_price_api=debug,poem=info";
const FORMAT_DIRECTIVES: &str = "house_price_api=info,poem=info";

/// Initialises tracing: a Sentry layer and a plain `fmt` layer, each with its own filter.
pub fn init(sentry_dsn: Option<String>, traces_sample_rate: f32) -> Result<ClientInitGuard> {
    let guard = sentry::init((
        sentry_dsn,
        ClientOptions {
            release: Some(Cow::Borrowed(env!("CARGO_PKG_VERSION"))),
            traces_sample_rate,
            ..Default::default()
        },
    ));

    let sentry_layer = sentry::integrations::tracing::layer()
        .event_filter(|metadata| match *metadata.level() {
            Level::ERROR | Level::WARN => EventFilter::Event,
            _ => EventFilter::Breadcrumb,
        })
        .span_filter(|metadata| *metadata.level() <= Level::INFO)
        .with_filter(env_filter("HOUSE_PRICE_API_SENTRY_LOG", SENTRY_DIRECTIVES)?);

    // Timestamps come from the process supervisor.
    let format_layer = tracing_subscriber::fmt::layer()
        .without_time()
        .with_filter(env_filter("HOUSE_PRICE_API_LOG", FORMAT_DIRECTIVES)?);

    tracing_subscriber::Registry::default()
        .with(sentry_layer)
        .with(format_layer)
        .init();

    Ok(guard)
}

fn env_filter(variable: &str, default_directives: &str) -> Result<EnvFilter> {
    EnvFilter::try_from_env(variable)
        .or_else(|_| EnvFilter::try_new(default_directives))
        .with_context(|| format!("invalid log directives in `{}`", variable))
}
