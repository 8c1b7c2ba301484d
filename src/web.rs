use std::net::IpAddr;
use std::str::FromStr;

use poem::listener::TcpListener;
use poem::middleware::{CatchPanic, Cors, Tracing};
use poem::{get, post, Endpoint, EndpointExt, Route, Server};

use crate::model;
use crate::opts::WebOpts;
use crate::prelude::*;
use crate::service::ServiceContext;
use crate::web::middleware::{ErrorMiddleware, SentryMiddleware};

mod middleware;
mod models;
mod views;

pub async fn run(opts: WebOpts) -> Result {
    sentry::configure_scope(|scope| scope.set_tag("app", "web"));

    let provided = model::provide(&opts.model.path, opts.model.fallback)?;
    let context = ServiceContext::from(provided);
    info!(host = opts.host.as_str(), port = opts.port, source = ?context.source(), "listening…");

    Server::new(TcpListener::bind((IpAddr::from_str(&opts.host)?, opts.port)))
        .run_with_graceful_shutdown(
            create_app(context),
            async {
                let _ = tokio::signal::ctrl_c().await;
                info!("shutting down…");
            },
            None,
        )
        .await?;
    Ok(())
}

pub fn create_app(context: ServiceContext) -> impl Endpoint {
    Route::new()
        .at("/", get(views::index::get_index))
        .at("/api/predict", post(views::api::post_predict))
        .at("/api/health", get(views::api::get_health))
        .data(context)
        .with(Tracing)
        .with(CatchPanic::new())
        .with(ErrorMiddleware)
        .with(Cors::new())
        .with(SentryMiddleware)
}
