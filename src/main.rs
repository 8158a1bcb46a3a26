use std::sync::Arc;

use axum::{
  response::IntoResponse,
  routing::{get, post},
  Router,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod correction;
mod error;
mod extractor;
mod fetch;
mod metadata;
mod route;
mod youtube;

pub use error::{Error, Result};

use crate::{
  config::Config,
  extractor::Ytdlp,
  fetch::{fetch_urls, Fetcher},
  youtube::DataApi,
};

#[tokio::main]
async fn main() -> Result<()> {
  // a missing .env is fine, the environment may already be set
  dotenvy::dotenv().ok();

  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info")),
    )
    .init();

  let config = Config::from_env()?;

  let fetcher = Fetcher::new(
    DataApi::new(&config.api_key),
    Ytdlp::new(
      &config.ytdlp_path,
      config.ytdlp_proxy.clone(),
      config.ytdlp_concurrency,
    ),
    config.batch_mode,
  );

  info!(
    "Listening on {} (batch mode {:?})",
    config.listen_addr, config.batch_mode
  );

  axum::Server::bind(&config.listen_addr)
    .serve(app(Arc::new(fetcher)).into_make_service())
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(|e| Error::IO(std::io::Error::other(e)))?;

  Ok(())
}

fn app(fetcher: Arc<Fetcher>) -> Router {
  Router::new()
    .route("/health", get(health))
    .route("/fetch", post(fetch_urls))
    .with_state(fetcher)
}

async fn health() -> impl IntoResponse {
  "ok".to_owned()
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    warn!("failed to listen for ctrl-c: {}", e);
    std::future::pending::<()>().await;
  }
  info!("shutting down");
}
