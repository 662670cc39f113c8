/*!
Router construction and server lifecycle.
*/

use std::future::Future;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use std::time::Duration;

use atta::{Atta, PlatformAdapter};
use axum::http::{header, HeaderName, HeaderValue};
use axum::Router;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::handlers::dispatch;

/// Port the harness expects by default.
pub const DEFAULT_PORT: u16 = 4119;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Headers every response carries.
const RESPONSE_HEADERS: [(HeaderName, &str); 5] = [
  (header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"),
  (header::ACCESS_CONTROL_ALLOW_METHODS, "POST"),
  (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
  (header::ACCESS_CONTROL_EXPOSE_HEADERS, "Allow, Content-Type"),
  (header::ALLOW, "POST"),
];

/// Server settings. How long `start` waits for a document is adapter
/// configuration (`AttaConfig::ready_timeout`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
  pub host: String,
  pub port: u16,
  /// How long after a successful `start` a `test` request is expected.
  pub run_timeout: Duration,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host: "localhost".to_owned(),
      port: DEFAULT_PORT,
      run_timeout: DEFAULT_TIMEOUT,
    }
  }
}

impl ServerConfig {
  /// `host:port`, as bound.
  pub fn addr(&self) -> String {
    format!("{}:{}", self.host, self.port)
  }
}

/// Shared by every request.
pub(crate) struct AppState<P: PlatformAdapter> {
  pub(crate) atta: Atta<P>,
  pub(crate) config: ServerConfig,
  /// `test` requests received so far; the run watchdog compares against it.
  pub(crate) runs: Arc<AtomicU64>,
}

impl<P: PlatformAdapter> Clone for AppState<P> {
  fn clone(&self) -> Self {
    Self {
      atta: self.atta.clone(),
      config: self.config.clone(),
      runs: Arc::clone(&self.runs),
    }
  }
}

/// Router serving the control surface for `atta`.
pub fn router<P: PlatformAdapter>(atta: Atta<P>, config: &ServerConfig) -> Router {
  let state = AppState {
    atta,
    config: config.clone(),
    runs: Arc::new(AtomicU64::new(0)),
  };

  RESPONSE_HEADERS.into_iter().fold(
    Router::new().fallback(dispatch::<P>).with_state(state),
    |router, (name, value)| {
      router.layer(SetResponseHeaderLayer::overriding(
        name,
        HeaderValue::from_static(value),
      ))
    },
  )
}

/// Serve until `shutdown` resolves.
///
/// Listeners are deregistered before the server stops accepting connections;
/// in-flight requests are then allowed to finish.
pub async fn serve<P, F>(atta: Atta<P>, config: ServerConfig, shutdown: F) -> std::io::Result<()>
where
  P: PlatformAdapter,
  F: Future<Output = ()> + Send + 'static,
{
  let listener = tokio::net::TcpListener::bind(config.addr()).await?;
  log::info!("[http] Listening on http://{}", listener.local_addr()?);

  let app = router(atta.clone(), &config);
  let signal = async move {
    shutdown.await;
    log::info!("[http] Shutting down");
    if let Err(e) = tokio::task::spawn_blocking(move || atta.shutdown()).await {
      log::error!("[http] Listener cleanup failed: {e}");
    }
  };
  axum::serve(listener, app).with_graceful_shutdown(signal).await
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults() {
    let config = ServerConfig::default();
    assert_eq!(config.addr(), "localhost:4119");
    assert_eq!(config.run_timeout, Duration::from_secs(5));
  }
}
