/*!
Request dispatch.

Every path goes through one fallback handler that matches on the path suffix,
so the harness may mount the adapter under any prefix. GET and POST behave
the same; OPTIONS answers an empty 200.
*/

use std::sync::atomic::Ordering;

use atta::{Atta, PlatformAdapter, StartOutcome};
use axum::{
  body::Bytes,
  extract::State,
  http::{header, Method, StatusCode, Uri},
  response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::Value;

use crate::server::AppState;
use crate::wire::{
  assertion_parts, to_pretty_json, ControlStatus, Params, StartResponse, StatusResponse,
  TestResponse, NOT_ENABLED_TEXT, TIMEOUT_TEXT,
};

/// Control requests, in the order their suffixes are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
  StopListen,
  StartListen,
  Start,
  Test,
  End,
}

impl Route {
  const ALL: [Self; 5] = [
    Self::StopListen,
    Self::StartListen,
    Self::Start,
    Self::Test,
    Self::End,
  ];

  const fn suffix(self) -> &'static str {
    match self {
      Self::StopListen => "stoplisten",
      Self::StartListen => "startlisten",
      Self::Start => "start",
      Self::Test => "test",
      Self::End => "end",
    }
  }

  fn from_path(path: &str) -> Option<Self> {
    Self::ALL
      .into_iter()
      .find(|route| path.ends_with(route.suffix()))
  }
}

pub(crate) async fn dispatch<P: PlatformAdapter>(
  State(state): State<AppState<P>>,
  method: Method,
  uri: Uri,
  body: Bytes,
) -> Response {
  if method == Method::OPTIONS {
    return StatusCode::OK.into_response();
  }

  let path = uri.path();
  log::debug!("[http] {method} {path}");
  match Route::from_path(path) {
    Some(Route::Start) => start(&state, &body).await,
    Some(Route::StartListen) => start_listen(&state, &body).await,
    Some(Route::Test) => run_tests(&state, &body).await,
    Some(Route::StopListen) => stop_listen(&state).await,
    Some(Route::End) => end(&state).await,
    None => {
      log::warn!("[http] Unhandled path {path}");
      (
        StatusCode::BAD_REQUEST,
        [(header::CONTENT_TYPE, "text/plain")],
        format!("UNHANDLED PATH: {path}\n"),
      )
        .into_response()
    }
  }
}

async fn start<P: PlatformAdapter>(state: &AppState<P>, body: &[u8]) -> Response {
  let mut params = Params::parse(body);
  let name = params.take::<String>("test");
  let url = params.take::<String>("url");
  let (Some(name), Some(url)) = (name, url) else {
    return json(StatusCode::OK, &StatusResponse::error(params.error()));
  };
  log::info!("[http] Starting '{name}' ({url})");
  let outcome = blocking(&state.atta, move |atta| atta.start_test(&name, &url)).await;

  match outcome {
    Some(StartOutcome::Ready) => {
      spawn_watchdog(state);
      let body = StartResponse {
        info: state.atta.info(),
        status: ControlStatus::Ready,
        status_text: String::new(),
      };
      json(StatusCode::OK, &body)
    }
    Some(StartOutcome::TimedOut) => {
      log::error!("[http] {TIMEOUT_TEXT}");
      let body = StartResponse {
        info: state.atta.info(),
        status: ControlStatus::Error,
        status_text: TIMEOUT_TEXT.to_owned(),
      };
      json(StatusCode::INTERNAL_SERVER_ERROR, &body)
    }
    Some(StartOutcome::NotEnabled) => {
      json(StatusCode::OK, &StatusResponse::error(NOT_ENABLED_TEXT))
    }
    None => internal_error(),
  }
}

async fn start_listen<P: PlatformAdapter>(state: &AppState<P>, body: &[u8]) -> Response {
  let mut params = Params::parse(body);
  let Some(events) = params.take::<Vec<String>>("events") else {
    return json(StatusCode::OK, &StatusResponse::error(params.error()));
  };

  match blocking(&state.atta, move |atta| atta.start_listen(&events)).await {
    Some(Ok(_)) => json(StatusCode::OK, &StatusResponse::new(ControlStatus::Ready)),
    Some(Err(e)) => json(StatusCode::OK, &StatusResponse::error(e.status_message())),
    None => internal_error(),
  }
}

async fn run_tests<P: PlatformAdapter>(state: &AppState<P>, body: &[u8]) -> Response {
  state.runs.fetch_add(1, Ordering::SeqCst);

  let mut params = Params::parse(body);
  let title = params.take::<String>("title").unwrap_or_default();
  let id = params.take::<String>("id").unwrap_or_default();
  let data = assertion_parts(params.take::<Vec<Vec<Value>>>("data").unwrap_or_default());
  log::debug!("[http] Running '{title}' on '{id}' ({} assertions)", data.len());

  let Some(outcome) = blocking(&state.atta, move |atta| atta.run_tests(&id, &data)).await else {
    return internal_error();
  };
  let status_text = if outcome.results.is_empty() {
    params.error()
  } else {
    String::new()
  };
  json(
    StatusCode::OK,
    &TestResponse {
      outcome,
      status_text,
    },
  )
}

async fn stop_listen<P: PlatformAdapter>(state: &AppState<P>) -> Response {
  match blocking(&state.atta, Atta::stop_listen).await {
    Some(()) => json(StatusCode::OK, &StatusResponse::new(ControlStatus::Ready)),
    None => internal_error(),
  }
}

async fn end<P: PlatformAdapter>(state: &AppState<P>) -> Response {
  match blocking(&state.atta, Atta::end_test_run).await {
    Some(()) => json(StatusCode::OK, &StatusResponse::new(ControlStatus::Done)),
    None => internal_error(),
  }
}

/// Run adapter work off the async workers. `None` if the task panicked.
async fn blocking<P, T, F>(atta: &Atta<P>, f: F) -> Option<T>
where
  P: PlatformAdapter,
  T: Send + 'static,
  F: FnOnce(&Atta<P>) -> T + Send + 'static,
{
  let atta = atta.clone();
  match tokio::task::spawn_blocking(move || f(&atta)).await {
    Ok(value) => Some(value),
    Err(e) => {
      log::error!("[http] Adapter task failed: {e}");
      None
    }
  }
}

/// Log an error if no `test` request follows a successful `start` in time.
fn spawn_watchdog<P: PlatformAdapter>(state: &AppState<P>) {
  let runs = state.runs.clone();
  let seen = runs.load(Ordering::SeqCst);
  let timeout = state.config.run_timeout;
  tokio::spawn(async move {
    tokio::time::sleep(timeout).await;
    if runs.load(Ordering::SeqCst) == seen {
      log::error!("[http] 'test' request not received from harness");
    }
  });
}

fn json<T: Serialize>(status: StatusCode, body: &T) -> Response {
  match to_pretty_json(body) {
    Ok(text) => (status, [(header::CONTENT_TYPE, "application/json")], text).into_response(),
    Err(e) => {
      log::error!("[http] Failed to encode response: {e}");
      internal_error()
    }
  }
}

fn internal_error() -> Response {
  (
    StatusCode::INTERNAL_SERVER_ERROR,
    [(header::CONTENT_TYPE, "text/plain")],
    "Internal error: request failed\n",
  )
    .into_response()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn suffixes_match_in_order() {
    assert_eq!(Route::from_path("/stoplisten"), Some(Route::StopListen));
    assert_eq!(Route::from_path("/atta/startlisten"), Some(Route::StartListen));
    assert_eq!(Route::from_path("/start"), Some(Route::Start));
    assert_eq!(Route::from_path("/atta/test"), Some(Route::Test));
    assert_eq!(Route::from_path("/end"), Some(Route::End));
    assert_eq!(Route::from_path("/bogus"), None);
    assert_eq!(Route::from_path("/"), None);
  }
}
