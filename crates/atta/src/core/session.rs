/*!
Test-control operations.

```text
disabled -> enabled -> ready -> running
              ^          |
              +----------+  new test announced / document replaced / end
```

Readiness is recomputed whenever a test is announced or a document loads, and
waiters are woken through a condvar rather than polling.
*/

use std::mem;
use std::time::{Duration, Instant};

use super::handlers::listener;
use super::results::{test_file, Tone};
use super::{Atta, Shared};
use crate::a11y::EventType;
use crate::assertion::{Evaluation, Evaluator};
use crate::platform::{ListenerKind, PlatformAdapter};
use crate::types::{AttaError, AttaResult, PlatformEvent, RunOutcome, StartOutcome, TestStatus};

type Handler<P> = fn(&Shared<P>, PlatformEvent<<P as PlatformAdapter>::Node>);

/// The test the harness announced and is waiting to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTest {
  /// Test title as the harness announced it.
  pub name: String,
  /// Readiness requires the loaded document's URI to equal this exactly.
  pub url: String,
}

impl<P: PlatformAdapter> Atta<P> {
  /// Register the document listeners: load-complete plus the rescan triggers.
  ///
  /// Fails when the adapter is disabled, when an extra document event has no
  /// name in the event table, or when the platform refuses a registration.
  /// A refused registration drops the listeners added before it, so `start`
  /// can be retried. Calling it again after success does nothing.
  pub fn start(&self) -> AttaResult<()> {
    if !self.inner.enabled {
      return Err(AttaError::NotEnabled);
    }
    let platform = &self.inner.platform;
    let load_complete = platform.load_complete_event();

    let mut triggers = platform.document_events();
    for extra in &self.inner.config.extra_document_events {
      if extra.name().is_none() {
        return Err(AttaError::UnmappedEventCode(*extra));
      }
      if !triggers.contains(extra) {
        triggers.push(*extra);
      }
    }
    triggers.retain(|event| *event != load_complete);

    let mut registered = self.inner.document_listeners.lock();
    if !registered.is_empty() {
      return Ok(());
    }

    let mut handlers: Vec<(EventType, Handler<P>)> = Vec::with_capacity(triggers.len() + 1);
    handlers.push((load_complete, Shared::on_load_complete));
    for event in triggers {
      handlers.push((event, Shared::on_document_event));
    }

    let mut added = Vec::with_capacity(handlers.len());
    for (event, handler) in handlers {
      let callback = listener(&self.inner, handler);
      if let Err(e) = platform.register_listener(event, ListenerKind::Document, callback) {
        log::error!("[session] Could not listen for {event}: {e}");
        for event in added {
          if let Err(e) = platform.deregister_listener(event, ListenerKind::Document) {
            log::warn!("[session] Could not drop the {event} listener: {e}");
          }
        }
        return Err(e);
      }
      added.push(event);
    }
    *registered = added;

    log::info!(
      "[session] {} listening for {} document events",
      self.inner.config.name,
      registered.len()
    );
    Ok(())
  }

  /// Announce the next test. Clears readiness, then recomputes it against the
  /// current snapshot.
  pub fn start_test_run(&self, name: &str, url: &str) {
    log::debug!("[session] Waiting for '{name}' ({url})");
    let mut session = self.inner.session.lock();
    session.pending = Some(PendingTest {
      name: name.to_owned(),
      url: url.to_owned(),
    });
    session.ready = false;
    self.inner.refresh_ready(&mut session);
    drop(session);
    self.inner.ready_changed.notify_all();
  }

  /// Whether the announced test's document is the current snapshot.
  pub fn is_ready(&self) -> bool {
    let mut session = self.inner.session.lock();
    self.inner.refresh_ready(&mut session);
    session.ready
  }

  /// Block until ready or until `timeout` elapses. Returns the final readiness.
  pub fn wait_until_ready(&self, timeout: Duration) -> bool {
    if !self.inner.enabled {
      return false;
    }
    let deadline = Instant::now() + timeout;
    let mut session = self.inner.session.lock();
    loop {
      self.inner.refresh_ready(&mut session);
      if session.ready {
        return true;
      }
      if self
        .inner
        .ready_changed
        .wait_until(&mut session, deadline)
        .timed_out()
      {
        self.inner.refresh_ready(&mut session);
        return session.ready;
      }
    }
  }

  /// Announce a test and wait up to the configured timeout for its document.
  pub fn start_test(&self, name: &str, url: &str) -> StartOutcome {
    if !self.inner.enabled {
      return StartOutcome::NotEnabled;
    }
    self.start_test_run(name, url);
    if self.wait_until_ready(self.inner.config.ready_timeout) {
      StartOutcome::Ready
    } else {
      StartOutcome::TimedOut
    }
  }

  /// Monitor `names` for event assertions, replacing any previous set and
  /// clearing the history. Unknown names are logged and skipped.
  ///
  /// Returns the event types now monitored.
  pub fn start_listen(&self, names: &[String]) -> AttaResult<Vec<EventType>> {
    if !self.inner.enabled {
      return Err(AttaError::NotEnabled);
    }
    self.stop_listen();

    let mut monitored = Vec::new();
    for name in names {
      let Some(event) = EventType::from_name(name) else {
        log::warn!("[events] {}", AttaError::UnknownEventType(name.clone()));
        continue;
      };
      if monitored.contains(&event) {
        continue;
      }
      let callback = listener(&self.inner, Shared::on_test_event);
      match self
        .inner
        .platform
        .register_listener(event, ListenerKind::Test, callback)
      {
        Ok(()) => monitored.push(event),
        Err(e) => log::warn!("[events] Could not listen for {name}: {e}"),
      }
    }

    log::debug!("[events] Monitoring {} event types", monitored.len());
    let mut events = self.inner.events.lock();
    events.monitored.clone_from(&monitored);
    events.history.clear();
    Ok(monitored)
  }

  /// Stop monitoring test events and clear the history.
  pub fn stop_listen(&self) {
    let monitored = {
      let mut events = self.inner.events.lock();
      events.history.clear();
      mem::take(&mut events.monitored)
    };
    for event in monitored {
      if let Err(e) = self
        .inner
        .platform
        .deregister_listener(event, ListenerKind::Test)
      {
        log::warn!("[events] Could not stop listening for {event}: {e}");
      }
    }
  }

  /// Evaluate a batch of assertion tuples against element `id`.
  ///
  /// Refused as a whole when the adapter is disabled or not ready, or when the
  /// element is not in the snapshot. Otherwise one result per tuple, in order,
  /// all evaluated against the same snapshot.
  pub fn run_tests(&self, id: &str, assertions: &[Vec<String>]) -> RunOutcome {
    if !self.inner.enabled {
      return RunOutcome::refused(&AttaError::NotEnabled);
    }

    let pending = {
      let mut session = self.inner.session.lock();
      self.inner.refresh_ready(&mut session);
      match (&session.pending, session.ready) {
        (Some(pending), true) => pending.clone(),
        _ => return RunOutcome::refused(&AttaError::NotReady),
      }
    };

    let document = match self.current_document() {
      Some(document) if document.uri() == pending.url => document,
      _ => return RunOutcome::refused(&AttaError::NotReady),
    };
    let Some(element) = document.element(id) else {
      log::warn!("[session] No test element '{id}' in {}", document.uri());
      return RunOutcome::refused(&AttaError::ElementNotFound);
    };

    let evaluator = Evaluator {
      platform: &self.inner.platform,
      properties: &self.inner.properties,
      document: &document,
      known_issues: &*self.inner.known_issues,
      test_name: &pending.name,
    };
    let file = test_file(&pending.url);

    let results = assertions
      .iter()
      .map(|parts| {
        let evaluation = evaluator.evaluate(element, parts);
        self.record(&parts.join(" "), &file, &evaluation);
        evaluation.result
      })
      .collect();
    RunOutcome::ok(results)
  }

  /// Forget the pending test and the current snapshot.
  pub fn end_test_run(&self) {
    let mut session = self.inner.session.lock();
    if let Some(pending) = session.pending.take() {
      log::debug!("[session] Ending '{}'", pending.name);
    }
    session.ready = false;
    *self.inner.document.write() = None;
  }

  /// Deregister every listener this adapter registered. Failures are logged.
  pub fn shutdown(&self) {
    self.stop_listen();
    let registered = mem::take(&mut *self.inner.document_listeners.lock());
    for event in registered {
      if let Err(e) = self
        .inner
        .platform
        .deregister_listener(event, ListenerKind::Document)
      {
        log::warn!("[session] Could not deregister {event}: {e}");
      }
    }
    log::info!("[session] Listeners removed");
  }

  fn record(&self, text: &str, file: &str, evaluation: &Evaluation) {
    let status = evaluation.status();
    let key = evaluation
      .bug
      .clone()
      .unwrap_or_else(|| status.to_string());
    self.inner.results.lock().record(&key, file, text);

    let tone = Tone::for_result(
      self.inner.config.ansi_formatting,
      status,
      evaluation.bug.is_some(),
      evaluation.valid,
    );
    let line = tone.paint(format!("{text} {}", evaluation.result.message).trim_end());
    if status == TestStatus::Pass {
      log::info!("{line}");
    } else {
      log::warn!("{line}");
    }
  }
}
