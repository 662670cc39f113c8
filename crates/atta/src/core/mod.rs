/*!
Core adapter instance - owns the session, the document snapshot and results.

# Module Structure

- `mod.rs` - Atta struct, builder, construction
- `session.rs` - test-control operations (start, listen, run, end)
- `handlers.rs` - platform event callbacks (load-complete, rescans, test events)
- `known_issues.rs` - pluggable bug lookup for failures
- `results.rs` - results-by-status table and result-line colouring

# Locking

Lock order is `session` before `document`. Platform calls never happen under
`session`; snapshots are built with no lock held and swapped in whole.
*/

mod handlers;
mod known_issues;
mod results;
mod session;

pub use known_issues::{IssueQuery, IssueRule, IssueRules, KnownIssues, NoKnownIssues};
pub use results::ResultsTable;
pub use session::PendingTest;

use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Condvar, Mutex, RwLock};

use crate::a11y::EventType;
use crate::assertion::PropertyTable;
use crate::platform::PlatformAdapter;
use crate::types::{AccessibleDocument, AdapterInfo, EventRecord};

const DEFAULT_READY_TIMEOUT: Duration = Duration::from_secs(5);

/// Adapter settings fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttaConfig {
  /// Reported as `ATTAname`.
  pub name: String,
  /// Reported as `ATTAversion`.
  pub version: String,
  /// How long `start` waits for the announced document. Default: 5s.
  pub ready_timeout: Duration,
  /// Colour result lines with ANSI escapes.
  pub ansi_formatting: bool,
  /// Rescan triggers added to the platform's defaults.
  pub extra_document_events: Vec<EventType>,
}

impl Default for AttaConfig {
  fn default() -> Self {
    Self {
      name: "ATTA for IA2".to_owned(),
      version: env!("CARGO_PKG_VERSION").to_owned(),
      ready_timeout: DEFAULT_READY_TIMEOUT,
      ansi_formatting: false,
      extra_document_events: Vec::new(),
    }
  }
}

/// Builder for configuring an [`Atta`] instance.
///
/// # Example
///
/// ```ignore
/// let atta = AttaBuilder::new()
///     .name("ATTA for IA2")
///     .ansi_formatting(true)
///     .known_issues(IssueRules::load(path)?)
///     .build(platform);
/// ```
#[must_use = "Builder does nothing until .build() is called"]
pub struct AttaBuilder {
  config: AttaConfig,
  known_issues: Box<dyn KnownIssues>,
}

impl std::fmt::Debug for AttaBuilder {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("AttaBuilder")
      .field("config", &self.config)
      .finish_non_exhaustive()
  }
}

impl Default for AttaBuilder {
  fn default() -> Self {
    Self {
      config: AttaConfig::default(),
      known_issues: Box::new(NoKnownIssues),
    }
  }
}

impl AttaBuilder {
  /// Builder with default settings and no known issues.
  pub fn new() -> Self {
    Self::default()
  }

  /// Adapter name reported to the harness.
  pub fn name(mut self, name: &str) -> Self {
    self.config.name = name.to_owned();
    self
  }

  /// Adapter version reported to the harness.
  pub fn version(mut self, version: &str) -> Self {
    self.config.version = version.to_owned();
    self
  }

  /// How long `start` waits for the test document. Default: 5s.
  pub const fn ready_timeout(mut self, timeout: Duration) -> Self {
    self.config.ready_timeout = timeout;
    self
  }

  /// Colour result lines. Default: false.
  pub const fn ansi_formatting(mut self, enabled: bool) -> Self {
    self.config.ansi_formatting = enabled;
    self
  }

  /// Also rescan test elements when `event` is first seen.
  pub fn document_event(mut self, event: EventType) -> Self {
    self.config.extra_document_events.push(event);
    self
  }

  /// Where failures look up bug references. Default: none are known.
  pub fn known_issues(mut self, source: impl KnownIssues + 'static) -> Self {
    self.known_issues = Box::new(source);
    self
  }

  /// Build the adapter over `platform`.
  ///
  /// If platform accessibility is off, one attempt is made to switch it on; when
  /// that fails the adapter is built disabled and refuses every test operation.
  pub fn build<P: PlatformAdapter>(self, platform: P) -> Atta<P> {
    Atta::create(self.config, self.known_issues, platform)
  }
}

/// The adapter: one session over one platform.
///
/// Clone is cheap (Arc bump) - the HTTP layer and platform callbacks share it.
pub struct Atta<P: PlatformAdapter> {
  inner: Arc<Shared<P>>,
}

impl<P: PlatformAdapter> Clone for Atta<P> {
  fn clone(&self) -> Self {
    Self {
      inner: Arc::clone(&self.inner),
    }
  }
}

impl<P: PlatformAdapter> std::fmt::Debug for Atta<P> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Atta")
      .field("name", &self.inner.config.name)
      .field("enabled", &self.inner.enabled)
      .finish_non_exhaustive()
  }
}

/// State shared between the HTTP side and platform callbacks.
pub(crate) struct Shared<P: PlatformAdapter> {
  platform: P,
  config: AttaConfig,
  properties: PropertyTable<P::Node>,
  known_issues: Box<dyn KnownIssues>,
  enabled: bool,
  session: Mutex<SessionState>,
  ready_changed: Condvar,
  /// Current snapshot. Replaced whole, never mutated in place.
  document: RwLock<Option<Arc<AccessibleDocument<P::Node>>>>,
  /// Load-completes seen so far. Only changes under the `document` write lock.
  document_loads: AtomicU64,
  /// Event types with a registered document listener.
  document_listeners: Mutex<Vec<EventType>>,
  events: Mutex<EventState<P::Node>>,
  results: Mutex<ResultsTable>,
}

#[derive(Debug, Default)]
struct SessionState {
  pending: Option<PendingTest>,
  ready: bool,
}

struct EventState<N> {
  monitored: Vec<EventType>,
  history: Vec<EventRecord<N>>,
}

impl<P: PlatformAdapter> Atta<P> {
  /// Adapter with default settings. Use [`AttaBuilder`] to configure one.
  pub fn new(platform: P) -> Self {
    AttaBuilder::new().build(platform)
  }

  fn create(config: AttaConfig, known_issues: Box<dyn KnownIssues>, platform: P) -> Self {
    let enabled = platform.accessibility_enabled() || {
      log::info!("[session] Accessibility is off; trying to enable it");
      platform.enable_accessibility()
    };
    if !enabled {
      log::error!("[session] Accessibility could not be enabled");
    }

    Self {
      inner: Arc::new(Shared {
        properties: platform.property_table(),
        platform,
        config,
        known_issues,
        enabled,
        session: Mutex::new(SessionState::default()),
        ready_changed: Condvar::new(),
        document: RwLock::new(None),
        document_loads: AtomicU64::new(0),
        document_listeners: Mutex::new(Vec::new()),
        events: Mutex::new(EventState {
          monitored: Vec::new(),
          history: Vec::new(),
        }),
        results: Mutex::new(ResultsTable::new()),
      }),
    }
  }

  /// Identity merged into `start` responses.
  pub fn info(&self) -> AdapterInfo {
    AdapterInfo {
      atta_name: self.inner.config.name.clone(),
      atta_version: self.inner.config.version.clone(),
      api: self.inner.platform.api_name().to_owned(),
      api_version: self.inner.platform.api_version(),
    }
  }

  /// Whether platform accessibility is available.
  pub fn is_enabled(&self) -> bool {
    self.inner.enabled
  }

  /// Settings fixed at construction.
  pub fn config(&self) -> &AttaConfig {
    &self.inner.config
  }

  /// The platform this adapter drives.
  pub fn platform(&self) -> &P {
    &self.inner.platform
  }

  /// Current document snapshot, if one has loaded.
  pub fn current_document(&self) -> Option<Arc<AccessibleDocument<P::Node>>> {
    self.inner.document.read().clone()
  }

  /// Events recorded since the last `start_listen`.
  pub fn event_history(&self) -> Vec<EventRecord<P::Node>> {
    self.inner.events.lock().history.clone()
  }

  /// Event types currently monitored for the test.
  pub fn monitored_events(&self) -> Vec<EventType> {
    self.inner.events.lock().monitored.clone()
  }

  /// Copy of the results table.
  pub fn results(&self) -> ResultsTable {
    self.inner.results.lock().clone()
  }

  /// The announced test, if any.
  pub fn pending_test(&self) -> Option<PendingTest> {
    self.inner.session.lock().pending.clone()
  }
}
