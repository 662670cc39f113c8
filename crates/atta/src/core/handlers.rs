/*!
Platform event callbacks.

Callbacks hold a `Weak` to the shared state, so a listener the platform forgets
to drop never keeps a shut-down adapter alive.

- load-complete: build a new snapshot with no lock held, swap it in, recompute readiness
- document events: first sighting of a name adds it and rescans test elements,
  retrying when a concurrent event for the same page swapped first
- test events: recorded in the history when the source is inside the document
*/

use std::sync::atomic::Ordering;
use std::sync::Arc;

use super::{SessionState, Shared};
use crate::platform::{EventCallback, PlatformAdapter};
use crate::types::{AccessibleDocument, AttaError, EventRecord, PlatformEvent};

/// Wrap a handler as a platform callback.
pub(super) fn listener<P: PlatformAdapter>(
  shared: &Arc<Shared<P>>,
  handler: fn(&Shared<P>, PlatformEvent<P::Node>),
) -> EventCallback<P::Node> {
  let weak = Arc::downgrade(shared);
  Arc::new(move |event| {
    if let Some(shared) = weak.upgrade() {
      handler(&shared, event);
    }
  })
}

impl<P: PlatformAdapter> Shared<P> {
  pub(super) fn on_load_complete(&self, event: PlatformEvent<P::Node>) {
    let document = AccessibleDocument::build(&self.platform, event.source);
    log::debug!(
      "[document] Loaded {} ({} test elements)",
      document.uri(),
      document.test_elements().len()
    );
    let mut slot = self.document.write();
    *slot = Some(Arc::new(document));
    self.document_loads.fetch_add(1, Ordering::Relaxed);
    drop(slot);

    let mut session = self.session.lock();
    session.ready = false;
    self.refresh_ready(&mut session);
    drop(session);
    self.ready_changed.notify_all();
  }

  pub(super) fn on_document_event(&self, event: PlatformEvent<P::Node>) {
    let Some(name) = event.event_type.name() else {
      log::error!("[events] {}", AttaError::UnmappedEventCode(event.event_type));
      return;
    };
    loop {
      let (loads, current) = {
        let slot = self.document.read();
        let Some(current) = slot.clone() else {
          return;
        };
        (self.document_loads.load(Ordering::Relaxed), current)
      };
      if current.observed_events().iter().any(|seen| seen == name) {
        return;
      }

      let mut updated = AccessibleDocument::clone(&current);
      if updated.add_event(name) {
        log::debug!("[events] First {name} in {}; rescanning", updated.uri());
        updated.rescan_test_elements(&self.platform);
      }

      let mut slot = self.document.write();
      if slot.as_ref().is_some_and(|doc| Arc::ptr_eq(doc, &current)) {
        *slot = Some(Arc::new(updated));
        return;
      }
      // A new page replaced the snapshot; its events start from scratch.
      if self.document_loads.load(Ordering::Relaxed) != loads {
        return;
      }
      // Another document event swapped first; add ours on top of it.
      log::debug!("[events] Snapshot changed during {name} rescan; retrying");
    }
  }

  pub(super) fn on_test_event(&self, event: PlatformEvent<P::Node>) {
    let Some(document) = self.document.read().clone() else {
      return;
    };
    if !self.is_within(document.root().node(), &event.source) {
      log::debug!("[events] Ignoring {} from outside the document", event.event_type);
      return;
    }
    let record = EventRecord::from(event);
    log::debug!("[events] Recorded {}", record.name);
    self.events.lock().history.push(record);
  }

  /// Recompute `ready`: a test is pending and the snapshot's URI is its URL.
  ///
  /// Lock order: the caller holds `session`; this takes `document`.
  pub(super) fn refresh_ready(&self, session: &mut SessionState) {
    let Some(pending) = &session.pending else {
      session.ready = false;
      return;
    };
    let ready = self.enabled
      && self
        .document
        .read()
        .as_ref()
        .is_some_and(|doc| doc.uri() == pending.url);
    if ready && !session.ready {
      log::info!("[session] Test is '{}' ({})", pending.name, pending.url);
    }
    session.ready = ready;
  }

  /// Whether `node` is `root` or has `root` as an ancestor.
  ///
  /// A parent that cannot be fetched ends the walk as "outside".
  fn is_within(&self, root: &P::Node, node: &P::Node) -> bool {
    let mut current = node.clone();
    loop {
      if &current == root {
        return true;
      }
      match self.platform.parent(&current) {
        Ok(Some(parent)) => current = parent,
        Ok(None) => return false,
        Err(e) => {
          log::debug!("[events] Parent lookup failed: {e}");
          return false;
        }
      }
    }
  }
}
