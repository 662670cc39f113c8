/*! Core types for the adapter: snapshots, events, outcomes and errors. */

mod document;
mod element;
mod error;
mod event;
mod outcome;

pub use document::{AccessibleDocument, RESERVED_TEST_IDS};
pub use element::{AccessibleElement, ValueRange};
pub use error::{AttaError, AttaResult};
pub use event::{EventRecord, PlatformEvent};
pub use outcome::{AdapterInfo, RunOutcome, RunStatus, StartOutcome, TestResult, TestStatus};
