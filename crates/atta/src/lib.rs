/*!
ATTA - Accessible Technology Test Adapter core.

Bridges a conformance test harness and a platform accessibility API. The harness
announces a test, waits for the adapter to see the test document load, then sends
batches of assertions about elements in that document.

```ignore
use atta::{AttaBuilder, MemoryPlatform};

let platform = MemoryPlatform::new();
let atta = AttaBuilder::new().name("ATTA for IA2").build(platform);
atta.start()?;

atta.start_test_run("t1", "http://test/t1.html");
if atta.wait_until_ready(std::time::Duration::from_secs(5)) {
    let outcome = atta.run_tests("btn1", &[vec![
        "property".into(), "role".into(), "is".into(), "ROLE_SYSTEM_PUSHBUTTON".into(),
    ]]);
}
atta.end_test_run();
```
*/

mod assertion;
mod core;
mod platform;

pub mod a11y;

mod types;
pub use types::*;

pub use crate::assertion::{
  compare, Assertion, AssertionClass, Comparator, Comparison, Expected, PropertyGetter,
  PropertyTable,
};
pub use crate::core::{
  Atta, AttaBuilder, AttaConfig, IssueQuery, IssueRule, IssueRules, KnownIssues, NoKnownIssues,
  PendingTest, ResultsTable,
};
pub use crate::platform::{
  ElementAttributes, EventCallback, ListenerKind, MemoryNode, MemoryPlatform, MethodSpec,
  NodeSpec, PlatformAdapter,
};
