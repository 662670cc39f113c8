/*!
Platform layer.

- `traits.rs` - [`PlatformAdapter`], the only surface the core calls
- `memory.rs` - in-process node tree used by tests and fixture replay
*/

mod memory;
mod traits;

pub use memory::{MemoryNode, MemoryPlatform, MethodSpec, NodeSpec};
pub use traits::{ElementAttributes, EventCallback, ListenerKind, PlatformAdapter};
