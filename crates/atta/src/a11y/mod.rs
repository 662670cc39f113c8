/*!
Accessibility vocabulary shared by every platform adapter.

- `value.rs` - typed actual values returned by property getters and method calls
- `relation.rs` - relation types and their harness/platform names
- `event.rs` - fixed event-code table (MSAA `EVENT_*`, IA2 `IA2_EVENT_*`)
- `method.rs` - method signatures and argument coercion for `result` assertions
*/

mod event;
mod method;
mod relation;
mod value;

pub use event::EventType;
pub use method::{parse_call, MethodParam, MethodSignature, ParamType};
pub use relation::RelationType;
pub use value::{format_number, Value};
pub(crate) use value::NULL_MARKER;
