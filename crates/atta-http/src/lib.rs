/*!
HTTP control surface for the Accessible Technology Test Adapter.

The harness drives the adapter with five requests, matched by path suffix:
`start`, `startlisten`, `test`, `stoplisten` and `end`. Bodies are JSON objects;
responses are pretty-printed JSON with sorted keys and permissive CORS headers.
*/

mod handlers;
mod server;
mod wire;

pub use server::{router, serve, ServerConfig, DEFAULT_PORT};
pub use wire::{
  ControlStatus, StartResponse, StatusResponse, TestResponse, NOT_ENABLED_TEXT, TIMEOUT_TEXT,
};
