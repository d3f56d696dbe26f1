//! HTTP transport for the Consoleport command bridge.
//!
//! `GET /commands` lists the commands the caller may see and
//! `POST /commands/{command}` runs one. Callers identify themselves with a
//! bearer token mapped to abilities in the configuration.

pub mod errors;
pub mod http;
pub mod render;

pub use errors::ApiError;
pub use http::{BridgeHttpServer, DEFAULT_BIND_ADDRESS, RunningBridgeHttpServer, resolve_bind_address};
pub use render::render_listing;
