//! HTTP API.
//!
//! The router is composable: `app_router()` returns a `Router` that can be
//! mounted on any axum server instance. The assessment pipeline is
//! synchronous, so `/analyze` hands each request to a blocking worker.

pub mod endpoints;
pub mod error;
pub mod router;
pub mod server;
pub mod types;

pub use error::ApiError;
pub use router::app_router;
pub use server::{ctrl_c_signal, start_server, ApiServer, ServerSession};
pub use types::ApiContext;
