//! HTTP server for the order workflow
//!
//! `ServerBuilder` wires the configuration, the session store and the
//! credential verifier into a `ServerHost`; the REST exposure turns the host
//! into an Axum router.

pub mod builder;
pub mod exposure;
pub mod handlers;
pub mod host;
pub mod router;

pub use builder::ServerBuilder;
pub use handlers::AppState;
pub use host::ServerHost;
