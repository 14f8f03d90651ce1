//! Inbound transports.

pub mod http;

pub use http::{router, HttpTransport, ServerState};
