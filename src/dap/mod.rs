//! Client-side surface of the Debug Adapter Protocol.
//!
//! The adapter is an external process; messages travel over its stdio with
//! Content-Length framing. [`client::DebugSession`] exposes blocking
//! request/response calls plus an event stream consumed by the application
//! loop.

pub mod client;
pub mod transport;
pub mod types;

pub use client::{DebugSession, RequestError};
pub use types::Event;
