//! Server-Sent Events (SSE) stream of agent diagnostics.
//!
//! This crate turns the in-process [`events::EventQueue`] into a continuous
//! SSE byte stream for a diagnostics subscriber.
//!
//! # Architecture
//!
//! - **Destructive drain**: each pass removes everything queued and sends it;
//!   an event is delivered to whichever stream drains it first.
//! - **Flush-time stamping**: `ts` is attached when an event is written to the
//!   stream, not when it was emitted.
//! - **Event-driven idle wait**: an empty queue parks the loop until the next
//!   emit, with the poll interval (500 ms by default) as an upper bound.
//! - **Cooperative shutdown**: a shared [`Shutdown`] signal ends every open
//!   stream so the server can finish draining connections.
//!
//! # Frame format
//!
//! ```text
//! data: {"type":"step_message","payload":{"message":"hi"},"node":null,"ts":"2026-10-18T09:30:00.000000+00:00"}
//!
//! ```
//!
//! # Modules
//!
//! - `message`: flush-time serialization and the `Frame` wire type
//! - `shutdown`: process-wide stream cancellation signal
//! - `stream`: the drain/sleep loop producing frames

pub mod message;
pub mod shutdown;
pub mod stream;

pub use message::Frame;
pub use shutdown::Shutdown;
pub use stream::{event_stream, StreamOptions};
