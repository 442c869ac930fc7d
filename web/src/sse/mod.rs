//! SSE HTTP handler for the web layer.
//!
//! This module contains only the Axum handler for the diagnostics stream.
//! The drain loop and frame types live in the `sse` crate; refer to it as
//! `::sse` here since this module shares its name.

pub mod handler;
