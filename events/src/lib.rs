//! Agent observability events and the in-process queue that carries them.
//!
//! This crate provides the event model shared by producers (agent nodes, tool
//! calls, the diagnostics emit endpoint) and the queue that decouples those
//! producers from the SSE stream that consumes them.
//!
//! # Architecture
//!
//! - **AgentEvent**: a single immutable observability record
//! - **EventKind**: the open set of event type tags
//! - **EventQueue**: FIFO buffer with `emit` and a destructive, lazy `drain`
//!
//! Events carry no timestamp of their own; the stream stamps each event with
//! the moment it is flushed to a subscriber.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

pub mod queue;

pub use queue::{Drain, EventQueue};

/// Payload of an event: string keys to arbitrary JSON values. Opaque to the queue.
pub type Payload = Map<String, Value>;

/// Type tag identifying what kind of event occurred.
///
/// The named variants are the kinds emitted today. The set is open, any other
/// tag is carried through unchanged as `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventKind {
    NodeStarted,
    NodeFinished,
    ToolCalled,
    ToolError,
    TokenUsage,
    StepMessage,
    Other(String),
}

impl EventKind {
    pub fn as_str(&self) -> &str {
        match self {
            EventKind::NodeStarted => "node_started",
            EventKind::NodeFinished => "node_finished",
            EventKind::ToolCalled => "tool_called",
            EventKind::ToolError => "tool_error",
            EventKind::TokenUsage => "token_usage",
            EventKind::StepMessage => "step_message",
            EventKind::Other(tag) => tag,
        }
    }
}

impl From<String> for EventKind {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "node_started" => EventKind::NodeStarted,
            "node_finished" => EventKind::NodeFinished,
            "tool_called" => EventKind::ToolCalled,
            "tool_error" => EventKind::ToolError,
            "token_usage" => EventKind::TokenUsage,
            "step_message" => EventKind::StepMessage,
            _ => EventKind::Other(tag),
        }
    }
}

impl From<&str> for EventKind {
    fn from(tag: &str) -> Self {
        EventKind::from(tag.to_string())
    }
}

impl From<EventKind> for String {
    fn from(kind: EventKind) -> Self {
        match kind {
            EventKind::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single observability record.
///
/// Fields are private so an event cannot change after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentEvent {
    #[serde(rename = "type")]
    kind: EventKind,
    payload: Payload,
    /// Originating agent node, `None` for process-wide events.
    node: Option<String>,
}

impl AgentEvent {
    pub fn new(kind: impl Into<EventKind>, payload: Payload) -> Self {
        Self {
            kind: kind.into(),
            payload,
            node: None,
        }
    }

    pub fn with_node(mut self, node: impl Into<String>) -> Self {
        self.node = Some(node.into());
        self
    }

    /// Free-form progress message, the kind the diagnostics emit endpoint produces.
    pub fn step_message(message: impl Into<String>) -> Self {
        let mut payload = Payload::new();
        payload.insert("message".to_string(), Value::String(message.into()));
        Self::new(EventKind::StepMessage, payload)
    }

    pub fn kind(&self) -> &EventKind {
        &self.kind
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn node(&self) -> Option<&str> {
        self.node.as_deref()
    }
}
