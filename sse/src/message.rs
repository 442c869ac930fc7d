use axum::response::sse::Event;
use chrono::{DateTime, SecondsFormat, Utc};
use events::AgentEvent;
use serde::Serialize;

/// An agent event as it goes out on the wire: the event's own fields plus
/// `ts`, the moment it was flushed to the subscriber.
#[derive(Debug, Serialize)]
pub struct FlushedEvent<'a> {
    #[serde(flatten)]
    event: &'a AgentEvent,
    ts: String,
}

impl<'a> FlushedEvent<'a> {
    pub fn new(event: &'a AgentEvent, flushed_at: DateTime<Utc>) -> Self {
        Self {
            event,
            ts: flushed_at.to_rfc3339_opts(SecondsFormat::Micros, false),
        }
    }
}

/// One SSE frame carrying a single JSON-encoded event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    data: String,
}

impl Frame {
    /// Stamp `event` with the current UTC time and serialize it.
    pub fn flush(event: &AgentEvent) -> Result<Self, serde_json::Error> {
        Self::flush_at(event, Utc::now())
    }

    pub fn flush_at(event: &AgentEvent, flushed_at: DateTime<Utc>) -> Result<Self, serde_json::Error> {
        let data = serde_json::to_string(&FlushedEvent::new(event, flushed_at))?;
        Ok(Self { data })
    }

    /// The JSON object carried in the frame's `data` field.
    pub fn data(&self) -> &str {
        &self.data
    }
}

impl From<Frame> for Event {
    fn from(frame: Frame) -> Self {
        Event::default().data(frame.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::{json, Value};

    #[test]
    fn frame_carries_event_fields_and_flush_timestamp() {
        let flushed_at = Utc.with_ymd_and_hms(2026, 10, 18, 9, 30, 0).unwrap();
        let event = AgentEvent::step_message("hi").with_node("planner");

        let frame = Frame::flush_at(&event, flushed_at).unwrap();
        let value: Value = serde_json::from_str(frame.data()).unwrap();

        assert_eq!(
            value,
            json!({
                "type": "step_message",
                "payload": {"message": "hi"},
                "node": "planner",
                "ts": "2026-10-18T09:30:00.000000+00:00",
            })
        );
    }

    #[test]
    fn process_wide_event_serializes_null_node() {
        let frame = Frame::flush(&AgentEvent::step_message("hi")).unwrap();
        let value: Value = serde_json::from_str(frame.data()).unwrap();

        assert_eq!(value["node"], Value::Null);
        let ts = value["ts"].as_str().unwrap();
        assert!(DateTime::parse_from_rfc3339(ts).is_ok(), "ts should be ISO-8601: {ts}");
    }

    #[test]
    fn data_fits_on_a_single_sse_data_line() {
        let frame = Frame::flush(&AgentEvent::step_message("line one\nline two")).unwrap();

        assert!(frame.data().starts_with('{'));
        assert!(frame.data().ends_with('}'));
        assert!(!frame.data().contains('\n'));
    }
}
