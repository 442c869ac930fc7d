use crate::message::Frame;
use crate::shutdown::Shutdown;
use async_stream::stream;
use events::EventQueue;
use futures::Stream;
use log::*;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamOptions {
    /// Longest the loop sleeps on an empty queue before polling again.
    pub poll_interval: Duration,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Turns the queue into an endless sequence of SSE frames.
///
/// Every pass drains whatever has accumulated, stamping and yielding each event
/// in emit order. A pass that drains nothing suspends until the next emit, the
/// poll interval or shutdown, whichever comes first. The stream ends on
/// shutdown, even partway through a drain; events not yet yielded stay queued.
/// Dropping it (client disconnect) ends it as well.
pub fn event_stream(
    queue: Arc<EventQueue>,
    options: StreamOptions,
    shutdown: Shutdown,
) -> impl Stream<Item = Frame> {
    stream! {
        debug!("Diagnostics event stream opened");

        while !shutdown.is_triggered() {
            let mut drained = false;
            let mut pending = queue.drain();

            // Checked before each pop so an event is never taken and then discarded.
            while !shutdown.is_triggered() {
                let Some(event) = pending.next() else {
                    break;
                };
                drained = true;
                match Frame::flush(&event) {
                    Ok(frame) => {
                        yield frame;
                    }
                    Err(e) => error!("Failed to serialize agent event: {e}"),
                }
            }
            drop(pending);

            if !drained {
                tokio::select! {
                    _ = queue.notified() => {}
                    _ = tokio::time::sleep(options.poll_interval) => {}
                    _ = shutdown.triggered() => {}
                }
            }
        }

        debug!("Diagnostics event stream closed by shutdown");
    }
}
