use config::Config;
use events::EventQueue;
use log::info;
use sse::{Shutdown, StreamOptions};
use std::sync::Arc;

pub mod config;
pub mod logging;

/// Builds the diagnostics event queue, bounded when a capacity is configured.
pub fn init_event_queue(config: &Config) -> EventQueue {
    match config.event_queue_capacity {
        Some(capacity) => {
            info!("Event queue config: capacity={capacity}, overflow=drop-oldest");
            EventQueue::bounded(capacity)
        }
        None => {
            info!("Event queue config: unbounded");
            EventQueue::new()
        }
    }
}

// Service-level state containing only infrastructure concerns
// Needs to implement Clone to be able to be passed into Router as State
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub event_queue: Arc<EventQueue>,
    pub shutdown: Shutdown,
}

impl AppState {
    pub fn new(app_config: Config, event_queue: &Arc<EventQueue>) -> Self {
        Self {
            config: app_config,
            event_queue: Arc::clone(event_queue),
            shutdown: Shutdown::new(),
        }
    }

    pub fn stream_options(&self) -> StreamOptions {
        StreamOptions {
            poll_interval: self.config.stream_poll_interval(),
        }
    }
}
