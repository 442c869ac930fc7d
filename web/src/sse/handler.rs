use crate::AppState;
use axum::extract::State;
use axum::http::header::{self, HeaderName};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::IntoResponse;
use futures::StreamExt;
use log::*;
use std::convert::Infallible;
use std::sync::Arc;

/// GET a long-lived SSE stream of queued agent events
///
/// Each frame is `data: <json>\n\n` with `type`, `payload`, `node` and `ts`
/// (flush time). The stream runs until the client disconnects or the server
/// shuts down.
#[utoipa::path(
    get,
    path = "/diagnostics/stream",
    responses(
        (status = 200, description = "Server-Sent Events stream of agent events", body = String, content_type = "text/event-stream")
    ),
    tag = "diagnostics"
)]
pub(crate) async fn diagnostics_stream(State(app_state): State<AppState>) -> impl IntoResponse {
    debug!("Establishing diagnostics SSE connection");

    let frames = ::sse::event_stream(
        Arc::clone(&app_state.event_queue),
        app_state.stream_options(),
        app_state.shutdown.clone(),
    );
    let stream = frames.map(|frame| Ok::<Event, Infallible>(frame.into()));

    let sse = match app_state.config.sse_keep_alive() {
        Some(interval) => Sse::new(stream)
            .keep_alive(KeepAlive::new().interval(interval))
            .into_response(),
        None => Sse::new(stream).into_response(),
    };

    (
        [
            (header::CACHE_CONTROL, "no-cache"),
            (header::CONNECTION, "keep-alive"),
            (HeaderName::from_static("x-accel-buffering"), "no"),
        ],
        sse,
    )
}
