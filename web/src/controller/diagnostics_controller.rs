use crate::error::Result;
use crate::AppState;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use events::AgentEvent;
use log::*;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

pub const DEFAULT_MESSAGE: &str = "hello from diagnostics";

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct EmitParams {
    /// Text carried in the queued event's payload
    #[schema(example = "hello from diagnostics")]
    pub message: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EmitResponse {
    #[schema(example = "queued")]
    pub status: String,
}

/// POST a sample `step_message` event onto the diagnostics queue
///
/// The message may come from a JSON body or the `message` query parameter;
/// the body wins when both are present, and the last `message` wins when the
/// parameter repeats. Bodies that aren't declared as JSON are ignored.
#[utoipa::path(
    post,
    path = "/diagnostics/emit",
    params(EmitParams),
    request_body(content = EmitParams, description = "Optional message for the sample event", content_type = "application/json"),
    responses(
        (status = 200, description = "Event queued for the diagnostics stream", body = EmitResponse),
        (status = 400, description = "Body declared as JSON but not parseable")
    ),
    tag = "diagnostics"
)]
pub async fn emit(
    State(app_state): State<AppState>,
    Query(query): Query<Vec<(String, String)>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse> {
    let from_body = if is_json(&headers) {
        parse_body(&body)?
    } else {
        EmitParams::default()
    };
    let message = from_body
        .message
        .or_else(|| last_message_param(query))
        .unwrap_or_else(|| DEFAULT_MESSAGE.to_string());

    debug!("Queueing diagnostic step message");
    app_state.event_queue.emit(AgentEvent::step_message(message));

    Ok((
        StatusCode::OK,
        Json(EmitResponse {
            status: "queued".to_string(),
        }),
    ))
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("application/json"))
}

fn last_message_param(query: Vec<(String, String)>) -> Option<String> {
    query
        .into_iter()
        .filter(|(key, _)| key == "message")
        .map(|(_, value)| value)
        .last()
}

// An empty body (or literal null) means "use the defaults".
fn parse_body(body: &[u8]) -> Result<EmitParams> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(EmitParams::default());
    }
    Ok(serde_json::from_slice::<Option<EmitParams>>(body)?.unwrap_or_default())
}
