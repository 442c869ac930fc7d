use std::any::Any;
use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::*;
use serde_json::json;

pub type Result<T> = core::result::Result<T, Error>;

/// Errors surfaced by the web layer.
///
/// Anything unexpected becomes an opaque 500; details go to the log, never to
/// the client.
#[derive(Debug)]
pub enum Error {
    /// The request did not have the expected shape (e.g. a malformed JSON body).
    InvalidRequest(String),
    /// A failure no handler recovered from.
    Unhandled {
        error_type: &'static str,
        detail: String,
    },
}

impl StdError for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> core::result::Result<(), std::fmt::Error> {
        match self {
            Error::InvalidRequest(detail) => write!(fmt, "Invalid request: {detail}"),
            Error::Unhandled { error_type, detail } => write!(fmt, "{error_type}: {detail}"),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::InvalidRequest(detail) => {
                warn!("Rejecting request: {detail}");
                (StatusCode::BAD_REQUEST, Json(json!({ "detail": detail }))).into_response()
            }
            Error::Unhandled { error_type, detail } => {
                error!("type" = error_type, detail = detail.as_str(); "unhandled_exception");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "detail": "Internal Server Error" })),
                )
                    .into_response()
            }
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::InvalidRequest(format!("Invalid JSON body: {err}"))
    }
}

/// Converts a panic caught by `CatchPanicLayer` into the opaque 500 response.
pub(crate) fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let (error_type, detail) = if let Some(message) = payload.downcast_ref::<&'static str>() {
        ("panic(&str)", (*message).to_string())
    } else if let Some(message) = payload.downcast_ref::<String>() {
        ("panic(String)", message.clone())
    } else {
        ("panic(unknown payload)", String::new())
    };

    Error::Unhandled { error_type, detail }.into_response()
}
