use axum::{extract::Request, middleware::Next, response::Response};
use log::*;
use std::time::Instant;

/// Logs one `request` line per handled request with method, path, status code
/// and duration. For streaming responses the duration covers time to headers.
pub async fn log_request(request: Request, next: Next) -> Response {
    let started = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_owned();

    let response = next.run(request).await;

    let duration_ms = started.elapsed().as_millis() as u64;
    info!(
        method = method.as_str(),
        path = path.as_str(),
        status_code = response.status().as_u16(),
        duration_ms = duration_ms;
        "request"
    );

    response
}
