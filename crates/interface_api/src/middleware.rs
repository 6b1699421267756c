//! API middleware

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use chrono::Utc;
use tracing::{info, warn};

/// Header carrying the per-request id set by the router
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request logging middleware
///
/// Logs every API request with its id, status and duration
pub async fn request_logging(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("-")
        .to_string();

    let start = Utc::now();

    let response = next.run(request).await;

    let duration = Utc::now() - start;
    let status = response.status();

    if status.is_server_error() {
        warn!(
            method = %method,
            uri = %uri,
            request_id = %request_id,
            status = %status.as_u16(),
            duration_ms = duration.num_milliseconds(),
            "API request failed"
        );
    } else {
        info!(
            method = %method,
            uri = %uri,
            request_id = %request_id,
            status = %status.as_u16(),
            duration_ms = duration.num_milliseconds(),
            "API request"
        );
    }

    response
}
