//! One log line per request.

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use log::{info, warn};
use std::time::Instant;

pub async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    let status = response.status().as_u16();
    let duration_ms = started.elapsed().as_millis();
    if response.status().is_server_error() {
        warn!(
            "event=http_request module=web status=error method={method} path={path} http_status={status} duration_ms={duration_ms}"
        );
    } else {
        info!(
            "event=http_request module=web status=ok method={method} path={path} http_status={status} duration_ms={duration_ms}"
        );
    }
    response
}
