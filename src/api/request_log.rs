use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;

/// Development request log: `GET /api/v1/bootcamps?page=2 200 3.104 ms`.
pub async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let target = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());
    let started = Instant::now();

    let response = next.run(request).await;

    log::info!(
        "{} {} {} {:.3} ms",
        method,
        target,
        response.status().as_u16(),
        started.elapsed().as_secs_f64() * 1000.0
    );
    response
}
