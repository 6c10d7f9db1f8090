//! Logging for requests and responses.

/// The number of body bytes logged at the `info` level.
///
/// Longer bodies are truncated at `info` and logged in full at `debug`.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// Log a request line and its body.
pub fn log_request(method: &str, path: &str, body: Option<&str>) {
    let body = body.unwrap_or_default();

    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!("Received request: {method} {path}\nbody: {}...", preview(body));
        tracing::debug!("Full request body: {body:?}");
    } else {
        tracing::info!("Received request: {method} {path}\nbody: {body:?}");
    }
}

/// Log a response body.
pub fn log_response(body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!("Sending response: {}...", preview(body));
        tracing::debug!("Full response body: {body:?}");
    } else {
        tracing::info!("Sending response: {body:?}");
    }
}

/// The longest prefix of `body` no longer than [LOG_BODY_LENGTH_LIMIT] bytes
/// that ends on a character boundary.
fn preview(body: &str) -> &str {
    let end = (0..=LOG_BODY_LENGTH_LIMIT.min(body.len()))
        .rev()
        .find(|&index| body.is_char_boundary(index))
        .unwrap_or(0);

    &body[..end]
}
