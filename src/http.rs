//! Reads the parts of a raw HTTP request the router needs and writes responses.
//!
//! Every response has status `200 OK`, permissive CORS headers and
//! `Connection: close`. Failures are reported in the JSON body instead of the
//! status code.

use serde::Serialize;

/// The default number of bytes read from a connection.
///
/// Anything past this is cut off, so a long body is truncated rather than
/// rejected.
pub const MAX_REQUEST_SIZE: usize = 4096;

const CORS_HEADERS: &str = "Access-Control-Allow-Origin: *\r\n\
    Access-Control-Allow-Methods: GET, POST, DELETE, OPTIONS\r\n\
    Access-Control-Allow-Headers: Content-Type\r\n";

const JSON_CONTENT_TYPE: &str = "application/json";

/// The request line and body of a raw request.
#[derive(Debug, PartialEq)]
pub struct RawRequest<'a> {
    /// The method, e.g. "GET". Empty if the request line is missing.
    pub method: &'a str,
    /// The request target including any query string. Empty if missing.
    pub path: &'a str,
    /// Everything after the first blank line, or `None` if the header block
    /// never ended.
    pub body: Option<&'a str>,
}

impl<'a> RawRequest<'a> {
    /// Split `text` into the method, path and body.
    ///
    /// Header lines are not interpreted.
    pub fn parse(text: &'a str) -> Self {
        let request_line = text.lines().next().unwrap_or_default();
        let mut parts = request_line.split_whitespace();
        let method = parts.next().unwrap_or_default();
        let path = parts.next().unwrap_or_default();
        let body = text.split_once("\r\n\r\n").map(|(_, body)| body);

        Self { method, path, body }
    }
}

/// Decode a raw request buffer as text.
///
/// Invalid UTF-8 is replaced and the text stops at the first NUL byte.
pub fn request_text(raw_request: &[u8]) -> String {
    let end = raw_request
        .iter()
        .position(|&byte| byte == 0)
        .unwrap_or(raw_request.len());

    String::from_utf8_lossy(&raw_request[..end]).into_owned()
}

/// A complete HTTP response.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    content_type: Option<&'static str>,
    body: String,
}

impl Response {
    /// A response with a JSON body.
    pub fn json(body: String) -> Self {
        Self {
            content_type: Some(JSON_CONTENT_TYPE),
            body,
        }
    }

    /// Serialize `value` as the JSON body.
    pub fn json_from<T: Serialize>(value: &T) -> Self {
        match serde_json::to_string(value) {
            Ok(body) => Self::json(body),
            Err(error) => {
                tracing::error!("Could not serialize response as JSON: {error}");
                Self::failure("Internal error")
            }
        }
    }

    /// A `{"success":true,"message":...}` response.
    pub fn success(message: &str) -> Self {
        Self::json_from(&ActionResult {
            success: true,
            message,
        })
    }

    /// A `{"success":false,"message":...}` response.
    pub fn failure(message: &str) -> Self {
        Self::json_from(&ActionResult {
            success: false,
            message,
        })
    }

    /// The empty response to a CORS preflight request.
    pub fn preflight() -> Self {
        Self {
            content_type: None,
            body: String::new(),
        }
    }

    /// The response body.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Render the status line, headers and body.
    pub fn into_bytes(self) -> Vec<u8> {
        let content_type = self
            .content_type
            .map(|content_type| format!("Content-Type: {content_type}\r\n"))
            .unwrap_or_default();

        format!(
            "HTTP/1.1 200 OK\r\n\
            {content_type}\
            {CORS_HEADERS}\
            Content-Length: {length}\r\n\
            Connection: close\r\n\r\n\
            {body}",
            length = self.body.len(),
            body = self.body
        )
        .into_bytes()
    }
}

/// The outcome of a request that changes the store.
#[derive(Debug, Serialize)]
struct ActionResult<'a> {
    success: bool,
    message: &'a str,
}
