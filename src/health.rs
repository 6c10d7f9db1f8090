//! The health check route.

use serde::Serialize;
use time::OffsetDateTime;

use crate::http::Response;

/// The service name reported by the health check.
pub const SERVICE_NAME: &str = "Money Manager";
/// The API version reported by the health check.
pub const API_VERSION: &str = "1.0";

#[derive(Debug, Serialize)]
struct HealthStatus {
    status: &'static str,
    service: &'static str,
    version: &'static str,
    /// Seconds since the Unix epoch.
    timestamp: i64,
}

/// A route handler reporting that the server is up.
pub fn get_health() -> Response {
    Response::json_from(&HealthStatus {
        status: "ok",
        service: SERVICE_NAME,
        version: API_VERSION,
        timestamp: OffsetDateTime::now_utc().unix_timestamp(),
    })
}
