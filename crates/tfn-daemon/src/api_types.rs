//! Response types owned by the tfn-daemon HTTP surface.
//!
//! Order payloads (`OrderDetail`, `TrackingUpdate`, the request bodies) come
//! straight from `tfn-schemas`; only the envelope types the daemon itself
//! invents live here.  No business logic.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// /v1/health
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub service: String,
    pub version: String,
}

// ---------------------------------------------------------------------------
// /v1/status
// ---------------------------------------------------------------------------

/// Point-in-time snapshot of daemon state, returned by GET /v1/status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub daemon_uptime_secs: u64,
    /// "memory" | "postgres"
    pub backend: String,
}

// ---------------------------------------------------------------------------
// Error envelope
// ---------------------------------------------------------------------------

/// Body returned with every non-2xx response.
///
/// `kind` carries the stable taxonomy string ("validation_error",
/// "not_found", "availability_error", "authorization_error", "state_error",
/// "persistence_error") so clients can branch without parsing `error`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub kind: String,
}
