//! Wire shapes of the HTTP API and the SSE stream.

use std::time::SystemTime;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

/// Health route payload.
pub mod health;
/// Room endpoint payloads.
pub mod room;
/// Room event payloads.
pub mod sse;
/// User endpoint payloads.
pub mod user;
pub mod validation;

/// RFC 3339 rendering used for `created_at` / `joined_at` fields.
fn format_system_time(time: SystemTime) -> String {
    OffsetDateTime::from(time)
        .format(&Rfc3339)
        .unwrap_or_else(|_| "invalid-timestamp".into())
}
