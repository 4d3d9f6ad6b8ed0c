//! Timestamp and lock holder-stamp helpers.

use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Fallback timestamp when the wall clock cannot be formatted.
pub const TS_ZERO: &str = "1970-01-01T00:00:00Z";

/// Current wall-clock time in RFC 3339 form.
#[must_use]
pub fn now_iso() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| TS_ZERO.to_string())
}

/// Diagnostic line written into a lock entry by the process opening it.
///
/// The contents are never parsed: liveness is decided by the advisory claim
/// and the entry age, not by what is written here. The stamp exists so a
/// human inspecting a leftover entry can see who wrote it and when.
#[must_use]
pub fn holder_stamp() -> String {
    format!(
        "Lock acquired by PID {} at {}\n",
        std::process::id(),
        now_iso()
    )
}
