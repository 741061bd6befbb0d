//! Export filename generation.

use chrono::{DateTime, Utc};

pub const FILENAME_PREFIX: &str = "emerald_alignment";
pub const MAX_DESCRIPTOR_LEN: usize = 20;

/// Compact ISO-8601 (basic format), UTC, seconds precision.
const TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%S";

/// Replace every character outside `[A-Za-z0-9_]` with `_` and cap the length.
pub fn sanitize_descriptor(descriptor: &str) -> String {
    descriptor
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .take(MAX_DESCRIPTOR_LEN)
        .collect()
}

fn present(descriptor: Option<&str>) -> Option<&str> {
    descriptor.map(str::trim).filter(|d| !d.is_empty())
}

/// `emerald_alignment_{A}_vs_{B}_{timestamp}.{ext}`; the `{A}_vs_{B}_` part
/// is dropped unless both descriptors are present and non-blank.
pub fn generate_export_filename(
    descriptor_a: Option<&str>,
    descriptor_b: Option<&str>,
    extension: &str,
    at: DateTime<Utc>,
) -> String {
    let timestamp = at.format(TIMESTAMP_FORMAT);
    match (present(descriptor_a), present(descriptor_b)) {
        (Some(a), Some(b)) => format!(
            "{}_{}_vs_{}_{}.{}",
            FILENAME_PREFIX,
            sanitize_descriptor(a),
            sanitize_descriptor(b),
            timestamp,
            extension
        ),
        _ => format!("{}_{}.{}", FILENAME_PREFIX, timestamp, extension),
    }
}
