use chrono::{SecondsFormat, Utc};

/// Current UTC time as a fixed-width RFC 3339 string (microsecond precision)
/// so lexicographic ordering in SQL matches chronological ordering.
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}
