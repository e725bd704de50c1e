use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use chrono_tz::Tz;

// Absolute forms carry their own zone (trailing Z or a numeric offset).
const ABSOLUTE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z"];

// Naive forms are interpreted as local time in the reference zone.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Resolves author-entered timestamp text to an absolute instant.
///
/// Text carrying an explicit zone marker is taken as-is and the reference
/// zone is ignored. Anything else is read as wall-clock time in `reference`,
/// including that zone's DST offset on the given date. Blank or unreadable
/// text resolves to `None`; callers decide what unset means.
///
/// Ambiguous wall-clock times (clocks rolled back) resolve to the earlier
/// instant. Nonexistent ones (clocks jumped forward) are unreadable.
pub fn parse_instant(text: &str, reference: Tz) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(instant) = DateTime::parse_from_rfc3339(text) {
        return Some(instant.with_timezone(&Utc));
    }
    for format in ABSOLUTE_FORMATS {
        if let Ok(instant) = DateTime::parse_from_str(text, format) {
            return Some(instant.with_timezone(&Utc));
        }
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .and_then(|naive| naive.and_local_timezone(reference).earliest())
        .map(|local| local.with_timezone(&Utc))
}

/// Renders an instant as zone-local RFC 3339 text.
///
/// Output round-trips through [`parse_instant`] with the same zone.
pub fn format_instant(instant: DateTime<Utc>, zone: Tz) -> String {
    instant
        .with_timezone(&zone)
        .to_rfc3339_opts(SecondsFormat::Secs, true)
}
