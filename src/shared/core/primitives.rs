use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};

pub type TicketId = i64;

/// Offset used to read naive upstream timestamps and to print wall-clock times.
pub fn display_offset(minutes_east: i32) -> FixedOffset {
    FixedOffset::east_opt(minutes_east * 60).unwrap_or(Utc.fix())
}

/// Reads an upstream ISO-8601 timestamp. Strings without an offset are taken
/// to be local to `offset`.
pub fn parse_timestamp(raw: &str, offset: FixedOffset) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed);
    }
    const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"];
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .and_then(|naive| offset.from_local_datetime(&naive).single())
}

pub fn parse_report_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| parse_timestamp(raw, display_offset(0)).map(|ts| ts.date_naive()))
}

pub fn today(offset: FixedOffset, now: DateTime<Utc>) -> NaiveDate {
    now.with_timezone(&offset).date_naive()
}
