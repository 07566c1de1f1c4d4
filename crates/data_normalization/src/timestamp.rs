use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Parses a record timestamp in the formats the data sources emit
/// (RFC 3339, naive date-time, a bare `YYYY-MM-DD`, or Unix epoch seconds or
/// milliseconds). Naive values are taken as UTC.
#[inline]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if let Some(epoch) = parse_epoch(s) {
        return Some(epoch);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc())
}

/// Digit-only strings of 9+ digits are epoch values; 12+ digits are milliseconds.
fn parse_epoch(s: &str) -> Option<DateTime<Utc>> {
    if s.len() < 9 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let value = s.parse::<i64>().ok()?;
    if s.len() >= 12 {
        DateTime::from_timestamp_millis(value)
    } else {
        DateTime::from_timestamp(value, 0)
    }
}
