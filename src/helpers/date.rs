//! Date helper functions

use chrono::{DateTime, TimeZone, Utc};

/// Machine-readable date for `datetime` attributes
pub fn date_iso(date: &DateTime<Utc>) -> String {
    date.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// Human date in the style of `Thu Jan 05 2023`
pub fn date_display<Tz: TimeZone>(date: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    date.format("%a %b %d %Y").to_string()
}

/// Short date used in post listings (`2023-01-05`)
pub fn date_short<Tz: TimeZone>(date: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    date.format("%Y-%m-%d").to_string()
}
