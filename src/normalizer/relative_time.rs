//! Relative post times as rendered in the feed ("5m", "3 hours ago", "now").

use chrono::{DateTime, TimeDelta, Utc};

use crate::app::{PostwatchError, Result};

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;

/// Parse a relative time phrase into the duration it lies before now.
///
/// Accepted phrases, matched against the whole trimmed input:
/// `now`, `about an hour ago`, `a day ago`, `<N>s`, `<N> seconds ago`,
/// `<N>m`, `<N> minutes ago`, `<N>h`, `<N> hours ago`, `<N> days ago`,
/// where `N` is one or two digits.
pub fn parse_offset(s: &str) -> Result<TimeDelta> {
    let s = s.trim();

    let secs = match s {
        "now" => 0,
        "about an hour ago" => HOUR,
        "a day ago" => DAY,
        _ => {
            let (count, unit) =
                split_count(s).ok_or_else(|| PostwatchError::UnrecognizedTimeFormat(s.into()))?;
            let scale = match unit {
                "s" | " seconds ago" => 1,
                "m" | " minutes ago" => MINUTE,
                "h" | " hours ago" => HOUR,
                " days ago" => DAY,
                _ => return Err(PostwatchError::UnrecognizedTimeFormat(s.into())),
            };
            count * scale
        }
    };

    Ok(TimeDelta::seconds(secs))
}

/// Resolve a relative time phrase observed at `now` into an absolute time.
pub fn parse(s: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    Ok(now - parse_offset(s)?)
}

/// Whether the phrase belongs to the accepted grammar
pub fn conforms(s: &str) -> bool {
    parse_offset(s).is_ok()
}

/// Split a leading one- or two-digit count from its unit suffix.
fn split_count(s: &str) -> Option<(i64, &str)> {
    let digits = s.bytes().take_while(u8::is_ascii_digit).count();
    if !(1..=2).contains(&digits) {
        return None;
    }
    let (count, unit) = s.split_at(digits);
    count.parse().ok().map(|n| (n, unit))
}
