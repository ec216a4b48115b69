//! Timestamps for AMF dates.
//!
//! AMF carries dates as a double holding milliseconds since the Unix epoch
//! (UTC). [`Timestamp`] keeps that instant as whole seconds plus
//! nanoseconds so sub-millisecond fractions survive decoding.

use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

const MILLISECONDS_PER_SECOND: f64 = 1_000.0;
const NANOSECONDS_PER_MILLISECOND: f64 = 1_000_000.0;
const NANOSECONDS_PER_SECOND: u32 = 1_000_000_000;
const SECONDS_PER_DAY: i64 = 86_400;

/// An instant in UTC with nanosecond resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp {
    secs: i64,
    nanos: u32,
}

impl Timestamp {
    /// The Unix epoch.
    pub const UNIX_EPOCH: Timestamp = Timestamp { secs: 0, nanos: 0 };

    /// Creates a timestamp from seconds and nanoseconds since the epoch.
    ///
    /// Returns `None` if `nanos` is not below one second.
    pub fn new(secs: i64, nanos: u32) -> Option<Self> {
        if nanos >= NANOSECONDS_PER_SECOND {
            return None;
        }
        Some(Self { secs, nanos })
    }

    /// Converts milliseconds since the epoch, as carried on the wire.
    ///
    /// Returns `None` for NaN, infinities and values outside the `i64`
    /// seconds range.
    pub fn from_epoch_millis(millis: f64) -> Option<Self> {
        if !millis.is_finite() {
            return None;
        }
        let secs = (millis / MILLISECONDS_PER_SECOND).floor();
        if !(i64::MIN as f64..i64::MAX as f64).contains(&secs) {
            return None;
        }
        let rem_millis = millis - secs * MILLISECONDS_PER_SECOND;
        let mut secs = secs as i64;
        let mut nanos = (rem_millis * NANOSECONDS_PER_MILLISECOND).round() as u32;
        if nanos >= NANOSECONDS_PER_SECOND {
            secs += 1;
            nanos -= NANOSECONDS_PER_SECOND;
        }
        Some(Self { secs, nanos })
    }

    /// Returns milliseconds since the epoch.
    pub fn epoch_millis(&self) -> f64 {
        self.secs as f64 * MILLISECONDS_PER_SECOND + self.nanos as f64 / NANOSECONDS_PER_MILLISECOND
    }

    /// Whole seconds since the epoch (floored).
    pub fn secs(&self) -> i64 {
        self.secs
    }

    /// Nanoseconds past [`secs`](Self::secs).
    pub fn subsec_nanos(&self) -> u32 {
        self.nanos
    }

    /// Converts to a [`SystemTime`].
    pub fn to_system_time(&self) -> SystemTime {
        if self.secs >= 0 {
            UNIX_EPOCH + Duration::new(self.secs as u64, self.nanos)
        } else {
            UNIX_EPOCH - Duration::from_secs(self.secs.unsigned_abs()) + Duration::from_nanos(self.nanos as u64)
        }
    }

    /// Converts from a [`SystemTime`].
    pub fn from_system_time(time: SystemTime) -> Self {
        match time.duration_since(UNIX_EPOCH) {
            Ok(d) => Self {
                secs: d.as_secs() as i64,
                nanos: d.subsec_nanos(),
            },
            Err(e) => {
                let d = e.duration();
                let mut secs = -(d.as_secs() as i64);
                let mut nanos = d.subsec_nanos();
                if nanos > 0 {
                    secs -= 1;
                    nanos = NANOSECONDS_PER_SECOND - nanos;
                }
                Self { secs, nanos }
            }
        }
    }
}

impl From<SystemTime> for Timestamp {
    fn from(time: SystemTime) -> Self {
        Timestamp::from_system_time(time)
    }
}

/// Formats nanoseconds as fractional seconds, omitting if zero.
fn format_fractional_seconds(nanos: u32) -> String {
    if nanos == 0 {
        return String::new();
    }
    let str = format!("{:09}", nanos);
    let trimmed = str.trim_end_matches('0');
    format!(".{}", trimmed)
}

/// Converts days since Unix epoch to (year, month, day).
fn days_to_date(days: i64) -> (i64, u32, u32) {
    // Howard Hinnant's civil_from_days
    let z = days + 719468;
    let era = if z >= 0 { z } else { z - 146096 } / 146097;
    let doe = (z - era * 146097) as u32; // day of era
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146096) / 365; // year of era
    let y = yoe as i64 + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100); // day of year
    let mp = (5 * doy + 2) / 153; // month index
    let d = doy - (153 * mp + 2) / 5 + 1;
    let m = if mp < 10 { mp + 3 } else { mp - 9 };

    let year = if m <= 2 { y + 1 } else { y };
    (year, m, d)
}

impl fmt::Display for Timestamp {
    /// Formats as RFC 3339 in UTC, e.g. `2024-03-15T14:30:00.5Z`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let days = self.secs.div_euclid(SECONDS_PER_DAY);
        let secs_of_day = self.secs.rem_euclid(SECONDS_PER_DAY);
        let (year, month, day) = days_to_date(days);
        write!(
            f,
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}{}Z",
            year,
            month,
            day,
            secs_of_day / 3600,
            (secs_of_day % 3600) / 60,
            secs_of_day % 60,
            format_fractional_seconds(self.nanos)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epoch_millis_roundtrip() {
        for millis in [0.0, 1.0, 1.5, -1.5, 999.0, 1_700_000_000_123.0, -86_400_000.0] {
            let ts = Timestamp::from_epoch_millis(millis).unwrap();
            assert_eq!(ts.epoch_millis(), millis, "failed for {}", millis);
        }
    }

    #[test]
    fn test_sub_second_precision() {
        let ts = Timestamp::from_epoch_millis(1_500.25).unwrap();
        assert_eq!(ts.secs(), 1);
        assert_eq!(ts.subsec_nanos(), 500_250_000);
    }

    #[test]
    fn test_negative_floors() {
        let ts = Timestamp::from_epoch_millis(-1.5).unwrap();
        assert_eq!(ts.secs(), -1);
        assert_eq!(ts.subsec_nanos(), 998_500_000);
    }

    #[test]
    fn test_non_finite_rejected() {
        assert!(Timestamp::from_epoch_millis(f64::NAN).is_none());
        assert!(Timestamp::from_epoch_millis(f64::INFINITY).is_none());
        assert!(Timestamp::from_epoch_millis(1e300).is_none());
    }

    #[test]
    fn test_new_rejects_nanos_overflow() {
        assert!(Timestamp::new(0, 1_000_000_000).is_none());
        assert_eq!(Timestamp::new(0, 0), Some(Timestamp::UNIX_EPOCH));
    }

    #[test]
    fn test_format() {
        assert_eq!(Timestamp::UNIX_EPOCH.to_string(), "1970-01-01T00:00:00Z");
        let ts = Timestamp::from_epoch_millis(1_710_513_000_500.0).unwrap();
        assert_eq!(ts.to_string(), "2024-03-15T14:30:00.5Z");
        let before = Timestamp::from_epoch_millis(-1_000.0).unwrap();
        assert_eq!(before.to_string(), "1969-12-31T23:59:59Z");
    }

    #[test]
    fn test_system_time_roundtrip() {
        for millis in [0.0, 1_234.5, -1_234.5] {
            let ts = Timestamp::from_epoch_millis(millis).unwrap();
            assert_eq!(Timestamp::from_system_time(ts.to_system_time()), ts);
        }
    }
}
