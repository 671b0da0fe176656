//! DST-safe conversion between absolute instants and civil calendar fields.
//!
//! Everything here is built on one primitive, [`resolve_civil`]: find the
//! instant whose wall-clock representation under a timezone equals the
//! requested fields. Daylight saving makes that lookup partial: a civil
//! time can occur twice on a fall-back day, or not at all on a
//! spring-forward day. The primitive therefore takes a reference instant
//! and prefers the candidate nearest to, and not earlier than, that
//! reference.
//!
//! All functions take explicit inputs (no system clock access): the
//! caller provides the reference instant, keeping these functions
//! deterministic and testable against any timezone in the IANA database.
//!
//! # Gap Policy
//!
//! A requested civil time that falls inside a spring-forward gap has no
//! instant at all. [`resolve_civil`] reports that as `None` and leaves the
//! decision to the caller. Callers that need a total answer use
//! [`resolve_shifting_gap`], which carries the requested clock forward by
//! the width of the gap (2:01 becomes 3:01 under a one-hour shift), or
//! the day-start helpers, which snap to the first instant that does
//! exist, so "start of day" is well-defined even on days whose midnight
//! was skipped.

use chrono::{DateTime, Datelike, Duration, LocalResult, NaiveDate, NaiveTime, TimeZone};
use chrono_tz::Tz;

use crate::error::{Result, ScheduleError};

/// Seconds from `earlier` to `later` (negative when reversed).
pub fn seconds_between(later: &DateTime<Tz>, earlier: &DateTime<Tz>) -> i64 {
    (*later - *earlier).num_seconds()
}

/// Find the instant whose civil fields under `tz` are `date` at
/// `hour:min:sec`.
///
/// An `hour` of 24 resolves as 00:00 of the following civil date
/// (end-of-day, exclusive).
///
/// When the civil time occurs twice (fall-back), the result is the
/// candidate nearest to, and not earlier than, `not_before`; if both
/// candidates precede `not_before`, the later one is returned. When the
/// civil time does not occur at all (spring-forward gap), returns `None`.
pub fn resolve_civil(
    tz: Tz,
    date: NaiveDate,
    hour: u32,
    min: u32,
    sec: u32,
    not_before: &DateTime<Tz>,
) -> Option<DateTime<Tz>> {
    let (date, hour) = if hour == 24 {
        (date.succ_opt()?, 0)
    } else {
        (date, hour)
    };
    let naive = date.and_hms_opt(hour, min, sec)?;
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(t) => Some(t),
        LocalResult::Ambiguous(a, b) => {
            if &a >= not_before {
                Some(a)
            } else {
                Some(b)
            }
        }
        LocalResult::None => None,
    }
}

/// First valid instant at or after the given wall clock on `date`.
///
/// Ambiguous wall clocks resolve to their earlier occurrence; skipped
/// wall clocks advance an hour at a time until they exit the gap.
fn earliest_at_or_after(tz: Tz, date: NaiveDate, time: NaiveTime) -> Option<DateTime<Tz>> {
    resolve_shifting_gap(tz, date.and_time(time))
}

/// Resolve a naive wall clock, carrying a spring-forward gap time
/// forward by the width of the gap. Ambiguous times resolve to their
/// earlier occurrence.
pub(crate) fn resolve_shifting_gap(
    tz: Tz,
    naive: chrono::NaiveDateTime,
) -> Option<DateTime<Tz>> {
    let mut naive = naive;
    // No tzdata gap exceeds two hours; three probes always suffice.
    for _ in 0..3 {
        match tz.from_local_datetime(&naive) {
            LocalResult::Single(t) => return Some(t),
            LocalResult::Ambiguous(a, _) => return Some(a),
            LocalResult::None => naive = naive.checked_add_signed(Duration::hours(1))?,
        }
    }
    None
}

/// Advance by `days` civil days, preserving the wall-clock
/// hour/minute/second across any DST discontinuity on the way.
///
/// If the original wall clock does not exist on the target date, the gap
/// policy snaps it forward to the first valid instant.
pub fn add_days(t: &DateTime<Tz>, days: i64) -> Option<DateTime<Tz>> {
    if days == 0 {
        return Some(*t);
    }
    let date = t.date_naive().checked_add_signed(Duration::days(days))?;
    earliest_at_or_after(t.timezone(), date, t.time())
}

/// First instant of the civil day containing `t`.
pub fn start_of_day(t: &DateTime<Tz>) -> Option<DateTime<Tz>> {
    earliest_at_or_after(t.timezone(), t.date_naive(), NaiveTime::MIN)
}

/// First instant of the Sunday-based week containing `t`.
pub fn start_of_week(t: &DateTime<Tz>) -> Option<DateTime<Tz>> {
    let back = i64::from(t.weekday().num_days_from_sunday());
    let date = t.date_naive().checked_sub_signed(Duration::days(back))?;
    earliest_at_or_after(t.timezone(), date, NaiveTime::MIN)
}

/// First instant of the civil day after the one containing `t`.
///
/// Most days are 86400 seconds, but DST days run 23 or 25 hours; the
/// result is the actual next midnight (or the first instant after it,
/// where midnight itself was skipped), never a fixed offset.
pub fn next_day_start(t: &DateTime<Tz>) -> Option<DateTime<Tz>> {
    let date = t.date_naive().succ_opt()?;
    earliest_at_or_after(t.timezone(), date, NaiveTime::MIN)
}

/// First instant of the next Sunday-based week after the one containing `t`.
pub fn next_week_start(t: &DateTime<Tz>) -> Option<DateTime<Tz>> {
    let ahead = 7 - i64::from(t.weekday().num_days_from_sunday());
    let date = t.date_naive().checked_add_signed(Duration::days(ahead))?;
    earliest_at_or_after(t.timezone(), date, NaiveTime::MIN)
}

pub fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// Days in `month` of `year`; 0 for an out-of-range month.
pub fn days_in_month(month: u32, year: i32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 0,
    }
}

/// A `CCYYMMDDHHMMSS` civil timestamp literal.
///
/// The literal carries no timezone: parsing validates the fields and
/// [`CivilStamp::resolve`] turns them into an instant under a timezone at
/// query time. Ordering is lexicographic on the civil fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct CivilStamp {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

impl CivilStamp {
    /// Parse exactly fourteen ASCII digits, validating each field.
    pub fn parse(s: &str) -> Result<Self> {
        let bytes = s.as_bytes();
        if bytes.len() != 14 || !bytes.iter().all(u8::is_ascii_digit) {
            return Err(ScheduleError::InvalidStamp(s.to_string()));
        }
        let field = |from: usize, to: usize| -> u32 {
            bytes[from..to]
                .iter()
                .fold(0, |acc, b| acc * 10 + u32::from(b - b'0'))
        };
        let stamp = CivilStamp {
            year: field(0, 4) as i32,
            month: field(4, 6),
            day: field(6, 8),
            hour: field(8, 10),
            minute: field(10, 12),
            second: field(12, 14),
        };
        let day_ok = stamp.day >= 1 && stamp.day <= days_in_month(stamp.month, stamp.year);
        if (1..=12).contains(&stamp.month)
            && day_ok
            && stamp.hour < 24
            && stamp.minute < 60
            && stamp.second < 60
        {
            Ok(stamp)
        } else {
            Err(ScheduleError::InvalidStamp(s.to_string()))
        }
    }

    /// The instant with these civil fields under `tz`.
    ///
    /// An ambiguous fall-back time resolves to its earlier occurrence; a
    /// time inside a spring-forward gap shifts past the gap per the
    /// module's gap policy.
    pub fn resolve(&self, tz: Tz) -> Option<DateTime<Tz>> {
        let date = NaiveDate::from_ymd_opt(self.year, self.month, self.day)?;
        let naive = date.and_hms_opt(self.hour, self.minute, self.second)?;
        resolve_shifting_gap(tz, naive)
    }
}

impl std::fmt::Display for CivilStamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:04}{:02}{:02}{:02}{:02}{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}
