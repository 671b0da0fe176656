//! Clock-of-day points and ranges, and their compact grammar.
//!
//! A [`ClockTime`] is a time-of-day point with no calendar date attached
//! (hour 0–24, minute 0–59; 24:00 denotes end-of-day, exclusive). A
//! [`ClockRange`] is a strictly increasing pair of clock points, the unit
//! a single day's schedule is built from.
//!
//! The textual grammar is 1–4 digits per clock point, left-padded by
//! length: `8` and `08` and `0800` all mean 08:00, while `830` means
//! 08:30. Ranges join two points with `-`, e.g. `830-1200`.

use std::fmt;

use chrono::DateTime;
use chrono_tz::Tz;

use crate::civil;
use crate::error::{Result, ScheduleError};
use crate::schedule::Span;

/// A time-of-day point: hour 0–24, minute 0–59.
///
/// 24:00 is legal only with minute 0 and means the exclusive end of the
/// day. Ordering is lexicographic (hour, then minute).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ClockTime {
    hour: u8,
    minute: u8,
}

impl ClockTime {
    pub fn new(hour: u8, minute: u8) -> Result<Self> {
        if hour > 24 || minute > 59 || (hour == 24 && minute != 0) {
            return Err(ScheduleError::InvalidClock(format!("{hour:02}{minute:02}")));
        }
        Ok(ClockTime { hour, minute })
    }

    /// Parse the 1–4 digit grammar: `H`, `HH`, `HMM`, or `HHMM`.
    pub fn parse(s: &str) -> Result<Self> {
        let bytes = s.as_bytes();
        if bytes.is_empty() || bytes.len() > 4 || !bytes.iter().all(u8::is_ascii_digit) {
            return Err(ScheduleError::InvalidClock(s.to_string()));
        }
        let digit = |i: usize| bytes[i] - b'0';
        let (hour, minute) = match bytes.len() {
            1 => (digit(0), 0),
            2 => (digit(0) * 10 + digit(1), 0),
            3 => (digit(0), digit(1) * 10 + digit(2)),
            _ => (digit(0) * 10 + digit(1), digit(2) * 10 + digit(3)),
        };
        ClockTime::new(hour, minute).map_err(|_| ScheduleError::InvalidClock(s.to_string()))
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    /// Minutes since midnight; 24:00 maps to 1440.
    pub fn minute_of_day(&self) -> u16 {
        u16::from(self.hour) * 60 + u16::from(self.minute)
    }
}

impl fmt::Display for ClockTime {
    /// Shortest form: `8`, `10`, `101`, `1001`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.minute == 0 {
            write!(f, "{}", self.hour)
        } else if self.hour < 10 {
            write!(f, "{}{:02}", self.hour, self.minute)
        } else {
            write!(f, "{:02}{:02}", self.hour, self.minute)
        }
    }
}

/// A half-open interval `[start, stop)` between two clock points on one
/// civil day, with `start < stop` strictly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockRange {
    start: ClockTime,
    stop: ClockTime,
}

impl ClockRange {
    pub fn new(start: ClockTime, stop: ClockTime) -> Result<Self> {
        if start >= stop {
            return Err(ScheduleError::InvalidClockRange(format!("{start}-{stop}")));
        }
        Ok(ClockRange { start, stop })
    }

    /// Parse `CLOCK-CLOCK`, splitting on the first `-`.
    pub fn parse(s: &str) -> Result<Self> {
        let (start, stop) = s
            .split_once('-')
            .ok_or_else(|| ScheduleError::InvalidClockRange(s.to_string()))?;
        let start = ClockTime::parse(start)?;
        let stop = ClockTime::parse(stop)?;
        ClockRange::new(start, stop).map_err(|_| ScheduleError::InvalidClockRange(s.to_string()))
    }

    pub fn start(&self) -> ClockTime {
        self.start
    }

    pub fn stop(&self) -> ClockTime {
        self.stop
    }

    pub fn contains(&self, t: ClockTime) -> bool {
        self.start <= t && t < self.stop
    }

    /// True when the two ranges share a clock point or sit on adjacent
    /// minutes (the earlier stop is the minute immediately preceding the
    /// later start, hour rollover included).
    pub fn overlaps_or_abuts(&self, other: &ClockRange) -> bool {
        let (earlier, later) = if self.start <= other.start {
            (self, other)
        } else {
            (other, self)
        };
        later.start.minute_of_day() <= earlier.stop.minute_of_day() + 1
    }

    /// Widen to the union of the two spans.
    pub fn merge(&mut self, other: &ClockRange) {
        self.start = self.start.min(other.start);
        self.stop = self.stop.max(other.stop);
    }

    /// Project onto the civil day of `anchor`, with `anchor` itself as
    /// the not-earlier-than reference for ambiguous clocks.
    ///
    /// A clock swallowed by the spring-forward gap shifts past the gap
    /// by its width (2:01 becomes 3:01): the clock that doesn't exist
    /// becomes the corresponding clock after the jump. A range whose
    /// endpoints both land on the gap exit degenerates to an empty span
    /// marking where the window would begin.
    pub fn to_span(&self, anchor: &DateTime<Tz>) -> Option<Span> {
        let start = clock_instant(self.start, anchor)?;
        let stop = clock_instant(self.stop, anchor)?;
        if stop < start {
            return None;
        }
        Some(Span::new(start, stop))
    }
}

fn clock_instant(clock: ClockTime, anchor: &DateTime<Tz>) -> Option<DateTime<Tz>> {
    let tz = anchor.timezone();
    let date = anchor.date_naive();
    if let Some(t) = civil::resolve_civil(
        tz,
        date,
        u32::from(clock.hour),
        u32::from(clock.minute),
        0,
        anchor,
    ) {
        return Some(t);
    }
    // spring-forward gap: carry the clock past it
    let (date, hour) = if clock.hour == 24 {
        (date.succ_opt()?, 0)
    } else {
        (date, u32::from(clock.hour))
    };
    let naive = date.and_hms_opt(hour, u32::from(clock.minute), 0)?;
    civil::resolve_shifting_gap(tz, naive)
}

impl fmt::Display for ClockRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.stop)
    }
}
