//! Parsed schedule specifications and their classification.
//!
//! One input string parses into one [`OpenHours`] value, a closed sum
//! over the four schedule grammars:
//!
//! - **Daily** — fixed windows repeating every civil day: `830-12&13-16`
//! - **Weekly** — weekday-composed windows: `MWF8-12.T8-9`
//! - **Raw** — one absolute literal window:
//!   `20150516120100-20150516120200` (optional leading `_`)
//! - **Now** — a window opening at the query instant: `now+1h30m`
//!
//! Classification inspects the first character and the position of the
//! first `-` (see [`classify`]); the chosen grammar must then parse in
//! full, with no fallback to another kind. Colons anywhere in the input
//! are cosmetic and are stripped before classification.

use chrono::{DateTime, Duration};
use chrono_tz::Tz;
use serde::Serialize;

use crate::civil::CivilStamp;
use crate::day::DaySchedule;
use crate::error::{Result, ScheduleError};
use crate::schedule::{Schedule, Span};
use crate::week::WeekSchedule;

/// The classification of a schedule string, decided before parsing.
///
/// `Weekdaily` and `Biweekly` are recognized but reserved: no grammar is
/// wired in for them and parsing one always fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Kind {
    Daily,
    Weekdaily,
    Weekly,
    Biweekly,
    Raw,
    Now,
    Invalid,
}

/// Decide which grammar a schedule string belongs to.
///
/// | first char | dash position | kind |
/// |---|---|---|
/// | digit | 14 | Raw |
/// | digit | ≤ 4 | Daily |
/// | digit | otherwise | Invalid |
/// | `MTWRFAU` | any | Weekly |
/// | `P` | any | Weekdaily (reserved) |
/// | `B` | any | Biweekly (reserved) |
/// | `_` | any | Raw |
/// | `now+` / `now-` prefix | — | Now |
/// | anything else | — | Invalid |
pub fn classify(s: &str) -> Kind {
    if s.starts_with("now+") || s.starts_with("now-") {
        return Kind::Now;
    }
    let Some(first) = s.chars().next() else {
        return Kind::Invalid;
    };
    match first {
        '0'..='9' => match s.find('-') {
            Some(14) => Kind::Raw,
            Some(offset) if offset <= 4 => Kind::Daily,
            _ => Kind::Invalid,
        },
        'P' => Kind::Weekdaily,
        'B' => Kind::Biweekly,
        '_' => Kind::Raw,
        c if "MTWRFAU".contains(c) => Kind::Weekly,
        _ => Kind::Invalid,
    }
}

/// One absolute literal window, kept as civil stamps so the parsed value
/// stays timezone-free; the stamps resolve to instants per query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StampRange {
    start: CivilStamp,
    stop: CivilStamp,
}

impl StampRange {
    /// Parse `CCYYMMDDHHMMSS-CCYYMMDDHHMMSS`, optionally prefixed `_`.
    pub fn parse(s: &str) -> Result<Self> {
        let body = s.strip_prefix('_').unwrap_or(s);
        let (start, stop) = body
            .split_once('-')
            .ok_or_else(|| ScheduleError::InvalidStampRange(s.to_string()))?;
        let start = CivilStamp::parse(start)?;
        let stop = CivilStamp::parse(stop)?;
        if start >= stop {
            return Err(ScheduleError::InvalidStampRange(s.to_string()));
        }
        Ok(StampRange { start, stop })
    }

    pub fn start(&self) -> CivilStamp {
        self.start
    }

    pub fn stop(&self) -> CivilStamp {
        self.stop
    }

    /// Resolve both stamps under `tz`. A stamp that falls in a DST gap,
    /// or a pair that inverts under resolution, yields no span.
    pub fn to_span(&self, tz: Tz) -> Option<Span> {
        let start = self.start.resolve(tz)?;
        let stop = self.stop.resolve(tz)?;
        if stop <= start {
            return None;
        }
        Some(Span::new(start, stop))
    }
}

impl std::fmt::Display for StampRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.start, self.stop)
    }
}

/// A window opening at the query instant: `now+1h30m` means "from now
/// until 90 minutes from now", re-anchored on every query.
///
/// Days accumulate separately from the sub-day units, mirroring the
/// grammar: `UNIT ∈ {d, h, m, s}`, duplicate units are additive
/// (`now+1s1m1s` is 62 seconds).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NowRange {
    days: i64,
    seconds: i64,
}

impl NowRange {
    /// Parse `"now" ['-' "now"]? '+' (DIGITS UNIT)+`.
    pub fn parse(s: &str) -> Result<Self> {
        let err = || ScheduleError::InvalidDuration(s.to_string());
        let rest = s.strip_prefix("now").ok_or_else(err)?;
        let rest = rest.strip_prefix("-now").unwrap_or(rest);
        let rest = rest.strip_prefix('+').ok_or_else(err)?;

        let mut days = 0i64;
        let mut seconds = 0i64;
        let mut num_buf = String::new();
        let mut found_any = false;
        for ch in rest.chars() {
            if ch.is_ascii_digit() {
                num_buf.push(ch);
            } else {
                if num_buf.is_empty() {
                    return Err(err());
                }
                let n: i64 = num_buf.parse().map_err(|_| err())?;
                num_buf.clear();
                found_any = true;
                match ch {
                    'd' => days += n,
                    'h' => seconds += n * 3600,
                    'm' => seconds += n * 60,
                    's' => seconds += n,
                    _ => return Err(err()),
                }
            }
        }
        // trailing number without a unit, or no components at all
        if !num_buf.is_empty() || !found_any {
            return Err(err());
        }
        Ok(NowRange { days, seconds })
    }

    pub fn days(&self) -> i64 {
        self.days
    }

    pub fn seconds(&self) -> i64 {
        self.seconds
    }

    /// The span `[t, t + days·86400 + seconds)`, anchored at the query
    /// instant itself. `None` only when the arithmetic leaves the
    /// representable calendar.
    pub fn to_span(&self, t: &DateTime<Tz>) -> Option<Span> {
        let total = self.days.checked_mul(86_400)?.checked_add(self.seconds)?;
        let stop = t.checked_add_signed(Duration::try_seconds(total)?)?;
        Some(Span::new(*t, stop))
    }
}

/// A parsed schedule specification: immutable after parsing, queryable
/// against arbitrary instants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenHours {
    Daily(DaySchedule),
    Weekly(WeekSchedule),
    Raw(StampRange),
    Now(NowRange),
}

/// The repeat cycle of a periodic schedule kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Day,
    Week,
}

impl OpenHours {
    /// Parse a schedule string: strip cosmetic colons, classify, then
    /// run the classified grammar. A string whose classified grammar
    /// fails is an error, never a fallback to another kind.
    ///
    /// # Errors
    ///
    /// Any malformed input returns a [`ScheduleError`]; there is no
    /// partially-valid result.
    pub fn parse(input: &str) -> Result<Self> {
        let cleaned: String = input.chars().filter(|&c| c != ':').collect();
        match classify(&cleaned) {
            Kind::Daily => Ok(OpenHours::Daily(DaySchedule::parse(&cleaned)?)),
            Kind::Weekly => Ok(OpenHours::Weekly(WeekSchedule::parse(&cleaned)?)),
            Kind::Raw => Ok(OpenHours::Raw(StampRange::parse(&cleaned)?)),
            Kind::Now => Ok(OpenHours::Now(NowRange::parse(&cleaned)?)),
            kind @ (Kind::Weekdaily | Kind::Biweekly) => Err(ScheduleError::UnsupportedKind(kind)),
            Kind::Invalid => Err(ScheduleError::UnrecognizedSchedule(input.to_string())),
        }
    }

    pub fn kind(&self) -> Kind {
        match self {
            OpenHours::Daily(_) => Kind::Daily,
            OpenHours::Weekly(_) => Kind::Weekly,
            OpenHours::Raw(_) => Kind::Raw,
            OpenHours::Now(_) => Kind::Now,
        }
    }

    /// The repeat cycle, or `None` for the one-shot kinds.
    pub fn period(&self) -> Option<Period> {
        match self {
            OpenHours::Daily(_) => Some(Period::Day),
            OpenHours::Weekly(_) => Some(Period::Week),
            OpenHours::Raw(_) | OpenHours::Now(_) => None,
        }
    }

    /// Project the occurrences for the period containing `t` into
    /// `schedule`.
    pub fn add_to_schedule(&self, t: &DateTime<Tz>, schedule: &mut Schedule) {
        match self {
            OpenHours::Daily(day) => day.add_to_schedule(t, schedule),
            OpenHours::Weekly(week) => week.add_to_schedule(t, schedule),
            OpenHours::Raw(stamps) => {
                if let Some(span) = stamps.to_span(t.timezone()) {
                    schedule.insert(span);
                }
            }
            OpenHours::Now(now) => {
                if let Some(span) = now.to_span(t) {
                    schedule.insert(span);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        for (input, kind) in [
            ("", Kind::Invalid),
            ("8-12", Kind::Daily),
            ("2015-2215", Kind::Daily),
            ("20-21", Kind::Daily),
            ("2000-21", Kind::Daily),
            ("P8-12", Kind::Weekdaily),
            ("MWF8-12", Kind::Weekly),
            ("U8-9", Kind::Weekly),
            ("BM8-12|T8-12", Kind::Biweekly),
            ("20150516121900-20150516122000", Kind::Raw),
            ("_20150516121900-20150516122000", Kind::Raw),
            ("_1900-2100", Kind::Raw),
            ("now+30m", Kind::Now),
            ("now-now+30m", Kind::Now),
            ("now", Kind::Invalid),
            ("12345", Kind::Invalid),
            ("201505161219-20150516", Kind::Invalid),
            ("abc", Kind::Invalid),
        ] {
            assert_eq!(classify(input), kind, "classifying {input:?}");
        }
    }

    #[test]
    fn test_reserved_kinds_never_parse() {
        assert!(matches!(
            OpenHours::parse("P8-12"),
            Err(ScheduleError::UnsupportedKind(Kind::Weekdaily))
        ));
        assert!(matches!(
            OpenHours::parse("BM8-12|T8-12"),
            Err(ScheduleError::UnsupportedKind(Kind::Biweekly))
        ));
    }

    #[test]
    fn test_classification_has_no_fallback() {
        // classified Raw by the `_` marker, then fails the Raw grammar
        assert!(OpenHours::parse("_1900-2100").is_err());
        // classified Daily by the dash offset, then fails the day grammar
        assert!(OpenHours::parse("13-12").is_err());
    }

    #[test]
    fn test_parse_strips_colons() {
        assert_eq!(
            OpenHours::parse("9:00-10:00").unwrap(),
            OpenHours::parse("900-1000").unwrap()
        );
        assert_eq!(
            OpenHours::parse("MWF8:30-12").unwrap(),
            OpenHours::parse("MWF830-12").unwrap()
        );
    }

    #[test]
    fn test_stamp_range_parse() {
        let range = StampRange::parse("20150516120100-20150516120200").unwrap();
        assert_eq!(range.to_string(), "20150516120100-20150516120200");
        let marked = StampRange::parse("_20150516120100-20150516120200").unwrap();
        assert_eq!(range, marked);
    }

    #[test]
    fn test_stamp_range_round_trip() {
        use chrono_tz::America::New_York;
        let range = StampRange::parse("20150516120100-20150516120200").unwrap();
        let span = range.to_span(New_York).unwrap();
        assert_eq!(StampRange::parse(&span.to_string()).unwrap(), range);
    }

    #[test]
    fn test_stamp_range_rejects() {
        for bad in [
            "20150516120200-20150516120100", // inverted
            "20150516120100-20150516120100", // empty
            "20150516120100",
            "20150516120100-",
            "_1900-2100",
        ] {
            assert!(StampRange::parse(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn test_now_parse_table() {
        for (input, days, seconds) in [
            ("now+1s", 0, 1),
            ("now+1m", 0, 60),
            ("now+1m1s", 0, 61),
            ("now+1h1m1s", 0, 3661),
            ("now+100h", 0, 360_000),
            ("now+1s1m1s", 0, 62),
            ("now+1d", 1, 0),
            ("now+2d30m", 2, 1800),
            ("now-now+1h30m", 0, 5400),
        ] {
            let now = NowRange::parse(input).unwrap();
            assert_eq!((now.days(), now.seconds()), (days, seconds), "parsing {input:?}");
        }
    }

    #[test]
    fn test_now_parse_rejects() {
        for bad in ["now", "now+", "now+1", "now+s", "now+1h2", "now+1x", "now-1h", "now+1h "] {
            assert!(NowRange::parse(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn test_kind_and_period() {
        let daily = OpenHours::parse("8-12").unwrap();
        assert_eq!(daily.kind(), Kind::Daily);
        assert_eq!(daily.period(), Some(Period::Day));

        let weekly = OpenHours::parse("U8-9").unwrap();
        assert_eq!(weekly.kind(), Kind::Weekly);
        assert_eq!(weekly.period(), Some(Period::Week));

        let raw = OpenHours::parse("20150516120100-20150516120200").unwrap();
        assert_eq!(raw.kind(), Kind::Raw);
        assert_eq!(raw.period(), None);

        let now = OpenHours::parse("now+30m").unwrap();
        assert_eq!(now.kind(), Kind::Now);
        assert_eq!(now.period(), None);
    }
}
