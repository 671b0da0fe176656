//! The remaining-time query engine.
//!
//! A query materializes the occurrences of one period into a transient
//! [`Schedule`](crate::schedule::Schedule), asks it what it knows about
//! the instant, and (for the periodic kinds) walks period by period
//! until an answer exists, accumulating the distance walked. The walk is
//! iterative and bounded: a period with any range resolves within one
//! step, and only a DST gap can empty a projected period, which never
//! happens twice in a row.

use chrono::{DateTime, TimeZone};
use chrono_tz::Tz;
use serde::Serialize;

use crate::civil;
use crate::hours::{OpenHours, Period};
use crate::schedule::Schedule;

/// Periods that project no usable occurrence are only ever produced by
/// DST gaps, so the period walk always resolves in one or two steps;
/// anything near this bound is a bug, not a slow query.
const MAX_PERIOD_STEPS: usize = 8;

/// The answer to one query.
///
/// `valid == false` means the schedule string itself was unusable and
/// the other two fields are meaningless. Otherwise `seconds` is how long
/// the `in_schedule` answer is guaranteed to hold; a non-periodic
/// schedule that has fully elapsed reports `in_schedule == false` with
/// `seconds == 0`, meaning "no further bound is computed", not "open
/// forever".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RemainingResult {
    pub valid: bool,
    pub in_schedule: bool,
    pub seconds: u32,
}

impl RemainingResult {
    pub fn invalid() -> Self {
        RemainingResult {
            valid: false,
            in_schedule: false,
            seconds: 0,
        }
    }

    fn answer(in_schedule: bool, seconds: u32) -> Self {
        RemainingResult {
            valid: true,
            in_schedule,
            seconds,
        }
    }
}

impl OpenHours {
    /// Whether `t` is inside this schedule, and for how many more
    /// seconds that answer holds.
    ///
    /// The timezone travels with `t`; the same parsed schedule can be
    /// queried under any timezone and at any instant.
    pub fn remaining_at(&self, t: DateTime<Tz>) -> RemainingResult {
        let mut anchor = t;
        let mut carried: i64 = 0;
        for _ in 0..MAX_PERIOD_STEPS {
            let mut schedule = Schedule::new();
            self.add_to_schedule(&anchor, &mut schedule);
            if let Some(found) = schedule.remaining(&anchor) {
                if carried == 0 {
                    return RemainingResult::answer(found.in_schedule, found.seconds);
                }
                // an answer reached across period boundaries is always
                // out-of-schedule, measured from the original instant
                let seconds = carried.saturating_add(i64::from(found.seconds));
                return RemainingResult::answer(false, u32::try_from(seconds).unwrap_or(u32::MAX));
            }
            let Some(period) = self.period() else {
                return RemainingResult::answer(false, 0);
            };
            let next = match period {
                Period::Day => civil::next_day_start(&anchor),
                Period::Week => civil::next_week_start(&anchor),
            };
            let Some(next) = next else {
                panic!("no representable period start after {anchor}");
            };
            carried += civil::seconds_between(&next, &anchor);
            anchor = next;
        }
        panic!("schedule projected no occurrence within {MAX_PERIOD_STEPS} periods of {t}");
    }
}

/// Evaluate `input` against a seconds-since-epoch instant under `tz`.
///
/// This is the string-in/answer-out boundary: an unparseable schedule
/// yields the invalid result rather than an error, so callers can query
/// untrusted input without a separate validation branch.
///
/// # Examples
///
/// ```
/// use chrono_tz::America::New_York;
/// use open_hours::remaining;
///
/// // 2015-06-15 10:00:00 in New York, inside the 08:30-12:00 window
/// let result = remaining("830-12", 1_434_376_800, New_York);
/// assert!(result.valid);
/// assert!(result.in_schedule);
/// assert_eq!(result.seconds, 7200);
///
/// assert!(!remaining("not a schedule", 1_434_376_800, New_York).valid);
/// ```
pub fn remaining(input: &str, timestamp: i64, tz: Tz) -> RemainingResult {
    let Ok(hours) = OpenHours::parse(input) else {
        return RemainingResult::invalid();
    };
    let Some(t) = tz.timestamp_opt(timestamp, 0).single() else {
        return RemainingResult::invalid();
    };
    hours.remaining_at(t)
}
