//! # open-hours
//!
//! Deterministic open-hours schedules for gating and countdown displays.
//!
//! One question, answered cheaply and correctly: given a compact textual
//! schedule and a point in time, is that time inside the schedule, and
//! for how many more seconds is that answer guaranteed to hold? The
//! engine is numerically exact across daylight-saving transitions,
//! including 23- and 25-hour days and wall clocks that occur zero or two
//! times on a given civil day.
//!
//! Four grammars are accepted:
//!
//! - Daily windows: `"830-12"`, `"0830-1200&1300-1600"`
//! - Weekday-composed windows: `"MWF8-12.T8-9"` (Sunday is `U`,
//!   Saturday is `A`)
//! - Absolute literal windows: `"20150516120100-20150516120200"`
//! - Query-anchored windows: `"now+1h30m"`
//!
//! Colons are cosmetic (`"9:00-10:00"` parses like `"900-1000"`).
//!
//! All computation takes explicit inputs: the caller provides the query
//! instant and its timezone; nothing reads the system clock.
//!
//! ## Modules
//!
//! - [`civil`] — DST-safe conversion between instants and civil fields
//! - [`clock`] — clock-of-day points and ranges, and their grammar
//! - [`day`] — one civil day's merged range set
//! - [`week`] — weekday-composed schedules
//! - [`schedule`] — absolute spans and the per-query interval set
//! - [`hours`] — classification and the parsed schedule specification
//! - [`query`] — the remaining-time query engine
//! - [`error`] — error types
//!
//! ## Example
//!
//! ```
//! use chrono::TimeZone;
//! use chrono_tz::America::New_York;
//! use open_hours::OpenHours;
//!
//! let hours = OpenHours::parse("MWF9-17").unwrap();
//! // 2015-06-15 is a Monday
//! let t = New_York.with_ymd_and_hms(2015, 6, 15, 16, 30, 0).unwrap();
//! let result = hours.remaining_at(t);
//! assert!(result.in_schedule);
//! assert_eq!(result.seconds, 30 * 60); // closes in 30 minutes
//! ```

pub mod civil;
pub mod clock;
pub mod day;
pub mod error;
pub mod hours;
pub mod query;
pub mod schedule;
pub mod week;

pub use civil::CivilStamp;
pub use clock::{ClockRange, ClockTime};
pub use day::DaySchedule;
pub use error::{Result, ScheduleError};
pub use hours::{classify, Kind, NowRange, OpenHours, Period, StampRange};
pub use query::{remaining, RemainingResult};
pub use schedule::{Schedule, Span};
pub use week::WeekSchedule;
