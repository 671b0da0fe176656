//! Weekday-composed schedules.
//!
//! Grammar: `DAYSPEC('.'DAYSPEC)*`, where a `DAYSPEC` is a run of
//! weekday letters followed by a day-schedule grammar, e.g.
//! `MWF8-12.T8-9`. The weekday alphabet is Sunday-first:
//!
//! | letter | day |
//! |---|---|
//! | `U` | Sunday |
//! | `M` | Monday |
//! | `T` | Tuesday |
//! | `W` | Wednesday |
//! | `R` | Thursday |
//! | `F` | Friday |
//! | `A` | Saturday |
//!
//! Later clauses merge into slots already populated rather than
//! overwriting them.

use chrono::{DateTime, Datelike};
use chrono_tz::Tz;

use crate::civil;
use crate::day::DaySchedule;
use crate::error::{Result, ScheduleError};
use crate::schedule::{Schedule, Span};

/// Weekday letters in slot order, Sunday = 0.
const WEEKDAY_LETTERS: &str = "UMTWRFA";

fn weekday_slot(c: char) -> Option<usize> {
    WEEKDAY_LETTERS.find(c)
}

/// Seven day schedules indexed by weekday, Sunday first. A weekday with
/// no entries holds an empty [`DaySchedule`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekSchedule {
    days: [DaySchedule; 7],
}

impl Default for WeekSchedule {
    fn default() -> Self {
        WeekSchedule {
            days: std::array::from_fn(|_| DaySchedule::default()),
        }
    }
}

impl WeekSchedule {
    /// Parse `DAYSPEC('.'DAYSPEC)*`.
    pub fn parse(s: &str) -> Result<Self> {
        let mut week = WeekSchedule::default();
        for clause in s.split('.') {
            week.merge(&Self::parse_clause(clause)?);
        }
        Ok(week)
    }

    /// Parse one `DAYSPEC`: a run of weekday letters, then a day grammar
    /// cloned into every named slot.
    fn parse_clause(clause: &str) -> Result<Self> {
        let letters = clause
            .chars()
            .take_while(|&c| weekday_slot(c).is_some())
            .count();
        if letters == 0 {
            return Err(ScheduleError::UnrecognizedSchedule(clause.to_string()));
        }
        let day = DaySchedule::parse(&clause[letters..])?;
        let mut week = WeekSchedule::default();
        for c in clause[..letters].chars() {
            if let Some(slot) = weekday_slot(c) {
                week.days[slot].merge(&day);
            }
        }
        Ok(week)
    }

    /// The schedule for one weekday slot (Sunday = 0).
    pub fn day(&self, slot: usize) -> &DaySchedule {
        &self.days[slot]
    }

    pub fn is_empty(&self) -> bool {
        self.days.iter().all(DaySchedule::is_empty)
    }

    /// Merge every populated slot of `src` into this week.
    pub fn merge(&mut self, src: &WeekSchedule) {
        for (dest, day) in self.days.iter_mut().zip(&src.days) {
            dest.merge(day);
        }
    }

    /// Project every populated weekday onto the week containing `t`,
    /// anchored at that week's Sunday.
    pub fn add_to_schedule(&self, t: &DateTime<Tz>, schedule: &mut Schedule) {
        let Some(week_start) = civil::start_of_week(t) else {
            return;
        };
        for (slot, day) in self.days.iter().enumerate() {
            if day.is_empty() {
                continue;
            }
            let Some(anchor) = civil::add_days(&week_start, slot as i64) else {
                continue;
            };
            day.add_to_schedule(&anchor, schedule);
        }
    }

    /// The earliest occurrence, at or after `t`, of any range in any
    /// populated weekday: scan weekday slots starting at `t`'s weekday and
    /// wrap forward into the next week, returning the first projected span
    /// whose stop is strictly after `t`.
    ///
    /// # Panics
    ///
    /// A populated week always has a next occurrence within seven days, so
    /// exhausting the scan is an invariant violation, not an input error.
    pub fn find_lower_bound(&self, t: &DateTime<Tz>) -> Span {
        if let Some(week_start) = civil::start_of_week(t) {
            let first = i64::from(t.weekday().num_days_from_sunday());
            for offset in 0..8 {
                let day = &self.days[((first + offset) % 7) as usize];
                if day.is_empty() {
                    continue;
                }
                let Some(anchor) = civil::add_days(&week_start, first + offset) else {
                    continue;
                };
                for range in day.ranges() {
                    if let Some(span) = range.to_span(&anchor) {
                        if *t < span.stop() {
                            return span;
                        }
                    }
                }
            }
        }
        panic!("week schedule has no occurrence within seven days of {t}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::America::New_York;

    fn week(s: &str) -> WeekSchedule {
        WeekSchedule::parse(s).unwrap()
    }

    fn populated(week: &WeekSchedule) -> Vec<usize> {
        (0..7).filter(|&i| !week.day(i).is_empty()).collect()
    }

    #[test]
    fn test_parse_single_clause() {
        let w = week("U8-9");
        assert_eq!(populated(&w), vec![0]);
        assert_eq!(w.day(0).to_string(), "8-9");
    }

    #[test]
    fn test_parse_letter_runs() {
        assert_eq!(populated(&week("UM1-2")), vec![0, 1]);
        assert_eq!(populated(&week("UU1-2")), vec![0]);
        assert_eq!(populated(&week("AUMTWRF1-2")), vec![0, 1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_parse_clauses_merge() {
        let w = week("MWF8-12.T8-9");
        assert_eq!(populated(&w), vec![1, 2, 3, 5]);
        assert_eq!(w.day(2).to_string(), "8-9");
        assert_eq!(w.day(3).to_string(), "8-12");

        // a repeated letter merges instead of overwriting
        let w = week("M8-9.M10-11");
        assert_eq!(w.day(1).to_string(), "8-9&10-11");
        let w = week("M8-10.M9-11");
        assert_eq!(w.day(1).to_string(), "8-11");
    }

    #[test]
    fn test_parse_rejects() {
        for bad in ["", "U", "U1", "U-", "U13-12", "X1-2", "M8-9.", ".", "8-9"] {
            assert!(WeekSchedule::parse(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn test_find_lower_bound_same_day() {
        // 2015-06-14 is a Sunday
        let t = New_York.with_ymd_and_hms(2015, 6, 14, 7, 0, 0).unwrap();
        let span = week("U8-9").find_lower_bound(&t);
        let start = New_York.with_ymd_and_hms(2015, 6, 14, 8, 0, 0).unwrap();
        assert_eq!(span.start(), start);
    }

    #[test]
    fn test_find_lower_bound_wraps_to_next_week() {
        let t = New_York.with_ymd_and_hms(2015, 6, 14, 9, 0, 0).unwrap();
        let span = week("U8-9").find_lower_bound(&t);
        let start = New_York.with_ymd_and_hms(2015, 6, 21, 8, 0, 0).unwrap();
        assert_eq!(span.start(), start);
    }

    #[test]
    fn test_find_lower_bound_within_current_range() {
        let t = New_York.with_ymd_and_hms(2015, 6, 14, 8, 30, 0).unwrap();
        let span = week("U8-9").find_lower_bound(&t);
        assert!(span.contains(&t));
    }

    #[test]
    fn test_find_lower_bound_scans_forward() {
        // Wednesday query against a Monday/Friday schedule lands on Friday
        let t = New_York.with_ymd_and_hms(2015, 6, 17, 12, 0, 0).unwrap();
        let span = week("MF8-9").find_lower_bound(&t);
        let start = New_York.with_ymd_and_hms(2015, 6, 19, 8, 0, 0).unwrap();
        assert_eq!(span.start(), start);
    }

    #[test]
    #[should_panic(expected = "no occurrence")]
    fn test_find_lower_bound_panics_on_empty_week() {
        let t = New_York.with_ymd_and_hms(2015, 6, 17, 12, 0, 0).unwrap();
        WeekSchedule::default().find_lower_bound(&t);
    }
}
