//! One civil day's schedule: an ordered set of non-overlapping clock
//! ranges and the merge engine that keeps it that way.
//!
//! The grammar is `RANGE('&'RANGE)*`, e.g. `830-12&13-1630`. Parse order
//! never matters: every range goes through the same merge-insert, which
//! is associative and commutative with respect to the final coverage.

use std::fmt;

use chrono::DateTime;
use chrono_tz::Tz;

use crate::clock::ClockRange;
use crate::error::{Result, ScheduleError};
use crate::schedule::Schedule;

/// An ordered sequence of clock ranges, mutually non-overlapping and
/// non-abutting, ascending by start.
///
/// The invariant is maintained by construction: the only way to add a
/// range is [`DaySchedule::insert`], which merges anything it touches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DaySchedule {
    ranges: Vec<ClockRange>,
}

impl DaySchedule {
    /// Parse `RANGE('&'RANGE)*`; at least one range is required.
    pub fn parse(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(ScheduleError::InvalidClockRange(s.to_string()));
        }
        let mut day = DaySchedule::default();
        for part in s.split('&') {
            day.insert(ClockRange::parse(part)?);
        }
        Ok(day)
    }

    pub fn ranges(&self) -> &[ClockRange] {
        &self.ranges
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Merge-insert: fold every existing range that overlaps or abuts the
    /// new one into it, then place the union at the first position whose
    /// start exceeds the new start.
    pub fn insert(&mut self, range: ClockRange) {
        let mut merged = range;
        self.ranges.retain(|r| {
            if merged.overlaps_or_abuts(r) {
                merged.merge(r);
                false
            } else {
                true
            }
        });
        let at = self
            .ranges
            .iter()
            .position(|r| merged.start() < r.start())
            .unwrap_or(self.ranges.len());
        self.ranges.insert(at, merged);
        self.coalesce();
    }

    /// Repeatedly merge adjacent neighbors until a pass changes nothing.
    /// A three-way merge can cascade, so one pass is not enough; the
    /// outer loop is bounded by the range count.
    fn coalesce(&mut self) {
        for _ in 0..self.ranges.len() {
            let mut changed = false;
            let mut i = 1;
            while i < self.ranges.len() {
                if self.ranges[i - 1].overlaps_or_abuts(&self.ranges[i]) {
                    let absorbed = self.ranges.remove(i);
                    self.ranges[i - 1].merge(&absorbed);
                    changed = true;
                } else {
                    i += 1;
                }
            }
            if !changed {
                break;
            }
        }
    }

    /// Insert every range of `src`, one at a time.
    pub fn merge(&mut self, src: &DaySchedule) {
        for range in &src.ranges {
            self.insert(*range);
        }
    }

    /// Project every range onto the civil day of `anchor`. Occurrences
    /// that cannot be resolved (DST gap) are skipped.
    pub fn add_to_schedule(&self, anchor: &DateTime<Tz>, schedule: &mut Schedule) {
        for range in &self.ranges {
            if let Some(span) = range.to_span(anchor) {
                schedule.insert(span);
            }
        }
    }
}

impl fmt::Display for DaySchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, range) in self.ranges.iter().enumerate() {
            if i > 0 {
                f.write_str("&")?;
            }
            write!(f, "{range}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ClockTime;
    use proptest::prelude::*;

    fn day(s: &str) -> DaySchedule {
        DaySchedule::parse(s).unwrap()
    }

    #[test]
    fn test_parse_rejects() {
        for bad in ["", "U", "1", "-", "13-12", "0-1&", "&0-1", "0-1&2"] {
            assert!(DaySchedule::parse(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn test_merge_table() {
        for (a, b, expected) in [
            ("6-7", "8-9", "6-7&8-9"),
            ("6-7", "7-8", "6-8"),
            ("6-730", "7-8", "6-8"),
            ("6-730&8-9", "7-8", "6-9"),
        ] {
            let mut dest = day(a);
            dest.merge(&day(b));
            assert_eq!(dest.to_string(), expected, "{a} + {b}");
        }
    }

    #[test]
    fn test_parse_order_is_irrelevant() {
        assert_eq!(day("830-12&13-14"), day("13-14&830-12"));
        assert_eq!(day("6-7&7-8&8-9"), day("6-9"));
    }

    #[test]
    fn test_three_way_cascade() {
        // inserting the middle range bridges both neighbors
        let mut d = day("6-7&8-9");
        d.insert(ClockRange::parse("7-8").unwrap());
        assert_eq!(d.to_string(), "6-9");
        assert_eq!(d.ranges().len(), 1);
    }

    #[test]
    fn test_round_trip() {
        for s in ["830-12", "830-12&13-14", "6-7&8-9", "0-2400", "1001-1234&13-14"] {
            assert_eq!(day(&day(s).to_string()), day(s), "round trip of {s:?}");
        }
    }

    fn minutes_to_clock(m: u16) -> ClockTime {
        ClockTime::new((m / 60) as u8, (m % 60) as u8).unwrap()
    }

    fn arb_range() -> impl Strategy<Value = ClockRange> {
        (0u16..1440).prop_flat_map(|start| {
            (start + 1..=1440).prop_map(move |stop| {
                ClockRange::new(minutes_to_clock(start), minutes_to_clock(stop)).unwrap()
            })
        })
    }

    fn covers(day: &DaySchedule, minute: u16) -> bool {
        day.ranges().iter().any(|r| {
            r.start().minute_of_day() <= minute && minute < r.stop().minute_of_day()
        })
    }

    proptest! {
        #[test]
        fn prop_insert_is_idempotent(ranges in prop::collection::vec(arb_range(), 1..6)) {
            let mut day = DaySchedule::default();
            for r in &ranges {
                day.insert(*r);
            }
            let once = day.clone();
            for r in &ranges {
                day.insert(*r);
            }
            prop_assert_eq!(day, once);
        }

        #[test]
        fn prop_insert_is_order_independent(ranges in prop::collection::vec(arb_range(), 1..6)) {
            let mut forward = DaySchedule::default();
            for r in &ranges {
                forward.insert(*r);
            }
            let mut backward = DaySchedule::default();
            for r in ranges.iter().rev() {
                backward.insert(*r);
            }
            prop_assert_eq!(forward, backward);
        }

        #[test]
        fn prop_merge_conserves_coverage(ranges in prop::collection::vec(arb_range(), 1..6)) {
            let mut day = DaySchedule::default();
            for r in &ranges {
                day.insert(*r);
            }
            for r in &ranges {
                for minute in r.start().minute_of_day()..r.stop().minute_of_day() {
                    prop_assert!(covers(&day, minute), "lost minute {} of {}", minute, r);
                }
            }
        }

        #[test]
        fn prop_invariant_holds(ranges in prop::collection::vec(arb_range(), 1..6)) {
            let mut day = DaySchedule::default();
            for r in &ranges {
                day.insert(*r);
            }
            for pair in day.ranges().windows(2) {
                prop_assert!(pair[0].start() < pair[1].start());
                // neither overlapping nor abutting: a full minute apart
                prop_assert!(
                    pair[0].stop().minute_of_day() + 1 < pair[1].start().minute_of_day()
                );
            }
        }
    }
}
