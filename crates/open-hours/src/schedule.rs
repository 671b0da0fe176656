//! Absolute time spans and the per-query interval set.
//!
//! A [`Schedule`] accumulates every occurrence relevant to one query
//! within one period (one civil day for a daily schedule, one week for a
//! weekly one, a single span for the literal kinds) under the same
//! sorted, non-overlapping, non-abutting invariant a day schedule keeps
//! for clock ranges, generalized to instants. It is built fresh for each
//! query and never persisted.

use std::fmt;

use chrono::DateTime;
use chrono_tz::Tz;

use crate::civil;

/// A half-open interval `[start, stop)` over absolute instants.
///
/// `start <= stop` always; a degenerate `start == stop` span carries no
/// coverage but can arise when a civil window is swallowed by a
/// spring-forward gap, marking where the window would begin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    start: DateTime<Tz>,
    stop: DateTime<Tz>,
}

impl Span {
    pub fn new(start: DateTime<Tz>, stop: DateTime<Tz>) -> Self {
        debug_assert!(start <= stop, "inverted span {start} .. {stop}");
        Span { start, stop }
    }

    pub fn start(&self) -> DateTime<Tz> {
        self.start
    }

    pub fn stop(&self) -> DateTime<Tz> {
        self.stop
    }

    pub fn contains(&self, t: &DateTime<Tz>) -> bool {
        self.start <= *t && *t < self.stop
    }

    /// True when the spans share an instant or touch exactly.
    pub fn overlaps_or_abuts(&self, other: &Span) -> bool {
        let start = self.start.max(other.start);
        let stop = self.stop.min(other.stop);
        start <= stop
    }

    /// Widen to the union of the two spans.
    pub fn merge(&mut self, other: &Span) {
        self.start = self.start.min(other.start);
        self.stop = self.stop.max(other.stop);
    }
}

impl fmt::Display for Span {
    /// `CCYYMMDDHHMMSS-CCYYMMDDHHMMSS` in the span's own timezone.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}",
            self.start.format("%Y%m%d%H%M%S"),
            self.stop.format("%Y%m%d%H%M%S")
        )
    }
}

/// What one schedule knows about an instant: whether it is inside, and
/// for how many more seconds that answer holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Remaining {
    pub in_schedule: bool,
    pub seconds: u32,
}

/// An ordered sequence of non-overlapping, non-abutting spans.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schedule {
    spans: Vec<Span>,
}

impl Schedule {
    pub fn new() -> Self {
        Schedule::default()
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Merge-insert under the same contract as a day schedule's: anything
    /// the new span overlaps or touches folds into it, and the union
    /// lands at its sorted position. The span count can shrink as a
    /// result of insertion.
    pub fn insert(&mut self, span: Span) {
        let mut merged = span;
        self.spans.retain(|s| {
            if merged.overlaps_or_abuts(s) {
                merged.merge(s);
                false
            } else {
                true
            }
        });
        let at = self
            .spans
            .iter()
            .position(|s| merged.start() < s.start())
            .unwrap_or(self.spans.len());
        self.spans.insert(at, merged);
        self.coalesce();
    }

    fn coalesce(&mut self) {
        for _ in 0..self.spans.len() {
            let mut changed = false;
            let mut i = 1;
            while i < self.spans.len() {
                if self.spans[i - 1].overlaps_or_abuts(&self.spans[i]) {
                    let absorbed = self.spans.remove(i);
                    self.spans[i - 1].merge(&absorbed);
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

    /// Scan for the first span whose stop is strictly after `t`. Inside
    /// it, the answer holds until the span's stop; before it, until the
    /// span's start. `None` means `t` is past every span materialized for
    /// this period.
    pub fn remaining(&self, t: &DateTime<Tz>) -> Option<Remaining> {
        for span in &self.spans {
            if span.stop() <= *t {
                continue;
            }
            return Some(if span.contains(t) {
                Remaining {
                    in_schedule: true,
                    seconds: clamped(civil::seconds_between(&span.stop(), t)),
                }
            } else {
                Remaining {
                    in_schedule: false,
                    seconds: clamped(civil::seconds_between(&span.start(), t)),
                }
            });
        }
        None
    }
}

fn clamped(seconds: i64) -> u32 {
    u32::try_from(seconds).unwrap_or(u32::MAX)
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, span) in self.spans.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{span}")?;
        }
        Ok(())
    }
}
