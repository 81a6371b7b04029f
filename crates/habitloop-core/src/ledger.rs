//! Per-habit completion ledger.
//!
//! Set semantics over calendar dates: the wire format is an array and some
//! legacy records contain duplicates, so everything is deduplicated on the
//! way in. Dates compare as calendar dates in the user's local timezone;
//! no time-of-day component participates in equality.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The set of calendar dates a habit was marked done on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompletionLedger {
    dates: BTreeSet<NaiveDate>,
}

impl CompletionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Membership test for `date`.
    pub fn is_completed(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }

    /// Flip membership of `date` and return the new state.
    ///
    /// Two identical toggles cancel out exactly; toggle is not "set true".
    pub fn toggle(&mut self, date: NaiveDate) -> bool {
        if self.dates.remove(&date) {
            false
        } else {
            self.dates.insert(date);
            true
        }
    }

    /// Total completed dates. Exposed as the "total completions" metric,
    /// distinct from the scheduled-occurrence streak.
    pub fn count(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Completed dates in ascending order.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.dates.iter().copied()
    }
}

impl FromIterator<NaiveDate> for CompletionLedger {
    fn from_iter<I: IntoIterator<Item = NaiveDate>>(iter: I) -> Self {
        Self {
            dates: iter.into_iter().collect(),
        }
    }
}
