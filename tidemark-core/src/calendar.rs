use std::collections::BTreeSet;

use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Serializable holiday configuration for one market.
///
/// Holiday lists are data, not logic: load a different `CalendarConfig` to
/// swap markets.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// Non-weekend dates on which the market is closed.
    pub holidays: Vec<NaiveDate>,
}

/// Determines which calendar dates are tradeable: weekends are always
/// excluded, plus a configurable holiday set.
#[derive(Debug, Clone, Default)]
pub struct BusinessCalendar {
    holidays: BTreeSet<NaiveDate>,
}

impl BusinessCalendar {
    /// A calendar that only excludes weekends.
    #[must_use]
    pub fn weekends_only() -> Self {
        Self::default()
    }

    /// A calendar excluding weekends and the given holidays.
    #[must_use]
    pub fn with_holidays<I: IntoIterator<Item = NaiveDate>>(holidays: I) -> Self {
        Self {
            holidays: holidays.into_iter().collect(),
        }
    }

    /// Build from a deserialized market configuration.
    #[must_use]
    pub fn from_config(cfg: &CalendarConfig) -> Self {
        Self::with_holidays(cfg.holidays.iter().copied())
    }

    /// True when `date` is neither a weekend nor a configured holiday.
    #[must_use]
    pub fn is_business_day(&self, date: NaiveDate) -> bool {
        !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) && !self.holidays.contains(&date)
    }

    /// The nearest tradeable day at or before `date`. Identity for dates that
    /// are already tradeable.
    #[must_use]
    pub fn previous_business_day(&self, mut date: NaiveDate) -> NaiveDate {
        while !self.is_business_day(date) {
            date = date - Days::new(1);
        }
        date
    }

    /// Signed count of tradeable days in `[d1, d2)`.
    ///
    /// Monday to Friday of the same holiday-free week yields 4; a holiday
    /// inside the range reduces the count by exactly one per holiday.
    /// Reversing the arguments negates the result.
    #[must_use]
    pub fn business_days_between(&self, d1: NaiveDate, d2: NaiveDate) -> i64 {
        if d1 > d2 {
            return -self.business_days_between(d2, d1);
        }
        let mut count = 0i64;
        let mut date = d1;
        while date < d2 {
            if self.is_business_day(date) {
                count += 1;
            }
            date = date + Days::new(1);
        }
        count
    }

    /// Lazy, finite, restartable iterator over the tradeable days in
    /// `[from, to]`, ascending. Clone it to restart.
    #[must_use]
    pub fn iter(&self, from: NaiveDate, to: NaiveDate) -> BusinessDays<'_> {
        BusinessDays {
            calendar: self,
            next: from,
            end: to,
        }
    }
}

/// Iterator returned by [`BusinessCalendar::iter`].
#[derive(Debug, Clone)]
pub struct BusinessDays<'a> {
    calendar: &'a BusinessCalendar,
    next: NaiveDate,
    end: NaiveDate,
}

impl Iterator for BusinessDays<'_> {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        while self.next <= self.end {
            let date = self.next;
            self.next = date + Days::new(1);
            if self.calendar.is_business_day(date) {
                return Some(date);
            }
        }
        None
    }
}
