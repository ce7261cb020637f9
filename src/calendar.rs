use chrono::{Datelike, Month};
use derive_more::Constructor;
use std::fmt;

use crate::navigation::resolve_relative;

pub const MONTHS_PER_YEAR: i64 = 12;

const MONTHS: [Month; MONTHS_PER_YEAR as usize] = [
    Month::January,
    Month::February,
    Month::March,
    Month::April,
    Month::May,
    Month::June,
    Month::July,
    Month::August,
    Month::September,
    Month::October,
    Month::November,
    Month::December,
];

/// Zero-based month index, `0` being January.
///
/// The index is reduced into a single year first, so every `i64` maps onto a month.
pub(crate) fn month_from_index(index: i64) -> Month {
    MONTHS[index.rem_euclid(MONTHS_PER_YEAR) as usize]
}

/// A displayed calendar month. There is no day component.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Constructor)]
pub struct CalendarDate {
    year: i64,
    month: Month,
}

impl CalendarDate {
    /// Builds a date from raw integers, rolling an out-of-range month over
    /// into the neighbouring years.
    pub fn from_ym(year: i64, month: i64) -> Self {
        resolve_relative(year, month, 0)
    }

    /// The month containing `date`.
    pub fn of<D: Datelike>(date: &D) -> Self {
        CalendarDate {
            year: date.year().into(),
            month: month_from_index(date.month0().into()),
        }
    }

    pub fn year(&self) -> i64 {
        self.year
    }

    pub fn month(&self) -> Month {
        self.month
    }

    pub fn month_number(&self) -> u32 {
        self.month.number_from_month()
    }

    pub fn month_name(&self) -> &'static str {
        self.month.name()
    }

    pub fn shift(self, delta: i64) -> Self {
        resolve_relative(self.year, self.month_number().into(), delta)
    }

    pub fn previous(self) -> Self {
        self.shift(-1)
    }

    pub fn next(self) -> Self {
        self.shift(1)
    }

    /// Whether `date` falls into this month, e.g. to highlight today.
    pub fn contains<D: Datelike>(&self, date: &D) -> bool {
        *self == CalendarDate::of(date)
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.month_name(), self.year)
    }
}
