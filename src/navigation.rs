use chrono::Datelike;
use serde_with::DeserializeFromStr;
use std::convert::TryFrom;
use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::calendar::{month_from_index, CalendarDate, MONTHS_PER_YEAR};
use crate::error::*;
use crate::query::{QueryState, MONTH_KEY, YEAR_KEY};

/// Moves `delta` months away from `year`/`month`.
///
/// Total over all inputs: `month` may lie outside `1..=12` and `delta` may span
/// several years. Years beyond the `i64` range saturate.
pub fn resolve_relative(year: i64, month: i64, delta: i64) -> CalendarDate {
    let months = MONTHS_PER_YEAR as i128;
    let offset = i128::from(month) - 1 + i128::from(delta);

    let year = i128::from(year) + offset.div_euclid(months);
    let year = i64::try_from(year).unwrap_or(if year < 0 { i64::MIN } else { i64::MAX });

    CalendarDate::new(year, month_from_index(offset.rem_euclid(months) as i64))
}

/// Going back to today never writes today's values, it only removes the
/// explicit position so the page falls back to its default.
pub fn resolve_reset() -> QueryUpdate {
    QueryUpdate::Clear
}

/// Reads the displayed month from the query. `year` and `month` fall back to
/// `now` independently of each other.
pub fn parse_current_state<D: Datelike>(query: &QueryState, now: &D) -> CalendarDate {
    let year = param_or(query, YEAR_KEY, now.year().into());
    let month = param_or(query, MONTH_KEY, now.month().into());

    CalendarDate::from_ym(year, month)
}

fn param_or(query: &QueryState, key: &str, default: i64) -> i64 {
    match (query.get(key), query.get_int(key)) {
        (_, Some(value)) => value,
        (Some(raw), None) => {
            log::debug!("Ignoring non-numeric '{}' value '{}'", key, raw);
            default
        }
        (None, None) => default,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavigationRequest {
    Relative(i64),
    Reset,
}

impl NavigationRequest {
    pub fn previous() -> Self {
        NavigationRequest::Relative(-1)
    }

    pub fn next() -> Self {
        NavigationRequest::Relative(1)
    }

    pub fn today() -> Self {
        NavigationRequest::Reset
    }
}

/// A user facing navigation action, bound to keys in the configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, DeserializeFromStr)]
pub enum Trigger {
    Previous,
    Next,
    Today,
}

impl Trigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trigger::Previous => "previous",
            Trigger::Next => "next",
            Trigger::Today => "today",
        }
    }
}

impl FromStr for Trigger {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "previous" | "prev" => Ok(Trigger::Previous),
            "next" => Ok(Trigger::Next),
            "today" => Ok(Trigger::Today),
            _ => Err(Error::new(
                ErrorKind::UnknownTrigger,
                &format!("'{}' is neither previous, next nor today", s),
            )),
        }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl From<Trigger> for NavigationRequest {
    fn from(trigger: Trigger) -> Self {
        match trigger {
            Trigger::Previous => NavigationRequest::previous(),
            Trigger::Next => NavigationRequest::next(),
            Trigger::Today => NavigationRequest::today(),
        }
    }
}

/// What the caller has to do to the query string of the page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QueryUpdate {
    Set(CalendarDate),
    Clear,
}

impl QueryUpdate {
    pub fn apply(&self, query: &mut QueryState) {
        match self {
            QueryUpdate::Set(date) => query.replace(vec![
                (YEAR_KEY, Some(date.year().to_string())),
                (MONTH_KEY, Some(date.month_number().to_string())),
            ]),
            QueryUpdate::Clear => query.replace(vec![(YEAR_KEY, None), (MONTH_KEY, None)]),
        }
    }

    pub fn apply_to_url(&self, url: &mut Url) {
        let mut query = QueryState::from_url(url);
        self.apply(&mut query);
        query.apply_to(url);
    }
}

pub fn resolve<D: Datelike>(
    request: &NavigationRequest,
    query: &QueryState,
    now: &D,
) -> QueryUpdate {
    match request {
        NavigationRequest::Relative(delta) => {
            let current = parse_current_state(query, now);
            let target = current.shift(*delta);
            log::debug!("Navigating {} months from {} to {}", delta, current, target);
            QueryUpdate::Set(target)
        }
        NavigationRequest::Reset => resolve_reset(),
    }
}

/// The address to load for `request` when the page currently shows `url`.
pub fn navigate<D: Datelike>(url: &Url, request: &NavigationRequest, now: &D) -> Url {
    let mut target = url.clone();
    resolve(request, &QueryState::from_url(url), now).apply_to_url(&mut target);
    target
}

/// The displayed month together with its navigation targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MonthOverview {
    pub current: CalendarDate,
    pub previous: CalendarDate,
    pub next: CalendarDate,
    pub is_current_month: bool,
}

pub fn overview<D: Datelike>(query: &QueryState, now: &D) -> MonthOverview {
    let current = parse_current_state(query, now);

    MonthOverview {
        current,
        previous: current.previous(),
        next: current.next(),
        is_current_month: current.contains(now),
    }
}
