//! Calendar helpers shared by the billing domains.
//!
//! Holds the clock port (so "today" can be pinned in tests and in the sweep)
//! and month arithmetic that honors variable month lengths.

use chrono::{Datelike, Months, NaiveDate, Utc};

/// Source of the current business date
pub trait Clock: Send + Sync {
  fn today(&self) -> NaiveDate;
}

/// Wall-clock date in UTC
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn today(&self) -> NaiveDate {
    Utc::now().date_naive()
  }
}

/// Clock pinned to a single date
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
  fn today(&self) -> NaiveDate {
    self.0
  }
}

/// Number of days in the given month (handles leap years)
pub fn days_in_month(year: i32, month: u32) -> u32 {
  let (next_year, next_month) = if month == 12 {
    (year + 1, 1)
  } else {
    (year, month + 1)
  };

  NaiveDate::from_ymd_opt(next_year, next_month, 1)
    .and_then(|first_of_next| first_of_next.pred_opt())
    .map(|last| last.day())
    .unwrap_or(28)
}

/// Returns `date` with its day replaced by `target_day`, clamped to the last
/// day of that month.
pub fn with_day_clamped(date: NaiveDate, target_day: u32) -> NaiveDate {
  let last = days_in_month(date.year(), date.month());
  let day = target_day.clamp(1, last);
  date.with_day(day).unwrap_or(date)
}

/// Adds `months` to `date`, then moves to `target_day` of the resulting month,
/// falling back to the month's last day when `target_day` does not exist.
pub fn add_months_clamped(date: NaiveDate, months: u32, target_day: u32) -> Option<NaiveDate> {
  // checked_add_months clamps to the end of the target month, so the day can
  // be replaced afterwards without overflowing into the following month.
  let shifted = date.checked_add_months(Months::new(months))?;
  Some(with_day_clamped(shifted, target_day))
}
