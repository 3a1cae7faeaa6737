//! Next-date computation for recurring schedules.
//!
//! Two rules live here and they are deliberately different:
//! - `next_after_firing` offsets from the date a schedule fired.
//! - `initial_date` looks for the next future occurrence of the schedule day
//!   counted from today, used only when a schedule is created without an
//!   explicit start date.

use chrono::{Datelike, Duration, NaiveDate};

use super::value_objects::{Frequency, ScheduleDay};
use crate::domain::calendar::{add_months_clamped, with_day_clamped};

pub fn next_after_firing(
  frequency: Frequency,
  schedule_day: ScheduleDay,
  firing_date: NaiveDate,
) -> Option<NaiveDate> {
  match frequency {
    Frequency::Daily => firing_date.checked_add_signed(Duration::days(1)),
    Frequency::Weekly => firing_date.checked_add_signed(Duration::days(7)),
    Frequency::Monthly | Frequency::Quarterly | Frequency::Yearly => {
      let months = frequency.months()?;
      add_months_clamped(firing_date, months, schedule_day.value())
    }
  }
}

pub fn initial_date(
  frequency: Frequency,
  schedule_day: ScheduleDay,
  today: NaiveDate,
) -> Option<NaiveDate> {
  match frequency {
    Frequency::Daily => today.succ_opt(),
    Frequency::Weekly => {
      let current = today.weekday().num_days_from_monday();
      let target = schedule_day.value();
      let ahead = (target + 7 - current) % 7;
      let ahead = if ahead == 0 { 7 } else { ahead };
      today.checked_add_signed(Duration::days(ahead as i64))
    }
    Frequency::Monthly | Frequency::Quarterly | Frequency::Yearly => {
      let this_month = with_day_clamped(today, schedule_day.value());
      if this_month > today {
        Some(this_month)
      } else {
        add_months_clamped(today, 1, schedule_day.value())
      }
    }
  }
}
