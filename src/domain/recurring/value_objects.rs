use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::invoice::ValueObjectError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
  Daily,
  Weekly,
  Monthly,
  Quarterly,
  Yearly,
}

impl Frequency {
  pub fn as_str(&self) -> &'static str {
    match self {
      Frequency::Daily => "daily",
      Frequency::Weekly => "weekly",
      Frequency::Monthly => "monthly",
      Frequency::Quarterly => "quarterly",
      Frequency::Yearly => "yearly",
    }
  }

  /// Month step for the calendar-based frequencies
  pub fn months(&self) -> Option<u32> {
    match self {
      Frequency::Monthly => Some(1),
      Frequency::Quarterly => Some(3),
      Frequency::Yearly => Some(12),
      Frequency::Daily | Frequency::Weekly => None,
    }
  }
}

impl FromStr for Frequency {
  type Err = ValueObjectError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_lowercase().as_str() {
      "daily" => Ok(Frequency::Daily),
      "weekly" => Ok(Frequency::Weekly),
      "monthly" => Ok(Frequency::Monthly),
      "quarterly" => Ok(Frequency::Quarterly),
      "yearly" => Ok(Frequency::Yearly),
      _ => Err(ValueObjectError::InvalidFrequency(format!(
        "Unknown frequency: {}",
        s
      ))),
    }
  }
}

impl fmt::Display for Frequency {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// Weekday (0 = Monday .. 6 = Sunday) for weekly schedules, day of month
/// (1..=31) for everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleDay(u32);

impl ScheduleDay {
  pub fn new(frequency: Frequency, day: i32) -> Result<Self, ValueObjectError> {
    let valid = match frequency {
      Frequency::Weekly => (0..=6).contains(&day),
      _ => (1..=31).contains(&day),
    };
    if !valid {
      let range = if frequency == Frequency::Weekly {
        "0-6"
      } else {
        "1-31"
      };
      return Err(ValueObjectError::InvalidScheduleDay(format!(
        "{} schedules need a day in {}, got {}",
        frequency, range, day
      )));
    }
    Ok(Self(day as u32))
  }

  pub fn value(&self) -> u32 {
    self.0
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_frequency_parsing() {
    assert_eq!(Frequency::from_str("Quarterly").unwrap(), Frequency::Quarterly);
    assert!(matches!(
      Frequency::from_str("biweekly"),
      Err(ValueObjectError::InvalidFrequency(_))
    ));
  }

  #[test]
  fn test_schedule_day_depends_on_frequency() {
    assert!(ScheduleDay::new(Frequency::Weekly, 0).is_ok());
    assert!(ScheduleDay::new(Frequency::Weekly, 6).is_ok());
    assert!(ScheduleDay::new(Frequency::Weekly, 7).is_err());
    assert!(ScheduleDay::new(Frequency::Monthly, 0).is_err());
    assert!(ScheduleDay::new(Frequency::Monthly, 31).is_ok());
    assert!(ScheduleDay::new(Frequency::Yearly, 32).is_err());
    assert!(ScheduleDay::new(Frequency::Daily, -1).is_err());
  }
}
