use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::value_objects::{Frequency, ScheduleDay};
use crate::domain::invoice::{CurrencyCode, LineItemData, PaymentTermsDays, TaxOverrides};

/// Invoice template carried by a schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceTemplate {
  pub currency: Option<CurrencyCode>,
  pub payment_terms_days: Option<PaymentTermsDays>,
  pub notes: Option<String>,
  pub tax: TaxOverrides,
  pub line_items: Vec<LineItemData>,
}

// Recurring Schedule - Active or Paused; deletion removes it outright
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringSchedule {
  pub id: Uuid,
  pub client_id: Uuid,
  pub frequency: Frequency,
  pub schedule_day: ScheduleDay,
  pub template: InvoiceTemplate,
  pub is_active: bool,
  pub next_invoice_date: NaiveDate,
  pub last_invoice_id: Option<Uuid>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl RecurringSchedule {
  pub fn new(
    client_id: Uuid,
    frequency: Frequency,
    schedule_day: ScheduleDay,
    template: InvoiceTemplate,
    next_invoice_date: NaiveDate,
  ) -> Self {
    let now = Utc::now();
    Self {
      id: Uuid::new_v4(),
      client_id,
      frequency,
      schedule_day,
      template,
      is_active: true,
      next_invoice_date,
      last_invoice_id: None,
      created_at: now,
      updated_at: now,
    }
  }

  pub fn pause(&mut self) {
    self.is_active = false;
    self.updated_at = Utc::now();
  }

  pub fn resume(&mut self) {
    self.is_active = true;
    self.updated_at = Utc::now();
  }

  pub fn is_due(&self, today: NaiveDate) -> bool {
    self.is_active && self.next_invoice_date <= today
  }

  /// Records a firing. The next date never moves backwards.
  pub fn record_firing(&mut self, invoice_id: Uuid, computed_next: NaiveDate) {
    self.last_invoice_id = Some(invoice_id);
    self.next_invoice_date = computed_next.max(self.next_invoice_date);
    self.updated_at = Utc::now();
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  fn schedule(next: NaiveDate) -> RecurringSchedule {
    RecurringSchedule::new(
      Uuid::new_v4(),
      Frequency::Monthly,
      ScheduleDay::new(Frequency::Monthly, 15).unwrap(),
      InvoiceTemplate {
        currency: None,
        payment_terms_days: None,
        notes: None,
        tax: TaxOverrides::default(),
        line_items: vec![],
      },
      next,
    )
  }

  #[test]
  fn test_pause_and_resume_control_eligibility() {
    let mut schedule = schedule(date(2025, 1, 15));
    assert!(schedule.is_due(date(2025, 1, 15)));
    assert!(!schedule.is_due(date(2025, 1, 14)));

    schedule.pause();
    assert!(!schedule.is_due(date(2025, 1, 20)));

    schedule.resume();
    assert!(schedule.is_due(date(2025, 1, 20)));
  }

  #[test]
  fn test_record_firing_never_moves_backwards() {
    let mut schedule = schedule(date(2025, 3, 15));
    let invoice_id = Uuid::new_v4();

    schedule.record_firing(invoice_id, date(2025, 2, 15));
    assert_eq!(schedule.next_invoice_date, date(2025, 3, 15));
    assert_eq!(schedule.last_invoice_id, Some(invoice_id));

    schedule.record_firing(invoice_id, date(2025, 4, 15));
    assert_eq!(schedule.next_invoice_date, date(2025, 4, 15));
  }
}
