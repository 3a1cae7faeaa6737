use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::recurring::RecurringSchedule;

#[derive(Debug, Clone, Serialize)]
pub struct TemplateLineItemDto {
  pub description: String,
  pub quantity: Decimal,
  pub unit_type: String,
  pub unit_price: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScheduleDto {
  pub id: Uuid,
  pub client_id: Uuid,
  pub frequency: String,
  pub schedule_day: u32,
  pub currency: Option<String>,
  pub payment_terms_days: Option<i32>,
  pub notes: Option<String>,
  pub tax_enabled: Option<bool>,
  pub tax_rate: Option<Decimal>,
  pub tax_name: Option<String>,
  pub line_items: Vec<TemplateLineItemDto>,
  pub is_active: bool,
  pub next_invoice_date: NaiveDate,
  pub last_invoice_id: Option<Uuid>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl From<&RecurringSchedule> for ScheduleDto {
  fn from(schedule: &RecurringSchedule) -> Self {
    let template = &schedule.template;
    Self {
      id: schedule.id,
      client_id: schedule.client_id,
      frequency: schedule.frequency.as_str().to_string(),
      schedule_day: schedule.schedule_day.value(),
      currency: template.currency.as_ref().map(|c| c.as_str().to_string()),
      payment_terms_days: template.payment_terms_days.map(|t| t.days()),
      notes: template.notes.clone(),
      tax_enabled: template.tax.enabled,
      tax_rate: template.tax.rate.map(|r| r.value()),
      tax_name: template.tax.name.clone(),
      line_items: template
        .line_items
        .iter()
        .map(|item| TemplateLineItemDto {
          description: item.description.value().to_string(),
          quantity: item.quantity.value(),
          unit_type: item.unit_type.as_str().to_string(),
          unit_price: item.unit_price.value(),
        })
        .collect(),
      is_active: schedule.is_active,
      next_invoice_date: schedule.next_invoice_date,
      last_invoice_id: schedule.last_invoice_id,
      created_at: schedule.created_at,
      updated_at: schedule.updated_at,
    }
  }
}
