use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

use super::dto::ScheduleDto;
use crate::application::invoice::dto::{
  LineItemInputDto, parse_currency, parse_line_items, parse_payment_terms,
};
use crate::domain::invoice::TaxOverrides;
use crate::domain::recurring::{
  Frequency, InvoiceTemplate, RecurringError, RecurringService, ScheduleData,
};

#[derive(Debug, Deserialize)]
pub struct CreateScheduleCommand {
  pub client_id: Uuid,
  pub frequency: String,
  /// Weekday 0 (Monday) to 6 for weekly schedules, day of month otherwise
  pub schedule_day: i32,
  pub currency: Option<String>,
  pub payment_terms_days: Option<i32>,
  pub notes: Option<String>,
  pub tax_enabled: Option<bool>,
  pub tax_rate: Option<Decimal>,
  pub tax_name: Option<String>,
  #[serde(default)]
  pub line_items: Vec<LineItemInputDto>,
  /// Computed from the schedule day when absent
  pub next_invoice_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct CreateScheduleResponse {
  pub schedule: ScheduleDto,
}

pub struct CreateScheduleUseCase {
  recurring_service: Arc<RecurringService>,
}

impl CreateScheduleUseCase {
  pub fn new(recurring_service: Arc<RecurringService>) -> Self {
    Self { recurring_service }
  }

  pub async fn execute(
    &self,
    command: CreateScheduleCommand,
  ) -> Result<CreateScheduleResponse, RecurringError> {
    let template = InvoiceTemplate {
      currency: parse_currency(command.currency.as_deref())?,
      payment_terms_days: parse_payment_terms(command.payment_terms_days)?,
      notes: command.notes,
      tax: TaxOverrides::from_raw(command.tax_enabled, command.tax_rate, command.tax_name)?,
      line_items: parse_line_items(command.line_items)?,
    };

    let schedule = self
      .recurring_service
      .create_schedule(ScheduleData {
        client_id: command.client_id,
        frequency: Frequency::from_str(&command.frequency)?,
        schedule_day: command.schedule_day,
        template,
        next_invoice_date: command.next_invoice_date,
      })
      .await?;

    Ok(CreateScheduleResponse {
      schedule: ScheduleDto::from(&schedule),
    })
  }
}
