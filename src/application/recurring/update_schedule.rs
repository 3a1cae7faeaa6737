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
use crate::domain::recurring::{Frequency, RecurringError, RecurringService, ScheduleUpdateData};

/// Omitted fields keep their stored value. `line_items`, when present,
/// replaces the whole list.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateScheduleCommand {
  pub schedule_id: Uuid,
  pub client_id: Option<Uuid>,
  pub frequency: Option<String>,
  pub schedule_day: Option<i32>,
  pub currency: Option<String>,
  pub payment_terms_days: Option<i32>,
  pub notes: Option<String>,
  pub tax_enabled: Option<bool>,
  pub tax_rate: Option<Decimal>,
  pub tax_name: Option<String>,
  pub line_items: Option<Vec<LineItemInputDto>>,
  pub next_invoice_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct UpdateScheduleResponse {
  pub schedule: ScheduleDto,
}

pub struct UpdateScheduleUseCase {
  recurring_service: Arc<RecurringService>,
}

impl UpdateScheduleUseCase {
  pub fn new(recurring_service: Arc<RecurringService>) -> Self {
    Self { recurring_service }
  }

  pub async fn execute(
    &self,
    command: UpdateScheduleCommand,
  ) -> Result<UpdateScheduleResponse, RecurringError> {
    let update = ScheduleUpdateData {
      client_id: command.client_id,
      frequency: command
        .frequency
        .as_deref()
        .map(Frequency::from_str)
        .transpose()?,
      schedule_day: command.schedule_day,
      currency: parse_currency(command.currency.as_deref())?,
      payment_terms_days: parse_payment_terms(command.payment_terms_days)?,
      notes: command.notes,
      tax: TaxOverrides::from_raw(command.tax_enabled, command.tax_rate, command.tax_name)?,
      line_items: command.line_items.map(parse_line_items).transpose()?,
      next_invoice_date: command.next_invoice_date,
    };

    let schedule = self
      .recurring_service
      .update_schedule(command.schedule_id, update)
      .await?;

    Ok(UpdateScheduleResponse {
      schedule: ScheduleDto::from(&schedule),
    })
  }
}
