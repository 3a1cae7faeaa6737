use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

use super::dto::{InvoiceDto, parse_currency, parse_payment_terms};
use crate::domain::invoice::{
  InvoiceError, InvoiceService, InvoiceStatus, InvoiceUpdateData, TaxOverrides,
};

/// Every field is optional; omitted fields keep their stored value.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateInvoiceCommand {
  pub invoice_id: Uuid,
  pub client_id: Option<Uuid>,
  pub issue_date: Option<NaiveDate>,
  pub due_date: Option<NaiveDate>,
  pub payment_terms_days: Option<i32>,
  pub currency: Option<String>,
  pub notes: Option<String>,
  pub status: Option<String>,
  pub tax_enabled: Option<bool>,
  pub tax_rate: Option<Decimal>,
  pub tax_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UpdateInvoiceResponse {
  pub invoice: InvoiceDto,
}

pub struct UpdateInvoiceUseCase {
  invoice_service: Arc<InvoiceService>,
}

impl UpdateInvoiceUseCase {
  pub fn new(invoice_service: Arc<InvoiceService>) -> Self {
    Self { invoice_service }
  }

  pub async fn execute(
    &self,
    command: UpdateInvoiceCommand,
  ) -> Result<UpdateInvoiceResponse, InvoiceError> {
    let update = InvoiceUpdateData {
      client_id: command.client_id,
      issue_date: command.issue_date,
      due_date: command.due_date,
      payment_terms_days: parse_payment_terms(command.payment_terms_days)?,
      currency: parse_currency(command.currency.as_deref())?,
      notes: command.notes,
      status: command
        .status
        .as_deref()
        .map(InvoiceStatus::from_str)
        .transpose()?,
      tax: TaxOverrides::from_raw(command.tax_enabled, command.tax_rate, command.tax_name)?,
    };

    let invoice = self
      .invoice_service
      .update_invoice(command.invoice_id, update)
      .await?;

    Ok(UpdateInvoiceResponse {
      invoice: InvoiceDto::from(&invoice),
    })
  }
}
