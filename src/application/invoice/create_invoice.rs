use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

use super::dto::{
  InvoiceDto, LineItemDto, LineItemInputDto, parse_currency, parse_line_items,
  parse_payment_terms,
};
use crate::domain::invoice::{
  DocumentType, InvoiceData, InvoiceError, InvoiceService, TaxOverrides,
};

#[derive(Debug, Deserialize)]
pub struct CreateInvoiceCommand {
  pub client_id: Option<Uuid>,
  /// `invoice` (default) or `quote`
  pub document_type: Option<String>,
  /// Explicit number; generated when absent
  pub invoice_number: Option<String>,
  pub issue_date: Option<NaiveDate>,
  pub due_date: Option<NaiveDate>,
  pub payment_terms_days: Option<i32>,
  pub currency: Option<String>,
  pub notes: Option<String>,
  pub tax_enabled: Option<bool>,
  pub tax_rate: Option<Decimal>,
  pub tax_name: Option<String>,
  #[serde(default)]
  pub line_items: Vec<LineItemInputDto>,
}

#[derive(Debug, Serialize)]
pub struct CreateInvoiceResponse {
  pub invoice: InvoiceDto,
  pub line_items: Vec<LineItemDto>,
  pub created_at: DateTime<Utc>,
}

pub struct CreateInvoiceUseCase {
  invoice_service: Arc<InvoiceService>,
}

impl CreateInvoiceUseCase {
  pub fn new(invoice_service: Arc<InvoiceService>) -> Self {
    Self { invoice_service }
  }

  pub async fn execute(
    &self,
    command: CreateInvoiceCommand,
  ) -> Result<CreateInvoiceResponse, InvoiceError> {
    let document_type = match command.document_type.as_deref() {
      Some(raw) => DocumentType::from_str(raw)?,
      None => DocumentType::default(),
    };

    let invoice_data = InvoiceData {
      client_id: command.client_id,
      document_type,
      invoice_number: command.invoice_number,
      issue_date: command.issue_date,
      due_date: command.due_date,
      payment_terms_days: parse_payment_terms(command.payment_terms_days)?,
      currency: parse_currency(command.currency.as_deref())?,
      notes: command.notes,
      tax: TaxOverrides::from_raw(command.tax_enabled, command.tax_rate, command.tax_name)?,
      line_items: parse_line_items(command.line_items)?,
    };

    let (invoice, line_items) = self.invoice_service.create_invoice(invoice_data).await?;

    Ok(CreateInvoiceResponse {
      created_at: invoice.created_at,
      invoice: InvoiceDto::from(&invoice),
      line_items: line_items.iter().map(LineItemDto::from).collect(),
    })
  }
}
