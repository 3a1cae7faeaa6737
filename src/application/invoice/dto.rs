use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::invoice::{
  CurrencyCode, Invoice, InvoiceLineItem, LineItemData, LineItemDescription, PaymentTermsDays,
  Quantity, UnitPrice, UnitType, ValueObjectError,
};

/// Line item as supplied by a caller
#[derive(Debug, Clone, Deserialize)]
pub struct LineItemInputDto {
  pub description: String,
  pub quantity: Decimal,
  /// `qty` when omitted
  pub unit_type: Option<String>,
  pub unit_price: Decimal,
}

impl TryFrom<LineItemInputDto> for LineItemData {
  type Error = ValueObjectError;

  fn try_from(dto: LineItemInputDto) -> Result<Self, Self::Error> {
    let unit_type = match dto.unit_type.as_deref() {
      Some(raw) => UnitType::from_str(raw)?,
      None => UnitType::default(),
    };
    Ok(LineItemData {
      description: LineItemDescription::new(dto.description)?,
      quantity: Quantity::new(dto.quantity)?,
      unit_type,
      unit_price: UnitPrice::new(dto.unit_price)?,
    })
  }
}

pub fn parse_line_items(items: Vec<LineItemInputDto>) -> Result<Vec<LineItemData>, ValueObjectError> {
  items.into_iter().map(LineItemData::try_from).collect()
}

pub fn parse_currency(raw: Option<&str>) -> Result<Option<CurrencyCode>, ValueObjectError> {
  raw.map(CurrencyCode::new).transpose()
}

pub fn parse_payment_terms(raw: Option<i32>) -> Result<Option<PaymentTermsDays>, ValueObjectError> {
  raw.map(PaymentTermsDays::new).transpose()
}

#[derive(Debug, Clone, Serialize)]
pub struct LineItemDto {
  pub id: Uuid,
  pub description: String,
  pub quantity: Decimal,
  pub unit_type: String,
  pub unit_price: Decimal,
  pub total: Decimal,
  pub sort_order: i32,
}

impl From<&InvoiceLineItem> for LineItemDto {
  fn from(item: &InvoiceLineItem) -> Self {
    Self {
      id: item.id,
      description: item.description.value().to_string(),
      quantity: item.quantity.value(),
      unit_type: item.unit_type.as_str().to_string(),
      unit_price: item.unit_price.value(),
      total: item.total,
      sort_order: item.sort_order,
    }
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct InvoiceDto {
  pub id: Uuid,
  pub invoice_number: String,
  pub document_type: String,
  pub client_id: Option<Uuid>,
  pub client_name: Option<String>,
  pub client_business_name: Option<String>,
  pub client_address: Option<String>,
  pub client_email: Option<String>,
  pub status: String,
  pub issue_date: NaiveDate,
  pub due_date: NaiveDate,
  pub payment_terms_days: i32,
  pub currency: String,
  pub notes: Option<String>,
  pub subtotal: Decimal,
  pub tax_enabled: bool,
  pub tax_rate: Decimal,
  pub tax_name: String,
  pub tax_amount: Decimal,
  pub total: Decimal,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl From<&Invoice> for InvoiceDto {
  fn from(invoice: &Invoice) -> Self {
    Self {
      id: invoice.id,
      invoice_number: invoice.invoice_number.value().to_string(),
      document_type: invoice.document_type.as_str().to_string(),
      client_id: invoice.client_id,
      client_name: invoice.client_name.clone(),
      client_business_name: invoice.client_business_name.clone(),
      client_address: invoice.client_address.clone(),
      client_email: invoice.client_email.clone(),
      status: invoice.status.as_str().to_string(),
      issue_date: invoice.issue_date,
      due_date: invoice.due_date,
      payment_terms_days: invoice.payment_terms_days.days(),
      currency: invoice.currency.as_str().to_string(),
      notes: invoice.notes.clone(),
      subtotal: invoice.subtotal,
      tax_enabled: invoice.tax_enabled,
      tax_rate: invoice.tax_rate.value(),
      tax_name: invoice.tax_name.clone(),
      tax_amount: invoice.tax_amount,
      total: invoice.total,
      created_at: invoice.created_at,
      updated_at: invoice.updated_at,
    }
  }
}
