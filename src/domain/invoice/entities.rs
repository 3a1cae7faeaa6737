use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::cascade::TaxPolicy;
use super::snapshot::ClientSnapshot;
use super::totals::{InvoiceTotals, line_total};
use super::value_objects::{
  ClientAddress, ClientName, CurrencyCode, DocumentType, Email, InvoiceNumber, InvoiceStatus,
  LineItemDescription, PaymentTermsDays, Quantity, TaxRate, UnitPrice, UnitType,
};

// Client - referenced by invoices and schedules, never owned by them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
  pub id: Uuid,
  pub name: ClientName,
  pub business_name: Option<String>,
  pub email: Option<Email>,
  pub address: ClientAddress,
  pub payment_terms_days: Option<PaymentTermsDays>,
  /// `None` defers to the business default
  pub tax_enabled: Option<bool>,
  pub tax_rate: Option<TaxRate>,
  pub tax_name: Option<String>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Client {
  pub fn new(name: ClientName, email: Option<Email>, address: ClientAddress) -> Self {
    let now = Utc::now();
    Self {
      id: Uuid::new_v4(),
      name,
      business_name: None,
      email,
      address,
      payment_terms_days: None,
      tax_enabled: None,
      tax_rate: None,
      tax_name: None,
      created_at: now,
      updated_at: now,
    }
  }
}

// Business Profile - singleton holding the lowest-precedence defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessProfile {
  pub business_name: Option<String>,
  pub tax_enabled: bool,
  pub tax_rate: TaxRate,
  pub tax_name: String,
  pub payment_terms_days: Option<PaymentTermsDays>,
  pub default_currency: CurrencyCode,
  pub updated_at: DateTime<Utc>,
}

impl Default for BusinessProfile {
  fn default() -> Self {
    Self {
      business_name: None,
      tax_enabled: false,
      tax_rate: TaxRate::zero(),
      tax_name: "Tax".to_string(),
      payment_terms_days: None,
      default_currency: CurrencyCode::usd(),
      updated_at: Utc::now(),
    }
  }
}

/// Everything resolved before an invoice row exists
#[derive(Debug, Clone)]
pub struct InvoiceHeader {
  pub invoice_number: InvoiceNumber,
  pub document_type: DocumentType,
  pub client_id: Option<Uuid>,
  pub issue_date: NaiveDate,
  pub due_date: NaiveDate,
  pub payment_terms_days: PaymentTermsDays,
  pub currency: CurrencyCode,
  pub notes: Option<String>,
  pub tax: TaxPolicy,
}

// Invoice - immutable billing record once numbered
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
  pub id: Uuid,
  pub invoice_number: InvoiceNumber,
  pub document_type: DocumentType,
  pub client_id: Option<Uuid>,
  pub client_name: Option<String>,
  pub client_business_name: Option<String>,
  pub client_address: Option<String>,
  pub client_email: Option<String>,
  pub status: InvoiceStatus,
  pub issue_date: NaiveDate,
  pub due_date: NaiveDate,
  pub payment_terms_days: PaymentTermsDays,
  pub currency: CurrencyCode,
  pub notes: Option<String>,
  pub subtotal: Decimal,
  pub tax_enabled: bool,
  pub tax_rate: TaxRate,
  pub tax_name: String,
  pub tax_amount: Decimal,
  pub total: Decimal,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
  pub deleted_at: Option<DateTime<Utc>>,
}

impl Invoice {
  pub fn new(header: InvoiceHeader) -> Self {
    let now = Utc::now();
    Self {
      id: Uuid::new_v4(),
      invoice_number: header.invoice_number,
      document_type: header.document_type,
      client_id: header.client_id,
      client_name: None,
      client_business_name: None,
      client_address: None,
      client_email: None,
      status: InvoiceStatus::Draft,
      issue_date: header.issue_date,
      due_date: header.due_date,
      payment_terms_days: header.payment_terms_days,
      currency: header.currency,
      notes: header.notes,
      subtotal: Decimal::ZERO,
      tax_enabled: header.tax.enabled,
      tax_rate: header.tax.rate,
      tax_name: header.tax.name,
      tax_amount: Decimal::ZERO,
      total: Decimal::ZERO,
      created_at: now,
      updated_at: now,
      deleted_at: None,
    }
  }

  pub fn tax_policy(&self) -> TaxPolicy {
    TaxPolicy {
      enabled: self.tax_enabled,
      rate: self.tax_rate,
      name: self.tax_name.clone(),
    }
  }

  pub fn set_tax_policy(&mut self, tax: TaxPolicy) {
    self.tax_enabled = tax.enabled;
    self.tax_rate = tax.rate;
    self.tax_name = tax.name;
    self.updated_at = Utc::now();
  }

  pub fn apply_totals(&mut self, totals: InvoiceTotals) {
    self.subtotal = totals.subtotal;
    self.tax_amount = totals.tax_amount;
    self.total = totals.total;
    self.updated_at = Utc::now();
  }

  pub fn apply_snapshot(&mut self, snapshot: ClientSnapshot) {
    self.client_name = Some(snapshot.name);
    self.client_business_name = snapshot.business_name;
    self.client_address = snapshot.address;
    self.client_email = snapshot.email;
    self.updated_at = Utc::now();
  }

  pub fn change_status(&mut self, status: InvoiceStatus) {
    self.status = status;
    self.updated_at = Utc::now();
  }

  pub fn soft_delete(&mut self) {
    self.deleted_at = Some(Utc::now());
  }

  pub fn is_deleted(&self) -> bool {
    self.deleted_at.is_some()
  }
}

/// Validated line-item content, shared by invoices and schedule templates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemData {
  pub description: LineItemDescription,
  pub quantity: Quantity,
  pub unit_type: UnitType,
  pub unit_price: UnitPrice,
}

// Invoice Line Item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceLineItem {
  pub id: Uuid,
  pub invoice_id: Uuid,
  pub description: LineItemDescription,
  pub quantity: Quantity,
  pub unit_type: UnitType,
  pub unit_price: UnitPrice,
  pub total: Decimal,
  pub sort_order: i32,
}

impl InvoiceLineItem {
  pub fn new(invoice_id: Uuid, data: LineItemData, sort_order: i32) -> Self {
    let total = line_total(data.quantity, data.unit_price);
    Self {
      id: Uuid::new_v4(),
      invoice_id,
      description: data.description,
      quantity: data.quantity,
      unit_type: data.unit_type,
      unit_price: data.unit_price,
      total,
      sort_order,
    }
  }

  pub fn update(&mut self, data: LineItemData) {
    self.total = line_total(data.quantity, data.unit_price);
    self.description = data.description;
    self.quantity = data.quantity;
    self.unit_type = data.unit_type;
    self.unit_price = data.unit_price;
  }
}
