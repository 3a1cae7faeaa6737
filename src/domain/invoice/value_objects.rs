use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::ValidateEmail;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueObjectError {
  #[error("Invalid invoice number: {0}")]
  InvalidInvoiceNumber(String),
  #[error("Invalid currency code: {0}")]
  InvalidCurrency(String),
  #[error("Invalid amount: {0}")]
  InvalidAmount(String),
  #[error("Invalid line item description: {0}")]
  InvalidDescription(String),
  #[error("Invalid quantity: {0}")]
  InvalidQuantity(String),
  #[error("Invalid unit type: {0}")]
  InvalidUnitType(String),
  #[error("Invalid tax rate: {0}")]
  InvalidTaxRate(String),
  #[error("Invalid payment terms: {0}")]
  InvalidPaymentTerms(String),
  #[error("Invalid status: {0}")]
  InvalidStatus(String),
  #[error("Invalid document type: {0}")]
  InvalidDocumentType(String),
  #[error("Invalid client name: {0}")]
  InvalidClientName(String),
  #[error("Invalid email: {0}")]
  InvalidEmail(String),
  #[error("Invalid frequency: {0}")]
  InvalidFrequency(String),
  #[error("Invalid schedule day: {0}")]
  InvalidScheduleDay(String),
}

// Invoice Number - generated as {prefix}{YYYYMMDD}-{seq}, or a caller override
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InvoiceNumber(String);

impl InvoiceNumber {
  const MAX_OVERRIDE_LENGTH: usize = 50;

  /// Wraps a stored number. Legacy values are accepted as long as they are
  /// not blank.
  pub fn new(value: String) -> Result<Self, ValueObjectError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
      return Err(ValueObjectError::InvalidInvoiceNumber(
        "Invoice number cannot be empty".to_string(),
      ));
    }
    Ok(Self(trimmed.to_string()))
  }

  /// Validates a caller-supplied number. Uniqueness is left to storage.
  pub fn from_override(value: &str) -> Result<Self, ValueObjectError> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.len() > Self::MAX_OVERRIDE_LENGTH {
      return Err(ValueObjectError::InvalidInvoiceNumber(format!(
        "Invoice number must be 1-{} characters",
        Self::MAX_OVERRIDE_LENGTH
      )));
    }
    if !trimmed
      .chars()
      .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
    {
      return Err(ValueObjectError::InvalidInvoiceNumber(
        "Invoice number may only contain letters, digits, '.', '-' and '_'".to_string(),
      ));
    }
    if trimmed.contains("..") {
      return Err(ValueObjectError::InvalidInvoiceNumber(
        "Invoice number cannot contain consecutive dots".to_string(),
      ));
    }
    Ok(Self(trimmed.to_string()))
  }

  pub(crate) fn generated(prefix: &str, sequence: u64) -> Self {
    Self(format!("{}{}", prefix, sequence))
  }

  pub fn value(&self) -> &str {
    &self.0
  }

  pub fn into_inner(self) -> String {
    self.0
  }
}

impl fmt::Display for InvoiceNumber {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

// Invoice Status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
  Draft,
  Sent,
  Paid,
  Overdue,
  Cancelled,
}

impl InvoiceStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      InvoiceStatus::Draft => "draft",
      InvoiceStatus::Sent => "sent",
      InvoiceStatus::Paid => "paid",
      InvoiceStatus::Overdue => "overdue",
      InvoiceStatus::Cancelled => "cancelled",
    }
  }
}

impl FromStr for InvoiceStatus {
  type Err = ValueObjectError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_lowercase().as_str() {
      "draft" => Ok(InvoiceStatus::Draft),
      "sent" => Ok(InvoiceStatus::Sent),
      "paid" => Ok(InvoiceStatus::Paid),
      "overdue" => Ok(InvoiceStatus::Overdue),
      "cancelled" => Ok(InvoiceStatus::Cancelled),
      _ => Err(ValueObjectError::InvalidStatus(format!(
        "Unknown status: {}",
        s
      ))),
    }
  }
}

// Document Type - quotes share the numbering space with a "Q-" prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
  #[default]
  Invoice,
  Quote,
}

impl DocumentType {
  pub fn as_str(&self) -> &'static str {
    match self {
      DocumentType::Invoice => "invoice",
      DocumentType::Quote => "quote",
    }
  }

  pub fn number_prefix(&self) -> &'static str {
    match self {
      DocumentType::Invoice => "",
      DocumentType::Quote => "Q-",
    }
  }
}

impl FromStr for DocumentType {
  type Err = ValueObjectError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_lowercase().as_str() {
      "invoice" => Ok(DocumentType::Invoice),
      "quote" => Ok(DocumentType::Quote),
      _ => Err(ValueObjectError::InvalidDocumentType(format!(
        "Unknown document type: {}",
        s
      ))),
    }
  }
}

// Currency - ISO 4217 alphabetic code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyCode(String);

impl CurrencyCode {
  pub fn new(value: &str) -> Result<Self, ValueObjectError> {
    let trimmed = value.trim();
    if trimmed.len() != 3 || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
      return Err(ValueObjectError::InvalidCurrency(format!(
        "Currency must be a 3-letter code: {}",
        value
      )));
    }
    Ok(Self(trimmed.to_uppercase()))
  }

  pub fn usd() -> Self {
    Self("USD".to_string())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for CurrencyCode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

// Line Item Description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemDescription(String);

impl LineItemDescription {
  pub fn new(value: String) -> Result<Self, ValueObjectError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
      return Err(ValueObjectError::InvalidDescription(
        "Description cannot be empty".to_string(),
      ));
    }
    if trimmed.len() > 500 {
      return Err(ValueObjectError::InvalidDescription(
        "Description cannot exceed 500 characters".to_string(),
      ));
    }
    Ok(Self(trimmed.to_string()))
  }

  pub fn value(&self) -> &str {
    &self.0
  }
}

// Quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quantity(Decimal);

impl Quantity {
  /// Largest value a NUMERIC(14, 4) column holds
  pub const MAX: Decimal = Decimal::from_parts(276_447_231, 23_283, 0, false, 4);

  pub fn new(value: Decimal) -> Result<Self, ValueObjectError> {
    if value.is_sign_negative() && !value.is_zero() {
      return Err(ValueObjectError::InvalidQuantity(
        "Quantity cannot be negative".to_string(),
      ));
    }
    // Max 4 decimal places
    if value.scale() > 4 {
      return Err(ValueObjectError::InvalidQuantity(
        "Quantity cannot have more than 4 decimal places".to_string(),
      ));
    }
    if value > Self::MAX {
      return Err(ValueObjectError::InvalidQuantity(format!(
        "Quantity cannot exceed {}",
        Self::MAX
      )));
    }
    Ok(Self(value))
  }

  pub fn value(&self) -> Decimal {
    self.0
  }
}

// Unit Price - non-negative, cents precision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitPrice(Decimal);

impl UnitPrice {
  /// Largest value a NUMERIC(14, 2) column holds
  pub const MAX: Decimal = Decimal::from_parts(276_447_231, 23_283, 0, false, 2);

  pub fn new(value: Decimal) -> Result<Self, ValueObjectError> {
    if value.is_sign_negative() && !value.is_zero() {
      return Err(ValueObjectError::InvalidAmount(
        "Unit price cannot be negative".to_string(),
      ));
    }
    if value.scale() > 2 {
      return Err(ValueObjectError::InvalidAmount(
        "Unit price cannot have more than 2 decimal places".to_string(),
      ));
    }
    if value > Self::MAX {
      return Err(ValueObjectError::InvalidAmount(format!(
        "Unit price cannot exceed {}",
        Self::MAX
      )));
    }
    Ok(Self(value))
  }

  pub fn value(&self) -> Decimal {
    self.0
  }
}

// Unit Type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitType {
  #[default]
  Qty,
  Hours,
}

impl UnitType {
  pub fn as_str(&self) -> &'static str {
    match self {
      UnitType::Qty => "qty",
      UnitType::Hours => "hours",
    }
  }
}

impl FromStr for UnitType {
  type Err = ValueObjectError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_lowercase().as_str() {
      "qty" => Ok(UnitType::Qty),
      "hours" => Ok(UnitType::Hours),
      _ => Err(ValueObjectError::InvalidUnitType(format!(
        "Unknown unit type: {}",
        s
      ))),
    }
  }
}

// Tax Rate - percentage in [0, 100]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRate(Decimal);

impl TaxRate {
  pub fn new(value: Decimal) -> Result<Self, ValueObjectError> {
    if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
      return Err(ValueObjectError::InvalidTaxRate(
        "Tax rate must be between 0 and 100".to_string(),
      ));
    }
    Ok(Self(value))
  }

  pub fn zero() -> Self {
    Self(Decimal::ZERO)
  }

  pub fn value(&self) -> Decimal {
    self.0
  }

  pub fn as_multiplier(&self) -> Decimal {
    self.0 / Decimal::ONE_HUNDRED
  }
}

// Payment Terms - days until due, 0..=365
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentTermsDays(i32);

impl PaymentTermsDays {
  pub const FALLBACK: PaymentTermsDays = PaymentTermsDays(30);

  pub fn new(days: i32) -> Result<Self, ValueObjectError> {
    if !(0..=365).contains(&days) {
      return Err(ValueObjectError::InvalidPaymentTerms(format!(
        "Payment terms must be between 0 and 365 days, got {}",
        days
      )));
    }
    Ok(Self(days))
  }

  pub fn days(&self) -> i32 {
    self.0
  }

  pub fn due_from(&self, issue_date: NaiveDate) -> NaiveDate {
    issue_date + chrono::Duration::days(self.0 as i64)
  }
}

impl fmt::Display for PaymentTermsDays {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Net {}", self.0)
  }
}

// Client Name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientName(String);

impl ClientName {
  pub fn new(value: String) -> Result<Self, ValueObjectError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
      return Err(ValueObjectError::InvalidClientName(
        "Client name cannot be empty".to_string(),
      ));
    }
    if trimmed.len() > 255 {
      return Err(ValueObjectError::InvalidClientName(
        "Client name cannot exceed 255 characters".to_string(),
      ));
    }
    Ok(Self(trimmed.to_string()))
  }

  pub fn value(&self) -> &str {
    &self.0
  }
}

// Email
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email(String);

impl Email {
  pub fn new(email: impl Into<String>) -> Result<Self, ValueObjectError> {
    let email = email.into();
    if !email.validate_email() {
      return Err(ValueObjectError::InvalidEmail(email));
    }
    Ok(Self(email.to_lowercase()))
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

// Client Address - structured components, formatted at snapshot time
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientAddress {
  pub line1: Option<String>,
  pub line2: Option<String>,
  pub city: Option<String>,
  pub state: Option<String>,
  pub postal_code: Option<String>,
  pub country: Option<String>,
}
