use super::value_objects::ValueObjectError;
use thiserror::Error;
use uuid::Uuid;

/// Coarse classification callers map onto their own responses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  Validation,
  NotFound,
  Forbidden,
  Conflict,
  Internal,
}

#[derive(Debug, Error)]
pub enum InvoiceError {
  #[error("Validation error: {0}")]
  Validation(#[from] ValueObjectError),

  #[error("Client not found: {0}")]
  ClientNotFound(Uuid),

  #[error("Invoice not found: {0}")]
  InvoiceNotFound(Uuid),

  #[error("Line item not found: {0}")]
  LineItemNotFound(Uuid),

  #[error("Line item {item_id} does not belong to invoice {invoice_id}")]
  LineItemAccessDenied { invoice_id: Uuid, item_id: Uuid },

  #[error("Invoice number '{0}' already exists")]
  InvoiceNumberAlreadyExists(String),

  #[error("Database error: {0}")]
  Database(#[from] sqlx::Error),
}

impl InvoiceError {
  pub fn kind(&self) -> ErrorKind {
    match self {
      InvoiceError::Validation(_) => ErrorKind::Validation,
      InvoiceError::ClientNotFound(_)
      | InvoiceError::InvoiceNotFound(_)
      | InvoiceError::LineItemNotFound(_) => ErrorKind::NotFound,
      InvoiceError::LineItemAccessDenied { .. } => ErrorKind::Forbidden,
      InvoiceError::InvoiceNumberAlreadyExists(_) => ErrorKind::Conflict,
      InvoiceError::Database(_) => ErrorKind::Internal,
    }
  }
}
