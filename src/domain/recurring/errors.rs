use thiserror::Error;
use uuid::Uuid;

use crate::domain::invoice::{ErrorKind, InvoiceError, ValueObjectError};

#[derive(Debug, Error)]
pub enum RecurringError {
  #[error("Validation error: {0}")]
  Validation(#[from] ValueObjectError),

  #[error("Recurring schedule not found: {0}")]
  ScheduleNotFound(Uuid),

  #[error("Client not found: {0}")]
  ClientNotFound(Uuid),

  #[error("Could not compute the next invoice date after {0}")]
  DateOutOfRange(chrono::NaiveDate),

  #[error(transparent)]
  Invoice(#[from] InvoiceError),

  #[error("Serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  #[error("Database error: {0}")]
  Database(#[from] sqlx::Error),
}

impl RecurringError {
  pub fn kind(&self) -> ErrorKind {
    match self {
      RecurringError::Validation(_) => ErrorKind::Validation,
      RecurringError::ScheduleNotFound(_) | RecurringError::ClientNotFound(_) => {
        ErrorKind::NotFound
      }
      RecurringError::Invoice(inner) => inner.kind(),
      RecurringError::DateOutOfRange(_)
      | RecurringError::Serialization(_)
      | RecurringError::Database(_) => ErrorKind::Internal,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_invoice_errors_keep_their_kind() {
    let err: RecurringError = InvoiceError::ClientNotFound(Uuid::new_v4()).into();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err: RecurringError = ValueObjectError::InvalidFrequency("hourly".to_string()).into();
    assert_eq!(err.kind(), ErrorKind::Validation);
  }
}
