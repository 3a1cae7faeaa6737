use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::invoice::{InvoiceError, InvoiceService, InvoiceStatus};

#[derive(Debug, Deserialize)]
pub struct ChangeInvoiceStatusCommand {
  pub invoice_id: Uuid,
  pub new_status: String,
}

#[derive(Debug, Serialize)]
pub struct ChangeInvoiceStatusResponse {
  pub invoice_id: Uuid,
  pub status: String,
}

pub struct ChangeInvoiceStatusUseCase {
  invoice_service: Arc<InvoiceService>,
}

impl ChangeInvoiceStatusUseCase {
  pub fn new(invoice_service: Arc<InvoiceService>) -> Self {
    Self { invoice_service }
  }

  pub async fn execute(
    &self,
    command: ChangeInvoiceStatusCommand,
  ) -> Result<ChangeInvoiceStatusResponse, InvoiceError> {
    let new_status = InvoiceStatus::from_str(&command.new_status)?;

    let invoice = self
      .invoice_service
      .change_invoice_status(command.invoice_id, new_status)
      .await?;

    Ok(ChangeInvoiceStatusResponse {
      invoice_id: invoice.id,
      status: invoice.status.as_str().to_string(),
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::calendar::FixedClock;
  use crate::domain::invoice::{ErrorKind, InvoiceData, InvoiceServiceDependencies};
  use crate::infrastructure::persistence::memory::InMemoryStore;
  use chrono::NaiveDate;

  #[tokio::test]
  async fn test_status_string_is_validated() {
    let store = InMemoryStore::new();
    let service = Arc::new(InvoiceService::new(InvoiceServiceDependencies {
      invoice_repo: Arc::new(store.clone()),
      line_item_repo: Arc::new(store.clone()),
      client_repo: Arc::new(store.clone()),
      business_repo: Arc::new(store),
      clock: Arc::new(FixedClock(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap())),
    }));
    let (invoice, _) = service
      .create_invoice(InvoiceData::default())
      .await
      .unwrap();
    let use_case = ChangeInvoiceStatusUseCase::new(service);

    let err = use_case
      .execute(ChangeInvoiceStatusCommand {
        invoice_id: invoice.id,
        new_status: "archived".to_string(),
      })
      .await
      .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let response = use_case
      .execute(ChangeInvoiceStatusCommand {
        invoice_id: invoice.id,
        new_status: "PAID".to_string(),
      })
      .await
      .unwrap();
    assert_eq!(response.status, "paid");
  }
}
