use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;

use super::dto::InvoiceDto;
use crate::domain::invoice::{InvoiceError, InvoiceService, InvoiceStatus};

#[derive(Debug, Default, Deserialize)]
pub struct ListInvoicesCommand {
  pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ListInvoicesResponse {
  pub invoices: Vec<InvoiceDto>,
}

pub struct ListInvoicesUseCase {
  invoice_service: Arc<InvoiceService>,
}

impl ListInvoicesUseCase {
  pub fn new(invoice_service: Arc<InvoiceService>) -> Self {
    Self { invoice_service }
  }

  pub async fn execute(
    &self,
    command: ListInvoicesCommand,
  ) -> Result<ListInvoicesResponse, InvoiceError> {
    let status = command
      .status
      .as_deref()
      .map(InvoiceStatus::from_str)
      .transpose()?;

    let invoices = self.invoice_service.list_invoices(status).await?;

    Ok(ListInvoicesResponse {
      invoices: invoices.iter().map(InvoiceDto::from).collect(),
    })
  }
}
