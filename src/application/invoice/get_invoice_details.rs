use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use super::dto::{InvoiceDto, LineItemDto};
use crate::domain::invoice::{InvoiceError, InvoiceService};

#[derive(Debug, Deserialize)]
pub struct GetInvoiceDetailsCommand {
  pub invoice_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct InvoiceDetailsResponse {
  pub invoice: InvoiceDto,
  pub line_items: Vec<LineItemDto>,
}

pub struct GetInvoiceDetailsUseCase {
  invoice_service: Arc<InvoiceService>,
}

impl GetInvoiceDetailsUseCase {
  pub fn new(invoice_service: Arc<InvoiceService>) -> Self {
    Self { invoice_service }
  }

  pub async fn execute(
    &self,
    command: GetInvoiceDetailsCommand,
  ) -> Result<InvoiceDetailsResponse, InvoiceError> {
    let (invoice, line_items) = self
      .invoice_service
      .get_invoice_with_items(command.invoice_id)
      .await?;

    Ok(InvoiceDetailsResponse {
      invoice: InvoiceDto::from(&invoice),
      line_items: line_items.iter().map(LineItemDto::from).collect(),
    })
  }
}
