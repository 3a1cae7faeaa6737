use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use super::dto::InvoiceDto;
use crate::domain::invoice::{InvoiceError, InvoiceService};

#[derive(Debug, Deserialize)]
pub struct RemoveLineItemCommand {
  pub invoice_id: Uuid,
  pub item_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct RemoveLineItemResponse {
  pub invoice: InvoiceDto,
}

pub struct RemoveLineItemUseCase {
  invoice_service: Arc<InvoiceService>,
}

impl RemoveLineItemUseCase {
  pub fn new(invoice_service: Arc<InvoiceService>) -> Self {
    Self { invoice_service }
  }

  pub async fn execute(
    &self,
    command: RemoveLineItemCommand,
  ) -> Result<RemoveLineItemResponse, InvoiceError> {
    let invoice = self
      .invoice_service
      .remove_line_item(command.invoice_id, command.item_id)
      .await?;

    Ok(RemoveLineItemResponse {
      invoice: InvoiceDto::from(&invoice),
    })
  }
}
