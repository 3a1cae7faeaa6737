use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use super::dto::{InvoiceDto, LineItemDto, LineItemInputDto};
use crate::domain::invoice::{InvoiceError, InvoiceService, LineItemData};

#[derive(Debug, Deserialize)]
pub struct AddLineItemCommand {
  pub invoice_id: Uuid,
  pub item: LineItemInputDto,
}

#[derive(Debug, Serialize)]
pub struct LineItemChangeResponse {
  pub invoice: InvoiceDto,
  pub line_item: LineItemDto,
}

pub struct AddLineItemUseCase {
  invoice_service: Arc<InvoiceService>,
}

impl AddLineItemUseCase {
  pub fn new(invoice_service: Arc<InvoiceService>) -> Self {
    Self { invoice_service }
  }

  pub async fn execute(
    &self,
    command: AddLineItemCommand,
  ) -> Result<LineItemChangeResponse, InvoiceError> {
    let data = LineItemData::try_from(command.item)?;

    let (invoice, item) = self
      .invoice_service
      .add_line_item(command.invoice_id, data)
      .await?;

    Ok(LineItemChangeResponse {
      invoice: InvoiceDto::from(&invoice),
      line_item: LineItemDto::from(&item),
    })
  }
}
