use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use super::add_line_item::LineItemChangeResponse;
use super::dto::{InvoiceDto, LineItemDto, LineItemInputDto};
use crate::domain::invoice::{InvoiceError, InvoiceService, LineItemData};

#[derive(Debug, Deserialize)]
pub struct UpdateLineItemCommand {
  pub invoice_id: Uuid,
  pub item_id: Uuid,
  pub item: LineItemInputDto,
}

pub struct UpdateLineItemUseCase {
  invoice_service: Arc<InvoiceService>,
}

impl UpdateLineItemUseCase {
  pub fn new(invoice_service: Arc<InvoiceService>) -> Self {
    Self { invoice_service }
  }

  pub async fn execute(
    &self,
    command: UpdateLineItemCommand,
  ) -> Result<LineItemChangeResponse, InvoiceError> {
    let data = LineItemData::try_from(command.item)?;

    let (invoice, item) = self
      .invoice_service
      .update_line_item(command.invoice_id, command.item_id, data)
      .await?;

    Ok(LineItemChangeResponse {
      invoice: InvoiceDto::from(&invoice),
      line_item: LineItemDto::from(&item),
    })
  }
}
