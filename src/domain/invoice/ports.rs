use async_trait::async_trait;
use uuid::Uuid;

use super::entities::{BusinessProfile, Client, Invoice, InvoiceLineItem};
use super::errors::InvoiceError;
use super::value_objects::InvoiceStatus;

/// A single line-item mutation, persisted together with the invoice totals
#[derive(Debug, Clone)]
pub enum LineItemChange {
  Add(InvoiceLineItem),
  Update(InvoiceLineItem),
  Remove(Uuid),
}

#[async_trait]
pub trait ClientRepository: Send + Sync {
  async fn create(&self, client: Client) -> Result<Client, InvoiceError>;
  async fn update(&self, client: Client) -> Result<Client, InvoiceError>;
  async fn find_by_id(&self, id: Uuid) -> Result<Option<Client>, InvoiceError>;
}

#[async_trait]
pub trait BusinessProfileRepository: Send + Sync {
  async fn get(&self) -> Result<Option<BusinessProfile>, InvoiceError>;
  async fn save(&self, profile: BusinessProfile) -> Result<BusinessProfile, InvoiceError>;
}

#[async_trait]
pub trait InvoiceRepository: Send + Sync {
  /// Inserts the invoice and its items in one transaction. A duplicate
  /// number must surface as `InvoiceNumberAlreadyExists`.
  async fn create_with_items(
    &self,
    invoice: Invoice,
    line_items: Vec<InvoiceLineItem>,
  ) -> Result<(Invoice, Vec<InvoiceLineItem>), InvoiceError>;
  /// Writes the editable header fields and recomputes totals from the stored
  /// items, in one transaction. Totals on `invoice` are ignored.
  async fn update(&self, invoice: Invoice) -> Result<Invoice, InvoiceError>;
  async fn set_status(&self, id: Uuid, status: InvoiceStatus) -> Result<Invoice, InvoiceError>;
  async fn soft_delete(&self, id: Uuid) -> Result<(), InvoiceError>;
  /// Locks the invoice, applies the item change and recomputes totals from
  /// the items stored after it. Only the totals of the invoice row change.
  async fn apply_line_item_change(
    &self,
    invoice_id: Uuid,
    change: LineItemChange,
  ) -> Result<Invoice, InvoiceError>;
  /// Returns soft-deleted invoices too.
  async fn find_by_id(&self, id: Uuid) -> Result<Option<Invoice>, InvoiceError>;
  async fn find_active(&self, status: Option<InvoiceStatus>) -> Result<Vec<Invoice>, InvoiceError>;
  /// Every stored number starting with `prefix`, soft-deleted rows included.
  async fn find_numbers_with_prefix(&self, prefix: &str) -> Result<Vec<String>, InvoiceError>;
}

#[async_trait]
pub trait InvoiceLineItemRepository: Send + Sync {
  async fn find_by_id(&self, id: Uuid) -> Result<Option<InvoiceLineItem>, InvoiceError>;
  async fn find_by_invoice_id(
    &self,
    invoice_id: Uuid,
  ) -> Result<Vec<InvoiceLineItem>, InvoiceError>;
}
