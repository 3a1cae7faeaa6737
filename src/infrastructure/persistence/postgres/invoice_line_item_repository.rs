use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{FromRow, PgConnection, PgPool};
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::invoice::{
  InvoiceError, InvoiceLineItem, InvoiceLineItemRepository, LineItemDescription, Quantity,
  UnitPrice, UnitType,
};

#[derive(Debug, FromRow)]
struct LineItemRow {
  id: Uuid,
  invoice_id: Uuid,
  description: String,
  quantity: Decimal,
  unit_type: String,
  unit_price: Decimal,
  total: Decimal,
  sort_order: i32,
}

impl TryFrom<LineItemRow> for InvoiceLineItem {
  type Error = InvoiceError;

  fn try_from(row: LineItemRow) -> Result<Self, Self::Error> {
    Ok(InvoiceLineItem {
      id: row.id,
      invoice_id: row.invoice_id,
      description: LineItemDescription::new(row.description)?,
      quantity: Quantity::new(row.quantity)?,
      unit_type: UnitType::from_str(&row.unit_type)?,
      unit_price: UnitPrice::new(row.unit_price)?,
      total: row.total,
      sort_order: row.sort_order,
    })
  }
}

/// Read side of line items; writes go through the invoice repository so
/// they share a transaction with the invoice totals.
pub struct PostgresInvoiceLineItemRepository {
  pool: PgPool,
}

impl PostgresInvoiceLineItemRepository {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl InvoiceLineItemRepository for PostgresInvoiceLineItemRepository {
  async fn find_by_id(&self, id: Uuid) -> Result<Option<InvoiceLineItem>, InvoiceError> {
    let row = sqlx::query_as::<_, LineItemRow>(
      r#"
            SELECT id, invoice_id, description, quantity, unit_type,
                   unit_price, total, sort_order
            FROM invoice_line_items
            WHERE id = $1
            "#,
    )
    .bind(id)
    .fetch_optional(&self.pool)
    .await?;

    row.map(|r| r.try_into()).transpose()
  }

  async fn find_by_invoice_id(
    &self,
    invoice_id: Uuid,
  ) -> Result<Vec<InvoiceLineItem>, InvoiceError> {
    let mut conn = self.pool.acquire().await?;
    find_items(&mut conn, invoice_id).await
  }
}

/// Items of one invoice in display order. Shared with the invoice repository,
/// which calls it inside its transactions.
pub(super) async fn find_items(
  conn: &mut PgConnection,
  invoice_id: Uuid,
) -> Result<Vec<InvoiceLineItem>, InvoiceError> {
  let rows = sqlx::query_as::<_, LineItemRow>(
    r#"
            SELECT id, invoice_id, description, quantity, unit_type,
                   unit_price, total, sort_order
            FROM invoice_line_items
            WHERE invoice_id = $1
            ORDER BY sort_order ASC
            "#,
  )
  .bind(invoice_id)
  .fetch_all(&mut *conn)
  .await?;

  rows.into_iter().map(|r| r.try_into()).collect()
}
