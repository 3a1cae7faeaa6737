use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgConnection, PgPool};
use std::str::FromStr;
use uuid::Uuid;

use super::invoice_line_item_repository::find_items;
use crate::domain::invoice::{
  CurrencyCode, DocumentType, Invoice, InvoiceError, InvoiceLineItem, InvoiceNumber,
  InvoiceRepository, InvoiceStatus, InvoiceTotals, LineItemChange, PaymentTermsDays, TaxRate,
};

const INVOICE_NUMBER_CONSTRAINT: &str = "invoices_invoice_number_unique";

#[derive(Debug, FromRow)]
struct InvoiceRow {
  id: Uuid,
  invoice_number: String,
  document_type: String,
  client_id: Option<Uuid>,
  client_name: Option<String>,
  client_business_name: Option<String>,
  client_address: Option<String>,
  client_email: Option<String>,
  status: String,
  issue_date: NaiveDate,
  due_date: NaiveDate,
  payment_terms_days: i32,
  currency: String,
  notes: Option<String>,
  subtotal: Decimal,
  tax_enabled: bool,
  tax_rate: Decimal,
  tax_name: String,
  tax_amount: Decimal,
  total: Decimal,
  created_at: DateTime<Utc>,
  updated_at: DateTime<Utc>,
  deleted_at: Option<DateTime<Utc>>,
}

impl TryFrom<InvoiceRow> for Invoice {
  type Error = InvoiceError;

  fn try_from(row: InvoiceRow) -> Result<Self, Self::Error> {
    Ok(Invoice {
      id: row.id,
      invoice_number: InvoiceNumber::new(row.invoice_number)?,
      document_type: DocumentType::from_str(&row.document_type)?,
      client_id: row.client_id,
      client_name: row.client_name,
      client_business_name: row.client_business_name,
      client_address: row.client_address,
      client_email: row.client_email,
      status: InvoiceStatus::from_str(&row.status)?,
      issue_date: row.issue_date,
      due_date: row.due_date,
      payment_terms_days: PaymentTermsDays::new(row.payment_terms_days)?,
      currency: CurrencyCode::new(&row.currency)?,
      notes: row.notes,
      subtotal: row.subtotal,
      tax_enabled: row.tax_enabled,
      tax_rate: TaxRate::new(row.tax_rate)?,
      tax_name: row.tax_name,
      tax_amount: row.tax_amount,
      total: row.total,
      created_at: row.created_at,
      updated_at: row.updated_at,
      deleted_at: row.deleted_at,
    })
  }
}

pub struct PostgresInvoiceRepository {
  pool: PgPool,
}

impl PostgresInvoiceRepository {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

fn map_insert_error(e: sqlx::Error, invoice_number: &str) -> InvoiceError {
  if let sqlx::Error::Database(db_err) = &e {
    // PostgreSQL unique violation code
    if db_err.code().as_deref() == Some("23505")
      && db_err.constraint() == Some(INVOICE_NUMBER_CONSTRAINT)
    {
      return InvoiceError::InvoiceNumberAlreadyExists(invoice_number.to_string());
    }
  }
  InvoiceError::Database(e)
}

/// Row lock held until the surrounding transaction ends. Soft-deleted
/// invoices are not found.
async fn lock_invoice(conn: &mut PgConnection, id: Uuid) -> Result<Invoice, InvoiceError> {
  sqlx::query_as::<_, InvoiceRow>(
    r#"
            SELECT id, invoice_number, document_type, client_id, client_name,
                   client_business_name, client_address, client_email, status,
                   issue_date, due_date, payment_terms_days, currency, notes,
                   subtotal, tax_enabled, tax_rate, tax_name, tax_amount, total,
                   created_at, updated_at, deleted_at
            FROM invoices
            WHERE id = $1 AND deleted_at IS NULL
            FOR UPDATE
            "#,
  )
  .bind(id)
  .fetch_optional(&mut *conn)
  .await?
  .ok_or(InvoiceError::InvoiceNotFound(id))?
  .try_into()
}

async fn write_header(conn: &mut PgConnection, invoice: &Invoice) -> Result<(), sqlx::Error> {
  sqlx::query(
    r#"
            UPDATE invoices
            SET client_id = $2, client_name = $3, client_business_name = $4,
                client_address = $5, client_email = $6, status = $7,
                issue_date = $8, due_date = $9, payment_terms_days = $10,
                currency = $11, notes = $12, tax_enabled = $13, tax_rate = $14,
                tax_name = $15, updated_at = $16
            WHERE id = $1
            "#,
  )
  .bind(invoice.id)
  .bind(invoice.client_id)
  .bind(&invoice.client_name)
  .bind(&invoice.client_business_name)
  .bind(&invoice.client_address)
  .bind(&invoice.client_email)
  .bind(invoice.status.as_str())
  .bind(invoice.issue_date)
  .bind(invoice.due_date)
  .bind(invoice.payment_terms_days.days())
  .bind(invoice.currency.as_str())
  .bind(&invoice.notes)
  .bind(invoice.tax_enabled)
  .bind(invoice.tax_rate.value())
  .bind(&invoice.tax_name)
  .bind(invoice.updated_at)
  .execute(&mut *conn)
  .await?;
  Ok(())
}

/// Recomputes totals from the items currently stored and writes only the
/// totals columns. Callers hold the invoice row lock.
async fn store_totals(conn: &mut PgConnection, invoice: &Invoice) -> Result<Invoice, InvoiceError> {
  let items = find_items(&mut *conn, invoice.id).await?;
  let totals = InvoiceTotals::calculate(&items, &invoice.tax_policy())?;

  sqlx::query_as::<_, InvoiceRow>(
    r#"
            UPDATE invoices
            SET subtotal = $2, tax_amount = $3, total = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING id, invoice_number, document_type, client_id, client_name,
                      client_business_name, client_address, client_email, status,
                      issue_date, due_date, payment_terms_days, currency, notes,
                      subtotal, tax_enabled, tax_rate, tax_name, tax_amount, total,
                      created_at, updated_at, deleted_at
            "#,
  )
  .bind(invoice.id)
  .bind(totals.subtotal)
  .bind(totals.tax_amount)
  .bind(totals.total)
  .fetch_one(&mut *conn)
  .await?
  .try_into()
}

async fn insert_line_item(conn: &mut PgConnection, item: &InvoiceLineItem) -> Result<(), sqlx::Error> {
  sqlx::query(
    r#"
            INSERT INTO invoice_line_items (
                id, invoice_id, description, quantity, unit_type,
                unit_price, total, sort_order
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
  )
  .bind(item.id)
  .bind(item.invoice_id)
  .bind(item.description.value())
  .bind(item.quantity.value())
  .bind(item.unit_type.as_str())
  .bind(item.unit_price.value())
  .bind(item.total)
  .bind(item.sort_order)
  .execute(&mut *conn)
  .await?;
  Ok(())
}

#[async_trait]
impl InvoiceRepository for PostgresInvoiceRepository {
  async fn create_with_items(
    &self,
    invoice: Invoice,
    line_items: Vec<InvoiceLineItem>,
  ) -> Result<(Invoice, Vec<InvoiceLineItem>), InvoiceError> {
    let mut tx = self.pool.begin().await?;

    let row = sqlx::query_as::<_, InvoiceRow>(
      r#"
            INSERT INTO invoices (
                id, invoice_number, document_type, client_id, client_name,
                client_business_name, client_address, client_email, status,
                issue_date, due_date, payment_terms_days, currency, notes,
                subtotal, tax_enabled, tax_rate, tax_name, tax_amount, total,
                created_at, updated_at, deleted_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
                    $15, $16, $17, $18, $19, $20, $21, $22, $23)
            RETURNING id, invoice_number, document_type, client_id, client_name,
                      client_business_name, client_address, client_email, status,
                      issue_date, due_date, payment_terms_days, currency, notes,
                      subtotal, tax_enabled, tax_rate, tax_name, tax_amount, total,
                      created_at, updated_at, deleted_at
            "#,
    )
    .bind(invoice.id)
    .bind(invoice.invoice_number.value())
    .bind(invoice.document_type.as_str())
    .bind(invoice.client_id)
    .bind(&invoice.client_name)
    .bind(&invoice.client_business_name)
    .bind(&invoice.client_address)
    .bind(&invoice.client_email)
    .bind(invoice.status.as_str())
    .bind(invoice.issue_date)
    .bind(invoice.due_date)
    .bind(invoice.payment_terms_days.days())
    .bind(invoice.currency.as_str())
    .bind(&invoice.notes)
    .bind(invoice.subtotal)
    .bind(invoice.tax_enabled)
    .bind(invoice.tax_rate.value())
    .bind(&invoice.tax_name)
    .bind(invoice.tax_amount)
    .bind(invoice.total)
    .bind(invoice.created_at)
    .bind(invoice.updated_at)
    .bind(invoice.deleted_at)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| map_insert_error(e, invoice.invoice_number.value()))?;

    for item in &line_items {
      insert_line_item(&mut tx, item).await?;
    }

    tx.commit().await?;

    Ok((row.try_into()?, line_items))
  }

  async fn update(&self, invoice: Invoice) -> Result<Invoice, InvoiceError> {
    let mut tx = self.pool.begin().await?;

    lock_invoice(&mut tx, invoice.id).await?;
    write_header(&mut tx, &invoice).await?;
    let updated = store_totals(&mut tx, &invoice).await?;

    tx.commit().await?;
    Ok(updated)
  }

  async fn set_status(&self, id: Uuid, status: InvoiceStatus) -> Result<Invoice, InvoiceError> {
    sqlx::query_as::<_, InvoiceRow>(
      r#"
            UPDATE invoices
            SET status = $2, updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING id, invoice_number, document_type, client_id, client_name,
                      client_business_name, client_address, client_email, status,
                      issue_date, due_date, payment_terms_days, currency, notes,
                      subtotal, tax_enabled, tax_rate, tax_name, tax_amount, total,
                      created_at, updated_at, deleted_at
            "#,
    )
    .bind(id)
    .bind(status.as_str())
    .fetch_optional(&self.pool)
    .await?
    .ok_or(InvoiceError::InvoiceNotFound(id))?
    .try_into()
  }

  async fn soft_delete(&self, id: Uuid) -> Result<(), InvoiceError> {
    let result = sqlx::query(
      "UPDATE invoices SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
    )
    .bind(id)
    .execute(&self.pool)
    .await?;

    if result.rows_affected() == 0 {
      return Err(InvoiceError::InvoiceNotFound(id));
    }
    Ok(())
  }

  async fn apply_line_item_change(
    &self,
    invoice_id: Uuid,
    change: LineItemChange,
  ) -> Result<Invoice, InvoiceError> {
    let mut tx = self.pool.begin().await?;
    let invoice = lock_invoice(&mut tx, invoice_id).await?;

    match &change {
      LineItemChange::Add(item) => insert_line_item(&mut tx, item).await?,
      LineItemChange::Update(item) => {
        let result = sqlx::query(
          r#"
            UPDATE invoice_line_items
            SET description = $3, quantity = $4, unit_type = $5,
                unit_price = $6, total = $7, sort_order = $8
            WHERE id = $1 AND invoice_id = $2
            "#,
        )
        .bind(item.id)
        .bind(invoice_id)
        .bind(item.description.value())
        .bind(item.quantity.value())
        .bind(item.unit_type.as_str())
        .bind(item.unit_price.value())
        .bind(item.total)
        .bind(item.sort_order)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
          return Err(InvoiceError::LineItemNotFound(item.id));
        }
      }
      LineItemChange::Remove(item_id) => {
        let result =
          sqlx::query("DELETE FROM invoice_line_items WHERE id = $1 AND invoice_id = $2")
            .bind(item_id)
            .bind(invoice_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
          return Err(InvoiceError::LineItemNotFound(*item_id));
        }
      }
    }

    let updated = store_totals(&mut tx, &invoice).await?;
    tx.commit().await?;

    Ok(updated)
  }

  async fn find_by_id(&self, id: Uuid) -> Result<Option<Invoice>, InvoiceError> {
    let row = sqlx::query_as::<_, InvoiceRow>(
      r#"
            SELECT id, invoice_number, document_type, client_id, client_name,
                   client_business_name, client_address, client_email, status,
                   issue_date, due_date, payment_terms_days, currency, notes,
                   subtotal, tax_enabled, tax_rate, tax_name, tax_amount, total,
                   created_at, updated_at, deleted_at
            FROM invoices
            WHERE id = $1
            "#,
    )
    .bind(id)
    .fetch_optional(&self.pool)
    .await?;

    row.map(|r| r.try_into()).transpose()
  }

  async fn find_active(&self, status: Option<InvoiceStatus>) -> Result<Vec<Invoice>, InvoiceError> {
    let rows = sqlx::query_as::<_, InvoiceRow>(
      r#"
            SELECT id, invoice_number, document_type, client_id, client_name,
                   client_business_name, client_address, client_email, status,
                   issue_date, due_date, payment_terms_days, currency, notes,
                   subtotal, tax_enabled, tax_rate, tax_name, tax_amount, total,
                   created_at, updated_at, deleted_at
            FROM invoices
            WHERE deleted_at IS NULL AND ($1::VARCHAR IS NULL OR status = $1)
            ORDER BY issue_date DESC, created_at DESC
            "#,
    )
    .bind(status.map(|s| s.as_str()))
    .fetch_all(&self.pool)
    .await?;

    rows.into_iter().map(|r| r.try_into()).collect()
  }

  async fn find_numbers_with_prefix(&self, prefix: &str) -> Result<Vec<String>, InvoiceError> {
    let numbers = sqlx::query_scalar::<_, String>(
      "SELECT invoice_number FROM invoices WHERE starts_with(invoice_number, $1)",
    )
    .bind(prefix)
    .fetch_all(&self.pool)
    .await?;

    Ok(numbers)
  }
}
