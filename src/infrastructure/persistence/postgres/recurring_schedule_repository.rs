use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::invoice::{
  CurrencyCode, LineItemData, LineItemDescription, PaymentTermsDays, Quantity, TaxOverrides,
  UnitPrice, UnitType, ValueObjectError,
};
use crate::domain::recurring::{
  Frequency, InvoiceTemplate, RecurringError, RecurringSchedule, RecurringScheduleRepository,
  ScheduleDay,
};

/// One element of the `line_items` JSONB array
#[derive(Debug, Serialize, Deserialize)]
struct LineItemRecord {
  description: String,
  quantity: Decimal,
  unit_type: String,
  unit_price: Decimal,
}

impl From<&LineItemData> for LineItemRecord {
  fn from(item: &LineItemData) -> Self {
    Self {
      description: item.description.value().to_string(),
      quantity: item.quantity.value(),
      unit_type: item.unit_type.as_str().to_string(),
      unit_price: item.unit_price.value(),
    }
  }
}

impl TryFrom<LineItemRecord> for LineItemData {
  type Error = ValueObjectError;

  fn try_from(record: LineItemRecord) -> Result<Self, Self::Error> {
    Ok(LineItemData {
      description: LineItemDescription::new(record.description)?,
      quantity: Quantity::new(record.quantity)?,
      unit_type: UnitType::from_str(&record.unit_type)?,
      unit_price: UnitPrice::new(record.unit_price)?,
    })
  }
}

fn encode_line_items(items: &[LineItemData]) -> Result<serde_json::Value, RecurringError> {
  let records: Vec<LineItemRecord> = items.iter().map(LineItemRecord::from).collect();
  Ok(serde_json::to_value(records)?)
}

#[derive(Debug, FromRow)]
struct ScheduleRow {
  id: Uuid,
  client_id: Uuid,
  frequency: String,
  schedule_day: i32,
  currency: Option<String>,
  payment_terms_days: Option<i32>,
  notes: Option<String>,
  tax_enabled: Option<bool>,
  tax_rate: Option<Decimal>,
  tax_name: Option<String>,
  line_items: serde_json::Value,
  is_active: bool,
  next_invoice_date: NaiveDate,
  last_invoice_id: Option<Uuid>,
  created_at: DateTime<Utc>,
  updated_at: DateTime<Utc>,
}

impl TryFrom<ScheduleRow> for RecurringSchedule {
  type Error = RecurringError;

  fn try_from(row: ScheduleRow) -> Result<Self, Self::Error> {
    let frequency = Frequency::from_str(&row.frequency)?;
    let records: Vec<LineItemRecord> = serde_json::from_value(row.line_items)?;
    let line_items = records
      .into_iter()
      .map(LineItemData::try_from)
      .collect::<Result<Vec<_>, _>>()?;

    Ok(RecurringSchedule {
      id: row.id,
      client_id: row.client_id,
      frequency,
      schedule_day: ScheduleDay::new(frequency, row.schedule_day)?,
      template: InvoiceTemplate {
        currency: row.currency.as_deref().map(CurrencyCode::new).transpose()?,
        payment_terms_days: row.payment_terms_days.map(PaymentTermsDays::new).transpose()?,
        notes: row.notes,
        tax: TaxOverrides::from_raw(row.tax_enabled, row.tax_rate, row.tax_name)?,
        line_items,
      },
      is_active: row.is_active,
      next_invoice_date: row.next_invoice_date,
      last_invoice_id: row.last_invoice_id,
      created_at: row.created_at,
      updated_at: row.updated_at,
    })
  }
}

pub struct PostgresRecurringScheduleRepository {
  pool: PgPool,
}

impl PostgresRecurringScheduleRepository {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl RecurringScheduleRepository for PostgresRecurringScheduleRepository {
  async fn create(&self, schedule: RecurringSchedule) -> Result<RecurringSchedule, RecurringError> {
    let template = &schedule.template;
    let row = sqlx::query_as::<_, ScheduleRow>(
      r#"
            INSERT INTO recurring_schedules (
                id, client_id, frequency, schedule_day, currency, payment_terms_days,
                notes, tax_enabled, tax_rate, tax_name, line_items, is_active,
                next_invoice_date, last_invoice_id, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING id, client_id, frequency, schedule_day, currency, payment_terms_days,
                      notes, tax_enabled, tax_rate, tax_name, line_items, is_active,
                      next_invoice_date, last_invoice_id, created_at, updated_at
            "#,
    )
    .bind(schedule.id)
    .bind(schedule.client_id)
    .bind(schedule.frequency.as_str())
    .bind(schedule.schedule_day.value() as i32)
    .bind(template.currency.as_ref().map(|c| c.as_str()))
    .bind(template.payment_terms_days.map(|t| t.days()))
    .bind(&template.notes)
    .bind(template.tax.enabled)
    .bind(template.tax.rate.map(|r| r.value()))
    .bind(&template.tax.name)
    .bind(encode_line_items(&template.line_items)?)
    .bind(schedule.is_active)
    .bind(schedule.next_invoice_date)
    .bind(schedule.last_invoice_id)
    .bind(schedule.created_at)
    .bind(schedule.updated_at)
    .fetch_one(&self.pool)
    .await?;

    row.try_into()
  }

  async fn update(&self, schedule: RecurringSchedule) -> Result<RecurringSchedule, RecurringError> {
    let template = &schedule.template;
    let row = sqlx::query_as::<_, ScheduleRow>(
      r#"
            UPDATE recurring_schedules
            SET client_id = $2, frequency = $3, schedule_day = $4, currency = $5,
                payment_terms_days = $6, notes = $7, tax_enabled = $8, tax_rate = $9,
                tax_name = $10, line_items = $11, updated_at = $12
            WHERE id = $1
            RETURNING id, client_id, frequency, schedule_day, currency, payment_terms_days,
                      notes, tax_enabled, tax_rate, tax_name, line_items, is_active,
                      next_invoice_date, last_invoice_id, created_at, updated_at
            "#,
    )
    .bind(schedule.id)
    .bind(schedule.client_id)
    .bind(schedule.frequency.as_str())
    .bind(schedule.schedule_day.value() as i32)
    .bind(template.currency.as_ref().map(|c| c.as_str()))
    .bind(template.payment_terms_days.map(|t| t.days()))
    .bind(&template.notes)
    .bind(template.tax.enabled)
    .bind(template.tax.rate.map(|r| r.value()))
    .bind(&template.tax.name)
    .bind(encode_line_items(&template.line_items)?)
    .bind(schedule.updated_at)
    .fetch_optional(&self.pool)
    .await?;

    row
      .ok_or(RecurringError::ScheduleNotFound(schedule.id))?
      .try_into()
  }

  async fn set_active(&self, id: Uuid, active: bool) -> Result<RecurringSchedule, RecurringError> {
    sqlx::query_as::<_, ScheduleRow>(
      r#"
            UPDATE recurring_schedules
            SET is_active = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, client_id, frequency, schedule_day, currency, payment_terms_days,
                      notes, tax_enabled, tax_rate, tax_name, line_items, is_active,
                      next_invoice_date, last_invoice_id, created_at, updated_at
            "#,
    )
    .bind(id)
    .bind(active)
    .fetch_optional(&self.pool)
    .await?
    .ok_or(RecurringError::ScheduleNotFound(id))?
    .try_into()
  }

  async fn reschedule(
    &self,
    id: Uuid,
    next_invoice_date: NaiveDate,
  ) -> Result<RecurringSchedule, RecurringError> {
    sqlx::query_as::<_, ScheduleRow>(
      r#"
            UPDATE recurring_schedules
            SET next_invoice_date = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, client_id, frequency, schedule_day, currency, payment_terms_days,
                      notes, tax_enabled, tax_rate, tax_name, line_items, is_active,
                      next_invoice_date, last_invoice_id, created_at, updated_at
            "#,
    )
    .bind(id)
    .bind(next_invoice_date)
    .fetch_optional(&self.pool)
    .await?
    .ok_or(RecurringError::ScheduleNotFound(id))?
    .try_into()
  }

  async fn record_firing(
    &self,
    id: Uuid,
    invoice_id: Uuid,
    computed_next: NaiveDate,
  ) -> Result<RecurringSchedule, RecurringError> {
    sqlx::query_as::<_, ScheduleRow>(
      r#"
            UPDATE recurring_schedules
            SET last_invoice_id = $2,
                next_invoice_date = GREATEST(next_invoice_date, $3),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, client_id, frequency, schedule_day, currency, payment_terms_days,
                      notes, tax_enabled, tax_rate, tax_name, line_items, is_active,
                      next_invoice_date, last_invoice_id, created_at, updated_at
            "#,
    )
    .bind(id)
    .bind(invoice_id)
    .bind(computed_next)
    .fetch_optional(&self.pool)
    .await?
    .ok_or(RecurringError::ScheduleNotFound(id))?
    .try_into()
  }

  async fn delete(&self, id: Uuid) -> Result<(), RecurringError> {
    let result = sqlx::query("DELETE FROM recurring_schedules WHERE id = $1")
      .bind(id)
      .execute(&self.pool)
      .await?;

    if result.rows_affected() == 0 {
      return Err(RecurringError::ScheduleNotFound(id));
    }
    Ok(())
  }

  async fn find_by_id(&self, id: Uuid) -> Result<Option<RecurringSchedule>, RecurringError> {
    let row = sqlx::query_as::<_, ScheduleRow>(
      r#"
            SELECT id, client_id, frequency, schedule_day, currency, payment_terms_days,
                   notes, tax_enabled, tax_rate, tax_name, line_items, is_active,
                   next_invoice_date, last_invoice_id, created_at, updated_at
            FROM recurring_schedules
            WHERE id = $1
            "#,
    )
    .bind(id)
    .fetch_optional(&self.pool)
    .await?;

    row.map(|r| r.try_into()).transpose()
  }

  async fn find_all(&self, active_only: bool) -> Result<Vec<RecurringSchedule>, RecurringError> {
    let rows = sqlx::query_as::<_, ScheduleRow>(
      r#"
            SELECT id, client_id, frequency, schedule_day, currency, payment_terms_days,
                   notes, tax_enabled, tax_rate, tax_name, line_items, is_active,
                   next_invoice_date, last_invoice_id, created_at, updated_at
            FROM recurring_schedules
            WHERE is_active OR NOT $1
            ORDER BY next_invoice_date ASC, created_at ASC
            "#,
    )
    .bind(active_only)
    .fetch_all(&self.pool)
    .await?;

    rows.into_iter().map(|r| r.try_into()).collect()
  }

  async fn find_due(&self, today: NaiveDate) -> Result<Vec<RecurringSchedule>, RecurringError> {
    let rows = sqlx::query_as::<_, ScheduleRow>(
      r#"
            SELECT id, client_id, frequency, schedule_day, currency, payment_terms_days,
                   notes, tax_enabled, tax_rate, tax_name, line_items, is_active,
                   next_invoice_date, last_invoice_id, created_at, updated_at
            FROM recurring_schedules
            WHERE is_active AND next_invoice_date <= $1
            ORDER BY next_invoice_date ASC, created_at ASC
            "#,
    )
    .bind(today)
    .fetch_all(&self.pool)
    .await?;

    rows.into_iter().map(|r| r.try_into()).collect()
  }
}
