use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};

use crate::domain::invoice::{
  BusinessProfile, BusinessProfileRepository, CurrencyCode, InvoiceError, PaymentTermsDays,
  TaxRate,
};

#[derive(Debug, FromRow)]
struct BusinessProfileRow {
  business_name: Option<String>,
  tax_enabled: bool,
  tax_rate: Decimal,
  tax_name: String,
  payment_terms_days: Option<i32>,
  default_currency: String,
  updated_at: DateTime<Utc>,
}

impl TryFrom<BusinessProfileRow> for BusinessProfile {
  type Error = InvoiceError;

  fn try_from(row: BusinessProfileRow) -> Result<Self, Self::Error> {
    Ok(BusinessProfile {
      business_name: row.business_name,
      tax_enabled: row.tax_enabled,
      tax_rate: TaxRate::new(row.tax_rate)?,
      tax_name: row.tax_name,
      payment_terms_days: row.payment_terms_days.map(PaymentTermsDays::new).transpose()?,
      default_currency: CurrencyCode::new(&row.default_currency)?,
      updated_at: row.updated_at,
    })
  }
}

/// Stores the single business profile row (id = 1)
pub struct PostgresBusinessProfileRepository {
  pool: PgPool,
}

impl PostgresBusinessProfileRepository {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl BusinessProfileRepository for PostgresBusinessProfileRepository {
  async fn get(&self) -> Result<Option<BusinessProfile>, InvoiceError> {
    let row = sqlx::query_as::<_, BusinessProfileRow>(
      r#"
            SELECT business_name, tax_enabled, tax_rate, tax_name,
                   payment_terms_days, default_currency, updated_at
            FROM business_profile
            WHERE id = 1
            "#,
    )
    .fetch_optional(&self.pool)
    .await?;

    row.map(|r| r.try_into()).transpose()
  }

  async fn save(&self, profile: BusinessProfile) -> Result<BusinessProfile, InvoiceError> {
    let row = sqlx::query_as::<_, BusinessProfileRow>(
      r#"
            INSERT INTO business_profile (
                id, business_name, tax_enabled, tax_rate, tax_name,
                payment_terms_days, default_currency, updated_at
            )
            VALUES (1, $1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO UPDATE
            SET business_name = EXCLUDED.business_name,
                tax_enabled = EXCLUDED.tax_enabled,
                tax_rate = EXCLUDED.tax_rate,
                tax_name = EXCLUDED.tax_name,
                payment_terms_days = EXCLUDED.payment_terms_days,
                default_currency = EXCLUDED.default_currency,
                updated_at = EXCLUDED.updated_at
            RETURNING business_name, tax_enabled, tax_rate, tax_name,
                      payment_terms_days, default_currency, updated_at
            "#,
    )
    .bind(&profile.business_name)
    .bind(profile.tax_enabled)
    .bind(profile.tax_rate.value())
    .bind(&profile.tax_name)
    .bind(profile.payment_terms_days.map(|t| t.days()))
    .bind(profile.default_currency.as_str())
    .bind(profile.updated_at)
    .fetch_one(&self.pool)
    .await?;

    row.try_into()
  }
}
