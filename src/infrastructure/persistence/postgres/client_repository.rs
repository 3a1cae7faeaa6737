use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::domain::invoice::{
  Client, ClientAddress, ClientName, ClientRepository, Email, InvoiceError, PaymentTermsDays,
  TaxRate,
};

#[derive(Debug, FromRow)]
struct ClientRow {
  id: Uuid,
  name: String,
  business_name: Option<String>,
  email: Option<String>,
  address_line1: Option<String>,
  address_line2: Option<String>,
  city: Option<String>,
  state: Option<String>,
  postal_code: Option<String>,
  country: Option<String>,
  payment_terms_days: Option<i32>,
  tax_enabled: Option<bool>,
  tax_rate: Option<Decimal>,
  tax_name: Option<String>,
  created_at: DateTime<Utc>,
  updated_at: DateTime<Utc>,
}

impl TryFrom<ClientRow> for Client {
  type Error = InvoiceError;

  fn try_from(row: ClientRow) -> Result<Self, Self::Error> {
    Ok(Client {
      id: row.id,
      name: ClientName::new(row.name)?,
      business_name: row.business_name,
      email: row.email.map(Email::new).transpose()?,
      address: ClientAddress {
        line1: row.address_line1,
        line2: row.address_line2,
        city: row.city,
        state: row.state,
        postal_code: row.postal_code,
        country: row.country,
      },
      payment_terms_days: row.payment_terms_days.map(PaymentTermsDays::new).transpose()?,
      tax_enabled: row.tax_enabled,
      tax_rate: row.tax_rate.map(TaxRate::new).transpose()?,
      tax_name: row.tax_name,
      created_at: row.created_at,
      updated_at: row.updated_at,
    })
  }
}

pub struct PostgresClientRepository {
  pool: PgPool,
}

impl PostgresClientRepository {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl ClientRepository for PostgresClientRepository {
  async fn create(&self, client: Client) -> Result<Client, InvoiceError> {
    let row = sqlx::query_as::<_, ClientRow>(
      r#"
            INSERT INTO clients (
                id, name, business_name, email, address_line1, address_line2,
                city, state, postal_code, country, payment_terms_days,
                tax_enabled, tax_rate, tax_name, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING id, name, business_name, email, address_line1, address_line2,
                      city, state, postal_code, country, payment_terms_days,
                      tax_enabled, tax_rate, tax_name, created_at, updated_at
            "#,
    )
    .bind(client.id)
    .bind(client.name.value())
    .bind(&client.business_name)
    .bind(client.email.as_ref().map(|e| e.as_str()))
    .bind(&client.address.line1)
    .bind(&client.address.line2)
    .bind(&client.address.city)
    .bind(&client.address.state)
    .bind(&client.address.postal_code)
    .bind(&client.address.country)
    .bind(client.payment_terms_days.map(|t| t.days()))
    .bind(client.tax_enabled)
    .bind(client.tax_rate.map(|r| r.value()))
    .bind(&client.tax_name)
    .bind(client.created_at)
    .bind(client.updated_at)
    .fetch_one(&self.pool)
    .await?;

    row.try_into()
  }

  async fn update(&self, client: Client) -> Result<Client, InvoiceError> {
    let row = sqlx::query_as::<_, ClientRow>(
      r#"
            UPDATE clients
            SET name = $2, business_name = $3, email = $4, address_line1 = $5,
                address_line2 = $6, city = $7, state = $8, postal_code = $9,
                country = $10, payment_terms_days = $11, tax_enabled = $12,
                tax_rate = $13, tax_name = $14, updated_at = $15
            WHERE id = $1
            RETURNING id, name, business_name, email, address_line1, address_line2,
                      city, state, postal_code, country, payment_terms_days,
                      tax_enabled, tax_rate, tax_name, created_at, updated_at
            "#,
    )
    .bind(client.id)
    .bind(client.name.value())
    .bind(&client.business_name)
    .bind(client.email.as_ref().map(|e| e.as_str()))
    .bind(&client.address.line1)
    .bind(&client.address.line2)
    .bind(&client.address.city)
    .bind(&client.address.state)
    .bind(&client.address.postal_code)
    .bind(&client.address.country)
    .bind(client.payment_terms_days.map(|t| t.days()))
    .bind(client.tax_enabled)
    .bind(client.tax_rate.map(|r| r.value()))
    .bind(&client.tax_name)
    .bind(client.updated_at)
    .fetch_optional(&self.pool)
    .await?;

    row
      .ok_or(InvoiceError::ClientNotFound(client.id))?
      .try_into()
  }

  async fn find_by_id(&self, id: Uuid) -> Result<Option<Client>, InvoiceError> {
    let row = sqlx::query_as::<_, ClientRow>(
      r#"
            SELECT id, name, business_name, email, address_line1, address_line2,
                   city, state, postal_code, country, payment_terms_days,
                   tax_enabled, tax_rate, tax_name, created_at, updated_at
            FROM clients
            WHERE id = $1
            "#,
    )
    .bind(id)
    .fetch_optional(&self.pool)
    .await?;

    row.map(|r| r.try_into()).transpose()
  }
}
