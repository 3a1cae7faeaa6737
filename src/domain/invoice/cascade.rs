//! Three-tier override resolution: invoice > client > business.
//!
//! Each field resolves independently, so a client may override the rate while
//! the business still decides whether tax applies at all.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::entities::{BusinessProfile, Client};
use super::value_objects::{PaymentTermsDays, TaxRate, ValueObjectError};

/// First present value wins, falling back to the business default.
pub fn resolve<T>(invoice: Option<T>, client: Option<T>, business: T) -> T {
  invoice.or(client).unwrap_or(business)
}

/// Per-invoice (or per-schedule) tax overrides; `None` means "not specified"
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxOverrides {
  pub enabled: Option<bool>,
  pub rate: Option<TaxRate>,
  pub name: Option<String>,
}

impl TaxOverrides {
  /// Validates raw caller input before anything is persisted.
  pub fn from_raw(
    enabled: Option<bool>,
    rate: Option<Decimal>,
    name: Option<String>,
  ) -> Result<Self, ValueObjectError> {
    Ok(Self {
      enabled,
      rate: rate.map(TaxRate::new).transpose()?,
      name: non_blank(name),
    })
  }

  pub fn is_empty(&self) -> bool {
    self.enabled.is_none() && self.rate.is_none() && self.name.is_none()
  }
}

/// Tax settings frozen onto an invoice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxPolicy {
  pub enabled: bool,
  pub rate: TaxRate,
  pub name: String,
}

impl TaxPolicy {
  pub fn resolve(
    overrides: &TaxOverrides,
    client: Option<&Client>,
    business: &BusinessProfile,
  ) -> Self {
    Self {
      enabled: resolve(
        overrides.enabled,
        client.and_then(|c| c.tax_enabled),
        business.tax_enabled,
      ),
      rate: resolve(
        overrides.rate,
        client.and_then(|c| c.tax_rate),
        business.tax_rate,
      ),
      name: resolve(
        overrides.name.clone(),
        client.and_then(|c| non_blank(c.tax_name.clone())),
        business.tax_name.clone(),
      ),
    }
  }

  /// Applies explicit edits on top of an already-frozen policy. Fields not
  /// supplied keep their historical value.
  pub fn edited(&self, overrides: &TaxOverrides) -> Self {
    Self {
      enabled: overrides.enabled.unwrap_or(self.enabled),
      rate: overrides.rate.unwrap_or(self.rate),
      name: overrides.name.clone().unwrap_or_else(|| self.name.clone()),
    }
  }
}

/// Payment terms: invoice > client > business > 30 days
pub fn resolve_payment_terms(
  invoice: Option<PaymentTermsDays>,
  client: Option<&Client>,
  business: &BusinessProfile,
) -> PaymentTermsDays {
  resolve(
    invoice,
    client.and_then(|c| c.payment_terms_days),
    business
      .payment_terms_days
      .unwrap_or(PaymentTermsDays::FALLBACK),
  )
}

/// Explicit due date, otherwise issue date plus terms
pub fn resolve_due_date(
  override_date: Option<NaiveDate>,
  issue_date: NaiveDate,
  terms: PaymentTermsDays,
) -> NaiveDate {
  override_date.unwrap_or_else(|| terms.due_from(issue_date))
}

fn non_blank(value: Option<String>) -> Option<String> {
  value
    .map(|s| s.trim().to_string())
    .filter(|s| !s.is_empty())
}
