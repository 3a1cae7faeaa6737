//! Date-scoped sequential invoice numbers: `{"Q-"?}YYYYMMDD-N`.
//!
//! Allocation is optimistic. Two concurrent callers can compute the same
//! number; the storage uniqueness constraint rejects the loser, and that
//! conflict is returned to the caller rather than retried here.

use chrono::NaiveDate;
use std::sync::Arc;

use super::errors::InvoiceError;
use super::ports::InvoiceRepository;
use super::value_objects::{DocumentType, InvoiceNumber};

/// `{prefix}{YYYYMMDD}-`
pub fn number_prefix(document_type: DocumentType, issue_date: NaiveDate) -> String {
  format!(
    "{}{}-",
    document_type.number_prefix(),
    issue_date.format("%Y%m%d")
  )
}

/// Picks `max(sequence) + 1` among `existing`. Numbers whose suffix is not a
/// plain integer are ignored.
pub fn next_number(prefix: &str, existing: &[String]) -> InvoiceNumber {
  let max_sequence = existing
    .iter()
    .filter_map(|number| number.strip_prefix(prefix))
    .filter(|suffix| !suffix.is_empty() && suffix.chars().all(|c| c.is_ascii_digit()))
    .filter_map(|suffix| suffix.parse::<u64>().ok())
    .max()
    .unwrap_or(0);

  InvoiceNumber::generated(prefix, max_sequence + 1)
}

pub struct InvoiceNumberAllocator {
  invoice_repo: Arc<dyn InvoiceRepository>,
}

impl InvoiceNumberAllocator {
  pub fn new(invoice_repo: Arc<dyn InvoiceRepository>) -> Self {
    Self { invoice_repo }
  }

  pub async fn allocate(
    &self,
    document_type: DocumentType,
    issue_date: NaiveDate,
    override_number: Option<&str>,
  ) -> Result<InvoiceNumber, InvoiceError> {
    if let Some(number) = override_number {
      return Ok(InvoiceNumber::from_override(number)?);
    }

    let prefix = number_prefix(document_type, issue_date);
    let existing = self.invoice_repo.find_numbers_with_prefix(&prefix).await?;
    let number = next_number(&prefix, &existing);

    tracing::debug!(
      invoice_number = %number,
      existing = existing.len(),
      "Allocated invoice number"
    );

    Ok(number)
  }
}
