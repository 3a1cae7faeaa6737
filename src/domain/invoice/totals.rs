use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::cascade::TaxPolicy;
use super::entities::InvoiceLineItem;
use super::value_objects::{Quantity, UnitPrice, ValueObjectError};

/// Amounts are stored exactly as NUMERIC(28, 6), so they stay below 10^22
const AMOUNT_LIMIT: Decimal = Decimal::from_parts(2_990_538_752, 434_162_106, 542, false, 0);

/// Exact product. `Quantity` and `UnitPrice` are bounded, so this cannot
/// overflow.
pub fn line_total(quantity: Quantity, unit_price: UnitPrice) -> Decimal {
  quantity.value() * unit_price.value()
}

fn out_of_range() -> ValueObjectError {
  ValueObjectError::InvalidAmount("Invoice amount exceeds the supported range".to_string())
}

// Invoice Totals - recomputed after every line-item mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceTotals {
  pub subtotal: Decimal,
  pub tax_amount: Decimal,
  pub total: Decimal,
}

impl InvoiceTotals {
  pub fn calculate(
    line_items: &[InvoiceLineItem],
    tax: &TaxPolicy,
  ) -> Result<Self, ValueObjectError> {
    let subtotal = line_items.iter().try_fold(Decimal::ZERO, |sum, item| {
      sum
        .checked_add(line_total(item.quantity, item.unit_price))
        .ok_or_else(out_of_range)
    })?;

    let tax_amount = if tax.enabled {
      subtotal
        .checked_mul(tax.rate.as_multiplier())
        .ok_or_else(out_of_range)?
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    } else {
      Decimal::ZERO
    };

    let total = subtotal.checked_add(tax_amount).ok_or_else(out_of_range)?;
    if total >= AMOUNT_LIMIT {
      return Err(out_of_range());
    }

    Ok(Self {
      subtotal,
      tax_amount,
      total,
    })
  }
}
