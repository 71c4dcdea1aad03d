// core/src/cart/totals.rs

//! Per-currency cart totals. On-chain amounts are summed as raw integers,
//! never floating point, and formatted exactly once at the end.

use crate::cart::CartItem;
use crate::error::{MarketError, MarketResult};
use crate::query::format_amount;
use crate::types::StarkAddress;
use alloy_primitives::U256;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyTotal {
  pub token: StarkAddress,
  pub raw: U256,
}

impl CurrencyTotal {
  pub fn formatted(&self, decimals: u32) -> String {
    format_amount(self.raw, decimals)
  }
}

/// Groups items by consideration token and sums raw amounts with checked
/// arithmetic. Sorted by token for a stable display order.
pub fn cart_totals(items: &[CartItem]) -> MarketResult<Vec<CurrencyTotal>> {
  let mut grouped: BTreeMap<StarkAddress, U256> = BTreeMap::new();
  for item in items {
    for consideration in &item.listing.parameters.consideration {
      let entry = grouped.entry(consideration.token).or_default();
      *entry = entry
        .checked_add(consideration.start_amount)
        .ok_or_else(|| MarketError::Internal("cart total overflow".to_string()))?;
    }
  }
  Ok(grouped.into_iter().map(|(token, raw)| CurrencyTotal { token, raw }).collect())
}
