// core/src/query.rs

//! Pure, synchronous projections over a ledger snapshot.
//!
//! Nothing here performs I/O or caches: every function recomputes from the
//! snapshot it is handed. Reactive re-invocation when the ledger changes is
//! a boundary concern (the embedding UI watches the shared snapshot handle
//! and calls back in here).

use crate::ledger::LedgerSnapshot;
use crate::types::{Order, OrderStatus, StarkAddress};
use alloy_primitives::U256;
use std::collections::BTreeMap;

/// The current listing for a specific token: open ERC721-offer orders
/// matching contract + identifier, most recently created (highest block)
/// winning.
pub fn find_listing_for_token<'a>(
  snapshot: &'a LedgerSnapshot,
  token: StarkAddress,
  token_id: U256,
  now: u64,
) -> Option<&'a Order> {
  snapshot
    .listings(now)
    .into_iter()
    .filter(|o| o.is_listing() && o.concerns_token(token, token_id))
    .max_by_key(|o| o.block_number)
}

/// All open bids against a specific token, highest offer first. Ties keep
/// snapshot order (stable sort).
pub fn offers_for_token<'a>(
  snapshot: &'a LedgerSnapshot,
  token: StarkAddress,
  token_id: U256,
  now: u64,
) -> Vec<&'a Order> {
  let mut bids: Vec<&Order> = snapshot
    .listings(now)
    .into_iter()
    .filter(|o| o.is_bid() && o.concerns_token(token, token_id))
    .collect();
  bids.sort_by(|a, b| b.bid_amount().cmp(&a.bid_amount()));
  bids
}

/// The connected user's own open bid on the token, if any.
pub fn user_offer<'a>(
  snapshot: &'a LedgerSnapshot,
  token: StarkAddress,
  token_id: U256,
  user: StarkAddress,
  now: u64,
) -> Option<&'a Order> {
  offers_for_token(snapshot, token, token_id, now)
    .into_iter()
    .find(|o| o.parameters.offerer == user)
}

/// Fixed-point amount to decimal display string, integer arithmetic only.
/// Stablecoin-class tokens (≤ 6 decimals) show 2 places, 18-decimal tokens
/// show 4.
pub fn format_amount(amount: U256, decimals: u32) -> String {
  if decimals == 0 {
    return amount.to_string();
  }
  let places = if decimals <= 6 { 2u32 } else { 4u32 };
  let places = places.min(decimals);

  let divisor = U256::from(10u8).pow(U256::from(decimals));
  let whole = amount / divisor;
  let frac = amount % divisor;
  // Truncate the fraction to the displayed precision.
  let frac_scaled = frac / U256::from(10u8).pow(U256::from(decimals - places));
  format!("{}.{:0>width$}", whole, frac_scaled.to_string(), width = places as usize)
}

/// Remaining validity bucketed for display: days, hours or minutes, with
/// "Expired" at or past the end time.
pub fn time_remaining(end_time: u64, now: u64) -> String {
  if end_time <= now {
    return "Expired".to_string();
  }
  let delta = end_time - now;
  let days = delta / 86_400;
  let hours = (delta % 86_400) / 3_600;
  let minutes = (delta % 3_600) / 60;
  if days > 0 {
    format!("{}d {}h", days, hours)
  } else if hours > 0 {
    format!("{}h {}m", hours, minutes)
  } else {
    format!("{}m", minutes.max(1))
  }
}

/// Aggregate counts and fulfilled volume, derived from `all_orders`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MarketStats {
  pub total_orders: usize,
  pub active: usize,
  pub fulfilled: usize,
  pub cancelled: usize,
  /// Fulfilled consideration volume per currency token.
  pub volume: Vec<(StarkAddress, U256)>,
}

pub fn market_stats(snapshot: &LedgerSnapshot) -> MarketStats {
  let mut stats = MarketStats {
    total_orders: snapshot.all_orders.len(),
    ..Default::default()
  };
  let mut volume: BTreeMap<StarkAddress, U256> = BTreeMap::new();
  for order in &snapshot.all_orders {
    match order.status {
      OrderStatus::Active => stats.active += 1,
      OrderStatus::Fulfilled => {
        stats.fulfilled += 1;
        for item in &order.parameters.consideration {
          let entry = volume.entry(item.token).or_default();
          *entry = entry.saturating_add(item.start_amount);
        }
      }
      OrderStatus::Cancelled => stats.cancelled += 1,
    }
  }
  stats.volume = volume.into_iter().collect();
  stats
}
