// tests/query_tests.rs
mod common;
use common::*;

use alloy_primitives::U256;
use starboard::query;
use starboard::OrderLedger;
use std::sync::Arc;

async fn snapshot_from(chain: &Arc<MockChain>) -> starboard::LedgerSnapshot {
  let ledger = OrderLedger::new(Arc::clone(chain), Arc::new(chain.config.clone()));
  ledger.refresh().await.unwrap();
  ledger.snapshot()
}

#[tokio::test]
async fn listing_lookup_prefers_highest_block() {
  setup_tracing();
  let chain = Arc::new(MockChain::new(test_config()));
  let token_id = 42u64;
  let _older = chain.seed_order(&listing_params(addr(1), token_id, 1_000_000), 100);
  let newer = chain.seed_order(&listing_params(addr(2), token_id, 2_000_000), 105);

  let snap = snapshot_from(&chain).await;
  let found = query::find_listing_for_token(&snap, nft_contract(), U256::from(token_id), NOW).unwrap();
  assert_eq!(found.order_hash, newer);
  assert_eq!(found.block_number, 105);
}

#[tokio::test]
async fn listing_lookup_ignores_other_tokens_and_terminal_orders() {
  setup_tracing();
  let chain = Arc::new(MockChain::new(test_config()));
  let cancelled = chain.seed_order(&listing_params(addr(1), 1, 1_000_000), 100);
  chain.push_cancelled(cancelled, 110);
  chain.seed_order(&listing_params(addr(2), 2, 1_000_000), 101);

  let snap = snapshot_from(&chain).await;
  assert!(query::find_listing_for_token(&snap, nft_contract(), U256::from(1u64), NOW).is_none());
}

#[tokio::test]
async fn bids_sort_highest_first() {
  setup_tracing();
  let chain = Arc::new(MockChain::new(test_config()));
  let token_id = 9u64;
  chain.seed_order(&bid_params(addr(1), token_id, 10), 100);
  chain.seed_order(&bid_params(addr(2), token_id, 50), 101);
  chain.seed_order(&bid_params(addr(3), token_id, 30), 102);
  // Noise that must not leak in: a bid on another token and a listing.
  chain.seed_order(&bid_params(addr(4), 999, 80), 103);
  chain.seed_order(&listing_params(addr(5), token_id, 70), 104);

  let snap = snapshot_from(&chain).await;
  let bids = query::offers_for_token(&snap, nft_contract(), U256::from(token_id), NOW);
  let amounts: Vec<u64> = bids.iter().map(|b| b.bid_amount().to::<u64>()).collect();
  assert_eq!(amounts, vec![50, 30, 10]);
}

#[tokio::test]
async fn equal_bids_keep_snapshot_order() {
  setup_tracing();
  let chain = Arc::new(MockChain::new(test_config()));
  let token_id = 9u64;
  let first = chain.seed_order(&bid_params(addr(1), token_id, 25), 100);
  let second = chain.seed_order(&bid_params(addr(2), token_id, 25), 101);

  let snap = snapshot_from(&chain).await;
  let bids = query::offers_for_token(&snap, nft_contract(), U256::from(token_id), NOW);
  let hashes: Vec<_> = bids.iter().map(|b| b.order_hash).collect();
  assert_eq!(hashes, vec![first, second]);
}

#[tokio::test]
async fn user_offer_finds_own_bid() {
  setup_tracing();
  let chain = Arc::new(MockChain::new(test_config()));
  let token_id = 9u64;
  chain.seed_order(&bid_params(addr(1), token_id, 50), 100);
  let mine = chain.seed_order(&bid_params(addr(2), token_id, 30), 101);

  let snap = snapshot_from(&chain).await;
  let found = query::user_offer(&snap, nft_contract(), U256::from(token_id), addr(2), NOW).unwrap();
  assert_eq!(found.order_hash, mine);
  assert!(query::user_offer(&snap, nft_contract(), U256::from(token_id), addr(3), NOW).is_none());
}

#[test]
fn amounts_format_by_decimal_class() {
  // Stablecoin-class (6 decimals): two places, truncated not rounded.
  assert_eq!(query::format_amount(U256::from(4_000_000u64), 6), "4.00");
  assert_eq!(query::format_amount(U256::from(1_259_999u64), 6), "1.25");
  assert_eq!(query::format_amount(U256::from(999u64), 6), "0.00");

  // 18-decimal tokens: four places.
  let one_eth = U256::from(10u8).pow(U256::from(18u8));
  assert_eq!(query::format_amount(one_eth, 18), "1.0000");
  assert_eq!(query::format_amount(one_eth / U256::from(2u8), 18), "0.5000");

  // Integer arithmetic stays exact where f64 would have drifted.
  let big = U256::from(1u128 << 63); // 9223372036854775808
  assert_eq!(query::format_amount(big, 6), "9223372036854.77");
}

#[test]
fn time_remaining_buckets() {
  assert_eq!(query::time_remaining(NOW, NOW), "Expired");
  assert_eq!(query::time_remaining(NOW - 1, NOW), "Expired");
  assert_eq!(query::time_remaining(NOW + 30, NOW), "1m");
  assert_eq!(query::time_remaining(NOW + 25 * 60, NOW), "25m");
  assert_eq!(query::time_remaining(NOW + 3 * 3_600 + 10 * 60, NOW), "3h 10m");
  assert_eq!(query::time_remaining(NOW + 2 * DAY + 5 * 3_600, NOW), "2d 5h");
}

#[tokio::test]
async fn market_stats_counts_and_volume() {
  setup_tracing();
  let chain = Arc::new(MockChain::new(test_config()));
  let sold = chain.seed_order(&listing_params(addr(1), 1, 1_500_000), 100);
  chain.push_fulfilled(sold, 110);
  let also_sold = chain.seed_order(&listing_params(addr(2), 2, 2_500_000), 101);
  chain.push_fulfilled(also_sold, 111);
  let cancelled = chain.seed_order(&listing_params(addr(3), 3, 9_000_000), 102);
  chain.push_cancelled(cancelled, 112);
  chain.seed_order(&listing_params(addr(4), 4, 1_000_000), 103);

  let snap = snapshot_from(&chain).await;
  let stats = query::market_stats(&snap);
  assert_eq!(stats.total_orders, 4);
  assert_eq!(stats.active, 1);
  assert_eq!(stats.fulfilled, 2);
  assert_eq!(stats.cancelled, 1);
  // Only fulfilled consideration counts toward volume.
  assert_eq!(stats.volume, vec![(currency(), U256::from(4_000_000u64))]);
}
