// tests/exchange_tests.rs
mod common;
use common::*;

use alloy_primitives::U256;
use starboard::{ActionPhase, ExchangeClient, MarketError};
use std::sync::atomic::Ordering;
use std::sync::Arc;

struct Rig {
  chain: Arc<MockChain>,
  wallet: Arc<MockWallet>,
  exchange: ExchangeClient<MockChain, MockWallet>,
}

fn rig(connected: starboard::StarkAddress) -> Rig {
  let config = Arc::new(test_config());
  let chain = Arc::new(MockChain::new(test_config()));
  let wallet = Arc::new(MockWallet::new(connected));
  let exchange = ExchangeClient::new(Arc::clone(&chain), Arc::clone(&wallet), config);
  Rig { chain, wallet, exchange }
}

#[tokio::test]
async fn register_order_submits_and_confirms() {
  setup_tracing();
  let offerer = addr(0xA11CE);
  let rig = rig(offerer);
  rig.chain.set_nonce(offerer, 3);

  let params = listing_params(offerer, 12, 9_000_000);
  let tx_hash = rig.exchange.register_order(&params).await.unwrap();

  let state = rig.exchange.action_state().snapshot();
  assert_eq!(state.phase, ActionPhase::Succeeded);
  assert_eq!(state.tx_hash, Some(tx_hash));
  assert!(state.error.is_none());

  let executed = rig.wallet.executed_calls();
  assert_eq!(executed.len(), 1);
  assert_eq!(executed[0].len(), 1);
  let call = &executed[0][0];
  assert_eq!(call.entrypoint, "register_order");
  assert_eq!(call.to, rig.chain.config.contract);
  // The freshly fetched nonce rides in the calldata (second-to-third from
  // the end: nonce, sig_r, sig_s).
  assert_eq!(call.calldata[call.calldata.len() - 3], U256::from(3u64));
}

#[tokio::test]
async fn nonce_is_refetched_for_every_action() {
  setup_tracing();
  let offerer = addr(0xA11CE);
  let rig = rig(offerer);

  rig.chain.set_nonce(offerer, 0);
  rig.exchange.register_order(&listing_params(offerer, 1, 1_000_000)).await.unwrap();

  // Another tab registered meanwhile; the counter moved.
  rig.chain.set_nonce(offerer, 7);
  rig.exchange.register_order(&listing_params(offerer, 2, 1_000_000)).await.unwrap();

  let executed = rig.wallet.executed_calls();
  let nonce_of = |call: &starboard::Call| call.calldata[call.calldata.len() - 3];
  assert_eq!(nonce_of(&executed[0][0]), U256::from(0u64));
  assert_eq!(nonce_of(&executed[1][0]), U256::from(7u64));
}

#[tokio::test]
async fn hash_mismatch_aborts_before_submission() {
  setup_tracing();
  let offerer = addr(0xA11CE);
  let rig = rig(offerer);
  rig.chain.corrupt_hash.store(true, Ordering::SeqCst);

  let err = rig.exchange.register_order(&listing_params(offerer, 1, 1_000_000)).await.unwrap_err();
  assert!(matches!(err, MarketError::HashMismatch { .. }));

  // The gate fires before anything reaches the wallet's execute path.
  assert!(rig.wallet.executed_calls().is_empty());
  let state = rig.exchange.action_state().snapshot();
  assert_eq!(state.phase, ActionPhase::Failed);
  assert!(state.error.as_deref().unwrap().contains("hash mismatch"));
}

#[tokio::test]
async fn wallet_rejection_is_recoverable() {
  setup_tracing();
  let offerer = addr(0xA11CE);
  let rig = rig(offerer);
  rig.wallet.reject_next.store(true, Ordering::SeqCst);

  let params = listing_params(offerer, 1, 1_000_000);
  let err = rig.exchange.register_order(&params).await.unwrap_err();
  assert!(matches!(err, MarketError::SignatureRejected));
  assert!(rig.wallet.executed_calls().is_empty());

  // Back to Idle with no error banner: rejection is not a failure.
  let state = rig.exchange.action_state().snapshot();
  assert_eq!(state.phase, ActionPhase::Idle);
  assert!(state.error.is_none());

  // The same action retried immediately goes through.
  rig.exchange.register_order(&params).await.unwrap();
  assert_eq!(rig.exchange.action_state().snapshot().phase, ActionPhase::Succeeded);
}

#[tokio::test]
async fn revert_surfaces_chain_message_verbatim() {
  setup_tracing();
  let offerer = addr(0xA11CE);
  let rig = rig(offerer);
  *rig.chain.revert_next.lock() = Some("Exchange: nonce already consumed".to_string());

  let err = rig.exchange.register_order(&listing_params(offerer, 1, 1_000_000)).await.unwrap_err();
  match err {
    MarketError::TransactionReverted { reason } => {
      assert_eq!(reason, "Exchange: nonce already consumed");
    }
    other => panic!("expected TransactionReverted, got {other:?}"),
  }
  assert_eq!(rig.exchange.action_state().snapshot().phase, ActionPhase::Failed);
}

#[tokio::test]
async fn register_rejects_foreign_offerer() {
  setup_tracing();
  let rig = rig(addr(0xA11CE));
  let params = listing_params(addr(0xB0B), 1, 1_000_000);
  let err = rig.exchange.register_order(&params).await.unwrap_err();
  assert!(matches!(err, MarketError::Internal(_)));
  assert!(rig.wallet.executed_calls().is_empty());
}

#[tokio::test]
async fn cancel_order_signs_and_submits() {
  setup_tracing();
  let offerer = addr(0xA11CE);
  let rig = rig(offerer);
  let order_hash = rig.chain.seed_order(&listing_params(offerer, 5, 1_000_000), 100);

  rig.exchange.cancel_order(order_hash).await.unwrap();

  let executed = rig.wallet.executed_calls();
  assert_eq!(executed.len(), 1);
  assert_eq!(executed[0][0].entrypoint, "cancel_order");
  assert_eq!(rig.exchange.action_state().snapshot().phase, ActionPhase::Succeeded);
}

#[tokio::test]
async fn cancel_refuses_foreign_order() {
  setup_tracing();
  let rig = rig(addr(0xA11CE));
  let order_hash = rig.chain.seed_order(&listing_params(addr(0xB0B), 5, 1_000_000), 100);

  let err = rig.exchange.cancel_order(order_hash).await.unwrap_err();
  assert!(matches!(err, MarketError::Internal(_)));
  assert!(rig.wallet.executed_calls().is_empty());
}

#[tokio::test]
async fn fulfill_orders_is_one_multicall() {
  setup_tracing();
  let buyer = addr(0xB0B);
  let rig = rig(buyer);
  let h1 = rig.chain.seed_order(&listing_params(addr(1), 1, 1_000_000), 100);
  let h2 = rig.chain.seed_order(&listing_params(addr(2), 2, 2_000_000), 101);

  rig.exchange.fulfill_orders(&[h1, h2]).await.unwrap();

  // Two fulfillments, one atomic transaction.
  let executed = rig.wallet.executed_calls();
  assert_eq!(executed.len(), 1);
  assert_eq!(executed[0].len(), 2);
  assert!(executed[0].iter().all(|c| c.entrypoint == "fulfill_order"));
}

#[tokio::test]
async fn fulfill_orders_rejects_empty_batch() {
  setup_tracing();
  let rig = rig(addr(0xB0B));
  let err = rig.exchange.fulfill_orders(&[]).await.unwrap_err();
  assert!(matches!(err, MarketError::Internal(_)));
}
