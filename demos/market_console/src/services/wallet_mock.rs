// demos/market_console/src/services/wallet_mock.rs

//! A console-demo wallet: signs everything it is asked to and applies
//! executed calls straight onto the mock chain. A real integration would
//! forward both to a wallet extension / account contract instead.

use crate::services::chain_mock::MockChain;
use alloy_primitives::{keccak256, B256, U256};
use async_trait::async_trait;
use starboard::typed_data;
use starboard::{Call, MarketResult, Signature, StarkAddress, TypedData, WalletSigner};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::info;

pub struct MockWallet {
  address: StarkAddress,
  chain: Arc<MockChain>,
  tx_counter: AtomicU64,
}

impl MockWallet {
  pub fn new(address: StarkAddress, chain: Arc<MockChain>) -> Self {
    Self {
      address,
      chain,
      tx_counter: AtomicU64::new(0),
    }
  }
}

#[async_trait]
impl WalletSigner for MockWallet {
  fn address(&self) -> StarkAddress {
    self.address
  }

  async fn sign_typed_data(&self, typed: &TypedData) -> MarketResult<Signature> {
    let digest = typed_data::signing_hash(typed)?;
    info!(account = %self.address, %digest, "signature approved");
    Ok(Signature {
      r: U256::from_be_bytes(digest.0),
      s: self.address.to_u256(),
    })
  }

  async fn execute(&self, calls: &[Call]) -> MarketResult<B256> {
    for call in calls {
      self.chain.apply_call(call)?;
    }
    let n = self.tx_counter.fetch_add(1, Ordering::SeqCst);
    let mut preimage = self.address.as_b256().to_vec();
    preimage.extend_from_slice(&n.to_be_bytes());
    let tx_hash = keccak256(&preimage);
    info!(account = %self.address, %tx_hash, calls = calls.len(), "transaction executed");
    Ok(tx_hash)
  }
}
