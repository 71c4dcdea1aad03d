// tests/common/mod.rs
#![allow(dead_code)] // Allow unused code in this common test module

use alloy_primitives::{keccak256, B256, U256};
use anyhow::anyhow;
use async_trait::async_trait;
use parking_lot::Mutex;
use starboard::ledger::events;
use starboard::typed_data;
use starboard::{
  Call, ChainProvider, EmittedEvent, EventFilter, EventPage, ExecutionResult, MarketConfig, MarketError,
  MarketResult, OrderDetails, OrderParameters, OrderStatus, RawItem, Signature, StarkAddress, TypedData,
  WalletSigner,
};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

pub const CHAIN_ID: u64 = 0x534e5f54; // mock chain id the provider reports
pub const NOW: u64 = 1_700_000_000;
pub const DAY: u64 = 86_400;

pub fn setup_tracing() {
  let _ = tracing_subscriber::fmt()
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .with_test_writer()
    .try_init();
}

pub fn addr(n: u64) -> StarkAddress {
  StarkAddress::from_u256(U256::from(n))
}

pub fn test_config() -> MarketConfig {
  let mut config = MarketConfig::new(addr(0xC0117AC7), 0);
  config.event_page_size = 10;
  config.max_event_pages = 8;
  config
}

/// The NFT collection and currency every test order trades in unless a
/// test says otherwise.
pub fn nft_contract() -> StarkAddress {
  addr(0x721)
}

pub fn currency() -> StarkAddress {
  addr(0x20)
}

pub fn listing_params(offerer: StarkAddress, token_id: u64, price: u64) -> OrderParameters {
  OrderParameters::listing(
    offerer,
    nft_contract(),
    U256::from(token_id),
    currency(),
    U256::from(price),
    NOW - DAY,
    NOW + DAY,
  )
}

pub fn bid_params(offerer: StarkAddress, token_id: u64, amount: u64) -> OrderParameters {
  OrderParameters::bid(
    offerer,
    currency(),
    U256::from(amount),
    nft_contract(),
    U256::from(token_id),
    NOW - DAY,
    NOW + DAY,
  )
}

/// The canonical local hash for the parameters, exactly as the signing
/// client computes it. The mock contract runs the same computation so the
/// verification gate is exercised, not short-circuited.
pub fn local_order_hash(config: &MarketConfig, params: &OrderParameters, nonce: u64) -> B256 {
  let typed = typed_data::order_parameters_message(params, nonce, config.domain(CHAIN_ID));
  typed_data::message_hash(&typed).expect("builder-produced documents always hash")
}

fn raw_offer_item(item: &starboard::OfferItem) -> RawItem {
  RawItem {
    item_type: item.item_type.wire(),
    token: item.token,
    identifier_or_criteria: item.identifier_or_criteria,
    start_amount: item.start_amount,
    end_amount: item.end_amount,
    recipient: None,
  }
}

fn raw_consideration_item(item: &starboard::ConsiderationItem) -> RawItem {
  RawItem {
    item_type: item.item_type.wire(),
    token: item.token,
    identifier_or_criteria: item.identifier_or_criteria,
    start_amount: item.start_amount,
    end_amount: item.end_amount,
    recipient: Some(item.recipient),
  }
}

/// Wire-encodes parameters the way the contract's detail read returns them.
pub fn wire_details(params: &OrderParameters, nonce: u64, status: OrderStatus) -> OrderDetails {
  OrderDetails {
    offerer: params.offerer,
    zone: params.zone,
    offer: params.offer.iter().map(raw_offer_item).collect(),
    consideration: params.consideration.iter().map(raw_consideration_item).collect(),
    order_kind: params.order_kind.wire(),
    order_status: status.wire(),
    start_time: params.start_time,
    end_time: params.end_time,
    zone_hash: params.zone_hash,
    salt: params.salt,
    conduit_key: params.conduit_key,
    nonce,
  }
}

/// In-memory marketplace contract + provider. Event log, detail store and
/// nonce counters behave like the real surfaces, and every failure mode a
/// test needs is scriptable.
pub struct MockChain {
  pub config: MarketConfig,
  nonces: Mutex<HashMap<StarkAddress, u64>>,
  details: Mutex<HashMap<B256, OrderDetails>>,
  event_log: Mutex<Vec<EmittedEvent>>,
  /// Fail every fetch_events call while set.
  pub fail_events: AtomicBool,
  /// Detail reads for these hashes fail (per-item isolation tests).
  pub fail_details: Mutex<HashSet<B256>>,
  /// order_hash_of returns a corrupted hash while set (mismatch gate).
  pub corrupt_hash: AtomicBool,
  /// Next confirmed transaction reverts with this reason.
  pub revert_next: Mutex<Option<String>>,
  /// Artificial latency per fetch_events call (refresh serialization).
  pub event_delay: Mutex<Option<Duration>>,
}

impl MockChain {
  pub fn new(config: MarketConfig) -> Self {
    Self {
      config,
      nonces: Mutex::new(HashMap::new()),
      details: Mutex::new(HashMap::new()),
      event_log: Mutex::new(Vec::new()),
      fail_events: AtomicBool::new(false),
      fail_details: Mutex::new(HashSet::new()),
      corrupt_hash: AtomicBool::new(false),
      revert_next: Mutex::new(None),
      event_delay: Mutex::new(None),
    }
  }

  pub fn set_nonce(&self, offerer: StarkAddress, nonce: u64) {
    self.nonces.lock().insert(offerer, nonce);
  }

  pub fn current_nonce(&self, offerer: StarkAddress) -> u64 {
    *self.nonces.lock().get(&offerer).unwrap_or(&0)
  }

  pub fn put_details(&self, order_hash: B256, details: OrderDetails) {
    self.details.lock().insert(order_hash, details);
  }

  pub fn push_created(&self, order_hash: B256, offerer: StarkAddress, block_number: u64) {
    self.event_log.lock().push(EmittedEvent {
      block_number,
      keys: vec![events::selector(events::ORDER_CREATED), order_hash, offerer.as_b256()],
      data: vec![],
    });
  }

  pub fn push_fulfilled(&self, order_hash: B256, block_number: u64) {
    self.event_log.lock().push(EmittedEvent {
      block_number,
      keys: vec![events::selector(events::ORDER_FULFILLED), order_hash],
      data: vec![],
    });
  }

  pub fn push_cancelled(&self, order_hash: B256, block_number: u64) {
    self.event_log.lock().push(EmittedEvent {
      block_number,
      keys: vec![events::selector(events::ORDER_CANCELLED), order_hash],
      data: vec![],
    });
  }

  /// Convenience: hash + details + Created event for an active order at
  /// the offerer's current nonce.
  pub fn seed_order(&self, params: &OrderParameters, block_number: u64) -> B256 {
    let nonce = self.current_nonce(params.offerer);
    let order_hash = local_order_hash(&self.config, params, nonce);
    self.put_details(order_hash, wire_details(params, nonce, OrderStatus::Active));
    self.push_created(order_hash, params.offerer, block_number);
    order_hash
  }
}

#[async_trait]
impl ChainProvider for MockChain {
  async fn chain_id(&self) -> MarketResult<u64> {
    Ok(CHAIN_ID)
  }

  async fn nonce_of(&self, offerer: StarkAddress) -> MarketResult<u64> {
    Ok(self.current_nonce(offerer))
  }

  async fn order_hash_of(&self, params: &OrderParameters, offerer: StarkAddress) -> MarketResult<B256> {
    let nonce = self.current_nonce(offerer);
    let mut hash = local_order_hash(&self.config, params, nonce);
    if self.corrupt_hash.load(Ordering::SeqCst) {
      hash.0[31] ^= 0xFF;
    }
    Ok(hash)
  }

  async fn get_order_details(&self, order_hash: B256) -> MarketResult<OrderDetails> {
    if self.fail_details.lock().contains(&order_hash) {
      return Err(MarketError::Provider {
        source: anyhow!("detail read timed out for {order_hash}"),
      });
    }
    self.details.lock().get(&order_hash).cloned().ok_or(MarketError::Provider {
      source: anyhow!("unknown order {order_hash}"),
    })
  }

  async fn fetch_events(&self, filter: &EventFilter, continuation: Option<String>) -> MarketResult<EventPage> {
    // Copy the delay out so no lock guard lives across the await.
    let delay = *self.event_delay.lock();
    if let Some(delay) = delay {
      tokio::time::sleep(delay).await;
    }
    if self.fail_events.load(Ordering::SeqCst) {
      return Err(MarketError::Provider {
        source: anyhow!("event endpoint unreachable"),
      });
    }

    let matching: Vec<EmittedEvent> = self
      .event_log
      .lock()
      .iter()
      .filter(|ev| ev.block_number >= filter.from_block)
      .filter(|ev| {
        filter.selectors.is_empty() || ev.keys.first().map(|k| filter.selectors.contains(k)).unwrap_or(false)
      })
      .cloned()
      .collect();

    let offset: usize = continuation.map(|c| c.parse().expect("mock continuation token")).unwrap_or(0);
    let page_size = filter.page_size as usize;
    let end = (offset + page_size).min(matching.len());
    let events = matching[offset..end].to_vec();
    let continuation = if end < matching.len() { Some(end.to_string()) } else { None };
    Ok(EventPage { events, continuation })
  }

  async fn wait_for_transaction(&self, tx_hash: B256) -> MarketResult<ExecutionResult> {
    match self.revert_next.lock().take() {
      Some(reason) => Ok(ExecutionResult {
        tx_hash,
        success: false,
        revert_reason: Some(reason),
      }),
      None => Ok(ExecutionResult {
        tx_hash,
        success: true,
        revert_reason: None,
      }),
    }
  }
}

/// Scriptable wallet: deterministic signatures, optional one-shot
/// rejection, and a log of every executed multicall.
pub struct MockWallet {
  address: StarkAddress,
  pub reject_next: AtomicBool,
  pub executed: Mutex<Vec<Vec<Call>>>,
  tx_counter: AtomicU64,
}

impl MockWallet {
  pub fn new(address: StarkAddress) -> Self {
    Self {
      address,
      reject_next: AtomicBool::new(false),
      executed: Mutex::new(Vec::new()),
      tx_counter: AtomicU64::new(0),
    }
  }

  pub fn executed_calls(&self) -> Vec<Vec<Call>> {
    self.executed.lock().clone()
  }
}

#[async_trait]
impl WalletSigner for MockWallet {
  fn address(&self) -> StarkAddress {
    self.address
  }

  async fn sign_typed_data(&self, typed: &TypedData) -> MarketResult<Signature> {
    if self.reject_next.swap(false, Ordering::SeqCst) {
      return Err(MarketError::SignatureRejected);
    }
    let digest = typed_data::signing_hash(typed)?;
    Ok(Signature {
      r: U256::from_be_bytes(digest.0),
      s: U256::from(1u8),
    })
  }

  async fn execute(&self, calls: &[Call]) -> MarketResult<B256> {
    self.executed.lock().push(calls.to_vec());
    let n = self.tx_counter.fetch_add(1, Ordering::SeqCst);
    Ok(keccak256(n.to_be_bytes()))
  }
}

/// In-memory persistence adapter standing in for browser storage.
#[derive(Default)]
pub struct MockPersistence {
  pub stored: Mutex<Option<String>>,
  pub fail_save: AtomicBool,
}

impl starboard::CartPersistence for MockPersistence {
  fn load(&self) -> MarketResult<Option<String>> {
    Ok(self.stored.lock().clone())
  }

  fn save(&self, serialized: &str) -> MarketResult<()> {
    if self.fail_save.load(Ordering::SeqCst) {
      return Err(MarketError::Persistence {
        source: anyhow!("storage quota exceeded"),
      });
    }
    *self.stored.lock() = Some(serialized.to_string());
    Ok(())
  }
}
