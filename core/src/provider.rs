// core/src/provider.rs

//! The seams to the outside world: a read-only chain provider and a
//! signing wallet. The engine only ever talks to these traits; live RPC and
//! wallet-extension implementations live with the embedding application,
//! mock implementations live with the tests and the demo.

use crate::error::MarketResult;
use crate::typed_data::TypedData;
use crate::types::StarkAddress;
use alloy_primitives::{B256, U256};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// An event as the provider emits it: selector and indexed values in
/// `keys`, the remaining payload in `data`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedEvent {
  pub block_number: u64,
  pub keys: Vec<B256>,
  pub data: Vec<U256>,
}

/// One page of events plus the provider's continuation token, `None` when
/// the log is exhausted.
#[derive(Debug, Clone, Default)]
pub struct EventPage {
  pub events: Vec<EmittedEvent>,
  pub continuation: Option<String>,
}

#[derive(Debug, Clone)]
pub struct EventFilter {
  pub contract: StarkAddress,
  pub from_block: u64,
  /// Event selectors to match; an empty list matches everything.
  pub selectors: Vec<B256>,
  pub page_size: u32,
}

/// An item as the contract detail read returns it: enum fields still in
/// their wire (short-string felt) form. The ledger is the only decode site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawItem {
  pub item_type: U256,
  pub token: StarkAddress,
  pub identifier_or_criteria: U256,
  pub start_amount: U256,
  pub end_amount: U256,
  /// Present on consideration items only.
  pub recipient: Option<StarkAddress>,
}

/// The full record `get_order_details(order_hash)` returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDetails {
  pub offerer: StarkAddress,
  pub zone: StarkAddress,
  pub offer: Vec<RawItem>,
  pub consideration: Vec<RawItem>,
  pub order_kind: U256,
  pub order_status: U256,
  pub start_time: u64,
  pub end_time: u64,
  pub zone_hash: B256,
  pub salt: U256,
  pub conduit_key: B256,
  pub nonce: u64,
}

/// Outcome of a confirmed transaction. `revert_reason` carries the chain's
/// message verbatim when `success` is false.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
  pub tx_hash: B256,
  pub success: bool,
  pub revert_reason: Option<String>,
}

/// One contract invocation inside a (multi)call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
  pub to: StarkAddress,
  pub entrypoint: &'static str,
  pub calldata: Vec<U256>,
}

/// Read surface of the chain: contract views, the event log, and
/// transaction confirmation.
#[async_trait]
pub trait ChainProvider: Send + Sync {
  /// Chain id of the connected network. Read per action so a network
  /// switch is picked up by the next typed-data build.
  async fn chain_id(&self) -> MarketResult<u64>;

  /// Current replay-protection counter for the offerer.
  async fn nonce_of(&self, offerer: StarkAddress) -> MarketResult<u64>;

  /// The contract's own hash of the given parameters for the offerer,
  /// folded with the offerer's current on-chain nonce.
  async fn order_hash_of(&self, params: &crate::types::OrderParameters, offerer: StarkAddress) -> MarketResult<B256>;

  async fn get_order_details(&self, order_hash: B256) -> MarketResult<OrderDetails>;

  async fn fetch_events(&self, filter: &EventFilter, continuation: Option<String>) -> MarketResult<EventPage>;

  /// Blocks until the transaction is included, returning its outcome.
  async fn wait_for_transaction(&self, tx_hash: B256) -> MarketResult<ExecutionResult>;
}

/// A typed-data signature as the wallet returns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
  pub r: U256,
  pub s: U256,
}

/// The connected account: it signs typed data and executes invocations.
/// A user declining a request surfaces as `MarketError::SignatureRejected`.
#[async_trait]
pub trait WalletSigner: Send + Sync {
  fn address(&self) -> StarkAddress;

  async fn sign_typed_data(&self, typed: &TypedData) -> MarketResult<Signature>;

  /// Submits the calls as one transaction and returns its hash without
  /// waiting for inclusion.
  async fn execute(&self, calls: &[Call]) -> MarketResult<B256>;
}
