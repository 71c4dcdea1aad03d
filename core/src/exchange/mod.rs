// core/src/exchange/mod.rs

//! The signing & registration client.
//!
//! Every user-initiated action (register a listing or bid, cancel, fulfill)
//! runs the same state machine:
//!
//! `Idle → FetchingNonce → BuildingTypedData → AwaitingSignature →
//! VerifyingHash → Submitting → Confirming → Succeeded | Failed`
//!
//! The nonce is re-read immediately before each signing attempt, never
//! cached across actions. Registration additionally cross-checks the
//! locally computed message hash against the contract's `get_order_hash`
//! before anything is submitted; a mismatch aborts the action. No shared
//! state is written before Submitting, so aborting earlier is always safe;
//! once a transaction is broadcast, an interrupted wait reports the action
//! as still Confirming rather than failed.
//!
//! This component has no event-log knowledge: on success it returns the
//! transaction hash and the caller decides when to refresh the ledger.

pub mod calldata;

use crate::config::MarketConfig;
use crate::error::{MarketError, MarketResult};
use crate::provider::{Call, ChainProvider, Signature, WalletSigner};
use crate::shared::Shared;
use crate::typed_data::{self, TypedData};
use crate::types::OrderParameters;
use alloy_primitives::B256;
use std::sync::Arc;
use tracing::{debug, event, instrument, Level};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActionPhase {
  #[default]
  Idle,
  FetchingNonce,
  BuildingTypedData,
  AwaitingSignature,
  VerifyingHash,
  Submitting,
  Confirming,
  Succeeded,
  Failed,
}

/// Observable progress of the current action. UIs read this through
/// [`ExchangeClient::action_state`]; the `error` string is render-ready.
#[derive(Debug, Clone, Default)]
pub struct ActionState {
  pub phase: ActionPhase,
  pub error: Option<String>,
  pub tx_hash: Option<B256>,
}

pub struct ExchangeClient<P, W> {
  provider: Arc<P>,
  wallet: Arc<W>,
  config: Arc<MarketConfig>,
  action: Shared<ActionState>,
}

impl<P, W> ExchangeClient<P, W>
where
  P: ChainProvider,
  W: WalletSigner,
{
  pub fn new(provider: Arc<P>, wallet: Arc<W>, config: Arc<MarketConfig>) -> Self {
    Self {
      provider,
      wallet,
      config,
      action: Shared::default(),
    }
  }

  /// Handle for observing action progress. Guards must not be held across
  /// `.await` points.
  pub fn action_state(&self) -> Shared<ActionState> {
    self.action.clone()
  }

  fn enter(&self, phase: ActionPhase) {
    event!(Level::DEBUG, ?phase, "action phase transition");
    let mut state = self.action.write();
    state.phase = phase;
  }

  /// Records a failure and passes the error through. Wallet rejection is
  /// the recoverable case: the machine returns to Idle with no error
  /// banner, everything else parks in Failed with a render-ready message.
  fn fail(&self, err: MarketError) -> MarketError {
    let mut state = self.action.write();
    match &err {
      MarketError::SignatureRejected => {
        state.phase = ActionPhase::Idle;
        state.error = None;
      }
      other => {
        state.phase = ActionPhase::Failed;
        state.error = Some(other.to_string());
      }
    }
    err
  }

  fn reset(&self) {
    let mut state = self.action.write();
    *state = ActionState::default();
  }

  async fn fresh_nonce(&self) -> MarketResult<u64> {
    self.enter(ActionPhase::FetchingNonce);
    self.provider.nonce_of(self.wallet.address()).await
  }

  async fn sign(&self, typed: &TypedData) -> MarketResult<Signature> {
    self.enter(ActionPhase::AwaitingSignature);
    self.wallet.sign_typed_data(typed).await
  }

  async fn submit_and_confirm(&self, calls: Vec<Call>) -> MarketResult<B256> {
    self.enter(ActionPhase::Submitting);
    let tx_hash = self.wallet.execute(&calls).await.map_err(|e| self.fail(e))?;
    self.action.write().tx_hash = Some(tx_hash);

    self.enter(ActionPhase::Confirming);
    // A provider error here is NOT a failure: the transaction is already
    // broadcast and cannot be recalled. The state stays Confirming and the
    // caller sees the outcome as unknown/pending.
    let result = self.provider.wait_for_transaction(tx_hash).await?;
    if !result.success {
      let reason = result.revert_reason.unwrap_or_else(|| "transaction rejected".to_string());
      return Err(self.fail(MarketError::TransactionReverted { reason }));
    }

    self.enter(ActionPhase::Succeeded);
    Ok(tx_hash)
  }

  /// Signs and registers a new order (listing or bid).
  ///
  /// Returns the registration transaction hash. The caller owns triggering
  /// a ledger refresh once this returns.
  #[instrument(name = "ExchangeClient::register_order", skip_all, fields(offerer = %params.offerer), err(Display))]
  pub async fn register_order(&self, params: &OrderParameters) -> MarketResult<B256> {
    self.reset();
    if params.offerer != self.wallet.address() {
      return Err(self.fail(MarketError::Internal(format!(
        "order offerer {} is not the connected account {}",
        params.offerer,
        self.wallet.address()
      ))));
    }

    let nonce = self.fresh_nonce().await.map_err(|e| self.fail(e))?;

    self.enter(ActionPhase::BuildingTypedData);
    let chain_id = self.provider.chain_id().await.map_err(|e| self.fail(e))?;
    let typed = typed_data::order_parameters_message(params, nonce, self.config.domain(chain_id));

    let signature = self.sign(&typed).await.map_err(|e| self.fail(e))?;

    // The correctness gate: never submit a signature the contract cannot
    // verify. Local and on-chain hashing must agree bit for bit.
    self.enter(ActionPhase::VerifyingHash);
    let local = typed_data::message_hash(&typed).map_err(|e| self.fail(e))?;
    let onchain = self
      .provider
      .order_hash_of(params, params.offerer)
      .await
      .map_err(|e| self.fail(e))?;
    if local != onchain {
      return Err(self.fail(MarketError::HashMismatch { local, onchain }));
    }
    debug!(order_hash = %local, "local hash matches contract hash");

    let call = Call {
      to: self.config.contract,
      entrypoint: "register_order",
      calldata: calldata::register_order(params, nonce, signature),
    };
    self.submit_and_confirm(vec![call]).await
  }

  /// Signs and submits a cancellation for one of the connected account's
  /// own orders.
  #[instrument(name = "ExchangeClient::cancel_order", skip_all, fields(%order_hash), err(Display))]
  pub async fn cancel_order(&self, order_hash: B256) -> MarketResult<B256> {
    self.reset();
    let offerer = self.wallet.address();

    let nonce = self.fresh_nonce().await.map_err(|e| self.fail(e))?;

    self.enter(ActionPhase::BuildingTypedData);
    let chain_id = self.provider.chain_id().await.map_err(|e| self.fail(e))?;
    let typed = typed_data::cancellation_message(offerer, order_hash, nonce, self.config.domain(chain_id));

    let signature = self.sign(&typed).await.map_err(|e| self.fail(e))?;

    // Pre-submission gate for cancellations: the hash must name an order
    // the contract knows, owned by the connected account.
    self.enter(ActionPhase::VerifyingHash);
    let details = self.provider.get_order_details(order_hash).await.map_err(|e| self.fail(e))?;
    if details.offerer != offerer {
      return Err(self.fail(MarketError::Internal(format!(
        "order {} belongs to {}, not the connected account",
        order_hash, details.offerer
      ))));
    }

    let call = Call {
      to: self.config.contract,
      entrypoint: "cancel_order",
      calldata: calldata::cancel_order(offerer.to_u256(), order_hash, nonce, signature),
    };
    self.submit_and_confirm(vec![call]).await
  }

  /// Fulfills one or more orders atomically in a single transaction.
  ///
  /// This is the buy path: one signed fulfillment message per order hash,
  /// aggregated into one multicall, so a cart either checks out entirely
  /// or not at all.
  #[instrument(name = "ExchangeClient::fulfill_orders", skip_all, fields(count = order_hashes.len()), err(Display))]
  pub async fn fulfill_orders(&self, order_hashes: &[B256]) -> MarketResult<B256> {
    self.reset();
    if order_hashes.is_empty() {
      return Err(self.fail(MarketError::Internal("nothing to fulfill".to_string())));
    }
    let fulfiller = self.wallet.address();

    let nonce = self.fresh_nonce().await.map_err(|e| self.fail(e))?;

    self.enter(ActionPhase::BuildingTypedData);
    let chain_id = self.provider.chain_id().await.map_err(|e| self.fail(e))?;
    let domain = self.config.domain(chain_id);

    let mut calls = Vec::with_capacity(order_hashes.len());
    for order_hash in order_hashes {
      let typed = typed_data::fulfillment_message(fulfiller, *order_hash, nonce, domain.clone());
      let signature = self.sign(&typed).await.map_err(|e| self.fail(e))?;
      calls.push(Call {
        to: self.config.contract,
        entrypoint: "fulfill_order",
        calldata: calldata::fulfill_order(fulfiller.to_u256(), *order_hash, nonce, signature),
      });
    }

    self.submit_and_confirm(calls).await
  }
}
