// core/src/error.rs
use alloy_primitives::B256;
use anyhow::Error as AnyhowError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MarketError {
  #[error("Provider error: {source}")]
  Provider {
    #[source]
    source: AnyhowError,
  },

  #[error("Wallet error: {source}")]
  Wallet {
    #[source]
    source: AnyhowError,
  },

  /// One order's detail read or decode failed. Isolated per item by the
  /// ledger; a refresh never fails wholesale because of this variant.
  #[error("Failed to decode order {order_hash}: {reason}")]
  OrderDecode { order_hash: B256, reason: String },

  /// The locally computed order hash does not match the contract's.
  /// Fatal to the signing attempt; nothing may be submitted past this.
  #[error("Order hash mismatch (local {local}, on-chain {onchain})")]
  HashMismatch { local: B256, onchain: B256 },

  /// The user declined the signature request in their wallet.
  /// Recoverable; the action state machine returns to Idle.
  #[error("Signature request rejected by wallet")]
  SignatureRejected,

  /// The transaction was included and reverted. `reason` carries the
  /// chain's own error message verbatim.
  #[error("Transaction reverted: {reason}")]
  TransactionReverted { reason: String },

  #[error("Order {order_hash} is already in the cart")]
  DuplicateCartItem { order_hash: B256 },

  #[error("Order {order_hash} is listed by the connected wallet itself")]
  SelfOwnedListing { order_hash: B256 },

  /// A ledger refresh is already running; the caller should wait and
  /// read the snapshot instead of starting a second scan.
  #[error("A ledger refresh is already in progress")]
  RefreshInProgress,

  #[error("Cart persistence error: {source}")]
  Persistence {
    #[source]
    source: AnyhowError,
  },

  #[error("Configuration error: {0}")]
  Config(String),

  #[error("Internal starboard error: {0}")]
  Internal(String),
}

// The key conversion starboard provides for external errors: provider and
// wallet implementations can bubble `anyhow::Error` with `?`.
impl From<AnyhowError> for MarketError {
  fn from(err: AnyhowError) -> Self {
    // Avoid MarketError::Provider(MarketError(...)) nesting when anyhow is
    // already wrapping one of ours.
    if let Some(me) = err.downcast_ref::<MarketError>() {
      return MarketError::Internal(me.to_string());
    }
    MarketError::Provider { source: err }
  }
}

pub type MarketResult<T, E = MarketError> = std::result::Result<T, E>;
