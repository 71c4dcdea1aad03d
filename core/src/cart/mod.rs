// core/src/cart/mod.rs

//! The persisted cart and checkout aggregator.
//!
//! The cart is an explicit store object with an injected persistence
//! adapter, not an ambient singleton: the embedding application decides
//! where the serialized snapshot lives (browser storage, a file, memory).
//! Cart membership is keyed by order hash; duplicates and self-owned
//! listings are rejected at insertion. Persisted data can be stale
//! relative to a newly connected wallet, so every read path re-validates
//! against the currently connected address and silently evicts offenders. The cart carries no protocol authority: losing it
//! costs the user a few clicks, nothing more.

pub mod totals;

use crate::error::{MarketError, MarketResult};
use crate::exchange::ExchangeClient;
use crate::provider::{ChainProvider, WalletSigner};
use crate::shared::Shared;
use crate::types::{Order, StarkAddress};
use alloy_primitives::{B256, U256};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

pub use totals::{cart_totals, CurrencyTotal};

/// Display-side summary of the asset a cart entry refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetSummary {
  pub contract: StarkAddress,
  pub token_id: U256,
  pub name: String,
  pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
  pub listing: Order,
  pub asset: AssetSummary,
  pub collection_name: String,
}

/// The serialized snapshot handed to the persistence adapter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct CartSnapshot {
  items: Vec<CartItem>,
}

/// Durable storage for the cart snapshot. Implementations are plain
/// key-value-ish adapters (a file, browser local storage, memory for
/// tests); the store serializes/deserializes for them.
pub trait CartPersistence: Send + Sync {
  fn load(&self) -> MarketResult<Option<String>>;
  fn save(&self, serialized: &str) -> MarketResult<()>;
}

#[derive(Debug, Default)]
struct CartState {
  connected: StarkAddress,
  items: Vec<CartItem>,
}

pub struct CartStore {
  persistence: Arc<dyn CartPersistence>,
  state: Shared<CartState>,
}

impl CartStore {
  /// Initializes the store from the persisted snapshot, immediately
  /// re-validating it against the connected address. A corrupt snapshot
  /// is discarded with a warning rather than failing construction.
  pub fn new(persistence: Arc<dyn CartPersistence>, connected: StarkAddress) -> Self {
    let items = match persistence.load() {
      Ok(Some(serialized)) => match serde_json::from_str::<CartSnapshot>(&serialized) {
        Ok(snapshot) => snapshot.items,
        Err(err) => {
          warn!(error = %err, "discarding unreadable cart snapshot");
          Vec::new()
        }
      },
      Ok(None) => Vec::new(),
      Err(err) => {
        warn!(error = %err, "cart snapshot load failed; starting empty");
        Vec::new()
      }
    };

    let store = Self {
      persistence,
      state: Shared::new(CartState { connected, items }),
    };
    store.revalidate_and_persist();
    store
  }

  /// Rebinds the connected wallet. Entries that became self-owned under
  /// the new address are evicted on the next read.
  pub fn set_connected(&self, connected: StarkAddress) {
    self.state.write().connected = connected;
    self.revalidate_and_persist();
  }

  /// Adds a listing to the cart.
  ///
  /// Rejects a duplicate order hash and a listing offered by the
  /// connected wallet itself (address comparison is normalization-safe by
  /// construction of [`StarkAddress`]).
  #[instrument(name = "CartStore::add_item", skip_all, fields(order_hash = %item.listing.order_hash), err(Display))]
  pub fn add_item(&self, item: CartItem) -> MarketResult<()> {
    {
      let mut state = self.state.write();
      let order_hash = item.listing.order_hash;
      if state.items.iter().any(|i| i.listing.order_hash == order_hash) {
        return Err(MarketError::DuplicateCartItem { order_hash });
      }
      if item.listing.parameters.offerer == state.connected {
        return Err(MarketError::SelfOwnedListing { order_hash });
      }
      state.items.push(item);
    }
    self.persist();
    Ok(())
  }

  pub fn remove_item(&self, order_hash: B256) {
    self.state.write().items.retain(|i| i.listing.order_hash != order_hash);
    self.persist();
  }

  pub fn clear(&self) {
    self.state.write().items.clear();
    self.persist();
  }

  /// Current items, re-validated first: stale persisted entries that are
  /// self-owned or duplicated are silently evicted (data hygiene, not a
  /// user mistake).
  pub fn items(&self) -> Vec<CartItem> {
    self.revalidate_and_persist();
    self.state.read().items.clone()
  }

  pub fn is_empty(&self) -> bool {
    self.items().is_empty()
  }

  /// Per-currency totals over the (validated) items.
  pub fn totals(&self) -> MarketResult<Vec<CurrencyTotal>> {
    cart_totals(&self.items())
  }

  /// Checks out the whole cart as one atomic fulfillment transaction.
  ///
  /// Now-invalid items are defensively dropped (and evicted from the
  /// store) before submission. On success the cart is cleared; on failure
  /// it is left intact for retry.
  #[instrument(name = "CartStore::checkout", skip_all, err(Display))]
  pub async fn checkout<P, W>(&self, exchange: &ExchangeClient<P, W>) -> MarketResult<B256>
  where
    P: ChainProvider,
    W: WalletSigner,
  {
    let order_hashes: Vec<B256> = self.items().iter().map(|i| i.listing.order_hash).collect();
    if order_hashes.is_empty() {
      return Err(MarketError::Internal("cart is empty".to_string()));
    }

    let tx_hash = exchange.fulfill_orders(&order_hashes).await?;
    debug!(%tx_hash, orders = order_hashes.len(), "checkout confirmed; clearing cart");
    self.clear();
    Ok(tx_hash)
  }

  /// Drops self-owned and duplicate entries; writes through when anything
  /// changed. Returns whether an eviction happened.
  fn revalidate_and_persist(&self) -> bool {
    let changed = {
      let mut state = self.state.write();
      let connected = state.connected;
      let before = state.items.len();
      let mut seen: Vec<B256> = Vec::with_capacity(before);
      state.items.retain(|item| {
        let hash = item.listing.order_hash;
        if item.listing.parameters.offerer == connected {
          warn!(order_hash = %hash, "evicting self-owned cart entry");
          return false;
        }
        if seen.contains(&hash) {
          warn!(order_hash = %hash, "evicting duplicate cart entry");
          return false;
        }
        seen.push(hash);
        true
      });
      state.items.len() != before
    };
    if changed {
      self.persist();
    }
    changed
  }

  fn persist(&self) {
    let snapshot = CartSnapshot {
      items: self.state.read().items.clone(),
    };
    let serialized = match serde_json::to_string(&snapshot) {
      Ok(s) => s,
      Err(err) => {
        warn!(error = %err, "cart snapshot serialization failed");
        return;
      }
    };
    if let Err(err) = self.persistence.save(&serialized) {
      // Persistence is best-effort: the in-memory cart stays correct and
      // is reconstructible by the user anyway.
      warn!(error = %err, "cart snapshot save failed");
    }
  }
}
