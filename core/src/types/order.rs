// core/src/types/order.rs

use crate::types::address::StarkAddress;
use crate::types::item::{encode_short_string, ItemType, OrderKind};
use alloy_primitives::{B256, U256};
use serde::{Deserialize, Serialize};

/// The single item an offerer gives up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferItem {
  pub item_type: ItemType,
  pub token: StarkAddress,
  pub identifier_or_criteria: U256,
  pub start_amount: U256,
  pub end_amount: U256,
}

/// An item demanded in return; same shape as [`OfferItem`] plus the
/// recipient the item must be delivered to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsiderationItem {
  pub item_type: ItemType,
  pub token: StarkAddress,
  pub identifier_or_criteria: U256,
  pub start_amount: U256,
  pub end_amount: U256,
  pub recipient: StarkAddress,
}

/// The signed order payload. Field set mirrors the contract struct; the
/// opaque protocol fields (`zone`, `zone_hash`, `salt`, `conduit_key`) are
/// carried through hashing and submission exactly as given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderParameters {
  pub offerer: StarkAddress,
  pub zone: StarkAddress,
  pub offer: Vec<OfferItem>,
  pub consideration: Vec<ConsiderationItem>,
  pub order_kind: OrderKind,
  pub start_time: u64,
  pub end_time: u64,
  pub zone_hash: B256,
  pub salt: U256,
  pub conduit_key: B256,
}

impl OrderParameters {
  /// `total_original_consideration_items` as hashed and submitted; always
  /// derived, never stored separately.
  pub fn total_original_consideration_items(&self) -> u64 {
    self.consideration.len() as u64
  }

  /// A fixed-price listing: give up one ERC721, ask `price` of `currency`
  /// paid to the offerer.
  pub fn listing(
    offerer: StarkAddress,
    token: StarkAddress,
    token_id: U256,
    currency: StarkAddress,
    price: U256,
    start_time: u64,
    end_time: u64,
  ) -> Self {
    Self {
      offerer,
      zone: StarkAddress::ZERO,
      offer: vec![OfferItem {
        item_type: ItemType::Erc721,
        token,
        identifier_or_criteria: token_id,
        start_amount: U256::from(1u8),
        end_amount: U256::from(1u8),
      }],
      consideration: vec![ConsiderationItem {
        item_type: ItemType::Erc20,
        token: currency,
        identifier_or_criteria: U256::ZERO,
        start_amount: price,
        end_amount: price,
        recipient: offerer,
      }],
      order_kind: OrderKind::FullOpen,
      start_time,
      end_time,
      zone_hash: B256::ZERO,
      salt: U256::ZERO,
      conduit_key: B256::ZERO,
    }
  }

  /// A bid: give up `amount` of `currency`, demand one specific ERC721.
  pub fn bid(
    offerer: StarkAddress,
    currency: StarkAddress,
    amount: U256,
    token: StarkAddress,
    token_id: U256,
    start_time: u64,
    end_time: u64,
  ) -> Self {
    Self {
      offerer,
      zone: StarkAddress::ZERO,
      offer: vec![OfferItem {
        item_type: ItemType::Erc20,
        token: currency,
        identifier_or_criteria: U256::ZERO,
        start_amount: amount,
        end_amount: amount,
      }],
      consideration: vec![ConsiderationItem {
        item_type: ItemType::Erc721,
        token,
        identifier_or_criteria: token_id,
        start_amount: U256::from(1u8),
        end_amount: U256::from(1u8),
        recipient: offerer,
      }],
      order_kind: OrderKind::FullOpen,
      start_time,
      end_time,
      zone_hash: B256::ZERO,
      salt: U256::ZERO,
      conduit_key: B256::ZERO,
    }
  }
}

/// Derived order status. Never authoritative client-side: reduced from the
/// contract's event log, with terminal states winning over `Active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
  Active,
  Fulfilled,
  Cancelled,
}

impl OrderStatus {
  pub const ALL: [OrderStatus; 3] = [OrderStatus::Active, OrderStatus::Fulfilled, OrderStatus::Cancelled];

  pub fn symbol(&self) -> &'static str {
    match self {
      OrderStatus::Active => "ACTIVE",
      OrderStatus::Fulfilled => "FULFILLED",
      OrderStatus::Cancelled => "CANCELLED",
    }
  }

  pub fn wire(&self) -> U256 {
    encode_short_string(self.symbol())
  }

  pub fn from_wire(value: U256) -> Option<Self> {
    Self::ALL.iter().copied().find(|s| s.wire() == value)
  }

  pub fn is_terminal(&self) -> bool {
    !matches!(self, OrderStatus::Active)
  }
}

/// A fully resolved order as the ledger exposes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
  pub order_hash: B256,
  pub parameters: OrderParameters,
  pub nonce: u64,
  pub status: OrderStatus,
  /// Block at which the `OrderCreated` event was observed; most recent
  /// wins when several listings exist for one token.
  pub block_number: u64,
}

impl Order {
  /// The single offered item. Orders with an empty offer are rejected at
  /// decode time, so this is total for ledger-produced orders.
  pub fn offer(&self) -> &OfferItem {
    &self.parameters.offer[0]
  }

  /// A listing gives up the NFT and asks for currency.
  pub fn is_listing(&self) -> bool {
    self.offer().item_type == ItemType::Erc721
  }

  /// A bid gives up currency and demands a specific NFT.
  pub fn is_bid(&self) -> bool {
    self.offer().item_type == ItemType::Erc20
      && self
        .parameters
        .consideration
        .first()
        .map(|c| c.item_type == ItemType::Erc721)
        .unwrap_or(false)
  }

  /// True when this order's NFT side (offer for listings, consideration
  /// for bids) is the given token.
  pub fn concerns_token(&self, token: StarkAddress, token_id: U256) -> bool {
    if self.is_listing() {
      let o = self.offer();
      o.token == token && o.identifier_or_criteria == token_id
    } else if self.is_bid() {
      let c = &self.parameters.consideration[0];
      c.token == token && c.identifier_or_criteria == token_id
    } else {
      false
    }
  }

  /// The currency amount a bid puts up (undefined for listings).
  pub fn bid_amount(&self) -> U256 {
    self.offer().start_amount
  }

  pub fn is_expired(&self, now: u64) -> bool {
    self.parameters.end_time <= now
  }

  pub fn is_open(&self, now: u64) -> bool {
    self.status == OrderStatus::Active && !self.is_expired(now)
  }
}
