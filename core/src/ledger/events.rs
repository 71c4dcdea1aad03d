// core/src/ledger/events.rs

//! Decoding of the three marketplace event kinds and of contract detail
//! reads. This is the single wire→symbol decode site; the encode direction
//! lives in `exchange::calldata`.

use crate::error::{MarketError, MarketResult};
use crate::provider::{EmittedEvent, OrderDetails, RawItem};
use crate::types::{ConsiderationItem, ItemType, OfferItem, Order, OrderKind, OrderParameters, OrderStatus, StarkAddress};
use alloy_primitives::{keccak256, B256};

pub const ORDER_CREATED: &str = "OrderCreated";
pub const ORDER_FULFILLED: &str = "OrderFulfilled";
pub const ORDER_CANCELLED: &str = "OrderCancelled";

/// Event selector: the hash of the event name, as emitted in `keys[0]`.
pub fn selector(event_name: &str) -> B256 {
  keccak256(event_name.as_bytes())
}

/// The three event kinds the ledger reduces over, in decoded form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarketEvent {
  /// Requires a detail fetch; carries the base record's identity.
  Created {
    order_hash: B256,
    offerer: StarkAddress,
    block_number: u64,
  },
  Fulfilled { order_hash: B256 },
  Cancelled { order_hash: B256 },
}

/// Decodes a raw event by selector. Keys are `[selector, order_hash]` with
/// a third key carrying the offerer on `OrderCreated`. Returns `None` for
/// foreign selectors or malformed key lists; the caller logs and skips.
pub fn decode_event(event: &EmittedEvent) -> Option<MarketEvent> {
  let sel = *event.keys.first()?;
  let order_hash = *event.keys.get(1)?;
  if sel == selector(ORDER_CREATED) {
    let offerer = StarkAddress::from(*event.keys.get(2)?);
    Some(MarketEvent::Created {
      order_hash,
      offerer,
      block_number: event.block_number,
    })
  } else if sel == selector(ORDER_FULFILLED) {
    Some(MarketEvent::Fulfilled { order_hash })
  } else if sel == selector(ORDER_CANCELLED) {
    Some(MarketEvent::Cancelled { order_hash })
  } else {
    None
  }
}

fn decode_offer_item(order_hash: B256, raw: &RawItem) -> MarketResult<OfferItem> {
  let item_type = ItemType::from_wire(raw.item_type).ok_or_else(|| MarketError::OrderDecode {
    order_hash,
    reason: format!("unknown offer item type {:#x}", raw.item_type),
  })?;
  Ok(OfferItem {
    item_type,
    token: raw.token,
    identifier_or_criteria: raw.identifier_or_criteria,
    start_amount: raw.start_amount,
    end_amount: raw.end_amount,
  })
}

fn decode_consideration_item(order_hash: B256, raw: &RawItem) -> MarketResult<ConsiderationItem> {
  let item_type = ItemType::from_wire(raw.item_type).ok_or_else(|| MarketError::OrderDecode {
    order_hash,
    reason: format!("unknown consideration item type {:#x}", raw.item_type),
  })?;
  let recipient = raw.recipient.ok_or_else(|| MarketError::OrderDecode {
    order_hash,
    reason: "consideration item without recipient".to_string(),
  })?;
  Ok(ConsiderationItem {
    item_type,
    token: raw.token,
    identifier_or_criteria: raw.identifier_or_criteria,
    start_amount: raw.start_amount,
    end_amount: raw.end_amount,
    recipient,
  })
}

/// Rebuilds a full [`Order`] from a contract detail read, decoding every
/// wire enum back to its symbol. Any unknown wire value fails this one
/// order only; the refresh continues without it.
pub fn decode_order(order_hash: B256, details: &OrderDetails, block_number: u64) -> MarketResult<Order> {
  if details.offer.is_empty() {
    return Err(MarketError::OrderDecode {
      order_hash,
      reason: "order has no offer item".to_string(),
    });
  }
  let offer = details
    .offer
    .iter()
    .map(|raw| decode_offer_item(order_hash, raw))
    .collect::<MarketResult<Vec<_>>>()?;
  let consideration = details
    .consideration
    .iter()
    .map(|raw| decode_consideration_item(order_hash, raw))
    .collect::<MarketResult<Vec<_>>>()?;
  let order_kind = OrderKind::from_wire(details.order_kind).ok_or_else(|| MarketError::OrderDecode {
    order_hash,
    reason: format!("unknown order kind {:#x}", details.order_kind),
  })?;
  let status = OrderStatus::from_wire(details.order_status).ok_or_else(|| MarketError::OrderDecode {
    order_hash,
    reason: format!("unknown order status {:#x}", details.order_status),
  })?;

  Ok(Order {
    order_hash,
    parameters: OrderParameters {
      offerer: details.offerer,
      zone: details.zone,
      offer,
      consideration,
      order_kind,
      start_time: details.start_time,
      end_time: details.end_time,
      zone_hash: details.zone_hash,
      salt: details.salt,
      conduit_key: details.conduit_key,
    },
    nonce: details.nonce,
    status,
    block_number,
  })
}
