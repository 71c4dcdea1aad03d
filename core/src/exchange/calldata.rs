// core/src/exchange/calldata.rs

//! Calldata encoding for the contract's write entrypoints.
//!
//! This is the only place symbols become wire values (via the codec table
//! in `types::item`); the ledger's detail decode is the only place the
//! reverse happens.

use crate::provider::Signature;
use crate::types::{ConsiderationItem, OfferItem, OrderParameters};
use alloy_primitives::{B256, U256};

fn word(h: B256) -> U256 {
  U256::from_be_bytes(h.0)
}

fn push_offer_item(out: &mut Vec<U256>, item: &OfferItem) {
  out.push(item.item_type.wire());
  out.push(item.token.to_u256());
  out.push(item.identifier_or_criteria);
  out.push(item.start_amount);
  out.push(item.end_amount);
}

fn push_consideration_item(out: &mut Vec<U256>, item: &ConsiderationItem) {
  out.push(item.item_type.wire());
  out.push(item.token.to_u256());
  out.push(item.identifier_or_criteria);
  out.push(item.start_amount);
  out.push(item.end_amount);
  out.push(item.recipient.to_u256());
}

/// `register_order({parameters, signature})`.
pub fn register_order(params: &OrderParameters, nonce: u64, signature: Signature) -> Vec<U256> {
  let mut out = Vec::with_capacity(16 + params.offer.len() * 5 + params.consideration.len() * 6);
  out.push(params.offerer.to_u256());
  out.push(params.zone.to_u256());
  out.push(U256::from(params.offer.len()));
  for item in &params.offer {
    push_offer_item(&mut out, item);
  }
  out.push(U256::from(params.consideration.len()));
  for item in &params.consideration {
    push_consideration_item(&mut out, item);
  }
  out.push(params.order_kind.wire());
  out.push(U256::from(params.start_time));
  out.push(U256::from(params.end_time));
  out.push(word(params.zone_hash));
  out.push(params.salt);
  out.push(word(params.conduit_key));
  out.push(U256::from(params.total_original_consideration_items()));
  out.push(U256::from(nonce));
  out.push(signature.r);
  out.push(signature.s);
  out
}

/// `cancel_order({cancelation, signature})`.
pub fn cancel_order(offerer: U256, order_hash: B256, nonce: u64, signature: Signature) -> Vec<U256> {
  vec![offerer, word(order_hash), U256::from(nonce), signature.r, signature.s]
}

/// `fulfill_order({fulfillment, signature})`, one call per order.
pub fn fulfill_order(fulfiller: U256, order_hash: B256, nonce: u64, signature: Signature) -> Vec<U256> {
  vec![fulfiller, word(order_hash), U256::from(nonce), signature.r, signature.s]
}
