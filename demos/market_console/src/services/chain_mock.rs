// demos/market_console/src/services/chain_mock.rs

//! An in-memory marketplace chain for the console demo.
//!
//! Unlike a bare stub, this mock actually *applies* submitted calls:
//! `register_order` inserts details and emits `OrderCreated`,
//! `fulfill_order`/`cancel_order` emit their status events. That closes the
//! loop the real system has: act, confirm, refresh the ledger, observe.

use alloy_primitives::{B256, U256};
use anyhow::anyhow;
use async_trait::async_trait;
use parking_lot::Mutex;
use starboard::ledger::events;
use starboard::typed_data;
use starboard::{
  Call, ChainProvider, ConsiderationItem, EmittedEvent, EventFilter, EventPage, ExecutionResult, ItemType,
  MarketConfig, MarketError, MarketResult, OfferItem, OrderDetails, OrderKind, OrderParameters, OrderStatus,
  RawItem, StarkAddress,
};
use std::collections::HashMap;
use tracing::info;

pub const CHAIN_ID: u64 = 0x534e5f5345504f4c; // demo network id

pub struct MockChain {
  config: MarketConfig,
  nonces: Mutex<HashMap<StarkAddress, u64>>,
  details: Mutex<HashMap<B256, OrderDetails>>,
  event_log: Mutex<Vec<EmittedEvent>>,
  block_height: Mutex<u64>,
}

impl MockChain {
  pub fn new(config: MarketConfig) -> Self {
    Self {
      config,
      nonces: Mutex::new(HashMap::new()),
      details: Mutex::new(HashMap::new()),
      event_log: Mutex::new(Vec::new()),
      block_height: Mutex::new(1),
    }
  }

  fn next_block(&self) -> u64 {
    let mut height = self.block_height.lock();
    *height += 1;
    *height
  }

  fn local_hash(&self, params: &OrderParameters, nonce: u64) -> B256 {
    let typed = typed_data::order_parameters_message(params, nonce, self.config.domain(CHAIN_ID));
    typed_data::message_hash(&typed).expect("builder documents always hash")
  }

  /// Applies one submitted call to chain state, the way the contract's
  /// entrypoints would.
  pub fn apply_call(&self, call: &Call) -> MarketResult<()> {
    match call.entrypoint {
      "register_order" => {
        let (params, nonce) = decode_register_calldata(&call.calldata)?;
        let order_hash = self.local_hash(&params, nonce);
        let block = self.next_block();
        self.details.lock().insert(order_hash, wire_details(&params, nonce));
        self.event_log.lock().push(EmittedEvent {
          block_number: block,
          keys: vec![events::selector(events::ORDER_CREATED), order_hash, params.offerer.as_b256()],
          data: vec![],
        });
        // Registration consumes the offerer's nonce.
        *self.nonces.lock().entry(params.offerer).or_default() += 1;
        info!(%order_hash, block, "register_order applied");
        Ok(())
      }
      "fulfill_order" => {
        let order_hash = B256::new(call.calldata[1].to_be_bytes());
        let block = self.next_block();
        self.event_log.lock().push(EmittedEvent {
          block_number: block,
          keys: vec![events::selector(events::ORDER_FULFILLED), order_hash],
          data: vec![],
        });
        info!(%order_hash, block, "fulfill_order applied");
        Ok(())
      }
      "cancel_order" => {
        let order_hash = B256::new(call.calldata[1].to_be_bytes());
        let block = self.next_block();
        self.event_log.lock().push(EmittedEvent {
          block_number: block,
          keys: vec![events::selector(events::ORDER_CANCELLED), order_hash],
          data: vec![],
        });
        info!(%order_hash, block, "cancel_order applied");
        Ok(())
      }
      other => Err(MarketError::Internal(format!("unknown entrypoint '{}'", other))),
    }
  }
}

#[async_trait]
impl ChainProvider for MockChain {
  async fn chain_id(&self) -> MarketResult<u64> {
    Ok(CHAIN_ID)
  }

  async fn nonce_of(&self, offerer: StarkAddress) -> MarketResult<u64> {
    Ok(*self.nonces.lock().get(&offerer).unwrap_or(&0))
  }

  async fn order_hash_of(&self, params: &OrderParameters, offerer: StarkAddress) -> MarketResult<B256> {
    let nonce = self.nonce_of(offerer).await?;
    Ok(self.local_hash(params, nonce))
  }

  async fn get_order_details(&self, order_hash: B256) -> MarketResult<OrderDetails> {
    self.details.lock().get(&order_hash).cloned().ok_or(MarketError::Provider {
      source: anyhow!("unknown order {order_hash}"),
    })
  }

  async fn fetch_events(&self, filter: &EventFilter, continuation: Option<String>) -> MarketResult<EventPage> {
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

    let offset: usize = continuation.and_then(|c| c.parse().ok()).unwrap_or(0);
    let end = (offset + filter.page_size as usize).min(matching.len());
    let continuation = if end < matching.len() { Some(end.to_string()) } else { None };
    Ok(EventPage {
      events: matching[offset..end].to_vec(),
      continuation,
    })
  }

  async fn wait_for_transaction(&self, tx_hash: B256) -> MarketResult<ExecutionResult> {
    Ok(ExecutionResult {
      tx_hash,
      success: true,
      revert_reason: None,
    })
  }
}

fn wire_details(params: &OrderParameters, nonce: u64) -> OrderDetails {
  OrderDetails {
    offerer: params.offerer,
    zone: params.zone,
    offer: params
      .offer
      .iter()
      .map(|item| RawItem {
        item_type: item.item_type.wire(),
        token: item.token,
        identifier_or_criteria: item.identifier_or_criteria,
        start_amount: item.start_amount,
        end_amount: item.end_amount,
        recipient: None,
      })
      .collect(),
    consideration: params
      .consideration
      .iter()
      .map(|item| RawItem {
        item_type: item.item_type.wire(),
        token: item.token,
        identifier_or_criteria: item.identifier_or_criteria,
        start_amount: item.start_amount,
        end_amount: item.end_amount,
        recipient: Some(item.recipient),
      })
      .collect(),
    order_kind: params.order_kind.wire(),
    order_status: OrderStatus::Active.wire(),
    start_time: params.start_time,
    end_time: params.end_time,
    zone_hash: params.zone_hash,
    salt: params.salt,
    conduit_key: params.conduit_key,
    nonce,
  }
}

/// Inverse of the engine's `register_order` calldata encoding.
fn decode_register_calldata(calldata: &[U256]) -> MarketResult<(OrderParameters, u64)> {
  let mut cursor = calldata.iter();
  let mut next = || {
    cursor
      .next()
      .copied()
      .ok_or_else(|| MarketError::Internal("register_order calldata truncated".to_string()))
  };
  let item_type = |raw: U256| {
    ItemType::from_wire(raw).ok_or_else(|| MarketError::Internal(format!("bad item type in calldata: {raw:#x}")))
  };

  let offerer = StarkAddress::from_u256(next()?);
  let zone = StarkAddress::from_u256(next()?);

  let offer_len = next()?.to::<usize>();
  let mut offer = Vec::with_capacity(offer_len);
  for _ in 0..offer_len {
    offer.push(OfferItem {
      item_type: item_type(next()?)?,
      token: StarkAddress::from_u256(next()?),
      identifier_or_criteria: next()?,
      start_amount: next()?,
      end_amount: next()?,
    });
  }

  let consideration_len = next()?.to::<usize>();
  let mut consideration = Vec::with_capacity(consideration_len);
  for _ in 0..consideration_len {
    consideration.push(ConsiderationItem {
      item_type: item_type(next()?)?,
      token: StarkAddress::from_u256(next()?),
      identifier_or_criteria: next()?,
      start_amount: next()?,
      end_amount: next()?,
      recipient: StarkAddress::from_u256(next()?),
    });
  }

  let order_kind = OrderKind::from_wire(next()?)
    .ok_or_else(|| MarketError::Internal("bad order kind in calldata".to_string()))?;
  let start_time = next()?.to::<u64>();
  let end_time = next()?.to::<u64>();
  let zone_hash = B256::new(next()?.to_be_bytes());
  let salt = next()?;
  let conduit_key = B256::new(next()?.to_be_bytes());
  let _total_consideration = next()?;
  let nonce = next()?.to::<u64>();
  // Signature (r, s) follows; the demo chain trusts it.

  Ok((
    OrderParameters {
      offerer,
      zone,
      offer,
      consideration,
      order_kind,
      start_time,
      end_time,
      zone_hash,
      salt,
      conduit_key,
    },
    nonce,
  ))
}
