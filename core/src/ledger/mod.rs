// core/src/ledger/mod.rs

//! The event-sourced order ledger.
//!
//! There is no off-chain indexer of record: the complete order set and
//! every status are reconstructed from the contract's append-only event
//! log. A refresh pages the log from the deployment block, resolves full
//! order details per created hash with concurrent contract reads, and
//! reduces into a snapshot. Created details always form the base record;
//! fulfilled/cancelled membership then overwrites status terminally,
//! whatever order the raw log delivered the events in.
//!
//! A refresh recomputes from scratch; it never mutates incrementally, so
//! no locks are needed beyond serializing refreshes themselves. On error
//! the previous good snapshot stays visible with `last_error` set.

pub mod events;

use crate::config::MarketConfig;
use crate::error::{MarketError, MarketResult};
use crate::provider::{ChainProvider, EventFilter};
use crate::shared::Shared;
use crate::types::{Order, OrderStatus};
use alloy_primitives::B256;
use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{event, instrument, warn, Level};

use self::events::MarketEvent;

/// One ledger refresh's result, plus degradation flags a UI can render
/// next to the data instead of discarding it.
#[derive(Debug, Clone, Default)]
pub struct LedgerSnapshot {
  /// Every order ever observed, terminal or not. Volume and history
  /// derivations read this.
  pub all_orders: Vec<Order>,
  /// True when the page cap cut the event scan short: the snapshot is
  /// usable but incomplete.
  pub truncated: bool,
  /// Error string from the most recent failed refresh, if any. The orders
  /// above are then from the last successful one.
  pub last_error: Option<String>,
  pub fetched_at: Option<DateTime<Utc>>,
}

impl LedgerSnapshot {
  /// Orders currently open for fulfillment: status Active and not yet
  /// expired. The time filter lives only here, not in status reduction.
  pub fn listings(&self, now: u64) -> Vec<&Order> {
    self.all_orders.iter().filter(|o| o.is_open(now)).collect()
  }

  pub fn find(&self, order_hash: B256) -> Option<&Order> {
    self.all_orders.iter().find(|o| o.order_hash == order_hash)
  }
}

pub struct OrderLedger<P> {
  provider: Arc<P>,
  config: Arc<MarketConfig>,
  snapshot: Shared<LedgerSnapshot>,
  // Serializes refreshes: one in flight, never two concurrent RPC storms.
  refresh_gate: tokio::sync::Mutex<()>,
}

impl<P: ChainProvider> OrderLedger<P> {
  pub fn new(provider: Arc<P>, config: Arc<MarketConfig>) -> Self {
    Self {
      provider,
      config,
      snapshot: Shared::default(),
      refresh_gate: tokio::sync::Mutex::new(()),
    }
  }

  /// Clones the current snapshot out. Cheap enough for render paths; the
  /// query layer takes the clone (or the shared handle) by reference.
  pub fn snapshot(&self) -> LedgerSnapshot {
    self.snapshot.snapshot()
  }

  /// Shared handle for boundary code that re-derives views on change.
  pub fn shared(&self) -> Shared<LedgerSnapshot> {
    self.snapshot.clone()
  }

  /// Re-runs the whole scan from the deployment block. Full rebuild, not
  /// incremental. Returns `RefreshInProgress` if another refresh holds
  /// the gate; provider failures leave the previous snapshot in place
  /// with `last_error` set.
  #[instrument(name = "OrderLedger::refresh", skip_all, err(Display))]
  pub async fn refresh(&self) -> MarketResult<()> {
    let _gate = self.refresh_gate.try_lock().map_err(|_| MarketError::RefreshInProgress)?;

    match self.scan().await {
      Ok((all_orders, truncated)) => {
        event!(Level::DEBUG, orders = all_orders.len(), truncated, "ledger refresh complete");
        let mut snap = self.snapshot.write();
        snap.all_orders = all_orders;
        snap.truncated = truncated;
        snap.last_error = None;
        snap.fetched_at = Some(Utc::now());
        Ok(())
      }
      Err(err) => {
        // No destructive clear-on-error: keep the last good orders and
        // surface the failure next to them.
        self.snapshot.write().last_error = Some(err.to_string());
        Err(err)
      }
    }
  }

  /// Manual retry entry point; same full re-scan as [`Self::refresh`].
  pub async fn refetch(&self) -> MarketResult<()> {
    self.refresh().await
  }

  async fn scan(&self) -> MarketResult<(Vec<Order>, bool)> {
    let (decoded, truncated) = self.fetch_event_log().await?;

    // Partition by kind. Created events may replay or reorder; keep one
    // entry per hash at the highest observed block.
    let mut created: HashMap<B256, (crate::types::StarkAddress, u64)> = HashMap::new();
    let mut fulfilled: HashSet<B256> = HashSet::new();
    let mut cancelled: HashSet<B256> = HashSet::new();
    for ev in decoded {
      match ev {
        MarketEvent::Created {
          order_hash,
          offerer,
          block_number,
        } => {
          let entry = created.entry(order_hash).or_insert((offerer, block_number));
          if block_number > entry.1 {
            *entry = (offerer, block_number);
          }
        }
        MarketEvent::Fulfilled { order_hash } => {
          fulfilled.insert(order_hash);
        }
        MarketEvent::Cancelled { order_hash } => {
          cancelled.insert(order_hash);
        }
      }
    }

    // One detail read per created hash, issued concurrently and joined.
    let reads = created.iter().map(|(order_hash, (_, block_number))| {
      let provider = Arc::clone(&self.provider);
      let order_hash = *order_hash;
      let block_number = *block_number;
      async move { (order_hash, block_number, provider.get_order_details(order_hash).await) }
    });
    let results = join_all(reads).await;

    let mut all_orders = Vec::with_capacity(results.len());
    for (order_hash, block_number, result) in results {
      // Partial data over total failure: one bad read or decode skips
      // that order only.
      let details = match result {
        Ok(details) => details,
        Err(err) => {
          warn!(%order_hash, error = %err, "order detail read failed; skipping");
          continue;
        }
      };
      let mut order = match events::decode_order(order_hash, &details, block_number) {
        Ok(order) => order,
        Err(err) => {
          warn!(%order_hash, error = %err, "order decode failed; skipping");
          continue;
        }
      };

      // Event-driven status wins over whatever the detail read embedded;
      // terminal states are never downgraded back to Active.
      if cancelled.contains(&order_hash) {
        order.status = OrderStatus::Cancelled;
      } else if fulfilled.contains(&order_hash) {
        order.status = OrderStatus::Fulfilled;
      }
      all_orders.push(order);
    }

    // Deterministic snapshot order: oldest block first, hash as tiebreak.
    all_orders.sort_by(|a, b| (a.block_number, a.order_hash).cmp(&(b.block_number, b.order_hash)));

    Ok((all_orders, truncated))
  }

  async fn fetch_event_log(&self) -> MarketResult<(Vec<MarketEvent>, bool)> {
    let filter = EventFilter {
      contract: self.config.contract,
      from_block: self.config.deployment_block,
      selectors: vec![
        events::selector(events::ORDER_CREATED),
        events::selector(events::ORDER_FULFILLED),
        events::selector(events::ORDER_CANCELLED),
      ],
      page_size: self.config.event_page_size,
    };

    let mut decoded = Vec::new();
    let mut continuation: Option<String> = None;
    let mut truncated = false;
    let mut pages = 0u32;

    loop {
      if pages >= self.config.max_event_pages {
        // Degraded, not fatal: return what we have and say so.
        warn!(pages, "event page cap reached; snapshot will be truncated");
        truncated = true;
        break;
      }
      let page = self.provider.fetch_events(&filter, continuation.take()).await?;
      pages += 1;

      for raw in &page.events {
        match events::decode_event(raw) {
          Some(ev) => decoded.push(ev),
          None => warn!(block = raw.block_number, "unrecognized event shape; skipping"),
        }
      }

      match page.continuation {
        Some(token) => continuation = Some(token),
        None => break,
      }
    }

    event!(Level::DEBUG, events = decoded.len(), pages, truncated, "event log scan finished");
    Ok((decoded, truncated))
  }
}
