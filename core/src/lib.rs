// src/lib.rs

//! Starboard: the client-side order lifecycle engine for a Starknet-style
//! NFT marketplace.
//!
//! Starboard reconstructs and drives Seaport-style exchange orders with no
//! authoritative server behind it:
//!  - Canonical typed-data documents for order registration, fulfillment
//!    and cancellation, hashed bit-exactly to what the verifier contract
//!    recomputes.
//!  - A signing & registration client with an observable per-action state
//!    machine and a hard local-vs-contract hash gate before submission.
//!  - An event-sourced order ledger: the full order set and every status
//!    derived purely from the contract's append-only event log.
//!  - Pure query projections (listings, bids, formatted views) over ledger
//!    snapshots.
//!  - A persisted cart with defensive self-ownership filtering and atomic
//!    multi-order checkout.
//!
//! The chain and the wallet are reached only through the `ChainProvider`
//! and `WalletSigner` traits; wire an RPC/wallet implementation at the
//! boundary and the engine is agnostic to it.

pub mod cart;
pub mod config;
pub mod error;
pub mod exchange;
pub mod ledger;
pub mod provider;
pub mod query;
pub mod shared;
pub mod typed_data;
pub mod types;

// --- Re-exports for the Public API ---

// Core domain types users interact with constantly
pub use crate::types::{
  ConsiderationItem, ItemType, OfferItem, Order, OrderKind, OrderParameters, OrderStatus, StarkAddress,
};

pub use crate::config::MarketConfig;
pub use crate::error::{MarketError, MarketResult};
pub use crate::shared::Shared;

// The seams an embedding application implements
pub use crate::provider::{
  Call, ChainProvider, EmittedEvent, EventFilter, EventPage, ExecutionResult, OrderDetails, RawItem, Signature,
  WalletSigner,
};

// The engine surfaces
pub use crate::cart::{AssetSummary, CartItem, CartPersistence, CartStore, CurrencyTotal};
pub use crate::exchange::{ActionPhase, ActionState, ExchangeClient};
pub use crate::ledger::{LedgerSnapshot, OrderLedger};
pub use crate::typed_data::{Domain, TypedData, TypedValue};
