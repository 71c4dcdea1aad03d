// demos/market_console/src/main.rs

//! Console walkthrough of the starboard order engine against an in-memory
//! chain: list, bid, reconstruct the ledger from events, fill a cart, check
//! out atomically, cancel, and watch the event-sourced statuses follow.
//!
//! The reactive wiring the engine leaves to its embedder lives here: after
//! every confirmed action *this* code decides to refresh the ledger and
//! re-derive the views it prints.

mod services;

use alloy_primitives::U256;
use anyhow::Result;
use services::chain_mock::MockChain;
use services::file_cart::FileCartPersistence;
use services::wallet_mock::MockWallet;
use starboard::{
  query, AssetSummary, CartItem, CartStore, ExchangeClient, MarketConfig, OrderLedger, OrderParameters,
  StarkAddress,
};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;

const USDC_DECIMALS: u32 = 6;

fn now() -> u64 {
  SystemTime::now().duration_since(UNIX_EPOCH).expect("clock before epoch").as_secs()
}

fn print_market(ledger: &OrderLedger<MockChain>, heading: &str) {
  let snapshot = ledger.snapshot();
  let stats = query::market_stats(&snapshot);
  println!("\n== {heading} ==");
  println!(
    "orders: {} total / {} active / {} fulfilled / {} cancelled{}",
    stats.total_orders,
    stats.active,
    stats.fulfilled,
    stats.cancelled,
    if snapshot.truncated { " (TRUNCATED SCAN)" } else { "" }
  );
  for (token, volume) in &stats.volume {
    println!("volume[{token}]: {}", query::format_amount(*volume, USDC_DECIMALS));
  }
  for order in snapshot.listings(now()) {
    let kind = if order.is_listing() { "listing" } else { "bid" };
    println!(
      "  {kind} {} by {} | {} | {}",
      order.order_hash,
      order.parameters.offerer,
      query::format_amount(display_price(order), USDC_DECIMALS),
      query::time_remaining(order.parameters.end_time, now()),
    );
  }
}

/// Asking price for listings, offered amount for bids.
fn display_price(order: &starboard::Order) -> U256 {
  if order.is_listing() {
    order.parameters.consideration[0].start_amount
  } else {
    order.bid_amount()
  }
}

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
    )
    .init();

  let config = Arc::new(
    MarketConfig::from_env().unwrap_or_else(|_| MarketConfig::new("0xC0117AC7".parse().expect("static address"), 0)),
  );
  let chain = Arc::new(MockChain::new((*config).clone()));

  let nft: StarkAddress = "0x721".parse().expect("static address");
  let usdc: StarkAddress = "0x20".parse().expect("static address");
  let seller: StarkAddress = "0x5E11E4".parse().expect("static address");
  let buyer: StarkAddress = "0xB0B".parse().expect("static address");

  let seller_wallet = Arc::new(MockWallet::new(seller, Arc::clone(&chain)));
  let buyer_wallet = Arc::new(MockWallet::new(buyer, Arc::clone(&chain)));
  let seller_exchange = ExchangeClient::new(Arc::clone(&chain), seller_wallet, Arc::clone(&config));
  let buyer_exchange = ExchangeClient::new(Arc::clone(&chain), buyer_wallet, Arc::clone(&config));

  let ledger = OrderLedger::new(Arc::clone(&chain), Arc::clone(&config));

  // --- The seller lists two tokens ---
  let window = (now() - 60, now() + 7 * 86_400);
  for (token_id, price) in [(1u64, 25_000_000u64), (2, 40_000_000)] {
    let params = OrderParameters::listing(
      seller,
      nft,
      U256::from(token_id),
      usdc,
      U256::from(price),
      window.0,
      window.1,
    );
    let tx = seller_exchange.register_order(&params).await?;
    info!(%tx, token_id, "listing registered");
  }
  ledger.refresh().await?;
  print_market(&ledger, "after listings");

  // --- The buyer bids on token 1 ---
  let bid = OrderParameters::bid(buyer, usdc, U256::from(20_000_000u64), nft, U256::from(1u64), window.0, window.1);
  buyer_exchange.register_order(&bid).await?;
  ledger.refresh().await?;
  print_market(&ledger, "after bid");

  let snapshot = ledger.snapshot();
  let bids = query::offers_for_token(&snapshot, nft, U256::from(1u64), now());
  println!("\nbest bid on token 1: {}", query::format_amount(bids[0].bid_amount(), USDC_DECIMALS));

  // --- The buyer carts both listings and checks out atomically ---
  let cart_path = std::env::temp_dir().join("market_console_cart.json");
  let cart = CartStore::new(Arc::new(FileCartPersistence::new(cart_path)), buyer);
  for token_id in [1u64, 2] {
    let listing = query::find_listing_for_token(&snapshot, nft, U256::from(token_id), now())
      .expect("seeded listing present")
      .clone();
    cart.add_item(CartItem {
      asset: AssetSummary {
        contract: nft,
        token_id: U256::from(token_id),
        name: format!("Demo Token #{token_id}"),
        image_url: None,
      },
      listing,
      collection_name: "Demo Collection".to_string(),
    })?;
  }
  for total in cart.totals()? {
    println!("cart total [{}]: {}", total.token, total.formatted(USDC_DECIMALS));
  }
  let tx = cart.checkout(&buyer_exchange).await?;
  info!(%tx, "checkout confirmed");
  ledger.refresh().await?;
  print_market(&ledger, "after checkout");

  // --- The buyer thinks better of the dangling bid and cancels it ---
  let snapshot = ledger.snapshot();
  if let Some(my_bid) = query::user_offer(&snapshot, nft, U256::from(1u64), buyer, now()) {
    buyer_exchange.cancel_order(my_bid.order_hash).await?;
    ledger.refresh().await?;
    print_market(&ledger, "after cancelling the bid");
  }

  Ok(())
}
