// demos/market_console/src/services/file_cart.rs

//! JSON-file cart persistence: the console stand-in for browser storage.

use anyhow::Context;
use starboard::{CartPersistence, MarketError, MarketResult};
use std::fs;
use std::path::PathBuf;

pub struct FileCartPersistence {
  path: PathBuf,
}

impl FileCartPersistence {
  pub fn new(path: PathBuf) -> Self {
    Self { path }
  }
}

impl CartPersistence for FileCartPersistence {
  fn load(&self) -> MarketResult<Option<String>> {
    if !self.path.exists() {
      return Ok(None);
    }
    let contents = fs::read_to_string(&self.path)
      .with_context(|| format!("reading cart snapshot {}", self.path.display()))
      .map_err(|source| MarketError::Persistence { source })?;
    Ok(Some(contents))
  }

  fn save(&self, serialized: &str) -> MarketResult<()> {
    fs::write(&self.path, serialized)
      .with_context(|| format!("writing cart snapshot {}", self.path.display()))
      .map_err(|source| MarketError::Persistence { source })
  }
}
