// core/src/config.rs

use crate::error::{MarketError, MarketResult};
use crate::typed_data::Domain;
use crate::types::StarkAddress;
use std::env;

/// Static configuration for one marketplace deployment.
///
/// The chain id is deliberately absent: it is read from the connected
/// provider for every typed-data build, so a wallet switched to another
/// network can never be asked to sign against a stale domain.
#[derive(Debug, Clone)]
pub struct MarketConfig {
  /// The marketplace exchange contract.
  pub contract: StarkAddress,
  /// Block the contract was deployed at; event scans start here.
  pub deployment_block: u64,
  /// Events requested per page during ledger refresh.
  pub event_page_size: u32,
  /// Upper bound on pages fetched in one refresh. Hitting it marks the
  /// snapshot truncated instead of looping forever.
  pub max_event_pages: u32,
  pub domain_name: String,
  pub domain_version: String,
  pub domain_revision: u32,
}

const DEFAULT_PAGE_SIZE: u32 = 100;
const DEFAULT_MAX_PAGES: u32 = 50;

impl MarketConfig {
  pub fn new(contract: StarkAddress, deployment_block: u64) -> Self {
    Self {
      contract,
      deployment_block,
      event_page_size: DEFAULT_PAGE_SIZE,
      max_event_pages: DEFAULT_MAX_PAGES,
      domain_name: "Starboard".to_string(),
      domain_version: "1".to_string(),
      domain_revision: 1,
    }
  }

  pub fn from_env() -> MarketResult<Self> {
    let get_env = |var_name: &str| {
      env::var(var_name).map_err(|e| MarketError::Config(format!("Missing environment variable '{}': {}", var_name, e)))
    };

    let contract = get_env("STARBOARD_CONTRACT")?
      .parse::<StarkAddress>()
      .map_err(|e| MarketError::Config(format!("Invalid STARBOARD_CONTRACT: {}", e)))?;
    let deployment_block = get_env("STARBOARD_DEPLOYMENT_BLOCK")
      .unwrap_or_else(|_| "0".to_string())
      .parse::<u64>()
      .map_err(|e| MarketError::Config(format!("Invalid STARBOARD_DEPLOYMENT_BLOCK: {}", e)))?;
    let event_page_size = get_env("STARBOARD_EVENT_PAGE_SIZE")
      .unwrap_or_else(|_| DEFAULT_PAGE_SIZE.to_string())
      .parse::<u32>()
      .map_err(|e| MarketError::Config(format!("Invalid STARBOARD_EVENT_PAGE_SIZE: {}", e)))?;
    let max_event_pages = get_env("STARBOARD_MAX_EVENT_PAGES")
      .unwrap_or_else(|_| DEFAULT_MAX_PAGES.to_string())
      .parse::<u32>()
      .map_err(|e| MarketError::Config(format!("Invalid STARBOARD_MAX_EVENT_PAGES: {}", e)))?;
    let domain_name = get_env("STARBOARD_DOMAIN_NAME").unwrap_or_else(|_| "Starboard".to_string());
    let domain_version = get_env("STARBOARD_DOMAIN_VERSION").unwrap_or_else(|_| "1".to_string());
    let domain_revision = get_env("STARBOARD_DOMAIN_REVISION")
      .unwrap_or_else(|_| "1".to_string())
      .parse::<u32>()
      .map_err(|e| MarketError::Config(format!("Invalid STARBOARD_DOMAIN_REVISION: {}", e)))?;

    if event_page_size == 0 {
      return Err(MarketError::Config("STARBOARD_EVENT_PAGE_SIZE must be nonzero".to_string()));
    }
    if max_event_pages == 0 {
      return Err(MarketError::Config("STARBOARD_MAX_EVENT_PAGES must be nonzero".to_string()));
    }

    tracing::info!(%contract, deployment_block, "Marketplace configuration loaded.");

    Ok(Self {
      contract,
      deployment_block,
      event_page_size,
      max_event_pages,
      domain_name,
      domain_version,
      domain_revision,
    })
  }

  /// Builds the typed-data domain for the given (freshly read) chain id.
  pub fn domain(&self, chain_id: u64) -> Domain {
    Domain {
      name: self.domain_name.clone(),
      version: self.domain_version.clone(),
      chain_id,
      revision: self.domain_revision,
    }
  }
}
