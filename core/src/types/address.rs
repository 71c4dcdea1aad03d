// core/src/types/address.rs

use alloy_primitives::{hex, B256, U256};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A contract or account address: one field element, stored as 32 bytes.
///
/// Parsing normalizes case and left-pads short hex strings, so two spellings
/// of the same address ("0xAbC" vs "0x0...0abc") compare equal with plain
/// `==`. Ownership checks throughout the crate rely on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StarkAddress(B256);

impl StarkAddress {
  pub const ZERO: StarkAddress = StarkAddress(B256::ZERO);

  pub fn from_bytes(bytes: [u8; 32]) -> Self {
    Self(B256::new(bytes))
  }

  pub fn as_b256(&self) -> B256 {
    self.0
  }

  pub fn to_u256(&self) -> U256 {
    U256::from_be_bytes(self.0 .0)
  }

  pub fn from_u256(value: U256) -> Self {
    Self(B256::new(value.to_be_bytes()))
  }

  pub fn is_zero(&self) -> bool {
    self.0 == B256::ZERO
  }
}

impl FromStr for StarkAddress {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let stripped = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
    if stripped.is_empty() || stripped.len() > 64 {
      return Err(format!("invalid address length: {}", s.len()));
    }
    // Left-pad to a full field element before decoding; this is where
    // "0xabc" and "0x0...0abc" converge.
    let padded = format!("{:0>64}", stripped.to_ascii_lowercase());
    let bytes = hex::decode(&padded).map_err(|e| format!("invalid address hex: {}", e))?;
    let mut out = [0u8; 32];
    out.copy_from_slice(&bytes);
    Ok(Self(B256::new(out)))
  }
}

impl fmt::Display for StarkAddress {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

impl From<B256> for StarkAddress {
  fn from(value: B256) -> Self {
    Self(value)
  }
}
