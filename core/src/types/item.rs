// core/src/types/item.rs

//! The closed item-type and order-kind enums and their wire codec.
//!
//! On the wire both enums travel as Cairo short strings: the ASCII symbol
//! packed big-endian into one field element. This module is the single
//! bidirectional mapping table; encoding happens only at submission time
//! (exchange::calldata) and decoding only at detail-read time (ledger),
//! but both directions live here so they cannot drift apart.

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

/// Packs an ASCII string of at most 31 bytes into a field element.
pub fn encode_short_string(s: &str) -> U256 {
  debug_assert!(s.len() <= 31, "short string too long: {}", s);
  debug_assert!(s.is_ascii(), "short string must be ASCII: {}", s);
  U256::from_be_slice(s.as_bytes())
}

/// Inverse of [`encode_short_string`]. Returns `None` for values that do not
/// decode to printable ASCII (e.g. arbitrary felts read off the wire).
pub fn decode_short_string(value: U256) -> Option<String> {
  let bytes = value.to_be_bytes::<32>();
  let start = bytes.iter().position(|b| *b != 0).unwrap_or(32);
  let tail = &bytes[start..];
  if tail.iter().any(|b| !b.is_ascii_graphic() && *b != b' ') {
    return None;
  }
  Some(String::from_utf8(tail.to_vec()).expect("ascii checked above"))
}

/// What an offer or consideration item is denominated in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemType {
  Native,
  Erc20,
  Erc721,
  Erc1155,
  Erc721WithCriteria,
  Erc1155WithCriteria,
}

impl ItemType {
  pub const ALL: [ItemType; 6] = [
    ItemType::Native,
    ItemType::Erc20,
    ItemType::Erc721,
    ItemType::Erc1155,
    ItemType::Erc721WithCriteria,
    ItemType::Erc1155WithCriteria,
  ];

  pub fn symbol(&self) -> &'static str {
    match self {
      ItemType::Native => "NATIVE",
      ItemType::Erc20 => "ERC20",
      ItemType::Erc721 => "ERC721",
      ItemType::Erc1155 => "ERC1155",
      ItemType::Erc721WithCriteria => "ERC721_WITH_CRITERIA",
      ItemType::Erc1155WithCriteria => "ERC1155_WITH_CRITERIA",
    }
  }

  pub fn wire(&self) -> U256 {
    encode_short_string(self.symbol())
  }

  pub fn from_wire(value: U256) -> Option<Self> {
    Self::ALL.iter().copied().find(|it| it.wire() == value)
  }
}

/// Fill semantics of an order: open vs restricted, full vs partial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderKind {
  FullOpen,
  PartialOpen,
  FullRestricted,
  PartialRestricted,
}

impl OrderKind {
  pub const ALL: [OrderKind; 4] = [
    OrderKind::FullOpen,
    OrderKind::PartialOpen,
    OrderKind::FullRestricted,
    OrderKind::PartialRestricted,
  ];

  pub fn symbol(&self) -> &'static str {
    match self {
      OrderKind::FullOpen => "FULL_OPEN",
      OrderKind::PartialOpen => "PARTIAL_OPEN",
      OrderKind::FullRestricted => "FULL_RESTRICTED",
      OrderKind::PartialRestricted => "PARTIAL_RESTRICTED",
    }
  }

  pub fn wire(&self) -> U256 {
    encode_short_string(self.symbol())
  }

  pub fn from_wire(value: U256) -> Option<Self> {
    Self::ALL.iter().copied().find(|k| k.wire() == value)
  }
}
