// core/src/typed_data/mod.rs

//! Canonical typed-data documents for the three message kinds the
//! marketplace contract verifies: order parameters, fulfillment and
//! cancellation.
//!
//! Everything here is pure and deterministic. Field order inside every type
//! table matches the contract struct layout exactly (it is part of the hash
//! domain, not cosmetics), and the same document drives both the
//! wallet-facing JSON serialization and the local hash in [`hash`].

pub mod hash;

use crate::types::{encode_short_string, StarkAddress};
use alloy_primitives::{B256, U256};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Serialize, Serializer};

pub use hash::{domain_separator, message_hash, signing_hash};

/// The shared signing domain. `chain_id` is supplied per call from the
/// connected network; nothing in this crate hardcodes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Domain {
  pub name: String,
  pub version: String,
  #[serde(rename = "chainId")]
  pub chain_id: u64,
  pub revision: u32,
}

impl Domain {
  pub(crate) fn to_value(&self) -> TypedValue {
    TypedValue::Struct(
      DOMAIN_TYPE,
      vec![
        ("name", TypedValue::ShortString(self.name.clone())),
        ("version", TypedValue::ShortString(self.version.clone())),
        ("chainId", TypedValue::U128(self.chain_id as u128)),
        ("revision", TypedValue::U128(self.revision as u128)),
      ],
    )
  }
}

/// One field declaration inside a type table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDecl {
  pub name: &'static str,
  #[serde(rename = "type")]
  pub ty: &'static str,
}

/// One struct type: its name and ordered field declarations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDef {
  pub name: &'static str,
  pub fields: Vec<FieldDecl>,
}

/// A value in the message tree, typed just enough to hash and serialize
/// without consulting anything outside the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypedValue {
  Address(StarkAddress),
  Felt(B256),
  U128(u128),
  U256(U256),
  ShortString(String),
  Struct(&'static str, Vec<(&'static str, TypedValue)>),
  Array(Vec<TypedValue>),
}

impl Serialize for TypedValue {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    match self {
      TypedValue::Address(a) => serializer.serialize_str(&a.to_string()),
      TypedValue::Felt(h) => serializer.serialize_str(&h.to_string()),
      // Numbers as decimal strings: wallets and the contract treat these as
      // field elements, and JSON numbers lose precision past 2^53.
      TypedValue::U128(v) => serializer.serialize_str(&v.to_string()),
      TypedValue::U256(v) => serializer.serialize_str(&v.to_string()),
      TypedValue::ShortString(s) => serializer.serialize_str(s),
      TypedValue::Struct(_, fields) => {
        let mut map = serializer.serialize_map(Some(fields.len()))?;
        for (name, value) in fields {
          map.serialize_entry(name, value)?;
        }
        map.end()
      }
      TypedValue::Array(items) => {
        let mut seq = serializer.serialize_seq(Some(items.len()))?;
        for item in items {
          seq.serialize_element(item)?;
        }
        seq.end()
      }
    }
  }
}

/// A complete document: ordered type tables, primary type, domain, message.
/// Serializes to the `{types, primaryType, domain, message}` JSON form a
/// wallet's typed-data signer expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedData {
  pub types: Vec<TypeDef>,
  pub primary_type: &'static str,
  pub domain: Domain,
  pub message: TypedValue,
}

impl Serialize for TypedData {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    struct Tables<'a>(&'a [TypeDef]);
    impl Serialize for Tables<'_> {
      fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for def in self.0 {
          map.serialize_entry(def.name, &def.fields)?;
        }
        map.end()
      }
    }

    let mut map = serializer.serialize_map(Some(4))?;
    map.serialize_entry("types", &Tables(&self.types))?;
    map.serialize_entry("primaryType", self.primary_type)?;
    map.serialize_entry("domain", &self.domain)?;
    map.serialize_entry("message", &self.message)?;
    map.end()
  }
}

pub const DOMAIN_TYPE: &str = "StarknetDomain";
pub const ORDER_PARAMETERS_TYPE: &str = "OrderParameters";
pub const OFFER_ITEM_TYPE: &str = "OfferItem";
pub const CONSIDERATION_ITEM_TYPE: &str = "ConsiderationItem";
pub const FULFILLMENT_TYPE: &str = "Fulfillment";
pub const CANCELLATION_TYPE: &str = "Cancellation";

fn domain_type_def() -> TypeDef {
  TypeDef {
    name: DOMAIN_TYPE,
    fields: vec![
      FieldDecl { name: "name", ty: "shortstring" },
      FieldDecl { name: "version", ty: "shortstring" },
      FieldDecl { name: "chainId", ty: "felt" },
      FieldDecl { name: "revision", ty: "felt" },
    ],
  }
}

fn offer_item_type_def() -> TypeDef {
  TypeDef {
    name: OFFER_ITEM_TYPE,
    fields: vec![
      FieldDecl { name: "item_type", ty: "shortstring" },
      FieldDecl { name: "token", ty: "ContractAddress" },
      FieldDecl { name: "identifier_or_criteria", ty: "u256" },
      FieldDecl { name: "start_amount", ty: "u256" },
      FieldDecl { name: "end_amount", ty: "u256" },
    ],
  }
}

fn consideration_item_type_def() -> TypeDef {
  TypeDef {
    name: CONSIDERATION_ITEM_TYPE,
    fields: vec![
      FieldDecl { name: "item_type", ty: "shortstring" },
      FieldDecl { name: "token", ty: "ContractAddress" },
      FieldDecl { name: "identifier_or_criteria", ty: "u256" },
      FieldDecl { name: "start_amount", ty: "u256" },
      FieldDecl { name: "end_amount", ty: "u256" },
      FieldDecl { name: "recipient", ty: "ContractAddress" },
    ],
  }
}

fn order_parameters_type_def() -> TypeDef {
  TypeDef {
    name: ORDER_PARAMETERS_TYPE,
    fields: vec![
      FieldDecl { name: "offerer", ty: "ContractAddress" },
      FieldDecl { name: "zone", ty: "ContractAddress" },
      FieldDecl { name: "offer", ty: "OfferItem[]" },
      FieldDecl { name: "consideration", ty: "ConsiderationItem[]" },
      FieldDecl { name: "order_type", ty: "shortstring" },
      FieldDecl { name: "start_time", ty: "u128" },
      FieldDecl { name: "end_time", ty: "u128" },
      FieldDecl { name: "zone_hash", ty: "felt" },
      FieldDecl { name: "salt", ty: "felt" },
      FieldDecl { name: "conduit_key", ty: "felt" },
      FieldDecl { name: "total_original_consideration_items", ty: "u128" },
      FieldDecl { name: "nonce", ty: "u128" },
    ],
  }
}

fn fulfillment_type_def() -> TypeDef {
  TypeDef {
    name: FULFILLMENT_TYPE,
    fields: vec![
      FieldDecl { name: "fulfiller", ty: "ContractAddress" },
      FieldDecl { name: "order_hash", ty: "felt" },
      FieldDecl { name: "nonce", ty: "u128" },
    ],
  }
}

fn cancellation_type_def() -> TypeDef {
  TypeDef {
    name: CANCELLATION_TYPE,
    fields: vec![
      FieldDecl { name: "offerer", ty: "ContractAddress" },
      FieldDecl { name: "order_hash", ty: "felt" },
      FieldDecl { name: "nonce", ty: "u128" },
    ],
  }
}

fn offer_item_value(item: &crate::types::OfferItem) -> TypedValue {
  TypedValue::Struct(
    OFFER_ITEM_TYPE,
    vec![
      ("item_type", TypedValue::ShortString(item.item_type.symbol().to_string())),
      ("token", TypedValue::Address(item.token)),
      ("identifier_or_criteria", TypedValue::U256(item.identifier_or_criteria)),
      ("start_amount", TypedValue::U256(item.start_amount)),
      ("end_amount", TypedValue::U256(item.end_amount)),
    ],
  )
}

fn consideration_item_value(item: &crate::types::ConsiderationItem) -> TypedValue {
  TypedValue::Struct(
    CONSIDERATION_ITEM_TYPE,
    vec![
      ("item_type", TypedValue::ShortString(item.item_type.symbol().to_string())),
      ("token", TypedValue::Address(item.token)),
      ("identifier_or_criteria", TypedValue::U256(item.identifier_or_criteria)),
      ("start_amount", TypedValue::U256(item.start_amount)),
      ("end_amount", TypedValue::U256(item.end_amount)),
      ("recipient", TypedValue::Address(item.recipient)),
    ],
  )
}

/// Builds the order-registration message for the given parameters with the
/// freshly fetched nonce folded in.
pub fn order_parameters_message(params: &crate::types::OrderParameters, nonce: u64, domain: Domain) -> TypedData {
  let message = TypedValue::Struct(
    ORDER_PARAMETERS_TYPE,
    vec![
      ("offerer", TypedValue::Address(params.offerer)),
      ("zone", TypedValue::Address(params.zone)),
      ("offer", TypedValue::Array(params.offer.iter().map(offer_item_value).collect())),
      (
        "consideration",
        TypedValue::Array(params.consideration.iter().map(consideration_item_value).collect()),
      ),
      ("order_type", TypedValue::ShortString(params.order_kind.symbol().to_string())),
      ("start_time", TypedValue::U128(params.start_time as u128)),
      ("end_time", TypedValue::U128(params.end_time as u128)),
      ("zone_hash", TypedValue::Felt(params.zone_hash)),
      ("salt", TypedValue::Felt(B256::new(params.salt.to_be_bytes()))),
      ("conduit_key", TypedValue::Felt(params.conduit_key)),
      (
        "total_original_consideration_items",
        TypedValue::U128(params.total_original_consideration_items() as u128),
      ),
      ("nonce", TypedValue::U128(nonce as u128)),
    ],
  );
  TypedData {
    types: vec![
      domain_type_def(),
      order_parameters_type_def(),
      offer_item_type_def(),
      consideration_item_type_def(),
    ],
    primary_type: ORDER_PARAMETERS_TYPE,
    domain,
    message,
  }
}

/// Builds the fulfillment message a buyer signs to take an order.
pub fn fulfillment_message(fulfiller: StarkAddress, order_hash: B256, nonce: u64, domain: Domain) -> TypedData {
  TypedData {
    types: vec![domain_type_def(), fulfillment_type_def()],
    primary_type: FULFILLMENT_TYPE,
    domain,
    message: TypedValue::Struct(
      FULFILLMENT_TYPE,
      vec![
        ("fulfiller", TypedValue::Address(fulfiller)),
        ("order_hash", TypedValue::Felt(order_hash)),
        ("nonce", TypedValue::U128(nonce as u128)),
      ],
    ),
  }
}

/// Builds the cancellation message an offerer signs to void an order.
pub fn cancellation_message(offerer: StarkAddress, order_hash: B256, nonce: u64, domain: Domain) -> TypedData {
  TypedData {
    types: vec![domain_type_def(), cancellation_type_def()],
    primary_type: CANCELLATION_TYPE,
    domain,
    message: TypedValue::Struct(
      CANCELLATION_TYPE,
      vec![
        ("offerer", TypedValue::Address(offerer)),
        ("order_hash", TypedValue::Felt(order_hash)),
        ("nonce", TypedValue::U128(nonce as u128)),
      ],
    ),
  }
}

pub(crate) fn short_string_word(s: &str) -> [u8; 32] {
  encode_short_string(s).to_be_bytes::<32>()
}
