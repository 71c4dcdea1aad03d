// core/src/typed_data/hash.rs

//! Deterministic hashing of typed-data documents.
//!
//! The scheme is the domain-separated struct-hash construction the verifier
//! contract re-runs: each struct type hashes as
//! `keccak256(type_hash ‖ encoded fields)`, arrays as the keccak of their
//! members' struct hashes concatenated, and the final signing hash as
//! `keccak256(0x19 0x01 ‖ domain_separator ‖ message_hash)`. Every scalar
//! encodes as one 32-byte big-endian word. Any deviation in field order or
//! type naming changes the hash, which is exactly the property the signing
//! client's cross-check against the contract relies on.

use crate::error::{MarketError, MarketResult};
use crate::typed_data::{short_string_word, TypeDef, TypedData, TypedValue};
use alloy_primitives::{keccak256, B256, U256};

fn find_type<'a>(name: &str, types: &'a [TypeDef]) -> MarketResult<&'a TypeDef> {
  types
    .iter()
    .find(|def| def.name == name)
    .ok_or_else(|| MarketError::Internal(format!("typed data references undeclared type '{}'", name)))
}

fn base_type(ty: &str) -> &str {
  ty.strip_suffix("[]").unwrap_or(ty)
}

fn is_struct_type(ty: &str, types: &[TypeDef]) -> bool {
  types.iter().any(|def| def.name == base_type(ty))
}

/// The canonical type encoding: the primary declaration followed by every
/// transitively referenced struct, sorted by name.
pub fn encode_type(primary: &str, types: &[TypeDef]) -> MarketResult<String> {
  fn declaration(def: &TypeDef) -> String {
    let fields: Vec<String> = def.fields.iter().map(|f| format!("{} {}", f.ty, f.name)).collect();
    format!("{}({})", def.name, fields.join(","))
  }

  fn collect_refs(name: &str, types: &[TypeDef], seen: &mut Vec<String>) -> MarketResult<()> {
    let def = find_type(name, types)?;
    for field in &def.fields {
      let base = base_type(field.ty);
      if is_struct_type(base, types) && !seen.iter().any(|s| s == base) && base != name {
        seen.push(base.to_string());
        collect_refs(base, types, seen)?;
      }
    }
    Ok(())
  }

  let primary_def = find_type(primary, types)?;
  let mut referenced = Vec::new();
  collect_refs(primary, types, &mut referenced)?;
  referenced.sort();

  let mut encoded = declaration(primary_def);
  for name in referenced {
    encoded.push_str(&declaration(find_type(&name, types)?));
  }
  Ok(encoded)
}

pub fn type_hash(primary: &str, types: &[TypeDef]) -> MarketResult<B256> {
  Ok(keccak256(encode_type(primary, types)?.as_bytes()))
}

fn encode_scalar(declared: &str, value: &TypedValue) -> MarketResult<[u8; 32]> {
  match (declared, value) {
    ("ContractAddress", TypedValue::Address(a)) => Ok(a.as_b256().0),
    ("felt", TypedValue::Felt(h)) => Ok(h.0),
    ("felt", TypedValue::U128(v)) => Ok(U256::from(*v).to_be_bytes::<32>()),
    ("felt", TypedValue::U256(v)) => Ok(v.to_be_bytes::<32>()),
    ("u128", TypedValue::U128(v)) => Ok(U256::from(*v).to_be_bytes::<32>()),
    ("u256", TypedValue::U256(v)) => Ok(v.to_be_bytes::<32>()),
    ("shortstring", TypedValue::ShortString(s)) => Ok(short_string_word(s)),
    (declared, other) => Err(MarketError::Internal(format!(
      "typed data field declared '{}' holds incompatible value {:?}",
      declared, other
    ))),
  }
}

fn encode_value(declared: &str, value: &TypedValue, types: &[TypeDef]) -> MarketResult<[u8; 32]> {
  if let Some(elem_ty) = declared.strip_suffix("[]") {
    let TypedValue::Array(items) = value else {
      return Err(MarketError::Internal(format!(
        "typed data field declared '{}' holds non-array value",
        declared
      )));
    };
    let mut buf = Vec::with_capacity(items.len() * 32);
    for item in items {
      buf.extend_from_slice(&encode_value(elem_ty, item, types)?);
    }
    return Ok(keccak256(&buf).0);
  }
  if is_struct_type(declared, types) {
    let TypedValue::Struct(_, _) = value else {
      return Err(MarketError::Internal(format!(
        "typed data field declared '{}' holds non-struct value",
        declared
      )));
    };
    return Ok(hash_struct(value, types)?.0);
  }
  encode_scalar(declared, value)
}

/// `keccak256(type_hash ‖ encoded fields)`, recursing into sub-structs and
/// arrays. Fields hash in declaration order; the value tree must carry them
/// in the same order (the builders guarantee this).
pub fn hash_struct(value: &TypedValue, types: &[TypeDef]) -> MarketResult<B256> {
  let TypedValue::Struct(type_name, fields) = value else {
    return Err(MarketError::Internal("hash_struct called on non-struct value".to_string()));
  };
  let def = find_type(type_name, types)?;
  if def.fields.len() != fields.len() {
    return Err(MarketError::Internal(format!(
      "typed data struct '{}' has {} fields, declaration has {}",
      type_name,
      fields.len(),
      def.fields.len()
    )));
  }

  let mut buf = Vec::with_capacity((fields.len() + 1) * 32);
  buf.extend_from_slice(&type_hash(type_name, types)?.0);
  for (decl, (field_name, field_value)) in def.fields.iter().zip(fields) {
    if decl.name != *field_name {
      return Err(MarketError::Internal(format!(
        "typed data struct '{}' field order mismatch: declared '{}', got '{}'",
        type_name, decl.name, field_name
      )));
    }
    buf.extend_from_slice(&encode_value(decl.ty, field_value, types)?);
  }
  Ok(keccak256(&buf))
}

/// The domain separator for this document's domain.
pub fn domain_separator(typed: &TypedData) -> MarketResult<B256> {
  hash_struct(&typed.domain.to_value(), &typed.types)
}

/// The struct hash of the message alone. This is what the contract's
/// `get_order_hash` returns and what the signing client compares against.
pub fn message_hash(typed: &TypedData) -> MarketResult<B256> {
  hash_struct(&typed.message, &typed.types)
}

/// The digest the wallet actually signs.
pub fn signing_hash(typed: &TypedData) -> MarketResult<B256> {
  let mut buf = Vec::with_capacity(2 + 64);
  buf.extend_from_slice(&[0x19, 0x01]);
  buf.extend_from_slice(&domain_separator(typed)?.0);
  buf.extend_from_slice(&message_hash(typed)?.0);
  Ok(keccak256(&buf))
}
