use crate::chain::Chain;
use alloc::vec::Vec;
use codec::{Decode, DecodeWithMemTracking, Encode};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

/// Sink address: outbounds to it succeed without moving funds.
pub const NOOP_ADDRESS: &[u8] = b"noop";

pub const EVM_NULL_ADDRESS: &[u8] = b"0x0000000000000000000000000000000000000000";

const EVM_ADDRESS_LEN: usize = 42;

/// An address on any supported chain, kept in its textual form.
#[derive(
  Clone,
  Debug,
  Decode,
  DecodeWithMemTracking,
  Default,
  Encode,
  Eq,
  Ord,
  PartialEq,
  PartialOrd,
  TypeInfo,
  Serialize,
  Deserialize,
)]
pub struct Address(pub Vec<u8>);

impl Address {
  pub fn as_bytes(&self) -> &[u8] {
    &self.0
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn is_noop(&self) -> bool {
    self.0.eq_ignore_ascii_case(NOOP_ADDRESS)
  }

  pub fn is_evm_null(&self) -> bool {
    self.0.eq_ignore_ascii_case(EVM_NULL_ADDRESS)
  }

  /// Whether the address is well-formed for `chain`.
  pub fn is_chain(&self, chain: Chain) -> bool {
    if self.is_empty() {
      return false;
    }
    if chain.is_evm() && self.0.len() != EVM_ADDRESS_LEN {
      return false;
    }
    chain
      .address_prefixes()
      .iter()
      .any(|prefix| self.0.starts_with(prefix))
  }
}

impl From<&str> for Address {
  fn from(s: &str) -> Self {
    Address(s.as_bytes().to_vec())
  }
}

impl From<&[u8]> for Address {
  fn from(s: &[u8]) -> Self {
    Address(s.to_vec())
  }
}

/// Public key of a custodial vault.
#[derive(
  Clone,
  Debug,
  Decode,
  DecodeWithMemTracking,
  Default,
  Encode,
  Eq,
  Ord,
  PartialEq,
  PartialOrd,
  TypeInfo,
  Serialize,
  Deserialize,
)]
pub struct PubKey(pub Vec<u8>);

impl PubKey {
  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }
}

impl From<&str> for PubKey {
  fn from(s: &str) -> Self {
    PubKey(s.as_bytes().to_vec())
  }
}

/// Transaction id on any chain. All zeroes is the blank id.
#[derive(
  Clone,
  Copy,
  Debug,
  Decode,
  DecodeWithMemTracking,
  Default,
  Encode,
  Eq,
  Ord,
  PartialEq,
  PartialOrd,
  TypeInfo,
  Serialize,
  Deserialize,
)]
pub struct TxId(pub [u8; 32]);

impl TxId {
  pub const BLANK: TxId = TxId([0u8; 32]);

  pub fn is_blank(&self) -> bool {
    *self == Self::BLANK
  }

  /// Upper-case hex, as it appears in memos.
  pub fn to_hex(&self) -> Vec<u8> {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";
    let mut out = Vec::with_capacity(64);
    for b in self.0.iter() {
      out.push(HEX[(b >> 4) as usize]);
      out.push(HEX[(b & 0x0f) as usize]);
    }
    out
  }
}

impl From<[u8; 32]> for TxId {
  fn from(bytes: [u8; 32]) -> Self {
    TxId(bytes)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn chain_address_validation() {
    let eth: Address = "0x90f2b1ae50e6018230e90a33f98c7844a0ab635a".into();
    assert!(eth.is_chain(Chain::Eth));
    assert!(eth.is_chain(Chain::Base));
    assert!(!eth.is_chain(Chain::Btc));

    let short: Address = "0x90f2".into();
    assert!(!short.is_chain(Chain::Eth));

    let btc: Address = "bc1qxy2kgdygjrsqtzq2n0yrf2493p83kkfjhx0wlh".into();
    assert!(btc.is_chain(Chain::Btc));
    assert!(!btc.is_chain(Chain::Doge));
    assert!(!Address::default().is_chain(Chain::Btc));
  }

  #[test]
  fn special_addresses() {
    assert!(Address::from("NOOP").is_noop());
    assert!(Address::from(EVM_NULL_ADDRESS).is_evm_null());
    assert!(Address::from(EVM_NULL_ADDRESS).is_chain(Chain::Eth));
  }

  #[test]
  fn tx_id_hex() {
    let mut raw = [0u8; 32];
    raw[0] = 0xab;
    raw[31] = 0x01;
    let hex = TxId(raw).to_hex();
    assert_eq!(hex.len(), 64);
    assert!(hex.starts_with(b"AB00"));
    assert!(hex.ends_with(b"01"));
    assert!(TxId::BLANK.is_blank());
  }
}
