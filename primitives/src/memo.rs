//! Transaction memo parsing.
//!
//! Memos are colon separated, `PREFIX:arg1:arg2...`, optionally followed by
//! `|payload` that the protocol carries along untouched.

use crate::{
  address::{Address, TxId},
  assets::Asset,
  ecosystem::params::MAX_BASIS_POINTS,
};
use alloc::vec::Vec;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TxType {
  Swap,
  Outbound,
  Refund,
  Migrate,
  Ragnarok,
  Withdraw,
  AddLiquidity,
  Donate,
  Consolidate,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MemoError {
  Empty,
  UnknownPrefix,
  InvalidAsset,
  InvalidAffiliate,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Affiliate {
  pub address: Address,
  pub basis_points: u128,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Memo {
  pub tx_type: TxType,
  /// Target asset for swaps, pool asset for liquidity memos.
  pub asset: Option<Asset>,
  pub destination: Option<Address>,
  pub affiliates: Vec<Affiliate>,
}

const PREFIXES: &[(&[u8], TxType)] = &[
  (b"SWAP", TxType::Swap),
  (b"S", TxType::Swap),
  (b"=", TxType::Swap),
  (b"OUT", TxType::Outbound),
  (b"REFUND", TxType::Refund),
  (b"MIGRATE", TxType::Migrate),
  (b"RAGNAROK", TxType::Ragnarok),
  (b"WITHDRAW", TxType::Withdraw),
  (b"WD", TxType::Withdraw),
  (b"-", TxType::Withdraw),
  (b"ADD", TxType::AddLiquidity),
  (b"A", TxType::AddLiquidity),
  (b"+", TxType::AddLiquidity),
  (b"DONATE", TxType::Donate),
  (b"D", TxType::Donate),
  (b"CONSOLIDATE", TxType::Consolidate),
];

/// Splits `memo|payload` at the first pipe.
pub fn split_payload(raw: &[u8]) -> (&[u8], Option<&[u8]>) {
  match raw.iter().position(|b| *b == b'|') {
    Some(pos) => (&raw[..pos], Some(&raw[pos + 1..])),
    None => (raw, None),
  }
}

impl Memo {
  pub fn parse(raw: &[u8]) -> Result<Memo, MemoError> {
    let (body, _) = split_payload(raw);
    if body.is_empty() {
      return Err(MemoError::Empty);
    }
    let parts: Vec<&[u8]> = body.split(|b| *b == b':').collect();
    let tx_type = PREFIXES
      .iter()
      .find(|(prefix, _)| prefix.eq_ignore_ascii_case(parts[0]))
      .map(|(_, t)| *t)
      .ok_or(MemoError::UnknownPrefix)?;
    let part = |i: usize| parts.get(i).copied().filter(|p| !p.is_empty());

    let mut memo = Memo {
      tx_type,
      asset: None,
      destination: None,
      affiliates: Vec::new(),
    };
    match tx_type {
      TxType::Swap => {
        let asset = part(1).ok_or(MemoError::InvalidAsset)?;
        memo.asset = Some(Asset::parse(asset).ok_or(MemoError::InvalidAsset)?);
        memo.destination = part(2).map(Address::from);
        memo.affiliates = parse_affiliates(part(4), part(5))?;
      },
      TxType::Withdraw | TxType::AddLiquidity | TxType::Donate => {
        if let Some(asset) = part(1) {
          memo.asset = Some(Asset::parse(asset).ok_or(MemoError::InvalidAsset)?);
        }
      },
      _ => {},
    }
    Ok(memo)
  }

  pub fn is_type(&self, tx_type: TxType) -> bool {
    self.tx_type == tx_type
  }

  pub fn is_outbound(&self) -> bool {
    matches!(self.tx_type, TxType::Outbound | TxType::Refund)
  }

  /// Default memo of an outbound paying out inbound `in_hash`.
  pub fn outbound(in_hash: &TxId) -> Vec<u8> {
    let mut memo = b"OUT:".to_vec();
    memo.extend_from_slice(&in_hash.to_hex());
    memo
  }

  pub fn refund(in_hash: &TxId) -> Vec<u8> {
    let mut memo = b"REFUND:".to_vec();
    memo.extend_from_slice(&in_hash.to_hex());
    memo
  }
}

/// Whether `raw` starts with `prefix:` (case-insensitive), without parsing the rest.
pub fn has_prefix(raw: &[u8], prefix: &[u8]) -> bool {
  let head = raw.split(|b| *b == b':').next().unwrap_or_default();
  head.eq_ignore_ascii_case(prefix)
}

fn parse_affiliates(
  names: Option<&[u8]>,
  bps: Option<&[u8]>,
) -> Result<Vec<Affiliate>, MemoError> {
  let (Some(names), Some(bps)) = (names, bps) else {
    return Ok(Vec::new());
  };
  let names: Vec<&[u8]> = names.split(|b| *b == b'/').collect();
  let bps: Vec<&[u8]> = bps.split(|b| *b == b'/').collect();
  if names.len() != bps.len() {
    return Err(MemoError::InvalidAffiliate);
  }
  names
    .into_iter()
    .zip(bps)
    .map(|(name, bps)| {
      let basis_points = parse_u128(bps).ok_or(MemoError::InvalidAffiliate)?;
      if name.is_empty() || basis_points > MAX_BASIS_POINTS {
        return Err(MemoError::InvalidAffiliate);
      }
      Ok(Affiliate {
        address: Address::from(name),
        basis_points,
      })
    })
    .collect()
}

fn parse_u128(raw: &[u8]) -> Option<u128> {
  if raw.is_empty() {
    return None;
  }
  raw.iter().try_fold(0u128, |acc, b| {
    if !b.is_ascii_digit() {
      return None;
    }
    acc.checked_mul(10)?.checked_add(u128::from(b - b'0'))
  })
}
