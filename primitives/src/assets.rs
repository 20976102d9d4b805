use crate::chain::Chain;
use alloc::vec::Vec;
use codec::{Decode, DecodeWithMemTracking, Encode};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

/// Symbol of the protocol's own settlement asset.
pub const NATIVE_SYMBOL: &[u8] = b"NATIVE";

/// How an asset is held.
///
/// - `Layer1`: the real asset, custodied in vaults on its own chain.
/// - `Synth`: a pool-backed claim living on the native ledger (`BTC/BTC`).
/// - `Trade`: a trade-account balance backed by vault holdings (`BTC~BTC`).
/// - `Secured`: a secured-asset balance backed by vault holdings (`BTC-BTC`).
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
pub enum AssetClass {
  #[default]
  Layer1,
  Synth,
  Trade,
  Secured,
}

impl AssetClass {
  fn separator(&self) -> u8 {
    match self {
      AssetClass::Layer1 => b'.',
      AssetClass::Synth => b'/',
      AssetClass::Trade => b'~',
      AssetClass::Secured => b'-',
    }
  }

  fn from_separator(sep: u8) -> Option<AssetClass> {
    match sep {
      b'.' => Some(AssetClass::Layer1),
      b'/' => Some(AssetClass::Synth),
      b'~' => Some(AssetClass::Trade),
      b'-' => Some(AssetClass::Secured),
      _ => None,
    }
  }
}

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
pub struct Asset {
  pub chain: Chain,
  pub symbol: Vec<u8>,
  pub class: AssetClass,
}

impl Asset {
  pub fn new(chain: Chain, symbol: &[u8]) -> Self {
    Self {
      chain,
      symbol: symbol.to_ascii_uppercase(),
      class: AssetClass::Layer1,
    }
  }

  pub fn with_class(mut self, class: AssetClass) -> Self {
    self.class = class;
    self
  }

  pub fn native() -> Self {
    Self::new(Chain::Native, NATIVE_SYMBOL)
  }

  /// The protocol's own settlement asset.
  pub fn is_native(&self) -> bool {
    self.chain.is_native() && self.class == AssetClass::Layer1 && self.symbol == NATIVE_SYMBOL
  }

  pub fn is_synthetic(&self) -> bool {
    self.class == AssetClass::Synth
  }

  pub fn is_trade(&self) -> bool {
    self.class == AssetClass::Trade
  }

  pub fn is_secured(&self) -> bool {
    self.class == AssetClass::Secured
  }

  /// Native-ledger mirror of an external asset, e.g. `NATIVE.BTC`.
  pub fn is_derived(&self) -> bool {
    self.chain.is_native() && self.class == AssetClass::Layer1 && self.symbol != NATIVE_SYMBOL
  }

  pub fn is_gas_asset(&self) -> bool {
    self.class == AssetClass::Layer1 && *self == self.chain.gas_asset()
  }

  /// Chain whose ledger holds the balance. Synthetic, trade and secured
  /// balances all live on the native ledger.
  pub fn ledger_chain(&self) -> Chain {
    match self.class {
      AssetClass::Layer1 => self.chain,
      _ => Chain::Native,
    }
  }

  /// The layer-1 asset backing this one; pools are keyed by it.
  pub fn layer1(&self) -> Asset {
    Self {
      chain: self.chain,
      symbol: self.symbol.clone(),
      class: AssetClass::Layer1,
    }
  }

  /// Parses `CHAIN<sep>SYMBOL` where the separator selects the class. The
  /// bare ticker `NATIVE` names the settlement asset.
  pub fn parse(raw: &[u8]) -> Option<Asset> {
    if raw.eq_ignore_ascii_case(NATIVE_SYMBOL) {
      return Some(Asset::native());
    }
    let pos = raw
      .iter()
      .position(|b| AssetClass::from_separator(*b).is_some())?;
    let class = AssetClass::from_separator(raw[pos])?;
    let chain = Chain::from_ticker(&raw[..pos])?;
    let symbol = &raw[pos + 1..];
    if symbol.is_empty() {
      return None;
    }
    Some(Asset::new(chain, symbol).with_class(class))
  }

  pub fn to_vec(&self) -> Vec<u8> {
    let mut out = self.chain.ticker().to_vec();
    out.push(self.class.separator());
    out.extend_from_slice(&self.symbol);
    out
  }
}

#[derive(
  Clone,
  Debug,
  Decode,
  DecodeWithMemTracking,
  Default,
  Encode,
  Eq,
  PartialEq,
  TypeInfo,
  Serialize,
  Deserialize,
)]
pub struct Coin {
  pub asset: Asset,
  pub amount: u128,
}

impl Coin {
  pub fn new(asset: Asset, amount: u128) -> Self {
    Self { asset, amount }
  }

  pub fn is_empty(&self) -> bool {
    self.amount == 0 || self.asset.symbol.is_empty()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parse_asset_classes() {
    let btc = Asset::parse(b"BTC.BTC").unwrap();
    assert_eq!(btc, Asset::new(Chain::Btc, b"BTC"));
    assert!(btc.is_gas_asset());

    let synth = Asset::parse(b"btc/btc").unwrap();
    assert!(synth.is_synthetic());
    assert!(!synth.is_gas_asset());
    assert_eq!(synth.layer1(), btc);

    assert!(Asset::parse(b"BTC~BTC").unwrap().is_trade());
    assert!(Asset::parse(b"BTC-BTC").unwrap().is_secured());
    assert!(Asset::parse(b"NATIVE").unwrap().is_native());
    assert!(Asset::parse(b"SOL.SOL").is_none());
    assert!(Asset::parse(b"BTC.").is_none());
  }

  #[test]
  fn token_symbols_keep_contract_suffix() {
    let usdc = Asset::parse(b"ETH.USDC-0XA0B86991").unwrap();
    assert_eq!(usdc.class, AssetClass::Layer1);
    assert_eq!(usdc.symbol, b"USDC-0XA0B86991".to_vec());
    assert!(!usdc.is_gas_asset());
    assert_eq!(usdc.to_vec(), b"ETH.USDC-0XA0B86991".to_vec());
  }

  #[test]
  fn derived_assets_live_on_native_chain() {
    let derived = Asset::new(Chain::Native, b"BTC");
    assert!(derived.is_derived());
    assert!(!derived.is_native());
    assert!(!Asset::native().is_derived());
  }
}
