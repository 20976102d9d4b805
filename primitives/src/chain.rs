use crate::{assets::Asset, ecosystem::params};
use codec::{Decode, DecodeWithMemTracking, Encode, MaxEncodedLen};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

/// External chains the protocol custodies funds on, plus its own ledger.
#[derive(
  Clone,
  Copy,
  Debug,
  Decode,
  DecodeWithMemTracking,
  Default,
  Encode,
  Eq,
  MaxEncodedLen,
  Ord,
  PartialEq,
  PartialOrd,
  TypeInfo,
  Serialize,
  Deserialize,
)]
pub enum Chain {
  /// The protocol's own ledger. Outbounds here settle synchronously.
  #[default]
  Native,
  Btc,
  Eth,
  Bsc,
  Avax,
  Doge,
  Ltc,
  Bch,
  Gaia,
  Base,
  Xrp,
}

pub const ALL_CHAINS: [Chain; 11] = [
  Chain::Native,
  Chain::Btc,
  Chain::Eth,
  Chain::Bsc,
  Chain::Avax,
  Chain::Doge,
  Chain::Ltc,
  Chain::Bch,
  Chain::Gaia,
  Chain::Base,
  Chain::Xrp,
];

impl Chain {
  pub fn ticker(&self) -> &'static [u8] {
    match self {
      Chain::Native => b"NATIVE",
      Chain::Btc => b"BTC",
      Chain::Eth => b"ETH",
      Chain::Bsc => b"BSC",
      Chain::Avax => b"AVAX",
      Chain::Doge => b"DOGE",
      Chain::Ltc => b"LTC",
      Chain::Bch => b"BCH",
      Chain::Gaia => b"GAIA",
      Chain::Base => b"BASE",
      Chain::Xrp => b"XRP",
    }
  }

  /// Case-insensitive lookup by ticker.
  pub fn from_ticker(ticker: &[u8]) -> Option<Chain> {
    ALL_CHAINS
      .iter()
      .copied()
      .find(|c| c.ticker().eq_ignore_ascii_case(ticker))
  }

  fn gas_symbol(&self) -> &'static [u8] {
    match self {
      Chain::Bsc => b"BNB",
      Chain::Gaia => b"ATOM",
      Chain::Base => b"ETH",
      other => other.ticker(),
    }
  }

  /// The asset this chain pays transaction fees in.
  pub fn gas_asset(&self) -> Asset {
    Asset::new(*self, self.gas_symbol())
  }

  pub fn is_native(&self) -> bool {
    matches!(self, Chain::Native)
  }

  pub fn is_evm(&self) -> bool {
    matches!(self, Chain::Eth | Chain::Bsc | Chain::Avax | Chain::Base)
  }

  pub fn is_utxo(&self) -> bool {
    matches!(self, Chain::Btc | Chain::Ltc | Chain::Bch | Chain::Doge)
  }

  /// Smallest gas-asset payment worth sending, in 1e8 units.
  pub fn dust_threshold(&self) -> u128 {
    match self {
      Chain::Btc | Chain::Ltc | Chain::Bch => 10_000,
      Chain::Doge => 100_000_000,
      Chain::Eth | Chain::Avax | Chain::Gaia | Chain::Bsc | Chain::Base => 1,
      Chain::Xrp => 100_000_000,
      Chain::Native => 0,
    }
  }

  /// UTXO chains carry the memo in an OP_RETURN output.
  pub fn max_memo_length(&self) -> usize {
    if self.is_utxo() {
      params::MAX_OP_RETURN_DATA_SIZE
    } else {
      params::MAX_MEMO_SIZE
    }
  }

  /// Native decimals of the gas asset on its own chain.
  pub fn gas_asset_decimals(&self) -> u8 {
    match self {
      Chain::Gaia | Chain::Xrp => 6,
      _ => 8,
    }
  }

  pub(crate) fn address_prefixes(&self) -> &'static [&'static [u8]] {
    match self {
      Chain::Native => &[b"nat1"],
      Chain::Btc => &[b"bc1", b"tb1", b"bcrt1", b"1", b"3"],
      Chain::Eth | Chain::Bsc | Chain::Avax | Chain::Base => &[b"0x"],
      Chain::Doge => &[b"D", b"A", b"9"],
      Chain::Ltc => &[b"ltc1", b"rltc1", b"L", b"M"],
      Chain::Bch => &[b"bitcoincash:", b"q", b"p"],
      Chain::Gaia => &[b"cosmos1"],
      Chain::Xrp => &[b"r"],
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn ticker_lookup_is_case_insensitive() {
    assert_eq!(Chain::from_ticker(b"btc"), Some(Chain::Btc));
    assert_eq!(Chain::from_ticker(b"GAIA"), Some(Chain::Gaia));
    assert_eq!(Chain::from_ticker(b"SOL"), None);
  }

  #[test]
  fn chain_families() {
    assert!(Chain::Base.is_evm());
    assert!(!Chain::Btc.is_evm());
    assert!(Chain::Doge.is_utxo());
    assert_eq!(Chain::Doge.max_memo_length(), 80);
    assert_eq!(Chain::Eth.max_memo_length(), 250);
  }

  #[test]
  fn gas_assets() {
    assert_eq!(Chain::Bsc.gas_asset().symbol, b"BNB".to_vec());
    assert_eq!(Chain::Base.gas_asset().chain, Chain::Base);
    assert!(Chain::Native.gas_asset().is_native());
    assert_eq!(Chain::Gaia.gas_asset_decimals(), 6);
  }
}
