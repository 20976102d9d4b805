use alloc::vec::Vec;
use codec::{Decode, DecodeWithMemTracking, Encode, MaxEncodedLen};
use primitives::{Address, Asset, Chain, Coin, Height, PubKey, TxId, modules};
use scale_info::TypeInfo;

/// Internal ledger that funds an outbound. Fees and mints are booked against it.
#[derive(
  Clone, Copy, Debug, Decode, DecodeWithMemTracking, Default, Encode, Eq, PartialEq, TypeInfo,
)]
pub enum LedgerModule {
  /// Shared custody of every pool and vault balance.
  #[default]
  Asgard,
  Reserve,
  /// The protocol's own module; native outbounds from it are minted first.
  Protocol,
  AffiliateCollector,
}

impl LedgerModule {
  pub fn id(&self) -> &'static [u8; 8] {
    match self {
      LedgerModule::Asgard => modules::ASGARD,
      LedgerModule::Reserve => modules::RESERVE,
      LedgerModule::Protocol => modules::PROTOCOL,
      LedgerModule::AffiliateCollector => modules::AFFILIATE_COLLECTOR,
    }
  }
}

/// One payment the protocol owes to the outside world.
#[derive(
  Clone, Debug, Decode, DecodeWithMemTracking, Default, Encode, Eq, PartialEq, TypeInfo,
)]
pub struct TxOutItem {
  pub chain: Chain,
  pub to_address: Address,
  /// Paying vault. Left unset for the scheduler to pick.
  pub vault_pub_key: Option<PubKey>,
  pub coin: Coin,
  pub memo: Vec<u8>,
  /// Gas allowance in the chain's gas asset, filled in when unset.
  pub max_gas: Option<Coin>,
  pub gas_rate: u64,
  pub in_hash: TxId,
  /// Set once the outbound has been observed on the destination chain.
  pub out_hash: Option<TxId>,
  pub module_name: Option<LedgerModule>,
  pub aggregator: Option<Vec<u8>>,
  pub aggregator_target_asset: Option<Vec<u8>>,
  pub aggregator_target_limit: Option<u128>,
  pub clout_spent: Option<u128>,
}

impl TxOutItem {
  pub fn new(chain: Chain, to_address: Address, coin: Coin, in_hash: TxId) -> Self {
    Self {
      chain,
      to_address,
      coin,
      in_hash,
      ..Default::default()
    }
  }

  pub fn module(&self) -> LedgerModule {
    self.module_name.unwrap_or_default()
  }

  pub fn has_aggregator(&self) -> bool {
    self.aggregator.as_ref().is_some_and(|a| !a.is_empty())
      || self.aggregator_target_asset.as_ref().is_some_and(|a| !a.is_empty())
      || self.aggregator_target_limit.is_some_and(|l| l > 0)
  }

  pub fn is_fulfilled(&self) -> bool {
    self.out_hash.as_ref().is_some_and(|h| !h.is_blank())
  }

  /// Whether `other` describes the same outbound, ignoring bookkeeping fields
  /// (out hash, clout, aggregator defaults) the queue fills in.
  pub fn same_outbound(&self, other: &TxOutItem) -> bool {
    self.chain == other.chain
      && self.to_address == other.to_address
      && self.vault_pub_key == other.vault_pub_key
      && self.coin == other.coin
      && self.memo == other.memo
      && self.in_hash == other.in_hash
      && self.max_gas == other.max_gas
      && self.gas_rate == other.gas_rate
  }

  pub fn max_gas_amount(&self) -> u128 {
    self.max_gas.as_ref().map(|g| g.amount).unwrap_or_default()
  }
}

#[derive(
  Clone, Copy, Debug, Decode, DecodeWithMemTracking, Default, Encode, Eq, PartialEq, TypeInfo,
)]
pub enum VaultStatus {
  #[default]
  Active,
  Retiring,
  Inactive,
}

#[derive(
  Clone, Debug, Decode, DecodeWithMemTracking, Default, Encode, Eq, PartialEq, TypeInfo,
)]
pub struct Vault {
  pub pub_key: PubKey,
  pub status: VaultStatus,
  pub coins: Vec<Coin>,
  /// The vault's own address on every chain it serves.
  pub addresses: Vec<(Chain, Address)>,
  pub members: Vec<PubKey>,
  /// Chains on which the vault must not sign new outbounds.
  pub frozen: Vec<Chain>,
}

impl Vault {
  pub fn balance_of(&self, asset: &Asset) -> u128 {
    self
      .coins
      .iter()
      .filter(|c| c.asset == *asset)
      .map(|c| c.amount)
      .sum()
  }

  pub fn sub_funds(&mut self, asset: &Asset, amount: u128) {
    if let Some(coin) = self.coins.iter_mut().find(|c| c.asset == *asset) {
      coin.amount = coin.amount.saturating_sub(amount);
    }
  }

  pub fn address(&self, chain: Chain) -> Option<&Address> {
    self
      .addresses
      .iter()
      .find(|(c, _)| *c == chain)
      .map(|(_, a)| a)
  }

  pub fn is_frozen(&self, chain: Chain) -> bool {
    self.frozen.contains(&chain)
  }
}

/// Congestion credit of one address.
#[derive(
  Clone, Debug, Decode, DecodeWithMemTracking, Default, Encode, Eq, PartialEq, TypeInfo,
)]
pub struct CloutRecord {
  pub address: Address,
  pub score: u128,
  pub spent: u128,
  pub last_spent_height: Height,
  pub last_reclaim_height: Height,
}

impl CloutRecord {
  pub fn new(address: Address) -> Self {
    Self {
      address,
      ..Default::default()
    }
  }

  /// `min(score, limit) - spent`, floored at zero.
  pub fn available(&self, limit: u128) -> u128 {
    self.score.min(limit).saturating_sub(self.spent)
  }

  /// Forget spent clout once `reset` blocks have passed since the last spend.
  pub fn restore(&mut self, now: Height, reset: i64) {
    let reset = u64::try_from(reset).unwrap_or_default();
    if self.spent > 0 && now.saturating_sub(self.last_spent_height) >= reset {
      self.spent = 0;
      self.last_reclaim_height = now;
    }
  }
}

/// An inbound transfer as agreed by the observers.
#[derive(
  Clone, Debug, Decode, DecodeWithMemTracking, Default, Encode, Eq, PartialEq, TypeInfo,
)]
pub struct InboundTx {
  pub id: TxId,
  pub chain: Chain,
  pub from_address: Address,
  pub to_address: Address,
  pub coins: Vec<Coin>,
  pub memo: Vec<u8>,
}

/// Consensus record of an inbound, with the outbounds it caused.
#[derive(
  Clone, Debug, Decode, DecodeWithMemTracking, Default, Encode, Eq, PartialEq, TypeInfo,
)]
pub struct InboundVoter {
  pub tx_id: TxId,
  pub tx: Option<InboundTx>,
  /// Height at which consensus was reached.
  pub height: Height,
  pub finalised_height: Height,
  /// Furthest height any outbound of this inbound is scheduled at.
  pub outbound_height: Height,
  pub actions: Vec<TxOutItem>,
}

impl InboundVoter {
  pub fn new(tx_id: TxId) -> Self {
    Self {
      tx_id,
      ..Default::default()
    }
  }

  pub fn memo(&self) -> &[u8] {
    self.tx.as_ref().map(|tx| tx.memo.as_slice()).unwrap_or_default()
  }
}

/// Governance-tunable scheduler parameters.
#[derive(
  Clone,
  Copy,
  Debug,
  Decode,
  DecodeWithMemTracking,
  Encode,
  Eq,
  MaxEncodedLen,
  PartialEq,
  TypeInfo,
)]
pub enum SchedulerParam {
  MinTxOutVolumeThreshold,
  TxOutDelayRate,
  TxOutDelayMax,
  MaxTxOutOffset,
  CloutLimit,
  CloutReset,
  SigningTransactionPeriod,
}

/// Rules that changed between protocol versions.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum SchedulerVersion {
  /// Vault estimate rounds down.
  V1,
  /// Vault estimate rounds up.
  #[default]
  V2,
}

impl SchedulerVersion {
  /// How many vaults holding `balance` it would take to pay `amount`.
  pub fn vaults_necessary(&self, amount: u128, balance: u128) -> u128 {
    if balance == 0 {
      return u128::MAX;
    }
    match self {
      SchedulerVersion::V1 => amount / balance,
      SchedulerVersion::V2 => amount.div_ceil(balance),
    }
  }
}
