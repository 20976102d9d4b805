extern crate alloc;

use crate as pallet_txout_scheduler;
use crate::{
  AffiliateLedger, InboundTx, InboundVoter, LedgerModule, ModuleBank, NativeInbound,
  ObservationVoters, SchedulerVersion, Vault, VaultRegistry, VaultSecurity, VaultStatus,
};
use alloc::vec::Vec;
use codec::{Decode, Encode};
use pallet_gas_manager::PoolLedger;
use polkadot_sdk::frame_support::{
  construct_runtime, derive_impl, parameter_types,
  storage::unhashed,
  traits::{ConstI64, ConstU128, Everything},
};
use polkadot_sdk::frame_system;
use polkadot_sdk::sp_runtime::{
  BuildStorage, DispatchError, DispatchResult,
  testing::H256,
  traits::{BlakeTwo256, IdentityLookup},
};
use primitives::{
  Address, Affiliate, Asset, Chain, Coin, Height, Pool, PubKey, TxId,
  params::{self, ONE},
};
use std::cell::RefCell;

// Collaborator state that the scheduler writes lives in storage, so a rolled
// back request also rolls back the mocks.
fn key(prefix: &[u8], id: impl Encode) -> Vec<u8> {
  (prefix, id).encode()
}

fn read<V: Decode + Default>(k: &[u8]) -> V {
  unhashed::get(k).unwrap_or_default()
}

pub struct MockPools;
impl PoolLedger for MockPools {
  fn get(asset: &Asset) -> Option<Pool> {
    unhashed::get(&key(b"mock/pool", asset))
  }

  fn set(pool: Pool) -> DispatchResult {
    unhashed::put(&key(b"mock/pool", &pool.asset), &pool);
    Ok(())
  }
}

/// Seed a pool with decimals 8 and one unit per native.
pub fn set_pool(asset: Asset, balance_asset: u128, balance_native: u128) {
  let pool = Pool {
    balance_asset,
    balance_native,
    lp_units: balance_native,
    decimals: 8,
    ..Pool::new(asset)
  };
  let _ = MockPools::set(pool);
}

pub fn pool(asset: &Asset) -> Pool {
  MockPools::get(asset).unwrap_or_default()
}

pub struct MockVoters;
impl ObservationVoters for MockVoters {
  fn get(tx_id: &TxId) -> Option<InboundVoter> {
    unhashed::get(&key(b"mock/voter", tx_id))
  }

  fn set(voter: InboundVoter) {
    unhashed::put(&key(b"mock/voter", voter.tx_id), &voter);
  }
}

pub fn voter(tx_id: TxId) -> InboundVoter {
  MockVoters::get(&tx_id).unwrap_or_default()
}

/// Register an observed inbound from `from` carrying `memo`.
pub fn observe_inbound(tx_id: TxId, from: &str, memo: &[u8]) {
  MockVoters::set(InboundVoter {
    tx_id,
    tx: Some(InboundTx {
      id: tx_id,
      from_address: Address::from(from),
      memo: memo.to_vec(),
      ..Default::default()
    }),
    ..InboundVoter::new(tx_id)
  });
}

pub struct MockBank;
impl MockBank {
  fn module_owner(module: LedgerModule) -> Address {
    Address([b"nat1".as_slice(), module.id().as_slice()].concat())
  }

  fn debit(owner: &Address, coin: &Coin) -> DispatchResult {
    let k = key(b"mock/balance", (owner, &coin.asset));
    let balance: u128 = read(&k);
    let left = balance
      .checked_sub(coin.amount)
      .ok_or(DispatchError::Other("insufficient module balance"))?;
    unhashed::put(&k, &left);
    Ok(())
  }

  fn credit(owner: &Address, coin: &Coin) {
    let k = key(b"mock/balance", (owner, &coin.asset));
    let balance: u128 = read(&k);
    unhashed::put(&k, &balance.saturating_add(coin.amount));
  }
}

impl ModuleBank for MockBank {
  fn module_address(module: LedgerModule) -> Address {
    Self::module_owner(module)
  }

  fn send_module_to_module(from: LedgerModule, to: LedgerModule, coin: &Coin) -> DispatchResult {
    Self::debit(&Self::module_owner(from), coin)?;
    Self::credit(&Self::module_owner(to), coin);
    Ok(())
  }

  fn send_module_to_account(from: LedgerModule, to: &Address, coin: &Coin) -> DispatchResult {
    Self::debit(&Self::module_owner(from), coin)?;
    Self::credit(to, coin);
    Ok(())
  }

  fn mint_to_module(module: LedgerModule, coin: &Coin) -> DispatchResult {
    Self::credit(&Self::module_owner(module), coin);
    Ok(())
  }

  fn burn_from_module(module: LedgerModule, coin: &Coin) -> DispatchResult {
    Self::debit(&Self::module_owner(module), coin)
  }
}

pub fn module_balance(module: LedgerModule, asset: &Asset) -> u128 {
  balance(&MockBank::module_owner(module), asset)
}

pub fn balance(owner: &Address, asset: &Asset) -> u128 {
  read(&key(b"mock/balance", (owner, asset)))
}

pub fn fund_module(module: LedgerModule, coin: Coin) {
  MockBank::credit(&MockBank::module_owner(module), &coin);
}

pub struct MockAffiliates;
impl AffiliateLedger for MockAffiliates {
  fn credit(in_hash: &TxId, affiliate: &Affiliate, coin: &Coin) -> DispatchResult {
    let mut credits: Vec<(TxId, Address, Coin)> = read(b"mock/affiliates");
    credits.push((*in_hash, affiliate.address.clone(), coin.clone()));
    unhashed::put(b"mock/affiliates", &credits);
    Ok(())
  }
}

pub fn affiliate_credits() -> Vec<(TxId, Address, Coin)> {
  read(b"mock/affiliates")
}

/// What the native-ledger handler was asked to do.
#[derive(Clone, Debug, Decode, Encode, Eq, PartialEq)]
pub enum NativeEffect {
  Trade(Asset, u128, Address),
  Secured(Asset, u128, Address),
  Internal(InboundTx, PubKey),
}

pub struct MockNativeInbound;
impl MockNativeInbound {
  fn record(effect: NativeEffect) {
    let mut effects: Vec<NativeEffect> = read(b"mock/native");
    effects.push(effect);
    unhashed::put(b"mock/native", &effects);
  }
}

impl NativeInbound for MockNativeInbound {
  fn deposit_trade_asset(asset: &Asset, amount: u128, owner: &Address, _: &TxId) -> DispatchResult {
    Self::record(NativeEffect::Trade(asset.clone(), amount, owner.clone()));
    Ok(())
  }

  fn deposit_secured_asset(
    asset: &Asset,
    amount: u128,
    owner: &Address,
    _: &TxId,
  ) -> DispatchResult {
    Self::record(NativeEffect::Secured(asset.clone(), amount, owner.clone()));
    Ok(())
  }

  fn handle_internal(tx: InboundTx, observed_by: &PubKey, _: Height) -> DispatchResult {
    Self::record(NativeEffect::Internal(tx, observed_by.clone()));
    Ok(())
  }
}

pub fn native_effects() -> Vec<NativeEffect> {
  read(b"mock/native")
}

thread_local! {
    pub static VAULTS: RefCell<Vec<Vault>> = const { RefCell::new(Vec::new()) };
}

pub struct MockVaults;
impl VaultRegistry for MockVaults {
  fn vaults_by_status(status: VaultStatus) -> Vec<Vault> {
    VAULTS.with(|v| {
      v.borrow()
        .iter()
        .filter(|vault| vault.status == status)
        .cloned()
        .collect()
    })
  }

  fn get(pub_key: &PubKey) -> Option<Vault> {
    VAULTS.with(|v| v.borrow().iter().find(|vault| vault.pub_key == *pub_key).cloned())
  }
}

pub fn add_vault(vault: Vault) {
  VAULTS.with(|v| v.borrow_mut().push(vault));
}

/// Smaller signing sets are less secure and go first.
pub struct MockSecurity;
impl VaultSecurity for MockSecurity {
  fn sort_by_security(mut vaults: Vec<Vault>, _: i64) -> Vec<Vault> {
    vaults.sort_by_key(|v| v.members.len());
    vaults
  }
}

parameter_types! {
  pub static Rules: SchedulerVersion = SchedulerVersion::V2;
}

type Block = frame_system::mocking::MockBlock<Test>;

construct_runtime!(
  pub struct Test {
    System: frame_system,
    GasManager: pallet_gas_manager,
    TxOutScheduler: pallet_txout_scheduler,
  }
);

#[derive_impl(frame_system::config_preludes::TestDefaultConfig)]
impl frame_system::Config for Test {
  type BaseCallFilter = Everything;
  type Block = Block;
  type AccountId = u64;
  type Lookup = IdentityLookup<Self::AccountId>;
  type Hash = H256;
  type Hashing = BlakeTwo256;
}

impl pallet_gas_manager::Config for Test {
  type Pools = MockPools;
  type AdminOrigin = frame_system::EnsureRoot<u64>;
  type DefaultNativeOutboundFee = ConstU128<{ params::OUTBOUND_TRANSACTION_FEE }>;
  type TargetOutboundFeeSurplus = ConstU128<{ params::TARGET_OUTBOUND_FEE_SURPLUS }>;
  type MaxOutboundFeeMultiplierBps = ConstU128<{ params::MAX_OUTBOUND_FEE_MULTIPLIER_BPS }>;
  type MinOutboundFeeMultiplierBps = ConstU128<{ params::MIN_OUTBOUND_FEE_MULTIPLIER_BPS }>;
  type MinimumL1OutboundFeeNative = ConstU128<0>;
  type WeightInfo = ();
}

impl pallet_txout_scheduler::Config for Test {
  type GasOracle = GasManager;
  type Pools = MockPools;
  type FeeLedger = GasManager;
  type Vaults = MockVaults;
  type Security = MockSecurity;
  type Voters = MockVoters;
  type Bank = MockBank;
  type Affiliates = MockAffiliates;
  type NativeInbound = MockNativeInbound;
  type AdminOrigin = frame_system::EnsureRoot<u64>;
  type Version = Rules;
  type SigningTransactionPeriod = ConstI64<{ params::SIGNING_TRANSACTION_PERIOD }>;
  type MinTxOutVolumeThreshold = ConstI64<{ params::MIN_TX_OUT_VOLUME_THRESHOLD }>;
  type TxOutDelayRate = ConstI64<{ params::TX_OUT_DELAY_RATE }>;
  type TxOutDelayMax = ConstI64<{ params::TX_OUT_DELAY_MAX }>;
  type MaxTxOutOffset = ConstI64<{ params::MAX_TX_OUT_OFFSET }>;
  type CloutReset = ConstI64<{ params::CLOUT_RESET }>;
  type CloutLimit = ConstI64<{ params::CLOUT_LIMIT }>;
  type WeightInfo = ();
}

pub fn doge() -> Asset {
  Asset::new(Chain::Doge, b"DOGE")
}

pub fn btc() -> Asset {
  Asset::new(Chain::Btc, b"BTC")
}

pub fn eth() -> Asset {
  Asset::new(Chain::Eth, b"ETH")
}

pub fn tx_id(n: u8) -> TxId {
  TxId([n; 32])
}

pub const DOGE_USER: &str = "DUserAddress1111111111111111111111";
pub const BTC_USER: &str = "bc1quser0000000000000000000000000000";
pub const ETH_USER: &str = "0x1111111111111111111111111111111111111111";
pub const NATIVE_USER: &str = "nat1user";

/// A vault holding `coins`, with an address on every chain it holds coins of.
pub fn vault(name: &str, status: VaultStatus, members: usize, coins: Vec<Coin>) -> Vault {
  let mut addresses = Vec::new();
  for coin in coins.iter() {
    let chain = coin.asset.chain;
    if addresses.iter().any(|(c, _)| *c == chain) {
      continue;
    }
    let address = match chain {
      Chain::Doge => alloc::format!("D{}", name),
      Chain::Btc => alloc::format!("bc1q{}", name),
      Chain::Eth => alloc::format!("0x{:0>40}", name),
      _ => alloc::format!("nat1{}", name),
    };
    addresses.push((chain, Address::from(address.as_str())));
  }
  Vault {
    pub_key: PubKey::from(name),
    status,
    coins,
    addresses,
    members: (0..members as u8).map(|m| PubKey(alloc::vec![m])).collect(),
    frozen: Vec::new(),
  }
}

pub fn new_test_ext() -> polkadot_sdk::sp_io::TestExternalities {
  VAULTS.with(|v| v.borrow_mut().clear());
  Rules::set(SchedulerVersion::V2);
  let mut t = frame_system::GenesisConfig::<Test>::default()
    .build_storage()
    .unwrap();
  pallet_gas_manager::GenesisConfig::<Test> {
    // DOGE: 250 bytes at 100, BTC: 250 vbytes at 10, ETH: 80k gas at 30
    network_fees: alloc::vec![
      (Chain::Doge, 250, 100),
      (Chain::Btc, 250, 10),
      (Chain::Eth, 80_000, 30),
    ],
    _marker: Default::default(),
  }
  .assimilate_storage(&mut t)
  .unwrap();
  let mut ext = polkadot_sdk::sp_io::TestExternalities::new(t);
  ext.execute_with(|| {
    System::set_block_number(1);
    fund_module(LedgerModule::Asgard, Coin::new(Asset::native(), 1_000_000 * ONE));
  });
  ext
}
