extern crate alloc;

use crate as pallet_gas_manager;
use polkadot_sdk::frame_support::{
  construct_runtime, derive_impl,
  traits::{ConstU128, Everything},
};
use polkadot_sdk::frame_system;
use polkadot_sdk::sp_runtime::{
  BuildStorage, DispatchResult,
  testing::H256,
  traits::{BlakeTwo256, IdentityLookup},
};
use primitives::{Asset, Chain, Pool, params};
use std::cell::RefCell;
use std::collections::BTreeMap;

thread_local! {
    pub static POOLS: RefCell<BTreeMap<Asset, Pool>> = const { RefCell::new(BTreeMap::new()) };
}

/// Seed a pool with the given balances. Decimals default to 8.
pub fn set_pool(asset: Asset, balance_asset: u128, balance_native: u128) {
  let pool = Pool {
    balance_asset,
    balance_native,
    lp_units: balance_native,
    decimals: 8,
    ..Pool::new(asset.clone())
  };
  POOLS.with(|p| p.borrow_mut().insert(asset, pool));
}

pub struct MockPools;
impl pallet_gas_manager::PoolLedger for MockPools {
  fn get(asset: &Asset) -> Option<Pool> {
    POOLS.with(|p| p.borrow().get(asset).cloned())
  }

  fn set(pool: Pool) -> DispatchResult {
    POOLS.with(|p| p.borrow_mut().insert(pool.asset.clone(), pool));
    Ok(())
  }
}

type Block = frame_system::mocking::MockBlock<Test>;

construct_runtime!(
  pub struct Test {
    System: frame_system,
    GasManager: pallet_gas_manager,
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

pub fn btc() -> Asset {
  Asset::new(Chain::Btc, b"BTC")
}

pub fn eth() -> Asset {
  Asset::new(Chain::Eth, b"ETH")
}

pub fn usdc() -> Asset {
  Asset::new(Chain::Eth, b"USDC-0XA0B86991")
}

pub fn new_test_ext() -> polkadot_sdk::sp_io::TestExternalities {
  POOLS.with(|p| p.borrow_mut().clear());
  let mut t = frame_system::GenesisConfig::<Test>::default()
    .build_storage()
    .unwrap();
  pallet_gas_manager::GenesisConfig::<Test> {
    // BTC: 250 vbytes at 10 sat/vbyte. ETH: 80k gas at 30 (1e8 units).
    network_fees: alloc::vec![(Chain::Btc, 250, 10), (Chain::Eth, 80_000, 30)],
    _marker: Default::default(),
  }
  .assimilate_storage(&mut t)
  .unwrap();
  let mut ext = polkadot_sdk::sp_io::TestExternalities::new(t);
  ext.execute_with(|| System::set_block_number(1));
  ext
}
