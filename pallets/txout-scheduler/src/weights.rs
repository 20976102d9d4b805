#![cfg_attr(rustfmt, rustfmt_skip)]
#![allow(unused_parens)]
#![allow(unused_imports)]
#![allow(missing_docs)]

use core::marker::PhantomData;
use polkadot_sdk::frame_support::{
  traits::Get,
  weights::{constants::RocksDbWeight, Weight},
};

pub trait WeightInfo {
  fn set_param() -> Weight;
  fn clear_outbound_queue() -> Weight;
  /// Block maintenance over `n` queued items.
  fn refresh_outbound_gas(n: u32) -> Weight;
}

pub struct SubstrateWeight<T>(PhantomData<T>);
impl<T: polkadot_sdk::frame_system::Config> WeightInfo for SubstrateWeight<T> {
  fn set_param() -> Weight {
    Weight::from_parts(11_000_000, 1400)
      .saturating_add(T::DbWeight::get().reads(1))
      .saturating_add(T::DbWeight::get().writes(1))
  }

  fn clear_outbound_queue() -> Weight {
    Weight::from_parts(9_000_000, 1200)
      .saturating_add(T::DbWeight::get().writes(1))
  }

  fn refresh_outbound_gas(n: u32) -> Weight {
    Weight::from_parts(6_000_000, 2000)
      .saturating_add(Weight::from_parts(14_000_000, 600).saturating_mul(n.into()))
      .saturating_add(T::DbWeight::get().reads(1))
      .saturating_add(T::DbWeight::get().reads((3_u64).saturating_mul(n.into())))
      .saturating_add(T::DbWeight::get().writes(1))
      .saturating_add(T::DbWeight::get().writes((1_u64).saturating_mul(n.into())))
  }
}

impl WeightInfo for () {
  fn set_param() -> Weight {
    Weight::from_parts(11_000_000, 1400)
      .saturating_add(RocksDbWeight::get().reads(1))
      .saturating_add(RocksDbWeight::get().writes(1))
  }

  fn clear_outbound_queue() -> Weight {
    Weight::from_parts(9_000_000, 1200)
      .saturating_add(RocksDbWeight::get().writes(1))
  }

  fn refresh_outbound_gas(n: u32) -> Weight {
    Weight::from_parts(6_000_000, 2000)
      .saturating_add(Weight::from_parts(14_000_000, 600).saturating_mul(n.into()))
      .saturating_add(RocksDbWeight::get().reads(1))
      .saturating_add(RocksDbWeight::get().reads((3_u64).saturating_mul(n.into())))
      .saturating_add(RocksDbWeight::get().writes(1))
      .saturating_add(RocksDbWeight::get().writes((1_u64).saturating_mul(n.into())))
  }
}
