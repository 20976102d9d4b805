extern crate alloc;

use crate::*;
use alloc::vec::Vec;
use polkadot_sdk::frame_benchmarking::v2::*;
use polkadot_sdk::frame_system::RawOrigin;
use primitives::{Address, Chain, Coin, Height, TxId};

fn queued_items(n: u32) -> Vec<TxOutItem> {
  (0..n)
    .map(|i| {
      let mut in_hash = [0u8; 32];
      in_hash[..4].copy_from_slice(&i.to_le_bytes());
      TxOutItem::new(
        Chain::Btc,
        Address::from("bc1qbenchmarkrecipient"),
        Coin::new(Chain::Btc.gas_asset(), 100_000 + u128::from(i)),
        TxId(in_hash),
      )
    })
    .collect()
}

#[benchmarks]
mod benches {
  use super::*;

  #[benchmark]
  fn set_param() {
    #[extrinsic_call]
    set_param(RawOrigin::Root, SchedulerParam::TxOutDelayRate, 10);

    assert_eq!(ParamOverrides::<T>::get(SchedulerParam::TxOutDelayRate), Some(10));
  }

  #[benchmark]
  fn clear_outbound_queue() {
    let height: Height = 10;
    TxOutQueue::<T>::insert(height, queued_items(10));

    #[extrinsic_call]
    clear_outbound_queue(RawOrigin::Root, height);

    assert!(TxOutQueue::<T>::get(height).is_empty());
  }

  #[benchmark]
  fn refresh_outbound_gas(n: Linear<1, 100>) {
    let height: Height = 10;
    TxOutQueue::<T>::insert(height, queued_items(n));

    #[block]
    {
      Pallet::<T>::refresh_outbound_gas(height);
    }

    assert_eq!(TxOutQueue::<T>::get(height).len(), n as usize);
  }

  #[cfg(test)]
  use crate::mock::{Test, new_test_ext};
  #[cfg(test)]
  impl_benchmark_test_suite!(Pallet, new_test_ext(), Test);
}
