extern crate alloc;

use crate::*;
use polkadot_sdk::frame_benchmarking::v2::*;
use polkadot_sdk::frame_system::RawOrigin;
use primitives::Chain;

#[benchmarks]
mod benches {
  use super::*;

  #[benchmark]
  fn set_network_fee() {
    #[extrinsic_call]
    set_network_fee(RawOrigin::Root, Chain::Btc, 250, 25);

    assert!(NetworkFees::<T>::get(Chain::Btc).is_some());
  }

  #[benchmark]
  fn set_native_outbound_fee() {
    let new_fee: u128 = 3_000_000;

    #[extrinsic_call]
    set_native_outbound_fee(RawOrigin::Root, new_fee);

    assert_eq!(NativeOutboundFee::<T>::get(), new_fee);
  }

  #[cfg(test)]
  use crate::mock::{Test, new_test_ext};
  #[cfg(test)]
  impl_benchmark_test_suite!(Pallet, new_test_ext(), Test);
}
