//! Congestion-based outbound delay.

use crate::{
  Config, Pallet, TxOutQueue,
  types::{SchedulerParam, TxOutItem},
};
use pallet_gas_manager::PoolLedger;
use primitives::{Height, Memo, params::ONE};

impl<T: Config> Pallet<T> {
  /// Native value of an outbound at current pool prices. Zero without a pool.
  pub fn native_value(item: &TxOutItem) -> u128 {
    let coin = &item.coin;
    if coin.asset.is_native() {
      return coin.amount;
    }
    match T::Pools::get(&coin.asset.layer1()) {
      Some(pool) if !pool.is_empty() => pool.asset_value_in_native(coin.amount),
      _ => 0,
    }
  }

  /// Native value queued at `height`, and the clout already spent on it.
  pub fn tx_out_value(height: Height) -> (u128, u128) {
    TxOutQueue::<T>::get(height)
      .iter()
      .fold((0u128, 0u128), |(value, clout), item| {
        (
          value.saturating_add(Self::native_value(item)),
          clout.saturating_add(item.clout_spent.unwrap_or_default()),
        )
      })
  }

  /// Height to release `item` at, and the clout spent to bring it forward.
  ///
  /// The delay grows with the item's native value and shrinks as the volume
  /// already scheduled grows, so large bursts drain at the volume threshold
  /// per block instead of stalling.
  pub fn calc_tx_out_height(item: &TxOutItem) -> (Height, u128) {
    let now = Self::now();
    if !Memo::parse(&item.memo).is_ok_and(|m| m.is_outbound()) {
      return (now, 0);
    }

    let threshold = Self::param(SchedulerParam::MinTxOutVolumeThreshold);
    let delay_rate = Self::param(SchedulerParam::TxOutDelayRate);
    let delay_max = Self::param(SchedulerParam::TxOutDelayMax).max(0) as u64;
    let max_offset = Self::param(SchedulerParam::MaxTxOutOffset);
    if threshold <= 0 || delay_rate <= 0 || max_offset <= 0 {
      return (now, 0);
    }
    let threshold = threshold as u128;
    let max_offset = max_offset as u64;

    let (value, clout_applied) = Self::calc_clout(Self::native_value(item), item);
    if value == 0 {
      return (now, clout_applied);
    }

    let mut sum = value;
    let mut scheduled_clout = 0u128;
    for height in now + 1..=now.saturating_add(delay_max) {
      let (queued, clout) = Self::tx_out_value(height);
      // past the max offset an empty height means the rest is empty too
      if height > now + max_offset && queued == 0 {
        break;
      }
      sum = sum.saturating_add(queued);
      scheduled_clout = scheduled_clout.saturating_add(clout);
    }

    let reduction = ONE.saturating_mul(sum.saturating_sub(scheduled_clout)) / threshold;
    let rate = (delay_rate as u128).saturating_sub(reduction).max(1);
    let min_blocks = (value / rate).min(u128::from(max_offset)) as u64;

    let mut target = now + min_blocks;
    for _ in 0..delay_max {
      let (queued, _) = Self::tx_out_value(target);
      if queued == 0 || queued.saturating_add(value) <= threshold {
        break;
      }
      target += 1;
    }
    (target, clout_applied)
  }
}
