//! Swapper clout: credit that lets known counterparties skip part of the
//! congestion delay.

use crate::{
  Config, LOG_TARGET, Pallet, SwapperClout,
  adapters::ObservationVoters,
  types::{CloutRecord, SchedulerParam, TxOutItem},
};
use primitives::{Address, Height, math::get_floor_share};

impl<T: Config> Pallet<T> {
  pub fn clout_of(address: &Address) -> CloutRecord {
    SwapperClout::<T>::get(address).unwrap_or_else(|| CloutRecord::new(address.clone()))
  }

  /// Earned clout, shared half to the sender and half to the destination.
  pub fn accrue_clout(from: &Address, to: &Address, score: u128) {
    let half = score / 2;
    for (address, amount) in [(from, half), (to, score - half)] {
      if address.is_empty() || amount == 0 {
        continue;
      }
      let mut record = Self::clout_of(address);
      record.score = record.score.saturating_add(amount);
      SwapperClout::<T>::insert(address, record);
    }
  }

  /// Spend the clout of the inbound sender and the outbound recipient against
  /// `native_value`. Returns the value still subject to delay and the clout
  /// applied.
  pub(crate) fn calc_clout(native_value: u128, item: &TxOutItem) -> (u128, u128) {
    if item.has_aggregator() {
      return (native_value, 0);
    }

    let now: Height = Self::now();
    let from = match T::Voters::get(&item.in_hash).and_then(|v| v.tx) {
      Some(tx) => tx.from_address,
      None => {
        log::error!(target: LOG_TARGET, "fail to get inbound for clout calculation");
        Address::default()
      },
    };
    let mut clout_in = Self::clout_of(&from);
    let mut clout_out = Self::clout_of(&item.to_address);

    let reset = Self::param(SchedulerParam::CloutReset);
    let limit = u128::try_from(Self::param(SchedulerParam::CloutLimit)).unwrap_or_default();
    clout_in.restore(now, reset);
    clout_out.restore(now, reset);

    let (clout1, clout2, remaining) = split_clout(
      limit,
      clout_in.available(limit),
      clout_out.available(limit),
      native_value,
    );
    if remaining.saturating_add(clout1).saturating_add(clout2) != native_value {
      return (native_value, 0);
    }

    if clout1 > 0 {
      clout_in.spent = clout_in.spent.saturating_add(clout1);
      clout_in.last_spent_height = now;
      SwapperClout::<T>::insert(&clout_in.address, clout_in.clone());
    }
    if clout2 > 0 {
      if clout_in.address == clout_out.address {
        // the record written above is about to be replaced
        clout_out.spent = clout_out.spent.saturating_add(clout1);
      }
      clout_out.spent = clout_out.spent.saturating_add(clout2);
      clout_out.last_spent_height = now;
      SwapperClout::<T>::insert(&clout_out.address.clone(), clout_out);
    }

    (remaining, clout1 + clout2)
  }
}

/// Split `value` between two clout balances without letting their sum exceed
/// `limit`. Returns `(from_clout1, from_clout2, uncovered)`.
pub fn split_clout(
  limit: u128,
  mut clout1: u128,
  mut clout2: u128,
  value: u128,
) -> (u128, u128, u128) {
  if clout1.saturating_add(clout2) > limit {
    let half = limit / 2;
    if clout1 > half && clout2 > half {
      clout1 = half;
      clout2 = half;
    } else if clout1 > clout2 {
      clout1 = limit.saturating_sub(clout2);
    } else if clout2 > clout1 {
      clout2 = limit.saturating_sub(clout1);
    }
  }
  if clout1.saturating_add(clout2) > limit {
    log::error!(
      target: LOG_TARGET,
      "clout {} + {} exceeds clout limit {}",
      clout1,
      clout2,
      limit
    );
    return (0, 0, value);
  }

  let total = clout1 + clout2;
  if total == 0 {
    return (0, 0, value);
  }
  let applied = total.min(value);
  let from1 = get_floor_share(clout1, total, applied);
  let from2 = applied - from1;
  (from1, from2, value - applied)
}

#[cfg(test)]
mod tests {
  use super::split_clout;

  #[test]
  fn split_prefers_proportional_shares() {
    assert_eq!(split_clout(100, 70, 20, 60), (46, 14, 0));
    assert_eq!(split_clout(100, 70, 20, 200), (70, 20, 110));
  }

  #[test]
  fn split_caps_at_limit() {
    // both above half the limit
    assert_eq!(split_clout(100, 80, 90, 1_000), (50, 50, 900));
    // larger side capped to what the smaller leaves
    assert_eq!(split_clout(100, 90, 30, 1_000), (70, 30, 900));
    assert_eq!(split_clout(100, 30, 90, 1_000), (30, 70, 900));
  }

  #[test]
  fn split_never_exceeds_limit_or_value() {
    for (limit, c1, c2, value) in [(0, 5, 5, 10), (7, 7, 7, 3), (10, 0, 0, 10), (9, 4, 6, 1)] {
      let (a, b, rest) = split_clout(limit, c1, c2, value);
      assert!(a + b <= limit);
      assert!(a <= value && b <= value);
      assert_eq!(a + b + rest, value);
    }
  }

  #[test]
  fn split_holds_near_u128_max() {
    let half = u128::MAX / 2;
    assert_eq!(split_clout(u128::MAX, half, half, u128::MAX), (half, half, 1));
    let (a, b, rest) = split_clout(u128::MAX, half, 3, u128::MAX - 7);
    assert!(a <= half && b <= 3);
    assert_eq!(a + b, half + 3);
    assert_eq!(rest, u128::MAX - 7 - half - 3);
  }
}
