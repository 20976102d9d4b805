//! Share arithmetic used by fee disbursement and pool conversions.
//!
//! All results round to the nearest integer, matching the decimal rounding the
//! ledger has always used for pool math.

use sp_arithmetic::{Rounding, helpers_128bit::multiply_by_rational_with_rounding};

/// `part / total * allocation`, rounded to nearest. Zero when any input is zero.
pub fn get_uncapped_share(part: u128, total: u128, allocation: u128) -> u128 {
  if part == 0 || total == 0 || allocation == 0 {
    return 0;
  }
  multiply_by_rational_with_rounding(part, allocation, total, Rounding::NearestPrefUp)
    .unwrap_or(u128::MAX)
}

/// Like [`get_uncapped_share`] but never hands out more than `allocation`.
pub fn get_safe_share(part: u128, total: u128, allocation: u128) -> u128 {
  get_uncapped_share(part.min(total), total, allocation)
}

/// `part / total * allocation`, rounded down, with `part` capped at `total`.
pub fn get_floor_share(part: u128, total: u128, allocation: u128) -> u128 {
  if part == 0 || total == 0 || allocation == 0 {
    return 0;
  }
  // at most `allocation` once `part <= total`, so the product cannot overflow
  multiply_by_rational_with_rounding(part.min(total), allocation, total, Rounding::Down)
    .unwrap_or(allocation)
}

/// Drops the digits below `decimals` for assets with fewer than eight decimals.
pub fn round_to_decimal(amount: u128, decimals: u8) -> u128 {
  if decimals == 0 || decimals >= 8 {
    return amount;
  }
  let adjust = 10u128.pow(u32::from(8 - decimals));
  amount / adjust * adjust
}
