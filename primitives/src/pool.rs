use crate::{assets::Asset, math::get_uncapped_share};
use codec::{Decode, DecodeWithMemTracking, Encode};
use scale_info::TypeInfo;

/// A constant-product pool pairing an external asset with the native asset.
#[derive(Clone, Debug, Decode, DecodeWithMemTracking, Default, Encode, Eq, PartialEq, TypeInfo)]
pub struct Pool {
  pub asset: Asset,
  pub balance_asset: u128,
  pub balance_native: u128,
  pub lp_units: u128,
  /// Decimals of the asset on its own chain, zero when unknown.
  pub decimals: u8,
}

impl Pool {
  pub fn new(asset: Asset) -> Self {
    Self {
      asset,
      ..Default::default()
    }
  }

  pub fn is_empty(&self) -> bool {
    self.balance_asset == 0 || self.balance_native == 0
  }

  /// Native value of `amount` at the current pool price.
  pub fn asset_value_in_native(&self, amount: u128) -> u128 {
    get_uncapped_share(amount, self.balance_asset, self.balance_native)
  }

  /// Asset value of `amount` native at the current pool price.
  pub fn native_value_in_asset(&self, amount: u128) -> u128 {
    get_uncapped_share(amount, self.balance_native, self.balance_asset)
  }

  /// Native paid out of the pool when `amount` asset is added to it, keeping
  /// the product of balances constant: `R * a / (A + a)`.
  pub fn native_disbursement_for_asset_add(&self, amount: u128) -> u128 {
    get_uncapped_share(
      amount,
      self.balance_asset.saturating_add(amount),
      self.balance_native,
    )
  }
}
