use codec::{Decode, DecodeWithMemTracking, Encode};
use polkadot_sdk::sp_runtime::{DispatchError, DispatchResult};
use scale_info::TypeInfo;
use primitives::{Asset, Chain, Coin, Pool};

/// Fee market observation for one chain, as agreed by the observers.
#[derive(
  Clone, Copy, Debug, Decode, DecodeWithMemTracking, Default, Encode, Eq, PartialEq, TypeInfo,
)]
pub struct NetworkFee {
  /// Typical outbound transaction size, in the chain's own units (vbytes, gas).
  pub transaction_size: u64,
  /// Price per unit of size, in 1e8 gas-asset units.
  pub fee_rate: u64,
}

impl NetworkFee {
  pub fn is_valid(&self) -> bool {
    self.transaction_size > 0 && self.fee_rate > 0
  }
}

/// Pool balances used for fee conversion.
pub trait PoolLedger {
  /// `None` when no pool exists for the asset.
  fn get(asset: &Asset) -> Option<Pool>;
  fn set(pool: Pool) -> DispatchResult;
}

/// Current cost of moving funds on a destination chain.
pub trait GasOracle {
  /// Upper bound on the gas an outbound on `chain` may spend, in the gas asset.
  fn max_gas(chain: Chain) -> Result<Coin, DispatchError>;
  /// Fee rate signers should use on `chain`.
  fn gas_rate(chain: Chain) -> u64;
  /// Outbound fee for `asset`, in native units when `in_native` is set,
  /// otherwise in units of `asset` itself.
  fn outbound_fee(asset: &Asset, in_native: bool) -> Result<u128, DispatchError>;
}

/// Running totals of outbound fees withheld from users versus gas actually paid.
pub trait OutboundFeeLedger {
  fn add_withheld(asset: &Asset, native_amount: u128) -> DispatchResult;
  fn add_spent(asset: &Asset, native_amount: u128) -> DispatchResult;
}
