//! Gas Manager Pallet
//!
//! Prices outbound transactions. Holds the observed network fee of every
//! destination chain, derives the max-gas allowance and gas rate signers must
//! use, and charges users an outbound fee scaled by a multiplier that shrinks as
//! the surplus of withheld over spent fees grows.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub use pallet::*;

#[cfg(test)]
pub mod mock;

#[cfg(feature = "runtime-benchmarks")]
mod benchmarking;

pub mod types;
pub mod weights;
pub use types::*;
pub use weights::WeightInfo;

pub(crate) const LOG_TARGET: &str = "runtime::gas-manager";

#[frame::pallet]
pub mod pallet {
  use super::{GasOracle, LOG_TARGET, NetworkFee, OutboundFeeLedger, PoolLedger, WeightInfo};
  use alloc::vec::Vec;
  use frame::prelude::*;
  use polkadot_sdk::sp_runtime::traits::SaturatedConversion;
  use primitives::{
    Asset, Chain, Coin,
    math::{get_safe_share, get_uncapped_share, round_to_decimal},
    params::MAX_BASIS_POINTS,
  };

  /// Multiplier returned when the configured bounds are inverted.
  const FALLBACK_MULTIPLIER_BPS: u128 = 30_000;

  #[pallet::config]
  pub trait Config: frame_system::Config<RuntimeEvent: From<Event<Self>>> {
    /// Pool balances used to convert gas-asset fees into native and asset units
    type Pools: PoolLedger;

    /// Origin allowed to post network fees and tune the native fee
    type AdminOrigin: EnsureOrigin<Self::RuntimeOrigin>;

    /// Flat native outbound fee until governance overrides it
    #[pallet::constant]
    type DefaultNativeOutboundFee: Get<u128>;

    /// Withheld-minus-spent surplus at which the multiplier reaches its minimum
    #[pallet::constant]
    type TargetOutboundFeeSurplus: Get<u128>;

    #[pallet::constant]
    type MaxOutboundFeeMultiplierBps: Get<u128>;

    #[pallet::constant]
    type MinOutboundFeeMultiplierBps: Get<u128>;

    /// Floor on any layer-1 outbound fee, in native units
    #[pallet::constant]
    type MinimumL1OutboundFeeNative: Get<u128>;

    type WeightInfo: WeightInfo;
  }

  #[pallet::pallet]
  #[pallet::without_storage_info]
  pub struct Pallet<T>(PhantomData<T>);

  /// Latest observed network fee per chain
  #[pallet::storage]
  pub type NetworkFees<T: Config> = StorageMap<_, Twox64Concat, Chain, NetworkFee, OptionQuery>;

  /// Flat fee for outbounds settled on the native ledger (can be updated by governance)
  #[pallet::storage]
  pub type NativeOutboundFee<T: Config> =
    StorageValue<_, u128, ValueQuery, T::DefaultNativeOutboundFee>;

  /// Outbound fees withheld from users, in native units, per outbound asset
  #[pallet::storage]
  pub type OutboundFeeWithheld<T: Config> =
    StorageMap<_, Blake2_128Concat, Asset, u128, ValueQuery>;

  /// Gas reimbursed to vaults, in native units, per outbound asset
  #[pallet::storage]
  pub type OutboundFeeSpent<T: Config> = StorageMap<_, Blake2_128Concat, Asset, u128, ValueQuery>;

  #[pallet::event]
  #[pallet::generate_deposit(pub(super) fn deposit_event)]
  pub enum Event<T: Config> {
    /// Network fee for a chain updated
    NetworkFeeUpdated {
      chain: Chain,
      transaction_size: u64,
      fee_rate: u64,
    },
    /// Native outbound fee updated
    NativeOutboundFeeUpdated { old_fee: u128, new_fee: u128 },
  }

  #[pallet::error]
  pub enum Error<T> {
    /// No network fee has been observed for the chain
    NetworkFeeNotFound,
    /// Transaction size and fee rate must both be non-zero
    InvalidNetworkFee,
  }

  #[pallet::call]
  impl<T: Config> Pallet<T> {
    /// Record the network fee of a chain (governance only)
    #[pallet::call_index(0)]
    #[pallet::weight(T::WeightInfo::set_network_fee())]
    pub fn set_network_fee(
      origin: OriginFor<T>,
      chain: Chain,
      transaction_size: u64,
      fee_rate: u64,
    ) -> DispatchResult {
      T::AdminOrigin::ensure_origin(origin)?;
      let fee = NetworkFee {
        transaction_size,
        fee_rate,
      };
      ensure!(fee.is_valid(), Error::<T>::InvalidNetworkFee);
      NetworkFees::<T>::insert(chain, fee);
      Self::deposit_event(Event::NetworkFeeUpdated {
        chain,
        transaction_size,
        fee_rate,
      });
      Ok(())
    }

    /// Update the flat native outbound fee (governance only)
    #[pallet::call_index(1)]
    #[pallet::weight(T::WeightInfo::set_native_outbound_fee())]
    pub fn set_native_outbound_fee(origin: OriginFor<T>, new_fee: u128) -> DispatchResult {
      T::AdminOrigin::ensure_origin(origin)?;
      let old_fee = NativeOutboundFee::<T>::get();
      NativeOutboundFee::<T>::put(new_fee);
      Self::deposit_event(Event::NativeOutboundFeeUpdated { old_fee, new_fee });
      Ok(())
    }
  }

  impl<T: Config> Pallet<T> {
    /// Max gas = 1.5x the observed `size * rate`, in the chain's gas asset.
    pub fn max_gas(chain: Chain) -> Result<Coin, DispatchError> {
      let fee = NetworkFees::<T>::get(chain).ok_or(Error::<T>::NetworkFeeNotFound)?;
      let amount = u128::from(fee.transaction_size)
        .saturating_mul(u128::from(fee.fee_rate))
        .saturating_mul(3)
        / 2;
      Ok(Coin::new(
        chain.gas_asset(),
        round_to_decimal(amount, chain.gas_asset_decimals()),
      ))
    }

    pub fn gas_rate(chain: Chain) -> u64 {
      let native_fee = NativeOutboundFee::<T>::get().saturated_into::<u64>();
      if chain.is_native() {
        return native_fee;
      }
      match NetworkFees::<T>::get(chain) {
        Some(fee) if fee.is_valid() => {
          let rate = u128::from(fee.fee_rate).saturating_mul(3) / 2;
          round_to_decimal(rate, chain.gas_asset_decimals()).saturated_into()
        },
        Some(_) => {
          log::error!(target: LOG_TARGET, "network fee for {:?} is invalid", chain);
          native_fee
        },
        None => {
          log::error!(target: LOG_TARGET, "no network fee for {:?}", chain);
          native_fee
        },
      }
    }

    /// Outbound fee for `asset`. Zero when the chain has no valid network fee
    /// yet or the pools needed for conversion are empty.
    pub fn asset_outbound_fee(asset: &Asset, in_native: bool) -> Result<u128, DispatchError> {
      let native_fee = NativeOutboundFee::<T>::get();
      if asset.is_native() {
        return Ok(native_fee);
      }
      if asset.ledger_chain().is_native() {
        if in_native {
          return Ok(native_fee);
        }
        return Ok(Self::native_in_asset_value(native_fee, asset));
      }

      let chain = asset.chain;
      let network_fee = NetworkFees::<T>::get(chain).ok_or(Error::<T>::NetworkFeeNotFound)?;
      if !network_fee.is_valid() {
        return Ok(0);
      }

      let gas_pool = T::Pools::get(&chain.gas_asset()).unwrap_or_default();
      let min_asset = gas_pool.native_value_in_asset(T::MinimumL1OutboundFeeNative::get());

      let multiplier = Self::calc_outbound_fee_multiplier(
        T::TargetOutboundFeeSurplus::get(),
        OutboundFeeSpent::<T>::get(asset),
        OutboundFeeWithheld::<T>::get(asset),
        T::MaxOutboundFeeMultiplierBps::get(),
        T::MinOutboundFeeMultiplierBps::get(),
      );
      let base_fee =
        u128::from(network_fee.transaction_size).saturating_mul(u128::from(network_fee.fee_rate));
      let fee = round_to_decimal(
        get_uncapped_share(multiplier, MAX_BASIS_POINTS, base_fee),
        gas_pool.decimals,
      )
      .max(min_asset);

      if *asset == chain.gas_asset() && !in_native {
        return Ok(fee);
      }
      if gas_pool.is_empty() {
        log::error!(target: LOG_TARGET, "gas pool of {:?} is empty, charging no fee", chain);
        return Ok(0);
      }
      let fee = gas_pool.asset_value_in_native(fee);
      if in_native {
        return Ok(fee);
      }

      let asset_pool = T::Pools::get(asset).unwrap_or_default();
      if asset_pool.is_empty() {
        log::error!(target: LOG_TARGET, "pool of {:?} is empty, charging no fee", asset);
        return Ok(0);
      }
      Ok(asset_pool.native_value_in_asset(fee))
    }

    /// `max - share(withheld - spent, target, max - min)`, in basis points.
    pub fn calc_outbound_fee_multiplier(
      target_surplus: u128,
      spent: u128,
      withheld: u128,
      max_bps: u128,
      min_bps: u128,
    ) -> u128 {
      if target_surplus == 0 {
        log::error!(target: LOG_TARGET, "target outbound fee surplus is zero");
        return max_bps;
      }
      if min_bps > max_bps {
        log::error!(
          target: LOG_TARGET,
          "min multiplier {} above max multiplier {}",
          min_bps,
          max_bps
        );
        return FALLBACK_MULTIPLIER_BPS;
      }
      let surplus = withheld.saturating_sub(spent);
      let reduction = get_safe_share(surplus, target_surplus, max_bps - min_bps);
      max_bps.saturating_sub(reduction)
    }

    fn native_in_asset_value(native_fee: u128, asset: &Asset) -> u128 {
      match T::Pools::get(&asset.layer1()) {
        Some(pool) if !pool.is_empty() => pool.native_value_in_asset(native_fee),
        _ => native_fee,
      }
    }
  }

  impl<T: Config> GasOracle for Pallet<T> {
    fn max_gas(chain: Chain) -> Result<Coin, DispatchError> {
      Self::max_gas(chain)
    }

    fn gas_rate(chain: Chain) -> u64 {
      Self::gas_rate(chain)
    }

    fn outbound_fee(asset: &Asset, in_native: bool) -> Result<u128, DispatchError> {
      Self::asset_outbound_fee(asset, in_native)
    }
  }

  impl<T: Config> OutboundFeeLedger for Pallet<T> {
    fn add_withheld(asset: &Asset, native_amount: u128) -> DispatchResult {
      OutboundFeeWithheld::<T>::mutate(asset, |total| *total = total.saturating_add(native_amount));
      Ok(())
    }

    fn add_spent(asset: &Asset, native_amount: u128) -> DispatchResult {
      OutboundFeeSpent::<T>::mutate(asset, |total| *total = total.saturating_add(native_amount));
      Ok(())
    }
  }

  #[pallet::genesis_config]
  #[derive(frame::prelude::DefaultNoBound)]
  pub struct GenesisConfig<T: Config> {
    /// `(chain, transaction_size, fee_rate)`
    pub network_fees: Vec<(Chain, u64, u64)>,
    #[serde(skip)]
    pub _marker: core::marker::PhantomData<T>,
  }

  #[pallet::genesis_build]
  impl<T: Config> BuildGenesisConfig for GenesisConfig<T> {
    fn build(&self) {
      for (chain, transaction_size, fee_rate) in self.network_fees.iter() {
        NetworkFees::<T>::insert(
          chain,
          NetworkFee {
            transaction_size: *transaction_size,
            fee_rate: *fee_rate,
          },
        );
      }
    }
  }
}
