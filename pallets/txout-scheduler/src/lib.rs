//! TxOut Scheduler Pallet
//!
//! Settles everything the protocol owes to the outside world. For each outbound
//! request it picks the paying vault(s), deducts the affiliate cut and the
//! network fee, and schedules the payment at a future height derived from the
//! current outbound congestion, discounted by the counterparties' clout.
//!
//! Each request is staged in a storage transaction and only committed when every
//! step succeeds, so a failed request leaves no balances, fee ledgers, clout
//! records or queue entries behind.
//!
//! Queued items are refreshed with current gas prices when their height is
//! finalized, and picked up by the signers from [`TxOutQueue`].

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub use pallet::*;

#[cfg(test)]
pub mod mock;

#[cfg(feature = "runtime-benchmarks")]
mod benchmarking;

pub mod adapters;
mod clout;
mod delay;
mod fees;
mod queue;
pub mod types;
mod vaults;
pub mod weights;

pub use adapters::*;
pub use clout::split_clout;
pub use types::*;
pub use weights::WeightInfo;

pub(crate) const LOG_TARGET: &str = "runtime::txout-scheduler";

#[frame::pallet]
pub mod pallet {
  use super::{
    AffiliateLedger, CloutRecord, ModuleBank, NativeInbound, ObservationVoters, SchedulerParam,
    SchedulerVersion, TxOutItem, VaultRegistry, VaultSecurity, WeightInfo,
  };
  use alloc::vec::Vec;
  use frame::prelude::*;
  use pallet_gas_manager::{GasOracle, OutboundFeeLedger, PoolLedger};
  use polkadot_sdk::sp_runtime::traits::SaturatedConversion;
  use primitives::{Address, Asset, Chain, Coin, Height, TxId};

  #[pallet::config]
  pub trait Config: frame_system::Config<RuntimeEvent: From<Event<Self>>> {
    /// Max gas, gas rate and outbound fee per chain/asset
    type GasOracle: GasOracle;

    /// Pool balances touched by fee disbursement
    type Pools: PoolLedger;

    /// Withheld outbound fee counters
    type FeeLedger: OutboundFeeLedger;

    type Vaults: VaultRegistry;

    /// Ranking applied to candidate vaults before selection
    type Security: VaultSecurity;

    type Voters: ObservationVoters;

    /// Module accounts on the native ledger
    type Bank: ModuleBank;

    type Affiliates: AffiliateLedger;

    /// Handles outbounds settled on the native ledger
    type NativeInbound: NativeInbound;

    /// Origin allowed to tune parameters and clear queues
    type AdminOrigin: EnsureOrigin<Self::RuntimeOrigin>;

    /// Protocol version the scheduling rules follow
    type Version: Get<SchedulerVersion>;

    /// Blocks an outbound may take to be signed, used for pending exposure
    #[pallet::constant]
    type SigningTransactionPeriod: Get<i64>;

    /// Native value one block may release before outbounds spill over
    #[pallet::constant]
    type MinTxOutVolumeThreshold: Get<i64>;

    /// Native value per block of delay, before congestion reduces it
    #[pallet::constant]
    type TxOutDelayRate: Get<i64>;

    /// Furthest an outbound can be pushed into the future
    #[pallet::constant]
    type TxOutDelayMax: Get<i64>;

    /// Cap on the minimum delay of a single outbound
    #[pallet::constant]
    type MaxTxOutOffset: Get<i64>;

    #[pallet::constant]
    type CloutReset: Get<i64>;

    #[pallet::constant]
    type CloutLimit: Get<i64>;

    type WeightInfo: WeightInfo;
  }

  #[pallet::pallet]
  #[pallet::without_storage_info]
  pub struct Pallet<T>(PhantomData<T>);

  /// Outbounds waiting for signers, by release height
  #[pallet::storage]
  pub type TxOutQueue<T: Config> = StorageMap<_, Twox64Concat, Height, Vec<TxOutItem>, ValueQuery>;

  /// Clout of swappers, by address
  #[pallet::storage]
  pub type SwapperClout<T: Config> =
    StorageMap<_, Blake2_128Concat, Address, CloutRecord, OptionQuery>;

  /// Governance overrides of the `Config` defaults
  #[pallet::storage]
  pub type ParamOverrides<T: Config> =
    StorageMap<_, Twox64Concat, SchedulerParam, i64, OptionQuery>;

  #[pallet::event]
  #[pallet::generate_deposit(pub(super) fn deposit_event)]
  pub enum Event<T: Config> {
    /// Outbound appended to the queue at `height`
    OutboundScheduled { height: Height, item: TxOutItem },
    /// Outbound fee deducted. `pool_deduct` is the native side taken from the pool.
    FeeCharged {
      in_hash: TxId,
      coin: Coin,
      pool_deduct: u128,
    },
    SupplyBurned { asset: Asset, amount: u128 },
    SupplyMinted { asset: Asset, amount: u128 },
    /// Outbound dropped instead of being sent to an unspendable address
    SecurityIncident {
      in_hash: TxId,
      chain: Chain,
      to_address: Address,
      coin: Coin,
    },
    /// Queued outbound repriced with the current gas oracle values
    OutboundGasRefreshed {
      height: Height,
      in_hash: TxId,
      max_gas: Option<Coin>,
      gas_rate: u64,
    },
    OutboundFulfilled {
      height: Height,
      in_hash: TxId,
      out_hash: TxId,
    },
    OutboundQueueCleared { height: Height },
    ParamUpdated {
      param: SchedulerParam,
      old_value: i64,
      new_value: i64,
    },
  }

  #[pallet::error]
  pub enum Error<T> {
    /// Active and retiring vaults together cannot fund the outbound
    InsufficientFunds,
    /// A withdrawal netted to nothing after fees
    ZeroOutboundAfterFee,
    /// Net outbound is below the caller's minimum
    BelowMinimumOut,
    /// Destination is empty or not an address of the outbound chain
    InvalidDestination,
    /// Every output was consumed by fees or dust
    NotEnoughToPayFee,
    /// No max gas could be determined for a non-native chain
    MissingMaxGas,
    /// Pool returned for an asset belongs to another asset
    PoolMismatch,
    /// No unfulfilled outbound matches
    OutboundNotFound,
    /// Native outbounds need an active vault to be observed by
    NoActiveVault,
  }

  #[pallet::hooks]
  impl<T: Config> Hooks<BlockNumberFor<T>> for Pallet<T> {
    fn on_initialize(n: BlockNumberFor<T>) -> Weight {
      let height: Height = n.saturated_into();
      let queued = TxOutQueue::<T>::decode_len(height).unwrap_or_default();
      T::WeightInfo::refresh_outbound_gas(queued.saturated_into())
    }

    /// Reprice the outbounds released at this height.
    fn on_finalize(n: BlockNumberFor<T>) {
      Self::refresh_outbound_gas(n.saturated_into());
    }
  }

  #[pallet::call]
  impl<T: Config> Pallet<T> {
    /// Override a scheduler parameter (governance only)
    #[pallet::call_index(0)]
    #[pallet::weight(T::WeightInfo::set_param())]
    pub fn set_param(origin: OriginFor<T>, param: SchedulerParam, value: i64) -> DispatchResult {
      T::AdminOrigin::ensure_origin(origin)?;
      let old_value = Self::param(param);
      ParamOverrides::<T>::insert(param, value);
      Self::deposit_event(Event::ParamUpdated {
        param,
        old_value,
        new_value: value,
      });
      Ok(())
    }

    /// Drop every outbound queued at `height` (governance only)
    #[pallet::call_index(1)]
    #[pallet::weight(T::WeightInfo::clear_outbound_queue())]
    pub fn clear_outbound_queue(origin: OriginFor<T>, height: Height) -> DispatchResult {
      T::AdminOrigin::ensure_origin(origin)?;
      Self::clear(height);
      Ok(())
    }
  }

  impl<T: Config> Pallet<T> {
    /// Effective value of `param`: the governance override, else the `Config` default.
    pub fn param(param: SchedulerParam) -> i64 {
      ParamOverrides::<T>::get(param).unwrap_or_else(|| match param {
        SchedulerParam::MinTxOutVolumeThreshold => T::MinTxOutVolumeThreshold::get(),
        SchedulerParam::TxOutDelayRate => T::TxOutDelayRate::get(),
        SchedulerParam::TxOutDelayMax => T::TxOutDelayMax::get(),
        SchedulerParam::MaxTxOutOffset => T::MaxTxOutOffset::get(),
        SchedulerParam::CloutLimit => T::CloutLimit::get(),
        SchedulerParam::CloutReset => T::CloutReset::get(),
        SchedulerParam::SigningTransactionPeriod => T::SigningTransactionPeriod::get(),
      })
    }

    pub(crate) fn now() -> Height {
      frame_system::Pallet::<T>::block_number().saturated_into()
    }
  }
}
