//! Outbound preparation: memo defaults, vault selection and fee deduction.

use crate::{
  Config, Error, Event, LOG_TARGET, Pallet,
  adapters::{AffiliateLedger, ModuleBank, ObservationVoters, VaultRegistry},
  types::{LedgerModule, TxOutItem, VaultStatus},
};
use alloc::vec::Vec;
use frame::prelude::*;
use pallet_gas_manager::{GasOracle, PoolLedger};
use primitives::{
  Asset, Coin, Memo, Pool, TxType,
  math::{get_safe_share, round_to_decimal},
  memo::{has_prefix, split_payload},
  params::MAX_BASIS_POINTS,
};

impl<T: Config> Pallet<T> {
  /// Pay the affiliates named in the inbound swap memo out of `item`. Returns
  /// what is left for the user.
  pub(crate) fn take_affiliate_fee(item: &TxOutItem) -> Result<u128, DispatchError> {
    let amount = item.coin.amount;
    if has_prefix(&item.memo, b"REFUND") || has_prefix(&item.memo, b"MIGRATE") {
      return Ok(amount);
    }

    let voter = T::Voters::get(&item.in_hash)
      .filter(|v| !v.memo().is_empty())
      .ok_or(DispatchError::Other("inbound memo not found"))?;
    let memo =
      Memo::parse(voter.memo()).map_err(|_| DispatchError::Other("inbound memo is invalid"))?;

    // a native leg of a swap to another asset is itself the affiliate payout
    let target_is_native = memo.asset.as_ref().is_some_and(|a| a.is_native());
    if item.coin.asset.is_native() && !target_is_native {
      return Ok(amount);
    }
    if !memo.is_type(TxType::Swap) || memo.affiliates.is_empty() {
      return Ok(amount);
    }

    let mut total = 0u128;
    for affiliate in memo.affiliates.iter() {
      let share = get_safe_share(affiliate.basis_points, MAX_BASIS_POINTS, amount);
      if share == 0 {
        continue;
      }
      let coin = Coin::new(item.coin.asset.clone(), share);
      match T::Affiliates::credit(&item.in_hash, affiliate, &coin) {
        Ok(()) => total = total.saturating_add(share),
        Err(e) => log::error!(target: LOG_TARGET, "fail to skim affiliate fee: {:?}", e),
      }
    }
    Ok(amount.saturating_sub(total))
  }

  /// Turn a request into the outputs to schedule: one per paying vault, each
  /// net of the outbound fee. Also returns the total fee recovered, in native.
  pub(crate) fn prepare_tx_out_item(
    mut item: TxOutItem,
  ) -> Result<(Vec<TxOutItem>, u128), DispatchError> {
    let now = Self::now();

    if item.memo.is_empty() {
      item.memo = Memo::outbound(&item.in_hash);
    }
    if !item.in_hash.is_blank() {
      // carry the inbound's `|payload` over
      if let Some(voter) = T::Voters::get(&item.in_hash) {
        if let (_, Some(payload)) = split_payload(voter.memo()) {
          item.memo.push(b'|');
          item.memo.extend_from_slice(payload);
          item.memo.truncate(item.chain.max_memo_length());
        }
      }
    }
    ensure!(
      !item.to_address.is_empty() && item.to_address.is_chain(item.chain),
      Error::<T>::InvalidDestination
    );

    let layer1 = item.coin.asset.layer1();
    let toi_pool = T::Pools::get(&layer1).unwrap_or_else(|| Pool::new(layer1.clone()));
    let transaction_fee = T::GasOracle::outbound_fee(&item.coin.asset, false)?;
    let max_gas = T::GasOracle::max_gas(item.chain)
      .inspect_err(|e| log::error!(target: LOG_TARGET, "fail to get max gas: {:?}", e))
      .ok();

    let outputs = if item.chain.is_native() || item.vault_pub_key.is_some() {
      alloc::vec![item.clone()]
    } else {
      let pending = Self::pending_outbounds(&item.coin.asset);
      let mut vaults = Self::candidate_vaults(VaultStatus::Active, &pending);
      vaults.extend(Self::candidate_vaults(VaultStatus::Retiring, &pending));
      let (outputs, remaining) =
        Self::discover_outbounds(transaction_fee, max_gas.as_ref(), &item, vaults);
      if remaining > 0 {
        log::error!(
          target: LOG_TARGET,
          "insufficient funds for outbound request: {:?} {} remaining",
          item.to_address,
          remaining
        );
        return Err(Error::<T>::InsufficientFunds.into());
      }
      outputs
    };

    let mut final_outputs = Vec::with_capacity(outputs.len());
    let mut pool: Option<Pool> = None;
    let mut pool_charged = false;
    let mut fee_events = Vec::new();
    let mut final_native_fee = 0u128;

    for mut output in outputs {
      if output.chain.is_native() {
        output.gas_rate = T::GasOracle::gas_rate(output.chain);
      } else if output.max_gas.is_none() {
        let gas = T::GasOracle::max_gas(output.chain).map_err(|_| Error::<T>::MissingMaxGas)?;
        ensure!(!gas.is_empty(), Error::<T>::MissingMaxGas);
        output.max_gas = Some(gas);
        output.gas_rate = T::GasOracle::gas_rate(output.chain);
      }

      let memo = Memo::parse(&output.memo).ok();
      let fee_exempt = memo
        .as_ref()
        .is_none_or(|m| m.is_type(TxType::Migrate) || m.is_type(TxType::Ragnarok));

      if !fee_exempt {
        if output.coin.asset.is_native() {
          let native_fee = transaction_fee.min(output.coin.amount);
          final_native_fee = final_native_fee.saturating_add(native_fee);
          output.coin.amount -= native_fee;
          fee_events.push(Event::<T>::FeeCharged {
            in_hash: output.in_hash,
            coin: Coin::new(output.coin.asset.clone(), native_fee),
            pool_deduct: 0,
          });
        } else {
          if pool.is_none() {
            pool = Some(Self::fee_pool(&layer1)?);
          }
          // no asset fee while the pool has no liquidity providers
          if let Some(pool) = pool.as_mut().filter(|p| p.lp_units > 0) {
            let asset_fee = transaction_fee.min(output.coin.amount);
            output.coin.amount -= asset_fee;

            let burnable = output.coin.asset.is_synthetic() || output.coin.asset.is_derived();
            if burnable && output.module() == LedgerModule::Asgard {
              Self::burn_fee(&output.coin.asset, asset_fee);
            }

            if item.coin.asset.is_gas_asset() && output.coin.amount < item.chain.dust_threshold() {
              if !output.in_hash.is_blank() && Self::inbound_is_withdrawal(&output) {
                return Err(Error::<T>::ZeroOutboundAfterFee.into());
              }
              log::warn!(
                target: LOG_TARGET,
                "dropping gas asset output below dust threshold: in {:?}, amount {}, fee {}",
                item.in_hash,
                output.coin.amount,
                transaction_fee
              );
              continue;
            }

            let pool_deduct = pool
              .native_disbursement_for_asset_add(asset_fee)
              .min(pool.balance_native);
            final_native_fee = final_native_fee.saturating_add(pool_deduct);
            if !output.coin.asset.is_synthetic() {
              pool.balance_asset = pool.balance_asset.saturating_add(asset_fee);
            }
            pool.balance_native -= pool_deduct;
            pool_charged = true;
            fee_events.push(Event::<T>::FeeCharged {
              in_hash: output.in_hash,
              coin: Coin::new(output.coin.asset.clone(), asset_fee),
              pool_deduct,
            });
          }
        }
      }

      let vault_inactive = output
        .vault_pub_key
        .as_ref()
        .and_then(|key| T::Vaults::get(key))
        .is_some_and(|v| v.status == VaultStatus::Inactive);
      let ragnarok = memo.as_ref().is_some_and(|m| m.is_type(TxType::Ragnarok));
      if (ragnarok || vault_inactive) && output.coin.asset.is_gas_asset() {
        // the vault must keep enough gas to send the outbound at all
        let gas = output
          .max_gas
          .as_ref()
          .filter(|g| g.asset == output.coin.asset)
          .map(|g| g.amount)
          .unwrap_or_default();
        output.coin.amount = output.coin.amount.saturating_sub(gas);
      }

      if output.coin.is_empty() {
        log::info!(target: LOG_TARGET, "tx out item has zero coin: {:?}", output.in_hash);
        if !output.in_hash.is_blank() && Self::inbound_is_withdrawal(&output) {
          return Err(Error::<T>::ZeroOutboundAfterFee.into());
        }
        continue;
      }

      // synths are burnt in full, decimals only matter on the destination chain
      if !output.coin.asset.is_synthetic() {
        output.coin.amount = round_to_decimal(output.coin.amount, toi_pool.decimals);
      }

      if !output.in_hash.is_blank() {
        T::Voters::record_action(&output.in_hash, output.clone(), now);
      }
      final_outputs.push(output);
    }

    if let Some(pool) = pool.filter(|_| pool_charged) {
      T::Pools::set(pool)?;
    }
    for event in fee_events {
      Self::deposit_event(event);
    }
    if final_native_fee > 0 {
      Self::send_fee_to_reserve(&item, final_native_fee);
    }

    Ok((final_outputs, final_native_fee))
  }

  fn fee_pool(layer1: &Asset) -> Result<Pool, DispatchError> {
    match T::Pools::get(layer1) {
      Some(pool) => {
        ensure!(pool.asset == *layer1, Error::<T>::PoolMismatch);
        Ok(pool)
      },
      None => Ok(Pool::new(layer1.clone())),
    }
  }

  /// Synth and derived fees leave custody for the protocol module and are burnt there.
  fn burn_fee(asset: &Asset, amount: u128) {
    let coin = Coin::new(asset.clone(), amount);
    let moved = T::Bank::send_module_to_module(LedgerModule::Asgard, LedgerModule::Protocol, &coin);
    if let Err(e) = moved {
      log::error!(target: LOG_TARGET, "fail to move asset fee to the protocol module: {:?}", e);
      return;
    }
    if let Err(e) = T::Bank::burn_from_module(LedgerModule::Protocol, &coin) {
      log::error!(target: LOG_TARGET, "fail to burn asset fee: {:?}", e);
      return;
    }
    Self::deposit_event(Event::SupplyBurned {
      asset: asset.clone(),
      amount,
    });
  }

  fn send_fee_to_reserve(item: &TxOutItem, native_fee: u128) {
    let source = item.module();
    if source == LedgerModule::Reserve {
      return;
    }
    // derived assets are not charged on the custody side
    if item.coin.asset.is_derived() {
      return;
    }
    let coin = Coin::new(Asset::native(), native_fee);
    if let Err(e) = T::Bank::send_module_to_module(source, LedgerModule::Reserve, &coin) {
      log::error!(target: LOG_TARGET, "fail to send fee to reserve from {:?}: {:?}", source, e);
    }
  }

  fn inbound_is_withdrawal(output: &TxOutItem) -> bool {
    let Some(voter) = T::Voters::get(&output.in_hash) else {
      log::error!(target: LOG_TARGET, "no inbound voter for {:?}", output.in_hash);
      return false;
    };
    if voter.tx.is_none() {
      return false;
    }
    match Memo::parse(voter.memo()) {
      Ok(memo) => memo.is_type(TxType::Withdraw),
      Err(e) => {
        log::error!(target: LOG_TARGET, "fail to parse inbound memo: {:?}", e);
        false
      },
    }
  }
}
