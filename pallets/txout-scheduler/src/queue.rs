//! Request staging, the outbound queue and block maintenance.

use crate::{
  Config, Error, Event, LOG_TARGET, Pallet, TxOutQueue,
  adapters::{ModuleBank, NativeInbound, ObservationVoters, OutboundScheduler, VaultRegistry},
  types::{InboundTx, LedgerModule, TxOutItem, VaultStatus},
};
use alloc::{collections::BTreeMap, vec, vec::Vec};
use frame::prelude::*;
use pallet_gas_manager::{GasOracle, OutboundFeeLedger};
use polkadot_sdk::frame_support::storage::with_transaction;
use polkadot_sdk::sp_runtime::TransactionOutcome;
use primitives::{Address, Chain, Coin, Height, PubKey, TxId, math::get_safe_share};

impl<T: Config> Pallet<T> {
  /// Schedule an outbound. Either every effect of the request is applied or
  /// none is.
  pub fn submit(item: TxOutItem, min_out: u128) -> Result<Height, DispatchError> {
    let now = Self::now();
    if item.to_address.is_noop() {
      return Ok(now);
    }
    if item.chain.is_evm() && item.to_address.is_evm_null() {
      log::error!(target: LOG_TARGET, "evm outbound to null address: {:?}", item.in_hash);
      Self::deposit_event(Event::SecurityIncident {
        in_hash: item.in_hash,
        chain: item.chain,
        to_address: item.to_address,
        coin: item.coin,
      });
      return Ok(now);
    }

    with_transaction(|| {
      let mut item = item;
      match Self::take_affiliate_fee(&item) {
        // trade and secured balances pay affiliates after the outbound
        Ok(amount) if !item.coin.asset.is_trade() && !item.coin.asset.is_secured() => {
          item.coin.amount = amount;
        },
        Ok(_) => {},
        Err(e) => log::error!(target: LOG_TARGET, "fail to take affiliate fee: {:?}", e),
      }
      match Self::try_add_tx_out_item(item, min_out) {
        Ok(height) => TransactionOutcome::Commit(Ok(height)),
        Err(e) => TransactionOutcome::Rollback(Err(e)),
      }
    })
  }

  fn try_add_tx_out_item(mut item: TxOutItem, min_out: u128) -> Result<Height, DispatchError> {
    let (outputs, native_fee) = Self::prepare_tx_out_item(item.clone())?;
    ensure!(!outputs.is_empty(), Error::<T>::NotEnoughToPayFee);

    let sum_out = outputs
      .iter()
      .fold(0u128, |sum, o| sum.saturating_add(o.coin.amount));
    if sum_out < min_out {
      log::warn!(
        target: LOG_TARGET,
        "outbound amount does not meet requirements ({}/{})",
        sum_out,
        min_out
      );
      return Err(Error::<T>::BelowMinimumOut.into());
    }

    let now = Self::now();
    let mut outbound_height = now;
    let mut clout_applied = 0u128;
    if !item.chain.is_native() && !item.in_hash.is_blank() {
      item.memo = outputs[0].memo.clone();
      let (mut target, clout) = Self::calc_tx_out_height(&item);
      clout_applied = clout;

      // streaming swaps reached consensus earlier, count the delay from there
      let consensus_height = T::Voters::get(&item.in_hash)
        .map(|v| v.height)
        .unwrap_or_default();
      if consensus_height > 0 {
        target = target.saturating_sub(now).saturating_add(consensus_height);
      }
      outbound_height = outbound_height.max(target);
      T::Voters::raise_outbound_height(&item.in_hash, outbound_height);
    }

    let last = outputs.len() - 1;
    let mut shared_clout = 0u128;
    for (i, mut output) in outputs.into_iter().enumerate() {
      let share = if i < last {
        get_safe_share(output.coin.amount, sum_out, clout_applied)
      } else {
        clout_applied.saturating_sub(shared_clout)
      };
      shared_clout = shared_clout.saturating_add(share);
      output.clout_spent = Some(share);
      Self::add_to_block_out(output, outbound_height)?;
    }

    if native_fee > 0 && !item.chain.is_native() {
      if let Err(e) = T::FeeLedger::add_withheld(&item.coin.asset, native_fee) {
        log::error!(target: LOG_TARGET, "fail to add outbound fee withheld: {:?}", e);
      }
    }

    log::debug!(
      target: LOG_TARGET,
      "scheduled {} {:?} to {:?} at {}",
      sum_out,
      item.coin.asset,
      item.to_address,
      outbound_height
    );
    Ok(outbound_height)
  }

  /// Append `item` at `height` with no vault selection or fees.
  pub fn unsafe_add_tx_out_item(item: TxOutItem, height: Height) -> DispatchResult {
    if item.to_address.is_noop() {
      return Ok(());
    }
    Self::add_to_block_out(item, height)
  }

  pub(crate) fn add_to_block_out(mut item: TxOutItem, height: Height) -> DispatchResult {
    if item.chain.is_native() {
      return Self::native_tx_out(item);
    }
    item.aggregator_target_limit.get_or_insert(0);
    item.clout_spent.get_or_insert(0);

    Self::deposit_event(Event::OutboundScheduled {
      height,
      item: item.clone(),
    });
    TxOutQueue::<T>::append(height, item);
    Ok(())
  }

  /// Native-ledger outbounds settle right away and are fed back into internal
  /// message processing as if they had been observed.
  fn native_tx_out(mut item: TxOutItem) -> DispatchResult {
    let module = item.module();
    item.module_name = Some(module);
    let coin = &item.coin;

    if module == LedgerModule::Protocol {
      T::Bank::mint_to_module(module, coin)?;
      Self::deposit_event(Event::SupplyMinted {
        asset: coin.asset.clone(),
        amount: coin.amount,
      });
    }

    let to = &item.to_address;
    if coin.asset.is_trade() {
      T::NativeInbound::deposit_trade_asset(&coin.asset, coin.amount, to, &item.in_hash)?;
    } else if coin.asset.is_secured() {
      let layer1 = coin.asset.layer1();
      T::NativeInbound::deposit_secured_asset(&layer1, coin.amount, to, &item.in_hash)?;
    } else if *to == T::Bank::module_address(LedgerModule::Reserve) {
      T::Bank::send_module_to_module(module, LedgerModule::Reserve, coin)?;
    } else if *to == T::Bank::module_address(LedgerModule::AffiliateCollector) {
      T::Bank::send_module_to_module(module, LedgerModule::AffiliateCollector, coin)?;
    } else {
      T::Bank::send_module_to_account(module, to, coin)?;
    }

    let observer = T::Vaults::vaults_by_status(VaultStatus::Active)
      .into_iter()
      .next()
      .map(|v| v.pub_key)
      .ok_or(Error::<T>::NoActiveVault)?;
    let tx = InboundTx {
      id: TxId::BLANK,
      chain: Chain::Native,
      from_address: T::Bank::module_address(module),
      to_address: item.to_address.clone(),
      coins: vec![item.coin.clone()],
      memo: item.memo.clone(),
    };
    T::NativeInbound::handle_internal(tx, &observer, Self::now()).inspect_err(|e| {
      log::error!(target: LOG_TARGET, "native outbound handler failed: {:?}", e);
    })
  }

  /// Reprice the unsigned outbounds at `height` with the current max gas and
  /// gas rate. Writes nothing when the oracle values are unchanged.
  pub fn refresh_outbound_gas(height: Height) {
    let mut items = TxOutQueue::<T>::get(height);
    if items.is_empty() {
      return;
    }

    let mut max_gas_cache: BTreeMap<Chain, Option<Coin>> = BTreeMap::new();
    let mut gas_rate_cache: BTreeMap<Chain, u64> = BTreeMap::new();
    let mut changed = false;

    for item in items.iter_mut() {
      if item.is_fulfilled() {
        continue;
      }
      let outbound_height = T::Voters::get(&item.in_hash)
        .map(|v| v.outbound_height)
        .unwrap_or_default();
      // already due in the past, signers are working with the old values
      if outbound_height > 0 && outbound_height < height {
        continue;
      }

      let chain = item.chain;
      let max_gas = max_gas_cache
        .entry(chain)
        .or_insert_with(|| T::GasOracle::max_gas(chain).ok())
        .clone();
      let gas_rate = *gas_rate_cache
        .entry(chain)
        .or_insert_with(|| T::GasOracle::gas_rate(chain));

      let mut refreshed = false;
      if let Some(gas) = max_gas.filter(|g| !g.is_empty()) {
        if item.max_gas.as_ref() != Some(&gas) {
          Self::update_voter_action(item, |action| action.max_gas = Some(gas.clone()));
          item.max_gas = Some(gas);
          refreshed = true;
        }
      }
      // after max gas: actions are matched on the current gas values
      if gas_rate > 0 && item.gas_rate != gas_rate {
        Self::update_voter_action(item, |action| action.gas_rate = gas_rate);
        item.gas_rate = gas_rate;
        refreshed = true;
      }

      if refreshed {
        changed = true;
        Self::deposit_event(Event::OutboundGasRefreshed {
          height,
          in_hash: item.in_hash,
          max_gas: item.max_gas.clone(),
          gas_rate: item.gas_rate,
        });
      }
    }

    if changed {
      TxOutQueue::<T>::insert(height, items);
    }
  }

  fn update_voter_action(item: &TxOutItem, update: impl FnOnce(&mut TxOutItem)) {
    if item.in_hash.is_blank() {
      return;
    }
    let Some(mut voter) = T::Voters::get(&item.in_hash) else {
      log::error!(target: LOG_TARGET, "fail to get inbound voter {:?}", item.in_hash);
      return;
    };
    match voter.actions.iter_mut().find(|action| action.same_outbound(item)) {
      Some(action) => {
        update(action);
        T::Voters::set(voter);
      },
      None => log::error!(
        target: LOG_TARGET,
        "no action of {:?} matches the queued outbound",
        item.in_hash
      ),
    }
  }

  pub fn pending(height: Height) -> Vec<TxOutItem> {
    TxOutQueue::<T>::get(height)
  }

  pub fn clear(height: Height) {
    TxOutQueue::<T>::remove(height);
    Self::deposit_event(Event::OutboundQueueCleared { height });
  }

  pub fn outbounds_to(height: Height, to: &Address) -> Vec<TxOutItem> {
    TxOutQueue::<T>::get(height)
      .into_iter()
      .filter(|item| item.to_address == *to)
      .collect()
  }

  /// Record `out_hash` on the first unsigned outbound at `height` that matches.
  pub fn mark_fulfilled(
    height: Height,
    in_hash: TxId,
    vault: &PubKey,
    coin: &Coin,
    out_hash: TxId,
  ) -> DispatchResult {
    TxOutQueue::<T>::try_mutate(height, |items| {
      let item = items
        .iter_mut()
        .find(|item| {
          !item.is_fulfilled()
            && item.in_hash == in_hash
            && item.vault_pub_key.as_ref() == Some(vault)
            && item.coin == *coin
        })
        .ok_or(Error::<T>::OutboundNotFound)?;
      item.out_hash = Some(out_hash);
      Ok::<(), DispatchError>(())
    })?;
    Self::deposit_event(Event::OutboundFulfilled {
      height,
      in_hash,
      out_hash,
    });
    Ok(())
  }
}

impl<T: Config> OutboundScheduler for Pallet<T> {
  fn submit(item: TxOutItem, min_out: u128) -> Result<Height, DispatchError> {
    Self::submit(item, min_out)
  }

  fn unsafe_add(item: TxOutItem, height: Height) -> DispatchResult {
    Self::unsafe_add_tx_out_item(item, height)
  }

  fn pending(height: Height) -> Vec<TxOutItem> {
    Self::pending(height)
  }
}
