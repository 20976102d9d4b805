//! Vault selection.

use crate::{
  Config, LOG_TARGET, Pallet, TxOutQueue,
  adapters::{VaultRegistry, VaultSecurity},
  types::{SchedulerParam, TxOutItem, Vault, VaultStatus},
};
use alloc::vec::Vec;
use frame::prelude::*;
use primitives::{Asset, Coin};

impl<T: Config> Pallet<T> {
  /// Unfulfilled outbounds of `asset` that vaults have not paid yet: everything
  /// from one signing period back up to the delay horizon.
  pub fn pending_outbounds(asset: &Asset) -> Vec<TxOutItem> {
    let now = Self::now();
    let signing_period = Self::param(SchedulerParam::SigningTransactionPeriod).max(0) as u64;
    let delay_max = Self::param(SchedulerParam::TxOutDelayMax).max(0) as u64;
    let max_offset = Self::param(SchedulerParam::MaxTxOutOffset).max(0) as u64;

    let mut pending = Vec::new();
    for height in now.saturating_sub(signing_period)..=now.saturating_add(delay_max) {
      let items = TxOutQueue::<T>::get(height);
      if height > now.saturating_add(max_offset) && items.is_empty() {
        break;
      }
      pending.extend(
        items
          .into_iter()
          .filter(|item| !item.is_fulfilled() && item.coin.asset == *asset),
      );
    }
    pending
  }

  /// Vaults of `status`, least secure first, with pending outbounds taken off
  /// their balances.
  pub(crate) fn candidate_vaults(status: VaultStatus, pending: &[TxOutItem]) -> Vec<Vault> {
    let signing_period = Self::param(SchedulerParam::SigningTransactionPeriod);
    let mut vaults =
      T::Security::sort_by_security(T::Vaults::vaults_by_status(status), signing_period);
    for vault in vaults.iter_mut() {
      deduct_pending_outbounds(vault, pending);
    }
    vaults
  }

  /// Split `item` across `vaults`, in order. Returns the funded outputs and the
  /// amount no vault could cover.
  pub fn discover_outbounds(
    fee_in_asset: u128,
    max_gas: Option<&Coin>,
    item: &TxOutItem,
    vaults: Vec<Vault>,
  ) -> (Vec<TxOutItem>, u128) {
    let asset = &item.coin.asset;
    let gas_asset = item.chain.gas_asset();
    let max_gas_amount = max_gas.map(|g| g.amount).unwrap_or_default();

    let mut vaults: Vec<Vault> = vaults
      .into_iter()
      .filter(|v| v.balance_of(asset) > 0 && !v.is_frozen(item.chain))
      .collect();
    if vaults.len() > 1 {
      let version = <T as Config>::Version::get();
      // stable: equally capable vaults keep their security order
      vaults.sort_by_key(|v| version.vaults_necessary(item.coin.amount, v.balance_of(asset)));
    }

    let mut outputs = Vec::new();
    let mut remaining = item.coin.amount;
    for vault in vaults {
      if remaining == 0 {
        break;
      }
      match vault.address(item.chain) {
        Some(from) if !from.is_empty() && *from != item.to_address => {},
        _ => continue,
      }
      let mut available = vault.balance_of(asset);
      if available <= fee_in_asset {
        continue;
      }
      let gas_balance = vault.balance_of(&gas_asset);
      if gas_balance == 0 || gas_balance < max_gas_amount {
        continue;
      }
      if max_gas.is_some_and(|g| g.asset == *asset) {
        available = available.saturating_sub(max_gas_amount);
        if available == 0 {
          continue;
        }
      }

      let amount = remaining.min(available);
      let mut output = item.clone();
      output.vault_pub_key = Some(vault.pub_key.clone());
      output.coin.amount = amount;
      outputs.push(output);
      remaining -= amount;
    }

    if remaining > 0 {
      log::debug!(
        target: LOG_TARGET,
        "vaults cover {} of {} {:?}",
        item.coin.amount - remaining,
        item.coin.amount,
        asset
      );
    }
    (outputs, remaining)
  }
}

/// Take the coins and gas of `pending` outbounds assigned to `vault` off its balances.
pub(crate) fn deduct_pending_outbounds(vault: &mut Vault, pending: &[TxOutItem]) {
  for item in pending {
    if item.vault_pub_key.as_ref() != Some(&vault.pub_key) {
      continue;
    }
    vault.sub_funds(&item.coin.asset, item.coin.amount);
    if let Some(gas) = item.max_gas.as_ref() {
      vault.sub_funds(&gas.asset, gas.amount);
    }
  }
}
