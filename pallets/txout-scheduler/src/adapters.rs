//! Collaborator traits for the scheduler
//!
//! The runtime wires vault custody, observation voters, module accounts,
//! affiliate payouts and native-ledger inbound handling into the pallet through
//! these traits. Pools, gas prices and the fee ledger come from
//! `pallet-gas-manager`'s traits.

use crate::types::{InboundTx, InboundVoter, LedgerModule, TxOutItem, Vault, VaultStatus};
use alloc::vec::Vec;
use frame::prelude::*;
use primitives::{Address, Affiliate, Asset, Coin, Height, PubKey, TxId};

/// Read access to the custodial vault set.
pub trait VaultRegistry {
  fn vaults_by_status(status: VaultStatus) -> Vec<Vault>;
  fn get(pub_key: &PubKey) -> Option<Vault>;
}

/// Orders vaults so the least secure (most expendable) come first.
pub trait VaultSecurity {
  fn sort_by_security(vaults: Vec<Vault>, signing_period: i64) -> Vec<Vault>;
}

/// Keeps the incoming order.
impl VaultSecurity for () {
  fn sort_by_security(vaults: Vec<Vault>, _: i64) -> Vec<Vault> {
    vaults
  }
}

/// Inbound voter records shared with the observation protocol.
pub trait ObservationVoters {
  fn get(tx_id: &TxId) -> Option<InboundVoter>;
  fn set(voter: InboundVoter);

  /// Attach a scheduled outbound to its inbound.
  fn record_action(tx_id: &TxId, item: TxOutItem, now: Height) {
    let mut voter = Self::get(tx_id).unwrap_or_else(|| InboundVoter::new(*tx_id));
    voter.finalised_height = now;
    voter.actions.push(item);
    Self::set(voter);
  }

  /// Raise the voter's outbound height estimate. Never lowers it.
  fn raise_outbound_height(tx_id: &TxId, height: Height) {
    let mut voter = Self::get(tx_id).unwrap_or_else(|| InboundVoter::new(*tx_id));
    if height > voter.outbound_height {
      voter.outbound_height = height;
      Self::set(voter);
    }
  }
}

/// Module accounts on the native ledger.
pub trait ModuleBank {
  fn module_address(module: LedgerModule) -> Address;
  fn send_module_to_module(from: LedgerModule, to: LedgerModule, coin: &Coin) -> DispatchResult;
  fn send_module_to_account(from: LedgerModule, to: &Address, coin: &Coin) -> DispatchResult;
  fn mint_to_module(module: LedgerModule, coin: &Coin) -> DispatchResult;
  fn burn_from_module(module: LedgerModule, coin: &Coin) -> DispatchResult;
}

/// Pays affiliates their cut of a swap outbound.
pub trait AffiliateLedger {
  fn credit(in_hash: &TxId, affiliate: &Affiliate, coin: &Coin) -> DispatchResult;
}

/// Native-ledger side effects of outbounds that never leave the protocol.
pub trait NativeInbound {
  fn deposit_trade_asset(asset: &Asset, amount: u128, owner: &Address, in_hash: &TxId)
  -> DispatchResult;
  fn deposit_secured_asset(
    asset: &Asset,
    amount: u128,
    owner: &Address,
    in_hash: &TxId,
  ) -> DispatchResult;
  /// Re-enter internal message processing with a native transfer observed by `observed_by`.
  fn handle_internal(tx: InboundTx, observed_by: &PubKey, height: Height) -> DispatchResult;
}

/// Entry point for pallets that owe users an outbound.
pub trait OutboundScheduler {
  /// Schedule `item`, failing without side effects when the net amount falls
  /// below `min_out`. Returns the height the outbound is released at.
  fn submit(item: TxOutItem, min_out: u128) -> Result<Height, DispatchError>;
  /// Append without vault selection or fees.
  fn unsafe_add(item: TxOutItem, height: Height) -> DispatchResult;
  fn pending(height: Height) -> Vec<TxOutItem>;
}
