//! Ecosystem Constants for the settlement layer
//!
//! This module centralizes the protocol-wide constants: fixed-point scalars, the
//! default scheduling and fee parameters, and the well-known ledger module names.
//!
//! The pallets expose most of these through their `Config` constants so that a
//! runtime (or governance, via storage overrides) can tune them.

/// Balance type alias for consistency across ecosystem
pub type Balance = u128;

/// Ledger heights are block numbers widened to 64 bits.
pub type Height = u64;

/// Ledger module names.
///
/// Module accounts hold protocol-owned funds on the native ledger. Outbound items
/// carry the name of the module that funds them so fees can be routed back to
/// the reserve.
pub mod modules {
  /// Shared custody module for assets held in vaults (the default funder)
  pub const ASGARD: &[u8; 8] = b"asgard00";

  /// Protocol reserve, the sink for recovered outbound fees
  pub const RESERVE: &[u8; 8] = b"reserve0";

  /// The protocol module itself, mints native outbounds and burns synth fees
  pub const PROTOCOL: &[u8; 8] = b"protocol";

  /// Collects affiliate fees before they are distributed
  pub const AFFILIATE_COLLECTOR: &[u8; 8] = b"affcollc";
}

/// Ecosystem parameters defining mathematical constants and thresholds.
pub mod params {
  use super::{Balance, Height};

  /// Common decimal scalar (10^8). Every asset is normalised to eight decimals
  /// on the native ledger.
  pub const ONE: Balance = 100_000_000;

  /// Basis point denominator.
  pub const MAX_BASIS_POINTS: Balance = 10_000;

  /// Flat outbound fee charged in native units (0.02).
  pub const OUTBOUND_TRANSACTION_FEE: Balance = 2_000_000;

  /// Blocks a signer has to broadcast a scheduled outbound.
  pub const SIGNING_TRANSACTION_PERIOD: i64 = 300;

  /// Native value that may leave per block before congestion delay kicks in.
  pub const MIN_TX_OUT_VOLUME_THRESHOLD: i64 = 1_000 * ONE as i64;

  /// Native value released per block of delay.
  pub const TX_OUT_DELAY_RATE: i64 = 25 * ONE as i64;

  /// Hard ceiling on how far ahead an outbound can be scheduled (~24h).
  pub const TX_OUT_DELAY_MAX: i64 = 17_280;

  /// Offset after which an empty height ends the congestion scan.
  pub const MAX_TX_OUT_OFFSET: i64 = 720;

  /// Blocks after which spent clout is forgiven.
  pub const CLOUT_RESET: i64 = 720;

  /// Per-address clout cap. Zero disables clout.
  pub const CLOUT_LIMIT: i64 = 0;

  /// Surplus of withheld over spent outbound fees the fee multiplier steers to.
  pub const TARGET_OUTBOUND_FEE_SURPLUS: Balance = 100_000 * ONE;

  /// Outbound fee multiplier bounds, in basis points.
  pub const MAX_OUTBOUND_FEE_MULTIPLIER_BPS: Balance = 30_000;
  pub const MIN_OUTBOUND_FEE_MULTIPLIER_BPS: Balance = 15_000;

  /// Memo size limits.
  pub const MAX_MEMO_SIZE: usize = 250;
  pub const MAX_OP_RETURN_DATA_SIZE: usize = 80;

  /// Genesis height sentinel, never scan the queue below it.
  pub const FIRST_HEIGHT: Height = 1;
}
