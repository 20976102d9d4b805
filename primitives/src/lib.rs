#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod address;
pub mod assets;
pub mod chain;
pub mod ecosystem;
pub mod math;
pub mod memo;
pub mod pool;

pub use address::*;
pub use assets::*;
pub use chain::*;
pub use ecosystem::*;
pub use memo::{Affiliate, Memo, MemoError, TxType};
pub use pool::*;
