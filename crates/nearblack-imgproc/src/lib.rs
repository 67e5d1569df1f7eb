#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
/// target color matching module.
pub mod color;

/// Error types for the near-black module.
pub mod error;

/// near-black border collapsing module.
pub mod nearblack;

/// module containing parallization utilities.
pub mod parallel;

/// line sweep state machine.
pub mod sweep;

pub use crate::error::NearBlackError;
