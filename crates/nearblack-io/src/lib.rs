#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for I/O operations.
///
/// Defines [`IoError`] variants for file access, encoding and decoding failures.
pub mod error;

/// PNG image encoding and decoding.
///
/// Read and write 8-bit PNG images with one to four channels.
pub mod png;

pub use crate::error::IoError;
