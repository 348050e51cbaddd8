//! Shared utilities.
//!
//! Checksumming for published artifacts and test helpers.

pub mod hash;

#[cfg(test)]
pub mod testutil;
