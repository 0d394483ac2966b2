//! Deterministic random number generation
//!
//! Uses xorshift64* for latency sampling and cart shuffles.
//! All randomness in the drill goes through this module.

mod xorshift;

pub use xorshift::RngManager;
