//! crossbridge core: transport-agnostic wire contracts and error surface.
//!
//! This crate defines the envelope exchanged across the execution-context
//! boundary, the normalized error record that crosses it, and the validation
//! rules the receiving side applies before dispatch. It intentionally carries
//! no runtime dependencies so it can be reused on either side of the channel.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! One side of the channel is often untrusted page code, so every fallible
//! path must surface as `BridgeError`/`Result` instead of crashing the host.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod protocol;

/// Shared result type.
pub use error::{BridgeError, ClientCode, Result};
