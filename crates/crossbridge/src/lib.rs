//! Top-level facade crate for crossbridge.
//!
//! Re-exports the wire contracts and the engine so adapters can depend on a
//! single crate.

pub mod core {
    pub use crossbridge_core::*;
}

pub mod engine {
    pub use crossbridge_engine::*;
}
