//! Top-level facade crate for aro.
//!
//! Re-exports the core model and the server library so users can depend on a single crate.

pub mod core {
    pub use aro_core::*;
}

pub mod server {
    pub use aro_server::*;
}
