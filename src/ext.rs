//! Extension contracts for plugging signed headers into arbitrary HTTP clients.

pub mod request_signer;

pub use request_signer::*;
