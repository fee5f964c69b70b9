//! Outbound ports consumed by the dispatch core.

pub mod transport;

pub use transport::{Transport, TransportError};
