//! Adapters implementing the outbound ports.

pub mod mpsc_transport;

pub use mpsc_transport::MpscTransport;
