// Allow missing docs for internal items in development
#![allow(missing_docs)]

//! Interop dispatch core - the call/response and callback protocol of a
//! bidirectional cross-runtime bridge.
//!
//! One JSON-encoded channel, no shared memory: a host side invokes named
//! operations on this side, and this side invokes operations back, with
//! completions correlated by id in both directions.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                      CALL CHANNEL                          │
//! ├────────────────────────────────────────────────────────────┤
//! │   inbound call request            inbound completion       │
//! │          │                               │                 │
//! │  ┌───────┴────────┐             ┌────────┴─────────┐       │
//! │  │  Dispatchers   │             │ Outbound Routing │       │
//! │  │  (sync/async)  │             │ (pending store)  │       │
//! │  └───────┬────────┘             └────────┬─────────┘       │
//! │          │                               │                 │
//! │  ┌───────┴────────┐             ┌────────┴─────────┐       │
//! │  │ Resolver Cache │             │  oneshot slots   │       │
//! │  │ Argument Codec │             │  (one write max) │       │
//! │  │  Handle Table  │             └──────────────────┘       │
//! │  └───────┬────────┘                                        │
//! │          │                                                 │
//! │      Transport (send JSON) ──────────► other runtime       │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use interop_dispatch::{CallChannel, ChannelConfig, InvocationInfo};
//! use interop_dispatch::registry::{MethodDescriptor, OperationTable};
//!
//! let mut table = OperationTable::new();
//! table.register_static("math", "Add", MethodDescriptor::immediate(
//!     [ParamType::Integer, ParamType::Integer],
//!     |_, args| Ok(Some(json!(args[0].as_i64().unwrap() + args[1].as_i64().unwrap()))),
//! ));
//!
//! let channel = CallChannel::new(ChannelConfig::default(), Arc::new(table), transport)?;
//! let result = channel.invoke_sync(&InvocationInfo::static_call("math", "Add"), "[2, 3]");
//! ```

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod adapters;
pub mod codec;
pub mod dispatch;
pub mod domain;
pub mod ports;
pub mod registry;
pub mod service;

// Re-exports for public API
pub use adapters::MpscTransport;
pub use domain::config::{ChannelConfig, ConfigError};
pub use domain::correlation::CorrelationId;
pub use domain::error::{DispatchError, DispatchResult, ErrorKind, TargetError};
pub use domain::handles::{HandleEntry, InstanceRef, ObjectHandleTable};
pub use domain::invocation::{
    Argument, ArgumentList, InvocationInfo, InvocationResult, ObjectHandleId, ParamType,
    DISPOSE_IDENTIFIER, OBJECT_REF_KEY,
};
pub use domain::pending::{CompletionOutcome, PendingCallStore};
pub use ports::transport::{Transport, TransportError};
pub use registry::{
    CachedResolver, CallOutcome, MethodDescriptor, OperationResolver, OperationTable, TargetScope,
};
pub use service::CallChannel;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
