//! Domain types: errors, wire structs, handle table, pending-call store.

pub mod config;
pub mod correlation;
pub mod error;
pub mod handles;
pub mod invocation;
pub mod pending;

pub use config::{ChannelConfig, ConfigError};
pub use correlation::CorrelationId;
pub use error::{DispatchError, DispatchResult, ErrorKind, TargetError};
pub use handles::{HandleEntry, InstanceRef, ObjectHandleTable};
pub use invocation::{
    Argument, ArgumentList, InvocationInfo, InvocationResult, ObjectHandleId, ParamType,
    DISPOSE_IDENTIFIER, OBJECT_REF_KEY,
};
pub use pending::{cleanup_task, CompletionOutcome, PendingCallStore, PendingStats};
