//! Invocation wire types and typed argument values.

use crate::domain::correlation::CorrelationId;
use crate::domain::error::DispatchError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Reserved operation identifier that disposes the targeted handle instead
/// of resolving a registered operation.
pub const DISPOSE_IDENTIFIER: &str = "__Dispose";

/// Key of the object-reference literal embedded in argument payloads.
pub const OBJECT_REF_KEY: &str = "__dotNetObject";

/// Opaque handle to an object registered on this channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectHandleId(pub u64);

impl fmt::Display for ObjectHandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One inbound call request, minus its argument payload.
///
/// Exactly one of `module` and `target_handle` must be set: a call targets
/// either a static operation in a declaring module or an instance behind a
/// handle, never both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationInfo {
    /// Operation identifier to resolve
    pub operation_identifier: String,
    /// Declaring module for static calls
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caller_context_id: Option<String>,
    /// Instance handle for instance calls
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<ObjectHandleId>,
    /// Present when the caller wants a completion; absent = fire-and-forget
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<CorrelationId>,
}

impl InvocationInfo {
    /// Static call addressed to a declaring module
    pub fn static_call(module: impl Into<String>, operation: impl Into<String>) -> Self {
        Self {
            operation_identifier: operation.into(),
            caller_context_id: Some(module.into()),
            target_handle: None,
            correlation_id: None,
        }
    }

    /// Instance call addressed to a handle
    pub fn instance_call(handle: ObjectHandleId, operation: impl Into<String>) -> Self {
        Self {
            operation_identifier: operation.into(),
            caller_context_id: None,
            target_handle: Some(handle),
            correlation_id: None,
        }
    }

    /// Attach a correlation id (the caller wants a completion)
    pub fn with_correlation(mut self, id: CorrelationId) -> Self {
        self.correlation_id = Some(id);
        self
    }
}

/// Outcome of one dispatched call: a value, a void acknowledgment, or a
/// structured failure. Never both a value and a failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InvocationResult {
    /// Completed; `None` means void (no payload)
    Success(Option<Value>),
    /// Failed with a tagged error
    Failure(DispatchError),
}

impl InvocationResult {
    pub fn is_success(&self) -> bool {
        matches!(self, InvocationResult::Success(_))
    }

    /// The failure, if any
    pub fn failure(&self) -> Option<&DispatchError> {
        match self {
            InvocationResult::Failure(e) => Some(e),
            InvocationResult::Success(_) => None,
        }
    }
}

/// Expected type of one target parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParamType {
    Bool,
    Integer,
    Float,
    Text,
    /// Any JSON value passed through untyped
    Json,
    /// Object-reference literal resolving to a registered handle
    Handle,
}

impl ParamType {
    /// Name used in error messages
    pub fn name(&self) -> &'static str {
        match self {
            ParamType::Bool => "Bool",
            ParamType::Integer => "Integer",
            ParamType::Float => "Float",
            ParamType::Text => "Text",
            ParamType::Json => "Json",
            ParamType::Handle => "Handle",
        }
    }
}

/// One decoded argument. Position within the list maps to the parameter at
/// the same position.
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    Json(Value),
    Handle(ObjectHandleId),
}

impl Argument {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Argument::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Argument::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_handle(&self) -> Option<ObjectHandleId> {
        match self {
            Argument::Handle(h) => Some(*h),
            _ => None,
        }
    }
}

/// Ordered, fully decoded argument list.
pub type ArgumentList = Vec<Argument>;
