//! Dispatch error taxonomy.
//!
//! Every failure a caller can observe through the channel is a
//! `DispatchError` with one of the fixed [`ErrorKind`] tags. Decode and
//! resolution failures keep their specific kind; failures raised by an
//! invoked target are re-tagged [`ErrorKind::InvocationFailure`] with the
//! target's message preserved.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The fixed set of wire-visible failure kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Payload is not structurally valid for its position (bad JSON, wrong
    /// top-level token, wrong element type).
    MalformedPayload,
    /// Supplied argument count does not match the target's parameter count.
    ArityMismatch,
    /// An object-reference literal was aimed at a non-handle parameter.
    InvalidHandleUsage,
    /// A handle id does not (or no longer does) name a registered object.
    UnknownObjectReference,
    /// No operation registered under the given identifier in scope.
    MethodNotFound,
    /// The request mixes (or omits both of) the two addressing modes.
    InvalidInvocation,
    /// The invoked target itself reported a failure.
    InvocationFailure,
    /// A completion arrived for a correlation id with no pending call.
    UnknownCorrelationId,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::MalformedPayload => "MalformedPayload",
            ErrorKind::ArityMismatch => "ArityMismatch",
            ErrorKind::InvalidHandleUsage => "InvalidHandleUsage",
            ErrorKind::UnknownObjectReference => "UnknownObjectReference",
            ErrorKind::MethodNotFound => "MethodNotFound",
            ErrorKind::InvalidInvocation => "InvalidInvocation",
            ErrorKind::InvocationFailure => "InvocationFailure",
            ErrorKind::UnknownCorrelationId => "UnknownCorrelationId",
        };
        f.write_str(name)
    }
}

/// Structured dispatch failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchError {
    /// Failure kind
    pub kind: ErrorKind,
    /// Human-readable message
    pub message: String,
}

impl DispatchError {
    /// Create an error with an explicit kind
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Malformed payload (bad JSON, wrong shape)
    pub fn malformed_payload(details: impl Into<String>) -> Self {
        Self::new(ErrorKind::MalformedPayload, details.into())
    }

    /// Argument count does not match the target's parameter count
    pub fn arity_mismatch(operation: &str, expected: usize, received: usize) -> Self {
        Self::new(
            ErrorKind::ArityMismatch,
            format!(
                "operation '{}' expects {} argument(s) but received {}",
                operation, expected, received
            ),
        )
    }

    /// Arguments keep going past the target's last parameter
    pub fn trailing_arguments(operation: &str, expected: usize, received: usize) -> Self {
        Self::new(
            ErrorKind::ArityMismatch,
            format!(
                "operation '{}' expects {} argument(s) but the payload carries {} \
                 (unexpected trailing arguments)",
                operation, expected, received
            ),
        )
    }

    /// Object-reference literal aimed at a non-handle parameter
    pub fn invalid_handle_usage(operation: &str, position: usize, expected: &str) -> Self {
        Self::new(
            ErrorKind::InvalidHandleUsage,
            format!(
                "operation '{}' argument {} is an object reference but the parameter \
                 is not of the handle wrapper type '{}'",
                operation, position, expected
            ),
        )
    }

    /// Handle id names no registered object
    pub fn unknown_object(handle: u64) -> Self {
        Self::new(
            ErrorKind::UnknownObjectReference,
            format!("no object registered under handle {}", handle),
        )
    }

    /// No operation under this identifier in the resolved scope
    pub fn method_not_found(scope: &str, identifier: &str) -> Self {
        Self::new(
            ErrorKind::MethodNotFound,
            format!("no operation '{}' in scope '{}'", identifier, scope),
        )
    }

    /// Illegal addressing (handle and module combined, or neither)
    pub fn invalid_invocation(details: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidInvocation, details.into())
    }

    /// Failure raised by the invoked target, message preserved
    pub fn invocation_failure(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvocationFailure, message.into())
    }

    /// Completion for a correlation id with no pending call
    pub fn unknown_correlation(id: &str) -> Self {
        Self::new(
            ErrorKind::UnknownCorrelationId,
            format!("no pending call for correlation id '{}'", id),
        )
    }
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

impl std::error::Error for DispatchError {}

/// Result type for dispatch operations
pub type DispatchResult<T> = Result<T, DispatchError>;

/// Failure raised by an invoked target.
///
/// Targets report failure by returning this instead of panicking; the
/// dispatcher re-tags it as [`ErrorKind::InvocationFailure`] when reporting
/// across the channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetError {
    /// The target's own failure message
    pub message: String,
}

impl TargetError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for TargetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for TargetError {}

impl From<TargetError> for DispatchError {
    fn from(e: TargetError) -> Self {
        DispatchError::invocation_failure(e.message)
    }
}
