//! Synchronous dispatcher: one inbound call end-to-end, result or
//! structured failure returned immediately.

use crate::dispatch::{decode_args, resolve_call, ResolvedCall};
use crate::domain::error::{DispatchError, DispatchResult};
use crate::domain::invocation::{InvocationInfo, InvocationResult};
use crate::registry::CallOutcome;
use crate::service::CallChannel;
use serde_json::Value;
use tracing::debug;

/// Execute one inbound call and return its result.
///
/// Decode and resolution failures keep their specific kind; a failure
/// raised by the target itself comes back as `InvocationFailure` with the
/// target's message preserved. The dispatcher never propagates a per-call
/// error as anything but a `Failure` result.
pub(crate) fn invoke_sync(
    channel: &CallChannel,
    info: &InvocationInfo,
    raw_args: &str,
) -> InvocationResult {
    match run(channel, info, raw_args) {
        Ok(value) => InvocationResult::Success(value),
        Err(error) => {
            debug!(
                operation = %info.operation_identifier,
                kind = %error.kind,
                "Synchronous call failed"
            );
            InvocationResult::Failure(error)
        }
    }
}

fn run(
    channel: &CallChannel,
    info: &InvocationInfo,
    raw_args: &str,
) -> DispatchResult<Option<Value>> {
    let (receiver, descriptor) = match resolve_call(channel, info)? {
        ResolvedCall::Disposed => return Ok(None),
        ResolvedCall::Target {
            receiver,
            descriptor,
        } => (receiver, descriptor),
    };

    let args = decode_args(channel, info, raw_args, &descriptor)?;

    match (descriptor.operation)(receiver, args) {
        Ok(CallOutcome::Immediate(value)) => Ok(value),
        // Never block a thread waiting on a deferred computation.
        Ok(CallOutcome::Deferred(_)) => Err(DispatchError::invocation_failure(format!(
            "operation '{}' returned a deferred computation; use the asynchronous dispatcher",
            info.operation_identifier
        ))),
        Err(target_error) => Err(target_error.into()),
    }
}
