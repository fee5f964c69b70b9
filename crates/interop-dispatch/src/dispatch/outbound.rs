//! Outbound calls: issue a call to the other side and route its completion
//! back into the pending-call store.

use crate::codec::completion::decode_completion;
use crate::domain::correlation::CorrelationId;
use crate::domain::error::{DispatchError, DispatchResult};
use crate::domain::invocation::{InvocationInfo, InvocationResult};
use crate::domain::pending::CompletionOutcome;
use crate::service::CallChannel;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::debug;

/// Wire form of an outbound call request: the invocation fields plus the
/// positional argument array.
#[derive(Serialize)]
struct OutboundCallRequest<'a> {
    #[serde(flatten)]
    info: &'a InvocationInfo,
    args: &'a [Value],
}

/// Issue an outbound call and return the receiver its completion will be
/// written into. The registration is rolled back if the send fails.
pub(crate) async fn issue_call(
    channel: &CallChannel,
    operation: &str,
    args: &[Value],
    timeout: Option<Duration>,
) -> DispatchResult<(CorrelationId, oneshot::Receiver<InvocationResult>)> {
    let (correlation_id, rx) = channel.pending().register(operation, timeout);

    let info = InvocationInfo {
        operation_identifier: operation.to_string(),
        caller_context_id: None,
        target_handle: None,
        correlation_id: Some(correlation_id.clone()),
    };
    let request = OutboundCallRequest { info: &info, args };
    let message = serde_json::to_string(&request).map_err(|e| {
        channel.pending().cancel(&correlation_id);
        DispatchError::malformed_payload(format!(
            "could not encode outbound call '{}': {}",
            operation, e
        ))
    })?;

    if let Err(e) = channel.transport().send(message).await {
        channel.pending().cancel(&correlation_id);
        return Err(DispatchError::invocation_failure(format!(
            "could not send outbound call '{}': {}",
            operation, e
        )));
    }

    debug!(
        correlation_id = %correlation_id,
        operation = operation,
        "Issued outbound call"
    );

    Ok((correlation_id, rx))
}

/// Issue an outbound call and await its completion under a timeout.
///
/// The protocol has no native cancellation; this is the call-site timeout
/// policy bounding a completion that never arrives.
pub(crate) async fn call(
    channel: &CallChannel,
    operation: &str,
    args: &[Value],
    timeout: Option<Duration>,
) -> InvocationResult {
    let bound = timeout.unwrap_or(channel.config().call_timeout);

    let (correlation_id, rx) = match issue_call(channel, operation, args, Some(bound)).await {
        Ok(issued) => issued,
        Err(e) => return InvocationResult::Failure(e),
    };

    match tokio::time::timeout(bound, rx).await {
        Ok(Ok(result)) => result,
        Ok(Err(_)) => InvocationResult::Failure(DispatchError::invocation_failure(format!(
            "completion slot for '{}' was dropped before a result arrived",
            operation
        ))),
        Err(_) => {
            channel.pending().cancel(&correlation_id);
            InvocationResult::Failure(DispatchError::invocation_failure(format!(
                "outbound call '{}' timed out after {:?}",
                operation, bound
            )))
        }
    }
}

/// Route a completion message from the other side into its pending call.
///
/// An unknown correlation id is a protocol violation - either a duplicate
/// completion or a dispatcher bug - and is reported, never dropped.
pub(crate) fn complete_outbound(channel: &CallChannel, raw_json: &str) -> DispatchResult<()> {
    let message = decode_completion(raw_json)?;

    let result = if message.success {
        InvocationResult::Success(Some(message.payload))
    } else {
        InvocationResult::Failure(decode_error_slot(message.payload))
    };

    match channel.pending().complete(&message.correlation_id, result) {
        CompletionOutcome::Delivered | CompletionOutcome::Abandoned => Ok(()),
        CompletionOutcome::Unknown => Err(DispatchError::unknown_correlation(
            message.correlation_id.as_str(),
        )),
    }
}

/// Read the error slot of a failure completion. The canonical form is the
/// serialized `DispatchError`; a plain string is accepted as the message.
fn decode_error_slot(payload: Value) -> DispatchError {
    match serde_json::from_value::<DispatchError>(payload.clone()) {
        Ok(error) => error,
        Err(_) => match payload {
            Value::String(message) => DispatchError::invocation_failure(message),
            other => DispatchError::invocation_failure(other.to_string()),
        },
    }
}
