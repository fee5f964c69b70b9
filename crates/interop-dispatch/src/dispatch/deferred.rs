//! Asynchronous dispatcher: inbound calls whose result may settle later.
//!
//! The pipeline is the synchronous one up to invocation. A deferred outcome
//! gets a spawned continuation that delivers exactly one completion through
//! the transport; nothing ever blocks waiting for it. Calls without a
//! correlation id opted out of notification, so their failures are logged
//! and swallowed.

use crate::codec::completion::{encode_failure, encode_success};
use crate::dispatch::{decode_args, resolve_call, ResolvedCall};
use crate::domain::correlation::CorrelationId;
use crate::domain::error::DispatchError;
use crate::domain::invocation::InvocationInfo;
use crate::ports::transport::Transport;
use crate::registry::CallOutcome;
use crate::service::CallChannel;
use std::sync::Arc;
use tracing::{debug, error};

/// Begin one inbound call; completions (if requested) go out through the
/// channel's transport.
pub(crate) async fn begin_invoke(channel: &CallChannel, info: &InvocationInfo, raw_args: &str) {
    let correlation_id = info.correlation_id.clone();
    let operation = info.operation_identifier.clone();

    let invocation = resolve_call(channel, info).and_then(|resolved| match resolved {
        ResolvedCall::Disposed => Ok(None),
        ResolvedCall::Target {
            receiver,
            descriptor,
        } => {
            let args = decode_args(channel, info, raw_args, &descriptor)?;
            Some((descriptor.operation)(receiver, args).map_err(DispatchError::from)).transpose()
        }
    });

    let outcome = match invocation {
        // Disposal: nothing was invoked, acknowledge void
        Ok(None) => {
            send_success(channel.transport(), correlation_id.as_ref(), None).await;
            return;
        }
        Ok(Some(outcome)) => outcome,
        Err(e) => {
            report_failure(channel.transport(), correlation_id.as_ref(), &operation, e).await;
            return;
        }
    };

    match outcome {
        CallOutcome::Immediate(value) => {
            send_success(channel.transport(), correlation_id.as_ref(), value).await;
        }
        CallOutcome::Deferred(future) => {
            let transport = Arc::clone(channel.transport());
            tokio::spawn(async move {
                match future.await {
                    Ok(value) => {
                        send_success(&transport, correlation_id.as_ref(), value).await;
                    }
                    Err(target_error) => {
                        report_failure(
                            &transport,
                            correlation_id.as_ref(),
                            &operation,
                            target_error.into(),
                        )
                        .await;
                    }
                }
            });
        }
    }
}

async fn send_success(
    transport: &Arc<dyn Transport>,
    correlation_id: Option<&CorrelationId>,
    value: Option<serde_json::Value>,
) {
    let Some(correlation_id) = correlation_id else {
        // Fire-and-forget; nobody is listening for the result
        return;
    };
    deliver(transport, encode_success(correlation_id, value)).await;
}

async fn report_failure(
    transport: &Arc<dyn Transport>,
    correlation_id: Option<&CorrelationId>,
    operation: &str,
    failure: DispatchError,
) {
    match correlation_id {
        Some(correlation_id) => {
            debug!(
                correlation_id = %correlation_id,
                operation = operation,
                kind = %failure.kind,
                "Asynchronous call failed; sending failure completion"
            );
            deliver(transport, encode_failure(correlation_id, &failure)).await;
        }
        None => {
            // The caller declined notification
            debug!(
                operation = operation,
                kind = %failure.kind,
                "Fire-and-forget call failed; failure swallowed"
            );
        }
    }
}

async fn deliver(transport: &Arc<dyn Transport>, message: String) {
    if let Err(e) = transport.send(message).await {
        error!(error = %e, "Failed to deliver completion");
    }
}
