//! Dispatch pipelines: inbound sync, inbound async, outbound completion.

pub mod deferred;
pub mod outbound;
pub mod sync;

use crate::codec::args::decode_arguments_bounded;
use crate::domain::error::{DispatchError, DispatchResult};
use crate::domain::handles::InstanceRef;
use crate::domain::invocation::{ArgumentList, InvocationInfo, DISPOSE_IDENTIFIER};
use crate::registry::{MethodDescriptor, TargetScope};
use crate::service::CallChannel;
use tracing::debug;

/// Result of the shared resolution pipeline.
pub(crate) enum ResolvedCall {
    /// The reserved disposal identifier was intercepted; nothing to invoke
    Disposed,
    /// A resolved target ready to invoke
    Target {
        receiver: Option<InstanceRef>,
        descriptor: MethodDescriptor,
    },
}

/// Shared front half of both dispatchers: resolve the handle, reject mixed
/// addressing, intercept disposal, resolve the operation.
pub(crate) fn resolve_call(
    channel: &CallChannel,
    info: &InvocationInfo,
) -> DispatchResult<ResolvedCall> {
    let identifier = info.operation_identifier.as_str();

    if let Some(handle) = info.target_handle {
        let entry = channel.handles().resolve(handle)?;

        if let Some(module) = &info.caller_context_id {
            return Err(DispatchError::invalid_invocation(format!(
                "operation '{}' addresses both handle {} and module '{}'; \
                 pick exactly one",
                identifier, handle, module
            )));
        }

        if identifier == DISPOSE_IDENTIFIER {
            channel.handles().dispose(handle);
            debug!(handle = %handle, "Disposal intercepted");
            return Ok(ResolvedCall::Disposed);
        }

        let scope = TargetScope::Instance(entry.type_key.clone());
        let descriptor = channel
            .resolver()
            .resolve(&scope, identifier)
            .ok_or_else(|| DispatchError::method_not_found(scope.name(), identifier))?;

        Ok(ResolvedCall::Target {
            receiver: Some(entry.value),
            descriptor,
        })
    } else {
        let module = info.caller_context_id.as_deref().ok_or_else(|| {
            DispatchError::invalid_invocation(format!(
                "operation '{}' names neither a target handle nor a declaring module",
                identifier
            ))
        })?;

        let scope = TargetScope::Module(module.to_string());
        let descriptor = channel
            .resolver()
            .resolve(&scope, identifier)
            .ok_or_else(|| DispatchError::method_not_found(module, identifier))?;

        Ok(ResolvedCall::Target {
            receiver: None,
            descriptor,
        })
    }
}

/// Decode the raw argument payload against a resolved descriptor.
pub(crate) fn decode_args(
    channel: &CallChannel,
    info: &InvocationInfo,
    raw_args: &str,
    descriptor: &MethodDescriptor,
) -> DispatchResult<ArgumentList> {
    decode_arguments_bounded(
        &info.operation_identifier,
        raw_args,
        &descriptor.params,
        channel.config().max_args_bytes,
    )
}
