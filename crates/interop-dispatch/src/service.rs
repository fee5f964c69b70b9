//! Per-channel aggregate tying the dispatch core together.
//!
//! One `CallChannel` scopes all shared mutable state - the object handle
//! table, the resolver cache, and the pending-call store - to a single
//! channel instance. Nothing here is process-global; two channels never
//! share handles or correlation ids.

use crate::domain::config::{ChannelConfig, ConfigError};
use crate::domain::correlation::CorrelationId;
use crate::domain::error::DispatchResult;
use crate::domain::handles::{InstanceRef, ObjectHandleTable};
use crate::domain::invocation::{InvocationInfo, InvocationResult, ObjectHandleId};
use crate::domain::pending::{cleanup_task, PendingCallStore};
use crate::ports::transport::Transport;
use crate::registry::{CachedResolver, OperationResolver};
use crate::dispatch;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// One side of a bidirectional call bridge.
pub struct CallChannel {
    config: ChannelConfig,
    handles: ObjectHandleTable,
    resolver: CachedResolver,
    pending: Arc<PendingCallStore>,
    transport: Arc<dyn Transport>,
}

impl CallChannel {
    /// Create a channel over the given resolver and transport.
    pub fn new(
        config: ChannelConfig,
        resolver: Arc<dyn OperationResolver>,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let pending = Arc::new(PendingCallStore::new(config.call_timeout));
        Ok(Self {
            config,
            handles: ObjectHandleTable::new(),
            resolver: CachedResolver::new(resolver),
            pending,
            transport,
        })
    }

    // Inbound

    /// Execute one inbound call synchronously and return its result.
    pub fn invoke_sync(&self, info: &InvocationInfo, raw_args: &str) -> InvocationResult {
        dispatch::sync::invoke_sync(self, info, raw_args)
    }

    /// Begin one inbound call whose result may settle later; the completion
    /// (if the caller asked for one) goes out through the transport.
    pub async fn begin_invoke(&self, info: &InvocationInfo, raw_args: &str) {
        dispatch::deferred::begin_invoke(self, info, raw_args).await;
    }

    // Outbound

    /// Issue a call to the other side; the returned receiver settles when
    /// the completion arrives.
    pub async fn issue_call(
        &self,
        operation: &str,
        args: &[Value],
        timeout: Option<Duration>,
    ) -> DispatchResult<(CorrelationId, oneshot::Receiver<InvocationResult>)> {
        dispatch::outbound::issue_call(self, operation, args, timeout).await
    }

    /// Issue a call and await its completion under a timeout.
    pub async fn call(
        &self,
        operation: &str,
        args: &[Value],
        timeout: Option<Duration>,
    ) -> InvocationResult {
        dispatch::outbound::call(self, operation, args, timeout).await
    }

    /// Route an inbound completion message to its pending call.
    pub fn complete_outbound(&self, raw_json: &str) -> DispatchResult<()> {
        dispatch::outbound::complete_outbound(self, raw_json)
    }

    // Handles

    /// Expose an object to the other side; instance operations resolve
    /// against `type_key`.
    pub fn register_object(
        &self,
        value: InstanceRef,
        type_key: impl Into<String>,
    ) -> ObjectHandleId {
        self.handles.register(value, type_key)
    }

    /// Dispose a handle directly (the local analogue of an inbound disposal
    /// call).
    pub fn dispose_object(&self, handle: ObjectHandleId) -> bool {
        self.handles.dispose(handle)
    }

    // Maintenance

    /// Spawn the background sweep that drops expired pending calls.
    pub fn spawn_pending_sweeper(&self) -> JoinHandle<()> {
        tokio::spawn(cleanup_task(
            Arc::clone(&self.pending),
            self.config.sweep_interval,
        ))
    }

    /// Number of outbound calls awaiting completion
    pub fn pending_count(&self) -> usize {
        self.pending.pending_count()
    }

    // Internals shared with the dispatch pipelines

    pub(crate) fn config(&self) -> &ChannelConfig {
        &self.config
    }

    pub(crate) fn handles(&self) -> &ObjectHandleTable {
        &self.handles
    }

    pub(crate) fn resolver(&self) -> &CachedResolver {
        &self.resolver
    }

    pub(crate) fn pending(&self) -> &Arc<PendingCallStore> {
        &self.pending
    }

    pub(crate) fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }
}
