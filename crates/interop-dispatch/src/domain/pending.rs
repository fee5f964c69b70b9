//! Pending outbound calls awaiting completion from the other side.
//!
//! Each outbound call registers a single-assignment completion slot keyed by
//! its correlation id. Completing a call removes the slot, so a second
//! completion for the same id finds nothing - the at-most-once discipline
//! falls out of the map removal.

use crate::domain::correlation::CorrelationId;
use crate::domain::invocation::InvocationResult;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tracing::{debug, warn};

/// One call waiting for its completion.
struct PendingCall {
    /// Single-assignment slot the result is written into
    sender: oneshot::Sender<InvocationResult>,
    /// When the call was issued
    issued_at: Instant,
    /// Operation name, for logging
    operation: String,
    /// Bound applied by `remove_expired`
    timeout: Duration,
}

/// What happened to a completion attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// The slot was written and the waiter released
    Delivered,
    /// The call was pending but its waiter already gave up
    Abandoned,
    /// No pending call under this correlation id
    Unknown,
}

/// Counters over the store's lifetime.
#[derive(Debug, Default)]
pub struct PendingStats {
    pub total_registered: AtomicU64,
    pub total_completed: AtomicU64,
    pub total_cancelled: AtomicU64,
    pub total_expired: AtomicU64,
}

/// Store of pending outbound calls.
///
/// Flow:
/// 1. The outbound path registers a call and gets a receiver plus a fresh
///    correlation id.
/// 2. The call request goes out over the transport carrying that id.
/// 3. A completion message arrives and `complete()` writes the result into
///    the slot, exactly once.
pub struct PendingCallStore {
    pending: DashMap<CorrelationId, PendingCall>,
    default_timeout: Duration,
    stats: Arc<PendingStats>,
}

impl PendingCallStore {
    pub fn new(default_timeout: Duration) -> Self {
        Self {
            pending: DashMap::new(),
            default_timeout,
            stats: Arc::new(PendingStats::default()),
        }
    }

    /// Register a pending call under a fresh correlation id.
    pub fn register(
        &self,
        operation: &str,
        timeout: Option<Duration>,
    ) -> (CorrelationId, oneshot::Receiver<InvocationResult>) {
        let correlation_id = CorrelationId::new();
        let (tx, rx) = oneshot::channel();

        self.pending.insert(
            correlation_id.clone(),
            PendingCall {
                sender: tx,
                issued_at: Instant::now(),
                operation: operation.to_string(),
                timeout: timeout.unwrap_or(self.default_timeout),
            },
        );
        self.stats.total_registered.fetch_add(1, Ordering::Relaxed);

        debug!(
            correlation_id = %correlation_id,
            operation = operation,
            "Registered pending outbound call"
        );

        (correlation_id, rx)
    }

    /// Write the result into a pending call's slot, at most once.
    ///
    /// The entry is removed either way; a later attempt for the same id
    /// reports [`CompletionOutcome::Unknown`].
    pub fn complete(
        &self,
        correlation_id: &CorrelationId,
        result: InvocationResult,
    ) -> CompletionOutcome {
        if let Some((_, call)) = self.pending.remove(correlation_id) {
            let elapsed = call.issued_at.elapsed();
            match call.sender.send(result) {
                Ok(()) => {
                    self.stats.total_completed.fetch_add(1, Ordering::Relaxed);
                    debug!(
                        correlation_id = %correlation_id,
                        operation = call.operation,
                        elapsed_ms = elapsed.as_millis(),
                        "Completed pending outbound call"
                    );
                    CompletionOutcome::Delivered
                }
                Err(_) => {
                    // Receiver dropped; the call site gave up waiting
                    self.stats.total_cancelled.fetch_add(1, Ordering::Relaxed);
                    debug!(
                        correlation_id = %correlation_id,
                        operation = call.operation,
                        "Pending call receiver dropped"
                    );
                    CompletionOutcome::Abandoned
                }
            }
        } else {
            warn!(
                correlation_id = %correlation_id,
                "Completion for unknown or already-completed correlation id"
            );
            CompletionOutcome::Unknown
        }
    }

    /// Drop a pending call without completing it.
    pub fn cancel(&self, correlation_id: &CorrelationId) -> bool {
        if self.pending.remove(correlation_id).is_some() {
            self.stats.total_cancelled.fetch_add(1, Ordering::Relaxed);
            true
        } else {
            false
        }
    }

    /// Drop calls whose bound elapsed. Returns how many were removed.
    ///
    /// The protocol has no native cancellation; this is the explicit
    /// timeout policy bounding calls that never settle.
    pub fn remove_expired(&self) -> usize {
        let now = Instant::now();
        let mut removed = 0;

        self.pending.retain(|id, call| {
            let elapsed = now.duration_since(call.issued_at);
            if elapsed > call.timeout {
                warn!(
                    correlation_id = %id,
                    operation = call.operation,
                    elapsed_ms = elapsed.as_millis(),
                    "Removing expired pending call"
                );
                self.stats.total_expired.fetch_add(1, Ordering::Relaxed);
                removed += 1;
                false
            } else {
                true
            }
        });

        removed
    }

    /// Number of calls currently pending
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Whether a correlation id is still pending
    pub fn is_pending(&self, correlation_id: &CorrelationId) -> bool {
        self.pending.contains_key(correlation_id)
    }

    pub fn stats(&self) -> &PendingStats {
        &self.stats
    }
}

/// Background sweep dropping expired pending calls.
pub async fn cleanup_task(store: Arc<PendingCallStore>, interval: Duration) {
    let mut sweep = tokio::time::interval(interval);
    sweep.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        sweep.tick().await;
        let removed = store.remove_expired();
        if removed > 0 {
            debug!(removed = removed, "Swept expired pending calls");
        }
    }
}
