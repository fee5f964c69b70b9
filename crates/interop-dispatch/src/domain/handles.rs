//! Object Handle Table - opaque handles for objects exposed across the
//! channel.
//!
//! Handle ids are assigned monotonically and never reused within a channel's
//! lifetime, so a disposed id can never alias a later registration.

use crate::domain::error::{DispatchError, DispatchResult};
use crate::domain::invocation::ObjectHandleId;
use dashmap::DashMap;
use std::any::Any;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// A registered object reference.
pub type InstanceRef = Arc<dyn Any + Send + Sync>;

/// One table entry: the object plus the registration scope used to resolve
/// instance operations against it.
#[derive(Clone)]
pub struct HandleEntry {
    /// The object the handle refers to
    pub value: InstanceRef,
    /// Scope key instance operations were registered under
    pub type_key: String,
}

impl std::fmt::Debug for HandleEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandleEntry")
            .field("value", &"<dyn Any>")
            .field("type_key", &self.type_key)
            .finish()
    }
}

/// Maps opaque handle ids to registered objects; owns their lifetime.
///
/// The referenced object stays alive at least as long as any holder of the
/// entry's `Arc` - disposal drops the table's reference, not outstanding
/// clones.
pub struct ObjectHandleTable {
    entries: DashMap<u64, HandleEntry>,
    next_id: AtomicU64,
}

impl ObjectHandleTable {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register an object and return its fresh handle.
    pub fn register(&self, value: InstanceRef, type_key: impl Into<String>) -> ObjectHandleId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let type_key = type_key.into();
        self.entries.insert(
            id,
            HandleEntry {
                value,
                type_key: type_key.clone(),
            },
        );
        debug!(handle = id, type_key = %type_key, "Registered object handle");
        ObjectHandleId(id)
    }

    /// Resolve a handle to its entry.
    pub fn resolve(&self, handle: ObjectHandleId) -> DispatchResult<HandleEntry> {
        self.entries
            .get(&handle.0)
            .map(|entry| entry.clone())
            .ok_or_else(|| DispatchError::unknown_object(handle.0))
    }

    /// Dispose a handle. Returns false if the id was never registered or
    /// was already disposed; subsequent resolves of the id always miss.
    pub fn dispose(&self, handle: ObjectHandleId) -> bool {
        let removed = self.entries.remove(&handle.0).is_some();
        if removed {
            debug!(handle = handle.0, "Disposed object handle");
        }
        removed
    }

    /// Number of live handles
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ObjectHandleTable {
    fn default() -> Self {
        Self::new()
    }
}
