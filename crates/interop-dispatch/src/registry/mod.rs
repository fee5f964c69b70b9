//! Operation resolution: identifier -> invokable target + parameter types.
//!
//! The dispatcher never inspects types itself; it consumes lookups against
//! an explicit registration table built at startup. Resolution results are
//! cacheable per (scope, identifier) since signatures are static for the
//! process lifetime.

use crate::domain::error::TargetError;
use crate::domain::handles::InstanceRef;
use crate::domain::invocation::{ArgumentList, ParamType};
use dashmap::DashMap;
use futures::future::BoxFuture;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// Where an operation identifier is resolved.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TargetScope {
    /// Static operation declared by a module
    Module(String),
    /// Instance operation registered under a type key
    Instance(String),
}

impl TargetScope {
    /// Scope name for error messages
    pub fn name(&self) -> &str {
        match self {
            TargetScope::Module(m) => m,
            TargetScope::Instance(t) => t,
        }
    }
}

impl fmt::Display for TargetScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetScope::Module(m) => write!(f, "module '{}'", m),
            TargetScope::Instance(t) => write!(f, "instance type '{}'", t),
        }
    }
}

/// What a target produced when invoked.
pub enum CallOutcome {
    /// Finished immediately; `None` means void
    Immediate(Option<Value>),
    /// Settles later; the dispatcher attaches a continuation
    Deferred(BoxFuture<'static, Result<Option<Value>, TargetError>>),
}

/// An invokable operation. Receives the resolved receiver (`None` for
/// static targets) and the decoded argument list.
pub type OperationFn =
    Arc<dyn Fn(Option<InstanceRef>, ArgumentList) -> Result<CallOutcome, TargetError> + Send + Sync>;

/// A resolved target: the invokable plus its ordered parameter types.
#[derive(Clone)]
pub struct MethodDescriptor {
    pub operation: OperationFn,
    pub params: Arc<[ParamType]>,
}

impl MethodDescriptor {
    /// Descriptor for a target that completes immediately.
    pub fn immediate<F>(params: impl Into<Arc<[ParamType]>>, f: F) -> Self
    where
        F: Fn(Option<InstanceRef>, ArgumentList) -> Result<Option<Value>, TargetError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            operation: Arc::new(move |receiver, args| {
                f(receiver, args).map(CallOutcome::Immediate)
            }),
            params: params.into(),
        }
    }

    /// Descriptor for a target that returns a deferred computation.
    pub fn deferred<F>(params: impl Into<Arc<[ParamType]>>, f: F) -> Self
    where
        F: Fn(Option<InstanceRef>, ArgumentList) -> BoxFuture<'static, Result<Option<Value>, TargetError>>
            + Send
            + Sync
            + 'static,
    {
        Self {
            operation: Arc::new(move |receiver, args| Ok(CallOutcome::Deferred(f(receiver, args)))),
            params: params.into(),
        }
    }
}

impl fmt::Debug for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDescriptor")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// Lookup capability the dispatcher consumes.
pub trait OperationResolver: Send + Sync {
    /// Resolve an identifier within a scope, or `None` if unregistered.
    fn resolve(&self, scope: &TargetScope, identifier: &str) -> Option<MethodDescriptor>;
}

/// Explicit registration table built at startup.
#[derive(Default)]
pub struct OperationTable {
    entries: HashMap<(TargetScope, String), MethodDescriptor>,
}

impl OperationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a static operation under a declaring module.
    pub fn register_static(
        &mut self,
        module: impl Into<String>,
        identifier: impl Into<String>,
        descriptor: MethodDescriptor,
    ) -> &mut Self {
        self.entries.insert(
            (TargetScope::Module(module.into()), identifier.into()),
            descriptor,
        );
        self
    }

    /// Register an instance operation under a type key.
    pub fn register_instance(
        &mut self,
        type_key: impl Into<String>,
        identifier: impl Into<String>,
        descriptor: MethodDescriptor,
    ) -> &mut Self {
        self.entries.insert(
            (TargetScope::Instance(type_key.into()), identifier.into()),
            descriptor,
        );
        self
    }

    /// Number of registered operations
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl OperationResolver for OperationTable {
    fn resolve(&self, scope: &TargetScope, identifier: &str) -> Option<MethodDescriptor> {
        self.entries
            .get(&(scope.clone(), identifier.to_string()))
            .cloned()
    }
}

/// Caching wrapper over any resolver.
///
/// Signatures never change at runtime, so a (scope, identifier) pair is
/// resolved against the inner resolver at most once.
pub struct CachedResolver {
    inner: Arc<dyn OperationResolver>,
    cache: DashMap<(TargetScope, String), MethodDescriptor>,
}

impl CachedResolver {
    pub fn new(inner: Arc<dyn OperationResolver>) -> Self {
        Self {
            inner,
            cache: DashMap::new(),
        }
    }

    /// Resolve through the cache.
    pub fn resolve(&self, scope: &TargetScope, identifier: &str) -> Option<MethodDescriptor> {
        let key = (scope.clone(), identifier.to_string());
        if let Some(hit) = self.cache.get(&key) {
            trace!(scope = %scope, identifier = identifier, "Resolver cache hit");
            return Some(hit.clone());
        }

        let descriptor = self.inner.resolve(scope, identifier)?;
        self.cache.insert(key, descriptor.clone());
        Some(descriptor)
    }

    /// Number of cached resolutions
    pub fn cached_count(&self) -> usize {
        self.cache.len()
    }
}
