//! Resource Leases
//!
//! Non-blocking exclusive-use claims on shared resource instances (pooled clients and the
//! like). Acquiring a lease either succeeds immediately or fails immediately; a caller that
//! finds every instance leased creates another one instead of waiting.

use parking_lot::Mutex;
use std::ops::Deref;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

/// A resource instance guarded by a lease flag
#[derive(Debug)]
pub struct Leasable<T> {
    resource: T,
    leased: AtomicBool,
}

impl<T> Leasable<T> {
    pub fn new(resource: T) -> Self {
        Self {
            resource,
            leased: AtomicBool::new(false),
        }
    }

    /// Claim exclusive use. Returns `None` without blocking if already leased.
    pub fn try_use(self: &Arc<Self>) -> Option<LeaseGuard<T>> {
        self.leased
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| LeaseGuard {
                inner: Arc::clone(self),
            })
    }

    pub fn is_leased(&self) -> bool {
        self.leased.load(Ordering::Acquire)
    }
}

/// Exclusive use of a [`Leasable`]; released on drop.
#[derive(Debug)]
pub struct LeaseGuard<T> {
    inner: Arc<Leasable<T>>,
}

impl<T> Deref for LeaseGuard<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.inner.resource
    }
}

impl<T> Drop for LeaseGuard<T> {
    fn drop(&mut self) {
        self.inner.leased.store(false, Ordering::Release);
    }
}

/// Growable set of leasable instances.
#[derive(Debug)]
pub struct LeasePool<T> {
    instances: Mutex<Vec<Arc<Leasable<T>>>>,
}

impl<T> Default for LeasePool<T> {
    fn default() -> Self {
        Self {
            instances: Mutex::new(Vec::new()),
        }
    }
}

impl<T> LeasePool<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lease the first free instance, or create, register and lease a new one.
    pub fn acquire<F>(&self, create: F) -> LeaseGuard<T>
    where
        F: FnOnce() -> T,
    {
        if let Some(guard) = self.instances.lock().iter().find_map(|i| i.try_use()) {
            return guard;
        }

        let instance = Arc::new(Leasable {
            resource: create(),
            leased: AtomicBool::new(true),
        });
        let mut instances = self.instances.lock();
        instances.push(Arc::clone(&instance));
        debug!(instances = instances.len(), "Created new leasable instance");
        LeaseGuard { inner: instance }
    }

    /// Number of instances ever created by this pool
    pub fn len(&self) -> usize {
        self.instances.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.lock().is_empty()
    }

    pub fn leased_count(&self) -> usize {
        self.instances
            .lock()
            .iter()
            .filter(|i| i.is_leased())
            .count()
    }
}
