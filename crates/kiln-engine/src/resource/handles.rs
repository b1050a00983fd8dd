use core::fmt;
use core::ops::Deref;
use std::collections::HashMap;
use std::sync::Arc;

use crate::batch::BatchId;

use super::id::{ResourceId, SharedResource};
use super::mesh::Mesh;
use super::shader::Shader;

/// Lifetime-extending reference to a shared resource, issued by [`HandleTable`].
///
/// Not `Clone`: every live handle corresponds to exactly one acquisition counted
/// by the table, and is returned to it through [`HandleTable::hold`].
pub struct Handle<T: SharedResource> {
    resource: Arc<T>,
}

impl<T: SharedResource> Handle<T> {
    #[inline]
    pub fn id(&self) -> ResourceId {
        self.resource.id()
    }

    /// The shared resource itself.
    #[inline]
    pub fn shared(&self) -> &Arc<T> {
        &self.resource
    }
}

impl<T: SharedResource> Deref for Handle<T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        &self.resource
    }
}

impl<T: SharedResource + fmt::Debug> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Handle").field(&*self.resource).finish()
    }
}

/// Type-erased handle, used when a batch hands its references back to the table.
#[derive(Debug)]
pub enum AnyHandle {
    Shader(Handle<Shader>),
    Mesh(Handle<Mesh>),
}

impl AnyHandle {
    #[inline]
    pub fn id(&self) -> ResourceId {
        match self {
            Self::Shader(h) => h.id(),
            Self::Mesh(h) => h.id(),
        }
    }
}

impl From<Handle<Shader>> for AnyHandle {
    fn from(h: Handle<Shader>) -> Self {
        Self::Shader(h)
    }
}

impl From<Handle<Mesh>> for AnyHandle {
    fn from(h: Handle<Mesh>) -> Self {
        Self::Mesh(h)
    }
}

/// Reference-count table for shaders and meshes referenced by pending work.
///
/// Lifecycle of a reference:
/// 1) `acquire` when a request is submitted (count += 1)
/// 2) `hold` once the request's batch has been issued to the backend
/// 3) `release_all` when the backend reports the batch consumed (count -= 1)
///
/// The original owner and the table jointly keep a resource alive; it is
/// destroyed when the longest holder lets go.
#[derive(Debug, Default)]
pub struct HandleTable {
    counts: HashMap<ResourceId, u32>,
    in_flight: HashMap<BatchId, Vec<AnyHandle>>,
}

impl HandleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes a shared reference to `resource` and counts it.
    pub fn acquire<T: SharedResource>(&mut self, resource: &Arc<T>) -> Handle<T> {
        *self.counts.entry(resource.id()).or_insert(0) += 1;
        Handle {
            resource: Arc::clone(resource),
        }
    }

    /// Parks the handles of an issued batch until the backend consumes it.
    ///
    /// The batch is tracked even when it holds no handles, so consumption of
    /// every issued batch can be accounted for.
    pub fn hold(&mut self, batch: BatchId, handles: Vec<AnyHandle>) {
        self.in_flight.entry(batch).or_default().extend(handles);
    }

    /// Returns a handle that never reached a batch.
    pub fn release(&mut self, handle: impl Into<AnyHandle>) {
        let handle = handle.into();
        self.decrement(handle.id());
    }

    /// Releases every handle held for `batch`. Returns the number released.
    ///
    /// Releasing an unknown (or already released) batch is a no-op.
    pub fn release_all(&mut self, batch: BatchId) -> usize {
        let Some(handles) = self.in_flight.remove(&batch) else {
            return 0;
        };
        for handle in &handles {
            self.decrement(handle.id());
        }
        handles.len()
    }

    /// Releases every in-flight batch. Only valid once the backend is idle.
    pub fn release_everything(&mut self) -> usize {
        let batches: Vec<BatchId> = self.in_flight.keys().copied().collect();
        let released = batches.into_iter().map(|b| self.release_all(b)).sum();

        if !self.counts.is_empty() {
            log::warn!(
                "handle table torn down with {} resource(s) still counted",
                self.counts.len()
            );
            self.counts.clear();
        }
        released
    }

    /// Current acquisition count of `id` (0 when not referenced).
    #[inline]
    pub fn acquire_count(&self, id: ResourceId) -> u32 {
        self.counts.get(&id).copied().unwrap_or(0)
    }

    /// Whether `batch` is issued and not yet released.
    #[inline]
    pub fn is_held(&self, batch: BatchId) -> bool {
        self.in_flight.contains_key(&batch)
    }

    /// Total outstanding acquisitions across all resources.
    pub fn outstanding(&self) -> u32 {
        self.counts.values().sum()
    }

    /// Number of issued batches whose handles have not been released yet.
    #[inline]
    pub fn in_flight_batches(&self) -> usize {
        self.in_flight.len()
    }

    fn decrement(&mut self, id: ResourceId) {
        if let Some(count) = self.counts.get_mut(&id) {
            *count -= 1;
            if *count == 0 {
                self.counts.remove(&id);
            }
        }
    }
}
