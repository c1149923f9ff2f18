//! Memory accounting for dynamic endpoints.
//!
//! Each active endpoint owns three resources: the device instance, its
//! endpoint descriptor and its data version block. Every one of them is
//! reserved from an [`EndpointAllocator`] before it is built and released
//! when it is dropped, so an allocator with a budget can refuse a new
//! endpoint and `begin()` can be exercised against resource exhaustion.

use crate::error::AllocError;
use parking_lot::Mutex;
use std::sync::Arc;

/// One of the resources a dynamic endpoint is made of.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
pub enum EndpointResource {
    #[strum(to_string = "device instance")]
    Device,
    #[strum(to_string = "endpoint descriptor")]
    Descriptor,
    #[strum(to_string = "data version storage")]
    VersionStorage,
}

/// Source of memory for endpoint resources.
pub trait EndpointAllocator: Send + Sync {
    /// Reserve `bytes` for `resource`, or refuse.
    fn reserve(&self, resource: EndpointResource, bytes: usize) -> Result<(), AllocError>;

    /// Give back a reservation made by [`Self::reserve`].
    fn release(&self, resource: EndpointResource, bytes: usize);
}

/// A granted reservation, released on drop.
pub struct Reservation {
    allocator: Arc<dyn EndpointAllocator>,
    resource: EndpointResource,
    bytes: usize,
}

impl Reservation {
    pub fn new(
        allocator: &Arc<dyn EndpointAllocator>,
        resource: EndpointResource,
        bytes: usize,
    ) -> Result<Self, AllocError> {
        allocator.reserve(resource, bytes)?;
        Ok(Self {
            allocator: allocator.clone(),
            resource,
            bytes,
        })
    }

    pub fn resource(&self) -> EndpointResource {
        self.resource
    }

    pub fn bytes(&self) -> usize {
        self.bytes
    }
}

impl Drop for Reservation {
    fn drop(&mut self) {
        self.allocator.release(self.resource, self.bytes);
    }
}

/// A value together with the reservation that backs it.
///
/// Dropping it drops the value first, then returns the memory.
pub struct Allocated<T> {
    value: T,
    _reservation: Reservation,
}

impl<T> Allocated<T> {
    pub fn new(
        allocator: &Arc<dyn EndpointAllocator>,
        resource: EndpointResource,
        bytes: usize,
        build: impl FnOnce() -> Result<T, AllocError>,
    ) -> Result<Self, AllocError> {
        let reservation = Reservation::new(allocator, resource, bytes)?;
        Ok(Self {
            value: build()?,
            _reservation: reservation,
        })
    }
}

impl<T> std::ops::Deref for Allocated<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

/// Allocator backed by the process heap with no limit.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemAllocator;

impl EndpointAllocator for SystemAllocator {
    fn reserve(&self, _resource: EndpointResource, _bytes: usize) -> Result<(), AllocError> {
        Ok(())
    }

    fn release(&self, _resource: EndpointResource, _bytes: usize) {}
}

/// Allocator that refuses reservations beyond a fixed byte budget.
#[derive(Debug)]
pub struct BudgetAllocator {
    budget: usize,
    used: Mutex<usize>,
}

impl BudgetAllocator {
    pub fn new(budget: usize) -> Self {
        Self {
            budget,
            used: Mutex::new(0),
        }
    }

    pub fn budget(&self) -> usize {
        self.budget
    }

    pub fn used(&self) -> usize {
        *self.used.lock()
    }
}

impl EndpointAllocator for BudgetAllocator {
    fn reserve(&self, resource: EndpointResource, bytes: usize) -> Result<(), AllocError> {
        let mut used = self.used.lock();
        match used.checked_add(bytes) {
            Some(total) if total <= self.budget => {
                *used = total;
                Ok(())
            }
            _ => {
                log::warn!(
                    "Endpoint budget exhausted: {} of {} bytes used, {} requested for {}",
                    *used,
                    self.budget,
                    bytes,
                    resource
                );
                Err(AllocError { resource, bytes })
            }
        }
    }

    fn release(&self, _resource: EndpointResource, bytes: usize) {
        let mut used = self.used.lock();
        *used = used.saturating_sub(bytes);
    }
}
