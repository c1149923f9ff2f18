//! Dynamic endpoint table.
//!
//! The endpoint table is the stack-side registry that makes a bridged device
//! addressable. Registration hands it the whole endpoint bundle: the device's
//! dispatch handler, its descriptor and the per-cluster data version block.
//! The table keeps `Arc`s to all three for as long as the endpoint is
//! registered, so none of them can be reclaimed while the stack may still
//! reference them.

use super::clusters::{AttributeId, ClusterDescriptor, ClusterId, EndpointId};
use super::device_types::DeviceType;
use super::reporting::AttributePath;
use super::stack_lock::StackGuard;
use crate::error::{AllocError, AttributeStatus, RegistrationError};
use crate::matter::endpoints::allocator::EndpointResource;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use uuid::Uuid;

/// Read/write entry points the stack invokes for a registered endpoint.
///
/// Both are called with the stack lock held and must not acquire it.
pub trait AttributeHandler: Send + Sync {
    /// Serialize an attribute into `buf`, whose length must match the
    /// attribute's width exactly. Returns the number of bytes written.
    fn read(
        &self,
        guard: &StackGuard<'_>,
        cluster: ClusterId,
        attribute: AttributeId,
        buf: &mut [u8],
    ) -> Result<usize, AttributeStatus>;

    /// Apply a write of `data`, whose length must match the attribute's width.
    fn write(
        &self,
        guard: &StackGuard<'_>,
        cluster: ClusterId,
        attribute: AttributeId,
        data: &[u8],
    ) -> Result<(), AttributeStatus>;
}

/// Protocol-visible description of a dynamic endpoint.
#[derive(Debug)]
pub struct EndpointDescriptor {
    clusters: &'static [ClusterDescriptor],
}

impl EndpointDescriptor {
    pub fn new(clusters: &'static [ClusterDescriptor]) -> Self {
        Self { clusters }
    }

    pub fn clusters(&self) -> &'static [ClusterDescriptor] {
        self.clusters
    }

    pub fn cluster_count(&self) -> usize {
        self.clusters.len()
    }

    /// Position of `cluster` in the descriptor, which is also the index of
    /// its data version counter.
    pub fn cluster_index(&self, cluster: ClusterId) -> Option<usize> {
        self.clusters.iter().position(|c| c.id == cluster)
    }
}

/// One data version counter per cluster of an endpoint.
///
/// Counters start at random values and are bumped by the stack when it
/// commits a change, never by the bridge.
#[derive(Debug)]
pub struct DataVersionStorage {
    versions: Box<[AtomicU32]>,
}

impl DataVersionStorage {
    /// Allocate `count` counters with random seeds.
    pub fn seeded(count: usize) -> Result<Self, AllocError> {
        let mut versions = Vec::new();
        versions
            .try_reserve_exact(count)
            .map_err(|_| AllocError {
                resource: EndpointResource::VersionStorage,
                bytes: count * size_of::<AtomicU32>(),
            })?;
        versions.extend((0..count).map(|_| AtomicU32::new(rand::random())));
        Ok(Self {
            versions: versions.into_boxed_slice(),
        })
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<u32> {
        self.versions.get(index).map(|v| v.load(Ordering::SeqCst))
    }

    /// Increment (wrapping) and return the new version.
    pub fn bump(&self, index: usize) -> Option<u32> {
        self.versions
            .get(index)
            .map(|v| v.fetch_add(1, Ordering::SeqCst).wrapping_add(1))
    }
}

/// Everything the endpoint table needs to expose one bridged device.
pub struct EndpointRegistration {
    /// Key the device is deregistered by
    pub device: Uuid,
    pub handler: Arc<dyn AttributeHandler>,
    pub descriptor: Arc<EndpointDescriptor>,
    pub device_types: &'static [DeviceType],
    pub versions: Arc<DataVersionStorage>,
    /// Number of endpoint slots the device needs
    pub capacity: usize,
}

/// Registry of dynamic endpoints, owned by the stack.
///
/// Callers serialize `register`/`deregister` and hold the stack lock.
pub trait EndpointTable: Send + Sync {
    fn register(
        &self,
        guard: &StackGuard<'_>,
        registration: EndpointRegistration,
    ) -> Result<EndpointId, RegistrationError>;

    /// Remove the device's endpoint; returns the endpoint id it had.
    fn deregister(
        &self,
        guard: &StackGuard<'_>,
        device: Uuid,
    ) -> Result<EndpointId, RegistrationError>;
}

struct RegisteredEndpoint {
    endpoint_id: EndpointId,
    device: Uuid,
    handler: Arc<dyn AttributeHandler>,
    descriptor: Arc<EndpointDescriptor>,
    device_types: &'static [DeviceType],
    versions: Arc<DataVersionStorage>,
}

struct TableState {
    slots: Vec<Option<RegisteredEndpoint>>,
    next_endpoint_id: EndpointId,
}

/// In-process endpoint table with a fixed number of dynamic slots.
///
/// Endpoint ids are handed out monotonically starting at
/// `first_endpoint_id` and are not reused until the id space wraps, so a
/// controller never confuses a new device with a removed one.
pub struct DynamicEndpointTable {
    parent_endpoint_id: EndpointId,
    first_endpoint_id: EndpointId,
    state: Mutex<TableState>,
}

impl DynamicEndpointTable {
    pub fn new(
        capacity: usize,
        first_endpoint_id: EndpointId,
        parent_endpoint_id: EndpointId,
    ) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        Self {
            parent_endpoint_id,
            first_endpoint_id,
            state: Mutex::new(TableState {
                slots,
                next_endpoint_id: first_endpoint_id,
            }),
        }
    }

    /// Aggregator endpoint the dynamic endpoints are parts of.
    pub fn parent_endpoint_id(&self) -> EndpointId {
        self.parent_endpoint_id
    }

    pub fn capacity(&self) -> usize {
        self.state.lock().slots.len()
    }

    pub fn len(&self) -> usize {
        self.state.lock().slots.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn endpoint_ids(&self) -> Vec<EndpointId> {
        self.state
            .lock()
            .slots
            .iter()
            .flatten()
            .map(|e| e.endpoint_id)
            .collect()
    }

    pub fn device_types(&self, endpoint_id: EndpointId) -> Option<&'static [DeviceType]> {
        self.with_endpoint(endpoint_id, |e| e.device_types)
    }

    pub fn cluster_ids(&self, endpoint_id: EndpointId) -> Option<Vec<ClusterId>> {
        self.with_endpoint(endpoint_id, |e| {
            e.descriptor.clusters().iter().map(|c| c.id).collect()
        })
    }

    /// Current data version of a cluster on an endpoint.
    pub fn data_version(&self, endpoint_id: EndpointId, cluster: ClusterId) -> Option<u32> {
        self.with_endpoint(endpoint_id, |e| {
            e.descriptor
                .cluster_index(cluster)
                .and_then(|index| e.versions.get(index))
        })
        .flatten()
    }

    /// Encoded width of the attribute at `path`, if the endpoint declares it.
    pub fn attribute_width(&self, path: &AttributePath) -> Option<usize> {
        self.with_endpoint(path.endpoint_id, |e| {
            e.descriptor
                .clusters()
                .iter()
                .find(|c| c.id == path.cluster_id)
                .and_then(|c| c.attribute(path.attribute_id).ok())
                .map(|spec| spec.width())
        })
        .flatten()
    }

    /// Commit a reported change: bump the data version of its cluster.
    pub fn commit(&self, _guard: &StackGuard<'_>, path: &AttributePath) -> Option<u32> {
        self.with_endpoint(path.endpoint_id, |e| {
            e.descriptor
                .cluster_index(path.cluster_id)
                .and_then(|index| e.versions.bump(index))
        })
        .flatten()
    }

    /// Route a read to the endpoint's handler.
    pub fn read(
        &self,
        guard: &StackGuard<'_>,
        path: &AttributePath,
        buf: &mut [u8],
    ) -> Result<usize, AttributeStatus> {
        let handler = self
            .handler(path.endpoint_id)
            .ok_or(AttributeStatus::UnsupportedEndpoint(path.endpoint_id))?;
        handler.read(guard, path.cluster_id, path.attribute_id, buf)
    }

    /// Route a write to the endpoint's handler.
    pub fn write(
        &self,
        guard: &StackGuard<'_>,
        path: &AttributePath,
        data: &[u8],
    ) -> Result<(), AttributeStatus> {
        let handler = self
            .handler(path.endpoint_id)
            .ok_or(AttributeStatus::UnsupportedEndpoint(path.endpoint_id))?;
        handler.write(guard, path.cluster_id, path.attribute_id, data)
    }

    fn handler(&self, endpoint_id: EndpointId) -> Option<Arc<dyn AttributeHandler>> {
        self.with_endpoint(endpoint_id, |e| e.handler.clone())
    }

    fn with_endpoint<R>(
        &self,
        endpoint_id: EndpointId,
        f: impl FnOnce(&RegisteredEndpoint) -> R,
    ) -> Option<R> {
        self.state
            .lock()
            .slots
            .iter()
            .flatten()
            .find(|e| e.endpoint_id == endpoint_id)
            .map(f)
    }

    /// Next free id, or `None` after one full pass over
    /// `[first_endpoint_id, 0xFFFE]` finds every id taken.
    fn allocate_endpoint_id(&self, state: &mut TableState) -> Option<EndpointId> {
        let id_space = usize::from(EndpointId::MAX - self.first_endpoint_id);
        for _ in 0..id_space {
            let candidate = state.next_endpoint_id;
            state.next_endpoint_id = match candidate.checked_add(1) {
                // 0xFFFF is the invalid endpoint id
                Some(next) if next != EndpointId::MAX => next,
                _ => self.first_endpoint_id,
            };
            let in_use = state
                .slots
                .iter()
                .flatten()
                .any(|e| e.endpoint_id == candidate);
            if !in_use {
                return Some(candidate);
            }
        }
        None
    }
}

impl EndpointTable for DynamicEndpointTable {
    fn register(
        &self,
        _guard: &StackGuard<'_>,
        registration: EndpointRegistration,
    ) -> Result<EndpointId, RegistrationError> {
        let expected = registration.descriptor.cluster_count();
        if registration.versions.len() != expected {
            return Err(RegistrationError::VersionStorageMismatch {
                expected,
                actual: registration.versions.len(),
            });
        }

        let mut state = self.state.lock();

        if let Some(existing) = state
            .slots
            .iter()
            .flatten()
            .find(|e| e.device == registration.device)
        {
            return Err(RegistrationError::AlreadyRegistered(existing.endpoint_id));
        }

        let free = state.slots.iter().filter(|s| s.is_none()).count();
        if free < registration.capacity.max(1) {
            return Err(RegistrationError::TableFull {
                capacity: state.slots.len(),
            });
        }

        let endpoint_id = self
            .allocate_endpoint_id(&mut state)
            .ok_or(RegistrationError::EndpointIdsExhausted)?;
        let Some(slot) = state.slots.iter_mut().find(|s| s.is_none()) else {
            return Err(RegistrationError::TableFull {
                capacity: state.slots.len(),
            });
        };
        *slot = Some(RegisteredEndpoint {
            endpoint_id,
            device: registration.device,
            handler: registration.handler,
            descriptor: registration.descriptor,
            device_types: registration.device_types,
            versions: registration.versions,
        });

        log::info!(
            "Added dynamic endpoint {} (parent {})",
            endpoint_id,
            self.parent_endpoint_id
        );
        Ok(endpoint_id)
    }

    fn deregister(
        &self,
        _guard: &StackGuard<'_>,
        device: Uuid,
    ) -> Result<EndpointId, RegistrationError> {
        let removed = {
            let mut state = self.state.lock();
            state
                .slots
                .iter_mut()
                .find(|s| s.as_ref().is_some_and(|e| e.device == device))
                .and_then(Option::take)
        };

        // Table references are dropped here, outside the table mutex
        let removed = removed.ok_or(RegistrationError::NotRegistered)?;
        log::info!("Removed dynamic endpoint {}", removed.endpoint_id);
        Ok(removed.endpoint_id)
    }
}
