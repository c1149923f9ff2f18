//! Endpoint lifecycle for one bridged device.
//!
//! A [`BridgedEndpoint`] is either Uninitialized or Active. `begin()` builds
//! the device instance, the endpoint descriptor and the data version block,
//! then registers all three with the endpoint table. Each step that fails
//! unwinds everything built before it in reverse order, so a failed `begin()`
//! leaves nothing registered and nothing reserved. `end()` deregisters first,
//! then frees descriptor and version block, then destroys the device.
//!
//! Mutations go through [`BridgedEndpoint::update`], which holds the stack
//! lock for the mutation only and enqueues reports after releasing it.

use super::allocator::{Allocated, EndpointResource};
use super::context::BridgeContext;
use crate::error::{BridgeError, Result};
use crate::matter::clusters::{ClusterDescriptor, EndpointId, Label};
use crate::matter::devices::{BridgedDevice, ChangeMask};
use crate::matter::dispatch::DeviceDispatch;
use crate::matter::endpoint_table::{DataVersionStorage, EndpointDescriptor, EndpointRegistration};
use crate::matter::stack_lock::StackGuard;
use std::sync::Arc;
use std::sync::atomic::AtomicU32;

/// Endpoint slots a single bridged device occupies.
const ENDPOINT_SLOTS: usize = 1;

/// Resources of an active endpoint, dropped in declaration order.
struct ActiveEndpoint<D: BridgedDevice> {
    endpoint_id: EndpointId,
    descriptor: Allocated<Arc<EndpointDescriptor>>,
    versions: Allocated<Arc<DataVersionStorage>>,
    device: Allocated<Arc<D>>,
}

pub struct BridgedEndpoint<D: BridgedDevice> {
    context: Arc<BridgeContext>,
    active: Option<ActiveEndpoint<D>>,
}

impl<D: BridgedDevice> BridgedEndpoint<D> {
    pub fn new(context: Arc<BridgeContext>) -> Self {
        Self {
            context,
            active: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Endpoint id assigned by the table, `None` while Uninitialized.
    pub fn endpoint_id(&self) -> Option<EndpointId> {
        self.active.as_ref().map(|a| a.endpoint_id)
    }

    /// Build the device with `make` and expose it on a new dynamic endpoint.
    ///
    /// Fails with [`BridgeError::AlreadyActive`] if already Active; the
    /// registered endpoint is left untouched in that case.
    pub fn begin(&mut self, make: impl FnOnce() -> D) -> Result<EndpointId> {
        if let Some(active) = &self.active {
            log::warn!(
                "{} already active on endpoint {}",
                D::PRODUCT_NAME,
                active.endpoint_id
            );
            return Err(BridgeError::AlreadyActive);
        }

        match Self::activate(&self.context, make) {
            Ok(active) => {
                let endpoint_id = active.endpoint_id;
                log::info!(
                    "{} '{}' added on endpoint {}",
                    D::PRODUCT_NAME,
                    active.device.info().name(),
                    endpoint_id
                );
                self.active = Some(active);
                Ok(endpoint_id)
            }
            Err(e) => {
                log::warn!("Failed to add {} endpoint, rolled back: {}", D::PRODUCT_NAME, e);
                Err(e)
            }
        }
    }

    fn activate(context: &BridgeContext, make: impl FnOnce() -> D) -> Result<ActiveEndpoint<D>> {
        let allocator = context.allocator();

        let device = Allocated::new(allocator, EndpointResource::Device, size_of::<D>(), || {
            Ok(Arc::new(make()))
        })?;
        {
            let guard = context.stack_lock().acquire();
            device.info().set_reachable(&guard, true);
            device.info().set_product_name(&guard, D::PRODUCT_NAME);
        }

        let descriptor = Allocated::new(
            allocator,
            EndpointResource::Descriptor,
            size_of::<EndpointDescriptor>() + size_of_val(D::ENDPOINT_CLUSTERS),
            || Ok(Arc::new(EndpointDescriptor::new(D::ENDPOINT_CLUSTERS))),
        )?;

        let cluster_count = descriptor.cluster_count();
        let versions = Allocated::new(
            allocator,
            EndpointResource::VersionStorage,
            cluster_count * size_of::<AtomicU32>(),
            || DataVersionStorage::seeded(cluster_count).map(Arc::new),
        )?;

        let registration = EndpointRegistration {
            device: device.info().unique_id(),
            handler: Arc::new(DeviceDispatch::new(
                Arc::clone(&*device),
                context.basic_information().clone(),
                context.scheduler().clone(),
            )),
            descriptor: Arc::clone(&*descriptor),
            device_types: D::DEVICE_TYPES,
            versions: Arc::clone(&*versions),
            capacity: ENDPOINT_SLOTS,
        };

        let endpoint_id = {
            let guard = context.stack_lock().acquire();
            let endpoint_id = context.table().register(&guard, registration)?;
            device.info().set_endpoint_id(&guard, Some(endpoint_id));
            endpoint_id
        };

        Ok(ActiveEndpoint {
            endpoint_id,
            descriptor,
            versions,
            device,
        })
    }

    /// Remove the endpoint and free its resources. No-op while Uninitialized.
    pub fn end(&mut self) {
        let Some(active) = self.active.take() else {
            return;
        };
        let ActiveEndpoint {
            endpoint_id,
            descriptor,
            versions,
            device,
        } = active;

        {
            let guard = self.context.stack_lock().acquire();
            if let Err(e) = self
                .context
                .table()
                .deregister(&guard, device.info().unique_id())
            {
                log::error!("Failed to remove endpoint {}: {}", endpoint_id, e);
            }
            device.info().set_endpoint_id(&guard, None);
        }
        log::info!(
            "{} '{}' removed from endpoint {}",
            D::PRODUCT_NAME,
            device.info().name(),
            endpoint_id
        );

        drop(descriptor);
        drop(versions);
        drop(device);
    }

    /// Run a mutation under the stack lock and report what it changed.
    ///
    /// Returns the change mask; empty while Uninitialized.
    pub fn update(&self, mutate: impl FnOnce(&D, &StackGuard<'_>) -> ChangeMask) -> ChangeMask {
        let Some(active) = &self.active else {
            log::debug!("{} not active, update ignored", D::PRODUCT_NAME);
            return ChangeMask::empty();
        };
        let device: &D = &active.device;

        let changed = {
            let guard = self.context.stack_lock().acquire();
            mutate(device, &guard)
        };

        if !changed.is_empty() {
            self.context
                .scheduler()
                .notify::<D>(active.endpoint_id, changed);
        }
        changed
    }

    /// Read-only access to the device while Active.
    pub fn device(&self) -> Option<&D> {
        self.active.as_ref().map(|a| &**a.device)
    }

    pub fn set_reachable(&self, reachable: bool) -> bool {
        !self
            .update(|device, guard| device.info().set_reachable(guard, reachable))
            .is_empty()
    }

    pub fn set_device_name(&self, name: &str) -> bool {
        !self
            .update(|device, guard| device.info().set_name(guard, name))
            .is_empty()
    }

    pub fn set_product_name(&self, product_name: &str) -> bool {
        !self
            .update(|device, guard| device.info().set_product_name(guard, product_name))
            .is_empty()
    }

    pub fn device_name(&self) -> Option<Label> {
        self.device().map(|d| d.info().name())
    }

    pub fn product_name(&self) -> Option<Label> {
        self.device().map(|d| d.info().product_name())
    }

    /// Active and reachable.
    pub fn is_online(&self) -> bool {
        self.device().is_some_and(|d| d.info().is_reachable())
    }

    pub fn clusters(&self) -> &'static [ClusterDescriptor] {
        D::ENDPOINT_CLUSTERS
    }
}

impl<D: BridgedDevice> Drop for BridgedEndpoint<D> {
    fn drop(&mut self) {
        self.end();
    }
}
