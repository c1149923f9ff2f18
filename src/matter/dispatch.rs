//! Attribute dispatch for bridged devices.
//!
//! [`DeviceDispatch`] is the [`AttributeHandler`] registered with the endpoint
//! table for every bridged endpoint. It validates each protocol request
//! against the device type's attribute table before it touches device state:
//!
//! 1. an unreachable device fails every read, whatever the cluster
//! 2. BridgedDeviceBasicInformation is delegated to the shared handler
//! 3. any other cluster must be the device's own
//! 4. the attribute must be in the cluster's table and the buffer length must
//!    equal its width exactly
//!
//! Only then is the current value fetched and copied out.

use super::clusters::{AttributeId, AttributeValue, ClusterId, bridged_device_basic_info};
use super::clusters::bridged_device_basic_info::BasicInformationHandler;
use super::devices::BridgedDevice;
use super::endpoint_table::AttributeHandler;
use super::reporting::ReportScheduler;
use super::stack_lock::StackGuard;
use crate::error::AttributeStatus;
use std::sync::Arc;

pub struct DeviceDispatch<D: BridgedDevice> {
    device: Arc<D>,
    basic_info: Arc<dyn BasicInformationHandler>,
    scheduler: ReportScheduler,
}

impl<D: BridgedDevice> DeviceDispatch<D> {
    pub fn new(
        device: Arc<D>,
        basic_info: Arc<dyn BasicInformationHandler>,
        scheduler: ReportScheduler,
    ) -> Self {
        Self {
            device,
            basic_info,
            scheduler,
        }
    }

    fn own_cluster(&self, cluster: ClusterId) -> Result<(), AttributeStatus> {
        if cluster == D::CLUSTER.id {
            Ok(())
        } else {
            Err(AttributeStatus::UnsupportedCluster(cluster))
        }
    }
}

impl<D: BridgedDevice> AttributeHandler for DeviceDispatch<D> {
    fn read(
        &self,
        guard: &StackGuard<'_>,
        cluster: ClusterId,
        attribute: AttributeId,
        buf: &mut [u8],
    ) -> Result<usize, AttributeStatus> {
        let info = self.device.info();
        if !info.is_reachable() {
            return Err(AttributeStatus::Unreachable);
        }

        if cluster == bridged_device_basic_info::CLUSTER_ID {
            return self.basic_info.read(guard, info, attribute, buf);
        }

        self.own_cluster(cluster)?;
        let spec = D::CLUSTER.attribute(attribute)?;
        spec.check_len(buf.len())?;

        let value = self.device.read_attribute(guard, attribute).ok_or(
            AttributeStatus::UnsupportedAttribute { cluster, attribute },
        )?;
        value.encode(spec, buf)
    }

    fn write(
        &self,
        guard: &StackGuard<'_>,
        cluster: ClusterId,
        attribute: AttributeId,
        data: &[u8],
    ) -> Result<(), AttributeStatus> {
        let info = self.device.info();
        if !info.is_reachable() {
            return Err(AttributeStatus::Unreachable);
        }

        if cluster == bridged_device_basic_info::CLUSTER_ID {
            return Err(AttributeStatus::UnsupportedWrite { cluster, attribute });
        }

        self.own_cluster(cluster)?;
        let spec = D::CLUSTER.attribute(attribute)?;
        spec.check_len(data.len())?;
        if !spec.writable {
            log::warn!(
                "Rejected write to read-only attribute 0x{:04X} on '{}'",
                attribute,
                info.name()
            );
            return Err(AttributeStatus::UnsupportedWrite { cluster, attribute });
        }

        let value = AttributeValue::decode(spec, data)?;
        let changed = self.device.write_attribute(guard, attribute, value)?;

        if !changed.is_empty() {
            // Stack context: the reporting engine never takes the stack lock
            match info.endpoint_id() {
                Some(endpoint_id) => self.scheduler.notify::<D>(endpoint_id, changed),
                None => log::error!("Write on '{}' before registration", info.name()),
            }
        }

        Ok(())
    }
}
