//! Occupancy (motion/presence) sensor device.

use super::{BoundedValue, BridgedDevice, ChangeMask, DeviceInfo};
use crate::matter::clusters::occupancy_sensing::{
    self as occupancy, OccupancySensingAttribute, OccupancySensorType,
};
use crate::matter::clusters::{
    AttributeId, AttributeValue, ClusterDescriptor, bridged_device_basic_info, descriptor,
};
use crate::matter::device_types::{DEV_TYPE_BRIDGED_NODE, DEV_TYPE_OCCUPANCY_SENSOR, DeviceType};
use crate::matter::stack_lock::StackGuard;
use parking_lot::Mutex;

pub struct OccupancySensorDevice {
    info: DeviceInfo,
    occupied: Mutex<BoundedValue<bool>>,
    sensor_type: OccupancySensorType,
}

impl OccupancySensorDevice {
    pub fn new(name: &str, sensor_type: OccupancySensorType, initial: bool) -> Self {
        Self {
            info: DeviceInfo::new(name),
            occupied: Mutex::new(BoundedValue::new(false, true, initial)),
            sensor_type,
        }
    }

    pub fn occupancy(&self) -> bool {
        self.occupied.lock().get()
    }

    pub fn sensor_type(&self) -> OccupancySensorType {
        self.sensor_type
    }

    pub fn set_occupancy(&self, _guard: &StackGuard<'_>, occupied: bool) -> ChangeMask {
        let changed = self.occupied.lock().set(occupied);
        log::debug!(
            "OccupancySensorDevice[{}]: occupied={}",
            self.info.name(),
            occupied
        );
        ChangeMask::value_if(changed)
    }
}

impl BridgedDevice for OccupancySensorDevice {
    const DEVICE_TYPES: &'static [DeviceType] =
        &[DEV_TYPE_OCCUPANCY_SENSOR, DEV_TYPE_BRIDGED_NODE];
    const PRODUCT_NAME: &'static str = "Occupancy sensor";
    const CLUSTER: ClusterDescriptor = occupancy::CLUSTER;
    const ENDPOINT_CLUSTERS: &'static [ClusterDescriptor] = &[
        occupancy::CLUSTER,
        descriptor::CLUSTER,
        bridged_device_basic_info::CLUSTER,
    ];
    const VALUE_ATTRIBUTES: &'static [AttributeId] =
        &[OccupancySensingAttribute::Occupancy as AttributeId];

    fn info(&self) -> &DeviceInfo {
        &self.info
    }

    fn read_attribute(
        &self,
        _guard: &StackGuard<'_>,
        attribute: AttributeId,
    ) -> Option<AttributeValue> {
        let value = match OccupancySensingAttribute::from_repr(attribute)? {
            // Bitmap8: bit 0 = sensed occupancy
            OccupancySensingAttribute::Occupancy => {
                AttributeValue::U8(u8::from(self.occupied.lock().get()))
            }
            OccupancySensingAttribute::OccupancySensorType => {
                AttributeValue::U8(self.sensor_type as u8)
            }
            OccupancySensingAttribute::OccupancySensorTypeBitmap => {
                AttributeValue::U8(self.sensor_type.bitmap())
            }
            OccupancySensingAttribute::FeatureMap => AttributeValue::U32(occupancy::FEATURE_MAP),
            OccupancySensingAttribute::ClusterRevision => {
                AttributeValue::U16(occupancy::CLUSTER_REVISION)
            }
        };
        Some(value)
    }
}
