//! Temperature sensor device.
//!
//! Values are centidegrees Celsius, clamped to the device's declared range.

use super::{BoundedValue, BridgedDevice, ChangeMask, DeviceInfo};
use crate::matter::clusters::temperature_measurement::{
    self as temperature, TemperatureMeasurementAttribute,
};
use crate::matter::clusters::{
    AttributeId, AttributeValue, ClusterDescriptor, bridged_device_basic_info, descriptor,
};
use crate::matter::device_types::{
    DEV_TYPE_BRIDGED_NODE, DEV_TYPE_TEMPERATURE_SENSOR, DeviceType,
};
use crate::matter::stack_lock::StackGuard;
use parking_lot::Mutex;

/// -40°C
pub const DEFAULT_MIN_CENTIDEGREES: i16 = -4000;
/// 100°C
pub const DEFAULT_MAX_CENTIDEGREES: i16 = 10000;

pub struct TemperatureSensorDevice {
    info: DeviceInfo,
    measured: Mutex<BoundedValue<i16>>,
}

impl TemperatureSensorDevice {
    pub fn new(name: &str, min: i16, max: i16, initial: i16) -> Self {
        Self {
            info: DeviceInfo::new(name),
            measured: Mutex::new(BoundedValue::new(min, max, initial)),
        }
    }

    pub fn measured_value(&self) -> i16 {
        self.measured.lock().get()
    }

    pub fn min_value(&self) -> i16 {
        self.measured.lock().min()
    }

    pub fn max_value(&self) -> i16 {
        self.measured.lock().max()
    }

    /// Store a new measurement, clamped into `[min_value, max_value]`.
    pub fn set_measured_value(&self, _guard: &StackGuard<'_>, value: i16) -> ChangeMask {
        let mut measured = self.measured.lock();
        let changed = measured.set(value);
        log::debug!(
            "TemperatureSensorDevice[{}]: new measurement='{}'",
            self.info.name(),
            measured.get()
        );
        ChangeMask::value_if(changed)
    }
}

impl BridgedDevice for TemperatureSensorDevice {
    const DEVICE_TYPES: &'static [DeviceType] =
        &[DEV_TYPE_TEMPERATURE_SENSOR, DEV_TYPE_BRIDGED_NODE];
    const PRODUCT_NAME: &'static str = "Temperature sensor";
    const CLUSTER: ClusterDescriptor = temperature::CLUSTER;
    const ENDPOINT_CLUSTERS: &'static [ClusterDescriptor] = &[
        temperature::CLUSTER,
        descriptor::CLUSTER,
        bridged_device_basic_info::CLUSTER,
    ];
    const VALUE_ATTRIBUTES: &'static [AttributeId] =
        &[TemperatureMeasurementAttribute::MeasuredValue as AttributeId];

    fn info(&self) -> &DeviceInfo {
        &self.info
    }

    fn read_attribute(
        &self,
        _guard: &StackGuard<'_>,
        attribute: AttributeId,
    ) -> Option<AttributeValue> {
        let measured = self.measured.lock();
        let value = match TemperatureMeasurementAttribute::from_repr(attribute)? {
            TemperatureMeasurementAttribute::MeasuredValue => AttributeValue::I16(measured.get()),
            TemperatureMeasurementAttribute::MinMeasuredValue => {
                AttributeValue::I16(measured.min())
            }
            TemperatureMeasurementAttribute::MaxMeasuredValue => {
                AttributeValue::I16(measured.max())
            }
            TemperatureMeasurementAttribute::FeatureMap => {
                AttributeValue::U32(temperature::FEATURE_MAP)
            }
            TemperatureMeasurementAttribute::ClusterRevision => {
                AttributeValue::U16(temperature::CLUSTER_REVISION)
            }
        };
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matter::stack_lock::StackLock;

    #[test]
    fn test_set_clamps_to_max() {
        let lock = StackLock::new();
        let device = TemperatureSensorDevice::new("t", -4000, 10000, 0);
        let guard = lock.acquire();

        assert_eq!(device.set_measured_value(&guard, 12000), ChangeMask::VALUE);
        assert_eq!(device.measured_value(), 10000);
        assert_eq!(device.set_measured_value(&guard, 15000), ChangeMask::empty());
    }

    #[test]
    fn test_every_cluster_attribute_has_a_value_of_its_declared_width() {
        let lock = StackLock::new();
        let device = TemperatureSensorDevice::new("t", -4000, 10000, 2150);
        let guard = lock.acquire();

        for spec in temperature::ATTRIBUTES {
            let value = device.read_attribute(&guard, spec.id).unwrap();
            let mut buf = vec![0u8; spec.width()];
            assert_eq!(value.encode(spec, &mut buf), Ok(spec.width()));
        }
    }

    #[test]
    fn test_unknown_attribute() {
        let lock = StackLock::new();
        let device = TemperatureSensorDevice::new("t", -4000, 10000, 0);
        let guard = lock.acquire();
        // Tolerance is not served
        assert_eq!(device.read_attribute(&guard, 0x0003), None);
    }
}
