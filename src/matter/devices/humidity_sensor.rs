//! Relative humidity sensor device.
//!
//! Values are centi-percent (0..=10000 for 0%..=100%).

use super::{BoundedValue, BridgedDevice, ChangeMask, DeviceInfo};
use crate::matter::clusters::relative_humidity::{self as humidity, RelativeHumidityAttribute};
use crate::matter::clusters::{
    AttributeId, AttributeValue, ClusterDescriptor, bridged_device_basic_info, descriptor,
};
use crate::matter::device_types::{DEV_TYPE_BRIDGED_NODE, DEV_TYPE_HUMIDITY_SENSOR, DeviceType};
use crate::matter::stack_lock::StackGuard;
use parking_lot::Mutex;

/// 0%
pub const DEFAULT_MIN_CENTIPERCENT: u16 = 0;
/// 100%
pub const DEFAULT_MAX_CENTIPERCENT: u16 = 10000;

pub struct HumiditySensorDevice {
    info: DeviceInfo,
    measured: Mutex<BoundedValue<u16>>,
}

impl HumiditySensorDevice {
    pub fn new(name: &str, min: u16, max: u16, initial: u16) -> Self {
        Self {
            info: DeviceInfo::new(name),
            measured: Mutex::new(BoundedValue::new(min, max, initial)),
        }
    }

    pub fn measured_value(&self) -> u16 {
        self.measured.lock().get()
    }

    pub fn min_value(&self) -> u16 {
        self.measured.lock().min()
    }

    pub fn max_value(&self) -> u16 {
        self.measured.lock().max()
    }

    pub fn set_measured_value(&self, _guard: &StackGuard<'_>, value: u16) -> ChangeMask {
        let mut measured = self.measured.lock();
        let changed = measured.set(value);
        log::debug!(
            "HumiditySensorDevice[{}]: new measurement='{}'",
            self.info.name(),
            measured.get()
        );
        ChangeMask::value_if(changed)
    }
}

impl BridgedDevice for HumiditySensorDevice {
    const DEVICE_TYPES: &'static [DeviceType] = &[DEV_TYPE_HUMIDITY_SENSOR, DEV_TYPE_BRIDGED_NODE];
    const PRODUCT_NAME: &'static str = "Humidity sensor";
    const CLUSTER: ClusterDescriptor = humidity::CLUSTER;
    const ENDPOINT_CLUSTERS: &'static [ClusterDescriptor] = &[
        humidity::CLUSTER,
        descriptor::CLUSTER,
        bridged_device_basic_info::CLUSTER,
    ];
    const VALUE_ATTRIBUTES: &'static [AttributeId] =
        &[RelativeHumidityAttribute::MeasuredValue as AttributeId];

    fn info(&self) -> &DeviceInfo {
        &self.info
    }

    fn read_attribute(
        &self,
        _guard: &StackGuard<'_>,
        attribute: AttributeId,
    ) -> Option<AttributeValue> {
        let measured = self.measured.lock();
        let value = match RelativeHumidityAttribute::from_repr(attribute)? {
            RelativeHumidityAttribute::MeasuredValue => AttributeValue::U16(measured.get()),
            RelativeHumidityAttribute::MinMeasuredValue => AttributeValue::U16(measured.min()),
            RelativeHumidityAttribute::MaxMeasuredValue => AttributeValue::U16(measured.max()),
            RelativeHumidityAttribute::FeatureMap => AttributeValue::U32(humidity::FEATURE_MAP),
            RelativeHumidityAttribute::ClusterRevision => {
                AttributeValue::U16(humidity::CLUSTER_REVISION)
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
    fn test_set_clamps_and_reports_once() {
        let lock = StackLock::new();
        let device = HumiditySensorDevice::new("h", 0, 10000, 0);
        let guard = lock.acquire();

        assert_eq!(device.set_measured_value(&guard, 15000), ChangeMask::VALUE);
        assert_eq!(device.measured_value(), 10000);
        assert_eq!(device.set_measured_value(&guard, 10000), ChangeMask::empty());
    }

    #[test]
    fn test_bounds_are_served() {
        let lock = StackLock::new();
        let device = HumiditySensorDevice::new("h", 1000, 9000, 5000);
        let guard = lock.acquire();

        assert_eq!(
            device.read_attribute(&guard, RelativeHumidityAttribute::MinMeasuredValue as _),
            Some(AttributeValue::U16(1000))
        );
        assert_eq!(
            device.read_attribute(&guard, RelativeHumidityAttribute::MaxMeasuredValue as _),
            Some(AttributeValue::U16(9000))
        );
    }
}
