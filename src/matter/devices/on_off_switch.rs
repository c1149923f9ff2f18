//! On/off switch device: the one device type that accepts remote writes.

use super::{BoundedValue, BridgedDevice, ChangeMask, DeviceInfo};
use crate::error::AttributeStatus;
use crate::matter::clusters::on_off::{self, OnOffAttribute};
use crate::matter::clusters::{
    AttributeId, AttributeValue, ClusterDescriptor, bridged_device_basic_info, descriptor,
};
use crate::matter::device_types::{
    DEV_TYPE_BRIDGED_NODE, DEV_TYPE_ON_OFF_PLUG_IN_UNIT, DeviceType,
};
use crate::matter::stack_lock::StackGuard;
use parking_lot::Mutex;

pub struct OnOffSwitchDevice {
    info: DeviceInfo,
    on: Mutex<BoundedValue<bool>>,
}

impl OnOffSwitchDevice {
    pub fn new(name: &str, initial: bool) -> Self {
        Self {
            info: DeviceInfo::new(name),
            on: Mutex::new(BoundedValue::new(false, true, initial)),
        }
    }

    pub fn is_on(&self) -> bool {
        self.on.lock().get()
    }

    pub fn set_on_off(&self, _guard: &StackGuard<'_>, on: bool) -> ChangeMask {
        let changed = self.on.lock().set(on);
        log::debug!("OnOffSwitchDevice[{}]: on={}", self.info.name(), on);
        ChangeMask::value_if(changed)
    }
}

impl BridgedDevice for OnOffSwitchDevice {
    const DEVICE_TYPES: &'static [DeviceType] =
        &[DEV_TYPE_ON_OFF_PLUG_IN_UNIT, DEV_TYPE_BRIDGED_NODE];
    const PRODUCT_NAME: &'static str = "On/off switch";
    const CLUSTER: ClusterDescriptor = on_off::CLUSTER;
    const ENDPOINT_CLUSTERS: &'static [ClusterDescriptor] = &[
        on_off::CLUSTER,
        descriptor::CLUSTER,
        bridged_device_basic_info::CLUSTER,
    ];
    const VALUE_ATTRIBUTES: &'static [AttributeId] = &[OnOffAttribute::OnOff as AttributeId];

    fn info(&self) -> &DeviceInfo {
        &self.info
    }

    fn read_attribute(
        &self,
        _guard: &StackGuard<'_>,
        attribute: AttributeId,
    ) -> Option<AttributeValue> {
        let value = match OnOffAttribute::from_repr(attribute)? {
            OnOffAttribute::OnOff => AttributeValue::Bool(self.is_on()),
            OnOffAttribute::FeatureMap => AttributeValue::U32(on_off::FEATURE_MAP),
            OnOffAttribute::ClusterRevision => AttributeValue::U16(on_off::CLUSTER_REVISION),
        };
        Some(value)
    }

    fn write_attribute(
        &self,
        guard: &StackGuard<'_>,
        attribute: AttributeId,
        value: AttributeValue,
    ) -> Result<ChangeMask, AttributeStatus> {
        match (OnOffAttribute::from_repr(attribute), value) {
            (Some(OnOffAttribute::OnOff), AttributeValue::Bool(on)) => {
                log::info!(
                    "[Matter] OnOff cluster: '{}' turned {}",
                    self.info.name(),
                    if on { "on" } else { "off" }
                );
                Ok(self.set_on_off(guard, on))
            }
            _ => Err(AttributeStatus::UnsupportedWrite {
                cluster: on_off::CLUSTER_ID,
                attribute,
            }),
        }
    }
}
