//! Bridged device instances.
//!
//! A device instance holds the state of one physical sensor or actuator:
//! its identity ([`DeviceInfo`]) and its clamped value. Every device type
//! implements [`BridgedDevice`], the capability set the dispatch path and the
//! endpoint lifecycle are written against.
//!
//! State lives behind a small per-device mutex so devices are `Sync`; it is
//! never contended because every mutating path already holds the stack lock,
//! which the setters demand as a `&StackGuard` parameter.

pub mod bounded;
pub mod humidity_sensor;
pub mod occupancy_sensor;
pub mod on_off_switch;
pub mod temperature_sensor;

pub use bounded::BoundedValue;
pub use humidity_sensor::HumiditySensorDevice;
pub use occupancy_sensor::OccupancySensorDevice;
pub use on_off_switch::OnOffSwitchDevice;
pub use temperature_sensor::TemperatureSensorDevice;

use super::clusters::{
    AttributeId, AttributeValue, ClusterDescriptor, ClusterId, EndpointId, Label, label,
};
use super::device_types::DeviceType;
use super::stack_lock::StackGuard;
use crate::error::AttributeStatus;
use bitflags::bitflags;
use parking_lot::Mutex;
use uuid::Uuid;

bitflags! {
    /// Which logical attributes the last mutation changed.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct ChangeMask: u32 {
        const REACHABLE = 1 << 0;
        const NAME = 1 << 1;
        const PRODUCT_NAME = 1 << 2;
        /// The device type's own value attribute(s)
        const VALUE = 1 << 3;
    }
}

impl ChangeMask {
    /// `VALUE` if `changed`, empty otherwise.
    pub fn value_if(changed: bool) -> Self {
        if changed { Self::VALUE } else { Self::empty() }
    }
}

/// Identity shared by every bridged device type.
#[derive(Debug)]
pub struct DeviceInfo {
    unique_id: Uuid,
    state: Mutex<InfoState>,
}

#[derive(Debug)]
struct InfoState {
    name: Label,
    product_name: Label,
    reachable: bool,
    endpoint_id: Option<EndpointId>,
}

impl DeviceInfo {
    /// Unreachable, unregistered device identity with a fresh unique id.
    pub fn new(name: &str) -> Self {
        Self {
            unique_id: Uuid::new_v4(),
            state: Mutex::new(InfoState {
                name: label(name),
                product_name: Label::new(),
                reachable: false,
                endpoint_id: None,
            }),
        }
    }

    /// Stable key the endpoint table knows this device by.
    pub fn unique_id(&self) -> Uuid {
        self.unique_id
    }

    pub fn name(&self) -> Label {
        self.state.lock().name.clone()
    }

    pub fn product_name(&self) -> Label {
        self.state.lock().product_name.clone()
    }

    pub fn is_reachable(&self) -> bool {
        self.state.lock().reachable
    }

    /// Endpoint assigned at registration, `None` before.
    pub fn endpoint_id(&self) -> Option<EndpointId> {
        self.state.lock().endpoint_id
    }

    pub fn set_reachable(&self, _guard: &StackGuard<'_>, reachable: bool) -> ChangeMask {
        let mut state = self.state.lock();
        let changed = state.reachable != reachable;
        state.reachable = reachable;
        log::debug!("Device[{}]: reachable={}", state.name, reachable);
        if changed {
            ChangeMask::REACHABLE
        } else {
            ChangeMask::empty()
        }
    }

    pub fn set_name(&self, _guard: &StackGuard<'_>, name: &str) -> ChangeMask {
        let name = label(name);
        let mut state = self.state.lock();
        if state.name == name {
            return ChangeMask::empty();
        }
        log::debug!("Device[{}]: new name='{}'", state.name, name);
        state.name = name;
        ChangeMask::NAME
    }

    pub fn set_product_name(&self, _guard: &StackGuard<'_>, product_name: &str) -> ChangeMask {
        let product_name = label(product_name);
        let mut state = self.state.lock();
        if state.product_name == product_name {
            return ChangeMask::empty();
        }
        state.product_name = product_name;
        ChangeMask::PRODUCT_NAME
    }

    pub(crate) fn set_endpoint_id(&self, _guard: &StackGuard<'_>, endpoint_id: Option<EndpointId>) {
        self.state.lock().endpoint_id = endpoint_id;
    }
}

/// Capability set of a bridged device type.
///
/// The associated constants are the static description handed to the
/// endpoint table; the methods are the typed side of attribute dispatch.
/// Cluster, attribute and length validation happen in the dispatch layer,
/// so `read_attribute` only maps an attribute id to its current value.
pub trait BridgedDevice: Send + Sync + 'static {
    /// Device type tags registered with the endpoint.
    const DEVICE_TYPES: &'static [DeviceType];

    /// Product name set when the endpoint begins.
    const PRODUCT_NAME: &'static str;

    /// The cluster this device type serves itself.
    const CLUSTER: ClusterDescriptor;

    /// Every cluster of the endpoint, in descriptor order.
    const ENDPOINT_CLUSTERS: &'static [ClusterDescriptor];

    /// Attributes of [`Self::CLUSTER`] reported when [`ChangeMask::VALUE`] is set.
    const VALUE_ATTRIBUTES: &'static [AttributeId];

    fn info(&self) -> &DeviceInfo;

    /// Current value of an attribute of [`Self::CLUSTER`], `None` if unknown.
    fn read_attribute(&self, guard: &StackGuard<'_>, attribute: AttributeId)
    -> Option<AttributeValue>;

    /// Apply a remote write to an attribute of [`Self::CLUSTER`].
    ///
    /// Only called for attributes declared writable. Device types without
    /// writable attributes keep the default.
    fn write_attribute(
        &self,
        _guard: &StackGuard<'_>,
        attribute: AttributeId,
        _value: AttributeValue,
    ) -> Result<ChangeMask, AttributeStatus> {
        Err(AttributeStatus::UnsupportedWrite {
            cluster: Self::CLUSTER.id,
            attribute,
        })
    }

    fn cluster_ids(&self) -> Vec<ClusterId> {
        Self::ENDPOINT_CLUSTERS.iter().map(|c| c.id).collect()
    }
}
