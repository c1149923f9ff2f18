//! Descriptor cluster (0x001D).
//!
//! Its list attributes (DeviceTypeList, ServerList, PartsList) are served by the
//! stack from the registered endpoint descriptor, so no attribute is routed to
//! the bridged device.

use super::{ClusterDescriptor, ClusterId};

pub const CLUSTER_ID: ClusterId = 0x001D;

pub const CLUSTER: ClusterDescriptor = ClusterDescriptor {
    id: CLUSTER_ID,
    attributes: &[],
};
