//! BridgedDeviceBasicInformation Cluster (0x0039) handler.
//!
//! Every bridged endpoint carries this cluster. Its attributes describe the
//! identity of the bridged device (label, product name, reachability), so
//! they are served by one shared handler instead of by each device type.

use super::{
    AttributeId, AttributeSpec, AttributeType, AttributeValue, CLUSTER_REVISION_ATTRIBUTE_ID,
    ClusterDescriptor, ClusterId, FEATURE_MAP_ATTRIBUTE_ID, label,
};
use crate::error::AttributeStatus;
use crate::matter::devices::DeviceInfo;
use crate::matter::stack_lock::StackGuard;
use strum::FromRepr;

pub const CLUSTER_ID: ClusterId = 0x0039;

pub const CLUSTER_REVISION: u16 = 2;

pub const FEATURE_MAP: u32 = 0;

#[derive(Clone, Copy, Debug, Eq, PartialEq, FromRepr)]
#[repr(u32)]
pub enum BridgedDeviceBasicInfoAttribute {
    ProductName = 0x0003,
    /// Display name controllers show for the bridged device
    NodeLabel = 0x0005,
    Reachable = 0x0011,
    UniqueId = 0x0012,
    FeatureMap = FEATURE_MAP_ATTRIBUTE_ID,
    ClusterRevision = CLUSTER_REVISION_ATTRIBUTE_ID,
}

pub const ATTRIBUTES: &[AttributeSpec] = &[
    AttributeSpec::read_only(
        BridgedDeviceBasicInfoAttribute::ProductName as _,
        AttributeType::CharString,
    ),
    AttributeSpec::read_only(
        BridgedDeviceBasicInfoAttribute::NodeLabel as _,
        AttributeType::CharString,
    ),
    AttributeSpec::read_only(
        BridgedDeviceBasicInfoAttribute::Reachable as _,
        AttributeType::Boolean,
    ),
    AttributeSpec::read_only(
        BridgedDeviceBasicInfoAttribute::UniqueId as _,
        AttributeType::CharString,
    ),
    AttributeSpec::read_only(
        BridgedDeviceBasicInfoAttribute::FeatureMap as _,
        AttributeType::Bitmap32,
    ),
    AttributeSpec::read_only(
        BridgedDeviceBasicInfoAttribute::ClusterRevision as _,
        AttributeType::Int16u,
    ),
];

pub const CLUSTER: ClusterDescriptor = ClusterDescriptor {
    id: CLUSTER_ID,
    attributes: ATTRIBUTES,
};

/// Shared read handler for the identity attributes of bridged devices.
///
/// Called by the device dispatch path with the stack lock already held.
pub trait BasicInformationHandler: Send + Sync {
    fn read(
        &self,
        guard: &StackGuard<'_>,
        info: &DeviceInfo,
        attribute: AttributeId,
        buf: &mut [u8],
    ) -> Result<usize, AttributeStatus>;
}

/// Default handler serving the attributes listed in [`ATTRIBUTES`].
#[derive(Clone, Copy, Debug, Default)]
pub struct BridgedBasicInformation;

impl BasicInformationHandler for BridgedBasicInformation {
    fn read(
        &self,
        _guard: &StackGuard<'_>,
        info: &DeviceInfo,
        attribute: AttributeId,
        buf: &mut [u8],
    ) -> Result<usize, AttributeStatus> {
        let spec = CLUSTER.attribute(attribute)?;
        spec.check_len(buf.len())?;

        let value = match BridgedDeviceBasicInfoAttribute::from_repr(attribute) {
            Some(BridgedDeviceBasicInfoAttribute::ProductName) => {
                AttributeValue::Str(info.product_name())
            }
            Some(BridgedDeviceBasicInfoAttribute::NodeLabel) => AttributeValue::Str(info.name()),
            Some(BridgedDeviceBasicInfoAttribute::Reachable) => {
                AttributeValue::Bool(info.is_reachable())
            }
            Some(BridgedDeviceBasicInfoAttribute::UniqueId) => {
                let mut scratch = [0u8; uuid::fmt::Simple::LENGTH];
                AttributeValue::Str(label(info.unique_id().simple().encode_lower(&mut scratch)))
            }
            Some(BridgedDeviceBasicInfoAttribute::FeatureMap) => AttributeValue::U32(FEATURE_MAP),
            Some(BridgedDeviceBasicInfoAttribute::ClusterRevision) => {
                AttributeValue::U16(CLUSTER_REVISION)
            }
            None => {
                return Err(AttributeStatus::UnsupportedAttribute {
                    cluster: CLUSTER_ID,
                    attribute,
                });
            }
        };

        value.encode(spec, buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matter::stack_lock::StackLock;

    #[test]
    fn test_reads_node_label() {
        let lock = StackLock::new();
        let info = DeviceInfo::new("Hallway");
        let guard = lock.acquire();

        let mut buf = [0u8; 33];
        let written = BridgedBasicInformation
            .read(
                &guard,
                &info,
                BridgedDeviceBasicInfoAttribute::NodeLabel as _,
                &mut buf,
            )
            .unwrap();
        assert_eq!(written, 33);
        assert_eq!(buf[0], 7);
        assert_eq!(&buf[1..8], b"Hallway");
    }

    #[test]
    fn test_unique_id_fits_label() {
        let lock = StackLock::new();
        let info = DeviceInfo::new("Hallway");
        let guard = lock.acquire();

        let mut buf = [0u8; 33];
        BridgedBasicInformation
            .read(
                &guard,
                &info,
                BridgedDeviceBasicInfoAttribute::UniqueId as _,
                &mut buf,
            )
            .unwrap();
        assert_eq!(buf[0] as usize, uuid::fmt::Simple::LENGTH);
    }

    #[test]
    fn test_rejects_wrong_width() {
        let lock = StackLock::new();
        let info = DeviceInfo::new("Hallway");
        let guard = lock.acquire();

        let mut buf = [0u8; 2];
        assert_eq!(
            BridgedBasicInformation.read(
                &guard,
                &info,
                BridgedDeviceBasicInfoAttribute::Reachable as _,
                &mut buf,
            ),
            Err(AttributeStatus::InvalidLength {
                attribute: BridgedDeviceBasicInfoAttribute::Reachable as _,
                expected: 1,
                actual: 2,
            })
        );
    }

    #[test]
    fn test_rejects_unknown_attribute() {
        let lock = StackLock::new();
        let info = DeviceInfo::new("Hallway");
        let guard = lock.acquire();

        let mut buf = [0u8; 2];
        assert!(matches!(
            BridgedBasicInformation.read(&guard, &info, 0x0002, &mut buf),
            Err(AttributeStatus::UnsupportedAttribute { .. })
        ));
    }
}
