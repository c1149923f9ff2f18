//! OccupancySensing cluster (0x0406) for motion/presence sensors.

use super::{
    AttributeSpec, AttributeType, CLUSTER_REVISION_ATTRIBUTE_ID, ClusterDescriptor, ClusterId,
    FEATURE_MAP_ATTRIBUTE_ID,
};
use serde::{Deserialize, Serialize};
use strum::FromRepr;

/// Matter Cluster ID for OccupancySensing
pub const CLUSTER_ID: ClusterId = 0x0406;

/// Cluster revision
pub const CLUSTER_REVISION: u16 = 4;

pub const FEATURE_MAP: u32 = 0;

/// Occupancy sensor type enum values
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum OccupancySensorType {
    Pir = 0x00,
    Ultrasonic = 0x01,
    PirAndUltrasonic = 0x02,
    PhysicalContact = 0x03,
}

impl OccupancySensorType {
    /// Bit of this type in the OccupancySensorTypeBitmap attribute.
    pub const fn bitmap(self) -> u8 {
        match self {
            Self::Pir => 0x01,
            Self::Ultrasonic => 0x02,
            Self::PirAndUltrasonic => 0x03,
            Self::PhysicalContact => 0x04,
        }
    }
}

/// Attribute IDs for the OccupancySensing cluster
#[derive(Clone, Copy, Debug, Eq, PartialEq, FromRepr)]
#[repr(u32)]
pub enum OccupancySensingAttribute {
    /// Bitmap8 where bit 0 indicates sensed occupancy
    Occupancy = 0x0000,
    /// The type of sensor (PIR, Ultrasonic, PhysicalContact, etc.)
    OccupancySensorType = 0x0001,
    /// Bitmap of supported sensor types
    OccupancySensorTypeBitmap = 0x0002,
    FeatureMap = FEATURE_MAP_ATTRIBUTE_ID,
    ClusterRevision = CLUSTER_REVISION_ATTRIBUTE_ID,
}

pub const ATTRIBUTES: &[AttributeSpec] = &[
    AttributeSpec::read_only(
        OccupancySensingAttribute::Occupancy as _,
        AttributeType::Bitmap8,
    ),
    AttributeSpec::read_only(
        OccupancySensingAttribute::OccupancySensorType as _,
        AttributeType::Enum8,
    ),
    AttributeSpec::read_only(
        OccupancySensingAttribute::OccupancySensorTypeBitmap as _,
        AttributeType::Bitmap8,
    ),
    AttributeSpec::read_only(
        OccupancySensingAttribute::FeatureMap as _,
        AttributeType::Bitmap32,
    ),
    AttributeSpec::read_only(
        OccupancySensingAttribute::ClusterRevision as _,
        AttributeType::Int16u,
    ),
];

/// Cluster metadata definition
pub const CLUSTER: ClusterDescriptor = ClusterDescriptor {
    id: CLUSTER_ID,
    attributes: ATTRIBUTES,
};
