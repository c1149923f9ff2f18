//! RelativeHumidityMeasurement cluster (0x0405).
//!
//! Humidity is carried in centi-percent (value * 100).
//! For example: 55.5% is reported as 5550.

use super::{
    AttributeSpec, AttributeType, CLUSTER_REVISION_ATTRIBUTE_ID, ClusterDescriptor, ClusterId,
    FEATURE_MAP_ATTRIBUTE_ID,
};
use strum::FromRepr;

/// Matter Cluster ID for RelativeHumidityMeasurement
pub const CLUSTER_ID: ClusterId = 0x0405;

/// Cluster revision
pub const CLUSTER_REVISION: u16 = 3;

pub const FEATURE_MAP: u32 = 0;

/// Attribute IDs for the RelativeHumidityMeasurement cluster
#[derive(Clone, Copy, Debug, Eq, PartialEq, FromRepr)]
#[repr(u32)]
pub enum RelativeHumidityAttribute {
    /// Measured humidity in centi-percent
    MeasuredValue = 0x0000,
    /// Minimum measurable humidity
    MinMeasuredValue = 0x0001,
    /// Maximum measurable humidity
    MaxMeasuredValue = 0x0002,
    FeatureMap = FEATURE_MAP_ATTRIBUTE_ID,
    ClusterRevision = CLUSTER_REVISION_ATTRIBUTE_ID,
}

pub const ATTRIBUTES: &[AttributeSpec] = &[
    AttributeSpec::read_only(
        RelativeHumidityAttribute::MeasuredValue as _,
        AttributeType::Int16u,
    ),
    AttributeSpec::read_only(
        RelativeHumidityAttribute::MinMeasuredValue as _,
        AttributeType::Int16u,
    ),
    AttributeSpec::read_only(
        RelativeHumidityAttribute::MaxMeasuredValue as _,
        AttributeType::Int16u,
    ),
    AttributeSpec::read_only(
        RelativeHumidityAttribute::FeatureMap as _,
        AttributeType::Bitmap32,
    ),
    AttributeSpec::read_only(
        RelativeHumidityAttribute::ClusterRevision as _,
        AttributeType::Int16u,
    ),
];

/// Cluster metadata definition
pub const CLUSTER: ClusterDescriptor = ClusterDescriptor {
    id: CLUSTER_ID,
    attributes: ATTRIBUTES,
};
