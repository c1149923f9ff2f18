//! TemperatureMeasurement cluster (0x0402).
//!
//! Temperature is carried in centidegrees Celsius (value * 100).
//! For example: 21.5°C is reported as 2150.

use super::{
    AttributeSpec, AttributeType, CLUSTER_REVISION_ATTRIBUTE_ID, ClusterDescriptor, ClusterId,
    FEATURE_MAP_ATTRIBUTE_ID,
};
use strum::FromRepr;

/// Matter Cluster ID for TemperatureMeasurement
pub const CLUSTER_ID: ClusterId = 0x0402;

/// Cluster revision
pub const CLUSTER_REVISION: u16 = 4;

/// No optional features (no Tolerance)
pub const FEATURE_MAP: u32 = 0;

/// Attribute IDs for the TemperatureMeasurement cluster
#[derive(Clone, Copy, Debug, Eq, PartialEq, FromRepr)]
#[repr(u32)]
pub enum TemperatureMeasurementAttribute {
    /// Measured temperature in centidegrees Celsius
    MeasuredValue = 0x0000,
    /// Minimum measurable temperature
    MinMeasuredValue = 0x0001,
    /// Maximum measurable temperature
    MaxMeasuredValue = 0x0002,
    FeatureMap = FEATURE_MAP_ATTRIBUTE_ID,
    ClusterRevision = CLUSTER_REVISION_ATTRIBUTE_ID,
}

pub const ATTRIBUTES: &[AttributeSpec] = &[
    AttributeSpec::read_only(
        TemperatureMeasurementAttribute::MeasuredValue as _,
        AttributeType::Int16s,
    ),
    AttributeSpec::read_only(
        TemperatureMeasurementAttribute::MinMeasuredValue as _,
        AttributeType::Int16s,
    ),
    AttributeSpec::read_only(
        TemperatureMeasurementAttribute::MaxMeasuredValue as _,
        AttributeType::Int16s,
    ),
    AttributeSpec::read_only(
        TemperatureMeasurementAttribute::FeatureMap as _,
        AttributeType::Bitmap32,
    ),
    AttributeSpec::read_only(
        TemperatureMeasurementAttribute::ClusterRevision as _,
        AttributeType::Int16u,
    ),
];

/// Cluster metadata definition
pub const CLUSTER: ClusterDescriptor = ClusterDescriptor {
    id: CLUSTER_ID,
    attributes: ATTRIBUTES,
};
