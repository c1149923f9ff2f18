//! OnOff cluster (0x0006).
//!
//! Bridged switches expose the OnOff attribute as writable so the stack can
//! drive them with a plain attribute write.

use super::{
    AttributeSpec, AttributeType, CLUSTER_REVISION_ATTRIBUTE_ID, ClusterDescriptor, ClusterId,
    FEATURE_MAP_ATTRIBUTE_ID,
};
use strum::FromRepr;

/// Matter Cluster ID for OnOff
pub const CLUSTER_ID: ClusterId = 0x0006;

pub const CLUSTER_REVISION: u16 = 6;

/// No LIGHTING feature; this is a bare armed/disarmed style toggle
pub const FEATURE_MAP: u32 = 0;

#[derive(Clone, Copy, Debug, Eq, PartialEq, FromRepr)]
#[repr(u32)]
pub enum OnOffAttribute {
    OnOff = 0x0000,
    FeatureMap = FEATURE_MAP_ATTRIBUTE_ID,
    ClusterRevision = CLUSTER_REVISION_ATTRIBUTE_ID,
}

pub const ATTRIBUTES: &[AttributeSpec] = &[
    AttributeSpec::writable(OnOffAttribute::OnOff as _, AttributeType::Boolean),
    AttributeSpec::read_only(OnOffAttribute::FeatureMap as _, AttributeType::Bitmap32),
    AttributeSpec::read_only(OnOffAttribute::ClusterRevision as _, AttributeType::Int16u),
];

pub const CLUSTER: ClusterDescriptor = ClusterDescriptor {
    id: CLUSTER_ID,
    attributes: ATTRIBUTES,
};
