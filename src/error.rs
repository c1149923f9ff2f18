use crate::matter::clusters::{AttributeId, ClusterId};
use crate::matter::endpoints::allocator::EndpointResource;
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum BridgeError {
    #[error("Endpoint is already active")]
    AlreadyActive,

    #[error(transparent)]
    ResourceExhausted(#[from] AllocError),

    #[error("Endpoint registration failed: {0}")]
    Registration(#[from] RegistrationError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    SerdeJsonError(#[from] serde_json::Error),
}

/// Refusal to back one of the resources of a dynamic endpoint.
#[derive(ThisError, Debug, Clone, PartialEq, Eq)]
#[error("Failed to allocate {bytes} bytes for {resource}")]
pub struct AllocError {
    pub resource: EndpointResource,
    pub bytes: usize,
}

/// Rejections reported by an endpoint table.
#[derive(ThisError, Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("No free dynamic endpoint slot (capacity {capacity})")]
    TableFull { capacity: usize },

    #[error("No unused dynamic endpoint id left")]
    EndpointIdsExhausted,

    #[error("Device is already registered on endpoint {0}")]
    AlreadyRegistered(u16),

    #[error("Device is not registered")]
    NotRegistered,

    #[error("Version storage holds {actual} counters but the descriptor has {expected} clusters")]
    VersionStorageMismatch { expected: usize, actual: usize },
}

/// Per-call failure of the attribute dispatch path.
///
/// None of these affect device state.
#[derive(ThisError, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeStatus {
    #[error("Device is unreachable")]
    Unreachable,

    #[error("Unsupported cluster 0x{0:04X}")]
    UnsupportedCluster(ClusterId),

    #[error("Unsupported attribute 0x{attribute:04X} on cluster 0x{cluster:04X}")]
    UnsupportedAttribute {
        cluster: ClusterId,
        attribute: AttributeId,
    },

    #[error("Attribute 0x{attribute:04X} is {expected} bytes wide, buffer is {actual}")]
    InvalidLength {
        attribute: AttributeId,
        expected: usize,
        actual: usize,
    },

    #[error("Attribute 0x{attribute:04X} on cluster 0x{cluster:04X} is not writable")]
    UnsupportedWrite {
        cluster: ClusterId,
        attribute: AttributeId,
    },

    #[error("No endpoint {0}")]
    UnsupportedEndpoint(u16),

    #[error("Attribute value does not match its declared type")]
    Failure,
}

pub type Result<T> = std::result::Result<T, BridgeError>;
