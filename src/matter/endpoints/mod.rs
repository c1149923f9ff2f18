//! Bridged endpoints: lifecycle plus the typed per-device facades.
//!
//! - `bridged_endpoint`: begin/end state machine shared by every device type
//! - `sensors`: read-only devices (temperature, humidity, occupancy)
//! - `controls`: devices controllers can write (on/off)
//! - `allocator`, `context`: the stack collaborators endpoints are built against

pub mod allocator;
pub mod bridged_endpoint;
pub mod context;
pub mod controls;
pub mod sensors;

pub use bridged_endpoint::BridgedEndpoint;
pub use context::BridgeContext;
pub use controls::OnOffSwitch;
pub use sensors::{HumiditySensor, OccupancySensor, TemperatureSensor};
