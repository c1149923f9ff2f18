//! Bridge layer between bridged devices and the Matter stack.
//!
//! - `devices`: clamped device state and the [`devices::BridgedDevice`] capability set
//! - `clusters`: attribute tables and the wire encoding contract
//! - `dispatch`: read/write handlers registered for each endpoint
//! - `reporting`: change masks to subscription reports
//! - `endpoints`: begin/end lifecycle and typed device facades
//! - `endpoint_table`, `stack_lock`, `stack`: the stack side

pub mod clusters;
pub mod device_types;
pub mod devices;
pub mod dispatch;
pub mod endpoint_table;
pub mod endpoints;
pub mod reporting;
pub mod stack;
pub mod stack_lock;

#[cfg(test)]
pub(crate) mod test_support;

pub use endpoint_table::DynamicEndpointTable;
pub use endpoints::{
    BridgeContext, BridgedEndpoint, HumiditySensor, OccupancySensor, OnOffSwitch,
    TemperatureSensor,
};
pub use reporting::ReportQueue;
pub use stack::{StackWorker, spawn_stack_thread};
pub use stack_lock::StackLock;
