//! Simulated sensor input.

mod sensors;

pub use sensors::{SensorWalk, run_sensor_simulation};
