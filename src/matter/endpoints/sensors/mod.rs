//! Sensor endpoints (read-only state).

pub mod humidity_sensor;
pub mod occupancy_sensor;
pub mod temperature_sensor;

pub use humidity_sensor::HumiditySensor;
pub use occupancy_sensor::OccupancySensor;
pub use temperature_sensor::TemperatureSensor;
