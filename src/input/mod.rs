//! Input sources that feed measurements into the bridge.
//!
//! Current input sources:
//! - `simulation`: random-walk sensor values for development

pub mod simulation;

pub use simulation::run_sensor_simulation;
