//! Temperature sensor endpoint.
//!
//! Exposes as Matter Temperature Sensor device type (0x0302) using the
//! TemperatureMeasurement cluster (0x0402). Raw values are hundredths of a
//! degree Celsius.

use crate::error::Result;
use crate::matter::clusters::{EndpointId, Label, label};
use crate::matter::devices::TemperatureSensorDevice;
use crate::matter::devices::temperature_sensor::{
    DEFAULT_MAX_CENTIDEGREES, DEFAULT_MIN_CENTIDEGREES,
};
use crate::matter::endpoints::bridged_endpoint::BridgedEndpoint;
use crate::matter::endpoints::context::BridgeContext;
use std::ops::Deref;
use std::sync::Arc;

/// Raw units per degree Celsius.
pub const CENTIDEGREES_PER_DEGREE: f64 = 100.0;

pub struct TemperatureSensor {
    endpoint: BridgedEndpoint<TemperatureSensorDevice>,
    name: Label,
    min: i16,
    max: i16,
    initial: i16,
}

impl TemperatureSensor {
    /// Sensor covering -40.00 °C to 100.00 °C.
    pub fn new(context: Arc<BridgeContext>, name: &str) -> Self {
        Self::with_range(context, name, DEFAULT_MIN_CENTIDEGREES, DEFAULT_MAX_CENTIDEGREES)
    }

    /// Sensor covering `[min, max]` hundredths of a degree. Reversed bounds
    /// are swapped, matching what the device serves.
    pub fn with_range(context: Arc<BridgeContext>, name: &str, min: i16, max: i16) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        Self {
            endpoint: BridgedEndpoint::new(context),
            name: label(name),
            min,
            max,
            initial: 0,
        }
    }

    /// Value reported until the first measurement arrives.
    pub fn with_initial_value(mut self, raw: i16) -> Self {
        self.initial = raw;
        self
    }

    pub fn begin(&mut self) -> Result<EndpointId> {
        let (name, min, max, initial) = (self.name.clone(), self.min, self.max, self.initial);
        self.endpoint
            .begin(|| TemperatureSensorDevice::new(&name, min, max, initial))
    }

    pub fn end(&mut self) {
        self.endpoint.end();
    }

    /// Store a raw measurement. Returns whether the stored value changed.
    pub fn set_measured_value_raw(&self, raw: i16) -> bool {
        !self
            .endpoint
            .update(|device, guard| device.set_measured_value(guard, raw))
            .is_empty()
    }

    /// Store a measurement in degrees Celsius, rounded to the nearest
    /// hundredth. Values outside the i16 range saturate before clamping.
    pub fn set_measured_value_celsius(&self, celsius: impl Into<f64>) -> bool {
        self.set_measured_value_raw(celsius_to_raw(celsius.into()))
    }

    pub fn measured_value_raw(&self) -> Option<i16> {
        self.endpoint.device().map(|d| d.measured_value())
    }

    pub fn measured_value_celsius(&self) -> Option<f64> {
        self.measured_value_raw()
            .map(|raw| f64::from(raw) / CENTIDEGREES_PER_DEGREE)
    }

    pub fn min_value_raw(&self) -> i16 {
        self.min
    }

    pub fn max_value_raw(&self) -> i16 {
        self.max
    }
}

/// Degrees Celsius to hundredths, rounded to nearest.
pub fn celsius_to_raw(celsius: f64) -> i16 {
    // `as` saturates and maps NaN to 0
    (celsius * CENTIDEGREES_PER_DEGREE).round() as i16
}

impl Deref for TemperatureSensor {
    type Target = BridgedEndpoint<TemperatureSensorDevice>;

    fn deref(&self) -> &Self::Target {
        &self.endpoint
    }
}
