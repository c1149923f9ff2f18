//! Humidity sensor endpoint.
//!
//! Exposes as Matter Humidity Sensor device type (0x0307) using the
//! RelativeHumidityMeasurement cluster (0x0405). Raw values are hundredths
//! of a percent.

use crate::error::Result;
use crate::matter::clusters::{EndpointId, Label, label};
use crate::matter::devices::HumiditySensorDevice;
use crate::matter::devices::humidity_sensor::{
    DEFAULT_MAX_CENTIPERCENT, DEFAULT_MIN_CENTIPERCENT,
};
use crate::matter::endpoints::bridged_endpoint::BridgedEndpoint;
use crate::matter::endpoints::context::BridgeContext;
use std::ops::Deref;
use std::sync::Arc;

pub const CENTIPERCENT_PER_PERCENT: f64 = 100.0;

pub struct HumiditySensor {
    endpoint: BridgedEndpoint<HumiditySensorDevice>,
    name: Label,
    initial: u16,
}

impl HumiditySensor {
    pub fn new(context: Arc<BridgeContext>, name: &str) -> Self {
        Self {
            endpoint: BridgedEndpoint::new(context),
            name: label(name),
            initial: DEFAULT_MIN_CENTIPERCENT,
        }
    }

    pub fn with_initial_value(mut self, raw: u16) -> Self {
        self.initial = raw;
        self
    }

    pub fn begin(&mut self) -> Result<EndpointId> {
        let (name, initial) = (self.name.clone(), self.initial);
        self.endpoint.begin(|| {
            HumiditySensorDevice::new(
                &name,
                DEFAULT_MIN_CENTIPERCENT,
                DEFAULT_MAX_CENTIPERCENT,
                initial,
            )
        })
    }

    pub fn end(&mut self) {
        self.endpoint.end();
    }

    pub fn set_measured_value(&self, raw: u16) -> bool {
        !self
            .endpoint
            .update(|device, guard| device.set_measured_value(guard, raw))
            .is_empty()
    }

    /// Store a relative humidity in percent, rounded to the nearest hundredth.
    pub fn set_measured_value_percent(&self, percent: impl Into<f64>) -> bool {
        self.set_measured_value(percent_to_raw(percent.into()))
    }

    pub fn measured_value(&self) -> Option<u16> {
        self.endpoint.device().map(|d| d.measured_value())
    }

    pub fn measured_value_percent(&self) -> Option<f64> {
        self.measured_value()
            .map(|raw| f64::from(raw) / CENTIPERCENT_PER_PERCENT)
    }
}

/// Percent to hundredths of a percent, rounded to nearest.
pub fn percent_to_raw(percent: f64) -> u16 {
    // `as` saturates: negative input lands on 0
    (percent * CENTIPERCENT_PER_PERCENT).round() as u16
}

impl Deref for HumiditySensor {
    type Target = BridgedEndpoint<HumiditySensorDevice>;

    fn deref(&self) -> &Self::Target {
        &self.endpoint
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matter::clusters::relative_humidity::{self, RelativeHumidityAttribute};
    use crate::matter::reporting::AttributePath;
    use crate::matter::test_support::Harness;

    #[test]
    fn test_out_of_range_value_clamps_and_notifies_once() {
        let harness = Harness::new(4);
        let mut sensor = HumiditySensor::new(harness.context.clone(), "Bathroom");
        let endpoint_id = sensor.begin().unwrap();

        assert!(sensor.set_measured_value(15000));
        assert_eq!(sensor.measured_value(), Some(10000));
        assert_eq!(
            harness.reporter.paths(),
            vec![AttributePath::new(
                endpoint_id,
                relative_humidity::CLUSTER_ID,
                RelativeHumidityAttribute::MeasuredValue as _,
            )]
        );

        // Clamps to the same stored value: nothing to report
        assert!(!sensor.set_measured_value(12000));
        assert_eq!(harness.reporter.paths().len(), 1);
    }

    #[test]
    fn test_percent_conversion() {
        let harness = Harness::new(4);
        let mut sensor = HumiditySensor::new(harness.context.clone(), "Bathroom");
        sensor.begin().unwrap();

        sensor.set_measured_value_percent(45.678);
        assert_eq!(sensor.measured_value(), Some(4568));
        assert_eq!(sensor.measured_value_percent(), Some(45.68));
        sensor.set_measured_value_percent(-3.0);
        assert_eq!(sensor.measured_value(), Some(0));
    }

    #[test]
    fn test_stack_reads_current_value() {
        let harness = Harness::new(4);
        let mut sensor =
            HumiditySensor::new(harness.context.clone(), "Bathroom").with_initial_value(4200);
        let endpoint_id = sensor.begin().unwrap();

        let guard = harness.context.stack_lock().acquire();
        let mut buf = [0u8; 2];
        harness
            .table
            .inner()
            .read(
                &guard,
                &AttributePath::new(
                    endpoint_id,
                    relative_humidity::CLUSTER_ID,
                    RelativeHumidityAttribute::MeasuredValue as _,
                ),
                &mut buf,
            )
            .unwrap();
        assert_eq!(u16::from_ne_bytes(buf), 4200);
    }
}
