//! Occupancy sensor endpoint.
//!
//! Exposes as Matter Occupancy Sensor device type (0x0107) using the
//! OccupancySensing cluster (0x0406).

use crate::error::Result;
use crate::matter::clusters::occupancy_sensing::OccupancySensorType;
use crate::matter::clusters::{EndpointId, Label, label};
use crate::matter::devices::OccupancySensorDevice;
use crate::matter::endpoints::bridged_endpoint::BridgedEndpoint;
use crate::matter::endpoints::context::BridgeContext;
use std::ops::Deref;
use std::sync::Arc;

/// Occupancy sensor (motion/presence detection).
pub struct OccupancySensor {
    endpoint: BridgedEndpoint<OccupancySensorDevice>,
    name: Label,
    sensor_type: OccupancySensorType,
}

impl OccupancySensor {
    pub fn new(context: Arc<BridgeContext>, name: &str, sensor_type: OccupancySensorType) -> Self {
        Self {
            endpoint: BridgedEndpoint::new(context),
            name: label(name),
            sensor_type,
        }
    }

    pub fn begin(&mut self) -> Result<EndpointId> {
        let (name, sensor_type) = (self.name.clone(), self.sensor_type);
        self.endpoint
            .begin(|| OccupancySensorDevice::new(&name, sensor_type, false))
    }

    pub fn end(&mut self) {
        self.endpoint.end();
    }

    pub fn set_occupancy(&self, occupied: bool) -> bool {
        !self
            .endpoint
            .update(|device, guard| device.set_occupancy(guard, occupied))
            .is_empty()
    }

    pub fn occupancy(&self) -> Option<bool> {
        self.endpoint.device().map(|d| d.occupancy())
    }

    pub fn sensor_type(&self) -> OccupancySensorType {
        self.sensor_type
    }
}

impl Deref for OccupancySensor {
    type Target = BridgedEndpoint<OccupancySensorDevice>;

    fn deref(&self) -> &Self::Target {
        &self.endpoint
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matter::clusters::occupancy_sensing::{self, OccupancySensingAttribute};
    use crate::matter::reporting::AttributePath;
    use crate::matter::test_support::Harness;

    #[test]
    fn test_occupancy_changes_are_reported() {
        let harness = Harness::new(4);
        let mut sensor =
            OccupancySensor::new(harness.context.clone(), "Hall", OccupancySensorType::Pir);
        let endpoint_id = sensor.begin().unwrap();

        assert_eq!(sensor.occupancy(), Some(false));
        assert!(sensor.set_occupancy(true));
        assert!(!sensor.set_occupancy(true));
        assert!(sensor.set_occupancy(false));

        let path = AttributePath::new(
            endpoint_id,
            occupancy_sensing::CLUSTER_ID,
            OccupancySensingAttribute::Occupancy as _,
        );
        assert_eq!(harness.reporter.paths(), vec![path, path]);
    }

    #[test]
    fn test_end_then_begin_gets_new_endpoint() {
        let harness = Harness::new(4);
        let mut sensor =
            OccupancySensor::new(harness.context.clone(), "Hall", OccupancySensorType::Ultrasonic);

        let first = sensor.begin().unwrap();
        sensor.set_occupancy(true);
        sensor.end();
        assert_eq!(sensor.occupancy(), None);

        let second = sensor.begin().unwrap();
        assert_ne!(first, second);
        // Fresh device instance
        assert_eq!(sensor.occupancy(), Some(false));
    }
}
