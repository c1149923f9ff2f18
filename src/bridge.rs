//! The sensor bridge: one stack context plus the bridged endpoints it exposes.

use crate::config::Config;
use crate::error::Result;
use crate::matter::endpoints::allocator::{BudgetAllocator, EndpointAllocator, SystemAllocator};
use crate::matter::endpoints::sensors::humidity_sensor::percent_to_raw;
use crate::matter::endpoints::sensors::temperature_sensor::celsius_to_raw;
use crate::matter::{
    BridgeContext, DynamicEndpointTable, HumiditySensor, OccupancySensor, OnOffSwitch,
    ReportQueue, StackWorker, TemperatureSensor,
};
use log::info;
use std::sync::Arc;

pub struct SensorBridge {
    context: Arc<BridgeContext>,
    table: Arc<DynamicEndpointTable>,
    reports: Arc<ReportQueue>,
    temperature: TemperatureSensor,
    humidity: HumiditySensor,
    occupancy: OccupancySensor,
    switch: OnOffSwitch,
}

impl SensorBridge {
    pub fn new(config: &Config) -> Self {
        let bridge = &config.bridge;
        let table = Arc::new(DynamicEndpointTable::new(
            bridge.dynamic_endpoint_capacity,
            bridge.first_dynamic_endpoint_id,
            bridge.aggregator_endpoint_id,
        ));
        let reports = Arc::new(ReportQueue::new());
        let allocator: Arc<dyn EndpointAllocator> = match bridge.heap_budget {
            Some(budget) => Arc::new(BudgetAllocator::new(budget)),
            None => Arc::new(SystemAllocator),
        };
        let context = Arc::new(
            BridgeContext::new(table.clone(), reports.clone()).with_allocator(allocator),
        );

        let sensors = &config.sensors;
        let temperature = TemperatureSensor::with_range(
            context.clone(),
            &sensors.temperature.name,
            sensors.temperature.min_centidegrees,
            sensors.temperature.max_centidegrees,
        )
        .with_initial_value(celsius_to_raw(sensors.temperature.initial_celsius));
        let humidity = HumiditySensor::new(context.clone(), &sensors.humidity.name)
            .with_initial_value(percent_to_raw(sensors.humidity.initial_percent));
        let occupancy = OccupancySensor::new(
            context.clone(),
            &sensors.occupancy.name,
            sensors.occupancy.sensor_type,
        );
        let switch = OnOffSwitch::new(
            context.clone(),
            &sensors.switch.name,
            sensors.switch.initially_on,
        );

        Self {
            context,
            table,
            reports,
            temperature,
            humidity,
            occupancy,
            switch,
        }
    }

    /// Begin every endpoint. If one fails, the ones already begun are ended.
    pub fn begin(&mut self) -> Result<()> {
        let result = self.begin_all();
        if result.is_err() {
            self.end();
        }
        result
    }

    fn begin_all(&mut self) -> Result<()> {
        let id = self.temperature.begin()?;
        info!("  Temperature sensor: endpoint {}", id);
        let id = self.humidity.begin()?;
        info!("  Humidity sensor: endpoint {}", id);
        let id = self.occupancy.begin()?;
        info!("  Occupancy sensor: endpoint {}", id);
        let id = self.switch.begin()?;
        info!("  On/off switch: endpoint {}", id);
        Ok(())
    }

    /// End every endpoint, in reverse order of `begin`.
    pub fn end(&mut self) {
        self.switch.end();
        self.occupancy.end();
        self.humidity.end();
        self.temperature.end();
    }

    /// The stack-side worker serving this bridge's endpoints.
    pub fn stack_worker(&self) -> StackWorker {
        StackWorker::new(self.context.clone(), self.table.clone(), self.reports.clone())
    }

    pub fn context(&self) -> &Arc<BridgeContext> {
        &self.context
    }

    pub fn table(&self) -> &Arc<DynamicEndpointTable> {
        &self.table
    }

    pub fn temperature(&self) -> &TemperatureSensor {
        &self.temperature
    }

    pub fn humidity(&self) -> &HumiditySensor {
        &self.humidity
    }

    pub fn occupancy(&self) -> &OccupancySensor {
        &self.occupancy
    }

    pub fn switch(&self) -> &OnOffSwitch {
        &self.switch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BridgeError;

    #[test]
    fn test_begin_exposes_four_endpoints() {
        let mut bridge = SensorBridge::new(&Config::default());
        bridge.begin().unwrap();

        assert_eq!(bridge.table().endpoint_ids(), vec![2, 3, 4, 5]);
        assert_eq!(bridge.temperature().measured_value_celsius(), Some(21.0));
        assert_eq!(bridge.humidity().measured_value_percent(), Some(45.0));
        assert_eq!(bridge.switch().is_on(), Some(false));

        bridge.end();
        assert!(bridge.table().is_empty());
    }

    #[test]
    fn test_partial_begin_is_undone() {
        let mut config = Config::default();
        config.bridge.dynamic_endpoint_capacity = 2;
        let mut bridge = SensorBridge::new(&config);

        assert!(matches!(bridge.begin(), Err(BridgeError::Registration(_))));
        assert!(bridge.table().is_empty());
        assert!(!bridge.temperature().is_active());
    }

    #[test]
    fn test_heap_budget_limits_endpoints() {
        let mut config = Config::default();
        config.bridge.heap_budget = Some(64);
        let mut bridge = SensorBridge::new(&config);

        assert!(matches!(
            bridge.begin(),
            Err(BridgeError::ResourceExhausted(_))
        ));
        assert!(bridge.table().is_empty());
    }

    #[test]
    fn test_stack_worker_drains_bridge_reports() {
        let mut bridge = SensorBridge::new(&Config::default());
        bridge.begin().unwrap();
        let worker = bridge.stack_worker();

        bridge.occupancy().set_occupancy(true);
        bridge.switch().toggle();
        let records = worker.process_pending();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.payload.is_ok()));
    }
}
