//! Protocol-stack context.
//!
//! The [`StackWorker`] plays the stack's side of the bridge: it waits for
//! queued reports, commits each one by bumping the data version of the
//! affected cluster, and serializes the current attribute value through the
//! registered dispatch handler, exactly as a subscription report would.
//! Everything it does to endpoint state happens under the stack lock.
//!
//! The worker runs on its own `matter-stack` thread, driven by a blocking
//! executor, so the application context stays free to call setters.

use super::endpoint_table::DynamicEndpointTable;
use super::endpoints::context::BridgeContext;
use super::reporting::{AttributePath, ReportQueue};
use crate::error::AttributeStatus;
use embassy_futures::select::{Either, select};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use log::{debug, info};
use std::sync::Arc;
use std::thread::JoinHandle;

/// Stack thread stack size.
const STACK_THREAD_STACK_SIZE: usize = 256 * 1024;

/// One committed report.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportRecord {
    pub path: AttributePath,
    /// Cluster data version after the commit
    pub data_version: Option<u32>,
    /// Serialized value, or why the dispatch handler refused it
    pub payload: Result<Vec<u8>, AttributeStatus>,
}

pub struct StackWorker {
    context: Arc<BridgeContext>,
    table: Arc<DynamicEndpointTable>,
    reports: Arc<ReportQueue>,
    shutdown: Signal<CriticalSectionRawMutex, ()>,
}

impl StackWorker {
    pub fn new(
        context: Arc<BridgeContext>,
        table: Arc<DynamicEndpointTable>,
        reports: Arc<ReportQueue>,
    ) -> Self {
        Self {
            context,
            table,
            reports,
            shutdown: Signal::new(),
        }
    }

    /// Commit and serialize every pending report.
    pub fn process_pending(&self) -> Vec<ReportRecord> {
        self.reports
            .drain()
            .into_iter()
            .map(|path| self.commit(path))
            .collect()
    }

    fn commit(&self, path: AttributePath) -> ReportRecord {
        let guard = self.context.stack_lock().acquire();
        let data_version = self.table.commit(&guard, &path);

        let payload = match self.table.attribute_width(&path) {
            Some(width) => {
                let mut buf = vec![0u8; width];
                let written = self.table.read(&guard, &path, &mut buf);
                written.map(|written| {
                    buf.truncate(written);
                    buf
                })
            }
            // Endpoint removed since the report was queued
            None => Err(AttributeStatus::UnsupportedEndpoint(path.endpoint_id)),
        };
        drop(guard);

        match &payload {
            Ok(bytes) => debug!(
                "Report {} (version {:?}): {:02X?}",
                path, data_version, bytes
            ),
            Err(status) => debug!("Report {} dropped: {}", path, status),
        }

        ReportRecord {
            path,
            data_version,
            payload,
        }
    }

    /// Serve reports until [`Self::stop`] is called, then flush.
    pub async fn run(&self) {
        info!("Stack worker started");
        loop {
            match select(self.reports.wait(), self.shutdown.wait()).await {
                Either::First(()) => {
                    self.process_pending();
                }
                Either::Second(()) => break,
            }
        }
        let flushed = self.process_pending();
        info!("Stack worker stopped ({} reports flushed)", flushed.len());
    }

    pub fn stop(&self) {
        self.shutdown.signal(());
    }
}

/// Run `worker` on a dedicated `matter-stack` thread.
pub fn spawn_stack_thread(worker: Arc<StackWorker>) -> std::io::Result<JoinHandle<()>> {
    std::thread::Builder::new()
        .name("matter-stack".into())
        .stack_size(STACK_THREAD_STACK_SIZE)
        .spawn(move || futures_lite::future::block_on(worker.run()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matter::clusters::temperature_measurement::{self, TemperatureMeasurementAttribute};
    use crate::matter::endpoints::TemperatureSensor;

    fn setup() -> (Arc<BridgeContext>, Arc<DynamicEndpointTable>, Arc<ReportQueue>) {
        let table = Arc::new(DynamicEndpointTable::new(4, 2, 1));
        let reports = Arc::new(ReportQueue::new());
        let context = Arc::new(BridgeContext::new(table.clone(), reports.clone()));
        (context, table, reports)
    }

    #[test]
    fn test_commit_bumps_version_and_serializes_value() {
        let (context, table, reports) = setup();
        let worker = StackWorker::new(context.clone(), table.clone(), reports.clone());

        let mut sensor = TemperatureSensor::new(context.clone(), "Cellar");
        let endpoint_id = sensor.begin().unwrap();
        let before = table
            .data_version(endpoint_id, temperature_measurement::CLUSTER_ID)
            .unwrap();

        sensor.set_measured_value_raw(1234);
        // Coalesced into one pending report
        sensor.set_measured_value_raw(1250);
        assert_eq!(reports.len(), 1);

        let records = worker.process_pending();
        assert_eq!(
            records,
            vec![ReportRecord {
                path: AttributePath::new(
                    endpoint_id,
                    temperature_measurement::CLUSTER_ID,
                    TemperatureMeasurementAttribute::MeasuredValue as _,
                ),
                data_version: Some(before.wrapping_add(1)),
                payload: Ok(1250i16.to_ne_bytes().to_vec()),
            }]
        );
        assert!(reports.is_empty());
        assert!(!context.stack_lock().is_locked());
    }

    #[test]
    fn test_report_for_removed_endpoint_is_dropped() {
        let (context, table, reports) = setup();
        let worker = StackWorker::new(context.clone(), table, reports);

        let mut sensor = TemperatureSensor::new(context.clone(), "Cellar");
        sensor.begin().unwrap();
        sensor.set_measured_value_raw(500);
        sensor.end();

        let records = worker.process_pending();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].data_version, None);
        assert!(matches!(
            records[0].payload,
            Err(AttributeStatus::UnsupportedEndpoint(_))
        ));
    }

    #[test]
    fn test_unreachable_report_is_dropped() {
        let (context, table, reports) = setup();
        let worker = StackWorker::new(context.clone(), table, reports);

        let mut sensor = TemperatureSensor::new(context.clone(), "Cellar");
        sensor.begin().unwrap();
        sensor.set_reachable(false);

        let records = worker.process_pending();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].payload, Err(AttributeStatus::Unreachable));
    }

    #[test]
    fn test_thread_stops_on_request() {
        let (context, table, reports) = setup();
        let worker = Arc::new(StackWorker::new(context.clone(), table, reports.clone()));
        let handle = spawn_stack_thread(worker.clone()).unwrap();

        let mut sensor = TemperatureSensor::new(context.clone(), "Cellar");
        sensor.begin().unwrap();
        sensor.set_measured_value_raw(900);

        worker.stop();
        handle.join().unwrap();
        assert!(reports.is_empty());
    }
}
