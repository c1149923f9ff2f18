//! Change notifications for live Matter subscription updates.
//!
//! When a device value changes, the stack has to learn about it so the new
//! value is pushed to subscribed controllers. The [`ReportScheduler`] turns a
//! [`ChangeMask`] into one report per changed attribute and hands each to a
//! [`ReportingEngine`]. [`ReportQueue`] is the in-process engine: it collects
//! pending paths and wakes the stack worker.

use super::clusters::bridged_device_basic_info::{self, BridgedDeviceBasicInfoAttribute};
use super::clusters::{AttributeId, ClusterId, EndpointId};
use super::devices::{BridgedDevice, ChangeMask};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

/// Concrete path of one attribute on one endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AttributePath {
    pub endpoint_id: EndpointId,
    pub cluster_id: ClusterId,
    pub attribute_id: AttributeId,
}

impl AttributePath {
    pub fn new(endpoint_id: EndpointId, cluster_id: ClusterId, attribute_id: AttributeId) -> Self {
        Self {
            endpoint_id,
            cluster_id,
            attribute_id,
        }
    }
}

impl fmt::Display for AttributePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/0x{:04X}/0x{:04X}",
            self.endpoint_id, self.cluster_id, self.attribute_id
        )
    }
}

/// The stack's reporting engine.
///
/// `enqueue_report` is fire-and-forget and must not block. It may be called
/// with or without the stack lock held, so implementations must never take it.
pub trait ReportingEngine: Send + Sync {
    fn enqueue_report(&self, path: AttributePath);
}

/// Maps change masks to report paths and enqueues them.
#[derive(Clone)]
pub struct ReportScheduler {
    engine: Arc<dyn ReportingEngine>,
}

impl ReportScheduler {
    pub fn new(engine: Arc<dyn ReportingEngine>) -> Self {
        Self { engine }
    }

    /// Enqueue one report per attribute covered by `changed`.
    ///
    /// Does not deduplicate; the engine may coalesce.
    pub fn notify<D: BridgedDevice>(&self, endpoint_id: EndpointId, changed: ChangeMask) {
        for path in report_paths::<D>(endpoint_id, changed) {
            log::debug!("Scheduling report for {}", path);
            self.engine.enqueue_report(path);
        }
    }
}

/// Attribute paths covered by a change mask for device type `D`.
pub fn report_paths<D: BridgedDevice>(
    endpoint_id: EndpointId,
    changed: ChangeMask,
) -> impl Iterator<Item = AttributePath> {
    let basic = [
        (
            ChangeMask::REACHABLE,
            BridgedDeviceBasicInfoAttribute::Reachable,
        ),
        (ChangeMask::NAME, BridgedDeviceBasicInfoAttribute::NodeLabel),
        (
            ChangeMask::PRODUCT_NAME,
            BridgedDeviceBasicInfoAttribute::ProductName,
        ),
    ]
    .into_iter()
    .filter(move |(bit, _)| changed.contains(*bit))
    .map(move |(_, attribute)| {
        AttributePath::new(
            endpoint_id,
            bridged_device_basic_info::CLUSTER_ID,
            attribute as AttributeId,
        )
    });

    let values: &'static [AttributeId] = if changed.contains(ChangeMask::VALUE) {
        D::VALUE_ATTRIBUTES
    } else {
        &[]
    };

    basic.chain(
        values
            .iter()
            .map(move |attribute| AttributePath::new(endpoint_id, D::CLUSTER.id, *attribute)),
    )
}

/// In-process reporting engine.
///
/// Identical pending paths are coalesced: the stack only needs to know that
/// an attribute is dirty, not how many times it changed.
pub struct ReportQueue {
    pending: Mutex<VecDeque<AttributePath>>,
    signal: Signal<CriticalSectionRawMutex, ()>,
}

impl ReportQueue {
    pub fn new() -> Self {
        Self {
            pending: Mutex::new(VecDeque::new()),
            signal: Signal::new(),
        }
    }

    /// Take every pending path, oldest first.
    pub fn drain(&self) -> Vec<AttributePath> {
        self.pending.lock().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }

    /// Wait until at least one report was enqueued since the last wait.
    pub async fn wait(&self) {
        self.signal.wait().await
    }
}

impl Default for ReportQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportingEngine for ReportQueue {
    fn enqueue_report(&self, path: AttributePath) {
        {
            let mut pending = self.pending.lock();
            if !pending.contains(&path) {
                pending.push_back(path);
            }
        }
        self.signal.signal(());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matter::clusters::relative_humidity;
    use crate::matter::devices::{HumiditySensorDevice, TemperatureSensorDevice};
    use crate::matter::test_support::RecordingReporter;

    #[test]
    fn test_empty_mask_schedules_nothing() {
        let reporter = Arc::new(RecordingReporter::default());
        let scheduler = ReportScheduler::new(reporter.clone());
        scheduler.notify::<TemperatureSensorDevice>(3, ChangeMask::empty());
        assert!(reporter.paths().is_empty());
    }

    #[test]
    fn test_value_bit_maps_to_measured_value() {
        let reporter = Arc::new(RecordingReporter::default());
        let scheduler = ReportScheduler::new(reporter.clone());
        scheduler.notify::<HumiditySensorDevice>(5, ChangeMask::VALUE);
        assert_eq!(
            reporter.paths(),
            vec![AttributePath::new(5, relative_humidity::CLUSTER_ID, 0x0000)]
        );
    }

    #[test]
    fn test_each_bit_becomes_one_report() {
        let paths: Vec<_> = report_paths::<TemperatureSensorDevice>(
            2,
            ChangeMask::REACHABLE | ChangeMask::NAME | ChangeMask::VALUE,
        )
        .collect();
        assert_eq!(
            paths,
            vec![
                AttributePath::new(2, bridged_device_basic_info::CLUSTER_ID, 0x0011),
                AttributePath::new(2, bridged_device_basic_info::CLUSTER_ID, 0x0005),
                AttributePath::new(2, 0x0402, 0x0000),
            ]
        );
    }

    #[test]
    fn test_queue_coalesces_and_drains_in_order() {
        let queue = ReportQueue::new();
        let a = AttributePath::new(2, 0x0402, 0);
        let b = AttributePath::new(3, 0x0405, 0);
        queue.enqueue_report(a);
        queue.enqueue_report(b);
        queue.enqueue_report(a);
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.drain(), vec![a, b]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_queue_wakes_waiter() {
        let queue = ReportQueue::new();
        queue.enqueue_report(AttributePath::new(2, 0x0402, 0));
        // Already signalled: completes immediately
        tokio_test::block_on(queue.wait());
        assert_eq!(queue.len(), 1);
    }
}
