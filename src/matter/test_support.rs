//! Recording stand-ins for the stack collaborators, used by unit tests.

use super::clusters::EndpointId;
use super::endpoint_table::{DynamicEndpointTable, EndpointRegistration, EndpointTable};
use super::endpoints::allocator::{EndpointAllocator, EndpointResource};
use super::endpoints::context::BridgeContext;
use super::reporting::{AttributePath, ReportingEngine};
use super::stack_lock::StackGuard;
use crate::error::{AllocError, RegistrationError};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use uuid::Uuid;

/// Reporting engine that remembers every enqueued path, without coalescing.
#[derive(Default)]
pub struct RecordingReporter {
    paths: Mutex<Vec<AttributePath>>,
}

impl RecordingReporter {
    pub fn paths(&self) -> Vec<AttributePath> {
        self.paths.lock().clone()
    }

    pub fn clear(&self) {
        self.paths.lock().clear();
    }
}

impl ReportingEngine for RecordingReporter {
    fn enqueue_report(&self, path: AttributePath) {
        self.paths.lock().push(path);
    }
}

/// Endpoint table that counts calls and can refuse the next registration.
pub struct CountingTable {
    inner: DynamicEndpointTable,
    registrations: AtomicUsize,
    deregistrations: AtomicUsize,
    reject_next: Mutex<Option<RegistrationError>>,
}

impl CountingTable {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: DynamicEndpointTable::new(capacity, 2, 1),
            registrations: AtomicUsize::new(0),
            deregistrations: AtomicUsize::new(0),
            reject_next: Mutex::new(None),
        }
    }

    pub fn inner(&self) -> &DynamicEndpointTable {
        &self.inner
    }

    pub fn registrations(&self) -> usize {
        self.registrations.load(Ordering::SeqCst)
    }

    pub fn deregistrations(&self) -> usize {
        self.deregistrations.load(Ordering::SeqCst)
    }

    pub fn reject_next(&self, error: RegistrationError) {
        *self.reject_next.lock() = Some(error);
    }
}

impl EndpointTable for CountingTable {
    fn register(
        &self,
        guard: &StackGuard<'_>,
        registration: EndpointRegistration,
    ) -> Result<EndpointId, RegistrationError> {
        self.registrations.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.reject_next.lock().take() {
            return Err(error);
        }
        self.inner.register(guard, registration)
    }

    fn deregister(
        &self,
        guard: &StackGuard<'_>,
        device: Uuid,
    ) -> Result<EndpointId, RegistrationError> {
        self.deregistrations.fetch_add(1, Ordering::SeqCst);
        self.inner.deregister(guard, device)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AllocEvent {
    Reserve(EndpointResource),
    Release(EndpointResource),
}

/// Allocator that logs every reservation and can fail one on request.
#[derive(Default)]
pub struct ScriptedAllocator {
    fail_next: Mutex<Option<EndpointResource>>,
    events: Mutex<Vec<AllocEvent>>,
}

impl ScriptedAllocator {
    /// Refuse the next reservation of `resource`, once.
    pub fn fail_once(&self, resource: EndpointResource) {
        *self.fail_next.lock() = Some(resource);
    }

    pub fn events(&self) -> Vec<AllocEvent> {
        self.events.lock().clone()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }

    /// Reservations not yet released.
    pub fn outstanding(&self) -> usize {
        self.events.lock().iter().fold(0usize, |n, e| match e {
            AllocEvent::Reserve(_) => n + 1,
            AllocEvent::Release(_) => n.saturating_sub(1),
        })
    }
}

impl EndpointAllocator for ScriptedAllocator {
    fn reserve(&self, resource: EndpointResource, bytes: usize) -> Result<(), AllocError> {
        let mut fail_next = self.fail_next.lock();
        if *fail_next == Some(resource) {
            *fail_next = None;
            return Err(AllocError { resource, bytes });
        }
        self.events.lock().push(AllocEvent::Reserve(resource));
        Ok(())
    }

    fn release(&self, resource: EndpointResource, _bytes: usize) {
        self.events.lock().push(AllocEvent::Release(resource));
    }
}

/// A [`BridgeContext`] wired to recording collaborators.
pub struct Harness {
    pub context: Arc<BridgeContext>,
    pub table: Arc<CountingTable>,
    pub reporter: Arc<RecordingReporter>,
    pub allocator: Arc<ScriptedAllocator>,
}

impl Harness {
    pub fn new(capacity: usize) -> Self {
        let table = Arc::new(CountingTable::new(capacity));
        let reporter = Arc::new(RecordingReporter::default());
        let allocator = Arc::new(ScriptedAllocator::default());
        let context = Arc::new(
            BridgeContext::new(table.clone(), reporter.clone()).with_allocator(allocator.clone()),
        );
        Self {
            context,
            table,
            reporter,
            allocator,
        }
    }
}
