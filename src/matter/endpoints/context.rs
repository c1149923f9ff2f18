//! Stack collaborators shared by every bridged endpoint.

use super::allocator::{EndpointAllocator, SystemAllocator};
use crate::matter::clusters::bridged_device_basic_info::{
    BasicInformationHandler, BridgedBasicInformation,
};
use crate::matter::endpoint_table::EndpointTable;
use crate::matter::reporting::{ReportScheduler, ReportingEngine};
use crate::matter::stack_lock::StackLock;
use std::sync::Arc;

/// Handle to one protocol stack: its lock, endpoint table, reporting engine,
/// basic-information handler and endpoint allocator.
///
/// All endpoints of one stack share a single context, and with it the single
/// global stack lock.
pub struct BridgeContext {
    lock: StackLock,
    table: Arc<dyn EndpointTable>,
    scheduler: ReportScheduler,
    basic_info: Arc<dyn BasicInformationHandler>,
    allocator: Arc<dyn EndpointAllocator>,
}

impl BridgeContext {
    pub fn new(table: Arc<dyn EndpointTable>, reporting: Arc<dyn ReportingEngine>) -> Self {
        Self {
            lock: StackLock::new(),
            table,
            scheduler: ReportScheduler::new(reporting),
            basic_info: Arc::new(BridgedBasicInformation),
            allocator: Arc::new(SystemAllocator),
        }
    }

    pub fn with_allocator(mut self, allocator: Arc<dyn EndpointAllocator>) -> Self {
        self.allocator = allocator;
        self
    }

    pub fn with_basic_information(mut self, handler: Arc<dyn BasicInformationHandler>) -> Self {
        self.basic_info = handler;
        self
    }

    pub fn stack_lock(&self) -> &StackLock {
        &self.lock
    }

    pub fn table(&self) -> &Arc<dyn EndpointTable> {
        &self.table
    }

    pub fn scheduler(&self) -> &ReportScheduler {
        &self.scheduler
    }

    pub fn basic_information(&self) -> &Arc<dyn BasicInformationHandler> {
        &self.basic_info
    }

    pub fn allocator(&self) -> &Arc<dyn EndpointAllocator> {
        &self.allocator
    }
}
