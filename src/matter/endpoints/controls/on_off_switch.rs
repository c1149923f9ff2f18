//! On/off switch endpoint for the Matter OnOff cluster.
//!
//! Exposes as On/Off Plug-in Unit (0x010A). Controllers can write the OnOff
//! attribute; the application sees the result through [`OnOffSwitch::is_on`].

use crate::error::Result;
use crate::matter::clusters::{EndpointId, Label, label};
use crate::matter::devices::OnOffSwitchDevice;
use crate::matter::endpoints::bridged_endpoint::BridgedEndpoint;
use crate::matter::endpoints::context::BridgeContext;
use std::ops::Deref;
use std::sync::Arc;

pub struct OnOffSwitch {
    endpoint: BridgedEndpoint<OnOffSwitchDevice>,
    name: Label,
    initial: bool,
}

impl OnOffSwitch {
    pub fn new(context: Arc<BridgeContext>, name: &str, initial: bool) -> Self {
        Self {
            endpoint: BridgedEndpoint::new(context),
            name: label(name),
            initial,
        }
    }

    pub fn begin(&mut self) -> Result<EndpointId> {
        let (name, initial) = (self.name.clone(), self.initial);
        self.endpoint.begin(|| OnOffSwitchDevice::new(&name, initial))
    }

    pub fn end(&mut self) {
        self.endpoint.end();
    }

    pub fn set_on_off(&self, on: bool) -> bool {
        !self
            .endpoint
            .update(|device, guard| device.set_on_off(guard, on))
            .is_empty()
    }

    /// Flip the state. Returns the new state, `None` while Uninitialized.
    pub fn toggle(&self) -> Option<bool> {
        self.endpoint
            .update(|device, guard| device.set_on_off(guard, !device.is_on()));
        self.is_on()
    }

    pub fn is_on(&self) -> Option<bool> {
        self.endpoint.device().map(|d| d.is_on())
    }
}

impl Deref for OnOffSwitch {
    type Target = BridgedEndpoint<OnOffSwitchDevice>;

    fn deref(&self) -> &Self::Target {
        &self.endpoint
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matter::clusters::on_off::{self, OnOffAttribute};
    use crate::matter::reporting::AttributePath;
    use crate::matter::test_support::Harness;

    #[test]
    fn test_toggle() {
        let harness = Harness::new(4);
        let mut switch = OnOffSwitch::new(harness.context.clone(), "Lamp", true);
        assert_eq!(switch.toggle(), None);

        switch.begin().unwrap();
        assert_eq!(switch.is_on(), Some(true));
        assert_eq!(switch.toggle(), Some(false));
        assert_eq!(switch.toggle(), Some(true));
        assert_eq!(harness.reporter.paths().len(), 2);
    }

    #[test]
    fn test_remote_write_reaches_application() {
        let harness = Harness::new(4);
        let mut switch = OnOffSwitch::new(harness.context.clone(), "Lamp", false);
        let endpoint_id = switch.begin().unwrap();

        let path = AttributePath::new(endpoint_id, on_off::CLUSTER_ID, OnOffAttribute::OnOff as _);
        {
            let guard = harness.context.stack_lock().acquire();
            harness.table.inner().write(&guard, &path, &[1]).unwrap();
        }
        assert_eq!(switch.is_on(), Some(true));
        assert_eq!(harness.reporter.paths(), vec![path]);
    }
}
