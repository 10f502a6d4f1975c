//! In-memory vCD backend for tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::config::Config;
use crate::error::{ApiError, Error};
use crate::session::{Connector, Session};
use crate::vcd::{
    ExtraConfigEntry, HardwareItem, Reference, RESOURCE_TYPE_MEMORY, RESOURCE_TYPE_PROCESSOR,
};

#[derive(Debug, Default)]
struct State {
    calls: Vec<String>,
    extra_config: Vec<ExtraConfigEntry>,
    fail_hardware: bool,
    fail_extra_config: bool,
    fail_writes: bool,
    disconnects: usize,
}

/// A single org/vdc/vapp/vm chain named Org1/Vdc1/App1/VM1.
#[derive(Debug, Clone, Default)]
pub struct StubCloud {
    state: Arc<Mutex<State>>,
}

impl StubCloud {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_extra_config(self, entries: &[(&str, &str)]) -> Self {
        self.state.lock().unwrap().extra_config = entries
            .iter()
            .map(|(k, v)| ExtraConfigEntry::new(*k, *v))
            .collect();
        self
    }

    pub fn fail_hardware(self) -> Self {
        self.state.lock().unwrap().fail_hardware = true;
        self
    }

    pub fn fail_extra_config(self) -> Self {
        self.state.lock().unwrap().fail_extra_config = true;
        self
    }

    pub fn fail_writes(self) -> Self {
        self.state.lock().unwrap().fail_writes = true;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == call).count()
    }

    pub fn disconnects(&self) -> usize {
        self.state.lock().unwrap().disconnects
    }

    pub fn vm() -> Reference {
        reference("VM1", "/vm/1")
    }

    fn record(&self, call: &str) {
        self.state.lock().unwrap().calls.push(call.to_string());
    }

    fn lookup(&self, call: &str, expected: &str, name: &str, href: &str) -> Option<Reference> {
        self.record(call);
        (name == expected).then(|| reference(name, href))
    }
}

fn reference(name: &str, href: &str) -> Reference {
    Reference {
        name: name.to_string(),
        href: href.to_string(),
    }
}

fn failure() -> ApiError {
    ApiError::status(500, "internal server error")
}

#[async_trait]
impl Session for StubCloud {
    async fn find_org(&self, name: &str) -> Result<Option<Reference>, ApiError> {
        Ok(self.lookup("find_org", "Org1", name, "/org/1"))
    }

    async fn find_vdc(&self, _org: &Reference, name: &str) -> Result<Option<Reference>, ApiError> {
        Ok(self.lookup("find_vdc", "Vdc1", name, "/vdc/1"))
    }

    async fn find_vapp(
        &self,
        _vdc: &Reference,
        name: &str,
    ) -> Result<Option<Reference>, ApiError> {
        Ok(self.lookup("find_vapp", "App1", name, "/vapp/1"))
    }

    async fn find_vm(&self, _vapp: &Reference, name: &str) -> Result<Option<Reference>, ApiError> {
        Ok(self.lookup("find_vm", "VM1", name, "/vm/1"))
    }

    async fn hardware(&self, _vm: &Reference) -> Result<Vec<HardwareItem>, ApiError> {
        self.record("hardware");
        if self.state.lock().unwrap().fail_hardware {
            return Err(failure());
        }
        Ok(vec![
            HardwareItem {
                resource_type: RESOURCE_TYPE_PROCESSOR,
                label: "2 virtual CPU(s)".to_string(),
                quantity: 2,
            },
            HardwareItem {
                resource_type: RESOURCE_TYPE_MEMORY,
                label: "4096 MB of memory".to_string(),
                quantity: 4096,
            },
            HardwareItem {
                resource_type: 10,
                label: "Network adapter 0".to_string(),
                quantity: 0,
            },
        ])
    }

    async fn extra_config(&self, _vm: &Reference) -> Result<Vec<ExtraConfigEntry>, ApiError> {
        self.record("extra_config");
        let state = self.state.lock().unwrap();
        if state.fail_extra_config {
            return Err(failure());
        }
        Ok(state.extra_config.clone())
    }

    async fn update_extra_config(
        &self,
        _vm: &Reference,
        entries: &[ExtraConfigEntry],
    ) -> Result<(), ApiError> {
        self.record("update_extra_config");
        let mut state = self.state.lock().unwrap();
        if state.fail_writes {
            return Err(failure());
        }
        for entry in entries {
            match state.extra_config.iter().position(|e| e.key == entry.key) {
                Some(i) => state.extra_config[i].value = entry.value.clone(),
                None => state.extra_config.push(entry.clone()),
            }
        }
        Ok(())
    }

    async fn delete_extra_config(
        &self,
        _vm: &Reference,
        entries: &[ExtraConfigEntry],
    ) -> Result<(), ApiError> {
        self.record("delete_extra_config");
        let mut state = self.state.lock().unwrap();
        if state.fail_writes {
            return Err(failure());
        }
        state
            .extra_config
            .retain(|e| !entries.iter().any(|d| d.key == e.key));
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), ApiError> {
        self.state.lock().unwrap().disconnects += 1;
        Ok(())
    }
}

/// Hands out clones of one `StubCloud` and counts connection attempts.
#[derive(Debug, Clone, Default)]
pub struct StubConnector {
    pub cloud: StubCloud,
    connects: Arc<AtomicUsize>,
    reject: bool,
}

impl StubConnector {
    pub fn new(cloud: StubCloud) -> Self {
        StubConnector {
            cloud,
            ..Default::default()
        }
    }

    pub fn rejecting() -> Self {
        StubConnector {
            reject: true,
            ..Default::default()
        }
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for StubConnector {
    type Session = StubCloud;

    async fn connect(&self, _config: &Config) -> Result<StubCloud, Error> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if self.reject {
            return Err(Error::Authentication("401: Invalid credentials".to_string()));
        }
        Ok(self.cloud.clone())
    }
}
