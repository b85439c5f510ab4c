//! Fixture provider wiring the fakes together.

use std::sync::{Arc, Mutex};

use vaultcert_core::error::{CertError, FaultError};
use vaultcert_core::fault::FaultInjector;
use vaultcert_flow::DiagnosticSink;
use vaultcert_scenarios::{Fixture, FixturePlan, FixtureProvider};

use super::config::repo_root;
use super::fake_sidecar::FakeSidecar;
use super::fake_vault::{FakeVault, SharedVault};

/// Makes the fake server unreachable while a window is open.
pub struct FakeFaults {
    vault: SharedVault,
    calls: Mutex<Vec<String>>,
}

impl FakeFaults {
    pub fn new(vault: SharedVault) -> Self {
        Self {
            vault,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn set_reachable(&self, port: &str, reachable: bool) -> Result<(), FaultError> {
        let mut vault = self.vault.lock();
        if !vault.running || port.parse::<u16>().ok() != Some(vault.container_port) {
            return Err(FaultError::TargetNotFound {
                port: port.to_owned(),
            });
        }
        vault.reachable = reachable;
        let action = if reachable { "restore" } else { "cut" };
        self.calls.lock().unwrap().push(format!("{action} {port}"));
        Ok(())
    }
}

impl FaultInjector for FakeFaults {
    async fn cut(&self, port: &str) -> Result<(), FaultError> {
        self.set_reachable(port, false)
    }

    async fn restore(&self, port: &str) -> Result<(), FaultError> {
        self.set_reachable(port, true)
    }
}

/// Everything one provisioned flow touched, kept for assertions.
#[derive(Clone)]
pub struct Provisioned {
    pub plan: FixturePlan,
    pub vault: SharedVault,
    pub faults: Arc<FakeFaults>,
}

/// Builds a fresh fake store server and sidecar per flow.
#[derive(Default)]
pub struct FakeProvider {
    skip_seeding: bool,
    silent_init_failures: bool,
    provisioned: Mutex<Vec<Provisioned>>,
}

#[allow(dead_code)]
impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores come up empty.
    pub fn unseeded(mut self) -> Self {
        self.skip_seeding = true;
        self
    }

    /// The sidecar never logs initialization failures.
    pub fn silent_init_failures(mut self) -> Self {
        self.silent_init_failures = true;
        self
    }

    pub fn provisioned(&self) -> Vec<Provisioned> {
        self.provisioned.lock().unwrap().clone()
    }
}

impl FixtureProvider for FakeProvider {
    fn provision(&self, plan: &FixturePlan) -> Result<Fixture, CertError> {
        let vault = SharedVault::default();
        let sink = DiagnosticSink::new();

        let mut store = FakeVault::new(&plan.compose_file, vault.clone());
        if self.skip_seeding {
            store = store.without_seeding();
        }
        let mut sidecar = FakeSidecar::new(vault.clone(), repo_root(), sink.clone());
        if self.silent_init_failures {
            sidecar = sidecar.silent();
        }
        let sidecar = Arc::new(sidecar);
        let faults = Arc::new(FakeFaults::new(vault.clone()));

        self.provisioned.lock().unwrap().push(Provisioned {
            plan: plan.clone(),
            vault,
            faults: faults.clone(),
        });

        Ok(Fixture {
            store: Arc::new(store),
            runtime: sidecar.clone(),
            metadata: sidecar.clone(),
            secrets: sidecar,
            faults,
            sink,
            ports: None,
        })
    }
}
