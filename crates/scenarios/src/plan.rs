//! Declarative flow plans.
//!
//! A [`FlowPlan`] names the components to load, the compose file to use and
//! the ordered checks to run. [`FlowPlan::build`] turns it into a runnable
//! [`Flow`] against a provisioned [`Fixture`], wrapping the checks in the
//! standard preamble and teardown:
//!
//! ```text
//! start store -> wait startup -> start runtime -> wait load
//!     -> checks... -> stop runtime -> stop store
//! ```

use std::path::{Path, PathBuf};

use serde::Serialize;

use vaultcert_assertions::{
    ExpectBulkContains, ExpectCapability, ExpectComponentPresent, ExpectInitFailureLogged,
    ExpectNoInitFailureLogged, ExpectSecretAbsent, ExpectSecretEquals, ExpectSecretStable,
};
use vaultcert_core::config::HarnessConfig;
use vaultcert_core::types::{Capability, FaultWindow, SecretMap};
use vaultcert_fixture::{
    InterruptNetwork, StartRuntime, StartStoreServer, StopRuntime, StopStoreServer,
};
use vaultcert_flow::{Flow, Sleep, Step};

use crate::fixture::{Fixture, FixturePlan};

/// Compose file name expected inside a component directory that brings its own store setup.
pub const COMPONENT_COMPOSE_FILE: &str = "docker-compose-hashicorp-vault.yml";

/// Which compose file starts the store for a flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ComposeSource {
    /// `[store] compose_file` from the configuration.
    Default,
    /// `docker-compose-hashicorp-vault.yml` next to the component manifest.
    ComponentDir,
}

/// One verification step of a flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Check {
    Registered { component: String },
    Capability { component: String, expected: bool },
    SecretContains { store: String, key: String, expected: SecretMap },
    SecretAbsent { store: String, key: String },
    SecretStable { store: String, key: String },
    BulkContains { store: String, secret: Option<String> },
    InitFailureLogged { component: String, fragments: Vec<String> },
    NoInitFailureLogged { component: String },
    InterruptStore,
    WaitForRecovery,
}

impl Check {
    /// Whether the check reads the diagnostic capture.
    pub fn needs_capture(&self) -> bool {
        matches!(
            self,
            Check::InitFailureLogged { .. } | Check::NoInitFailureLogged { .. }
        )
    }

    fn to_step(&self, fixture: &Fixture, config: &HarnessConfig) -> Box<dyn Step> {
        match self {
            Check::Registered { component } => {
                Box::new(ExpectComponentPresent::new(fixture.metadata.clone(), component))
            }
            Check::Capability {
                component,
                expected,
            } => Box::new(ExpectCapability::new(
                fixture.metadata.clone(),
                component,
                Capability::MultipleKeyValuesPerSecret,
                *expected,
            )),
            Check::SecretContains {
                store,
                key,
                expected,
            } => Box::new(ExpectSecretEquals::new(
                fixture.secrets.clone(),
                store,
                key,
                expected.clone(),
            )),
            Check::SecretAbsent { store, key } => {
                Box::new(ExpectSecretAbsent::new(fixture.secrets.clone(), store, key))
            }
            Check::SecretStable { store, key } => {
                Box::new(ExpectSecretStable::new(fixture.secrets.clone(), store, key))
            }
            Check::BulkContains { store, secret } => {
                let step = ExpectBulkContains::new(fixture.secrets.clone(), store);
                match secret {
                    Some(name) => Box::new(step.with_secret(name)),
                    None => Box::new(step),
                }
            }
            Check::InitFailureLogged {
                component,
                fragments,
            } => Box::new(
                fragments
                    .iter()
                    .fold(ExpectInitFailureLogged::new(component), |step, f| {
                        step.containing(f)
                    }),
            ),
            Check::NoInitFailureLogged { component } => {
                Box::new(ExpectNoInitFailureLogged::new(component))
            }
            Check::InterruptStore => Box::new(InterruptNetwork::new(
                fixture.faults.clone(),
                FaultWindow::new(
                    config.store.service_port.clone(),
                    config.timing.network_instability(),
                ),
            )),
            Check::WaitForRecovery => Box::new(Sleep(config.timing.recovery_wait())),
        }
    }
}

/// A labelled check inside a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedCheck {
    pub label: String,
    pub check: Check,
}

/// Everything needed to build one flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowPlan {
    pub description: String,
    /// Component directory, relative to `[runtime] resources_root`.
    pub components: PathBuf,
    pub compose: ComposeSource,
    pub checks: Vec<PlannedCheck>,
}

impl FlowPlan {
    pub fn new(description: impl Into<String>, components: impl Into<PathBuf>) -> Self {
        Self {
            description: description.into(),
            components: components.into(),
            compose: ComposeSource::Default,
            checks: Vec::new(),
        }
    }

    /// Use the compose file shipped next to the component manifest.
    pub fn with_component_compose(mut self) -> Self {
        self.compose = ComposeSource::ComponentDir;
        self
    }

    pub fn check(mut self, label: impl Into<String>, check: Check) -> Self {
        self.checks.push(PlannedCheck {
            label: label.into(),
            check,
        });
        self
    }

    pub fn needs_capture(&self) -> bool {
        self.checks.iter().any(|c| c.check.needs_capture())
    }

    pub fn components_path(&self, config: &HarnessConfig) -> PathBuf {
        Path::new(&config.runtime.resources_root).join(&self.components)
    }

    pub fn fixture_plan(&self, config: &HarnessConfig) -> FixturePlan {
        let components_path = self.components_path(config);
        let compose_file = match self.compose {
            ComposeSource::Default => PathBuf::from(&config.store.compose_file),
            ComposeSource::ComponentDir => components_path.join(COMPONENT_COMPOSE_FILE),
        };
        FixturePlan {
            components_path,
            compose_file,
        }
    }

    /// Wraps the checks in the standard preamble and teardown.
    pub fn build(&self, fixture: &Fixture, config: &HarnessConfig) -> Flow {
        let mut flow = Flow::new(&self.description)
            .step(
                "Start HashiCorp Vault server",
                StartStoreServer(fixture.store.clone()),
            )
            .step(
                "Waiting for component to start...",
                Sleep(config.timing.startup_wait()),
            )
            .step(
                "Start sidecar",
                StartRuntime::new(fixture.runtime.clone(), self.components_path(config)),
            )
            .step(
                "Waiting for component to load...",
                Sleep(config.timing.load_wait()),
            );

        for planned in &self.checks {
            flow = flow.boxed_step(&planned.label, planned.check.to_step(fixture, config));
        }

        flow = flow
            .step("Stop sidecar", StopRuntime(fixture.runtime.clone()))
            .step(
                "Stop HashiCorp Vault server",
                StopStoreServer(fixture.store.clone()),
            );

        if self.needs_capture() {
            flow = flow.capture_diagnostics(fixture.sink.clone());
        }
        flow
    }
}

/// Number of steps the preamble and teardown add around the checks.
pub const FRAME_STEPS: usize = 6;
