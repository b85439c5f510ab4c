//! Per-flow fixtures and how they are provisioned.
//!
//! A [`Fixture`] bundles every collaborator one flow needs. The driver asks a
//! [`FixtureProvider`] for a fresh fixture before each flow, so no runtime
//! process or client is shared between flows.

use std::path::PathBuf;
use std::sync::Arc;

use vaultcert_core::client::{DynMetadataClient, DynSecretClient};
use vaultcert_core::config::HarnessConfig;
use vaultcert_core::error::CertError;
use vaultcert_core::fault::DynFaultInjector;
use vaultcert_core::fixture::{DynRuntimeHost, DynStoreServer};
use vaultcert_fixture::{
    BollardContainerRuntime, ComposeStoreServer, DockerPauseInjector, SidecarHttpClient,
    SidecarPorts, SidecarProcess,
};
use vaultcert_flow::DiagnosticSink;

/// Where a flow's fixture comes from: which components to load and which
/// compose file brings up the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixturePlan {
    pub components_path: PathBuf,
    pub compose_file: PathBuf,
}

/// Collaborators for a single flow.
pub struct Fixture {
    pub store: Arc<dyn DynStoreServer>,
    pub runtime: Arc<dyn DynRuntimeHost>,
    pub metadata: Arc<dyn DynMetadataClient>,
    pub secrets: Arc<dyn DynSecretClient>,
    pub faults: Arc<dyn DynFaultInjector>,
    pub sink: DiagnosticSink,
    /// Local ports reserved for the runtime, when it runs as a real process.
    pub ports: Option<SidecarPorts>,
}

impl std::fmt::Debug for Fixture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fixture")
            .field("ports", &self.ports)
            .finish_non_exhaustive()
    }
}

/// Builds a fresh [`Fixture`] for each flow.
pub trait FixtureProvider: Send + Sync {
    fn provision(&self, plan: &FixturePlan) -> Result<Fixture, CertError>;
}

/// Real collaborators: docker compose, a `daprd` process, the sidecar HTTP
/// API, and Docker pause/unpause for fault injection.
pub struct LocalFixtureProvider {
    config: HarnessConfig,
    sink: DiagnosticSink,
    docker: Arc<BollardContainerRuntime>,
}

impl LocalFixtureProvider {
    pub fn new(config: HarnessConfig, sink: DiagnosticSink) -> Result<Self, CertError> {
        let docker = BollardContainerRuntime::connect_with_socket(&config.docker.socket)?;
        Ok(Self {
            config,
            sink,
            docker: Arc::new(docker),
        })
    }
}

impl FixtureProvider for LocalFixtureProvider {
    fn provision(&self, plan: &FixturePlan) -> Result<Fixture, CertError> {
        let ports = SidecarPorts::allocate()?;
        let client = Arc::new(SidecarHttpClient::for_port(ports.http)?);
        let sidecar = SidecarProcess::new(&self.config.runtime, ports, self.sink.clone());
        let store = ComposeStoreServer::new(&self.config.store.compose_project, &plan.compose_file);

        tracing::debug!(
            components = %plan.components_path.display(),
            compose = %plan.compose_file.display(),
            http_port = ports.http,
            "provisioned local fixture"
        );

        Ok(Fixture {
            store: Arc::new(store),
            runtime: Arc::new(sidecar),
            metadata: client.clone(),
            secrets: client,
            faults: Arc::new(DockerPauseInjector::new(Arc::clone(&self.docker))),
            sink: self.sink.clone(),
            ports: Some(ports),
        })
    }
}
