//! Docker API abstraction for the network fault injector.
//!
//! The [`ContainerRuntime`] trait covers the few Docker calls the harness
//! needs (list running containers with their published ports, pause,
//! unpause). Production code uses [`BollardContainerRuntime`]; unit tests
//! use `MockContainerRuntime`.
//!
//! # Container ID Validation
//!
//! Methods that accept container IDs validate them first:
//! - Must be 1-64 characters
//! - Must contain only ASCII hex digits ([0-9a-fA-F])

use std::future::Future;
use std::sync::Arc;

use crate::error::FixtureAdapterError;

/// Validates a container ID before it is sent to the daemon.
pub(crate) fn validate_container_id(id: &str) -> Result<(), FixtureAdapterError> {
    if id.is_empty() || id.len() > 64 {
        return Err(FixtureAdapterError::InvalidContainerId(format!(
            "length {} (must be 1-64)",
            id.len()
        )));
    }
    if !id.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(FixtureAdapterError::InvalidContainerId(
            "contains non-hex characters".to_owned(),
        ));
    }
    Ok(())
}

/// A running container and the ports it exposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunningContainer {
    pub id: String,
    pub name: String,
    pub ports: Vec<PublishedPort>,
}

impl RunningContainer {
    /// Whether the container exposes `port` either inside the container or on the host.
    pub fn publishes(&self, port: u16) -> bool {
        self.ports
            .iter()
            .any(|p| p.private == port || p.public == Some(port))
    }
}

/// A container port mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublishedPort {
    pub private: u16,
    pub public: Option<u16>,
}

/// Trait abstracting the Docker calls used by the fault injector.
pub trait ContainerRuntime: Send + Sync + 'static {
    /// Lists running containers (stopped containers are filtered out).
    fn list_running(
        &self,
    ) -> impl Future<Output = Result<Vec<RunningContainer>, FixtureAdapterError>> + Send;

    /// Pauses a container, freezing all its processes.
    fn pause(&self, id: &str) -> impl Future<Output = Result<(), FixtureAdapterError>> + Send;

    /// Resumes a paused container.
    fn unpause(&self, id: &str) -> impl Future<Output = Result<(), FixtureAdapterError>> + Send;
}

/// Production container runtime using `bollard`.
///
/// Connection timeout is 120 seconds; the API version is negotiated by default.
pub struct BollardContainerRuntime {
    docker: Arc<bollard::Docker>,
}

impl BollardContainerRuntime {
    /// Connects to Docker using a specific socket path.
    pub fn connect_with_socket(socket_path: &str) -> Result<Self, FixtureAdapterError> {
        let docker =
            bollard::Docker::connect_with_socket(socket_path, 120, bollard::API_DEFAULT_VERSION)
                .map_err(|e| {
                    FixtureAdapterError::DockerConnection(format!(
                        "failed to connect to docker at {socket_path}: {e}"
                    ))
                })?;
        Ok(Self {
            docker: Arc::new(docker),
        })
    }
}

impl ContainerRuntime for BollardContainerRuntime {
    async fn list_running(&self) -> Result<Vec<RunningContainer>, FixtureAdapterError> {
        use bollard::container::ListContainersOptions;

        let options = ListContainersOptions::<String> {
            all: false,
            ..Default::default()
        };

        let containers = self
            .docker
            .list_containers(Some(options))
            .await
            .map_err(|e| FixtureAdapterError::DockerApi(format!("list containers failed: {e}")))?;

        Ok(containers
            .into_iter()
            .map(|container| {
                let name = container
                    .names
                    .unwrap_or_default()
                    .first()
                    .map(|n| n.trim_start_matches('/').to_owned())
                    .unwrap_or_default();
                let ports = container
                    .ports
                    .unwrap_or_default()
                    .into_iter()
                    .map(|p| PublishedPort {
                        private: p.private_port,
                        public: p.public_port,
                    })
                    .collect();
                RunningContainer {
                    id: container.id.unwrap_or_default(),
                    name,
                    ports,
                }
            })
            .collect())
    }

    async fn pause(&self, id: &str) -> Result<(), FixtureAdapterError> {
        validate_container_id(id)?;
        self.docker
            .pause_container(id)
            .await
            .map_err(|e| FixtureAdapterError::DockerApi(format!("pause {id} failed: {e}")))
    }

    async fn unpause(&self, id: &str) -> Result<(), FixtureAdapterError> {
        validate_container_id(id)?;
        self.docker
            .unpause_container(id)
            .await
            .map_err(|e| FixtureAdapterError::DockerApi(format!("unpause {id} failed: {e}")))
    }
}

/// 테스트용 Mock 컨테이너 런타임
///
/// pause/unpause 호출을 기록하여 Docker 없이 장애 주입기를 테스트합니다.
#[cfg(test)]
#[derive(Default)]
pub struct MockContainerRuntime {
    pub containers: Vec<RunningContainer>,
    pub fail_actions: bool,
    pub actions: std::sync::Mutex<Vec<String>>,
}

#[cfg(test)]
impl MockContainerRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_containers(mut self, containers: Vec<RunningContainer>) -> Self {
        self.containers = containers;
        self
    }

    pub fn with_failing_actions(mut self) -> Self {
        self.fail_actions = true;
        self
    }

    pub fn actions(&self) -> Vec<String> {
        self.actions.lock().unwrap().clone()
    }

    fn act(&self, action: &str, id: &str) -> Result<(), FixtureAdapterError> {
        validate_container_id(id)?;
        if self.fail_actions {
            return Err(FixtureAdapterError::DockerApi(format!("{action} {id}: mock failure")));
        }
        self.actions.lock().unwrap().push(format!("{action} {id}"));
        Ok(())
    }
}

#[cfg(test)]
impl ContainerRuntime for MockContainerRuntime {
    async fn list_running(&self) -> Result<Vec<RunningContainer>, FixtureAdapterError> {
        Ok(self.containers.clone())
    }

    async fn pause(&self, id: &str) -> Result<(), FixtureAdapterError> {
        self.act("pause", id)
    }

    async fn unpause(&self, id: &str) -> Result<(), FixtureAdapterError> {
        self.act("unpause", id)
    }
}
