//! Docker pause 기반 네트워크 장애 주입기
//!
//! 대상 포트를 노출하는 실행 중인 컨테이너를 찾아 일시 정지합니다. 정지된 컨테이너는
//! 연결을 받지도 끊지도 않으므로 클라이언트 입장에서는 네트워크 단절처럼 보입니다.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::info;

use vaultcert_core::error::FaultError;
use vaultcert_core::fault::FaultInjector;

use crate::docker::ContainerRuntime;

/// 컨테이너 pause/unpause로 포트 도달성을 끊고 복구합니다.
pub struct DockerPauseInjector<R: ContainerRuntime> {
    runtime: Arc<R>,
    /// 포트 → 일시 정지한 컨테이너 ID
    paused: Mutex<HashMap<String, String>>,
}

impl<R: ContainerRuntime> DockerPauseInjector<R> {
    pub fn new(runtime: Arc<R>) -> Self {
        Self {
            runtime,
            paused: Mutex::new(HashMap::new()),
        }
    }

    async fn find_target(&self, port: &str) -> Result<(String, String), FaultError> {
        let number: u16 = port.parse().map_err(|_| FaultError::TargetNotFound {
            port: port.to_owned(),
        })?;
        let containers = self.runtime.list_running().await?;
        containers
            .into_iter()
            .find(|c| c.publishes(number))
            .map(|c| (c.id, c.name))
            .ok_or_else(|| FaultError::TargetNotFound {
                port: port.to_owned(),
            })
    }

    fn paused_map(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.paused
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<R: ContainerRuntime> FaultInjector for DockerPauseInjector<R> {
    async fn cut(&self, port: &str) -> Result<(), FaultError> {
        let (id, name) = self.find_target(port).await?;
        self.runtime.pause(&id).await?;
        info!(port, container = %name, "paused container publishing port");
        self.paused_map().insert(port.to_owned(), id);
        Ok(())
    }

    async fn restore(&self, port: &str) -> Result<(), FaultError> {
        let remembered = self.paused_map().remove(port);
        let id = match remembered {
            Some(id) => id,
            None => self.find_target(port).await?.0,
        };
        self.runtime.unpause(&id).await?;
        info!(port, container = %id, "unpaused container");
        Ok(())
    }
}
