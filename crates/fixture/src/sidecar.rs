//! daprd 사이드카 프로세스 픽스처
//!
//! 앱 없이 사이드카만 띄우고, 지정한 디렉토리의 컴포넌트 매니페스트를 로드합니다.
//! 사이드카의 stdout/stderr는 한 줄씩 [`DiagnosticSink`]로 전달되므로 초기화 실패
//! 로그를 플로우가 캡처할 수 있습니다.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use vaultcert_core::config::RuntimeConfig;
use vaultcert_core::error::FixtureError;
use vaultcert_core::fixture::RuntimeHost;
use vaultcert_flow::DiagnosticSink;

use crate::ports::allocate_free_ports;

/// 종료 후 출력 전달 태스크를 기다리는 최대 시간
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// 사이드카가 사용하는 로컬 포트 묶음
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SidecarPorts {
    pub grpc: u16,
    pub http: u16,
    pub internal_grpc: u16,
    pub metrics: u16,
}

impl SidecarPorts {
    /// 서로 다른 빈 포트 4개를 할당합니다.
    pub fn allocate() -> Result<Self, FixtureError> {
        let ports = allocate_free_ports(4)?;
        match ports.as_slice() {
            [grpc, http, internal_grpc, metrics] => Ok(Self {
                grpc: *grpc,
                http: *http,
                internal_grpc: *internal_grpc,
                metrics: *metrics,
            }),
            other => Err(FixtureError::Ports(format!(
                "expected 4 ports, got {}",
                other.len()
            ))),
        }
    }
}

struct RunningSidecar {
    child: Child,
    forwarders: Vec<JoinHandle<()>>,
}

/// daprd 프로세스 호스트
pub struct SidecarProcess {
    program: PathBuf,
    app_id: String,
    log_level: String,
    ports: SidecarPorts,
    sink: DiagnosticSink,
    running: Mutex<Option<RunningSidecar>>,
}

impl SidecarProcess {
    pub fn new(config: &RuntimeConfig, ports: SidecarPorts, sink: DiagnosticSink) -> Self {
        Self {
            program: PathBuf::from(&config.daprd_path),
            app_id: config.app_id.clone(),
            log_level: config.runtime_log_level.clone(),
            ports,
            sink,
            running: Mutex::new(None),
        }
    }

    pub fn ports(&self) -> SidecarPorts {
        self.ports
    }

    /// 사이드카 HTTP API 기본 주소
    pub fn http_endpoint(&self) -> String {
        format!("http://127.0.0.1:{}", self.ports.http)
    }

    fn args(&self, components_path: &Path) -> Vec<String> {
        vec![
            "--app-id".to_owned(),
            self.app_id.clone(),
            "--resources-path".to_owned(),
            components_path.display().to_string(),
            "--dapr-grpc-port".to_owned(),
            self.ports.grpc.to_string(),
            "--dapr-http-port".to_owned(),
            self.ports.http.to_string(),
            "--dapr-internal-grpc-port".to_owned(),
            self.ports.internal_grpc.to_string(),
            "--metrics-port".to_owned(),
            self.ports.metrics.to_string(),
            "--log-level".to_owned(),
            self.log_level.clone(),
        ]
    }

    pub async fn is_running(&self) -> bool {
        self.running.lock().await.is_some()
    }
}

fn forward_lines<R>(reader: R, sink: DiagnosticSink) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(reader).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => sink.record_line(&line),
                Ok(None) => break,
                Err(e) => {
                    warn!(error = %e, "failed to read sidecar output");
                    break;
                }
            }
        }
    })
}

impl RuntimeHost for SidecarProcess {
    async fn start(&self, components_path: &Path) -> Result<(), FixtureError> {
        let mut running = self.running.lock().await;
        if running.is_some() {
            return Err(FixtureError::Spawn {
                program: self.program.display().to_string(),
                reason: "sidecar is already running".to_owned(),
            });
        }

        let args = self.args(components_path);
        debug!(program = %self.program.display(), args = ?args, "spawning sidecar");

        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| FixtureError::Spawn {
                program: self.program.display().to_string(),
                reason: e.to_string(),
            })?;

        let mut forwarders = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            forwarders.push(forward_lines(stdout, self.sink.clone()));
        }
        if let Some(stderr) = child.stderr.take() {
            forwarders.push(forward_lines(stderr, self.sink.clone()));
        }

        info!(
            app_id = %self.app_id,
            components = %components_path.display(),
            grpc_port = self.ports.grpc,
            http_port = self.ports.http,
            "sidecar started"
        );
        *running = Some(RunningSidecar { child, forwarders });
        Ok(())
    }

    async fn stop(&self) -> Result<(), FixtureError> {
        let Some(mut sidecar) = self.running.lock().await.take() else {
            return Err(FixtureError::NotRunning("sidecar".to_owned()));
        };

        match sidecar.child.try_wait() {
            Ok(Some(status)) => {
                warn!(status = %status, "sidecar had already exited");
            }
            _ => {
                sidecar.child.kill().await.map_err(|e| FixtureError::Command {
                    command: "kill sidecar".to_owned(),
                    code: None,
                    stderr: e.to_string(),
                })?;
            }
        }

        for forwarder in sidecar.forwarders {
            let abort = forwarder.abort_handle();
            if tokio::time::timeout(DRAIN_TIMEOUT, forwarder).await.is_err() {
                abort.abort();
            }
        }

        info!(app_id = %self.app_id, "sidecar stopped");
        Ok(())
    }
}
