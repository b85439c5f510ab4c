//! docker compose 기반 시크릿 스토어 서버 픽스처
//!
//! `docker compose -p <project> -f <file> up -d`로 시작하고 `... down`으로 정지합니다.
//! 실행 파일은 교체할 수 있어 테스트에서는 셸 스크립트로 대신합니다.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, info};

use vaultcert_core::error::FixtureError;
use vaultcert_core::fixture::StoreServer;

const DEFAULT_PROGRAM: &str = "docker";

/// docker compose 프로젝트로 띄우는 스토어 서버
#[derive(Debug, Clone)]
pub struct ComposeStoreServer {
    program: PathBuf,
    project: String,
    compose_file: PathBuf,
}

impl ComposeStoreServer {
    pub fn new(project: impl Into<String>, compose_file: impl Into<PathBuf>) -> Self {
        Self {
            program: PathBuf::from(DEFAULT_PROGRAM),
            project: project.into(),
            compose_file: compose_file.into(),
        }
    }

    /// `docker` 대신 실행할 프로그램
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn compose_file(&self) -> &Path {
        &self.compose_file
    }

    fn args(&self, action: &[&str]) -> Vec<String> {
        let mut args = vec![
            "compose".to_owned(),
            "-p".to_owned(),
            self.project.clone(),
            "-f".to_owned(),
            self.compose_file.display().to_string(),
        ];
        args.extend(action.iter().map(|s| (*s).to_owned()));
        args
    }

    async fn compose(&self, action: &[&str]) -> Result<(), FixtureError> {
        let args = self.args(action);
        let command_line = format!("{} {}", self.program.display(), args.join(" "));
        debug!(command = %command_line, "running compose command");

        let output = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| FixtureError::Spawn {
                program: self.program.display().to_string(),
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(FixtureError::Command {
                command: command_line,
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }
        Ok(())
    }
}

impl StoreServer for ComposeStoreServer {
    async fn start(&self) -> Result<(), FixtureError> {
        self.compose(&["up", "-d"]).await?;
        info!(project = %self.project, file = %self.compose_file.display(), "store server started");
        Ok(())
    }

    async fn stop(&self) -> Result<(), FixtureError> {
        self.compose(&["down"]).await?;
        info!(project = %self.project, "store server stopped");
        Ok(())
    }
}
