//! 픽스처 어댑터 에러 타입
//!
//! [`FixtureAdapterError`]는 Docker, HTTP 호출과 매니페스트 로딩에서 발생하는 에러를 표현합니다.
//! `CertError`, `FaultError`, `FixtureError`로의 `From` 변환이 구현되어 있어
//! 어댑터 계약의 반환 타입으로 `?` 연산자를 그대로 쓸 수 있습니다.

use vaultcert_core::error::{CertError, ClientError, FaultError, FixtureError};

/// 픽스처 어댑터 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum FixtureAdapterError {
    /// Docker 소켓 연결 실패
    #[error("docker connection error: {0}")]
    DockerConnection(String),

    /// Docker API 호출 실패
    #[error("docker api error: {0}")]
    DockerApi(String),

    /// 유효하지 않은 컨테이너 ID
    #[error("invalid container ID: {0}")]
    InvalidContainerId(String),

    /// HTTP 클라이언트 에러
    #[error("http error: {0}")]
    Http(String),

    /// 컴포넌트 매니페스트 에러
    #[error("component manifest {path}: {reason}")]
    Manifest {
        /// 매니페스트 경로
        path: String,
        /// 에러 사유
        reason: String,
    },
}

impl From<FixtureAdapterError> for FaultError {
    fn from(err: FixtureAdapterError) -> Self {
        match err {
            FixtureAdapterError::DockerConnection(_)
            | FixtureAdapterError::DockerApi(_)
            | FixtureAdapterError::InvalidContainerId(_) => FaultError::Docker(err.to_string()),
            other => FaultError::Command(other.to_string()),
        }
    }
}

impl From<FixtureAdapterError> for FixtureError {
    fn from(err: FixtureAdapterError) -> Self {
        match err {
            FixtureAdapterError::Manifest { path, reason } => FixtureError::Manifest { path, reason },
            other => FixtureError::Command {
                command: "fixture".to_owned(),
                code: None,
                stderr: other.to_string(),
            },
        }
    }
}

impl From<FixtureAdapterError> for CertError {
    fn from(err: FixtureAdapterError) -> Self {
        match err {
            FixtureAdapterError::DockerConnection(_)
            | FixtureAdapterError::DockerApi(_)
            | FixtureAdapterError::InvalidContainerId(_) => CertError::Fault(err.into()),
            FixtureAdapterError::Http(msg) => CertError::Client(ClientError::Transport(msg)),
            other => CertError::Fixture(other.into()),
        }
    }
}

impl From<reqwest::Error> for FixtureAdapterError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(err.to_string())
    }
}

impl From<bollard::errors::Error> for FixtureAdapterError {
    fn from(err: bollard::errors::Error) -> Self {
        Self::DockerApi(err.to_string())
    }
}
