//! 설정 관리 — vaultcert.toml 파싱 및 하네스 설정
//!
//! [`HarnessConfig`]는 인증 하네스 전체 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`VAULTCERT_STORE_SERVICE_PORT=8200` 형식)
//! 3. 설정 파일 (`vaultcert.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), vaultcert_core::error::CertError> {
//! use vaultcert_core::config::HarnessConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = HarnessConfig::load("vaultcert.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = HarnessConfig::parse("[general]\nlog_level = \"debug\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{CertError, ConfigError};

/// vaultcert 통합 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// 일반 설정 (로깅)
    #[serde(default)]
    pub general: GeneralConfig,
    /// 시크릿 스토어 서버 설정
    #[serde(default)]
    pub store: StoreConfig,
    /// 호스팅 런타임(사이드카) 설정
    #[serde(default)]
    pub runtime: RuntimeConfig,
    /// 고정 대기 시간 설정
    #[serde(default)]
    pub timing: TimingConfig,
    /// Docker 연결 설정
    #[serde(default)]
    pub docker: DockerConfig,
}

impl HarnessConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, CertError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, CertError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                CertError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                CertError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, CertError> {
        toml::from_str(toml_str).map_err(|e| {
            CertError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `VAULTCERT_{SECTION}_{FIELD}`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "VAULTCERT_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "VAULTCERT_GENERAL_LOG_FORMAT");

        // Store
        override_string(
            &mut self.store.compose_project,
            "VAULTCERT_STORE_COMPOSE_PROJECT",
        );
        override_string(&mut self.store.compose_file, "VAULTCERT_STORE_COMPOSE_FILE");
        override_string(&mut self.store.service_port, "VAULTCERT_STORE_SERVICE_PORT");

        // Runtime
        override_string(&mut self.runtime.daprd_path, "VAULTCERT_RUNTIME_DAPRD_PATH");
        override_string(&mut self.runtime.app_id, "VAULTCERT_RUNTIME_APP_ID");
        override_string(
            &mut self.runtime.runtime_log_level,
            "VAULTCERT_RUNTIME_RUNTIME_LOG_LEVEL",
        );
        override_string(
            &mut self.runtime.resources_root,
            "VAULTCERT_RUNTIME_RESOURCES_ROOT",
        );

        // Timing
        override_u64(
            &mut self.timing.startup_wait_secs,
            "VAULTCERT_TIMING_STARTUP_WAIT_SECS",
        );
        override_u64(
            &mut self.timing.load_wait_secs,
            "VAULTCERT_TIMING_LOAD_WAIT_SECS",
        );
        override_u64(
            &mut self.timing.network_instability_secs,
            "VAULTCERT_TIMING_NETWORK_INSTABILITY_SECS",
        );
        override_u64(
            &mut self.timing.recovery_wait_secs,
            "VAULTCERT_TIMING_RECOVERY_WAIT_SECS",
        );

        // Docker
        override_string(&mut self.docker.socket, "VAULTCERT_DOCKER_SOCKET");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), CertError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(invalid(
                "general.log_level",
                format!("must be one of: {}", valid_levels.join(", ")),
            ));
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(invalid(
                "general.log_format",
                format!("must be one of: {}", valid_formats.join(", ")),
            ));
        }

        require_non_empty("store.compose_project", &self.store.compose_project)?;
        require_non_empty("store.compose_file", &self.store.compose_file)?;
        match self.store.service_port.parse::<u16>() {
            Ok(port) if port != 0 => {}
            _ => {
                return Err(invalid(
                    "store.service_port",
                    format!(
                        "'{}' is not a valid non-zero port",
                        self.store.service_port
                    ),
                ));
            }
        }

        require_non_empty("runtime.daprd_path", &self.runtime.daprd_path)?;
        require_non_empty("runtime.app_id", &self.runtime.app_id)?;
        require_non_empty("runtime.resources_root", &self.runtime.resources_root)?;
        let valid_runtime_levels = ["debug", "info", "warn", "error", "fatal"];
        if !valid_runtime_levels.contains(&self.runtime.runtime_log_level.as_str()) {
            return Err(invalid(
                "runtime.runtime_log_level",
                format!("must be one of: {}", valid_runtime_levels.join(", ")),
            ));
        }

        if self.timing.network_instability_secs == 0 {
            return Err(invalid(
                "timing.network_instability_secs",
                "instability window must be longer than zero".to_owned(),
            ));
        }
        // 복구 대기는 장애 구간보다 짧아야 함
        if self.timing.recovery_wait_secs >= self.timing.network_instability_secs {
            return Err(invalid(
                "timing.recovery_wait_secs",
                format!(
                    "must be shorter than timing.network_instability_secs ({})",
                    self.timing.network_instability_secs
                ),
            ));
        }

        require_non_empty("docker.socket", &self.docker.socket)?;

        Ok(())
    }
}

fn invalid(field: &str, reason: String) -> CertError {
    ConfigError::InvalidValue {
        field: field.to_owned(),
        reason,
    }
    .into()
}

fn require_non_empty(field: &str, value: &str) -> Result<(), CertError> {
    if value.trim().is_empty() {
        return Err(invalid(field, "must not be empty".to_owned()));
    }
    Ok(())
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "pretty".to_owned(),
        }
    }
}

/// 시크릿 스토어 서버 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// docker compose 프로젝트 이름
    pub compose_project: String,
    /// 기본 docker compose 파일 경로
    pub compose_file: String,
    /// 스토어 서비스 포트 (장애 주입 대상)
    pub service_port: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            compose_project: "hashicorp-vault".to_owned(),
            compose_file: "infrastructure/docker-compose-hashicorp-vault.yml".to_owned(),
            service_port: "8200".to_owned(),
        }
    }
}

/// 호스팅 런타임(사이드카) 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// daprd 실행 파일 경로
    pub daprd_path: String,
    /// 사이드카 app id
    pub app_id: String,
    /// 사이드카 로그 레벨
    pub runtime_log_level: String,
    /// 컴포넌트 매니페스트 루트 디렉토리
    pub resources_root: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            daprd_path: "daprd".to_owned(),
            app_id: "vaultcert".to_owned(),
            runtime_log_level: "info".to_owned(),
            resources_root: "components".to_owned(),
        }
    }
}

/// 고정 대기 시간 설정 (초)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// 스토어 서버 기동 후 대기
    pub startup_wait_secs: u64,
    /// 컴포넌트 로딩 후 대기
    pub load_wait_secs: u64,
    /// 네트워크 장애 구간 길이
    pub network_instability_secs: u64,
    /// 장애 종료 후 복구 대기
    pub recovery_wait_secs: u64,
}

impl TimingConfig {
    pub fn startup_wait(&self) -> Duration {
        Duration::from_secs(self.startup_wait_secs)
    }

    pub fn load_wait(&self) -> Duration {
        Duration::from_secs(self.load_wait_secs)
    }

    pub fn network_instability(&self) -> Duration {
        Duration::from_secs(self.network_instability_secs)
    }

    pub fn recovery_wait(&self) -> Duration {
        Duration::from_secs(self.recovery_wait_secs)
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            startup_wait_secs: 5,
            load_wait_secs: 5,
            network_instability_secs: 60,
            recovery_wait_secs: 15, // 장애 구간의 1/4
        }
    }
}

/// Docker 연결 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DockerConfig {
    /// Docker 소켓 경로
    pub socket: String,
}

impl Default for DockerConfig {
    fn default() -> Self {
        Self {
            socket: "/var/run/docker.sock".to_owned(),
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}
