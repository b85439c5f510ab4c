//! 에러 타입 — 도메인별 에러 정의
//!
//! [`CertError`]는 하네스 전체의 최상위 에러이며, 각 계층(설정, 클라이언트,
//! 장애 주입, 픽스처, 로그 캡처, 검증)의 에러를 `#[from]`으로 감쌉니다.
//! 스텝 액션은 [`StepError`]를 반환하고, 러너는 이를 [`StepFailure`]로 보고합니다.

use std::fmt;

/// vaultcert 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum CertError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 메타데이터/시크릿 클라이언트 에러
    #[error("client error: {0}")]
    Client(#[from] ClientError),

    /// 네트워크 장애 주입 에러
    #[error("fault injection error: {0}")]
    Fault(#[from] FaultError),

    /// 픽스처(스토어 서버, 런타임) 에러
    #[error("fixture error: {0}")]
    Fixture(#[from] FixtureError),

    /// 진단 로그 캡처 에러
    #[error("log capture error: {0}")]
    Capture(#[from] CaptureError),

    /// 검증 실패
    #[error("assertion failed: {0}")]
    Assertion(#[from] AssertionError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 호스팅 런타임 API 호출 에러
///
/// 하네스는 "키 없음", "스토어 도달 불가", "스토어 설정 오류"를 구분하지 않습니다.
/// 모두 조회 실패로 취급됩니다.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// 요청 전송 실패 (연결 거부, 타임아웃 등)
    #[error("transport failed: {0}")]
    Transport(String),

    /// 비정상 HTTP 상태 코드
    #[error("unexpected status {status} from {endpoint}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// 응답 디코딩 실패
    #[error("failed to decode response from {endpoint}: {reason}")]
    Decode { endpoint: String, reason: String },

    /// 성공 응답이지만 빈 매핑
    #[error("secret '{key}' in store '{store}' resolved to an empty mapping")]
    EmptySecret { store: String, key: String },
}

/// 네트워크 장애 주입 에러
#[derive(Debug, thiserror::Error)]
pub enum FaultError {
    /// 대상 포트를 노출하는 서비스를 찾을 수 없음
    #[error("no running service publishes port {port}")]
    TargetNotFound { port: String },

    /// Docker API 호출 실패
    #[error("docker error: {0}")]
    Docker(String),

    /// 차단/복구 명령 실패
    #[error("fault command failed: {0}")]
    Command(String),
}

/// 픽스처 에러
#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    /// 프로세스 실행 실패
    #[error("failed to spawn '{program}': {reason}")]
    Spawn { program: String, reason: String },

    /// 외부 명령이 실패 코드로 종료
    #[error("command '{command}' exited with {code:?}: {stderr}")]
    Command {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    /// 컴포넌트 매니페스트 로딩/파싱 실패
    #[error("component manifest {path}: {reason}")]
    Manifest { path: String, reason: String },

    /// 빈 포트 할당 실패
    #[error("failed to allocate free ports: {0}")]
    Ports(String),

    /// 실행 중이 아닌 픽스처에 대한 조작
    #[error("{0} is not running")]
    NotRunning(String),
}

/// 진단 로그 캡처 에러
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CaptureError {
    /// 다른 플로우가 이미 캡처를 보유 중
    #[error("a diagnostic log capture is already active")]
    AlreadyActive,

    /// 플로우가 캡처를 요청하지 않음
    #[error("flow did not request diagnostic log capture")]
    NotActive,
}

/// 검증 실패 — 사람이 읽을 수 있는 진단 메시지를 담습니다.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("{message}")]
pub struct AssertionError {
    pub message: String,
}

impl AssertionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// 스텝 액션 에러
#[derive(Debug, thiserror::Error)]
pub enum StepError {
    /// 하네스 계층 에러
    #[error(transparent)]
    Cert(#[from] CertError),

    /// 자유 형식 실패 메시지
    #[error("{0}")]
    Failed(String),

    /// 취소 또는 데드라인 초과로 스텝이 시작되지 않음
    #[error("flow cancelled before step could start")]
    Cancelled,
}

impl From<AssertionError> for StepError {
    fn from(err: AssertionError) -> Self {
        Self::Cert(CertError::Assertion(err))
    }
}

impl From<ClientError> for StepError {
    fn from(err: ClientError) -> Self {
        Self::Cert(CertError::Client(err))
    }
}

impl From<FaultError> for StepError {
    fn from(err: FaultError) -> Self {
        Self::Cert(CertError::Fault(err))
    }
}

impl From<FixtureError> for StepError {
    fn from(err: FixtureError) -> Self {
        Self::Cert(CertError::Fixture(err))
    }
}

impl From<CaptureError> for StepError {
    fn from(err: CaptureError) -> Self {
        Self::Cert(CertError::Capture(err))
    }
}

/// 플로우 실패 보고
///
/// 실패한 스텝의 레이블과 1부터 시작하는 순번을 함께 기록합니다.
/// 순번 0은 스텝 실행 전 단계(로그 캡처 획득)를 뜻합니다.
#[derive(Debug)]
pub struct StepFailure {
    /// 플로우 설명
    pub flow: String,
    /// 실패한 스텝 레이블
    pub step: String,
    /// 실패한 스텝 순번 (1부터)
    pub index: usize,
    /// 원인
    pub error: StepError,
}

impl fmt::Display for StepFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "flow '{}' failed at step #{} '{}': {}",
            self.flow, self.index, self.step, self.error
        )
    }
}

impl std::error::Error for StepFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}
