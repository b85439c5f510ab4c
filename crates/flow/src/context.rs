//! 플로우 실행 컨텍스트
//!
//! 모든 스텝에 참조로 전달되며 플로우 실행이 끝나면 함께 사라집니다.
//! 취소/데드라인 신호, 로깅, 그리고 플로우가 요청한 경우 진단 로그 캡처 핸들을 담습니다.

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::info;

use vaultcert_core::error::CaptureError;

use crate::sink::CaptureHandle;

/// 플로우 실행 컨텍스트
#[derive(Debug)]
pub struct FlowContext {
    description: String,
    cancel: CancellationToken,
    deadline: Option<Instant>,
    capture: Option<CaptureHandle>,
}

impl FlowContext {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            cancel: CancellationToken::new(),
            deadline: None,
            capture: None,
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_capture(mut self, capture: CaptureHandle) -> Self {
        self.capture = Some(capture);
        self
    }

    /// 플로우 설명
    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// 취소되었거나 데드라인이 지났는지.
    ///
    /// 권고용 신호입니다. 러너는 다음 스텝 시작 전에만 확인합니다.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled() || self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// 플로우의 진단 로그 캡처
    pub fn capture(&self) -> Result<&CaptureHandle, CaptureError> {
        self.capture.as_ref().ok_or(CaptureError::NotActive)
    }

    /// 현재 스텝 span 안에서 메시지를 남깁니다.
    pub fn log(&self, message: &str) {
        info!(flow = %self.description, "{message}");
    }
}
