//! 진단 로그 기반 검증 스텝 — 컴포넌트 초기화 실패 감지
//!
//! 호스팅 런타임은 초기화 실패를 반환값으로 알려주지 않고 로그로만 남깁니다.
//! 두 스텝 모두 플로우가 요청한 진단 로그 캡처를 읽으며, 캡처가 없으면 실패합니다.

use vaultcert_core::error::StepError;
use vaultcert_core::types::BoxFuture;
use vaultcert_flow::{FlowContext, INIT_FAILURE_MARKER, Step};

use crate::checks::{check_init_failure, check_no_init_failure};

/// 컴포넌트 초기화 실패가 기록되었는지 확인합니다.
pub struct ExpectInitFailureLogged {
    component: String,
    required: Vec<String>,
}

impl ExpectInitFailureLogged {
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            required: Vec::new(),
        }
    }

    /// 실패 줄에 반드시 포함되어야 하는 문자열 (예: 에러 메시지 일부)
    pub fn containing(mut self, fragment: impl Into<String>) -> Self {
        self.required.push(fragment.into());
        self
    }
}

impl Step for ExpectInitFailureLogged {
    fn execute<'a>(&'a self, ctx: &'a FlowContext) -> BoxFuture<'a, Result<(), StepError>> {
        Box::pin(async move {
            let lines = ctx.capture()?.marker_lines(INIT_FAILURE_MARKER);
            check_init_failure(&lines, &self.component, &self.required)?;
            tracing::info!(component = %self.component, "initialization failure logged as expected");
            Ok(())
        })
    }
}

/// 컴포넌트 초기화 실패가 기록되지 않았는지 확인합니다.
pub struct ExpectNoInitFailureLogged {
    component: String,
}

impl ExpectNoInitFailureLogged {
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
        }
    }
}

impl Step for ExpectNoInitFailureLogged {
    fn execute<'a>(&'a self, ctx: &'a FlowContext) -> BoxFuture<'a, Result<(), StepError>> {
        Box::pin(async move {
            let lines = ctx.capture()?.marker_lines(INIT_FAILURE_MARKER);
            check_no_init_failure(&lines, &self.component)?;
            Ok(())
        })
    }
}
