//! 범용 스텝 — 고정 대기와 로그 메시지

use std::time::Duration;

use vaultcert_core::error::StepError;
use vaultcert_core::types::BoxFuture;

use crate::context::FlowContext;
use crate::step::Step;

/// 고정 시간 대기
///
/// 컴포넌트 기동/로딩 대기와 장애 복구 대기에 사용합니다.
/// 하네스 코어에는 재시도가 없으므로 불안정성 완화는 이 대기에 의존합니다.
#[derive(Debug, Clone, Copy)]
pub struct Sleep(pub Duration);

impl Sleep {
    pub fn secs(secs: u64) -> Self {
        Self(Duration::from_secs(secs))
    }
}

impl Step for Sleep {
    fn execute<'a>(&'a self, ctx: &'a FlowContext) -> BoxFuture<'a, Result<(), StepError>> {
        Box::pin(async move {
            tracing::debug!(flow = ctx.description(), duration = ?self.0, "sleeping");
            tokio::time::sleep(self.0).await;
            Ok(())
        })
    }
}

/// 로그 메시지 출력
#[derive(Debug, Clone)]
pub struct Log {
    message: String,
}

impl Log {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Step for Log {
    fn execute<'a>(&'a self, ctx: &'a FlowContext) -> BoxFuture<'a, Result<(), StepError>> {
        Box::pin(async move {
            ctx.log(&self.message);
            Ok(())
        })
    }
}
